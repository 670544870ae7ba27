use std::sync::{Arc, Mutex};

use strata_common::error::ErrorKind;
use strata_format::{
    filter::{Int64Range, IsNotNull},
    scan_spec::ScanSpec,
    schema::{Type, TypeKind, TypeWithId},
    stream::{ColumnEncoding, ColumnEncodingKind, FlatMapKey},
};
use strata_sequence::{
    list_sequence::ListSequence, struct_sequence::StructSequence, value_sequence::ValueSequence,
};
use strata_testkit::stripe::StripeFixture;

use super::{downcast, stripe_from};
use crate::{
    config::ReaderConfig,
    read::{
        column_selector::ColumnSelector, params::KeySelectionStats, row_reader::StripeRowReader,
    },
};

/// `struct { id: long, tags: list<int>, name: string }` with ids 0..=4.
fn records() -> Arc<TypeWithId> {
    TypeWithId::create(&Type::structure([
        ("id", Type::primitive(TypeKind::Long)),
        ("tags", Type::list(Type::primitive(TypeKind::Int))),
        ("name", Type::primitive(TypeKind::String)),
    ]))
}

fn records_fixture() -> StripeFixture {
    StripeFixture::new()
        .int_data(1, 0, &[1, 2, 3, 4])
        .lengths(2, 0, &[1, 0, 2, 1])
        .int_data(3, 0, &[10, 20, 30, 40])
        .string_data(4, 0, &["a", "b", "c", "d"])
}

#[test]
fn test_filter_masks_every_field() {
    strata_testkit::init_logging();
    let root = records();
    let stripe = stripe_from(records_fixture(), 4, ColumnSelector::all(&root));
    let mut spec = ScanSpec::full("root", &root);
    spec.get_or_create_child("id")
        .set_filter(Some(Arc::new(Int64Range::new(2, 3))));

    let mut reader =
        StripeRowReader::new(&root, &root, &stripe, &mut spec, ReaderConfig::default()).unwrap();
    let frame = reader.next().unwrap().unwrap();
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.field_names.len(), 3);

    let ids = downcast::<ValueSequence>(frame.field("id").unwrap());
    assert_eq!(ids.as_slice::<i64>(), &[2, 3]);

    let tags = downcast::<ListSequence>(frame.field("tags").unwrap());
    assert_eq!(tags.offsets.as_slice(), &[0, 0, 2]);
    let items = downcast::<ValueSequence>(tags.item.as_deref().unwrap());
    assert_eq!(items.as_slice::<i32>(), &[20, 30]);

    let names = downcast::<ValueSequence>(frame.field("name").unwrap());
    assert_eq!(names.string_at(0), Some("b"));
    assert_eq!(names.string_at(1), Some("c"));

    assert!(reader.next().is_none());
}

#[test]
fn test_batches_and_implicit_projection() {
    let root = records();
    let stripe = stripe_from(records_fixture(), 4, ColumnSelector::only(&root, [1, 4]).unwrap());
    let mut spec = ScanSpec::new("root");
    let config = ReaderConfig::default().with_batch_size(3);
    let reader = StripeRowReader::new(&root, &root, &stripe, &mut spec, config).unwrap();
    assert!(reader.field_reader("tags").is_none());
    assert!(reader.field_reader("id").is_some());

    let frames: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].len(), 3);
    assert_eq!(frames[1].len(), 1);
    let ids = downcast::<ValueSequence>(frames[1].field("id").unwrap());
    assert_eq!(ids.as_slice::<i64>(), &[4]);
    let names = downcast::<ValueSequence>(frames[1].field("name").unwrap());
    assert_eq!(names.string_at(0), Some("d"));
}

#[test]
fn test_filter_only_column_is_not_projected() {
    let root = records();
    let stripe = stripe_from(records_fixture(), 4, ColumnSelector::all(&root));
    let mut spec = ScanSpec::new("root");
    spec.get_or_create_child("id")
        .set_filter(Some(Arc::new(Int64Range::new(4, 4))));
    let name = spec.get_or_create_child("name");
    name.set_project_out(true);
    name.set_extract_values(true);

    let mut reader =
        StripeRowReader::new(&root, &root, &stripe, &mut spec, ReaderConfig::default()).unwrap();
    let frame = reader.next().unwrap().unwrap();
    assert_eq!(frame.len(), 1);
    assert!(frame.field("id").is_none());
    let names = downcast::<ValueSequence>(frame.field("name").unwrap());
    assert_eq!(names.string_at(0), Some("d"));
}

#[test]
fn test_configuration_errors() {
    let root = records();
    let stripe = stripe_from(records_fixture(), 4, ColumnSelector::all(&root));

    let mut spec = ScanSpec::full("root", &root);
    spec.get_or_create_child("tags")
        .set_filter(Some(Arc::new(IsNotNull)));
    let err = StripeRowReader::new(&root, &root, &stripe, &mut spec, ReaderConfig::default())
        .err()
        .unwrap();
    assert!(err.is_configuration());

    let config = ReaderConfig::default().with_batch_size(0);
    let err = StripeRowReader::new(&root, &root, &stripe, &mut ScanSpec::new("root"), config)
        .err()
        .unwrap();
    assert!(err.is_configuration());

    let list = root.child_at(1).unwrap().clone();
    let err = StripeRowReader::new(
        &list,
        &list,
        &stripe,
        &mut ScanSpec::new("tags"),
        ReaderConfig::default(),
    )
    .err()
    .unwrap();
    assert!(err.is_configuration());
}

#[test]
fn test_nested_struct_with_nulls_and_pruned_field() {
    let root = TypeWithId::create(&Type::structure([(
        "user",
        Type::structure([
            ("name", Type::primitive(TypeKind::String)),
            ("age", Type::primitive(TypeKind::Int)),
        ]),
    )]));
    let stripe = stripe_from(
        StripeFixture::new()
            .present(1, 0, &[true, false, true])
            .string_data(2, 0, &["x", "z"])
            .int_data(3, 0, &[1, 3]),
        3,
        ColumnSelector::only(&root, [2]).unwrap(),
    );
    let mut reader = StripeRowReader::new(
        &root,
        &root,
        &stripe,
        &mut ScanSpec::new("root"),
        ReaderConfig::default(),
    )
    .unwrap();
    let user_reader = reader.field_reader("user").unwrap().as_struct().unwrap();
    let fields: Vec<&str> = user_reader.fields().map(|(name, _)| name).collect();
    assert_eq!(fields, vec!["name"]);

    let frame = reader.next().unwrap().unwrap();
    let user = downcast::<StructSequence>(frame.field("user").unwrap());
    assert!(user.presence.is_null(1));
    let names = downcast::<ValueSequence>(user.field("name").unwrap());
    assert_eq!(names.len(), 2);
    assert_eq!(names.string_at(1), Some("z"));
}

#[test]
fn test_seek_skips_every_field() {
    let root = records();
    let stripe = stripe_from(records_fixture(), 4, ColumnSelector::all(&root));
    let mut reader = StripeRowReader::new(
        &root,
        &root,
        &stripe,
        &mut ScanSpec::new("root"),
        ReaderConfig::default(),
    )
    .unwrap();
    reader.seek_to_row(3).unwrap();
    assert!(reader.seek_to_row(5).is_err());
    let frame = reader.next().unwrap().unwrap();
    assert_eq!(frame.len(), 1);
    let tags = downcast::<ListSequence>(frame.field("tags").unwrap());
    let items = downcast::<ValueSequence>(tags.item.as_deref().unwrap());
    assert_eq!(items.as_slice::<i32>(), &[40]);
    assert_eq!(reader.position(), 4);
}

fn counting_config(calls: &Arc<Mutex<Vec<KeySelectionStats>>>) -> ReaderConfig {
    let sink = calls.clone();
    ReaderConfig::default()
        .with_stream_label_root("/stripe0")
        .with_key_selection_callback(Arc::new(move |stats: &KeySelectionStats| {
            sink.lock().unwrap().push(*stats);
        }))
}

#[test]
fn test_flat_map_field_is_rejected_at_construction() {
    let root = TypeWithId::create(&Type::structure([
        ("id", Type::primitive(TypeKind::Long)),
        (
            "attrs",
            Type::map(
                Type::primitive(TypeKind::Int),
                Type::primitive(TypeKind::Long),
            ),
        ),
    ]));
    let fixture = || {
        StripeFixture::new()
            .int_data(1, 0, &[7])
            .encoding(2, 0, ColumnEncoding::new(ColumnEncodingKind::MapFlat))
            .encoding(4, 1, ColumnEncoding::direct().with_key(FlatMapKey::Int(1)))
            .in_map(4, 1, &[true])
            .int_data(4, 1, &[5])
    };

    let stripe = stripe_from(fixture(), 1, ColumnSelector::all(&root));
    let calls = Arc::new(Mutex::new(Vec::new()));
    let err = StripeRowReader::new(
        &root,
        &root,
        &stripe,
        &mut ScanSpec::new("root"),
        counting_config(&calls),
    )
    .err()
    .unwrap();
    assert!(matches!(err.kind(), ErrorKind::NotImplemented { .. }));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![KeySelectionStats {
            node: 2,
            total_keys: 1,
            selected_keys: 1,
        }]
    );

    // Leaving the flat map out of the projection reads the other fields.
    let stripe = stripe_from(fixture(), 1, ColumnSelector::all(&root));
    let mut spec = ScanSpec::new("root");
    let id = spec.get_or_create_child("id");
    id.set_project_out(true);
    id.set_extract_values(true);
    let mut reader =
        StripeRowReader::new(&root, &root, &stripe, &mut spec, ReaderConfig::default()).unwrap();
    assert!(reader.field_reader("attrs").is_none());
    let frame = reader.next().unwrap().unwrap();
    let ids = downcast::<ValueSequence>(frame.field("id").unwrap());
    assert_eq!(ids.as_slice::<i64>(), &[7]);
}

#[test]
fn test_callback_reaches_flat_maps_nested_in_structs() {
    let root = TypeWithId::create(&Type::structure([(
        "s",
        Type::structure([(
            "m",
            Type::map(
                Type::primitive(TypeKind::Int),
                Type::primitive(TypeKind::Long),
            ),
        )]),
    )]));
    let stripe = stripe_from(
        StripeFixture::new()
            .encoding(2, 0, ColumnEncoding::new(ColumnEncodingKind::MapFlat))
            .encoding(4, 1, ColumnEncoding::direct().with_key(FlatMapKey::Int(1)))
            .in_map(4, 1, &[true])
            .int_data(4, 1, &[5])
            .encoding(4, 2, ColumnEncoding::direct().with_key(FlatMapKey::Int(2)))
            .in_map(4, 2, &[true])
            .int_data(4, 2, &[6]),
        1,
        ColumnSelector::all(&root),
    );
    let calls = Arc::new(Mutex::new(Vec::new()));
    let result = StripeRowReader::new(
        &root,
        &root,
        &stripe,
        &mut ScanSpec::new("root"),
        counting_config(&calls),
    );
    assert!(result.is_err());
    assert_eq!(
        *calls.lock().unwrap(),
        vec![KeySelectionStats {
            node: 2,
            total_keys: 2,
            selected_keys: 2,
        }]
    );
}
