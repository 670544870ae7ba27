use strata_sequence::sequence::Sequence;
use strata_testkit::stripe::StripeFixture;

use crate::read::{column_selector::ColumnSelector, stripe_streams::InMemoryStripe};

mod row_reader;

/// Loads the streams of `fixture` into an in-memory stripe.
pub(crate) fn stripe_from(
    fixture: StripeFixture,
    row_count: u64,
    selector: ColumnSelector,
) -> InMemoryStripe {
    let parts = fixture.into_parts();
    let mut stripe = InMemoryStripe::new(row_count, selector);
    for (key, encoding) in parts.encodings {
        stripe = stripe.with_encoding(key, encoding);
    }
    for (id, stream) in parts.streams {
        stripe = stripe.with_stream(id, stream.bytes, stream.use_vints);
    }
    stripe
}

pub(crate) fn downcast<T: Sequence>(sequence: &dyn Sequence) -> &T {
    sequence
        .downcast_ref::<T>()
        .expect("unexpected sequence type")
}
