//! Query-time projection tree.
//!
//! A [`ScanSpec`] mirrors the requested type tree and controls which columns
//! are materialized into the output and how. Nodes are created lazily by the
//! readers the first time a column reader is built for them and are then
//! reused across all row batches of a stripe.

use std::sync::Arc;

use crate::{
    filter::ValueFilter,
    schema::{TypeKind, TypeWithId},
};

/// A mutable projection node.
#[derive(Debug, Clone)]
pub struct ScanSpec {
    field_name: Arc<str>,
    /// Whether the column's values are part of the produced output.
    project_out: bool,
    /// Whether the reader must materialize values rather than only evaluate filters.
    extract_values: bool,
    children: Vec<ScanSpec>,
    filter: Option<Arc<dyn ValueFilter>>,
}

impl ScanSpec {
    /// Name of the synthetic child describing list elements.
    pub const ARRAY_ELEMENTS: &'static str = "elements";
    /// Name of the synthetic child describing map keys.
    pub const MAP_KEYS: &'static str = "key";
    /// Name of the synthetic child describing map values.
    pub const MAP_VALUES: &'static str = "value";

    /// Creates a childless node that is neither projected out nor extracted.
    pub fn new(field_name: impl Into<Arc<str>>) -> ScanSpec {
        ScanSpec {
            field_name: field_name.into(),
            project_out: false,
            extract_values: false,
            children: Vec::new(),
            filter: None,
        }
    }

    /// Creates a projection of the whole `data_type` subtree with every node
    /// projected out and extracted.
    pub fn full(field_name: impl Into<Arc<str>>, data_type: &TypeWithId) -> ScanSpec {
        let mut spec = ScanSpec::new(field_name);
        spec.project_out = true;
        spec.extract_values = true;
        spec.children = data_type
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let name = match data_type.kind() {
                    TypeKind::List => Self::ARRAY_ELEMENTS,
                    TypeKind::Map if i == 0 => Self::MAP_KEYS,
                    TypeKind::Map => Self::MAP_VALUES,
                    _ => data_type.field_name(i).unwrap_or_default(),
                };
                ScanSpec::full(name, child)
            })
            .collect();
        spec
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn project_out(&self) -> bool {
        self.project_out
    }

    pub fn set_project_out(&mut self, project_out: bool) {
        self.project_out = project_out;
    }

    pub fn extract_values(&self) -> bool {
        self.extract_values
    }

    pub fn set_extract_values(&mut self, extract_values: bool) {
        self.extract_values = extract_values;
    }

    pub fn children(&self) -> &[ScanSpec] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [ScanSpec] {
        &mut self.children
    }

    pub fn child_by_name(&self, name: &str) -> Option<&ScanSpec> {
        self.children
            .iter()
            .find(|child| child.field_name.as_ref() == name)
    }

    /// Returns the child named `name`, appending a new default node if there
    /// is none yet.
    pub fn get_or_create_child(&mut self, name: &str) -> &mut ScanSpec {
        let index = match self.position_of(name) {
            Some(index) => index,
            None => {
                self.children.push(ScanSpec::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Appends `child`, replacing an existing child of the same name in place.
    pub fn add_child(&mut self, child: ScanSpec) -> &mut ScanSpec {
        match self.position_of(child.field_name()) {
            Some(index) => {
                self.children[index] = child;
                &mut self.children[index]
            }
            None => {
                self.children.push(child);
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.field_name.as_ref() == name)
    }

    pub fn filter(&self) -> Option<&Arc<dyn ValueFilter>> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, filter: Option<Arc<dyn ValueFilter>>) {
        self.filter = filter;
    }

    /// Returns `true` if this node or any descendant carries a filter.
    pub fn has_filter(&self) -> bool {
        self.filter.is_some() || self.children.iter().any(ScanSpec::has_filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::IsNotNull,
        schema::{Type, TypeKind, TypeWithId},
    };

    #[test]
    fn test_full_projection_names() {
        let ty = Type::structure([
            ("a", Type::list(Type::primitive(TypeKind::Int))),
            (
                "b",
                Type::map(
                    Type::primitive(TypeKind::String),
                    Type::primitive(TypeKind::Long),
                ),
            ),
        ]);
        let spec = ScanSpec::full("root", &TypeWithId::create(&ty));
        assert!(spec.project_out() && spec.extract_values());
        let a = spec.child_by_name("a").unwrap();
        assert_eq!(a.children()[0].field_name(), ScanSpec::ARRAY_ELEMENTS);
        let b = spec.child_by_name("b").unwrap();
        let names: Vec<_> = b.children().iter().map(|c| c.field_name()).collect();
        assert_eq!(names, vec![ScanSpec::MAP_KEYS, ScanSpec::MAP_VALUES]);
        assert!(b.children()[1].project_out());
    }

    #[test]
    fn test_get_or_create_child_is_stable() {
        let mut spec = ScanSpec::new("root");
        spec.get_or_create_child("x").set_project_out(true);
        spec.get_or_create_child("y");
        spec.get_or_create_child("x");
        assert_eq!(spec.children().len(), 2);
        assert_eq!(spec.children()[0].field_name(), "x");
        assert!(spec.children()[0].project_out());
        assert!(!spec.children()[1].project_out());
    }

    #[test]
    fn test_has_filter_looks_at_descendants() {
        let mut spec = ScanSpec::new("root");
        assert!(!spec.has_filter());
        spec.get_or_create_child("x")
            .get_or_create_child("y")
            .set_filter(Some(Arc::new(IsNotNull)));
        assert!(spec.has_filter());
        assert!(spec.filter().is_none());
    }

    #[test]
    fn test_add_child_replaces_by_name() {
        let mut spec = ScanSpec::new("root");
        spec.add_child(ScanSpec::new("x"));
        let mut replacement = ScanSpec::new("x");
        replacement.set_project_out(true);
        spec.add_child(replacement);
        assert_eq!(spec.children().len(), 1);
        assert!(spec.children()[0].project_out());
    }
}
