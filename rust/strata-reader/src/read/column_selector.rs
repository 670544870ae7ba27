//! The authoritative "is this file column requested" predicate.

use strata_common::{Result, error::Error};
use strata_format::schema::TypeWithId;

/// Set of file node ids selected for reading.
///
/// Selecting a node implies its ancestors (needed to reach it) and its whole
/// subtree. Siblings of a selected node stay unselected unless named too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    selected: Vec<bool>,
}

impl ColumnSelector {
    /// Selects every node of `root`.
    pub fn all(root: &TypeWithId) -> ColumnSelector {
        ColumnSelector {
            selected: vec![true; root.max_id() as usize + 1],
        }
    }

    /// Selects the nodes with the given ids, their ancestors and descendants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if an id does not belong to `root`.
    pub fn only(root: &TypeWithId, ids: impl IntoIterator<Item = u32>) -> Result<ColumnSelector> {
        let mut selected = vec![false; root.max_id() as usize + 1];
        for id in ids {
            let node = root.find(id).ok_or_else(|| {
                Error::invalid_arg(
                    "ids",
                    format!("node {id} is not part of the schema {root}"),
                )
            })?;
            for ancestor in root.path_to(id) {
                selected[ancestor as usize] = true;
            }
            selected[node.id() as usize..=node.max_id() as usize].fill(true);
        }
        Ok(ColumnSelector { selected })
    }

    /// Returns `true` if the node with the given file id is selected.
    pub fn should_read_node(&self, id: u32) -> bool {
        self.selected.get(id as usize).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use strata_format::schema::{Type, TypeKind};

    use super::*;

    fn schema() -> std::sync::Arc<TypeWithId> {
        // 0 struct, 1 id, 2 tags (list), 3 tag, 4 attrs (map), 5 key, 6 value
        TypeWithId::create(&Type::structure([
            ("id", Type::primitive(TypeKind::Long)),
            ("tags", Type::list(Type::primitive(TypeKind::String))),
            (
                "attrs",
                Type::map(
                    Type::primitive(TypeKind::String),
                    Type::primitive(TypeKind::Int),
                ),
            ),
        ]))
    }

    #[test]
    fn test_all() {
        let selector = ColumnSelector::all(&schema());
        assert!((0..=6).all(|id| selector.should_read_node(id)));
        assert!(!selector.should_read_node(7));
    }

    fn selected_ids(selector: &ColumnSelector) -> Vec<u32> {
        (0..=6).filter(|&id| selector.should_read_node(id)).collect()
    }

    #[test]
    fn test_only_adds_ancestors_and_descendants() {
        let root = schema();
        let selector = ColumnSelector::only(&root, [2]).unwrap();
        assert_eq!(selected_ids(&selector), vec![0, 2, 3]);

        let selector = ColumnSelector::only(&root, [5]).unwrap();
        assert_eq!(selected_ids(&selector), vec![0, 4, 5]);
        assert!(!selector.should_read_node(6));
    }

    #[test]
    fn test_only_rejects_unknown_ids() {
        assert!(ColumnSelector::only(&schema(), [42]).is_err());
    }
}
