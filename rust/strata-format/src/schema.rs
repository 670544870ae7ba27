//! Type trees describing the logical layout of a stripe.
//!
//! A [`Type`] is an id-less description of a column type, used to declare
//! schemas. [`TypeWithId::create`] turns it into an immutable tree whose nodes
//! carry the stable pre-order node ids that the stripe streams are keyed by.
//! The same structure is used for both the on-disk (file) tree and the
//! query-facing (requested) tree; the two are paired node-by-node by id.

use std::sync::Arc;

use strata_common::{Result, error::Error};

/// The kind of a type tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Binary,
    Timestamp,
    List,
    Map,
    Struct,
}

impl TypeKind {
    /// Returns the lowercase name used in error messages and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Boolean => "boolean",
            TypeKind::Byte => "tinyint",
            TypeKind::Short => "smallint",
            TypeKind::Int => "int",
            TypeKind::Long => "bigint",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Binary => "binary",
            TypeKind::Timestamp => "timestamp",
            TypeKind::List => "list",
            TypeKind::Map => "map",
            TypeKind::Struct => "struct",
        }
    }

    /// Returns `true` for the container kinds (`List`, `Map`, `Struct`).
    pub fn is_container(&self) -> bool {
        matches!(self, TypeKind::List | TypeKind::Map | TypeKind::Struct)
    }

    /// Returns `true` for the repeated container kinds (`List`, `Map`).
    pub fn is_repeated(&self) -> bool {
        matches!(self, TypeKind::List | TypeKind::Map)
    }

    /// Fixed width in bytes of a single value of this kind, if it has one.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            TypeKind::Boolean | TypeKind::Byte => Some(1),
            TypeKind::Short => Some(2),
            TypeKind::Int | TypeKind::Float => Some(4),
            TypeKind::Long | TypeKind::Double | TypeKind::Timestamp => Some(8),
            _ => None,
        }
    }

    /// Returns `true` if a column stored as `self` can be read as `requested`.
    ///
    /// Besides identical kinds, integers may be widened (`tinyint` up to
    /// `bigint`) and `float` may be read as `double`.
    pub fn can_read_as(&self, requested: TypeKind) -> bool {
        if *self == requested {
            return true;
        }
        match (self.integer_rank(), requested.integer_rank()) {
            (Some(file), Some(req)) => file <= req,
            _ => *self == TypeKind::Float && requested == TypeKind::Double,
        }
    }

    fn integer_rank(&self) -> Option<u8> {
        match self {
            TypeKind::Byte => Some(0),
            TypeKind::Short => Some(1),
            TypeKind::Int => Some(2),
            TypeKind::Long => Some(3),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An id-less type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    kind: TypeKind,
    fields: Vec<(Arc<str>, Type)>,
}

impl Type {
    /// Name of the single child of a list type.
    pub const LIST_ITEM: &'static str = "item";
    /// Name of the first child of a map type.
    pub const MAP_KEY: &'static str = "key";
    /// Name of the second child of a map type.
    pub const MAP_VALUE: &'static str = "value";

    /// Creates a primitive (childless) type.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a container kind.
    pub fn primitive(kind: TypeKind) -> Type {
        assert!(!kind.is_container(), "{kind} is not a primitive kind");
        Type {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn list(item: Type) -> Type {
        Type {
            kind: TypeKind::List,
            fields: vec![(Self::LIST_ITEM.into(), item)],
        }
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type {
            kind: TypeKind::Map,
            fields: vec![(Self::MAP_KEY.into(), key), (Self::MAP_VALUE.into(), value)],
        }
    }

    pub fn structure<N: Into<Arc<str>>>(fields: impl IntoIterator<Item = (N, Type)>) -> Type {
        Type {
            kind: TypeKind::Struct,
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn fields(&self) -> &[(Arc<str>, Type)] {
        &self.fields
    }

    /// Total number of nodes in this type tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .fields
            .iter()
            .map(|(_, ty)| ty.node_count())
            .sum::<usize>()
    }
}

/// A node of an immutable type tree annotated with stable node ids.
///
/// Ids are assigned in pre-order: a node's id is smaller than the ids of all
/// its descendants, and `max_id` is the largest id in its subtree.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeWithId {
    id: u32,
    max_id: u32,
    kind: TypeKind,
    names: Vec<Arc<str>>,
    children: Vec<Arc<TypeWithId>>,
}

impl TypeWithId {
    /// Annotates `ty` with pre-order ids starting at zero.
    pub fn create(ty: &Type) -> Arc<TypeWithId> {
        Self::create_at(ty, 0)
    }

    /// Annotates `ty` with pre-order ids starting at `first_id`.
    ///
    /// Useful for describing a subtree of a larger file schema.
    pub fn create_at(ty: &Type, first_id: u32) -> Arc<TypeWithId> {
        let mut next_id = first_id;
        Self::annotate(ty, &mut next_id)
    }

    fn annotate(ty: &Type, next_id: &mut u32) -> Arc<TypeWithId> {
        let id = *next_id;
        *next_id += 1;
        let mut names = Vec::with_capacity(ty.fields.len());
        let mut children = Vec::with_capacity(ty.fields.len());
        for (name, child) in &ty.fields {
            names.push(name.clone());
            children.push(Self::annotate(child, next_id));
        }
        Arc::new(TypeWithId {
            id,
            max_id: *next_id - 1,
            kind: ty.kind,
            names,
            children,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn children(&self) -> &[Arc<TypeWithId>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the child at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the node has fewer than `index + 1` children.
    pub fn child_at(&self, index: usize) -> Result<&Arc<TypeWithId>> {
        self.children.get(index).ok_or_else(|| {
            Error::invalid_arg(
                "index",
                format!(
                    "{} node {} has {} children, requested child {index}",
                    self.kind,
                    self.id,
                    self.children.len()
                ),
            )
        })
    }

    /// Returns the field name of the child at `index`.
    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|name| name.as_ref())
    }

    /// Returns `true` if `id` belongs to this subtree.
    pub fn contains(&self, id: u32) -> bool {
        (self.id..=self.max_id).contains(&id)
    }

    /// Locates a node anywhere in this subtree by its id.
    pub fn find(&self, id: u32) -> Option<&TypeWithId> {
        if id == self.id {
            return Some(self);
        }
        self.children
            .iter()
            .find(|child| child.contains(id))
            .and_then(|child| child.find(id))
    }

    /// Returns the ids of the nodes on the path from this node down to `id`,
    /// both ends included, or an empty vector if `id` is not in this subtree.
    pub fn path_to(&self, id: u32) -> Vec<u32> {
        let mut path = Vec::new();
        let mut node = self;
        while node.contains(id) {
            path.push(node.id);
            if node.id == id {
                break;
            }
            match node.children.iter().find(|child| child.contains(id)) {
                Some(child) => node = child,
                None => break,
            }
        }
        path
    }
}

impl std::fmt::Display for TypeWithId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TypeKind::List => write!(f, "list<{}>", self.children[0]),
            TypeKind::Map => write!(f, "map<{},{}>", self.children[0], self.children[1]),
            TypeKind::Struct => {
                f.write_str("struct<")?;
                for (i, child) in self.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", self.names[i], child)?;
                }
                f.write_str(">")
            }
            kind => f.write_str(kind.name()),
        }
    }
}
