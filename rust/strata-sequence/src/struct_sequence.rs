//! A sequence representing `struct` column data.

use std::sync::Arc;

use strata_common::{Result, verify_arg};
use strata_format::schema::TypeKind;

use crate::{presence::Presence, sequence::Sequence};

/// A sequence representing `struct` column data with named fields.
///
/// Field sequences hold one entry per non-null struct row.
pub struct StructSequence {
    pub field_names: Vec<Arc<str>>,
    pub fields: Vec<Box<dyn Sequence>>,
    /// Presence information indicating which struct values (rows) are null.
    pub presence: Presence,
}

impl StructSequence {
    /// Creates a new struct sequence with validation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if names and fields differ in count or a
    /// field length differs from the number of non-null rows.
    pub fn try_new(
        field_names: Vec<Arc<str>>,
        fields: Vec<Box<dyn Sequence>>,
        presence: Presence,
    ) -> Result<StructSequence> {
        verify_arg!(field_names, field_names.len() == fields.len());
        let non_nulls = presence.count_non_nulls();
        verify_arg!(fields, fields.iter().all(|field| field.len() == non_nulls));
        Ok(StructSequence {
            field_names,
            fields,
            presence,
        })
    }

    /// Returns the field sequence named `name`.
    pub fn field(&self, name: &str) -> Option<&dyn Sequence> {
        self.field_names
            .iter()
            .position(|field| field.as_ref() == name)
            .map(|index| self.fields[index].as_ref())
    }
}

impl Clone for StructSequence {
    fn clone(&self) -> Self {
        Self {
            field_names: self.field_names.clone(),
            fields: self
                .fields
                .iter()
                .map(|field| field.clone_boxed())
                .collect(),
            presence: self.presence.clone(),
        }
    }
}

impl Sequence for StructSequence {
    fn as_any(&self) -> &(dyn std::any::Any + Send + Sync + 'static) {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any + Send + Sync + 'static> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Sequence> {
        Box::new(self.clone())
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Struct
    }

    fn len(&self) -> usize {
        self.presence.len()
    }
}
