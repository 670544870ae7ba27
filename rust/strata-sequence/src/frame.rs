//! Record batches of top-level fields.

use std::sync::Arc;

use strata_common::{Result, verify_arg};

use crate::sequence::Sequence;

/// A batch of records in columnar form: one [`Sequence`] per projected
/// top-level field, all of the same length.
pub struct Frame {
    pub field_names: Vec<Arc<str>>,
    /// Top-level field sequences. Each sequence has `len` entries.
    pub fields: Vec<Box<dyn Sequence>>,
    /// Number of logical records in this frame.
    pub len: usize,
}

impl Frame {
    /// Creates a new frame.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if names and fields differ in count or a
    /// field does not have `len` entries.
    pub fn try_new(
        field_names: Vec<Arc<str>>,
        fields: Vec<Box<dyn Sequence>>,
        len: usize,
    ) -> Result<Frame> {
        verify_arg!(field_names, field_names.len() == fields.len());
        verify_arg!(fields, fields.iter().all(|field| field.len() == len));
        Ok(Frame {
            field_names,
            fields,
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the field sequence named `name`.
    pub fn field(&self, name: &str) -> Option<&dyn Sequence> {
        self.field_names
            .iter()
            .position(|field| field.as_ref() == name)
            .map(|index| self.fields[index].as_ref())
    }
}

impl Clone for Frame {
    fn clone(&self) -> Self {
        Self {
            field_names: self.field_names.clone(),
            fields: self
                .fields
                .iter()
                .map(|field| field.clone_boxed())
                .collect(),
            len: self.len,
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("field_names", &self.field_names)
            .field("len", &self.len)
            .finish()
    }
}
