//! The core abstraction for decoded column data.
//!
//! [`Sequence`] is implemented by every decoded batch, primitive or nested,
//! so readers can hand results up the reader tree as `Box<dyn Sequence>` and
//! callers can downcast to the concrete representation they expect.

use std::any::Any;

use strata_format::schema::TypeKind;

pub use super::value_sequence::ValueSequence;

/// A sequence of values of a single logical type.
pub trait Sequence: Send + Sync + 'static {
    /// Returns a reference to this sequence as a type-erased `Any` trait object.
    ///
    /// Enables dynamic downcasting to concrete sequence types.
    fn as_any(&self) -> &(dyn Any + Send + Sync + 'static);

    /// Converts the boxed sequence into a boxed `Any`.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync + 'static>;

    /// Creates a deep copy of this sequence.
    fn clone_boxed(&self) -> Box<dyn Sequence>;

    /// Returns the logical type of the values in this sequence.
    fn kind(&self) -> TypeKind;

    /// Returns the number of value slots, null or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl dyn Sequence {
    /// Downcasts to a concrete sequence type.
    pub fn downcast_ref<T: Sequence>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts the boxed sequence, giving it back unchanged on type mismatch.
    pub fn downcast<T: Sequence>(self: Box<Self>) -> std::result::Result<Box<T>, Box<dyn Sequence>> {
        if self.as_any().is::<T>() {
            self.into_any()
                .downcast::<T>()
                .map_err(|_| unreachable!("type checked above"))
        } else {
            Err(self)
        }
    }
}
