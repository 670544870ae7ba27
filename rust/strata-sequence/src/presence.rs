//! Validity of the values in a sequence.

/// Validity of the values in a sequence.
///
/// Three storage methods are used for tracking null/non-null values:
/// - `Trivial`: all values are valid (non-null)
/// - `Nulls`: all values are null
/// - `Bytes`: mixed values, one byte per value (`1` - present, `0` - null)
#[derive(Debug, Clone)]
pub enum Presence {
    /// All values are valid (present).
    Trivial(usize),

    /// All values are null.
    Nulls(usize),

    /// One byte per value, non-zero when the value is present.
    Bytes(Vec<u8>),
}

impl Presence {
    /// Builds the most compact presence for the given flags.
    pub fn from_flags(present: &[bool]) -> Presence {
        if present.iter().all(|&p| p) {
            Presence::Trivial(present.len())
        } else if !present.is_empty() && present.iter().all(|&p| !p) {
            Presence::Nulls(present.len())
        } else {
            Presence::Bytes(present.iter().map(|&p| u8::from(p)).collect())
        }
    }

    /// Returns the number of values tracked, null or not.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Trivial(len) | Self::Nulls(len) => *len,
            Self::Bytes(presence) => presence.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_nulls(&self) -> usize {
        self.len() - self.count_non_nulls()
    }

    pub fn count_non_nulls(&self) -> usize {
        match self {
            Self::Trivial(len) => *len,
            Self::Nulls(_) => 0,
            Self::Bytes(presence) => presence.iter().filter(|&&b| b != 0).count(),
        }
    }

    /// Returns `true` if the value at `index` is null.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds of a `Bytes` presence.
    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        match self {
            Self::Trivial(_) => true,
            Self::Nulls(_) => false,
            Self::Bytes(presence) => presence[index] != 0,
        }
    }

    pub fn push_null(&mut self) {
        self.extend_with_nulls(1);
    }

    pub fn push_non_null(&mut self) {
        self.extend_with_non_nulls(1);
    }

    pub fn extend_with_nulls(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if let Self::Nulls(len) = self {
            *len += count;
        } else if self.is_empty() {
            *self = Self::Nulls(count);
        } else {
            let new_len = self.len() + count;
            self.bytes_mut().resize(new_len, 0);
        }
    }

    pub fn extend_with_non_nulls(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        if let Self::Trivial(len) = self {
            *len += count;
        } else if self.is_empty() {
            *self = Self::Trivial(count);
        } else {
            let new_len = self.len() + count;
            self.bytes_mut().resize(new_len, 1);
        }
    }

    /// Keeps only the positions whose `mask` flag is set.
    ///
    /// # Panics
    ///
    /// Panics if `mask` is shorter than the presence.
    pub fn select(&self, mask: &[bool]) -> Presence {
        assert!(mask.len() >= self.len());
        let kept = mask[..self.len()].iter().filter(|&&m| m).count();
        match self {
            Self::Trivial(_) => Self::Trivial(kept),
            Self::Nulls(_) => Self::Nulls(kept),
            Self::Bytes(bytes) => Self::Bytes(
                bytes
                    .iter()
                    .zip(mask)
                    .filter_map(|(&b, &m)| m.then_some(b))
                    .collect(),
            ),
        }
    }

    fn bytes_mut(&mut self) -> &mut Vec<u8> {
        if let Self::Trivial(len) = *self {
            *self = Self::Bytes(vec![1; len]);
        } else if let Self::Nulls(len) = *self {
            *self = Self::Bytes(vec![0; len]);
        }
        match self {
            Self::Bytes(bytes) => bytes,
            _ => unreachable!("presence was just converted to bytes"),
        }
    }
}

impl PartialEq for Presence {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (0..self.len()).all(|i| self.is_valid(i) == other.is_valid(i))
    }
}

impl Default for Presence {
    fn default() -> Self {
        Presence::Trivial(0)
    }
}
