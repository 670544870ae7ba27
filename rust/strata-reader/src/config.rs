//! Reader configuration.

use strata_common::{Result, error::Error};

use crate::read::params::KeySelectionCallback;

/// Settings of a [`StripeRowReader`](crate::read::row_reader::StripeRowReader).
#[derive(Clone)]
pub struct ReaderConfig {
    /// Maximum number of rows per produced frame.
    pub batch_size: usize,

    /// Root of the hierarchical stream labels used for I/O accounting.
    pub stream_label_root: String,

    /// Receives key selection statistics from flat-map readers reached from
    /// the root through struct fields only. Flat maps inside a list or map
    /// do not report.
    pub key_selection_callback: Option<KeySelectionCallback>,
}

impl ReaderConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 1024;

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_stream_label_root(mut self, root: impl Into<String>) -> Self {
        self.stream_label_root = root.into();
        self
    }

    pub fn with_key_selection_callback(mut self, callback: KeySelectionCallback) -> Self {
        self.key_selection_callback = Some(callback);
        self
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `batch_size` is zero or the label root
    /// is empty.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::configuration("batch_size must be greater than zero"));
        }
        if self.stream_label_root.is_empty() {
            return Err(Error::configuration("stream_label_root must not be empty"));
        }
        Ok(())
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            stream_label_root: "/".to_string(),
            key_selection_callback: None,
        }
    }
}

impl std::fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("batch_size", &self.batch_size)
            .field("stream_label_root", &self.stream_label_root)
            .field(
                "key_selection_callback",
                &self.key_selection_callback.is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReaderConfig::default();
        assert_eq!(config.batch_size, 1024);
        assert_eq!(config.stream_label_root, "/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let err = ReaderConfig::default().with_batch_size(0).validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(
            ReaderConfig::default()
                .with_stream_label_root("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_builder_sets_callback() {
        let config = ReaderConfig::default()
            .with_batch_size(3)
            .with_key_selection_callback(Arc::new(|_stats| {}));
        assert!(config.key_selection_callback.is_some());
        assert!(format!("{config:?}").contains("batch_size: 3"));
    }
}
