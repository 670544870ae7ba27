use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    /// A scan plan cannot be satisfied with the current column selection or
    /// projection, e.g. a mandatory container child was pruned away.
    pub fn configuration(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Configuration {
                message: message.into(),
            }
            .into(),
        )
    }

    /// The caller paired type trees or reader arguments that do not belong together.
    pub fn consistency(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Consistency {
                message: message.into(),
            }
            .into(),
        )
    }

    /// A stream or encoding descriptor expected by the reader is absent from the stripe.
    pub fn missing_resource(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::MissingResource {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(name: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: Default::default(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn not_implemented(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::NotImplemented {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration { .. })
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self.kind(), ErrorKind::Consistency { .. })
    }

    pub fn is_missing_resource(&self) -> bool {
        matches!(self.kind(), ErrorKind::MissingResource { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("consistency check failed: {message}")]
    Consistency { message: String },

    #[error("missing '{element}': {message}")]
    MissingResource { element: String, message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("not yet implemented: {message}")]
    NotImplemented { message: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::configuration("x").is_configuration());
        assert!(Error::consistency("x").is_consistency());
        assert!(Error::missing_resource("stream", "x").is_missing_resource());
        assert!(!Error::invalid_format("x").is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = Error::configuration("map value (node 9) must be selected");
        assert_eq!(
            err.to_string(),
            "configuration error: map value (node 9) must be selected"
        );
        let err = Error::missing_resource("stream 7:0:Length", "not found in stripe");
        assert_eq!(
            err.to_string(),
            "missing 'stream 7:0:Length': not found in stripe"
        );
    }
}
