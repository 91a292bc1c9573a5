//! Engine error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The engine was set up wrong. Raised while constructing or registering.
    Configuration,
    /// The form the engine should bind to does not exist.
    NotFound,
    /// A message had to be rendered but the field has nowhere to render it.
    StatusTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No form name was given in the options.
    #[error("form name needed")]
    MissingFormName,

    /// No form with the given name exists in the document.
    #[error("form '{0}' not found")]
    FormNotFound(String),

    /// A field named in a registration has no input in the form.
    #[error("input '{field}' not found in form '{form}'")]
    FieldNotFound {
        /// The field name.
        field: String,
        /// The form name.
        form: String,
    },

    /// A lifecycle was registered without a validator.
    #[error("missing validate capability on input '{0}'")]
    MissingValidate(String),

    /// A field name was registered twice.
    #[error("input '{0}' is already registered")]
    DuplicateField(String),

    /// A lifecycle declared a status target that does not exist.
    #[error("status target '{target}' for input '{field}' not found")]
    StatusTargetNotFound {
        /// The field name.
        field: String,
        /// The declared element id.
        target: String,
    },

    /// A message was rendered for a field without a status target.
    #[error("no status target for input '{0}'")]
    StatusTarget(String),

    /// An operation named a field that was never registered.
    #[error("input '{0}' is not registered")]
    UnknownField(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FormNotFound(_) => ErrorKind::NotFound,
            Self::StatusTarget(_) => ErrorKind::StatusTarget,
            Self::MissingFormName
            | Self::FieldNotFound { .. }
            | Self::MissingValidate(_)
            | Self::DuplicateField(_)
            | Self::StatusTargetNotFound { .. }
            | Self::UnknownField(_) => ErrorKind::Configuration,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
