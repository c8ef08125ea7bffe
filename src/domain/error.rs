use thiserror::Error;

/// Boxed error type used at collaborator seams (callables, adapter factories)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the call cache, its key generator and the adapter registry
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid callable: {message}")]
    InvalidCallable { message: String },

    #[error("Unknown callable: {name}")]
    UnknownCallable { name: String },

    #[error("Invalid adapter '{name}': {message}")]
    InvalidAdapter { name: String, message: String },

    #[error("Storage backend '{name}' is unavailable: {source}")]
    BackendUnavailable {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Unknown storage backend: {name}")]
    UnknownBackend { name: String },

    #[error("Failed to write cache entry '{key}': {message}")]
    StorageWrite { key: String, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to write side output: {0}")]
    Output(#[source] std::io::Error),

    /// Failure raised by the wrapped callable, passed through untouched
    #[error(transparent)]
    Callback(BoxError),
}

impl CacheError {
    pub fn invalid_callable(message: impl Into<String>) -> Self {
        Self::InvalidCallable {
            message: message.into(),
        }
    }

    pub fn unknown_callable(name: impl Into<String>) -> Self {
        Self::UnknownCallable { name: name.into() }
    }

    pub fn invalid_adapter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAdapter {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn backend_unavailable(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::BackendUnavailable {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn unknown_backend(name: impl Into<String>) -> Self {
        Self::UnknownBackend { name: name.into() }
    }

    pub fn storage_write(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageWrite {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn callback(source: impl Into<BoxError>) -> Self {
        Self::Callback(source.into())
    }

    /// True for errors raised while validating input, before any side effect
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCallable { .. } | Self::UnknownCallable { .. } | Self::InvalidAdapter { .. }
        )
    }

    /// Returns the wrapped callable's own error, if this is one
    pub fn into_callback_error(self) -> Option<BoxError> {
        match self {
            Self::Callback(source) => Some(source),
            _ => None,
        }
    }
}
