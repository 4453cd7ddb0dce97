//! Domain error types.

/// Top-level error type for sportstock.
#[derive(Debug, thiserror::Error)]
pub enum SportstockError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Asset not found: {id}")]
    AssetNotFound { id: String },

    #[error("invalid game date {value:?}: {reason}")]
    InvalidGameDate { value: String, reason: String },

    #[error("stats source error: {reason}")]
    Upstream { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SportstockError {
    pub fn asset_not_found(id: impl Into<String>) -> Self {
        SportstockError::AssetNotFound { id: id.into() }
    }
}

impl From<&SportstockError> for std::process::ExitCode {
    fn from(err: &SportstockError) -> Self {
        let code: u8 = match err {
            SportstockError::Io(_) => 1,
            SportstockError::ConfigParse { .. }
            | SportstockError::ConfigMissing { .. }
            | SportstockError::ConfigInvalid { .. } => 2,
            SportstockError::Database { .. } | SportstockError::DatabaseQuery { .. } => 3,
            SportstockError::AssetNotFound { .. } => 4,
            SportstockError::InvalidGameDate { .. } | SportstockError::Upstream { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
