use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Invalid asset '{0}': expected a token address or 'native'")]
    InvalidAsset(String),
}

impl ConfigError {
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
