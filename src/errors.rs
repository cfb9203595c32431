use thiserror::Error;

#[derive(Debug, Error)]
pub enum OplogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Matcher error: {0}")]
    Matcher(String),

    #[error("Sorter error: {0}")]
    Sorter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl OplogError {
    /// The underlying message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Io(m)
            | Self::Matcher(m)
            | Self::Sorter(m)
            | Self::Config(m)
            | Self::Logging(m) => m.clone(),
            Self::Json(e) => e.to_string(),
            Self::Toml(e) => e.to_string(),
        }
    }
}

impl From<std::io::Error> for OplogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
