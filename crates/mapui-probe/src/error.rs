use mapui_placement::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeCliError>;

#[derive(Debug, Error)]
pub enum ProbeCliError {
    #[error("invalid argument: {message}")]
    Usage { message: String },

    #[error("config error: {0}")]
    Config(ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeCliError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } => 2,
            Self::Config(_) => 3,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }

    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for ProbeCliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Io(io) => Self::Io(io),
            other => Self::Config(other),
        }
    }
}
