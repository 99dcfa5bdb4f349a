use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenError>;

/// Everything that can abort a generation batch or an export.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not load 5e.tools data from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not load 5e.tools data from {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Could not send prompt to AI client: {0}")]
    Completion(#[source] anyhow::Error),

    #[error("Input error: {0}")]
    Validation(String),

    #[error("No eligible {0} in the dataset")]
    EmptyPool(&'static str),

    #[error("Nothing to save: {0}")]
    NothingToSave(String),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize characters: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenError {
    /// Heading shown to the user above the message.
    pub fn title(&self) -> &'static str {
        if self.is_network() {
            return "Network Error";
        }
        match self {
            GenError::Configuration(_) => "Configuration Error",
            GenError::Validation(_) => "Input Error",
            GenError::EmptyPool(_) => "Dataset Error",
            GenError::NothingToSave(_) => "Nothing to Save",
            _ => "Save Error",
        }
    }

    /// Dataset and completion failures; the caller reports these as network errors.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            GenError::Network { .. } | GenError::Status { .. } | GenError::Completion(_)
        )
    }
}
