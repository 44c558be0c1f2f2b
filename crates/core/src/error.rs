/// Result alias that carries the custom [`LowerThirdError`] type.
pub type Result<T> = std::result::Result<T, LowerThirdError>;

/// Common error type for the core crate.
///
/// The sequencer itself never fails; these variants only surface at the edges
/// where configuration files and bridge commands are read.
#[derive(Debug, thiserror::Error)]
pub enum LowerThirdError {
    /// Free-form message for failures without a more specific variant.
    #[error("{0}")]
    Message(String),
    /// Configuration values that cannot drive the sequencer.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A bridge line that could not be turned into a command.
    #[error("unrecognised command `{0}`")]
    Command(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a config file or template payload.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl LowerThirdError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for LowerThirdError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for LowerThirdError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
