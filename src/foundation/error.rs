pub type ShoutResult<T> = Result<T, ShoutError>;

/// Error taxonomy shared by the render core, the stream loop and the HTTP glue.
#[derive(thiserror::Error, Debug)]
pub enum ShoutError {
    /// Admission denied: every stream slot is taken. Retryable by the client.
    #[error("capacity exceeded: {max} concurrent streams already active")]
    CapacityExceeded {
        /// Configured stream capacity at the time of rejection.
        max: usize,
    },

    /// Neither the requested font nor the default font is loaded.
    #[error("no fonts loaded")]
    NoFontsLoaded,

    /// The render function was invoked without a font cache.
    #[error("font cache is not available")]
    NoCache,

    /// Glyph generation failed for a resolved font.
    #[error("render error: {0}")]
    Render(String),

    /// A request option is outside its accepted range.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Configuration failed to load or validate.
    #[error("config error: {0}")]
    Config(String),

    /// Underlying I/O failure outside a stream body.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Anything else, with its context chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShoutError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Client-side mistakes (bad options) as opposed to overload or bugs.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidOption(_))
    }
}
