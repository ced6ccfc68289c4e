/// Crate-wide result alias.
pub type LumyteResult<T> = Result<T, LumyteError>;

/// Error type shared by the engine, broker client, and transport.
#[derive(thiserror::Error, Debug)]
pub enum LumyteError {
    /// A movie or configuration value failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A screenplay entry or tween track could not be compiled.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// A peer sent something that does not fit the wire or broker protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O failure on the broker connection.
    #[error("broker i/o error: {0}")]
    Broker(#[source] std::io::Error),

    /// I/O failure on the raw Ethernet link.
    #[error("link i/o error: {0}")]
    Link(#[source] std::io::Error),

    /// Ambient light sensor failure.
    #[error("sensor error: {0}")]
    Sensor(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LumyteError {
    /// Build a [`LumyteError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LumyteError::Timeline`].
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`LumyteError::Protocol`].
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Build a [`LumyteError::Broker`] from an I/O error.
    pub fn broker(err: std::io::Error) -> Self {
        Self::Broker(err)
    }

    /// Build a [`LumyteError::Link`] from an I/O error.
    pub fn link(err: std::io::Error) -> Self {
        Self::Link(err)
    }

    /// Build a [`LumyteError::Sensor`].
    pub fn sensor(msg: impl Into<String>) -> Self {
        Self::Sensor(msg.into())
    }

    /// Whether the error is a broker-side I/O failure that a reconnect
    /// could clear.
    pub fn is_broker_io(&self) -> bool {
        matches!(self, Self::Broker(_))
    }
}

// Lets embedded-graphics draw calls (whose error type on the canvas is
// `Infallible`) compose with `?` in routines returning `LumyteResult`.
impl From<core::convert::Infallible> for LumyteError {
    fn from(err: core::convert::Infallible) -> Self {
        match err {}
    }
}
