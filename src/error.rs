use thiserror::Error;

/// Errors raised while bringing up or configuring a window session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("platform initialization failed: {0}")]
    BackendInit(String),

    #[error("window creation failed: {0}")]
    WindowCreation(String),

    #[error("graphics context unavailable: {0}")]
    GraphicsContext(String),

    #[error("icon could not be loaded: {0}")]
    Icon(#[from] image::ImageError),

    #[error("icon rejected by the platform: {0}")]
    BadIcon(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window session already destroyed")]
    Destroyed,
}

pub type SessionResult<T> = Result<T, SessionError>;
