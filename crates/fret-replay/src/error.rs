use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("unknown key code: {0}")]
    UnknownKey(i32),

    #[error("invalid key input data: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
