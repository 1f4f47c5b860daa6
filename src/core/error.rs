use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Hover/click on an id that is not a region, loss marker or live prototype.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The same key appeared twice in one desired entity list.
    #[error("duplicate key {key:?} in {layer} layer")]
    DuplicateKey { layer: &'static str, key: String },

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
