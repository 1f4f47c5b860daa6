use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("could not determine data directory")]
    NoDataDir,

    #[error("session: {0}")]
    Session(#[from] pahviz::Error),

    #[error("protocol: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
