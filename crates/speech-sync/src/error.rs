#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Env(#[from] envy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
