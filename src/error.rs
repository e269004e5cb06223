use thiserror::Error;

/// Errors raised while building a simulation. Per-tick operations never fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("species catalog is not valid JSON: {0}")]
    Catalog(#[source] serde_json::Error),

    #[error("species catalog contains no species")]
    EmptyCatalog,

    #[error("simulation config is not valid JSON: {0}")]
    Config(#[source] serde_json::Error),

    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("unknown species id '{0}'")]
    UnknownSpecies(String),
}

pub type SimResult<T> = Result<T, SimError>;
