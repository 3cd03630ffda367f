use custdev_core::persona::UnknownPersonaClass;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("survey {0} not found")]
    SurveyNotFound(i64),

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("stored segment has {0}")]
    PersonaClass(#[from] UnknownPersonaClass),

    #[error("{0}")]
    Other(String),
}
