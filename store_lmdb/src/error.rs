use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database '{0}' does not exist")]
    MissingDatabase(&'static str),

    #[error("{0} index digest collision")]
    DigestCollision(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for wicket_store::StoreError {
    fn from(e: LmdbError) -> Self {
        use wicket_store::StoreError;
        match e {
            LmdbError::NotFound(key) => StoreError::NotFound(key),
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            LmdbError::MissingDatabase(_) => StoreError::SchemaMissing(e.to_string()),
            LmdbError::Io(_) => StoreError::Unavailable(e.to_string()),
            LmdbError::Heed(_) | LmdbError::DigestCollision(_) => {
                StoreError::Backend(e.to_string())
            }
        }
    }
}
