use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Update error: {0}")]
    Update(String),

    #[error("Stats update error: {0}")]
    StatsUpdate(String),

    #[error("Not signed in. Run `shelf login` first")]
    NotSignedIn,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Selector(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
