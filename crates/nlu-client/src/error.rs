use thiserror::Error;

pub type Result<T, E = NluError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum NluError {
    #[error("received empty project ({project:?}) or session ({session:?})")]
    MissingSession { project: String, session: String },
    #[error("could not obtain access token: {0}")]
    Token(String),
    #[error("http request failed: {0}")]
    Http(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("could not decode NLU response: {0}")]
    Decode(String),
    #[error("backend not supported: {0}")]
    Unsupported(String),
    #[error("scripted failure: {0}")]
    Scripted(String),
}
