use thiserror::Error;

pub type Result<T, E = DictionaryError> = core::result::Result<T, E>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("value {0:?} has no trigger phrases")]
    NoTriggers(String),
    #[error("value {0:?} has an empty trigger phrase")]
    EmptyTrigger(String),
    #[error("value {0:?} is defined more than once")]
    DuplicateValue(String),
}
