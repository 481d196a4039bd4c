use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("notify api error: {0}")]
    Api(String),

    #[error("invalid event: {0}")]
    Event(String),

    #[error("queue error: {0}")]
    Queue(String),
}
