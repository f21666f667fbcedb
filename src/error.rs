use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("no categories declared")]
    EmptyCategories,
    #[error("question #{question} has no answers")]
    QuestionWithoutAnswers { question: usize },
    #[error("answer #{answer} of question #{question} references unknown category '{key}'")]
    UnknownCategory {
        question: usize,
        answer: usize,
        key: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SUPPORT_CHAT_ID must be an integer, got '{0}'")]
    InvalidSupportChat(String),
    #[error(transparent)]
    InvalidWebhookUrl(#[from] url::ParseError),
    #[error("NGROK_ADDR can't be parsed: {0}")]
    InvalidWebhookAddr(#[from] std::net::AddrParseError),
}
