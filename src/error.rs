use thiserror::Error;

/// Errors surfaced by the generator registry, the session and the quiz store
#[derive(Debug, Error)]
pub enum QuizError {
    /// No generator is registered under the requested key
    #[error("generator '{0}' not found")]
    UnknownGenerator(String),

    /// Required quiz/question fields are missing or malformed
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record matches the requested id
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The persistence backend failed (database, serialization, I/O)
    #[error("storage failure: {0}")]
    Network(String),

    /// A session or editor transition that is not legal in the current state
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

pub type Result<T> = std::result::Result<T, QuizError>;

impl QuizError {
    pub fn validation(msg: impl Into<String>) -> Self {
        QuizError::Validation(msg.into())
    }

    pub fn quiz_not_found(id: impl Into<String>) -> Self {
        QuizError::NotFound {
            kind: "quiz",
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for QuizError {
    fn from(e: rusqlite::Error) -> Self {
        QuizError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(e: serde_json::Error) -> Self {
        QuizError::Network(format!("json: {e}"))
    }
}

impl From<std::io::Error> for QuizError {
    fn from(e: std::io::Error) -> Self {
        QuizError::Network(format!("io: {e}"))
    }
}

impl From<csv::Error> for QuizError {
    fn from(e: csv::Error) -> Self {
        QuizError::Network(format!("csv: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = QuizError::UnknownGenerator("warp-drive".into());
        assert_eq!(e.to_string(), "generator 'warp-drive' not found");

        let e = QuizError::quiz_not_found("abc");
        assert_eq!(e.to_string(), "quiz 'abc' not found");
    }

    #[test]
    fn io_errors_map_to_network() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let e: QuizError = io.into();
        assert!(matches!(e, QuizError::Network(ref m) if m.contains("disk gone")));
    }
}
