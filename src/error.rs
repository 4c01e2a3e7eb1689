use thiserror::Error;

#[derive(Error, Debug)]
pub enum RackboardError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RackboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_kind_and_id() {
        let err = RackboardError::NotFound {
            kind: "server",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "server not found: abc");
    }
}
