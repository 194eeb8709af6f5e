use serde::{Deserialize, Serialize};

/// Error body returned by UseCase endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
}

impl UseCaseError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new("AUTH_ERROR", message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new("FETCH_ERROR", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for UseCaseError {}

impl From<anyhow::Error> for UseCaseError {
    fn from(err: anyhow::Error) -> Self {
        UseCaseError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = UseCaseError::fetch("Flipkart search failed");
        assert_eq!(err.to_string(), "[FETCH_ERROR] Flipkart search failed");
    }

    #[test]
    fn test_json_body_has_code_and_message() {
        let json = serde_json::to_value(UseCaseError::auth("bad token")).unwrap();
        assert_eq!(json["code"], "AUTH_ERROR");
        assert_eq!(json["message"], "bad token");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
