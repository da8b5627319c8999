use vibe_api::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds a status error from a non-2xx body, preferring the server's
    /// `message` over the raw text.
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|body| body.message)
            .unwrap_or_else(|_| body.trim().to_owned());
        Self::Status { status, message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefers_server_message() {
        let err = ClientError::status(404, r#"{"message":"Group not found"}"#);
        assert_eq!(err.to_string(), "404: Group not found");
        assert!(err.is_not_found());

        let err = ClientError::status(502, "bad gateway\n");
        assert_eq!(err.to_string(), "502: bad gateway");
        assert!(!err.is_not_found());
    }
}
