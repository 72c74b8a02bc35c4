use crate::MAX_COMMENT_LEN;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    /// Error reported by the server, either as an HTTP status or as an envelope status
    #[error("Server error {status}: {message}")]
    Server { status: i64, message: String },

    #[error("Permission denied")]
    PermissionDenied,

    #[error("You need to be logged in to do this")]
    Unauthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Comment is too long ({0} characters, at most {} allowed)", MAX_COMMENT_LEN)]
    CommentTooLong(usize),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Invalid user name {0:?}")]
    InvalidName(String),

    #[error("Password is too short")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid email address {0:?}")]
    InvalidEmail(String),

    #[error("Another request is still in progress")]
    Busy,
}

impl Error {
    /// Validation errors are caught before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyComment
                | Error::CommentTooLong(_)
                | Error::EmptyTitle
                | Error::EmptyContent
                | Error::InvalidName(_)
                | Error::PasswordTooShort
                | Error::PasswordMismatch
                | Error::InvalidEmail(_)
        )
    }

    /// Message to show the user: the server's own message when it sent one,
    /// `fallback` when the failure carries nothing useful
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            Error::Server { .. }
            | Error::Unknown(_)
            | Error::Network(_)
            | Error::MalformedResponse(_) => String::from(fallback),
            e => e.to_string(),
        }
    }

    /// Builds the error for a non-success HTTP response, keeping the
    /// backend's `message` field if it sent one
    pub fn from_response(status: u16, body: &[u8]) -> Error {
        match status {
            401 => Error::Unauthenticated,
            403 => Error::PermissionDenied,
            404 => Error::NotFound,
            _ => Error::Server {
                status: i64::from(status),
                message: serde_json::from_slice::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("message")?.as_str().map(String::from))
                    .unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_variants() {
        let body = br#"{"status": 403, "error": "Forbidden", "message": "admins only"}"#;
        assert_eq!(Error::from_response(403, body), Error::PermissionDenied);
        assert_eq!(Error::from_response(401, b"{}"), Error::Unauthenticated);
        // `type` is not an error tag
        let body = br#"{"type": "not-found", "message": "bad slug"}"#;
        assert_eq!(
            Error::from_response(400, body),
            Error::Server {
                status: 400,
                message: String::from("bad slug")
            }
        );
    }

    #[test]
    fn spring_error_bodies() {
        let body = br#"{"status": 500, "error": "Internal Server Error", "message": "boom"}"#;
        assert_eq!(
            Error::from_response(500, body),
            Error::Server {
                status: 500,
                message: String::from("boom")
            }
        );
        assert_eq!(Error::from_response(401, b""), Error::Unauthenticated);
        assert_eq!(Error::from_response(404, b"nope"), Error::NotFound);
    }

    #[test]
    fn user_messages() {
        let fallback = "Failed to post comment";
        let e = Error::Server {
            status: 101,
            message: String::from("Comments are closed"),
        };
        assert_eq!(e.user_message(fallback), "Comments are closed");
        let e = Error::Server {
            status: 500,
            message: String::new(),
        };
        assert_eq!(e.user_message(fallback), fallback);
        assert_eq!(Error::Network(String::from("dns")).user_message(fallback), fallback);
        assert_eq!(Error::EmptyComment.user_message(fallback), "Comment cannot be empty");
        assert!(Error::EmptyTitle.is_validation());
        assert!(!Error::NotFound.is_validation());
    }
}
