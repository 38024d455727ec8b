use thiserror::Error;

/// Errors raised while resolving an episode into playable streams.
///
/// Most of these are local to one server: the pipeline catches them at the
/// server boundary and moves on. Only a failure to get the anime id, the
/// episode list, or the server list reaches the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The token oracle had nothing for this id (null/blank result, or the
    /// oracle request itself failed).
    #[error("token unavailable for {id}: {reason}")]
    TokenUnavailable { id: String, reason: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Upstream answered with a non-2xx status.
    #[error("upstream returned {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// A response did not have the expected shape.
    #[error("failed to decode {what}: {reason}")]
    DecodeFailure { what: &'static str, reason: String },

    /// The iframe url has no path segment to use as a media token.
    #[error("no media token in iframe url: {0}")]
    MalformedIframeUrl(String),

    /// The media endpoint returned a null token.
    #[error("media token unavailable for {0}")]
    MediaTokenUnavailable(String),

    /// The anime page carried no id.
    #[error("anime id not found on {0}")]
    AnimeIdNotFound(String),
}

impl ResolveError {
    pub(crate) fn decode(what: &'static str, reason: impl ToString) -> Self {
        ResolveError::DecodeFailure {
            what,
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ResolveError::HttpStatus {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            },
            None => ResolveError::NetworkFailure(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_input() {
        let err = ResolveError::TokenUnavailable {
            id: "c4S88Q".into(),
            reason: "null result".into(),
        };
        assert_eq!(err.to_string(), "token unavailable for c4S88Q: null result");

        let err = ResolveError::MalformedIframeUrl("https://megaup.cc/".into());
        assert!(err.to_string().contains("https://megaup.cc/"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolveError>();
    }
}
