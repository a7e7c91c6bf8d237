/// Shown when neither the server nor the transport produced a usable message.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while executing the automation. Please try again.";

/// What went wrong underneath a [`RequestFailure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The request exceeded the configured timeout; no response arrived.
    Timeout,
    /// Connection refused, DNS failure, or a broken body stream.
    Transport,
    /// The service answered with a non-2xx status.
    Status { status: u16, detail: Option<String> },
    /// The body was not valid JSON or not a recognisable response.
    Decode,
    /// The call task ended without producing an answer (it panicked).
    Aborted,
}

/// Every failure of a single agent round trip, normalised to one shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.display_message())]
pub struct RequestFailure {
    pub message: String,
    pub cause: FailureCause,
}

impl RequestFailure {
    pub fn timeout() -> Self {
        Self {
            message: String::new(),
            cause: FailureCause::Timeout,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: FailureCause::Transport,
        }
    }

    pub fn status(status: u16, detail: Option<String>) -> Self {
        Self {
            message: format!("Request failed with status code {status}"),
            cause: FailureCause::Status { status, detail },
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: FailureCause::Decode,
        }
    }

    pub fn aborted() -> Self {
        Self {
            message: String::new(),
            cause: FailureCause::Aborted,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match &self.cause {
            FailureCause::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }

    /// Server detail first, then the transport message, then the generic fallback.
    pub fn resolved_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        if !self.message.trim().is_empty() {
            return self.message.clone();
        }
        GENERIC_FAILURE_MESSAGE.to_string()
    }

    fn display_message(&self) -> String {
        match &self.cause {
            FailureCause::Timeout => "request timed out".to_string(),
            FailureCause::Status { status, .. } => {
                format!("{} (status {})", self.resolved_message(), status)
            }
            _ => self.resolved_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn display_reflects_the_cause() {
        assert_eq!(RequestFailure::timeout().to_string(), "request timed out");
        assert_eq!(
            RequestFailure::status(500, Some("rate limited".to_string())).to_string(),
            "rate limited (status 500)"
        );
        assert_eq!(
            RequestFailure::transport("connection refused").to_string(),
            "connection refused"
        );
        assert_eq!(RequestFailure::aborted().to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn failure_is_a_std_error_and_converts() {
        let failure = RequestFailure::status(502, None);
        let as_error: &dyn std::error::Error = &failure;
        assert_eq!(as_error.to_string(), "Request failed with status code 502 (status 502)");

        let wrapped: Error = failure.into();
        assert!(matches!(wrapped, Error::Request(_)));
        assert_eq!(
            wrapped.to_string(),
            "request failed: Request failed with status code 502 (status 502)"
        );
    }
}
