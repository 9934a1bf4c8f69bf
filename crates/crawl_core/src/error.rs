use std::fmt;

use thiserror::Error;

/// Why a remote call did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// A newer request on the same channel superseded this one.
    Cancelled,
    /// Non-success HTTP status.
    HttpStatus(u16),
    Timeout,
    Network,
    /// The response body did not have the expected shape.
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "request superseded")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }

    /// 409: the URL has already been analyzed.
    pub fn is_conflict(&self) -> bool {
        self.kind == FailureKind::HttpStatus(409)
    }

    pub fn is_server_fault(&self) -> bool {
        self.kind == FailureKind::HttpStatus(500)
    }
}

/// Rejections raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL. Please enter a valid website address.")]
    InvalidUrl,
    #[error("This URL is already in the list.")]
    DuplicateUrl,
}

/// User-facing outcome text for the page-level surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    /// Create answered 409.
    Conflict { multiple: bool },
    /// Create answered 500; carries the server's message.
    ServerFault { message: String },
    /// Create succeeded but these URLs were rejected as already analyzed.
    AlreadyAnalyzed { urls: Vec<String> },
    /// Any other create failure.
    RequestFailed { message: String },
    /// A single pause toggle failed; the row keeps its previous state.
    ToggleFailed { id: crate::JobId, message: String },
}

impl fmt::Display for UserNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserNotice::Conflict { multiple: true } => {
                write!(f, "Some URLs have already been analyzed")
            }
            UserNotice::Conflict { multiple: false } => {
                write!(f, "This URL has already been analyzed.")
            }
            UserNotice::ServerFault { message } => write!(f, "{message}"),
            UserNotice::AlreadyAnalyzed { urls } => {
                write!(f, "Already analyzed: {}", urls.join(", "))
            }
            UserNotice::RequestFailed { message } => write!(f, "Request failed: {message}"),
            UserNotice::ToggleFailed { id, message } => {
                write!(f, "Could not toggle job {id}: {message}")
            }
        }
    }
}

/// User-facing outcome text for the table surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableNotice {
    NothingSelected,
    SelectedDeleted { count: usize },
    RowDeleted { id: crate::JobId },
    DeleteFailed { message: String },
}

impl fmt::Display for TableNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableNotice::NothingSelected => write!(f, "Please select at least one item."),
            TableNotice::SelectedDeleted { count } => {
                write!(f, "{count} selected item(s) have been deleted.")
            }
            TableNotice::RowDeleted { id } => write!(f, "Analysis {id} has been deleted."),
            TableNotice::DeleteFailed { message } => {
                write!(f, "An error occurred while deleting: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_server_fault_read_differently() {
        let conflict = UserNotice::Conflict { multiple: false }.to_string();
        let fault = UserNotice::ServerFault {
            message: "Database error".into(),
        }
        .to_string();
        assert_ne!(conflict, fault);
        assert_eq!(fault, "Database error");
    }

    #[test]
    fn failure_classification() {
        assert!(ApiFailure::new(FailureKind::HttpStatus(409), "").is_conflict());
        assert!(ApiFailure::new(FailureKind::HttpStatus(500), "").is_server_fault());
        assert!(!ApiFailure::new(FailureKind::HttpStatus(502), "").is_server_fault());
        assert!(ApiFailure::cancelled().is_cancelled());
    }
}
