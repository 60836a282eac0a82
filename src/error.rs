use thiserror::Error;

pub type TarteelResult<T> = Result<T, TarteelError>;

#[derive(Debug, Error)]
pub enum TarteelError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("missing command `{command}` on PATH")]
    CommandMissing { command: String },

    #[error("command failed: `{command}` (status: {status}){stderr_suffix}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr_suffix: String,
    },

    #[error("command timed out after {timeout_ms}ms: `{command}`{stderr_suffix}")]
    CommandTimedOut {
        command: String,
        timeout_ms: u64,
        stderr_suffix: String,
    },

    #[error("transcription unavailable: {0}")]
    Transcription(String),

    #[error("reference text not found: {0}")]
    ReferenceNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("lead storage error: {0}")]
    Storage(String),

    #[error("notification error: {0}")]
    Notification(String),
}

impl TarteelError {
    #[must_use]
    pub fn from_command_failure(command: String, status: i32, stderr: String) -> Self {
        Self::CommandFailed {
            command,
            status,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    #[must_use]
    pub fn from_command_timeout(command: String, timeout_ms: u64, stderr: String) -> Self {
        Self::CommandTimedOut {
            command,
            timeout_ms,
            stderr_suffix: stderr_suffix(&stderr),
        }
    }

    /// Stable, unique, machine-readable error code for every variant.
    /// API callers discriminate on these rather than on display text.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "TR-IO",
            Self::Json(_) => "TR-JSON",
            Self::Http(_) => "TR-HTTP",
            Self::CommandMissing { .. } => "TR-CMD-MISSING",
            Self::CommandFailed { .. } => "TR-CMD-FAILED",
            Self::CommandTimedOut { .. } => "TR-CMD-TIMEOUT",
            Self::Transcription(_) => "TR-TRANSCRIBE",
            Self::ReferenceNotFound(_) => "TR-REFERENCE-NOT-FOUND",
            Self::InvalidRequest(_) => "TR-INVALID-REQUEST",
            Self::Storage(_) => "TR-STORAGE",
            Self::Notification(_) => "TR-NOTIFY",
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("; stderr: {trimmed}")
    }
}
