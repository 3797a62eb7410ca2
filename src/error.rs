//! The crate error type.

use std::fmt;

/// A backend action that can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    SaveConfig,
    Launch,
    Pause,
    Resume,
    Stop,
    Stats,
    DownloadResults,
    Status,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::SaveConfig => "save-config",
            Action::Launch => "launch",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Stop => "stop",
            Action::Stats => "stats",
            Action::DownloadResults => "download-results",
            Action::Status => "status",
        };
        f.write_str(name)
    }
}

/// Anything that can go wrong in the console.
///
/// Every error is scoped to the view or action that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A step the current view depends on has not been completed.
    #[error("no {what} found, go back to the previous step")]
    MissingPrerequisite { what: &'static str },
    /// The backend rejected a request, or it could not be delivered.
    #[error("{action} request failed: {message}")]
    Request { action: Action, message: String },
    /// Persisted session data could not be read back.
    #[error("stored {key} is corrupt, restart the simulation setup")]
    MalformedPersisted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// A control action that the current run state does not allow.
    #[error("cannot {action} while the simulation is {state}")]
    InvalidTransition {
        action: &'static str,
        state: crate::RunState,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A live status payload matched none of the known shapes.
    #[error("unrecognised status payload")]
    UnrecognisedPayload,
    #[error("update source cannot change while a push subscription is live")]
    UpdateSourceBusy,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn request(action: Action, message: impl Into<String>) -> Self {
        Error::Request {
            action,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
