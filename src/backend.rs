//! The backend request/response interface.
//!
//! The backend owns the simulation engine process. Every call is a single
//! request with no retry: failures are reported to the caller, who decides
//! whether the user should try again.

use crate::analytics::KpiBundle;
use crate::config::SimulationConfig;
use crate::error::{Action, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The backend API used by the console.
pub trait Backend {
    fn save_config(&mut self, config: &SimulationConfig) -> Result<SaveConfigReply>;
    fn launch(&mut self, request: &LaunchRequest) -> Result<LaunchReply>;
    fn pause(&mut self, session_id: &str) -> Result<()>;
    fn resume(&mut self, session_id: &str) -> Result<()>;
    fn stop(&mut self, session_id: &str) -> Result<()>;
    /// The latest statistics for a run, in any of the live payload shapes.
    fn stats(&mut self, session_id: &str) -> Result<Value>;
    fn download_results(&mut self, session_id: &str) -> Result<KpiBundle>;
    fn status(&mut self) -> Result<Value>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub config: SimulationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LaunchReply {
    #[serde(alias = "sessionId")]
    pub session_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SaveConfigReply {
    #[serde(default, alias = "configId", alias = "id")]
    pub config_id: Option<String>,
}

/// The envelope every backend reply comes in.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(alias = "payload")]
    pub data: Option<T>,
    #[serde(default, alias = "message")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Turns a reply into its payload, or the error it carries.
    pub fn into_result(self, action: Action) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            let message = self.error.unwrap_or_else(|| "request was rejected".to_owned());
            Err(Error::request(action, message))
        }
    }

    /// Like [into_result](Self::into_result), but a payload must be present.
    pub fn require(self, action: Action) -> Result<T> {
        self.into_result(action)?
            .ok_or_else(|| Error::request(action, "reply has no payload"))
    }
}

/// HTTP method of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A backend route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint<'a> {
    SaveConfig,
    Launch,
    Pause(&'a str),
    Resume(&'a str),
    Stop(&'a str),
    Stats(&'a str),
    DownloadResults(&'a str),
    Status,
}

impl Endpoint<'_> {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Stats(_) | Endpoint::DownloadResults(_) | Endpoint::Status => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::SaveConfig => "/save-config".to_owned(),
            Endpoint::Launch => "/launch".to_owned(),
            Endpoint::Pause(id) => format!("/pause/{}", id),
            Endpoint::Resume(id) => format!("/resume/{}", id),
            Endpoint::Stop(id) => format!("/stop/{}", id),
            Endpoint::Stats(id) => format!("/stats/{}", id),
            Endpoint::DownloadResults(id) => format!("/download-results/{}", id),
            Endpoint::Status => "/status".to_owned(),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Endpoint::SaveConfig => Action::SaveConfig,
            Endpoint::Launch => Action::Launch,
            Endpoint::Pause(_) => Action::Pause,
            Endpoint::Resume(_) => Action::Resume,
            Endpoint::Stop(_) => Action::Stop,
            Endpoint::Stats(_) => Action::Stats,
            Endpoint::DownloadResults(_) => Action::DownloadResults,
            Endpoint::Status => Action::Status,
        }
    }
}

/// Moves JSON to and from the backend.
///
/// Implementations report delivery failures as a message; the reply
/// envelope is interpreted by [ApiClient].
pub trait Transport {
    fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> std::result::Result<Value, String>;
}

/// A [Backend] speaking the JSON reply envelope over some [Transport].
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R: DeserializeOwned>(
        &mut self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<ApiResponse<R>> {
        let action = endpoint.action();
        let reply = self
            .transport
            .send(endpoint.method(), &endpoint.path(), body)
            .map_err(|message| {
                log::warn!("{} request could not be delivered: {}", action, message);
                Error::request(action, message)
            })?;
        serde_json::from_value(reply)
            .map_err(|err| Error::request(action, format!("malformed reply: {}", err)))
    }
}

impl<T: Transport> Backend for ApiClient<T> {
    fn save_config(&mut self, config: &SimulationConfig) -> Result<SaveConfigReply> {
        let body = serde_json::to_value(config)?;
        Ok(self
            .call(Endpoint::SaveConfig, Some(body))?
            .into_result(Action::SaveConfig)?
            .unwrap_or_default())
    }

    fn launch(&mut self, request: &LaunchRequest) -> Result<LaunchReply> {
        let body = serde_json::to_value(request)?;
        self.call(Endpoint::Launch, Some(body))?
            .require(Action::Launch)
    }

    fn pause(&mut self, session_id: &str) -> Result<()> {
        self.call::<Value>(Endpoint::Pause(session_id), None)?
            .into_result(Action::Pause)
            .map(drop)
    }

    fn resume(&mut self, session_id: &str) -> Result<()> {
        self.call::<Value>(Endpoint::Resume(session_id), None)?
            .into_result(Action::Resume)
            .map(drop)
    }

    fn stop(&mut self, session_id: &str) -> Result<()> {
        self.call::<Value>(Endpoint::Stop(session_id), None)?
            .into_result(Action::Stop)
            .map(drop)
    }

    fn stats(&mut self, session_id: &str) -> Result<Value> {
        self.call(Endpoint::Stats(session_id), None)?
            .require(Action::Stats)
    }

    fn download_results(&mut self, session_id: &str) -> Result<KpiBundle> {
        self.call(Endpoint::DownloadResults(session_id), None)?
            .require(Action::DownloadResults)
    }

    fn status(&mut self) -> Result<Value> {
        self.call(Endpoint::Status, None)?.require(Action::Status)
    }
}
