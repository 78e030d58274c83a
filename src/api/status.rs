use super::client::{ApiClient, ApiError};
use super::models::{ActionReply, Status};
use reqwest::Method;

impl ApiClient {
    /// `GET /status`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the status cannot be retrieved from the admin api
    pub async fn get_status(&self) -> Result<Status, ApiError> {
        self.json(self.request(Method::GET, "/status")).await
    }

    /// `POST /worker/start`; answers `started` or `already_running`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the server refuses or cannot be reached
    pub async fn start_worker(&self) -> Result<ActionReply, ApiError> {
        self.json(self.request(Method::POST, "/worker/start")).await
    }

    /// `POST /worker/stop`; answers `stopped` or `already_stopped`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the server refuses or cannot be reached
    pub async fn stop_worker(&self) -> Result<ActionReply, ApiError> {
        self.json(self.request(Method::POST, "/worker/stop")).await
    }

    /// `POST /watermark/reset`; the server refuses while the worker runs
    ///
    /// # Errors
    ///
    /// Will return `Err` if the server refuses or cannot be reached
    pub async fn reset_watermark(&self) -> Result<ActionReply, ApiError> {
        self.json(self.request(Method::POST, "/watermark/reset")).await
    }
}
