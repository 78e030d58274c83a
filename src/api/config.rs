use super::client::{ApiClient, ApiError};
use super::models::{ActionReply, AdminConfig, ConnectionTest, Integration};
use reqwest::Method;

impl ApiClient {
    /// `GET /config` with secrets masked by the server
    ///
    /// # Errors
    ///
    /// Will return `Err` if the configuration cannot be retrieved
    pub async fn get_config(&self) -> Result<AdminConfig, ApiError> {
        self.json(self.request(Method::GET, "/config")).await
    }

    /// `PUT /config` with the full document
    ///
    /// # Errors
    ///
    /// Will return `Err` if the server rejects the document
    pub async fn save_config(&self, config: &AdminConfig) -> Result<ActionReply, ApiError> {
        self.json(self.request(Method::PUT, "/config").json(config))
            .await
    }

    /// `POST /test/{integration}`. A probe that ran but could not connect is
    /// reported as [`ApiError::Rejected`] carrying the probe's error.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the probe fails or the server cannot be reached
    pub async fn test_connection(
        &self,
        integration: Integration,
    ) -> Result<ConnectionTest, ApiError> {
        let path = format!("/test/{}", integration.slug());
        let probe: ConnectionTest = self.json(self.request(Method::POST, &path)).await?;
        if probe.connected {
            Ok(probe)
        } else {
            Err(ApiError::Rejected(probe.error.unwrap_or_else(|| {
                format!("{} is not reachable", integration.label())
            })))
        }
    }
}
