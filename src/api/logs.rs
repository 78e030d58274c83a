use super::client::{ApiClient, ApiError};
use super::models::{LogEntry, Page};
use crate::sync::PageQuery;
use reqwest::Method;

impl ApiClient {
    /// `GET /logs?level=&page=&pageSize=`, most recent first
    ///
    /// # Errors
    ///
    /// Will return `Err` if the logs cannot be retrieved from the admin api
    pub async fn list_logs(&self, query: &PageQuery) -> Result<Page<LogEntry>, ApiError> {
        let params = query.params();
        self.json(self.request(Method::GET, "/logs").query(&params))
            .await
    }
}
