use super::client::{ApiClient, ApiError};
use super::models::{BatchDelete, BatchDeleteReply, Envelope, Event, Page};
use crate::sync::PageQuery;
use reqwest::Method;
use serde::de::DeserializeOwned;

impl ApiClient {
    /// `GET /events` with pagination and filters
    ///
    /// # Errors
    ///
    /// Will return `Err` if the events cannot be retrieved from the admin api
    pub async fn list_events(&self, query: &PageQuery) -> Result<Page<Event>, ApiError> {
        let params = query.params();
        self.json(self.request(Method::GET, "/events").query(&params))
            .await
    }

    /// `PUT /events/{id}` with a partial document; answers the updated event
    ///
    /// # Errors
    ///
    /// Will return `Err` if the event cannot be updated
    pub async fn update_event(
        &self,
        id: &str,
        changes: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Event, ApiError> {
        let path = format!("/events/{id}");
        let reply = self.enveloped(self.request(Method::PUT, &path).json(changes)).await?;
        reply.ok_or_else(|| ApiError::Rejected(format!("event {id} was not returned")))
    }

    /// `DELETE /events/{id}`
    ///
    /// # Errors
    ///
    /// Will return `Err` if the event cannot be deleted
    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/events/{id}");
        self.enveloped::<serde_json::Value>(self.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    /// `DELETE /events/batch`; answers how many events were removed
    ///
    /// # Errors
    ///
    /// Will return `Err` if the batch delete fails
    pub async fn delete_events_batch(&self, batch: &BatchDelete) -> Result<u64, ApiError> {
        let reply: Option<BatchDeleteReply> = self
            .enveloped(self.request(Method::DELETE, "/events/batch").json(batch))
            .await?;
        Ok(reply.map_or(0, |r| r.deleted))
    }

    async fn enveloped<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let envelope: Envelope<T> = self.json(builder).await?;
        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }
}
