use crate::cache_manager::SyncContext;
use crate::error::{Error, Result};
use crate::sync::{DataRequest, FetchResult, Fetcher, Mutation, MutationReply, SyncConfig};
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

/// Fetcher for view tests that never reach the network
struct Offline;

#[async_trait]
impl Fetcher for Offline {
    async fn fetch(&self, _request: &DataRequest) -> Result<FetchResult> {
        Err(Error::Custom("offline".to_string()))
    }

    async fn execute(&self, _mutation: &Mutation) -> Result<MutationReply> {
        Err(Error::Custom("offline".to_string()))
    }
}

pub fn ctx(config: &SyncConfig) -> SyncContext {
    SyncContext::new(Arc::new(Offline), config)
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}
