//! Application state

use common::Config;
use processor::{EventReceiver, Pipeline};

/// Shared application state. Read-only once built.
pub struct AppState {
    pub pipeline: Pipeline,
    pub receiver: EventReceiver,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        // One connection pool for every outbound client
        let client = reqwest::Client::new();
        Self {
            pipeline: Pipeline::with_client(config, client.clone()),
            receiver: EventReceiver::new(config, client),
        }
    }
}
