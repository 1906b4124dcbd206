//! Outbound side of the relay: backend, results API, chat and topic clients

pub mod chat;
pub mod client;
pub mod topic;
pub mod xml;

pub use chat::ChatClient;
pub use client::{BackendClient, ClientError, ResultsClient};
pub use topic::TopicPublisher;
