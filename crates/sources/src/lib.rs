//! Inbound side of the relay: transport unwrapping, source detection and
//! validation

pub mod envelope;
pub mod events;
pub mod multipart;
pub mod verify;
pub mod webhooks;

pub use events::{PubSubEnvelope, RelayedEvent};
pub use verify::{verify_enumerated, verify_header, verify_shared_secret};
pub use webhooks::{detect, normalize, resolve, Detected, Expectations};
