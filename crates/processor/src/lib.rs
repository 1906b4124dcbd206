//! Webhook relay pipeline: classification, forwarding, notification and
//! response building

pub mod classify;
pub mod notify;
pub mod pipeline;
pub mod receiver;
pub mod response;


pub use pipeline::Pipeline;
pub use receiver::EventReceiver;
pub use response::RelayResponse;
