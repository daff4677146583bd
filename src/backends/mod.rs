//! Text-generation backends behind the gateway.

pub mod local;
pub mod remote;

pub use local::LocalInferenceBackend;
pub use remote::RemoteChatBackend;
