//! plugin-channel: host <-> plugin messaging for an embedded-editor frontend
//!
//! Modules:
//! - protocol: envelopes, language-service shapes, capability matching
//! - channel: ordered asynchronous host/plugin endpoints (in-process or framed stream)
//! - serializer: one-in-flight, newest-wins wrapper for a single-threaded backend
//! - api: plugin-side dispatcher, language-service trait, commands, senders
//! - host: host-side request correlation with timeouts
//! - config / error / logging: ambient plumbing

pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod protocol;
pub mod serializer;

pub use api::{LanguageService, PluginApi, PluginEvent, ProviderFuture, ProviderResult};
pub use channel::framing::DEFAULT_MAX_FRAME_BYTES;
pub use channel::{Channel, HostEndpoint, PluginEndpoint};
pub use config::BridgeConfig;
pub use error::{ConfigError, EnvelopeError, ProviderError, RequestError};
pub use host::HostClient;
pub use serializer::{Panicked, Preempted, Serializer};
