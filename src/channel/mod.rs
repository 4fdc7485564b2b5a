//! Bidirectional host <-> plugin channel.
//!
//! A channel is two independent half-duplex paths:
//! - host -> plugin: `HostEndpoint::send` feeds `PluginEndpoint::on_request` observers
//! - plugin -> host: `PluginEndpoint::send`/`send_error` feed `HostEndpoint::on_response`
//!
//! Delivery is asynchronous (the sending call returns before any observer runs) and
//! ordered per direction. There is no acknowledgement or retry at this level; a send
//! whose peer is gone is dropped and logged at debug level.
//!
//! Transports: [`Channel::in_process`] for same-process embedding and tests, and
//! [`framing`] for any byte stream (pipe, socket, child stdio).

pub mod framing;
pub mod subject;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::protocol::{Inbound, Outbound, ResponseKind};

pub use subject::{Subject, SubscriptionId};

/// Host half: sends inbound envelopes, observes responses.
#[derive(Clone)]
pub struct HostEndpoint {
    to_plugin: UnboundedSender<Inbound>,
    responses: Subject<Outbound>,
}

/// Plugin half: observes inbound envelopes, sends responses and notifications.
#[derive(Clone)]
pub struct PluginEndpoint {
    to_host: UnboundedSender<Outbound>,
    requests: Subject<Inbound>,
}

pub struct Channel {
    host: HostEndpoint,
    plugin: PluginEndpoint,
}

impl Channel {
    /// Both halves in this process, connected by ordered queues on `handle`.
    /// Each call yields an isolated channel.
    pub fn in_process(handle: &Handle) -> Self {
        let requests = Subject::new(handle);
        let responses = Subject::new(handle);
        Self {
            host: HostEndpoint {
                to_plugin: requests.sender(),
                responses: responses.clone(),
            },
            plugin: PluginEndpoint {
                to_host: responses.sender(),
                requests,
            },
        }
    }

    pub fn host(&self) -> &HostEndpoint {
        &self.host
    }

    pub fn plugin(&self) -> &PluginEndpoint {
        &self.plugin
    }

    pub fn split(self) -> (HostEndpoint, PluginEndpoint) {
        (self.host, self.plugin)
    }
}

impl HostEndpoint {
    pub fn send(&self, envelope: Inbound) {
        if self.to_plugin.send(envelope).is_err() {
            tracing::debug!("plugin side closed, inbound envelope dropped");
        }
    }

    /// True once the plugin side has gone away; later sends are dropped.
    pub fn is_closed(&self) -> bool {
        self.to_plugin.is_closed()
    }

    pub fn on_response(
        &self,
        observer: impl Fn(&Outbound) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.responses.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.responses.unsubscribe(id)
    }
}

impl PluginEndpoint {
    pub fn send(&self, kind: ResponseKind, origin: Value, payload: Value) {
        self.send_envelope(Outbound::payload(kind, origin, payload));
    }

    pub fn send_error(&self, kind: ResponseKind, origin: Value, error: impl Into<String>) {
        self.send_envelope(Outbound::error(kind, origin, error));
    }

    pub fn send_envelope(&self, envelope: Outbound) {
        if self.to_host.send(envelope).is_err() {
            tracing::debug!("host side closed, outbound envelope dropped");
        }
    }

    pub fn on_request(&self, observer: impl Fn(&Inbound) + Send + Sync + 'static) -> SubscriptionId {
        self.requests.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.requests.unsubscribe(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/mod.rs"]
mod tests;
