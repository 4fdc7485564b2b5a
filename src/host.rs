//! Host-side request correlation.
//!
//! The channel itself is fire-and-forget. `HostClient` tags each request context
//! with a `requestId`, keeps a oneshot waiter per id and resolves it from the
//! response whose echoed `originEvent` carries the same id. Envelopes with no id
//! are unsolicited notifications and go to `on_notification` observers.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::channel::{HostEndpoint, Subject, SubscriptionId};
use crate::config::BridgeConfig;
use crate::error::RequestError;
use crate::protocol::{
    CommandInvocation, EditorEvent, Inbound, Outbound, OutboundBody, Request, RequestMethod,
};

/// Context key carrying the correlation id.
pub const REQUEST_ID_KEY: &str = "requestId";

type Reply = oneshot::Sender<Result<Value, RequestError>>;
type PendingRequests = Arc<Mutex<FxHashMap<u64, Reply>>>;

pub struct HostClient {
    endpoint: HostEndpoint,
    pending: PendingRequests,
    next_id: AtomicU64,
    timeout: Duration,
    notifications: Subject<Outbound>,
    subscription: SubscriptionId,
}

impl HostClient {
    pub fn new(handle: &Handle, endpoint: HostEndpoint, timeout: Duration) -> Self {
        let pending: PendingRequests = Arc::new(Mutex::new(FxHashMap::default()));
        let notifications = Subject::new(handle);

        let subscription = {
            let pending = pending.clone();
            let notifications = notifications.clone();
            endpoint.on_response(move |envelope| route(&pending, &notifications, envelope))
        };

        Self {
            endpoint,
            pending,
            next_id: AtomicU64::new(1),
            timeout,
            notifications,
            subscription,
        }
    }

    pub fn with_config(handle: &Handle, endpoint: HostEndpoint, config: &BridgeConfig) -> Self {
        Self::new(handle, endpoint, config.request_timeout())
    }

    /// Sends a `request` envelope and resolves with the correlated response payload.
    ///
    /// The envelope is sent before this returns, so requests issued back to back
    /// reach the plugin in call order even if their futures are polled later.
    pub fn request(
        &self,
        method: RequestMethod,
        context: Value,
    ) -> impl Future<Output = Result<Value, RequestError>> + Send + 'static {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        lock(&self.pending).insert(id, reply);

        self.endpoint.send(Inbound::Request(Request {
            method,
            context: tag_context(context, id),
        }));
        let closed = self.endpoint.is_closed();

        // Owned by the returned future; removes the waiter even if the caller
        // drops the future without polling it.
        let waiter = PendingGuard {
            pending: self.pending.clone(),
            id,
        };
        let timeout = self.timeout;
        async move {
            let _waiter = waiter;
            if closed {
                return Err(RequestError::Closed);
            }
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(RequestError::Closed),
                Err(_) => {
                    tracing::debug!(request_id = id, "request timed out");
                    Err(RequestError::Timeout)
                }
            }
        }
    }

    pub fn pending_requests(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Observes uncorrelated plugin envelopes (diagnostics, highlights, shell commands).
    pub fn on_notification(
        &self,
        observer: impl Fn(&Outbound) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.notifications.subscribe(observer)
    }

    pub fn send_command(&self, command: impl Into<String>, args: Value) {
        self.endpoint.send(Inbound::Command(CommandInvocation {
            command: command.into(),
            args,
        }));
    }

    pub fn send_event(&self, name: impl Into<String>, context: Value) {
        self.endpoint.send(Inbound::Event(EditorEvent {
            name: name.into(),
            context,
        }));
    }

    pub fn send_buffer_update(&self, payload: Value) {
        self.endpoint.send(Inbound::BufferUpdate(payload));
    }

    pub fn send_buffer_update_incremental(&self, payload: Value) {
        self.endpoint.send(Inbound::BufferUpdateIncremental(payload));
    }
}

impl Drop for HostClient {
    fn drop(&mut self) {
        self.endpoint.unsubscribe(self.subscription);
    }
}

struct PendingGuard {
    pending: PendingRequests,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.id);
    }
}

fn lock(pending: &PendingRequests) -> MutexGuard<'_, FxHashMap<u64, Reply>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tag_context(context: Value, id: u64) -> Value {
    match context {
        Value::Object(mut obj) => {
            obj.insert(REQUEST_ID_KEY.to_string(), json!(id));
            Value::Object(obj)
        }
        other => json!({ REQUEST_ID_KEY: id, "value": other }),
    }
}

fn route(pending: &PendingRequests, notifications: &Subject<Outbound>, envelope: &Outbound) {
    let Some(id) = envelope.origin.get(REQUEST_ID_KEY).and_then(Value::as_u64) else {
        notifications.publish(envelope.clone());
        return;
    };

    let Some(reply) = lock(pending).remove(&id) else {
        tracing::debug!(request_id = id, kind = %envelope.kind.as_str(), "response for unknown or expired request");
        return;
    };

    let result = match &envelope.body {
        OutboundBody::Payload(payload) => Ok(payload.clone()),
        OutboundBody::Error(reason) => Err(RequestError::from_reason(reason.clone())),
    };
    let _ = reply.send(result);
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
