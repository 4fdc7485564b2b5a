//! Plugin-side API surface.
//!
//! `PluginApi` sits on a [`PluginEndpoint`] and routes each inbound envelope:
//! - buffer updates and editor events are re-emitted locally via `on_event`
//! - `command` runs a registered callback (unknown names are logged, never answered)
//! - `request` calls the registered language service and answers with an envelope
//!   whose `meta.originEvent` is the request context
//!
//! Each envelope is handled on its own. Provider futures run as separate tasks, so a
//! slow request never holds up the next envelope.

pub mod commands;
pub mod language_service;
pub mod senders;

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{json, Value};
use tokio::runtime::Handle;

use crate::channel::{PluginEndpoint, Subject, SubscriptionId};
use crate::error::ProviderError;
use crate::protocol::{
    EditorEvent, EventContext, Highlight, Inbound, Request, RequestMethod, ResponseKind,
};

pub use commands::{CommandCallback, Commands};
pub use language_service::{LanguageService, ProviderFuture, ProviderResult};
pub use senders::{Diagnostics, Editor};

/// Locally observable events re-emitted from inbound envelopes.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginEvent {
    BufferUpdate(Value),
    BufferUpdateIncremental(Value),
    CursorMoved(Value),
    BufferSaved(Value),
    BufferEnter(Value),
    /// Every `event` envelope, under its editor event name.
    Editor { name: String, context: Value },
}

/// What happens when a provider rejects a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    /// Answer with an error envelope of the response type.
    Report,
    /// No error path exists for this request kind; the rejection is only logged.
    Log,
}

#[derive(Clone)]
pub struct PluginApi {
    inner: Arc<Inner>,
}

struct Inner {
    handle: Handle,
    endpoint: PluginEndpoint,
    language_service: RwLock<Option<Arc<dyn LanguageService>>>,
    commands: Commands,
    diagnostics: Diagnostics,
    editor: Editor,
    events: Subject<PluginEvent>,
}

impl PluginApi {
    pub fn new(handle: &Handle, endpoint: PluginEndpoint) -> Self {
        let inner = Arc::new(Inner {
            handle: handle.clone(),
            diagnostics: Diagnostics::new(endpoint.clone()),
            editor: Editor::new(endpoint.clone()),
            endpoint,
            language_service: RwLock::new(None),
            commands: Commands::new(),
            events: Subject::new(handle),
        });

        let weak = Arc::downgrade(&inner);
        inner.endpoint.on_request(move |envelope| {
            if let Some(inner) = weak.upgrade() {
                inner.dispatch(envelope);
            }
        });

        Self { inner }
    }

    /// Installs `service`; the latest registration wins and the previous provider is detached.
    pub fn register_language_service(&self, service: Arc<dyn LanguageService>) {
        let previous = self
            .inner
            .language_service
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(service);
        if let Some(previous) = previous {
            tracing::debug!("language service replaced");
            previous.detach();
        }
    }

    pub fn has_language_service(&self) -> bool {
        self.inner.language_service().is_some()
    }

    pub fn register_command(
        &self,
        name: impl Into<String>,
        callback: impl Fn(Value) + Send + Sync + 'static,
    ) {
        self.inner.commands.register_command(name, callback);
    }

    pub fn commands(&self) -> &Commands {
        &self.inner.commands
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    pub fn editor(&self) -> &Editor {
        &self.inner.editor
    }

    pub fn on_event(&self, observer: impl Fn(&PluginEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.events.subscribe(observer)
    }

    pub fn set_highlights(&self, file: &str, key: &str, highlights: &[Highlight]) {
        self.inner.endpoint.send(
            ResponseKind::SetSyntaxHighlights,
            Value::Null,
            json!({ "file": file, "key": key, "highlights": highlights }),
        );
    }

    pub fn clear_highlights(&self, file: &str, key: &str) {
        self.inner.endpoint.send(
            ResponseKind::ClearSyntaxHighlights,
            Value::Null,
            json!({ "file": file, "key": key }),
        );
    }
}

impl Inner {
    fn language_service(&self) -> Option<Arc<dyn LanguageService>> {
        self.language_service
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit(&self, event: PluginEvent) {
        self.events.publish(event);
    }

    fn dispatch(&self, envelope: &Inbound) {
        match envelope {
            Inbound::BufferUpdate(payload) => self.emit(PluginEvent::BufferUpdate(payload.clone())),
            Inbound::BufferUpdateIncremental(payload) => {
                self.emit(PluginEvent::BufferUpdateIncremental(payload.clone()))
            }
            Inbound::Event(event) => self.dispatch_event(event),
            Inbound::Command(cmd) => {
                self.commands.on_command(&cmd.command, cmd.args.clone());
            }
            Inbound::Request(request) => self.dispatch_request(request),
            Inbound::Unknown { kind, .. } => {
                tracing::warn!(kind = %kind, "unknown notification type");
            }
        }
    }

    fn dispatch_event(&self, event: &EditorEvent) {
        let context = event.context.clone();
        let specific = match event.name.as_str() {
            "CursorMoved" => Some(PluginEvent::CursorMoved(context.clone())),
            "BufWritePost" => Some(PluginEvent::BufferSaved(context.clone())),
            "BufEnter" => Some(PluginEvent::BufferEnter(context.clone())),
            _ => None,
        };
        if let Some(specific) = specific {
            self.emit(specific);
        }
        self.emit(PluginEvent::Editor {
            name: event.name.clone(),
            context,
        });
    }

    fn dispatch_request(&self, request: &Request) {
        let Some(service) = self.language_service() else {
            tracing::debug!(request = %request.method.name(), "no language service, request dropped");
            return;
        };
        let Some(kind) = request.method.response_kind() else {
            tracing::warn!(request = %request.method.name(), "unknown request type");
            return;
        };

        let origin = request.context.clone();
        let context = EventContext::from_value(&request.context);

        match &request.method {
            RequestMethod::QuickInfo => {
                let quick_info = service.get_quick_info(context);
                self.respond(kind, origin, Rejection::Report, async move {
                    let info = quick_info.await?;
                    if !info.is_available() {
                        return Err(ProviderError::NoInfo);
                    }
                    Ok(json!({ "info": info.title, "documentation": info.description }))
                });
            }
            RequestMethod::GotoDefinition => {
                let definition = service.get_definition(context);
                self.respond(kind, origin, Rejection::Log, async move {
                    Ok(json!(definition.await?))
                });
            }
            RequestMethod::FindAllReferences => {
                let references = service.find_all_references(context);
                self.respond(kind, origin, Rejection::Log, async move {
                    Ok(json!({ "references": references.await? }))
                });
            }
            RequestMethod::Completion => {
                let completions = service.get_completions(context);
                self.respond(kind, origin, Rejection::Report, async move {
                    Ok(json!(completions.await?))
                });
            }
            RequestMethod::CompletionDetails { item } => {
                let details = service.get_completion_details(context, item.clone());
                self.respond(kind, origin, Rejection::Log, async move {
                    Ok(json!({ "details": details.await? }))
                });
            }
            RequestMethod::Format => {
                let edits = service.get_formatting_edits(context);
                self.respond(kind, origin, Rejection::Log, async move {
                    Ok(json!(edits.await?))
                });
            }
            RequestMethod::EvaluateBlock {
                id,
                file_name,
                code,
            } => {
                let result =
                    service.evaluate_block(context, id.clone(), file_name.clone(), code.clone());
                self.respond(kind, origin, Rejection::Log, async move {
                    Ok(json!(result.await?))
                });
            }
            RequestMethod::SignatureHelp => {
                let help = service.get_signature_help(context);
                self.respond(kind, origin, Rejection::Report, async move {
                    Ok(json!(help.await?))
                });
            }
            RequestMethod::Unknown(_) => {}
        }
    }

    fn respond<F>(&self, kind: ResponseKind, origin: Value, rejection: Rejection, response: F)
    where
        F: std::future::Future<Output = Result<Value, ProviderError>> + Send + 'static,
    {
        let endpoint = self.endpoint.clone();
        self.handle.spawn(async move {
            match response.await {
                Ok(payload) => endpoint.send(kind, origin, payload),
                Err(e) if rejection == Rejection::Report => {
                    endpoint.send_error(kind, origin, e.reason());
                }
                Err(e) => {
                    tracing::error!(
                        response = %kind.as_str(),
                        error = %e,
                        "language service rejected a request that has no error response"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/api/mod.rs"]
mod tests;
