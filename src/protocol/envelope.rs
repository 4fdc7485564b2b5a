//! Envelopes exchanged between the host and a plugin.
//!
//! Wire shapes (JSON):
//! - host -> plugin: `{ "type": string, "payload": any }`
//! - plugin -> host: `{ "type": string, "meta": { "originEvent": any }, "payload": any }`
//!   or, on failure, `{ "type": string, "meta": { "originEvent": any }, "error": string }`
//!
//! Values are validated into the tagged unions below at the channel boundary, so the
//! dispatcher never inspects raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::EnvelopeError;

/// Message travelling host -> plugin.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    BufferUpdate(Value),
    BufferUpdateIncremental(Value),
    Event(EditorEvent),
    Command(CommandInvocation),
    Request(Request),
    /// A `type` this side does not know. Kept so the receiver can log it.
    Unknown { kind: String, payload: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorEvent {
    pub name: String,
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub command: String,
    pub args: Value,
}

/// A language-service request. `context` doubles as the correlation data and is
/// echoed back verbatim as `meta.originEvent` on the response.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: RequestMethod,
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestMethod {
    QuickInfo,
    GotoDefinition,
    FindAllReferences,
    Completion,
    CompletionDetails { item: Value },
    Format,
    EvaluateBlock {
        id: Value,
        file_name: String,
        code: String,
    },
    SignatureHelp,
    Unknown(String),
}

impl RequestMethod {
    pub fn name(&self) -> &str {
        match self {
            RequestMethod::QuickInfo => "quick-info",
            RequestMethod::GotoDefinition => "goto-definition",
            RequestMethod::FindAllReferences => "find-all-references",
            RequestMethod::Completion => "completion-provider",
            RequestMethod::CompletionDetails { .. } => "completion-provider-item-selected",
            RequestMethod::Format => "format",
            RequestMethod::EvaluateBlock { .. } => "evaluate-block",
            RequestMethod::SignatureHelp => "signature-help",
            RequestMethod::Unknown(name) => name,
        }
    }

    /// The `type` of the envelope that answers this request.
    pub fn response_kind(&self) -> Option<ResponseKind> {
        let kind = match self {
            RequestMethod::QuickInfo => ResponseKind::ShowQuickInfo,
            RequestMethod::GotoDefinition => ResponseKind::GotoDefinition,
            RequestMethod::FindAllReferences => ResponseKind::FindAllReferences,
            RequestMethod::Completion => ResponseKind::CompletionProvider,
            RequestMethod::CompletionDetails { .. } => ResponseKind::CompletionProviderItemSelected,
            RequestMethod::Format => ResponseKind::Format,
            RequestMethod::EvaluateBlock { .. } => ResponseKind::EvaluateBlockResult,
            RequestMethod::SignatureHelp => ResponseKind::SignatureHelpResponse,
            RequestMethod::Unknown(_) => return None,
        };
        Some(kind)
    }

    /// Unknown names are kept; missing arguments default so the provider decides.
    fn parse(name: &str, payload: &Map<String, Value>) -> Self {
        match name {
            "quick-info" => RequestMethod::QuickInfo,
            "goto-definition" => RequestMethod::GotoDefinition,
            "find-all-references" => RequestMethod::FindAllReferences,
            "completion-provider" => RequestMethod::Completion,
            "completion-provider-item-selected" => RequestMethod::CompletionDetails {
                item: payload.get("item").cloned().unwrap_or(Value::Null),
            },
            "format" => RequestMethod::Format,
            "evaluate-block" => RequestMethod::EvaluateBlock {
                id: payload.get("id").cloned().unwrap_or(Value::Null),
                file_name: optional_str(payload, "fileName"),
                code: optional_str(payload, "code"),
            },
            "signature-help" => RequestMethod::SignatureHelp,
            other => RequestMethod::Unknown(other.to_string()),
        }
    }

    fn write_args(&self, payload: &mut Map<String, Value>) {
        match self {
            RequestMethod::CompletionDetails { item } => {
                payload.insert("item".to_string(), item.clone());
            }
            RequestMethod::EvaluateBlock {
                id,
                file_name,
                code,
            } => {
                payload.insert("id".to_string(), id.clone());
                payload.insert("fileName".to_string(), Value::String(file_name.clone()));
                payload.insert("code".to_string(), Value::String(code.clone()));
            }
            _ => {}
        }
    }
}

/// `type` of a plugin -> host envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    ShowQuickInfo,
    GotoDefinition,
    FindAllReferences,
    CompletionProvider,
    CompletionProviderItemSelected,
    Format,
    EvaluateBlockResult,
    SignatureHelpResponse,
    SetErrors,
    SetSyntaxHighlights,
    ClearSyntaxHighlights,
    ExecuteShellCommand,
    Other(String),
}

impl ResponseKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseKind::ShowQuickInfo => "show-quick-info",
            ResponseKind::GotoDefinition => "goto-definition",
            ResponseKind::FindAllReferences => "find-all-references",
            ResponseKind::CompletionProvider => "completion-provider",
            ResponseKind::CompletionProviderItemSelected => "completion-provider-item-selected",
            ResponseKind::Format => "format",
            ResponseKind::EvaluateBlockResult => "evaluate-block-result",
            ResponseKind::SignatureHelpResponse => "signature-help-response",
            ResponseKind::SetErrors => "set-errors",
            ResponseKind::SetSyntaxHighlights => "set-syntax-highlights",
            ResponseKind::ClearSyntaxHighlights => "clear-syntax-highlights",
            ResponseKind::ExecuteShellCommand => "execute-shell-command",
            ResponseKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for ResponseKind {
    fn from(kind: &str) -> Self {
        match kind {
            "show-quick-info" => ResponseKind::ShowQuickInfo,
            "goto-definition" => ResponseKind::GotoDefinition,
            "find-all-references" => ResponseKind::FindAllReferences,
            "completion-provider" => ResponseKind::CompletionProvider,
            "completion-provider-item-selected" => ResponseKind::CompletionProviderItemSelected,
            "format" => ResponseKind::Format,
            "evaluate-block-result" => ResponseKind::EvaluateBlockResult,
            "signature-help-response" => ResponseKind::SignatureHelpResponse,
            "set-errors" => ResponseKind::SetErrors,
            "set-syntax-highlights" => ResponseKind::SetSyntaxHighlights,
            "clear-syntax-highlights" => ResponseKind::ClearSyntaxHighlights,
            "execute-shell-command" => ResponseKind::ExecuteShellCommand,
            other => ResponseKind::Other(other.to_string()),
        }
    }
}

/// Message travelling plugin -> host.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub kind: ResponseKind,
    /// Copied from the request's context; `Null` for unsolicited messages.
    pub origin: Value,
    pub body: OutboundBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Payload(Value),
    Error(String),
}

impl Outbound {
    pub fn payload(kind: ResponseKind, origin: Value, payload: Value) -> Self {
        Self {
            kind,
            origin,
            body: OutboundBody::Payload(payload),
        }
    }

    pub fn error(kind: ResponseKind, origin: Value, error: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            body: OutboundBody::Error(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, OutboundBody::Error(_))
    }

    pub fn payload_value(&self) -> Option<&Value> {
        match &self.body {
            OutboundBody::Payload(payload) => Some(payload),
            OutboundBody::Error(_) => None,
        }
    }

    pub fn error_reason(&self) -> Option<&str> {
        match &self.body {
            OutboundBody::Error(error) => Some(error),
            OutboundBody::Payload(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut envelope = json!({
            "type": self.kind.as_str(),
            "meta": { "originEvent": self.origin },
        });
        if let Some(obj) = envelope.as_object_mut() {
            match &self.body {
                OutboundBody::Payload(payload) => {
                    obj.insert("payload".to_string(), payload.clone());
                }
                OutboundBody::Error(error) => {
                    obj.insert("error".to_string(), Value::String(error.clone()));
                }
            }
        }
        envelope
    }

    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let wire: WireEnvelope = serde_json::from_value(value)?;
        let kind = wire.kind.ok_or(EnvelopeError::MissingType)?;
        let origin = wire.meta.map(|m| m.origin_event).unwrap_or(Value::Null);
        let body = match wire.error {
            Some(error) => OutboundBody::Error(error),
            None => OutboundBody::Payload(wire.payload.unwrap_or(Value::Null)),
        };
        Ok(Self {
            kind: ResponseKind::from(kind.as_str()),
            origin,
            body,
        })
    }
}

impl Inbound {
    pub fn kind(&self) -> &str {
        match self {
            Inbound::BufferUpdate(_) => "buffer-update",
            Inbound::BufferUpdateIncremental(_) => "buffer-update-incremental",
            Inbound::Event(_) => "event",
            Inbound::Command(_) => "command",
            Inbound::Request(_) => "request",
            Inbound::Unknown { kind, .. } => kind,
        }
    }

    pub fn to_value(&self) -> Value {
        let payload = match self {
            Inbound::BufferUpdate(payload) | Inbound::BufferUpdateIncremental(payload) => {
                payload.clone()
            }
            Inbound::Event(event) => json!({ "name": event.name, "context": event.context }),
            Inbound::Command(cmd) => json!({ "command": cmd.command, "args": cmd.args }),
            Inbound::Request(request) => {
                let mut payload = Map::new();
                payload.insert(
                    "name".to_string(),
                    Value::String(request.method.name().to_string()),
                );
                payload.insert("context".to_string(), request.context.clone());
                request.method.write_args(&mut payload);
                Value::Object(payload)
            }
            Inbound::Unknown { payload, .. } => payload.clone(),
        };
        json!({ "type": self.kind(), "payload": payload })
    }

    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let wire: WireEnvelope = serde_json::from_value(value)?;
        let kind = wire.kind.ok_or(EnvelopeError::MissingType)?;
        let payload = wire.payload.unwrap_or(Value::Null);

        let inbound = match kind.as_str() {
            "buffer-update" => Inbound::BufferUpdate(payload),
            "buffer-update-incremental" => Inbound::BufferUpdateIncremental(payload),
            "event" => {
                let obj = payload_object(&kind, &payload)?;
                Inbound::Event(EditorEvent {
                    name: required_str(obj, &kind, "name")?,
                    context: obj.get("context").cloned().unwrap_or(Value::Null),
                })
            }
            "command" => {
                let obj = payload_object(&kind, &payload)?;
                Inbound::Command(CommandInvocation {
                    command: required_str(obj, &kind, "command")?,
                    args: obj.get("args").cloned().unwrap_or(Value::Null),
                })
            }
            "request" => {
                let obj = payload_object(&kind, &payload)?;
                let name = required_str(obj, &kind, "name")?;
                Inbound::Request(Request {
                    method: RequestMethod::parse(&name, obj),
                    context: obj.get("context").cloned().unwrap_or(Value::Null),
                })
            }
            _ => Inbound::Unknown { kind, payload },
        };
        Ok(inbound)
    }
}

/// Typed view over a request context, as sent by the host for the active buffer.
///
/// The raw context value is what gets echoed for correlation; this view is only
/// handed to providers. Unparseable contexts yield the default view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventContext {
    pub buffer_full_path: String,
    pub filetype: String,
    pub line: u32,
    pub column: u32,
    pub byte: u64,
    pub version: u64,
    pub modified: bool,
    pub buffer_total_lines: u32,
}

impl EventContext {
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(context) => context,
            Err(e) => {
                tracing::debug!(error = %e, "request context is not an editor context");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    meta: Option<WireMeta>,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMeta {
    #[serde(rename = "originEvent", default)]
    origin_event: Value,
}

fn payload_object<'a>(kind: &str, payload: &'a Value) -> Result<&'a Map<String, Value>, EnvelopeError> {
    payload
        .as_object()
        .ok_or_else(|| EnvelopeError::InvalidPayload {
            kind: kind.to_string(),
            reason: "payload is not an object".to_string(),
        })
}

fn required_str(
    obj: &Map<String, Value>,
    kind: &str,
    field: &'static str,
) -> Result<String, EnvelopeError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EnvelopeError::MissingField {
            kind: kind.to_string(),
            field,
        })
}

fn optional_str(obj: &Map<String, Value>, field: &str) -> String {
    obj.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/envelope.rs"]
mod tests;
