//! Thin pass-through senders: each call becomes one unsolicited outbound envelope.

use serde_json::{json, Value};

use crate::channel::PluginEndpoint;
use crate::protocol::{Diagnostic, ResponseKind};

#[derive(Clone)]
pub struct Diagnostics {
    endpoint: PluginEndpoint,
}

impl Diagnostics {
    pub(crate) fn new(endpoint: PluginEndpoint) -> Self {
        Self { endpoint }
    }

    /// Replaces the errors published under `key` for `file_name`.
    pub fn set_errors(&self, key: &str, file_name: &str, errors: &[Diagnostic], color: Option<&str>) {
        self.endpoint.send(
            ResponseKind::SetErrors,
            Value::Null,
            json!({
                "key": key,
                "fileName": file_name,
                "errors": errors,
                "color": color,
            }),
        );
    }

    pub fn clear_errors(&self, key: &str, file_name: &str) {
        self.set_errors(key, file_name, &[], None);
    }
}

#[derive(Clone)]
pub struct Editor {
    endpoint: PluginEndpoint,
}

impl Editor {
    pub(crate) fn new(endpoint: PluginEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn execute_shell_command(&self, command: &str) {
        self.endpoint.send(
            ResponseKind::ExecuteShellCommand,
            Value::Null,
            json!({ "command": command }),
        );
    }
}
