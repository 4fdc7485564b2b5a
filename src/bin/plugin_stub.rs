//! Minimal plugin process speaking framed envelopes on stdio; used by integration tests.
//!
//! Environment:
//! - `PLUGIN_STUB_DELAY_MS`: how long each quick-info backend call takes (default 0)

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use plugin_channel::protocol::{CompletionItem, CompletionList, Definition, EventContext, QuickInfo};
use plugin_channel::{
    LanguageService, PluginApi, PluginEndpoint, ProviderError, ProviderFuture, Serializer,
    DEFAULT_MAX_FRAME_BYTES,
};
use serde_json::Value;

struct StubService {
    quick_info: Serializer<EventContext, QuickInfo, ProviderError>,
}

impl StubService {
    fn new(handle: tokio::runtime::Handle, delay: Duration) -> Self {
        let quick_info = Serializer::new(handle, move |context: EventContext| async move {
            tokio::time::sleep(delay).await;
            if context.buffer_full_path.is_empty() {
                return Err(ProviderError::NoInfo);
            }
            Ok(QuickInfo {
                title: format!("{}:{}", context.line, context.column),
                description: context.buffer_full_path,
            })
        });
        Self { quick_info }
    }
}

impl LanguageService for StubService {
    fn get_quick_info(&self, context: EventContext) -> ProviderFuture<QuickInfo> {
        Box::pin(self.quick_info.call(context))
    }

    fn get_definition(&self, context: EventContext) -> ProviderFuture<Definition> {
        Box::pin(std::future::ready(Ok(Definition {
            file_path: context.buffer_full_path,
            line: context.line + 1,
            column: 1,
        })))
    }

    fn get_completions(&self, context: EventContext) -> ProviderFuture<CompletionList> {
        let completions = ["alpha", "beta"]
            .into_iter()
            .map(|label| CompletionItem {
                label: label.to_string(),
                kind: Some(context.filetype.clone()),
                ..Default::default()
            })
            .collect();
        Box::pin(std::future::ready(Ok(CompletionList {
            base: String::new(),
            completions,
        })))
    }

    fn detach(&self) {
        self.quick_info.invalidate();
    }
}

fn main() {
    let delay = std::env::var("PLUGIN_STUB_DELAY_MS")
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_default();

    let Ok(rt) = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    else {
        return;
    };
    let handle = rt.handle().clone();

    let _enter = rt.enter();

    let endpoint = PluginEndpoint::over_stream(
        &handle,
        tokio::io::stdin(),
        tokio::io::stdout(),
        DEFAULT_MAX_FRAME_BYTES,
    );
    let api = PluginApi::new(&handle, endpoint);
    api.register_language_service(Arc::new(StubService::new(handle.clone(), delay)));

    let editor = api.editor().clone();
    api.register_command("stub.shell", move |args| {
        let command = args.get("command").and_then(Value::as_str).unwrap_or_default();
        editor.execute_shell_command(command);
    });

    let (exit_tx, exit_rx) = mpsc::channel::<()>();
    api.register_command("stub.exit", move |_| {
        let _ = exit_tx.send(());
    });

    let _ = exit_rx.recv();
}
