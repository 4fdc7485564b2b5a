//! Language-service provider contract consumed by the dispatcher.
//!
//! Every method is optional: the default implementation rejects with
//! [`ProviderError::Unsupported`]. Methods are called synchronously when the request
//! envelope is dispatched and the returned future is awaited on the runtime, so a
//! provider that wraps its backend in a [`Serializer`](crate::serializer::Serializer)
//! sees calls in envelope order.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::error::ProviderError;
use crate::protocol::{
    CompletionDetails, CompletionList, Definition, EvaluationResult, EventContext,
    FormattingEdits, QuickInfo, Reference, SignatureHelp,
};

pub type ProviderResult<T> = Result<T, ProviderError>;
pub type ProviderFuture<T> = Pin<Box<dyn Future<Output = ProviderResult<T>> + Send + 'static>>;

pub trait LanguageService: Send + Sync {
    fn get_quick_info(&self, _context: EventContext) -> ProviderFuture<QuickInfo> {
        unsupported("getQuickInfo")
    }

    fn get_definition(&self, _context: EventContext) -> ProviderFuture<Definition> {
        unsupported("getDefinition")
    }

    fn find_all_references(&self, _context: EventContext) -> ProviderFuture<Vec<Reference>> {
        unsupported("findAllReferences")
    }

    fn get_completions(&self, _context: EventContext) -> ProviderFuture<CompletionList> {
        unsupported("getCompletions")
    }

    fn get_completion_details(
        &self,
        _context: EventContext,
        _item: Value,
    ) -> ProviderFuture<CompletionDetails> {
        unsupported("getCompletionDetails")
    }

    fn get_formatting_edits(&self, _context: EventContext) -> ProviderFuture<FormattingEdits> {
        unsupported("getFormattingEdits")
    }

    fn get_signature_help(&self, _context: EventContext) -> ProviderFuture<SignatureHelp> {
        unsupported("getSignatureHelp")
    }

    fn evaluate_block(
        &self,
        _context: EventContext,
        _id: Value,
        _file_name: String,
        _code: String,
    ) -> ProviderFuture<EvaluationResult> {
        unsupported("evaluateBlock")
    }

    /// Called once when another provider replaces this one. Providers that serialize
    /// backend calls should invalidate them here.
    fn detach(&self) {}
}

fn unsupported<T: Send + 'static>(method: &'static str) -> ProviderFuture<T> {
    Box::pin(std::future::ready(Err(ProviderError::Unsupported(method))))
}
