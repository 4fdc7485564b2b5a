//! Protocol contracts: envelopes, language-service shapes, capability matching.

pub mod capability;
pub mod envelope;
pub mod language;

pub use capability::{
    matches, matches_file_type, meets_requirements, select_plugins, CapabilityDescriptor,
    CommandInfo, PluginFilter, PluginMetadata, WILDCARD_FILE_TYPE,
};
pub use envelope::{
    CommandInvocation, EditorEvent, EventContext, Inbound, Outbound, OutboundBody, Request,
    RequestMethod, ResponseKind,
};
pub use language::{
    CompletionDetails, CompletionItem, CompletionList, Definition, Diagnostic, EvaluationResult,
    FormattingEdits, Highlight, Location, Position, QuickInfo, Reference, SignatureHelp,
    SignatureItem, SignatureParameter, TextEdit,
};
