//! Capability matching: decides which plugins may service a file type or command.
//!
//! Pure functions over plugin metadata; nothing here touches a channel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Capability key that applies to every file type.
pub const WILDCARD_FILE_TYPE: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Features a plugin declares for one file-type key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_service: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<BTreeMap<String, CommandInfo>>,
}

/// Plugin package metadata: `{ "main", "engines", "oni": { <fileType | "*">: descriptor } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub engines: String,
    #[serde(rename = "oni", default)]
    pub capabilities: BTreeMap<String, CapabilityDescriptor>,
}

impl PluginMetadata {
    pub fn from_json_str(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Descriptor for `file_type`, falling back to the wildcard key.
    pub fn capabilities_for(&self, file_type: &str) -> Option<&CapabilityDescriptor> {
        self.capabilities
            .get(file_type)
            .or_else(|| self.capabilities.get(WILDCARD_FILE_TYPE))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginFilter {
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub required_capabilities: Option<CapabilityDescriptor>,
    #[serde(default)]
    pub single_plugin: bool,
}

impl PluginFilter {
    pub fn for_file_type(file_type: impl Into<String>) -> Self {
        Self {
            file_type: Some(file_type.into()),
            ..Self::default()
        }
    }

    pub fn requiring(mut self, required: CapabilityDescriptor) -> Self {
        self.required_capabilities = Some(required);
        self
    }

    pub fn single(mut self) -> Self {
        self.single_plugin = true;
        self
    }

    fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref().filter(|ft| !ft.is_empty())
    }
}

pub fn matches_file_type(metadata: &PluginMetadata, filter: &PluginFilter) -> bool {
    match filter.file_type() {
        None => true,
        Some(file_type) => metadata.capabilities_for(file_type).is_some(),
    }
}

/// Whether `capabilities` is a superset of every field present in `required`.
pub fn meets_requirements(
    capabilities: &CapabilityDescriptor,
    required: Option<&CapabilityDescriptor>,
) -> bool {
    let Some(required) = required else {
        return true;
    };

    if let Some(methods) = &required.language_service {
        let Some(declared) = &capabilities.language_service else {
            return false;
        };
        if !methods.iter().all(|m| declared.contains(m)) {
            return false;
        }
    }

    if let Some(commands) = &required.commands {
        let Some(declared) = &capabilities.commands else {
            return false;
        };
        if !commands.keys().all(|name| declared.contains_key(name)) {
            return false;
        }
    }

    true
}

/// Full filter test. Without a file type, any declared descriptor may satisfy the
/// requirements.
pub fn matches(metadata: &PluginMetadata, filter: &PluginFilter) -> bool {
    let required = filter.required_capabilities.as_ref();
    match filter.file_type() {
        Some(file_type) => metadata
            .capabilities_for(file_type)
            .is_some_and(|caps| meets_requirements(caps, required)),
        None if required.is_none() => true,
        None => metadata
            .capabilities
            .values()
            .any(|caps| meets_requirements(caps, required)),
    }
}

/// Plugins satisfying `filter`, in input order; at most one when `single_plugin` is set.
pub fn select_plugins<'a, T>(
    plugins: &'a [T],
    filter: &PluginFilter,
    metadata: impl Fn(&T) -> &PluginMetadata,
) -> Vec<&'a T> {
    let mut selected = plugins.iter().filter(|p| matches(metadata(*p), filter));
    if filter.single_plugin {
        selected.next().into_iter().collect()
    } else {
        selected.collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/capability.rs"]
mod tests;
