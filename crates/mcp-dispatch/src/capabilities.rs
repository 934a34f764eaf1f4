//! Server capability set and the per-method capability gate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::DispatchError;
use crate::methods::Method;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsCapability {
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    #[serde(default)]
    pub subscribe: bool,
    #[serde(default)]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionsCapability {}

/// Features the server advertises in its `initialize` result.
///
/// A `None` feature disables every method that needs it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions: Option<CompletionsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

impl ServerCapabilities {
    pub fn default_capabilities() -> Self {
        Self {
            experimental: None,
            logging: None,
            completions: None,
            prompts: Some(PromptsCapability { list_changed: true }),
            resources: Some(ResourcesCapability {
                subscribe: false,
                list_changed: true,
            }),
            tools: Some(ToolsCapability { list_changed: true }),
        }
    }

    /// Whether the named capability is enabled.
    fn supports(&self, capability: &str) -> bool {
        match capability {
            "tools" => self.tools.is_some(),
            "prompts" => self.prompts.is_some(),
            "resources" => self.resources.is_some(),
            "resources.subscribe" => self.resources.as_ref().is_some_and(|r| r.subscribe),
            "logging" => self.logging.is_some(),
            "completions" => self.completions.is_some(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// The capability a method needs, or `None` if it is always allowed.
pub fn required_capability(method: &Method) -> Option<&'static str> {
    match method {
        Method::ToolsList | Method::ToolsCall => Some("tools"),
        Method::PromptsList | Method::PromptsGet => Some("prompts"),
        Method::ResourcesList | Method::ResourcesRead | Method::ResourcesTemplatesList => {
            Some("resources")
        }
        Method::ResourcesSubscribe | Method::ResourcesUnsubscribe => Some("resources.subscribe"),
        Method::LoggingSetLevel => Some("logging"),
        Method::CompletionComplete => Some("completions"),
        Method::Initialize | Method::Ping | Method::Custom(_) => None,
    }
}

/// Fail if `method` needs a capability that `capabilities` does not enable.
pub fn ensure_capability(
    method: &Method,
    capabilities: &ServerCapabilities,
) -> Result<(), DispatchError> {
    match required_capability(method) {
        Some(capability) if !capabilities.supports(capability) => {
            Err(DispatchError::MissingRequiredCapability {
                capability,
                method: method.as_str().to_string(),
            })
        }
        _ => Ok(()),
    }
}
