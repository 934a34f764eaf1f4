//! Method identifiers and the handler table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::MethodAlreadyDefined;

/// A JSON-RPC method the server can route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Initialize,
    Ping,
    ToolsList,
    ToolsCall,
    PromptsList,
    PromptsGet,
    ResourcesList,
    ResourcesRead,
    ResourcesTemplatesList,
    ResourcesSubscribe,
    ResourcesUnsubscribe,
    CompletionComplete,
    LoggingSetLevel,
    Custom(String),
}

impl Method {
    pub const INITIALIZE: &'static str = "initialize";
    pub const PING: &'static str = "ping";
    pub const TOOLS_LIST: &'static str = "tools/list";
    pub const TOOLS_CALL: &'static str = "tools/call";
    pub const PROMPTS_LIST: &'static str = "prompts/list";
    pub const PROMPTS_GET: &'static str = "prompts/get";
    pub const RESOURCES_LIST: &'static str = "resources/list";
    pub const RESOURCES_READ: &'static str = "resources/read";
    pub const RESOURCES_TEMPLATES_LIST: &'static str = "resources/templates/list";
    pub const RESOURCES_SUBSCRIBE: &'static str = "resources/subscribe";
    pub const RESOURCES_UNSUBSCRIBE: &'static str = "resources/unsubscribe";
    pub const COMPLETION_COMPLETE: &'static str = "completion/complete";
    pub const LOGGING_SET_LEVEL: &'static str = "logging/setLevel";

    pub fn parse(name: &str) -> Self {
        match name {
            Self::INITIALIZE => Method::Initialize,
            Self::PING => Method::Ping,
            Self::TOOLS_LIST => Method::ToolsList,
            Self::TOOLS_CALL => Method::ToolsCall,
            Self::PROMPTS_LIST => Method::PromptsList,
            Self::PROMPTS_GET => Method::PromptsGet,
            Self::RESOURCES_LIST => Method::ResourcesList,
            Self::RESOURCES_READ => Method::ResourcesRead,
            Self::RESOURCES_TEMPLATES_LIST => Method::ResourcesTemplatesList,
            Self::RESOURCES_SUBSCRIBE => Method::ResourcesSubscribe,
            Self::RESOURCES_UNSUBSCRIBE => Method::ResourcesUnsubscribe,
            Self::COMPLETION_COMPLETE => Method::CompletionComplete,
            Self::LOGGING_SET_LEVEL => Method::LoggingSetLevel,
            other => Method::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Initialize => Self::INITIALIZE,
            Method::Ping => Self::PING,
            Method::ToolsList => Self::TOOLS_LIST,
            Method::ToolsCall => Self::TOOLS_CALL,
            Method::PromptsList => Self::PROMPTS_LIST,
            Method::PromptsGet => Self::PROMPTS_GET,
            Method::ResourcesList => Self::RESOURCES_LIST,
            Method::ResourcesRead => Self::RESOURCES_READ,
            Method::ResourcesTemplatesList => Self::RESOURCES_TEMPLATES_LIST,
            Method::ResourcesSubscribe => Self::RESOURCES_SUBSCRIBE,
            Method::ResourcesUnsubscribe => Self::RESOURCES_UNSUBSCRIBE,
            Method::CompletionComplete => Self::COMPLETION_COMPLETE,
            Method::LoggingSetLevel => Self::LOGGING_SET_LEVEL,
            Method::Custom(name) => name,
        }
    }

    /// Response key that wraps this method's handler output, if any.
    pub fn envelope_key(&self) -> Option<&'static str> {
        match self {
            Method::ToolsList => Some("tools"),
            Method::PromptsList => Some("prompts"),
            Method::ResourcesList => Some("resources"),
            Method::ResourcesRead => Some("contents"),
            Method::ResourcesTemplatesList => Some("resourceTemplates"),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-supplied handler body: receives the request params, returns the result.
pub type HandlerFn = Arc<dyn Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync>;

/// What runs when a method is dispatched.
#[derive(Clone)]
pub enum Handler {
    /// Served by the server's own default implementation.
    Builtin,
    /// Accepted and answered with an empty object.
    Noop,
    Custom(HandlerFn),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Builtin => f.write_str("Builtin"),
            Handler::Noop => f.write_str("Noop"),
            Handler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Ordered mapping from method to handler.
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    handlers: BTreeMap<Method, Handler>,
}

impl MethodRegistry {
    /// A table with every default method installed.
    pub fn with_defaults() -> Self {
        let mut handlers = BTreeMap::new();
        for method in [
            Method::Initialize,
            Method::Ping,
            Method::ToolsList,
            Method::ToolsCall,
            Method::PromptsList,
            Method::PromptsGet,
            Method::ResourcesList,
            Method::ResourcesRead,
            Method::ResourcesTemplatesList,
        ] {
            handlers.insert(method, Handler::Builtin);
        }
        for method in [
            Method::ResourcesSubscribe,
            Method::ResourcesUnsubscribe,
            Method::CompletionComplete,
            Method::LoggingSetLevel,
        ] {
            handlers.insert(method, Handler::Noop);
        }
        Self { handlers }
    }

    pub fn get(&self, method: &Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.handlers.contains_key(method)
    }

    /// Install a handler for a new method; any existing entry is a collision.
    pub fn define_custom_method(
        &mut self,
        name: &str,
        handler: HandlerFn,
    ) -> Result<(), MethodAlreadyDefined> {
        let method = Method::parse(name);
        if self.handlers.contains_key(&method) {
            return Err(MethodAlreadyDefined(name.to_string()));
        }
        tracing::debug!("Defined custom method {name}");
        self.handlers.insert(method, Handler::Custom(handler));
        Ok(())
    }

    /// Replace the handler for a method unconditionally.
    pub fn set(&mut self, method: Method, handler: HandlerFn) {
        self.handlers.insert(method, Handler::Custom(handler));
    }

    /// Registered method names in table order.
    pub fn methods(&self) -> Vec<&str> {
        self.handlers.keys().map(Method::as_str).collect()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
