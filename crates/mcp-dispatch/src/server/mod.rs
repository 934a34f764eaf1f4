//! The request dispatcher.
//!
//! [`McpServer::handle`] takes a method name and its params (the JSON-RPC
//! envelope is already stripped), runs the capability gate, calls the matched
//! handler and normalizes whatever it returns:
//!
//! - list-style results are wrapped in their envelope key (`tools`, `contents`, ...)
//! - [`HandlerError`]s pass through unchanged
//! - any other error becomes an `internal_error` that keeps the original as its cause
//!
//! Every failure is handed to the exception reporter before it is returned,
//! and every call produces one [`Instrumentation`] record.

pub mod notify;
mod pipeline;

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Map, Value};

use crate::capabilities::{ensure_capability, Implementation, InitializeResult, ServerCapabilities};
use crate::config::Configuration;
use crate::context::ServerContext;
use crate::error::{ConfigError, DispatchError, ErrorKind, HandlerError, MethodAlreadyDefined};
use crate::instrumentation::{Instrumentation, UNSUPPORTED_METHOD};
use crate::logging::LoggingMessageNotification;
use crate::methods::{Handler, Method, MethodRegistry};
use crate::prompt::Prompt;
use crate::registry::Registry;
use crate::resource::{Resource, ResourceTemplate};
use crate::tool::Tool;

pub use notify::NotificationTransport;

pub const DEFAULT_SERVER_NAME: &str = "mcp-dispatch";

/// Registries, capabilities and handler table for one MCP server.
pub struct McpServer {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: Registry<Tool>,
    prompts: Registry<Prompt>,
    resources: Registry<Resource>,
    resource_templates: Registry<ResourceTemplate>,
    capabilities: ServerCapabilities,
    configuration: Configuration,
    context: ServerContext,
    handlers: MethodRegistry,
    transport: Option<Arc<dyn NotificationTransport>>,
    logging: Option<LoggingMessageNotification>,
}

/// Collects the construction-time inputs of an [`McpServer`].
pub struct McpServerBuilder {
    name: String,
    version: String,
    instructions: Option<String>,
    tools: Vec<Tool>,
    prompts: Vec<Prompt>,
    resources: Vec<Resource>,
    resource_templates: Vec<ResourceTemplate>,
    capabilities: Option<ServerCapabilities>,
    configuration: Configuration,
    context: ServerContext,
    transport: Option<Arc<dyn NotificationTransport>>,
}

impl McpServerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.1.0".to_string(),
            instructions: None,
            tools: Vec::new(),
            prompts: Vec::new(),
            resources: Vec::new(),
            resource_templates: Vec::new(),
            capabilities: None,
            configuration: Configuration::default(),
            context: ServerContext::default(),
            transport: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn prompts(mut self, prompts: impl IntoIterator<Item = Prompt>) -> Self {
        self.prompts.extend(prompts);
        self
    }

    pub fn resources(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.resources.extend(resources);
        self
    }

    pub fn resource_templates(
        mut self,
        templates: impl IntoIterator<Item = ResourceTemplate>,
    ) -> Self {
        self.resource_templates.extend(templates);
        self
    }

    pub fn capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Overrides merged on top of [`Configuration::default`].
    pub fn configuration(mut self, overrides: Configuration) -> Self {
        self.configuration = Configuration::default().merge(&overrides);
        self
    }

    pub fn context(mut self, context: ServerContext) -> Self {
        self.context = context;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn NotificationTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<McpServer, ConfigError> {
        self.configuration.validate()?;

        let server = McpServer {
            name: self.name,
            version: self.version,
            instructions: self.instructions,
            tools: self.tools.into_iter().collect(),
            prompts: self.prompts.into_iter().collect(),
            resources: self.resources.into_iter().collect(),
            resource_templates: self.resource_templates.into_iter().collect(),
            capabilities: self
                .capabilities
                .unwrap_or_else(ServerCapabilities::default_capabilities),
            configuration: self.configuration,
            context: self.context,
            handlers: MethodRegistry::with_defaults(),
            transport: self.transport,
            logging: None,
        };

        tracing::info!(
            "{} v{} ready: {} tools, {} prompts, {} resources, {} resource templates",
            server.name,
            server.version,
            server.tools.len(),
            server.prompts.len(),
            server.resources.len(),
            server.resource_templates.len()
        );

        Ok(server)
    }
}

impl McpServer {
    pub fn builder(name: impl Into<String>) -> McpServerBuilder {
        McpServerBuilder::new(name)
    }

    /// Dispatch one request.
    ///
    /// Returns `Ok(None)` when no handler is registered for `method`; unknown
    /// methods are not errors at this layer.
    pub fn handle(&self, method: &str, params: Option<Value>) -> Result<Option<Value>, DispatchError> {
        let started = Instant::now();
        let method = Method::parse(method);

        let Some(handler) = self.handlers.get(&method) else {
            tracing::debug!("No handler registered for {method}");
            self.finish(Instrumentation::new(UNSUPPORTED_METHOD), started);
            return Ok(None);
        };

        if let Err(e) = ensure_capability(&method, &self.capabilities) {
            self.finish(Instrumentation::new(method.as_str()), started);
            return Err(e);
        }

        let mut data = Instrumentation::new(method.as_str());
        let outcome = match self.run_handler(&method, handler, params.as_ref(), &mut data) {
            Ok(value) => Ok(Some(wrap_envelope(&method, value))),
            Err(e) => Err(self.normalize_error(&method, e, params, &mut data)),
        };
        self.finish(data, started);

        outcome.map_err(DispatchError::from)
    }

    fn run_handler(
        &self,
        method: &Method,
        handler: &Handler,
        params: Option<&Value>,
        data: &mut Instrumentation,
    ) -> anyhow::Result<Value> {
        match handler {
            Handler::Noop => Ok(Value::Object(Map::new())),
            Handler::Custom(f) => f(params),
            Handler::Builtin => match method {
                Method::Initialize => Ok(serde_json::to_value(self.initialize_result())?),
                Method::ToolsList => self.list_tools(),
                Method::ToolsCall => self.call_tool(params, data),
                Method::PromptsList => self.list_prompts(),
                Method::PromptsGet => self.get_prompt(params, data),
                Method::ResourcesList => self.list_resources(),
                Method::ResourcesRead => self.read_resource(params, data),
                Method::ResourcesTemplatesList => self.list_resource_templates(),
                _ => Ok(Value::Object(Map::new())),
            },
        }
    }

    fn normalize_error(
        &self,
        method: &Method,
        error: anyhow::Error,
        params: Option<Value>,
        data: &mut Instrumentation,
    ) -> HandlerError {
        self.configuration
            .report_exception(&error, &json!({ "request": params }));

        match error.downcast::<HandlerError>() {
            Ok(handler_error) => {
                data.error = Some(handler_error.kind.clone());
                handler_error
            }
            Err(other) => {
                data.error = Some(ErrorKind::InternalError);
                HandlerError::internal(format!("Internal error handling {method} request"), other)
                    .with_request(params)
            }
        }
    }

    fn finish(&self, mut data: Instrumentation, started: Instant) {
        data.duration = started.elapsed();
        match &data.error {
            Some(kind) => tracing::debug!(
                method = %data.method,
                duration_us = data.duration.as_micros() as u64,
                error = %kind,
                "request failed"
            ),
            None => tracing::debug!(
                method = %data.method,
                duration_us = data.duration.as_micros() as u64,
                "request handled"
            ),
        }
        self.configuration.instrument(&data);
    }

    pub fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: self.configuration.protocol_version().to_string(),
            capabilities: self.capabilities.clone(),
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
            },
            instructions: self.instructions.clone(),
        }
    }

    // ── registration ──────────────────────────────────────────

    /// Add or replace a tool. An existing tool with the same name is replaced.
    pub fn define_tool(&mut self, tool: Tool) {
        self.tools.insert(tool);
    }

    pub fn define_prompt(&mut self, prompt: Prompt) {
        self.prompts.insert(prompt);
    }

    pub fn define_resource(&mut self, resource: Resource) {
        self.resources.insert(resource);
    }

    pub fn define_resource_template(&mut self, template: ResourceTemplate) {
        self.resource_templates.insert(template);
    }

    /// Register a handler for a method that has none yet.
    pub fn define_custom_method(
        &mut self,
        name: &str,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) -> Result<(), MethodAlreadyDefined> {
        self.handlers.define_custom_method(name, Arc::new(handler))
    }

    pub fn tools_list_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::ToolsList, Arc::new(handler));
    }

    pub fn tools_call_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::ToolsCall, Arc::new(handler));
    }

    pub fn prompts_list_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::PromptsList, Arc::new(handler));
    }

    pub fn prompts_get_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::PromptsGet, Arc::new(handler));
    }

    pub fn resources_list_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::ResourcesList, Arc::new(handler));
    }

    /// Serve `resources/read`. The handler returns the `contents` array.
    pub fn resources_read_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::ResourcesRead, Arc::new(handler));
    }

    pub fn resources_templates_list_handler(
        &mut self,
        handler: impl Fn(Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    ) {
        self.handlers.set(Method::ResourcesTemplatesList, Arc::new(handler));
    }

    pub fn set_transport(&mut self, transport: Arc<dyn NotificationTransport>) {
        self.transport = Some(transport);
    }

    // ── accessors ─────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &Registry<Tool> {
        &self.tools
    }

    pub fn prompts(&self) -> &Registry<Prompt> {
        &self.prompts
    }

    pub fn resources(&self) -> &Registry<Resource> {
        &self.resources
    }

    pub fn resource_templates(&self) -> &Registry<ResourceTemplate> {
        &self.resource_templates
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Every method with a registered handler.
    pub fn methods(&self) -> Vec<&str> {
        self.handlers.methods()
    }
}

fn wrap_envelope(method: &Method, value: Value) -> Value {
    match method.envelope_key() {
        Some(key) => {
            let mut envelope = Map::new();
            envelope.insert(key.to_string(), value);
            Value::Object(envelope)
        }
        None => value,
    }
}
