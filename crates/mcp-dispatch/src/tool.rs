//! Tool definitions: metadata, input schema and the invocation callable.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ServerContext;
use crate::registry::Keyed;
use crate::schema::InputSchema;
use crate::types::ToolResponse;

pub type ToolFn = Arc<dyn Fn(&Value) -> anyhow::Result<ToolResponse> + Send + Sync>;
pub type ContextToolFn =
    Arc<dyn Fn(&Value, &ServerContext) -> anyhow::Result<ToolResponse> + Send + Sync>;

/// Behavioural hints shown to clients alongside the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

/// Canonical `tools/list` entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: InputSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

#[derive(Clone)]
enum ToolCallable {
    Plain(ToolFn),
    WithContext(ContextToolFn),
}

/// A named callable exposed through `tools/call`.
///
/// Whether the callable receives the [`ServerContext`] is fixed by the
/// constructor: [`Tool::new`] never passes it, [`Tool::with_context`] always does.
#[derive(Clone)]
pub struct Tool {
    name: String,
    title: Option<String>,
    description: Option<String>,
    input_schema: InputSchema,
    annotations: Option<ToolAnnotations>,
    callable: ToolCallable,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        call: impl Fn(&Value) -> anyhow::Result<ToolResponse> + Send + Sync + 'static,
    ) -> Self {
        Self::from_callable(name.into(), ToolCallable::Plain(Arc::new(call)))
    }

    pub fn with_context(
        name: impl Into<String>,
        call: impl Fn(&Value, &ServerContext) -> anyhow::Result<ToolResponse>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::from_callable(name.into(), ToolCallable::WithContext(Arc::new(call)))
    }

    fn from_callable(name: String, callable: ToolCallable) -> Self {
        Self {
            name,
            title: None,
            description: None,
            input_schema: InputSchema::empty(),
            annotations: None,
            callable,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_schema(mut self, schema: InputSchema) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &InputSchema {
        &self.input_schema
    }

    pub fn accepts_context(&self) -> bool {
        matches!(self.callable, ToolCallable::WithContext(_))
    }

    pub fn call(&self, arguments: &Value, context: &ServerContext) -> anyhow::Result<ToolResponse> {
        match &self.callable {
            ToolCallable::Plain(f) => f(arguments),
            ToolCallable::WithContext(f) => f(arguments, context),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl Keyed for Tool {
    const KIND: &'static str = "tool";

    fn key(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("accepts_context", &self.accepts_context())
            .finish_non_exhaustive()
    }
}
