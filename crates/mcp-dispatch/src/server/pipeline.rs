//! Default handlers for the list, call, get and read methods.

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::HandlerError;
use crate::instrumentation::Instrumentation;
use crate::methods::Method;
use crate::prompt::Prompt;
use crate::tool::Tool;

use super::McpServer;

#[derive(Debug, Deserialize)]
struct CallToolParams {
    /// Absent names fall through to the not-found path.
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GetPromptParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

fn parse_params<T: DeserializeOwned>(method: &Method, params: Option<&Value>) -> anyhow::Result<T> {
    let raw = params
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(raw).with_context(|| format!("Invalid params for {method}"))
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

impl McpServer {
    pub(super) fn list_tools(&self) -> anyhow::Result<Value> {
        let tools: Vec<_> = self.tools.iter().map(Tool::definition).collect();
        Ok(serde_json::to_value(tools)?)
    }

    pub(super) fn list_prompts(&self) -> anyhow::Result<Value> {
        let prompts: Vec<_> = self.prompts.iter().map(Prompt::definition).collect();
        Ok(serde_json::to_value(prompts)?)
    }

    pub(super) fn list_resources(&self) -> anyhow::Result<Value> {
        let resources: Vec<_> = self.resources.iter().collect();
        Ok(serde_json::to_value(resources)?)
    }

    pub(super) fn list_resource_templates(&self) -> anyhow::Result<Value> {
        let templates: Vec<_> = self.resource_templates.iter().collect();
        Ok(serde_json::to_value(templates)?)
    }

    /// `resources/read` without an override: records the URI, returns nothing.
    pub(super) fn read_resource(
        &self,
        params: Option<&Value>,
        data: &mut Instrumentation,
    ) -> anyhow::Result<Value> {
        let params: ReadResourceParams = parse_params(&Method::ResourcesRead, params)?;
        tracing::debug!("No resources/read handler installed for {}", params.uri);
        data.resource_uri = Some(params.uri);
        Ok(Value::Array(Vec::new()))
    }

    /// Lookup, required-argument check, optional schema validation, invoke.
    pub(super) fn call_tool(
        &self,
        params: Option<&Value>,
        data: &mut Instrumentation,
    ) -> anyhow::Result<Value> {
        let request = params.cloned();
        let params: CallToolParams = parse_params(&Method::ToolsCall, params)?;

        let Some(tool) = self.tools.get(&params.name) else {
            return Err(HandlerError::tool_not_found(&params.name)
                .with_request(request)
                .into());
        };
        data.tool_name = Some(tool.name().to_string());

        let arguments = params.arguments.unwrap_or_else(empty_arguments);

        let missing = tool.schema().missing_required_arguments(&arguments);
        if !missing.is_empty() {
            return Err(HandlerError::missing_required_arguments(&missing)
                .with_request(request)
                .into());
        }

        if self.configuration.validate_tool_call_arguments() {
            if let Err(e) = tool.schema().validate_arguments(&arguments) {
                return Err(HandlerError::invalid_schema(e.to_string())
                    .with_request(request)
                    .into());
            }
        }

        tool.call(&arguments, &self.context)
            .and_then(|response| Ok(serde_json::to_value(response)?))
            .map_err(|e| -> anyhow::Error {
                match e.downcast::<HandlerError>() {
                    Ok(handler_error) => handler_error.into(),
                    Err(other) => HandlerError::internal(
                        format!("Internal error calling tool {}", tool.name()),
                        other,
                    )
                    .with_request(request)
                    .into(),
                }
            })
    }

    /// Lookup, the prompt's own argument contract, render.
    pub(super) fn get_prompt(
        &self,
        params: Option<&Value>,
        data: &mut Instrumentation,
    ) -> anyhow::Result<Value> {
        let request = params.cloned();
        let params: GetPromptParams = parse_params(&Method::PromptsGet, params)?;

        let Some(prompt) = self.prompts.get(&params.name) else {
            return Err(HandlerError::prompt_not_found(&params.name)
                .with_request(request)
                .into());
        };
        data.prompt_name = Some(prompt.name().to_string());

        let arguments = params.arguments.unwrap_or_else(empty_arguments);
        prompt.validate_arguments(&arguments)?;
        let result = prompt.render(&arguments, &self.context)?;
        Ok(serde_json::to_value(result)?)
    }
}
