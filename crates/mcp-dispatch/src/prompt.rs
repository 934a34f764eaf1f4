//! Prompt definitions: declared arguments, validation and the template callable.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ServerContext;
use crate::registry::Keyed;
use crate::types::PromptResult;

pub type PromptFn = Arc<dyn Fn(&Value) -> anyhow::Result<PromptResult> + Send + Sync>;
pub type ContextPromptFn =
    Arc<dyn Fn(&Value, &ServerContext) -> anyhow::Result<PromptResult> + Send + Sync>;
pub type ArgumentValidator = Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl PromptArgument {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            required: false,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required prompt arguments: {}", .0.join(", "))]
pub struct PromptArgumentError(pub Vec<String>);

/// Canonical `prompts/list` entry.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Clone)]
enum PromptTemplate {
    Plain(PromptFn),
    WithContext(ContextPromptFn),
}

/// A named template exposed through `prompts/get`.
#[derive(Clone)]
pub struct Prompt {
    name: String,
    title: Option<String>,
    description: Option<String>,
    arguments: Vec<PromptArgument>,
    validator: Option<ArgumentValidator>,
    template: PromptTemplate,
}

impl Prompt {
    pub fn new(
        name: impl Into<String>,
        render: impl Fn(&Value) -> anyhow::Result<PromptResult> + Send + Sync + 'static,
    ) -> Self {
        Self::from_template(name.into(), PromptTemplate::Plain(Arc::new(render)))
    }

    pub fn with_context(
        name: impl Into<String>,
        render: impl Fn(&Value, &ServerContext) -> anyhow::Result<PromptResult>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::from_template(name.into(), PromptTemplate::WithContext(Arc::new(render)))
    }

    fn from_template(name: String, template: PromptTemplate) -> Self {
        Self {
            name,
            title: None,
            description: None,
            arguments: Vec::new(),
            validator: None,
            template,
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

    pub fn argument(mut self, argument: PromptArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Replace the default required-argument check with a custom contract.
    pub fn validator(
        mut self,
        validate: impl Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[PromptArgument] {
        &self.arguments
    }

    pub fn accepts_context(&self) -> bool {
        matches!(self.template, PromptTemplate::WithContext(_))
    }

    pub fn validate_arguments(&self, arguments: &Value) -> anyhow::Result<()> {
        if let Some(validate) = &self.validator {
            return validate(arguments);
        }

        let provided = arguments.as_object();
        let missing: Vec<String> = self
            .arguments()
            .iter()
            .filter(|arg| arg.required)
            .filter(|arg| !provided.is_some_and(|args| args.contains_key(&arg.name)))
            .map(|arg| arg.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PromptArgumentError(missing).into())
        }
    }

    pub fn render(&self, arguments: &Value, context: &ServerContext) -> anyhow::Result<PromptResult> {
        match &self.template {
            PromptTemplate::Plain(f) => f(arguments),
            PromptTemplate::WithContext(f) => f(arguments, context),
        }
    }

    pub fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

impl Keyed for Prompt {
    const KIND: &'static str = "prompt";

    fn key(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("accepts_context", &self.accepts_context())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptMessage;
    use serde_json::json;

    fn greet() -> Prompt {
        Prompt::new("greet", |args| {
            Ok(PromptResult {
                description: None,
                messages: vec![PromptMessage::user(format!("Hello {}", args["who"]))],
            })
        })
        .argument(PromptArgument::required("who", "Who to greet"))
        .argument(PromptArgument::optional("tone", "Tone of voice"))
    }

    #[test]
    fn test_default_validation_checks_required_only() {
        let prompt = greet();
        assert!(prompt.validate_arguments(&json!({ "who": "ada" })).is_ok());

        let err = prompt.validate_arguments(&json!({ "tone": "warm" })).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PromptArgumentError>(),
            Some(&PromptArgumentError(vec!["who".into()]))
        );
    }

    #[test]
    fn test_custom_validator_replaces_default() {
        let prompt = greet().validator(|_| anyhow::bail!("never valid"));
        let err = prompt.validate_arguments(&json!({ "who": "ada" })).unwrap_err();
        assert_eq!(err.to_string(), "never valid");
    }

    #[test]
    fn test_arguments_keep_declaration_order() {
        let prompt = greet();
        let names: Vec<&str> = prompt.arguments().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["who", "tone"]);
        assert!(prompt.arguments()[0].required);
    }

    #[test]
    fn test_definition_lists_arguments() {
        let value = serde_json::to_value(greet().description("Say hi").definition()).unwrap();
        assert_eq!(value["name"], "greet");
        assert_eq!(value["arguments"][0], json!({ "name": "who", "description": "Who to greet", "required": true }));
        assert_eq!(value["arguments"][1]["required"], false);
    }
}
