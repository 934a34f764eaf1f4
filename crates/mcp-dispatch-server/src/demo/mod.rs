//! The tools, prompts and resources served by the binary.

use mcp_dispatch::schema::SchemaError;
use mcp_dispatch::*;
use serde_json::{json, Value};

pub const SERVER_NAME: &str = "mcp-dispatch-server";
pub const README_URI: &str = "demo://readme";
const ECHO_PREFIX: &str = "demo://echo/";

const README: &str = "# mcp-dispatch demo\n\nTools: echo, add, whoami. Prompt: greet.\n";

/// A builder preloaded with the demo catalogue. Callers add configuration,
/// capabilities and a transport before building.
pub fn builder() -> Result<McpServerBuilder, SchemaError> {
    Ok(McpServer::builder(SERVER_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .instructions("Demo server. Call `add` with two integers or `echo` with a message.")
        .tools(tools()?)
        .prompts(prompts())
        .resources(resources())
        .resource_templates(resource_templates())
        .context(ServerContext::new().with("server", SERVER_NAME)))
}

/// Install the `resources/read` handler for the demo URIs.
pub fn install_resource_reader(server: &mut McpServer) {
    server.resources_read_handler(|params| {
        let uri = params
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let contents = read_resource(uri)?;
        Ok(serde_json::to_value(vec![contents])?)
    });
}

fn read_resource(uri: &str) -> Result<ResourceContents, HandlerError> {
    if uri == README_URI {
        return Ok(ResourceContents::text(uri, Some("text/markdown"), README));
    }
    if let Some(text) = uri.strip_prefix(ECHO_PREFIX) {
        return Ok(ResourceContents::text(uri, Some("text/plain"), text));
    }
    Err(HandlerError::custom(
        "resource_not_found",
        format!("Resource not found {uri}"),
    ))
}

fn tools() -> Result<Vec<Tool>, SchemaError> {
    let echo = Tool::new("echo", |args| {
        Ok(ToolResponse::text(
            args["message"].as_str().unwrap_or_default(),
        ))
    })
    .title("Echo")
    .description("Return the message unchanged")
    .input_schema(InputSchema::new(json!({
        "type": "object",
        "properties": { "message": { "type": "string" } },
        "required": ["message"]
    }))?)
    .annotations(ToolAnnotations {
        read_only_hint: Some(true),
        ..Default::default()
    });

    let add = Tool::new("add", |args| {
        let a = args["a"].as_i64().unwrap_or_default();
        let b = args["b"].as_i64().unwrap_or_default();
        let sum = a
            .checked_add(b)
            .ok_or_else(|| anyhow::anyhow!("{a} + {b} overflows"))?;
        Ok(ToolResponse::text(sum.to_string()))
    })
    .description("Add two integers")
    .input_schema(InputSchema::new(json!({
        "type": "object",
        "properties": {
            "a": { "type": "integer" },
            "b": { "type": "integer" }
        },
        "required": ["a", "b"],
        "additionalProperties": false
    }))?);

    let whoami = Tool::with_context("whoami", |_, ctx| {
        Ok(ToolResponse::json(&json!({ "server": ctx.get_str("server") })))
    })
    .description("Report which server answered");

    Ok(vec![echo, add, whoami])
}

fn prompts() -> Vec<Prompt> {
    let greet = Prompt::new("greet", |args| {
        let name = args["name"].as_str().unwrap_or_default();
        let style = args["style"].as_str().unwrap_or("friendly");
        Ok(PromptResult {
            description: Some(format!("Greeting for {name}")),
            messages: vec![PromptMessage::user(format!(
                "Write a short {style} greeting for {name}."
            ))],
        })
    })
    .description("Draft a greeting")
    .argument(PromptArgument::required("name", "Who to greet"))
    .argument(PromptArgument::optional("style", "Tone of the greeting"));

    vec![greet]
}

fn resources() -> Vec<Resource> {
    vec![Resource::new(README_URI, "README")
        .description("What this server offers")
        .mime_type("text/markdown")]
}

fn resource_templates() -> Vec<ResourceTemplate> {
    vec![ResourceTemplate::new(format!("{ECHO_PREFIX}{{text}}"), "Echo")
        .description("Reads back the path segment")
        .mime_type("text/plain")]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_server() -> McpServer {
        let mut server = builder().unwrap().build().unwrap();
        install_resource_reader(&mut server);
        server
    }

    #[test]
    fn test_catalogue() {
        let server = demo_server();
        assert_eq!(server.tools().len(), 3);
        assert!(server.prompts().contains("greet"));
        assert!(server.resources().contains(README_URI));
        assert!(server.resource_templates().contains("demo://echo/{text}"));
    }

    #[test]
    fn test_add_overflow_is_internal_error() {
        let server = demo_server();
        let err = server
            .handle(
                "tools/call",
                Some(json!({ "name": "add", "arguments": { "a": i64::MAX, "b": 1 } })),
            )
            .unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::InternalError));
    }

    #[test]
    fn test_read_echo_template() {
        let server = demo_server();
        let result = server
            .handle("resources/read", Some(json!({ "uri": "demo://echo/hi" })))
            .unwrap()
            .unwrap();
        assert_eq!(result["contents"][0]["text"], "hi");
    }

    #[test]
    fn test_read_unknown_resource() {
        let server = demo_server();
        let err = server
            .handle("resources/read", Some(json!({ "uri": "demo://nope" })))
            .unwrap_err();
        assert_eq!(err.kind(), Some(&ErrorKind::Custom("resource_not_found".into())));
    }
}
