//! Resolve the dispatch configuration for the binary.
//!
//! Precedence: command-line flags, then `MCP_*` environment variables, then
//! the library defaults.

use mcp_dispatch::error::ConfigError;
use mcp_dispatch::Configuration;

pub fn resolve_configuration(
    protocol_version: Option<&str>,
    skip_argument_validation: bool,
) -> Result<Configuration, ConfigError> {
    let mut overrides = Configuration::new();
    if let Some(version) = protocol_version {
        overrides = overrides.with_protocol_version(version);
    }
    if skip_argument_validation {
        overrides = overrides.with_validate_tool_call_arguments(false);
    }

    let resolved = Configuration::from_env()?.merge(&overrides);
    resolved.validate()?;
    Ok(resolved)
}
