//! mcp-dispatch-server entry point.

use std::sync::Arc;
use tokio::sync::Mutex;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use mcp_dispatch::capabilities::LoggingCapability;
use mcp_dispatch::{LoggingLevel, ServerCapabilities};
use mcp_dispatch_server::protocol::ProtocolHandler;
use mcp_dispatch_server::transport::{FrameWriter, StdioTransport};
use mcp_dispatch_server::{demo, resolve_configuration};

#[derive(Parser)]
#[command(
    name = "mcp-dispatch-server",
    about = "Stdio MCP server built on mcp-dispatch",
    version
)]
struct Cli {
    /// Log level for stderr output (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Protocol version to advertise (overrides MCP_PROTOCOL_VERSION).
    #[arg(long)]
    protocol_version: Option<String>,

    /// Skip JSON Schema validation of tool arguments.
    #[arg(long)]
    no_validate_arguments: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve {
        /// Forward log notifications at or above this level to the client
        /// (debug, info, notice, warning, error, critical, alert, emergency).
        #[arg(long)]
        client_log_level: Option<LoggingLevel>,
    },

    /// Print server capabilities and catalogue as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   mcp-dispatch-server completions bash > ~/.local/share/bash-completion/completions/mcp-dispatch-server
    ///   mcp-dispatch-server completions zsh > ~/.zfunc/_mcp-dispatch-server
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let configuration =
        resolve_configuration(cli.protocol_version.as_deref(), cli.no_validate_arguments)?;

    match cli.command.unwrap_or(Commands::Serve {
        client_log_level: None,
    }) {
        Commands::Serve { client_log_level } => {
            let writer = FrameWriter::stdout();

            let mut capabilities = ServerCapabilities::default_capabilities();
            if client_log_level.is_some() {
                capabilities.logging = Some(LoggingCapability::default());
            }

            let mut server = demo::builder()?
                .configuration(configuration)
                .capabilities(capabilities)
                .transport(Arc::new(writer.clone()))
                .build()?;
            demo::install_resource_reader(&mut server);
            if let Some(level) = client_log_level {
                server.configure_logging_level(level);
            }

            let handler = ProtocolHandler::new(Arc::new(Mutex::new(server)));
            let transport = StdioTransport::new(handler, writer);
            transport.run().await?;
        }

        Commands::Info => {
            let server = demo::builder()?.configuration(configuration).build()?;
            let init = server.initialize_result();
            let info = serde_json::json!({
                "server": init.server_info,
                "protocol_version": init.protocol_version,
                "capabilities": init.capabilities,
                "tools": server.tools().iter().map(|t| t.name()).collect::<Vec<_>>(),
                "prompts": server
                    .prompts()
                    .iter()
                    .map(|p| {
                        let arguments: Vec<&str> =
                            p.arguments().iter().map(|a| a.name.as_str()).collect();
                        serde_json::json!({ "name": p.name(), "arguments": arguments })
                    })
                    .collect::<Vec<_>>(),
                "resources": server.resources().iter().map(|r| &r.uri).collect::<Vec<_>>(),
                "methods": server.methods(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(
                shell,
                &mut cmd,
                "mcp-dispatch-server",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
