use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use slack_mcp::tools::{ChannelsListTool, ToolRegistry};
use slack_mcp::McpServer;
use slack_mcp_core::demo::DemoAuthenticator;
use slack_mcp_core::{Authenticator, ChannelsService, SessionProvider};
use slack_mcp_sdk::{SlackAuthenticator, SlackClient};
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;
mod middleware;

use config::ServerConfig;

const DEMO_TOKEN: &str = "demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "slack-mcp-server")]
#[command(about = "Model Context Protocol server for Slack workspaces", long_about = None)]
struct Args {
    /// Transport type
    #[arg(short, long, value_enum, default_value = "stdio")]
    transport: Transport,

    /// Path to configuration file
    #[arg(short, long, default_value = "slack-mcp.toml")]
    config: PathBuf,

    /// Host to bind to (http transport)
    #[arg(long, env = "SLACK_MCP_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (http transport)
    #[arg(short, long, env = "SLACK_MCP_PORT", default_value = "13080")]
    port: u16,

    /// Browser session token
    #[arg(long, env = "SLACK_MCP_XOXC_TOKEN", hide_env_values = true)]
    xoxc_token: Option<String>,

    /// Browser session `d` cookie
    #[arg(long, env = "SLACK_MCP_XOXD_TOKEN", hide_env_values = true)]
    xoxd_token: Option<String>,

    /// User or bot token, used when no browser session pair is set
    #[arg(long, env = "SLACK_MCP_XOXP_TOKEN", hide_env_values = true)]
    xoxp_token: Option<String>,
}

impl Args {
    fn is_demo(&self) -> bool {
        self.xoxc_token.as_deref() == Some(DEMO_TOKEN) && self.xoxd_token.as_deref() == Some(DEMO_TOKEN)
    }
}

/// Pick the session strategy from the configured credentials
fn build_authenticator(args: &Args, config: &ServerConfig) -> Result<Arc<dyn Authenticator>> {
    if args.is_demo() {
        tracing::info!("Demo credentials are set, serving fixture data");
        return Ok(Arc::new(DemoAuthenticator));
    }

    let builder = SlackClient::builder()
        .base_url(config.slack.base_url.clone())
        .timeout(config.slack_timeout())
        .retry_config(config.retry_config());

    let builder = match (&args.xoxc_token, &args.xoxd_token, &args.xoxp_token) {
        (Some(xoxc), Some(xoxd), _) => builder.browser_session(xoxc.clone(), xoxd.clone()),
        (_, _, Some(xoxp)) => builder.token(xoxp.clone()),
        _ => anyhow::bail!(
            "Slack credentials missing: set SLACK_MCP_XOXC_TOKEN and SLACK_MCP_XOXD_TOKEN, or SLACK_MCP_XOXP_TOKEN"
        ),
    };

    Ok(Arc::new(SlackAuthenticator::new(builder)))
}

fn build_server(provider: Arc<SessionProvider>, config: &ServerConfig) -> McpServer {
    let service = Arc::new(ChannelsService::new(provider, config.fetch_options()));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(
        ChannelsListTool::new(service).with_timeout(config.tool_timeout()),
    ));
    tracing::info!("Registered {} tools", registry.list_schemas().len());

    McpServer::new(registry)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries protocol frames on the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "slack_mcp=info,slack_mcp_server=info,slack_mcp_core=info,slack_mcp_sdk=info,tower_http=debug"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Slack MCP server ({:?} transport)", args.transport);

    let config = ServerConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let authenticator = build_authenticator(&args, &config)?;
    let provider = Arc::new(
        SessionProvider::new(authenticator).with_bootstrap_wait(config.bootstrap_wait()),
    );
    let server = Arc::new(build_server(provider.clone(), &config));

    // Boot the session alongside the transport; failure at boot is fatal
    let boot_provider = provider.clone();
    let boot = tokio::spawn(async move { boot_provider.bootstrap().await.map(|_| ()) });

    let serve = async {
        match args.transport {
            Transport::Stdio => slack_mcp::stdio::serve_stdio(server.clone())
                .await
                .context("stdio transport failed"),
            Transport::Http => {
                let addr = format!("{}:{}", args.host, args.port);
                let state = api::AppState {
                    mcp: server.clone(),
                    provider: provider.clone(),
                };
                api::serve(&addr, state).await.context("HTTP transport failed")
            }
        }
    };
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result,
        boot_result = boot => {
            match boot_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(kind = e.kind(), causes = ?e.causes(), "Error booting Slack session");
                    return Err(anyhow::Error::new(e).context("Failed to boot Slack session"));
                }
                Err(e) => return Err(anyhow::Error::new(e).context("Session bootstrap task panicked")),
            }
        }
    }

    serve.await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["slack-mcp-server"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        assert_eq!(args.transport, Transport::Stdio);
        assert_eq!(args.config, PathBuf::from("slack-mcp.toml"));
    }

    #[test]
    fn test_transport_flag() {
        assert_eq!(args(&["-t", "http"]).transport, Transport::Http);
        assert_eq!(args(&["--transport", "stdio"]).transport, Transport::Stdio);
        assert!(Args::try_parse_from(["slack-mcp-server", "-t", "sse"]).is_err());
    }

    #[test]
    fn test_demo_requires_both_tokens() {
        assert!(args(&["--xoxc-token", "demo", "--xoxd-token", "demo"]).is_demo());
        assert!(!args(&["--xoxc-token", "demo", "--xoxd-token", "xoxd-real"]).is_demo());
    }

    #[test]
    fn test_authenticator_selection() {
        let config = ServerConfig::default();

        let demo = args(&["--xoxc-token", "demo", "--xoxd-token", "demo"]);
        assert!(build_authenticator(&demo, &config).is_ok());

        let pair = args(&["--xoxc-token", "xoxc-1", "--xoxd-token", "xoxd-1"]);
        assert!(build_authenticator(&pair, &config).is_ok());

        let token = args(&["--xoxp-token", "xoxp-1"]);
        assert!(build_authenticator(&token, &config).is_ok());

        let half_pair = args(&["--xoxc-token", "xoxc-1"]);
        assert!(build_authenticator(&half_pair, &config).is_err());
    }
}
