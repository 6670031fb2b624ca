//! Mirror - a self-reflection chat
//!
//! Two faces of one binary:
//! - `mirror serve` runs the relay in front of the AI gateway
//! - `mirror chat` (the default) opens the gated chat shell against a relay

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use mirror::config::{self, ClientConfig, Config, RelayConfig};
use mirror::relay::RelayServer;
use mirror::repl;

#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "A mirror that talks back", version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chat options when no subcommand is given
    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay that forwards chats to the AI gateway
    Serve(ServeArgs),

    /// Open the chat shell (default)
    Chat(ChatArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "MIRROR_HOST")]
    host: Option<String>,

    /// Port to bind (default: 8787)
    #[arg(long, env = "MIRROR_PORT")]
    port: Option<u16>,

    /// Chat-completions endpoint of the AI gateway
    #[arg(long, env = "AI_GATEWAY_URL")]
    upstream_url: Option<String>,

    /// Bearer key for the AI gateway
    #[arg(long, env = "AI_GATEWAY_API_KEY", hide_env_values = true)]
    upstream_api_key: Option<String>,

    /// Model identifier sent upstream
    #[arg(long, env = "AI_GATEWAY_MODEL")]
    model: Option<String>,

    /// Require this bearer key from clients
    #[arg(long, env = "MIRROR_CLIENT_KEY", hide_env_values = true)]
    client_key: Option<String>,
}

#[derive(Args)]
struct ChatArgs {
    /// Relay endpoint to talk to
    #[arg(long, env = "MIRROR_RELAY_URL")]
    relay_url: Option<String>,

    /// Bearer key presented to the relay
    #[arg(long, env = "MIRROR_CLIENT_KEY", hide_env_values = true)]
    client_key: Option<String>,

    /// Password for the gate
    #[arg(long, env = "MIRROR_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from ~/.mirror/.env or current dir)
    config::load_dotenv();

    // Logs go to stderr so they never interleave with streamed replies
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mirror=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config file (~/.mirror/config.toml)
    let file = Config::load();

    // CLI args > env vars (handled by clap) > config file > defaults
    match cli.command.unwrap_or(Commands::Chat(cli.chat)) {
        Commands::Serve(args) => {
            let relay = RelayConfig::resolve(
                &file,
                args.host,
                args.port,
                args.upstream_url,
                args.upstream_api_key,
                args.model,
                args.client_key,
            );
            RelayServer::new(relay).run().await
        }
        Commands::Chat(args) => {
            let client =
                ClientConfig::resolve(&file, args.relay_url, args.client_key, args.password);
            repl::run(client).await?;
            Ok(())
        }
    }
}
