use std::time::Duration;

use anyhow::{Context, Result};
use berezka_chat::quick_actions::QUICK_ACTIONS;
use berezka_chat::{constants, ChatController, ReplyConfig, ReplyProvider, SendOutcome};
use clap::Parser;
use tracing::info;

mod chat;

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct ModelArgs {
    /// Gemini API key; without one, canned replies are used.
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Gemini model id.
    #[arg(long, global = true, env = "GEMINI_MODEL")]
    model: Option<String>,
    /// Base URL of the Gemini API.
    #[arg(long, global = true, env = "GEMINI_BASE_URL")]
    base_url: Option<String>,
    /// Pause between characters of a canned reply, in milliseconds.
    #[arg(long, global = true, env = "BEREZKA_FALLBACK_DELAY_MS")]
    fallback_delay_ms: Option<u64>,
}

impl ModelArgs {
    fn into_config(self) -> ReplyConfig {
        let mut config = ReplyConfig::from_env();
        if self.api_key.is_some() {
            config.api_key = self.api_key;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(ms) = self.fallback_delay_ms {
            config.fallback_delay = Duration::from_millis(ms);
        }
        config
    }
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session with the booking assistant.
    Chat,
    /// Send a single message and print the streamed reply.
    Ask {
        #[arg(help = "Message to send, e.g. \"Про беседки\".")]
        message: String,
    },
    /// List the quick-action labels.
    Actions,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for the Gemini API key)
    dotenvy::dotenv().ok();

    // Logs go to stderr so streamed replies on stdout stay readable.
    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,berezka_chat=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Berezka chat starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Chat => {
            let controller = build_controller(cli.model)?;
            chat::run_chat(controller)
                .await
                .context("Chat session failed")?;
        }
        Commands::Ask { message } => {
            let mut controller = build_controller(cli.model)?;
            match chat::send_and_print(&mut controller, &message).await {
                SendOutcome::Replied(_) => {}
                SendOutcome::CalculatorOpened => {
                    println!("Калькулятор доступен в режиме `chat`.");
                }
                SendOutcome::Ignored => anyhow::bail!("Message is empty"),
            }
        }
        Commands::Actions => {
            for action in QUICK_ACTIONS {
                println!("{}", action);
            }
        }
    }

    Ok(())
}

fn build_controller(args: ModelArgs) -> Result<ChatController> {
    let config = args.into_config();
    if config.credential().is_none() {
        info!(
            "No API key (or {}) configured; replies are canned",
            constants::PLACEHOLDER_API_KEY
        );
    }
    let provider = ReplyProvider::new(&config).context("Failed to initialize reply provider")?;
    Ok(ChatController::new(provider))
}
