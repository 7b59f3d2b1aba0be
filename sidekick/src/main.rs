//! Interactive coding agent for the terminal.
//!
//! Converses with a model that proposes file operations against the current
//! working directory; every operation is confirmed on the console before it
//! is applied. There is no sandbox beyond that confirmation and the
//! working-directory boundary, and no undo: review proposals before
//! accepting them.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sidekick::io::config::{AgentConfig, CONFIG_FILE, api_key_from_env, load_config, resolve_api_key};
use sidekick::io::console::{Console, StdioConsole};
use sidekick::io::model::GeminiClient;
use sidekick::logging;
use sidekick::repl::{self, Session};

#[derive(Parser)]
#[command(
    name = "sidekick",
    version,
    about = "Interactive coding agent for your terminal"
)]
struct Cli {
    /// Model id override (e.g. gemini-2.5-flash).
    #[arg(long)]
    model: Option<String>,

    /// Config file path (default: .sidekick.toml in the working directory).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;

    let config_path = cli
        .config
        .unwrap_or_else(|| root.join(CONFIG_FILE));
    let mut config: AgentConfig = load_config(&config_path)?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    let api_key = resolve_api_key(api_key_from_env(), &config)?;
    let client = GeminiClient::new(
        api_key,
        config.model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("build model client")?;

    let mut console = StdioConsole::new();
    console.say(&format!(
        "sidekick ({} in {})\ntype 'quit' or 'q' to exit, '@help' for directives",
        config.model,
        root.display()
    ));

    let mut session = Session::new(root, config)?;
    repl::run(&mut session, &client, &mut console)
}
