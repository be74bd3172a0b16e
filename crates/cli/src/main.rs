mod command;
mod player;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use catalog::{CatalogError, GatewayConfig, HttpGateway, PlaybackController};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::command::Command;

#[derive(Parser)]
#[command(
    name = "hls-viewer",
    about = "Browse and play HLS streams relayed from RTSP sources"
)]
struct Args {
    /// Backend base URL [default: $API_URL or http://localhost:8080]
    #[arg(long, short)]
    base_url: Option<String>,

    /// Request timeout in seconds [default: $API_TIMEOUT_SECS or 30]
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Player command run with the playlist URL (e.g. "mpv --really-quiet")
    #[arg(long, short)]
    player: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn gateway_config(&self) -> GatewayConfig {
        let mut config = match &self.base_url {
            Some(base) => GatewayConfig::new(base),
            None => GatewayConfig::from_env(),
        };
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.gateway_config();
    let gateway = HttpGateway::new(config.clone())
        .with_context(|| format!("cannot use backend at {}", config.base_url))?;
    let controller = PlaybackController::new(Arc::new(gateway));

    tracing::info!(base_url = %config.base_url, "connecting to backend");

    let player = tokio::spawn(player::drive(controller.subscribe(), args.player.clone()));

    // Runs alongside user input so streams can be added before the listing lands.
    tokio::spawn({
        let controller = controller.clone();
        async move {
            if let Err(e) = controller.load().await {
                eprintln!("could not load streams: {}", describe(&e));
            }
        }
    });

    println!("{}", command::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => run(&controller, cmd),
            Err(msg) => eprintln!("{msg}"),
        }
    }

    player.abort();
    Ok(())
}

fn run(controller: &PlaybackController, cmd: Command) {
    match cmd {
        Command::Empty | Command::Quit => {}
        Command::Help => println!("{}", command::HELP),
        Command::List => print_catalog(controller),
        Command::Select(index) => {
            if let Err(e) = controller.on_select_stream(index) {
                eprintln!("{}", describe(&e));
            }
        }
        Command::Add { uri, alias } => {
            let controller = controller.clone();
            tokio::spawn(async move {
                match controller
                    .on_add_stream_with_alias(&uri, alias.as_deref())
                    .await
                {
                    Ok(index) => println!("added stream #{index}"),
                    Err(e) => eprintln!("could not add {uri}: {}", describe(&e)),
                }
            });
        }
    }
}

fn print_catalog(controller: &PlaybackController) {
    let snapshot = controller.snapshot();
    if snapshot.entries.is_empty() {
        println!("no streams yet; add one with `add <rtsp-uri>`");
        return;
    }
    for (i, entry) in snapshot.entries.iter().enumerate() {
        let marker = if snapshot.selection == Some(i) { '>' } else { ' ' };
        println!("{marker} {i:>2}  {:<16} {}", entry.display_name(), entry.playback_url);
    }
}

fn describe(err: &CatalogError) -> String {
    if err.is_transport_like() {
        format!("backend unavailable ({err})")
    } else {
        err.to_string()
    }
}
