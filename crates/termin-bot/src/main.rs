use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use termin_core::poll::option_glyph;
use termin_core::transport::{ChatUser, InboundMessage};
use termin_core::{CommandEngine, PollRegistry};
use termin_store::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod console;

use console::ConsoleTransport;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("termin_bot=info,termin_core=info,termin_store=info")),
        )
        .init();

    let args = cli::Args::parse();
    let mut config = config::Config::load(&args.config)?;
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    let store = Arc::new(FileStore::open(&config.storage.data_dir)?);
    let registry = Arc::new(PollRegistry::new(store.clone()));
    let restored = registry.restore().await;
    tracing::info!(restored, "poll registry ready");

    let transport = Arc::new(ConsoleTransport::new(
        config.storage.data_dir.join("outbox"),
    )?);
    let operator = ChatUser {
        id: "0".to_string(),
        name: config.bot.operator.clone(),
    };
    transport.join(operator.clone());

    let engine = CommandEngine::new(
        registry,
        transport.clone(),
        store,
        config.bot.channel.clone(),
    );

    run_console(engine, transport, operator, &config.bot.channel).await
}

/// Read-eval loop over stdin. Plain lines are chat messages from the
/// operator; lines starting with `:` are simulator controls.
async fn run_console(
    engine: CommandEngine,
    transport: Arc<ConsoleTransport>,
    operator: ChatUser,
    channel: &str,
) -> Result<()> {
    println!("termin-bot console on #{channel}. Chat commands start with '!', simulator controls with ':' (:help).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut message_seq = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(control) = line.strip_prefix(':') {
            if !handle_control(&transport, control) {
                break;
            }
            continue;
        }
        message_seq += 1;
        let message = InboundMessage {
            id: format!("op-{message_seq}"),
            channel: channel.to_string(),
            author: operator.clone(),
            author_is_bot: false,
            content: line.to_string(),
        };
        engine.handle(&message).await;
    }
    Ok(())
}

/// Returns `false` when the loop should exit.
fn handle_control(transport: &ConsoleTransport, control: &str) -> bool {
    let mut words = control.split_whitespace();
    match words.next() {
        Some("quit") => return false,
        Some("help") => {
            println!(":join <id> <name>       add a channel member");
            println!(":react <item> <n> <id>  member <id> reacts with option glyph <n>");
            println!(":roster                 list channel members");
            println!(":quit                   exit");
        }
        Some("join") => match (words.next(), words.next()) {
            (Some(id), Some(name)) => transport.join(ChatUser {
                id: id.to_string(),
                name: name.to_string(),
            }),
            _ => println!("usage: :join <id> <name>"),
        },
        Some("react") => match (words.next(), words.next(), words.next()) {
            (Some(item), Some(glyph), Some(user_id)) => {
                // A bare digit is shorthand for the option keycap.
                let glyph = glyph
                    .parse::<usize>()
                    .map(option_glyph)
                    .unwrap_or_else(|_| glyph.to_string());
                if let Err(err) = transport.react(item, &glyph, user_id) {
                    println!("{err}");
                }
            }
            _ => println!("usage: :react <item> <glyph> <user-id>"),
        },
        Some("roster") => {
            for member in transport.roster() {
                println!("{} ({})", member.name, member.id);
            }
        }
        _ => println!("unknown control, try :help"),
    }
    true
}
