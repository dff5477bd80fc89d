use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    spawn_channel, ChannelConfig, ChannelHandle, ClientEvent, MatrixSession, RequestSink,
    SaveOutcome,
};
use shared::domain::{GridSize, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod ui;

use ui::{describe_event, parse_command, render_grid, render_icons, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Terminal painter for a networked LED matrix")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:7000")]
    server_url: String,
    #[arg(long, default_value_t = 1000)]
    reconnect_delay_ms: u64,
    /// Grid size shown until the authority reports its own.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let ChannelHandle {
        requests,
        mut events,
        task,
    } = spawn_channel(ChannelConfig {
        server_url: args.server_url.clone(),
        reconnect_delay: Duration::from_millis(args.reconnect_delay_ms),
    })
    .context("failed to start matrix channel")?;
    let mut session = MatrixSession::new(GridSize::new(args.width, args.height), requests)
        .context("invalid initial grid size")?;
    let mut notifications = session.subscribe_events();
    info!(server_url = %args.server_url, "painter started");

    println!("{HELP}");
    println!("{}", render_grid(session.grid()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => session.handle_channel_event(event),
            Ok(event) = notifications.recv() => show_event(&session, &event),
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(&mut session, command),
                    Err(err) => println!("{err:#}"),
                }
            }
        }
    }

    task.abort();
    Ok(())
}

fn run_command<S: RequestSink>(session: &mut MatrixSession<S>, command: Command) {
    match command {
        Command::Toggle { x, y } => {
            if let Err(err) = session.toggle(x, y) {
                println!("{err}");
            }
        }
        Command::Clear => session.clear(),
        Command::Fill => session.fill(),
        Command::Name(text) => session.edit_icon_name(text),
        Command::Save(name) => {
            let candidate = name.unwrap_or_else(|| session.icons().draft_name().to_string());
            match session.save_icon(&candidate) {
                SaveOutcome::Submitted { name } => println!("saving \u{201c}{name}\u{201d}"),
                SaveOutcome::Rejected { name } => warn!(%name, "save rejected"),
            }
        }
        Command::Load(name) => session.load_icon(&name),
        Command::Delete(name) => session.delete_icon(&name),
        Command::Show => println!("{}", render_grid(session.grid())),
        Command::Icons => println!("{}", render_icons(session.icons())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn show_event<S: RequestSink>(session: &MatrixSession<S>, event: &ClientEvent) {
    if let Some(line) = describe_event(event) {
        println!("{line}");
    }
    match event {
        ClientEvent::GridRedrawn => println!("{}", render_grid(session.grid())),
        ClientEvent::IconsUpdated { .. } => println!("{}", render_icons(session.icons())),
        ClientEvent::FocusIconName => println!("name> {}", session.icons().draft_name()),
        _ => {}
    }
}
