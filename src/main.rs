mod activity;
mod app;
mod backend;
mod bridge;
mod config;
mod coordinator;
mod domain;
mod fit;
mod handlers;
mod infra;
mod namespace;
mod protocol;
mod reconcile;
mod telemetry;
mod terminal;
mod ui;

use crate::app::App;
use crate::backend::{WorkerState, worker_loop};
use crate::bridge::run_bridge;
use crate::config::AppConfig;
use crate::coordinator::Coordinator;
use crate::handlers::handle_key_event;
use crate::infra::{RepoClient, ShellGitClient};
use crate::protocol::{InboundEvent, OutboundCommand};
use crate::terminal::{Tui, restore_terminal, setup_terminal};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Parser)]
#[command(version, about = "Terminal front end for a git repository")]
struct Cli {
    /// Repository to open.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// External backend to spawn instead of the built-in git worker,
    /// e.g. `--backend python3 backend.py`. Speaks JSON lines on stdio.
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    backend: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_from_fallback) = match AppConfig::load_or_default() {
        Ok(cfg) => (cfg, false),
        Err(err) => {
            eprintln!("failed to load config, using defaults: {err:#}");
            (AppConfig::default(), true)
        }
    };

    let _log_guard = match config
        .log_file_path()
        .and_then(|path| telemetry::init(&path))
    {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("logging disabled: {err:#}");
            None
        }
    };
    tracing::info!(repo = %cli.repo.display(), "starting gitpane");

    let mut terminal = setup_terminal()?;
    let run_result = run_app(&mut terminal, cli, config, config_from_fallback).await;

    restore_terminal(&mut terminal)?;
    if let Err(err) = run_result {
        tracing::error!(error = %format!("{err:#}"), "gitpane exited with error");
        eprintln!("{err:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    cli: Cli,
    config: AppConfig,
    config_from_fallback: bool,
) -> Result<()> {
    let (command_tx, command_rx) = mpsc::unbounded_channel::<OutboundCommand>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<InboundEvent>();

    spawn_backend(&cli, &config, command_rx, event_tx);

    let mut app = App::new(config);
    app.config_from_fallback = config_from_fallback;
    let mut coordinator = Coordinator::new(app, command_tx);
    let size = terminal.size().context("failed to read terminal size")?;
    coordinator.resize(Rect::new(0, 0, size.width, size.height));
    coordinator.dispatch(OutboundCommand::Refresh);

    let mut backend_gone = false;
    while !coordinator.app.should_quit {
        loop {
            match event_rx.try_recv() {
                Ok(event) => coordinator.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !backend_gone {
                        backend_gone = true;
                        tracing::warn!("backend event channel closed");
                        coordinator.app.log("backend disconnected".to_string());
                    }
                    break;
                }
            }
        }

        if coordinator.app.config_dirty {
            coordinator.app.config_dirty = false;
            match coordinator.app.config.save() {
                Ok(path) => coordinator
                    .app
                    .log(format!("saved preferences to {}", path.display())),
                Err(err) => coordinator.app.log(format!("error: {err:#}")),
            }
        }

        terminal
            .draw(|frame| ui::draw(frame, &coordinator.app))
            .context("failed to draw")?;

        if event::poll(Duration::from_millis(100)).context("event poll failed")? {
            match event::read().context("event read failed")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key_event(&mut coordinator, key);
                }
                Event::Resize(width, height) => {
                    coordinator.resize(Rect::new(0, 0, width, height));
                }
                _ => {}
            }
        }
    }

    if !coordinator.app.save_config_on_exit() {
        tracing::info!("config file left untouched after load failure");
    } else if let Err(err) = coordinator.app.config.save() {
        tracing::warn!(error = %format!("{err:#}"), "failed to save config");
        eprintln!("failed to save config: {err:#}");
    }

    Ok(())
}

fn spawn_backend(
    cli: &Cli,
    config: &AppConfig,
    command_rx: UnboundedReceiver<OutboundCommand>,
    event_tx: UnboundedSender<InboundEvent>,
) {
    if cli.backend.is_empty() {
        let client: Arc<dyn RepoClient> = Arc::new(ShellGitClient::new(cli.repo.clone()));
        let state = WorkerState {
            preferences: config.preferences(),
            credentials: None,
        };
        tokio::spawn(worker_loop(client, state, command_rx, event_tx));
        return;
    }

    let argv = cli.backend.clone();
    let repo = cli.repo.clone();
    tokio::spawn(async move {
        let failure_tx = event_tx.clone();
        if let Err(err) = run_bridge(argv, &repo, command_rx, event_tx).await {
            tracing::error!(error = %format!("{err:#}"), "backend bridge failed");
            let _ = failure_tx.send(InboundEvent::Error(format!("backend failed: {err:#}")));
        }
    });
}
