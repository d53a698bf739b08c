use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::InteractionEngine;
use super::event::{AppEvent, RefreshOrigin};
use super::sources::Collaborators;
use super::ui::UI;
use crate::config::Config;
use crate::watch::WatchManager;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Run the interactive dashboard until the user quits.
pub async fn run(repo_root: PathBuf, config: &Config) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let sources = Collaborators::from_config(&repo_root, config);
    let watch = WatchManager::new(tx.clone(), config.watch_debounce());
    let mut engine = InteractionEngine::new(repo_root, sources, config.concurrency, watch);

    let mut terminal = UI::setup_terminal().context("Failed to set up terminal")?;
    if let Ok(size) = terminal.size() {
        engine
            .handle(AppEvent::Resize {
                width: size.width,
                height: size.height,
            })
            .await;
    }

    spawn_input_reader(tx.clone());
    let ticker = config
        .refresh_interval()
        .map(|every| spawn_refresh_ticker(tx.clone(), every));

    tx.send(AppEvent::Refresh(RefreshOrigin::Startup))
        .context("Event queue closed before startup")?;
    info!("Dashboard started for {}", engine.repo_root().display());

    let result = event_loop(&mut terminal, &mut engine, &mut rx).await;

    if let Some(ticker) = ticker {
        ticker.abort();
    }
    // Closing the queue is what stops the input reader thread.
    rx.close();
    UI::restore_terminal().context("Failed to restore terminal")?;
    result
}

async fn event_loop(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    engine: &mut InteractionEngine,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    while engine.is_running() {
        terminal.draw(|frame| UI::render(frame, engine, false))?;

        let Some(event) = rx.recv().await else {
            debug!("Event queue closed");
            break;
        };

        if engine.will_rebuild(&event) {
            terminal.draw(|frame| UI::render(frame, engine, true))?;
        }
        engine.handle(event).await;
    }
    Ok(())
}

/// Terminal input is read on a plain thread, since crossterm's reader blocks.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    debug!("Input poll failed: {}", e);
                    break;
                }
            }

            let app_event = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(width, height)) => AppEvent::Resize { width, height },
                Ok(_) => continue,
                Err(e) => {
                    debug!("Input read failed: {}", e);
                    break;
                }
            };

            if tx.send(app_event).is_err() {
                break;
            }
        }
    });
}

fn spawn_refresh_ticker(tx: UnboundedSender<AppEvent>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::Refresh(RefreshOrigin::Periodic)).is_err() {
                break;
            }
        }
    })
}
