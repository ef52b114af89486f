use anyhow::{Context, Result};
use crossterm::{
    event::Event as CrosstermEvent,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex}; // tokio Mutex: the app is held across awaits

mod app;
mod events;
mod integrations;
mod logging;
mod router;
mod store;
mod ui;
mod utils;

use app::{config, App, Config};
use events::{AppEvent, EventHandler};

#[tokio::main]
async fn main() -> Result<()> {
    let work_dir = config::work_dir()?;
    logging::init(&config::log_path(&work_dir))?;
    log::info!(
        "{} {} starting on {}/{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    let config_path = config::config_path(&work_dir);
    let config = Config::load_or_default(&config_path)?;
    logging::apply_level(&config.logging.level);

    if let Err(e) = run(config, config_path).await {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        return Err(e);
    }

    log::info!("Shut down");
    Ok(())
}

async fn run(config: Config, config_path: std::path::PathBuf) -> Result<()> {
    let tick_rate_ms = config.general.tick_rate_ms;
    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let app = App::new(config, config_path, status_tx)?;

    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_state = Arc::new(Mutex::new(app));
    let event_handler = EventHandler::new(tick_rate_ms.max(50), status_rx); // At least 20fps

    let res = run_app(&mut terminal, app_state, event_handler).await;

    // Always cleanup terminal
    cleanup_terminal(&mut terminal)?;

    res
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app_state: Arc<Mutex<App>>,
    mut event_handler: EventHandler,
) -> Result<()> {
    {
        let app = app_state.lock().await;
        terminal.draw(|f| ui::render(f, &app))?;
        io::stdout().flush()?;
    }

    let mut needs_clear = false;

    loop {
        let event = event_handler.next().await;

        if needs_clear {
            terminal.clear()?;
            needs_clear = false;
        }

        let should_continue = match event {
            AppEvent::Input(crossterm_event) => {
                if matches!(crossterm_event, CrosstermEvent::Resize(_, _)) {
                    needs_clear = true;
                }

                let mut app = app_state.lock().await;
                app.handle_event(crossterm_event).await?
            }
            AppEvent::Status(field) => {
                log::trace!("redraw after {} change", field.as_str());
                true
            }
            AppEvent::Tick => true,
        };

        if !should_continue {
            break;
        }

        {
            let app = app_state.lock().await;
            terminal.draw(|f| ui::render(f, &app))?;
            io::stdout().flush()?;
        }
    }

    Ok(())
}
