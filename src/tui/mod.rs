mod app;
mod input;
mod message;
pub mod search;
mod ui;

use crate::config::{Config, RunOptions};
use crate::pipeline::Filtered;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

pub use app::{App, Overlay, Phase, ReloadResult};
pub use message::Message;

/// Run the interactive loop over an already-collected initial row set.
pub async fn run(config: Arc<Config>, opts: RunOptions, initial: Filtered) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("interactive mode requires a terminal (use --static for piped output)");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, opts, initial);

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                let msg = input::dispatch(app, key);
                if app.update(msg).await? {
                    return Ok(()); // Quit requested
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            app.poll_reload()?;
            last_tick = std::time::Instant::now();
        }
    }
}
