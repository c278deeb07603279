//! BUZZBOARD - a terminal quiz show for a room full of buzzers
//!
//! Read the clue. Ring in first. Keep control of the board.

use buzzboard::app::{Context, Game};
use buzzboard::clues::{BankSource, HttpSource, QuestionSource};
use buzzboard::config::Config;
use buzzboard::media::Media;
use buzzboard::players::{open_source, PlayerManager, Timing};
use buzzboard::render::Size;
use buzzboard::storage::HallOfFame;
use buzzboard::tui::{map_event, Canvas, Tui};
use crossterm::event::{self, Event};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// The terminal belongs to the game, so logs go to a file in the data directory
fn log_file() -> Option<File> {
    let dir = buzzboard::data_dir()?;
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("buzzboard.log"))
        .ok()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buzzboard=info"));
    let writer = match log_file() {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(io::sink),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn question_source(config: &Config) -> Arc<dyn QuestionSource> {
    if config.questions.offline {
        tracing::info!("using the offline question bank");
        return Arc::new(BankSource::new());
    }
    match HttpSource::new(&config.questions) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            tracing::warn!(error = %e, "no HTTP client, using the offline question bank");
            Arc::new(BankSource::new())
        }
    }
}

fn main() -> io::Result<()> {
    init_logging();
    let config = Config::load();
    tracing::info!(players = config.players, hosted = config.hosted, "starting");

    let mut buzzers = open_source(config.buzzers.device.as_deref());
    let players = Arc::new(PlayerManager::new(Timing::from(&config.timing), buzzers.indicators()));
    buzzers.attach(Arc::clone(&players));
    tracing::info!(source = %buzzers.describe(), "buzzers ready");

    let hall = HallOfFame::open_or_memory().map_err(io::Error::other)?;
    let media = Media::from_config(&config);
    let source = question_source(&config);
    let frame = config.timing.frame();

    let mut game = Game::new(Context::new(config, players, media, hall, source));

    let mut terminal = Tui::new()?;
    terminal.enter()?;

    let mut last_tick = Instant::now();
    while !game.should_quit() {
        let mut drawn = None;
        terminal.draw(|f| {
            let area = f.area();
            drawn = Some(Size::new(area.width, area.height));
            let mut canvas = Canvas::new(f.buffer_mut());
            game.draw(&mut canvas);
        })?;
        if let Some(size) = drawn {
            game.resize(size);
        }

        let timeout = frame.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Resize(width, height) => game.resize(Size::new(width, height)),
                other => {
                    if let Some(input) = map_event(&other) {
                        game.handle_event(input);
                    }
                }
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= frame {
            last_tick = Instant::now();
            game.update(elapsed.as_millis() as u64);
        }
    }

    terminal.exit()?;
    tracing::info!("goodbye");
    Ok(())
}
