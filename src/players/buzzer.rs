//! Buzzer hardware: press sources and indicator lights
//!
//! A buzzer box is a character device speaking a line protocol. Each press
//! arrives as the one-based seat digit on its own line (`"2"` is player 2).
//! Lights are driven by writing `G1`/`G0` for the go light and `P<seat>:1` or
//! `P<seat>:0` for a player's lamp. Without a box, presses come from the
//! keyboard and lights go nowhere.

use super::manager::PlayerManager;
use super::player::{BuzzOutcome, PlayerId};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuzzerError {
    #[error("failed to open buzzer device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Receives light changes from the arbiter
pub trait IndicatorSink: Send + Sync {
    /// The "ring in now" light
    fn go_light(&self, on: bool);
    /// A player's own lamp
    fn player_light(&self, id: PlayerId, on: bool);
}

/// Lights that go nowhere
pub struct NoopIndicator;

impl IndicatorSink for NoopIndicator {
    fn go_light(&self, _on: bool) {}
    fn player_light(&self, _id: PlayerId, _on: bool) {}
}

/// Something that feeds presses into the arbiter
pub trait BuzzerSource: Send {
    /// Lights belonging to this source, handed to the arbiter at construction
    fn indicators(&self) -> Arc<dyn IndicatorSink>;
    /// Start forwarding presses to `manager`
    fn attach(&mut self, manager: Arc<PlayerManager>);
    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// A single player's button bound to the arbiter
#[derive(Clone)]
pub struct Buzzer {
    pub id: PlayerId,
    manager: Arc<PlayerManager>,
}

impl Buzzer {
    pub fn new(id: PlayerId, manager: Arc<PlayerManager>) -> Self {
        Self { id, manager }
    }

    pub fn press(&self) -> BuzzOutcome {
        self.manager.buzz_in(self.id)
    }
}

/// Lights recorded in memory, for tests and the on-screen lamp row
#[derive(Default)]
pub struct MockIndicator {
    state: Mutex<(bool, Vec<bool>)>,
}

impl MockIndicator {
    pub fn go(&self) -> bool {
        self.state.lock().map(|s| s.0).unwrap_or(false)
    }

    pub fn player(&self, id: PlayerId) -> bool {
        self.state
            .lock()
            .map(|s| s.1.get(id).copied().unwrap_or(false))
            .unwrap_or(false)
    }
}

impl IndicatorSink for MockIndicator {
    fn go_light(&self, on: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.0 = on;
        }
    }

    fn player_light(&self, id: PlayerId, on: bool) {
        if let Ok(mut state) = self.state.lock() {
            if state.1.len() <= id {
                state.1.resize(id + 1, false);
            }
            state.1[id] = on;
        }
    }
}

/// Source used when no hardware is present; presses are injected by hand
pub struct MockBuzzers {
    lights: Arc<MockIndicator>,
    manager: Option<Arc<PlayerManager>>,
}

impl MockBuzzers {
    pub fn new() -> Self {
        Self {
            lights: Arc::new(MockIndicator::default()),
            manager: None,
        }
    }

    pub fn lights(&self) -> Arc<MockIndicator> {
        Arc::clone(&self.lights)
    }

    /// Press `id`'s button; ignored until attached
    pub fn press(&self, id: PlayerId) -> BuzzOutcome {
        match &self.manager {
            Some(manager) => manager.buzz_in(id),
            None => BuzzOutcome::Ignored,
        }
    }

    pub fn buzzer(&self, id: PlayerId) -> Option<Buzzer> {
        self.manager.as_ref().map(|m| Buzzer::new(id, Arc::clone(m)))
    }
}

impl Default for MockBuzzers {
    fn default() -> Self {
        Self::new()
    }
}

impl BuzzerSource for MockBuzzers {
    fn indicators(&self) -> Arc<dyn IndicatorSink> {
        self.lights.clone()
    }

    fn attach(&mut self, manager: Arc<PlayerManager>) {
        self.manager = Some(manager);
    }

    fn describe(&self) -> String {
        "keyboard buzzers".to_string()
    }
}

/// Lamp commands written back to the buzzer box
pub struct SerialIndicator {
    device: Mutex<File>,
}

impl SerialIndicator {
    fn send(&self, line: &str) {
        let Ok(mut device) = self.device.lock() else {
            return;
        };
        if let Err(e) = writeln!(device, "{}", line).and_then(|_| device.flush()) {
            tracing::warn!(error = %e, "failed to drive buzzer lights");
        }
    }
}

impl IndicatorSink for SerialIndicator {
    fn go_light(&self, on: bool) {
        self.send(if on { "G1" } else { "G0" });
    }

    fn player_light(&self, id: PlayerId, on: bool) {
        self.send(&format!("P{}:{}", id + 1, u8::from(on)));
    }
}

/// A buzzer box on a character device
pub struct SerialBuzzers {
    path: PathBuf,
    reader: Option<File>,
    lights: Arc<SerialIndicator>,
    running: Arc<AtomicBool>,
}

impl SerialBuzzers {
    /// Open the device for both presses and lamps
    pub fn open(path: &Path) -> Result<Self, BuzzerError> {
        let open_err = |source| BuzzerError::Open {
            path: path.to_path_buf(),
            source,
        };
        let reader = File::open(path).map_err(open_err)?;
        let writer = OpenOptions::new().append(true).open(path).map_err(open_err)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: Some(reader),
            lights: Arc::new(SerialIndicator {
                device: Mutex::new(writer),
            }),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

impl Drop for SerialBuzzers {
    fn drop(&mut self) {
        self.stop();
    }
}

impl BuzzerSource for SerialBuzzers {
    fn indicators(&self) -> Arc<dyn IndicatorSink> {
        self.lights.clone()
    }

    fn attach(&mut self, manager: Arc<PlayerManager>) {
        let Some(reader) = self.reader.take() else {
            return;
        };
        let running = Arc::clone(&self.running);
        let path = self.path.clone();

        thread::spawn(move || {
            let reader = BufReader::new(reader);
            for line in reader.lines() {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                match line {
                    Ok(line) => {
                        if let Some(id) = parse_press(&line) {
                            let outcome = manager.buzz_in(id);
                            tracing::trace!(player = id, ?outcome, "hardware press");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "buzzer device read failed");
                        break;
                    }
                }
            }
            tracing::info!(path = %path.display(), "buzzer reader stopped");
        });
    }

    fn describe(&self) -> String {
        format!("buzzer box at {}", self.path.display())
    }
}

/// Seat digit on a line from the box, as a zero-based id
pub fn parse_press(line: &str) -> Option<PlayerId> {
    let digit: usize = line.trim().parse().ok()?;
    digit.checked_sub(1)
}

/// Open the configured device, or fall back to keyboard-only buzzers
pub fn open_source(device: Option<&Path>) -> Box<dyn BuzzerSource> {
    if let Some(path) = device {
        match SerialBuzzers::open(path) {
            Ok(source) => return Box::new(source),
            Err(e) => tracing::warn!(error = %e, "falling back to keyboard buzzers"),
        }
    }
    Box::new(MockBuzzers::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::manager::{Eligible, Timing};
    use std::time::Duration;

    #[test]
    fn test_parse_press() {
        assert_eq!(parse_press("1"), Some(0));
        assert_eq!(parse_press(" 3\r"), Some(2));
        assert_eq!(parse_press("0"), None);
        assert_eq!(parse_press("G1"), None);
        assert_eq!(parse_press(""), None);
    }

    #[test]
    fn test_mock_lights_follow_arbiter() {
        let mut source = MockBuzzers::new();
        let lights = source.lights();
        let manager = Arc::new(PlayerManager::new(Timing::default(), source.indicators()));
        manager.initialize_players(3);
        source.attach(Arc::clone(&manager));

        manager.green_light(Eligible::All);
        assert!(lights.go());

        assert_eq!(source.press(2), BuzzOutcome::RangIn);
        assert!(!lights.go());
        assert!(lights.player(2));

        manager.reset();
        assert!(!lights.player(2));
    }

    #[test]
    fn test_unattached_mock_ignores_presses() {
        let source = MockBuzzers::new();
        assert_eq!(source.press(0), BuzzOutcome::Ignored);
        assert!(source.buzzer(0).is_none());
    }

    #[test]
    fn test_buzzer_handle() {
        let mut source = MockBuzzers::new();
        let manager = Arc::new(PlayerManager::with_players(2));
        source.attach(Arc::clone(&manager));
        manager.green_light(Eligible::All);
        let buzzer = source.buzzer(1).unwrap();
        assert_eq!(buzzer.press(), BuzzOutcome::RangIn);
        assert_eq!(manager.rung_in(), Some(1));
    }

    #[test]
    fn test_serial_device_presses() {
        let path = std::env::temp_dir().join(format!("buzzboard-device-{}", std::process::id()));
        std::fs::write(&path, "1\n3\n").unwrap();

        let mut source = SerialBuzzers::open(&path).unwrap();
        let manager = Arc::new(PlayerManager::new(Timing::default(), source.indicators()));
        manager.initialize_players(3);
        manager.green_light(Eligible::All);
        source.attach(Arc::clone(&manager));

        thread::sleep(Duration::from_millis(200));
        assert_eq!(manager.rung_in(), Some(0));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("G1"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_device_falls_back() {
        let source = open_source(Some(Path::new("/nonexistent/buzzboard-device")));
        assert_eq!(source.describe(), "keyboard buzzers");
    }
}
