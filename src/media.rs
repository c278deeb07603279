//! Speech and sound effects
//!
//! Both are fire-and-forget: states start an utterance or effect and then
//! poll whether it is still running. Without a speech program the clue is
//! shown for roughly as long as it would take to read aloud.

use crate::config::Config;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Reading pace used to estimate how long an utterance takes
const MS_PER_WORD: u64 = 300;
const MIN_UTTERANCE_MS: u64 = 600;

pub trait Speaker: Send {
    fn speak(&mut self, text: &str);
    fn is_speaking(&mut self) -> bool;
}

/// Numbered effects played at fixed moments of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nobody rang in, or the response timer ran out
    TimesUp,
    /// A daily double was uncovered
    DailyDouble,
    /// Final-round think music
    Think,
}

pub trait SoundBoard: Send {
    fn play(&mut self, effect: Effect);
    fn is_playing(&mut self) -> bool;
}

/// Estimated time to read `text` aloud
pub fn reading_time(text: &str) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis((words * MS_PER_WORD).max(MIN_UTTERANCE_MS))
}

/// Never busy; for tests and headless runs
#[derive(Debug, Default)]
pub struct Silent;

impl Speaker for Silent {
    fn speak(&mut self, text: &str) {
        tracing::debug!(text, "speak (silent)");
    }

    fn is_speaking(&mut self) -> bool {
        false
    }
}

impl SoundBoard for Silent {
    fn play(&mut self, effect: Effect) {
        tracing::debug!(?effect, "play (silent)");
    }

    fn is_playing(&mut self) -> bool {
        false
    }
}

/// Busy for as long as the text would take to read
#[derive(Debug, Default)]
pub struct PacedSpeaker {
    until: Option<Instant>,
}

impl Speaker for PacedSpeaker {
    fn speak(&mut self, text: &str) {
        self.until = Some(Instant::now() + reading_time(text));
    }

    fn is_speaking(&mut self) -> bool {
        matches!(self.until, Some(until) if Instant::now() < until)
    }
}

/// Hands each utterance to an external program such as `espeak` or `say`
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    fallback: PacedSpeaker,
}

impl CommandSpeaker {
    /// `command` is split on whitespace; the text is appended as the last argument
    pub fn new(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            child: None,
            fallback: PacedSpeaker::default(),
        })
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.child = Some(child),
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "speech program failed to start");
                self.fallback.speak(text);
            }
        }
    }

    fn is_speaking(&mut self) -> bool {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(None) => return true,
                Ok(Some(_)) | Err(_) => self.child = None,
            }
        }
        self.fallback.is_speaking()
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Effects with fixed lengths and no audio device
#[derive(Debug)]
pub struct PacedSoundBoard {
    think: Duration,
    until: Option<Instant>,
}

impl PacedSoundBoard {
    pub fn new(think: Duration) -> Self {
        Self { think, until: None }
    }

    fn length(&self, effect: Effect) -> Duration {
        match effect {
            Effect::TimesUp => Duration::from_millis(800),
            Effect::DailyDouble => Duration::from_millis(1500),
            Effect::Think => self.think,
        }
    }
}

impl SoundBoard for PacedSoundBoard {
    fn play(&mut self, effect: Effect) {
        tracing::debug!(?effect, "play");
        self.until = Some(Instant::now() + self.length(effect));
    }

    fn is_playing(&mut self) -> bool {
        matches!(self.until, Some(until) if Instant::now() < until)
    }
}

/// Speech and sound as one bundle
pub struct Media {
    pub speaker: Box<dyn Speaker>,
    pub sounds: Box<dyn SoundBoard>,
}

impl Media {
    pub fn from_config(config: &Config) -> Self {
        let speaker: Box<dyn Speaker> = match config.media.tts_command.as_deref().and_then(CommandSpeaker::new) {
            Some(speaker) => Box::new(speaker),
            None => Box::new(PacedSpeaker::default()),
        };
        Self {
            speaker,
            sounds: Box::new(PacedSoundBoard::new(Duration::from_millis(config.timing.final_think_ms))),
        }
    }

    pub fn silent() -> Self {
        Self {
            speaker: Box::new(Silent),
            sounds: Box::new(Silent),
        }
    }
}
