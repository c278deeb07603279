//! Question sources and the background fetch task
//!
//! Fetching runs on a worker thread; the game loop polls the task once per
//! tick and never blocks on the network.

use super::{Clue, GameData, RawGame, ValidationError};
use crate::config::QuestionConfig;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid game: {0}")]
    Invalid(#[from] ValidationError),
    #[error("clue bank is unusable: {0}")]
    Bank(String),
    #[error("fetch worker exited without a result")]
    Worker,
}

/// Where games and tie-break clues come from
pub trait QuestionSource: Send + Sync {
    /// Two validated rounds plus the final clue
    fn fetch_game(&self) -> Result<GameData, LoadError>;

    /// A single complete clue for a tie-break
    fn fetch_single(&self) -> Result<Clue, LoadError>;
}

/// The question API over HTTP
pub struct HttpSource {
    client: reqwest::blocking::Client,
    api_url: String,
    single_url: String,
}

impl HttpSource {
    pub fn new(config: &QuestionConfig) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("buzzboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            single_url: config.single_url.clone(),
        })
    }

    fn get(&self, url: &str) -> Result<String, LoadError> {
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        Ok(body)
    }
}

impl QuestionSource for HttpSource {
    fn fetch_game(&self) -> Result<GameData, LoadError> {
        tracing::info!(url = %self.api_url, "fetching game");
        let raw: RawGame = serde_json::from_str(&self.get(&self.api_url)?)?;
        Ok(GameData::try_from(raw)?)
    }

    fn fetch_single(&self) -> Result<Clue, LoadError> {
        tracing::info!(url = %self.single_url, "fetching tie-break clue");
        parse_single(&self.get(&self.single_url)?)
    }
}

/// Decode and check a lone clue
pub fn parse_single(body: &str) -> Result<Clue, LoadError> {
    let clue: Clue = serde_json::from_str(body)?;
    if clue.is_complete() {
        Ok(clue)
    } else {
        Err(ValidationError::IncompleteClue {
            category: clue.category,
        }
        .into())
    }
}

/// Progress of a background fetch
#[derive(Debug)]
pub enum FetchStatus<T> {
    Pending,
    Ready(T),
    Failed(LoadError),
}

/// A fetch running on its own thread
pub struct FetchTask<T> {
    rx: Receiver<Result<T, LoadError>>,
    finished: bool,
}

impl<T: Send + 'static> FetchTask<T> {
    /// Run `job` on a worker thread
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T, LoadError> + Send + 'static,
    {
        Self::spawn_after(Duration::ZERO, job)
    }

    /// Run `job` on a worker thread after waiting `delay`
    pub fn spawn_after<F>(delay: Duration, job: F) -> Self
    where
        F: FnOnce() -> Result<T, LoadError> + Send + 'static,
    {
        let (tx, rx) = channel();
        thread::spawn(move || {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            // The receiver may be gone if the state moved on; nothing to do then
            let _ = tx.send(job());
        });
        Self { rx, finished: false }
    }

    /// Check for a result without blocking.
    ///
    /// The result is handed out once; later polls report `Pending`.
    pub fn poll(&mut self) -> FetchStatus<T> {
        if self.finished {
            return FetchStatus::Pending;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                match result {
                    Ok(value) => FetchStatus::Ready(value),
                    Err(e) => FetchStatus::Failed(e),
                }
            }
            Err(TryRecvError::Empty) => FetchStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                FetchStatus::Failed(LoadError::Worker)
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
