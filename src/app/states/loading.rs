//! Fetch the game, seat the players and wait for the host

use super::{draw_banner, stage};
use crate::app::event::InputEvent;
use crate::app::{Context, GameState, StateKind, Store};
use crate::clues::{FetchStatus, FetchTask, GameData};
use crate::network::{HostRelay, RelayAdvertiser};
use crate::players::PlayerView;
use crate::render::{Color, RenderTarget, Size};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
pub struct LoadingState {
    fetch: Option<FetchTask<GameData>>,
    failures: u32,
    waiting_for_host: bool,
}

impl LoadingState {
    fn spawn_fetch(&mut self, ctx: &Context, delay: Duration) {
        let source = Arc::clone(&ctx.source);
        self.fetch = Some(FetchTask::spawn_after(delay, move || source.fetch_game()));
    }
}

fn start_relay(ctx: &mut Context) {
    match HostRelay::start_on_port(ctx.config.relay.port) {
        Ok(relay) => {
            let port = relay.port();
            if ctx.config.relay.advertise {
                match RelayAdvertiser::advertise(port) {
                    Ok(advertiser) => ctx.store.advertiser = Some(advertiser),
                    Err(e) => tracing::warn!(error = %e, "relay will not be advertised"),
                }
            }
            ctx.store.relay_port = Some(port);
            ctx.store.host = Some(Box::new(relay));
        }
        Err(e) => {
            tracing::error!(error = %e, "could not start host relay, switching to self-judged play");
            ctx.store.hosted = false;
        }
    }
}

impl GameState for LoadingState {
    fn kind(&self) -> StateKind {
        StateKind::Loading
    }

    fn startup(&mut self, ctx: &mut Context) {
        if ctx.store.hosted && ctx.store.host.is_none() {
            start_relay(ctx);
        }
        ctx.players.initialize_players(ctx.store.n_players);
        ctx.store.data = None;
        self.spawn_fetch(ctx, Duration::ZERO);
    }

    fn handle_event(&mut self, _event: &InputEvent, _size: Size) {}

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        if ctx.store.data.is_none() {
            let status = match self.fetch.as_mut() {
                Some(task) => task.poll(),
                None => FetchStatus::Pending,
            };
            match status {
                FetchStatus::Ready(data) => {
                    tracing::info!(failures = self.failures, "game loaded");
                    ctx.store.data = Some(data);
                    self.fetch = None;
                }
                FetchStatus::Failed(e) => {
                    self.failures += 1;
                    tracing::warn!(error = %e, attempt = self.failures, "game fetch failed, retrying");
                    self.spawn_fetch(ctx, ctx.config.timing.retry());
                }
                FetchStatus::Pending => {}
            }
        }

        if ctx.store.data.is_none() {
            return StateKind::Loading;
        }
        self.waiting_for_host = !ctx.store.host_ready();
        if self.waiting_for_host {
            return StateKind::Loading;
        }
        ctx.store.round = 0;
        StateKind::Intro
    }

    fn draw(&self, target: &mut dyn RenderTarget, store: &Store, _players: &[PlayerView]) {
        draw_banner(target, "LOADING", Color::Gold);
        let status = if self.waiting_for_host {
            match store.relay_port {
                Some(port) => format!("Waiting for the host to connect on port {}", port),
                None => "Waiting for the host to connect".to_string(),
            }
        } else if self.failures > 0 {
            format!("Fetching clues (attempt {})", self.failures + 1)
        } else {
            "Fetching clues".to_string()
        };
        target.draw_text(stage(target).centered(60, 3), &status, Color::White);
    }
}
