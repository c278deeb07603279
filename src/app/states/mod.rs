//! The eleven game states and the pieces they share

mod board;
mod daily_double;
mod final_round;
mod hall;
mod intro;
mod loading;
mod options;
mod question;
mod ring_in;
mod stats;
mod tie_breaker;
mod title;
mod wager;

pub use board::BoardState;
pub use daily_double::DailyDoubleState;
pub use final_round::FinalState;
pub use hall::HallState;
pub use intro::IntroState;
pub use loading::LoadingState;
pub use options::OptionsState;
pub use question::QuestionState;
pub use ring_in::{RingIn, RingInEvent};
pub use stats::StatsState;
pub use tie_breaker::TieBreakerState;
pub use title::TitleState;
pub use wager::{WagerError, WagerInput};

use super::event::{button_row, resolve, Action, InputEvent, SCORE_STRIP};
use super::{GameState, StateKind};
use crate::players::PlayerView;
use crate::render::{Color, Rect, RenderTarget, Size};
use crate::stats::format_money;

/// A fresh, not yet started state of the given kind
pub fn build(kind: StateKind) -> Box<dyn GameState> {
    match kind {
        StateKind::Title => Box::new(TitleState::default()),
        StateKind::Options => Box::new(OptionsState::default()),
        StateKind::Loading => Box::new(LoadingState::default()),
        StateKind::Intro => Box::new(IntroState::default()),
        StateKind::Board => Box::new(BoardState::default()),
        StateKind::Question => Box::new(QuestionState::default()),
        StateKind::DailyDouble => Box::new(DailyDoubleState::default()),
        StateKind::Final => Box::new(FinalState::default()),
        StateKind::TieBreaker => Box::new(TieBreakerState::default()),
        StateKind::Hall => Box::new(HallState::default()),
        StateKind::Stats => Box::new(StatsState::default()),
    }
}

/// Buttons pressed since the last update, resolved against `actions`
#[derive(Debug, Default)]
pub(crate) struct Pending {
    action: Option<Action>,
}

impl Pending {
    /// Resolve `event` against the buttons on screen; false if it hit none
    pub fn record(&mut self, event: &InputEvent, size: Size, actions: &[Action]) -> bool {
        match resolve(event, &button_row(size, actions)) {
            Some(action) => {
                self.action = Some(action);
                true
            }
            None => false,
        }
    }

    pub fn take(&mut self) -> Option<Action> {
        self.action.take()
    }
}

/// Area above the score strip
pub(crate) fn stage(target: &dyn RenderTarget) -> Rect {
    target.size().area().split_bottom(SCORE_STRIP).0
}

pub(crate) fn draw_buttons(target: &mut dyn RenderTarget, actions: &[Action]) {
    for (action, rect) in button_row(target.size(), actions) {
        target.fill_rect(rect, Color::Black);
        target.outline_rect(rect, Color::Gold);
        target.draw_text(rect.inset(1, 1), &action.caption(), Color::White);
    }
}

/// Big centred text in the upper part of the stage
pub(crate) fn draw_banner(target: &mut dyn RenderTarget, text: &str, color: Color) {
    let area = stage(target).inset(4, 1);
    let (upper, _) = area.split_bottom(5);
    target.draw_text(upper, text, color);
}

pub(crate) fn player_name(id: usize) -> String {
    format!("Player {}", id + 1)
}

/// One podium per player along the bottom row
pub fn draw_scores(target: &mut dyn RenderTarget, players: &[PlayerView]) {
    let (_, strip) = target.size().area().split_bottom(SCORE_STRIP);
    for (player, rect) in players.iter().zip(strip.columns(players.len() as u16)) {
        let fill = if player.light { Color::Gold } else { Color::Black };
        target.fill_rect(rect, fill);
        target.outline_rect(rect, if player.has_control { Color::White } else { Color::Gray });
        let score_color = match (player.light, player.score < 0) {
            (true, _) => Color::Black,
            (false, true) => Color::Red,
            (false, false) => Color::White,
        };
        let marker = if player.has_control { "*" } else { "" };
        let text = format!("{}{} {}", marker, player.id + 1, format_money(player.score));
        target.draw_text(rect.inset(1, 1), &text, score_color);
    }
}
