//! Input events and the on-screen buttons they resolve to

use crate::players::PlayerId;
use crate::render::{Rect, Size};

/// Rows reserved for the score strip at the bottom of the screen
pub const SCORE_STRIP: u16 = 3;

const BUTTON_WIDTH: u16 = 20;
const BUTTON_HEIGHT: u16 = 3;
const BUTTON_GAP: u16 = 2;

/// Input as the game sees it, independent of the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Click { x: u16, y: u16 },
    Key(char),
    Backspace,
    Enter,
    /// A keyboard stand-in for a player's buzzer
    Buzz(PlayerId),
    Quit,
}

/// What a button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    MarkCorrect,
    MarkIncorrect,
    Play,
    HallOfFame,
    Options,
    Back,
    ToggleHosted,
    CyclePlayers,
    SubmitName,
}

/// Keyboard shortcut for a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Enter,
    Char(char),
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Continue => "Continue",
            Action::MarkCorrect => "Correct",
            Action::MarkIncorrect => "Incorrect",
            Action::Play => "Play",
            Action::HallOfFame => "Hall of Fame",
            Action::Options => "Options",
            Action::Back => "Back",
            Action::ToggleHosted => "Hosted",
            Action::CyclePlayers => "Players",
            Action::SubmitName => "Submit",
        }
    }

    pub fn hotkey(&self) -> Hotkey {
        match self {
            Action::Continue | Action::SubmitName => Hotkey::Enter,
            Action::MarkCorrect => Hotkey::Char('+'),
            Action::MarkIncorrect => Hotkey::Char('-'),
            Action::Play => Hotkey::Char('p'),
            Action::HallOfFame => Hotkey::Char('h'),
            Action::Options => Hotkey::Char('o'),
            Action::Back => Hotkey::Char('b'),
            Action::ToggleHosted => Hotkey::Char('m'),
            Action::CyclePlayers => Hotkey::Char('n'),
        }
    }

    /// Label with its shortcut, as drawn on the button
    pub fn caption(&self) -> String {
        match self.hotkey() {
            Hotkey::Enter => format!("{} [Enter]", self.label()),
            Hotkey::Char(c) => format!("{} [{}]", self.label(), c),
        }
    }
}

/// Lay `actions` out as a centred row of buttons just above the score strip
pub fn button_row(size: Size, actions: &[Action]) -> Vec<(Action, Rect)> {
    let n = actions.len() as u16;
    if n == 0 {
        return Vec::new();
    }
    let (rest, _) = size.area().split_bottom(SCORE_STRIP);
    let (_, row) = rest.split_bottom(BUTTON_HEIGHT + 1);
    let total = n * BUTTON_WIDTH + (n - 1) * BUTTON_GAP;
    let start = row.x + row.width.saturating_sub(total) / 2;
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let x = start + i as u16 * (BUTTON_WIDTH + BUTTON_GAP);
            (*action, Rect::new(x, row.y, BUTTON_WIDTH, BUTTON_HEIGHT.min(row.height)))
        })
        .collect()
}

/// Resolve an event against the visible buttons
pub fn resolve(event: &InputEvent, buttons: &[(Action, Rect)]) -> Option<Action> {
    let hit = |key: Hotkey| buttons.iter().map(|(a, _)| *a).find(|a| a.hotkey() == key);
    match event {
        InputEvent::Click { x, y } => buttons
            .iter()
            .find(|(_, rect)| rect.contains(*x, *y))
            .map(|(action, _)| *action),
        InputEvent::Enter => hit(Hotkey::Enter),
        InputEvent::Key(c) => hit(Hotkey::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}
