//! Typed wagers for daily doubles and the final clue

use crate::app::event::InputEvent;
use thiserror::Error;

const MAX_DIGITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WagerError {
    #[error("enter a wager")]
    Empty,
    #[error("wagers are whole dollar amounts")]
    NotANumber,
    #[error("the wager must be more than zero")]
    NotPositive,
    #[error("the wager can be at most ${max}")]
    TooLarge { max: i64 },
}

/// Digits typed so far; anything else is refused at the keyboard
#[derive(Debug, Clone, Default)]
pub struct WagerInput {
    text: String,
    error: Option<WagerError>,
}

impl WagerInput {
    /// Feed a key; true if it was consumed
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) if c.is_ascii_digit() => {
                if self.text.len() < MAX_DIGITS {
                    self.text.push(*c);
                }
                self.error = None;
                true
            }
            InputEvent::Key(c) if c.is_alphanumeric() => {
                self.error = Some(WagerError::NotANumber);
                true
            }
            InputEvent::Backspace => {
                self.text.pop();
                self.error = None;
                true
            }
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&WagerError> {
        self.error.as_ref()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.error = None;
    }

    /// A daily double wager: any positive whole amount
    pub fn daily_double(&mut self) -> Result<i64, WagerError> {
        let result = parse_daily_double(&self.text);
        self.error = result.as_ref().err().cloned();
        result
    }

    /// A final wager: zero up to the player's score
    pub fn final_wager(&mut self, score: i64) -> Result<i64, WagerError> {
        let result = parse_final(&self.text, score);
        self.error = result.as_ref().err().cloned();
        result
    }
}

fn parse_amount(text: &str) -> Result<i64, WagerError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WagerError::Empty);
    }
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(WagerError::NotANumber);
    }
    text.parse().map_err(|_| WagerError::NotANumber)
}

pub fn parse_daily_double(text: &str) -> Result<i64, WagerError> {
    let wager = parse_amount(text)?;
    if wager <= 0 {
        return Err(WagerError::NotPositive);
    }
    Ok(wager)
}

pub fn parse_final(text: &str, score: i64) -> Result<i64, WagerError> {
    let wager = parse_amount(text)?;
    let max = score.max(0);
    if wager > max {
        return Err(WagerError::TooLarge { max });
    }
    Ok(wager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily_double() {
        assert_eq!(parse_daily_double("1000"), Ok(1000));
        assert_eq!(parse_daily_double("abc"), Err(WagerError::NotANumber));
        assert_eq!(parse_daily_double("-5"), Err(WagerError::NotANumber));
        assert_eq!(parse_daily_double("0"), Err(WagerError::NotPositive));
        assert_eq!(parse_daily_double(""), Err(WagerError::Empty));
    }

    #[test]
    fn test_parse_final() {
        assert_eq!(parse_final("0", 800), Ok(0));
        assert_eq!(parse_final("800", 800), Ok(800));
        assert_eq!(parse_final("801", 800), Err(WagerError::TooLarge { max: 800 }));
    }

    #[test]
    fn test_letters_never_enter_the_wager() {
        let mut input = WagerInput::default();
        for c in "a1b2c".chars() {
            input.handle(&InputEvent::Key(c));
        }
        assert_eq!(input.text(), "12");
        assert_eq!(input.error(), Some(&WagerError::NotANumber));

        input.handle(&InputEvent::Key('3'));
        assert_eq!(input.error(), None);
        input.handle(&InputEvent::Backspace);
        assert_eq!(input.daily_double(), Ok(12));
    }

    #[test]
    fn test_buttons_pass_through() {
        let mut input = WagerInput::default();
        assert!(!input.handle(&InputEvent::Key('+')));
        assert!(!input.handle(&InputEvent::Enter));
    }

    #[test]
    fn test_digit_limit() {
        let mut input = WagerInput::default();
        for _ in 0..20 {
            input.handle(&InputEvent::Key('9'));
        }
        assert_eq!(input.text().len(), MAX_DIGITS);
    }
}
