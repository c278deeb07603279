//! Per-player game statistics and the end-of-game box score
//!
//! Counters are fed by the buzzer arbiter while a clue is live:
//! - every press on a live clue counts as a buzz
//! - a clue with at least one buzz counts as an attempt
//! - winning the buzzer counts as a ring-in
//! - a ring-in judged correct counts as correct
//!
//! Daily double wagers are kept as signed amounts (negative when missed).

use serde::Serialize;

/// Running counters for one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    /// Clues on which the player pressed at least once
    pub attempts: u32,
    /// Clues on which the player won the buzzer
    pub rang_in: u32,
    /// Ring-ins judged correct
    pub correct: u32,
    /// Daily double wagers, negative when answered incorrectly
    pub daily_doubles: Vec<i64>,
    /// Presses on the current clue
    buzzes: u32,
    /// Whether a clue is currently live
    live: bool,
}

impl PlayerStats {
    /// A clue was presented; presses now count
    pub fn record_clue(&mut self) {
        self.live = true;
    }

    /// A physical press
    pub fn record_buzzer(&mut self) {
        if self.live {
            self.buzzes += 1;
        }
    }

    /// The player won the buzzer
    pub fn record_ring_in(&mut self) {
        self.rang_in += 1;
    }

    pub fn record_correct(&mut self) {
        self.correct += 1;
    }

    /// Close out the current clue
    pub fn record_question(&mut self) {
        if self.buzzes > 0 {
            self.attempts += 1;
            self.buzzes = 0;
        }
        self.live = false;
    }

    pub fn record_daily_double(&mut self, wager: i64, correct: bool) {
        self.daily_doubles.push(if correct { wager } else { -wager });
    }

    /// Presses recorded on the clue in progress
    pub fn pending_buzzes(&self) -> u32 {
        self.buzzes
    }
}

/// One row of the end-of-game summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxScore {
    /// Zero-based player id
    pub player: usize,
    pub attempts: u32,
    pub rang_in: u32,
    pub correct: u32,
    pub daily_doubles: Vec<i64>,
    pub final_score: i64,
}

impl BoxScore {
    pub fn new(player: usize, stats: &PlayerStats, final_score: i64) -> Self {
        Self {
            player,
            attempts: stats.attempts,
            rang_in: stats.rang_in,
            correct: stats.correct,
            daily_doubles: stats.daily_doubles.clone(),
            final_score,
        }
    }

    pub fn incorrect(&self) -> u32 {
        self.rang_in.saturating_sub(self.correct)
    }

    /// Share of attempts where the player won the buzzer
    pub fn buzzer_pct(&self) -> String {
        percent(self.rang_in, self.attempts)
    }

    /// Share of ring-ins answered correctly
    pub fn correct_pct(&self) -> String {
        percent(self.correct, self.rang_in)
    }

    /// Count followed by the signed wagers, e.g. `2 $400, -$1000`
    pub fn daily_double_summary(&self) -> String {
        let wagers: Vec<String> = self.daily_doubles.iter().map(|w| format_money(*w)).collect();
        if wagers.is_empty() {
            "0".to_string()
        } else {
            format!("{} {}", wagers.len(), wagers.join(", "))
        }
    }

    /// Cells in column order: PLAYER ATT BUZ BUZ% COR/INC CORRECT% DD FINAL SCORE
    pub fn cells(&self) -> Vec<String> {
        vec![
            (self.player + 1).to_string(),
            self.attempts.to_string(),
            self.rang_in.to_string(),
            self.buzzer_pct(),
            format!("{}/{}", self.correct, self.incorrect()),
            self.correct_pct(),
            self.daily_double_summary(),
            format_money(self.final_score),
        ]
    }
}

/// Column headings matching [`BoxScore::cells`]
pub const BOX_SCORE_COLUMNS: [&str; 8] = [
    "PLAYER",
    "ATT",
    "BUZ",
    "BUZ%",
    "COR/INC",
    "CORRECT %",
    "DD",
    "FINAL SCORE",
];

/// `$1200` / `-$400`
pub fn format_money(amount: i64) -> String {
    if amount < 0 {
        format!("-${}", -amount)
    } else {
        format!("${}", amount)
    }
}

fn percent(part: u32, whole: u32) -> String {
    if whole == 0 {
        "N/A".to_string()
    } else {
        format!("{}%", 100 * part / whole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buzzes_only_count_on_live_clue() {
        let mut stats = PlayerStats::default();
        stats.record_buzzer();
        stats.record_question();
        assert_eq!(stats.attempts, 0);

        stats.record_clue();
        stats.record_buzzer();
        stats.record_buzzer();
        assert_eq!(stats.pending_buzzes(), 2);
        stats.record_question();
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.pending_buzzes(), 0);
    }

    #[test]
    fn test_percentages() {
        let mut stats = PlayerStats::default();
        stats.attempts = 4;
        stats.rang_in = 3;
        stats.correct = 2;
        let row = BoxScore::new(0, &stats, 1200);
        assert_eq!(row.buzzer_pct(), "75%");
        assert_eq!(row.correct_pct(), "66%");
        assert_eq!(row.incorrect(), 1);
    }

    #[test]
    fn test_percentages_without_attempts() {
        let row = BoxScore::new(1, &PlayerStats::default(), 0);
        assert_eq!(row.buzzer_pct(), "N/A");
        assert_eq!(row.correct_pct(), "N/A");
    }

    #[test]
    fn test_daily_double_summary() {
        let mut stats = PlayerStats::default();
        stats.record_daily_double(400, true);
        stats.record_daily_double(1000, false);
        let row = BoxScore::new(2, &stats, -600);
        assert_eq!(row.daily_double_summary(), "2 $400, -$1000");
        assert_eq!(row.cells()[0], "3");
        assert_eq!(row.cells()[7], "-$600");
    }
}
