//! Box score for the game just played

use super::{draw_banner, draw_buttons, stage, Pending};
use crate::app::event::{Action, InputEvent};
use crate::app::{Context, GameState, StateKind, Store};
use crate::players::PlayerView;
use crate::render::{Color, RenderTarget, Size};
use crate::stats::{BoxScore, BOX_SCORE_COLUMNS};

const BUTTONS: [Action; 1] = [Action::Continue];

#[derive(Default)]
pub struct StatsState {
    pending: Pending,
    rows: Vec<BoxScore>,
    triple_stumpers: u32,
}

fn pad(row: &[&str], widths: &[usize]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Header and rows padded into aligned columns
fn table(rows: &[BoxScore]) -> Vec<String> {
    let cells: Vec<Vec<String>> = rows.iter().map(|r| r.cells()).collect();
    let widths: Vec<usize> = BOX_SCORE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(heading.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = vec![pad(&BOX_SCORE_COLUMNS, &widths)];
    for row in &cells {
        let row: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(pad(&row, &widths));
    }
    lines
}

impl GameState for StatsState {
    fn kind(&self) -> StateKind {
        StateKind::Stats
    }

    fn startup(&mut self, ctx: &mut Context) {
        self.rows = ctx.players.box_scores();
        self.triple_stumpers = ctx.players.triple_stumpers();
        match serde_json::to_string(&self.rows) {
            Ok(json) => tracing::info!(box_score = %json, triple_stumpers = self.triple_stumpers, "game summary"),
            Err(e) => tracing::warn!(error = %e, "could not encode box score"),
        }
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        self.pending.record(event, size, &BUTTONS);
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        match self.pending.take() {
            Some(Action::Continue) => {
                ctx.store.game_over = false;
                StateKind::Title
            }
            _ => StateKind::Stats,
        }
    }

    fn draw(&self, target: &mut dyn RenderTarget, _store: &Store, _players: &[PlayerView]) {
        draw_banner(target, "BOX SCORE", Color::Gold);
        let lines = table(&self.rows);
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        let area = stage(target).centered(width, lines.len() as u16 + 2);
        for (i, line) in lines.iter().enumerate() {
            let color = if i == 0 { Color::Gold } else { Color::White };
            target.draw_line(area.x, area.y + i as u16, line, color);
        }
        let footer = format!("Triple stumpers: {}", self.triple_stumpers);
        target.draw_line(area.x, area.y + lines.len() as u16 + 1, &footer, Color::Gray);
        draw_buttons(target, &BUTTONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::players::Eligible;
    use crate::render::RecordingTarget;

    #[test]
    fn test_table_aligns_columns() {
        let ctx = testing::context(2);
        ctx.players.answer_for(1, true, 12000);
        let lines = table(&ctx.players.box_scores());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("PLAYER  ATT"));
        let score_col = lines[0].find("FINAL SCORE").unwrap();
        assert_eq!(lines[2].find("$12000"), Some(score_col));
    }

    #[test]
    fn test_summary_after_game() {
        let mut ctx = testing::context(3);
        ctx.players.log_clue();
        ctx.players.green_light(Eligible::All);
        ctx.players.buzz_in(0);
        ctx.players.update(true, 400, false);
        ctx.players.log_question_stats();
        ctx.players.record_triple_stumper();
        ctx.store.game_over = true;

        let mut state = StatsState::default();
        state.startup(&mut ctx);
        let mut target = RecordingTarget::new(120, 30);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("CORRECT %"));
        assert!(target.shows("$400"));
        assert!(target.shows("Triple stumpers: 1"));

        state.handle_event(&InputEvent::Enter, Size::new(120, 30));
        assert_eq!(state.update(&mut ctx, 33), StateKind::Title);
        assert!(!ctx.store.game_over);
    }
}
