//! The clue board: pick a clue, or move on once the round is empty

use crate::app::event::{InputEvent, SCORE_STRIP};
use crate::app::{Context, GameState, StateKind, Store};
use crate::clues::{slot_value, CATEGORIES, ROUNDS, ROWS};
use crate::players::PlayerView;
use crate::render::{Color, Rect, RenderTarget, Size};
use crate::stats::format_money;

struct BoardLayout {
    headers: Vec<Rect>,
    /// `cells[col][row]`
    cells: Vec<Vec<Rect>>,
}

fn layout(size: Size) -> BoardLayout {
    let (area, _) = size.area().split_bottom(SCORE_STRIP);
    let header_height = (area.height / (ROWS as u16 + 1)).max(3);
    let (header_row, grid) = area.split_top(header_height);
    let headers = header_row.columns(CATEGORIES as u16);
    let cells = grid
        .columns(CATEGORIES as u16)
        .into_iter()
        .map(|col| col.rows(ROWS as u16))
        .collect();
    BoardLayout { headers, cells }
}

/// Board slot under a screen position
pub fn cell_at(size: Size, x: u16, y: u16) -> Option<(usize, usize)> {
    let layout = layout(size);
    layout.cells.iter().enumerate().find_map(|(col, rows)| {
        rows.iter()
            .position(|rect| rect.contains(x, y))
            .map(|row| (col, row))
    })
}

#[derive(Default)]
pub struct BoardState {
    selected: Option<(usize, usize)>,
}

impl GameState for BoardState {
    fn kind(&self) -> StateKind {
        StateKind::Board
    }

    fn startup(&mut self, ctx: &mut Context) {
        ctx.players.reset();
        ctx.players.show_control();
    }

    fn handle_event(&mut self, event: &InputEvent, size: Size) {
        if let InputEvent::Click { x, y } = event {
            self.selected = cell_at(size, *x, *y);
        }
    }

    fn update(&mut self, ctx: &mut Context, _elapsed_ms: u64) -> StateKind {
        let round_index = ctx.store.round;
        let Some(round) = ctx.store.data.as_mut().and_then(|d| d.round_mut(round_index)) else {
            tracing::warn!(round = round_index, "board without a round to play");
            return StateKind::Loading;
        };

        if round.is_exhausted() {
            ctx.store.round += 1;
            tracing::info!(round = ctx.store.round, "round complete");
            if ctx.store.round >= ROUNDS {
                return StateKind::Final;
            }
            ctx.players.update_control();
            return StateKind::Intro;
        }

        let Some((col, row)) = self.selected.take() else {
            return StateKind::Board;
        };
        let Some(clue) = round.take(col, row) else {
            return StateKind::Board;
        };
        tracing::info!(
            category = %clue.category,
            value = clue.value,
            daily_double = clue.daily_double,
            left = round.clues_left(),
            "clue selected"
        );
        let next = if clue.daily_double {
            StateKind::DailyDouble
        } else {
            StateKind::Question
        };
        ctx.store.clue = Some(clue);
        next
    }

    fn draw(&self, target: &mut dyn RenderTarget, store: &Store, _players: &[PlayerView]) {
        let Some(round) = store.data.as_ref().and_then(|d| d.round(store.round)) else {
            return;
        };
        let layout = layout(target.size());
        for (col, category) in round.categories.iter().enumerate() {
            if let Some(rect) = layout.headers.get(col) {
                target.outline_rect(*rect, Color::Black);
                target.draw_text(rect.inset(1, 1), &category.name, Color::White);
            }
            let Some(rows) = layout.cells.get(col) else {
                continue;
            };
            for (row, rect) in rows.iter().enumerate() {
                target.outline_rect(*rect, Color::Black);
                if round.is_available(col, row) {
                    let value = format_money(slot_value(store.round, row));
                    target.draw_text(rect.inset(1, 1), &value, Color::Gold);
                }
            }
        }
    }

    fn shows_scores(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing;
    use crate::clues::tests::game_data;
    use crate::render::RecordingTarget;

    const SIZE: Size = Size { width: 120, height: 40 };

    fn click_on(state: &mut BoardState, col: usize, row: usize) {
        let rect = layout(SIZE).cells[col][row];
        state.handle_event(
            &InputEvent::Click {
                x: rect.x + 1,
                y: rect.y + 1,
            },
            SIZE,
        );
    }

    fn empty_round(ctx: &mut Context, round: usize) {
        let data = ctx.store.data.as_mut().unwrap();
        let round = data.round_mut(round).unwrap();
        for col in 0..CATEGORIES {
            for row in 0..ROWS {
                round.take(col, row);
            }
        }
    }

    fn board_context() -> Context {
        let mut ctx = testing::context(3);
        ctx.store.data = Some(game_data());
        ctx
    }

    #[test]
    fn test_cell_hit_test() {
        let rect = layout(SIZE).cells[4][2];
        assert_eq!(cell_at(SIZE, rect.x, rect.y), Some((4, 2)));
        assert_eq!(cell_at(SIZE, 0, 0), None);
        assert_eq!(cell_at(SIZE, 0, SIZE.height - 1), None);
    }

    #[test]
    fn test_pick_clue() {
        let mut ctx = board_context();
        let mut state = BoardState::default();
        state.startup(&mut ctx);

        click_on(&mut state, 1, 2);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Question);
        assert_eq!(ctx.store.clue.as_ref().unwrap().value, 600);
        let round = ctx.store.data.as_ref().unwrap().round(0).unwrap();
        assert!(!round.is_available(1, 2));
    }

    #[test]
    fn test_taken_slot_stays_on_board() {
        let mut ctx = board_context();
        ctx.store.data.as_mut().unwrap().round_mut(0).unwrap().take(0, 0);
        let mut state = BoardState::default();
        click_on(&mut state, 0, 0);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Board);
        assert!(ctx.store.clue.is_none());
    }

    #[test]
    fn test_daily_double_slot() {
        let mut ctx = board_context();
        {
            let round = ctx.store.data.as_mut().unwrap().round_mut(0).unwrap();
            if let Some(clue) = round.categories[3].clues[4].as_mut() {
                clue.daily_double = true;
            }
        }
        let mut state = BoardState::default();
        click_on(&mut state, 3, 4);
        assert_eq!(state.update(&mut ctx, 33), StateKind::DailyDouble);
    }

    #[test]
    fn test_exhausted_first_round_goes_to_intro() {
        let mut ctx = board_context();
        ctx.players.answer_for(0, true, 400);
        ctx.players.answer_for(1, false, 200);
        ctx.players.answer_for(2, true, 200);
        empty_round(&mut ctx, 0);

        let mut state = BoardState::default();
        state.startup(&mut ctx);
        assert_eq!(state.update(&mut ctx, 33), StateKind::Intro);
        assert_eq!(ctx.store.round, 1);
        assert_eq!(ctx.players.control(), 1);
    }

    #[test]
    fn test_exhausted_second_round_goes_to_final() {
        let mut ctx = board_context();
        ctx.store.round = 1;
        empty_round(&mut ctx, 1);

        let mut state = BoardState::default();
        assert_eq!(state.update(&mut ctx, 33), StateKind::Final);
        assert_eq!(ctx.store.round, 2);
    }

    #[test]
    fn test_control_light_on_entry() {
        let mut ctx = board_context();
        let mut state = BoardState::default();
        state.startup(&mut ctx);
        let control = ctx.players.control();
        assert!(ctx.players.snapshot()[control].light);
    }

    #[test]
    fn test_draw_board() {
        let mut ctx = board_context();
        ctx.store.data.as_mut().unwrap().round_mut(0).unwrap().take(2, 0);
        let state = BoardState::default();
        let mut target = RecordingTarget::new(SIZE.width, SIZE.height);
        state.draw(&mut target, &ctx.store, &[]);
        assert!(target.shows("R0C2"));
        assert!(target.shows("$1000"));
        let dollar_cells = target.texts().iter().filter(|t| t.starts_with('$')).count();
        assert_eq!(dollar_cells, CATEGORIES * ROWS - 1);
    }
}
