//! Embedded offline clue bank
//!
//! Twelve of the bank's categories are dealt into two rounds at random. Daily
//! doubles are hidden in one slot of the first round and two slots (in
//! different categories) of the second. Finals and tie-break clues are drawn
//! from their own pools.

use super::loader::{LoadError, QuestionSource};
use super::{slot_value, Clue, GameData, RawGame, CATEGORIES, ROUNDS, ROWS};
use once_cell::sync::Lazy;
use rand::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Bank {
    categories: Vec<BankCategory>,
    finals: Vec<Clue>,
    tiebreakers: Vec<Clue>,
}

#[derive(Debug, Deserialize)]
struct BankCategory {
    name: String,
    #[serde(default)]
    comments: String,
    clues: Vec<Clue>,
}

/// Parsed once on first use
static BANK: Lazy<Result<Bank, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/bank.json")).map_err(|e| e.to_string())
});

fn bank() -> Result<&'static Bank, LoadError> {
    BANK.as_ref().map_err(|e| LoadError::Bank(e.clone()))
}

/// Daily doubles hidden in each round
const DAILY_DOUBLES: [usize; ROUNDS] = [1, 2];

/// Offline question source
#[derive(Debug, Clone, Default)]
pub struct BankSource {
    seed: Option<u64>,
}

impl BankSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deal the same game every time
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// Deal a game using a specific RNG
    pub fn deal_with_rng<R: Rng>(rng: &mut R) -> Result<GameData, LoadError> {
        let bank = bank()?;
        if bank.categories.len() < CATEGORIES * ROUNDS {
            return Err(LoadError::Bank(format!(
                "{} categories, need {}",
                bank.categories.len(),
                CATEGORIES * ROUNDS
            )));
        }

        let mut order: Vec<usize> = (0..bank.categories.len()).collect();
        order.shuffle(rng);

        let mut grids = Vec::with_capacity(ROUNDS);
        for (round, picks) in order.chunks(CATEGORIES).take(ROUNDS).enumerate() {
            let doubles = pick_doubles(rng, DAILY_DOUBLES[round]);
            let grid: Vec<Vec<Clue>> = (0..ROWS)
                .map(|row| {
                    picks
                        .iter()
                        .enumerate()
                        .map(|(col, &pick)| {
                            let category = &bank.categories[pick];
                            let mut clue = category.clues.get(row).cloned().unwrap_or_default();
                            clue.category = category.name.clone();
                            clue.comments = category.comments.clone();
                            clue.value = slot_value(round, row);
                            clue.daily_double = doubles.contains(&(col, row));
                            clue
                        })
                        .collect()
                })
                .collect();
            grids.push(grid);
        }

        let fj = bank
            .finals
            .choose(rng)
            .cloned()
            .ok_or_else(|| LoadError::Bank("no final clues".to_string()))?;

        Ok(GameData::try_from(RawGame { clues: grids, fj })?)
    }

    /// Draw a tie-break clue using a specific RNG
    pub fn tiebreaker_with_rng<R: Rng>(rng: &mut R) -> Result<Clue, LoadError> {
        bank()?
            .tiebreakers
            .choose(rng)
            .cloned()
            .ok_or_else(|| LoadError::Bank("no tie-break clues".to_string()))
    }
}

/// `count` distinct (column, row) slots in different columns
fn pick_doubles<R: Rng>(rng: &mut R, count: usize) -> Vec<(usize, usize)> {
    let mut columns: Vec<usize> = (0..CATEGORIES).collect();
    columns.shuffle(rng);
    columns
        .into_iter()
        .take(count)
        .map(|col| (col, rng.random_range(0..ROWS)))
        .collect()
}

impl QuestionSource for BankSource {
    fn fetch_game(&self) -> Result<GameData, LoadError> {
        match self.seed {
            Some(seed) => Self::deal_with_rng(&mut StdRng::seed_from_u64(seed)),
            None => Self::deal_with_rng(&mut rand::rng()),
        }
    }

    fn fetch_single(&self) -> Result<Clue, LoadError> {
        match self.seed {
            Some(seed) => Self::tiebreaker_with_rng(&mut StdRng::seed_from_u64(seed)),
            None => Self::tiebreaker_with_rng(&mut rand::rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubles_in(data: &GameData, round: usize) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (col, category) in data.rounds[round].categories.iter().enumerate() {
            for (row, slot) in category.clues.iter().enumerate() {
                if slot.as_ref().is_some_and(|c| c.daily_double) {
                    found.push((col, row));
                }
            }
        }
        found
    }

    #[test]
    fn test_bank_parses() {
        let bank = bank().unwrap();
        assert!(bank.categories.len() >= CATEGORIES * ROUNDS);
        assert!(bank.categories.iter().all(|c| c.clues.len() == ROWS));
        assert!(!bank.finals.is_empty());
        assert!(!bank.tiebreakers.is_empty());
    }

    #[test]
    fn test_dealt_game_is_valid() {
        let data = BankSource::seeded(7).fetch_game().unwrap();
        assert_eq!(data.rounds.len(), ROUNDS);
        assert_eq!(data.rounds[0].clues_left(), CATEGORIES * ROWS);
        assert!(data.final_clue.is_complete());

        let first: Vec<&str> = data.rounds[0].categories.iter().map(|c| c.name.as_str()).collect();
        let second: Vec<&str> = data.rounds[1].categories.iter().map(|c| c.name.as_str()).collect();
        assert!(first.iter().all(|name| !second.contains(name)));
    }

    #[test]
    fn test_daily_double_placement() {
        for seed in 0..10 {
            let data = BankSource::seeded(seed).fetch_game().unwrap();
            assert_eq!(doubles_in(&data, 0).len(), 1);
            let second = doubles_in(&data, 1);
            assert_eq!(second.len(), 2);
            assert_ne!(second[0].0, second[1].0);
        }
    }

    #[test]
    fn test_values_follow_slots() {
        let data = BankSource::seeded(3).fetch_game().unwrap();
        for round in 0..ROUNDS {
            for category in &data.rounds[round].categories {
                for (row, slot) in category.clues.iter().enumerate() {
                    assert_eq!(slot.as_ref().unwrap().value, slot_value(round, row));
                }
            }
        }
    }

    #[test]
    fn test_seeded_deal_repeats() {
        let a = BankSource::seeded(11).fetch_game().unwrap();
        let b = BankSource::seeded(11).fetch_game().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiebreaker() {
        let clue = BankSource::new().fetch_single().unwrap();
        assert!(clue.is_complete());
    }
}
