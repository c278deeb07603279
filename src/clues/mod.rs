//! Clue model: categories, rounds, the final clue, and validation of
//! incoming game data
//!
//! Game data arrives as two rounds, each a grid of rows where column `i` of
//! every row belongs to the category named by column `i` of the first row.
//! Validation turns that grid into six categories of five clues, one per
//! dollar slot, so the board can be drawn without further checks.

pub mod bank;
pub mod loader;

pub use bank::BankSource;
pub use loader::{FetchStatus, FetchTask, HttpSource, QuestionSource};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Categories on the board in each round
pub const CATEGORIES: usize = 6;

/// Clues in each category
pub const ROWS: usize = 5;

/// Regular rounds before the final clue
pub const ROUNDS: usize = 2;

/// Slot value in the first round; later rounds multiply by the round number
pub const BASE_VALUE: i64 = 200;

/// Dollar value of `row` (zero-based) in `round` (zero-based)
pub fn slot_value(round: usize, row: usize) -> i64 {
    BASE_VALUE * (row as i64 + 1) * (round as i64 + 1)
}

/// A single clue.
///
/// `clue` is the prompt read to the players; `response` is what a correct
/// answer sounds like. On the wire these are `answer` and `question`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    #[serde(default)]
    pub category: String,
    #[serde(rename = "answer", default)]
    pub clue: String,
    #[serde(rename = "question", default)]
    pub response: String,
    #[serde(default, deserialize_with = "nullable_value")]
    pub value: i64,
    #[serde(default, deserialize_with = "flag")]
    pub daily_double: bool,
    #[serde(default)]
    pub comments: String,
}

impl Clue {
    /// Category, clue and response are all present
    pub fn is_complete(&self) -> bool {
        !self.category.trim().is_empty()
            && !self.clue.trim().is_empty()
            && !self.response.trim().is_empty()
    }
}

/// Daily double flags come through as `1`/`0` or `true`/`false`
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(()) => false,
    })
}

fn nullable_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

/// One column of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Host notes read after the name; `-` means none
    pub comments: String,
    /// Slot `i` holds the clue worth `slot_value(round, i)`, or `None` once taken
    pub clues: Vec<Option<Clue>>,
}

impl Category {
    /// Name plus comments, as announced in the intro
    pub fn announcement(&self) -> String {
        let comments = self.comments.trim();
        if comments.is_empty() || comments == "-" {
            self.name.clone()
        } else {
            format!("{} {}", self.name, comments)
        }
    }
}

/// A board of categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub index: usize,
    pub categories: Vec<Category>,
}

impl Round {
    /// Remove and return the clue at (`col`, `row`); `None` if already taken
    pub fn take(&mut self, col: usize, row: usize) -> Option<Clue> {
        self.categories.get_mut(col)?.clues.get_mut(row)?.take()
    }

    pub fn is_available(&self, col: usize, row: usize) -> bool {
        self.categories
            .get(col)
            .and_then(|c| c.clues.get(row))
            .is_some_and(|slot| slot.is_some())
    }

    pub fn clues_left(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.clues.iter().filter(|slot| slot.is_some()).count())
            .sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.clues_left() == 0
    }
}

/// Everything needed to play a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameData {
    pub rounds: Vec<Round>,
    pub final_clue: Clue,
}

impl GameData {
    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    pub fn round_mut(&mut self, index: usize) -> Option<&mut Round> {
        self.rounds.get_mut(index)
    }
}

/// A full game as served by the question API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGame {
    /// One grid per round; each grid is a list of rows
    pub clues: Vec<Vec<Vec<Clue>>>,
    /// The final clue
    pub fj: Clue,
}

/// Why a game was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("final clue is incomplete")]
    BadFinal,
    #[error("round {round} is missing")]
    MissingRound { round: usize },
    #[error("round {round} has {found} categories, need 6")]
    NotEnoughCategories { round: usize, found: usize },
    #[error("category {category:?} in round {round} has {found} clues, need 5")]
    NotEnoughClues { round: usize, category: String, found: usize },
    #[error("category {category:?} has an incomplete clue")]
    IncompleteClue { category: String },
    #[error("category {category:?} in round {round} has a clue worth {value}")]
    BadValue { round: usize, category: String, value: i64 },
    #[error("category {category:?} in round {round} is missing values {missing:?}")]
    MissingValues { round: usize, category: String, missing: Vec<i64> },
}

impl TryFrom<RawGame> for GameData {
    type Error = ValidationError;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        if !raw.fj.is_complete() {
            return Err(ValidationError::BadFinal);
        }
        let mut grids = raw.clues.into_iter();
        let mut rounds = Vec::with_capacity(ROUNDS);
        for round in 0..ROUNDS {
            let grid = grids.next().ok_or(ValidationError::MissingRound { round })?;
            rounds.push(build_round(round, grid)?);
        }
        Ok(GameData {
            rounds,
            final_clue: raw.fj,
        })
    }
}

/// Regroup a row-major grid by column and validate each category
fn build_round(round: usize, grid: Vec<Vec<Clue>>) -> Result<Round, ValidationError> {
    let mut columns: Vec<Vec<Clue>> = Vec::new();
    for row in grid {
        for (i, clue) in row.into_iter().enumerate() {
            if columns.len() <= i {
                columns.resize_with(i + 1, Vec::new);
            }
            columns[i].push(clue);
        }
    }
    if columns.len() < CATEGORIES {
        return Err(ValidationError::NotEnoughCategories {
            round,
            found: columns.len(),
        });
    }
    let categories = columns
        .into_iter()
        .take(CATEGORIES)
        .map(|clues| build_category(round, clues))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Round {
        index: round,
        categories,
    })
}

/// Place each clue in its dollar slot.
///
/// Every slot needs a clue of that value, except that a single daily double
/// may stand in for one missing value. The daily double keeps its own slot if
/// that slot is free.
fn build_category(round: usize, clues: Vec<Clue>) -> Result<Category, ValidationError> {
    let name = clues.first().map(|c| c.category.clone()).unwrap_or_default();
    if clues.len() < ROWS {
        return Err(ValidationError::NotEnoughClues {
            round,
            category: name,
            found: clues.len(),
        });
    }
    if clues.iter().any(|c| !c.is_complete()) {
        return Err(ValidationError::IncompleteClue { category: name });
    }

    let values: Vec<i64> = (0..ROWS).map(|row| slot_value(round, row)).collect();
    let mut slots: Vec<Option<Clue>> = vec![None; ROWS];
    let mut doubles = Vec::new();

    for clue in clues.iter() {
        if clue.daily_double {
            doubles.push(clue.clone());
            continue;
        }
        let Some(row) = values.iter().position(|v| *v == clue.value) else {
            return Err(ValidationError::BadValue {
                round,
                category: name,
                value: clue.value,
            });
        };
        if slots[row].is_none() {
            slots[row] = Some(clue.clone());
        }
    }

    let missing: Vec<usize> = (0..ROWS).filter(|row| slots[*row].is_none()).collect();
    match (missing.as_slice(), doubles.len()) {
        ([], _) => {}
        ([row], 1) => {
            let mut double = doubles.remove(0);
            double.value = values[*row];
            slots[*row] = Some(double);
        }
        _ => {
            return Err(ValidationError::MissingValues {
                round,
                category: name,
                missing: missing.iter().map(|row| values[*row]).collect(),
            });
        }
    }

    let comments = clues.first().map(|c| c.comments.clone()).unwrap_or_default();
    Ok(Category {
        name,
        comments,
        clues: slots,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn clue(category: &str, value: i64) -> Clue {
        Clue {
            category: category.to_string(),
            clue: format!("{} for {}", category, value),
            response: format!("What is {}?", value),
            value,
            daily_double: false,
            comments: "-".to_string(),
        }
    }

    pub(crate) fn grid(round: usize) -> Vec<Vec<Clue>> {
        (0..ROWS)
            .map(|row| {
                (0..CATEGORIES)
                    .map(|col| clue(&format!("R{}C{}", round, col), slot_value(round, row)))
                    .collect()
            })
            .collect()
    }

    pub(crate) fn raw_game() -> RawGame {
        RawGame {
            clues: vec![grid(0), grid(1)],
            fj: clue("FINAL", 0),
        }
    }

    pub(crate) fn game_data() -> GameData {
        GameData::try_from(raw_game()).unwrap()
    }

    #[test]
    fn test_slot_values() {
        assert_eq!(slot_value(0, 0), 200);
        assert_eq!(slot_value(0, 4), 1000);
        assert_eq!(slot_value(1, 0), 400);
        assert_eq!(slot_value(1, 4), 2000);
    }

    #[test]
    fn test_valid_game() {
        let data = game_data();
        assert_eq!(data.rounds.len(), 2);
        assert_eq!(data.rounds[1].categories.len(), CATEGORIES);
        assert_eq!(data.rounds[0].categories[2].name, "R0C2");
        assert_eq!(data.rounds[0].clues_left(), 30);
    }

    #[test]
    fn test_take_consumes_once() {
        let mut data = game_data();
        let round = data.round_mut(0).unwrap();
        let clue = round.take(1, 2).unwrap();
        assert_eq!(clue.value, 600);
        assert!(round.take(1, 2).is_none());
        assert!(!round.is_available(1, 2));
        assert_eq!(round.clues_left(), 29);
        assert!(round.take(9, 0).is_none());
    }

    #[test]
    fn test_exhausted_round() {
        let mut data = game_data();
        let round = data.round_mut(0).unwrap();
        for col in 0..CATEGORIES {
            for row in 0..ROWS {
                round.take(col, row);
            }
        }
        assert!(round.is_exhausted());
    }

    #[test]
    fn test_daily_double_fills_missing_value() {
        let mut raw = raw_game();
        raw.clues[0][3][0].value = 0;
        raw.clues[0][3][0].daily_double = true;
        let data = GameData::try_from(raw).unwrap();
        let slot = data.rounds[0].categories[0].clues[3].as_ref().unwrap();
        assert!(slot.daily_double);
        assert_eq!(slot.value, 800);
    }

    #[test]
    fn test_bad_value_rejected() {
        let mut raw = raw_game();
        raw.clues[1][0][2].value = 300;
        assert!(matches!(
            GameData::try_from(raw),
            Err(ValidationError::BadValue { round: 1, value: 300, .. })
        ));
    }

    #[test]
    fn test_missing_value_rejected() {
        let mut raw = raw_game();
        raw.clues[0][4][5].value = 200;
        assert!(matches!(
            GameData::try_from(raw),
            Err(ValidationError::MissingValues { round: 0, .. })
        ));
    }

    #[test]
    fn test_short_category_rejected() {
        let mut raw = raw_game();
        raw.clues[0][4].truncate(3);
        assert!(matches!(
            GameData::try_from(raw),
            Err(ValidationError::NotEnoughClues { found: 4, .. })
        ));
    }

    #[test]
    fn test_incomplete_clue_rejected() {
        let mut raw = raw_game();
        raw.clues[0][2][1].response = "  ".to_string();
        assert!(matches!(GameData::try_from(raw), Err(ValidationError::IncompleteClue { .. })));
    }

    #[test]
    fn test_bad_final_rejected() {
        let mut raw = raw_game();
        raw.fj.clue.clear();
        assert_eq!(GameData::try_from(raw), Err(ValidationError::BadFinal));
    }

    #[test]
    fn test_missing_round_rejected() {
        let mut raw = raw_game();
        raw.clues.pop();
        assert_eq!(
            GameData::try_from(raw),
            Err(ValidationError::MissingRound { round: 1 })
        );
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "category": "SCIENCE",
            "answer": "This planet is closest to the sun",
            "question": "What is Mercury?",
            "value": null,
            "daily_double": 1,
            "comments": "-"
        }"#;
        let clue: Clue = serde_json::from_str(json).unwrap();
        assert_eq!(clue.clue, "This planet is closest to the sun");
        assert_eq!(clue.response, "What is Mercury?");
        assert_eq!(clue.value, 0);
        assert!(clue.daily_double);

        let clue: Clue = serde_json::from_str(r#"{"daily_double": false}"#).unwrap();
        assert!(!clue.daily_double);
        assert!(!clue.is_complete());
    }

    #[test]
    fn test_announcement() {
        let mut category = Category {
            name: "POTENT POTABLES".to_string(),
            comments: "-".to_string(),
            clues: Vec::new(),
        };
        assert_eq!(category.announcement(), "POTENT POTABLES");
        category.comments = "(Every answer is a cocktail.)".to_string();
        assert_eq!(category.announcement(), "POTENT POTABLES (Every answer is a cocktail.)");
    }
}
