//! A seat's 3×4 card grid and scores.
//!
//! Cells move through `Absent → FaceDown → FaceUp → Absent`: dealt face-down,
//! revealed by flips and swaps, and removed for the rest of the round when
//! their column forms a triple.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::Card;
use super::rng::GameRng;
use crate::rules::EngineError;

/// Grid rows.
pub const ROWS: usize = 3;
/// Grid columns.
pub const COLS: usize = 4;
/// Cells per grid.
pub const CELLS: usize = ROWS * COLS;

/// Column indices removed by one `clear_column_triples` call, in order.
pub type ClearedColumns = SmallVec<[usize; COLS]>;

/// A validated grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    /// Validate a (row, col) pair against the 3×4 grid.
    pub fn new(row: usize, col: usize) -> Result<Self, EngineError> {
        if row < ROWS && col < COLS {
            Ok(Self { row, col })
        } else {
            Err(EngineError::OutOfBounds { row, col })
        }
    }

    /// All positions in row-major order (the dealing order).
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| GridPos { row, col }))
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One grid slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Never dealt, or cleared by a column triple.
    #[default]
    Absent,
    FaceDown(Card),
    FaceUp(Card),
}

impl Cell {
    /// The card in this cell, whatever its orientation.
    #[must_use]
    pub fn card(self) -> Option<Card> {
        match self {
            Cell::Absent => None,
            Cell::FaceDown(card) | Cell::FaceUp(card) => Some(card),
        }
    }

    #[must_use]
    pub fn is_present(self) -> bool {
        !matches!(self, Cell::Absent)
    }

    #[must_use]
    pub fn is_face_up(self) -> bool {
        matches!(self, Cell::FaceUp(_))
    }

    #[must_use]
    pub fn is_face_down(self) -> bool {
        matches!(self, Cell::FaceDown(_))
    }
}

/// A seated player's grid and scores.
///
/// The name is fixed for the match. Cells and the round score reset every
/// round; the total only ever accumulates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGrid {
    name: String,
    cells: [[Cell; COLS]; ROWS],
    round_score: i32,
    total_score: i32,
}

impl PlayerGrid {
    /// An empty (all-absent) grid for a newly seated player.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: [[Cell::Absent; COLS]; ROWS],
            round_score: 0,
            total_score: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows of cells, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Cell {
        self.cells[pos.row][pos.col]
    }

    /// Score stored for the last completed round (after doubling).
    #[must_use]
    pub fn round_score(&self) -> i32 {
        self.round_score
    }

    /// Cumulative score across completed rounds.
    #[must_use]
    pub fn total_score(&self) -> i32 {
        self.total_score
    }

    // === Dealing ===

    /// Put a dealt card face-down. Only used while dealing.
    pub fn place_initial(&mut self, pos: GridPos, card: Card) {
        self.cells[pos.row][pos.col] = Cell::FaceDown(card);
    }

    // === Moves ===

    /// Check that `pos` can be flipped, without changing anything.
    pub fn check_reveal(&self, pos: GridPos) -> Result<(), EngineError> {
        match self.cell(pos) {
            Cell::FaceDown(_) => Ok(()),
            Cell::FaceUp(_) => Err(EngineError::AlreadyRevealed { row: pos.row, col: pos.col }),
            Cell::Absent => Err(EngineError::CellAbsent { row: pos.row, col: pos.col }),
        }
    }

    /// Turn a face-down card face-up, returning it.
    pub fn reveal(&mut self, pos: GridPos) -> Result<Card, EngineError> {
        self.check_reveal(pos)?;
        let cell = &mut self.cells[pos.row][pos.col];
        let card = cell.card().ok_or(EngineError::CellAbsent { row: pos.row, col: pos.col })?;
        *cell = Cell::FaceUp(card);
        Ok(card)
    }

    /// Check that `pos` holds a card that can be swapped out.
    pub fn check_replace(&self, pos: GridPos) -> Result<(), EngineError> {
        if self.cell(pos).is_present() {
            Ok(())
        } else {
            Err(EngineError::CellAbsent { row: pos.row, col: pos.col })
        }
    }

    /// Put `card` face-up at `pos`, returning the card it displaced.
    pub fn replace(&mut self, pos: GridPos, card: Card) -> Result<Card, EngineError> {
        let old = self
            .cell(pos)
            .card()
            .ok_or(EngineError::CellAbsent { row: pos.row, col: pos.col })?;
        self.cells[pos.row][pos.col] = Cell::FaceUp(card);
        Ok(old)
    }

    /// Reveal a uniformly chosen face-down card.
    ///
    /// Returns `None` when nothing is face-down.
    pub fn reveal_random(&mut self, rng: &mut GameRng) -> Option<GridPos> {
        let candidates = self.face_down_positions();
        let pos = *rng.choose(&candidates)?;
        self.reveal(pos).ok()?;
        Some(pos)
    }

    /// Remove every column whose three cards are present, face-up and equal.
    ///
    /// Columns are checked left to right; the cleared indices are returned in
    /// that order.
    pub fn clear_column_triples(&mut self) -> ClearedColumns {
        let mut cleared = ClearedColumns::new();
        for col in 0..COLS {
            let top = self.cells[0][col];
            let is_triple = top.is_face_up()
                && (1..ROWS).all(|row| self.cells[row][col] == top);
            if is_triple {
                for row in 0..ROWS {
                    self.cells[row][col] = Cell::Absent;
                }
                cleared.push(col);
            }
        }
        cleared
    }

    /// Turn every remaining card face-up (round end).
    pub fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            if let Cell::FaceDown(card) = *cell {
                *cell = Cell::FaceUp(card);
            }
        }
    }

    // === Scoring ===

    /// Sum of every present card, revealed or not.
    #[must_use]
    pub fn card_sum(&self) -> i32 {
        self.cards().map(Card::value).sum()
    }

    /// Sum of the face-up cards only (the live score shown during play).
    #[must_use]
    pub fn revealed_score(&self) -> i32 {
        self.cells
            .iter()
            .flatten()
            .filter_map(|cell| match cell {
                Cell::FaceUp(card) => Some(card.value()),
                _ => None,
            })
            .sum()
    }

    /// True once every cell is either face-up or gone.
    #[must_use]
    pub fn all_revealed(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_face_down())
    }

    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_face_up()).count()
    }

    /// Cards still on the grid.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_present()).count()
    }

    /// Face-down positions in row-major order.
    #[must_use]
    pub fn face_down_positions(&self) -> Vec<GridPos> {
        GridPos::all().filter(|&pos| self.cell(pos).is_face_down()).collect()
    }

    /// Positions holding a card in row-major order.
    #[must_use]
    pub fn present_positions(&self) -> Vec<GridPos> {
        GridPos::all().filter(|&pos| self.cell(pos).is_present()).collect()
    }

    /// Store this round's (possibly doubled) score and add it to the total.
    pub fn record_round_score(&mut self, score: i32) {
        self.round_score = score;
        self.total_score += score;
    }

    // === Lifecycle ===

    /// Clear the grid and round score for a new deal. The total is kept.
    pub fn reset_for_round(&mut self) {
        self.cells = [[Cell::Absent; COLS]; ROWS];
        self.round_score = 0;
    }

    fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.cells.iter().flatten().filter_map(|cell| cell.card())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: i8) -> Card {
        Card::new(v).unwrap()
    }

    fn pos(row: usize, col: usize) -> GridPos {
        GridPos::new(row, col).unwrap()
    }

    /// Deal `values` row-major, face-down.
    fn dealt(values: [i8; CELLS]) -> PlayerGrid {
        let mut grid = PlayerGrid::new("test");
        for (p, v) in GridPos::all().zip(values) {
            grid.place_initial(p, card(v));
        }
        grid
    }

    #[test]
    fn test_grid_pos_bounds() {
        assert!(GridPos::new(2, 3).is_ok());
        assert_eq!(GridPos::new(3, 0), Err(EngineError::OutOfBounds { row: 3, col: 0 }));
        assert_eq!(GridPos::new(0, 4), Err(EngineError::OutOfBounds { row: 0, col: 4 }));
        assert_eq!(GridPos::all().count(), CELLS);
    }

    #[test]
    fn test_reveal_and_scores() {
        let mut grid = dealt([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);

        assert_eq!(grid.revealed_score(), 0);
        assert_eq!(grid.card_sum(), 78);

        assert_eq!(grid.reveal(pos(0, 0)), Ok(card(1)));
        assert_eq!(grid.reveal(pos(2, 3)), Ok(card(12)));

        assert_eq!(grid.revealed_score(), 13);
        assert_eq!(grid.revealed_count(), 2);
        assert_eq!(grid.reveal(pos(0, 0)), Err(EngineError::AlreadyRevealed { row: 0, col: 0 }));
    }

    #[test]
    fn test_replace_returns_old_value_face_up() {
        let mut grid = dealt([5; CELLS]);

        let old = grid.replace(pos(1, 2), card(-2)).unwrap();

        assert_eq!(old, card(5));
        assert_eq!(grid.cell(pos(1, 2)), Cell::FaceUp(card(-2)));
        assert_eq!(grid.card_sum(), 5 * 11 - 2);
    }

    #[test]
    fn test_column_triple_clears_only_matching_column() {
        let mut grid = dealt([
            4, 7, 4, 1,
            4, 7, 4, 2,
            4, 6, 3, 3,
        ]);
        grid.reveal_all();

        let cleared = grid.clear_column_triples();

        assert_eq!(cleared.as_slice(), &[0]);
        for row in 0..ROWS {
            assert_eq!(grid.cell(pos(row, 0)), Cell::Absent);
            assert!(grid.cell(pos(row, 1)).is_present());
            assert!(grid.cell(pos(row, 2)).is_present());
        }
        assert_eq!(grid.present_count(), 9);
    }

    #[test]
    fn test_column_triple_requires_all_face_up() {
        let mut grid = dealt([9; CELLS]);
        grid.reveal(pos(0, 1)).unwrap();
        grid.reveal(pos(1, 1)).unwrap();

        assert!(grid.clear_column_triples().is_empty());

        grid.reveal(pos(2, 1)).unwrap();
        assert_eq!(grid.clear_column_triples().as_slice(), &[1]);
    }

    #[test]
    fn test_multiple_triples_cleared_in_order() {
        let mut grid = dealt([-1, 0, 2, 0, -1, 0, 2, 0, -1, 0, 2, 0]);
        grid.reveal_all();

        assert_eq!(grid.clear_column_triples().as_slice(), &[0, 1, 2, 3]);
        assert!(grid.all_revealed());
        assert_eq!(grid.card_sum(), 0);
    }

    #[test]
    fn test_absent_cells_reject_moves() {
        let mut grid = dealt([3; CELLS]);
        grid.reveal_all();
        grid.clear_column_triples();

        let err = EngineError::CellAbsent { row: 0, col: 0 };
        assert_eq!(grid.reveal(pos(0, 0)), Err(err.clone()));
        assert_eq!(grid.replace(pos(0, 0), card(1)), Err(err));
    }

    #[test]
    fn test_all_revealed_ignores_absent() {
        let mut grid = PlayerGrid::new("p");
        assert!(grid.all_revealed());

        grid.place_initial(pos(0, 0), card(2));
        assert!(!grid.all_revealed());
        grid.reveal(pos(0, 0)).unwrap();
        assert!(grid.all_revealed());
    }

    #[test]
    fn test_reveal_random_is_seeded_and_exhausts() {
        let mut a = dealt([1; CELLS]);
        let mut b = dealt([1; CELLS]);
        let mut rng_a = GameRng::new(5);
        let mut rng_b = GameRng::new(5);

        for _ in 0..CELLS {
            let pa = a.reveal_random(&mut rng_a);
            assert!(pa.is_some());
            assert_eq!(pa, b.reveal_random(&mut rng_b));
        }
        assert_eq!(a.reveal_random(&mut rng_a), None);
        assert!(a.all_revealed());
    }

    #[test]
    fn test_round_scores_accumulate_and_reset() {
        let mut grid = dealt([1; CELLS]);
        grid.record_round_score(30);
        grid.record_round_score(-4);

        assert_eq!(grid.round_score(), -4);
        assert_eq!(grid.total_score(), 26);

        grid.reset_for_round();
        assert_eq!(grid.round_score(), 0);
        assert_eq!(grid.total_score(), 26);
        assert_eq!(grid.present_count(), 0);
        assert_eq!(grid.name(), "test");
    }
}
