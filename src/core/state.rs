//! Round and turn state machine.
//!
//! ## Stages
//!
//! ```text
//! Waiting ─start_game─▶ SelectInitialCards ─finish_initial_selection─▶ Playing
//!    Playing ─trigger_round_end─▶ EndRound ─(every seat completes)─▶ RoundEnd
//!    RoundEnd ─start_new_round─▶ Playing        RoundEnd ─end_game─▶ GameOver
//! ```
//!
//! Each `Stage` variant carries only the fields that are meaningful in it: the
//! turn `Phase` exists only while cards are being played, and the held card
//! exists only inside the two phases that hold one. The trigger seat is
//! recorded from `EndRound` onwards.
//!
//! ## Phases
//!
//! ```text
//! ChoosePile ─deck─▶ DecideCard ─keep─▶ SwapCard ─▶ (turn ends)
//!      │                   └─discard─▶ FlipCard ─▶ (turn ends)
//!      └─discard pile─▶ SwapCard
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::card::Card;
use super::grid::PlayerGrid;
use super::player::{PlayerId, PlayerMap};
use crate::rules::EngineError;

/// Coarse state, without per-state data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Waiting,
    SelectInitialCards,
    Playing,
    EndRound,
    RoundEnd,
    GameOver,
}

impl StateKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StateKind::Waiting => "waiting",
            StateKind::SelectInitialCards => "select_initial_cards",
            StateKind::Playing => "playing",
            StateKind::EndRound => "end_round",
            StateKind::RoundEnd => "round_end",
            StateKind::GameOver => "game_over",
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn phase, without the held card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    ChoosePile,
    DecideCard,
    SwapCard,
    FlipCard,
}

impl PhaseKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PhaseKind::ChoosePile => "choose_pile",
            PhaseKind::DecideCard => "decide_card",
            PhaseKind::SwapCard => "swap_card",
            PhaseKind::FlipCard => "flip_card",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current turn stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Pick the deck or the discard pile.
    ChoosePile,
    /// Drawn from the deck: keep it or throw it away.
    DecideCard { held: Card },
    /// Must place the held card on the grid.
    SwapCard { held: Card },
    /// Drawn card was discarded: flip a face-down card.
    FlipCard,
}

impl Phase {
    #[must_use]
    pub const fn kind(self) -> PhaseKind {
        match self {
            Phase::ChoosePile => PhaseKind::ChoosePile,
            Phase::DecideCard { .. } => PhaseKind::DecideCard,
            Phase::SwapCard { .. } => PhaseKind::SwapCard,
            Phase::FlipCard => PhaseKind::FlipCard,
        }
    }

    /// The card between draw and resolution, if any.
    #[must_use]
    pub const fn held(self) -> Option<Card> {
        match self {
            Phase::DecideCard { held } | Phase::SwapCard { held } => Some(held),
            Phase::ChoosePile | Phase::FlipCard => None,
        }
    }
}

/// Result of a completed match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single seat with the lowest total.
    Winner(PlayerId),
    /// Several seats tied at the lowest total.
    Winners(Vec<PlayerId>),
}

impl GameResult {
    /// Check if a seat won (alone or tied).
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
        }
    }

    /// Winning seats in seat order.
    #[must_use]
    pub fn winners(&self) -> Vec<PlayerId> {
        match self {
            GameResult::Winner(p) => vec![*p],
            GameResult::Winners(ps) => ps.clone(),
        }
    }
}

/// Stage of the match, carrying only what is valid in that stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Seats are being filled.
    Waiting,
    /// Seats flip their initial cards in seat order.
    SelectInitialCards,
    /// Normal turns.
    Playing { phase: Phase },
    /// Someone revealed everything; remaining seats take one last turn.
    EndRound {
        phase: Phase,
        trigger: PlayerId,
        completed: FxHashSet<PlayerId>,
    },
    /// Round scored, waiting for the next deal.
    RoundEnd { trigger: PlayerId },
    GameOver { trigger: PlayerId, result: GameResult },
}

impl Stage {
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            Stage::Waiting => StateKind::Waiting,
            Stage::SelectInitialCards => StateKind::SelectInitialCards,
            Stage::Playing { .. } => StateKind::Playing,
            Stage::EndRound { .. } => StateKind::EndRound,
            Stage::RoundEnd { .. } => StateKind::RoundEnd,
            Stage::GameOver { .. } => StateKind::GameOver,
        }
    }
}

/// Scores produced by `GameState::end_round`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    /// Card sums before doubling, in seat order.
    pub raw_scores: Vec<i32>,
    /// Scores added to the totals, in seat order.
    pub scores: Vec<i32>,
    /// The trigger seat, if its score was doubled.
    pub doubled: Option<PlayerId>,
}

/// Seats plus the round/turn state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    seats: PlayerMap<PlayerGrid>,
    current: PlayerId,
    round: u32,
    stage: Stage,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// An empty table in `Waiting`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seats: PlayerMap::new(),
            current: PlayerId::new(0),
            round: 1,
            stage: Stage::Waiting,
        }
    }

    // === Seats ===

    /// Seat a player. Only meaningful while waiting; the engine checks that.
    pub fn add_player(&mut self, grid: PlayerGrid) -> PlayerId {
        self.seats.push(grid)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.player_count()
    }

    #[must_use]
    pub fn seats(&self) -> &PlayerMap<PlayerGrid> {
        &self.seats
    }

    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<&PlayerGrid> {
        self.seats.get(player)
    }

    pub(crate) fn seat_mut(&mut self, player: PlayerId) -> Option<&mut PlayerGrid> {
        self.seats.get_mut(player)
    }

    pub(crate) fn seats_mut(&mut self) -> &mut PlayerMap<PlayerGrid> {
        &mut self.seats
    }

    // === Queries ===

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn kind(&self) -> StateKind {
        self.stage.kind()
    }

    /// Round number, starting at 1.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seat expected to act. `None` until the game has started.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.stage {
            Stage::Waiting => None,
            _ => Some(self.current),
        }
    }

    /// Turn phase while cards are being played.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match &self.stage {
            Stage::Playing { phase } | Stage::EndRound { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    #[must_use]
    pub fn held_card(&self) -> Option<Card> {
        self.phase().and_then(Phase::held)
    }

    /// Seat that revealed its grid first this round.
    #[must_use]
    pub fn trigger_player(&self) -> Option<PlayerId> {
        match &self.stage {
            Stage::EndRound { trigger, .. }
            | Stage::RoundEnd { trigger }
            | Stage::GameOver { trigger, .. } => Some(*trigger),
            _ => None,
        }
    }

    /// Seats that have finished their final turn, in seat order.
    #[must_use]
    pub fn completed_final_turns(&self) -> Vec<PlayerId> {
        match &self.stage {
            Stage::EndRound { completed, .. } => {
                let mut seats: Vec<_> = completed.iter().copied().collect();
                seats.sort();
                seats
            }
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        match &self.stage {
            Stage::GameOver { result, .. } => Some(result),
            _ => None,
        }
    }

    // === Transitions ===

    /// Leave `Waiting` with the first seat to choose initial cards.
    pub fn start_game(&mut self, min_players: usize) -> Result<(), EngineError> {
        if self.stage != Stage::Waiting {
            return Err(EngineError::GameAlreadyStarted);
        }
        if self.player_count() < min_players {
            return Err(EngineError::NotEnoughPlayers {
                min: min_players,
                have: self.player_count(),
            });
        }
        self.stage = Stage::SelectInitialCards;
        self.current = PlayerId::new(0);
        self.round = 1;
        Ok(())
    }

    /// Pick the starting seat and begin play.
    ///
    /// The strictly highest revealed sum starts; ties go to the lowest seat.
    pub fn finish_initial_selection(&mut self) -> Result<PlayerId, EngineError> {
        self.expect_kind(StateKind::SelectInitialCards)?;

        let mut starter = PlayerId::new(0);
        let mut best = i32::MIN;
        for (player, grid) in self.seats.iter() {
            let score = grid.revealed_score();
            if score > best {
                best = score;
                starter = player;
            }
        }

        self.current = starter;
        self.stage = Stage::Playing {
            phase: Phase::ChoosePile,
        };
        Ok(starter)
    }

    /// Advance to the next seat.
    ///
    /// During the final turns, seats that already finished are skipped. If
    /// every seat is finished the seat simply moves on by one.
    pub fn next_player(&mut self) {
        let n = self.player_count();
        if n == 0 {
            return;
        }
        let start = self.current;
        let mut next = start.next(n);

        if let Stage::EndRound { completed, .. } = &self.stage {
            while completed.contains(&next) && completed.len() < n {
                next = next.next(n);
                if next == start {
                    break;
                }
            }
        }
        self.current = next;
    }

    /// Replace the turn phase. Only `Playing` and `EndRound` have one.
    pub fn set_phase(&mut self, next: Phase) -> Result<(), EngineError> {
        match &mut self.stage {
            Stage::Playing { phase } | Stage::EndRound { phase, .. } => {
                *phase = next;
                Ok(())
            }
            other => Err(EngineError::WrongState {
                expected: StateKind::Playing,
                actual: other.kind(),
            }),
        }
    }

    /// The current seat revealed its whole grid: start the final turns.
    pub fn trigger_round_end(&mut self) -> Result<(), EngineError> {
        self.expect_kind(StateKind::Playing)?;

        let trigger = self.current;
        let mut completed = FxHashSet::default();
        completed.insert(trigger);
        self.stage = Stage::EndRound {
            phase: Phase::ChoosePile,
            trigger,
            completed,
        };
        self.next_player();
        Ok(())
    }

    /// Mark the current seat's final turn as done. Idempotent.
    pub fn complete_final_turn(&mut self) {
        if let Stage::EndRound { completed, .. } = &mut self.stage {
            completed.insert(self.current);
        }
    }

    /// True once every seat has completed its final turn.
    #[must_use]
    pub fn should_end_round(&self) -> bool {
        match &self.stage {
            Stage::EndRound { completed, .. } => completed.len() == self.player_count(),
            _ => false,
        }
    }

    /// Reveal everything, score the round and move to `RoundEnd`.
    ///
    /// The trigger seat's score doubles iff it is strictly greater than the
    /// lowest score of the round.
    pub fn end_round(&mut self) -> Result<RoundSummary, EngineError> {
        let trigger = match &self.stage {
            Stage::EndRound { trigger, .. } if self.should_end_round() => *trigger,
            _ => return Err(EngineError::RoundNotOver { actual: self.kind() }),
        };

        for grid in self.seats.values_mut() {
            grid.reveal_all();
        }

        let raw_scores: Vec<i32> = self.seats.values().map(PlayerGrid::card_sum).collect();
        let min = raw_scores.iter().copied().min().unwrap_or(0);
        let doubled = (raw_scores[trigger.index()] > min).then_some(trigger);

        let mut scores = raw_scores.clone();
        if let Some(seat) = doubled {
            scores[seat.index()] *= 2;
        }
        for ((_, grid), &score) in self.seats.iter_mut().zip(&scores) {
            grid.record_round_score(score);
        }

        self.stage = Stage::RoundEnd { trigger };
        Ok(RoundSummary {
            round: self.round,
            raw_scores,
            scores,
            doubled,
        })
    }

    /// True once any total has reached `score_limit`.
    #[must_use]
    pub fn should_end_game(&self, score_limit: i32) -> bool {
        self.seats.values().any(|grid| grid.total_score() >= score_limit)
    }

    /// Finish the match. Every seat at the lowest total wins.
    pub fn end_game(&mut self) -> Result<GameResult, EngineError> {
        let trigger = match self.stage {
            Stage::RoundEnd { trigger } => trigger,
            _ => return Err(EngineError::RoundNotOver { actual: self.kind() }),
        };

        let min = self
            .seats
            .values()
            .map(PlayerGrid::total_score)
            .min()
            .unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .seats
            .iter()
            .filter(|(_, grid)| grid.total_score() == min)
            .map(|(player, _)| player)
            .collect();

        let result = if winners.len() == 1 {
            GameResult::Winner(winners[0])
        } else {
            GameResult::Winners(winners)
        };
        self.stage = Stage::GameOver {
            trigger,
            result: result.clone(),
        };
        Ok(result)
    }

    /// Clear the grids and open the next round.
    ///
    /// Round 1 goes through initial selection; later rounds start straight
    /// away with the previous trigger seat. The caller deals afterwards.
    pub fn start_new_round(&mut self) -> Result<(), EngineError> {
        let trigger = match self.stage {
            Stage::RoundEnd { trigger } => trigger,
            _ => return Err(EngineError::RoundNotOver { actual: self.kind() }),
        };

        self.round += 1;
        for grid in self.seats.values_mut() {
            grid.reset_for_round();
        }

        if self.round == 1 {
            self.current = PlayerId::new(0);
            self.stage = Stage::SelectInitialCards;
        } else {
            self.current = trigger;
            self.stage = Stage::Playing {
                phase: Phase::ChoosePile,
            };
        }
        Ok(())
    }

    fn expect_kind(&self, expected: StateKind) -> Result<(), EngineError> {
        let actual = self.kind();
        if actual == expected {
            Ok(())
        } else {
            Err(EngineError::WrongState { expected, actual })
        }
    }
}
