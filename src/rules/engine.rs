//! The command processor.
//!
//! `Engine` owns the deck, the discard pile and the `GameState` (which in turn
//! holds the held card inside its turn phase). Every command is validated in
//! full before anything changes, so a rejected command leaves the engine
//! exactly as it was.
//!
//! The engine is a plain `&mut self` state machine. A transport serving
//! several connections must serialize access (one lock around "apply command,
//! then take snapshots").
//!
//! ## Example
//!
//! ```
//! use skyjo_engine::{Command, Engine, StateKind};
//!
//! let mut engine = Engine::new(7);
//! let ana = engine.register_player("ana").unwrap();
//! let ben = engine.register_player("ben").unwrap();
//! engine.start_game().unwrap();
//!
//! for seat in [ana, ben] {
//!     engine.apply(seat, Command::SelectInitialCard { row: 0, col: 0 }).unwrap();
//!     engine.apply(seat, Command::SelectInitialCard { row: 1, col: 0 }).unwrap();
//! }
//! assert_eq!(engine.state().kind(), StateKind::Playing);
//!
//! let starter = engine.current_player().unwrap();
//! engine.draw_from_deck(starter).unwrap();
//! assert!(engine.held_card().is_some());
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::EngineError;
use super::snapshot::{SeatView, Snapshot, Visibility};
use crate::core::{
    Card, Command, CommandRecord, Deck, DeckSource, Events, GameConfig, GameEvent, GameResult,
    GameRng, GameState, GridPos, Phase, PhaseKind, Pile, PlayerGrid, PlayerId, Stage, StateKind,
    ROWS,
};

/// Where every card of the current round is.
///
/// `accounted()` equals `round_total` at every step within a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLedger {
    pub deck: usize,
    pub discard: usize,
    pub on_grids: usize,
    pub held: usize,
    /// Cleared by column triples this round.
    pub removed: usize,
    /// Size of the deck this round was dealt from.
    pub round_total: usize,
}

impl CardLedger {
    #[must_use]
    pub fn accounted(&self) -> usize {
        self.deck + self.discard + self.on_grids + self.held + self.removed
    }

    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.accounted() == self.round_total
    }
}

/// Authoritative rules engine for one match.
///
/// `D` supplies a deck at game start and each new round; the default shuffles
/// the configured composition with a seeded `GameRng`.
#[derive(Clone, Debug)]
pub struct Engine<D = GameRng> {
    config: GameConfig,
    state: GameState,
    deck: Deck,
    discard: Vector<Card>,
    removed: usize,
    round_total: usize,
    decks: D,
    rng: GameRng,
    history: Vector<CommandRecord>,
}

impl Engine<GameRng> {
    /// Standard rules, shuffled from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(GameConfig::default(), seed)
    }

    /// Custom rules, shuffled from `seed`.
    #[must_use]
    pub fn with_config(config: GameConfig, seed: u64) -> Self {
        let decks = GameRng::new(seed).for_context("deck");
        Self::with_deck_source(config, decks, seed)
    }
}

impl<D: DeckSource> Engine<D> {
    /// Custom rules with decks from `decks`. `seed` drives random reveals.
    pub fn with_deck_source(config: GameConfig, decks: D, seed: u64) -> Self {
        Self {
            config,
            state: GameState::new(),
            deck: Deck::default(),
            discard: Vector::new(),
            removed: 0,
            round_total: 0,
            decks,
            rng: GameRng::new(seed).for_context("reveal"),
            history: Vector::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<&PlayerGrid> {
        self.state.seat(player)
    }

    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.state.current_player()
    }

    #[must_use]
    pub fn held_card(&self) -> Option<Card> {
        self.state.held_card()
    }

    #[must_use]
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// Discard pile, bottom first.
    #[must_use]
    pub fn discard_pile(&self) -> &Vector<Card> {
        &self.discard
    }

    #[must_use]
    pub fn top_discard(&self) -> Option<Card> {
        self.discard.back().copied()
    }

    /// Accepted commands in order.
    #[must_use]
    pub fn history(&self) -> &Vector<CommandRecord> {
        &self.history
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.state.result()
    }

    #[must_use]
    pub fn card_ledger(&self) -> CardLedger {
        CardLedger {
            deck: self.deck.remaining(),
            discard: self.discard.len(),
            on_grids: self.state.seats().values().map(PlayerGrid::present_count).sum(),
            held: usize::from(self.held_card().is_some()),
            removed: self.removed,
            round_total: self.round_total,
        }
    }

    // =========================================================================
    // Table setup
    // =========================================================================

    /// Seat a new player. Only possible before the game starts.
    pub fn register_player(&mut self, name: impl Into<String>) -> Result<PlayerId, EngineError> {
        if self.state.kind() != StateKind::Waiting {
            return Err(EngineError::GameAlreadyStarted);
        }
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyName);
        }
        if self.state.player_count() >= self.config.max_players {
            return Err(EngineError::TableFull {
                max: self.config.max_players,
            });
        }
        if self.state.seats().values().any(|grid| grid.name() == name) {
            return Err(EngineError::DuplicateName {
                name: name.to_string(),
            });
        }

        let player = self.state.add_player(PlayerGrid::new(name));
        info!(%player, name, "player seated");
        Ok(player)
    }

    /// Shuffle, deal every seat, seed the discard pile and begin setup.
    pub fn start_game(&mut self) -> Result<Events, EngineError> {
        if self.state.kind() != StateKind::Waiting {
            return Err(EngineError::GameAlreadyStarted);
        }
        if self.state.player_count() < self.config.min_players {
            return Err(EngineError::NotEnoughPlayers {
                min: self.config.min_players,
                have: self.state.player_count(),
            });
        }

        let deck = self.next_deck(1)?;
        self.state.start_game(self.config.min_players)?;
        let events = self.deal(deck)?;
        info!(players = self.state.player_count(), "game started");
        Ok(events)
    }

    /// Deal the next round. Only valid once the previous round is scored.
    pub fn start_new_round(&mut self) -> Result<Events, EngineError> {
        let outcome = self.new_round();
        self.finish_command(None, Command::StartNewRound, outcome)
    }

    // =========================================================================
    // Player commands
    // =========================================================================

    /// Apply a decoded command for `player`.
    pub fn apply(&mut self, player: PlayerId, command: Command) -> Result<Events, EngineError> {
        let outcome = match command {
            Command::SelectInitialCard { row, col } => self.select_initial(player, row, col),
            Command::DrawFromDeck => self.take_from_deck(player),
            Command::DrawFromDiscard => self.take_from_discard(player),
            Command::KeepCard => self.keep(player),
            Command::DiscardCard => self.discard_held(player),
            Command::SwapCard { row, col } => self.swap(player, row, col),
            Command::FlipCard { row, col } => self.flip(player, row, col),
            Command::StartNewRound => self.expect_seated(player).and_then(|()| self.new_round()),
        };
        self.finish_command(Some(player), command, outcome)
    }

    pub fn select_initial_card(
        &mut self,
        player: PlayerId,
        row: usize,
        col: usize,
    ) -> Result<Events, EngineError> {
        self.apply(player, Command::SelectInitialCard { row, col })
    }

    pub fn draw_from_deck(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.apply(player, Command::DrawFromDeck)
    }

    pub fn draw_from_discard(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.apply(player, Command::DrawFromDiscard)
    }

    pub fn keep_drawn_card(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.apply(player, Command::KeepCard)
    }

    pub fn discard_drawn_card(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.apply(player, Command::DiscardCard)
    }

    pub fn swap_card(&mut self, player: PlayerId, row: usize, col: usize) -> Result<Events, EngineError> {
        self.apply(player, Command::SwapCard { row, col })
    }

    pub fn flip_card(&mut self, player: PlayerId, row: usize, col: usize) -> Result<Events, EngineError> {
        self.apply(player, Command::FlipCard { row, col })
    }

    /// Flip random face-down cards for the current setup seat until its quota
    /// is met. For transports that time out a slow player during setup.
    pub fn auto_select_initial_cards(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.expect_setup_turn(player)?;

        let mut events = Events::new();
        let quota = self.config.initial_reveals;
        while let Some(grid) = self.state.seat_mut(player) {
            if grid.revealed_count() >= quota {
                break;
            }
            let Some(pos) = grid.reveal_random(&mut self.rng) else {
                break;
            };
            let Some(card) = grid.cell(pos).card() else {
                break;
            };
            events.push(GameEvent::CardRevealed { player, pos, card });
            self.record(
                Some(player),
                Command::SelectInitialCard {
                    row: pos.row,
                    col: pos.col,
                },
            );
        }
        self.finish_setup_turn(&mut events)?;
        debug!(%player, reveals = events.len(), "initial cards selected automatically");
        Ok(events)
    }

    /// Every command `player` may issue right now.
    #[must_use]
    pub fn legal_commands(&self, player: PlayerId) -> Vec<Command> {
        let Some(grid) = self.state.seat(player) else {
            return Vec::new();
        };
        let is_current = self.state.current_player() == Some(player);

        match self.state.stage() {
            Stage::Waiting | Stage::GameOver { .. } => Vec::new(),
            Stage::RoundEnd { .. } => vec![Command::StartNewRound],
            Stage::SelectInitialCards if is_current => grid
                .face_down_positions()
                .into_iter()
                .map(|pos| Command::SelectInitialCard {
                    row: pos.row,
                    col: pos.col,
                })
                .collect(),
            Stage::SelectInitialCards => Vec::new(),
            Stage::Playing { phase } | Stage::EndRound { phase, .. } if is_current => match phase {
                Phase::ChoosePile => {
                    let mut commands = Vec::with_capacity(2);
                    if !self.deck.is_empty() {
                        commands.push(Command::DrawFromDeck);
                    }
                    if !self.discard.is_empty() {
                        commands.push(Command::DrawFromDiscard);
                    }
                    commands
                }
                Phase::DecideCard { .. } => vec![Command::KeepCard, Command::DiscardCard],
                Phase::SwapCard { .. } => grid
                    .present_positions()
                    .into_iter()
                    .map(|pos| Command::SwapCard {
                        row: pos.row,
                        col: pos.col,
                    })
                    .collect(),
                Phase::FlipCard => grid
                    .face_down_positions()
                    .into_iter()
                    .map(|pos| Command::FlipCard {
                        row: pos.row,
                        col: pos.col,
                    })
                    .collect(),
            },
            Stage::Playing { .. } | Stage::EndRound { .. } => Vec::new(),
        }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// The table as `viewer` may see it: face-down values are masked.
    #[must_use]
    pub fn snapshot(&self, viewer: PlayerId) -> Snapshot {
        self.capture(Some(viewer), Visibility::Redacted)
    }

    /// The table with every value exposed.
    #[must_use]
    pub fn full_snapshot(&self) -> Snapshot {
        self.capture(None, Visibility::Full)
    }

    fn capture(&self, viewer: Option<PlayerId>, visibility: Visibility) -> Snapshot {
        Snapshot {
            viewer,
            seats: self
                .state
                .seats()
                .iter()
                .map(|(player, grid)| SeatView::of(player, grid, visibility))
                .collect(),
            state: self.state.kind(),
            phase: self.state.phase().map(Phase::kind),
            current_player: self.state.current_player(),
            round: self.state.round(),
            trigger_player: self.state.trigger_player(),
            deck_remaining: self.deck.remaining(),
            discard_size: self.discard.len(),
            top_discard: self.top_discard(),
            held_card: self.held_card(),
            winners: self.result().map(GameResult::winners).unwrap_or_default(),
            message: self.status_message(),
        }
    }

    /// One-line description of what the table is waiting for.
    #[must_use]
    pub fn status_message(&self) -> String {
        let current = self.state.current_player().map(|p| self.name_of(p)).unwrap_or("");
        match self.state.stage() {
            Stage::Waiting => format!("Waiting for players ({} seated)", self.state.player_count()),
            Stage::SelectInitialCards => {
                let revealed = self
                    .state
                    .current_player()
                    .and_then(|p| self.state.seat(p))
                    .map_or(0, PlayerGrid::revealed_count);
                let left = self.config.initial_reveals.saturating_sub(revealed);
                format!("{current}: select {left} card(s) to flip")
            }
            Stage::Playing { phase } => Self::phase_message(current, *phase),
            Stage::EndRound { phase, trigger, .. } => format!(
                "{} revealed all cards. Last turn: {}",
                self.name_of(*trigger),
                Self::phase_message(current, *phase)
            ),
            Stage::RoundEnd { .. } => {
                let mut parts: Vec<String> = self
                    .state
                    .seats()
                    .values()
                    .map(|grid| format!("{}: {}", grid.name(), grid.round_score()))
                    .collect();
                parts.push("waiting for the next round".to_string());
                parts.join(" | ")
            }
            Stage::GameOver { result, .. } => {
                let winners = result.winners();
                let total = winners
                    .first()
                    .and_then(|&p| self.state.seat(p))
                    .map_or(0, PlayerGrid::total_score);
                match result {
                    GameResult::Winner(p) => {
                        format!("Game over! {} wins with {} points!", self.name_of(*p), total)
                    }
                    GameResult::Winners(ps) => {
                        let names: Vec<&str> = ps.iter().map(|&p| self.name_of(p)).collect();
                        format!("Game over! Tie between {} with {} points!", names.join(", "), total)
                    }
                }
            }
        }
    }

    fn phase_message(name: &str, phase: Phase) -> String {
        match phase {
            Phase::ChoosePile => format!("{name}'s turn: draw from the deck or take the discard"),
            Phase::DecideCard { held } => {
                format!("{name}: keep the {held} or discard it and flip a card")
            }
            Phase::SwapCard { held } => format!("{name}: choose a card to swap for the {held}"),
            Phase::FlipCard => format!("{name}: flip one of your face-down cards"),
        }
    }

    fn name_of(&self, player: PlayerId) -> &str {
        self.state.seat(player).map_or("", PlayerGrid::name)
    }

    // =========================================================================
    // Command implementations
    // =========================================================================

    fn select_initial(&mut self, player: PlayerId, row: usize, col: usize) -> Result<Events, EngineError> {
        self.expect_setup_turn(player)?;
        let pos = GridPos::new(row, col)?;
        let grid = self.grid_mut(player)?;
        grid.check_reveal(pos)?;

        let card = grid.reveal(pos)?;
        let mut events = Events::new();
        events.push(GameEvent::CardRevealed { player, pos, card });
        self.finish_setup_turn(&mut events)?;
        Ok(events)
    }

    /// Hand setup to the next seat once the current one has its reveals.
    fn finish_setup_turn(&mut self, events: &mut Events) -> Result<(), EngineError> {
        let Some(current) = self.state.current_player() else {
            return Ok(());
        };
        let revealed = self.state.seat(current).map_or(0, PlayerGrid::revealed_count);
        if revealed < self.config.initial_reveals {
            return Ok(());
        }

        if current.index() + 1 == self.state.player_count() {
            let starter = self.state.finish_initial_selection()?;
            events.push(GameEvent::StartingPlayerChosen { player: starter });
            info!(%starter, "initial selection finished");
        } else {
            self.state.next_player();
        }
        Ok(())
    }

    fn take_from_deck(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.expect_turn(player, PhaseKind::ChoosePile)?;
        let card = self.deck.draw()?;
        self.state.set_phase(Phase::DecideCard { held: card })?;

        let mut events = Events::new();
        events.push(GameEvent::CardDrawn {
            player,
            pile: Pile::Deck,
            card,
        });
        Ok(events)
    }

    fn take_from_discard(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        self.expect_turn(player, PhaseKind::ChoosePile)?;
        let card = self.discard.pop_back().ok_or(EngineError::DiscardEmpty)?;
        self.state.set_phase(Phase::SwapCard { held: card })?;

        let mut events = Events::new();
        events.push(GameEvent::CardDrawn {
            player,
            pile: Pile::Discard,
            card,
        });
        Ok(events)
    }

    fn keep(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        let held = self.expect_held(player, PhaseKind::DecideCard)?;
        self.state.set_phase(Phase::SwapCard { held })?;

        let mut events = Events::new();
        events.push(GameEvent::CardKept { player, card: held });
        Ok(events)
    }

    fn discard_held(&mut self, player: PlayerId) -> Result<Events, EngineError> {
        let held = self.expect_held(player, PhaseKind::DecideCard)?;
        self.state.set_phase(Phase::FlipCard)?;
        self.discard.push_back(held);

        let mut events = Events::new();
        events.push(GameEvent::CardDiscarded { player, card: held });
        Ok(events)
    }

    fn swap(&mut self, player: PlayerId, row: usize, col: usize) -> Result<Events, EngineError> {
        let held = self.expect_held(player, PhaseKind::SwapCard)?;
        let pos = GridPos::new(row, col)?;
        let grid = self.grid_mut(player)?;
        grid.check_replace(pos)?;

        let removed = grid.replace(pos, held)?;
        self.discard.push_back(removed);

        let mut events = Events::new();
        events.push(GameEvent::CardSwapped {
            player,
            pos,
            placed: held,
            removed,
        });
        self.finish_move(player, &mut events)?;
        Ok(events)
    }

    fn flip(&mut self, player: PlayerId, row: usize, col: usize) -> Result<Events, EngineError> {
        self.expect_turn(player, PhaseKind::FlipCard)?;
        let pos = GridPos::new(row, col)?;
        let grid = self.grid_mut(player)?;
        grid.check_reveal(pos)?;

        let card = grid.reveal(pos)?;
        let mut events = Events::new();
        events.push(GameEvent::CardRevealed { player, pos, card });
        self.finish_move(player, &mut events)?;
        Ok(events)
    }

    /// Clear triples, then end the turn or start/continue the round end.
    fn finish_move(&mut self, player: PlayerId, events: &mut Events) -> Result<(), EngineError> {
        let grid = self.grid_mut(player)?;
        let before = *grid.rows();
        let cleared = grid.clear_column_triples();
        let fully_revealed = grid.all_revealed();

        for &col in &cleared {
            if let Some(card) = before[0][col].card() {
                events.push(GameEvent::ColumnCleared { player, col, card });
            }
        }
        self.removed += cleared.len() * ROWS;

        match self.state.kind() {
            StateKind::Playing if fully_revealed => {
                self.state.trigger_round_end()?;
                events.push(GameEvent::RoundEndTriggered { player });
                info!(%player, round = self.state.round(), "round end triggered");
            }
            StateKind::Playing => {
                self.state.next_player();
                self.state.set_phase(Phase::ChoosePile)?;
                events.push(GameEvent::TurnPassed { player });
            }
            StateKind::EndRound => {
                self.state.complete_final_turn();
                events.push(GameEvent::FinalTurnCompleted { player });
                if self.state.should_end_round() {
                    self.complete_round(events)?;
                } else {
                    self.state.next_player();
                    self.state.set_phase(Phase::ChoosePile)?;
                }
            }
            other => debug!(state = %other, "move finished outside of play"),
        }
        Ok(())
    }

    fn complete_round(&mut self, events: &mut Events) -> Result<(), EngineError> {
        let summary = self.state.end_round()?;
        info!(
            round = summary.round,
            scores = ?summary.scores,
            doubled = ?summary.doubled,
            "round scored"
        );
        events.push(GameEvent::RoundScored {
            round: summary.round,
            scores: summary.scores,
            doubled: summary.doubled,
        });

        if self.state.should_end_game(self.config.score_limit) {
            let result = self.state.end_game()?;
            info!(?result, "game over");
            events.push(GameEvent::GameOver { result });
        }
        Ok(())
    }

    fn new_round(&mut self) -> Result<Events, EngineError> {
        if self.state.kind() != StateKind::RoundEnd {
            return Err(EngineError::RoundNotOver {
                actual: self.state.kind(),
            });
        }
        let deck = self.next_deck(self.state.round() + 1)?;
        self.state.start_new_round()?;
        let events = self.deal(deck)?;
        info!(round = self.state.round(), "new round dealt");
        Ok(events)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Fetch a deck big enough for a full deal, before anything is mutated.
    ///
    /// A short deck goes back to the source, so a rejected start leaves the
    /// source where it was.
    fn next_deck(&mut self, round: u32) -> Result<Deck, EngineError> {
        let deck = self.decks.next_deck(&self.config.composition, round);
        let needed = self.config.cards_needed(self.state.player_count());
        if deck.remaining() < needed {
            debug!(round, have = deck.remaining(), needed, "deck too small to deal");
            self.decks.return_deck(deck, round);
            return Err(EngineError::DeckEmpty);
        }
        Ok(deck)
    }

    /// Deal 12 face-down cards per seat in seat order and seed the discard.
    fn deal(&mut self, mut deck: Deck) -> Result<Events, EngineError> {
        self.round_total = deck.remaining();
        self.removed = 0;
        self.discard = Vector::new();

        for grid in self.state.seats_mut().values_mut() {
            for pos in GridPos::all() {
                grid.place_initial(pos, deck.draw()?);
            }
        }
        let discard_top = deck.draw()?;
        self.discard.push_back(discard_top);
        self.deck = deck;

        let mut events = Events::new();
        events.push(GameEvent::RoundDealt {
            round: self.state.round(),
            discard_top,
        });
        Ok(events)
    }

    fn expect_seated(&self, player: PlayerId) -> Result<(), EngineError> {
        if self.state.seats().contains(player) {
            Ok(())
        } else {
            Err(EngineError::UnknownPlayer { player })
        }
    }

    fn expect_current(&self, player: PlayerId) -> Result<(), EngineError> {
        self.expect_seated(player)?;
        match self.state.current_player() {
            Some(current) if current == player => Ok(()),
            Some(current) => Err(EngineError::NotYourTurn {
                expected: current,
                actual: player,
            }),
            None => Err(EngineError::WrongState {
                expected: StateKind::Playing,
                actual: self.state.kind(),
            }),
        }
    }

    fn expect_setup_turn(&self, player: PlayerId) -> Result<(), EngineError> {
        self.expect_seated(player)?;
        let actual = self.state.kind();
        if actual != StateKind::SelectInitialCards {
            return Err(EngineError::WrongState {
                expected: StateKind::SelectInitialCards,
                actual,
            });
        }
        self.expect_current(player)
    }

    /// Check that `player` is to move and the turn is in `expected`.
    fn expect_turn(&self, player: PlayerId, expected: PhaseKind) -> Result<Phase, EngineError> {
        self.expect_seated(player)?;
        let phase = self.state.phase().ok_or(EngineError::WrongState {
            expected: StateKind::Playing,
            actual: self.state.kind(),
        })?;
        self.expect_current(player)?;
        if phase.kind() != expected {
            return Err(EngineError::WrongPhase {
                expected,
                actual: phase.kind(),
            });
        }
        Ok(phase)
    }

    fn expect_held(&self, player: PlayerId, expected: PhaseKind) -> Result<Card, EngineError> {
        let phase = self.expect_turn(player, expected)?;
        phase.held().ok_or(EngineError::WrongPhase {
            expected,
            actual: phase.kind(),
        })
    }

    fn grid_mut(&mut self, player: PlayerId) -> Result<&mut PlayerGrid, EngineError> {
        self.state
            .seat_mut(player)
            .ok_or(EngineError::UnknownPlayer { player })
    }

    fn record(&mut self, player: Option<PlayerId>, command: Command) {
        let sequence = self.history.len() as u32;
        self.history
            .push_back(CommandRecord::new(player, command, self.state.round(), sequence));
    }

    fn finish_command(
        &mut self,
        player: Option<PlayerId>,
        command: Command,
        outcome: Result<Events, EngineError>,
    ) -> Result<Events, EngineError> {
        match &outcome {
            Ok(events) => {
                debug!(?player, command = command.name(), events = events.len(), "command applied");
                self.record(player, command);
            }
            Err(err) => {
                debug!(?player, command = command.name(), error = %err, "command rejected");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ErrorKind;

    fn two_player_engine(seed: u64) -> (Engine, PlayerId, PlayerId) {
        let mut engine = Engine::new(seed);
        let a = engine.register_player("ana").unwrap();
        let b = engine.register_player("ben").unwrap();
        (engine, a, b)
    }

    #[test]
    fn test_registration_rules() {
        let mut engine = Engine::with_config(GameConfig::new().with_max_players(2), 1);

        assert_eq!(engine.register_player("  "), Err(EngineError::EmptyName));
        engine.register_player("ana").unwrap();
        assert_eq!(
            engine.register_player("ana"),
            Err(EngineError::DuplicateName { name: "ana".into() })
        );
        engine.register_player("ben").unwrap();
        assert_eq!(
            engine.register_player("cy").unwrap_err().kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn test_start_needs_two_players() {
        let mut engine = Engine::new(1);
        engine.register_player("ana").unwrap();

        let err = engine.start_game().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(engine.state().kind(), StateKind::Waiting);
        assert_eq!(engine.deck_remaining(), 0);
    }

    #[test]
    fn test_start_deals_and_seeds_discard() {
        let (mut engine, a, b) = two_player_engine(3);
        let events = engine.start_game().unwrap();

        assert_eq!(engine.state().kind(), StateKind::SelectInitialCards);
        assert_eq!(engine.current_player(), Some(a));
        assert_eq!(engine.deck_remaining(), 150 - 24 - 1);
        assert_eq!(engine.discard_pile().len(), 1);
        assert!(matches!(events[0], GameEvent::RoundDealt { round: 1, .. }));
        for p in [a, b] {
            let grid = engine.seat(p).unwrap();
            assert_eq!(grid.present_count(), 12);
            assert_eq!(grid.revealed_count(), 0);
        }
        assert!(engine.card_ledger().is_balanced());
    }

    #[test]
    fn test_register_after_start_rejected() {
        let (mut engine, _, _) = two_player_engine(3);
        engine.start_game().unwrap();

        assert_eq!(engine.register_player("late"), Err(EngineError::GameAlreadyStarted));
        assert_eq!(engine.start_game().unwrap_err(), EngineError::GameAlreadyStarted);
    }

    #[test]
    fn test_late_registration_reports_started_before_name() {
        let (mut engine, _, _) = two_player_engine(3);
        engine.start_game().unwrap();

        for name in ["", "   ", "ana"] {
            let err = engine.register_player(name).unwrap_err();
            assert_eq!(err, EngineError::GameAlreadyStarted);
            assert_eq!(err.kind(), ErrorKind::InvalidTurn);
        }
        assert_eq!(engine.state().player_count(), 2);
    }

    #[test]
    fn test_legal_commands_follow_turn() {
        let (mut engine, a, b) = two_player_engine(5);
        engine.start_game().unwrap();

        assert_eq!(engine.legal_commands(a).len(), 12);
        assert!(engine.legal_commands(b).is_empty());
        assert!(engine.legal_commands(PlayerId::new(9)).is_empty());
    }

    #[test]
    fn test_auto_select_meets_quota_and_passes_setup() {
        let (mut engine, a, b) = two_player_engine(11);
        engine.start_game().unwrap();

        let events = engine.auto_select_initial_cards(a).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(engine.seat(a).unwrap().revealed_count(), 2);
        assert_eq!(engine.current_player(), Some(b));
        assert_eq!(engine.history().len(), 2);

        engine.auto_select_initial_cards(b).unwrap();
        assert_eq!(engine.state().kind(), StateKind::Playing);
    }

    #[test]
    fn test_auto_select_rejects_wrong_seat() {
        let (mut engine, _, b) = two_player_engine(11);
        engine.start_game().unwrap();

        let err = engine.auto_select_initial_cards(b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTurn);
        assert_eq!(engine.seat(b).unwrap().revealed_count(), 0);
    }

    #[test]
    fn test_snapshot_masks_face_down_values() {
        let (mut engine, a, _) = two_player_engine(2);
        engine.start_game().unwrap();
        engine.select_initial_card(a, 0, 0).unwrap();

        let snap = engine.snapshot(a);
        let seat = snap.seat(a).unwrap();
        assert!(seat.cells[0][0].is_revealed());
        assert_eq!(seat.cells[1][1].value(), None);
        assert_eq!(snap.viewer, Some(a));

        let full = engine.full_snapshot();
        assert!(full.seat(a).unwrap().cells[1][1].value().is_some());
    }

    #[test]
    fn test_status_message_names_current_seat() {
        let (mut engine, _, _) = two_player_engine(2);
        assert_eq!(engine.status_message(), "Waiting for players (2 seated)");

        engine.start_game().unwrap();
        assert_eq!(engine.status_message(), "ana: select 2 card(s) to flip");
    }
}
