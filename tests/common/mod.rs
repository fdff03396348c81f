//! Shared helpers for the integration tests.

#![allow(dead_code)]

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use skyjo_engine::{
    Card, Cell, Command, Deck, DeckComposition, DeckSource, Engine, GameConfig, GridPos, PlayerId,
    StateKind, CELLS,
};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install a test subscriber once. Level comes from `TEST_LOG`, then
/// `RUST_LOG`, then defaults to `warn`.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

pub fn card(value: i8) -> Card {
    Card::new(value).unwrap()
}

/// Hands out prepared decks in order, top card first.
#[derive(Clone, Debug, Default)]
pub struct StackedDecks {
    decks: Vec<Deck>,
}

impl StackedDecks {
    pub fn new(decks: Vec<Vec<Card>>) -> Self {
        Self {
            decks: decks.into_iter().rev().map(Deck::stacked).collect(),
        }
    }
}

impl DeckSource for StackedDecks {
    fn next_deck(&mut self, _composition: &DeckComposition, _round: u32) -> Deck {
        self.decks.pop().unwrap_or_default()
    }

    fn return_deck(&mut self, deck: Deck, _round: u32) {
        self.decks.push(deck);
    }
}

/// Build one stacked deck: each grid dealt row-major in seat order, then the
/// discard seed, then the draw pile top first.
pub fn stack(grids: &[[i8; CELLS]], discard: i8, draws: &[i8]) -> Vec<Card> {
    grids
        .iter()
        .flatten()
        .copied()
        .chain(std::iter::once(discard))
        .chain(draws.iter().copied())
        .map(card)
        .collect()
}

/// Seat `names`, start the game on a single stacked deck.
pub fn stacked_engine(names: &[&str], deck: Vec<Card>) -> (Engine<StackedDecks>, Vec<PlayerId>) {
    init_logging();
    let mut engine = Engine::with_deck_source(GameConfig::default(), StackedDecks::new(vec![deck]), 0);
    let seats = names
        .iter()
        .map(|name| engine.register_player(*name).unwrap())
        .collect();
    engine.start_game().unwrap();
    (engine, seats)
}

/// Seat `count` players with a seeded shuffle and start.
pub fn seeded_engine(count: usize, seed: u64) -> (Engine, Vec<PlayerId>) {
    init_logging();
    let mut engine = Engine::new(seed);
    let seats = (0..count)
        .map(|i| engine.register_player(format!("player{}", i)).unwrap())
        .collect();
    engine.start_game().unwrap();
    (engine, seats)
}

/// Every seat reveals its first `initial_reveals` face-down cards.
pub fn finish_setup<D: DeckSource>(engine: &mut Engine<D>) {
    while engine.state().kind() == StateKind::SelectInitialCards {
        let seat = engine.current_player().unwrap();
        let first = engine.legal_commands(seat)[0];
        engine.apply(seat, first).unwrap();
    }
}

/// Draw from the deck, discard it and flip `(row, col)`.
pub fn discard_and_flip<D: DeckSource>(engine: &mut Engine<D>, seat: PlayerId, row: usize, col: usize) {
    engine.draw_from_deck(seat).unwrap();
    engine.discard_drawn_card(seat).unwrap();
    engine.flip_card(seat, row, col).unwrap();
}

/// Take the discard and swap it into `(row, col)`.
pub fn take_discard_and_swap<D: DeckSource>(engine: &mut Engine<D>, seat: PlayerId, row: usize, col: usize) {
    engine.draw_from_discard(seat).unwrap();
    engine.swap_card(seat, row, col).unwrap();
}

/// Pick a command with a simple greedy heuristic.
///
/// Keeps low cards and swaps over the highest face-up card above the held
/// one, otherwise onto the first face-down card. Every turn either reveals a
/// card or lowers the face-up total, so a match always ends.
pub fn heuristic_choice<D: DeckSource>(engine: &Engine<D>, seat: PlayerId) -> Command {
    let legal = engine.legal_commands(seat);
    assert!(!legal.is_empty(), "{} has no legal command", seat);
    let grid = engine.seat(seat).unwrap();

    match legal[0] {
        Command::DrawFromDeck | Command::DrawFromDiscard => {
            let cheap_discard = engine.top_discard().map_or(false, |card| card.value() <= 3);
            if cheap_discard && legal.contains(&Command::DrawFromDiscard) {
                Command::DrawFromDiscard
            } else {
                legal[0]
            }
        }
        Command::KeepCard => {
            if engine.held_card().map_or(false, |card| card.value() <= 4) {
                Command::KeepCard
            } else {
                Command::DiscardCard
            }
        }
        Command::SwapCard { .. } => {
            let held = engine.held_card().map_or(0, |card| card.value());
            let worst_face_up = GridPos::all()
                .filter_map(|pos| match grid.cell(pos) {
                    Cell::FaceUp(card) if card.value() > held => Some((card.value(), pos)),
                    _ => None,
                })
                .max_by_key(|&(value, _)| value)
                .map(|(_, pos)| pos);
            let target = worst_face_up
                .or_else(|| grid.face_down_positions().first().copied())
                .or_else(|| grid.present_positions().first().copied())
                .unwrap();
            Command::SwapCard { row: target.row, col: target.col }
        }
        other => other,
    }
}

/// Assert that every card of the round is somewhere.
pub fn assert_conserved<D: DeckSource>(engine: &Engine<D>) {
    let ledger = engine.card_ledger();
    assert!(ledger.is_balanced(), "cards went missing: {:?}", ledger);
}
