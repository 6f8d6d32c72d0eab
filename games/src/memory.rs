use crate::engine::{GameEngine, Intent, Outbox};
use log::debug;
use rand::seq::SliceRandom;
use shared::{Card, GameKind, Message, Role, MEMORY_DECK_SIZE};

const CARD_FACES: [(&str, &str); 8] = [
    ("fa-heart", "text-red-500"),
    ("fa-star", "text-yellow-400"),
    ("fa-leaf", "text-green-500"),
    ("fa-moon", "text-purple-400"),
    ("fa-bomb", "text-gray-500"),
    ("fa-ghost", "text-indigo-400"),
    ("fa-cat", "text-pink-400"),
    ("fa-fish", "text-blue-400"),
];

/// Two-player memory. Player 0 (the host) deals: the shuffled deck is
/// built exactly once and shipped whole, so no independent randomness
/// exists on the other side. The peer that flips the second card of a
/// pair evaluates the match locally and broadcasts the authoritative
/// result; the remote applies it without re-deriving.
pub struct Memory {
    deck: Vec<Card>,
    scores: [u32; 2],
    flipped: Vec<usize>,
    current_player: usize,
    local_player: usize,
    outbox: Outbox,
    stopped: bool,
}

impl Memory {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        Self {
            deck: Vec::new(),
            scores: [0, 0],
            flipped: Vec::new(),
            current_player: 0,
            local_player: role.player_index(),
            outbox,
            stopped: false,
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn is_finished(&self) -> bool {
        !self.deck.is_empty() && self.deck.iter().all(|card| card.matched)
    }

    fn deal_deck() -> Vec<Card> {
        let mut deck: Vec<Card> = CARD_FACES
            .iter()
            .flat_map(|&(icon, color)| {
                [Card::face_down(icon, color), Card::face_down(icon, color)]
            })
            .collect();
        deck.shuffle(&mut rand::thread_rng());
        debug_assert_eq!(deck.len(), MEMORY_DECK_SIZE);
        deck
    }

    pub fn flip_card(&mut self, index: usize) {
        if self.stopped || self.current_player != self.local_player {
            return;
        }
        if self.flipped.len() == 2 {
            return;
        }
        let card = match self.deck.get_mut(index) {
            Some(card) if !card.revealed && !card.matched => card,
            _ => return,
        };

        card.revealed = true;
        self.flipped.push(index);
        self.outbox.send(Message::MemoryFlip { index });

        if self.flipped.len() == 2 {
            self.resolve_pair();
        }
    }

    /// Only runs on the peer that flipped the second card; the result it
    /// broadcasts is authoritative for both sides.
    fn resolve_pair(&mut self) {
        let (i1, i2) = (self.flipped[0], self.flipped[1]);
        let is_match = self.deck[i1].same_face(&self.deck[i2]);

        if is_match {
            self.deck[i1].matched = true;
            self.deck[i2].matched = true;
            self.scores[self.current_player] += 1;
            self.outbox.send(Message::MemoryMatch {
                indices: [i1, i2],
                scoring_player: self.current_player,
            });
        } else {
            self.deck[i1].revealed = false;
            self.deck[i2].revealed = false;
            self.current_player = 1 - self.current_player;
            self.outbox.send(Message::MemoryMismatch {
                indices: [i1, i2],
                next_player: self.current_player,
            });
        }

        self.flipped.clear();
    }

    fn apply_remote_flip(&mut self, index: usize) {
        if self.flipped.len() == 2 {
            return;
        }
        if let Some(card) = self.deck.get_mut(index) {
            if !card.revealed && !card.matched {
                card.revealed = true;
                // The flipping peer resolves the pair; we only display it
                // until the match/mismatch verdict arrives.
                self.flipped.push(index);
            }
        }
    }

    fn apply_match(&mut self, indices: [usize; 2], scoring_player: usize) {
        for index in indices {
            if let Some(card) = self.deck.get_mut(index) {
                card.matched = true;
                card.revealed = true;
            }
        }
        if let Some(score) = self.scores.get_mut(scoring_player) {
            *score += 1;
        }
        self.flipped.clear();
    }

    fn apply_mismatch(&mut self, indices: [usize; 2], next_player: usize) {
        for index in indices {
            if let Some(card) = self.deck.get_mut(index) {
                card.revealed = false;
            }
        }
        if next_player < 2 {
            self.current_player = next_player;
        }
        self.flipped.clear();
    }
}

impl GameEngine for Memory {
    fn kind(&self) -> GameKind {
        GameKind::Memory
    }

    fn initialize(&mut self) {
        if self.stopped {
            return;
        }
        // Dealing waits for the start ack so the other side exists to
        // receive the deck.
        if self.local_player == 0 {
            self.deck = Self::deal_deck();
            self.outbox.send(Message::MemoryInit {
                deck: self.deck.clone(),
            });
        }
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if let Intent::Cell(index) = intent {
            self.flip_card(index);
        }
    }

    fn handle_message(&mut self, message: &Message, _now_ms: u64) {
        if self.stopped {
            return;
        }
        match message {
            Message::MemoryInit { deck } => {
                self.deck = deck.clone();
            }
            Message::MemoryFlip { index } => self.apply_remote_flip(*index),
            Message::MemoryMatch {
                indices,
                scoring_player,
            } => self.apply_match(*indices, *scoring_player),
            Message::MemoryMismatch {
                indices,
                next_player,
            } => self.apply_mismatch(*indices, *next_player),
            _ => debug!("memory ignoring {:?}", message),
        }
    }

    fn cleanup(&mut self) {
        self.deck.clear();
        self.scores = [0, 0];
        self.flipped.clear();
        self.current_player = 0;
        self.stopped = true;
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        for (i, card) in self.deck.iter().enumerate() {
            if card.matched {
                out.push_str("==");
            } else if card.revealed {
                out.push_str(card.icon.get(3..5).unwrap_or("??"));
            } else {
                out.push_str("??");
            }
            out.push(if i % 4 == 3 { '\n' } else { ' ' });
        }
        if self.is_finished() {
            let text = if self.scores[0] > self.scores[1] {
                "Player 1 wins!"
            } else if self.scores[1] > self.scores[0] {
                "Player 2 wins!"
            } else {
                "It's a tie!"
            };
            out.push_str(&format!(
                "Game over! {} ({} - {})",
                text, self.scores[0], self.scores[1]
            ));
        } else {
            out.push_str(&format!(
                "Player 1: {}  Player 2: {}  Current turn: Player {}",
                self.scores[0],
                self.scores[1],
                self.current_player + 1
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn engine(role: Role) -> (Memory, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Memory::new(role, Outbox::new(tx)), rx)
    }

    /// Deck where indices 3 and 9 share a face, 0 and 1 do not.
    fn crafted_deck() -> Vec<Card> {
        let mut deck: Vec<Card> = (0..MEMORY_DECK_SIZE)
            .map(|i| Card::face_down(&format!("fa-{}", i), "text-gray-500"))
            .collect();
        deck[3] = Card::face_down("fa-heart", "text-red-500");
        deck[9] = Card::face_down("fa-heart", "text-red-500");
        deck
    }

    #[test]
    fn test_dealer_builds_and_ships_full_deck() {
        let (mut game, mut rx) = engine(Role::Host);
        game.initialize();

        assert_eq!(game.deck().len(), MEMORY_DECK_SIZE);
        match rx.try_recv().unwrap() {
            Message::MemoryInit { deck } => {
                assert_eq!(deck.len(), MEMORY_DECK_SIZE);
                assert_eq!(deck, game.deck().to_vec());
                // Every face appears exactly twice.
                for (icon, color) in CARD_FACES {
                    let count = deck
                        .iter()
                        .filter(|card| card.icon == icon && card.color == color)
                        .count();
                    assert_eq!(count, 2);
                }
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_guest_does_not_deal() {
        let (mut game, mut rx) = engine(Role::Guest);
        game.initialize();
        assert!(game.deck().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_guest_adopts_shipped_deck() {
        let (mut game, _rx) = engine(Role::Guest);
        let deck = crafted_deck();
        game.handle_message(&Message::MemoryInit { deck: deck.clone() }, 0);
        assert_eq!(game.deck().to_vec(), deck);
    }

    #[test]
    fn test_match_scores_once_and_keeps_turn() {
        let (mut game, mut rx) = engine(Role::Host);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );

        game.flip_card(3);
        match rx.try_recv().unwrap() {
            Message::MemoryFlip { index } => assert_eq!(index, 3),
            other => panic!("unexpected message {:?}", other),
        }

        game.flip_card(9);
        match rx.try_recv().unwrap() {
            Message::MemoryFlip { index } => assert_eq!(index, 9),
            other => panic!("unexpected message {:?}", other),
        }
        match rx.try_recv().unwrap() {
            Message::MemoryMatch {
                indices,
                scoring_player,
            } => {
                assert_eq!(indices, [3, 9]);
                assert_eq!(scoring_player, 0);
            }
            other => panic!("unexpected message {:?}", other),
        }

        assert_eq!(game.scores(), [1, 0]);
        assert!(game.deck()[3].matched);
        assert!(game.deck()[9].matched);
        // A match keeps the turn.
        assert_eq!(game.current_player(), 0);
    }

    #[test]
    fn test_mismatch_flips_back_and_passes_turn() {
        let (mut game, mut rx) = engine(Role::Host);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );

        game.flip_card(0);
        game.flip_card(1);
        rx.try_recv().unwrap();
        rx.try_recv().unwrap();
        match rx.try_recv().unwrap() {
            Message::MemoryMismatch {
                indices,
                next_player,
            } => {
                assert_eq!(indices, [0, 1]);
                assert_eq!(next_player, 1);
            }
            other => panic!("unexpected message {:?}", other),
        }

        assert_eq!(game.scores(), [0, 0]);
        assert!(!game.deck()[0].revealed);
        assert!(!game.deck()[1].revealed);
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn test_flip_out_of_turn_rejected() {
        let (mut game, mut rx) = engine(Role::Guest);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );

        // Current player starts at 0; the guest is player 1.
        game.flip_card(3);
        assert!(!game.deck()[3].revealed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_double_flip_same_card_rejected() {
        let (mut game, mut rx) = engine(Role::Host);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );

        game.flip_card(3);
        rx.try_recv().unwrap();
        game.flip_card(3);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_remote_flip_does_not_resolve() {
        let (mut game, mut rx) = engine(Role::Guest);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );

        game.handle_message(&Message::MemoryFlip { index: 3 }, 0);
        game.handle_message(&Message::MemoryFlip { index: 9 }, 0);

        // Display only; the verdict comes from the flipping peer.
        assert!(game.deck()[3].revealed);
        assert!(game.deck()[9].revealed);
        assert!(!game.deck()[3].matched);
        assert_eq!(game.scores(), [0, 0]);
        assert!(rx.try_recv().is_err());

        game.handle_message(
            &Message::MemoryMatch {
                indices: [3, 9],
                scoring_player: 0,
            },
            0,
        );
        assert!(game.deck()[3].matched);
        assert!(game.deck()[9].matched);
        assert_eq!(game.scores(), [1, 0]);
    }

    #[test]
    fn test_finished_when_all_matched() {
        let (mut game, _rx) = engine(Role::Host);
        let mut deck = crafted_deck();
        for card in &mut deck {
            card.matched = true;
        }
        game.handle_message(&Message::MemoryInit { deck }, 0);
        assert!(game.is_finished());
    }

    #[test]
    fn test_cleanup_stops_everything() {
        let (mut game, mut rx) = engine(Role::Host);
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );
        game.cleanup();

        assert!(game.deck().is_empty());
        game.flip_card(3);
        game.initialize();
        game.handle_message(
            &Message::MemoryInit {
                deck: crafted_deck(),
            },
            0,
        );
        assert!(game.deck().is_empty());
        assert!(rx.try_recv().is_err());
    }
}
