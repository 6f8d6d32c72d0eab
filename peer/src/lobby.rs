//! Game selection and engine ownership
//!
//! The lobby decides which game is running and owns the single active
//! engine instance. The negotiation is deliberately asymmetric:
//!
//! - The host instantiates immediately on selection and announces the
//!   game with `game-start`.
//! - The guest never instantiates on its own; its selection is only a
//!   recorded wish, and the host's `game-start` message is the one
//!   authority for guest instantiation. This makes the
//!   both-click-simultaneously race a non-event.
//!
//! The receiving side answers `game-start-ack`, and only that ack invokes
//! the engine's `initialize` hook — the signal that both sides exist and
//! game-specific setup traffic (like memory's deck deal) may flow.

use games::{create_engine, GameEngine, Intent, Outbox};
use log::{debug, info};
use shared::{GameKind, Message, Role};

/// Holds at most one running game. Switching games always runs the
/// outgoing engine's `cleanup()` before constructing the next, so stale
/// tick loops and listeners cannot survive a transition.
pub struct Lobby {
    role: Role,
    outbox: Outbox,
    engine: Option<Box<dyn GameEngine>>,
    /// Game to (re-)enter once the channel opens, or the guest's recorded
    /// wish while waiting for the host's announcement.
    pending: Option<GameKind>,
}

impl Lobby {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        Self {
            role,
            outbox,
            engine: None,
            pending: None,
        }
    }

    pub fn active_game(&self) -> Option<GameKind> {
        self.engine.as_ref().map(|engine| engine.kind())
    }

    /// Remembers a selection made before the channel is usable.
    pub fn preselect(&mut self, kind: GameKind) {
        self.pending = Some(kind);
    }

    /// Re-enters a pre-selected game as soon as both sides can talk.
    /// Only the host may start; a waiting guest keeps waiting.
    pub fn on_channel_open(&mut self) {
        if self.role == Role::Host {
            if let Some(kind) = self.pending.take() {
                self.select_game(kind);
            }
        }
    }

    /// Local "play this game" intent.
    pub fn select_game(&mut self, kind: GameKind) {
        match self.role {
            Role::Host => {
                self.start_engine(kind);
                self.outbox.send(Message::GameStart { game: kind });
            }
            Role::Guest => {
                info!("Waiting for host to start {}", kind.name());
                self.pending = Some(kind);
            }
        }
    }

    /// Replaces the active engine, cleaning up the outgoing one first.
    fn start_engine(&mut self, kind: GameKind) {
        if let Some(mut old) = self.engine.take() {
            info!("Switching from {} to {}", old.kind().name(), kind.name());
            old.cleanup();
        }
        self.engine = Some(create_engine(kind, self.role, self.outbox.clone()));
    }

    pub fn handle_message(&mut self, message: &Message, now_ms: u64) {
        match message {
            Message::GameStart { game } => {
                // The announcement overrides any locally recorded wish.
                self.pending = None;
                self.start_engine(*game);
                self.outbox.send(Message::GameStartAck { game: *game });
            }
            Message::GameStartAck { game } => match &mut self.engine {
                Some(engine) => engine.initialize(),
                None => debug!("game-start-ack for {} with no active game", game.name()),
            },
            other => {
                if let Some(engine) = &mut self.engine {
                    engine.handle_message(other, now_ms);
                } else {
                    debug!("no active game, ignoring {:?}", other);
                }
            }
        }
    }

    pub fn apply_intent(&mut self, intent: Intent, now_ms: u64) {
        if let Some(engine) = &mut self.engine {
            engine.apply_intent(intent, now_ms);
        }
    }

    pub fn tick(&mut self, now_ms: u64) {
        if let Some(engine) = &mut self.engine {
            engine.tick(now_ms);
        }
    }

    /// Tears down and discards the active engine, if any.
    pub fn leave_game(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            info!("Leaving {}", engine.kind().name());
            engine.cleanup();
        }
    }

    pub fn describe(&self) -> String {
        match &self.engine {
            Some(engine) => engine.describe(),
            None => "no game active".to_string(),
        }
    }
}
