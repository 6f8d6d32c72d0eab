use log::debug;
use shared::{Direction, GameKind, Message, PaddleKey};
use tokio::sync::mpsc;

/// A logical input already decoded from whatever captured it. Rendering
/// and key handling live outside this crate; engines only see intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Click/selection of a board cell (or, for connect four, any cell in
    /// the target column).
    Cell(usize),
    /// Paddle key transition for pong.
    Paddle { key: PaddleKey, pressed: bool },
    /// Direction change for snake.
    Steer(Direction),
}

/// Handle engines use to emit protocol messages. Sends are fire-and-forget:
/// the session gates on channel state and drops when the channel is down.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Message>,
}

impl Outbox {
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    pub fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            debug!("outbound queue closed, dropping message");
        }
    }
}

/// Capability interface every game implements. The selection coordinator
/// holds engines only through this trait.
pub trait GameEngine: Send {
    fn kind(&self) -> GameKind;

    /// Called when the remote peer acknowledges the game start, i.e. both
    /// sides have an instance. Games that need a one-shot setup message
    /// (memory's deal) do it here; most games need nothing.
    fn initialize(&mut self) {}

    /// Applies a local player input.
    fn apply_intent(&mut self, intent: Intent, now_ms: u64);

    /// Applies a message from the remote peer. Messages that do not belong
    /// to this game are ignored.
    fn handle_message(&mut self, message: &Message, now_ms: u64);

    /// Advances real-time simulation. No-op for turn-based games.
    fn tick(&mut self, _now_ms: u64) {}

    /// Tears the game down. After this returns the engine must never
    /// mutate state or emit another message, whatever gets called on it.
    fn cleanup(&mut self);

    /// Read-only state summary for display.
    fn describe(&self) -> String;
}
