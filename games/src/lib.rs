//! # Game Engines
//!
//! One engine per playable game, all implementing the [`GameEngine`]
//! capability trait. Two synchronization disciplines live here:
//!
//! - Turn games (tic-tac-toe, chess, connect four, memory) mirror every
//!   local mutation to the remote peer verbatim and alternate write access,
//!   so both copies apply the identical move sequence in identical order.
//! - Real-time games (pong, snake) run a host-authoritative simulation:
//!   the host's state is ground truth, broadcast periodically, while the
//!   guest predicts between updates and reconciles on receipt.
//!
//! Engines are synchronous state machines. All time is passed in as
//! millisecond timestamps and all output goes through an [`Outbox`], so
//! every engine can be driven from a fixed virtual clock in tests.

pub mod chess;
pub mod clock;
pub mod connectfour;
pub mod engine;
pub mod memory;
pub mod pong;
pub mod snake;
pub mod tictactoe;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use engine::{GameEngine, Intent, Outbox};

use shared::{GameKind, Role};

/// Builds the engine for the given game. The caller owns the returned
/// instance and must run `cleanup()` before discarding it.
pub fn create_engine(kind: GameKind, role: Role, outbox: Outbox) -> Box<dyn GameEngine> {
    match kind {
        GameKind::TicTacToe => Box::new(tictactoe::TicTacToe::new(role, outbox)),
        GameKind::Chess => Box::new(chess::Chess::new(role, outbox)),
        GameKind::ConnectFour => Box::new(connectfour::ConnectFour::new(role, outbox)),
        GameKind::Memory => Box::new(memory::Memory::new(role, outbox)),
        GameKind::Pong => Box::new(pong::Pong::new(role, outbox)),
        GameKind::Snake => Box::new(snake::SnakeGame::new(role, outbox)),
    }
}
