//! # Peer Runtime
//!
//! Runs one end of a two-peer game session. Both roles execute the same
//! binary; who hosts is decided purely by who listened and who dialed.
//!
//! ## Architecture Overview
//!
//! The runtime is a single-threaded event loop fed by two suspension
//! sources: inbound channel messages and a fixed-rate simulation tick.
//! Messages are processed one at a time in arrival order, so no locking is
//! needed anywhere in the game layer — each peer owns exclusive write
//! access to its half of the shared state by construction (turn ownership
//! for the board games, simulation authority for the real-time ones).
//!
//! ### Transport (`transport`)
//! Wraps a TCP stream into an ordered, reliable, message-framed channel:
//! length-prefixed bincode frames, a reader task producing
//! [`transport::ChannelEvent`]s and a writer task draining an outbound
//! queue. Everything above it sees only `Open`/`Data`/`Closed`.
//!
//! ### Session (`session`)
//! Owns the role and channel lifecycle (`Connecting -> Open -> Closed`,
//! never backwards) and routes inbound messages. Sends are best-effort:
//! a message offered while the channel is not open is silently dropped,
//! there is no retry or ack layer by design.
//!
//! ### Lobby (`lobby`)
//! Negotiates which game runs via the `game-start` / `game-start-ack`
//! handshake and owns the single active engine instance. Switching games
//! always tears the outgoing engine down first; a guest never starts an
//! engine on its own — the host's `game-start` message is authoritative.

pub mod lobby;
pub mod session;
pub mod transport;
