//! Session lifecycle and message dispatch.

use crate::lobby::Lobby;
use crate::transport::ChannelEvent;
use games::{Intent, Outbox};
use log::{debug, info};
use shared::{GameKind, Message, Role};
use tokio::sync::mpsc;

/// Channel lifecycle. Strictly forward: once closed, a session is done;
/// reconnection is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Owns the fixed role, the channel state and the lobby. All inbound
/// traffic and all outbound sends flow through here, so the
/// only-send-while-open policy lives in exactly one place.
pub struct Session {
    role: Role,
    state: ChannelState,
    outbound: mpsc::UnboundedSender<Message>,
    lobby: Lobby,
}

impl Session {
    pub fn new(role: Role, outbound: mpsc::UnboundedSender<Message>, outbox: Outbox) -> Self {
        Self {
            role,
            state: ChannelState::Connecting,
            outbound,
            lobby: Lobby::new(role, outbox),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn active_game(&self) -> Option<GameKind> {
        self.lobby.active_game()
    }

    /// Remembers a game to start as soon as the channel opens.
    pub fn preselect(&mut self, kind: GameKind) {
        self.lobby.preselect(kind);
    }

    /// Feeds one transport event through the session. Returns false once
    /// the channel is gone and the loop should stop.
    pub fn handle_event(&mut self, event: ChannelEvent, now_ms: u64) -> bool {
        match event {
            ChannelEvent::Open => {
                self.state = ChannelState::Open;
                info!("Channel open, role {:?}", self.role);
                self.send(Message::ConnectionReady);
                self.lobby.on_channel_open();
                true
            }
            ChannelEvent::Data(message) => {
                self.dispatch(message, now_ms);
                true
            }
            ChannelEvent::Closed => {
                self.state = ChannelState::Closed;
                info!("Channel closed, tearing down session");
                self.lobby.leave_game();
                false
            }
        }
    }

    fn dispatch(&mut self, message: Message, now_ms: u64) {
        match message {
            // Consumed here; it only confirms the handshake.
            Message::ConnectionReady => debug!("peer reports connection ready"),
            other => self.lobby.handle_message(&other, now_ms),
        }
    }

    /// Best-effort send: forwarded iff the channel is open, silently
    /// dropped otherwise.
    pub fn send(&self, message: Message) {
        if self.state != ChannelState::Open {
            debug!("channel not open, dropping {:?}", message);
            return;
        }
        if self.outbound.send(message).is_err() {
            debug!("transport gone, message dropped");
        }
    }

    pub fn select_game(&mut self, kind: GameKind) {
        self.lobby.select_game(kind);
    }

    pub fn leave_game(&mut self) {
        self.lobby.leave_game();
    }

    pub fn apply_intent(&mut self, intent: Intent, now_ms: u64) {
        self.lobby.apply_intent(intent, now_ms);
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.lobby.tick(now_ms);
    }

    pub fn describe(&self) -> String {
        self.lobby.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> (Session, mpsc::UnboundedReceiver<Message>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (outbox_tx, _outbox_rx) = mpsc::unbounded_channel();
        (
            Session::new(role, outbound_tx, Outbox::new(outbox_tx)),
            outbound_rx,
        )
    }

    #[test]
    fn test_send_before_open_drops_silently() {
        let (session, mut outbound) = session(Role::Host);
        assert_eq!(session.state(), ChannelState::Connecting);

        session.send(Message::Move { index: 3 });
        assert!(outbound.try_recv().is_err());
    }

    #[test]
    fn test_open_sends_connection_ready() {
        let (mut session, mut outbound) = session(Role::Host);
        assert!(session.handle_event(ChannelEvent::Open, 0));
        assert_eq!(session.state(), ChannelState::Open);

        match outbound.try_recv().unwrap() {
            Message::ConnectionReady => {}
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_send_after_open_forwards() {
        let (mut session, mut outbound) = session(Role::Host);
        session.handle_event(ChannelEvent::Open, 0);
        outbound.try_recv().unwrap(); // connection-ready

        session.send(Message::Move { index: 3 });
        match outbound.try_recv().unwrap() {
            Message::Move { index } => assert_eq!(index, 3),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_connection_ready_is_consumed() {
        let (mut session, _outbound) = session(Role::Host);
        session.handle_event(ChannelEvent::Open, 0);
        // No game active: routing the handshake note must not create one.
        session.handle_event(ChannelEvent::Data(Message::ConnectionReady), 0);
        assert_eq!(session.active_game(), None);
    }

    #[test]
    fn test_game_start_instantiates_engine() {
        let (mut session, _outbound) = session(Role::Guest);
        session.handle_event(ChannelEvent::Open, 0);
        session.handle_event(
            ChannelEvent::Data(Message::GameStart {
                game: GameKind::TicTacToe,
            }),
            0,
        );
        assert_eq!(session.active_game(), Some(GameKind::TicTacToe));
    }

    #[test]
    fn test_closed_tears_down_and_stops_loop() {
        let (mut session, _outbound) = session(Role::Guest);
        session.handle_event(ChannelEvent::Open, 0);
        session.handle_event(
            ChannelEvent::Data(Message::GameStart {
                game: GameKind::Pong,
            }),
            0,
        );

        assert!(!session.handle_event(ChannelEvent::Closed, 0));
        assert_eq!(session.state(), ChannelState::Closed);
        assert_eq!(session.active_game(), None);
    }

    #[test]
    fn test_host_preselection_starts_on_open() {
        let (mut session, _outbound) = session(Role::Host);
        session.preselect(GameKind::ConnectFour);
        assert_eq!(session.active_game(), None);

        session.handle_event(ChannelEvent::Open, 0);
        assert_eq!(session.active_game(), Some(GameKind::ConnectFour));
    }
}
