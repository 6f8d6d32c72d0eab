//! Channel adapter: length-framed bincode messages over a single TCP
//! stream, surfaced as an event stream plus a fire-and-forget sender.

use bincode::{deserialize, serialize};
use log::{debug, error, info};
use shared::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Upper bound on a single frame; nothing in the protocol comes close.
const MAX_FRAME_BYTES: usize = 64 * 1024;

/// What the channel reports upward. `Data` frames arrive in send order;
/// after `Closed` nothing else is delivered.
#[derive(Debug)]
pub enum ChannelEvent {
    Open,
    Data(Message),
    Closed,
}

/// One end of the peer channel. Sending is non-blocking and best-effort;
/// the writer task owns the socket half.
pub struct PeerChannel {
    outbound: mpsc::UnboundedSender<Message>,
}

/// A bound listener waiting for the single inbound peer connection.
pub struct Listener {
    listener: TcpListener,
}

impl Listener {
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts exactly one peer; additional connection attempts are left
    /// in the backlog and never served.
    pub async fn accept(
        self,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> std::io::Result<PeerChannel> {
        let (stream, peer_addr) = self.listener.accept().await?;
        info!("Peer connected from {}", peer_addr);
        PeerChannel::from_stream(stream, events)
    }
}

impl PeerChannel {
    /// Dials a listening peer.
    pub async fn connect(
        addr: &str,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to {}", addr);
        Self::from_stream(stream, events)
    }

    fn from_stream(
        stream: TcpStream,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::run_reader(read_half, events.clone()));
        tokio::spawn(Self::run_writer(write_half, outbound_rx));

        if events.send(ChannelEvent::Open).is_err() {
            debug!("event receiver gone before channel opened");
        }

        Ok(Self { outbound })
    }

    /// Queues a message for transmission. No backpressure, no delivery
    /// confirmation; if the writer is gone the message just disappears.
    pub fn send(&self, message: Message) {
        if self.outbound.send(message).is_err() {
            debug!("channel writer gone, dropping message");
        }
    }

    async fn run_reader(mut read_half: OwnedReadHalf, events: mpsc::UnboundedSender<ChannelEvent>) {
        let mut len_buf = [0u8; 4];

        loop {
            if read_half.read_exact(&mut len_buf).await.is_err() {
                break;
            }
            let len = u32::from_be_bytes(len_buf) as usize;
            if len > MAX_FRAME_BYTES {
                error!("oversized frame ({} bytes), closing channel", len);
                break;
            }

            let mut frame = vec![0u8; len];
            if read_half.read_exact(&mut frame).await.is_err() {
                break;
            }

            match deserialize::<Message>(&frame) {
                Ok(message) => {
                    if events.send(ChannelEvent::Data(message)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    // A byte stream cannot resynchronize after a corrupt
                    // frame, so treat it as a dead channel.
                    error!("undecodable frame ({}), closing channel", e);
                    break;
                }
            }
        }

        let _ = events.send(ChannelEvent::Closed);
    }

    async fn run_writer(
        mut write_half: OwnedWriteHalf,
        mut outbound_rx: mpsc::UnboundedReceiver<Message>,
    ) {
        while let Some(message) = outbound_rx.recv().await {
            let data = match serialize(&message) {
                Ok(data) => data,
                Err(e) => {
                    error!("failed to serialize message: {}", e);
                    continue;
                }
            };

            let len = (data.len() as u32).to_be_bytes();
            if write_half.write_all(&len).await.is_err() || write_half.write_all(&data).await.is_err()
            {
                debug!("peer write failed, stopping writer");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GameKind;

    #[tokio::test]
    async fn test_channel_exchange_both_directions() {
        let (host_events_tx, mut host_events) = mpsc::unbounded_channel();
        let (guest_events_tx, mut guest_events) = mpsc::unbounded_channel();

        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let accept_task = tokio::spawn(listener.accept(host_events_tx));
        let guest = PeerChannel::connect(&addr, guest_events_tx).await.unwrap();
        let host = accept_task.await.unwrap().unwrap();

        assert!(matches!(
            host_events.recv().await.unwrap(),
            ChannelEvent::Open
        ));
        assert!(matches!(
            guest_events.recv().await.unwrap(),
            ChannelEvent::Open
        ));

        host.send(Message::GameStart {
            game: GameKind::TicTacToe,
        });
        match guest_events.recv().await.unwrap() {
            ChannelEvent::Data(Message::GameStart { game }) => {
                assert_eq!(game, GameKind::TicTacToe);
            }
            other => panic!("unexpected event {:?}", other),
        }

        guest.send(Message::GameStartAck {
            game: GameKind::TicTacToe,
        });
        guest.send(Message::Move { index: 7 });
        match host_events.recv().await.unwrap() {
            ChannelEvent::Data(Message::GameStartAck { .. }) => {}
            other => panic!("unexpected event {:?}", other),
        }
        match host_events.recv().await.unwrap() {
            ChannelEvent::Data(Message::Move { index }) => assert_eq!(index, 7),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_event_when_peer_drops() {
        let (host_events_tx, mut host_events) = mpsc::unbounded_channel();
        let (guest_events_tx, mut guest_events) = mpsc::unbounded_channel();

        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let accept_task = tokio::spawn(listener.accept(host_events_tx));
        let guest = PeerChannel::connect(&addr, guest_events_tx).await.unwrap();
        let _host = accept_task.await.unwrap().unwrap();

        assert!(matches!(
            host_events.recv().await.unwrap(),
            ChannelEvent::Open
        ));
        assert!(matches!(
            guest_events.recv().await.unwrap(),
            ChannelEvent::Open
        ));

        drop(guest);
        // Dropping the sender tears down the writer task and its socket
        // half; the host reader then sees EOF.
        loop {
            match host_events.recv().await.unwrap() {
                ChannelEvent::Closed => break,
                ChannelEvent::Data(_) | ChannelEvent::Open => continue,
            }
        }
    }
}
