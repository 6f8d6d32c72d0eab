use clap::Parser;
use games::{Clock, Intent, Outbox, SystemClock};
use log::{info, warn};
use peer::session::Session;
use peer::transport::{Listener, PeerChannel};
use shared::{Direction, GameKind, Message, PaddleKey, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen for an inbound peer (host role), e.g. 127.0.0.1:7777
    #[arg(short = 'H', long, conflicts_with = "connect")]
    listen: Option<String>,

    /// Connect to a listening peer (guest role)
    #[arg(short = 'c', long)]
    connect: Option<String>,

    /// Game to start once the channel opens (host side):
    /// tictactoe, chess, connectfour, memory, pong, snake
    #[arg(short = 'g', long)]
    game: Option<String>,

    /// Simulation tick rate for real-time games (Hz)
    #[arg(short = 't', long, default_value = "60")]
    tick_rate: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<Message>();

    let (role, channel) = match (&args.listen, &args.connect) {
        (Some(addr), None) => {
            let listener = Listener::bind(addr).await?;
            info!("Waiting for a peer on {}", listener.local_addr()?);
            (Role::Host, listener.accept(event_tx).await?)
        }
        (None, Some(addr)) => (Role::Guest, PeerChannel::connect(addr, event_tx).await?),
        _ => {
            eprintln!("Pass either --listen <addr> or --connect <addr>");
            std::process::exit(2);
        }
    };

    let mut session = Session::new(role, outbound_tx, Outbox::new(outbox_tx));

    if let Some(name) = &args.game {
        match GameKind::from_name(name) {
            Some(kind) => session.preselect(kind),
            None => warn!("Unknown game '{}', ignoring", name),
        }
    }

    info!("Commands: start <game> | cell <i> | up/down/left/right | stop | state | leave | quit");

    let clock = SystemClock;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = interval(Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                match event {
                    Some(event) => {
                        if !session.handle_event(event, clock.now_ms()) {
                            break;
                        }
                    }
                    None => break,
                }
            },

            // Engine output: gate on channel state, then hand to the wire.
            message = outbox_rx.recv() => {
                if let Some(message) = message {
                    session.send(message);
                }
            },

            message = outbound_rx.recv() => {
                if let Some(message) = message {
                    channel.send(message);
                }
            },

            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_command(&mut session, line.trim(), clock.now_ms()) {
                            break;
                        }
                    }
                    None => break,
                }
            },

            _ = tick.tick() => {
                session.tick(clock.now_ms());
            },
        }
    }

    session.leave_game();
    info!("Session ended");
    Ok(())
}

/// Translates a console line into a session call. Returns false on quit.
fn handle_command(session: &mut Session, line: &str, now_ms: u64) -> bool {
    let mut parts = line.split_whitespace();
    let command = match parts.next() {
        Some(command) => command,
        None => return true,
    };

    match command {
        "start" => match parts.next().and_then(GameKind::from_name) {
            Some(kind) => session.select_game(kind),
            None => println!("usage: start <tictactoe|chess|connectfour|memory|pong|snake>"),
        },
        "leave" => session.leave_game(),
        "state" => println!("{}", session.describe()),
        "quit" | "exit" => return false,

        // Board games address cells; connect four takes any cell in the
        // target column, chess takes select-then-target clicks.
        "cell" | "move" | "drop" | "flip" => match parts.next().and_then(|s| s.parse().ok()) {
            Some(index) => session.apply_intent(Intent::Cell(index), now_ms),
            None => println!("usage: {} <index>", command),
        },

        "up" | "down" | "left" | "right" => {
            let direction = match command {
                "up" => Direction::Up,
                "down" => Direction::Down,
                "left" => Direction::Left,
                _ => Direction::Right,
            };
            if session.active_game() == Some(GameKind::Pong) {
                let key = if direction == Direction::Up {
                    PaddleKey::Up
                } else {
                    PaddleKey::Down
                };
                session.apply_intent(Intent::Paddle { key, pressed: true }, now_ms);
            } else {
                session.apply_intent(Intent::Steer(direction), now_ms);
            }
        }
        // Releases both paddle keys.
        "stop" => {
            for key in [PaddleKey::Up, PaddleKey::Down] {
                session.apply_intent(
                    Intent::Paddle {
                        key,
                        pressed: false,
                    },
                    now_ms,
                );
            }
        }

        other => println!("unknown command '{}'", other),
    }

    true
}
