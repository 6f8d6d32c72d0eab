use serde::{Deserialize, Serialize};

pub const PONG_WIDTH: f32 = 800.0;
pub const PONG_HEIGHT: f32 = 400.0;
pub const PADDLE_HEIGHT: f32 = 80.0;
pub const PADDLE_WIDTH: f32 = 10.0;
pub const BALL_RADIUS: f32 = 8.0;
pub const MAX_BALL_SPEED: f32 = 15.0;
pub const MAX_PADDLE_SPEED: f32 = 8.0;
pub const PADDLE_ACCELERATION: f32 = 0.8;
pub const PADDLE_DRAG: f32 = 0.85;
pub const FRAME_MS: f32 = 16.0;

pub const SNAKE_GRID_SIZE: i32 = 20;
pub const SNAKE_MOVE_INTERVAL_MS: u64 = 150;

pub const MEMORY_DECK_SIZE: usize = 16;

/// Everything that crosses the peer channel. One variant per wire record;
/// unrecognized or out-of-context records are ignored by the receiving side.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Message {
    ConnectionReady,
    GameStart {
        game: GameKind,
    },
    GameStartAck {
        game: GameKind,
    },

    Move {
        index: usize,
    },
    ChessMove {
        from: usize,
        to: usize,
    },
    Connect4Move {
        index: usize,
    },

    MemoryInit {
        deck: Vec<Card>,
    },
    MemoryFlip {
        index: usize,
    },
    MemoryMatch {
        indices: [usize; 2],
        scoring_player: usize,
    },
    MemoryMismatch {
        indices: [usize; 2],
        next_player: usize,
    },

    PaddleMove {
        key: PaddleKey,
        pressed: bool,
    },
    PaddlePosition {
        y: f32,
        speed: f32,
        timestamp: u64,
    },
    PongState {
        state: PongSnapshot,
    },

    SnakeDirection {
        direction: Direction,
    },
    SnakeUpdate {
        snake: SnakeBody,
    },
    SnakeState {
        snake1: SnakeBody,
        snake2: SnakeBody,
        food: GridPos,
        game_over: bool,
    },
    FoodUpdate {
        food: GridPos,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    TicTacToe,
    Chess,
    ConnectFour,
    Memory,
    Pong,
    Snake,
}

impl GameKind {
    pub fn from_name(name: &str) -> Option<GameKind> {
        match name {
            "tictactoe" => Some(GameKind::TicTacToe),
            "chess" => Some(GameKind::Chess),
            "connectfour" => Some(GameKind::ConnectFour),
            "memory" => Some(GameKind::Memory),
            "pong" => Some(GameKind::Pong),
            "snake" => Some(GameKind::Snake),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameKind::TicTacToe => "tictactoe",
            GameKind::Chess => "chess",
            GameKind::ConnectFour => "connectfour",
            GameKind::Memory => "memory",
            GameKind::Pong => "pong",
            GameKind::Snake => "snake",
        }
    }
}

/// Which end of the channel this peer is. The host accepted the inbound
/// connection; the guest dialed out. Fixed for the life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    /// Seat number used by games that track players by index (memory).
    /// The host is always player 0.
    pub fn player_index(&self) -> usize {
        match self {
            Role::Host => 0,
            Role::Guest => 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PaddleKey {
    Up,
    Down,
}

/// A cell on the snake grid. Signed so that stepping off the top or left
/// edge is representable and detectable.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn step(&self, direction: Direction) -> GridPos {
        match direction {
            Direction::Up => GridPos {
                x: self.x,
                y: self.y - 1,
            },
            Direction::Down => GridPos {
                x: self.x,
                y: self.y + 1,
            },
            Direction::Left => GridPos {
                x: self.x - 1,
                y: self.y,
            },
            Direction::Right => GridPos {
                x: self.x + 1,
                y: self.y,
            },
        }
    }

    pub fn in_bounds(&self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }
}

/// One memory card. The dealer ships the whole deck, so icon and color
/// travel on the wire rather than being re-derived on the other side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Card {
    pub icon: String,
    pub color: String,
    pub revealed: bool,
    pub matched: bool,
}

impl Card {
    pub fn face_down(icon: &str, color: &str) -> Self {
        Card {
            icon: icon.to_string(),
            color: color.to_string(),
            revealed: false,
            matched: false,
        }
    }

    pub fn same_face(&self, other: &Card) -> bool {
        self.icon == other.icon && self.color == other.color
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Ball {
    pub fn speed(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Paddle {
    pub y: f32,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PongSnapshot {
    pub ball: Ball,
    pub left_paddle: Paddle,
    pub right_paddle: Paddle,
    pub timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SnakeBody {
    pub body: Vec<GridPos>,
    pub direction: Direction,
    pub score: u32,
}

impl SnakeBody {
    pub fn new(start: GridPos, direction: Direction) -> Self {
        SnakeBody {
            body: vec![start],
            direction,
            score: 0,
        }
    }

    pub fn head(&self) -> GridPos {
        self.body[0]
    }

    pub fn occupies(&self, pos: GridPos) -> bool {
        self.body.iter().any(|segment| *segment == pos)
    }
}
