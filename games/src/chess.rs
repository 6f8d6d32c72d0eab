use crate::engine::{GameEngine, Intent, Outbox};
use log::debug;
use shared::{GameKind, Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceColor {
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: PieceColor,
    pub kind: PieceKind,
}

impl Piece {
    fn new(color: PieceColor, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    fn code(&self) -> &'static str {
        match (self.color, self.kind) {
            (PieceColor::White, PieceKind::Pawn) => "wp",
            (PieceColor::White, PieceKind::Rook) => "wr",
            (PieceColor::White, PieceKind::Knight) => "wn",
            (PieceColor::White, PieceKind::Bishop) => "wb",
            (PieceColor::White, PieceKind::Queen) => "wq",
            (PieceColor::White, PieceKind::King) => "wk",
            (PieceColor::Black, PieceKind::Pawn) => "bp",
            (PieceColor::Black, PieceKind::Rook) => "br",
            (PieceColor::Black, PieceKind::Knight) => "bn",
            (PieceColor::Black, PieceKind::Bishop) => "bb",
            (PieceColor::Black, PieceKind::Queen) => "bq",
            (PieceColor::Black, PieceKind::King) => "bk",
        }
    }
}

const STRAIGHT_DIRS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL_DIRS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Chess move relay over a mirrored 64-square board. Moves are validated
/// against per-piece geometry and capture color only; there is no check,
/// checkmate, castling, en passant or promotion. The host plays white.
///
/// The selection / legal-target cache is purely local UI state and never
/// crosses the wire.
pub struct Chess {
    board: [Option<Piece>; 64],
    my_turn: bool,
    my_color: PieceColor,
    selected: Option<usize>,
    legal_targets: Vec<usize>,
    outbox: Outbox,
    stopped: bool,
}

fn initial_board() -> [Option<Piece>; 64] {
    use PieceKind::*;

    let mut board = [None; 64];
    let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

    for (i, kind) in back_rank.iter().enumerate() {
        board[i] = Some(Piece::new(PieceColor::Black, *kind));
        board[i + 56] = Some(Piece::new(PieceColor::White, *kind));
    }
    for i in 8..16 {
        board[i] = Some(Piece::new(PieceColor::Black, Pawn));
    }
    for i in 48..56 {
        board[i] = Some(Piece::new(PieceColor::White, Pawn));
    }

    board
}

impl Chess {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        Self {
            board: initial_board(),
            my_turn: role == Role::Host,
            my_color: if role == Role::Host {
                PieceColor::White
            } else {
                PieceColor::Black
            },
            selected: None,
            legal_targets: Vec::new(),
            outbox,
            stopped: false,
        }
    }

    pub fn board(&self) -> &[Option<Piece>; 64] {
        &self.board
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn legal_targets(&self) -> &[usize] {
        &self.legal_targets
    }

    /// Select-then-move click flow. First click on an own piece caches its
    /// legal targets; a second click either moves, reselects or clears.
    pub fn click_square(&mut self, index: usize) {
        if self.stopped || !self.my_turn || index >= 64 {
            return;
        }

        if let Some(from) = self.selected {
            if from == index {
                self.clear_selection();
                return;
            }
            if self.legal_targets.contains(&index) {
                self.make_move(from, index);
                return;
            }
        }

        match self.board[index] {
            Some(piece) if piece.color == self.my_color => {
                self.selected = Some(index);
                self.legal_targets = self.possible_moves(index);
            }
            _ => self.clear_selection(),
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_targets.clear();
    }

    fn make_move(&mut self, from: usize, to: usize) {
        self.board[to] = self.board[from].take();
        self.clear_selection();
        self.outbox.send(Message::ChessMove { from, to });
        self.my_turn = false;
    }

    /// Replays the remote mutation verbatim; no legality re-check beyond
    /// bounds, per the trust model.
    fn apply_remote_move(&mut self, from: usize, to: usize) {
        if self.stopped {
            return;
        }
        if from >= 64 || to >= 64 {
            debug!("chess move {}->{} out of range, ignoring", from, to);
            return;
        }
        self.board[to] = self.board[from].take();
        self.my_turn = true;
    }

    /// Per-piece pseudo-legal move generation over board geometry.
    pub fn possible_moves(&self, index: usize) -> Vec<usize> {
        let piece = match self.board.get(index).copied().flatten() {
            Some(piece) => piece,
            None => return Vec::new(),
        };

        let mut moves = Vec::new();
        let row = (index / 8) as i32;
        let col = (index % 8) as i32;

        match piece.kind {
            PieceKind::Pawn => {
                let dir: i32 = if piece.color == PieceColor::White {
                    -1
                } else {
                    1
                };
                let start_row = if piece.color == PieceColor::White { 6 } else { 1 };

                let forward = row + dir;
                if (0..8).contains(&forward) {
                    let one = (forward * 8 + col) as usize;
                    if self.board[one].is_none() {
                        moves.push(one);
                        if row == start_row {
                            let two = ((row + dir * 2) * 8 + col) as usize;
                            if self.board[two].is_none() {
                                moves.push(two);
                            }
                        }
                    }

                    for dc in [-1, 1] {
                        let capture_col = col + dc;
                        if (0..8).contains(&capture_col) {
                            let target = (forward * 8 + capture_col) as usize;
                            if let Some(other) = self.board[target] {
                                if other.color != piece.color {
                                    moves.push(target);
                                }
                            }
                        }
                    }
                }
            }
            PieceKind::Rook => self.ray_moves(&mut moves, row, col, piece.color, &STRAIGHT_DIRS),
            PieceKind::Bishop => self.ray_moves(&mut moves, row, col, piece.color, &DIAGONAL_DIRS),
            PieceKind::Queen => {
                self.ray_moves(&mut moves, row, col, piece.color, &STRAIGHT_DIRS);
                self.ray_moves(&mut moves, row, col, piece.color, &DIAGONAL_DIRS);
            }
            PieceKind::Knight => self.step_moves(&mut moves, row, col, piece.color, &KNIGHT_JUMPS),
            PieceKind::King => self.step_moves(&mut moves, row, col, piece.color, &KING_STEPS),
        }

        moves
    }

    fn step_moves(
        &self,
        moves: &mut Vec<usize>,
        row: i32,
        col: i32,
        color: PieceColor,
        offsets: &[(i32, i32)],
    ) {
        for (dr, dc) in offsets {
            let new_row = row + dr;
            let new_col = col + dc;
            if !(0..8).contains(&new_row) || !(0..8).contains(&new_col) {
                continue;
            }
            let target = (new_row * 8 + new_col) as usize;
            match self.board[target] {
                Some(other) if other.color == color => {}
                _ => moves.push(target),
            }
        }
    }

    fn ray_moves(
        &self,
        moves: &mut Vec<usize>,
        row: i32,
        col: i32,
        color: PieceColor,
        dirs: &[(i32, i32)],
    ) {
        for (dr, dc) in dirs {
            let mut new_row = row + dr;
            let mut new_col = col + dc;
            while (0..8).contains(&new_row) && (0..8).contains(&new_col) {
                let target = (new_row * 8 + new_col) as usize;
                match self.board[target] {
                    None => moves.push(target),
                    Some(other) => {
                        if other.color != color {
                            moves.push(target);
                        }
                        break;
                    }
                }
                new_row += dr;
                new_col += dc;
            }
        }
    }
}

impl GameEngine for Chess {
    fn kind(&self) -> GameKind {
        GameKind::Chess
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if let Intent::Cell(index) = intent {
            self.click_square(index);
        }
    }

    fn handle_message(&mut self, message: &Message, _now_ms: u64) {
        if let Message::ChessMove { from, to } = message {
            self.apply_remote_move(*from, *to);
        }
    }

    fn cleanup(&mut self) {
        self.clear_selection();
        self.stopped = true;
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        for row in 0..8 {
            for col in 0..8 {
                match self.board[row * 8 + col] {
                    Some(piece) => out.push_str(piece.code()),
                    None => out.push_str(".."),
                }
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str(if self.my_turn {
            "Your turn"
        } else {
            "Opponent's turn"
        });
        out
    }
}
