use crate::engine::{GameEngine, Intent, Outbox};
use log::debug;
use shared::{GameKind, Message, Role};

pub const COLS: usize = 7;
pub const ROWS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
}

impl Color {
    fn other(&self) -> Color {
        match self {
            Color::Red => Color::Yellow,
            Color::Yellow => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won(Color),
    Draw,
}

/// Connect four on a mirrored 7x6 board stored row-major, row 0 on top.
/// A local intent names a column; the engine drops to the lowest vacant
/// row and mirrors the resolved index, so both boards stay identical.
pub struct ConnectFour {
    board: [Option<Color>; COLS * ROWS],
    my_turn: bool,
    color: Color,
    outbox: Outbox,
    stopped: bool,
}

impl ConnectFour {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        Self {
            board: [None; COLS * ROWS],
            my_turn: role == Role::Host,
            color: if role == Role::Host {
                Color::Red
            } else {
                Color::Yellow
            },
            outbox,
            stopped: false,
        }
    }

    pub fn board(&self) -> &[Option<Color>] {
        &self.board
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        (0..ROWS)
            .rev()
            .find(|row| self.board[row * COLS + column].is_none())
    }

    pub fn make_move(&mut self, column: usize) {
        if self.stopped || !self.my_turn || column >= COLS || self.outcome().is_some() {
            return;
        }
        let row = match self.lowest_empty_row(column) {
            Some(row) => row,
            None => return,
        };

        let index = row * COLS + column;
        self.board[index] = Some(self.color);
        self.outbox.send(Message::Connect4Move { index });
        self.my_turn = false;
    }

    fn apply_remote_move(&mut self, index: usize) {
        if self.stopped {
            return;
        }
        if index >= COLS * ROWS {
            debug!("connect4 index {} out of range, ignoring", index);
            return;
        }
        if self.board[index].is_some() {
            debug!("connect4 move onto occupied cell {}, ignoring", index);
            return;
        }

        self.board[index] = Some(self.color.other());
        self.my_turn = true;
    }

    /// Scans horizontals, verticals and both diagonals. Identical on both
    /// peers given identical boards; no message agrees on the outcome.
    pub fn outcome(&self) -> Option<Outcome> {
        let at = |index: usize| self.board[index];

        for row in 0..ROWS {
            for col in 0..COLS - 3 {
                let index = row * COLS + col;
                if let Some(color) = at(index) {
                    if at(index + 1) == Some(color)
                        && at(index + 2) == Some(color)
                        && at(index + 3) == Some(color)
                    {
                        return Some(Outcome::Won(color));
                    }
                }
            }
        }

        for row in 0..ROWS - 3 {
            for col in 0..COLS {
                let index = row * COLS + col;
                if let Some(color) = at(index) {
                    if at(index + COLS) == Some(color)
                        && at(index + 2 * COLS) == Some(color)
                        && at(index + 3 * COLS) == Some(color)
                    {
                        return Some(Outcome::Won(color));
                    }
                }
            }
        }

        for row in 0..ROWS - 3 {
            for col in 0..COLS - 3 {
                let index = row * COLS + col;
                if let Some(color) = at(index) {
                    if at(index + COLS + 1) == Some(color)
                        && at(index + 2 * (COLS + 1)) == Some(color)
                        && at(index + 3 * (COLS + 1)) == Some(color)
                    {
                        return Some(Outcome::Won(color));
                    }
                }
            }
        }

        for row in 0..ROWS - 3 {
            for col in 3..COLS {
                let index = row * COLS + col;
                if let Some(color) = at(index) {
                    if at(index + COLS - 1) == Some(color)
                        && at(index + 2 * (COLS - 1)) == Some(color)
                        && at(index + 3 * (COLS - 1)) == Some(color)
                    {
                        return Some(Outcome::Won(color));
                    }
                }
            }
        }

        if self.board.iter().all(|cell| cell.is_some()) {
            return Some(Outcome::Draw);
        }

        None
    }
}

impl GameEngine for ConnectFour {
    fn kind(&self) -> GameKind {
        GameKind::ConnectFour
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if let Intent::Cell(index) = intent {
            self.make_move(index % COLS);
        }
    }

    fn handle_message(&mut self, message: &Message, _now_ms: u64) {
        if let Message::Connect4Move { index } = message {
            self.apply_remote_move(*index);
        }
    }

    fn cleanup(&mut self) {
        self.stopped = true;
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                out.push(match self.board[row * COLS + col] {
                    Some(Color::Red) => 'R',
                    Some(Color::Yellow) => 'Y',
                    None => '.',
                });
            }
            out.push('\n');
        }
        match self.outcome() {
            Some(Outcome::Draw) => out.push_str("It's a draw!"),
            Some(Outcome::Won(color)) => out.push_str(&format!("{:?} wins!", color)),
            None => out.push_str(if self.my_turn {
                "Your turn"
            } else {
                "Opponent's turn"
            }),
        }
        out
    }
}
