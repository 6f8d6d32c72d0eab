use crate::engine::{GameEngine, Intent, Outbox};
use log::debug;
use shared::{GameKind, Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn other(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won(Mark),
    Draw,
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Tic-tac-toe over a mirrored 3x3 board. The host plays X and moves
/// first; write access to the board alternates with each exchanged move.
pub struct TicTacToe {
    board: [Option<Mark>; 9],
    my_turn: bool,
    mark: Mark,
    outbox: Outbox,
    stopped: bool,
}

impl TicTacToe {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        Self {
            board: [None; 9],
            my_turn: role == Role::Host,
            mark: if role == Role::Host { Mark::X } else { Mark::O },
            outbox,
            stopped: false,
        }
    }

    pub fn board(&self) -> &[Option<Mark>; 9] {
        &self.board
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn make_move(&mut self, index: usize) {
        if self.stopped || !self.my_turn || self.outcome().is_some() {
            return;
        }
        if index >= 9 || self.board[index].is_some() {
            return;
        }

        self.board[index] = Some(self.mark);
        self.outbox.send(Message::Move { index });
        self.my_turn = false;
    }

    fn apply_remote_move(&mut self, index: usize) {
        if self.stopped {
            return;
        }
        if index >= 9 {
            debug!("move index {} out of range, ignoring", index);
            return;
        }
        if self.board[index].is_some() {
            debug!("move onto occupied cell {}, ignoring", index);
            return;
        }

        self.board[index] = Some(self.mark.other());
        self.my_turn = true;
    }

    /// Pure function of the board; both peers compute it independently
    /// from identical mirrored state.
    pub fn outcome(&self) -> Option<Outcome> {
        for line in &LINES {
            let [a, b, c] = *line;
            if let Some(mark) = self.board[a] {
                if self.board[b] == Some(mark) && self.board[c] == Some(mark) {
                    return Some(Outcome::Won(mark));
                }
            }
        }

        if self.board.iter().all(|cell| cell.is_some()) {
            return Some(Outcome::Draw);
        }

        None
    }
}

impl GameEngine for TicTacToe {
    fn kind(&self) -> GameKind {
        GameKind::TicTacToe
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if let Intent::Cell(index) = intent {
            self.make_move(index);
        }
    }

    fn handle_message(&mut self, message: &Message, _now_ms: u64) {
        if let Message::Move { index } = message {
            self.apply_remote_move(*index);
        }
    }

    fn cleanup(&mut self) {
        self.stopped = true;
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        for row in 0..3 {
            for col in 0..3 {
                out.push(match self.board[row * 3 + col] {
                    Some(Mark::X) => 'X',
                    Some(Mark::O) => 'O',
                    None => '.',
                });
            }
            out.push('\n');
        }
        match self.outcome() {
            Some(Outcome::Draw) => out.push_str("It's a draw!"),
            Some(Outcome::Won(mark)) => out.push_str(&format!("Player {:?} wins!", mark)),
            None => out.push_str(if self.my_turn {
                "Your turn"
            } else {
                "Opponent's turn"
            }),
        }
        out
    }
}
