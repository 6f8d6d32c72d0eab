use crate::engine::{GameEngine, Intent, Outbox};
use log::debug;
use rand::Rng;
use shared::{
    Direction, GameKind, GridPos, Message, Role, SnakeBody, SNAKE_GRID_SIZE,
    SNAKE_MOVE_INTERVAL_MS,
};

/// Two-snake game with split authority. Each peer advances only its own
/// snake every fixed tick: the host then broadcasts the merged state as
/// ground truth, the guest reports its advanced body for the host to fold
/// in. The host alone decides game over and food placement. Guest state
/// may transiently diverge until the next snapshot overwrites it.
pub struct SnakeGame {
    role: Role,
    snake1: SnakeBody,
    snake2: SnakeBody,
    food: GridPos,
    game_over: bool,
    last_update_ms: u64,
    outbox: Outbox,
    stopped: bool,
}

impl SnakeGame {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        let snake1 = SnakeBody::new(GridPos { x: 5, y: 10 }, Direction::Right);
        let snake2 = SnakeBody::new(GridPos { x: 15, y: 10 }, Direction::Left);
        let food = Self::random_free_cell(&snake1, &snake2);
        Self {
            role,
            snake1,
            snake2,
            food,
            game_over: false,
            last_update_ms: 0,
            outbox,
            stopped: false,
        }
    }

    pub fn snake1(&self) -> &SnakeBody {
        &self.snake1
    }

    pub fn snake2(&self) -> &SnakeBody {
        &self.snake2
    }

    pub fn food(&self) -> GridPos {
        self.food
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn random_free_cell(snake1: &SnakeBody, snake2: &SnakeBody) -> GridPos {
        let mut rng = rand::thread_rng();
        loop {
            let pos = GridPos {
                x: rng.gen_range(0..SNAKE_GRID_SIZE),
                y: rng.gen_range(0..SNAKE_GRID_SIZE),
            };
            if !snake1.occupies(pos) && !snake2.occupies(pos) {
                return pos;
            }
        }
    }

    fn own_snake(&self) -> &SnakeBody {
        match self.role {
            Role::Host => &self.snake1,
            Role::Guest => &self.snake2,
        }
    }

    pub fn steer(&mut self, direction: Direction) {
        if self.stopped || self.game_over {
            return;
        }
        let current = self.own_snake().direction;
        if direction == current || direction == current.opposite() {
            return;
        }

        match self.role {
            Role::Host => self.snake1.direction = direction,
            Role::Guest => self.snake2.direction = direction,
        }
        self.outbox.send(Message::SnakeDirection { direction });
    }

    /// Advances one snake by a cell. Wall exit or hitting an occupied cell
    /// ends the game without mutating the body.
    fn advance_own_snake(&mut self) {
        let snake = match self.role {
            Role::Host => &self.snake1,
            Role::Guest => &self.snake2,
        };
        let head = snake.head().step(snake.direction);

        if !head.in_bounds(SNAKE_GRID_SIZE)
            || self.snake1.occupies(head)
            || self.snake2.occupies(head)
        {
            self.game_over = true;
            return;
        }

        let ate = head == self.food;
        let snake = match self.role {
            Role::Host => &mut self.snake1,
            Role::Guest => &mut self.snake2,
        };
        snake.body.insert(0, head);
        if ate {
            snake.score += 1;
            self.food = Self::random_free_cell(&self.snake1, &self.snake2);
            if self.role == Role::Host {
                self.outbox.send(Message::FoodUpdate { food: self.food });
            }
        } else {
            snake.body.pop();
        }
    }
}

impl GameEngine for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if let Intent::Steer(direction) = intent {
            self.steer(direction);
        }
    }

    fn handle_message(&mut self, message: &Message, _now_ms: u64) {
        if self.stopped {
            return;
        }
        match message {
            Message::SnakeDirection { direction } => match self.role {
                Role::Host => self.snake2.direction = *direction,
                Role::Guest => self.snake1.direction = *direction,
            },
            Message::SnakeUpdate { snake } => {
                // Guest's locally advanced body, folded into the next
                // authoritative tick.
                if self.role == Role::Host {
                    self.snake2 = snake.clone();
                }
            }
            Message::SnakeState {
                snake1,
                snake2,
                food,
                game_over,
            } => {
                if self.role == Role::Guest {
                    self.snake1 = snake1.clone();
                    self.snake2 = snake2.clone();
                    self.food = *food;
                    self.game_over = *game_over;
                }
            }
            Message::FoodUpdate { food } => {
                if self.role == Role::Guest {
                    self.food = *food;
                }
            }
            _ => debug!("snake ignoring {:?}", message),
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if self.stopped || self.game_over {
            return;
        }
        if self.last_update_ms == 0 {
            self.last_update_ms = now_ms;
            return;
        }
        if now_ms.saturating_sub(self.last_update_ms) < SNAKE_MOVE_INTERVAL_MS {
            return;
        }

        self.advance_own_snake();

        match self.role {
            Role::Host => {
                // The snapshot carries game_over from the move just made,
                // so the guest learns about the ending too.
                self.outbox.send(Message::SnakeState {
                    snake1: self.snake1.clone(),
                    snake2: self.snake2.clone(),
                    food: self.food,
                    game_over: self.game_over,
                });
            }
            Role::Guest => {
                self.outbox.send(Message::SnakeUpdate {
                    snake: self.snake2.clone(),
                });
            }
        }

        self.last_update_ms = now_ms;
    }

    fn cleanup(&mut self) {
        self.stopped = true;
    }

    fn describe(&self) -> String {
        let status = if self.game_over {
            let winner = if self.snake1.score > self.snake2.score {
                "Blue wins!"
            } else if self.snake1.score < self.snake2.score {
                "Red wins!"
            } else {
                "It's a tie!"
            };
            format!("Game over! {}", winner)
        } else {
            "running".to_string()
        };
        format!(
            "blue {} (len {})  red {} (len {})  food ({}, {})  {}",
            self.snake1.score,
            self.snake1.body.len(),
            self.snake2.score,
            self.snake2.body.len(),
            self.food.x,
            self.food.y,
            status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn engine(role: Role) -> (SnakeGame, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SnakeGame::new(role, Outbox::new(tx)), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[test]
    fn test_initial_positions() {
        let (game, _rx) = engine(Role::Host);
        assert_eq!(game.snake1().head(), GridPos { x: 5, y: 10 });
        assert_eq!(game.snake1().direction, Direction::Right);
        assert_eq!(game.snake2().head(), GridPos { x: 15, y: 10 });
        assert_eq!(game.snake2().direction, Direction::Left);
        assert!(game.food().in_bounds(SNAKE_GRID_SIZE));
        assert!(!game.snake1().occupies(game.food()));
    }

    #[test]
    fn test_host_advances_own_snake_and_broadcasts() {
        let (mut game, mut rx) = engine(Role::Host);
        game.tick(1000);
        game.tick(1150);

        assert_eq!(game.snake1().head(), GridPos { x: 6, y: 10 });
        assert_eq!(game.snake1().body.len(), 1);

        let messages = drain(&mut rx);
        match &messages[..] {
            [Message::SnakeState {
                snake1, game_over, ..
            }] => {
                assert_eq!(snake1.head(), GridPos { x: 6, y: 10 });
                assert!(!game_over);
            }
            other => panic!("unexpected messages {:?}", other),
        }
    }

    #[test]
    fn test_tick_respects_move_interval() {
        let (mut game, mut rx) = engine(Role::Host);
        game.tick(1000);
        game.tick(1100); // under 150ms, no move
        assert_eq!(game.snake1().head(), GridPos { x: 5, y: 10 });
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_guest_advances_and_reports_own_snake() {
        let (mut game, mut rx) = engine(Role::Guest);
        game.tick(1000);
        game.tick(1150);

        assert_eq!(game.snake2().head(), GridPos { x: 14, y: 10 });

        let messages = drain(&mut rx);
        match &messages[..] {
            [Message::SnakeUpdate { snake }] => {
                assert_eq!(snake.head(), GridPos { x: 14, y: 10 });
            }
            other => panic!("unexpected messages {:?}", other),
        }
    }

    #[test]
    fn test_steer_relays_and_rejects_reversal() {
        let (mut game, mut rx) = engine(Role::Host);

        game.steer(Direction::Left); // reversal of Right
        assert_eq!(game.snake1().direction, Direction::Right);
        assert!(drain(&mut rx).is_empty());

        game.steer(Direction::Up);
        assert_eq!(game.snake1().direction, Direction::Up);
        match &drain(&mut rx)[..] {
            [Message::SnakeDirection { direction }] => {
                assert_eq!(*direction, Direction::Up);
            }
            other => panic!("unexpected messages {:?}", other),
        }
    }

    #[test]
    fn test_remote_direction_applies_to_other_snake() {
        let (mut game, _rx) = engine(Role::Host);
        game.handle_message(
            &Message::SnakeDirection {
                direction: Direction::Down,
            },
            0,
        );
        assert_eq!(game.snake2().direction, Direction::Down);
        assert_eq!(game.snake1().direction, Direction::Right);
    }

    #[test]
    fn test_eating_food_grows_and_rolls_new_food() {
        let (mut game, mut rx) = engine(Role::Host);
        game.food = GridPos { x: 6, y: 10 };
        game.tick(1000);
        game.tick(1150);

        assert_eq!(game.snake1().score, 1);
        assert_eq!(game.snake1().body.len(), 2);
        assert_ne!(game.food(), GridPos { x: 6, y: 10 });

        let messages = drain(&mut rx);
        assert!(messages
            .iter()
            .any(|m| matches!(m, Message::FoodUpdate { .. })));
    }

    #[test]
    fn test_wall_exit_ends_game_and_freezes_state() {
        let (mut game, mut rx) = engine(Role::Host);
        game.tick(1000);
        // Head starts at (5, 10); heading up it reaches y=0 in 10 moves
        // and the 11th leaves the grid.
        game.steer(Direction::Up);
        for i in 1..=11 {
            game.tick(1000 + i * 150);
        }

        assert!(game.is_game_over());
        assert_eq!(game.snake1().head(), GridPos { x: 5, y: 0 });

        let messages = drain(&mut rx);
        match messages.last() {
            Some(Message::SnakeState { game_over, .. }) => assert!(game_over),
            other => panic!("unexpected last message {:?}", other),
        }

        // No mutation or broadcast after game over.
        game.tick(1000 + 12 * 150);
        assert_eq!(game.snake1().head(), GridPos { x: 5, y: 0 });
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_host_folds_in_guest_body() {
        let (mut game, _rx) = engine(Role::Host);
        let mut reported = SnakeBody::new(GridPos { x: 12, y: 10 }, Direction::Left);
        reported.body.push(GridPos { x: 13, y: 10 });
        reported.score = 2;

        game.handle_message(
            &Message::SnakeUpdate {
                snake: reported.clone(),
            },
            0,
        );
        assert_eq!(game.snake2().head(), GridPos { x: 12, y: 10 });
        assert_eq!(game.snake2().score, 2);
    }

    #[test]
    fn test_guest_adopts_snapshot_wholesale() {
        let (mut game, _rx) = engine(Role::Guest);
        let snake1 = SnakeBody::new(GridPos { x: 8, y: 8 }, Direction::Down);
        let snake2 = SnakeBody::new(GridPos { x: 2, y: 2 }, Direction::Up);
        game.handle_message(
            &Message::SnakeState {
                snake1: snake1.clone(),
                snake2: snake2.clone(),
                food: GridPos { x: 1, y: 1 },
                game_over: true,
            },
            0,
        );

        assert_eq!(game.snake1().head(), GridPos { x: 8, y: 8 });
        assert_eq!(game.snake2().head(), GridPos { x: 2, y: 2 });
        assert_eq!(game.food(), GridPos { x: 1, y: 1 });
        assert!(game.is_game_over());
    }

    #[test]
    fn test_host_ignores_snapshot_and_food_updates() {
        let (mut game, _rx) = engine(Role::Host);
        let food_before = game.food();
        game.handle_message(
            &Message::FoodUpdate {
                food: GridPos { x: 0, y: 0 },
            },
            0,
        );
        // The host is the food authority; remote updates only apply on
        // the guest.
        assert_eq!(game.food(), food_before);
    }

    #[test]
    fn test_cleanup_stops_everything() {
        let (mut game, mut rx) = engine(Role::Host);
        game.tick(1000);
        game.cleanup();
        game.tick(1150);
        game.steer(Direction::Up);

        assert_eq!(game.snake1().head(), GridPos { x: 5, y: 10 });
        assert!(drain(&mut rx).is_empty());
    }
}
