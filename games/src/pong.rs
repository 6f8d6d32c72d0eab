use crate::engine::{GameEngine, Intent, Outbox};
use rand::Rng;
use shared::{
    Ball, GameKind, Message, Paddle, PaddleKey, PongSnapshot, Role, FRAME_MS, MAX_BALL_SPEED,
    MAX_PADDLE_SPEED, PADDLE_ACCELERATION, PADDLE_DRAG, PADDLE_HEIGHT, PADDLE_WIDTH, PONG_HEIGHT,
    PONG_WIDTH,
};

/// Pong with a host-authoritative ball. Only the host integrates ball
/// physics and broadcasts snapshots; the guest adopts them (gated on
/// timestamp) and dead-reckons between ticks. Each peer simulates its own
/// paddle from held-key state and streams sampled positions the remote
/// eases toward, hiding one-way latency. Bit-identical state between the
/// peers is not a goal, perceptual consistency is.
pub struct Pong {
    role: Role,
    ball: Ball,
    left_paddle: Paddle,
    right_paddle: Paddle,
    key_up: bool,
    key_down: bool,
    paddle_speed: f32,
    target_paddle_y: f32,
    last_update_ms: u64,
    snapshot: Option<PongSnapshot>,
    outbox: Outbox,
    stopped: bool,
}

impl Pong {
    pub fn new(role: Role, outbox: Outbox) -> Self {
        let start_y = (PONG_HEIGHT - PADDLE_HEIGHT) / 2.0;
        Self {
            role,
            ball: Ball {
                x: PONG_WIDTH / 2.0,
                y: PONG_HEIGHT / 2.0,
                dx: 2.0,
                dy: 2.0,
            },
            left_paddle: Paddle {
                y: start_y,
                score: 0,
            },
            right_paddle: Paddle {
                y: start_y,
                score: 0,
            },
            key_up: false,
            key_down: false,
            paddle_speed: 0.0,
            target_paddle_y: start_y,
            last_update_ms: 0,
            snapshot: None,
            outbox,
            stopped: false,
        }
    }

    pub fn ball(&self) -> Ball {
        self.ball
    }

    pub fn left_paddle(&self) -> Paddle {
        self.left_paddle
    }

    pub fn right_paddle(&self) -> Paddle {
        self.right_paddle
    }

    pub fn paddle_speed(&self) -> f32 {
        self.paddle_speed
    }

    /// Accelerate-while-held / decay-otherwise model for the locally owned
    /// paddle, then ease toward the target and report the sampled position
    /// while still converging.
    fn update_own_paddle(&mut self, dt: f32, now_ms: u64) {
        if self.key_up {
            self.paddle_speed -= PADDLE_ACCELERATION * dt;
        } else if self.key_down {
            self.paddle_speed += PADDLE_ACCELERATION * dt;
        } else {
            self.paddle_speed *= PADDLE_DRAG;
        }
        self.paddle_speed = self.paddle_speed.clamp(-MAX_PADDLE_SPEED, MAX_PADDLE_SPEED);

        self.target_paddle_y = (self.target_paddle_y + self.paddle_speed * dt)
            .clamp(0.0, PONG_HEIGHT - PADDLE_HEIGHT);

        let target = self.target_paddle_y;
        let paddle = match self.role {
            Role::Host => &mut self.left_paddle,
            Role::Guest => &mut self.right_paddle,
        };
        paddle.y += (target - paddle.y) * 0.2 * dt;
        let y = paddle.y;

        if (target - y).abs() > 0.01 {
            self.outbox.send(Message::PaddlePosition {
                y,
                speed: self.paddle_speed,
                timestamp: now_ms,
            });
        }
    }

    fn update_ball(&mut self) {
        self.ball.x += self.ball.dx;
        self.ball.y += self.ball.dy;

        if self.ball.y <= 0.0 || self.ball.y >= PONG_HEIGHT {
            self.ball.dy = -self.ball.dy;
        }

        if self.ball.dx < 0.0
            && self.ball.x <= PADDLE_WIDTH
            && self.ball.y >= self.left_paddle.y
            && self.ball.y <= self.left_paddle.y + PADDLE_HEIGHT
        {
            self.bounce_off_paddle(self.left_paddle.y);
        }

        if self.ball.dx > 0.0
            && self.ball.x >= PONG_WIDTH - PADDLE_WIDTH
            && self.ball.y >= self.right_paddle.y
            && self.ball.y <= self.right_paddle.y + PADDLE_HEIGHT
        {
            self.bounce_off_paddle(self.right_paddle.y);
        }

        let speed = self.ball.speed();
        if speed > MAX_BALL_SPEED {
            let scale = MAX_BALL_SPEED / speed;
            self.ball.dx *= scale;
            self.ball.dy *= scale;
        }

        if self.ball.x <= 0.0 {
            self.right_paddle.score += 1;
            self.reset_ball();
        } else if self.ball.x >= PONG_WIDTH {
            self.left_paddle.score += 1;
            self.reset_ball();
        }
    }

    /// Reflects with english proportional to where the ball struck the
    /// paddle, plus spin from the paddle's own motion.
    fn bounce_off_paddle(&mut self, paddle_y: f32) {
        let relative_impact = ((self.ball.y - paddle_y) / PADDLE_HEIGHT) * 2.0 - 1.0;
        self.ball.dy += relative_impact * 2.0;
        self.ball.dx *= -1.02;
        self.ball.dy += self.paddle_speed * 0.2;
    }

    fn reset_ball(&mut self) {
        let mut rng = rand::thread_rng();
        self.ball = Ball {
            x: PONG_WIDTH / 2.0,
            y: PONG_HEIGHT / 2.0,
            dx: if rng.gen_bool(0.5) { 2.0 } else { -2.0 },
            dy: rng.gen_range(-1.5..1.5),
        };
    }
}

impl GameEngine for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn apply_intent(&mut self, intent: Intent, _now_ms: u64) {
        if self.stopped {
            return;
        }
        if let Intent::Paddle { key, pressed } = intent {
            match key {
                PaddleKey::Up => self.key_up = pressed,
                PaddleKey::Down => self.key_down = pressed,
            }
            self.outbox.send(Message::PaddleMove { key, pressed });
        }
    }

    fn handle_message(&mut self, message: &Message, now_ms: u64) {
        if self.stopped {
            return;
        }
        match message {
            Message::PaddlePosition {
                y,
                speed,
                timestamp,
            } => {
                // Extrapolate the sample to now, then ease toward it
                // instead of snapping.
                let elapsed = now_ms.saturating_sub(*timestamp) as f32;
                let predicted = y + speed * (elapsed / FRAME_MS);
                let paddle = match self.role {
                    Role::Host => &mut self.right_paddle,
                    Role::Guest => &mut self.left_paddle,
                };
                paddle.y += (predicted - paddle.y) * 0.3;
            }
            Message::PongState { state } => {
                if self.role == Role::Guest {
                    let stale = self
                        .snapshot
                        .map(|last| state.timestamp <= last.timestamp)
                        .unwrap_or(false);
                    if !stale {
                        self.snapshot = Some(*state);
                        self.ball = state.ball;
                        self.left_paddle = state.left_paddle;
                        self.right_paddle = state.right_paddle;
                    }
                }
            }
            // Key transitions are informational; motion comes from
            // PaddlePosition samples.
            Message::PaddleMove { .. } => {}
            _ => {}
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if self.stopped {
            return;
        }
        if self.last_update_ms == 0 {
            self.last_update_ms = now_ms;
            return;
        }
        let dt = now_ms.saturating_sub(self.last_update_ms) as f32 / FRAME_MS;

        self.update_own_paddle(dt, now_ms);

        if self.role == Role::Host {
            self.update_ball();
            let state = PongSnapshot {
                ball: self.ball,
                left_paddle: self.left_paddle,
                right_paddle: self.right_paddle,
                timestamp: now_ms,
            };
            self.snapshot = Some(state);
            self.outbox.send(Message::PongState { state });
        } else if let Some(snapshot) = self.snapshot {
            // Dead-reckon from the last authoritative snapshot until the
            // next one lands.
            let elapsed = now_ms.saturating_sub(snapshot.timestamp) as f32;
            let interpolation = (elapsed / FRAME_MS).min(1.0);
            self.ball.x = snapshot.ball.x + snapshot.ball.dx * interpolation;
            self.ball.y = snapshot.ball.y + snapshot.ball.dy * interpolation;
        }

        self.last_update_ms = now_ms;
    }

    fn cleanup(&mut self) {
        self.stopped = true;
    }

    fn describe(&self) -> String {
        format!(
            "{} - {}  ball ({:.0}, {:.0})  paddles L {:.0} R {:.0}",
            self.left_paddle.score,
            self.right_paddle.score,
            self.ball.x,
            self.ball.y,
            self.left_paddle.y,
            self.right_paddle.y
        )
    }
}
