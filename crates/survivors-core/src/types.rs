//! Fundamental geometric and simulation types.
//!
//! Arena coordinates follow screen conventions: x grows to the right,
//! y grows downward, angles are measured with `atan2(dy, dx)`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position in arena space (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// 2D velocity in arena space (pixels per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

/// Simulation clock. Monotonic, driven by the external tick delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of simulated ticks.
    pub tick: u64,
    /// Elapsed simulated time in milliseconds.
    pub now_ms: f64,
}

/// Rectangular arena, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub width: f64,
    pub height: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }

    /// Angle (radians) of the line from this position to `other`.
    pub fn angle_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Offset this position by `velocity` integrated over `dt_secs`.
    pub fn advanced(&self, velocity: &Velocity, dt_secs: f64) -> Position {
        Position::from(self.as_dvec2() + velocity.as_dvec2() * dt_secs)
    }

    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl From<DVec2> for Position {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Velocity of magnitude `speed` along the heading from `from` to `to`.
    ///
    /// Uses the same angle construction as [`Position::angle_to`], so a
    /// zero-length heading points along +x rather than producing NaN.
    pub fn toward(from: &Position, to: &Position, speed: f64) -> Self {
        let angle = from.angle_to(to);
        Self {
            x: angle.cos() * speed,
            y: angle.sin() * speed,
        }
    }

    /// Speed magnitude.
    pub fn speed(&self) -> f64 {
        self.as_dvec2().length()
    }

    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl From<DVec2> for Velocity {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl SimTime {
    /// Advance the clock by one tick of `delta_ms`.
    pub fn advance(&mut self, delta_ms: f64) {
        self.tick += 1;
        self.now_ms += delta_ms;
    }
}

impl ArenaBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a position inside the arena, keeping `margin` from each edge.
    pub fn clamp(&self, pos: Position, margin: f64) -> Position {
        let max_x = (self.width - margin).max(margin);
        let max_y = (self.height - margin).max(margin);
        Position::new(pos.x.clamp(margin, max_x), pos.y.clamp(margin, max_y))
    }
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            width: crate::constants::ARENA_WIDTH,
            height: crate::constants::ARENA_HEIGHT,
        }
    }
}
