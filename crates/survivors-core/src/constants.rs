//! Simulation constants and tuning parameters.
//!
//! All durations are milliseconds, distances are arena pixels, speeds are
//! pixels per second.

/// Nominal tick rate of the headless game loop (Hz).
pub const TICK_RATE: u32 = 60;

/// Nominal tick duration (ms).
pub const DEFAULT_TICK_MS: f64 = 1000.0 / TICK_RATE as f64;

// --- Arena ---

/// Default arena width.
pub const ARENA_WIDTH: f64 = 1280.0;

/// Default arena height.
pub const ARENA_HEIGHT: f64 = 720.0;

/// Keep-out margin for random enemy spawn positions.
pub const SPAWN_MARGIN: f64 = 30.0;

// --- Player ---

pub const PLAYER_BASE_MAX_HEALTH: f64 = 100.0;
pub const PLAYER_BASE_SPEED: f64 = 200.0;
pub const PLAYER_BASE_ATTACK_SPEED: f64 = 1.0;
pub const PLAYER_BASE_PICKUP_RANGE: f64 = 100.0;
pub const PLAYER_BASE_XP_GAIN: f64 = 1.0;

/// Player collision radius.
pub const PLAYER_RADIUS: f64 = 12.0;

// --- Combat ---

/// Armor above this value gives no further mitigation (percent).
pub const ARMOR_CAP: f64 = 75.0;

/// Dodge chance above this value is ignored (percent).
pub const DODGE_CAP: f64 = 60.0;

/// Damage multiplier on a critical hit.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Invulnerability window after a successful dodge.
pub const DODGE_IFRAME_MS: f64 = 200.0;

/// Shortest invulnerability window after contact damage (seconds).
pub const IFRAME_MIN_SECS: f64 = 0.2;

/// Longest invulnerability window after contact damage (seconds).
pub const IFRAME_MAX_SECS: f64 = 0.4;

/// Damage, as a percent of max health, that earns the longest window.
pub const IFRAME_FULL_DAMAGE_PERCENT: f64 = 15.0;

// --- Health regeneration ---

/// Seconds per healed point at one point of regen, before scaling.
pub const REGEN_BASE_INTERVAL_MS: f64 = 5000.0;

/// Divisor of the regen scaling curve.
pub const REGEN_SCALING: f64 = 2.25;

// --- Weapon ---

pub const WEAPON_BASE_DAMAGE: f64 = 10.0;

// --- Projectiles ---

pub const PROJECTILE_SPEED: f64 = 400.0;
pub const PROJECTILE_MAX_RANGE: f64 = 800.0;
pub const PROJECTILE_RADIUS: f64 = 4.0;

// --- Enemies ---

pub const ENEMY_MAX_HEALTH: f64 = 50.0;
pub const ENEMY_SPEED: f64 = 60.0;
pub const ENEMY_CONTACT_DAMAGE: f64 = 10.0;
pub const ENEMY_RADIUS: f64 = 12.0;

/// Currency dropped by each killed enemy.
pub const ENEMY_CURRENCY_DROP: u32 = 10;

// --- Currency drops ---

pub const CURRENCY_RADIUS: f64 = 6.0;
pub const CURRENCY_MAGNET_SPEED: f64 = 150.0;

/// Bob angular speed (radians per second).
pub const CURRENCY_BOB_SPEED: f64 = 2.0;

/// Bob amplitude (pixels).
pub const CURRENCY_BOB_AMOUNT: f64 = 3.0;

// --- Rounds and waves ---

/// Time before a wave is forcibly replaced by the next one.
pub const WAVE_TIMER_MS: f64 = 10_000.0;

/// Pause between a full clear and the next wave.
pub const GRACE_PERIOD_MS: f64 = 2000.0;

/// Enemies in the first wave of round 1.
pub const BASE_ENEMIES_PER_WAVE: u32 = 5;

/// Extra enemies per wave for each round after the first.
pub const ENEMIES_PER_WAVE_GROWTH: u32 = 2;

/// Round duration breakpoints: (last round inclusive, seconds).
pub const ROUND_DURATION_TABLE: [(u32, f64); 3] = [(5, 30.0), (10, 45.0), (15, 60.0)];

/// Round duration after the last breakpoint (seconds).
pub const ROUND_DURATION_MAX_SECS: f64 = 90.0;

/// Total time to spawn a full wave: (last round inclusive, ms).
pub const WAVE_SPAWN_TIME_TABLE: [(u32, f64); 4] =
    [(3, 2000.0), (6, 2500.0), (10, 3000.0), (15, 4000.0)];

/// Total wave spawn time after the last breakpoint (ms).
pub const WAVE_SPAWN_TIME_MAX_MS: f64 = 5000.0;

// --- Shop ---

/// Number of items offered per shop visit.
pub const SHOP_OFFER_COUNT: usize = 4;

pub const SHOP_REROLL_COST: u32 = 10;

/// Cost of asking the fusion service for a new item.
pub const CRAFT_COST: u32 = 50;
