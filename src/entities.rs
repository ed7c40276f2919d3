//! All game entity types. Pure data, no logic.

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned box in world units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }
}

/// Colours an entity can be drawn in.  The renderer maps these to
/// terminal colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Green,
    Red,
    Purple,
    Orange,
    Blue,
    Yellow,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Fired upward by the player.
    Patch,
    /// Fired downward by a boss.
    DataPacket,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub rect: Rect,
    pub kind: ProjectileKind,
    /// Vertical pixels per tick (negative = upward).
    pub velocity: i32,
}

// ── Ships ─────────────────────────────────────────────────────────────────────

/// Shared state of every health-bearing, projectile-firing entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub rect: Rect,
    pub color: Palette,
    /// Signed: a hit can leave it below zero until the next defeat check.
    pub health: i32,
    pub max_health: i32,
    pub cooldown_counter: u32,
    pub projectiles: Vec<Projectile>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub ship: Ship,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub ship: Ship,
    pub name: String,
    /// Horizontal pixels per tick; the sign flips on every wall bounce.
    pub vel_x: i32,
    /// Per-tick probability of attempting a shot.
    pub shoot_chance: f64,
}

// ── Quiz ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuizEntry {
    pub question: &'static str,
    pub options: [&'static str; 3],
    /// Correct option, 1-based.
    pub answer: u8,
    pub clue: &'static str,
}

// ── Session state ─────────────────────────────────────────────────────────────

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    DefeatedByHealth,
    DefeatedByBreach { threat: String },
    /// `secret` is every collected clue fragment joined in order.
    Victory { secret: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Quiz,
    Over(Outcome),
}

/// A full-screen banner the state machine wants shown.  Queued on the
/// session and drained by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Announcement {
    NewThreat { name: String },
    AnswerAccepted { clue: String },
    Defeated,
    Breached { threat: String },
    Victory { secret: String },
}

/// Keys held during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire session.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub state: GameState,
    pub level: u32,
    pub player: Player,
    /// The single active boss, if any.
    pub boss: Option<Boss>,
    /// Clue strings in the order they were decrypted.
    pub clues: Vec<String>,
    pub quiz: Option<QuizEntry>,
    /// Shown on the quiz screen in place of the prompt.
    pub feedback: Option<String>,
    pub announcements: Vec<Announcement>,
    pub frame: u64,
}
