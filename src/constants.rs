// World size (all simulation coordinates live in this space)
pub const WIDTH: i32 = 1000;
pub const HEIGHT: i32 = 600;

pub const FPS: u64 = 60;

// Movement
pub const PLAYER_VEL: i32 = 5;
pub const PATCH_VEL: i32 = 7;
pub const ENEMY_PATCH_VEL: i32 = 4;

/// Frames between shots, for every ship (half a second at 60 FPS).
pub const COOLDOWN: u32 = 30;

// Flat per-hit damage
pub const BOSS_HIT_DAMAGE: i32 = 15;
pub const PLAYER_HIT_DAMAGE: i32 = 10;

/// Health lost for a wrong quiz answer. Never drops the player below 1.
pub const QUIZ_PENALTY: i32 = 10;

// Player ship
pub const PLAYER_WIDTH: i32 = 50;
pub const PLAYER_HEIGHT: i32 = 40;
pub const PLAYER_HEALTH: i32 = 100;
