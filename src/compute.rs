//! Game logic.
//!
//! Entity-level helpers mutate the entity they are handed.  Session-level
//! functions (`init_session`, `tick`, `answer_quiz`, ...) take an immutable
//! reference to the current `GameSession` and return a brand-new one.
//! Side effects are limited to the injected RNG.

use rand::Rng;
use tracing::{debug, info};

use crate::constants::{
    BOSS_HIT_DAMAGE, COOLDOWN, ENEMY_PATCH_VEL, HEIGHT, PATCH_VEL, PLAYER_HEALTH, PLAYER_HEIGHT,
    PLAYER_HIT_DAMAGE, PLAYER_VEL, PLAYER_WIDTH, QUIZ_PENALTY, WIDTH,
};
use crate::entities::{
    Announcement, Boss, Controls, GameSession, GameState, Outcome, Palette, Player, Projectile,
    ProjectileKind, Rect, Ship,
};
use crate::levels::{boss_for_level, clue_fragment, quiz_for, QUIZ_TABLE};

pub const INCORRECT_FEEDBACK: &str = "INCORRECT! System health compromised. Try again.";

// ── Targets ──────────────────────────────────────────────────────────────────

/// Anything a projectile can damage.
pub trait Target {
    fn ship(&self) -> &Ship;
    fn ship_mut(&mut self) -> &mut Ship;
}

impl Target for Ship {
    fn ship(&self) -> &Ship {
        self
    }
    fn ship_mut(&mut self) -> &mut Ship {
        self
    }
}

impl Target for Player {
    fn ship(&self) -> &Ship {
        &self.ship
    }
    fn ship_mut(&mut self) -> &mut Ship {
        &mut self.ship
    }
}

impl Target for Boss {
    fn ship(&self) -> &Ship {
        &self.ship
    }
    fn ship_mut(&mut self) -> &mut Ship {
        &mut self.ship
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// AABB overlap.  Touching edges count.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x <= b.right() && b.x <= a.right() && a.y <= b.bottom() && b.y <= a.bottom()
}

// ── Projectiles ──────────────────────────────────────────────────────────────

fn projectile_size(kind: ProjectileKind) -> (i32, i32) {
    match kind {
        ProjectileKind::Patch => (5, 10),
        ProjectileKind::DataPacket => (8, 8),
    }
}

pub fn projectile_color(kind: ProjectileKind) -> Palette {
    match kind {
        ProjectileKind::Patch => Palette::Blue,
        ProjectileKind::DataPacket => Palette::Yellow,
    }
}

pub fn new_projectile(kind: ProjectileKind, x: i32, y: i32) -> Projectile {
    let (width, height) = projectile_size(kind);
    let velocity = match kind {
        ProjectileKind::Patch => -PATCH_VEL,
        ProjectileKind::DataPacket => ENEMY_PATCH_VEL,
    };
    Projectile {
        rect: Rect::new(x, y, width, height),
        kind,
        velocity,
    }
}

pub fn move_projectile(projectile: &mut Projectile) {
    projectile.rect.y += projectile.velocity;
}

/// `0` and `HEIGHT` themselves are still on screen.
pub fn is_off_screen(projectile: &Projectile) -> bool {
    !(0..=HEIGHT).contains(&projectile.rect.y)
}

pub fn collision(projectile: &Projectile, other: &Rect) -> bool {
    overlaps(&projectile.rect, other)
}

// ── Ships ────────────────────────────────────────────────────────────────────

pub fn cooldown(ship: &mut Ship) {
    ship.cooldown_counter = ship.cooldown_counter.saturating_sub(1);
}

/// Fire a projectile from the ship's top edge, centred horizontally.
/// Returns `false` (and does nothing) while the cooldown is running.
pub fn shoot(ship: &mut Ship, kind: ProjectileKind) -> bool {
    if ship.cooldown_counter != 0 {
        return false;
    }
    let (width, _) = projectile_size(kind);
    let x = ship.rect.center_x() - width / 2;
    ship.projectiles.push(new_projectile(kind, x, ship.rect.y));
    ship.cooldown_counter = COOLDOWN;
    true
}

/// Tick the cooldown, advance every projectile and resolve hits against a
/// single target.  Each hit deals `BOSS_HIT_DAMAGE`.
pub fn move_projectiles<T: Target>(ship: &mut Ship, target: &mut T) {
    cooldown(ship);

    let mut spent: Vec<bool> = Vec::with_capacity(ship.projectiles.len());
    for projectile in ship.projectiles.iter_mut() {
        move_projectile(projectile);
        if is_off_screen(projectile) {
            spent.push(true);
        } else if collision(projectile, &target.ship().rect) {
            let hit = target.ship_mut();
            hit.health -= BOSS_HIT_DAMAGE;
            debug!(health = hit.health, "defender hit");
            spent.push(true);
        } else {
            spent.push(false);
        }
    }

    let mut spent = spent.into_iter();
    ship.projectiles.retain(|_| !spent.next().unwrap_or(false));
}

/// Current health as a fraction of max.  Negative when health is.
pub fn health_ratio(ship: &Ship) -> f64 {
    if ship.max_health == 0 {
        return 0.0;
    }
    ship.health as f64 / ship.max_health as f64
}

// ── Player ───────────────────────────────────────────────────────────────────

pub fn new_player() -> Player {
    Player {
        ship: Ship {
            rect: Rect::new(
                WIDTH / 2 - PLAYER_WIDTH / 2,
                HEIGHT - 70,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            color: Palette::Green,
            health: PLAYER_HEALTH,
            max_health: PLAYER_HEALTH,
            cooldown_counter: 0,
            projectiles: Vec::new(),
        },
    }
}

fn step_left(player: &mut Player) {
    if player.ship.rect.x - PLAYER_VEL > 0 {
        player.ship.rect.x -= PLAYER_VEL;
    }
}

fn step_right(player: &mut Player) {
    if player.ship.rect.right() + PLAYER_VEL < WIDTH {
        player.ship.rect.x += PLAYER_VEL;
    }
}

/// Player version of `move_projectiles`: every live target a projectile
/// overlaps takes `PLAYER_HIT_DAMAGE`.  Targets whose health reaches zero
/// are taken out of `targets` and returned.
pub fn player_move_projectiles<T: Target>(player: &mut Player, targets: &mut Vec<T>) -> Vec<T> {
    cooldown(&mut player.ship);

    let mut defeated = vec![false; targets.len()];
    let mut spent: Vec<bool> = Vec::with_capacity(player.ship.projectiles.len());

    for projectile in player.ship.projectiles.iter_mut() {
        move_projectile(projectile);
        if is_off_screen(projectile) {
            spent.push(true);
            continue;
        }
        let mut hit_any = false;
        for (i, target) in targets.iter_mut().enumerate() {
            if defeated[i] || !collision(projectile, &target.ship().rect) {
                continue;
            }
            let ship = target.ship_mut();
            ship.health -= PLAYER_HIT_DAMAGE;
            debug!(health = ship.health, "target hit");
            hit_any = true;
            if ship.health <= 0 {
                defeated[i] = true;
            }
        }
        spent.push(hit_any);
    }

    let mut spent = spent.into_iter();
    player
        .ship
        .projectiles
        .retain(|_| !spent.next().unwrap_or(false));

    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(targets.len());
    for (target, down) in targets.drain(..).zip(defeated) {
        if down {
            removed.push(target);
        } else {
            kept.push(target);
        }
    }
    *targets = kept;
    removed
}

// ── Boss ─────────────────────────────────────────────────────────────────────

/// Slide sideways; on touching a wall reverse and drop half a body height.
pub fn move_boss(boss: &mut Boss) {
    let rect = &mut boss.ship.rect;
    rect.x += boss.vel_x;
    if rect.x <= 0 || rect.right() >= WIDTH {
        boss.vel_x = -boss.vel_x;
        rect.y += rect.height / 2;
    }
}

/// Roll `shoot_chance` and, on success, try to fire a data packet.
pub fn attempt_shoot(boss: &mut Boss, rng: &mut impl Rng) -> bool {
    let chance = boss.shoot_chance.clamp(0.0, 1.0);
    rng.gen_bool(chance) && shoot(&mut boss.ship, ProjectileKind::DataPacket)
}

// ── Session constructors ─────────────────────────────────────────────────────

/// A fresh session at level 1 with the first boss announced.
pub fn init_session() -> GameSession {
    let boss = boss_for_level(1);
    let announcements = boss
        .iter()
        .map(|b| Announcement::NewThreat { name: b.name.clone() })
        .collect();
    GameSession {
        state: GameState::Playing,
        level: 1,
        player: new_player(),
        boss,
        clues: Vec::new(),
        quiz: None,
        feedback: None,
        announcements,
        frame: 0,
    }
}

// ── Input-driven transitions (pure) ──────────────────────────────────────────

pub fn move_player_left(state: &GameSession) -> GameSession {
    let mut next = state.clone();
    step_left(&mut next.player);
    next
}

pub fn move_player_right(state: &GameSession) -> GameSession {
    let mut next = state.clone();
    step_right(&mut next.player);
    next
}

pub fn player_shoot(state: &GameSession) -> GameSession {
    let mut next = state.clone();
    shoot(&mut next.player.ship, ProjectileKind::Patch);
    next
}

/// Every collected clue fragment joined in collection order.
pub fn collected_secret(clues: &[String]) -> String {
    clues.iter().map(|c| clue_fragment(c)).collect()
}

fn finish(state: &mut GameSession, outcome: Outcome) {
    info!(?outcome, level = state.level, "session over");
    let announcement = match &outcome {
        Outcome::DefeatedByHealth => Announcement::Defeated,
        Outcome::DefeatedByBreach { threat } => Announcement::Breached {
            threat: threat.clone(),
        },
        Outcome::Victory { secret } => Announcement::Victory {
            secret: secret.clone(),
        },
    };
    state.announcements.push(announcement);
    state.state = GameState::Over(outcome);
}

/// Apply a 1/2/3 keypress on the quiz screen.  Anything else, or any
/// keypress outside the quiz, leaves the session untouched.
pub fn answer_quiz(state: &GameSession, choice: u8) -> GameSession {
    let quiz = match (&state.state, state.quiz) {
        (GameState::Quiz, Some(quiz)) => quiz,
        _ => return state.clone(),
    };
    if !(1..=3).contains(&choice) {
        return state.clone();
    }

    let mut next = state.clone();
    if choice != quiz.answer {
        next.feedback = Some(INCORRECT_FEEDBACK.to_string());
        next.player.ship.health = (next.player.ship.health - QUIZ_PENALTY).max(1);
        info!(choice, health = next.player.ship.health, "wrong quiz answer");
        return next;
    }

    info!(level = next.level, "quiz solved");
    next.clues.push(quiz.clue.to_string());
    next.announcements.push(Announcement::AnswerAccepted {
        clue: quiz.clue.to_string(),
    });
    next.quiz = None;
    next.feedback = None;

    match boss_for_level(next.level) {
        Some(boss) => {
            next.announcements.push(Announcement::NewThreat {
                name: boss.name.clone(),
            });
            next.boss = Some(boss);
            next.state = GameState::Playing;
        }
        None => {
            let secret = collected_secret(&next.clues);
            finish(&mut next, Outcome::Victory { secret });
        }
    }
    next
}

// ── Per-frame tick (nearly pure, RNG is injected) ──────────────────────────

/// Defeat, breach and boss-down checks, run before anything moves.
fn resolve_transitions(state: &mut GameSession) {
    if state.player.ship.health <= 0 {
        finish(state, Outcome::DefeatedByHealth);
        return;
    }
    if state.state != GameState::Playing {
        return;
    }
    let Some(boss) = &state.boss else {
        return;
    };

    if boss.ship.rect.bottom() >= HEIGHT {
        let threat = boss.name.clone();
        finish(state, Outcome::DefeatedByBreach { threat });
        return;
    }

    if boss.ship.health <= 0 {
        info!(boss = %boss.name, level = state.level, "boss defeated");
        state.boss = None;
        if (state.level as usize) < QUIZ_TABLE.len() {
            state.level += 1;
            state.quiz = quiz_for(state.level - 1);
            state.feedback = None;
            state.state = GameState::Quiz;
        } else {
            // The last boss has no quiz after it; its clue drops on defeat.
            if let Some(last) = quiz_for(state.level) {
                state.clues.push(last.clue.to_string());
            }
            let secret = collected_secret(&state.clues);
            finish(state, Outcome::Victory { secret });
        }
    }
}

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
pub fn tick(state: &GameSession, controls: Controls, rng: &mut impl Rng) -> GameSession {
    if matches!(state.state, GameState::Over(_)) {
        return state.clone();
    }

    let mut next = state.clone();
    next.frame += 1;

    resolve_transitions(&mut next);
    if next.state != GameState::Playing {
        return next;
    }

    // ── 1. Input ─────────────────────────────────────────────────────────────
    if controls.left {
        step_left(&mut next.player);
    }
    if controls.right {
        step_right(&mut next.player);
    }
    if controls.fire {
        shoot(&mut next.player.ship, ProjectileKind::Patch);
    }

    // ── 2. Player patches vs. the boss ───────────────────────────────────────
    // A boss knocked out here stays on the field until the next tick's
    // transition check.
    let mut targets: Vec<Boss> = next.boss.take().into_iter().collect();
    let defeated = player_move_projectiles(&mut next.player, &mut targets);
    next.boss = targets.into_iter().chain(defeated).next();

    // ── 3. Boss motion, fire and packets vs. the player ──────────────────────
    if let Some(boss) = next.boss.as_mut() {
        move_boss(boss);
        attempt_shoot(boss, rng);
        move_projectiles(&mut boss.ship, &mut next.player);
    }

    next
}
