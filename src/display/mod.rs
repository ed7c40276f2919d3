//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer, the terminal `Viewport` and an
//! immutable view of the session.  No game logic is performed; this module
//! only translates state into terminal commands.  World coordinates
//! (`WIDTH` x `HEIGHT`) are scaled onto the play area between the HUD row
//! and the hint row.

use std::io::Write;
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::compute::{health_ratio, projectile_color};
use crate::constants::{HEIGHT, WIDTH};
use crate::entities::{Announcement, GameSession, Palette, Projectile, ProjectileKind, QuizEntry, Rect, Ship};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::White;
const C_CLUE: Color = Color::Green;
const C_BAR_BG: Color = Color::Red;
const C_BAR_FG: Color = Color::Green;
const C_QUIZ_TITLE: Color = Color::Yellow;
const C_TEXT: Color = Color::White;
const C_HINT: Color = Color::DarkGrey;

fn color_of(palette: Palette) -> Color {
    match palette {
        Palette::Green => Color::Green,
        Palette::Red => Color::Red,
        Palette::Purple => Color::DarkMagenta,
        Palette::Orange => Color::DarkYellow,
        Palette::Blue => Color::Blue,
        Palette::Yellow => Color::Yellow,
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Terminal size the frame is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn current() -> std::io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Viewport { cols, rows })
    }

    /// Rows available to the world (everything but the HUD and hint rows).
    fn play_rows(&self) -> i32 {
        (self.rows as i32 - 2).max(1)
    }

    /// World x → terminal column.
    pub fn col(&self, x: i32) -> u16 {
        let cols = self.cols.max(1) as i32;
        (x * cols / WIDTH).clamp(0, cols - 1) as u16
    }

    /// World y → terminal row (row 0 is the HUD).
    pub fn row(&self, y: i32) -> u16 {
        let play = self.play_rows();
        (1 + y * play / HEIGHT).clamp(1, play) as u16
    }

    /// Columns covered by a world-space width, at least one.
    fn span(&self, width: i32) -> u16 {
        let cols = self.cols.max(1) as i32;
        (width * cols / WIDTH).max(1) as u16
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

/// Greedy word wrap.  A line keeps growing while `line + word + " "` stays
/// shorter than `max_width` columns; a single over-long word gets its own
/// line rather than being split.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = format!("{}{} ", current, word);
        if candidate.chars().count() < max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(current.trim().to_string());
            }
            current = format!("{} ", word);
        }
    }
    lines.push(current.trim().to_string());
    lines
}

fn print_centered<W: Write>(
    out: &mut W,
    vp: Viewport,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (vp.cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn finish_frame<W: Write>(out: &mut W, vp: Viewport) -> std::io::Result<()> {
    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, vp.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Playing screen ────────────────────────────────────────────────────────────

/// Render one complete gameplay frame.
pub fn render<W: Write>(out: &mut W, vp: Viewport, state: &GameSession) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, vp, state)?;
    draw_clues(out, state)?;

    draw_ship(out, vp, &state.player.ship)?;
    if let Some(boss) = &state.boss {
        draw_ship(out, vp, &boss.ship)?;
    }

    for projectile in &state.player.ship.projectiles {
        draw_projectile(out, vp, projectile)?;
    }
    if let Some(boss) = &state.boss {
        for projectile in &boss.ship.projectiles {
            draw_projectile(out, vp, projectile)?;
        }
    }

    draw_controls_hint(out, vp)?;
    finish_frame(out, vp)
}

fn draw_hud<W: Write>(out: &mut W, vp: Viewport, state: &GameSession) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("Defender Health: {}", state.player.ship.health)))?;

    if let Some(boss) = &state.boss {
        print_centered(out, vp, 0, &boss.name, color_of(boss.ship.color))?;
    }

    let level = format!("Threat Level: {}", state.level);
    let x = vp.cols.saturating_sub(level.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(x, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(level))?;
    Ok(())
}

fn draw_clues<W: Write>(out: &mut W, state: &GameSession) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_CLUE))?;
    out.queue(cursor::MoveTo(1, 2))?;
    out.queue(Print("--- DECRYPTED DATA ---"))?;
    for (i, clue) in state.clues.iter().enumerate() {
        out.queue(cursor::MoveTo(1, 3 + i as u16))?;
        out.queue(Print(clue))?;
    }
    Ok(())
}

fn fill_rect<W: Write>(out: &mut W, vp: Viewport, rect: &Rect, glyph: &str) -> std::io::Result<()> {
    let col = vp.col(rect.x);
    let top = vp.row(rect.y);
    let bottom = vp.row(rect.bottom() - 1).max(top);
    let cells = glyph.repeat(vp.span(rect.width) as usize);
    for row in top..=bottom {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print(&cells))?;
    }
    Ok(())
}

fn draw_ship<W: Write>(out: &mut W, vp: Viewport, ship: &Ship) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(color_of(ship.color)))?;
    fill_rect(out, vp, &ship.rect, "█")?;
    draw_health_bar(out, vp, ship)
}

/// Red background the width of the ship, green foreground scaled by the
/// health ratio.  A negative ratio draws no foreground at all.
fn draw_health_bar<W: Write>(out: &mut W, vp: Viewport, ship: &Ship) -> std::io::Result<()> {
    let row = vp.row(ship.rect.bottom() + 5);
    let col = vp.col(ship.rect.x);
    let cells = vp.span(ship.rect.width);
    let filled = (cells as f64 * health_ratio(ship)).round().clamp(0.0, cells as f64) as usize;

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_BAR_BG))?;
    out.queue(Print("▬".repeat(cells as usize)))?;

    if filled > 0 {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_BAR_FG))?;
        out.queue(Print("▬".repeat(filled)))?;
    }
    Ok(())
}

fn draw_projectile<W: Write>(out: &mut W, vp: Viewport, projectile: &Projectile) -> std::io::Result<()> {
    let glyph = match projectile.kind {
        ProjectileKind::Patch => "║",
        ProjectileKind::DataPacket => "•",
    };
    out.queue(cursor::MoveTo(vp.col(projectile.rect.x), vp.row(projectile.rect.y)))?;
    out.queue(style::SetForegroundColor(color_of(projectile_color(projectile.kind))))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, vp: Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, vp.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   ESC : Quit"))?;
    Ok(())
}

// ── Quiz screen ───────────────────────────────────────────────────────────────

/// Quiz screen: title, wrapped question, options, then the prompt or the
/// feedback from the last answer.
pub fn render_quiz<W: Write>(
    out: &mut W,
    vp: Viewport,
    quiz: &QuizEntry,
    feedback: Option<&str>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let mut row = vp.rows / 4;
    print_centered(out, vp, row, "== THREAT ASSESSMENT QUIZ ==", C_QUIZ_TITLE)?;
    row += 2;

    let max_width = (vp.cols as usize).saturating_sub(8).max(1);
    for line in wrap_text(quiz.question, max_width) {
        print_centered(out, vp, row, &line, C_TEXT)?;
        row += 1;
    }
    row += 1;

    for option in quiz.options {
        print_centered(out, vp, row, option, C_TEXT)?;
        row += 1;
    }
    row += 1;

    match feedback {
        Some(message) => {
            let color = if message.contains("INCORRECT") {
                Color::Red
            } else {
                Color::Green
            };
            print_centered(out, vp, row, message, color)?;
        }
        None => print_centered(out, vp, row, "Press 1, 2, or 3 to answer.", C_TEXT)?,
    }

    finish_frame(out, vp)
}

// ── Title screen ──────────────────────────────────────────────────────────────

pub fn render_menu<W: Write>(out: &mut W, vp: Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let cy = vp.rows / 2;
    print_centered(out, vp, cy.saturating_sub(4), "CYBER ESCAPE", Color::Green)?;
    print_centered(out, vp, cy + 1, "Press any key to begin...", C_TEXT)?;
    print_centered(
        out,
        vp,
        cy + 3,
        "← → / A D : Move   SPACE : Shoot   1 2 3 : Answer   ESC : Quit",
        C_HINT,
    )?;
    finish_frame(out, vp)
}

// ── Announcement banners ──────────────────────────────────────────────────────

pub fn banner_lines(announcement: &Announcement) -> Vec<String> {
    match announcement {
        Announcement::NewThreat { name } => vec![
            "WARNING! New Threat Detected:".to_string(),
            format!("--- {} ---", name.to_uppercase()),
        ],
        Announcement::AnswerAccepted { clue } => vec![
            "ANSWER ACCEPTED: Correct!".to_string(),
            "New Data Fragment Decrypted:".to_string(),
            clue.clone(),
            "Stand by for the next threat...".to_string(),
        ],
        Announcement::Defeated => vec!["DEFENDER DEFEATED".to_string(), "GAME OVER".to_string()],
        Announcement::Breached { threat } => vec![
            format!("THREAT {} COMPROMISED SYSTEM", threat.to_uppercase()),
            "GAME OVER".to_string(),
        ],
        Announcement::Victory { secret } => vec![
            "ALL THREATS NEUTRALIZED! You have escaped the lab!".to_string(),
            format!("Secret: {}", secret),
        ],
    }
}

pub fn banner_duration(announcement: &Announcement) -> Duration {
    let ms = match announcement {
        Announcement::NewThreat { .. } => 2000,
        Announcement::AnswerAccepted { .. } => 3000,
        Announcement::Defeated | Announcement::Breached { .. } => 4000,
        Announcement::Victory { .. } => 5000,
    };
    Duration::from_millis(ms)
}

/// Draw centred lines on a blank screen, then block for `duration`.
/// Nothing is simulated or polled while the banner is up.
pub fn show_banner<W: Write>(
    out: &mut W,
    vp: Viewport,
    lines: &[String],
    duration: Duration,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let height = lines.len() as u16 * 2;
    let start = (vp.rows / 2).saturating_sub(height / 2);
    for (i, line) in lines.iter().enumerate() {
        print_centered(out, vp, start + i as u16 * 2, line, C_TEXT)?;
    }
    finish_frame(out, vp)?;

    if !duration.is_zero() {
        thread::sleep(duration);
    }
    Ok(())
}
