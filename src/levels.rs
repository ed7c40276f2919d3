//! Static content: boss presets and the quiz table.

use crate::constants::WIDTH;
use crate::entities::{Boss, Palette, QuizEntry, Rect, Ship};

pub const QUIZ_TABLE: [QuizEntry; 3] = [
    QuizEntry {
        question: "The spreading entity must be contained. What boundary stops unauthorized internal movement?",
        options: ["1. Strong Passwords", "2. Network Firewall", "3. Antivirus Software"],
        answer: 2,
        clue: "Clue 1: 'Always_use_'",
    },
    QuizEntry {
        question: "The deceiver passed as friend. What policy trusts nothing and verifies everything?",
        options: ["1. Least Privilege", "2. Defense in Depth", "3. Zero Trust"],
        answer: 3,
        clue: "Clue 2: 'strong_passwords_'",
    },
    QuizEntry {
        question: "The vault is sealed, the key is lost. What backup plan restores the lost data?",
        options: ["1. Pay the ransom", "2. Regular Data Backups", "3. Change your IP address"],
        answer: 2,
        clue: "Clue 3: '&_2FA!'",
    },
];

/// Quiz unlocked by beating `level`'s boss (1-based).
pub fn quiz_for(level: u32) -> Option<QuizEntry> {
    let index = (level as usize).checked_sub(1)?;
    QUIZ_TABLE.get(index).copied()
}

fn boss(
    width: i32,
    height: i32,
    color: Palette,
    health: i32,
    name: &str,
    vel_x: i32,
    shoot_chance: f64,
) -> Boss {
    Boss {
        ship: Ship {
            rect: Rect::new(WIDTH / 2 - width / 2, 50, width, height),
            color,
            health,
            max_health: health,
            cooldown_counter: 0,
            projectiles: Vec::new(),
        },
        name: name.to_string(),
        vel_x,
        shoot_chance,
    }
}

/// The boss guarding `level`, or `None` once the content runs out.
pub fn boss_for_level(level: u32) -> Option<Boss> {
    match level {
        1 => Some(boss(70, 50, Palette::Red, 100, "Worm", 4, 0.01)),
        2 => Some(boss(80, 60, Palette::Purple, 200, "Trojan", 5, 0.03)),
        3 => Some(boss(100, 70, Palette::Orange, 300, "Ransomware", 6, 0.05)),
        _ => None,
    }
}

/// The quoted part of a clue, e.g. `Always_use_` from `Clue 1: 'Always_use_'`.
/// Clues without quotes are returned whole.
pub fn clue_fragment(clue: &str) -> &str {
    match (clue.find('\''), clue.rfind('\'')) {
        (Some(start), Some(end)) if end > start => &clue[start + 1..end],
        _ => clue,
    }
}
