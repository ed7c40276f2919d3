use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use cyber_escape::compute::{answer_quiz, init_session, tick};
use cyber_escape::constants::FPS;
use cyber_escape::display::{self, Viewport};
use cyber_escape::entities::{Controls, GameSession, GameState};

#[derive(Parser)]
#[command(name = "cyber_escape")]
#[command(about = "Terminal boss-rush shooter with security quizzes", long_about = None)]
struct Cli {
    /// Seed for the boss fire RNG (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the log (level from RUST_LOG, default info)
    #[arg(long, value_name = "FILE", default_value = "cyber_escape.log")]
    log_file: PathBuf,
}

const FRAME: Duration = Duration::from_micros(1_000_000 / FPS);

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// 8 frames @ 60 FPS ≈ 133 ms, shorter than any OS key-repeat gap.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn held_controls(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Controls {
    let any = |keys: &[KeyCode]| keys.iter().any(|k| is_held(key_frame, k, frame));
    Controls {
        left: any(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
        right: any(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
        fire: any(&[KeyCode::Char(' ')]),
    }
}

/// Esc or Ctrl-C: the terminal's stand-in for closing the window.
fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Throw away input queued while a banner was up.  Returns true if a quit
/// request was among it.
fn drain_for_quit(rx: &mpsc::Receiver<Event>) -> bool {
    let mut quit = false;
    while let Ok(ev) = rx.try_recv() {
        if let Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. }) = ev {
            quit |= is_quit(code, modifiers);
        }
    }
    quit
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    display::render_menu(out, Viewport::current()?)?;

    // Block until any key is pressed
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. })) => {
                if is_quit(code, modifiers) {
                    return Ok(MenuResult::Quit);
                }
                return Ok(MenuResult::Start);
            }
            Ok(Event::Resize(..)) => display::render_menu(out, Viewport::current()?)?,
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Banners ───────────────────────────────────────────────────────────────────

/// Show every queued announcement in order.  Returns true if the player
/// asked to quit while they were on screen.
fn play_announcements<W: Write>(
    out: &mut W,
    state: &mut GameSession,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let pending = std::mem::take(&mut state.announcements);
    if pending.is_empty() {
        return Ok(false);
    }
    for announcement in &pending {
        debug!(?announcement, "banner");
        display::show_banner(
            out,
            Viewport::current()?,
            &display::banner_lines(announcement),
            display::banner_duration(announcement),
        )?;
    }
    Ok(drain_for_quit(rx))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs one session until it ends or the player quits.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and feed them to `tick` together, so
/// Space + A/D can be held at the same time.  Quiz answers are one-shot and
/// act on the press itself.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameSession,
    rx: &mpsc::Receiver<Event>,
    rng: &mut StdRng,
) -> std::io::Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        if play_announcements(out, state, rx)? {
            info!("quit during banner");
            return Ok(());
        }
        if matches!(state.state, GameState::Over(_)) {
            return Ok(());
        }

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    if is_quit(code, modifiers) {
                        info!("quit requested");
                        return Ok(());
                    }
                    key_frame.insert(code, frame);
                    if state.state == GameState::Quiz {
                        if let KeyCode::Char(c @ '1'..='3') = code {
                            *state = answer_quiz(state, c as u8 - b'0');
                        }
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // A correct answer queues banners; show them before play resumes.
        if !state.announcements.is_empty() {
            if play_announcements(out, state, rx)? {
                return Ok(());
            }
            key_frame.clear();
        }

        let controls = held_controls(&key_frame, frame);
        *state = tick(state, controls, rng);

        let vp = Viewport::current()?;
        match (&state.state, &state.quiz) {
            (GameState::Playing, _) => display::render(out, vp, state)?,
            (GameState::Quiz, Some(quiz)) => {
                display::render_quiz(out, vp, quiz, state.feedback.as_deref())?
            }
            _ => {}
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(path: &Path) -> Result<()> {
    // The terminal belongs to the game, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, "starting");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("terminal I/O failed")
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, rng: &mut StdRng) -> std::io::Result<()> {
    if let MenuResult::Quit = show_menu(out, rx)? {
        return Ok(());
    }

    let mut state = init_session();
    game_loop(out, &mut state, rx, rng)?;

    match &state.state {
        GameState::Over(outcome) => info!(?outcome, clues = state.clues.len(), "session ended"),
        _ => info!(level = state.level, "session abandoned"),
    }
    Ok(())
}
