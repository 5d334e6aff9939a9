//! Live countdown for open todos.
//!
//! Redraws once per second until every todo has expired or been completed, or
//! until the user presses `q`, `Esc` or `Ctrl+C`. The loop owns the tick; when
//! it returns nothing keeps running.

use chrono::TimeDelta;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{cursor, queue};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::managers::TodoList;
use crate::views::{self, TodoCountdown, Urgency};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] io::Error),
}

/// Fixed-interval schedule. Missed ticks are skipped rather than replayed.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now + interval,
        }
    }

    /// How long until the next tick is due
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Schedule the following tick
    pub fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }
}

/// Restores cooked mode and the cursor even if the loop bails out early
struct TerminalGuard {
    raw_mode_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, WatchError> {
        enable_raw_mode()?;
        queue!(io::stdout(), cursor::Hide)?;
        Ok(Self {
            raw_mode_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), WatchError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            let mut stdout = io::stdout();
            queue!(stdout, cursor::Show)?;
            stdout.flush()?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
            let _ = queue!(io::stdout(), cursor::Show);
            let _ = io::stdout().flush();
        }
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn urgency_marker(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Critical => "!!",
        Urgency::Warning => "! ",
        Urgency::Normal => "  ",
    }
}

const BAR_WIDTH: usize = 10;

/// Share of the time box left, as a fixed-width bar
fn progress_bar(left: f64) -> String {
    let filled = ((left * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// One display line per countdown
pub fn countdown_lines(
    countdowns: &[TodoCountdown<'_>],
    limit: TimeDelta,
    preview_chars: usize,
) -> Vec<String> {
    countdowns
        .iter()
        .map(|c| {
            format!(
                "{} {:>13} {}  {}",
                urgency_marker(c.urgency()),
                views::format_remaining(c.remaining),
                progress_bar(c.progress(limit)),
                views::preview(&c.todo.content, preview_chars)
            )
        })
        .collect()
}

/// Run the countdown until there is nothing left to watch or the user quits
pub fn watch_todos(
    todos: &TodoList<'_>,
    limit: TimeDelta,
    preview_chars: usize,
) -> Result<(), WatchError> {
    let mut guard = TerminalGuard::new()?;
    let mut stdout = io::stdout();
    let mut ticker = Ticker::new(Duration::from_secs(1), Instant::now());
    let mut drawn = 0u16;

    tracing::debug!("todo countdown started");
    'watch: loop {
        let active: Vec<TodoCountdown<'_>> = todos
            .countdowns(limit)
            .into_iter()
            .filter(|c| !c.todo.completed && !c.is_expired())
            .collect();

        if drawn > 0 {
            queue!(stdout, cursor::MoveUp(drawn))?;
        }
        queue!(stdout, cursor::MoveToColumn(0), terminal::Clear(ClearType::FromCursorDown))?;

        if active.is_empty() {
            write!(stdout, "No active todos.\r\n")?;
            stdout.flush()?;
            break;
        }

        let lines = countdown_lines(&active, limit, preview_chars);
        for line in &lines {
            write!(stdout, "{}\r\n", line)?;
        }
        write!(stdout, "(q to stop)\r\n")?;
        stdout.flush()?;
        drawn = u16::try_from(lines.len() + 1).unwrap_or(u16::MAX);

        // Wait out the rest of this second, still listening for quit keys
        while !ticker.is_due(Instant::now()) {
            if event::poll(ticker.until_next(Instant::now()))? {
                if let Event::Key(key) = event::read()? {
                    if is_quit_key(&key) {
                        break 'watch;
                    }
                }
            }
        }
        ticker.advance(Instant::now());
    }

    guard.restore()?;
    tracing::debug!("todo countdown stopped");
    Ok(())
}
