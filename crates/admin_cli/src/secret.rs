//! Masked password entry on the controlling terminal.

use std::{error::Error, io::Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};

type Res<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Shortest password the engine accepts.
const MIN_LEN: usize = 4;
const ATTEMPTS: usize = 3;

struct RawMode;

impl RawMode {
    fn enable() -> Res<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn say(line: &str) -> Res<()> {
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line),
        Print("\r\n")
    )?;
    err.flush()?;
    Ok(())
}

/// Reads one line without echoing it; each character shows as `*`.
fn read_masked(label: &str) -> Res<String> {
    let _raw = RawMode::enable()?;
    let mut err = std::io::stderr();
    execute!(
        err,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(label)
    )?;
    err.flush()?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => break,
            KeyCode::Esc => {
                execute!(err, Print("\r\n"))?;
                return Err("cancelled".into());
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(err, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace if secret.pop().is_some() => {
                execute!(err, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                secret.push(ch);
                execute!(err, Print("*"))?;
            }
            _ => continue,
        }
        err.flush()?;
    }

    execute!(err, Print("\r\n"))?;
    err.flush()?;
    Ok(secret)
}

/// Asks for a new password and its confirmation.
pub fn new_password() -> Res<String> {
    for _ in 0..ATTEMPTS {
        let first = read_masked("Password: ")?;
        if first.chars().count() < MIN_LEN {
            say(&format!("Password must be at least {MIN_LEN} characters."))?;
            continue;
        }
        if read_masked("Confirm password: ")? == first {
            return Ok(first);
        }
        say("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}
