//! Hidden password entry for the command-line sign-in and profile commands.
//!
//! On a terminal the password is read key by key in raw mode, so nothing is
//! echoed. Piped input falls back to reading one line.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use secrecy::SecretString;
use std::io::{self, BufRead, IsTerminal, Write};

/// Outcome of one key press while typing a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStep {
    Continue,
    Done,
    Cancelled,
}

/// Apply one key to `buffer`.
///
/// Enter finishes, Esc or Ctrl-C cancels, Ctrl-U clears the line.
pub fn apply_key(buffer: &mut String, key: KeyEvent) -> PasswordStep {
    if key.kind == KeyEventKind::Release {
        return PasswordStep::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => PasswordStep::Done,
        KeyCode::Esc => PasswordStep::Cancelled,
        KeyCode::Char('c') if ctrl => PasswordStep::Cancelled,
        KeyCode::Char('u') if ctrl => {
            buffer.clear();
            PasswordStep::Continue
        }
        KeyCode::Backspace => {
            buffer.pop();
            PasswordStep::Continue
        }
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            buffer.push(c);
            PasswordStep::Continue
        }
        _ => PasswordStep::Continue,
    }
}

/// Prompt on stderr and read a password without echoing it.
pub fn read_password(prompt: &str) -> io::Result<SecretString> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        return Ok(SecretString::from(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ));
    }

    terminal::enable_raw_mode()?;
    let result = read_keys();
    // Raw mode must be left even when reading failed
    let restored = terminal::disable_raw_mode();
    writeln!(stderr)?;
    restored?;
    result
}

fn read_keys() -> io::Result<SecretString> {
    let mut buffer = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut buffer, key) {
            PasswordStep::Continue => {}
            PasswordStep::Done => return Ok(SecretString::from(buffer)),
            PasswordStep::Cancelled => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "password entry cancelled",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn feed(keys: &[KeyEvent]) -> (String, PasswordStep) {
        let mut buffer = String::new();
        let mut step = PasswordStep::Continue;
        for k in keys {
            step = apply_key(&mut buffer, *k);
            if step != PasswordStep::Continue {
                break;
            }
        }
        (buffer, step)
    }

    #[test]
    fn typing_and_backspace() {
        let (buffer, step) = feed(&[
            key(KeyCode::Char('p')),
            key(KeyCode::Char('w')),
            key(KeyCode::Char('x')),
            key(KeyCode::Backspace),
            KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT),
            key(KeyCode::Enter),
        ]);
        assert_eq!(buffer, "pwD");
        assert_eq!(step, PasswordStep::Done);
    }

    #[test]
    fn ctrl_u_clears_and_ctrl_c_cancels() {
        let (buffer, step) = feed(&[key(KeyCode::Char('a')), ctrl('u'), key(KeyCode::Char('b'))]);
        assert_eq!(buffer, "b");
        assert_eq!(step, PasswordStep::Continue);

        let (_, step) = feed(&[key(KeyCode::Char('a')), ctrl('c')]);
        assert_eq!(step, PasswordStep::Cancelled);
        let (_, step) = feed(&[key(KeyCode::Esc)]);
        assert_eq!(step, PasswordStep::Cancelled);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut buffer = String::new();
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(apply_key(&mut buffer, release), PasswordStep::Continue);
        assert!(buffer.is_empty());

        let mut enter = key(KeyCode::Enter);
        enter.kind = KeyEventKind::Release;
        assert_eq!(apply_key(&mut buffer, enter), PasswordStep::Continue);
    }
}
