use std::io::{self, BufRead, ErrorKind, Write};

use async_std::task;
use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use is_terminal::IsTerminal;

use crate::cancel::CancelSignal;
use crate::error::{Result, UiError};

/// Glyph echoed for each character typed into a masked prompt.
pub const MASK: char = '*';

/// Interactive input surface used by the selector and the credential
/// prompter. Every call races the given [`CancelSignal`].
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Asks the user to pick one of `items`, starting on `default`, and
    /// returns the chosen index.
    async fn select(
        &self,
        label: &str,
        items: &[String],
        default: usize,
        cancel: &CancelSignal,
    ) -> Result<usize>;

    /// Asks for a line of text. With `masked`, typed characters are echoed
    /// as [`MASK`].
    async fn input(
        &self,
        label: &str,
        default: &str,
        masked: bool,
        cancel: &CancelSignal,
    ) -> Result<String>;
}

/// Cancellable text input: `Prompt(label, default, masked, cancel)`.
pub async fn prompt(
    prompter: &dyn Prompter,
    label: &str,
    default: &str,
    masked: bool,
    cancel: &CancelSignal,
) -> Result<String> {
    if cancel.is_cancelled() {
        return Err(UiError::Cancelled);
    }
    prompter.input(label, default, masked, cancel).await
}

/// [`Prompter`] backed by the real terminal.
///
/// The terminal calls block, so they run on the blocking pool and get
/// abandoned if the signal fires first.
#[derive(Debug, Default, Clone)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    /// Runs a blocking terminal call, giving up on it if `cancel` fires.
    ///
    /// An abandoned call keeps its thread until the process exits.
    /// [`restore_terminal`] only undoes raw mode that crossterm enabled, so a
    /// dialoguer prompt abandoned mid-read (say, on SIGTERM) can leave the
    /// terminal raw until the shell resets it.
    async fn run_blocking<T, F>(&self, cancel: &CancelSignal, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        match cancel.run(task::spawn_blocking(f)).await {
            Some(result) => {
                if matches!(result, Err(UiError::Cancelled)) {
                    restore_terminal();
                }
                result
            }
            None => {
                restore_terminal();
                Err(UiError::Cancelled)
            }
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(
        &self,
        label: &str,
        items: &[String],
        default: usize,
        cancel: &CancelSignal,
    ) -> Result<usize> {
        if items.is_empty() {
            return Err(UiError::NoCandidates);
        }
        let default = default.min(items.len() - 1);
        let label = label.to_owned();
        let items = items.to_vec();
        self.run_blocking(cancel, move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(label)
                .items(&items)
                .default(default)
                .interact_opt()?
                .ok_or(UiError::Cancelled)
        })
        .await
    }

    async fn input(
        &self,
        label: &str,
        default: &str,
        masked: bool,
        cancel: &CancelSignal,
    ) -> Result<String> {
        let label = label.to_owned();
        let default = default.to_owned();
        self.run_blocking(cancel, move || {
            if !io::stdin().is_terminal() {
                return read_piped_line(&default);
            }
            if masked {
                return read_masked(&label, &default);
            }
            let theme = ColorfulTheme::default();
            let mut input = Input::<String>::with_theme(&theme);
            input.with_prompt(label).allow_empty(true);
            if !default.is_empty() {
                input.default(default);
            }
            Ok(input.interact_text()?)
        })
        .await
    }
}

/// Leaves crossterm's raw mode and shows the cursor again. Safe to call when
/// raw mode was never enabled.
fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let mut stderr = io::stderr();
    let _ = queue!(stderr, cursor::Show);
    let _ = writeln!(stderr);
    let _ = stderr.flush();
}

fn read_piped_line(default: &str) -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.is_empty() {
        Ok(default.to_owned())
    } else {
        Ok(line.to_owned())
    }
}

fn read_masked(label: &str, default: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{} {} {} ", "?".yellow(), label.bold(), "›".dark_grey())?;
    stderr.flush()?;
    terminal::enable_raw_mode()?;
    let read = read_masked_keys(&mut stderr);
    terminal::disable_raw_mode()?;
    writeln!(stderr)?;
    let input = read?;
    if input.is_empty() {
        Ok(default.to_owned())
    } else {
        Ok(input)
    }
}

fn read_masked_keys(out: &mut impl Write) -> Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Err(UiError::Cancelled),
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => {
                return Err(io::Error::new(ErrorKind::Interrupted, "prompt interrupted").into())
            }
            KeyCode::Enter => return Ok(input),
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    queue!(
                        out,
                        cursor::MoveLeft(1),
                        terminal::Clear(ClearType::UntilNewLine)
                    )?;
                    out.flush()?;
                }
            }
            KeyCode::Char(c) if !ctrl => {
                input.push(c);
                write!(out, "{MASK}")?;
                out.flush()?;
            }
            _ => {}
        }
    }
}
