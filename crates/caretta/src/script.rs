//! Replay scripts: one input event per line.
//!
//! ```text
//! # card number, typed slowly
//! type 4242
//! wait 700
//! type 4242
//! backspace 2
//! undo
//! show
//! ```

use std::io::Write;

use anyhow::{bail, Context, Result};
use caretta_core::{Editor, ManualClock, MemorySurface};

/// A single script line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Types the text one char at a time.
    Type(String),
    /// Writes the text in one edit.
    Paste(String),
    /// Writes a JSON value, which may be rejected.
    Json(serde_json::Value),
    Backspace(usize),
    Cut,
    Select(usize, usize),
    Undo(usize),
    Redo(usize),
    /// Advances the clock, in milliseconds.
    Wait(i64),
    Show,
    Records,
}

/// Expands `\n`, `\t`, `\s` (space) and `\\` in script text.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn count(arg: Option<&str>) -> Result<usize> {
    match arg {
        None => Ok(1),
        Some(n) => n.trim().parse().with_context(|| format!("Invalid count: {n}")),
    }
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
        return Ok(None);
    }
    let trimmed = trimmed.trim_start();
    let (name, arg) = match trimmed.split_once(' ') {
        Some((name, arg)) => (name, Some(arg)),
        None => (trimmed, None),
    };

    let command = match name {
        "type" => Command::Type(unescape(arg.unwrap_or_default())),
        "paste" => Command::Paste(unescape(arg.unwrap_or_default())),
        "json" => {
            let raw = arg.context("json needs a value")?;
            Command::Json(serde_json::from_str(raw).context("Invalid JSON value")?)
        }
        "backspace" => Command::Backspace(count(arg)?),
        "cut" => Command::Cut,
        "select" => {
            let raw = arg.context("select needs START END")?;
            let mut parts = raw.split_whitespace();
            let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
                bail!("select needs START END, got: {raw}");
            };
            Command::Select(
                start.parse().context("Invalid select start")?,
                end.parse().context("Invalid select end")?,
            )
        }
        "undo" => Command::Undo(count(arg)?),
        "redo" => Command::Redo(count(arg)?),
        "wait" => {
            let raw = arg.context("wait needs a duration in ms")?;
            Command::Wait(raw.trim().parse().context("Invalid wait duration")?)
        }
        "show" => Command::Show,
        "records" => Command::Records,
        other => bail!("Unknown command: {other}"),
    };
    Ok(Some(command))
}

/// Parses a whole script.
///
/// # Errors
///
/// Returns the first line that does not parse, with its line number.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(command) =
            parse_line(line).with_context(|| format!("line {}: {line}", index + 1))?
        {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Drives an editor with script commands, printing to `out`.
pub struct Runner<W: Write> {
    editor: Editor<MemorySurface>,
    clock: ManualClock,
    out: W,
}

impl<W: Write> Runner<W> {
    /// `clock` must be the clock the editor was built with.
    pub fn new(mut editor: Editor<MemorySurface>, clock: ManualClock, out: W) -> Self {
        editor.focus();
        Self { editor, clock, out }
    }

    /// The editor being driven.
    pub fn editor(&self) -> &Editor<MemorySurface> {
        &self.editor
    }

    /// Runs one command. Rejected writes are reported and do not stop
    /// the script.
    pub fn run(&mut self, command: &Command) -> Result<()> {
        tracing::trace!(?command, "Running");
        match command {
            Command::Type(text) => {
                for ch in text.chars() {
                    self.write(ch)?;
                }
            }
            Command::Paste(text) => {
                let result = self.editor.paste(text).map(|_| ());
                self.settle(result)?;
            }
            Command::Json(value) => self.write(value.clone())?,
            Command::Backspace(n) => {
                for _ in 0..*n {
                    let result = self.editor.backspace().map(|_| ());
                    self.settle(result)?;
                }
            }
            Command::Cut => {
                let result = self.editor.cut();
                if let Ok(removed) = &result {
                    writeln!(self.out, "cut {removed:?}")?;
                }
                self.settle(result.map(|_| ()))?;
            }
            Command::Select(start, end) => self.editor.set_selection_range(*start, *end),
            Command::Undo(n) => {
                for _ in 0..*n {
                    let _ = self.editor.undo();
                    self.editor.after_render();
                }
            }
            Command::Redo(n) => {
                for _ in 0..*n {
                    let _ = self.editor.redo();
                    self.editor.after_render();
                }
            }
            Command::Wait(ms) => self.clock.advance(*ms),
            Command::Show => self.show()?,
            Command::Records => {
                for record in self.editor.records() {
                    writeln!(self.out, "{}", serde_json::to_string(record)?)?;
                }
            }
        }
        Ok(())
    }

    /// Runs `commands` in order, stopping at the first output error.
    pub fn run_all(&mut self, commands: &[Command]) -> Result<()> {
        for command in commands {
            self.run(command)?;
        }
        Ok(())
    }

    /// Prints the value, the logical caret and the rendered text.
    pub fn show(&mut self) -> Result<()> {
        let selection = self.editor.selection_range();
        writeln!(
            self.out,
            "{:?} caret={}..{} rendered={:?}",
            self.editor.value(),
            selection.absolute.start,
            selection.absolute.end,
            self.editor.surface().rendered_text(),
        )?;
        Ok(())
    }

    fn write(&mut self, content: impl Into<caretta_core::Content>) -> Result<()> {
        let result = self.editor.write(content, false, None).map(|_| ());
        self.settle(result)
    }

    fn settle(&mut self, result: Result<(), caretta_core::EditError>) -> Result<()> {
        if let Err(e) = result {
            tracing::warn!("Write rejected: {e}");
            writeln!(self.out, "error: {e}")?;
        }
        self.editor.after_render();
        Ok(())
    }
}
