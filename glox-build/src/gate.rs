//! The output gate. Generated files may carry manual edits, so nothing is
//! written, and nothing is formatted, without the operator agreeing first.
//!
//! ```text
//! Idle -> AwaitingWriteConfirmation -> Written -> AwaitingFormatConfirmation -> Formatted
//!                  |              |                          |                   |
//!                  +-> Aborted    +-> WriteFailed            +-> Aborted         +-> FormatFailed
//! ```

use std::{
  collections::VecDeque,
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
};

use crate::{
  error::{FormatError, GateError},
  sourcegen::{self, Formatter},
};

/// The two points at which the gate asks for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Write,
  Format,
}

/// Asks the operator to confirm an action.
pub trait Confirm {
  fn confirm(&mut self, step: Step, prompt: &str) -> io::Result<bool>;
}

/// Uses a different strategy for each step, so that for example writing can be
/// confirmed up front while formatting is still asked about.
#[derive(Debug, Default)]
pub struct PerStep<W, F> {
  pub write:  W,
  pub format: F,
}

impl<W: Confirm, F: Confirm> Confirm for PerStep<W, F> {
  fn confirm(&mut self, step: Step, prompt: &str) -> io::Result<bool> {
    match step {
      Step::Write => self.write.confirm(step, prompt),
      Step::Format => self.format.confirm(step, prompt),
    }
  }
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
  fn confirm(&mut self, step: Step, prompt: &str) -> io::Result<bool> {
    (**self).confirm(step, prompt)
  }
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
  fn confirm(&mut self, step: Step, prompt: &str) -> io::Result<bool> {
    (**self).confirm(step, prompt)
  }
}

/// Confirms everything. Used for unattended runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

/// Declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDecline;

impl Confirm for AlwaysConfirm {
  fn confirm(&mut self, _: Step, _: &str) -> io::Result<bool> { Ok(true) }
}

impl Confirm for AlwaysDecline {
  fn confirm(&mut self, _: Step, _: &str) -> io::Result<bool> { Ok(false) }
}

/// Answers prompts from a fixed list, and declines once the list runs out.
/// Every prompt is recorded.
#[derive(Debug, Default)]
pub struct Scripted {
  answers:     VecDeque<bool>,
  pub prompts: Vec<String>,
}

impl Scripted {
  pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
    Scripted { answers: answers.into_iter().collect(), prompts: vec![] }
  }
}

impl Confirm for Scripted {
  fn confirm(&mut self, _: Step, prompt: &str) -> io::Result<bool> {
    self.prompts.push(prompt.to_string());
    Ok(self.answers.pop_front().unwrap_or(false))
  }
}

/// Prompts on a writer and reads the answer from a line of input. Only `y` or
/// `yes` confirm; anything else, including end of input, declines.
pub struct Console<R, W> {
  input:  R,
  output: W,
}

impl Console<io::StdinLock<'static>, io::Stderr> {
  pub fn stdio() -> Self { Console::new(io::stdin().lock(), io::stderr()) }
}

impl<R: BufRead, W: Write> Console<R, W> {
  pub fn new(input: R, output: W) -> Self { Console { input, output } }
}

impl<R: BufRead, W: Write> Confirm for Console<R, W> {
  fn confirm(&mut self, _: Step, prompt: &str) -> io::Result<bool> {
    write!(self.output, "{prompt} [y/N]: ")?;
    self.output.flush()?;

    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      writeln!(self.output)?;
      return Ok(false);
    }
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
  Idle,
  AwaitingWriteConfirmation,
  Written,
  AwaitingFormatConfirmation,
  Formatted,
  /// The file was written, but the formatter failed.
  FormatFailed,
  /// Writing the file failed. The previous contents are still in place.
  WriteFailed,
  Aborted,
}

#[derive(Debug)]
pub struct GateOutcome {
  pub path:         PathBuf,
  /// Where the gate stopped. `Aborted` with `written` set means the file was
  /// written but not formatted.
  pub state:        GateState,
  /// Every state the gate passed through for this file, ending with `state`.
  pub trail:        Vec<GateState>,
  pub written:      bool,
  /// Set when the formatter ran and failed. This does not fail the run.
  pub format_error: Option<FormatError>,
}

pub struct OutputGate<C, F> {
  confirm:   C,
  formatter: F,
  state:     GateState,
}

impl<C: Confirm, F: Formatter> OutputGate<C, F> {
  pub fn new(confirm: C, formatter: F) -> Self {
    OutputGate { confirm, formatter, state: GateState::Idle }
  }

  pub fn state(&self) -> GateState { self.state }

  /// Writes `contents` to `path` and formats it, asking before each step.
  pub fn run(&mut self, path: &Path, contents: &str) -> Result<GateOutcome, GateError> {
    let path = absolute(path).map_err(|source| GateError::Io { path: path.into(), source })?;
    self.state = GateState::Idle;
    let mut outcome = GateOutcome {
      path:         path.clone(),
      state:        GateState::Idle,
      trail:        vec![GateState::Idle],
      written:      false,
      format_error: None,
    };

    self.enter(&mut outcome, GateState::AwaitingWriteConfirmation);
    let prompt = format!("The generator will overwrite \"{}\". Continue?", path.display());
    if !self.confirm.confirm(Step::Write, &prompt).map_err(GateError::Confirm)? {
      info!("skipped writing {}", path.display());
      self.enter(&mut outcome, GateState::Aborted);
      return Ok(outcome);
    }

    if let Err(e) = sourcegen::write_atomically(&path, contents) {
      self.enter(&mut outcome, GateState::WriteFailed);
      return Err(e);
    }
    outcome.written = true;
    self.enter(&mut outcome, GateState::Written);
    info!("wrote {}", path.display());

    self.enter(&mut outcome, GateState::AwaitingFormatConfirmation);
    let prompt = format!("Run '{}'?", self.formatter.command(&path));
    if !self.confirm.confirm(Step::Format, &prompt).map_err(GateError::Confirm)? {
      info!("left {} unformatted", path.display());
      self.enter(&mut outcome, GateState::Aborted);
      return Ok(outcome);
    }

    match self.formatter.format(&path) {
      Ok(()) => {
        info!("formatted {}", path.display());
        self.enter(&mut outcome, GateState::Formatted);
      }
      Err(e) => {
        warn!("{e}");
        outcome.format_error = Some(e);
        self.enter(&mut outcome, GateState::FormatFailed);
      }
    }
    Ok(outcome)
  }

  fn enter(&mut self, outcome: &mut GateOutcome, state: GateState) {
    trace!("{}: {:?} -> {:?}", outcome.path.display(), self.state, state);
    self.state = state;
    outcome.state = state;
    outcome.trail.push(state);
  }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}
