use std::{error::Error, path::PathBuf};

use clap::Parser;
use glox_build::{
  gate::{AlwaysConfirm, AlwaysDecline, Confirm, Console, GateState, OutputGate, PerStep},
  sourcegen::GoFmt,
  sourcegen_ast::{generate_all, generate_families},
  GeneratorConfig,
};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates the glox expression and statement node types")]
struct Cli {
  /// Families to generate. Defaults to all of them.
  #[arg(short, long = "family")]
  families: Vec<String>,

  /// Directory the `.go` files are written to.
  #[arg(long)]
  out_dir: Option<PathBuf>,

  /// Package clause of the generated files.
  #[arg(long, default_value = "glox")]
  package: String,

  /// Overwrite without asking.
  #[arg(short, long)]
  yes: bool,

  /// Never run the formatter.
  #[arg(long)]
  no_format: bool,

  /// Print the generated text instead of writing it.
  #[arg(long)]
  print: bool,

  #[arg(short, long)]
  verbose: bool,

  #[arg(short, long, conflicts_with = "verbose")]
  quiet: bool,
}

fn main() {
  match run() {
    Ok(()) => (),
    Err(e) => {
      eprintln!("error: {}", e);
      std::process::exit(1);
    }
  }
}

fn run() -> Result<(), Box<dyn Error>> {
  let cli = Cli::parse();

  let level = match (cli.verbose, cli.quiet) {
    (true, _) => LevelFilter::Debug,
    (_, true) => LevelFilter::Warn,
    _ => LevelFilter::Info,
  };
  setup_logging(level)?;

  let mut config = GeneratorConfig { package: cli.package.clone(), ..Default::default() };
  if let Some(out_dir) = &cli.out_dir {
    config.out_dir = out_dir.clone();
  }

  let generated = if cli.families.is_empty() {
    generate_all(&config)?
  } else {
    generate_families(&cli.families, &config)?
  };

  if cli.print {
    for file in &generated {
      print!("{}", file.text);
    }
    return Ok(());
  }

  let confirm = confirm_strategy(cli.yes, cli.no_format, Console::stdio);
  let mut gate = OutputGate::new(confirm, GoFmt);
  for file in &generated {
    let outcome = gate.run(&file.path, &file.text)?;
    match outcome.state {
      GateState::Formatted => println!("{}: written and formatted", outcome.path.display()),
      GateState::FormatFailed => println!("{}: written, formatting failed", outcome.path.display()),
      _ if outcome.written => println!("{}: written", outcome.path.display()),
      _ => println!("{}: skipped", outcome.path.display()),
    }
  }

  println!("Done!");
  Ok(())
}

/// Picks how both gate steps are answered. `console` is called at most once, so
/// stdin is only locked once and both prompts share it.
fn confirm_strategy<'a, C: Confirm + 'a>(
  yes: bool,
  no_format: bool,
  console: impl FnOnce() -> C,
) -> Box<dyn Confirm + 'a> {
  match (yes, no_format) {
    (true, false) => Box::new(AlwaysConfirm),
    (true, true) => Box::new(PerStep { write: AlwaysConfirm, format: AlwaysDecline }),
    (false, false) => Box::new(console()),
    (false, true) => Box::new(PerStep { write: console(), format: AlwaysDecline }),
  }
}

fn setup_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
    })
    .level(level)
    .chain(std::io::stderr())
    .apply()
}

#[cfg(test)]
mod tests {
  use super::*;
  use glox_build::gate::{Scripted, Step};

  fn answers(yes: bool, no_format: bool) -> (bool, bool) {
    let mut confirm = confirm_strategy(yes, no_format, || Scripted::new([true, true]));
    let write = confirm.confirm(Step::Write, "write?").unwrap();
    let format = confirm.confirm(Step::Format, "format?").unwrap();
    (write, format)
  }

  #[test]
  fn unattended_runs_confirm_without_asking() {
    let mut confirm = confirm_strategy(true, false, || -> Scripted { panic!("asked the console") });
    assert!(confirm.confirm(Step::Write, "write?").unwrap());
    assert!(confirm.confirm(Step::Format, "format?").unwrap());
  }

  #[test]
  fn flags_map_onto_steps() {
    assert_eq!(answers(true, false), (true, true));
    assert_eq!(answers(true, true), (true, false));
    assert_eq!(answers(false, false), (true, true));
    assert_eq!(answers(false, true), (true, false));
  }

  #[test]
  fn no_format_never_asks_about_formatting() {
    let mut script = Scripted::new([true, true]);
    let console = &mut script;
    let mut confirm = confirm_strategy(false, true, move || console);
    assert!(confirm.confirm(Step::Write, "write?").unwrap());
    assert!(!confirm.confirm(Step::Format, "format?").unwrap());
    drop(confirm);
    assert_eq!(script.prompts, ["write?"]);
  }
}
