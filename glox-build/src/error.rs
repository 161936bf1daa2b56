use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DescriptorError {
  #[error("empty type descriptor")]
  Empty,

  #[error("unexpected character {found:?} at offset {offset}")]
  UnexpectedChar { found: char, offset: usize },

  #[error("expected {expected} at offset {offset}")]
  Expected { expected: &'static str, offset: usize },

  #[error("unexpected input at offset {offset}")]
  Trailing { offset: usize },

  #[error("unknown wrapper `{0}`, only `List<...>` is supported")]
  UnknownWrapper(String),
}

#[derive(Error, Debug)]
pub enum GenError {
  #[error("invalid type `{descriptor}` for field `{family}.{variant}.{field}`: {source}")]
  Descriptor {
    family:     String,
    variant:    String,
    field:      String,
    descriptor: String,
    source:     DescriptorError,
  },

  #[error("unknown family `{0}`")]
  UnknownFamily(String),
}

#[derive(Error, Debug)]
pub enum GateError {
  #[error("failed to read confirmation: {0}")]
  Confirm(#[source] io::Error),

  #[error("failed to write {}: {source}", path.display())]
  Io { path: PathBuf, source: io::Error },
}

#[derive(Error, Debug)]
pub enum FormatError {
  #[error("could not run `{command}`: {message}")]
  Failed { command: String, message: String },
}
