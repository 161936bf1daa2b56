//! Generates the Go AST node types of the glox interpreter.
//!
//! The schema lives in [`ast_src`]. [`sourcegen_ast`] turns it into source
//! text without touching the file system, and [`gate::OutputGate`] writes that
//! text to disk once the operator agrees.

use std::path::PathBuf;

pub mod ast_src;
pub mod descriptor;
pub mod gate;
pub mod sourcegen;
pub mod sourcegen_ast;

mod error;

pub use error::{DescriptorError, FormatError, GateError, GenError};

#[macro_use]
extern crate log;

/// The name written into the preamble of every generated file.
pub const GENERATOR: &str = "glox-build";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
  /// The Go package clause of the generated files.
  pub package:   String,
  pub out_dir:   PathBuf,
  pub generator: &'static str,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    GeneratorConfig {
      package:   "glox".to_string(),
      out_dir:   sourcegen::project_root().join("glox"),
      generator: GENERATOR,
    }
  }
}
