//! Helpers shared by the generators: locating the workspace, the generated
//! file preamble, writing files, and running the external formatter.

use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use xshell::{cmd, Shell};

use crate::error::{FormatError, GateError};

/// The root of the cargo workspace this generator lives in.
pub fn project_root() -> PathBuf {
  let dir = env!("CARGO_MANIFEST_DIR");
  let manifest_dir = PathBuf::from(dir);
  manifest_dir.parent().map(Path::to_path_buf).unwrap_or(manifest_dir)
}

pub fn add_preamble(generator: &str, package: &str, text: String) -> String {
  format!("package {package}\n\n// This code is generated by `{generator}`.\n\n{text}")
}

/// Writes `contents` to a temporary file next to `path`, then renames it into
/// place. A failed write never leaves a truncated file at `path`.
///
/// The file keeps the permissions of the one it replaces. A new file gets
/// `0644`.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), GateError> {
  let io_err = |source| GateError::Io { path: path.to_path_buf(), source };

  let dir = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new("."),
  };
  fs::create_dir_all(dir).map_err(io_err)?;

  let permissions = match fs::metadata(path) {
    Ok(meta) => Some(meta.permissions()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(),
    Err(e) => return Err(io_err(e)),
  };

  let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
  file.write_all(contents.as_bytes()).map_err(io_err)?;
  if let Some(permissions) = permissions {
    file.as_file().set_permissions(permissions).map_err(io_err)?;
  }
  file.as_file().sync_all().map_err(io_err)?;
  file.persist(path).map_err(|e| io_err(e.error))?;

  debug!("wrote {} bytes to {}", contents.len(), path.display());
  Ok(())
}

// Temporary files are created owner-only.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
  use std::os::unix::fs::PermissionsExt;
  Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> { None }

/// A post-processing step run over a freshly written file.
pub trait Formatter {
  /// The command line shown to the operator before formatting.
  fn command(&self, path: &Path) -> String;

  fn format(&self, path: &Path) -> Result<(), FormatError>;
}

/// Runs `gofmt -w` on the file.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoFmt;

impl Formatter for GoFmt {
  fn command(&self, path: &Path) -> String { format!("gofmt -w \"{}\"", path.display()) }

  fn format(&self, path: &Path) -> Result<(), FormatError> {
    let failed = |message: String| FormatError::Failed { command: self.command(path), message };

    let sh = Shell::new().map_err(|e| failed(e.to_string()))?;
    let output = cmd!(sh, "gofmt -w {path}")
      .quiet()
      .ignore_status()
      .output()
      .map_err(|e| failed(e.to_string()))?;

    if output.status.success() {
      Ok(())
    } else {
      let stderr = String::from_utf8_lossy(&output.stderr);
      Err(failed(format!("{}: {}", output.status, stderr.trim())))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preamble() {
    assert_eq!(
      add_preamble("glox-build", "glox", "type Expr interface {\n}\n".into()),
      "package glox\n\n// This code is generated by `glox-build`.\n\ntype Expr interface {\n}\n"
    );
  }

  #[test]
  fn project_root_contains_the_generator() {
    assert!(project_root().join("glox-build").join("Cargo.toml").exists());
  }

  #[test]
  fn atomic_write_replaces_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("expr.go");

    write_atomically(&path, "first").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "first");

    write_atomically(&path, "second").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second");

    // Only the destination is left behind, no temporary files.
    let entries = fs::read_dir(dir.path().join("nested")).unwrap().count();
    assert_eq!(entries, 1);
  }

  #[cfg(unix)]
  #[test]
  fn atomic_write_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
    let dir = tempfile::tempdir().unwrap();

    let fresh = dir.path().join("stmt.go");
    write_atomically(&fresh, "new").unwrap();
    assert_eq!(mode(&fresh), 0o644);

    let existing = dir.path().join("expr.go");
    fs::write(&existing, "old").unwrap();
    fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
    write_atomically(&existing, "new").unwrap();
    assert_eq!(mode(&existing), 0o640);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "new");
  }

  #[test]
  fn atomic_write_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    // The parent is a regular file, so the directory can't be created.
    let path = blocker.join("expr.go");
    let err = write_atomically(&path, "text").unwrap_err();
    assert!(err.to_string().starts_with(&format!("failed to write {}", path.display())));
  }

  #[test]
  fn gofmt_command() {
    assert_eq!(GoFmt.command(Path::new("/src/expr.go")), "gofmt -w \"/src/expr.go\"");
  }
}
