//! Translates schema type descriptors into Go types.
//!
//! A descriptor is tokenized and parsed into a small tree first. Qualifier
//! stripping and sequence unwrapping then work on that tree, so neither depends
//! on how long any segment of the descriptor is.

use std::fmt;

use crate::{
  ast_src::{capitalize, is_base_type},
  error::DescriptorError,
};

/// The descriptor used for literal values, whose type is only known at runtime.
pub const DYNAMIC_MARKER: &str = "Object";

/// The only supported wrapper, `List<Inner>`.
pub const SEQUENCE_MARKER: &str = "List";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
  /// `Name`, or `Qualifier.Name` for a variant of another family.
  Named { qualifier: Option<String>, name: String },
  /// `List<Inner>`.
  List(Box<Descriptor>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
  /// `interface{}`.
  Dynamic,
  /// One of the polymorphic base types, `Expr` or `Stmt`.
  Base(String),
  /// Any other named type: a token, or a concrete variant.
  Named(String),
  List { elem: Box<TargetType>, ownership: Ownership },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
  /// Held directly. Interfaces and `interface{}` carry their own indirection.
  Value,
  /// Held through a pointer, so the field may be `nil`.
  Owned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
  pub ty:        TargetType,
  pub ownership: Ownership,
}

pub fn translate(descriptor: &str) -> Result<Translated, DescriptorError> {
  let parsed = Descriptor::parse(descriptor)?.strip_qualifiers();
  let ty = resolve(&parsed);
  let translated = Translated { ownership: ty.field_ownership(), ty };
  debug!("translated descriptor `{descriptor}` to `{translated}`");
  Ok(translated)
}

fn resolve(descriptor: &Descriptor) -> TargetType {
  if let Some(inner) = descriptor.unwrap_sequence() {
    let elem = resolve(inner);
    let ownership =
      if matches!(elem, TargetType::Base(_)) { Ownership::Value } else { Ownership::Owned };
    return TargetType::List { elem: Box::new(elem), ownership };
  }

  match descriptor.name() {
    DYNAMIC_MARKER => TargetType::Dynamic,
    name if is_base_type(name) => TargetType::Base(capitalize(&name.to_ascii_lowercase())),
    name => TargetType::Named(name.to_string()),
  }
}

impl TargetType {
  /// How a struct field of this type is held.
  pub fn field_ownership(&self) -> Ownership {
    match self {
      TargetType::Dynamic | TargetType::Base(_) => Ownership::Value,
      TargetType::Named(_) | TargetType::List { .. } => Ownership::Owned,
    }
  }
}

impl Descriptor {
  pub fn parse(src: &str) -> Result<Descriptor, DescriptorError> {
    let pieces = tokenize(src)?;
    if pieces.is_empty() {
      return Err(DescriptorError::Empty);
    }

    let mut parser = Parser { pieces: &pieces, pos: 0, end: src.len() };
    let descriptor = parser.descriptor()?;
    match parser.peek() {
      Some(p) => Err(DescriptorError::Trailing { offset: p.offset }),
      None => Ok(descriptor),
    }
  }

  /// Removes every `Qualifier.` prefix, at any depth.
  pub fn strip_qualifiers(self) -> Descriptor {
    match self {
      Descriptor::Named { name, .. } => Descriptor::Named { qualifier: None, name },
      Descriptor::List(inner) => Descriptor::List(Box::new(inner.strip_qualifiers())),
    }
  }

  /// Returns the element descriptor of `List<Inner>`, and `None` for anything
  /// else.
  pub fn unwrap_sequence(&self) -> Option<&Descriptor> {
    match self {
      Descriptor::List(inner) => Some(&**inner),
      Descriptor::Named { .. } => None,
    }
  }

  /// The unqualified name. For `List<Inner>` this is the wrapper, `List`.
  pub fn name(&self) -> &str {
    match self {
      Descriptor::Named { name, .. } => name,
      Descriptor::List(_) => SEQUENCE_MARKER,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind<'a> {
  Ident(&'a str),
  Dot,
  Open,
  Close,
}

#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
  kind:   PieceKind<'a>,
  offset: usize,
}

fn tokenize(src: &str) -> Result<Vec<Piece<'_>>, DescriptorError> {
  let mut pieces = vec![];
  let mut chars = src.char_indices().peekable();

  while let Some((offset, c)) = chars.next() {
    let kind = match c {
      c if c.is_whitespace() => continue,
      '.' => PieceKind::Dot,
      '<' => PieceKind::Open,
      '>' => PieceKind::Close,
      c if c.is_ascii_alphabetic() || c == '_' => {
        let mut end = offset + c.len_utf8();
        while let Some(&(i, c)) = chars.peek() {
          if !(c.is_ascii_alphanumeric() || c == '_') {
            break;
          }
          end = i + c.len_utf8();
          chars.next();
        }
        PieceKind::Ident(&src[offset..end])
      }
      found => return Err(DescriptorError::UnexpectedChar { found, offset }),
    };
    pieces.push(Piece { kind, offset });
  }

  Ok(pieces)
}

struct Parser<'a, 'src> {
  pieces: &'a [Piece<'src>],
  pos:    usize,
  end:    usize,
}

impl<'src> Parser<'_, 'src> {
  fn peek(&self) -> Option<Piece<'src>> { self.pieces.get(self.pos).copied() }
  fn offset(&self) -> usize { self.peek().map_or(self.end, |p| p.offset) }

  fn eat(&mut self, kind: PieceKind<'src>) -> bool {
    if self.peek().map(|p| p.kind) == Some(kind) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn ident(&mut self) -> Result<&'src str, DescriptorError> {
    match self.peek() {
      Some(Piece { kind: PieceKind::Ident(name), .. }) => {
        self.pos += 1;
        Ok(name)
      }
      _ => Err(DescriptorError::Expected { expected: "identifier", offset: self.offset() }),
    }
  }

  // descriptor := ident ('.' ident)? ('<' descriptor '>')?
  fn descriptor(&mut self) -> Result<Descriptor, DescriptorError> {
    let first = self.ident()?;
    let (qualifier, name) = if self.eat(PieceKind::Dot) {
      (Some(first.to_string()), self.ident()?.to_string())
    } else {
      (None, first.to_string())
    };

    if !self.eat(PieceKind::Open) {
      return Ok(Descriptor::Named { qualifier, name });
    }

    if name != SEQUENCE_MARKER {
      return Err(DescriptorError::UnknownWrapper(name));
    }
    let inner = self.descriptor()?;
    if !self.eat(PieceKind::Close) {
      return Err(DescriptorError::Expected { expected: "`>`", offset: self.offset() });
    }
    Ok(Descriptor::List(Box::new(inner)))
  }
}

impl fmt::Display for Descriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Descriptor::Named { qualifier: Some(q), name } => write!(f, "{q}.{name}"),
      Descriptor::Named { qualifier: None, name } => write!(f, "{name}"),
      Descriptor::List(inner) => write!(f, "{SEQUENCE_MARKER}<{inner}>"),
    }
  }
}

impl fmt::Display for Ownership {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Ownership::Value => Ok(()),
      Ownership::Owned => write!(f, "*"),
    }
  }
}

impl fmt::Display for TargetType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TargetType::Dynamic => write!(f, "interface{{}}"),
      TargetType::Base(name) | TargetType::Named(name) => write!(f, "{name}"),
      TargetType::List { elem, ownership } => write!(f, "[]{ownership}{elem}"),
    }
  }
}

impl fmt::Display for Translated {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.ownership, self.ty)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn check(descriptor: &str, expected: &str) {
    let translated = translate(descriptor).unwrap();
    assert_eq!(translated.to_string(), expected, "translating `{descriptor}`");
  }

  fn named(qualifier: Option<&str>, name: &str) -> Descriptor {
    Descriptor::Named { qualifier: qualifier.map(String::from), name: name.into() }
  }

  #[test]
  fn dynamic_value() {
    let translated = translate("Object").unwrap();
    assert_eq!(translated.ty, TargetType::Dynamic);
    assert_eq!(translated.ownership, Ownership::Value);
    check("Object", "interface{}");
  }

  #[test]
  fn base_types_are_held_by_value() {
    check("Expr", "Expr");
    check("Stmt", "Stmt");
    check("stmt", "Stmt");
    assert_eq!(translate("Expr").unwrap().ty, TargetType::Base("Expr".into()));
  }

  #[test]
  fn named_types_are_owned() {
    let translated = translate("Token").unwrap();
    assert_eq!(translated.ty, TargetType::Named("Token".into()));
    assert_eq!(translated.ownership, Ownership::Owned);
    check("Token", "*Token");
  }

  #[test]
  fn sequences() {
    check("List<Stmt>", "*[]Stmt");
    check("List<Expr>", "*[]Expr");
    check("List<Token>", "*[]*Token");
    check("List<Object>", "*[]*interface{}");
    check("List<List<Stmt>>", "*[]*[]Stmt");
    check(" List < Token > ", "*[]*Token");

    assert_eq!(
      translate("List<Stmt>").unwrap().ty,
      TargetType::List {
        elem:      Box::new(TargetType::Base("Stmt".into())),
        ownership: Ownership::Value,
      }
    );
  }

  #[test]
  fn qualified_references() {
    check("Expr.Variable", "*Variable");
    check("List<Stmt.Function>", "*[]*Function");
    check("List<List<Stmt.Function>>", "*[]*[]*Function");
    assert_eq!(translate("Expr.Variable").unwrap().ty, TargetType::Named("Variable".into()));
  }

  #[test]
  fn stripping_and_unwrapping_commute() {
    for src in ["List<Stmt.Function>", "List<Expr>", "Expr.Variable", "List<List<Stmt.If>>"] {
      let parsed = Descriptor::parse(src).unwrap();
      let strip_then_unwrap = parsed.clone().strip_qualifiers().unwrap_sequence().cloned();
      let unwrap_then_strip = parsed.unwrap_sequence().cloned().map(Descriptor::strip_qualifiers);
      assert_eq!(strip_then_unwrap, unwrap_then_strip, "descriptor `{src}`");
    }
  }

  #[test]
  fn sequence_elements_resolve_like_their_unwrapped_descriptor() {
    for src in ["List<Stmt.Function>", "List<Expr>", "List<Token>", "List<List<Stmt.If>>"] {
      let elem = Descriptor::parse(src).unwrap().unwrap_sequence().cloned().unwrap();
      match translate(src).unwrap().ty {
        TargetType::List { elem: translated, .. } => {
          assert_eq!(*translated, resolve(&elem.strip_qualifiers()), "descriptor `{src}`")
        }
        other => panic!("`{src}` translated to {other:?}"),
      }
    }

    assert_eq!(named(Some("Expr"), "Variable").name(), "Variable");
    assert_eq!(Descriptor::parse("List<Token>").unwrap().name(), "List");
  }

  #[test]
  fn parse_tree() {
    assert_eq!(Descriptor::parse("Token").unwrap(), named(None, "Token"));
    assert_eq!(
      Descriptor::parse("List<Stmt.Function>").unwrap(),
      Descriptor::List(Box::new(named(Some("Stmt"), "Function")))
    );
    let qualified = Descriptor::parse("List<Stmt.Function>").unwrap();
    assert_eq!(qualified.to_string(), "List<Stmt.Function>");
  }

  #[test]
  fn malformed_descriptors() {
    assert_eq!(Descriptor::parse(""), Err(DescriptorError::Empty));
    assert_eq!(Descriptor::parse("   "), Err(DescriptorError::Empty));
    assert_eq!(
      Descriptor::parse("List<Token"),
      Err(DescriptorError::Expected { expected: "`>`", offset: 10 })
    );
    assert_eq!(
      Descriptor::parse("Expr."),
      Err(DescriptorError::Expected { expected: "identifier", offset: 5 })
    );
    assert_eq!(Descriptor::parse("Token>"), Err(DescriptorError::Trailing { offset: 5 }));
    assert_eq!(Descriptor::parse("Map<Token>"), Err(DescriptorError::UnknownWrapper("Map".into())));
    assert_eq!(
      Descriptor::parse("Token name"),
      Err(DescriptorError::Trailing { offset: 6 })
    );
    assert_eq!(
      Descriptor::parse("[]Token"),
      Err(DescriptorError::UnexpectedChar { found: '[', offset: 0 })
    );
  }
}
