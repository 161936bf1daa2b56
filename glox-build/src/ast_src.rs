//! Defines input for code generation process.
//!
//! Each family is a literal table of variants, and each variant lists its
//! fields as `(descriptor, name)` pairs. Field order is significant: it is the
//! order of the struct fields and of the constructor parameters.

#[derive(Debug)]
pub struct FamilySrc<'a> {
  pub name:     &'a str,
  pub variants: &'a [VariantSrc<'a>],
}

#[derive(Debug)]
pub struct VariantSrc<'a> {
  pub name:   &'a str,
  pub fields: &'a [FieldSrc<'a>],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSrc<'a> {
  /// Raw type descriptor, such as `Token`, `List<Stmt>` or `Expr.Variable`.
  pub ty:   &'a str,
  pub name: &'a str,
}

const fn field<'a>(ty: &'a str, name: &'a str) -> FieldSrc<'a> { FieldSrc { ty, name } }

pub const EXPR_SRC: FamilySrc<'static> = FamilySrc {
  name:     "expr",
  variants: &[
    VariantSrc { name: "Assign", fields: &[field("Token", "name"), field("Expr", "value")] },
    VariantSrc {
      name:   "Binary",
      fields: &[field("Expr", "left"), field("Token", "operator"), field("Expr", "right")],
    },
    VariantSrc {
      name:   "Call",
      fields: &[field("Expr", "callee"), field("Token", "paren"), field("List<Expr>", "arguments")],
    },
    VariantSrc { name: "Get", fields: &[field("Expr", "object"), field("Token", "name")] },
    VariantSrc { name: "Grouping", fields: &[field("Expr", "expression")] },
    VariantSrc { name: "Literal", fields: &[field("Object", "value")] },
    VariantSrc {
      name:   "Logical",
      fields: &[field("Expr", "left"), field("Token", "operator"), field("Expr", "right")],
    },
    VariantSrc {
      name:   "Set",
      fields: &[field("Expr", "object"), field("Token", "name"), field("Expr", "value")],
    },
    VariantSrc { name: "Super", fields: &[field("Token", "keyword"), field("Token", "method")] },
    VariantSrc { name: "This", fields: &[field("Token", "keyword")] },
    VariantSrc { name: "Unary", fields: &[field("Token", "operator"), field("Expr", "right")] },
    VariantSrc { name: "Variable", fields: &[field("Token", "name")] },
  ],
};

pub const STMT_SRC: FamilySrc<'static> = FamilySrc {
  name:     "stmt",
  variants: &[
    VariantSrc { name: "Block", fields: &[field("List<Stmt>", "statements")] },
    VariantSrc {
      name:   "Class",
      fields: &[
        field("Token", "name"),
        field("Expr.Variable", "superclass"),
        field("List<Stmt.Function>", "methods"),
      ],
    },
    VariantSrc { name: "Expression", fields: &[field("Expr", "expression")] },
    VariantSrc {
      name:   "Function",
      fields: &[
        field("Token", "name"),
        field("List<Token>", "params"),
        field("List<Stmt>", "body"),
      ],
    },
    VariantSrc {
      name:   "If",
      fields: &[
        field("Expr", "condition"),
        field("Stmt", "thenBranch"),
        field("Stmt", "elseBranch"),
      ],
    },
    VariantSrc { name: "Print", fields: &[field("Expr", "expression")] },
    VariantSrc { name: "Return", fields: &[field("Token", "keyword"), field("Expr", "value")] },
    VariantSrc { name: "Var", fields: &[field("Token", "name"), field("Expr", "initializer")] },
    VariantSrc { name: "While", fields: &[field("Expr", "condition"), field("Stmt", "body")] },
  ],
};

/// Every family the generator knows about, in generation order.
pub const FAMILIES: &[FamilySrc<'static>] = &[EXPR_SRC, STMT_SRC];

/// Names of the polymorphic base types. A field of one of these types is an
/// interface handle rather than a record.
pub const BASE_TYPES: &[&str] = &["expr", "stmt"];

pub fn family_by_name(name: &str) -> Option<&'static FamilySrc<'static>> {
  FAMILIES.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

pub fn is_base_type(name: &str) -> bool { BASE_TYPES.iter().any(|b| b.eq_ignore_ascii_case(name)) }

impl<'a> FamilySrc<'a> {
  /// The family name with its first letter capitalized: `expr` becomes `Expr`.
  pub fn base_name(&self) -> String { capitalize(self.name) }

  pub fn visitor_name(&self) -> String { format!("{}Visitor", self.name) }

  pub fn variant(&self, name: &str) -> Option<&'a VariantSrc<'a>> {
    self.variants.iter().find(|v| v.name == name)
  }

  /// The file this family is written to, relative to the output directory.
  pub fn file_name(&self) -> String { format!("{}.go", self.name) }
}

pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
