//! This module generates the AST node types used by the glox interpreter.
//!
//! For each family it emits a polymorphic base interface, a visitor interface
//! with one method per variant, and then for every variant a struct, a
//! constructor and an `accept` method which dispatches back to the visitor.
//! The output is laid out the way `gofmt` would lay it out, so formatting the
//! file afterwards is not required for it to be readable.

use std::path::PathBuf;

use itertools::Itertools;

use crate::{
  ast_src::{family_by_name, FamilySrc, VariantSrc, FAMILIES},
  descriptor::{translate, Translated},
  error::GenError,
  sourcegen, GeneratorConfig,
};

/// Name of the dispatch method every variant implements.
pub const DISPATCH_METHOD: &str = "accept";

/// The `(result, failure)` pair returned by every visitor method.
const RESULT: &str = "(interface{}, error)";

/// One family, ready to be handed to the output gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
  pub family: &'static str,
  pub path:   PathBuf,
  pub text:   String,
}

#[derive(Debug)]
struct Field<'a> {
  name: &'a str,
  ty:   Translated,
}

pub fn generate_all(config: &GeneratorConfig) -> Result<Vec<Generated>, GenError> {
  FAMILIES.iter().map(|family| generate(family, config)).collect()
}

/// Generates the named families, in the order given. Names are matched
/// ignoring case, and a family named more than once is generated once.
pub fn generate_families(
  names: &[String],
  config: &GeneratorConfig,
) -> Result<Vec<Generated>, GenError> {
  let families = names
    .iter()
    .map(|name| family_by_name(name).ok_or_else(|| GenError::UnknownFamily(name.clone())))
    .collect::<Result<Vec<_>, _>>()?;

  families
    .into_iter()
    .unique_by(|family| family.name)
    .map(|family| generate(family, config))
    .collect()
}

fn generate(
  family: &'static FamilySrc<'static>,
  config: &GeneratorConfig,
) -> Result<Generated, GenError> {
  let text = generate_family(family, config)?;
  Ok(Generated { family: family.name, path: config.out_dir.join(family.file_name()), text })
}

/// Produces the complete file for one family: base interface, visitor
/// interface, then every variant in schema order.
pub fn generate_family(
  family: &FamilySrc<'_>,
  config: &GeneratorConfig,
) -> Result<String, GenError> {
  info!("generating {} variants for family `{}`", family.variants.len(), family.name);

  let mut blocks = vec![generate_interfaces(family)];
  for variant in family.variants {
    blocks.push(generate_variant(family, variant)?);
  }

  Ok(sourcegen::add_preamble(config.generator, &config.package, blocks.join("\n")))
}

pub fn generate_interfaces(family: &FamilySrc<'_>) -> String {
  let visitor = family.visitor_name();

  let base = go_block(
    &format!("type {} interface", family.base_name()),
    [format!("{DISPATCH_METHOD}(visitor {visitor}) {RESULT}")],
  );

  let methods = family.variants.iter().map(|variant| {
    format!(
      "{}({} *{}) {RESULT}",
      visit_method_name(family, variant),
      family.name,
      variant.name
    )
  });
  let visitor = go_block(&format!("type {visitor} interface"), methods);

  format!("{base}\n{visitor}")
}

pub fn generate_variant(
  family: &FamilySrc<'_>,
  variant: &VariantSrc<'_>,
) -> Result<String, GenError> {
  let fields = lower_fields(family, variant)?;
  let recv = family.name;
  let name = variant.name;

  let width = fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
  let def = go_block(
    &format!("type {name} struct"),
    fields.iter().map(|f| format!("{:width$} {}", f.name, f.ty)),
  );

  let params = fields.iter().map(|f| format!("{} {}", f.name, f.ty)).join(", ");
  let constructor = go_block(
    &format!("func New{name}({params}) *{name}"),
    std::iter::once(format!("{recv} := new({name})"))
      .chain(fields.iter().map(|f| format!("{recv}.{0} = {0}", f.name)))
      .chain(std::iter::once(format!("return {recv}"))),
  );

  let dispatch = go_block(
    &format!("func ({recv} *{name}) {DISPATCH_METHOD}(visitor {}) {RESULT}", family.visitor_name()),
    [format!("return visitor.{}({recv})", visit_method_name(family, variant))],
  );

  Ok(format!("{def}\n{constructor}\n{dispatch}"))
}

/// `visit<Variant><Base>`, for example `visitBinaryExpr`.
pub fn visit_method_name(family: &FamilySrc<'_>, variant: &VariantSrc<'_>) -> String {
  format!("visit{}{}", variant.name, family.base_name())
}

fn lower_fields<'a>(
  family: &FamilySrc<'_>,
  variant: &VariantSrc<'a>,
) -> Result<Vec<Field<'a>>, GenError> {
  variant
    .fields
    .iter()
    .map(|field| {
      let ty = translate(field.ty).map_err(|source| GenError::Descriptor {
        family: family.name.to_string(),
        variant: variant.name.to_string(),
        field: field.name.to_string(),
        descriptor: field.ty.to_string(),
        source,
      })?;
      Ok(Field { name: field.name, ty })
    })
    .collect()
}

/// `header {`, then one tab-indented line per item, then `}`.
fn go_block(header: &str, body: impl IntoIterator<Item = String>) -> String {
  let mut out = format!("{header} {{\n");
  for line in body {
    out.push('\t');
    out.push_str(&line);
    out.push('\n');
  }
  out.push_str("}\n");
  out
}
