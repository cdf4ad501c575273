use rustc_hash::FxHashSet as HashSet;
use swc_core::ecma::{
  ast,
  atoms::JsWord,
  utils::quote_ident,
  visit::{Visit, VisitWith},
};

/// Hands out identifiers that are guaranteed not to collide with any name
/// already appearing in the program. No hygiene pass runs after the
/// transformation, so uniqueness has to hold textually.
#[derive(Debug)]
pub struct UniqueNamer {
  used: HashSet<JsWord>,
}

impl UniqueNamer {
  pub fn for_module(module: &ast::Module) -> Self {
    let mut used = HashSet::default();
    module.visit_with(&mut IdentCollector { used: &mut used });
    Self { used }
  }

  /// Derive a fresh identifier from a hint such as a module specifier:
  /// `"./lodash-es"` becomes `_lodashEs`, with `$1`, `$2`, … appended while
  /// the name is taken.
  pub fn claim(&mut self, hint: &str) -> ast::Ident {
    let base = ident_hint(hint);
    let mut name: JsWord = base.clone().into();
    let mut count = 0;
    while self.used.contains(&name) {
      count += 1;
      name = format!("{base}${count}").into();
    }
    self.used.insert(name.clone());
    quote_ident!(name)
  }
}

fn ident_hint(hint: &str) -> String {
  let mut out = String::from("_");
  let mut capitalize = false;
  for c in hint.chars() {
    if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
      if capitalize {
        out.extend(c.to_uppercase());
        capitalize = false;
      } else {
        out.push(c);
      }
    } else if out.len() > 1 {
      capitalize = true;
    }
  }
  if out.len() == 1 {
    out.push_str("mod");
  }
  out
}

struct IdentCollector<'a> {
  used: &'a mut HashSet<JsWord>,
}

impl Visit for IdentCollector<'_> {
  fn visit_ident(&mut self, ident: &ast::Ident) {
    self.used.insert(ident.sym.clone());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hints_are_camel_cased_specifiers() {
    assert_eq!(ident_hint("lodash-es"), "_lodashEs");
    assert_eq!(ident_hint("./core"), "_core");
    assert_eq!(ident_hint("@scope/pkg"), "_scopePkg");
    assert_eq!(ident_hint("---"), "_mod");
  }

  #[test]
  fn claimed_names_never_collide() {
    let mut namer = UniqueNamer {
      used: ["_core".into(), "_core$1".into()].into_iter().collect(),
    };
    assert_eq!(namer.claim("./core").sym.as_ref(), "_core$2");
    // and the claimed name itself is now reserved
    assert_eq!(namer.claim("./core").sym.as_ref(), "_core$3");
  }
}
