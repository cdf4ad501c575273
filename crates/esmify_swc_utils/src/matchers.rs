use swc_core::{
  common::SyntaxContext,
  ecma::{ast, atoms::JsWord},
};

/// `exports`, `module` and `require` only count as module-convention markers
/// when they refer to the ambient scope. After the resolver pass such
/// references carry the unresolved syntax context, while a local binding of
/// the same name gets a context of its own.
pub fn is_unshadowed(ident: &ast::Ident, unresolved_ctxt: SyntaxContext) -> bool {
  ident.span.ctxt == unresolved_ctxt
}

fn ident_prop_name(prop: &ast::MemberProp) -> Option<&JsWord> {
  match prop {
    ast::MemberProp::Ident(ident) => Some(&ident.sym),
    _ => None,
  }
}

pub trait ModuleConventionExt {
  /// A bare, unshadowed `exports` reference.
  fn is_unshadowed_exports(&self, unresolved_ctxt: SyntaxContext) -> bool;

  /// Exactly `module.exports` with an unshadowed `module`.
  fn is_module_exports(&self, unresolved_ctxt: SyntaxContext) -> bool;

  /// A member chained off `module.exports`, e.g. `module.exports.foo`.
  fn is_module_exports_member(&self, unresolved_ctxt: SyntaxContext) -> bool;

  /// `exports.<name>` with an unshadowed `exports`; yields the property name.
  fn exports_member_name(&self, unresolved_ctxt: SyntaxContext) -> Option<&JsWord>;
}

impl ModuleConventionExt for ast::Expr {
  fn is_unshadowed_exports(&self, unresolved_ctxt: SyntaxContext) -> bool {
    matches!(self, ast::Expr::Ident(ident) if ident.sym == *"exports" && is_unshadowed(ident, unresolved_ctxt))
  }

  fn is_module_exports(&self, unresolved_ctxt: SyntaxContext) -> bool {
    match self {
      ast::Expr::Member(member) => {
        matches!(&*member.obj, ast::Expr::Ident(obj) if obj.sym == *"module" && is_unshadowed(obj, unresolved_ctxt))
          && ident_prop_name(&member.prop).map_or(false, |name| *name == *"exports")
      }
      _ => false,
    }
  }

  fn is_module_exports_member(&self, unresolved_ctxt: SyntaxContext) -> bool {
    match self {
      ast::Expr::Member(member) => member.obj.is_module_exports(unresolved_ctxt),
      _ => false,
    }
  }

  fn exports_member_name(&self, unresolved_ctxt: SyntaxContext) -> Option<&JsWord> {
    match self {
      ast::Expr::Member(member) if member.obj.is_unshadowed_exports(unresolved_ctxt) => {
        ident_prop_name(&member.prop)
      }
      _ => None,
    }
  }
}

pub trait RequireCallExt {
  /// The specifier of a recognized dependency load: an unshadowed `require`
  /// callee with exactly one non-spread string-literal argument. Anything
  /// else is not a load and must be left alone.
  fn require_specifier(&self, unresolved_ctxt: SyntaxContext) -> Option<&ast::Str>;
}

impl RequireCallExt for ast::CallExpr {
  fn require_specifier(&self, unresolved_ctxt: SyntaxContext) -> Option<&ast::Str> {
    let ast::Callee::Expr(callee) = &self.callee else {
      return None;
    };
    let ast::Expr::Ident(callee) = &**callee else {
      return None;
    };
    if callee.sym != *"require" || !is_unshadowed(callee, unresolved_ctxt) {
      return None;
    }
    match self.args.as_slice() {
      [arg] if arg.spread.is_none() => match &*arg.expr {
        ast::Expr::Lit(ast::Lit::Str(specifier)) => Some(specifier),
        _ => None,
      },
      _ => None,
    }
  }
}

pub trait AssignTargetExt {
  /// The assignment target as an expression, looking through the
  /// `Pat::Expr` wrapping the parser emits for member-expression targets.
  fn as_target_expr(&self) -> Option<&ast::Expr>;
}

impl AssignTargetExt for ast::PatOrExpr {
  fn as_target_expr(&self) -> Option<&ast::Expr> {
    match self {
      ast::PatOrExpr::Expr(expr) => Some(expr),
      ast::PatOrExpr::Pat(pat) => match &**pat {
        ast::Pat::Expr(expr) => Some(expr),
        _ => None,
      },
    }
  }
}
