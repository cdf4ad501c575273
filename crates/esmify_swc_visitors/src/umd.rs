use esmify_swc_utils::{is_unshadowed, AssignTargetExt, ModuleConventionExt, UniqueNamer};
use swc_core::{
  common::{SyntaxContext, DUMMY_SP},
  ecma::{
    ast,
    atoms::JsWord,
    utils::quote_ident,
    visit::{Visit, VisitMut, VisitMutWith, VisitWith},
  },
};

use crate::hoist_dependency_loads;

/// Normalize a factory-envelope program: internal dependency loads are
/// hoisted ahead of the envelope, and a guarded `module.exports` assignment
/// gains a global-object fallback right after its guard, so browser-global
/// consumers keep working once the file is loaded as a native module.
pub fn normalize_umd(module: &mut ast::Module, unresolved_ctxt: SyntaxContext) {
  let mut namer = UniqueNamer::for_module(module);
  let hoisted = hoist_dependency_loads(module, unresolved_ctxt, &mut namer);
  module.body.splice(0..0, hoisted);

  let mut shim = GlobalFallbackShim {
    unresolved_ctxt,
    done: false,
  };
  module.visit_mut_with(&mut shim);
}

struct GlobalFallbackShim {
  unresolved_ctxt: SyntaxContext,
  done: bool,
}

impl VisitMut for GlobalFallbackShim {
  fn visit_mut_stmts(&mut self, stmts: &mut Vec<ast::Stmt>) {
    // Children first, so the innermost guard wins.
    stmts.visit_mut_children_with(self);
    if self.done {
      return;
    }
    for index in 0..stmts.len() {
      let ast::Stmt::If(if_stmt) = &stmts[index] else {
        continue;
      };
      let Some(value) = find_guarded_exports_assign(if_stmt, self.unresolved_ctxt) else {
        continue;
      };
      let Some(name) = find_global_member_name(if_stmt, self.unresolved_ctxt) else {
        continue;
      };
      self.done = true;
      if already_shimmed(stmts.get(index + 1), &name, self.unresolved_ctxt) {
        return;
      }
      tracing::debug!(global = %name, "inserting global fallback assignment");
      stmts.insert(index + 1, global_assign(name, value));
      return;
    }
  }
}

/// The value assigned to `module.exports` somewhere under the guard,
/// skipping nested guards (those get their own pass).
fn find_guarded_exports_assign(
  if_stmt: &ast::IfStmt,
  unresolved_ctxt: SyntaxContext,
) -> Option<Box<ast::Expr>> {
  let mut finder = ExportsAssignFinder {
    unresolved_ctxt,
    value: None,
  };
  if_stmt.cons.visit_with(&mut finder);
  if finder.value.is_none() {
    if let Some(alt) = &if_stmt.alt {
      alt.visit_with(&mut finder);
    }
  }
  finder.value
}

struct ExportsAssignFinder {
  unresolved_ctxt: SyntaxContext,
  value: Option<Box<ast::Expr>>,
}

impl Visit for ExportsAssignFinder {
  fn visit_if_stmt(&mut self, _: &ast::IfStmt) {}

  fn visit_assign_expr(&mut self, assign: &ast::AssignExpr) {
    if self.value.is_none()
      && assign.op == ast::AssignOp::Assign
      && assign
        .left
        .as_target_expr()
        .map_or(false, |target| target.is_module_exports(self.unresolved_ctxt))
    {
      self.value = Some(assign.right.clone());
      return;
    }
    assign.visit_children_with(self);
  }
}

/// The property name read off a global-object reference anywhere inside the
/// guard, taken as the library's intended global name.
fn find_global_member_name(if_stmt: &ast::IfStmt, unresolved_ctxt: SyntaxContext) -> Option<JsWord> {
  let mut finder = GlobalMemberFinder {
    unresolved_ctxt,
    name: None,
  };
  if_stmt.visit_with(&mut finder);
  finder.name
}

struct GlobalMemberFinder {
  unresolved_ctxt: SyntaxContext,
  name: Option<JsWord>,
}

impl Visit for GlobalMemberFinder {
  fn visit_member_expr(&mut self, member: &ast::MemberExpr) {
    if self.name.is_none() && is_global_object(&member.obj, self.unresolved_ctxt) {
      if let ast::MemberProp::Ident(prop) = &member.prop {
        self.name = Some(prop.sym.clone());
        return;
      }
    }
    member.visit_children_with(self);
  }
}

fn is_global_object(expr: &ast::Expr, unresolved_ctxt: SyntaxContext) -> bool {
  match expr {
    ast::Expr::This(_) => true,
    ast::Expr::Ident(ident) => {
      (ident.sym == *"self" || ident.sym == *"window" || ident.sym == *"globalThis")
        && is_unshadowed(ident, unresolved_ctxt)
    }
    _ => false,
  }
}

fn already_shimmed(
  next: Option<&ast::Stmt>,
  name: &JsWord,
  unresolved_ctxt: SyntaxContext,
) -> bool {
  let Some(ast::Stmt::Expr(expr_stmt)) = next else {
    return false;
  };
  let ast::Expr::Assign(assign) = &*expr_stmt.expr else {
    return false;
  };
  let Some(ast::Expr::Member(member)) = assign.left.as_target_expr() else {
    return false;
  };
  is_global_object(&member.obj, unresolved_ctxt)
    && matches!(&member.prop, ast::MemberProp::Ident(prop) if prop.sym == *name)
}

/// `self.<name> = <value>;`
fn global_assign(name: JsWord, value: Box<ast::Expr>) -> ast::Stmt {
  ast::Stmt::Expr(ast::ExprStmt {
    span: DUMMY_SP,
    expr: Box::new(ast::Expr::Assign(ast::AssignExpr {
      span: DUMMY_SP,
      op: ast::AssignOp::Assign,
      left: ast::PatOrExpr::Expr(Box::new(ast::Expr::Member(ast::MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(ast::Expr::Ident(quote_ident!("self"))),
        prop: ast::MemberProp::Ident(quote_ident!(name)),
      }))),
      right: value,
    })),
  })
}
