use esmify_swc_utils::{AssignTargetExt, ModuleConventionExt};
use swc_core::{
  common::{BytePos, Span, Spanned, SyntaxContext, DUMMY_SP},
  ecma::{
    ast,
    utils::{member_expr, quote_ident},
    visit::{VisitMut, VisitMutWith},
  },
};

/// Lower every export shape to an assignment against the canonical `exports`
/// object, positioning merges so that named-property assignments always run
/// before the default value is finalized.
pub fn normalize_exports(module: &mut ast::Module, unresolved_ctxt: SyntaxContext) {
  let mut normalizer = ExportNormalizer {
    unresolved_ctxt,
    latest_export: None,
    merges: Vec::new(),
    reassignments: Vec::new(),
  };
  module.visit_mut_with(&mut normalizer);
}

/// A queued `module.exports = ...` statement, addressed by the source
/// position of the statement it still occupies in the body.
struct Reassign {
  site: BytePos,
  // Literals and `undefined` cannot carry named properties, so they are
  // repositioned without the `Object.assign` fold.
  mergeable: bool,
}

struct ExportNormalizer {
  unresolved_ctxt: SyntaxContext,
  /// Source position of the rightmost named-export assignment seen so far.
  latest_export: Option<BytePos>,
  /// Merge statements for named default declarations, keyed by the position
  /// of the declaration they follow.
  merges: Vec<(BytePos, ast::Stmt)>,
  reassignments: Vec<Reassign>,
}

impl ExportNormalizer {
  fn track_export_site(&mut self, site: BytePos) {
    if self.latest_export.map_or(true, |latest| site > latest) {
      self.latest_export = Some(site);
    }
  }

  /// `export const a = 1, b = 2;` becomes one `exports.<name> = <init>;`
  /// statement per declarator, each keeping its declarator's position.
  fn lower_export_decl(&mut self, export: ast::ExportDecl, out: &mut Vec<ast::ModuleItem>) {
    match export.decl {
      ast::Decl::Var(var) => {
        // Destructuring declarators have no single name to assign under and
        // an initializer-less `export let` has no value yet, so such
        // declarations stay as they are.
        let lowerable = var.decls.iter().all(|declarator| {
          matches!(declarator.name, ast::Pat::Ident(_)) && declarator.init.is_some()
        });
        if !lowerable {
          out.push(ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(
            ast::ExportDecl {
              span: export.span,
              decl: ast::Decl::Var(var),
            },
          )));
          return;
        }
        for declarator in var.decls {
          let ast::Pat::Ident(binding) = declarator.name else {
            unreachable!()
          };
          let Some(init) = declarator.init else {
            unreachable!()
          };
          self.track_export_site(declarator.span.lo);
          out.push(exports_assign(declarator.span, binding.id, *init));
        }
      }
      ast::Decl::Fn(decl) => {
        let name = decl.ident.clone();
        out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Fn(decl))));
        self.track_export_site(export.span.lo);
        out.push(exports_assign(
          export.span,
          name.clone(),
          ast::Expr::Ident(name),
        ));
      }
      ast::Decl::Class(decl) => {
        let name = decl.ident.clone();
        out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Class(
          decl,
        ))));
        self.track_export_site(export.span.lo);
        out.push(exports_assign(
          export.span,
          name.clone(),
          ast::Expr::Ident(name),
        ));
      }
      decl => out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(decl))),
    }
  }

  /// `export { a, b as c };` becomes `exports.a = a; exports.c = b;`, one
  /// assignment per specifier, each keeping its specifier's position.
  fn lower_export_named(&mut self, export: ast::NamedExport, out: &mut Vec<ast::ModuleItem>) {
    for specifier in export.specifiers {
      let ast::ExportSpecifier::Named(named) = specifier else {
        continue;
      };
      let span = named.span;
      let ast::ModuleExportName::Ident(orig) = named.orig else {
        continue;
      };
      let exported = match named.exported {
        Some(ast::ModuleExportName::Ident(exported)) => exported,
        _ => orig.clone(),
      };
      if exported.sym == *"default" {
        // `export { a as default };` is a default reassignment, not a named
        // property, and goes through the same queue.
        let value = ast::Expr::Ident(orig);
        self.reassignments.push(Reassign {
          site: span.lo,
          mergeable: is_mergeable(&value),
        });
        out.push(module_exports_assign(span, value));
        continue;
      }
      self.track_export_site(span.lo);
      out.push(exports_assign(span, exported, ast::Expr::Ident(orig)));
    }
  }

  fn lower_export_default_decl(
    &mut self,
    export: ast::ExportDefaultDecl,
    out: &mut Vec<ast::ModuleItem>,
  ) {
    match export.decl {
      ast::DefaultDecl::Fn(fn_expr) => match fn_expr.ident {
        Some(ident) => {
          let site = fn_expr.function.span.lo;
          self.queue_merge(site, ident.clone());
          out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Fn(
            ast::FnDecl {
              ident,
              declare: false,
              function: fn_expr.function,
            },
          ))));
        }
        None => out.push(module_exports_assign(
          export.span,
          ast::Expr::Fn(ast::FnExpr {
            ident: None,
            function: fn_expr.function,
          }),
        )),
      },
      ast::DefaultDecl::Class(class_expr) => match class_expr.ident {
        Some(ident) => {
          let site = class_expr.class.span.lo;
          self.queue_merge(site, ident.clone());
          out.push(ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Class(
            ast::ClassDecl {
              ident,
              declare: false,
              class: class_expr.class,
            },
          ))));
        }
        None => out.push(module_exports_assign(
          export.span,
          ast::Expr::Class(ast::ClassExpr {
            ident: None,
            class: class_expr.class,
          }),
        )),
      },
      ast::DefaultDecl::TsInterfaceDecl(_) => {
        out.push(ast::ModuleItem::ModuleDecl(
          ast::ModuleDecl::ExportDefaultDecl(export),
        ));
      }
    }
  }

  /// The declaration keeps its name usable in the rest of the module; the
  /// queued merge folds already-assigned named exports onto it.
  fn queue_merge(&mut self, site: BytePos, name: ast::Ident) {
    let value = if name.sym == *"undefined" {
      ast::Expr::Ident(name)
    } else {
      object_assign(ast::Expr::Ident(name))
    };
    let ast::ModuleItem::Stmt(stmt) = module_exports_assign(DUMMY_SP, value) else {
      unreachable!()
    };
    self.merges.push((site, stmt));
  }

  /// Top-level CommonJS assignment statements: `exports.default =` and
  /// `module.exports =` are queued for repositioning, `exports.<name> =`
  /// advances the latest export site.
  fn lower_top_level_assign(&mut self, stmt: &mut ast::ExprStmt) {
    enum Target {
      Default,
      Named,
      ModuleExports,
      Other,
    }

    let ast::Expr::Assign(assign) = &mut *stmt.expr else {
      return;
    };
    if assign.op != ast::AssignOp::Assign {
      return;
    }
    let target = match assign.left.as_target_expr() {
      Some(target) => match target.exports_member_name(self.unresolved_ctxt) {
        Some(name) if *name == *"default" => Target::Default,
        Some(_) => Target::Named,
        None if target.is_module_exports(self.unresolved_ctxt) => Target::ModuleExports,
        None => Target::Other,
      },
      None => Target::Other,
    };

    match target {
      Target::Default => {
        assign.left = ast::PatOrExpr::Expr(member_expr!(Default::default(), module.exports));
        self.reassignments.push(Reassign {
          site: stmt.span.lo,
          mergeable: is_mergeable(&assign.right),
        });
      }
      Target::Named => self.track_export_site(stmt.span.lo),
      Target::ModuleExports => self.reassignments.push(Reassign {
        site: stmt.span.lo,
        mergeable: is_mergeable(&assign.right),
      }),
      Target::Other => {}
    }
  }

  fn flush(&mut self, items: &mut Vec<ast::ModuleItem>) {
    let latest = self.latest_export;

    for (site, stmt) in std::mem::take(&mut self.merges) {
      let anchor = latest.map_or(site, |latest| latest.max(site));
      let at = match index_of_stmt(items, anchor) {
        Some(index) => index + 1,
        None => items.len(),
      };
      items.insert(at, ast::ModuleItem::Stmt(stmt));
    }

    for reassign in std::mem::take(&mut self.reassignments) {
      // Without named exports there is nothing to merge or to outrun.
      let Some(latest) = latest else {
        continue;
      };
      let Some(index) = index_of_stmt(items, reassign.site) else {
        continue;
      };
      let mut item = items.remove(index);
      if reassign.mergeable {
        fold_named_exports_into(&mut item);
      }
      let at = if latest > reassign.site {
        index_of_stmt(items, latest).map_or(items.len(), |index| index + 1)
      } else {
        index
      };
      items.insert(at.min(items.len()), item);
    }
  }
}

impl VisitMut for ExportNormalizer {
  fn visit_mut_module_items(&mut self, items: &mut Vec<ast::ModuleItem>) {
    let mut rebuilt = Vec::with_capacity(items.len());
    for item in std::mem::take(items) {
      match item {
        ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(export)) => {
          self.lower_export_decl(export, &mut rebuilt);
        }
        ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportNamed(export))
          if export.src.is_none() =>
        {
          self.lower_export_named(export, &mut rebuilt);
        }
        ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDefaultDecl(export)) => {
          self.lower_export_default_decl(export, &mut rebuilt);
        }
        ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDefaultExpr(export)) => {
          rebuilt.push(module_exports_assign(export.span, *export.expr));
        }
        ast::ModuleItem::Stmt(ast::Stmt::Expr(mut expr_stmt)) => {
          self.lower_top_level_assign(&mut expr_stmt);
          let mut item = ast::ModuleItem::Stmt(ast::Stmt::Expr(expr_stmt));
          item.visit_mut_with(self);
          rebuilt.push(item);
        }
        mut other => {
          other.visit_mut_with(self);
          rebuilt.push(other);
        }
      }
    }
    *items = rebuilt;
    self.flush(items);
  }

  fn visit_mut_assign_expr(&mut self, assign: &mut ast::AssignExpr) {
    // Nested `exports.default = x` still targets the default export.
    if assign.op == ast::AssignOp::Assign {
      let is_default_target = assign
        .left
        .as_target_expr()
        .and_then(|target| target.exports_member_name(self.unresolved_ctxt))
        .map_or(false, |name| *name == *"default");
      if is_default_target {
        assign.left = ast::PatOrExpr::Expr(member_expr!(Default::default(), module.exports));
      }
    }
    assign.visit_mut_children_with(self);
  }
}

fn is_mergeable(value: &ast::Expr) -> bool {
  match value {
    ast::Expr::Lit(_) | ast::Expr::Tpl(_) => false,
    ast::Expr::Unary(unary) => unary.op != ast::UnaryOp::Void,
    ast::Expr::Ident(ident) => ident.sym != *"undefined",
    _ => true,
  }
}

/// `Object.assign(<value>, exports)`
fn object_assign(value: ast::Expr) -> ast::Expr {
  ast::Expr::Call(ast::CallExpr {
    span: DUMMY_SP,
    callee: ast::Callee::Expr(member_expr!(Default::default(), Object.assign)),
    args: vec![
      ast::ExprOrSpread {
        spread: None,
        expr: Box::new(value),
      },
      ast::ExprOrSpread {
        spread: None,
        expr: Box::new(ast::Expr::Ident(quote_ident!("exports"))),
      },
    ],
    type_args: None,
  })
}

fn exports_assign(span: Span, name: ast::Ident, value: ast::Expr) -> ast::ModuleItem {
  let target = ast::Expr::Member(ast::MemberExpr {
    span: DUMMY_SP,
    obj: Box::new(ast::Expr::Ident(quote_ident!("exports"))),
    prop: ast::MemberProp::Ident(name),
  });
  assign_stmt(span, target, value)
}

fn module_exports_assign(span: Span, value: ast::Expr) -> ast::ModuleItem {
  assign_stmt(span, *member_expr!(Default::default(), module.exports), value)
}

fn assign_stmt(span: Span, target: ast::Expr, value: ast::Expr) -> ast::ModuleItem {
  ast::ModuleItem::Stmt(ast::Stmt::Expr(ast::ExprStmt {
    span,
    expr: Box::new(ast::Expr::Assign(ast::AssignExpr {
      span: DUMMY_SP,
      op: ast::AssignOp::Assign,
      left: ast::PatOrExpr::Expr(Box::new(target)),
      right: Box::new(value),
    })),
  }))
}

/// Rewrite `module.exports = X` into
/// `module.exports = Object.assign(X, exports)` in place.
fn fold_named_exports_into(item: &mut ast::ModuleItem) {
  let ast::ModuleItem::Stmt(ast::Stmt::Expr(expr_stmt)) = item else {
    return;
  };
  let ast::Expr::Assign(assign) = &mut *expr_stmt.expr else {
    return;
  };
  let value = std::mem::replace(
    &mut *assign.right,
    ast::Expr::Invalid(ast::Invalid { span: DUMMY_SP }),
  );
  *assign.right = object_assign(value);
}

fn index_of_stmt(items: &[ast::ModuleItem], site: BytePos) -> Option<usize> {
  items.iter().position(|item| item.span().lo == site)
}
