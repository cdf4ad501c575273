use esmify_swc_utils::{RequireCallExt, UniqueNamer};
use swc_core::{
  common::{SyntaxContext, DUMMY_SP},
  ecma::{
    ast,
    visit::{VisitMut, VisitMutWith},
  },
};

/// Strip every recognized dependency load out of the program and return the
/// import declarations that replace them, in the order the loads were
/// encountered. Existing import declarations are relocated into the same
/// sequence so import ordering is uniform. The caller decides where the
/// hoisted block goes (ahead of the wrapper, or at the top of the body).
pub fn hoist_dependency_loads(
  module: &mut ast::Module,
  unresolved_ctxt: SyntaxContext,
  namer: &mut UniqueNamer,
) -> Vec<ast::ModuleItem> {
  let mut rewriter = DependencyLoadRewriter {
    unresolved_ctxt,
    namer,
    hoisted: Vec::new(),
  };
  module.visit_mut_with(&mut rewriter);
  tracing::trace!(count = rewriter.hoisted.len(), "hoisted dependency loads");
  rewriter.hoisted
}

struct DependencyLoadRewriter<'a> {
  unresolved_ctxt: SyntaxContext,
  namer: &'a mut UniqueNamer,
  hoisted: Vec<ast::ModuleItem>,
}

impl DependencyLoadRewriter<'_> {
  /// Synthesize `import <fresh> from <specifier>;` and hand back the binding.
  fn default_import(&mut self, specifier: &ast::Str) -> ast::Ident {
    let local = self.namer.claim(&specifier.value);
    self.hoisted.push(import_decl(
      vec![ast::ImportSpecifier::Default(ast::ImportDefaultSpecifier {
        span: DUMMY_SP,
        local: local.clone(),
      })],
      specifier.clone(),
    ));
    local
  }

  /// A single-declarator `const`/`let`/`var` whose initializer is a
  /// recognized load (or a `.default` read off one) turns into an import
  /// that reuses the original binding names: identifier patterns become a
  /// default import, plain object patterns become named imports. Defaults,
  /// rest and computed keys keep the declarator as-is (the initializer is
  /// rewritten generically instead).
  fn binding_import(&mut self, declarator: &ast::VarDeclarator) -> Option<ast::ModuleItem> {
    let init = declarator.init.as_deref()?;
    let (call, via_default) = match init {
      ast::Expr::Call(call) => (call, false),
      ast::Expr::Member(member) => {
        let ast::Expr::Call(call) = &*member.obj else {
          return None;
        };
        if !matches!(&member.prop, ast::MemberProp::Ident(prop) if prop.sym == *"default") {
          return None;
        }
        (call, true)
      }
      _ => return None,
    };
    let specifier = call.require_specifier(self.unresolved_ctxt)?;

    match &declarator.name {
      ast::Pat::Ident(binding) => Some(import_decl(
        vec![ast::ImportSpecifier::Default(ast::ImportDefaultSpecifier {
          span: DUMMY_SP,
          local: binding.id.clone(),
        })],
        specifier.clone(),
      )),
      // Destructuring `.default` picks properties off the default export,
      // which named imports cannot express.
      ast::Pat::Object(object) if !via_default => {
        let mut specifiers = Vec::with_capacity(object.props.len());
        for prop in &object.props {
          match prop {
            ast::ObjectPatProp::Assign(assign) if assign.value.is_none() => {
              specifiers.push(ast::ImportSpecifier::Named(ast::ImportNamedSpecifier {
                span: DUMMY_SP,
                local: assign.key.clone(),
                imported: None,
                is_type_only: false,
              }));
            }
            ast::ObjectPatProp::KeyValue(ast::KeyValuePatProp {
              key: ast::PropName::Ident(key),
              value,
            }) => {
              let ast::Pat::Ident(local) = &**value else {
                return None;
              };
              specifiers.push(ast::ImportSpecifier::Named(ast::ImportNamedSpecifier {
                span: DUMMY_SP,
                local: local.id.clone(),
                imported: Some(ast::ModuleExportName::Ident(key.clone())),
                is_type_only: false,
              }));
            }
            _ => return None,
          }
        }
        Some(import_decl(specifiers, specifier.clone()))
      }
      _ => None,
    }
  }
}

impl VisitMut for DependencyLoadRewriter<'_> {
  fn visit_mut_module_items(&mut self, items: &mut Vec<ast::ModuleItem>) {
    let mut rest = Vec::with_capacity(items.len());
    for mut item in std::mem::take(items) {
      match &item {
        ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(_)) => {
          self.hoisted.push(item);
          continue;
        }
        ast::ModuleItem::Stmt(ast::Stmt::Expr(expr_stmt)) => {
          if let ast::Expr::Call(call) = &*expr_stmt.expr {
            if let Some(specifier) = call.require_specifier(self.unresolved_ctxt) {
              // Result discarded: only the loading side effect survives.
              self.hoisted.push(import_decl(vec![], specifier.clone()));
              continue;
            }
          }
        }
        ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(var))) => {
          if var.decls.len() == 1 {
            if let Some(import) = self.binding_import(&var.decls[0]) {
              self.hoisted.push(import);
              continue;
            }
          }
        }
        _ => {}
      }
      item.visit_mut_with(self);
      rest.push(item);
    }
    *items = rest;
  }

  fn visit_mut_expr(&mut self, expr: &mut ast::Expr) {
    // `require("x").default` collapses straight onto the default binding.
    if let ast::Expr::Member(member) = expr {
      if let (ast::Expr::Call(call), ast::MemberProp::Ident(prop)) = (&*member.obj, &member.prop) {
        if prop.sym == *"default" {
          if let Some(specifier) = call.require_specifier(self.unresolved_ctxt) {
            let specifier = specifier.clone();
            let local = self.default_import(&specifier);
            *expr = ast::Expr::Ident(local);
            return;
          }
        }
      }
    }
    if let ast::Expr::Call(call) = expr {
      if let Some(specifier) = call.require_specifier(self.unresolved_ctxt) {
        let specifier = specifier.clone();
        let local = self.default_import(&specifier);
        *expr = ast::Expr::Ident(local);
        return;
      }
    }
    expr.visit_mut_children_with(self);
  }
}

fn import_decl(specifiers: Vec<ast::ImportSpecifier>, src: ast::Str) -> ast::ModuleItem {
  ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(ast::ImportDecl {
    span: DUMMY_SP,
    specifiers,
    src: Box::new(src),
    type_only: false,
    asserts: None,
  }))
}
