use esmify_swc_utils::{AssignTargetExt, ModuleConventionExt, RequireCallExt};
use swc_core::{
  common::SyntaxContext,
  ecma::{
    ast,
    utils::quote_ident,
    visit::{Visit, VisitWith},
  },
};

/// Which legacy module convention the program uses. The flags are mutually
/// exclusive: a matched factory envelope suppresses the CommonJS scan.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detection {
  pub is_common_js: bool,
  pub is_umd: bool,
}

/// Classify the program in one pass. Matching a factory envelope also
/// rewrites its `this` arguments to `self`, since the emitted module no
/// longer has an ambient `this` bound to the global object.
pub fn detect(module: &mut ast::Module, unresolved_ctxt: SyntaxContext) -> Detection {
  if rewrite_umd_envelope(module) {
    return Detection {
      is_common_js: false,
      is_umd: true,
    };
  }

  let mut detector = CommonJsDetector {
    unresolved_ctxt,
    nesting: 0,
    found: false,
  };
  module.visit_with(&mut detector);
  Detection {
    is_common_js: detector.found,
    is_umd: false,
  }
}

/// The envelope shape is a body that is a single self-invoking function
/// expression statement; import declarations ahead of it are tolerated so an
/// already-normalized program still matches.
fn rewrite_umd_envelope(module: &mut ast::Module) -> bool {
  let mut envelope: Option<&mut ast::CallExpr> = None;
  for item in &mut module.body {
    match item {
      ast::ModuleItem::ModuleDecl(ast::ModuleDecl::Import(_)) => {}
      ast::ModuleItem::Stmt(ast::Stmt::Expr(expr_stmt)) => {
        let ast::Expr::Call(call) = &mut *expr_stmt.expr else {
          return false;
        };
        if !matches!(&call.callee, ast::Callee::Expr(callee) if matches!(&**callee, ast::Expr::Fn(_))) {
          return false;
        }
        if envelope.is_some() {
          return false;
        }
        envelope = Some(call);
      }
      _ => return false,
    }
  }
  let Some(call) = envelope else {
    return false;
  };
  for arg in &mut call.args {
    if arg.spread.is_none() && matches!(&*arg.expr, ast::Expr::This(_)) {
      arg.expr = Box::new(ast::Expr::Ident(quote_ident!("self")));
    }
  }
  true
}

struct CommonJsDetector {
  unresolved_ctxt: SyntaxContext,
  nesting: u32,
  found: bool,
}

impl CommonJsDetector {
  fn reads_exports_object(&self, expr: &ast::Expr) -> bool {
    expr.is_unshadowed_exports(self.unresolved_ctxt) || expr.is_module_exports(self.unresolved_ctxt)
  }
}

impl Visit for CommonJsDetector {
  fn visit_block_stmt(&mut self, block: &ast::BlockStmt) {
    self.nesting += 1;
    block.visit_children_with(self);
    self.nesting -= 1;
  }

  // Parameter defaults sit outside the body block but still evaluate per
  // call, so the whole function counts as nested.
  fn visit_function(&mut self, function: &ast::Function) {
    self.nesting += 1;
    function.visit_children_with(self);
    self.nesting -= 1;
  }

  fn visit_arrow_expr(&mut self, arrow: &ast::ArrowExpr) {
    // An expression-bodied arrow has no block to bump the nesting.
    self.nesting += 1;
    arrow.visit_children_with(self);
    self.nesting -= 1;
  }

  // Field initializers evaluate per instance.
  fn visit_class(&mut self, class: &ast::Class) {
    self.nesting += 1;
    class.visit_children_with(self);
    self.nesting -= 1;
  }

  fn visit_var_declarator(&mut self, declarator: &ast::VarDeclarator) {
    if let Some(init) = &declarator.init {
      if self.reads_exports_object(init) {
        self.found = true;
      }
    }
    declarator.visit_children_with(self);
  }

  fn visit_assign_expr(&mut self, assign: &ast::AssignExpr) {
    if self.reads_exports_object(&assign.right) {
      self.found = true;
    }
    if let Some(target) = assign.left.as_target_expr() {
      if target.is_module_exports(self.unresolved_ctxt)
        || target.is_module_exports_member(self.unresolved_ctxt)
        || target.exports_member_name(self.unresolved_ctxt).is_some()
      {
        self.found = true;
      }
    }
    assign.visit_children_with(self);
  }

  fn visit_call_expr(&mut self, call: &ast::CallExpr) {
    // A top-level load can be hoisted losslessly, so it alone does not make
    // the program CommonJS.
    if self.nesting > 0 && call.require_specifier(self.unresolved_ctxt).is_some() {
      self.found = true;
    }
    call.visit_children_with(self);
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use esmify_compiler::Compiler;
  use swc_core::{
    common::{Globals, Mark, GLOBALS},
    ecma::{
      parser::Syntax,
      transforms::base::{fixer::paren_remover, resolver},
      visit::FoldWith,
    },
  };

  use super::*;

  fn detect_source(source: &str) -> Detection {
    GLOBALS.set(&Globals::default(), || {
      let compiler = Compiler::default();
      let fm = compiler.create_source_file(PathBuf::from("input.js"), source.to_string());
      let module = compiler.parse(fm, Syntax::Es(Default::default())).unwrap();
      let unresolved_mark = Mark::new();
      let top_level_mark = Mark::new();
      let mut module = module
        .fold_with(&mut paren_remover(None))
        .fold_with(&mut resolver(unresolved_mark, top_level_mark, false));
      let unresolved_ctxt = SyntaxContext::empty().apply_mark(unresolved_mark);
      detect(&mut module, unresolved_ctxt)
    })
  }

  #[test]
  fn exports_assignment_marks_common_js() {
    let detection = detect_source("exports.a = 1;");
    assert!(detection.is_common_js);
    assert!(!detection.is_umd);
  }

  #[test]
  fn module_exports_member_marks_common_js() {
    assert!(detect_source("module.exports.util = function () {};").is_common_js);
  }

  #[test]
  fn reading_exports_into_a_variable_marks_common_js() {
    assert!(detect_source("const published = module.exports;").is_common_js);
  }

  #[test]
  fn top_level_require_alone_is_not_common_js() {
    assert!(!detect_source("const a = require(\"a\");").is_common_js);
  }

  #[test]
  fn nested_require_marks_common_js() {
    assert!(detect_source("function load() { return require(\"a\"); }").is_common_js);
  }

  #[test]
  fn require_in_a_parameter_default_marks_common_js() {
    assert!(detect_source("function f(a = require(\"x\")) {}").is_common_js);
  }

  #[test]
  fn require_in_a_class_field_initializer_marks_common_js() {
    assert!(detect_source("class A { x = require(\"m\"); }").is_common_js);
  }

  #[test]
  fn shadowed_names_are_ignored() {
    let detection = detect_source(
      "function f(exports, module, require) { exports.a = 1; module.exports = 2; require(\"x\"); }",
    );
    assert!(!detection.is_common_js);
  }

  #[test]
  fn factory_envelope_is_umd() {
    let detection = detect_source("(function (root, factory) { root.lib = factory(); })(this, function () {});");
    assert!(detection.is_umd);
    assert!(!detection.is_common_js);
  }

  #[test]
  fn envelope_plus_second_statement_is_not_umd() {
    let detection = detect_source("(function () {})(); exports.a = 1;");
    assert!(!detection.is_umd);
    assert!(detection.is_common_js);
  }
}
