use esmify_swc_utils::UniqueNamer;
use swc_core::{
  common::DUMMY_SP,
  ecma::{ast, utils::quote_ident},
};

/// Wrap the body of a CommonJS program in a synthetic module invocation:
///
/// ```js
/// const _module = { exports: {} };
/// (function (module, exports) { /* original body */ })(_module, _module.exports);
/// export default _module.exports;
/// ```
///
/// `hoisted` import declarations land first; module declarations that
/// cannot live inside a function body stay at the top level after the
/// invocation.
pub fn wrap_in_synthetic_module(
  module: &mut ast::Module,
  hoisted: Vec<ast::ModuleItem>,
  namer: &mut UniqueNamer,
) {
  let module_obj = namer.claim("module");

  let mut stmts = Vec::new();
  let mut leftover = Vec::new();
  for item in std::mem::take(&mut module.body) {
    match item {
      ast::ModuleItem::Stmt(stmt) => stmts.push(stmt),
      decl => leftover.push(decl),
    }
  }

  let mut body = hoisted;
  body.push(module_object_decl(&module_obj));
  body.push(invocation(&module_obj, stmts));
  body.extend(leftover);
  body.push(ast::ModuleItem::ModuleDecl(
    ast::ModuleDecl::ExportDefaultExpr(ast::ExportDefaultExpr {
      span: DUMMY_SP,
      expr: Box::new(exports_member(&module_obj)),
    }),
  ));
  module.body = body;
}

/// `const <name> = { exports: {} };`
fn module_object_decl(name: &ast::Ident) -> ast::ModuleItem {
  ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
    span: DUMMY_SP,
    kind: ast::VarDeclKind::Const,
    declare: false,
    decls: vec![ast::VarDeclarator {
      span: DUMMY_SP,
      name: binding(name.clone()),
      init: Some(Box::new(ast::Expr::Object(ast::ObjectLit {
        span: DUMMY_SP,
        props: vec![ast::PropOrSpread::Prop(Box::new(ast::Prop::KeyValue(
          ast::KeyValueProp {
            key: ast::PropName::Ident(quote_ident!("exports")),
            value: Box::new(ast::Expr::Object(ast::ObjectLit {
              span: DUMMY_SP,
              props: vec![],
            })),
          },
        )))],
      }))),
      definite: false,
    }],
  }))))
}

/// `(function (module, exports) { ... })(<name>, <name>.exports);`
fn invocation(name: &ast::Ident, stmts: Vec<ast::Stmt>) -> ast::ModuleItem {
  ast::ModuleItem::Stmt(ast::Stmt::Expr(ast::ExprStmt {
    span: DUMMY_SP,
    expr: Box::new(ast::Expr::Call(ast::CallExpr {
      span: DUMMY_SP,
      callee: ast::Callee::Expr(Box::new(ast::Expr::Fn(ast::FnExpr {
        ident: None,
        function: Box::new(ast::Function {
          params: vec![
            param(quote_ident!("module")),
            param(quote_ident!("exports")),
          ],
          decorators: vec![],
          span: DUMMY_SP,
          body: Some(ast::BlockStmt {
            span: DUMMY_SP,
            stmts,
          }),
          is_generator: false,
          is_async: false,
          type_params: None,
          return_type: None,
        }),
      }))),
      args: vec![
        ast::ExprOrSpread {
          spread: None,
          expr: Box::new(ast::Expr::Ident(name.clone())),
        },
        ast::ExprOrSpread {
          spread: None,
          expr: Box::new(exports_member(name)),
        },
      ],
      type_args: None,
    })),
  }))
}

fn exports_member(name: &ast::Ident) -> ast::Expr {
  ast::Expr::Member(ast::MemberExpr {
    span: DUMMY_SP,
    obj: Box::new(ast::Expr::Ident(name.clone())),
    prop: ast::MemberProp::Ident(quote_ident!("exports")),
  })
}

fn binding(id: ast::Ident) -> ast::Pat {
  ast::Pat::Ident(ast::BindingIdent { id, type_ann: None })
}

fn param(id: ast::Ident) -> ast::Param {
  ast::Param {
    span: DUMMY_SP,
    decorators: vec![],
    pat: binding(id),
  }
}
