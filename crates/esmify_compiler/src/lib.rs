use std::{path::PathBuf, sync::Arc};

use ast::EsVersion;
use esmify_error::{Error, Result};
use swc_common::{
  comments::Comments,
  errors::{ColorConfig, Handler},
  FileName, SourceMap,
};
use swc_core::{
  common::{self as swc_common, SourceFile},
  ecma::{ast, codegen as swc_ecma_codegen, parser as swc_ecma_parser},
};
use swc_ecma_codegen::text_writer::JsWriter;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

#[derive(Default)]
pub struct Compiler {
  pub cm: Arc<SourceMap>,
}

impl Compiler {
  pub fn with_cm(cm: Arc<SourceMap>) -> Self {
    Self { cm }
  }

  pub fn create_source_file(&self, filename: PathBuf, code: String) -> Arc<SourceFile> {
    self.cm.new_source_file(FileName::Real(filename), code)
  }

  pub fn parse(&self, source_file: Arc<SourceFile>, syntax: Syntax) -> Result<ast::Module> {
    self.parse_with_comments(source_file, syntax, None)
  }

  pub fn parse_with_comments(
    &self,
    source_file: Arc<SourceFile>,
    syntax: Syntax,
    comments: Option<&dyn Comments>,
  ) -> Result<ast::Module> {
    let handler = Handler::with_tty_emitter(ColorConfig::Auto, true, false, Some(self.cm.clone()));

    let lexer = Lexer::new(
      syntax,
      EsVersion::latest(),
      StringInput::from(source_file.as_ref()),
      comments,
    );
    let mut parser = Parser::new_from(lexer);
    // Recovered errors are only reported, the module is still usable.
    parser.take_errors().into_iter().for_each(|e| {
      e.into_diagnostic(&handler).emit();
    });
    parser
      .parse_module()
      .map_err(|source| Error::parse_js_failed(source_file.clone(), source))
  }

  pub fn print(&self, ast: &ast::Module, comments: Option<&dyn Comments>) -> Result<String> {
    let mut output = Vec::new();

    let mut emitter = swc_ecma_codegen::Emitter {
      cfg: swc_ecma_codegen::Config {
        ..Default::default()
      },
      cm: self.cm.clone(),
      comments: Some(&comments),
      wr: Box::new(JsWriter::new(self.cm.clone(), "\n", &mut output, None)),
    };

    emitter
      .emit_module(ast)
      .map_err(|e| Error::panic(format!("emit failed: {e}")))?;
    String::from_utf8(output).map_err(|e| Error::panic(format!("emitted invalid utf-8: {e}")))
  }
}
