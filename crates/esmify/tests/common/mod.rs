use std::path::PathBuf;

use esmify::Normalizer;
use esmify_compiler::Compiler;
use swc_core::ecma::parser::Syntax;

pub fn normalize(source: &str) -> String {
  Normalizer::new()
    .normalize_source(PathBuf::from("input.js"), source.to_string())
    .unwrap()
}

/// Reprint through the same parser and printer so both sides of an
/// assertion share one formatting.
pub fn reprint(source: &str) -> String {
  let compiler = Compiler::default();
  let fm = compiler.create_source_file(PathBuf::from("expected.js"), source.to_string());
  let module = compiler
    .parse(fm, Syntax::Es(Default::default()))
    .unwrap();
  compiler.print(&module, None).unwrap()
}

pub fn assert_normalized(input: &str, expected: &str) {
  assert_eq!(normalize(input), reprint(expected));
}
