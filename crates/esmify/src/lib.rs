//! Source-to-source module-system normalizer: programs written against
//! CommonJS `require`/`module.exports` conventions or a UMD factory envelope
//! are rewritten so all module linkage goes through native import/export
//! declarations, with runtime behavior and statement ordering preserved.

use std::{
  fs,
  path::{Path, PathBuf},
};

use esmify_compiler::Compiler;
use esmify_error::{Error, Result};
use swc_core::{
  common::{Globals, Mark, SyntaxContext, GLOBALS},
  ecma::{
    parser::Syntax,
    transforms::base::{
      fixer::{fixer, paren_remover},
      resolver,
    },
    visit::FoldWith,
  },
};

pub use esmify_swc_visitors::{detect, normalize, Detection};

pub struct Normalizer {
  compiler: Compiler,
}

impl Default for Normalizer {
  fn default() -> Self {
    Self::new()
  }
}

impl Normalizer {
  pub fn new() -> Self {
    esmify_tracing::enable_tracing_on_demand();
    Self {
      compiler: Compiler::default(),
    }
  }

  pub fn normalize_file(&self, path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let code = fs::read_to_string(path)
      .map_err(|source| Error::read_file_failed(path.to_string_lossy(), source))?;
    self.normalize_source(path.to_path_buf(), code)
  }

  /// Parse, rewrite and reprint one program. Each call gets fresh marks and
  /// fresh detection state, so no state leaks across programs.
  pub fn normalize_source(&self, filename: PathBuf, code: String) -> Result<String> {
    GLOBALS.set(&Globals::default(), || {
      tracing::debug!(file = %filename.display(), "normalizing");
      let source_file = self.compiler.create_source_file(filename, code);
      let module = self
        .compiler
        .parse(source_file, Syntax::Es(Default::default()))?;

      let unresolved_mark = Mark::new();
      let top_level_mark = Mark::new();
      let mut module = module
        .fold_with(&mut paren_remover(None))
        .fold_with(&mut resolver(unresolved_mark, top_level_mark, false));
      let unresolved_ctxt = SyntaxContext::empty().apply_mark(unresolved_mark);

      normalize(&mut module, unresolved_ctxt);

      let module = module.fold_with(&mut fixer(None));
      self.compiler.print(&module, None)
    })
  }
}
