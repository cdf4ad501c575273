mod classify;
pub use classify::*;
mod imports;
pub use imports::*;
mod exports;
pub use exports::*;
mod umd;
pub use umd::*;
mod wrap;
pub use wrap::*;

use esmify_swc_utils::UniqueNamer;
use swc_core::{common::SyntaxContext, ecma::ast};

/// Rewrite one program so all of its module linkage is expressed through
/// native import/export declarations. The tree is mutated in place; feeding
/// the result back in is a no-op.
///
/// `unresolved_ctxt` is the syntax context the resolver stamped on
/// unresolved references, used to tell ambient `require`/`module`/`exports`
/// apart from local bindings of the same name.
pub fn normalize(module: &mut ast::Module, unresolved_ctxt: SyntaxContext) {
  let detection = detect(module, unresolved_ctxt);
  tracing::debug!(?detection, "classified program");

  if detection.is_umd {
    normalize_umd(module, unresolved_ctxt);
    return;
  }

  let mut namer = UniqueNamer::for_module(module);
  let hoisted = hoist_dependency_loads(module, unresolved_ctxt, &mut namer);

  if detection.is_common_js {
    // Export shapes are lowered to `exports.x = ...` assignments first, so
    // the wrapper receives a body free of export declarations.
    normalize_exports(module, unresolved_ctxt);
    wrap_in_synthetic_module(module, hoisted, &mut namer);
  } else {
    module.body.splice(0..0, hoisted);
  }
}
