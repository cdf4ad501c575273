mod common;

use common::{assert_normalized, normalize};

#[test]
fn requires_become_imports_and_body_is_wrapped() {
  assert_normalized(
    r#"
const fs = require("fs");
exports.read = function (path) {
  return fs.readFileSync(path);
};
"#,
    r#"
import fs from "fs";
const _module = { exports: {} };
(function (module, exports) {
  exports.read = function (path) {
    return fs.readFileSync(path);
  };
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn default_reassignment_runs_after_the_last_named_export() {
  assert_normalized(
    r#"
exports.a = 1;
function F() {}
module.exports = F;
exports.b = 2;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.a = 1;
  function F() {}
  exports.b = 2;
  module.exports = Object.assign(F, exports);
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn named_default_declaration_merges_after_later_named_exports() {
  assert_normalized(
    r#"
exports.a = 1;
export default function F() {}
exports.b = 2;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.a = 1;
  function F() {}
  exports.b = 2;
  module.exports = Object.assign(F, exports);
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn bare_load_becomes_side_effect_import() {
  assert_normalized(r#"require("polyfill");"#, r#"import "polyfill";"#);
}

#[test]
fn side_effect_load_is_hoisted_out_of_a_wrapped_body() {
  assert_normalized(
    r#"
require("./polyfill");
exports.ready = true;
"#,
    r#"
import "./polyfill";
const _module = { exports: {} };
(function (module, exports) {
  exports.ready = true;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn shadowed_loader_is_left_alone() {
  assert_normalized(
    r#"
function f(require) {
  return require("x");
}
exports.f = f;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  function f(require) {
    return require("x");
  }
  exports.f = f;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn load_order_is_preserved_across_imports_and_requires() {
  assert_normalized(
    r#"
import a from "a";
const b = require("b");
import c from "c";
"#,
    r#"
import a from "a";
import b from "b";
import c from "c";
"#,
  );
}

#[test]
fn default_member_read_keeps_the_declared_binding() {
  assert_normalized(
    r#"
const styled = require("styled-components").default;
exports.Button = styled.button;
"#,
    r#"
import styled from "styled-components";
const _module = { exports: {} };
(function (module, exports) {
  exports.Button = styled.button;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn default_member_read_in_expression_position_gets_a_generated_name() {
  assert_normalized(
    r#"
exports.Button = require("styled-components").default.button;
"#,
    r#"
import _styledComponents from "styled-components";
const _module = { exports: {} };
(function (module, exports) {
  exports.Button = _styledComponents.button;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn destructured_load_becomes_named_imports() {
  assert_normalized(
    r#"
const { join, resolve: resolvePath } = require("path");
console.log(join("a", resolvePath("b")));
"#,
    r#"
import { join, resolve as resolvePath } from "path";
console.log(join("a", resolvePath("b")));
"#,
  );
}

#[test]
fn exports_default_assignment_is_merged_and_repositioned() {
  assert_normalized(
    r#"
exports.a = 1;
exports.default = function make() {};
exports.b = 2;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.a = 1;
  exports.b = 2;
  module.exports = Object.assign(function make() {}, exports);
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn default_export_specifier_is_merged_like_a_reassignment() {
  assert_normalized(
    r#"
const api = {};
export { api as default };
exports.extra = 1;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  const api = {};
  exports.extra = 1;
  module.exports = Object.assign(api, exports);
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn parameter_default_load_makes_the_module_common_js() {
  assert_normalized(
    r#"
function f(a = require("x")) {
  return a;
}
"#,
    r#"
import _x from "x";
const _module = { exports: {} };
(function (module, exports) {
  function f(a = _x) {
    return a;
  }
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn literal_reassignment_is_not_merged() {
  assert_normalized(
    r#"
exports.name = "x";
module.exports = 42;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.name = "x";
  module.exports = 42;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn export_declarations_lower_to_one_assignment_per_declarator() {
  assert_normalized(
    r#"
export const a = 1, b = 2;
exports.c = 3;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.a = 1;
  exports.b = 2;
  exports.c = 3;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn export_lists_and_function_exports_lower_to_assignments() {
  assert_normalized(
    r#"
function helper() {}
export { helper };
export function main() {}
module.exports.extra = 1;
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  function helper() {}
  exports.helper = helper;
  function main() {}
  exports.main = main;
  module.exports.extra = 1;
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn anonymous_default_class_is_assigned_directly() {
  assert_normalized(
    r#"
exports.version = "1.0";
export default class {}
"#,
    r#"
const _module = { exports: {} };
(function (module, exports) {
  exports.version = "1.0";
  module.exports = class {};
})(_module, _module.exports);
export default _module.exports;
"#,
  );
}

#[test]
fn umd_this_argument_becomes_self_and_guard_gains_a_global_fallback() {
  assert_normalized(
    r#"
(function (global, factory) {
  if (typeof window.Mustache === "undefined") {
    module.exports = factory();
  }
})(this, function () {
  return { render: function () {} };
});
"#,
    r#"
(function (global, factory) {
  if (typeof window.Mustache === "undefined") {
    module.exports = factory();
  }
  self.Mustache = factory();
})(self, function () {
  return { render: function () {} };
});
"#,
  );
}

#[test]
fn umd_internal_loads_are_hoisted_ahead_of_the_envelope() {
  assert_normalized(
    r#"
(function (factory) {
  factory(require("jquery"));
})(this, function ($) {
  $.fn.plugin = function () {};
});
"#,
    r#"
import _jquery from "jquery";
(function (factory) {
  factory(_jquery);
})(self, function ($) {
  $.fn.plugin = function () {};
});
"#,
  );
}

#[test]
fn native_module_syntax_is_untouched() {
  assert_normalized(
    r#"
import a from "a";
export const b = a + 1;
export default function main() {}
"#,
    r#"
import a from "a";
export const b = a + 1;
export default function main() {}
"#,
  );
}

#[test]
fn parse_failures_surface_as_errors() {
  let error = esmify::Normalizer::new()
    .normalize_source(
      std::path::PathBuf::from("broken.js"),
      "const a = \"unterminated".to_string(),
    )
    .unwrap_err();
  assert_eq!(error.kind.code(), esmify_error::error_code::PARSE_JS_FAILED);
}

#[test]
fn normalizing_twice_changes_nothing() {
  let inputs = [
    // CommonJS
    r#"
const fs = require("fs");
exports.a = 1;
function F() {}
module.exports = F;
exports.b = 2;
"#,
    // UMD
    r#"
(function (global, factory) {
  if (typeof window.Mustache === "undefined") {
    module.exports = factory();
  }
})(this, function () {
  return {};
});
"#,
    // already native
    r#"
import a from "a";
export default a;
"#,
  ];
  for input in inputs {
    let once = normalize(input);
    let twice = normalize(&once);
    assert_eq!(once, twice);
  }
}
