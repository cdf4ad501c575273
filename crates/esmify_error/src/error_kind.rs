use std::{fmt::Display, sync::Arc};

use swc_core::common::SourceFile;

pub mod error_code {
  pub const PARSE_JS_FAILED: &str = "PARSE_JS_FAILED";
  pub const READ_FILE_FAILED: &str = "READ_FILE_FAILED";
  pub const PANIC: &str = "PANIC";
}

#[derive(Debug)]
pub enum ErrorKind {
  ParseJsFailed {
    source_file: Arc<SourceFile>,
    source: swc_core::ecma::parser::error::Error,
  },

  ReadFileFailed {
    filename: String,
    source: std::io::Error,
  },

  /// Unrecoverable errors and plain `throw`-style failures. Prefer this over
  /// `panic!()` for graceful shutdown.
  Panic {
    source: anyhow::Error,
  },
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ErrorKind::ParseJsFailed { source_file, .. } => {
        write!(f, "Parse failed: {}", source_file.name)
      }
      ErrorKind::ReadFileFailed { filename, source } => {
        write!(f, "Read file failed: {} {}", filename, source)
      }
      ErrorKind::Panic { source } => source.fmt(f),
    }
  }
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      ErrorKind::ParseJsFailed { .. } => error_code::PARSE_JS_FAILED,
      ErrorKind::ReadFileFailed { .. } => error_code::READ_FILE_FAILED,
      ErrorKind::Panic { .. } => error_code::PANIC,
    }
  }
}
