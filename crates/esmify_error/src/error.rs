use std::{fmt::Display, sync::Arc};

use swc_core::common::SourceFile;

use crate::ErrorKind;

#[derive(Debug)]
pub struct Error {
  contexts: Vec<String>,
  pub kind: ErrorKind,
}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: String) -> Self {
    self.contexts.push(context);
    self
  }

  pub fn parse_js_failed(
    source_file: Arc<SourceFile>,
    source: swc_core::ecma::parser::error::Error,
  ) -> Self {
    Self::with_kind(ErrorKind::ParseJsFailed {
      source_file,
      source,
    })
  }

  pub fn read_file_failed(filename: impl Into<String>, source: std::io::Error) -> Self {
    Self::with_kind(ErrorKind::ReadFileFailed {
      filename: filename.into(),
      source,
    })
  }

  pub fn panic(msg: String) -> Self {
    anyhow::format_err!(msg).into()
  }
}

impl std::convert::From<anyhow::Error> for Error {
  fn from(value: anyhow::Error) -> Self {
    Self::with_kind(ErrorKind::Panic { source: value })
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.kind.fmt(f)?;
    for context in &self.contexts {
      write!(f, "\n  caused by: {context}")?;
    }
    Ok(())
  }
}

impl std::error::Error for Error {}
