//! Error adapter for converting ArborError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Tree document
//! errors point at the offending position in the JSON source; every other
//! error is reported with a code and, where useful, a hint.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use arbor::ArborError;

/// Adapter for a malformed tree document.
pub struct SourceAdapter<'a> {
    err: &'a serde_json::Error,
    src: &'a str,
}

impl<'a> SourceAdapter<'a> {
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    /// Byte span of the position reported by the JSON parser.
    fn span(&self) -> SourceSpan {
        let offset = byte_offset(self.src, self.err.line(), self.err.column());
        let len = usize::from(offset < self.src.len());
        SourceSpan::new(offset.into(), len)
    }
}

impl fmt::Debug for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for SourceAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid tree document")
    }
}

impl std::error::Error for SourceAdapter<'_> {}

impl MietteDiagnostic for SourceAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("arbor::source"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "each node is an object with a `name` and an optional `children` array",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_primary_with_span(Some(self.err.to_string()), self.span());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`ArborError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a ArborError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ArborError::Io(_) => "arbor::io",
            ArborError::Source { .. } => "arbor::source",
            ArborError::Config(_) => "arbor::config",
            ArborError::Factory(_) => "arbor::factory",
            ArborError::Handler { .. } => "arbor::handler",
            ArborError::Destroyed => "arbor::destroyed",
            ArborError::Export(_) => "arbor::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            ArborError::Config(_) => Some(Box::new(
                "check the configuration file and the command-line overrides",
            )),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A tree document error with source location.
    Source(SourceAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Source(s) => fmt::Display::fmt(s, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Source(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Source(s) => s.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Source(s) => s.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Source(s) => s.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Source(s) => s.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert 1-based line and column numbers into a byte offset into `src`.
///
/// Column 0 (reported at end of input) maps to the start of the line.
fn byte_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Convert an [`ArborError`] into a reportable error.
pub fn to_reportable(err: &ArborError) -> Reportable<'_> {
    match err {
        ArborError::Source { err, src } => Reportable::Source(SourceAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_error(src: &str) -> ArborError {
        let err = serde_json::from_str::<serde_json::Value>(src).unwrap_err();
        ArborError::new_source_error(err, src)
    }

    #[test]
    fn test_byte_offset() {
        let src = "ab\ncd\nef";
        assert_eq!(byte_offset(src, 1, 1), 0);
        assert_eq!(byte_offset(src, 2, 2), 4);
        assert_eq!(byte_offset(src, 3, 0), 6);
        assert_eq!(byte_offset(src, 9, 9), src.len());
    }

    #[test]
    fn test_source_error_has_label() {
        let err = source_error("{\n  \"name\": ]\n}");

        let reportable = to_reportable(&err);

        match &reportable {
            Reportable::Source(s) => {
                assert_eq!(s.to_string(), "Invalid tree document");
                let labels: Vec<_> = s.labels().unwrap().collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                // The stray `]` sits at byte 12, on the second line.
                assert!((2..=14).contains(&labels[0].offset()));
            }
            Reportable::Error(_) => panic!("Expected Source"),
        }
        assert_eq!(reportable.code().unwrap().to_string(), "arbor::source");
    }

    #[test]
    fn test_non_source_error() {
        let err = ArborError::Config("bad scale".to_string());

        let reportable = to_reportable(&err);

        match &reportable {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad scale");
            }
            Reportable::Source(_) => panic!("Expected Error"),
        }
        assert_eq!(reportable.code().unwrap().to_string(), "arbor::config");
        assert!(reportable.help().is_some());
    }
}
