//! Error types for parsing, validating and patching fact trees

use std::fmt;

/// Which flavour of error a failing validator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// The value has the wrong type (e.g. an integer where a string is expected)
    Type,
    /// The value has the right type but violates a constraint (empty, multi-line, ...)
    Constraint,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::Type => write!(f, "type"),
            ValidationKind::Constraint => write!(f, "constraint"),
        }
    }
}

/// Errors raised by the rewriting engine
///
/// None of these are swallowed internally: they propagate to the caller of
/// `transform`, `publish` or `update`.
#[derive(Debug, Clone)]
pub enum Error {
    /// A field rejected an assigned value
    Validation {
        field: String,
        expected: String,
        actual: String,
        kind: ValidationKind,
    },
    /// A field name that the node schema does not declare, or a slot of the wrong kind
    UnknownField { node: String, field: String },
    /// The replacement tree is not of the same schema as the current one
    SchemaMismatch { expected: String, found: String },
    /// Ordered-sequence facts differ in count between current and replacement
    SequenceLengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },
    /// No registered format accepts the requested operation
    UnsupportedFormat { format: String, operation: String },
    /// A fact's recorded token could not be located on its line
    PatchTarget {
        node: String,
        lineno: usize,
        token: String,
    },
    /// The source could not be parsed
    Parse {
        format: String,
        line: usize,
        message: String,
        source_context: String,
    },
    /// Configuration could not be loaded or deserialized
    Config(String),
    /// Fact tree exchange (JSON/YAML) failed
    Json(String),
    /// A repository URL in none of the known forms
    Url(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation {
                field,
                expected,
                actual,
                kind,
            } => write!(
                f,
                "{} must be {} but you passed {} ({} error)",
                field, expected, actual, kind
            ),
            Error::UnknownField { node, field } => {
                write!(f, "{} has no field named '{}'", node, field)
            }
            Error::SchemaMismatch { expected, found } => {
                write!(f, "{} must be updated with {} but got {}", expected, expected, found)
            }
            Error::SequenceLengthMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "{} holds {} element(s) but the replacement holds {}",
                field, expected, found
            ),
            Error::UnsupportedFormat { format, operation } => {
                write!(f, "Format '{}' does not support {}", format, operation)
            }
            Error::PatchTarget {
                node,
                lineno,
                token,
            } => write!(
                f,
                "Cannot locate {} token {:?} on line {}",
                node, token, lineno
            ),
            Error::Parse {
                format,
                line,
                message,
                source_context,
            } => {
                writeln!(f, "Error: could not parse {} source", format)?;
                writeln!(f)?;
                writeln!(f, "{} (line {})", message, line + 1)?;
                writeln!(f)?;
                write!(f, "{}", source_context)
            }
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Json(msg) => write!(f, "Fact tree exchange error: {}", msg),
            Error::Url(url) => write!(f, "Unrecognized repository URL: {}", url),
        }
    }
}

impl std::error::Error for Error {}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Format source code context around an error line
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
/// All lines are numbered for easy reference.
pub fn format_source_context(source: &str, error_line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for line_num in start_line..end_line {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!(
            "{} {:3} | {}\n",
            marker,
            line_num + 1,
            lines[line_num]
        ));
    }

    context
}
