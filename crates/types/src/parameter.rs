//! Parameter kinds, values, and descriptors.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize, Serializer};
use url::Url;

pub mod parsing;

/// Declares the primitive kind of a pipeline parameter.
///
/// Whether a value may be omitted is tracked separately on
/// [`ParameterDescriptor::optional`], so every kind has an optional variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Reference to a single file, local or remote.
    File,
    /// Reference to a directory, local or remote.
    Directory,
    /// Free-form text.
    String,
    /// Switch rendered as a bare flag.
    Boolean,
    /// Signed whole number.
    Integer,
    /// Floating point number.
    Float,
}

impl ParameterKind {
    /// Lowercase label used in help text and error messages.
    pub fn label(self) -> &'static str {
        match self {
            ParameterKind::File => "file",
            ParameterKind::Directory => "directory",
            ParameterKind::String => "string",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Integer => "integer",
            ParameterKind::Float => "float",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a file or directory reference points.
///
/// Scheme-qualified references (`latch:///data/samples.csv`,
/// `s3://bucket/key`) are kept verbatim so they reach the pipeline exactly as
/// the user wrote them. Anything else is treated as a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Remote URI, stored as written.
    Remote(String),
    /// Path on the local filesystem.
    Local(PathBuf),
}

impl Location {
    /// Classify a raw reference as remote or local.
    ///
    /// Single-letter schemes are rejected as remote so that Windows drive
    /// letters (`C:\data`) stay local paths.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match Url::parse(trimmed) {
            Ok(url) if url.scheme().len() > 1 => Location::Remote(trimmed.to_string()),
            _ => Location::Local(PathBuf::from(trimmed)),
        }
    }

    /// Returns true when the reference is a scheme-qualified URI.
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote(uri) => f.write_str(uri),
            Location::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Concrete value of a parameter.
///
/// This is a closed set: every consumer (flag translation, JSON export,
/// parsing) matches it exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    File(Location),
    Directory(Location),
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
}

impl ParameterValue {
    /// Kind this value belongs to.
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::File(_) => ParameterKind::File,
            ParameterValue::Directory(_) => ParameterKind::Directory,
            ParameterValue::String(_) => ParameterKind::String,
            ParameterValue::Boolean(_) => ParameterKind::Boolean,
            ParameterValue::Integer(_) => ParameterKind::Integer,
            ParameterValue::Float(_) => ParameterKind::Float,
        }
    }

    /// Convenience constructor for string values.
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::String(value.into())
    }

    /// Convenience constructor for directory references.
    pub fn directory(raw: &str) -> Self {
        ParameterValue::Directory(Location::parse(raw))
    }

    /// Convenience constructor for file references.
    pub fn file(raw: &str) -> Self {
        ParameterValue::File(Location::parse(raw))
    }
}

impl fmt::Display for ParameterValue {
    /// Formats the value the way it is passed on a command line.
    ///
    /// Floats use Rust's shortest round-trip representation, so `40.0`
    /// renders as `40` and `0.05` as `0.05`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::File(location) | ParameterValue::Directory(location) => location.fmt(f),
            ParameterValue::String(text) => f.write_str(text),
            ParameterValue::Boolean(flag) => write!(f, "{}", flag),
            ParameterValue::Integer(number) => write!(f, "{}", number),
            ParameterValue::Float(number) => write!(f, "{}", number),
        }
    }
}

/// Declares a single pipeline input: its kind, default, and UI metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    /// Unique parameter name, also used as the long flag name.
    pub name: String,
    /// Primitive kind of the parameter.
    pub kind: ParameterKind,
    /// When true, the parameter may be left unset.
    pub optional: bool,
    /// Default value applied when the user does not supply one.
    pub default: Option<ParameterValue>,
    /// Heading of the UI section this parameter opens, if any.
    pub section_title: Option<String>,
    /// Human-readable description rendered next to the input.
    pub description: Option<String>,
    /// Marks directory parameters the platform treats as run outputs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub output: bool,
}

impl ParameterDescriptor {
    /// Start a required descriptor with no default, section, or description.
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            default: None,
            section_title: None,
            description: None,
            output: false,
        }
    }

    /// Start an optional descriptor.
    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            optional: true,
            ..Self::required(name, kind)
        }
    }

    pub fn with_default(mut self, value: ParameterValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_section(mut self, title: impl Into<String>) -> Self {
        self.section_title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn as_output(mut self) -> Self {
        self.output = true;
        self
    }

    /// Long command-line flag for this parameter (`--<name>`).
    pub fn flag(&self) -> String {
        format!("--{}", self.name)
    }
}
