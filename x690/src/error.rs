//! Error types.

use crate::{Length, Tag};
use core::fmt;
use core::num::NonZeroUsize;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// Kind of error.
    kind: ErrorKind,

    /// Position inside of the substrate where the error occurred.
    position: Option<Length>,
}

impl Error {
    /// Create a new [`Error`].
    pub fn new(kind: ErrorKind, position: Length) -> Error {
        Error {
            kind,
            position: Some(position),
        }
    }

    /// Get the [`ErrorKind`] which occurred.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consume the error, returning its [`ErrorKind`].
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Get the position inside of the substrate where the error occurred.
    pub fn position(&self) -> Option<Length> {
        self.position
    }

    /// For errors occurring inside of a nested substrate, extend the position
    /// count by the location where the nested substrate occurs.
    pub fn nested(self, nested_position: Length) -> Self {
        let position = self
            .position
            .map_or(Ok(nested_position), |pos| nested_position + pos)
            .ok();

        Self {
            kind: self.kind,
            position,
        }
    }

    /// Is this error a resumable [`ErrorKind::Incomplete`]?
    ///
    /// Callers feeding a decoder from a non-blocking source test for this
    /// kind, extend the substrate and retry.
    pub fn is_incomplete(&self) -> bool {
        matches!(self.kind, ErrorKind::Incomplete { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(pos) = self.position {
            write!(f, " at substrate byte {}", pos)?;
        }

        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            position: None,
        }
    }
}

impl std::error::Error for Error {}

/// Error kinds.
///
/// The public failure surface of the codec. Variants group into the
/// categories callers usually branch on: schema construction problems,
/// constraint violations, substrate underruns (resumable), malformed
/// encodings, unencodable values and character-set failures.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Duplicate component name in a named-type table.
    DuplicateName {
        /// Offending component name.
        name: String,
    },

    /// Duplicate tag among the components of a `SET` or `CHOICE`.
    AmbiguousTag {
        /// Tag claimed by more than one component.
        tag: Tag,
    },

    /// Explicit tagging with a `UNIVERSAL` class tag.
    UniversalTagging {
        /// The rejected tag.
        tag: Tag,
    },

    /// Payload access on a schema object (a value which holds no value).
    NoValue,

    /// Malformed `OBJECT IDENTIFIER` arcs (bad initialiser, first-arc or
    /// second-arc range violation, empty arc list).
    OidMalformed,

    /// A value failed a declared constraint at construction, decode or
    /// encode time.
    ConstraintViolation {
        /// Constraint family which rejected the value.
        constraint: &'static str,
    },

    /// More substrate bytes are needed to finish decoding.
    ///
    /// When the input source is finite this is fatal; when resumable it is a
    /// control signal: extend the substrate and decode again.
    Incomplete {
        /// Lower bound on the number of additional bytes required, if known.
        needed: Option<NonZeroUsize>,
    },

    /// Invalid length octets (reserved 0xFF form, non-minimal long form
    /// under CER/DER, indefinite length where forbidden).
    Length {
        /// Tag of the value whose length was malformed, when known.
        tag: Option<Tag>,
    },

    /// Substrate is not canonically encoded under the selected rules.
    Noncanonical,

    /// Malformed value body for the ASN.1 type identified by this tag.
    Value {
        /// Tag of the malformed value.
        tag: Tag,
    },

    /// Unexpected tag.
    UnexpectedTag {
        /// Tag the decoder was expecting (if there is a single such tag).
        expected: Option<Tag>,

        /// Actual tag encountered in the substrate.
        actual: Tag,
    },

    /// Unknown/unsupported tag with no schema-supplied fallback.
    UnknownTag {
        /// Tag encountered in the substrate.
        tag: Tag,
    },

    /// Undecoded trailing data at the end of the substrate (strict mode).
    TrailingData {
        /// Length of the decoded data.
        decoded: Length,

        /// Length of the remaining data left in the substrate.
        remaining: Length,
    },

    /// A component value does not match its declared component type.
    ComponentMismatch,

    /// Lookup of a component the named-type table does not declare.
    UnknownComponent {
        /// Requested component name or position.
        name: String,
    },

    /// A required component carried no value at encode time.
    MissingComponent {
        /// Name of the missing component.
        name: String,
    },

    /// `CHOICE` value with no alternative chosen.
    UnresolvedChoice,

    /// Character-string payload is not valid in the declared codec.
    CharacterSet,

    /// Integer overflow in a length computation.
    Overflow,

    /// Read failure from an underlying stream.
    Io {
        /// Rendered source error.
        message: String,
    },
}

impl ErrorKind {
    /// Annotate an [`ErrorKind`] with context about where it occurred,
    /// returning an error.
    pub fn at(self, position: Length) -> Error {
        Error::new(self, position)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::DuplicateName { name } => {
                write!(f, "duplicate component name `{}`", name)
            }
            ErrorKind::AmbiguousTag { tag } => {
                write!(f, "tag {} claimed by more than one component", tag)
            }
            ErrorKind::UniversalTagging { tag } => {
                write!(f, "cannot explicitly tag with UNIVERSAL class tag {}", tag)
            }
            ErrorKind::NoValue => write!(f, "value object holds no value"),
            ErrorKind::OidMalformed => write!(f, "malformed OID"),
            ErrorKind::ConstraintViolation { constraint } => {
                write!(f, "value rejected by {} constraint", constraint)
            }
            ErrorKind::Incomplete { needed: Some(n) } => {
                write!(f, "substrate underrun: at least {} more bytes needed", n)
            }
            ErrorKind::Incomplete { needed: None } => write!(f, "substrate underrun"),
            ErrorKind::Length { tag: Some(tag) } => write!(f, "invalid length for {}", tag),
            ErrorKind::Length { tag: None } => write!(f, "invalid length octets"),
            ErrorKind::Noncanonical => write!(f, "substrate is not canonically encoded"),
            ErrorKind::Value { tag } => write!(f, "malformed value for {}", tag),
            ErrorKind::UnexpectedTag { expected, actual } => {
                write!(f, "unexpected tag: ")?;

                if let Some(tag) = expected {
                    write!(f, "expected {}, ", tag)?;
                }

                write!(f, "got {}", actual)
            }
            ErrorKind::UnknownTag { tag } => write!(f, "unknown tag {}", tag),
            ErrorKind::TrailingData { decoded, remaining } => write!(
                f,
                "trailing data: decoded {} bytes, {} bytes remaining",
                decoded, remaining
            ),
            ErrorKind::ComponentMismatch => {
                write!(f, "component value does not match its declared type")
            }
            ErrorKind::UnknownComponent { name } => {
                write!(f, "no component `{}` in named-type table", name)
            }
            ErrorKind::MissingComponent { name } => {
                write!(f, "required component `{}` has no value", name)
            }
            ErrorKind::UnresolvedChoice => write!(f, "CHOICE value with no alternative chosen"),
            ErrorKind::CharacterSet => {
                write!(f, "character payload not representable in declared codec")
            }
            ErrorKind::Overflow => write!(f, "length overflow"),
            ErrorKind::Io { message } => write!(f, "stream read error: {}", message),
        }
    }
}
