//! Error types for the different phases of rendering an expression.
//!   - [`ParseError`] : malformed MathML, or LaTeX that the front-end could not translate.
//!   - [`FontError`] : problems with the font file (missing MATH table, missing glyph).
//!   - [`LayoutError`] : errors during the layout phase.
//!   - [`ConfigError`] : invalid lengths, colors or variant names in attributes or configuration.

use std::fmt;

use crate::font::common::GlyphId;

/// Result type for the layout phase.
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;
/// Result type for the MathML front-end.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Malformed input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The XML parser rejected the document.
    Xml(String),
    /// The document has no content at all.
    EmptyDocument,
    /// A LaTeX input was given but no LaTeX-to-MathML converter is available.
    LatexUnavailable,
    /// The LaTeX converter reported a failure.
    Latex(String),
}

/// Problems with the font file provided.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// The font does not contain a glyph for the given char.
    MissingGlyphCodepoint(char),
    /// The font does not contain a glyph with that id.
    MissingGlyphGID(GlyphId),
    /// The font file could not be parsed at all.
    Malformed,
    /// The font lacks a MATH table.
    NoMathTable,
    /// The MATH table is present but lacks the constants record.
    MissingConstants,
}

/// Errors during the layout phase. Most layout problems degrade the output
/// rather than abort it; only font lookups can fail a render.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A font error.
    Font(FontError),
}

/// Invalid values in attributes or in the process configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A length such as `"2em"` or `"3.5pt"` could not be parsed.
    BadLength(String),
    /// An unknown `mathvariant` value.
    UnknownVariant(String),
    /// A color that is neither `#rgb`, `#rrggbb` nor a known name.
    BadColor(String),
}

/// Any error that may happen while rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A parse error.
    Parse(ParseError),
    /// A font error.
    Font(FontError),
    /// A layout error.
    Layout(LayoutError),
    /// A configuration error.
    Config(ConfigError),
}

impl From<FontError> for LayoutError {
    fn from(e: FontError) -> Self {
        LayoutError::Font(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<FontError> for Error {
    fn from(e: FontError) -> Self {
        Error::Font(e)
    }
}

impl From<LayoutError> for Error {
    fn from(e: LayoutError) -> Self {
        Error::Layout(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ParseError::*;
        match *self {
            Xml(ref msg) =>
                write!(f, "malformed MathML: {}", msg),
            EmptyDocument =>
                write!(f, "the document contains no elements"),
            LatexUnavailable =>
                write!(f, "no LaTeX-to-MathML converter is configured"),
            Latex(ref msg) =>
                write!(f, "LaTeX conversion failed: {}", msg),
        }
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::FontError::*;
        match *self {
            MissingGlyphCodepoint(cp) =>
                write!(f, "missing glyph for codepoint '{}'", cp),
            MissingGlyphGID(gid) =>
                write!(f, "missing glyph with gid {}", gid.0),
            Malformed =>
                write!(f, "cannot parse the font file"),
            NoMathTable =>
                write!(f, "the font has no MATH table"),
            MissingConstants =>
                write!(f, "the MATH table has no constants record"),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LayoutError::Font(ref e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ConfigError::*;
        match *self {
            BadLength(ref s) =>
                write!(f, "failed to parse length '{}'", s),
            UnknownVariant(ref s) =>
                write!(f, "unknown mathvariant '{}'", s),
            BadColor(ref s) =>
                write!(f, "failed to recognize the color '{}'", s),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Parse(ref e) => write!(f, "{}", e),
            Error::Font(ref e) => write!(f, "{}", e),
            Error::Layout(ref e) => write!(f, "{}", e),
            Error::Config(ref e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}
