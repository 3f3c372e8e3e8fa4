//! Hooks for the LaTeX front-end.
//!
//! Translating LaTeX math into MathML is an external collaborator behind
//! the [`LatexToMathML`] trait. The core contributes the two pieces that
//! must happen on this side of the boundary: extracting a `\tag{...}`
//! directive before conversion, and the process-wide list of operator
//! names declared by the embedding application.

use std::collections::BTreeSet;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::error::ParseError;

/// A LaTeX-math to MathML translator.
pub trait LatexToMathML {
    /// Converts a math-mode LaTeX fragment into a MathML document.
    fn to_mathml(&self, latex: &str, display: bool) -> Result<String, ParseError>;
}

/// Splits a `\tag{...}` directive out of a LaTeX fragment. Returns the
/// fragment with the directive removed and the tag's content, if present.
/// `\tag*{...}` is accepted too.
pub fn extract_tag(latex: &str) -> (String, Option<String>) {
    for marker in ["\\tag*{", "\\tag{"] {
        if let Some(start) = latex.find(marker) {
            let body_start = start + marker.len();
            let mut depth = 1usize;
            for (offset, c) in latex[body_start..].char_indices() {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            let tag = latex[body_start..body_start + offset].to_string();
                            let mut rest = latex[..start].to_string();
                            rest.push_str(&latex[body_start + offset + 1..]);
                            return (rest.trim().to_string(), Some(tag));
                        }
                    }
                    _ => {}
                }
            }
            // unbalanced braces: leave the input alone
            return (latex.to_string(), None);
        }
    }
    (latex.to_string(), None)
}

static DECLARED_OPERATORS: Lazy<RwLock<BTreeSet<String>>> =
    Lazy::new(|| RwLock::new(BTreeSet::new()));

/// Registers `name` as an upright operator (like `\sin`), so the LaTeX
/// front-end can translate `\name` into `<mo>name</mo>`.
pub fn declare_operator(name: &str) {
    let name = name.trim_start_matches('\\').to_string();
    DECLARED_OPERATORS
        .write()
        .expect("operator registry poisoned")
        .insert(name);
}

/// Whether `name` was declared via [`declare_operator`].
pub fn is_declared_operator(name: &str) -> bool {
    DECLARED_OPERATORS
        .read()
        .expect("operator registry poisoned")
        .contains(name.trim_start_matches('\\'))
}

/// The declared operator names, sorted.
pub fn declared_operators() -> Vec<String> {
    DECLARED_OPERATORS
        .read()
        .expect("operator registry poisoned")
        .iter()
        .cloned()
        .collect()
}
