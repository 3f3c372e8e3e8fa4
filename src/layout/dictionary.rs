//! The operator dictionary: per-(character, form) spacing and behavior
//! flags, compiled into the binary as a sorted table.
//!
//! Spacing values are in math units (18 mu = 1 em). Operators missing from
//! the table fall back to a classification from `unicode-math-class`, and
//! failing that to the default of 5 mu on each side with no flags.

use unicode_math_class::MathClass;

use crate::dimensions::{AnyLength, LengthUnit};

/// Position of an operator within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Form {
    Prefix,
    Infix,
    Postfix,
}

impl Form {
    pub fn parse(s: &str) -> Option<Form> {
        match s {
            "prefix" => Some(Form::Prefix),
            "infix" => Some(Form::Infix),
            "postfix" => Some(Form::Postfix),
            _ => None,
        }
    }
}

pub const STRETCHY: u16 = 1 << 0;
pub const SYMMETRIC: u16 = 1 << 1;
pub const LARGEOP: u16 = 1 << 2;
pub const MOVABLE_LIMITS: u16 = 1 << 3;
pub const ACCENT: u16 = 1 << 4;
pub const FENCE: u16 = 1 << 5;
pub const SEPARATOR: u16 = 1 << 6;

/// A dictionary entry: lspace/rspace in mu plus behavior flags.
#[derive(Debug, Clone, Copy)]
pub struct OpRecord {
    pub lspace: u8,
    pub rspace: u8,
    pub flags: u16,
}

const fn op(lspace: u8, rspace: u8, flags: u16) -> OpRecord {
    OpRecord { lspace, rspace, flags }
}

impl OpRecord {
    pub fn has(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }
}

/// The default for operators absent from the table: 5/18 em on each side,
/// no special behavior.
pub const DEFAULT: OpRecord = op(5, 5, 0);

use self::Form::{Infix, Postfix, Prefix};

// Sorted by (character, form); checked by a test below.
#[rustfmt::skip]
static TABLE: &[(char, Form, OpRecord)] = &[
    ('!', Postfix, op(1, 0, 0)),
    ('(', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    (')', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('+', Prefix, op(0, 1, 0)),
    ('+', Infix, op(4, 4, 0)),
    (',', Infix, op(0, 3, SEPARATOR)),
    ('-', Prefix, op(0, 1, 0)),
    ('-', Infix, op(4, 4, 0)),
    ('/', Infix, op(1, 1, 0)),
    (':', Infix, op(1, 2, 0)),
    (';', Infix, op(0, 3, SEPARATOR)),
    ('<', Infix, op(5, 5, 0)),
    ('=', Infix, op(5, 5, 0)),
    ('>', Infix, op(5, 5, 0)),
    ('[', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    (']', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('^', Infix, op(0, 0, STRETCHY | ACCENT)),
    ('_', Infix, op(0, 0, STRETCHY | ACCENT)),
    ('{', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('|', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('|', Infix, op(2, 2, STRETCHY | SYMMETRIC | FENCE)),
    ('|', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('}', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('~', Infix, op(0, 0, STRETCHY | ACCENT)),
    ('¨', Postfix, op(0, 0, ACCENT)),
    ('¯', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('±', Prefix, op(0, 1, 0)),
    ('±', Infix, op(4, 4, 0)),
    ('×', Infix, op(4, 4, 0)),
    ('÷', Infix, op(4, 4, 0)),
    ('ˆ', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('˙', Postfix, op(0, 0, ACCENT)),
    ('˜', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('‖', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('‖', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('′', Postfix, op(0, 0, 0)),
    ('″', Postfix, op(0, 0, 0)),
    ('‾', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('\u{2061}', Infix, op(0, 0, 0)), // apply function
    ('\u{2062}', Infix, op(0, 0, 0)), // invisible times
    ('\u{2063}', Infix, op(0, 0, SEPARATOR)), // invisible separator
    ('←', Infix, op(5, 5, STRETCHY | ACCENT)),
    ('↑', Infix, op(5, 5, STRETCHY)),
    ('→', Infix, op(5, 5, STRETCHY | ACCENT)),
    ('↓', Infix, op(5, 5, STRETCHY)),
    ('↔', Infix, op(5, 5, STRETCHY | ACCENT)),
    ('↦', Infix, op(5, 5, STRETCHY)),
    ('⇐', Infix, op(5, 5, STRETCHY)),
    ('⇒', Infix, op(5, 5, STRETCHY)),
    ('⇔', Infix, op(5, 5, STRETCHY)),
    ('∀', Prefix, op(2, 1, 0)),
    ('∂', Prefix, op(1, 1, 0)),
    ('∃', Prefix, op(2, 1, 0)),
    ('∇', Prefix, op(2, 1, 0)),
    ('∈', Infix, op(5, 5, 0)),
    ('∉', Infix, op(5, 5, 0)),
    ('∋', Infix, op(5, 5, 0)),
    ('∏', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('∐', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('∑', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('−', Prefix, op(0, 1, 0)),
    ('−', Infix, op(4, 4, 0)),
    ('∓', Prefix, op(0, 1, 0)),
    ('∓', Infix, op(4, 4, 0)),
    ('∖', Infix, op(4, 4, 0)),
    ('∗', Infix, op(4, 4, 0)),
    ('∘', Infix, op(4, 4, 0)),
    ('√', Prefix, op(1, 1, STRETCHY)),
    ('∝', Infix, op(5, 5, 0)),
    ('∧', Infix, op(4, 4, 0)),
    ('∨', Infix, op(4, 4, 0)),
    ('∩', Infix, op(4, 4, 0)),
    ('∪', Infix, op(4, 4, 0)),
    ('∫', Prefix, op(3, 3, LARGEOP | SYMMETRIC)),
    ('∬', Prefix, op(3, 3, LARGEOP | SYMMETRIC)),
    ('∭', Prefix, op(3, 3, LARGEOP | SYMMETRIC)),
    ('∮', Prefix, op(3, 3, LARGEOP | SYMMETRIC)),
    ('∼', Infix, op(5, 5, 0)),
    ('≃', Infix, op(5, 5, 0)),
    ('≅', Infix, op(5, 5, 0)),
    ('≈', Infix, op(5, 5, 0)),
    ('≠', Infix, op(5, 5, 0)),
    ('≡', Infix, op(5, 5, 0)),
    ('≤', Infix, op(5, 5, 0)),
    ('≥', Infix, op(5, 5, 0)),
    ('≪', Infix, op(5, 5, 0)),
    ('≫', Infix, op(5, 5, 0)),
    ('⊂', Infix, op(5, 5, 0)),
    ('⊃', Infix, op(5, 5, 0)),
    ('⊆', Infix, op(5, 5, 0)),
    ('⊇', Infix, op(5, 5, 0)),
    ('⊕', Infix, op(4, 4, 0)),
    ('⊗', Infix, op(4, 4, 0)),
    ('⊥', Infix, op(5, 5, 0)),
    ('⋀', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⋁', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⋂', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⋃', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⋅', Infix, op(4, 4, 0)),
    ('⌈', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⌉', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⌊', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⌋', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⏞', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('⏟', Postfix, op(0, 0, STRETCHY | ACCENT)),
    ('⟨', Prefix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⟩', Postfix, op(0, 0, STRETCHY | SYMMETRIC | FENCE)),
    ('⨀', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⨁', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⨂', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
    ('⨄', Prefix, op(3, 3, LARGEOP | MOVABLE_LIMITS | SYMMETRIC)),
];

/// Looks up the dictionary entry for a character in a given form. When the
/// exact form is absent, any form the character is listed under is used.
pub fn lookup(c: char, form: Form) -> Option<OpRecord> {
    if let Ok(idx) = TABLE.binary_search_by(|&(tc, tf, _)| (tc, tf).cmp(&(c, form))) {
        return Some(TABLE[idx].2);
    }
    TABLE
        .iter()
        .find(|&&(tc, _, _)| tc == c)
        .map(|&(_, _, record)| record)
}

/// Spacing defaults for operators the dictionary does not know, derived
/// from their Unicode math class.
fn classify(c: char) -> OpRecord {
    match unicode_math_class::class(c) {
        Some(MathClass::Binary) => op(4, 4, 0),
        Some(MathClass::Relation) => op(5, 5, 0),
        Some(MathClass::Opening) => op(0, 0, STRETCHY | SYMMETRIC | FENCE),
        Some(MathClass::Closing) => op(0, 0, STRETCHY | SYMMETRIC | FENCE),
        Some(MathClass::Fence) => op(0, 0, STRETCHY | SYMMETRIC | FENCE),
        Some(MathClass::Punctuation) => op(0, 3, SEPARATOR),
        Some(MathClass::Large) => op(3, 3, LARGEOP | SYMMETRIC),
        Some(MathClass::Diacritic) => op(0, 0, ACCENT),
        _ => DEFAULT,
    }
}

/// An operator record after the dictionary lookup and attribute overrides.
/// Spaces are kept as attribute lengths and resolved against the font size
/// at the point of use.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedOp {
    pub form: Form,
    pub lspace: AnyLength,
    pub rspace: AnyLength,
    pub stretchy: bool,
    pub symmetric: bool,
    pub largeop: bool,
    pub movable_limits: bool,
    pub accent: bool,
    pub fence: bool,
    pub separator: bool,
    pub minsize: Option<AnyLength>,
    pub maxsize: Option<AnyLength>,
}

fn mu(count: u8) -> AnyLength {
    AnyLength { value: f64::from(count), unit: LengthUnit::Mu }
}

/// Resolves an operator: dictionary entry for its first character and form,
/// overridden by the element's attributes.
pub fn resolve(content: &str, form: Form, attr: impl Fn(&str) -> Option<String>) -> ResolvedOp {
    let record = content
        .chars()
        .next()
        .map(|c| lookup(c, form).unwrap_or_else(|| classify(c)))
        .unwrap_or(DEFAULT);

    let space = |name: &str, fallback: AnyLength| -> AnyLength {
        match attr(name).and_then(|v| AnyLength::parse(&v).ok()) {
            Some(len) => len,
            None => fallback,
        }
    };
    let flag = |name: &str, fallback: bool| -> bool {
        match attr(name).as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => fallback,
        }
    };
    let size = |name: &str| attr(name).and_then(|v| AnyLength::parse(&v).ok());

    ResolvedOp {
        form,
        lspace: space("lspace", mu(record.lspace)),
        rspace: space("rspace", mu(record.rspace)),
        stretchy: flag("stretchy", record.has(STRETCHY)),
        symmetric: flag("symmetric", record.has(SYMMETRIC)),
        largeop: flag("largeop", record.has(LARGEOP)),
        movable_limits: flag("movablelimits", record.has(MOVABLE_LIMITS)),
        accent: flag("accent", record.has(ACCENT)),
        fence: flag("fence", record.has(FENCE)),
        separator: flag("separator", record.has(SEPARATOR)),
        minsize: size("minsize"),
        maxsize: size("maxsize"),
    }
}

/// Positional form resolution inside a row: first non-space child is a
/// prefix, the last a postfix, everything else infix. An explicit `form`
/// attribute wins.
pub fn positional_form(index: usize, first: usize, last: usize) -> Form {
    if first == last {
        Form::Infix
    } else if index == first {
        Form::Prefix
    } else if index == last {
        Form::Postfix
    } else {
        Form::Infix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in TABLE.windows(2) {
            let a = (pair[0].0, pair[0].1);
            let b = (pair[1].0, pair[1].1);
            assert!(a < b, "{:?} and {:?}", a, b);
        }
    }

    #[test]
    fn known_operators() {
        let plus = lookup('+', Form::Infix).unwrap();
        assert_eq!((plus.lspace, plus.rspace), (4, 4));
        let equals = lookup('=', Form::Infix).unwrap();
        assert_eq!((equals.lspace, equals.rspace), (5, 5));
        let sum = lookup('∑', Form::Prefix).unwrap();
        assert!(sum.has(LARGEOP) && sum.has(MOVABLE_LIMITS));
        let integral = lookup('∫', Form::Prefix).unwrap();
        assert!(integral.has(LARGEOP) && !integral.has(MOVABLE_LIMITS));
        let paren = lookup('(', Form::Prefix).unwrap();
        assert!(paren.has(STRETCHY) && paren.has(FENCE));
    }

    #[test]
    fn form_fallback() {
        // '∑' only has a prefix entry; an infix request still finds it
        assert!(lookup('∑', Form::Infix).unwrap().has(LARGEOP));
    }

    #[test]
    fn attribute_overrides() {
        let resolved = resolve("+", Form::Infix, |name| match name {
            "lspace" => Some("0em".to_string()),
            "stretchy" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(resolved.lspace.to_px(16.0).unitless(), 0.0);
        assert_close!(resolved.rspace.to_px(18.0).unitless(), 4.0, 1e-9);
        assert!(resolved.stretchy);
    }

    #[test]
    fn unknown_operator_gets_default() {
        let resolved = resolve("¶", Form::Infix, |_| None);
        // 5/18 em on each side
        assert_close!(resolved.lspace.to_px(18.0).unitless(), 5.0, 1e-9);
        assert_close!(resolved.rspace.to_px(18.0).unitless(), 5.0, 1e-9);
        assert!(!resolved.stretchy && !resolved.largeop);
    }

    #[test]
    fn positional_forms() {
        assert_eq!(positional_form(0, 0, 4), Form::Prefix);
        assert_eq!(positional_form(4, 0, 4), Form::Postfix);
        assert_eq!(positional_form(2, 0, 4), Form::Infix);
        assert_eq!(positional_form(0, 0, 0), Form::Infix);
    }
}
