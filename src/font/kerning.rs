//! Script kerning from the MATH table's corner tables.
//!
//! With a slanted base like `f` in `f_1^2`, the subscript must tuck in under
//! the overhang and the superscript must clear it. The font encodes this as a
//! staircase of kern values per bounding-box corner; we sample the base's and
//! the script's facing corners at the attachment heights and combine them.

use crate::dimensions::{FUnit, Unit};
use crate::font::{Glyph, MathFont};

/// Corners of a glyph's bounding box.
#[derive(Debug, Clone, Copy)]
pub enum Corner {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

/// Kerning between a base glyph and its superscript, raised by `shift`.
pub fn superscript_kern<F: MathFont>(
    font: &F,
    base: &Glyph,
    script: &Glyph,
    shift: Unit<FUnit>,
) -> Unit<FUnit> {
    // Sample at the top of the base and at the bottom of the script, take
    // the larger total. Ported from the LuaTeX/XeTeX algorithm.
    let base_height = base.height();
    let script_depth = script.depth() + shift;

    let value1 = kern_at(font, base, base_height, Corner::TopRight)
        + kern_at(font, script, base_height - shift, Corner::BottomLeft);
    let value2 = kern_at(font, base, script_depth, Corner::TopRight)
        + kern_at(font, script, script_depth - shift, Corner::BottomLeft);

    Unit::max(value1, value2)
}

/// Kerning between a base glyph and its subscript, lowered by `shift`.
pub fn subscript_kern<F: MathFont>(
    font: &F,
    base: &Glyph,
    script: &Glyph,
    shift: Unit<FUnit>,
) -> Unit<FUnit> {
    let base_depth = base.depth();
    let script_height = script.height() - shift;

    let value1 = kern_at(font, base, base_depth, Corner::BottomRight)
        + kern_at(font, script, base_depth + shift, Corner::TopLeft);
    let value2 = kern_at(font, base, script_height, Corner::BottomRight)
        + kern_at(font, script, script_height + shift, Corner::TopLeft);

    Unit::min(value1, value2)
}

fn kern_at<F: MathFont>(font: &F, glyph: &Glyph, height: Unit<FUnit>, corner: Corner) -> Unit<FUnit> {
    font.kern_for(glyph.gid, height, corner).unwrap_or(Unit::ZERO)
}
