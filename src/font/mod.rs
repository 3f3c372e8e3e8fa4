//! The font oracle: everything the layout engine needs to know about an
//! OpenType math font, behind the [`MathFont`] trait so that tests and
//! alternative font parsers can supply their own implementation.

/// Kerning between a glyph and its sub-/superscript from the MATH table's
/// corner tables.
pub mod kerning;

/// Implementations of the [`MathFont`] trait for font parsing crates.
pub mod backend;

/// Types shared between the oracle, the stretchy builder and the engine.
pub mod common;

/// The stretchy-glyph builder: size variants and glyph assemblies.
pub mod variants;

/// Mapping characters into the Mathematical Alphanumeric Symbols block.
pub mod styles;

use crate::dimensions::{Em, FUnit, Unit};
use crate::error::FontError;

use self::common::{Direction, GlyphAssembly, GlyphId, SizeVariant};
use self::kerning::Corner;

/// The oracle interface over an OpenType font with a MATH table.
///
/// All lengths are in font design units; [`FontContext`] performs the
/// conversion to em once, at construction time.
pub trait MathFont: Sized {
    /// Glyph id for a codepoint, if the font covers it.
    fn glyph_index(&self, codepoint: char) -> Option<GlyphId>;

    /// The per-glyph metrics record: advance, bounding box, italic
    /// correction and top-accent attachment in one lookup.
    fn glyph_metrics(&self, gid: GlyphId) -> Result<Glyph, FontError>;

    /// MATH constants, converted to em by the given factor.
    fn constants(&self, funits_to_em: f64) -> Result<Constants, FontError>;

    /// Design units per em quad.
    fn units_per_em(&self) -> f64;

    /// Math kerning from the corner tables: the kern value at `height`
    /// above the baseline for the given corner of the glyph.
    fn kern_for(&self, gid: GlyphId, height: Unit<FUnit>, corner: Corner) -> Option<Unit<FUnit>>;

    /// Precomputed size variants for a glyph along an axis, smallest first.
    fn variants(&self, gid: GlyphId, direction: Direction) -> Vec<SizeVariant>;

    /// The glyph-assembly recipe for arbitrary extents, if the font has one.
    fn assembly(&self, gid: GlyphId, direction: Direction) -> Option<GlyphAssembly>;

    /// Minimum connector overlap between assembly parts.
    fn min_connector_overlap(&self) -> Unit<FUnit>;

    /// The glyph outline as SVG path data in font units, y-up. `None` for
    /// blank glyphs such as spaces.
    fn glyph_path(&self, gid: GlyphId) -> Option<String>;
}

/// A font plus its MATH constants, loaded once and shared by every layout
/// call. Never mutated after construction, so it may be shared across
/// threads by reference.
pub struct FontContext<'f, F> {
    pub font: &'f F,
    pub constants: Constants,
    pub units_per_em: f64,
}

impl<'f, F> Clone for FontContext<'f, F> {
    fn clone(&self) -> Self {
        Self {
            font: self.font,
            constants: self.constants.clone(),
            units_per_em: self.units_per_em,
        }
    }
}

impl<'f, F: MathFont> FontContext<'f, F> {
    pub fn new(font: &'f F) -> Result<Self, FontError> {
        let units_per_em = font.units_per_em();
        let constants = font.constants(units_per_em.recip())?;
        Ok(FontContext { font, units_per_em, constants })
    }

    pub fn glyph(&self, codepoint: char) -> Result<Glyph, FontError> {
        let gid = self
            .font
            .glyph_index(codepoint)
            .ok_or(FontError::MissingGlyphCodepoint(codepoint))?;
        self.font.glyph_metrics(gid)
    }

    pub fn glyph_from_gid(&self, gid: GlyphId) -> Result<Glyph, FontError> {
        self.font.glyph_metrics(gid)
    }

    /// Converts a length in font units to em.
    pub fn to_em(&self, length: Unit<FUnit>) -> Unit<Em> {
        Unit::new(length.unitless() / self.units_per_em)
    }
}

/// Per-glyph metrics. The italic correction and the top-accent attachment
/// live here so that script and accent placement read as single-record
/// formulas rather than scattered lookups.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub gid: GlyphId,
    /// x_min, y_min, x_max, y_max.
    pub bbox: (Unit<FUnit>, Unit<FUnit>, Unit<FUnit>, Unit<FUnit>),
    pub advance: Unit<FUnit>,
    pub lsb: Unit<FUnit>,
    pub italics: Unit<FUnit>,
    pub attachment: Unit<FUnit>,
}

impl Glyph {
    pub fn height(&self) -> Unit<FUnit> {
        self.bbox.3
    }
    pub fn depth(&self) -> Unit<FUnit> {
        self.bbox.1
    }
}

/// The MATH constants consumed by the layout engine, in em.
#[derive(Debug, Clone)]
pub struct Constants {
    pub subscript_shift_down: Unit<Em>,
    pub subscript_top_max: Unit<Em>,
    pub subscript_baseline_drop_min: Unit<Em>,

    pub superscript_baseline_drop_max: Unit<Em>,
    pub superscript_bottom_min: Unit<Em>,
    pub superscript_shift_up_cramped: Unit<Em>,
    pub superscript_shift_up: Unit<Em>,
    pub sub_superscript_gap_min: Unit<Em>,
    pub space_after_script: Unit<Em>,

    pub upper_limit_baseline_rise_min: Unit<Em>,
    pub upper_limit_gap_min: Unit<Em>,
    pub lower_limit_gap_min: Unit<Em>,
    pub lower_limit_baseline_drop_min: Unit<Em>,

    pub fraction_rule_thickness: Unit<Em>,
    pub fraction_numerator_display_style_shift_up: Unit<Em>,
    pub fraction_denominator_display_style_shift_down: Unit<Em>,
    pub fraction_num_display_style_gap_min: Unit<Em>,
    pub fraction_denom_display_style_gap_min: Unit<Em>,
    pub fraction_numerator_shift_up: Unit<Em>,
    pub fraction_denominator_shift_down: Unit<Em>,
    pub fraction_numerator_gap_min: Unit<Em>,
    pub fraction_denominator_gap_min: Unit<Em>,

    pub axis_height: Unit<Em>,
    pub accent_base_height: Unit<Em>,

    pub delimited_sub_formula_min_height: Unit<Em>,
    pub display_operator_min_height: Unit<Em>,

    pub radical_display_style_vertical_gap: Unit<Em>,
    pub radical_vertical_gap: Unit<Em>,
    pub radical_rule_thickness: Unit<Em>,
    pub radical_extra_ascender: Unit<Em>,
    pub radical_kern_before_degree: Unit<Em>,
    pub radical_kern_after_degree: Unit<Em>,
    /// Fraction of the radical's total height the degree bottom is raised by.
    pub radical_degree_bottom_raise_percent: f64,

    pub overbar_vertical_gap: Unit<Em>,
    pub overbar_rule_thickness: Unit<Em>,
    pub overbar_extra_ascender: Unit<Em>,
    pub underbar_vertical_gap: Unit<Em>,
    pub underbar_rule_thickness: Unit<Em>,
    pub underbar_extra_descender: Unit<Em>,

    pub script_percent_scale_down: f64,
    pub script_script_percent_scale_down: f64,
}
