//! A [`MathFont`](crate::font::MathFont) oracle over `ttf_parser::Face`.

use ttf_parser::math::MathValue;

use crate::dimensions::{FUnit, Unit};
use crate::error::FontError;
use crate::font::common::{Direction, GlyphAssembly, GlyphId, GlyphPart, SizeVariant};
use crate::font::kerning::Corner;
use crate::font::{Constants, Glyph, MathFont};

/// A wrapper around `ttf_parser::Face` exposing the MATH table.
/// Construction fails if the font has no MATH table.
pub struct MathFace<'a> {
    math: ttf_parser::math::Table<'a>,
    face: ttf_parser::Face<'a>,
}

impl<'a> MathFace<'a> {
    pub fn new(face: ttf_parser::Face<'a>) -> Result<Self, FontError> {
        let math = face.tables().math.ok_or(FontError::NoMathTable)?;
        Ok(Self { math, face })
    }

    /// Parses the font bytes and wraps the face in one step.
    pub fn parse(data: &'a [u8]) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(data, 0).map_err(|_| FontError::Malformed)?;
        Self::new(face)
    }

    pub fn face(&self) -> &ttf_parser::Face<'a> {
        &self.face
    }

    fn safe_italics(&self, gid: GlyphId) -> Option<i16> {
        let value = self
            .math
            .glyph_info?
            .italic_corrections?
            .get(ttf_parser::GlyphId(gid.0))?
            .value;
        Some(value)
    }

    fn safe_attachment(&self, gid: GlyphId) -> Option<i16> {
        let value = self
            .math
            .glyph_info?
            .top_accent_attachments?
            .get(ttf_parser::GlyphId(gid.0))?
            .value;
        Some(value)
    }
}

fn funit(value: impl Into<f64>) -> Unit<FUnit> {
    Unit::new(value.into())
}

impl<'a> MathFont for MathFace<'a> {
    fn glyph_index(&self, codepoint: char) -> Option<GlyphId> {
        self.face.glyph_index(codepoint).map(|gid| GlyphId(gid.0))
    }

    fn glyph_metrics(&self, gid: GlyphId) -> Result<Glyph, FontError> {
        let glyph_id = ttf_parser::GlyphId(gid.0);
        // Blank glyphs (spaces) have no bounding box; give them an empty one
        // rather than failing the lookup.
        let bbox = self
            .face
            .glyph_bounding_box(glyph_id)
            .unwrap_or(ttf_parser::Rect { x_min: 0, y_min: 0, x_max: 0, y_max: 0 });
        let advance = self
            .face
            .glyph_hor_advance(glyph_id)
            .ok_or(FontError::MissingGlyphGID(gid))?;
        let lsb = self.face.glyph_hor_side_bearing(glyph_id).unwrap_or(0);
        Ok(Glyph {
            gid,
            bbox: (
                funit(bbox.x_min),
                funit(bbox.y_min),
                funit(bbox.x_max),
                funit(bbox.y_max),
            ),
            advance: funit(advance),
            lsb: funit(lsb),
            italics: funit(self.safe_italics(gid).unwrap_or_default()),
            attachment: funit(self.safe_attachment(gid).unwrap_or_default()),
        })
    }

    fn constants(&self, funits_to_em: f64) -> Result<Constants, FontError> {
        let c = self.math.constants.ok_or(FontError::MissingConstants)?;
        let em = |v: MathValue| Unit::new(f64::from(v.value) * funits_to_em);
        // a couple of constants are stored as plain values, not records
        let em_raw = |v: f64| Unit::new(v * funits_to_em);

        Ok(Constants {
            subscript_shift_down: em(c.subscript_shift_down()),
            subscript_top_max: em(c.subscript_top_max()),
            subscript_baseline_drop_min: em(c.subscript_baseline_drop_min()),

            superscript_baseline_drop_max: em(c.superscript_baseline_drop_max()),
            superscript_bottom_min: em(c.superscript_bottom_min()),
            superscript_shift_up_cramped: em(c.superscript_shift_up_cramped()),
            superscript_shift_up: em(c.superscript_shift_up()),
            sub_superscript_gap_min: em(c.sub_superscript_gap_min()),
            space_after_script: em(c.space_after_script()),

            upper_limit_baseline_rise_min: em(c.upper_limit_baseline_rise_min()),
            upper_limit_gap_min: em(c.upper_limit_gap_min()),
            lower_limit_gap_min: em(c.lower_limit_gap_min()),
            lower_limit_baseline_drop_min: em(c.lower_limit_baseline_drop_min()),

            fraction_rule_thickness: em(c.fraction_rule_thickness()),
            fraction_numerator_display_style_shift_up: em(c.fraction_numerator_display_style_shift_up()),
            fraction_denominator_display_style_shift_down: em(c.fraction_denominator_display_style_shift_down()),
            fraction_num_display_style_gap_min: em(c.fraction_num_display_style_gap_min()),
            fraction_denom_display_style_gap_min: em(c.fraction_denom_display_style_gap_min()),
            fraction_numerator_shift_up: em(c.fraction_numerator_shift_up()),
            fraction_denominator_shift_down: em(c.fraction_denominator_shift_down()),
            fraction_numerator_gap_min: em(c.fraction_numerator_gap_min()),
            fraction_denominator_gap_min: em(c.fraction_denominator_gap_min()),

            axis_height: em(c.axis_height()),
            accent_base_height: em(c.accent_base_height()),

            delimited_sub_formula_min_height: em_raw(c.delimited_sub_formula_min_height().into()),
            display_operator_min_height: em_raw(c.display_operator_min_height().into()),

            radical_display_style_vertical_gap: em(c.radical_display_style_vertical_gap()),
            radical_vertical_gap: em(c.radical_vertical_gap()),
            radical_rule_thickness: em(c.radical_rule_thickness()),
            radical_extra_ascender: em(c.radical_extra_ascender()),
            radical_kern_before_degree: em(c.radical_kern_before_degree()),
            radical_kern_after_degree: em(c.radical_kern_after_degree()),
            radical_degree_bottom_raise_percent: 0.01 * f64::from(c.radical_degree_bottom_raise_percent()),

            overbar_vertical_gap: em(c.overbar_vertical_gap()),
            overbar_rule_thickness: em(c.overbar_rule_thickness()),
            overbar_extra_ascender: em(c.overbar_extra_ascender()),
            underbar_vertical_gap: em(c.underbar_vertical_gap()),
            underbar_rule_thickness: em(c.underbar_rule_thickness()),
            underbar_extra_descender: em(c.underbar_extra_descender()),

            script_percent_scale_down: 0.01 * f64::from(c.script_percent_scale_down()),
            script_script_percent_scale_down: 0.01 * f64::from(c.script_script_percent_scale_down()),
        })
    }

    fn units_per_em(&self) -> f64 {
        f64::from(self.face.units_per_em())
    }

    fn kern_for(&self, gid: GlyphId, height: Unit<FUnit>, corner: Corner) -> Option<Unit<FUnit>> {
        let record = self
            .math
            .glyph_info?
            .kern_infos?
            .get(ttf_parser::GlyphId(gid.0))?;

        let table = match corner {
            Corner::TopRight => record.top_right.as_ref(),
            Corner::TopLeft => record.top_left.as_ref(),
            Corner::BottomRight => record.bottom_right.as_ref(),
            Corner::BottomLeft => record.bottom_left.as_ref(),
        }?;

        // The correction heights partition the vertical axis; the kern value
        // for a height is the entry whose band contains it, with the last
        // entry covering everything above the last height.
        let count = table.count();
        for i in 0..count {
            let h = table.height(i)?.value;
            let kern = table.kern(i)?.value;
            if height < funit(h) {
                return Some(funit(kern));
            }
        }
        Some(funit(table.kern(count)?.value))
    }

    fn variants(&self, gid: GlyphId, direction: Direction) -> Vec<SizeVariant> {
        let Some(variants) = self.math.variants else {
            return Vec::new();
        };
        let constructions = match direction {
            Direction::Vertical => variants.vertical_constructions,
            Direction::Horizontal => variants.horizontal_constructions,
        };
        let Some(construction) = constructions.get(ttf_parser::GlyphId(gid.0)) else {
            return Vec::new();
        };
        construction
            .variants
            .into_iter()
            .map(|v| SizeVariant {
                gid: GlyphId(v.variant_glyph.0),
                advance: funit(v.advance_measurement),
            })
            .collect()
    }

    fn assembly(&self, gid: GlyphId, direction: Direction) -> Option<GlyphAssembly> {
        let variants = self.math.variants?;
        let constructions = match direction {
            Direction::Vertical => variants.vertical_constructions,
            Direction::Horizontal => variants.horizontal_constructions,
        };
        let construction = constructions.get(ttf_parser::GlyphId(gid.0))?;
        let assembly = construction.assembly?;
        let parts = assembly
            .parts
            .into_iter()
            .map(|part| GlyphPart {
                gid: GlyphId(part.glyph_id.0),
                extender: part.part_flags.extender(),
                start_connector: funit(part.start_connector_length),
                end_connector: funit(part.end_connector_length),
                full_advance: funit(part.full_advance),
            })
            .collect();
        Some(GlyphAssembly { parts })
    }

    fn min_connector_overlap(&self) -> Unit<FUnit> {
        self.math
            .variants
            .map(|v| funit(v.min_connector_overlap))
            .unwrap_or(Unit::ZERO)
    }

    fn glyph_path(&self, gid: GlyphId) -> Option<String> {
        let mut builder = SvgPathBuilder::default();
        self.face
            .outline_glyph(ttf_parser::GlyphId(gid.0), &mut builder)?;
        Some(builder.path)
    }
}

/// Collects a glyph outline as SVG path data, in font units with y up.
#[derive(Default)]
struct SvgPathBuilder {
    path: String,
}

impl SvgPathBuilder {
    fn push(&mut self, segment: std::fmt::Arguments) {
        use std::fmt::Write;
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        let _ = self.path.write_fmt(segment);
    }
}

impl ttf_parser::OutlineBuilder for SvgPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(format_args!("M{} {}", x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(format_args!("L{} {}", x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(format_args!("Q{} {} {} {}", x1, y1, x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(format_args!("C{} {} {} {} {} {}", x1, y1, x2, y2, x, y));
    }

    fn close(&mut self) {
        self.push(format_args!("Z"));
    }
}
