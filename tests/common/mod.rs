//! A synthetic math font for layout tests: deterministic metrics, a few
//! vertical size variants, and an extender assembly for the stretchable
//! delimiters, so the engine can be exercised without a font file on disk.

#![allow(dead_code)]

use std::collections::HashMap;

use mathsvg::dimensions::{FUnit, Unit};
use mathsvg::error::FontError;
use mathsvg::font::common::{
    Direction, GlyphAssembly, GlyphId, GlyphPart, SizeVariant,
};
use mathsvg::font::kerning::Corner;
use mathsvg::font::{Constants, FontContext, Glyph, MathFont};
use mathsvg::render::{Backend, Cursor};

pub const UNITS_PER_EM: f64 = 1000.0;

/// Characters that stretch vertically in the mock font.
const STRETCHABLE: &[char] = &['(', ')', '[', ']', '{', '}', '|', '√'];

/// Precomputed variant extents, then the assembly takes over.
const VARIANT_SIZES: &[f64] = &[1400.0, 2000.0];

const PART_BOTTOM: u16 = 2000;
const PART_EXTENDER: u16 = 2001;
const PART_TOP: u16 = 2002;

pub struct MockFont {
    map: HashMap<char, u16>,
    /// variant gid -> extent along the growth axis
    tall: HashMap<u16, f64>,
    /// base gid -> variant list
    variants: HashMap<u16, Vec<SizeVariant>>,
    /// base gids that have an assembly
    assembled: Vec<u16>,
}

impl MockFont {
    pub fn new() -> MockFont {
        let mut chars: Vec<char> = (0x20u32..=0x7E).filter_map(char::from_u32).collect();
        chars.extend("−×⋅∑∏∫√≤≥≠±—′".chars());
        chars.extend((0x3B1u32..=0x3C9).filter_map(char::from_u32)); // α..ω
        chars.extend((0x1D434u32..=0x1D467).filter_map(char::from_u32)); // italic A..z
        chars.push('\u{210E}'); // planck h
        chars.extend((0x1D6C2u32..=0x1D6DB).filter_map(char::from_u32)); // bold α..

        let mut map = HashMap::new();
        for (idx, c) in chars.into_iter().enumerate() {
            map.entry(c).or_insert(idx as u16);
        }

        let mut tall = HashMap::new();
        let mut variants = HashMap::new();
        let mut assembled = Vec::new();
        for (k, c) in STRETCHABLE.iter().enumerate() {
            let base = map[c];
            let mut list = Vec::new();
            for (i, &size) in VARIANT_SIZES.iter().enumerate() {
                let gid = 1000 + (k as u16) * 10 + i as u16;
                tall.insert(gid, size);
                list.push(SizeVariant { gid: GlyphId(gid), advance: Unit::new(size) });
            }
            variants.insert(base, list);
            assembled.push(base);
        }

        MockFont { map, tall, variants, assembled }
    }

    pub fn gid_of(&self, c: char) -> GlyphId {
        GlyphId(self.map[&c])
    }
}

impl MathFont for MockFont {
    fn glyph_index(&self, codepoint: char) -> Option<GlyphId> {
        self.map.get(&codepoint).copied().map(GlyphId)
    }

    fn glyph_metrics(&self, gid: GlyphId) -> Result<Glyph, FontError> {
        // assembly parts
        if let PART_BOTTOM | PART_EXTENDER | PART_TOP = gid.0 {
            let advance = if gid.0 == PART_EXTENDER { 800.0 } else { 900.0 };
            return Ok(Glyph {
                gid,
                bbox: (Unit::ZERO, Unit::ZERO, Unit::new(300.0), Unit::new(advance)),
                advance: Unit::new(300.0),
                lsb: Unit::ZERO,
                italics: Unit::ZERO,
                attachment: Unit::ZERO,
            });
        }
        // stretched variants
        if let Some(&size) = self.tall.get(&gid.0) {
            return Ok(Glyph {
                gid,
                bbox: (
                    Unit::ZERO,
                    Unit::new(-0.2 * size),
                    Unit::new(300.0),
                    Unit::new(0.8 * size),
                ),
                advance: Unit::new(300.0),
                lsb: Unit::ZERO,
                italics: Unit::ZERO,
                attachment: Unit::ZERO,
            });
        }

        let c = self
            .map
            .iter()
            .find(|(_, &g)| g == gid.0)
            .map(|(&c, _)| c)
            .ok_or(FontError::MissingGlyphGID(gid))?;

        let advance = match c {
            ' ' => 250.0,
            '(' | ')' | '[' | ']' | '|' => 300.0,
            '∑' | '∏' | '∫' => 900.0,
            _ => 500.0,
        };
        let (y_min, y_max) = match c {
            ' ' => (0.0, 0.0),
            '(' | ')' | '[' | ']' | '{' | '}' | '|' => (-250.0, 750.0),
            '√' => (0.0, 800.0),
            'g' | 'j' | 'p' | 'q' | 'y' => (-200.0, 450.0),
            '0'..='9' => (0.0, 650.0),
            '+' | '−' | '-' | '=' | '×' | '⋅' => (-50.0, 550.0),
            '∑' | '∏' | '∫' => (-300.0, 800.0),
            _ => (0.0, 700.0),
        };
        let italics = if mathsvg::font::styles::is_italic(c) { 40.0 } else { 0.0 };

        Ok(Glyph {
            gid,
            bbox: (
                Unit::ZERO,
                Unit::new(y_min),
                Unit::new(advance),
                Unit::new(y_max),
            ),
            advance: Unit::new(advance),
            lsb: Unit::ZERO,
            italics: Unit::new(italics),
            attachment: Unit::ZERO,
        })
    }

    fn constants(&self, funits_to_em: f64) -> Result<Constants, FontError> {
        let em = |v: f64| Unit::new(v * funits_to_em);
        Ok(Constants {
            subscript_shift_down: em(210.0),
            subscript_top_max: em(380.0),
            subscript_baseline_drop_min: em(160.0),

            superscript_baseline_drop_max: em(230.0),
            superscript_bottom_min: em(125.0),
            superscript_shift_up_cramped: em(290.0),
            superscript_shift_up: em(360.0),
            sub_superscript_gap_min: em(150.0),
            space_after_script: em(40.0),

            upper_limit_baseline_rise_min: em(300.0),
            upper_limit_gap_min: em(110.0),
            lower_limit_gap_min: em(170.0),
            lower_limit_baseline_drop_min: em(600.0),

            fraction_rule_thickness: em(68.0),
            fraction_numerator_display_style_shift_up: em(685.0),
            fraction_denominator_display_style_shift_down: em(685.0),
            fraction_num_display_style_gap_min: em(204.0),
            fraction_denom_display_style_gap_min: em(204.0),
            fraction_numerator_shift_up: em(394.0),
            fraction_denominator_shift_down: em(345.0),
            fraction_numerator_gap_min: em(68.0),
            fraction_denominator_gap_min: em(68.0),

            axis_height: em(250.0),
            accent_base_height: em(450.0),

            delimited_sub_formula_min_height: em(1500.0),
            display_operator_min_height: em(1800.0),

            radical_display_style_vertical_gap: em(186.0),
            radical_vertical_gap: em(82.0),
            radical_rule_thickness: em(68.0),
            radical_extra_ascender: em(76.0),
            radical_kern_before_degree: em(277.0),
            radical_kern_after_degree: em(-385.0),
            radical_degree_bottom_raise_percent: 0.6,

            overbar_vertical_gap: em(150.0),
            overbar_rule_thickness: em(66.0),
            overbar_extra_ascender: em(66.0),
            underbar_vertical_gap: em(150.0),
            underbar_rule_thickness: em(66.0),
            underbar_extra_descender: em(66.0),

            script_percent_scale_down: 0.7,
            script_script_percent_scale_down: 0.55,
        })
    }

    fn units_per_em(&self) -> f64 {
        UNITS_PER_EM
    }

    fn kern_for(&self, _gid: GlyphId, _height: Unit<FUnit>, _corner: Corner) -> Option<Unit<FUnit>> {
        None
    }

    fn variants(&self, gid: GlyphId, direction: Direction) -> Vec<SizeVariant> {
        match direction {
            Direction::Vertical => self.variants.get(&gid.0).cloned().unwrap_or_default(),
            Direction::Horizontal => Vec::new(),
        }
    }

    fn assembly(&self, gid: GlyphId, direction: Direction) -> Option<GlyphAssembly> {
        if direction != Direction::Vertical || !self.assembled.contains(&gid.0) {
            return None;
        }
        let part = |gid: u16, extender: bool, advance: f64, start: f64, end: f64| GlyphPart {
            gid: GlyphId(gid),
            extender,
            start_connector: Unit::new(start),
            end_connector: Unit::new(end),
            full_advance: Unit::new(advance),
        };
        Some(GlyphAssembly {
            parts: vec![
                part(PART_BOTTOM, false, 900.0, 0.0, 200.0),
                part(PART_EXTENDER, true, 800.0, 300.0, 300.0),
                part(PART_TOP, false, 900.0, 200.0, 0.0),
            ],
        })
    }

    fn min_connector_overlap(&self) -> Unit<FUnit> {
        Unit::new(100.0)
    }

    fn glyph_path(&self, _gid: GlyphId) -> Option<String> {
        Some("M0 0 L250 0 L250 700 Z".to_string())
    }
}

/// Builds the one shared context most tests want.
pub fn font_context(font: &MockFont) -> FontContext<'_, MockFont> {
    FontContext::new(font).expect("mock font constants")
}

// ---- a primitive-collecting backend ----

#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Glyph { gid: u16, x: f64, y: f64, scale: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Ellipse { cx: f64, cy: f64 },
    Frame { x: f64, y: f64, width: f64, height: f64 },
}

#[derive(Default)]
pub struct RecordingBackend {
    pub drawn: Vec<Drawn>,
}

impl RecordingBackend {
    pub fn glyphs(&self) -> Vec<(u16, f64, f64, f64)> {
        self.drawn
            .iter()
            .filter_map(|d| match *d {
                Drawn::Glyph { gid, x, y, scale } => Some((gid, x, y, scale)),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<(f64, f64, f64, f64)> {
        self.drawn
            .iter()
            .filter_map(|d| match *d {
                Drawn::Rect { x, y, width, height } => Some((x, y, width, height)),
                _ => None,
            })
            .collect()
    }
}

impl Backend for RecordingBackend {
    fn symbol(&mut self, pos: Cursor, gid: GlyphId, scale: f64) {
        self.drawn.push(Drawn::Glyph { gid: gid.0, x: pos.x, y: pos.y, scale });
    }

    fn rule(&mut self, pos: Cursor, width: f64, height: f64) {
        self.drawn.push(Drawn::Rect { x: pos.x, y: pos.y, width, height });
    }

    fn line(&mut self, from: Cursor, to: Cursor, _thickness: f64) {
        self.drawn.push(Drawn::Line { x1: from.x, y1: from.y, x2: to.x, y2: to.y });
    }

    fn ellipse(&mut self, pos: Cursor, width: f64, height: f64, _thickness: f64) {
        self.drawn.push(Drawn::Ellipse { cx: pos.x + width * 0.5, cy: pos.y + height * 0.5 });
    }

    fn frame(&mut self, pos: Cursor, width: f64, height: f64, _radius: f64, _thickness: f64) {
        self.drawn.push(Drawn::Frame { x: pos.x, y: pos.y, width, height });
    }

    fn begin_color(&mut self, _color: mathsvg::color::Rgba) {}

    fn end_color(&mut self) {}
}
