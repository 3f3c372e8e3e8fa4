//! Layout boxes: the typeset form of a MathML tree, ready for placement.
//!
//! The model is the classic TeX one: horizontal boxes advance along the
//! inline axis, vertical boxes stack, kerns are invisible spacing, rules are
//! filled rectangles, and glyphs are leaves. Heights are measured up from
//! the baseline; depth is stored as a negative offset below it, so visible
//! material satisfies `height >= 0 >= depth`.

#[macro_use]
pub mod builders;
pub mod dictionary;
pub mod engine;

use std::fmt;

use crate::color::Rgba;
use crate::config::Config;
use crate::dimensions::{AnyLength, Em, FUnit, Px, Unit};
use crate::font::common::GlyphId;
use crate::font::styles::MathVariant;
use crate::font::{Constants, FontContext};

/// A finished sub-layout: a sequence of nodes plus the box metrics of the
/// whole. The default reading is a horizontal box.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub contents: Vec<LayoutNode>,
    /// Advance along the inline axis.
    pub width: Unit<Px>,
    /// Distance from baseline to the top.
    pub height: Unit<Px>,
    /// Distance from baseline to the bottom; negative below the baseline.
    pub depth: Unit<Px>,
    /// Offset applied to the baseline when nesting.
    pub offset: Unit<Px>,
    /// How children are placed when the box is wider than its contents.
    pub alignment: Alignment,
}

impl Layout {
    pub fn new() -> Layout {
        Layout::default()
    }

    /// Wraps the layout into a node insertable into a parent layout.
    pub fn as_node(self) -> LayoutNode {
        LayoutNode {
            width: self.width,
            height: self.height,
            depth: self.depth,
            node: LayoutVariant::HorizontalBox(HorizontalBox {
                contents: self.contents,
                offset: self.offset,
                alignment: self.alignment,
            }),
        }
    }

    /// Appends a node on the right.
    pub fn add_node(&mut self, node: LayoutNode) {
        self.width += node.width;
        self.height = Unit::max(self.height, node.height);
        self.depth = Unit::min(self.depth, node.depth);
        self.contents.push(node);
    }

    pub fn set_offset(&mut self, offset: Unit<Px>) {
        self.offset = offset;
    }

    pub fn finalize(mut self) -> Layout {
        self.depth -= self.offset;
        self.height -= self.offset;
        self
    }

    /// Widens the layout to `new_width`, centering the contents in it.
    pub fn centered(mut self, new_width: Unit<Px>) -> Layout {
        self.alignment = Alignment::Centered(self.width);
        self.width = new_width;
        self
    }

    pub fn is_symbol(&self) -> Option<LayoutGlyph> {
        is_symbol(&self.contents)
    }
}

/// A sub-part of the layout hierarchy.
#[derive(Clone)]
pub struct LayoutNode {
    pub node: LayoutVariant,
    pub width: Unit<Px>,
    pub height: Unit<Px>,
    pub depth: Unit<Px>,
}

/// The different kinds of layout nodes.
#[derive(Clone)]
pub enum LayoutVariant {
    HorizontalBox(HorizontalBox),
    VerticalBox(VerticalBox),
    /// A glyph from the font.
    Glyph(LayoutGlyph),
    /// A filled rectangle spanning the node's box.
    Rule,
    /// Invisible spacing.
    Kern,
    /// A scope drawn in another color.
    Color(ColorChange),
    /// Takes the space of its content but draws nothing.
    Phantom(Box<LayoutNode>),
    /// A stroked diagonal across the node's box, used by `menclose`.
    Diagonal { thickness: Unit<Px>, up: bool },
    /// A stroked ellipse inscribed in the node's box.
    Ellipse { thickness: Unit<Px> },
    /// A stroked rectangle on the node's box with rounded corners.
    Frame { thickness: Unit<Px>, radius: Unit<Px> },
}

/// All children of this node use `color` as their fill.
#[derive(Clone)]
pub struct ColorChange {
    pub color: Rgba,
    pub inner: Vec<LayoutNode>,
}

/// A horizontal box: children are placed side by side.
#[derive(Clone, Default)]
pub struct HorizontalBox {
    pub contents: Vec<LayoutNode>,
    pub offset: Unit<Px>,
    pub alignment: Alignment,
}

/// A vertical box: children are stacked top to bottom.
#[derive(Clone, Default)]
pub struct VerticalBox {
    pub contents: Vec<LayoutNode>,
    pub offset: Unit<Px>,
    pub alignment: Alignment,
}

/// A glyph placed by the layout, with the metrics script placement needs.
#[derive(Clone, Copy)]
pub struct LayoutGlyph {
    pub gid: GlyphId,
    /// Font size the glyph is drawn at, in pixels per em.
    pub size: Unit<Px>,
    pub offset: Unit<Px>,
    /// Horizontal anchor for accents.
    pub attachment: Unit<Px>,
    /// Italic correction.
    pub italics: Unit<Px>,
}

/// How to horizontally align contents inside a wider box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Alignment {
    /// Centered within the argument width.
    Centered(Unit<Px>),
    /// Right-aligned within the argument width.
    Right(Unit<Px>),
    /// Placed left to right.
    Left,
    #[default]
    Default,
}

impl LayoutNode {
    /// Centers the node vertically about the math axis.
    pub fn centered(mut self, axis: Unit<Px>) -> LayoutNode {
        let shift = (self.height + self.depth).scale(0.5) - axis;

        match self.node {
            LayoutVariant::VerticalBox(ref mut vb) => {
                vb.offset = shift;
                self.height -= shift;
                self.depth -= shift;
            }
            LayoutVariant::Glyph(_) => return vbox!(offset: shift; self),
            _ => (),
        }

        self
    }

    pub fn is_symbol(&self) -> Option<LayoutGlyph> {
        match self.node {
            LayoutVariant::Glyph(gly) => Some(gly),
            LayoutVariant::HorizontalBox(ref hb) => is_symbol(&hb.contents),
            LayoutVariant::VerticalBox(ref vb) => is_symbol(&vb.contents),
            LayoutVariant::Color(ref clr) => is_symbol(&clr.inner),
            _ => None,
        }
    }
}

/// A singleton glyph hiding inside nested boxes, if any. Scripts and
/// accents take the single-glyph fast path through the kerning tables.
pub fn is_symbol(contents: &[LayoutNode]) -> Option<LayoutGlyph> {
    if contents.len() != 1 {
        return None;
    }
    contents[0].is_symbol()
}

impl fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.node {
            LayoutVariant::HorizontalBox(ref hb) => write!(f, "HBox({:?})", hb.contents),
            LayoutVariant::VerticalBox(ref vb) => write!(f, "VBox({:?})", vb.contents),
            LayoutVariant::Glyph(ref gly) => write!(f, "Glyph({})", gly.gid.0),
            LayoutVariant::Rule => write!(f, "Rule()"),
            LayoutVariant::Kern => {
                let kern = if self.width.is_zero() { self.height } else { self.width };
                write!(f, "Kern({:.1})", kern.unitless())
            }
            LayoutVariant::Color(ref clr) => write!(f, "Color({:?}, {:?})", clr.color, clr.inner),
            LayoutVariant::Phantom(ref inner) => write!(f, "Phantom({:?})", inner),
            LayoutVariant::Diagonal { up, .. } => write!(f, "Diagonal(up: {})", up),
            LayoutVariant::Ellipse { .. } => write!(f, "Ellipse()"),
            LayoutVariant::Frame { .. } => write!(f, "Frame()"),
        }
    }
}

// ------------------- The style context -------------------

/// The immutable style scope propagated down the tree.
#[derive(Clone, Copy, Debug)]
pub struct Style {
    /// Pixels per em at script level 0.
    pub base_size: f64,
    /// Pixels per em at the current script level.
    pub font_size: f64,
    pub script_level: u8,
    pub display: bool,
    pub cramped: bool,
    /// Explicit `mathvariant` in scope, if any.
    pub variant: Option<MathVariant>,
    pub color: Rgba,
    pub background: Option<Rgba>,
}

impl Style {
    pub fn new(font_size: f64, display: bool) -> Style {
        Style {
            base_size: font_size,
            font_size,
            script_level: 0,
            display,
            cramped: false,
            variant: None,
            color: Rgba::BLACK,
            background: None,
        }
    }
}

/// Everything a layout function needs: the font oracle, the style scope and
/// the configuration snapshot for this render.
pub struct LayoutSettings<'a, 'f, F> {
    pub ctx: &'a FontContext<'f, F>,
    pub style: Style,
    pub config: &'a Config,
}

impl<'a, 'f, F> Clone for LayoutSettings<'a, 'f, F> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, 'f, F> Copy for LayoutSettings<'a, 'f, F> {}

impl<'a, 'f, F> LayoutSettings<'a, 'f, F> {
    pub fn new(ctx: &'a FontContext<'f, F>, config: &'a Config, style: Style) -> Self {
        LayoutSettings { ctx, style, config }
    }

    pub fn constants(&self) -> &Constants {
        &self.ctx.constants
    }

    fn with_style(self, style: Style) -> Self {
        LayoutSettings { style, ..self }
    }

    /// Scale factor for a script level, honoring the minimum size fraction.
    fn sized_for_level(&self, level: u8) -> f64 {
        let c = self.constants();
        let factor = match level {
            0 => 1.0,
            1 => c.script_percent_scale_down,
            _ => c.script_script_percent_scale_down,
        };
        let floor = self.config.min_size_fraction * self.style.base_size;
        (self.style.base_size * factor).max(floor)
    }

    fn bumped(self, levels: u8) -> Self {
        let level = (self.style.script_level + levels).min(2);
        let font_size = self.sized_for_level(level);
        self.with_style(Style { script_level: level, font_size, ..self.style })
    }

    pub fn cramped(self) -> Self {
        self.with_style(Style { cramped: true, ..self.style })
    }

    pub fn superscript_variant(self) -> Self {
        let mut next = self.bumped(1);
        next.style.display = false;
        next
    }

    pub fn subscript_variant(self) -> Self {
        let mut next = self.bumped(1);
        next.style.display = false;
        next.style.cramped = true;
        next
    }

    /// Two levels down at once, for radical degrees.
    pub fn degree_variant(self) -> Self {
        let mut next = self.bumped(2);
        next.style.display = false;
        next
    }

    pub fn numerator(self) -> Self {
        if self.style.display {
            self.with_style(Style { display: false, ..self.style })
        } else {
            self.bumped(1)
        }
    }

    pub fn denominator(self) -> Self {
        let mut next = self.numerator();
        next.style.cramped = true;
        next
    }

    pub fn with_display(self) -> Self {
        self.with_style(Style { display: true, ..self.style })
    }

    pub fn with_text(self) -> Self {
        self.with_style(Style { display: false, ..self.style })
    }

    // ---- unit conversions at the current size ----

    /// Em at the current font size to pixels.
    pub fn px_em(&self, em: Unit<Em>) -> Unit<Px> {
        Unit::new(em.unitless() * self.style.font_size)
    }

    /// Font design units at the current font size to pixels.
    pub fn px_funit(&self, u: Unit<FUnit>) -> Unit<Px>
    where
        F: crate::font::MathFont,
    {
        Unit::new(u.unitless() / self.ctx.units_per_em * self.style.font_size)
    }

    /// Pixels back to font design units.
    pub fn to_font(&self, px: Unit<Px>) -> Unit<FUnit>
    where
        F: crate::font::MathFont,
    {
        Unit::new(px.unitless() * self.ctx.units_per_em / self.style.font_size)
    }

    /// Resolves an attribute length against the current font size.
    pub fn length_px(&self, length: AnyLength) -> Unit<Px> {
        length.to_px(self.style.font_size)
    }
}

/// Lengths that know how to convert themselves to pixels at the current
/// style. Lets constants read as `constants.axis_height.scaled(config)`.
pub trait Scaled {
    fn scaled<F: crate::font::MathFont>(self, settings: LayoutSettings<'_, '_, F>) -> Unit<Px>;
}

impl Scaled for Unit<Em> {
    fn scaled<F: crate::font::MathFont>(self, settings: LayoutSettings<'_, '_, F>) -> Unit<Px> {
        settings.px_em(self)
    }
}

impl Scaled for Unit<FUnit> {
    fn scaled<F: crate::font::MathFont>(self, settings: LayoutSettings<'_, '_, F>) -> Unit<Px> {
        settings.px_funit(self)
    }
}
