//! Types shared between the [`MathFont`](crate::font::MathFont) trait, the
//! stretchy-glyph builder and the layout engine.

use crate::dimensions::{FUnit, Unit};

/// An identifier of a glyph inside a font.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct GlyphId(pub u16);

/// Growth axis of a stretchy glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// One precomputed size variant of a glyph, as listed in the font's
/// MathVariants table.
#[derive(Debug, Clone, Copy)]
pub struct SizeVariant {
    pub gid: GlyphId,
    /// Extent along the growth axis.
    pub advance: Unit<FUnit>,
}

/// One part of a glyph-assembly recipe.
#[derive(Debug, Clone, Copy)]
pub struct GlyphPart {
    pub gid: GlyphId,
    /// Whether the part may be repeated to reach arbitrary extents.
    pub extender: bool,
    /// Maximum overlap the part offers at its start (bottom/left).
    pub start_connector: Unit<FUnit>,
    /// Maximum overlap the part offers at its end (top/right).
    pub end_connector: Unit<FUnit>,
    /// Extent of the part along the growth axis.
    pub full_advance: Unit<FUnit>,
}

/// A recipe for building an arbitrarily long glyph from parts.
///
/// Parts are listed in visual order along the growth axis: bottom to top for
/// vertical recipes, left to right for horizontal ones.
#[derive(Debug, Clone)]
pub struct GlyphAssembly {
    pub parts: Vec<GlyphPart>,
}

/// One piece of a constructed glyph: the glyph to place and how much it
/// overlaps the previous piece.
#[derive(Debug, Clone, Copy)]
pub struct GlyphPiece {
    pub gid: GlyphId,
    pub overlap: Unit<FUnit>,
    pub advance: Unit<FUnit>,
}

/// The result of growing a glyph to a target extent: either a single
/// replacement glyph or a piecewise construction.
#[derive(Debug, Clone)]
pub enum VariantGlyph {
    Replacement(GlyphId),
    Constructable(Direction, Vec<GlyphPiece>),
}
