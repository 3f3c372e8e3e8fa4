//! The stretchy-glyph builder.
//!
//! Grows a glyph to a target extent along one axis: first by picking the
//! smallest precomputed size variant that is large enough, then by building
//! a piecewise assembly of fixed parts plus repeated extenders. Overlap
//! between adjacent parts is interpolated between the font's minimum
//! connector overlap and the largest overlap the connectors allow, so the
//! built glyph lands as close to the target as possible while never being
//! shorter than it.

use log::warn;

use crate::dimensions::{FUnit, Unit};
use crate::font::common::{Direction, GlyphAssembly, GlyphId, GlyphPart, GlyphPiece, VariantGlyph};
use crate::font::MathFont;

/// Grows `gid` so that its extent along `direction` is at least `target`.
pub fn stretch<F: MathFont>(
    font: &F,
    gid: GlyphId,
    direction: Direction,
    target: Unit<FUnit>,
) -> VariantGlyph {
    let variants = font.variants(gid, direction);
    for variant in &variants {
        if variant.advance >= target {
            return VariantGlyph::Replacement(variant.gid);
        }
    }

    if let Some(assembly) = font.assembly(gid, direction) {
        match assemble(&assembly, font.min_connector_overlap(), target) {
            Some(pieces) => return VariantGlyph::Constructable(direction, pieces),
            None => warn!(
                "glyph {} assembly cannot reach extent {}; using largest variant",
                gid.0, target
            ),
        }
    } else if variants.is_empty() {
        warn!(
            "glyph {} is not stretchable; target extent {} unreachable",
            gid.0, target
        );
    }

    VariantGlyph::Replacement(variants.last().map(|v| v.gid).unwrap_or(gid))
}

/// Total extent of an assembled sequence of pieces.
pub fn assembled_extent(pieces: &[GlyphPiece]) -> Unit<FUnit> {
    pieces
        .iter()
        .map(|p| p.advance - p.overlap)
        .sum()
}

/// Builds a piece sequence of extent at least `target` from an assembly
/// recipe, or `None` when the recipe cannot grow that far (no extenders, or
/// extenders swallowed entirely by the minimum overlap).
pub fn assemble(
    assembly: &GlyphAssembly,
    min_overlap: Unit<FUnit>,
    target: Unit<FUnit>,
) -> Option<Vec<GlyphPiece>> {
    let parts = &assembly.parts;
    if parts.is_empty() {
        return None;
    }

    let mut n_ext: usize = 0;
    let mut n_fixed: usize = 0;
    let mut size_ext = Unit::ZERO;
    let mut size_fixed = Unit::ZERO;
    for part in parts {
        if part.extender {
            n_ext += 1;
            size_ext += part.full_advance;
        } else {
            n_fixed += 1;
            size_fixed += part.full_advance;
        }
    }

    // Extent with r extender repetitions and minimal overlap everywhere:
    //   total(r) = base + r * growth
    // with base covering the fixed parts and their joints. The formula also
    // holds for recipes with no fixed parts (base degenerates to +overlap).
    let base = size_fixed - min_overlap.scale(n_fixed as f64 - 1.0);
    let growth = size_ext - min_overlap.scale(n_ext as f64);

    let repeats: usize = if n_fixed > 0 && base >= target {
        0
    } else {
        if n_ext == 0 || growth <= Unit::ZERO {
            return None;
        }
        let needed = (target - base) / growth;
        (needed.ceil().max(0.0) as usize).max(1)
    };

    // Expand the recipe into the actual part sequence.
    let mut sequence: Vec<GlyphPart> = Vec::with_capacity(n_fixed + repeats * n_ext);
    for part in parts {
        let count = if part.extender { repeats } else { 1 };
        for _ in 0..count {
            sequence.push(*part);
        }
    }
    if sequence.is_empty() {
        return None;
    }

    // Interpolate each joint's overlap between the minimum and what the
    // connectors allow, so the total lands on the target from above.
    let max_overlaps: Vec<Unit<FUnit>> = sequence
        .windows(2)
        .map(|w| max_overlap(min_overlap, &w[0], &w[1]))
        .collect();

    let total: Unit<FUnit> = sequence.iter().map(|p| p.full_advance).sum();
    let size_min = total - min_overlap.scale(max_overlaps.len() as f64);
    let size_max = total - max_overlaps.iter().copied().sum();

    let factor = if size_min <= target || size_min <= size_max {
        0.0
    } else {
        ((size_min - target) / (size_min - size_max)).min(1.0)
    };

    let mut pieces = Vec::with_capacity(sequence.len());
    for (idx, part) in sequence.iter().enumerate() {
        let overlap = if idx == 0 {
            Unit::ZERO
        } else {
            let max = max_overlaps[idx - 1];
            min_overlap + (max - min_overlap).scale(factor)
        };
        pieces.push(GlyphPiece { gid: part.gid, overlap, advance: part.full_advance });
    }

    Some(pieces)
}

fn max_overlap(min_overlap: Unit<FUnit>, left: &GlyphPart, right: &GlyphPart) -> Unit<FUnit> {
    let overlap = Unit::min(left.end_connector, right.start_connector);
    let overlap = Unit::min(overlap, right.full_advance.scale(0.5));
    Unit::max(overlap, min_overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(gid: u16, extender: bool, advance: f64, conn: f64) -> GlyphPart {
        GlyphPart {
            gid: GlyphId(gid),
            extender,
            start_connector: Unit::new(conn),
            end_connector: Unit::new(conn),
            full_advance: Unit::new(advance),
        }
    }

    fn brace_recipe() -> GlyphAssembly {
        GlyphAssembly {
            parts: vec![
                part(1, false, 1000.0, 200.0),
                part(2, true, 800.0, 300.0),
                part(3, false, 600.0, 250.0),
                part(2, true, 800.0, 300.0),
                part(4, false, 1000.0, 200.0),
            ],
        }
    }

    #[test]
    fn reaches_target_from_above() {
        let recipe = brace_recipe();
        let min_overlap = Unit::new(100.0);
        for target in (3000..20000).step_by(500) {
            let target = Unit::new(target as f64);
            let pieces = assemble(&recipe, min_overlap, target).unwrap();
            let extent = assembled_extent(&pieces);
            assert!(extent >= target, "built {} for target {}", extent, target);
            // stay reasonably close: never exceed the target by more than
            // one whole extender
            assert!(extent <= target + Unit::new(800.0));
        }
    }

    #[test]
    fn growth_is_monotonic() {
        let recipe = brace_recipe();
        let min_overlap = Unit::new(100.0);
        let mut previous = Unit::ZERO;
        for target in (3000..20000).step_by(250) {
            let pieces = assemble(&recipe, min_overlap, Unit::new(target as f64)).unwrap();
            let extent = assembled_extent(&pieces);
            assert!(extent >= previous, "{} then {}", previous, extent);
            previous = extent;
        }
    }

    #[test]
    fn each_extender_strictly_increases_length() {
        let recipe = brace_recipe();
        let min_overlap = Unit::new(100.0);
        let mut piece_counts = Vec::new();
        for target in (3000..20000).step_by(250) {
            let pieces = assemble(&recipe, min_overlap, Unit::new(target as f64)).unwrap();
            piece_counts.push((pieces.len(), assembled_extent(&pieces)));
        }
        for pair in piece_counts.windows(2) {
            if pair[1].0 > pair[0].0 {
                assert!(pair[1].1 > pair[0].1);
            }
        }
    }

    #[test]
    fn extender_only_recipe() {
        let recipe = GlyphAssembly { parts: vec![part(9, true, 500.0, 150.0)] };
        let pieces = assemble(&recipe, Unit::new(50.0), Unit::new(2000.0)).unwrap();
        assert!(assembled_extent(&pieces) >= Unit::new(2000.0));
        assert!(pieces.len() >= 4);
    }

    #[test]
    fn degenerate_recipe_is_rejected() {
        // extenders fully swallowed by the overlap floor cannot grow
        let recipe = GlyphAssembly { parts: vec![part(9, true, 100.0, 100.0)] };
        assert!(assemble(&recipe, Unit::new(100.0), Unit::new(2000.0)).is_none());
    }
}
