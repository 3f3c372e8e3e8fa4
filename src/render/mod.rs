//! Placement: walks the layout tree accumulating absolute positions and
//! hands each primitive to a [`Backend`].
//!
//! The coordinate system is screen-like: +Y grows downward, so a
//! superscript has a smaller Y than its base. Glyph outlines come out of
//! fonts with the opposite convention; backends flip the Y axis when they
//! draw a symbol.

pub mod svg;

use crate::color::Rgba;
use crate::font::common::GlyphId;
use crate::layout::{Alignment, Layout, LayoutNode, LayoutVariant};

/// Position of the cursor in surface units (pixels).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

impl Cursor {
    pub fn translate(self, dx: f64, dy: f64) -> Cursor {
        Cursor { x: self.x + dx, y: self.y + dy }
    }

    pub fn right(self, dx: f64) -> Cursor {
        Cursor { x: self.x + dx, y: self.y }
    }

    pub fn up(self, dy: f64) -> Cursor {
        Cursor { x: self.x, y: self.y - dy }
    }

    pub fn down(self, dy: f64) -> Cursor {
        Cursor { x: self.x, y: self.y + dy }
    }
}

/// The drawing operations a surface must support. Positions are absolute;
/// colors nest as a stack.
pub trait Backend {
    /// Draws the glyph `gid` with its origin (baseline, left) at `pos`,
    /// scaled to `scale` pixels per em.
    fn symbol(&mut self, pos: Cursor, gid: GlyphId, scale: f64);
    /// Draws a filled rectangle whose top-left corner is at `pos`.
    fn rule(&mut self, pos: Cursor, width: f64, height: f64);
    /// Draws a stroked line segment.
    fn line(&mut self, from: Cursor, to: Cursor, thickness: f64);
    /// Draws a stroked ellipse inscribed in the rectangle at `pos`.
    fn ellipse(&mut self, pos: Cursor, width: f64, height: f64, thickness: f64);
    /// Draws a stroked rectangle with rounded corners.
    fn frame(&mut self, pos: Cursor, width: f64, height: f64, radius: f64, thickness: f64);
    /// Makes `color` current until the matching [`Backend::end_color`].
    fn begin_color(&mut self, color: Rgba);
    fn end_color(&mut self);
}

/// Walks a [`Layout`] and issues draw calls.
#[derive(Default)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    /// Renders `layout` with the baseline origin at `(x, y)`.
    pub fn render(&self, layout: &Layout, out: &mut impl Backend, x: f64, y: f64) {
        let pos = Cursor { x, y };
        self.render_hbox(
            out,
            pos,
            &layout.contents,
            layout.width.unitless(),
            layout.alignment,
        );
    }

    fn render_hbox(
        &self,
        out: &mut impl Backend,
        mut pos: Cursor,
        nodes: &[LayoutNode],
        nodes_width: f64,
        alignment: Alignment,
    ) {
        if let Alignment::Centered(w) = alignment {
            pos.x += (nodes_width - w.unitless()) * 0.5;
        } else if let Alignment::Right(w) = alignment {
            pos.x += nodes_width - w.unitless();
        }

        for node in nodes {
            self.render_node(out, pos, node);
            pos.x += node.width.unitless();
        }
    }

    fn render_vbox(&self, out: &mut impl Backend, mut pos: Cursor, nodes: &[LayoutNode]) {
        for node in nodes {
            match node.node {
                LayoutVariant::Rule => out.rule(
                    pos,
                    node.width.unitless(),
                    (node.height - node.depth).unitless(),
                ),
                LayoutVariant::HorizontalBox(ref hbox) => self.render_hbox(
                    out,
                    pos.down(node.height.unitless()),
                    &hbox.contents,
                    node.width.unitless(),
                    hbox.alignment,
                ),
                LayoutVariant::VerticalBox(ref vbox) => {
                    self.render_vbox(out, pos, &vbox.contents);
                }
                LayoutVariant::Glyph(ref glyph) => {
                    out.symbol(pos.down(node.height.unitless()), glyph.gid, glyph.size.unitless());
                }
                LayoutVariant::Color(ref change) => {
                    out.begin_color(change.color);
                    self.render_vbox(out, pos, &change.inner);
                    out.end_color();
                }
                LayoutVariant::Phantom(_) => {}
                LayoutVariant::Kern => {}
                _ => self.render_node(out, pos.down(node.height.unitless()), node),
            }

            pos.y += node.height.unitless();
        }
    }

    fn render_node(&self, out: &mut impl Backend, pos: Cursor, node: &LayoutNode) {
        let width = node.width.unitless();
        let height = node.height.unitless();
        let depth = node.depth.unitless();

        match node.node {
            LayoutVariant::Glyph(ref glyph) => {
                out.symbol(pos, glyph.gid, glyph.size.unitless());
            }

            LayoutVariant::Rule => {
                out.rule(pos.up(height), width, height - depth);
            }

            LayoutVariant::VerticalBox(ref vbox) => {
                self.render_vbox(out, pos.up(height), &vbox.contents);
            }

            LayoutVariant::HorizontalBox(ref hbox) => {
                self.render_hbox(out, pos, &hbox.contents, width, hbox.alignment);
            }

            LayoutVariant::Color(ref change) => {
                out.begin_color(change.color);
                self.render_hbox(out, pos, &change.inner, width, Alignment::Default);
                out.end_color();
            }

            LayoutVariant::Phantom(_) => {}

            LayoutVariant::Diagonal { thickness, up } => {
                let top = pos.up(height);
                let bottom = pos.up(depth);
                let (from, to) = if up {
                    (Cursor { x: pos.x, y: bottom.y }, Cursor { x: pos.x + width, y: top.y })
                } else {
                    (Cursor { x: pos.x, y: top.y }, Cursor { x: pos.x + width, y: bottom.y })
                };
                out.line(from, to, thickness.unitless());
            }

            LayoutVariant::Ellipse { thickness } => {
                out.ellipse(pos.up(height), width, height - depth, thickness.unitless());
            }

            LayoutVariant::Frame { thickness, radius } => {
                out.frame(pos.up(height), width, height - depth, radius.unitless(), thickness.unitless());
            }

            LayoutVariant::Kern => {}
        }
    }
}
