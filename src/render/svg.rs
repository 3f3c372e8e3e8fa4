//! The SVG backend: collects absolutely positioned primitives and
//! serializes them into a standalone document.
//!
//! In SVG 2 mode every distinct glyph becomes a `<symbol>` in `<defs>` and
//! the body references it with `<use>`; in SVG 1.1 mode each glyph is
//! inlined as a `<path>`. Either way the output embeds the outlines, so
//! recipients need neither the font nor a text shaper.

use std::collections::BTreeMap;

use log::warn;
use xmlwriter::XmlWriter;

use crate::color::Rgba;
use crate::config::Config;
use crate::font::common::GlyphId;
use crate::font::{FontContext, MathFont};

use super::{Backend, Cursor};

#[derive(Debug, Clone)]
enum Prim {
    Glyph { gid: GlyphId, x: f64, y: f64, scale: f64, color: Rgba },
    Rect { x: f64, y: f64, width: f64, height: f64, color: Rgba },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, thickness: f64, color: Rgba },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64, thickness: f64, color: Rgba },
    Frame { x: f64, y: f64, width: f64, height: f64, radius: f64, thickness: f64, color: Rgba },
}

/// A [`Backend`] that records primitives and glyph outlines for SVG output.
pub struct SvgBackend<'a, 'f, F> {
    ctx: &'a FontContext<'f, F>,
    prims: Vec<Prim>,
    paths: BTreeMap<u16, String>,
    color: Rgba,
    color_stack: Vec<Rgba>,
}

impl<'a, 'f, F: MathFont> SvgBackend<'a, 'f, F> {
    pub fn new(ctx: &'a FontContext<'f, F>, color: Rgba) -> Self {
        SvgBackend {
            ctx,
            prims: Vec::new(),
            paths: BTreeMap::new(),
            color,
            color_stack: Vec::new(),
        }
    }

    fn register_glyph(&mut self, gid: GlyphId) {
        if !self.paths.contains_key(&gid.0) {
            let path = self.ctx.font.glyph_path(gid).unwrap_or_default();
            if path.is_empty() {
                warn!("glyph {} has no outline", gid.0);
            }
            self.paths.insert(gid.0, path);
        }
    }

    /// Serializes everything into a standalone `<svg>` document.
    ///
    /// `width` and `height` are the dimensions of the drawing in pixels;
    /// primitives were recorded in that coordinate space already.
    pub fn finish(self, width: f64, height: f64, config: &Config) -> String {
        self.finish_rotated(width, height, 0.0, config)
    }

    /// Like [`SvgBackend::finish`], rotating the whole drawing by
    /// `rotation` degrees counterclockwise about its center.
    pub fn finish_rotated(self, width: f64, height: f64, rotation: f64, config: &Config) -> String {
        let precision = config.precision;
        let n = |v: f64| fmt_num(v, precision);

        let mut xml = XmlWriter::new(xmlwriter::Options::default());
        xml.start_element("svg");
        xml.write_attribute("xmlns", "http://www.w3.org/2000/svg");
        xml.write_attribute("width", &format!("{}pt", n(width * 0.75)));
        xml.write_attribute("height", &format!("{}pt", n(height * 0.75)));
        xml.write_attribute(
            "viewBox",
            &format!("0 0 {} {}", n(width), n(height)),
        );

        if config.svg2 && !self.paths.is_empty() {
            xml.start_element("defs");
            for (gid, path) in &self.paths {
                xml.start_element("symbol");
                xml.write_attribute("id", &format!("g{}", gid));
                xml.write_attribute("overflow", "visible");
                xml.start_element("path");
                xml.write_attribute("d", path);
                xml.end_element();
                xml.end_element();
            }
            xml.end_element();
        }

        let rotated = rotation != 0.0;
        if rotated {
            xml.start_element("g");
            xml.write_attribute(
                "transform",
                &format!(
                    "rotate({} {} {})",
                    n(-rotation),
                    n(width * 0.5),
                    n(height * 0.5)
                ),
            );
        }
        self.write_prims(&mut xml, 0.0, 0.0, config);
        if rotated {
            xml.end_element();
        }
        xml.end_document()
    }

    /// Serializes the recorded primitives into an existing document,
    /// translated by `(dx, dy)`. Glyphs are always inlined as paths here so
    /// the host document needs no `<defs>`.
    pub fn drawon(&self, xml: &mut XmlWriter, dx: f64, dy: f64, config: &Config) {
        xml.start_element("g");
        if dx != 0.0 || dy != 0.0 {
            xml.write_attribute(
                "transform",
                &format!("translate({} {})", fmt_num(dx, config.precision), fmt_num(dy, config.precision)),
            );
        }
        let mut inline = Config::clone(config);
        inline.svg2 = false;
        self.write_prims(xml, 0.0, 0.0, &inline);
        xml.end_element();
    }

    fn write_prims(&self, xml: &mut XmlWriter, dx: f64, dy: f64, config: &Config) {
        let precision = config.precision;
        let n = |v: f64| fmt_num(v, precision);
        let upem = self.ctx.units_per_em;

        for prim in &self.prims {
            match *prim {
                Prim::Glyph { gid, x, y, scale, color } => {
                    let s = scale / upem;
                    let transform = format!(
                        "translate({} {}) scale({} {})",
                        n(x + dx),
                        n(y + dy),
                        n(s),
                        n(-s)
                    );
                    if config.svg2 {
                        xml.start_element("use");
                        xml.write_attribute("href", &format!("#g{}", gid.0));
                        xml.write_attribute("transform", &transform);
                        if color != Rgba::BLACK {
                            xml.write_attribute("fill", &color.to_svg());
                        }
                        xml.end_element();
                    } else {
                        let path = self.paths.get(&gid.0).map(String::as_str).unwrap_or("");
                        xml.start_element("path");
                        xml.write_attribute("d", path);
                        xml.write_attribute("transform", &transform);
                        if color != Rgba::BLACK {
                            xml.write_attribute("fill", &color.to_svg());
                        }
                        xml.end_element();
                    }
                }
                Prim::Rect { x, y, width, height, color } => {
                    xml.start_element("rect");
                    xml.write_attribute("x", &n(x + dx));
                    xml.write_attribute("y", &n(y + dy));
                    xml.write_attribute("width", &n(width));
                    xml.write_attribute("height", &n(height));
                    if color != Rgba::BLACK {
                        xml.write_attribute("fill", &color.to_svg());
                    }
                    xml.end_element();
                }
                Prim::Line { x1, y1, x2, y2, thickness, color } => {
                    xml.start_element("line");
                    xml.write_attribute("x1", &n(x1 + dx));
                    xml.write_attribute("y1", &n(y1 + dy));
                    xml.write_attribute("x2", &n(x2 + dx));
                    xml.write_attribute("y2", &n(y2 + dy));
                    xml.write_attribute("stroke", &color.to_svg());
                    xml.write_attribute("stroke-width", &n(thickness));
                    xml.end_element();
                }
                Prim::Ellipse { cx, cy, rx, ry, thickness, color } => {
                    xml.start_element("ellipse");
                    xml.write_attribute("cx", &n(cx + dx));
                    xml.write_attribute("cy", &n(cy + dy));
                    xml.write_attribute("rx", &n(rx));
                    xml.write_attribute("ry", &n(ry));
                    xml.write_attribute("fill", "none");
                    xml.write_attribute("stroke", &color.to_svg());
                    xml.write_attribute("stroke-width", &n(thickness));
                    xml.end_element();
                }
                Prim::Frame { x, y, width, height, radius, thickness, color } => {
                    xml.start_element("rect");
                    xml.write_attribute("x", &n(x + dx));
                    xml.write_attribute("y", &n(y + dy));
                    xml.write_attribute("width", &n(width));
                    xml.write_attribute("height", &n(height));
                    if radius > 0.0 {
                        xml.write_attribute("rx", &n(radius));
                    }
                    xml.write_attribute("fill", "none");
                    xml.write_attribute("stroke", &color.to_svg());
                    xml.write_attribute("stroke-width", &n(thickness));
                    xml.end_element();
                }
            }
        }
    }
}

impl<'a, 'f, F: MathFont> Backend for SvgBackend<'a, 'f, F> {
    fn symbol(&mut self, pos: Cursor, gid: GlyphId, scale: f64) {
        self.register_glyph(gid);
        self.prims.push(Prim::Glyph { gid, x: pos.x, y: pos.y, scale, color: self.color });
    }

    fn rule(&mut self, pos: Cursor, width: f64, height: f64) {
        self.prims.push(Prim::Rect { x: pos.x, y: pos.y, width, height, color: self.color });
    }

    fn line(&mut self, from: Cursor, to: Cursor, thickness: f64) {
        self.prims.push(Prim::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            thickness,
            color: self.color,
        });
    }

    fn ellipse(&mut self, pos: Cursor, width: f64, height: f64, thickness: f64) {
        self.prims.push(Prim::Ellipse {
            cx: pos.x + width * 0.5,
            cy: pos.y + height * 0.5,
            rx: width * 0.5,
            ry: height * 0.5,
            thickness,
            color: self.color,
        });
    }

    fn frame(&mut self, pos: Cursor, width: f64, height: f64, radius: f64, thickness: f64) {
        self.prims.push(Prim::Frame {
            x: pos.x,
            y: pos.y,
            width,
            height,
            radius,
            thickness,
            color: self.color,
        });
    }

    fn begin_color(&mut self, color: Rgba) {
        self.color_stack.push(std::mem::replace(&mut self.color, color));
    }

    fn end_color(&mut self) {
        if let Some(color) = self.color_stack.pop() {
            self.color = color;
        }
    }
}

/// Fixed-precision number formatting with trailing zeros trimmed, so output
/// is byte-stable across runs.
pub fn fmt_num(value: f64, precision: u8) -> String {
    let mut s = format!("{:.*}", precision as usize, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting() {
        assert_eq!(fmt_num(1.0, 4), "1");
        assert_eq!(fmt_num(1.25, 4), "1.25");
        assert_eq!(fmt_num(1.00004, 4), "1");
        assert_eq!(fmt_num(-0.00001, 4), "0");
        assert_eq!(fmt_num(2.5, 0), "2");
        assert_eq!(fmt_num(std::f64::consts::PI, 3), "3.142");
    }
}
