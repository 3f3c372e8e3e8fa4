/*! # Math rendering to standalone SVG.

Renders mathematical expressions, written in MathML or in LaTeX (through a
converter), into self-contained SVG: every glyph is embedded as a path
taken from an OpenType math font, so the output needs no font, TeX engine
or rasterizer on the receiving side.

## Basic usage

Load a font with a `MATH` table, build a [`FontContext`](font::FontContext),
and render:

```no_run
use mathsvg::font::{backend::ttf_parser::MathFace, FontContext};

let data = std::fs::read("STIXTwoMath-Regular.otf").expect("font file");
let face = MathFace::parse(&data).expect("font with a MATH table");
let ctx = FontContext::new(&face).expect("MATH constants");

let svg = mathsvg::render_mathml(
    "<math><msup><mi>x</mi><mn>2</mn></msup></math>",
    &ctx,
).expect("rendering");
std::fs::write("x_squared.svg", svg).expect("write");
```

The pipeline underneath is three steps, each usable on its own:

 1. [`mathml::parse_mathml`] builds the element tree,
 2. [`layout::engine::layout`] typesets it into a box tree using the
    font's MATH constants,
 3. [`render::Renderer`] walks the boxes into absolutely positioned
    primitives, which [`render::svg::SvgBackend`] serializes.

Rendering is deterministic: the same input under the same configuration
yields byte-identical SVG.

## Configuration

Process-wide settings (SVG flavor, numeric precision, fonts, equation
numbering) live in [`config`]; they are snapshotted once per render. The
only mutable global is the equation counter, reset with
[`config::reset_numbering`].
*/

#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

#[deny(missing_docs)]
pub mod error;
pub mod dimensions;
pub mod color;
pub mod config;
pub mod mathml;
pub mod font;
pub mod layout;
pub mod render;
pub mod latex;
pub mod text;

use color::{parse_color, Rgba};
use config::Config;
use dimensions::{AnyLength, Unit};
use error::Error;
use font::styles::MathVariant;
use font::{FontContext, MathFont};
use latex::LatexToMathML;
use layout::{engine, Layout, LayoutSettings, Style};
use mathml::{MathNode, Tag};
use render::svg::SvgBackend;
use render::Renderer;

pub use text::{render_text, TextOptions};

/// Per-call options for the MathML entry points.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Forces display or inline style; `None` reads the `display`
    /// attribute of `<math>` and defaults to display.
    pub display: Option<bool>,
    /// An explicit equation number, overriding autonumbering.
    pub number: Option<String>,
}

/// Renders a MathML document to a standalone SVG string.
pub fn render_mathml<F: MathFont>(source: &str, ctx: &FontContext<F>) -> Result<String, Error> {
    render_mathml_with(source, ctx, &RenderOptions::default())
}

/// Renders a MathML document in inline (text) style.
pub fn render_mathml_inline<F: MathFont>(
    source: &str,
    ctx: &FontContext<F>,
) -> Result<String, Error> {
    render_mathml_with(source, ctx, &RenderOptions { display: Some(false), ..Default::default() })
}

/// Renders a MathML document with explicit options.
pub fn render_mathml_with<F: MathFont>(
    source: &str,
    ctx: &FontContext<F>,
    options: &RenderOptions,
) -> Result<String, Error> {
    let config = config::snapshot();
    let tree = mathml::parse_mathml(source)?;
    render_tree(&tree, ctx, &config, options)
}

/// Renders LaTeX math through the given converter. The `\tag{...}`
/// directive is honored for equation numbering.
pub fn render_latex<F: MathFont, C: LatexToMathML + ?Sized>(
    latex: &str,
    converter: &C,
    ctx: &FontContext<F>,
) -> Result<String, Error> {
    let config = config::snapshot();
    let (body, tag) = latex::extract_tag(latex);
    let markup = converter.to_mathml(&body, true)?;
    let tree = mathml::parse_mathml(&markup)?;
    // \tag{9} displays its content through the numbering format, "(9)" by
    // default.
    let number = tag.map(|t| config.numbering.format.replacen("{}", &t, 1));
    let options = RenderOptions { display: Some(true), number };
    render_tree(&tree, ctx, &config, &options)
}

/// Serializes a rendered MathML expression into an existing document,
/// translating all primitives by `(x, y)`.
pub fn drawon_mathml<F: MathFont>(
    source: &str,
    x: f64,
    y: f64,
    ctx: &FontContext<F>,
    xml: &mut xmlwriter::XmlWriter,
) -> Result<(), Error> {
    let config = config::snapshot();
    let tree = mathml::parse_mathml(source)?;
    let (layout, style) = typeset(&tree, ctx, &config, &RenderOptions::default())?;

    let mut backend = SvgBackend::new(ctx, style.color);
    Renderer::new().render(&layout, &mut backend, 0.0, 0.0);
    backend.drawon(xml, x, y, &config);
    Ok(())
}

fn typeset<F: MathFont>(
    tree: &MathNode,
    ctx: &FontContext<F>,
    config: &Config,
    options: &RenderOptions,
) -> Result<(Layout, Style), Error> {
    let display = options.display.unwrap_or_else(|| match tree.attr("displaystyle") {
        Some("true") => true,
        Some("false") => false,
        _ => tree.attr("display") != Some("inline"),
    });

    let mut style = Style::new(config.math.fontsize, display);
    if let Some(variant) = config.math.variant.as_deref() {
        style.variant = MathVariant::parse(variant).ok();
    }
    style.color = parse_color(&config.math.color).unwrap_or(Rgba::BLACK);

    let settings = LayoutSettings::new(ctx, config, style);
    let layout = engine::layout(tree, settings)?;
    Ok((layout, style))
}

fn render_tree<F: MathFont>(
    tree: &MathNode,
    ctx: &FontContext<F>,
    config: &Config,
    options: &RenderOptions,
) -> Result<String, Error> {
    let (layout, style) = typeset(tree, ctx, config, options)?;

    // A number comes from the call, from `\tag`, or from autonumbering.
    let number = match &options.number {
        Some(number) => Some(number.clone()),
        None if config.numbering.autonumber => {
            Some(config::format_equation_number(config, config::next_equation_number()))
        }
        None => None,
    };

    let background = config
        .math
        .background
        .as_deref()
        .and_then(|value| parse_color(value).ok());

    let renderer = Renderer::new();
    let mut backend = SvgBackend::new(ctx, style.color);

    match number {
        None => {
            let width = layout.width.unitless();
            let height = layout.height.unitless();
            let depth = -layout.depth.unitless();
            if let Some(color) = background {
                paint_canvas(&mut backend, color, width, height + depth);
            }
            renderer.render(&layout, &mut backend, 0.0, height);
            Ok(backend.finish(width, height + depth, config))
        }
        Some(number) => {
            // The tag is itself a small typeset expression, right-aligned
            // at the column edge; the body centers in the column.
            let tag_node = MathNode::with_text(Tag::Mtext, number);
            let tag_settings = LayoutSettings::new(ctx, config, style).with_text();
            let tag = engine::layout(&tag_node, tag_settings)?;

            let column = AnyLength::parse(&config.numbering.columnwidth)
                .map(|l| l.to_px(config.math.fontsize))
                .unwrap_or_else(|e| {
                    log::warn!("{}", e);
                    Unit::new(6.5 * 96.0)
                })
                .unitless();
            let column = column.max(layout.width.unitless());

            let height = layout.height.unitless().max(tag.height.unitless());
            let depth = (-layout.depth.unitless()).max(-tag.depth.unitless());
            if let Some(color) = background {
                paint_canvas(&mut backend, color, column, height + depth);
            }

            let x_body = (column - layout.width.unitless()) * 0.5;
            let x_tag = column - tag.width.unitless();
            renderer.render(&layout, &mut backend, x_body, height);
            renderer.render(&tag, &mut backend, x_tag, height);
            Ok(backend.finish(column, height + depth, config))
        }
    }
}

fn paint_canvas<F: MathFont>(
    backend: &mut SvgBackend<'_, '_, F>,
    color: Rgba,
    width: f64,
    height: f64,
) {
    use render::{Backend, Cursor};
    backend.begin_color(color);
    backend.rule(Cursor { x: 0.0, y: 0.0 }, width, height);
    backend.end_color();
}
