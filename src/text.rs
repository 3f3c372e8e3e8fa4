//! Mixed prose-and-math text: `$...$` spans render inline math, `$$...$$`
//! spans display math, everything else is shaped as upright text. Lines
//! split on `\n` and stack with the configured leading.

use log::warn;

use crate::config::{self, Config, Halign};
use crate::dimensions::Unit;
use crate::error::{Error, ParseError};
use crate::font::styles::MathVariant;
use crate::font::{FontContext, MathFont};
use crate::latex::LatexToMathML;
use crate::layout::{engine, Layout, LayoutSettings, Style};
use crate::mathml;
use crate::render::svg::SvgBackend;
use crate::render::Renderer;

/// Block-level options not covered by the process configuration.
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    pub halign: Halign,
    /// Rotation of the whole block in degrees, counterclockwise, about the
    /// block's center.
    pub rotation: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions { halign: Halign::Left, rotation: 0.0 }
    }
}

#[derive(Debug, PartialEq)]
enum Span {
    Prose(String),
    Math { latex: String, display: bool },
}

/// Scans one line for unescaped `$...$` and `$$...$$` spans.
fn tokenize_line(line: &str) -> Vec<Span> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut prose = String::new();
    let mut idx = 0;

    while idx < chars.len() {
        match chars[idx] {
            '\\' if chars.get(idx + 1) == Some(&'$') => {
                prose.push('$');
                idx += 2;
            }
            '$' => {
                let display = chars.get(idx + 1) == Some(&'$');
                let delim = if display { "$$" } else { "$" };
                let body_start = idx + delim.len();
                match find_closing(&chars, body_start, display) {
                    Some(end) => {
                        if !prose.is_empty() {
                            spans.push(Span::Prose(std::mem::take(&mut prose)));
                        }
                        let latex: String = chars[body_start..end].iter().collect();
                        spans.push(Span::Math { latex, display });
                        idx = end + delim.len();
                    }
                    None => {
                        warn!("unterminated math delimiter; treating as text");
                        prose.push('$');
                        idx += 1;
                    }
                }
            }
            c => {
                prose.push(c);
                idx += 1;
            }
        }
    }

    if !prose.is_empty() {
        spans.push(Span::Prose(prose));
    }
    spans
}

fn find_closing(chars: &[char], from: usize, display: bool) -> Option<usize> {
    let mut idx = from;
    while idx < chars.len() {
        if chars[idx] == '\\' && chars.get(idx + 1) == Some(&'$') {
            idx += 2;
            continue;
        }
        if chars[idx] == '$' {
            if !display {
                return Some(idx);
            }
            if chars.get(idx + 1) == Some(&'$') {
                return Some(idx);
            }
        }
        idx += 1;
    }
    None
}

/// Renders a mixed text block into a standalone SVG document.
///
/// Math spans require a LaTeX converter; without one their presence is a
/// [`ParseError`]. Prose is shaped with `text_ctx` when supplied, otherwise
/// with the math font.
pub fn render_text<F: MathFont>(
    source: &str,
    ctx: &FontContext<F>,
    text_ctx: Option<&FontContext<F>>,
    converter: Option<&dyn LatexToMathML>,
    options: TextOptions,
) -> Result<String, Error> {
    let config = config::snapshot();
    let text_ctx = text_ctx.unwrap_or(ctx);

    let text_variant = config
        .text
        .variant
        .as_deref()
        .and_then(|v| MathVariant::parse(v).map_err(|e| warn!("{}", e)).ok())
        .unwrap_or(MathVariant::Normal);
    let text_color = crate::color::parse_color(&config.text.color).unwrap_or(crate::color::Rgba::BLACK);

    let mut text_style = Style::new(config.text.fontsize, false);
    text_style.color = text_color;

    // Lay every line out first so the block extents are known.
    let mut line_layouts: Vec<Layout> = Vec::new();
    for line in source.split('\n') {
        let mut row = Layout::new();
        for span in tokenize_line(line) {
            match span {
                Span::Prose(text) => {
                    let settings = LayoutSettings::new(text_ctx, &config, text_style);
                    let run = engine::text_run(&text, text_variant, settings)?;
                    row.add_node(run.as_node());
                }
                Span::Math { latex, display } => {
                    let converter = converter.ok_or(Error::Parse(ParseError::LatexUnavailable))?;
                    let markup = converter.to_mathml(&latex, display)?;
                    let tree = mathml::parse_mathml(&markup)?;
                    let mut style = Style::new(config.text.fontsize, display);
                    style.color = text_color;
                    let settings = LayoutSettings::new(ctx, &config, style);
                    let math = engine::layout(&tree, settings)?;
                    row.add_node(math.as_node());
                }
            }
        }
        line_layouts.push(row.finalize());
    }

    let leading = config.text.linespacing * config.text.fontsize;
    let block_width = line_layouts
        .iter()
        .map(|l| l.width)
        .fold(Unit::ZERO, Unit::max);

    let mut backend = SvgBackend::new(ctx, text_color);
    let renderer = Renderer::new();

    let mut baseline = 0.0;
    let mut bottom = 0.0_f64;
    for (idx, line) in line_layouts.iter().enumerate() {
        if idx == 0 {
            baseline = line.height.unitless();
        } else {
            baseline += leading;
        }
        let x = match options.halign {
            Halign::Left => 0.0,
            Halign::Center => (block_width - line.width).unitless() * 0.5,
            Halign::Right => (block_width - line.width).unitless(),
        };
        renderer.render(line, &mut backend, x, baseline);
        bottom = baseline - line.depth.unitless();
    }

    Ok(finish_block(backend, block_width.unitless(), bottom, options.rotation, &config))
}

fn finish_block<F: MathFont>(
    backend: SvgBackend<'_, '_, F>,
    width: f64,
    height: f64,
    rotation: f64,
    config: &Config,
) -> String {
    if rotation == 0.0 {
        return backend.finish(width, height, config);
    }
    backend.finish_rotated(width, height, rotation, config)
}
