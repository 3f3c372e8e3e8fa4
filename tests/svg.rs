//! Document-level tests: SVG structure in both modes, idempotent output,
//! equation numbering, drawing onto an existing document, mixed text.

mod common;

use std::sync::Mutex;

use common::{font_context, MockFont};
use mathsvg::config::{self, Config};
use mathsvg::error::{Error, ParseError};
use mathsvg::latex::LatexToMathML;
use mathsvg::{render_mathml, render_text, TextOptions};

// The configuration is process-wide; tests that touch it serialize here
// and restore the previous snapshot when done.
static CONFIG_LOCK: Mutex<()> = Mutex::new(());

fn with_config<R>(change: impl FnOnce(&mut Config), body: impl FnOnce() -> R) -> R {
    let _guard = CONFIG_LOCK.lock().unwrap();
    let saved = config::snapshot();
    let mut fresh = Config::default();
    fresh.math.fontsize = 100.0;
    change(&mut fresh);
    config::set(fresh);
    let result = body();
    config::set(saved);
    result
}

const X_SQUARED: &str = "<math><msup><mi>x</mi><mn>2</mn></msup></math>";

#[test]
fn rendering_is_idempotent() {
    with_config(
        |_| {},
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let first = render_mathml(X_SQUARED, &ctx).unwrap();
            let second = render_mathml(X_SQUARED, &ctx).unwrap();
            assert_eq!(first, second);

            assert!(first.starts_with("<svg"));
            assert!(first.contains("xmlns=\"http://www.w3.org/2000/svg\""));
            assert!(first.contains("viewBox=\"0 0 "));
        },
    );
}

#[test]
fn svg2_uses_symbols_svg11_inlines_paths() {
    let font = MockFont::new();
    let ctx = font_context(&font);

    let svg2 = with_config(|_| {}, || render_mathml(X_SQUARED, &ctx).unwrap());
    assert!(svg2.contains("<defs>"));
    assert!(svg2.contains("<symbol id=\"g"));
    assert!(svg2.contains("<use href=\"#g"));

    let svg11 = with_config(|c| c.svg2 = false, || render_mathml(X_SQUARED, &ctx).unwrap());
    assert!(!svg11.contains("<use"));
    assert!(!svg11.contains("<defs>"));
    assert!(svg11.contains("<path d=\""));

    // same glyphs either way: one symbol per distinct glyph
    let symbol_count = svg2.matches("<symbol").count();
    assert_eq!(symbol_count, 2);
}

#[test]
fn autonumbering_counts_and_places_the_tag() {
    with_config(
        |c| {
            c.numbering.autonumber = true;
            c.numbering.columnwidth = "600px".to_string();
        },
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let simple = "<math><mi>x</mi></math>";

            config::reset_numbering(1);
            let first = render_mathml(simple, &ctx).unwrap();
            let second = render_mathml(simple, &ctx).unwrap();
            // the counter advanced, so the tag differs
            assert_ne!(first, second);

            // resetting reproduces the numbering exactly
            config::reset_numbering(1);
            let again = render_mathml(simple, &ctx).unwrap();
            assert_eq!(first, again);

            // the canvas is the configured column
            assert!(first.contains("viewBox=\"0 0 600 "));
            // tag "(1)" is 110px wide, so its right edge lands on 600
            assert!(first.contains("translate(490 "), "tag not right-aligned:\n{}", first);
            // the expression itself centers in the column
            assert!(first.contains("translate(275 "), "body not centered:\n{}", first);
        },
    );
}

#[test]
fn explicit_number_overrides_counter() {
    with_config(
        |c| c.numbering.columnwidth = "600px".to_string(),
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let options = mathsvg::RenderOptions {
                display: None,
                number: Some("(7a)".to_string()),
            };
            let svg =
                mathsvg::render_mathml_with("<math><mi>x</mi></math>", &ctx, &options).unwrap();
            assert!(svg.contains("viewBox=\"0 0 600 "));
            // four tag glyphs: ( 7 a )
            let tag_width = 30.0 + 50.0 + 50.0 + 30.0;
            let expected = format!("translate({} ", 600.0 - tag_width);
            assert!(svg.contains(&expected), "expected {} in:\n{}", expected, svg);
        },
    );
}

#[test]
fn drawon_serializes_into_a_host_document() {
    with_config(
        |_| {},
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);

            let mut xml = xmlwriter::XmlWriter::new(xmlwriter::Options::default());
            xml.start_element("svg");
            xml.write_attribute("xmlns", "http://www.w3.org/2000/svg");
            mathsvg::drawon_mathml(X_SQUARED, 10.0, 20.0, &ctx, &mut xml).unwrap();
            let document = xml.end_document();

            assert!(document.contains("<g transform=\"translate(10 20)\""));
            // drawon inlines outlines so the host needs no defs
            assert!(document.contains("<path d=\""));
            assert!(!document.contains("<use"));
        },
    );
}

// A stand-in for the external LaTeX converter: handles single identifiers
// and digit strings, which is all the round-trip corpus needs.
struct ToyConverter;

impl LatexToMathML for ToyConverter {
    fn to_mathml(&self, latex: &str, display: bool) -> Result<String, ParseError> {
        let latex = latex.trim();
        let body = if latex.chars().all(|c| c.is_ascii_digit()) && !latex.is_empty() {
            format!("<mn>{}</mn>", latex)
        } else if latex.chars().count() == 1 {
            format!("<mi>{}</mi>", latex)
        } else {
            return Err(ParseError::Latex(format!("toy converter cannot handle '{}'", latex)));
        };
        let display = if display { "block" } else { "inline" };
        Ok(format!("<math display=\"{}\">{}</math>", display, body))
    }
}

#[test]
fn latex_round_trips_through_the_converter() {
    with_config(
        |_| {},
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let via_latex = mathsvg::render_latex("x", &ToyConverter, &ctx).unwrap();
            let via_mathml = render_mathml("<math><mi>x</mi></math>", &ctx).unwrap();
            assert_eq!(via_latex, via_mathml);
        },
    );
}

#[test]
fn latex_tag_becomes_the_equation_number() {
    with_config(
        |c| c.numbering.columnwidth = "600px".to_string(),
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let svg = mathsvg::render_latex(r"x \tag{9}", &ToyConverter, &ctx).unwrap();
            assert!(svg.contains("viewBox=\"0 0 600 "));
            // tag "(9)" is 110px wide
            assert!(svg.contains("translate(490 "), "missing tag:\n{}", svg);
        },
    );
}

#[test]
fn mixed_text_renders_prose_and_math() {
    with_config(
        |c| c.text.fontsize = 100.0,
        || {
            let font = MockFont::new();
            let ctx = font_context(&font);
            let svg = render_text(
                "value $x$\nnext line",
                &ctx,
                None,
                Some(&ToyConverter),
                TextOptions::default(),
            )
            .unwrap();
            assert!(svg.starts_with("<svg"));
            assert!(svg.contains("<use") || svg.contains("<path"));

            // prose alone needs no converter
            let plain = render_text("just words", &ctx, None, None, TextOptions::default());
            assert!(plain.is_ok());

            // a math span without a converter is a parse error
            let missing = render_text("has $x$", &ctx, None, None, TextOptions::default());
            assert!(matches!(missing, Err(Error::Parse(ParseError::LatexUnavailable))));
        },
    );
}
