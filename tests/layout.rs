//! Layout-engine tests against the synthetic font: box invariants, script
//! and fraction placement, radicals, stretchy fences, operator forms.

mod common;

use common::{font_context, MockFont, RecordingBackend};
use mathsvg::config::Config;
use mathsvg::dimensions::Unit;
use mathsvg::layout::{engine, Layout, LayoutNode, LayoutSettings, LayoutVariant, Style};
use mathsvg::mathml::parse_mathml;
use mathsvg::render::Renderer;

const FONT_SIZE: f64 = 100.0;

fn typeset_with(source: &str, display: bool, config: &Config) -> Layout {
    let font = MockFont::new();
    let ctx = font_context(&font);
    let style = Style::new(FONT_SIZE, display);
    let settings = LayoutSettings::new(&ctx, config, style);
    let tree = parse_mathml(source).expect("test MathML parses");
    engine::layout(&tree, settings).expect("test MathML lays out")
}

fn typeset(source: &str, display: bool) -> Layout {
    typeset_with(source, display, &Config::default())
}

/// Renders with the baseline at the origin, so y < 0 is above the baseline.
fn draw(layout: &Layout) -> RecordingBackend {
    let mut backend = RecordingBackend::default();
    Renderer::new().render(layout, &mut backend, 0.0, 0.0);
    backend
}

fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Elements wrap their rows in singleton horizontal boxes; descend to the
/// row that actually holds the children.
fn innermost_row(layout: &Layout) -> &[LayoutNode] {
    let mut nodes: &[LayoutNode] = &layout.contents;
    loop {
        if nodes.len() == 1 {
            if let LayoutVariant::HorizontalBox(ref hb) = nodes[0].node {
                nodes = &hb.contents;
                continue;
            }
        }
        return nodes;
    }
}

/// Horizontal boxes must contain their children's vertical extents.
fn check_containment(node: &LayoutNode) {
    let eps = Unit::new(1e-6);
    match &node.node {
        LayoutVariant::HorizontalBox(hb) => {
            if hb.offset.is_zero() {
                for child in &hb.contents {
                    assert!(
                        node.height + eps >= child.height,
                        "hbox height {:?} < child height {:?}",
                        node.height,
                        child.height
                    );
                    assert!(
                        node.depth - eps <= child.depth,
                        "hbox depth {:?} > child depth {:?}",
                        node.depth,
                        child.depth
                    );
                }
            }
            for child in &hb.contents {
                check_containment(child);
            }
        }
        LayoutVariant::VerticalBox(vb) => {
            for child in &vb.contents {
                check_containment(child);
            }
        }
        LayoutVariant::Color(change) => {
            for child in &change.inner {
                check_containment(child);
            }
        }
        _ => {}
    }
}

#[test]
fn superscript_placement() {
    let layout = typeset("<math><msup><mi>x</mi><mn>2</mn></msup></math>", false);
    let drawn = draw(&layout);
    let glyphs = drawn.glyphs();
    assert_eq!(glyphs.len(), 2);

    let (_, base_x, base_y, base_scale) = glyphs[0];
    let (_, sup_x, sup_y, sup_scale) = glyphs[1];

    assert_eq!(base_y, 0.0);
    assert_eq!(base_scale, FONT_SIZE);
    // shifted right by the base's advance plus its italic correction
    assert!(sup_x >= base_x + 50.0 + 4.0 - 1e-6, "sup_x = {}", sup_x);
    // raised at least SuperscriptShiftUp (360 font units at 100px/em)
    assert!(sup_y <= -36.0, "sup_y = {}", sup_y);
    // script level 1 scale
    assert!(close(sup_scale, 70.0, 1e-9));

    for node in &layout.contents {
        check_containment(node);
    }
}

#[test]
fn nested_scripts_clamp_to_min_size() {
    let source = "<math><msup><mi>x</mi>\
        <msup><mi>x</mi><msup><mi>x</mi><msup><mi>x</mi><msup><mi>x</mi><mn>2</mn></msup></msup></msup></msup>\
        </msup></math>";

    let drawn = draw(&typeset(source, false));
    let scales: Vec<f64> = drawn.glyphs().iter().map(|g| g.3).collect();
    assert_eq!(scales[0], 100.0);
    assert!(scales.iter().all(|&s| s >= 55.0 - 1e-9));
    assert!(scales.iter().any(|&s| close(s, 55.0, 1e-9)));

    // A tighter floor overrides the script-script reduction.
    let mut config = Config::default();
    config.min_size_fraction = 0.6;
    let drawn = draw(&typeset_with(source, false, &config));
    let scales: Vec<f64> = drawn.glyphs().iter().map(|g| g.3).collect();
    assert!(scales.iter().all(|&s| s >= 60.0 - 1e-9));
    assert!(scales.iter().any(|&s| close(s, 60.0, 1e-9)));
}

#[test]
fn fraction_geometry() {
    let layout = typeset("<math><mfrac><mn>1</mn><mn>2</mn></mfrac></math>", false);
    let drawn = draw(&layout);

    let rects = drawn.rects();
    assert_eq!(rects.len(), 1, "exactly one fraction bar");
    let (_, bar_y, bar_w, bar_h) = rects[0];
    // FractionRuleThickness = 68 font units
    assert!(close(bar_h, 6.8, 1e-6), "bar height {}", bar_h);
    // bar spans the wider part plus a small tab each side
    assert!(close(bar_w, 62.0, 1e-6), "bar width {}", bar_w);
    // the bar sits near the math axis, above the baseline
    assert!(bar_y < -20.0 && bar_y > -35.0, "bar y {}", bar_y);

    let glyphs = drawn.glyphs();
    assert_eq!(glyphs.len(), 2);
    let (_, _, numer_y, _) = glyphs[0];
    let (_, _, denom_y, _) = glyphs[1];
    // numerator baseline raised at least FractionNumeratorShiftUp
    assert!(numer_y <= -39.4 + 1e-6, "numerator y {}", numer_y);
    assert!(denom_y >= 25.0, "denominator y {}", denom_y);

    // both parts centered on the bar
    let (bar_x, _, _, _) = rects[0];
    let numer_center = glyphs[0].1 + 25.0;
    assert!(close(numer_center, bar_x + bar_w * 0.5, 1e-6));
}

#[test]
fn root_with_degree() {
    let layout = typeset(
        "<math><mroot><mrow><mi>x</mi><mo>+</mo><mn>1</mn></mrow><mn>3</mn></mroot></math>",
        true,
    );
    let drawn = draw(&layout);

    // the overbar spans at least the radicand
    let overbar = drawn
        .rects()
        .iter()
        .cloned()
        .find(|&(_, _, w, _)| w > 100.0)
        .expect("radical overbar");
    assert!(overbar.2 >= 190.0, "overbar width {}", overbar.2);

    // the radical glyph grew beyond its base size
    let radical = drawn
        .glyphs()
        .iter()
        .cloned()
        .find(|&(gid, _, _, _)| gid >= 1000)
        .expect("stretched radical glyph");
    assert_eq!(radical.3, FONT_SIZE);

    // the degree renders two script levels down, raised above the baseline
    let degree = drawn
        .glyphs()
        .iter()
        .cloned()
        .find(|&(_, _, _, scale)| close(scale, 55.0, 1e-9))
        .expect("degree glyph");
    assert!(degree.2 < 0.0, "degree y {}", degree.2);

    for node in &layout.contents {
        check_containment(node);
    }
}

#[test]
fn fences_stretch_symmetrically_around_axis() {
    let layout = typeset(
        "<math><mrow><mo>(</mo><mfrac><mn>1</mn><mn>2</mn></mfrac><mo>)</mo></mrow></math>",
        true,
    );

    // row contents: fence, fraction (with bar tabs), fence
    let row = innermost_row(&layout);
    assert_eq!(row.len(), 3);
    let fence = &row[0];
    let frac = &row[1];
    let fence_extent = (fence.height - fence.depth).unitless();
    let frac_extent = (frac.height - frac.depth).unitless();

    assert!(
        fence_extent >= frac_extent - 1e-6,
        "fence {} covers fraction {}",
        fence_extent,
        frac_extent
    );
    // DelimitedSubFormulaMinHeight = 1500 font units
    assert!(fence_extent >= 150.0);

    // symmetric about the math axis (250 font units above the baseline)
    let mid = (fence.height + fence.depth).unitless() * 0.5;
    assert!(close(mid, 25.0, 1e-6), "fence midline {}", mid);

    for node in &layout.contents {
        check_containment(node);
    }
}

#[test]
fn stretchy_operator_honors_minsize() {
    let layout = typeset(
        "<math><mrow><mo symmetric=\"false\" minsize=\"20em\">|</mo><mi>x</mi></mrow></math>",
        true,
    );
    let row = innermost_row(&layout);
    let bar = &row[0];
    let extent = (bar.height - bar.depth).unitless();
    assert!(extent >= 2000.0 - 1e-6, "extent {}", extent);
}

#[test]
fn stretchy_growth_is_monotonic_across_rows() {
    let mut previous = 0.0;
    for ems in [2.0, 4.0, 8.0, 12.0, 16.0, 20.0] {
        let source = format!(
            "<math><mrow><mo symmetric=\"false\" minsize=\"{}em\">|</mo><mi>x</mi></mrow></math>",
            ems
        );
        let layout = typeset(&source, true);
        let row = innermost_row(&layout);
        let extent = (row[0].height - row[0].depth).unitless();
        assert!(extent >= previous - 1e-6, "{} then {}", previous, extent);
        previous = extent;
    }
}

#[test]
fn operator_forms_set_spacing() {
    let prefix = typeset("<math><mrow><mo>-</mo><mi>x</mi></mrow></math>", false);
    let infix = typeset("<math><mrow><mi>a</mi><mo>-</mo><mi>x</mi></mrow></math>", false);

    // prefix: 0 + 1 mu of space; infix: 4 + 4 mu plus the extra letter
    let diff = (infix.width - prefix.width).unitless();
    let expected = 50.0 + (8.0 - 1.0) / 18.0 * FONT_SIZE;
    assert!(close(diff, expected, 0.5), "diff {} expected {}", diff, expected);
}

#[test]
fn explicit_form_overrides_position() {
    let positional = typeset("<math><mrow><mo>+</mo><mi>x</mi></mrow></math>", false);
    let forced = typeset(
        "<math><mrow><mo form=\"infix\">+</mo><mi>x</mi></mrow></math>",
        false,
    );
    // infix '+' carries 4 mu on each side, prefix almost none
    assert!(forced.width > positional.width + Unit::new(30.0));
}

#[test]
fn decimal_separator_suppresses_comma_space() {
    let default_config = Config::default();
    let mut comma_config = Config::default();
    comma_config.decimal_separator = ',';

    let spaced = typeset_with("<math><mn>1,2</mn></math>", false, &default_config);
    let tight = typeset_with("<math><mn>1,2</mn></math>", false, &comma_config);

    let comma_space = 3.0 / 18.0 * FONT_SIZE;
    let diff = (spaced.width - tight.width).unitless();
    assert!(close(diff, comma_space, 1e-6), "diff {}", diff);
}

#[test]
fn none_is_an_empty_mrow() {
    let none = typeset("<math><none/></math>", true);
    let empty = typeset("<math><mrow/></math>", true);
    assert_eq!(none.width, empty.width);
    assert_eq!(none.height, empty.height);
    assert_eq!(none.depth, empty.depth);
    assert!(none.width.is_zero() && none.height.is_zero() && none.depth.is_zero());
}

#[test]
fn movable_limits_follow_style() {
    let source = "<math><munderover><mo>∑</mo><mn>0</mn><mi>n</mi></munderover></math>";

    // display style: limits above and below
    let drawn = draw(&typeset(source, true));
    let glyphs = drawn.glyphs();
    let sum = glyphs.iter().find(|g| g.3 == FONT_SIZE).expect("operator");
    let under = glyphs.iter().find(|g| g.2 > sum.2 + 10.0).expect("lower limit");
    let over = glyphs.iter().find(|g| g.2 < sum.2 - 10.0).expect("upper limit");
    assert!(under.3 < FONT_SIZE && over.3 < FONT_SIZE);

    // text style: rendered as scripts to the right
    let drawn = draw(&typeset(source, false));
    let glyphs = drawn.glyphs();
    let sum_x = glyphs[0].1;
    assert!(glyphs[1..].iter().all(|g| g.1 > sum_x + 40.0));
}

#[test]
fn table_pads_uneven_rows() {
    let layout = typeset(
        "<math><mtable>\
            <mtr><mtd><mn>1</mn></mtd><mtd><mn>2</mn></mtd></mtr>\
            <mtr><mtd><mn>3</mn></mtd></mtr>\
         </mtable></math>",
        true,
    );
    let drawn = draw(&layout);
    assert_eq!(drawn.glyphs().len(), 3);

    // two columns of width 50 plus 0.8 em spacing
    assert!(layout.width.unitless() >= 50.0 + 80.0 + 50.0 - 1e-6);
    // the table centers on the axis: some material above, some below
    assert!(layout.height.unitless() > 0.0);
    assert!(layout.depth.unitless() < 0.0);
}

#[test]
fn newline_space_breaks_rows() {
    let layout = typeset(
        "<math><mrow><mi>a</mi><mspace linebreak=\"newline\"/><mi>b</mi></mrow></math>",
        false,
    );
    let drawn = draw(&layout);
    let glyphs = drawn.glyphs();
    assert_eq!(glyphs.len(), 2);
    // second line starts back at the left edge, below the first
    assert!(close(glyphs[1].1, glyphs[0].1, 1e-6));
    assert!(glyphs[1].2 > glyphs[0].2 + 50.0);
}

#[test]
fn bold_variant_selects_styled_glyph() {
    let font = MockFont::new();
    let expected = font.gid_of('\u{1D6C2}').0; // mathematical bold small alpha
    let ctx = font_context(&font);
    let config = Config::default();
    let settings = LayoutSettings::new(&ctx, &config, Style::new(FONT_SIZE, false));
    let tree = parse_mathml("<math><mi mathvariant=\"bold\">&alpha;</mi></math>").unwrap();
    let layout = engine::layout(&tree, settings).unwrap();

    let mut backend = RecordingBackend::default();
    Renderer::new().render(&layout, &mut backend, 0.0, 0.0);
    assert_eq!(backend.glyphs()[0].0, expected);
}

#[test]
fn accents_hug_the_base() {
    let layout = typeset(
        "<math><mover accent=\"true\"><mi>x</mi><mo>^</mo></mover></math>",
        false,
    );
    let drawn = draw(&layout);
    let glyphs = drawn.glyphs();
    assert_eq!(glyphs.len(), 2);
    let accent = glyphs.iter().find(|g| g.2 < 0.0).expect("accent above");
    // accents keep the full size instead of dropping a script level
    assert_eq!(accent.3, FONT_SIZE);
}

#[test]
fn phantom_takes_space_without_drawing() {
    let visible = typeset("<math><mrow><mi>x</mi></mrow></math>", false);
    let phantom = typeset("<math><mphantom><mi>x</mi></mphantom></math>", false);
    assert_eq!(visible.width, phantom.width);
    assert_eq!(visible.height, phantom.height);
    assert!(draw(&phantom).glyphs().is_empty());
    assert_eq!(draw(&visible).glyphs().len(), 1);
}

#[test]
fn menclose_box_draws_a_frame() {
    let layout = typeset(
        "<math><menclose notation=\"box\"><mi>x</mi></menclose></math>",
        false,
    );
    let drawn = draw(&layout);
    let frame = drawn
        .drawn
        .iter()
        .find(|d| matches!(d, common::Drawn::Frame { .. }))
        .expect("box notation draws a frame");
    if let common::Drawn::Frame { width, .. } = frame {
        // content plus 0.4 em padding per side
        assert!(close(*width, 50.0 + 80.0, 1.0));
    }
}
