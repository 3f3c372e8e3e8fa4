//! The recursive layout pass: every MathML element kind gets a function
//! that turns it into a [`Layout`], consuming MATH constants through the
//! [`LayoutSettings`] conversions.

use log::warn;

use crate::color::parse_color;
use crate::dimensions::{AnyLength, Px, Unit};
use crate::error::LayoutResult;
use crate::font::common::{Direction, VariantGlyph};
use crate::font::styles::{style_char, MathVariant};
use crate::font::variants::stretch;
use crate::font::{kerning, Glyph, MathFont};
use crate::mathml::{MathNode, Tag};

use super::builders;
use super::dictionary::{self, Form, ResolvedOp};
use super::{Alignment, ColorChange, Layout, LayoutNode, LayoutSettings, LayoutVariant, Scaled};

/// Entry point: typesets a single element (usually `<math>`).
pub fn layout<F: MathFont>(node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<Layout> {
    match node.tag {
        Tag::Math => layout_children(&node.children, config),
        _ => layout_children(std::slice::from_ref(node), config),
    }
}

/// Lays out a sequence of siblings the way `<mrow>` does. A
/// `<mspace linebreak="newline"/>` splits the sequence into stacked lines;
/// the box baseline is the first line's.
pub fn layout_children<F: MathFont>(
    children: &[MathNode],
    config: LayoutSettings<F>,
) -> LayoutResult<Layout> {
    let mut lines: Vec<&[MathNode]> = Vec::new();
    let mut start = 0;
    for (idx, child) in children.iter().enumerate() {
        if child.tag == Tag::Mspace && child.attr("linebreak") == Some("newline") {
            lines.push(&children[start..idx]);
            start = idx + 1;
        }
    }
    lines.push(&children[start..]);

    if lines.len() == 1 {
        return layout_row(lines[0], config);
    }

    let baseline_skip = config.px_em(Unit::new(1.2));
    let mut vbox = builders::VBox::new();
    let mut below_first = Unit::ZERO;
    let mut prev_depth = Unit::ZERO;
    for (idx, line) in lines.into_iter().enumerate() {
        let row = layout_row(line, config)?.as_node();
        if idx > 0 {
            let gap = Unit::max(baseline_skip + prev_depth - row.height, Unit::ZERO);
            vbox.add_node(kern!(vert: gap));
            below_first += gap + row.height;
        }
        prev_depth = row.depth;
        vbox.add_node(row);
    }
    vbox.set_offset(below_first);

    let mut layout = Layout::new();
    layout.add_node(vbox.build());
    Ok(layout.finalize())
}

enum RowChild<'n> {
    Fixed(Layout, Option<ResolvedOp>),
    Stretchy(&'n MathNode, ResolvedOp),
}

fn layout_row<F: MathFont>(children: &[MathNode], config: LayoutSettings<F>) -> LayoutResult<Layout> {
    let visible: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_space_like())
        .map(|(i, _)| i)
        .collect();
    let first = visible.first().copied().unwrap_or(0);
    let last = visible.last().copied().unwrap_or(0);

    // First pass: resolve operator forms and lay out everything that does
    // not stretch.
    let mut items: Vec<RowChild> = Vec::with_capacity(children.len());
    for (idx, child) in children.iter().enumerate() {
        if child.tag == Tag::Mo {
            let form = child
                .attr("form")
                .and_then(Form::parse)
                .unwrap_or_else(|| dictionary::positional_form(idx, first, last));
            let op = resolve_operator(child, form);
            if op.stretchy {
                items.push(RowChild::Stretchy(child, op));
            } else {
                items.push(RowChild::Fixed(layout_element(child, config)?, Some(op)));
            }
        } else {
            items.push(RowChild::Fixed(layout_element(child, config)?, None));
        }
    }

    // Stretchy operators grow to the extent of their non-stretchy siblings.
    let mut max_height = Unit::ZERO;
    let mut min_depth = Unit::ZERO;
    let mut has_subformula = false;
    for (idx, item) in items.iter().enumerate() {
        if let RowChild::Fixed(ref inner, _) = *item {
            max_height = Unit::max(max_height, inner.height);
            min_depth = Unit::min(min_depth, inner.depth);
            if !children[idx].tag.is_token() && !children[idx].is_space_like() {
                has_subformula = true;
            }
        }
    }

    let axis = config.constants().axis_height.scaled(config);
    let mut layout = Layout::new();
    let mut pending_italics: Option<Unit<Px>> = None;

    for item in items {
        let (inner, op) = match item {
            RowChild::Fixed(inner, op) => (inner, op),
            RowChild::Stretchy(node, op) => {
                let inner = stretched_operator(
                    node,
                    &op,
                    config,
                    max_height,
                    min_depth,
                    axis,
                    has_subformula,
                )?;
                (inner, Some(op))
            }
        };

        let lspace = op.map(|op| config.length_px(op.lspace)).unwrap_or(Unit::ZERO);
        let rspace = op.map(|op| config.length_px(op.rspace)).unwrap_or(Unit::ZERO);

        if !lspace.is_zero() {
            layout.add_node(kern!(horz: lspace));
            pending_italics = None;
        }
        // With no space between an italic letter and upright material, the
        // slant still needs its italic correction discharged.
        if let Some(italics) = pending_italics.take() {
            let next_upright = inner
                .is_symbol()
                .map(|g| g.italics.is_zero())
                .unwrap_or(true);
            if op.is_some() || next_upright {
                layout.add_node(kern!(horz: italics));
            }
        }

        pending_italics = match (op, inner.is_symbol()) {
            (None, Some(glyph)) if !glyph.italics.is_zero() => Some(glyph.italics),
            _ => None,
        };

        layout.add_node(inner.as_node());
        if !rspace.is_zero() {
            layout.add_node(kern!(horz: rspace));
            pending_italics = None;
        }
    }

    Ok(layout.finalize())
}

fn resolve_operator(node: &MathNode, form: Form) -> ResolvedOp {
    dictionary::resolve(&node.text, form, |name| node.attr(name).map(str::to_string))
}

fn stretched_operator<F: MathFont>(
    node: &MathNode,
    op: &ResolvedOp,
    config: LayoutSettings<F>,
    max_height: Unit<Px>,
    min_depth: Unit<Px>,
    axis: Unit<Px>,
    has_subformula: bool,
) -> LayoutResult<Layout> {
    let Some(c) = node.text.chars().next() else {
        return Ok(Layout::new());
    };

    let mut target = if op.symmetric {
        Unit::max(max_height - axis, axis - min_depth).scale(2.0)
    } else {
        max_height - min_depth
    };
    if op.fence && has_subformula {
        let min_height = config
            .constants()
            .delimited_sub_formula_min_height
            .scaled(config);
        target = Unit::max(target, min_height);
    }
    if let Some(minsize) = op.minsize {
        target = Unit::max(target, config.length_px(minsize));
    }
    if let Some(maxsize) = op.maxsize {
        target = Unit::min(target, config.length_px(maxsize));
    }

    let glyph = match config.ctx.glyph(c) {
        Ok(glyph) => glyph,
        Err(e) => {
            warn!("{}; using replacement box", e);
            let mut layout = Layout::new();
            layout.add_node(replacement_box(config));
            return Ok(layout);
        }
    };

    let mut layout = Layout::new();
    if target <= config.px_funit(glyph.height() - glyph.depth()) {
        // nothing to cover, keep the plain glyph
        layout.add_node(glyph_node(&glyph, config));
        return Ok(layout.finalize());
    }

    let variant = stretch(config.ctx.font, glyph.gid, Direction::Vertical, config.to_font(target));
    let node = variant_node(&variant, config)?;
    let node = if op.symmetric { node.centered(axis) } else { node };
    layout.add_node(node);
    Ok(layout.finalize())
}

/// Lays out one element, applying the color attributes every element kind
/// understands. Row spacing is the parent's business.
pub fn layout_element<F: MathFont>(
    node: &MathNode,
    config: LayoutSettings<F>,
) -> LayoutResult<Layout> {
    let mut config = config;
    let explicit_color = node.attr("mathcolor").is_some();
    if let Some(value) = node.attr("mathcolor") {
        match parse_color(value) {
            Ok(color) => config.style.color = color,
            Err(e) => warn!("{}", e),
        }
    }
    let background = node.attr("mathbackground").and_then(|value| {
        if value == "transparent" {
            return None;
        }
        parse_color(value).map_err(|e| warn!("{}", e)).ok()
    });

    let mut layout = Layout::new();
    layout.dispatch(node, config)?;
    let mut layout = layout.finalize();

    if let Some(color) = background {
        layout = paint_background(layout, color);
    }
    if explicit_color {
        let node = LayoutNode {
            width: layout.width,
            height: layout.height,
            depth: layout.depth,
            node: LayoutVariant::Color(ColorChange {
                color: config.style.color,
                inner: layout.contents,
            }),
        };
        let mut wrapped = Layout::new();
        wrapped.add_node(node);
        layout = wrapped;
    }
    Ok(layout)
}

fn paint_background(layout: Layout, color: crate::color::Rgba) -> Layout {
    let mut wrapped = Layout::new();
    let rule = rule!(width: layout.width, height: layout.height, depth: layout.depth);
    let backdrop = LayoutNode {
        width: Unit::ZERO,
        height: layout.height,
        depth: layout.depth,
        node: LayoutVariant::Color(ColorChange {
            color,
            inner: vec![rule, kern!(horz: -layout.width)],
        }),
    };
    wrapped.add_node(backdrop);
    wrapped.add_node(layout.as_node());
    wrapped.finalize()
}

impl Layout {
    fn dispatch<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        match node.tag {
            Tag::Math | Tag::Mrow | Tag::Mtd | Tag::Mtr | Tag::Unknown => {
                self.add_node(layout_children(&node.children, config)?.as_node())
            }

            Tag::Mi => self.identifier(node, config)?,
            Tag::Mn => self.number(node, config)?,
            Tag::Mo => self.operator(node, config)?,
            Tag::Mtext | Tag::Ms => self.text(node, config)?,
            Tag::Mspace => self.space(node, config),

            Tag::Msup => self.scripts(node.children.first(), None, node.children.get(1), config)?,
            Tag::Msub => self.scripts(node.children.first(), node.children.get(1), None, config)?,
            Tag::Msubsup => self.scripts(
                node.children.first(),
                node.children.get(1),
                node.children.get(2),
                config,
            )?,
            Tag::Mover => {
                self.underover(node.children.first(), None, node.children.get(1), node, config)?
            }
            Tag::Munder => {
                self.underover(node.children.first(), node.children.get(1), None, node, config)?
            }
            Tag::Munderover => self.underover(
                node.children.first(),
                node.children.get(1),
                node.children.get(2),
                node,
                config,
            )?,

            Tag::Mfrac => self.fraction(node, config)?,
            Tag::Msqrt => self.radical(&node.children, None, config)?,
            Tag::Mroot => self.radical(
                &node.children[..node.children.len().min(1)],
                node.children.get(1),
                config,
            )?,
            Tag::Mfenced => self.fenced(node, config)?,
            Tag::Menclose => self.enclose(node, config)?,
            Tag::Mtable => self.table(node, config)?,
            Tag::Mmultiscripts => self.multiscripts(node, config)?,
            Tag::Mstyle => self.mstyle(node, config)?,
            Tag::Mpadded => self.padded(node, config)?,
            Tag::Mphantom => self.phantom(node, config)?,

            // An empty but non-null box.
            Tag::None_ | Tag::Mprescripts => {}
        }
        Ok(())
    }

    // ---- token elements ----

    fn identifier<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let variant = token_variant(node, config).unwrap_or_else(|| {
            // Single letters default to italic, longer identifiers upright.
            let single = node.text.chars().count() == 1
                && node.text.chars().all(|c| c.is_alphabetic());
            if single {
                MathVariant::Italic
            } else {
                MathVariant::Normal
            }
        });
        let run = text_run(&node.text, variant, config)?;
        self.add_node(run.as_node());
        Ok(())
    }

    fn number<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let variant = token_variant(node, config).unwrap_or(MathVariant::Normal);
        let chars: Vec<char> = node.text.chars().collect();
        let mut run = Layout::new();
        for (idx, &c) in chars.iter().enumerate() {
            push_char(&mut run, c, variant, config)?;
            if c == ',' {
                // `1,2` is a decimal number under a comma separator, a list
                // of two numbers otherwise.
                let decimal_mark = config.config.decimal_separator == ','
                    && idx > 0
                    && chars[idx - 1].is_ascii_digit()
                    && chars.get(idx + 1).map(|n| n.is_ascii_digit()).unwrap_or(false);
                if !decimal_mark {
                    let comma_space = AnyLength { value: 3.0, unit: crate::dimensions::LengthUnit::Mu };
                    run.add_node(kern!(horz: config.length_px(comma_space)));
                }
            }
        }
        self.add_node(run.finalize().as_node());
        Ok(())
    }

    fn operator<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        // Spacing belongs to the surrounding row; only the glyph run and the
        // large-operator upscale are produced here.
        let form = node.attr("form").and_then(Form::parse).unwrap_or(Form::Infix);
        let op = resolve_operator(node, form);
        let variant = token_variant(node, config).unwrap_or(MathVariant::Normal);

        let mut chars = node.text.chars();
        let (first, second) = (chars.next(), chars.next());
        let Some(c) = first else {
            return Ok(());
        };
        if second.is_some() {
            let run = text_run(&node.text, variant, config)?;
            self.add_node(run.as_node());
            return Ok(());
        }
        if is_invisible(c) {
            return Ok(());
        }

        if op.largeop && config.style.display {
            let glyph = match config.ctx.glyph(c) {
                Ok(glyph) => glyph,
                Err(e) => {
                    warn!("{}; using replacement box", e);
                    self.add_node(replacement_box(config));
                    return Ok(());
                }
            };
            let min_height = config.constants().display_operator_min_height.unitless()
                * config.ctx.units_per_em;
            let stretched =
                stretch(config.ctx.font, glyph.gid, Direction::Vertical, Unit::new(min_height));
            let largeop = variant_node(&stretched, config)?;
            let axis = config.constants().axis_height.scaled(config);
            self.add_node(largeop.centered(axis));
        } else {
            push_char(self, c, variant, config)?;
        }
        Ok(())
    }

    fn text<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let variant = token_variant(node, config).unwrap_or(MathVariant::Normal);
        let mut text = node.text.replace('\t', " ");
        // Runs of three or more hyphens read as a long dash.
        while let Some(pos) = text.find("---") {
            let end = text[pos..]
                .find(|c| c != '-')
                .map(|e| pos + e)
                .unwrap_or(text.len());
            text.replace_range(pos..end, "—");
        }
        if node.tag == Tag::Ms {
            let lquote = node.attr("lquote").unwrap_or("\"").to_string();
            let rquote = node.attr("rquote").unwrap_or("\"").to_string();
            text = format!("{}{}{}", lquote, text, rquote);
        }
        let run = text_run(&text, variant, config)?;
        self.add_node(run.as_node());
        Ok(())
    }

    fn space<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) {
        let length = |name: &str| {
            node.attr(name)
                .and_then(|v| AnyLength::parse(v).map_err(|e| warn!("{}", e)).ok())
                .map(|l| config.length_px(l))
                .unwrap_or(Unit::ZERO)
        };
        let width = length("width");
        let height = length("height");
        let depth = length("depth");
        self.add_node(LayoutNode {
            width,
            height,
            depth: -depth,
            node: LayoutVariant::Kern,
        });
    }

    // ---- scripts ----

    fn scripts<F: MathFont>(
        &mut self,
        base: Option<&MathNode>,
        sub: Option<&MathNode>,
        sup: Option<&MathNode>,
        config: LayoutSettings<F>,
    ) -> LayoutResult<()> {
        // Operators with movable limits take the limit path in display style.
        if let Some(b) = base {
            if config.style.display {
                if let Some(op) = movable_limits_op(b) {
                    let base_layout = layout_element(b, config)?;
                    let sub_layout = opt_layout(sub, config.subscript_variant())?;
                    let sup_layout = opt_layout(sup, config.superscript_variant())?;
                    return self.operator_limits(base_layout, sup_layout, sub_layout, op, config);
                }
            }
        }

        let base_layout = opt_layout(base, config)?;
        let mut sup_layout = opt_layout(sup, config.superscript_variant())?;
        let mut sub_layout = opt_layout(sub, config.subscript_variant())?;

        let c = config.constants();
        let mut adjust_up = Unit::ZERO;
        let mut adjust_down = Unit::ZERO;
        let mut sup_kern = Unit::ZERO;
        let mut sub_kern = Unit::ZERO;

        if sup.is_some() {
            adjust_up = match config.style.cramped {
                true => c.superscript_shift_up_cramped,
                false => c.superscript_shift_up,
            }
            .scaled(config);

            if let Some(base_sym) = base_layout.is_symbol() {
                // The superscript clears the base's slant by the italic
                // correction, tightened through the corner kern tables.
                if base.map(|b| !is_large_operator(b)).unwrap_or(true) {
                    sup_kern = base_sym.italics;
                    if let Some(sup_sym) = sup_layout.is_symbol() {
                        let bg = config.ctx.glyph_from_gid(base_sym.gid)?;
                        let sg = config.ctx.glyph_from_gid(sup_sym.gid)?;
                        let kern = kerning::superscript_kern(
                            config.ctx.font,
                            &bg,
                            &sg,
                            config.to_font(adjust_up),
                        );
                        sup_kern += config.px_funit(kern);
                    }
                }
            }

            let drop_max = c.superscript_baseline_drop_max.scaled(config);
            adjust_up = max!(
                adjust_up,
                base_layout.height - drop_max,
                c.superscript_bottom_min.scaled(config) - sup_layout.depth
            );
        }

        if sub.is_some() {
            adjust_down = max!(
                c.subscript_shift_down.scaled(config),
                sub_layout.height - c.subscript_top_max.scaled(config),
                c.subscript_baseline_drop_min.scaled(config) - base_layout.depth
            );

            if let Some(base_sym) = base_layout.is_symbol() {
                if base.map(is_large_operator).unwrap_or(false) {
                    // Slanted large operators tuck the subscript in.
                    sub_kern = -base_sym.italics;
                }
                if let Some(sub_sym) = sub_layout.is_symbol() {
                    let bg = config.ctx.glyph_from_gid(base_sym.gid)?;
                    let sg = config.ctx.glyph_from_gid(sub_sym.gid)?;
                    let kern = kerning::subscript_kern(
                        config.ctx.font,
                        &bg,
                        &sg,
                        config.to_font(adjust_down),
                    );
                    sub_kern += config.px_funit(kern);
                }
            }
        }

        // Keep the gap between the two scripts open, pushing them apart
        // symmetrically if it closes.
        if sub.is_some() && sup.is_some() {
            let sup_bot = adjust_up + sup_layout.depth;
            let sub_top = sub_layout.height - adjust_down;
            let gap_min = c.sub_superscript_gap_min.scaled(config);
            if sup_bot - sub_top < gap_min {
                let adjust = (gap_min - sup_bot + sub_top).scale(0.5);
                adjust_up += adjust;
                adjust_down += adjust;
            }
        }

        let space_after = c.space_after_script.scaled(config);
        let any_script = sub.is_some() || sup.is_some();

        let mut contents = builders::VBox::new();
        if sup.is_some() {
            if !sup_kern.is_zero() {
                sup_layout.contents.insert(0, kern!(horz: sup_kern));
                sup_layout.width += sup_kern;
            }
            let corrected_adjust = adjust_up - sub_layout.height + adjust_down;
            contents.add_node(sup_layout.as_node());
            contents.add_node(kern!(vert: corrected_adjust));
        }

        contents.set_offset(adjust_down);
        if sub.is_some() {
            if !sub_kern.is_zero() {
                sub_layout.contents.insert(0, kern!(horz: sub_kern));
                sub_layout.width += sub_kern;
            }
            contents.add_node(sub_layout.as_node());
        }

        self.add_node(base_layout.as_node());
        if any_script {
            self.add_node(contents.build());
            self.add_node(kern!(horz: space_after));
        }

        Ok(())
    }

    fn operator_limits<F: MathFont>(
        &mut self,
        base: Layout,
        sup: Layout,
        sub: Layout,
        _op: ResolvedOp,
        config: LayoutSettings<F>,
    ) -> LayoutResult<()> {
        // The slant of the operator shifts the limits horizontally by half
        // the italic correction in opposite directions.
        let delta = match base.is_symbol() {
            Some(glyph) => glyph.italics,
            None => Unit::ZERO,
        };

        let c = config.constants();
        let sup_kern = Unit::max(
            c.upper_limit_baseline_rise_min.scaled(config),
            c.upper_limit_gap_min.scaled(config) - sup.depth,
        );
        let sub_kern = Unit::max(
            c.lower_limit_gap_min.scaled(config),
            c.lower_limit_baseline_drop_min.scaled(config) - sub.height,
        ) - base.depth;

        // Preserve the operator's baseline under the added subscript.
        let offset = sub.height + sub_kern;
        let width = max!(base.width, sub.width + delta.scale(0.5), sup.width + delta.scale(0.5));

        self.add_node(vbox![
            offset: offset;
            hbox![align: Alignment::Centered(sup.width);
                width: width;
                kern![horz: delta.scale(0.5)],
                sup.as_node()
            ],
            kern!(vert: sup_kern),
            base.centered(width).as_node(),
            kern!(vert: sub_kern),
            hbox![align: Alignment::Centered(sub.width);
                width: width;
                kern![horz: -delta.scale(0.5)],
                sub.as_node()
            ]
        ]);

        Ok(())
    }

    // ---- under/over ----

    #[allow(clippy::too_many_arguments)]
    fn underover<F: MathFont>(
        &mut self,
        base: Option<&MathNode>,
        under: Option<&MathNode>,
        over: Option<&MathNode>,
        node: &MathNode,
        config: LayoutSettings<F>,
    ) -> LayoutResult<()> {
        if let Some(b) = base {
            if movable_limits_op(b).is_some() && !config.style.display {
                // Outside display style movable limits render as scripts.
                return self.scripts(Some(b), under, over, config);
            }
            if config.style.display {
                if let Some(op) = movable_limits_op(b) {
                    let base_layout = layout_element(b, config)?;
                    let under_layout = opt_layout(under, config.subscript_variant())?;
                    let over_layout = opt_layout(over, config.superscript_variant())?;
                    return self.operator_limits(base_layout, over_layout, under_layout, op, config);
                }
            }
        }

        let accent_over = node
            .bool_attr("accent")
            .unwrap_or_else(|| over.map(is_accent_operator).unwrap_or(false));
        let accent_under = node
            .bool_attr("accentunder")
            .unwrap_or_else(|| under.map(is_accent_operator).unwrap_or(false));

        let base_layout = opt_layout(base, config.cramped())?;
        let width = base_layout.width;
        let c = config.constants();

        let over_part = match over {
            Some(over_node) => {
                let over_config = if accent_over { config } else { config.superscript_variant() };
                let over_layout = attachment_layout(over_node, over_config, width)?;
                let gap = if accent_over {
                    // Accents sit on the base, no lower than the accent base
                    // height allows.
                    -Unit::min(base_layout.height, c.accent_base_height.scaled(config))
                } else if base.map(is_large_operator).unwrap_or(false) {
                    Unit::max(
                        c.upper_limit_gap_min.scaled(config) - over_layout.depth,
                        c.upper_limit_baseline_rise_min.scaled(config),
                    )
                } else {
                    c.overbar_vertical_gap.scaled(config) - over_layout.depth
                };
                let shift = attachment_shift(&base_layout, &over_layout, accent_over);
                Some((over_layout, gap, shift))
            }
            None => None,
        };

        let under_part = match under {
            Some(under_node) => {
                let under_config = if accent_under { config } else { config.subscript_variant() };
                let under_layout = attachment_layout(under_node, under_config, width)?;
                let gap = if accent_under {
                    Unit::ZERO
                } else if base.map(is_large_operator).unwrap_or(false) {
                    Unit::max(
                        c.lower_limit_gap_min.scaled(config),
                        c.lower_limit_baseline_drop_min.scaled(config) - under_layout.height,
                    )
                } else {
                    c.underbar_vertical_gap.scaled(config)
                } - base_layout.depth;
                let shift = attachment_shift(&base_layout, &under_layout, accent_under);
                Some((under_layout, gap, shift))
            }
            None => None,
        };

        let base_height = base_layout.height;
        let mut stack = builders::VBox::new();
        if let Some((over_layout, gap, shift)) = over_part {
            stack.add_node(hbox!(kern!(horz: shift), over_layout.as_node()));
            stack.add_node(kern!(vert: gap));
        }
        let above = stack.height;
        stack.add_node(base_layout.as_node());
        if let Some((under_layout, gap, shift)) = under_part {
            stack.add_node(kern!(vert: gap));
            stack.add_node(hbox!(kern!(horz: shift), under_layout.as_node()));
        }

        // Put the box baseline back on the base's baseline.
        let offset = stack.height - (above + base_height);
        stack.set_offset(offset);
        self.add_node(stack.build());

        Ok(())
    }

    // ---- fractions ----

    fn fraction<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let c = config.constants();
        let bar = match node.attr("linethickness") {
            None => c.fraction_rule_thickness.scaled(config),
            Some("0") => Unit::ZERO,
            Some("thin") => c.fraction_rule_thickness.scaled(config).scale(0.5),
            Some("medium") => c.fraction_rule_thickness.scaled(config),
            Some("thick") => c.fraction_rule_thickness.scaled(config).scale(2.0),
            Some(value) => match AnyLength::parse(value) {
                Ok(length) => config.length_px(length),
                Err(e) => {
                    warn!("{}", e);
                    c.fraction_rule_thickness.scaled(config)
                }
            },
        };

        let mut numer = opt_layout(node.children.first(), config.numerator())?;
        let mut denom = opt_layout(node.children.get(1), config.denominator())?;

        // The bar spans the wider of the two plus a small tab on each side;
        // both parts center over it.
        let tab = config.px_em(Unit::new(0.06));
        let full = Unit::max(numer.width, denom.width) + tab.scale(2.0);
        numer.alignment = Alignment::Centered(numer.width);
        numer.width = full;
        denom.alignment = Alignment::Centered(denom.width);
        denom.width = full;

        let numer = numer.as_node();
        let denom = denom.as_node();

        let axis = c.axis_height.scaled(config);
        let (shift_up, shift_down, gap_num, gap_denom);
        if config.style.display {
            shift_up = c.fraction_numerator_display_style_shift_up.scaled(config);
            shift_down = c.fraction_denominator_display_style_shift_down.scaled(config);
            gap_num = c.fraction_num_display_style_gap_min.scaled(config);
            gap_denom = c.fraction_denom_display_style_gap_min.scaled(config);
        } else {
            shift_up = c.fraction_numerator_shift_up.scaled(config);
            shift_down = c.fraction_denominator_shift_down.scaled(config);
            gap_num = c.fraction_numerator_gap_min.scaled(config);
            gap_denom = c.fraction_denominator_gap_min.scaled(config);
        }

        let kern_num = Unit::max(shift_up - axis - bar.scale(0.5), gap_num - numer.depth);
        let kern_den = Unit::max(shift_down + axis - denom.height - bar.scale(0.5), gap_denom);
        let offset = denom.height + kern_den + bar.scale(0.5) - axis;

        self.add_node(vbox!(offset: offset;
            numer,
            kern!(vert: kern_num),
            rule!(width: full, height: bar),
            kern!(vert: kern_den),
            denom
        ));
        Ok(())
    }

    // ---- radicals ----

    fn radical<F: MathFont>(
        &mut self,
        radicand: &[MathNode],
        degree: Option<&MathNode>,
        config: LayoutSettings<F>,
    ) -> LayoutResult<()> {
        let contents = layout_children(radicand, config.cramped())?.as_node();

        let c = config.constants();
        let gap = match config.style.display {
            true => c.radical_display_style_vertical_gap.scaled(config),
            false => c.radical_vertical_gap.scaled(config),
        };
        let rule_thickness = c.radical_rule_thickness.scaled(config);
        let rule_ascender = c.radical_extra_ascender.scaled(config);

        let inner_height = (contents.height - contents.depth) + gap + rule_thickness;
        let sqrt = match config.ctx.glyph('√') {
            Ok(glyph) => {
                let variant = stretch(
                    config.ctx.font,
                    glyph.gid,
                    Direction::Vertical,
                    config.to_font(inner_height),
                );
                variant_node(&variant, config)?
            }
            Err(e) => {
                warn!("{}; using replacement box", e);
                replacement_box(config)
            }
        };

        // Pad radicand and bar apart when the radical came out taller than
        // strictly required.
        let delta = (sqrt.height - sqrt.depth - inner_height).scale(0.5) + rule_thickness;
        let gap = Unit::max(delta, gap);

        let offset = sqrt.height - (rule_thickness + gap + contents.height);
        let top_padding = rule_ascender - rule_thickness;

        if let Some(degree_node) = degree {
            let degree_layout = layout_element(degree_node, config.degree_variant())?;
            // The degree's bottom sits a fixed fraction up the radical.
            let radical_bottom = sqrt.depth - offset;
            let raise = radical_bottom
                + (sqrt.height - sqrt.depth).scale(c.radical_degree_bottom_raise_percent);
            let shift = raise - degree_layout.depth;
            self.add_node(kern!(horz: c.radical_kern_before_degree.scaled(config)));
            self.add_node(vbox![offset: -shift; degree_layout.as_node()]);
            self.add_node(kern!(horz: c.radical_kern_after_degree.scaled(config)));
        }

        self.add_node(vbox![offset: offset; sqrt]);
        self.add_node(vbox![
            kern!(vert: top_padding),
            rule!(width: contents.width + config.px_em(Unit::new(0.06)), height: rule_thickness),
            kern!(vert: gap),
            contents
        ]);

        Ok(())
    }

    // ---- fences and enclosures ----

    fn fenced<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let open = node.attr("open").unwrap_or("(").to_string();
        let close = node.attr("close").unwrap_or(")").to_string();
        let separators: Vec<char> = node
            .attr("separators")
            .unwrap_or(",")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let fence = |text: &str, form: &str| {
            let mut mo = MathNode::with_text(Tag::Mo, text);
            mo.set_attr("form", form);
            mo.set_attr("stretchy", "true");
            mo.set_attr("symmetric", "true");
            mo.set_attr("fence", "true");
            mo
        };

        let mut synthesized: Vec<MathNode> = Vec::new();
        if !open.is_empty() {
            synthesized.push(fence(&open, "prefix"));
        }
        for (idx, child) in node.children.iter().enumerate() {
            if idx > 0 && !separators.is_empty() {
                let sep = separators.get(idx - 1).or(separators.last()).unwrap();
                let mut mo = MathNode::with_text(Tag::Mo, sep.to_string());
                mo.set_attr("separator", "true");
                synthesized.push(mo);
            }
            synthesized.push(child.clone());
        }
        if !close.is_empty() {
            synthesized.push(fence(&close, "postfix"));
        }

        self.add_node(layout_children(&synthesized, config)?.as_node());
        Ok(())
    }

    fn enclose<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let notations: Vec<&str> = node
            .attr("notation")
            .unwrap_or("longdiv")
            .split_whitespace()
            .collect();

        // The radical notation wraps rather than overlays.
        if notations == ["radical"] {
            return self.radical(&node.children, None, config);
        }

        let content = layout_children(&node.children, config)?;
        let pad = config.px_em(Unit::new(0.4));
        let thickness = config.constants().fraction_rule_thickness.scaled(config);

        let width = content.width + pad.scale(2.0);
        let height = content.height + pad;
        let depth = content.depth - pad;

        let mut hbox = builders::HBox::new();
        hbox.add_node(kern!(horz: pad));
        hbox.add_node(content.as_node());
        hbox.add_node(kern!(horz: pad));

        let overlay = |variant: LayoutVariant| LayoutNode { width, height, depth, node: variant };
        let mid = (height + depth).scale(0.5);

        for notation in notations {
            hbox.add_node(kern!(horz: -width));
            match notation {
                "box" => {
                    hbox.add_node(overlay(LayoutVariant::Frame { thickness, radius: Unit::ZERO }))
                }
                "roundedbox" => hbox.add_node(overlay(LayoutVariant::Frame {
                    thickness,
                    radius: config.px_em(Unit::new(0.25)),
                })),
                "circle" => hbox.add_node(overlay(LayoutVariant::Ellipse { thickness })),
                "updiagonalstrike" => {
                    hbox.add_node(overlay(LayoutVariant::Diagonal { thickness, up: true }))
                }
                "downdiagonalstrike" => {
                    hbox.add_node(overlay(LayoutVariant::Diagonal { thickness, up: false }))
                }
                "horizontalstrike" => hbox.add_node(rule!(
                    width: width,
                    height: mid + thickness.scale(0.5),
                    depth: mid - thickness.scale(0.5)
                )),
                "verticalstrike" => {
                    hbox.add_node(kern!(horz: (width - thickness).scale(0.5)));
                    hbox.add_node(rule!(width: thickness, height: height, depth: depth));
                    hbox.add_node(kern!(horz: (width - thickness).scale(0.5)));
                }
                "top" => hbox.add_node(rule!(
                    width: width,
                    height: height,
                    depth: height - thickness
                )),
                "bottom" => hbox.add_node(rule!(
                    width: width,
                    height: depth + thickness,
                    depth: depth
                )),
                "left" => {
                    hbox.add_node(rule!(width: thickness, height: height, depth: depth));
                    hbox.add_node(kern!(horz: width - thickness));
                }
                "right" => {
                    hbox.add_node(kern!(horz: width - thickness));
                    hbox.add_node(rule!(width: thickness, height: height, depth: depth));
                }
                "actuarial" => {
                    hbox.add_node(rule!(width: width, height: height, depth: height - thickness));
                    hbox.add_node(kern!(horz: -thickness));
                    hbox.add_node(rule!(width: thickness, height: height, depth: depth));
                }
                "longdiv" | "radical" => {
                    if let Ok(glyph) = config.ctx.glyph(')') {
                        let variant = stretch(
                            config.ctx.font,
                            glyph.gid,
                            Direction::Vertical,
                            config.to_font(height - depth),
                        );
                        let paren = variant_node(&variant, config)?;
                        let paren_width = paren.width;
                        hbox.add_node(paren);
                        hbox.add_node(kern!(horz: -paren_width));
                    }
                    hbox.add_node(rule!(width: width, height: height, depth: height - thickness));
                }
                other => {
                    warn!("unknown menclose notation '{}'", other);
                    hbox.add_node(kern!(horz: width));
                }
            }
        }

        self.add_node(hbox.build());
        Ok(())
    }

    // ---- tables ----

    fn table<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let rows: Vec<&MathNode> = node.children.iter().filter(|c| c.tag == Tag::Mtr).collect();
        let num_columns = rows.iter().map(|r| r.children.len()).max().unwrap_or(0);
        if num_columns == 0 {
            return Ok(());
        }

        let spacing = |name: &str, fallback_em: f64| {
            node.attr(name)
                .and_then(|v| AnyLength::parse(v).map_err(|e| warn!("{}", e)).ok())
                .map(|l| config.length_px(l))
                .unwrap_or_else(|| config.px_em(Unit::new(fallback_em)))
        };
        let column_gap = spacing("columnspacing", 0.8);
        let row_gap = spacing("rowspacing", 0.4);

        let table_align = parse_align_list(node.attr("columnalign"));

        // Rows never get shorter than a strut, so single-digit rows and tall
        // rows still align sensibly.
        let baseline_skip = config.px_em(Unit::new(1.2));
        let strut_height = baseline_skip.scale(0.7);
        let strut_depth = -baseline_skip.scale(0.3);

        // First pass: lay out every cell, record per-row ascent/descent and
        // per-column max width. Short rows pad with empty cells.
        let mut cells: Vec<Vec<Layout>> = Vec::with_capacity(rows.len());
        let mut col_widths = vec![Unit::<Px>::ZERO; num_columns];
        let mut row_metrics: Vec<(Unit<Px>, Unit<Px>)> = Vec::with_capacity(rows.len());

        for row in &rows {
            let row_align = parse_align_list(row.attr("columnalign"));
            let mut laid: Vec<Layout> = Vec::with_capacity(num_columns);
            let mut height = strut_height;
            let mut depth = strut_depth;
            for col in 0..num_columns {
                let cell = match row.children.get(col) {
                    Some(cell) => {
                        let mut inner = if cell.tag == Tag::Mtd {
                            layout_children(&cell.children, config)?
                        } else {
                            layout_element(cell, config)?
                        };
                        let align = cell
                            .attr("columnalign")
                            .and_then(parse_align)
                            .or_else(|| row_align.get(col).copied())
                            .or_else(|| table_align.get(col).copied())
                            .unwrap_or(CellAlign::Center);
                        inner.alignment = match align {
                            CellAlign::Left => Alignment::Left,
                            CellAlign::Center => Alignment::Centered(inner.width),
                            CellAlign::Right => Alignment::Right(inner.width),
                        };
                        inner
                    }
                    None => Layout::new(),
                };
                height = Unit::max(height, cell.height);
                depth = Unit::min(depth, cell.depth);
                col_widths[col] = Unit::max(col_widths[col], cell.width);
                laid.push(cell);
            }
            row_metrics.push((height, depth));
            cells.push(laid);
        }

        // Second pass: one vertical box per column, rows aligned through
        // shared per-row metrics so baselines match across columns.
        let mut hbox = builders::HBox::new();
        let num_rows = cells.len();
        for col in 0..num_columns {
            let mut vbox = builders::VBox::new();
            for (row_idx, row_cells) in cells.iter_mut().enumerate() {
                let (row_height, row_depth) = row_metrics[row_idx];
                let mut cell = std::mem::take(&mut row_cells[col]);
                cell.width = col_widths[col];
                let node = cell.as_node();
                vbox.add_node(kern!(vert: row_height - node.height));
                vbox.add_node(node);
                let mut below = -row_depth;
                if row_idx + 1 < num_rows {
                    below += row_gap;
                }
                vbox.add_node(kern!(vert: below));
            }
            hbox.add_node(vbox.build());
            if col + 1 < num_columns {
                hbox.add_node(kern!(horz: column_gap));
            }
        }

        // The table sits on a baseline at its vertical center, offset by
        // the math axis.
        let height = hbox.height;
        let axis = config.constants().axis_height.scaled(config);
        let node = hbox.build();
        let offset = height.scale(0.5) - axis;
        self.add_node(vbox![offset: offset; node]);
        Ok(())
    }

    // ---- prescripts and postscripts ----

    fn multiscripts<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let mut children = node.children.iter();
        let base = children.next();

        let mut post: Vec<(Option<&MathNode>, Option<&MathNode>)> = Vec::new();
        let mut pre: Vec<(Option<&MathNode>, Option<&MathNode>)> = Vec::new();
        let mut into_pre = false;
        let mut pending: Option<&MathNode> = None;
        for child in children {
            if child.tag == Tag::Mprescripts {
                if let Some(sub) = pending.take() {
                    post.push((not_none(sub), None));
                }
                into_pre = true;
                continue;
            }
            match pending.take() {
                None => pending = Some(child),
                Some(sub) => {
                    let pair = (not_none(sub), not_none(child));
                    if into_pre {
                        pre.push(pair);
                    } else {
                        post.push(pair);
                    }
                }
            }
        }
        if let Some(sub) = pending.take() {
            let pair = (not_none(sub), None);
            if into_pre {
                pre.push(pair);
            } else {
                post.push(pair);
            }
        }

        // Prescript columns come first, sharing the gap rules with ordinary
        // scripts but attaching to an empty base.
        for &(sub, sup) in pre.iter() {
            let mut column = Layout::new();
            column.scripts(None, sub, sup, config)?;
            self.add_node(column.finalize().as_node());
        }

        let mut body = Layout::new();
        match post.split_first() {
            None => body.scripts(base, None, None, config)?,
            Some((&(sub, sup), rest)) => {
                body.scripts(base, sub, sup, config)?;
                for &(sub, sup) in rest {
                    body.scripts(None, sub, sup, config)?;
                }
            }
        }
        self.add_node(body.finalize().as_node());
        Ok(())
    }

    // ---- style and spacing wrappers ----

    fn mstyle<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let mut config = config;
        if let Some(value) = node.attr("mathvariant") {
            match MathVariant::parse(value) {
                Ok(variant) => config.style.variant = Some(variant),
                Err(e) => warn!("{}", e),
            }
        }
        if let Some(display) = node.bool_attr("displaystyle") {
            config.style.display = display;
        }
        if let Some(value) = node.attr("scriptlevel") {
            match value.parse::<u8>() {
                Ok(level) => {
                    let level = level.min(2);
                    config.style.font_size = config.sized_for_level(level);
                    config.style.script_level = level;
                }
                Err(_) => warn!("invalid scriptlevel '{}'", value),
            }
        }
        self.add_node(layout_children(&node.children, config)?.as_node());
        Ok(())
    }

    fn padded<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let inner = layout_children(&node.children, config)?;
        let mut node_box = inner.as_node();

        let adjust = |current: Unit<Px>, attr: Option<&str>| -> Unit<Px> {
            let Some(value) = attr else { return current };
            let (value, sign) = match value.as_bytes().first() {
                Some(b'+') => (&value[1..], 1.0),
                Some(b'-') => (&value[1..], -1.0),
                _ => (value, 0.0),
            };
            match AnyLength::parse(value) {
                Ok(length) => {
                    let px = config.length_px(length);
                    if sign == 0.0 {
                        px
                    } else {
                        current + px.scale(sign)
                    }
                }
                Err(e) => {
                    warn!("{}", e);
                    current
                }
            }
        };

        node_box.width = adjust(node_box.width, node.attr("width"));
        node_box.height = adjust(node_box.height, node.attr("height"));
        node_box.depth = -adjust(-node_box.depth, node.attr("depth"));
        self.add_node(node_box);
        Ok(())
    }

    fn phantom<F: MathFont>(&mut self, node: &MathNode, config: LayoutSettings<F>) -> LayoutResult<()> {
        let inner = layout_children(&node.children, config)?.as_node();
        self.add_node(LayoutNode {
            width: inner.width,
            height: inner.height,
            depth: inner.depth,
            node: LayoutVariant::Phantom(Box::new(inner)),
        });
        Ok(())
    }
}

// ---- helpers ----

fn opt_layout<F: MathFont>(
    node: Option<&MathNode>,
    config: LayoutSettings<F>,
) -> LayoutResult<Layout> {
    match node {
        Some(node) => layout_element(node, config),
        None => Ok(Layout::new()),
    }
}

fn not_none(node: &MathNode) -> Option<&MathNode> {
    if node.tag == Tag::None_ {
        None
    } else {
        Some(node)
    }
}

/// An `<mo>` base with movable limits.
fn movable_limits_op(node: &MathNode) -> Option<ResolvedOp> {
    let node = embellished_core(node)?;
    if node.tag != Tag::Mo {
        return None;
    }
    let op = dictionary::resolve(&node.text, Form::Prefix, |name| {
        node.attr(name).map(str::to_string)
    });
    if op.movable_limits {
        Some(op)
    } else {
        None
    }
}

fn is_large_operator(node: &MathNode) -> bool {
    embellished_core(node)
        .filter(|n| n.tag == Tag::Mo)
        .map(|n| {
            dictionary::resolve(&n.text, Form::Prefix, |name| n.attr(name).map(str::to_string))
                .largeop
        })
        .unwrap_or(false)
}

/// Follows wrappers with a single visible child down to the token that
/// determines operator behavior.
fn embellished_core(node: &MathNode) -> Option<&MathNode> {
    match node.tag {
        Tag::Mo => Some(node),
        Tag::Mrow | Tag::Mstyle | Tag::Math => {
            let mut visible = node.children.iter().filter(|c| !c.is_space_like());
            let first = visible.next()?;
            if visible.next().is_some() {
                None
            } else {
                embellished_core(first)
            }
        }
        _ => None,
    }
}

fn is_accent_operator(node: &MathNode) -> bool {
    if node.tag != Tag::Mo {
        return false;
    }
    dictionary::resolve(&node.text, Form::Postfix, |name| node.attr(name).map(str::to_string))
        .accent
}

fn is_invisible(c: char) -> bool {
    matches!(c, '\u{2061}'..='\u{2064}')
}

fn token_variant<F: MathFont>(node: &MathNode, config: LayoutSettings<F>) -> Option<MathVariant> {
    match node.attr("mathvariant") {
        Some(value) => match MathVariant::parse(value) {
            Ok(variant) => Some(variant),
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
        None => config.style.variant,
    }
}

/// Lays out an over/under attachment, stretching it horizontally over the
/// base width when it is a stretchy operator.
fn attachment_layout<F: MathFont>(
    node: &MathNode,
    config: LayoutSettings<F>,
    base_width: Unit<Px>,
) -> LayoutResult<Layout> {
    if node.tag == Tag::Mo {
        let op = dictionary::resolve(&node.text, Form::Infix, |name| {
            node.attr(name).map(str::to_string)
        });
        if op.stretchy {
            if let Some(c) = node.text.chars().next() {
                if let Ok(glyph) = config.ctx.glyph(c) {
                    let variant = stretch(
                        config.ctx.font,
                        glyph.gid,
                        Direction::Horizontal,
                        config.to_font(base_width),
                    );
                    let mut layout = Layout::new();
                    layout.add_node(variant_node(&variant, config)?);
                    return Ok(layout.finalize());
                }
            }
        }
    }
    layout_element(node, config)
}

/// Attachment-point shift: accents align top-accent anchors, other material
/// centers over the base.
fn attachment_shift(base: &Layout, attachment: &Layout, accent: bool) -> Unit<Px> {
    let base_anchor = match base.is_symbol() {
        Some(glyph) if accent && !glyph.attachment.is_zero() => glyph.attachment,
        Some(glyph) if accent => (base.width + glyph.italics).scale(0.5),
        _ => base.width.scale(0.5),
    };
    let att_anchor = match attachment.is_symbol() {
        Some(glyph) if accent && !glyph.attachment.is_zero() => glyph.attachment,
        _ => attachment.width.scale(0.5),
    };
    base_anchor - att_anchor
}

/// A run of characters in the given variant, no inter-glyph spacing.
pub(crate) fn text_run<F: MathFont>(
    text: &str,
    variant: MathVariant,
    config: LayoutSettings<F>,
) -> LayoutResult<Layout> {
    let mut layout = Layout::new();
    for c in text.chars() {
        push_char(&mut layout, c, variant, config)?;
    }
    Ok(layout.finalize())
}

fn push_char<F: MathFont>(
    layout: &mut Layout,
    c: char,
    variant: MathVariant,
    config: LayoutSettings<F>,
) -> LayoutResult<()> {
    if is_invisible(c) {
        return Ok(());
    }
    if c == ' ' || c == '\u{a0}' {
        let advance = match config.ctx.glyph(' ') {
            Ok(glyph) => config.px_funit(glyph.advance),
            Err(_) => config.px_em(Unit::new(0.25)),
        };
        layout.add_node(kern!(horz: advance));
        return Ok(());
    }

    let styled = style_char(c, variant);
    let glyph = config.ctx.glyph(styled).or_else(|_| {
        if styled != c {
            // styled codepoint absent from the font, use the base one
            config.ctx.glyph(c)
        } else {
            Err(crate::error::FontError::MissingGlyphCodepoint(c))
        }
    });
    match glyph {
        Ok(glyph) => layout.add_node(glyph_node(&glyph, config)),
        Err(e) => {
            warn!("{}; using replacement box", e);
            layout.add_node(replacement_box(config));
        }
    }
    Ok(())
}

/// A glyph as a layout node.
pub fn glyph_node<F: MathFont>(glyph: &Glyph, config: LayoutSettings<F>) -> LayoutNode {
    LayoutNode {
        width: config.px_funit(glyph.advance),
        height: config.px_funit(glyph.height()),
        depth: config.px_funit(glyph.depth()),
        node: LayoutVariant::Glyph(super::LayoutGlyph {
            gid: glyph.gid,
            size: Unit::new(config.style.font_size),
            offset: Unit::ZERO,
            attachment: config.px_funit(glyph.attachment),
            italics: config.px_funit(glyph.italics),
        }),
    }
}

/// A stretched glyph as a layout node: either the replacement glyph or the
/// assembly pieces joined with negative kerns.
pub fn variant_node<F: MathFont>(
    variant: &VariantGlyph,
    config: LayoutSettings<F>,
) -> LayoutResult<LayoutNode> {
    match *variant {
        VariantGlyph::Replacement(gid) => {
            let glyph = config.ctx.glyph_from_gid(gid)?;
            Ok(glyph_node(&glyph, config))
        }
        VariantGlyph::Constructable(Direction::Vertical, ref pieces) => {
            // Pieces are listed bottom to top; the box is built top down. A
            // piece's overlap joins it to the piece below, so the negative
            // kern follows the glyph.
            let mut vbox = builders::VBox::new();
            for piece in pieces.iter().rev() {
                let metrics = config.ctx.glyph_from_gid(piece.gid)?;
                // The piece fills its full advance along the growth axis,
                // its ink anchored at the bottom of the slot.
                vbox.add_node(LayoutNode {
                    width: config.px_funit(metrics.advance),
                    height: config.px_funit(piece.advance),
                    depth: Unit::ZERO,
                    node: LayoutVariant::Glyph(super::LayoutGlyph {
                        gid: piece.gid,
                        size: Unit::new(config.style.font_size),
                        offset: Unit::ZERO,
                        attachment: config.px_funit(metrics.attachment),
                        italics: config.px_funit(metrics.italics),
                    }),
                });
                if !piece.overlap.is_zero() {
                    vbox.add_node(kern!(vert: -config.px_funit(piece.overlap)));
                }
            }
            Ok(vbox.build())
        }
        VariantGlyph::Constructable(Direction::Horizontal, ref pieces) => {
            let mut hbox = builders::HBox::new();
            for piece in pieces {
                let metrics = config.ctx.glyph_from_gid(piece.gid)?;
                if !piece.overlap.is_zero() {
                    hbox.add_node(kern!(horz: -config.px_funit(piece.overlap)));
                }
                let mut node = glyph_node(&metrics, config);
                node.width = config.px_funit(piece.advance);
                hbox.add_node(node);
            }
            Ok(hbox.build())
        }
    }
}

/// The visible box drawn in place of a glyph the font does not provide.
fn replacement_box<F: MathFont>(config: LayoutSettings<F>) -> LayoutNode {
    let em = config.px_em(Unit::new(1.0));
    LayoutNode {
        width: em.scale(0.8),
        height: em.scale(0.75),
        depth: Unit::ZERO,
        node: LayoutVariant::Frame { thickness: em.scale(0.05), radius: Unit::ZERO },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellAlign {
    Left,
    Center,
    Right,
}

fn parse_align(value: &str) -> Option<CellAlign> {
    match value {
        "left" => Some(CellAlign::Left),
        "center" => Some(CellAlign::Center),
        "right" => Some(CellAlign::Right),
        _ => None,
    }
}

fn parse_align_list(value: Option<&str>) -> Vec<CellAlign> {
    value
        .map(|v| v.split_whitespace().filter_map(parse_align).collect())
        .unwrap_or_default()
}
