//! The cascade: collect every declaration from every matched rule against an element,
//! order them by origin -> importance -> specificity -> source order (§4.4), and apply
//! the winner per property into a `ComputedStyle`, inheriting unset inherited
//! properties from the parent.

use browser_core::{Color, Length, LengthContext};

use crate::computed::{
    AlignItems, BoxShadow, ClipPathShape, ComputedStyle, Display, EdgeLengths, FlexDirection, FlexWrap, Gradient,
    JustifyContent, Overflow, Position, TextAlign, TransformOp,
};
use crate::element_view::ElementViewArena;
use crate::matcher::matches_complex;
use crate::rule::{AtRule, DeclarationBlock, Origin, StyleSheet};
use crate::selector::Specificity;
use crate::tokenizer::CssToken;
use crate::value::CssValue;

struct Matched<'a> {
    property: &'a str,
    value: &'a CssValue,
    important: bool,
    specificity: Specificity,
    source_order: u32,
    origin: Origin,
}

/// `(important, origin, specificity, source_order)`, compared lexicographically; the
/// maximum wins. Importance reverses the normal origin ordering, matching the way
/// `!important` escalates UA/user declarations above normal author rules in real CSS.
fn priority_key(matched: &Matched<'_>) -> (bool, u8, u64, u32) {
    (matched.important, matched.origin as u8, matched.specificity.as_u64(), matched.source_order)
}

/// Flatten a stylesheet's rules plus any `@media`/`@supports` blocks whose condition
/// holds for `viewport`, tagging each with a process-wide-unique `source_order` so tie
/// breaks stay correct across multiple sheets (§3: "source order is monotonic across
/// a sheet").
fn flatten_rules<'a>(
    sheet: &'a StyleSheet,
    viewport: (f32, f32),
    next_order: &mut u32,
    out: &mut Vec<(&'a crate::rule::StyleRule, u32)>,
) {
    for rule in &sheet.rules {
        out.push((rule, *next_order));
        *next_order += 1;
    }
    for at_rule in &sheet.at_rules {
        if let AtRule::Media { condition_text, rules } = at_rule {
            if evaluate_media_condition(condition_text, viewport) {
                for rule in rules {
                    out.push((rule, *next_order));
                    *next_order += 1;
                }
            }
        }
    }
}

/// Minimal `@media`/`@supports` condition evaluator: recognizes `(min-width: Npx)` and
/// `(max-width: Npx)` against the current viewport, joined by `and`; anything else
/// (unsupported features, `@supports` prop checks) is treated as satisfied, matching
/// the "fixed feature-support list" contract loosely in the permissive direction so a
/// dropped condition doesn't silently hide author content.
fn evaluate_media_condition(condition_text: &str, viewport: (f32, f32)) -> bool {
    let lower = condition_text.to_ascii_lowercase();
    if !lower.contains("width") {
        return true;
    }
    lower.split("and").all(|clause| evaluate_single_media_clause(clause.trim(), viewport))
}

fn evaluate_single_media_clause(clause: &str, viewport: (f32, f32)) -> bool {
    let clause = clause.trim_start_matches('(').trim_end_matches(')');
    let Some((feature, value)) = clause.split_once(':') else { return true };
    let feature = feature.trim();
    let value = value.trim().trim_end_matches("px");
    let Ok(px) = value.parse::<f32>() else { return true };
    match feature {
        "min-width" => viewport.0 >= px,
        "max-width" => viewport.0 <= px,
        "min-height" => viewport.1 >= px,
        "max-height" => viewport.1 <= px,
        _ => true,
    }
}

/// Resolve the `ComputedStyle` for the element at `index`, given its (already
/// resolved) parent style, the author stylesheets in document order, an optional
/// `style=""` inline declaration block, and the viewport for media evaluation.
pub fn resolve_style(
    arena: &ElementViewArena,
    index: usize,
    parent_style: Option<&ComputedStyle>,
    sheets: &[&StyleSheet],
    inline: Option<&DeclarationBlock>,
    viewport: (f32, f32),
) -> ComputedStyle {
    let mut base = parent_style.map_or_else(ComputedStyle::initial, ComputedStyle::inherit_from);

    let mut rules: Vec<(&crate::rule::StyleRule, u32)> = Vec::new();
    let mut next_order = 0u32;
    for sheet in sheets {
        flatten_rules(sheet, viewport, &mut next_order, &mut rules);
    }

    let mut matched: Vec<Matched<'_>> = Vec::new();
    for (rule, source_order) in &rules {
        let Some(selector) = rule.selectors.iter().find(|selector| matches_complex(arena, index, selector)) else {
            continue;
        };
        let specificity = selector.specificity();
        for declaration in &rule.declarations.declarations {
            matched.push(Matched {
                property: &declaration.property,
                value: &declaration.value,
                important: declaration.important,
                specificity,
                source_order: *source_order,
                origin: Origin::Author,
            });
        }
    }

    if let Some(inline) = inline {
        for declaration in &inline.declarations {
            matched.push(Matched {
                property: &declaration.property,
                value: &declaration.value,
                important: declaration.important,
                specificity: Specificity { ids: 1, classes: 0, types: 0 },
                source_order: next_order,
                origin: Origin::Inline,
            });
        }
    }

    // Stable sort ascending by priority, then apply in order so the last (highest
    // priority) write per property wins -- this is what makes equal-priority ties
    // resolve by source order without a secondary lookup structure.
    matched.sort_by(|a, b| priority_key(a).cmp(&priority_key(b)));

    let font_size_ctx = LengthContext {
        containing_size: 0.0,
        font_size: base.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: base.line_height,
    };
    for entry in &matched {
        if entry.property == "font-size" {
            apply_value(&mut base, entry.property, entry.value, &font_size_ctx);
        }
    }
    let ctx = LengthContext {
        containing_size: 0.0,
        font_size: base.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: base.line_height,
    };
    for entry in &matched {
        if entry.property != "font-size" {
            apply_value(&mut base, entry.property, entry.value, &ctx);
        }
    }

    base
}

/// Resolve `::before`/`::after` for the element at `index`. A selector's pseudo-element
/// name lives among the last compound's simple selectors (§4.4); matching it means
/// stripping that marker and matching the rest of the compound chain normally, then
/// requiring at least one matched declaration to set `content` (§4.4: "If at least one
/// declaration contributes a `content` value, a synthetic layout node is emitted").
/// Returns the resolved style for the pseudo box plus its `content` value.
pub fn resolve_pseudo_element(
    arena: &ElementViewArena,
    index: usize,
    own_style: &ComputedStyle,
    sheets: &[&StyleSheet],
    pseudo: &str,
    viewport: (f32, f32),
) -> Option<(ComputedStyle, CssValue)> {
    let mut rules: Vec<(&crate::rule::StyleRule, u32)> = Vec::new();
    let mut next_order = 0u32;
    for sheet in sheets {
        flatten_rules(sheet, viewport, &mut next_order, &mut rules);
    }

    let mut matched: Vec<Matched<'_>> = Vec::new();
    for (rule, source_order) in &rules {
        for selector in &rule.selectors {
            let Some((_, last_compound)) = selector.compounds.last() else { continue };
            let pseudo_name = last_compound.simple_selectors.iter().find_map(|simple| match simple {
                crate::selector::SimpleSelector::PseudoElement(name) => Some(name.as_str()),
                _ => None,
            });
            if pseudo_name != Some(pseudo) {
                continue;
            }
            let stripped_compound = crate::selector::CompoundSelector {
                simple_selectors: last_compound
                    .simple_selectors
                    .iter()
                    .filter(|simple| !matches!(simple, crate::selector::SimpleSelector::PseudoElement(_)))
                    .cloned()
                    .collect(),
            };
            let mut stripped = selector.clone();
            let last = stripped.compounds.len() - 1;
            stripped.compounds[last].1 = stripped_compound;
            if !matches_complex(arena, index, &stripped) {
                continue;
            }
            let specificity = selector.specificity();
            for declaration in &rule.declarations.declarations {
                matched.push(Matched {
                    property: &declaration.property,
                    value: &declaration.value,
                    important: declaration.important,
                    specificity,
                    source_order: *source_order,
                    origin: Origin::Author,
                });
            }
        }
    }

    if matched.is_empty() || !matched.iter().any(|entry| entry.property == "content") {
        return None;
    }

    matched.sort_by(|a, b| priority_key(a).cmp(&priority_key(b)));
    let mut style = ComputedStyle::inherit_from(own_style);
    let ctx = LengthContext {
        containing_size: 0.0,
        font_size: style.font_size,
        root_font_size: 16.0,
        viewport_width: viewport.0,
        viewport_height: viewport.1,
        line_height: style.line_height,
    };
    let mut content = CssValue::String(String::new());
    for entry in &matched {
        if entry.property == "content" {
            content = entry.value.clone();
        } else {
            apply_value(&mut style, entry.property, entry.value, &ctx);
        }
    }
    Some((style, content))
}

/// Resolve `::selection { color; background-color }` across every sheet (§6's
/// `selection_color`/`selection_bg_color`). Unlike `::before`/`::after`, `::selection`
/// is not matched per-element here: the core reports one document-wide pair, so this
/// scans every rule whose subject carries a `::selection` marker regardless of which
/// element it's attached to and lets the usual priority ordering pick a winner.
pub fn resolve_selection_colors(sheets: &[&StyleSheet], viewport: (f32, f32)) -> (Option<Color>, Option<Color>) {
    let mut rules: Vec<(&crate::rule::StyleRule, u32)> = Vec::new();
    let mut next_order = 0u32;
    for sheet in sheets {
        flatten_rules(sheet, viewport, &mut next_order, &mut rules);
    }

    let mut matched: Vec<Matched<'_>> = Vec::new();
    for (rule, source_order) in &rules {
        for selector in &rule.selectors {
            let Some((_, last_compound)) = selector.compounds.last() else { continue };
            let is_selection = last_compound
                .simple_selectors
                .iter()
                .any(|simple| matches!(simple, crate::selector::SimpleSelector::PseudoElement(name) if name == "selection"));
            if !is_selection {
                continue;
            }
            let specificity = selector.specificity();
            for declaration in &rule.declarations.declarations {
                matched.push(Matched {
                    property: &declaration.property,
                    value: &declaration.value,
                    important: declaration.important,
                    specificity,
                    source_order: *source_order,
                    origin: Origin::Author,
                });
            }
        }
    }

    matched.sort_by(|a, b| priority_key(a).cmp(&priority_key(b)));

    let mut color = None;
    let mut background = None;
    for entry in &matched {
        match entry.property {
            "color" => color = entry.value.as_color(),
            "background-color" | "background" => background = entry.value.as_color(),
            _ => {}
        }
    }
    (color, background)
}

fn as_length(value: &CssValue) -> Option<Length> {
    match value {
        CssValue::Keyword(keyword) if keyword == "auto" => Some(Length::Auto),
        other => other.as_length(),
    }
}

fn four_lengths(value: &CssValue) -> Option<[Length; 4]> {
    match value {
        CssValue::List(items) => {
            let parsed: Vec<Length> = items.iter().filter_map(as_length).collect();
            match parsed.len() {
                1 => Some([parsed[0].clone(), parsed[0].clone(), parsed[0].clone(), parsed[0].clone()]),
                2 => Some([parsed[0].clone(), parsed[1].clone(), parsed[0].clone(), parsed[1].clone()]),
                3 => Some([parsed[0].clone(), parsed[1].clone(), parsed[2].clone(), parsed[1].clone()]),
                4 => Some([parsed[0].clone(), parsed[1].clone(), parsed[2].clone(), parsed[3].clone()]),
                _ => None,
            }
        }
        single => as_length(single).map(|length| [length.clone(), length.clone(), length.clone(), length]),
    }
}

fn apply_value(style: &mut ComputedStyle, property: &str, value: &CssValue, ctx: &LengthContext) {
    if let Some(name) = property.strip_prefix("--") {
        style.custom_properties.insert(name.to_owned(), value.clone());
        return;
    }

    match property {
        "display" => {
            if let Some(keyword) = value.as_keyword() {
                style.display = match keyword {
                    "none" => Display::None,
                    "inline" => Display::Inline,
                    "inline-block" => Display::InlineBlock,
                    "flex" => Display::Flex,
                    "grid" => Display::Grid,
                    "table" => Display::Table,
                    "table-row" => Display::TableRow,
                    "table-cell" => Display::TableCell,
                    _ => Display::Block,
                };
            }
        }
        "position" => {
            if let Some(keyword) = value.as_keyword() {
                style.position = match keyword {
                    "relative" => Position::Relative,
                    "absolute" => Position::Absolute,
                    "fixed" => Position::Fixed,
                    "sticky" => Position::Sticky,
                    _ => Position::Static,
                };
            }
        }
        "top" => set_length(&mut style.top, value),
        "right" => set_length(&mut style.right, value),
        "bottom" => set_length(&mut style.bottom, value),
        "left" => set_length(&mut style.left, value),
        "width" => set_length(&mut style.width, value),
        "height" => set_length(&mut style.height, value),
        "min-width" => set_length(&mut style.min_width, value),
        "min-height" => set_length(&mut style.min_height, value),
        "max-width" => set_length(&mut style.max_width, value),
        "max-height" => set_length(&mut style.max_height, value),
        "margin" => {
            if let Some([top, right, bottom, left]) = four_lengths(value) {
                style.margin = EdgeLengths { top, right, bottom, left };
            }
        }
        "margin-top" => set_length(&mut style.margin.top, value),
        "margin-right" => set_length(&mut style.margin.right, value),
        "margin-bottom" => set_length(&mut style.margin.bottom, value),
        "margin-left" => set_length(&mut style.margin.left, value),
        "padding" => {
            if let Some([top, right, bottom, left]) = four_lengths(value) {
                style.padding = EdgeLengths { top, right, bottom, left };
            }
        }
        "padding-top" => set_length(&mut style.padding.top, value),
        "padding-right" => set_length(&mut style.padding.right, value),
        "padding-bottom" => set_length(&mut style.padding.bottom, value),
        "padding-left" => set_length(&mut style.padding.left, value),
        "border-width" => {
            if let Some([top, right, bottom, left]) = four_lengths(value) {
                style.border_width = EdgeLengths { top, right, bottom, left };
            }
        }
        "border-color" => {
            if let Some(color) = value.as_color() {
                style.border_color = color;
            }
        }
        "background-color" | "background" => {
            if let Some(color) = value.as_color() {
                style.background_color = color;
            }
        }
        "color" => {
            if let Some(color) = value.as_color() {
                style.color = color;
            }
        }
        "font-size" => {
            if let Some(length) = as_length(value) {
                if let Some(resolved) = length.resolve(ctx) {
                    style.font_size = resolved;
                    style.line_height = resolved * 1.2;
                }
            }
        }
        "font-family" => {
            if let Some(keyword) = value.as_keyword() {
                style.font_family = keyword.to_owned();
            } else if let CssValue::List(items) = value {
                if let Some(first) = items.first().and_then(CssValue::as_keyword) {
                    style.font_family = first.to_owned();
                }
            }
        }
        "font-weight" => match value {
            CssValue::Number(number) => style.font_weight = *number as u16,
            CssValue::Keyword(keyword) if keyword == "bold" => style.font_weight = 700,
            CssValue::Keyword(keyword) if keyword == "normal" => style.font_weight = 400,
            _ => {}
        },
        "font-style" => {
            if let Some(keyword) = value.as_keyword() {
                style.italic = keyword == "italic" || keyword == "oblique";
            }
        }
        "line-height" => {
            if let CssValue::Number(multiplier) = value {
                style.line_height = style.font_size * (*multiplier as f32);
            } else if let Some(length) = as_length(value) {
                if let Some(resolved) = length.resolve(ctx) {
                    style.line_height = resolved;
                }
            }
        }
        "text-align" => {
            if let Some(keyword) = value.as_keyword() {
                style.text_align = match keyword {
                    "center" => TextAlign::Center,
                    "right" => TextAlign::Right,
                    "justify" => TextAlign::Justify,
                    _ => TextAlign::Left,
                };
            }
        }
        "text-decoration" | "text-decoration-line" => {
            if let Some(keyword) = value.as_keyword() {
                style.text_decoration = keyword.to_owned();
            }
        }
        "letter-spacing" => {
            if let Some(length) = as_length(value) {
                if let Some(resolved) = length.resolve(ctx) {
                    style.letter_spacing = resolved;
                }
            }
        }
        "visibility" => {
            if let Some(keyword) = value.as_keyword() {
                style.visible = keyword != "hidden" && keyword != "collapse";
            }
        }
        "overflow" => {
            if let Some(overflow) = parse_overflow(value) {
                style.overflow_x = overflow;
                style.overflow_y = overflow;
            }
        }
        "overflow-x" => {
            if let Some(overflow) = parse_overflow(value) {
                style.overflow_x = overflow;
            }
        }
        "overflow-y" => {
            if let Some(overflow) = parse_overflow(value) {
                style.overflow_y = overflow;
            }
        }
        "cursor" => {
            if let Some(keyword) = value.as_keyword() {
                style.cursor = keyword.to_owned();
            }
        }
        "opacity" => {
            if let CssValue::Number(number) = value {
                style.opacity = (*number as f32).clamp(0.0, 1.0);
            }
        }
        "z-index" => {
            if let CssValue::Number(number) = value {
                style.z_index = Some(*number as i32);
            }
        }
        "flex-direction" => {
            if let Some(keyword) = value.as_keyword() {
                style.flex_direction = match keyword {
                    "row-reverse" => FlexDirection::RowReverse,
                    "column" => FlexDirection::Column,
                    "column-reverse" => FlexDirection::ColumnReverse,
                    _ => FlexDirection::Row,
                };
            }
        }
        "flex-wrap" => {
            if let Some(keyword) = value.as_keyword() {
                style.flex_wrap = match keyword {
                    "wrap" => FlexWrap::Wrap,
                    "wrap-reverse" => FlexWrap::WrapReverse,
                    _ => FlexWrap::NoWrap,
                };
            }
        }
        "justify-content" => {
            if let Some(keyword) = value.as_keyword() {
                style.justify_content = match keyword {
                    "flex-end" | "end" => JustifyContent::FlexEnd,
                    "center" => JustifyContent::Center,
                    "space-between" => JustifyContent::SpaceBetween,
                    "space-around" => JustifyContent::SpaceAround,
                    "space-evenly" => JustifyContent::SpaceEvenly,
                    _ => JustifyContent::FlexStart,
                };
            }
        }
        "align-items" => {
            if let Some(align) = parse_align(value) {
                style.align_items = align;
            }
        }
        "align-self" => {
            style.align_self = parse_align(value);
        }
        "flex-grow" => {
            if let CssValue::Number(number) = value {
                style.flex_grow = *number as f32;
            }
        }
        "flex-shrink" => {
            if let CssValue::Number(number) = value {
                style.flex_shrink = *number as f32;
            }
        }
        "flex-basis" => {
            if let Some(length) = as_length(value) {
                style.flex_basis = length;
            }
        }
        "gap" => {
            if let Some([top, _, _, left]) = four_lengths(value) {
                style.row_gap = top;
                style.column_gap = left;
            } else if let Some(length) = as_length(value) {
                style.row_gap = length.clone();
                style.column_gap = length;
            }
        }
        "row-gap" => {
            if let Some(length) = as_length(value) {
                style.row_gap = length;
            }
        }
        "column-gap" => {
            if let Some(length) = as_length(value) {
                style.column_gap = length;
            }
        }
        "grid-template-columns" => style.grid_template_columns = grid_tracks(value),
        "grid-template-rows" => style.grid_template_rows = grid_tracks(value),
        "border-radius" => {
            if let Some(length) = first_length(value) {
                if let Some(resolved) = length.resolve(ctx) {
                    style.border_radius = resolved;
                }
            }
        }
        "box-shadow" => {
            style.box_shadow = parse_box_shadow(value, ctx);
        }
        "outline" => match value {
            CssValue::List(items) => {
                for item in items {
                    if let Some(resolved_length) = as_length(item).and_then(|length| length.resolve(ctx)) {
                        style.outline.width = resolved_length;
                    } else if let Some(color) = item.as_color() {
                        style.outline.color = color;
                    }
                }
            }
            other => {
                if let Some(color) = other.as_color() {
                    style.outline.color = color;
                }
            }
        },
        "outline-color" => {
            if let Some(color) = value.as_color() {
                style.outline.color = color;
            }
        }
        "outline-width" => {
            if let Some(resolved) = as_length(value).and_then(|length| length.resolve(ctx)) {
                style.outline.width = resolved;
            }
        }
        "transform" => {
            style.transform = parse_transform_op(value);
        }
        "filter" => {
            if let CssValue::Tokens(tokens) = value {
                if let Some(CssToken::Function(name)) = tokens.first() {
                    if name.eq_ignore_ascii_case("blur") {
                        let inner = &tokens[1..tokens.len().saturating_sub(1)];
                        if let Some(px) = inner.iter().find_map(token_number) {
                            style.filter_blur = px;
                        }
                    }
                }
            }
        }
        "background-image" => {
            if let Some(gradient) = parse_gradient(value) {
                style.background_gradient = Some(gradient);
            }
        }
        "mix-blend-mode" => {
            style.mix_blend_mode = value.as_keyword().filter(|keyword| *keyword != "normal").map(ToOwned::to_owned);
        }
        "clip-path" => {
            style.clip_path = parse_clip_path(value);
        }
        "backdrop-filter" => {
            if let CssValue::Tokens(tokens) = value {
                if let Some(CssToken::Function(name)) = tokens.first() {
                    if name.eq_ignore_ascii_case("blur") {
                        let inner = &tokens[1..tokens.len().saturating_sub(1)];
                        if let Some(px) = inner.iter().find_map(token_number) {
                            style.backdrop_filter_blur = px;
                        }
                    }
                }
            }
        }
        "mask-image" => {
            style.mask_gradient = parse_gradient(value);
        }
        _ => {}
    }
}

/// The first length in a (possibly space-separated) value; used by `border-radius`,
/// which this pipeline tracks as a single uniform corner radius rather than four.
fn first_length(value: &CssValue) -> Option<Length> {
    match value {
        CssValue::List(items) => items.iter().find_map(as_length),
        single => as_length(single),
    }
}

/// `box-shadow: [inset] <offset-x> <offset-y> [<blur>] [<spread>] [<color>]` (§4.7).
/// Only the first shadow layer is kept, matching the single-`Option` field contract.
fn parse_box_shadow(value: &CssValue, ctx: &LengthContext) -> Option<BoxShadow> {
    let components: Vec<&CssValue> = match value {
        CssValue::List(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut lengths = Vec::new();
    let mut color = None;
    let mut inset = false;
    for component in components {
        if let Some(resolved) = as_length(component).and_then(|length| length.resolve(ctx)) {
            lengths.push(resolved);
        } else if let Some(parsed_color) = component.as_color() {
            color = Some(parsed_color);
        } else if component.as_keyword() == Some("inset") {
            inset = true;
        }
    }
    if lengths.len() < 2 {
        return None;
    }
    Some(BoxShadow {
        offset_x: lengths[0],
        offset_y: lengths[1],
        blur_radius: lengths.get(2).copied().unwrap_or(0.0),
        spread_radius: lengths.get(3).copied().unwrap_or(0.0),
        color: color.unwrap_or(Color::BLACK),
        inset,
    })
}

fn token_number(token: &CssToken) -> Option<f32> {
    match token {
        CssToken::Number { value, .. } | CssToken::Dimension { value, .. } => Some(*value as f32),
        CssToken::Percentage { value, .. } => Some(*value as f32),
        _ => None,
    }
}

/// `transform: <single function>(...)`; only the first recognized function is applied,
/// matching the single-`TransformOp` field this pipeline carries instead of a full
/// transform-function list (§3/§9's simplified-contract note).
fn parse_transform_op(value: &CssValue) -> Option<TransformOp> {
    let tokens = match value {
        CssValue::Tokens(tokens) => tokens,
        CssValue::List(items) => return items.iter().find_map(parse_transform_op),
        _ => return None,
    };
    let CssToken::Function(name) = tokens.first()? else { return None };
    let inner = &tokens[1..tokens.len().saturating_sub(1)];
    let numbers: Vec<f32> = inner.iter().filter_map(token_number).collect();
    match name.to_ascii_lowercase().as_str() {
        "translate" => Some(TransformOp::Translate(*numbers.first()?, numbers.get(1).copied().unwrap_or(0.0))),
        "translatex" => Some(TransformOp::Translate(*numbers.first()?, 0.0)),
        "translatey" => Some(TransformOp::Translate(0.0, *numbers.first()?)),
        "scale" => {
            let scale = *numbers.first()?;
            Some(TransformOp::Scale(scale, numbers.get(1).copied().unwrap_or(scale)))
        }
        "rotate" => Some(TransformOp::Rotate(*numbers.first()?)),
        _ => None,
    }
}

/// Splits a token slice on top-level commas, treating a `Function` token as opening a
/// nesting level closed by its matching `RightParen` so a gradient stop's own
/// `rgba(...)` call doesn't get split apart.
fn split_commas_top_level(tokens: &[CssToken]) -> Vec<Vec<CssToken>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    for token in tokens {
        match token {
            CssToken::Function(_) | CssToken::LeftParen => {
                depth += 1;
                current.push(token.clone());
            }
            CssToken::RightParen => {
                depth -= 1;
                current.push(token.clone());
            }
            CssToken::Comma if depth == 0 => groups.push(std::mem::take(&mut current)),
            _ => current.push(token.clone()),
        }
    }
    groups.push(current);
    groups
}

fn token_color(token: &CssToken) -> Option<Color> {
    match token {
        CssToken::Hash { value, .. } => Color::parse(&format!("#{value}")),
        CssToken::Ident(name) => Color::parse(name),
        _ => None,
    }
}

fn token_position(token: &CssToken) -> Option<f32> {
    match token {
        CssToken::Percentage { value, .. } => Some((*value as f32) / 100.0),
        _ => None,
    }
}

/// Degrees clockwise from "up" for the `to <side>` keyword form (`to bottom` is CSS's
/// default direction, 180deg in this convention).
fn angle_from_side(tokens: &[&CssToken]) -> f32 {
    let idents: Vec<String> = tokens
        .iter()
        .filter_map(|token| match token {
            CssToken::Ident(name) => Some(name.to_ascii_lowercase()),
            _ => None,
        })
        .collect();
    let has = |side: &str| idents.iter().any(|ident| ident == side);
    match (has("top"), has("bottom"), has("left"), has("right")) {
        (true, false, false, false) => 0.0,
        (false, false, false, true) => 90.0,
        (false, true, false, false) => 180.0,
        (false, false, true, false) => 270.0,
        (true, false, false, true) => 45.0,
        (false, true, false, true) => 135.0,
        (false, true, true, false) => 225.0,
        (true, false, true, false) => 315.0,
        _ => 180.0,
    }
}

/// `linear-gradient()`/`radial-gradient()`/`conic-gradient()` (§4.7), with a
/// `repeating-` prefix accepted and ignored (repeat tiling is out of this rasterizer's
/// scope). Only `Hash`/named-color stops are recognized, not nested `rgba()` calls,
/// matching the simplified-contract note this module follows elsewhere.
fn parse_gradient(value: &CssValue) -> Option<Gradient> {
    let CssValue::Tokens(tokens) = value else { return None };
    let CssToken::Function(name) = tokens.first()? else { return None };
    let lower = name.to_ascii_lowercase();
    let inner = &tokens[1..tokens.len().saturating_sub(1)];
    let groups = split_commas_top_level(inner);

    let mut angle_degrees = 180.0f32;
    let mut stops: Vec<(Color, Option<f32>)> = Vec::new();
    for group in &groups {
        let trimmed: Vec<&CssToken> = group.iter().filter(|token| !matches!(token, CssToken::Whitespace)).collect();
        if trimmed.is_empty() {
            continue;
        }
        if let [CssToken::Dimension { value: degrees, unit, .. }] = trimmed.as_slice() {
            if unit.eq_ignore_ascii_case("deg") {
                angle_degrees = *degrees as f32;
                continue;
            }
        }
        if trimmed.iter().any(|token| matches!(token, CssToken::Ident(ident) if ident.eq_ignore_ascii_case("to"))) {
            angle_degrees = angle_from_side(&trimmed);
            continue;
        }
        let Some(color) = trimmed.iter().find_map(|token| token_color(token)) else { continue };
        let position = trimmed.iter().find_map(|token| token_position(token));
        stops.push((color, position));
    }

    let count = stops.len();
    let normalized: Vec<(Color, f32)> = stops
        .into_iter()
        .enumerate()
        .map(|(index, (color, position))| {
            let fallback = if count > 1 { index as f32 / (count - 1) as f32 } else { 0.0 };
            (color, position.unwrap_or(fallback))
        })
        .collect();

    match lower.trim_start_matches("repeating-") {
        "linear-gradient" => Some(Gradient::Linear { angle_degrees, stops: normalized }),
        "radial-gradient" => Some(Gradient::Radial { stops: normalized }),
        "conic-gradient" => Some(Gradient::Conic { stops: normalized }),
        _ => None,
    }
}

/// `clip-path: circle(R%) | ellipse(RX% RY%) | inset(T R B L) | polygon(x% y%, ...)`
/// (§4.7). Percentages resolve against the box's own geometry at paint time rather
/// than here, so this just carries the parsed percentages forward.
fn parse_clip_path(value: &CssValue) -> Option<ClipPathShape> {
    let CssValue::Tokens(tokens) = value else { return None };
    let CssToken::Function(name) = tokens.first()? else { return None };
    let inner = &tokens[1..tokens.len().saturating_sub(1)];
    let percents: Vec<f32> = inner.iter().filter_map(token_position).collect();
    match name.to_ascii_lowercase().as_str() {
        "circle" => Some(ClipPathShape::Circle { radius_percent: percents.first().copied().unwrap_or(50.0) }),
        "ellipse" => Some(ClipPathShape::Ellipse {
            rx_percent: percents.first().copied().unwrap_or(50.0),
            ry_percent: percents.get(1).copied().unwrap_or(50.0),
        }),
        "inset" => Some(ClipPathShape::Inset {
            top_percent: percents.first().copied().unwrap_or(0.0),
            right_percent: percents.get(1).copied().unwrap_or(0.0),
            bottom_percent: percents.get(2).copied().unwrap_or(0.0),
            left_percent: percents.get(3).copied().unwrap_or(0.0),
        }),
        "polygon" => {
            let groups = split_commas_top_level(inner);
            let points_percent: Vec<(f32, f32)> = groups
                .iter()
                .filter_map(|group| {
                    let coords: Vec<f32> = group.iter().filter_map(token_position).collect();
                    (coords.len() >= 2).then(|| (coords[0], coords[1]))
                })
                .collect();
            (!points_percent.is_empty()).then_some(ClipPathShape::Polygon { points_percent })
        }
        _ => None,
    }
}

/// Parses `grid-template-columns`/`-rows`: a space-separated track list of `px`/`fr`
/// lengths and the `auto` keyword (§4.5's minimal single-axis resolver).
fn grid_tracks(value: &CssValue) -> Vec<Length> {
    fn track(value: &CssValue) -> Option<Length> {
        match value {
            CssValue::Keyword(keyword) if keyword == "auto" => Some(Length::Auto),
            other => as_length(other),
        }
    }
    match value {
        CssValue::List(items) => items.iter().filter_map(track).collect(),
        single => track(single).into_iter().collect(),
    }
}

fn set_length(slot: &mut Length, value: &CssValue) {
    if let Some(length) = as_length(value) {
        *slot = length;
    }
}

fn parse_overflow(value: &CssValue) -> Option<Overflow> {
    match value.as_keyword()? {
        "hidden" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        "auto" => Some(Overflow::Auto),
        "visible" => Some(Overflow::Visible),
        _ => None,
    }
}

fn parse_align(value: &CssValue) -> Option<AlignItems> {
    match value.as_keyword()? {
        "flex-start" | "start" => Some(AlignItems::FlexStart),
        "flex-end" | "end" => Some(AlignItems::FlexEnd),
        "center" => Some(AlignItems::Center),
        "baseline" => Some(AlignItems::Baseline),
        "stretch" => Some(AlignItems::Stretch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element_view::ElementView;
    use crate::parser::parse_stylesheet;

    fn single_p_arena() -> ElementViewArena {
        ElementViewArena {
            views: vec![ElementView {
                tag: "p".to_owned(),
                id: Some("x".to_owned()),
                index_in_parent: 0,
                sibling_count: 1,
                ..Default::default()
            }],
        }
    }

    #[test]
    fn source_order_tie_break_picks_later_rule() {
        let sheet = parse_stylesheet("p { color: red } p { color: blue }");
        let arena = single_p_arena();
        let style = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        assert_eq!(style.color, browser_core::Color::parse("blue").unwrap());
    }

    #[test]
    fn important_beats_higher_specificity_normal_rule() {
        let sheet = parse_stylesheet("p { color: red !important } p#x { color: blue }");
        let arena = single_p_arena();
        let style = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        assert_eq!(style.color, browser_core::Color::parse("red").unwrap());
    }

    #[test]
    fn font_size_em_resolves_against_parent() {
        let sheet = parse_stylesheet("p { font-size: 2em }");
        let arena = single_p_arena();
        let mut parent = ComputedStyle::initial();
        parent.font_size = 10.0;
        let style = resolve_style(&arena, 0, Some(&parent), &[&sheet], None, (800.0, 600.0));
        assert_eq!(style.font_size, 20.0);
    }

    #[test]
    fn pseudo_element_absent_without_content_declaration() {
        let sheet = parse_stylesheet("p::before { color: red }");
        let arena = single_p_arena();
        let own = ComputedStyle::initial();
        assert!(resolve_pseudo_element(&arena, 0, &own, &[&sheet], "before", (800.0, 600.0)).is_none());
    }

    #[test]
    fn pseudo_element_present_with_content_declaration() {
        let sheet = parse_stylesheet("p::before { content: \"> \"; color: red }");
        let arena = single_p_arena();
        let own = ComputedStyle::initial();
        let (style, content) = resolve_pseudo_element(&arena, 0, &own, &[&sheet], "before", (800.0, 600.0)).unwrap();
        assert_eq!(style.color, browser_core::Color::parse("red").unwrap());
        assert_eq!(content, CssValue::String("> ".to_owned()));
    }

    #[test]
    fn box_shadow_parses_offsets_blur_and_color() {
        let sheet = parse_stylesheet("p { box-shadow: 2px 3px 4px red }");
        let arena = single_p_arena();
        let style = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        let shadow = style.box_shadow.expect("box-shadow should parse");
        assert_eq!(shadow.offset_x, 2.0);
        assert_eq!(shadow.offset_y, 3.0);
        assert_eq!(shadow.blur_radius, 4.0);
        assert_eq!(shadow.color, browser_core::Color::parse("red").unwrap());
        assert!(!shadow.inset);
    }

    #[test]
    fn transform_translate_parses_both_axes() {
        let sheet = parse_stylesheet("p { transform: translate(10px, 20px) }");
        let arena = single_p_arena();
        let style = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        assert_eq!(style.transform, Some(crate::computed::TransformOp::Translate(10.0, 20.0)));
    }

    #[test]
    fn linear_gradient_with_explicit_angle_and_stops() {
        let sheet = parse_stylesheet("p { background-image: linear-gradient(90deg, red, blue) }");
        let arena = single_p_arena();
        let style = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        let Some(crate::computed::Gradient::Linear { angle_degrees, stops }) = style.background_gradient else {
            panic!("expected a linear gradient");
        };
        assert_eq!(angle_degrees, 90.0);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].0, browser_core::Color::parse("red").unwrap());
        assert_eq!(stops[1].1, 1.0);
    }

    #[test]
    fn media_query_gated_rule_only_applies_when_matched() {
        let sheet = parse_stylesheet("@media (min-width: 900px) { p { color: green } }");
        let arena = single_p_arena();
        let narrow = resolve_style(&arena, 0, None, &[&sheet], None, (800.0, 600.0));
        assert_eq!(narrow.color, browser_core::Color::BLACK);
        let wide = resolve_style(&arena, 0, None, &[&sheet], None, (1000.0, 600.0));
        assert_eq!(wide.color, browser_core::Color::parse("green").unwrap());
    }

    #[test]
    fn selection_pseudo_element_reports_color_and_background() {
        let sheet = parse_stylesheet("::selection { color: white; background-color: blue }");
        let (color, background) = resolve_selection_colors(&[&sheet], (800.0, 600.0));
        assert_eq!(color, browser_core::Color::parse("white"));
        assert_eq!(background, browser_core::Color::parse("blue"));
    }

    #[test]
    fn no_selection_rule_resolves_to_none() {
        let sheet = parse_stylesheet("p { color: red }");
        let (color, background) = resolve_selection_colors(&[&sheet], (800.0, 600.0));
        assert_eq!(color, None);
        assert_eq!(background, None);
    }
}
