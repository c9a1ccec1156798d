//! Stylesheet and selector parsing: turns a `CssToken` stream into a `SelectorList`, a
//! `DeclarationBlock`, or a full `StyleSheet` with at-rules. The parser degrades rather
//! than errors: a malformed selector drops its rule, a malformed declaration drops that
//! declaration, and an unterminated block is closed at end-of-file.

use browser_core::Color;

use crate::rule::{AtRule, Declaration, DeclarationBlock, StyleRule, StyleSheet};
use crate::selector::{
    AnB, AttributeMatcher, Combinator, CompoundSelector, PseudoClass, SelectorList, SimpleSelector,
};
use crate::tokenizer::{CssToken, CssTokenizer};
use crate::value::{length_from_dimension, CssValue};

/// Tokenize `source` in full, including `Whitespace` tokens (selector parsing needs
/// them to detect the implicit descendant combinator) but with a trailing `Eof`
/// stripped, since callers slice by position instead of sentinel.
fn tokenize_all(source: &str) -> Vec<CssToken> {
    let mut tokenizer = CssTokenizer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        if token == CssToken::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn is_whitespace(token: &CssToken) -> bool {
    matches!(token, CssToken::Whitespace)
}

/// Split `tokens` on a top-level (paren-balanced) delimiter, e.g. `,` between
/// selectors or declarations.
fn split_top_level(tokens: &[CssToken], is_separator: impl Fn(&CssToken) -> bool) -> Vec<Vec<CssToken>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    for token in tokens {
        match token {
            CssToken::LeftParen | CssToken::LeftBracket | CssToken::LeftBrace => depth += 1,
            CssToken::RightParen | CssToken::RightBracket | CssToken::RightBrace => depth -= 1,
            _ => {}
        }
        if depth == 0 && is_separator(token) {
            groups.push(std::mem::take(&mut current));
            continue;
        }
        current.push(token.clone());
    }
    groups.push(current);
    groups
}

fn trim_whitespace(tokens: &[CssToken]) -> &[CssToken] {
    let start = tokens.iter().position(|token| !is_whitespace(token)).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|token| !is_whitespace(token)).map_or(start, |index| index + 1);
    &tokens[start..end]
}

/// Parse a full selector list (`h1, .foo > .bar`) from already-tokenized text.
pub fn parse_selector_list(tokens: &[CssToken]) -> SelectorList {
    split_top_level(tokens, |token| *token == CssToken::Comma)
        .into_iter()
        .filter_map(|group| parse_complex_selector(trim_whitespace(&group)))
        .collect()
}

fn is_combinator_delim(token: &CssToken) -> Option<Combinator> {
    match token {
        CssToken::Delim('>') => Some(Combinator::Child),
        CssToken::Delim('+') => Some(Combinator::NextSibling),
        CssToken::Delim('~') => Some(Combinator::SubsequentSibling),
        _ => None,
    }
}

/// Parse one complex selector (no top-level commas). Returns `None` if no compound
/// could be parsed at all (e.g. empty input), which drops the containing rule.
fn parse_complex_selector(tokens: &[CssToken]) -> Option<crate::selector::ComplexSelector> {
    let mut compounds = Vec::new();
    let mut index = 0;
    let mut pending_combinator: Option<Combinator> = None;
    let mut saw_whitespace = false;

    while index < tokens.len() {
        match &tokens[index] {
            CssToken::Whitespace => {
                saw_whitespace = true;
                index += 1;
            }
            token if is_combinator_delim(token).is_some() => {
                pending_combinator = is_combinator_delim(token);
                saw_whitespace = false;
                index += 1;
            }
            _ => {
                let start = index;
                let (compound, consumed) = parse_compound(&tokens[start..]);
                index += consumed.max(1);
                if compound.simple_selectors.is_empty() {
                    continue;
                }
                let combinator = if compounds.is_empty() {
                    None
                } else if let Some(explicit) = pending_combinator.take() {
                    Some(explicit)
                } else if saw_whitespace {
                    Some(Combinator::Descendant)
                } else {
                    Some(Combinator::Descendant)
                };
                compounds.push((combinator, compound));
                saw_whitespace = false;
            }
        }
    }

    if compounds.is_empty() {
        None
    } else {
        Some(crate::selector::ComplexSelector { compounds })
    }
}

/// Parse one compound selector starting at `tokens[0]`; returns the compound plus how
/// many tokens were consumed.
fn parse_compound(tokens: &[CssToken]) -> (CompoundSelector, usize) {
    let mut simples = smallvec::SmallVec::new();
    let mut index = 0;

    while index < tokens.len() {
        match &tokens[index] {
            CssToken::Delim('*') => {
                simples.push(SimpleSelector::Universal);
                index += 1;
            }
            CssToken::Ident(name) => {
                simples.push(SimpleSelector::Type(name.clone()));
                index += 1;
            }
            CssToken::Hash { value, is_id: true } => {
                simples.push(SimpleSelector::Id(value.clone()));
                index += 1;
            }
            CssToken::Delim('.') => {
                index += 1;
                if let Some(CssToken::Ident(name)) = tokens.get(index) {
                    simples.push(SimpleSelector::Class(name.clone()));
                    index += 1;
                }
            }
            CssToken::LeftBracket => {
                let close = find_matching(tokens, index, CssToken::LeftBracket, CssToken::RightBracket);
                let inner = &tokens[index + 1..close.unwrap_or(tokens.len())];
                simples.push(parse_attribute_selector(inner));
                index = close.map_or(tokens.len(), |pos| pos + 1);
            }
            CssToken::Colon => {
                index += 1;
                let is_pseudo_element = matches!(tokens.get(index), Some(CssToken::Colon));
                if is_pseudo_element {
                    index += 1;
                }
                match tokens.get(index) {
                    Some(CssToken::Ident(name)) => {
                        index += 1;
                        if is_pseudo_element {
                            simples.push(SimpleSelector::PseudoElement(name.clone()));
                        } else {
                            simples.push(SimpleSelector::PseudoClass(parse_pseudo_class(name, &[])));
                        }
                    }
                    Some(CssToken::Function(name)) => {
                        let name = name.clone();
                        index += 1;
                        let close = find_matching_from(tokens, index, CssToken::RightParen);
                        let inner = &tokens[index..close.unwrap_or(tokens.len())];
                        index = close.map_or(tokens.len(), |pos| pos + 1);
                        if is_pseudo_element {
                            simples.push(SimpleSelector::PseudoElement(name));
                        } else {
                            simples.push(SimpleSelector::PseudoClass(parse_pseudo_class(&name, inner)));
                        }
                    }
                    _ => {}
                }
            }
            _ => break,
        }
    }

    (CompoundSelector { simple_selectors: simples }, index)
}

/// Find the index of the token that closes a bracket opened at `open_index`
/// (inclusive of the opening token itself, which must equal `open`).
fn find_matching(tokens: &[CssToken], open_index: usize, open: CssToken, close: CssToken) -> Option<usize> {
    let mut depth = 0i32;
    for (offset, token) in tokens.iter().enumerate().skip(open_index) {
        if *token == open {
            depth += 1;
        } else if *token == close {
            depth -= 1;
            if depth == 0 {
                return Some(offset);
            }
        }
    }
    None
}

/// Find the `RightParen` matching a function/paren opened just before `start_index`
/// (i.e. `start_index` is already inside the parens, at depth 1).
fn find_matching_from(tokens: &[CssToken], start_index: usize, close: CssToken) -> Option<usize> {
    let mut depth = 1i32;
    for (offset, token) in tokens.iter().enumerate().skip(start_index) {
        match token {
            CssToken::LeftParen | CssToken::Function(_) => depth += 1,
            token if *token == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_attribute_selector(tokens: &[CssToken]) -> SimpleSelector {
    let tokens = trim_whitespace(tokens);
    let Some(CssToken::Ident(name)) = tokens.first() else {
        return SimpleSelector::Attribute { name: String::new(), matcher: AttributeMatcher::Exists };
    };
    let name = name.clone();
    if tokens.len() == 1 {
        return SimpleSelector::Attribute { name, matcher: AttributeMatcher::Exists };
    }

    let rest = trim_whitespace(&tokens[1..]);
    let (op, value_tokens) = match rest.first() {
        Some(CssToken::Delim('=')) => ("=", &rest[1..]),
        Some(CssToken::Delim('~')) if matches!(rest.get(1), Some(CssToken::Delim('='))) => ("~=", &rest[2..]),
        Some(CssToken::Delim('|')) if matches!(rest.get(1), Some(CssToken::Delim('='))) => ("|=", &rest[2..]),
        Some(CssToken::Delim('^')) if matches!(rest.get(1), Some(CssToken::Delim('='))) => ("^=", &rest[2..]),
        Some(CssToken::Delim('$')) if matches!(rest.get(1), Some(CssToken::Delim('='))) => ("$=", &rest[2..]),
        Some(CssToken::Delim('*')) if matches!(rest.get(1), Some(CssToken::Delim('='))) => ("*=", &rest[2..]),
        _ => return SimpleSelector::Attribute { name, matcher: AttributeMatcher::Exists },
    };

    let value_tokens = trim_whitespace(value_tokens);
    let value = match value_tokens.first() {
        Some(CssToken::String(text)) => text.clone(),
        Some(CssToken::Ident(text)) => text.clone(),
        _ => String::new(),
    };

    let matcher = match op {
        "=" => AttributeMatcher::Equals(value),
        "~=" => AttributeMatcher::Includes(value),
        "|=" => AttributeMatcher::DashMatch(value),
        "^=" => AttributeMatcher::Prefix(value),
        "$=" => AttributeMatcher::Suffix(value),
        "*=" => AttributeMatcher::Substring(value),
        _ => AttributeMatcher::Exists,
    };
    SimpleSelector::Attribute { name, matcher }
}

fn parse_pseudo_class(name: &str, argument_tokens: &[CssToken]) -> PseudoClass {
    let argument_text: String = raw_text(argument_tokens);
    match name.to_ascii_lowercase().as_str() {
        "hover" => PseudoClass::Hover,
        "active" => PseudoClass::Active,
        "focus" => PseudoClass::Focus,
        "focus-within" => PseudoClass::FocusWithin,
        "visited" => PseudoClass::Visited,
        "link" => PseudoClass::Link,
        "checked" => PseudoClass::Checked,
        "disabled" => PseudoClass::Disabled,
        "enabled" => PseudoClass::Enabled,
        "root" => PseudoClass::Root,
        "empty" => PseudoClass::Empty,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "nth-child" => PseudoClass::NthChild(AnB::parse(&argument_text).unwrap_or(AnB { a: 0, b: 0 })),
        "nth-last-child" => PseudoClass::NthLastChild(AnB::parse(&argument_text).unwrap_or(AnB { a: 0, b: 0 })),
        "nth-of-type" => PseudoClass::NthOfType(AnB::parse(&argument_text).unwrap_or(AnB { a: 0, b: 0 })),
        "nth-last-of-type" => PseudoClass::NthLastOfType(AnB::parse(&argument_text).unwrap_or(AnB { a: 0, b: 0 })),
        "not" => PseudoClass::Not(parse_selector_list(argument_tokens)),
        "is" => PseudoClass::Is(parse_selector_list(argument_tokens)),
        "where" => PseudoClass::Where(parse_selector_list(argument_tokens)),
        "matches" => PseudoClass::Matches(parse_selector_list(argument_tokens)),
        "has" => PseudoClass::Has(parse_selector_list(argument_tokens)),
        other => PseudoClass::Other(other.to_owned()),
    }
}

/// Best-effort reconstruction of the source text for a token slice; used for
/// pseudo-class arguments (`:lang(en)`) and color functions (`rgba(...)`) where the
/// resolver wants the literal text rather than re-derived structure.
fn raw_text(tokens: &[CssToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            CssToken::Ident(text) | CssToken::String(text) | CssToken::Function(text) => out.push_str(text),
            CssToken::AtKeyword(text) => {
                out.push('@');
                out.push_str(text);
            }
            CssToken::Hash { value, .. } => {
                out.push('#');
                out.push_str(value);
            }
            CssToken::Number { value, .. } => out.push_str(&value.to_string()),
            CssToken::Percentage { value, .. } => {
                out.push_str(&value.to_string());
                out.push('%');
            }
            CssToken::Dimension { value, unit, .. } => {
                out.push_str(&value.to_string());
                out.push_str(unit);
            }
            CssToken::Whitespace => out.push(' '),
            CssToken::Colon => out.push(':'),
            CssToken::Semicolon => out.push(';'),
            CssToken::Comma => out.push(','),
            CssToken::LeftParen => out.push('('),
            CssToken::RightParen => out.push(')'),
            CssToken::LeftBrace => out.push('{'),
            CssToken::RightBrace => out.push('}'),
            CssToken::LeftBracket => out.push('['),
            CssToken::RightBracket => out.push(']'),
            CssToken::Delim(ch) => out.push(*ch),
            CssToken::Cdo | CssToken::Cdc | CssToken::Eof => {}
        }
    }
    out
}

/// Parse a `style=""` attribute's raw text directly into a `DeclarationBlock`,
/// reusing the declaration-list grammar a rule body uses (§4.4: "An element's `style`
/// attribute is parsed with the same declaration-list grammar").
pub fn parse_inline_style(source: &str) -> DeclarationBlock {
    parse_declaration_block(&tokenize_all(source))
}

/// Parse a declaration-list body (the inside of a rule's `{ ... }`, or a `style=""`
/// attribute value) into a `DeclarationBlock`.
pub fn parse_declaration_block(tokens: &[CssToken]) -> DeclarationBlock {
    let declarations = split_top_level(tokens, |token| *token == CssToken::Semicolon)
        .into_iter()
        .filter_map(|group| parse_one_declaration(trim_whitespace(&group)))
        .collect();
    DeclarationBlock { declarations }
}

fn parse_one_declaration(tokens: &[CssToken]) -> Option<Declaration> {
    let colon = tokens.iter().position(|token| *token == CssToken::Colon)?;
    let CssToken::Ident(property) = &tokens[0] else { return None };
    let mut value_tokens = trim_whitespace(&tokens[colon + 1..]).to_vec();

    let mut important = false;
    if let Some(bang) = value_tokens.iter().rposition(|token| *token == CssToken::Delim('!')) {
        let tail: Vec<&CssToken> = value_tokens[bang + 1..].iter().filter(|token| !is_whitespace(token)).collect();
        if tail.len() == 1 && matches!(tail[0], CssToken::Ident(name) if name.eq_ignore_ascii_case("important")) {
            important = true;
            value_tokens.truncate(bang);
            value_tokens = trim_whitespace(&value_tokens).to_vec();
        }
    }

    Some(Declaration { property: property.to_ascii_lowercase(), value: parse_value(&value_tokens), important })
}

/// Parse a declaration's value tokens into a `CssValue`. A top-level comma produces a
/// `List`; a single dimension/number/color/keyword/string/function is parsed directly.
fn parse_value(tokens: &[CssToken]) -> CssValue {
    let groups = split_top_level(tokens, |token| *token == CssToken::Comma);
    if groups.len() > 1 {
        return CssValue::List(groups.into_iter().map(|group| parse_value(trim_whitespace(&group))).collect());
    }

    let tokens = trim_whitespace(tokens);
    let non_whitespace: Vec<&CssToken> = tokens.iter().filter(|token| !is_whitespace(token)).collect();

    if non_whitespace.len() > 1 {
        // Space-separated component list (e.g. shorthand `margin: 1px 2px`); keep each
        // component resolvable rather than collapsing to a single scalar.
        let parts = split_top_level(tokens, is_whitespace);
        return CssValue::List(parts.into_iter().filter(|p| !p.is_empty()).map(|p| parse_value(&p)).collect());
    }

    match non_whitespace.first() {
        Some(CssToken::Dimension { value, unit, .. }) => CssValue::Length(length_from_dimension(*value, unit)),
        Some(CssToken::Percentage { value, .. }) => CssValue::Length(browser_core::Length::Percent(*value as f32)),
        Some(CssToken::Number { value, .. }) => {
            if value.abs() < f64::EPSILON {
                CssValue::Length(browser_core::Length::Zero)
            } else {
                CssValue::Number(*value)
            }
        }
        Some(CssToken::String(text)) => CssValue::String(text.clone()),
        Some(CssToken::Hash { value, .. }) => {
            Color::parse(&format!("#{value}")).map_or_else(|| CssValue::Keyword(value.clone()), CssValue::Color)
        }
        Some(CssToken::Function(name)) if name.eq_ignore_ascii_case("var") => parse_var_function(tokens),
        Some(CssToken::Function(name)) if name.eq_ignore_ascii_case("calc") => parse_calc_function(tokens)
            .map_or_else(|| CssValue::Tokens(tokens.to_vec()), |expr| CssValue::Length(browser_core::Length::Calc(Box::new(expr)))),
        Some(CssToken::Function(name))
            if matches!(name.to_ascii_lowercase().as_str(), "rgb" | "rgba" | "hsl" | "hsla") =>
        {
            let text = raw_text(tokens);
            Color::parse(&text).map_or(CssValue::Keyword(text), CssValue::Color)
        }
        Some(CssToken::Function(_)) => CssValue::Tokens(tokens.to_vec()),
        Some(CssToken::Ident(name)) => {
            Color::parse(name).map_or_else(|| CssValue::Keyword(name.clone()), CssValue::Color)
        }
        _ => CssValue::Tokens(tokens.to_vec()),
    }
}

fn parse_var_function(tokens: &[CssToken]) -> CssValue {
    // tokens = [Function("var"), ... , RightParen]
    let inner = &tokens[1..tokens.len().saturating_sub(1)];
    let groups = split_top_level(inner, |token| *token == CssToken::Comma);
    let name_tokens = trim_whitespace(groups.first().map_or(&[][..], |g| g.as_slice()));
    let Some(CssToken::Ident(name)) = name_tokens.first() else {
        return CssValue::Keyword(String::new());
    };
    let fallback = groups.get(1).map(|group| Box::new(parse_value(trim_whitespace(group))));
    CssValue::VarRef { name: name.clone(), fallback }
}

/// An intermediate `calc()` parse result: a bare number (the right-hand side of `*`/`/`)
/// hasn't committed to a unit yet, while a length-bearing subexpression has.
enum CalcTerm {
    Expr(browser_core::CalcExpr),
    Number(f32),
}

/// `tokens[start]` is a `Function` token; finds its matching `RightParen` (tracking
/// nested functions/parens as additional depth) and returns its comma-split argument
/// groups plus the index just past the close paren.
fn find_function_args(tokens: &[CssToken], start: usize) -> Option<(Vec<Vec<CssToken>>, usize)> {
    let mut depth = 1i32;
    let mut index = start + 1;
    while index < tokens.len() {
        match tokens[index] {
            CssToken::Function(_) | CssToken::LeftParen => depth += 1,
            CssToken::RightParen => {
                depth -= 1;
                if depth == 0 {
                    let args = split_top_level(&tokens[start + 1..index], |token| *token == CssToken::Comma);
                    return Some((args, index + 1));
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

fn parse_calc_value(tokens: &[CssToken], pos: &mut usize) -> Option<CalcTerm> {
    match tokens.get(*pos)? {
        CssToken::Number { value, .. } => {
            *pos += 1;
            Some(CalcTerm::Number(*value as f32))
        }
        CssToken::Dimension { value, unit, .. } => {
            *pos += 1;
            Some(CalcTerm::Expr(browser_core::CalcExpr::Value(Box::new(length_from_dimension(*value, unit)))))
        }
        CssToken::Percentage { value, .. } => {
            *pos += 1;
            Some(CalcTerm::Expr(browser_core::CalcExpr::Value(Box::new(browser_core::Length::Percent(*value as f32)))))
        }
        CssToken::LeftParen => {
            *pos += 1;
            let inner = parse_calc_sum(tokens, pos)?;
            if tokens.get(*pos) != Some(&CssToken::RightParen) {
                return None;
            }
            *pos += 1;
            Some(inner)
        }
        CssToken::Function(name) => {
            let lower = name.to_ascii_lowercase();
            let (args, next) = find_function_args(tokens, *pos)?;
            *pos = next;
            parse_calc_function_call(&lower, &args)
        }
        _ => None,
    }
}

fn parse_calc_product(tokens: &[CssToken], pos: &mut usize) -> Option<CalcTerm> {
    let mut lhs = parse_calc_value(tokens, pos)?;
    loop {
        match tokens.get(*pos) {
            Some(CssToken::Delim('*')) => {
                *pos += 1;
                lhs = calc_mul(lhs, parse_calc_value(tokens, pos)?)?;
            }
            Some(CssToken::Delim('/')) => {
                *pos += 1;
                lhs = calc_div(lhs, parse_calc_value(tokens, pos)?)?;
            }
            _ => break,
        }
    }
    Some(lhs)
}

fn parse_calc_sum(tokens: &[CssToken], pos: &mut usize) -> Option<CalcTerm> {
    let mut lhs = parse_calc_product(tokens, pos)?;
    loop {
        match tokens.get(*pos) {
            Some(CssToken::Delim('+')) => {
                *pos += 1;
                lhs = calc_add(lhs, parse_calc_product(tokens, pos)?)?;
            }
            Some(CssToken::Delim('-')) => {
                *pos += 1;
                lhs = calc_sub(lhs, parse_calc_product(tokens, pos)?)?;
            }
            _ => break,
        }
    }
    Some(lhs)
}

fn calc_add(lhs: CalcTerm, rhs: CalcTerm) -> Option<CalcTerm> {
    match (lhs, rhs) {
        (CalcTerm::Expr(a), CalcTerm::Expr(b)) => Some(CalcTerm::Expr(browser_core::CalcExpr::Add(Box::new(a), Box::new(b)))),
        (CalcTerm::Number(a), CalcTerm::Number(b)) => Some(CalcTerm::Number(a + b)),
        _ => None,
    }
}

fn calc_sub(lhs: CalcTerm, rhs: CalcTerm) -> Option<CalcTerm> {
    match (lhs, rhs) {
        (CalcTerm::Expr(a), CalcTerm::Expr(b)) => Some(CalcTerm::Expr(browser_core::CalcExpr::Sub(Box::new(a), Box::new(b)))),
        (CalcTerm::Number(a), CalcTerm::Number(b)) => Some(CalcTerm::Number(a - b)),
        _ => None,
    }
}

fn calc_mul(lhs: CalcTerm, rhs: CalcTerm) -> Option<CalcTerm> {
    match (lhs, rhs) {
        (CalcTerm::Expr(expr), CalcTerm::Number(factor)) | (CalcTerm::Number(factor), CalcTerm::Expr(expr)) => {
            Some(CalcTerm::Expr(browser_core::CalcExpr::Mul(Box::new(expr), factor)))
        }
        (CalcTerm::Number(a), CalcTerm::Number(b)) => Some(CalcTerm::Number(a * b)),
        (CalcTerm::Expr(_), CalcTerm::Expr(_)) => None,
    }
}

fn calc_div(lhs: CalcTerm, rhs: CalcTerm) -> Option<CalcTerm> {
    match (lhs, rhs) {
        (CalcTerm::Expr(expr), CalcTerm::Number(divisor)) => Some(CalcTerm::Expr(browser_core::CalcExpr::Div(Box::new(expr), divisor))),
        (CalcTerm::Number(a), CalcTerm::Number(b)) if b != 0.0 => Some(CalcTerm::Number(a / b)),
        _ => None,
    }
}

fn parse_calc_arg(tokens: &[CssToken]) -> Option<CalcTerm> {
    let trimmed = trim_whitespace(tokens);
    let mut pos = 0;
    let term = parse_calc_sum(trimmed, &mut pos)?;
    (pos == trimmed.len()).then_some(term)
}

fn calc_term_to_expr(term: CalcTerm) -> Option<browser_core::CalcExpr> {
    match term {
        CalcTerm::Expr(expr) => Some(expr),
        CalcTerm::Number(_) => None,
    }
}

/// Dispatch a nested `calc()` function call (`min`/`max`/`clamp`/`sin`/`cos`/`pow`/
/// `sqrt`, or a nested `calc(...)` itself) on already comma-split argument groups.
fn parse_calc_function_call(name: &str, args: &[Vec<CssToken>]) -> Option<CalcTerm> {
    match name {
        "calc" => parse_calc_arg(args.first()?),
        "min" | "max" => {
            let items: Vec<browser_core::CalcExpr> =
                args.iter().map(|group| calc_term_to_expr(parse_calc_arg(group)?)).collect::<Option<_>>()?;
            if items.is_empty() {
                return None;
            }
            Some(CalcTerm::Expr(if name == "min" { browser_core::CalcExpr::Min(items) } else { browser_core::CalcExpr::Max(items) }))
        }
        "clamp" => {
            let [min, value, max] = args else { return None };
            let min = calc_term_to_expr(parse_calc_arg(min)?)?;
            let value = calc_term_to_expr(parse_calc_arg(value)?)?;
            let max = calc_term_to_expr(parse_calc_arg(max)?)?;
            Some(CalcTerm::Expr(browser_core::CalcExpr::Clamp(Box::new(min), Box::new(value), Box::new(max))))
        }
        "sin" | "cos" | "sqrt" => {
            let inner = calc_term_to_expr(parse_calc_arg(args.first()?)?)?;
            Some(CalcTerm::Expr(match name {
                "sin" => browser_core::CalcExpr::Sin(Box::new(inner)),
                "cos" => browser_core::CalcExpr::Cos(Box::new(inner)),
                _ => browser_core::CalcExpr::Sqrt(Box::new(inner)),
            }))
        }
        "pow" => {
            let [base, exponent] = args else { return None };
            let base = calc_term_to_expr(parse_calc_arg(base)?)?;
            let CalcTerm::Number(exponent) = parse_calc_arg(exponent)? else { return None };
            Some(CalcTerm::Expr(browser_core::CalcExpr::Pow(Box::new(base), exponent)))
        }
        _ => None,
    }
}

/// Parse a `calc(...)` value's inner token stream into a `CalcExpr` tree, or `None` if
/// it isn't a well-formed arithmetic expression (the caller then keeps the raw tokens).
fn parse_calc_function(tokens: &[CssToken]) -> Option<browser_core::CalcExpr> {
    // tokens = [Function("calc"), ... , RightParen]
    let inner: Vec<CssToken> = tokens[1..tokens.len().saturating_sub(1)].iter().filter(|token| !is_whitespace(token)).cloned().collect();
    calc_term_to_expr(parse_calc_arg(&inner)?)
}

/// Parse a full stylesheet (rules plus `@media`/`@font-face`/... at-rules).
pub fn parse_stylesheet(source: &str) -> StyleSheet {
    let tokens = tokenize_all(source);
    let mut sheet = StyleSheet::default();
    let mut index = 0;

    while index < tokens.len() {
        if is_whitespace(&tokens[index]) {
            index += 1;
            continue;
        }
        if let CssToken::AtKeyword(name) = &tokens[index] {
            let name = name.clone();
            index += 1;
            let prelude_start = index;
            while index < tokens.len() && tokens[index] != CssToken::LeftBrace && tokens[index] != CssToken::Semicolon {
                index += 1;
            }
            let prelude = &tokens[prelude_start..index];

            if tokens.get(index) == Some(&CssToken::Semicolon) {
                index += 1;
                sheet.at_rules.push(AtRule::Other { name });
                continue;
            }

            let Some(close) = find_matching(&tokens, index, CssToken::LeftBrace, CssToken::RightBrace) else {
                break;
            };
            let body = &tokens[index + 1..close];
            index = close + 1;

            match name.to_ascii_lowercase().as_str() {
                "media" | "supports" => {
                    let condition_text = raw_text(prelude).trim().to_owned();
                    let inner_sheet = parse_rule_list(body);
                    sheet.at_rules.push(AtRule::Media { condition_text, rules: inner_sheet });
                }
                "font-face" => {
                    sheet.at_rules.push(AtRule::FontFace(parse_declaration_block(body)));
                }
                "keyframes" => {
                    let keyframe_name = raw_text(prelude).trim().to_owned();
                    sheet.at_rules.push(AtRule::Keyframes { name: keyframe_name });
                }
                _ => sheet.at_rules.push(AtRule::Other { name }),
            }
            continue;
        }

        let prelude_start = index;
        while index < tokens.len() && tokens[index] != CssToken::LeftBrace {
            if tokens[index] == CssToken::Semicolon {
                // Stray prelude with no block (malformed); skip it.
                index += 1;
                break;
            }
            index += 1;
        }
        let prelude = &tokens[prelude_start..index.min(tokens.len())];

        let Some(close) = find_matching(&tokens, index, CssToken::LeftBrace, CssToken::RightBrace) else {
            break;
        };
        let body = &tokens[index + 1..close];
        index = close + 1;

        let selectors = parse_selector_list(prelude);
        if selectors.is_empty() {
            continue;
        }
        let declarations = parse_declaration_block(body);
        sheet.rules.push(StyleRule { selectors, declarations });
    }

    sheet
}

/// Parse a `{ ... }`-delimited rule list (the body of `@media`), sharing the same
/// grammar as the top level minus further at-rule nesting awareness.
fn parse_rule_list(tokens: &[CssToken]) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        if is_whitespace(&tokens[index]) {
            index += 1;
            continue;
        }
        let prelude_start = index;
        while index < tokens.len() && tokens[index] != CssToken::LeftBrace {
            index += 1;
        }
        let prelude = &tokens[prelude_start..index];
        let Some(close) = find_matching(tokens, index, CssToken::LeftBrace, CssToken::RightBrace) else { break };
        let body = &tokens[index + 1..close];
        index = close + 1;

        let selectors = parse_selector_list(prelude);
        if selectors.is_empty() {
            continue;
        }
        rules.push(StyleRule { selectors, declarations: parse_declaration_block(body) });
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_rule() {
        let sheet = parse_stylesheet("p { color: blue; }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations.get("color").unwrap().value, CssValue::Color(Color::parse("blue").unwrap()));
    }

    #[test]
    fn parses_important_flag() {
        let sheet = parse_stylesheet("p { color: red !important; }");
        assert!(sheet.rules[0].declarations.get("color").unwrap().important);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse_selector_list(&tokenize_all("article .intro p"));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].compounds.len(), 3);
        assert_eq!(list[0].compounds[2].0, Some(Combinator::Descendant));

        let list = parse_selector_list(&tokenize_all("ul > li"));
        assert_eq!(list[0].compounds[1].0, Some(Combinator::Child));
    }

    #[test]
    fn parses_compound_with_id_class_and_attribute() {
        let list = parse_selector_list(&tokenize_all("div#main.active[data-x=\"1\"]"));
        let compound = &list[0].compounds[0].1;
        assert!(compound.simple_selectors.contains(&SimpleSelector::Type("div".to_owned())));
        assert!(compound.simple_selectors.contains(&SimpleSelector::Id("main".to_owned())));
        assert!(compound.simple_selectors.contains(&SimpleSelector::Class("active".to_owned())));
    }

    #[test]
    fn parses_nth_child_functional_pseudo_class() {
        let list = parse_selector_list(&tokenize_all("li:nth-child(odd)"));
        let compound = &list[0].compounds[0].1;
        assert!(compound.simple_selectors.iter().any(|s| matches!(s, SimpleSelector::PseudoClass(PseudoClass::NthChild(anb)) if *anb == AnB::odd())));
    }

    #[test]
    fn malformed_not_argument_parses_to_empty_list() {
        let list = parse_selector_list(&tokenize_all("p:not(  )"));
        let compound = &list[0].compounds[0].1;
        let PseudoClass::Not(inner) = compound.simple_selectors.iter().find_map(|s| match s {
            SimpleSelector::PseudoClass(PseudoClass::Not(list)) => Some(PseudoClass::Not(list.clone())),
            _ => None,
        }).unwrap() else { unreachable!() };
        assert!(inner.is_empty());
    }

    #[test]
    fn media_block_rules_are_preserved() {
        let sheet = parse_stylesheet("@media (min-width: 600px) { p { color: green; } }");
        assert_eq!(sheet.at_rules.len(), 1);
        let AtRule::Media { rules, .. } = &sheet.at_rules[0] else { panic!("expected media") };
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn unterminated_rule_is_dropped_not_fatal() {
        let sheet = parse_stylesheet("p { color: red; ");
        assert!(sheet.rules.is_empty() || sheet.rules[0].declarations.get("color").is_some());
    }

    #[test]
    fn calc_subtraction_parses_to_a_calc_length() {
        let sheet = parse_stylesheet("div { width: calc(100% - 20px); }");
        let value = &sheet.rules[0].declarations.get("width").unwrap().value;
        let CssValue::Length(browser_core::Length::Calc(expr)) = value else { panic!("expected a calc length, got {value:?}") };
        let ctx = browser_core::LengthContext {
            containing_size: 200.0,
            font_size: 16.0,
            root_font_size: 16.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            line_height: 20.0,
        };
        assert_eq!(expr.eval(&ctx), Some(180.0));
    }

    #[test]
    fn calc_with_nested_min_parses() {
        let sheet = parse_stylesheet("div { width: calc(min(50%, 300px) + 10px); }");
        let value = &sheet.rules[0].declarations.get("width").unwrap().value;
        assert!(matches!(value, CssValue::Length(browser_core::Length::Calc(_))));
    }

    #[test]
    fn malformed_calc_falls_back_to_raw_tokens() {
        let sheet = parse_stylesheet("div { width: calc(); }");
        let value = &sheet.rules[0].declarations.get("width").unwrap().value;
        assert!(matches!(value, CssValue::Tokens(_)));
    }
}
