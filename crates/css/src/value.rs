//! Declaration values: the right-hand side of a CSS property. Kept as a small tagged
//! union covering the value shapes the layout/paint stages actually consume, plus a raw
//! `Tokens` fallback for properties this pipeline doesn't interpret.

use browser_core::{Color, Length};

use crate::tokenizer::CssToken;

#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    Keyword(String),
    Length(Length),
    Number(f64),
    Color(Color),
    /// `var(--name, <fallback tokens>)`; resolved against the custom-property map
    /// during cascade, per the original property-resolution contract.
    VarRef { name: String, fallback: Option<Box<CssValue>> },
    /// A comma- or space-separated list (`font-family`, `grid-template-columns`, box
    /// shadows, ...), kept as nested values rather than re-tokenizing downstream.
    List(Vec<CssValue>),
    String(String),
    /// Anything this resolver doesn't give special meaning to; retained for custom
    /// properties and properties outside layout/paint's vocabulary.
    Tokens(Vec<CssToken>),
}

impl CssValue {
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Self::Keyword(keyword) => Some(keyword.as_str()),
            _ => None,
        }
    }

    pub fn as_length(&self) -> Option<Length> {
        match self {
            Self::Length(length) => Some(length.clone()),
            Self::Number(number) if number.abs() < f64::EPSILON => Some(Length::Zero),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(color.clone()),
            Self::Keyword(keyword) => Color::parse(keyword),
            _ => None,
        }
    }
}

/// Parse a unit suffix from a CSS dimension token into a `Length` variant. Unknown
/// units fall back to `Px`, matching the original engine's lenient unit handling.
pub fn length_from_dimension(value: f64, unit: &str) -> Length {
    match unit.to_ascii_lowercase().as_str() {
        "em" => Length::Em(value),
        "rem" => Length::Rem(value),
        "vw" => Length::Vw(value),
        "vh" => Length::Vh(value),
        "vmin" => Length::Vmin(value),
        "vmax" => Length::Vmax(value),
        "ch" => Length::Ch(value),
        "lh" => Length::Lh(value),
        "fr" => Length::Fr(value),
        _ => Length::Px(value),
    }
}
