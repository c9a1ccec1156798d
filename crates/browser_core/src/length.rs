//! CSS length and calc() value representation shared by the style resolver and layout engine.

/// A resolved CSS length, still tagged by unit until it is resolved against a context
/// (containing-block size, font metrics, viewport).
#[derive(Debug, Clone, PartialEq)]
pub enum Length {
    Px(f32),
    Em(f32),
    Rem(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
    Vmin(f32),
    Vmax(f32),
    Ch(f32),
    Lh(f32),
    /// A grid `fr` track share; meaningless outside grid-track resolution, where it
    /// resolves to `None` just like `Auto` (the grid layout context resolves it itself).
    Fr(f32),
    Auto,
    Zero,
    Calc(Box<CalcExpr>),
}

impl Default for Length {
    fn default() -> Self {
        Self::Auto
    }
}

/// The context a `Length` is resolved against. All fields are pixel values already
/// resolved for the current box; `root_font_size` backs `rem`, `font_size` backs `em`/`ch`.
#[derive(Debug, Clone, Copy)]
pub struct LengthContext {
    pub containing_size: f32,
    pub font_size: f32,
    pub root_font_size: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub line_height: f32,
}

impl Length {
    /// Resolve to a pixel value. `Auto` resolves to `None` so callers can distinguish
    /// "explicitly zero" from "not specified".
    pub fn resolve(&self, ctx: &LengthContext) -> Option<f32> {
        match self {
            Self::Px(value) => Some(*value),
            Self::Em(value) => Some(value * ctx.font_size),
            Self::Rem(value) => Some(value * ctx.root_font_size),
            Self::Percent(value) => Some(ctx.containing_size * value / 100.0),
            Self::Vw(value) => Some(ctx.viewport_width * value / 100.0),
            Self::Vh(value) => Some(ctx.viewport_height * value / 100.0),
            Self::Vmin(value) => Some(ctx.viewport_width.min(ctx.viewport_height) * value / 100.0),
            Self::Vmax(value) => Some(ctx.viewport_width.max(ctx.viewport_height) * value / 100.0),
            Self::Ch(value) => Some(value * ctx.font_size * 0.5),
            Self::Lh(value) => Some(value * ctx.line_height),
            Self::Zero => Some(0.0),
            Self::Auto | Self::Fr(_) => None,
            Self::Calc(expr) => expr.eval(ctx),
        }
    }

    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// A `calc()` expression tree. Evaluation short-circuits to `None` (treated as the
/// property's initial value by the caller) if any leaf is `Auto`, matching how the
/// rest of the resolver treats unresolved lengths.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcExpr {
    Value(Box<Length>),
    Add(Box<CalcExpr>, Box<CalcExpr>),
    Sub(Box<CalcExpr>, Box<CalcExpr>),
    Mul(Box<CalcExpr>, f32),
    Div(Box<CalcExpr>, f32),
    Min(Vec<CalcExpr>),
    Max(Vec<CalcExpr>),
    Clamp(Box<CalcExpr>, Box<CalcExpr>, Box<CalcExpr>),
    Sin(Box<CalcExpr>),
    Cos(Box<CalcExpr>),
    Pow(Box<CalcExpr>, f32),
    Sqrt(Box<CalcExpr>),
}

impl CalcExpr {
    pub fn eval(&self, ctx: &LengthContext) -> Option<f32> {
        match self {
            Self::Value(length) => length.resolve(ctx),
            Self::Add(lhs, rhs) => Some(lhs.eval(ctx)? + rhs.eval(ctx)?),
            Self::Sub(lhs, rhs) => Some(lhs.eval(ctx)? - rhs.eval(ctx)?),
            Self::Mul(lhs, factor) => Some(lhs.eval(ctx)? * factor),
            Self::Div(lhs, divisor) if *divisor != 0.0 => Some(lhs.eval(ctx)? / divisor),
            Self::Div(..) => None,
            Self::Min(items) => items.iter().filter_map(|item| item.eval(ctx)).reduce(f32::min),
            Self::Max(items) => items.iter().filter_map(|item| item.eval(ctx)).reduce(f32::max),
            Self::Clamp(min, value, max) => {
                let min = min.eval(ctx)?;
                let value = value.eval(ctx)?;
                let max = max.eval(ctx)?;
                Some(value.clamp(min, max))
            }
            Self::Sin(inner) => Some(inner.eval(ctx)?.sin()),
            Self::Cos(inner) => Some(inner.eval(ctx)?.cos()),
            Self::Pow(inner, exponent) => Some(inner.eval(ctx)?.powf(*exponent)),
            Self::Sqrt(inner) => Some(inner.eval(ctx)?.sqrt()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LengthContext {
        LengthContext {
            containing_size: 800.0,
            font_size: 16.0,
            root_font_size: 16.0,
            viewport_width: 1024.0,
            viewport_height: 768.0,
            line_height: 20.0,
        }
    }

    #[test]
    fn percent_resolves_against_containing_size() {
        assert_eq!(Length::Percent(50.0).resolve(&ctx()), Some(400.0));
    }

    #[test]
    fn auto_resolves_to_none() {
        assert_eq!(Length::Auto.resolve(&ctx()), None);
    }

    #[test]
    fn calc_add_of_px_and_percent() {
        let expr = CalcExpr::Add(
            Box::new(CalcExpr::Value(Box::new(Length::Px(10.0)))),
            Box::new(CalcExpr::Value(Box::new(Length::Percent(10.0)))),
        );
        assert_eq!(Length::Calc(Box::new(expr)).resolve(&ctx()), Some(90.0));
    }

    #[test]
    fn calc_div_by_zero_is_none() {
        let expr = CalcExpr::Div(Box::new(CalcExpr::Value(Box::new(Length::Px(10.0)))), 0.0);
        assert_eq!(expr.eval(&ctx()), None);
    }
}
