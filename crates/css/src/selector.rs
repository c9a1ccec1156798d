//! Selector grammar: simple selectors combined into compound selectors, compound
//! selectors chained by combinators into a complex selector, and specificity
//! computation. The An+B micro-syntax used by `:nth-child()` and friends is parsed and
//! matched per the algorithm in the original engine's `selector_matcher`.

use smallvec::SmallVec;

/// A single simple selector: type, universal, id, class, attribute, or pseudo-class.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute { name: String, matcher: AttributeMatcher },
    PseudoClass(PseudoClass),
    PseudoElement(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    Exists,
    Equals(String),
    Includes(String),
    DashMatch(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

/// A parsed pseudo-class. `Is`/`Not`/`Where` carry a nested selector list; `NthChild`
/// and siblings carry a parsed An+B expression plus an optional `of <selector>` clause
/// (not currently populated; `:has()` matching is likewise simplified to ignore the
/// `of` clause).
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Hover,
    Active,
    Focus,
    FocusWithin,
    Visited,
    Link,
    Checked,
    Disabled,
    Enabled,
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(AnB),
    NthLastChild(AnB),
    NthOfType(AnB),
    NthLastOfType(AnB),
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    Matches(SelectorList),
    /// Simplified per the Open Questions resolution: matches if any descendant of the
    /// element matches the inner selector list, rather than the full relative-selector
    /// grammar (no `>`-combinator-anchored `:has()` argument support).
    Has(SelectorList),
    Other(String),
}

/// The `An+B` micro-syntax: matches 1-indexed positions `p` where `p == a*n + b` for
/// some non-negative integer `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnB {
    pub a: i32,
    pub b: i32,
}

impl AnB {
    pub const fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    pub const fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Parse the contents of an `nth-*()` functional pseudo-class argument (already
    /// trimmed of surrounding whitespace), per the original's hand-rolled parser:
    /// `odd`, `even`, a signed integer, or `An+B`/`-An+B`/`An-B` with optional spaces.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("odd") {
            return Some(Self::odd());
        }
        if trimmed.eq_ignore_ascii_case("even") {
            return Some(Self::even());
        }
        if let Ok(b) = trimmed.parse::<i32>() {
            return Some(Self { a: 0, b });
        }

        let normalized: String = trimmed.chars().filter(|ch| !ch.is_whitespace()).collect();
        let lower = normalized.to_ascii_lowercase();
        let n_index = lower.find('n')?;
        let (a_part, rest) = lower.split_at(n_index);
        let b_part = &rest[1..];

        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => other.parse().ok()?,
        };

        let b = if b_part.is_empty() {
            0
        } else if let Some(stripped) = b_part.strip_prefix('+') {
            stripped.parse().ok()?
        } else {
            b_part.parse().ok()?
        };

        Some(Self { a, b })
    }

    /// Whether 1-indexed position `position` satisfies this An+B expression.
    pub fn matches(&self, position: i32) -> bool {
        if self.a == 0 {
            return position == self.b;
        }
        let offset = position - self.b;
        if offset % self.a != 0 {
            return false;
        }
        offset / self.a >= 0
    }
}

pub type SelectorList = Vec<ComplexSelector>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
    pub ids: u32,
    pub classes: u32,
    pub types: u32,
}

impl Specificity {
    pub const ZERO: Self = Self { ids: 0, classes: 0, types: 0 };

    pub fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }

    fn add(&mut self, other: &Self) {
        self.ids += other.ids;
        self.classes += other.classes;
        self.types += other.types;
    }

    /// Encode as a single orderable integer (`a*10000^2 + b*10000 + c`), matching the
    /// original's packed-specificity comparison without risking real-world overflow.
    pub fn as_u64(&self) -> u64 {
        u64::from(self.ids) * 1_000_000 + u64::from(self.classes) * 1_000 + u64::from(self.types)
    }
}

/// A set of simple selectors with no combinator between them (e.g. `div.foo#bar`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub simple_selectors: SmallVec<[SimpleSelector; 4]>,
}

impl CompoundSelector {
    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::ZERO;
        for simple in &self.simple_selectors {
            match simple {
                SimpleSelector::Id(_) => spec.ids += 1,
                SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => spec.classes += 1,
                SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => spec.types += 1,
                SimpleSelector::Universal => {}
                SimpleSelector::PseudoClass(pseudo) => spec.add(&pseudo_specificity(pseudo)),
            }
        }
        spec
    }
}

/// `:where()` contributes zero; `:is()`/`:not()`/`:matches()` contribute the maximum
/// specificity among their argument selectors; other pseudo-classes count as one class.
fn pseudo_specificity(pseudo: &PseudoClass) -> Specificity {
    match pseudo {
        PseudoClass::Where(_) => Specificity::ZERO,
        PseudoClass::Is(list) | PseudoClass::Not(list) | PseudoClass::Matches(list) | PseudoClass::Has(list) => {
            list.iter().fold(Specificity::ZERO, |acc, selector| acc.max(selector.specificity()))
        }
        _ => Specificity { ids: 0, classes: 1, types: 0 },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

/// A chain of compound selectors joined by combinators, read right-to-left for
/// matching (the last element is the rightmost/"key" compound).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSelector {
    /// `(combinator leading to this compound, compound)` pairs in left-to-right source
    /// order; the first entry's combinator is unused (there is nothing to its left).
    pub compounds: Vec<(Option<Combinator>, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn specificity(&self) -> Specificity {
        let mut spec = Specificity::ZERO;
        for (_, compound) in &self.compounds {
            spec.add(&compound.specificity());
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anb_parses_odd_even_and_plain_integer() {
        assert_eq!(AnB::parse("odd"), Some(AnB::odd()));
        assert_eq!(AnB::parse("even"), Some(AnB::even()));
        assert_eq!(AnB::parse("3"), Some(AnB { a: 0, b: 3 }));
    }

    #[test]
    fn anb_parses_signed_an_plus_b_forms() {
        assert_eq!(AnB::parse("2n+1"), Some(AnB { a: 2, b: 1 }));
        assert_eq!(AnB::parse("-n+3"), Some(AnB { a: -1, b: 3 }));
        assert_eq!(AnB::parse("2n"), Some(AnB { a: 2, b: 0 }));
        assert_eq!(AnB::parse("n"), Some(AnB { a: 1, b: 0 }));
        assert_eq!(AnB::parse(" 3n - 2 "), Some(AnB { a: 3, b: -2 }));
    }

    #[test]
    fn anb_matches_only_nonnegative_n() {
        let every_third_from_4 = AnB { a: 3, b: 4 };
        assert!(!every_third_from_4.matches(1));
        assert!(every_third_from_4.matches(4));
        assert!(every_third_from_4.matches(7));
        assert!(!every_third_from_4.matches(5));
    }

    #[test]
    fn specificity_orders_id_over_class_over_type() {
        let id_spec = Specificity { ids: 1, classes: 0, types: 0 };
        let class_spec = Specificity { ids: 0, classes: 1, types: 0 };
        let type_spec = Specificity { ids: 0, classes: 0, types: 1 };
        assert!(id_spec.as_u64() > class_spec.as_u64());
        assert!(class_spec.as_u64() > type_spec.as_u64());
    }

    #[test]
    fn where_contributes_zero_specificity() {
        let inner = ComplexSelector {
            compounds: vec![(
                None,
                CompoundSelector { simple_selectors: SmallVec::from_vec(vec![SimpleSelector::Id("x".to_owned())]) },
            )],
        };
        let spec = pseudo_specificity(&PseudoClass::Where(vec![inner]));
        assert_eq!(spec, Specificity::ZERO);
    }

    #[test]
    fn is_contributes_max_of_inner_list() {
        let low = ComplexSelector {
            compounds: vec![(None, CompoundSelector { simple_selectors: SmallVec::from_vec(vec![SimpleSelector::Type("p".to_owned())]) })],
        };
        let high = ComplexSelector {
            compounds: vec![(None, CompoundSelector { simple_selectors: SmallVec::from_vec(vec![SimpleSelector::Id("x".to_owned())]) })],
        };
        let spec = pseudo_specificity(&PseudoClass::Is(vec![low, high]));
        assert_eq!(spec, Specificity { ids: 1, classes: 0, types: 0 });
    }
}
