//! Selector AST types.
//!
//! The shapes follow CSS selectors closely. Only a subset is understood by
//! the JSON selection engine; the rest is still parsed so that the engine
//! can name the construct it refuses.

/// A comma separated list of selectors: `a, b.c`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }
}

/// A complex selector.
///
/// Combined selectors are left-associative: `a b c` is
/// `Combined(Combined(a, b), c)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A single compound selector: `name.class[attr]`
    Compound(CompoundSelector),
    /// Two selectors joined by a combinator: `a b`, `a > b`
    Combined {
        left: Box<Selector>,
        combinator: Combinator,
        right: CompoundSelector,
    },
}

impl Selector {
    /// Number of compound selectors in the chain.
    pub fn compound_count(&self) -> usize {
        match self {
            Selector::Compound(_) => 1,
            Selector::Combined { left, .. } => left.compound_count() + 1,
        }
    }

    /// The rightmost compound selector, i.e. the one that picks the result.
    pub fn subject(&self) -> &CompoundSelector {
        match self {
            Selector::Compound(compound) => compound,
            Selector::Combined { right, .. } => right,
        }
    }
}

/// Type selector plus any number of conditions, all of which must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    pub element: ElementSelector,
    pub conditions: Vec<Condition>,
}

impl CompoundSelector {
    pub fn new(element: ElementSelector, conditions: Vec<Condition>) -> Self {
        Self { element, conditions }
    }
}

/// The type part of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSelector {
    /// `*` or an omitted type selector
    Universal,
    /// `name`
    Name(String),
}

/// Conditions attached to a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[name]`, `[name=value]`, `[name^=value]`, ...
    Attribute(AttributeSelector),
    /// `:first-child`, `:hover`, ...
    PseudoClass(String),
}

/// Attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    /// `None` for a presence test.
    pub matcher: Option<AttributeMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatcher {
    pub operator: AttributeOperator,
    pub value: String,
}

/// Attribute operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    Equals,    // =
    Prefix,    // ^=
    Substring, // *=
    Suffix,    // $=
    Includes,  // ~=
    DashMatch, // |=
}

impl AttributeOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeOperator::Equals => "=",
            AttributeOperator::Prefix => "^=",
            AttributeOperator::Substring => "*=",
            AttributeOperator::Suffix => "$=",
            AttributeOperator::Includes => "~=",
            AttributeOperator::DashMatch => "|=",
        }
    }
}

/// Combinators between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,        // whitespace
    Child,             // >
    NextSibling,       // +
    SubsequentSibling, // ~
}

impl Combinator {
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::NextSibling => " + ",
            Combinator::SubsequentSibling => " ~ ",
        }
    }
}
