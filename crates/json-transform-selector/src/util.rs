//! Selector utilities.

use crate::lexer::is_ident_char;
use crate::types::*;
use std::fmt::{self, Write};

/// Convert a selector list back to selector text.
pub fn selector_list_to_string(list: &SelectorList) -> String {
    list.selectors
        .iter()
        .map(selector_to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a selector back to canonical selector text.
pub fn selector_to_string(selector: &Selector) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_selector(&mut out, selector);
    out
}

/// Check if two selectors are structurally equal.
pub fn selector_equals(a: &Selector, b: &Selector) -> bool {
    a == b
}

/// Names referenced by type selectors, left to right, without duplicates.
pub fn get_referenced_names(selector: &Selector) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(selector, &mut names);
    names
}

fn collect_names(selector: &Selector, names: &mut Vec<String>) {
    let compound = match selector {
        Selector::Compound(compound) => compound,
        Selector::Combined { left, right, .. } => {
            collect_names(left, names);
            right
        }
    };
    if let ElementSelector::Name(name) = &compound.element {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
}

fn write_selector(out: &mut String, selector: &Selector) -> fmt::Result {
    match selector {
        Selector::Compound(compound) => write_compound(out, compound),
        Selector::Combined {
            left,
            combinator,
            right,
        } => {
            write_selector(out, left)?;
            out.write_str(combinator.as_str())?;
            write_compound(out, right)
        }
    }
}

fn write_compound(out: &mut String, compound: &CompoundSelector) -> fmt::Result {
    match &compound.element {
        ElementSelector::Name(name) => write_identifier(out, name)?,
        ElementSelector::Universal if compound.conditions.is_empty() => out.write_char('*')?,
        ElementSelector::Universal => {}
    }

    for condition in &compound.conditions {
        match condition {
            Condition::Id(id) => {
                out.write_char('#')?;
                write_identifier(out, id)?;
            }
            Condition::Class(class) => {
                out.write_char('.')?;
                write_identifier(out, class)?;
            }
            Condition::PseudoClass(pseudo) => {
                out.write_char(':')?;
                write_identifier(out, pseudo)?;
            }
            Condition::Attribute(attribute) => {
                out.write_char('[')?;
                write_identifier(out, &attribute.name)?;
                if let Some(matcher) = &attribute.matcher {
                    out.write_str(matcher.operator.as_str())?;
                    write_quoted(out, &matcher.value)?;
                }
                out.write_char(']')?;
            }
        }
    }

    Ok(())
}

fn write_identifier(out: &mut String, ident: &str) -> fmt::Result {
    let mut chars = ident.chars().peekable();
    while let Some(c) = chars.next() {
        let needs_escape = !is_ident_char(c) || (c == '$' && chars.peek() == Some(&'='));
        if needs_escape {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    Ok(())
}

fn write_quoted(out: &mut String, value: &str) -> fmt::Result {
    out.write_char('\'')?;
    for c in value.chars() {
        match c {
            '\'' | '\\' => {
                out.write_char('\\')?;
                out.write_char(c)?;
            }
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('\'')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SelectorParser;

    fn roundtrip(input: &str) -> String {
        let list = SelectorParser::parse(input).unwrap();
        selector_list_to_string(&list)
    }

    #[test]
    fn test_selector_to_string() {
        assert_eq!(roundtrip("a  b"), "a b");
        assert_eq!(roundtrip("residents .object[name^=Ratty]"), "residents .object[name^='Ratty']");
        assert_eq!(roundtrip("*"), "*");
        assert_eq!(roundtrip("a>b , c"), "a > b, c");
        assert_eq!(roundtrip("[name=\"it's\"]"), "[name='it\\'s']");
    }

    #[test]
    fn test_escaped_identifier_survives_printing() {
        let text = roundtrip("a\\.b");
        assert_eq!(text, "a\\.b");
        let again = SelectorParser::parse(&text).unwrap();
        assert_eq!(get_referenced_names(&again.selectors[0]), vec!["a.b"]);
    }

    #[test]
    fn test_get_referenced_names() {
        let list = SelectorParser::parse("castle-black residents .object name").unwrap();
        assert_eq!(
            get_referenced_names(&list.selectors[0]),
            vec!["castle-black", "residents", "name"]
        );
    }
}
