use json_transform_selector::{
    get_referenced_names, selector_list_to_string, AttributeOperator, Combinator, Condition,
    ElementSelector, ParseError, Selector, SelectorParser,
};

fn parse_one(input: &str) -> Selector {
    let mut list = SelectorParser::parse(input)
        .unwrap_or_else(|e| panic!("parse failed for '{input}': {e}"));
    assert_eq!(list.selectors.len(), 1);
    list.selectors.remove(0)
}

#[test]
fn parser_supported_subset_matrix() {
    let cases: &[(&str, usize)] = &[
        ("name", 1),
        ("castle-black", 1),
        ("@version", 1),
        ("#a1", 1),
        (".object", 1),
        ("[name]", 1),
        ("[name=Jon]", 1),
        ("[name^='Jon']", 1),
        ("[name*=\"Snow\"]", 1),
        ("person name", 2),
        ("castle-black residents .object", 3),
        ("residents .object[name^=Ratty]", 2),
        ("*.object #a1", 2),
    ];
    for (text, compounds) in cases {
        let selector = parse_one(text);
        assert_eq!(selector.compound_count(), *compounds, "compound count for '{text}'");
    }
}

#[test]
fn parser_descendant_only_uses_whitespace_matrix() {
    let selector = parse_one("castle-black\tresidents");
    match selector {
        Selector::Combined { combinator, .. } => assert_eq!(combinator, Combinator::Descendant),
        other => panic!("expected combined selector, got {:?}", other),
    }
}

#[test]
fn parser_attribute_value_forms_matrix() {
    for text in ["[age=16]", "[age='16']", "[age=\"16\"]", "[ age = 16 ]"] {
        let selector = parse_one(text);
        match &selector.subject().conditions[0] {
            Condition::Attribute(attribute) => {
                assert_eq!(attribute.name, "age");
                let matcher = attribute.matcher.as_ref().expect("matcher");
                assert_eq!(matcher.operator, AttributeOperator::Equals);
                assert_eq!(matcher.value, "16");
            }
            other => panic!("expected attribute condition for '{text}', got {:?}", other),
        }
    }
}

#[test]
fn parser_escapes_matrix() {
    let selector = parse_one("first\\ name");
    assert_eq!(
        selector.subject().element,
        ElementSelector::Name("first name".into())
    );
    let selector = parse_one("[title='a \\'quoted\\' word']");
    match &selector.subject().conditions[0] {
        Condition::Attribute(attribute) => {
            assert_eq!(attribute.matcher.as_ref().unwrap().value, "a 'quoted' word");
        }
        other => panic!("expected attribute condition, got {:?}", other),
    }
}

#[test]
fn parser_error_matrix() {
    let cases: &[&str] = &["", "a[", "a[]", "[=x]", "a..b", "a b >", "a,,b", "a|b", "a[x='y"];
    for text in cases {
        assert!(SelectorParser::parse(text).is_err(), "expected error for '{text}'");
    }
    assert_eq!(SelectorParser::parse("\t"), Err(ParseError::EmptySelector));
}

#[test]
fn printer_roundtrip_matrix() {
    for text in [
        "name",
        "a b",
        "a > b",
        ".object[name^='Ratty']",
        "person#p1.object",
        "*",
        "a, b",
    ] {
        let list = SelectorParser::parse(text).unwrap();
        let printed = selector_list_to_string(&list);
        let reparsed = SelectorParser::parse(&printed).unwrap();
        assert_eq!(list, reparsed, "roundtrip mismatch for '{text}' -> '{printed}'");
    }
}

#[test]
fn referenced_names_matrix() {
    let selector = parse_one("a .x b #y a");
    assert_eq!(get_referenced_names(&selector), vec!["a", "b"]);
}
