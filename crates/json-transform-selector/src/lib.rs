//! CSS-style selectors for JSON trees.
//!
//! This crate tokenizes and parses selector text into an AST. It does not
//! evaluate anything: the `json-transform` crate compiles the AST into
//! node predicates.
//!
//! Supported syntax:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `name` | node named `name` |
//! | `*` | any node |
//! | `#id` | node with identifier id `id` |
//! | `.class` | node tagged with class `class` |
//! | `[a]`, `[a=v]`, `[a^=v]`, `[a*=v]` | attribute presence / equals / prefix / substring |
//! | `a b` | `b` anywhere below an `a` |
//!
//! The parser also accepts `>`, `+`, `~`, `:pseudo`, `[a$=v]`, `[a~=v]`,
//! `[a|=v]` and comma separated lists, so that callers can report them as
//! unsupported instead of as syntax errors.
//!
//! # Example
//!
//! ```
//! use json_transform_selector::{Condition, ElementSelector, Selector, SelectorParser};
//!
//! let list = SelectorParser::parse("residents .object[name^=Ratty]").unwrap();
//! assert_eq!(list.selectors.len(), 1);
//!
//! match &list.selectors[0] {
//!     Selector::Combined { right, .. } => {
//!         assert_eq!(right.element, ElementSelector::Universal);
//!         assert!(matches!(right.conditions[0], Condition::Class(ref c) if c == "object"));
//!     }
//!     other => panic!("expected a combined selector, got {:?}", other),
//! }
//! ```

mod types;
pub use types::*;

mod ast;
pub use ast::Ast;

mod lexer;
pub use lexer::{is_ident_char, Lexer, Spanned, Token};

mod parser;
pub use parser::{ParseError, SelectorParser};

mod util;
pub use util::{get_referenced_names, selector_equals, selector_list_to_string, selector_to_string};
