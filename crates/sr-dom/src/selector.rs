//! Selector parsing and matching
//!
//! Supports compound selectors (type, `*`, `#id`, `.class`, attribute
//! matchers, a handful of structural pseudo-classes and `:scope`) joined by
//! the four combinators, plus comma-separated lists. Anything else fails to
//! parse, and a selector that fails to parse matches nothing.

use crate::document::Document;
use crate::NodeId;

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<ComplexSelector>);

/// Compounds joined by combinators, left to right
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq)]
struct Compound(Vec<SimpleSelector>);

#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
}

#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    /// Matches the element the query is scoped to (the root element otherwise)
    Scope,
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    Not(Box<Compound>),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    matcher: Option<AttributeMatcher>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            // [attr] only checks presence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}

/// Parse a selector list, returning `None` when any part is malformed
pub fn parse_selector_list(input: &str) -> Option<SelectorList> {
    let mut selectors = Vec::new();
    for part in split_top_level(input)? {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        selectors.push(parse_complex(part)?);
    }
    if selectors.is_empty() {
        return None;
    }
    Some(SelectorList(selectors))
}

impl SelectorList {
    /// Test `node` against the list. `scope` is what `:scope` refers to.
    pub fn matches(&self, doc: &Document, node: NodeId, scope: Option<NodeId>) -> bool {
        doc.element(node).is_some()
            && self
                .0
                .iter()
                .any(|complex| complex.matches_at(doc, complex.compounds.len() - 1, node, scope))
    }
}

impl ComplexSelector {
    fn matches_at(&self, doc: &Document, idx: usize, node: NodeId, scope: Option<NodeId>) -> bool {
        if !self.compounds[idx].matches(doc, node, scope) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(doc, idx - 1, parent, scope)),
            Combinator::Descendant => {
                let mut current = doc.parent_element(node);
                while let Some(ancestor) = current {
                    if self.matches_at(doc, idx - 1, ancestor, scope) {
                        return true;
                    }
                    current = doc.parent_element(ancestor);
                }
                false
            }
            Combinator::NextSibling => doc
                .previous_element_sibling(node)
                .is_some_and(|prev| self.matches_at(doc, idx - 1, prev, scope)),
            Combinator::SubsequentSibling => {
                let mut current = doc.previous_element_sibling(node);
                while let Some(prev) = current {
                    if self.matches_at(doc, idx - 1, prev, scope) {
                        return true;
                    }
                    current = doc.previous_element_sibling(prev);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId, scope: Option<NodeId>) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };

        self.0.iter().all(|simple| match simple {
            SimpleSelector::Universal => true,
            SimpleSelector::Type(tag) => element.tag.eq_ignore_ascii_case(tag),
            SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
            SimpleSelector::Class(class) => element.has_class(class),
            SimpleSelector::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
            SimpleSelector::PseudoClass(pseudo) => match pseudo {
                PseudoClass::Scope => match scope {
                    Some(scope) => scope == node,
                    None => doc.document_element() == Some(node),
                },
                PseudoClass::Root => doc.document_element() == Some(node),
                PseudoClass::Empty => doc.children(node).is_empty(),
                PseudoClass::FirstChild => doc.previous_element_sibling(node).is_none(),
                PseudoClass::LastChild => doc.next_element_sibling(node).is_none(),
                PseudoClass::OnlyChild => {
                    doc.previous_element_sibling(node).is_none()
                        && doc.next_element_sibling(node).is_none()
                }
                PseudoClass::Not(inner) => !inner.matches(doc, node, scope),
            },
        })
    }
}

/// Split on commas outside brackets, parentheses and quotes
fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    parts.push(&input[start..]);
    Some(parts)
}

fn parse_complex(input: &str) -> Option<ComplexSelector> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let explicit = match chars[i] {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::NextSibling),
            '~' => Some(Combinator::SubsequentSibling),
            _ => None,
        };
        if let Some(combinator) = explicit {
            // Leading or doubled combinators are not valid here
            if compounds.is_empty() || pending.is_some() {
                return None;
            }
            pending = Some(combinator);
            i += 1;
            continue;
        }

        let compound = parse_compound(&chars, &mut i)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().unwrap_or(Combinator::Descendant));
        }
        compounds.push(compound);
    }

    if compounds.is_empty() || pending.is_some() {
        return None;
    }
    Some(ComplexSelector { compounds, combinators })
}

fn parse_compound(chars: &[char], i: &mut usize) -> Option<Compound> {
    let mut parts = Vec::new();

    while *i < chars.len() {
        let c = chars[*i];
        match c {
            c if c.is_whitespace() => break,
            '>' | '+' | '~' => break,
            '*' => {
                *i += 1;
                parts.push(SimpleSelector::Universal);
            }
            '#' => {
                *i += 1;
                parts.push(SimpleSelector::Id(read_ident(chars, i)?));
            }
            '.' => {
                *i += 1;
                parts.push(SimpleSelector::Class(read_ident(chars, i)?));
            }
            '[' => {
                let content = read_balanced(chars, i, '[', ']')?;
                parts.push(parse_attribute_selector(&content)?);
            }
            ':' => {
                *i += 1;
                if chars.get(*i) == Some(&':') {
                    // Pseudo-elements never match an element
                    return None;
                }
                let name = read_ident(chars, i)?.to_ascii_lowercase();
                let arg = if chars.get(*i) == Some(&'(') {
                    Some(read_balanced(chars, i, '(', ')')?)
                } else {
                    None
                };
                parts.push(SimpleSelector::PseudoClass(parse_pseudo_class(&name, arg.as_deref())?));
            }
            c if is_ident_start(c) => {
                // Type selectors must lead the compound
                if !parts.is_empty() {
                    return None;
                }
                parts.push(SimpleSelector::Type(read_ident(chars, i)?.to_ascii_lowercase()));
            }
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(Compound(parts))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

fn read_ident(chars: &[char], i: &mut usize) -> Option<String> {
    let start = *i;
    while *i < chars.len() && is_ident_char(chars[*i]) {
        *i += 1;
    }
    let ident: String = chars[start..*i].iter().collect();
    is_valid_ident(&ident).then_some(ident)
}

/// Check if string is a valid CSS identifier
fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some('-') => matches!(chars.next(), Some(c) if !c.is_ascii_digit()),
        Some(c) => is_ident_start(c),
        None => false,
    }
}

/// Read `open ... close` starting at `chars[*i] == open`, returning the inner text
fn read_balanced(chars: &[char], i: &mut usize, open: char, close: char) -> Option<String> {
    debug_assert_eq!(chars.get(*i), Some(&open));
    *i += 1;
    let start = *i;
    let mut depth = 1;
    let mut quote: Option<char> = None;

    while *i < chars.len() {
        let c = chars[*i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == open => depth += 1,
            None if c == close => {
                depth -= 1;
                if depth == 0 {
                    let inner: String = chars[start..*i].iter().collect();
                    *i += 1;
                    return Some(inner);
                }
            }
            None => {}
        }
        *i += 1;
    }
    None
}

/// Parse an attribute selector content (without brackets)
fn parse_attribute_selector(content: &str) -> Option<SimpleSelector> {
    let content = content.trim();

    let (content, case_insensitive) = if content.ends_with(" i") || content.ends_with(" I") {
        (content[..content.len() - 2].trim_end(), true)
    } else {
        (content, false)
    };

    for (op, matcher_fn) in [
        ("~=", AttributeMatcher::Contains as fn(String) -> AttributeMatcher),
        ("|=", AttributeMatcher::DashMatch as fn(String) -> AttributeMatcher),
        ("^=", AttributeMatcher::Prefix as fn(String) -> AttributeMatcher),
        ("$=", AttributeMatcher::Suffix as fn(String) -> AttributeMatcher),
        ("*=", AttributeMatcher::Substring as fn(String) -> AttributeMatcher),
        ("=", AttributeMatcher::Exact as fn(String) -> AttributeMatcher),
    ] {
        if let Some(pos) = content.find(op) {
            let name = content[..pos].trim();
            if !is_valid_ident(name) {
                return None;
            }
            let value = content[pos + op.len()..].trim();
            let value = strip_quotes(value)?;

            return Some(SimpleSelector::Attribute(AttributeSelector {
                name: name.to_string(),
                matcher: Some(matcher_fn(value.to_string())),
                case_insensitive,
            }));
        }
    }

    if !is_valid_ident(content) {
        return None;
    }
    Some(SimpleSelector::Attribute(AttributeSelector {
        name: content.to_string(),
        matcher: None,
        case_insensitive,
    }))
}

fn strip_quotes(value: &str) -> Option<&str> {
    for q in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(q) {
            return rest.strip_suffix(q);
        }
    }
    // Unquoted values must be identifiers
    is_valid_ident(value).then_some(value)
}

fn parse_pseudo_class(name: &str, arg: Option<&str>) -> Option<PseudoClass> {
    match (name, arg) {
        ("scope", None) => Some(PseudoClass::Scope),
        ("root", None) => Some(PseudoClass::Root),
        ("empty", None) => Some(PseudoClass::Empty),
        ("first-child", None) => Some(PseudoClass::FirstChild),
        ("last-child", None) => Some(PseudoClass::LastChild),
        ("only-child", None) => Some(PseudoClass::OnlyChild),
        ("not", Some(arg)) => {
            let chars: Vec<char> = arg.trim().chars().collect();
            let mut i = 0;
            let inner = parse_compound(&chars, &mut i)?;
            (i == chars.len()).then(|| PseudoClass::Not(Box::new(inner)))
        }
        _ => None,
    }
}
