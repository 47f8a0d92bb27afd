//! Style declarations and user-agent defaults

use crate::node::Namespace;
use crate::selector::SelectorList;

/// An ordered list of `property: value` declarations.
///
/// Property names are stored lowercase, hyphen-case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclarations {
    decls: Vec<(String, String)>,
}

impl StyleDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a: b; c: d` text. Malformed entries are skipped.
    pub fn parse(text: &str) -> Self {
        let mut decls = Self::new();
        for part in text.split(';') {
            let Some((name, value)) = part.split_once(':') else {
                continue;
            };
            decls.set(name, value);
        }
        decls
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = normalize_property(property);
        self.decls
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Set a declaration. An empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = normalize_property(property);
        let value = value.trim();
        if property.is_empty() {
            return;
        }
        if value.is_empty() {
            self.remove(&property);
            return;
        }
        match self.decls.iter_mut().find(|(name, _)| *name == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.decls.push((property, value.to_string())),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let property = normalize_property(property);
        let pos = self.decls.iter().position(|(name, _)| *name == property)?;
        Some(self.decls.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Serialize back to `a: b; c: d`
    pub fn css_text(&self) -> String {
        self.decls
            .iter()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn normalize_property(property: &str) -> String {
    property.trim().to_ascii_lowercase()
}

/// Author stylesheet rule
#[derive(Debug, Clone)]
pub(crate) struct StyleRule {
    pub(crate) selector: SelectorList,
    pub(crate) declarations: StyleDeclarations,
}

/// User-agent `display` for a tag
pub fn default_display(tag: &str, namespace: Namespace) -> &'static str {
    if namespace == Namespace::Svg {
        return "inline";
    }
    match tag {
        "html" | "body" | "div" | "p" | "section" | "article" | "header" | "footer" | "nav"
        | "main" | "aside" | "ul" | "ol" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "blockquote" | "pre" | "fieldset" | "figure" | "figcaption" | "dl" | "dd" | "dt"
        | "hr" | "address" | "details" | "summary" | "menu" | "legend" | "dialog" => "block",
        "li" => "list-item",
        "table" => "table",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "caption" => "table-caption",
        "col" => "table-column",
        "colgroup" => "table-column-group",
        "button" | "input" | "select" | "textarea" | "meter" | "progress" => "inline-block",
        "head" | "script" | "style" | "title" | "meta" | "link" | "template" | "noscript" => {
            "none"
        }
        _ => "inline",
    }
}

/// Initial computed value for properties with no declaration.
///
/// There is no layout pass, so box dimensions report their declared or
/// initial values rather than used values.
pub fn initial_value(property: &str) -> &'static str {
    match property {
        "opacity" => "1",
        "height" | "width" | "min-height" | "min-width" | "z-index" | "top" | "left"
        | "right" | "bottom" | "will-change" => "auto",
        "max-height" | "max-width" => "none",
        "padding-top" | "padding-right" | "padding-bottom" | "padding-left" | "margin-top"
        | "margin-right" | "margin-bottom" | "margin-left" | "border-top-width"
        | "border-right-width" | "border-bottom-width" | "border-left-width" => "0px",
        "overflow" | "overflow-x" | "overflow-y" | "visibility" => "visible",
        "position" => "static",
        "transition" => "all 0s ease 0s",
        "flex-grow" | "order" => "0",
        "flex-shrink" => "1",
        "line-height" => "normal",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let decls = StyleDeclarations::parse("display: flex; Opacity:0.5;;garbage");
        assert_eq!(decls.get("display"), Some("flex"));
        assert_eq!(decls.get("opacity"), Some("0.5"));
        assert_eq!(decls.len(), 2);
    }

    #[test]
    fn test_set_and_remove() {
        let mut decls = StyleDeclarations::new();
        decls.set("height", "10px");
        decls.set("height", "20px");
        assert_eq!(decls.get("height"), Some("20px"));
        decls.set("height", "");
        assert!(decls.is_empty());
    }

    #[test]
    fn test_css_text() {
        let mut decls = StyleDeclarations::new();
        decls.set("opacity", "0");
        decls.set("display", "block");
        assert_eq!(decls.css_text(), "opacity: 0; display: block");
    }

    #[test]
    fn test_default_display() {
        assert_eq!(default_display("div", Namespace::Html), "block");
        assert_eq!(default_display("span", Namespace::Html), "inline");
        assert_eq!(default_display("li", Namespace::Html), "list-item");
        assert_eq!(default_display("td", Namespace::Html), "table-cell");
        assert_eq!(default_display("rect", Namespace::Svg), "inline");
    }
}
