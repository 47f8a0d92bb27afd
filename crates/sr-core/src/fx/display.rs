//! Non-animated show/hide and display resolution

use sr_dom::NodeId;

use crate::side_table::StoredDisplay;
use crate::Runtime;

/// The tag's natural display, measured once on a scratch element and cached
pub(crate) fn default_display(rt: &mut Runtime, node: NodeId) -> String {
    let Some(tag) = rt.doc.tag_name(node).map(str::to_string) else {
        return "block".to_string();
    };
    if let Some(display) = rt.display_cache.get(&tag) {
        return display.clone();
    }

    let scratch = rt.doc.create_element(&tag);
    let parent = rt.doc.body().or_else(|| rt.doc.document_element());
    let measured = match parent {
        Some(parent) if rt.doc.append_child(parent, scratch).is_ok() => {
            let display = rt.doc.computed_style(scratch, "display");
            rt.doc.detach(scratch);
            display
        }
        _ => String::new(),
    };

    let resolved = if measured.is_empty() || measured == "none" {
        "block".to_string()
    } else {
        measured
    };
    tracing::debug!("Default display for <{}> is {}", tag, resolved);
    rt.display_cache.insert(tag, resolved.clone());
    resolved
}

/// Display value to use when showing `node`
pub(crate) fn resolve_display(rt: &mut Runtime, node: NodeId) -> String {
    if let Some(StoredDisplay::Css(stored)) = rt.side_table.get(node).and_then(|r| r.old_display.as_ref()) {
        return stored.clone();
    }

    if rt.doc.inline_style(node, "display") == Some("none") {
        rt.doc.remove_style(node, "display");
    }
    let from_css = rt.doc.computed_style(node, "display");
    if !from_css.is_empty() && from_css != "none" {
        return from_css;
    }
    default_display(rt, node)
}

pub(crate) fn show(rt: &mut Runtime, node: NodeId) {
    if !rt.doc.is_element(node) || rt.doc.computed_style(node, "display") != "none" {
        return;
    }

    if rt.doc.is_svg(node) {
        let stored = rt.side_table.get(node).and_then(|r| r.old_display.clone());
        match stored {
            Some(StoredDisplay::SvgAttribute(Some(value))) => {
                rt.doc.set_attribute(node, "display", &value);
            }
            _ => {
                rt.doc.remove_attribute(node, "display");
            }
        }
        return;
    }

    let display = resolve_display(rt, node);
    rt.doc.set_style(node, "display", &display);
}

pub(crate) fn hide(rt: &mut Runtime, node: NodeId) {
    if !rt.doc.is_element(node) {
        return;
    }
    let computed = rt.doc.computed_style(node, "display");
    if computed == "none" {
        return;
    }

    let svg = rt.doc.is_svg(node);
    let stored = if svg {
        StoredDisplay::SvgAttribute(rt.doc.attribute(node, "display").map(str::to_string))
    } else if rt.doc.is_connected(node) {
        StoredDisplay::Css(computed)
    } else {
        StoredDisplay::Unknown
    };
    rt.side_table.entry(node).old_display = Some(stored);

    if svg {
        rt.doc.set_attribute(node, "display", "none");
    } else {
        rt.doc.set_style(node, "display", "none");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_is_cached_per_tag() {
        let mut rt = Runtime::new();
        let first = rt.doc.create_element("li");
        let second = rt.doc.create_element("li");
        let head = rt.doc.create_element("head");

        assert_eq!(default_display(&mut rt, first), "list-item");
        assert_eq!(default_display(&mut rt, second), "list-item");
        assert_eq!(rt.display_cache.len(), 1);

        // A tag hidden by default still shows as a block
        assert_eq!(default_display(&mut rt, head), "block");
    }
}
