//! String helpers shared by the engines

/// `background-color` -> `backgroundColor`, `data-user-id` -> `dataUserId`
pub(crate) fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.trim().chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `backgroundColor` -> `background-color`
pub(crate) fn camel_to_kebab(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.trim().chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `"a  b c"` -> `["a", "b", "c"]`
pub(crate) fn split_whitespace(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

/// Whether a delegated selector starts with a combinator or `:scope`.
/// Such selectors cannot be tested with an ancestor walk and need a scoped
/// query from the container.
pub(crate) fn needs_scoped_query(selector: &str) -> bool {
    let trimmed = selector.trim_start();
    trimmed.starts_with(":scope") || starts_with_combinator(trimmed)
}

fn starts_with_combinator(s: &str) -> bool {
    matches!(s.trim_start().chars().next(), Some('>' | '+' | '~'))
}

/// Prefix every comma-separated part that begins with a combinator with
/// `:scope ` so it can be evaluated relative to an element.
pub(crate) fn scope_selector(selector: &str) -> String {
    selector
        .split(',')
        .map(|part| {
            let part = part.trim();
            if starts_with_combinator(part) {
                format!(":scope {part}")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
