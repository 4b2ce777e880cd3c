//! Binding name and output path derivation

use crate::reference::ActionKey;

/// Derive the binding type name for an action.
///
/// The repo segment and every subpath segment are split on `-`, `_` and `.`
/// and joined in UpperCamelCase: `actions/cache/restore` becomes
/// `CacheRestore`. Names that would start with a digit get an `Action`
/// prefix.
pub fn derive_binding_name(key: &ActionKey) -> String {
    let mut name = String::new();
    let segments = std::iter::once(key.repo()).chain(key.subpath().into_iter().flat_map(|s| s.split('/')));

    for segment in segments {
        for word in segment.split(['-', '_', '.']).filter(|w| !w.is_empty()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.extend(chars.map(|c| c.to_ascii_lowercase()));
            }
        }
    }

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Action");
    }
    name
}

/// Whether `name` is acceptable as a binding type name.
pub fn is_valid_binding_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Convert an UpperCamelCase binding name to snake_case.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Project-relative path of the generated file for `binding_name`.
pub fn output_file_path(output_dir: &str, binding_name: &str, extension: &str) -> String {
    let file = format!("{}.{}", snake_case(binding_name), extension);
    let dir = output_dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        file
    } else {
        format!("{dir}/{file}")
    }
}
