//! Rust binding renderer
//!
//! Emits one self-contained module per action: a binding struct carrying
//! the pinned `uses:` value, an inputs struct whose fields follow the
//! action's inputs, and an outputs type with one constant per output name.

use std::collections::BTreeMap;

use super::{BindingRenderer, BindingSource, RenderError};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Renders bindings as Rust source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustRenderer;

impl RustRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl BindingRenderer for RustRenderer {
    fn extension(&self) -> &'static str {
        "rs"
    }

    fn render(&self, source: &BindingSource<'_>) -> Result<String, RenderError> {
        let metadata = source.metadata;
        let name = source.binding_name;
        let uses = format!("{}@{}", source.action, source.sha);

        let fields = assign_idents(metadata.inputs.keys(), "input", field_ident)?;
        let consts = assign_idents(metadata.outputs.keys(), "output", |n| {
            field_ident(n).to_ascii_uppercase()
        })?;

        let mut out = String::new();
        out.push_str("// @generated by actsync. Do not edit by hand.\n");
        out.push_str(&format!("// Source: {uses}\n\n"));

        out.push_str(&format!("//! {}\n", metadata.name.as_deref().unwrap_or(name)));
        if !metadata.description.is_empty() {
            out.push_str("//!\n");
            push_doc(&mut out, "//!", "", &metadata.description);
        }
        out.push('\n');

        // Binding
        out.push_str(&format!("/// Typed binding for `{}`.\n", source.action));
        out.push_str("#[derive(Debug, Clone, Default, PartialEq, Eq)]\n");
        out.push_str(&format!("pub struct {name} {{\n    pub inputs: {name}Inputs,\n}}\n\n"));
        out.push_str(&format!("impl {name} {{\n"));
        out.push_str("    /// Pinned `uses:` value.\n");
        out.push_str(&format!("    pub const USES: &'static str = {uses:?};\n\n"));
        out.push_str(&format!(
            "    pub fn new(inputs: {name}Inputs) -> Self {{\n        Self {{ inputs }}\n    }}\n\n"
        ));
        out.push_str("    /// `with:` entries for the step.\n");
        out.push_str("    pub fn with(&self) -> Vec<(&'static str, String)> {\n");
        out.push_str("        self.inputs.to_with()\n    }\n}\n\n");

        // Inputs
        out.push_str(&format!("/// Inputs of `{}`.\n", source.action));
        out.push_str("#[derive(Debug, Clone, Default, PartialEq, Eq)]\n");
        out.push_str(&format!("pub struct {name}Inputs {{\n"));
        for (input_name, input) in &metadata.inputs {
            let ident = &fields[input_name.as_str()];
            push_doc(&mut out, "    ///", "", &input.description);
            let mut notes = Vec::new();
            if input.is_mandatory() {
                notes.push("Required.".to_string());
            }
            if let Some(default) = &input.default {
                notes.push(format!("Default: `{default}`"));
            }
            if let Some(message) = &input.deprecation_message {
                notes.push(format!("Deprecated: {message}"));
            }
            if !notes.is_empty() {
                if !input.description.is_empty() {
                    out.push_str("    ///\n");
                }
                push_doc(&mut out, "    ///", "", &notes.join("\n"));
            }
            let ty = if input.is_mandatory() { "String" } else { "Option<String>" };
            out.push_str(&format!("    pub {ident}: {ty},\n"));
        }
        out.push_str("}\n\n");

        out.push_str(&format!("impl {name}Inputs {{\n"));
        out.push_str("    /// Set inputs as `with:` entries.\n");
        out.push_str("    pub fn to_with(&self) -> Vec<(&'static str, String)> {\n");
        if metadata.inputs.is_empty() {
            out.push_str("        Vec::new()\n");
        } else {
            out.push_str("        let mut with = Vec::new();\n");
            for (input_name, input) in &metadata.inputs {
                let ident = &fields[input_name.as_str()];
                if input.is_mandatory() {
                    out.push_str(&format!(
                        "        with.push(({input_name:?}, self.{ident}.clone()));\n"
                    ));
                } else {
                    out.push_str(&format!(
                        "        if let Some(value) = &self.{ident} {{\n            with.push(({input_name:?}, value.clone()));\n        }}\n"
                    ));
                }
            }
            out.push_str("        with\n");
        }
        out.push_str("    }\n}\n\n");

        // Outputs
        out.push_str(&format!("/// Output names of `{}`.\n", source.action));
        out.push_str(&format!("pub struct {name}Outputs;\n"));
        if !metadata.outputs.is_empty() {
            out.push_str(&format!("\nimpl {name}Outputs {{\n"));
            for (i, (output_name, output)) in metadata.outputs.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                push_doc(&mut out, "    ///", "", &output.description);
                let ident = &consts[output_name.as_str()];
                out.push_str(&format!(
                    "    pub const {ident}: &'static str = {output_name:?};\n"
                ));
            }
            out.push_str("}\n");
        }

        Ok(out)
    }
}

/// Append each line of `text` as a doc comment line.
fn push_doc(out: &mut String, marker: &str, indent: &str, text: &str) {
    for line in text.trim().lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{indent}{marker}\n"));
        } else {
            out.push_str(&format!("{indent}{marker} {line}\n"));
        }
    }
}

/// Map each name to an identifier, failing if two names collapse together.
fn assign_idents<'a>(
    names: impl Iterator<Item = &'a String>,
    kind: &'static str,
    to_ident: impl Fn(&str) -> String,
) -> Result<BTreeMap<&'a str, String>, RenderError> {
    let mut by_name = BTreeMap::new();
    let mut by_ident: BTreeMap<String, &str> = BTreeMap::new();

    for name in names {
        let ident = to_ident(name);
        if let Some(first) = by_ident.get(&ident) {
            return Err(RenderError::IdentifierClash {
                kind,
                first: first.to_string(),
                second: name.clone(),
                ident,
            });
        }
        by_ident.insert(ident.clone(), name.as_str());
        by_name.insert(name.as_str(), ident);
    }
    Ok(by_name)
}

/// `fetch-depth` → `fetch_depth`, `githubToken` → `github_token`, `ref` → `ref_`.
fn field_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len() + 2);
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if previous_lower {
                ident.push('_');
            }
            ident.push(ch.to_ascii_lowercase());
            previous_lower = false;
        } else if ch.is_ascii_alphanumeric() {
            ident.push(ch);
            previous_lower = true;
        } else {
            ident.push('_');
            previous_lower = false;
        }
    }

    if ident.chars().all(|c| c == '_') {
        ident.insert_str(0, "input");
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ActionInput, ActionMetadata, ActionOutput};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    fn checkout_metadata() -> ActionMetadata {
        let mut metadata = ActionMetadata {
            name: Some("Checkout".to_string()),
            description: "Checkout a Git repository".to_string(),
            ..Default::default()
        };
        metadata.inputs.insert(
            "fetch-depth".to_string(),
            ActionInput {
                description: "Number of commits to fetch".to_string(),
                default: Some("1".to_string()),
                ..Default::default()
            },
        );
        metadata.inputs.insert(
            "token".to_string(),
            ActionInput {
                description: "Personal access token".to_string(),
                required: true,
                ..Default::default()
            },
        );
        metadata.outputs.insert(
            "ref".to_string(),
            ActionOutput {
                description: "The checked out ref".to_string(),
                value: None,
            },
        );
        metadata
    }

    fn render(metadata: &ActionMetadata) -> Result<String, RenderError> {
        RustRenderer.render(&BindingSource {
            action: "actions/checkout",
            sha: SHA,
            binding_name: "Checkout",
            metadata,
        })
    }

    #[test]
    fn renders_full_binding() {
        let text = render(&checkout_metadata()).unwrap();
        let expected = r#"// @generated by actsync. Do not edit by hand.
// Source: actions/checkout@0123456789abcdef0123456789abcdef01234567

//! Checkout
//!
//! Checkout a Git repository

/// Typed binding for `actions/checkout`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkout {
    pub inputs: CheckoutInputs,
}

impl Checkout {
    /// Pinned `uses:` value.
    pub const USES: &'static str = "actions/checkout@0123456789abcdef0123456789abcdef01234567";

    pub fn new(inputs: CheckoutInputs) -> Self {
        Self { inputs }
    }

    /// `with:` entries for the step.
    pub fn with(&self) -> Vec<(&'static str, String)> {
        self.inputs.to_with()
    }
}

/// Inputs of `actions/checkout`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutInputs {
    /// Number of commits to fetch
    ///
    /// Default: `1`
    pub fetch_depth: Option<String>,
    /// Personal access token
    ///
    /// Required.
    pub token: String,
}

impl CheckoutInputs {
    /// Set inputs as `with:` entries.
    pub fn to_with(&self) -> Vec<(&'static str, String)> {
        let mut with = Vec::new();
        if let Some(value) = &self.fetch_depth {
            with.push(("fetch-depth", value.clone()));
        }
        with.push(("token", self.token.clone()));
        with
    }
}

/// Output names of `actions/checkout`.
pub struct CheckoutOutputs;

impl CheckoutOutputs {
    /// The checked out ref
    pub const REF: &'static str = "ref";
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let metadata = checkout_metadata();
        assert_eq!(render(&metadata).unwrap(), render(&metadata).unwrap());
    }

    #[test]
    fn empty_metadata_renders_without_inputs() {
        let text = render(&ActionMetadata::default()).unwrap();
        assert!(text.contains("pub struct CheckoutInputs {\n}"));
        assert!(text.contains("        Vec::new()\n"));
        assert!(text.ends_with("pub struct CheckoutOutputs;\n"));
    }

    #[test]
    fn clashing_input_names_are_rejected() {
        let mut metadata = ActionMetadata::default();
        metadata.inputs.insert("fetch-depth".into(), ActionInput::default());
        metadata.inputs.insert("fetch_depth".into(), ActionInput::default());

        let err = render(&metadata).unwrap_err();
        assert!(matches!(err, RenderError::IdentifierClash { kind: "input", .. }));
    }

    #[rstest]
    #[case("fetch-depth", "fetch_depth")]
    #[case("githubToken", "github_token")]
    #[case("ref", "ref_")]
    #[case("type", "type_")]
    #[case("3d", "_3d")]
    #[case("-", "input_")]
    #[case("node.version", "node_version")]
    fn field_idents(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(field_ident(name), expected);
    }
}
