//! Binding renderer seam
//!
//! A renderer turns resolved metadata into the text of one generated file.
//! Output must be a pure function of [`BindingSource`]: identical inputs
//! produce byte-identical text, which is what makes content-hash short
//! circuits meaningful.

mod rust;

pub use rust::RustRenderer;

use crate::metadata::ActionMetadata;

/// Everything a renderer may look at.
#[derive(Debug, Clone, Copy)]
pub struct BindingSource<'a> {
    /// `owner/repo[/subpath]` as spelled by the user.
    pub action: &'a str,
    pub sha: &'a str,
    pub binding_name: &'a str,
    pub metadata: &'a ActionMetadata,
}

/// Reasons a binding cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{kind} '{first}' and '{second}' both map to identifier '{ident}'")]
    IdentifierClash {
        kind: &'static str,
        first: String,
        second: String,
        ident: String,
    },
}

/// Produces generated binding source.
pub trait BindingRenderer {
    /// File extension of generated files, without the dot.
    fn extension(&self) -> &'static str;

    /// Render the binding text.
    fn render(&self, source: &BindingSource<'_>) -> Result<String, RenderError>;
}
