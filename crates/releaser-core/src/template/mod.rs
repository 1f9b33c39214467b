//! Manifest template rendering.
//!
//! A logic-less, mustache-compatible subset. Ordinary variables are looked up
//! on a [`View`]; sections bound to an [`Expander`] receive their raw body and
//! a callback that renders nested fragments against the same view. The
//! release flow renders twice: once with [`UrlOnly`] to discover package
//! URLs, then with [`UrlWithChecksum`] once every digest is known.

mod escape;
mod parse;
mod view;

pub use escape::escape_html;
pub use view::{ReleaseView, UrlOnly, UrlWithChecksum, EXPANDER_SECTION};

use std::path::Path;
use thiserror::Error;

use parse::Node;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unclosed tag at byte {offset}")]
    UnclosedTag { offset: usize },
    #[error("empty tag at byte {offset}")]
    EmptyTag { offset: usize },
    #[error("unsupported tag '{{{{{0}}}}}'")]
    UnsupportedTag(String),
    #[error("section '{0}' is never closed")]
    UnclosedSection(String),
    #[error("closing tag '{0}' without an open section")]
    UnexpectedClose(String),
    #[error("section '{expected}' closed by '{found}'")]
    MismatchedClose { expected: String, found: String },
    #[error("no checksum resolved for {0}")]
    MissingChecksum(String),
    #[error("rendered manifest is invalid: {0}")]
    InvalidManifest(String),
    #[error("read template {path}: {message}")]
    Read { path: String, message: String },
}

/// Callback handed to expanders for rendering nested template text.
pub type NestedRender<'a> = dyn Fn(&str) -> Result<String, RenderError> + 'a;

/// Capability invoked once per matching section.
pub trait Expander {
    /// `raw` is the unrendered section body; `render` expands it against the view.
    /// The returned text is inserted verbatim.
    fn expand(&self, raw: &str, render: &NestedRender<'_>) -> Result<String, RenderError>;
}

/// Values and expanders visible to a template.
pub trait View {
    fn value(&self, name: &str) -> Option<String>;
    fn expander(&self, name: &str) -> Option<&dyn Expander>;
}

/// Render a template file.
pub fn render(template_path: &Path, view: &dyn View) -> Result<String, RenderError> {
    let text = std::fs::read_to_string(template_path).map_err(|e| RenderError::Read {
        path: template_path.display().to_string(),
        message: e.to_string(),
    })?;
    render_str(&text, view)
}

/// Render template text held in memory.
pub fn render_str(template: &str, view: &dyn View) -> Result<String, RenderError> {
    let nodes = parse::parse(template)?;
    let mut out = String::with_capacity(template.len());
    render_nodes(&nodes, view, &mut out)?;
    Ok(out)
}

fn render_nodes(nodes: &[Node], view: &dyn View, out: &mut String) -> Result<(), RenderError> {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Var { name, escape } => {
                if let Some(v) = view.value(name) {
                    if *escape {
                        out.push_str(&escape_html(&v));
                    } else {
                        out.push_str(&v);
                    }
                }
            }
            Node::Section {
                name,
                inverted,
                raw,
                children,
            } => {
                if !inverted {
                    if let Some(expander) = view.expander(name) {
                        let nested = |text: &str| render_str(text, view);
                        out.push_str(&expander.expand(raw, &nested)?);
                        continue;
                    }
                }
                let truthy = view.expander(name).is_some()
                    || view.value(name).is_some_and(|v| !v.is_empty());
                if truthy != *inverted {
                    render_nodes(children, view, out)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapView(HashMap<&'static str, &'static str>);

    impl View for MapView {
        fn value(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|v| v.to_string())
        }

        fn expander(&self, _name: &str) -> Option<&dyn Expander> {
            None
        }
    }

    fn view(pairs: &[(&'static str, &'static str)]) -> MapView {
        MapView(pairs.iter().copied().collect())
    }

    #[test]
    fn escapes_variables_but_not_slashes() {
        let v = view(&[("TagName", "plugin/v0.0.8"), ("Name", "a&b <c> \"d\" 'e'")]);
        let out = render_str("{{TagName}} {{Name}}", &v).unwrap();
        assert_eq!(out, "plugin/v0.0.8 a&amp;b &lt;c&gt; &quot;d&quot; &#39;e&#39;");
    }

    #[test]
    fn triple_mustache_is_raw() {
        let v = view(&[("Name", "<b>")]);
        assert_eq!(render_str("{{{Name}}}|{{&Name}}", &v).unwrap(), "<b>|<b>");
    }

    #[test]
    fn unknown_variables_render_empty() {
        let v = view(&[]);
        assert_eq!(render_str("[{{Missing}}]", &v).unwrap(), "[]");
    }

    #[test]
    fn plain_and_inverted_sections() {
        let v = view(&[("On", "yes"), ("Empty", "")]);
        let out = render_str("{{#On}}a{{/On}}{{#Empty}}b{{/Empty}}{{^Empty}}c{{/Empty}}{{^On}}d{{/On}}", &v)
            .unwrap();
        assert_eq!(out, "ac");
    }

    #[test]
    fn render_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tmpl");
        std::fs::write(&path, "v={{Version}}").unwrap();
        let out = render(&path, &view(&[("Version", "1.2.3")])).unwrap();
        assert_eq!(out, "v=1.2.3");
    }

    #[test]
    fn render_missing_file_errors() {
        let err = render(Path::new("/invalid-path/t.tmpl"), &view(&[])).unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
    }
}
