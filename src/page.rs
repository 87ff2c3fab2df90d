//! Host page generation
//!
//! Renders the HTML page that carries both canvases, loads the wasm package
//! and mounts the effects with the serialized configuration.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use backdrop_fx::BackdropConfig;

/// Default title of the generated page
pub const DEFAULT_TITLE: &str = "ByteInfer";

/// Host page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct HostPage<'a> {
    pub title: &'a str,
    pub field_canvas_id: &'a str,
    pub pulse_canvas_id: &'a str,
    /// Directory (relative URL) holding `backdrop_fx.js`
    pub pkg_path: &'a str,
    /// Config JSON as a JS string literal, safe to embed in a `<script>`
    pub config_json: String,
}

impl<'a> HostPage<'a> {
    pub fn new(config: &'a BackdropConfig, title: &'a str, pkg_path: &'a str) -> Self {
        Self {
            title,
            field_canvas_id: &config.field_canvas_id,
            pulse_canvas_id: &config.pulse_canvas_id,
            pkg_path: pkg_path.trim_end_matches('/'),
            config_json: script_json(config),
        }
    }
}

/// The config document quoted as a JS string literal that cannot terminate
/// the surrounding `<script>` element.
///
/// The document reaches `mount_backdrop` verbatim, so integers such as a
/// full 64-bit seed never pass through a JS number.
fn script_json(config: &BackdropConfig) -> String {
    // Serializing plain data structs cannot fail
    let json = serde_json::to_string(config).unwrap_or_else(|_| "{}".to_string());
    let literal = serde_json::to_string(&json).unwrap_or_else(|_| r#""{}""#.to_string());
    literal.replace('<', "\\u003c")
}

/// Render the host page and write it as `index.html` under `output`
pub fn write_page(
    config: &BackdropConfig,
    output: &Path,
    title: &str,
    pkg_path: &str,
) -> anyhow::Result<PathBuf> {
    let html = HostPage::new(config, title, pkg_path).render()?;

    fs::create_dir_all(output)?;
    let path = output.join("index.html");
    fs::write(&path, html)?;

    tracing::debug!(path = %path.display(), "wrote host page");
    Ok(path)
}
