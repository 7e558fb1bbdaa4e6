//! Embedded page templates
//!
//! Templates are compiled into the binary with rust-embed and loaded into a
//! single Tera instance at startup.

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use tera::Tera;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct Templates;

/// Build the Tera instance from the embedded templates
pub fn build_tera() -> Result<Tera> {
    let mut sources = Vec::new();
    for path in Templates::iter() {
        let file = Templates::get(&path)
            .with_context(|| format!("Missing embedded template: {}", path))?;
        let source = std::str::from_utf8(file.data.as_ref())
            .with_context(|| format!("Template is not valid UTF-8: {}", path))?
            .to_string();
        sources.push((path.to_string(), source));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)
        .context("Failed to compile templates")?;
    Ok(tera)
}
