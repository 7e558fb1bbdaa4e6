//! Markdown rendering
//!
//! Renders news and note bodies to HTML with pulldown-cmark.

use pulldown_cmark::{html, Options, Parser};

/// Render markdown text to HTML.
///
/// Tables and strikethrough are enabled; raw HTML passes through as
/// pulldown-cmark emits it.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options);
    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}
