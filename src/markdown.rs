//! Markdown Previews
//!
//! Message bodies carry light markdown; previews render it to inline HTML.

use pulldown_cmark::{html::push_html, Options, Parser};

/// Render a message body for the one-line preview, inline (strips the
/// outer <p> pair so the result can sit inside a span)
pub fn render_preview(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH);
    let mut html = String::new();
    push_html(&mut html, parser);

    html.trim()
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .map(|s| s.to_string())
        .unwrap_or(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_renders_inline() {
        assert_eq!(render_preview("**oi**"), "<strong>oi</strong>");
    }

    #[test]
    fn test_strikethrough_renders() {
        assert!(render_preview("~~gone~~").contains("<del>gone</del>"));
    }

    #[test]
    fn test_preview_has_no_paragraph_wrapper() {
        let html = render_preview("tudo bem?");
        assert_eq!(html, "tudo bem?");
        assert!(!html.contains("<p>"));
    }
}
