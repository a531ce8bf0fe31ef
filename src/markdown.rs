//! Markdown-to-HTML conversion for post bodies.

use pulldown_cmark::{html, Options, Parser};

/// Converts a markdown post body to HTML. Fenced code blocks come out as
/// `<pre><code class="language-...">` so a stylesheet or client-side
/// highlighter can colorize them.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
