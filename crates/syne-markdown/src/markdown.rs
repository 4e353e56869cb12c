use comrak::{markdown_to_html, Options};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::highlight::{Highlighter, DEFAULT_THEME};
use crate::sanitize::sanitize_html;

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"<pre><code(?: class="language-([^"]+)")?>([^<]*)</code></pre>"#)
            .expect("Invalid CODE_BLOCK regex pattern");
    static ref DEFAULT_RENDERER: Renderer = Renderer::new(DEFAULT_THEME);
}

/// Markdown to HTML with highlighted fenced code.
pub struct Renderer {
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new(theme_name: &str) -> Self {
        Self {
            highlighter: Highlighter::new(theme_name),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn render(&self, src: &str) -> String {
        let html = markdown_to_html(src, &comrak_options());
        patch_code_blocks(&html, &self.highlighter)
    }
}

/// Renders with the shared default renderer.
pub fn to_html(src: &str) -> String {
    DEFAULT_RENDERER.render(src)
}

/// [`to_html`] followed by sanitization, for content of unknown origin.
pub fn render_safe(src: &str) -> String {
    sanitize_html(&to_html(src))
}

pub(crate) fn comrak_options() -> Options<'static> {
    let mut opt = Options::default();

    opt.extension.strikethrough = true;
    opt.extension.table = true;
    opt.extension.autolink = true;
    opt.extension.tasklist = true;
    opt.extension.footnotes = true;

    opt.parse.smart = true;

    // Raw HTML in articles is shown escaped, never executed
    opt.render.unsafe_ = false;
    opt.render.escape = true;

    opt
}

/// Rewrites comrak's `<pre><code class="language-x">` blocks. Known languages
/// get highlighted spans; anything else keeps comrak's escaped text.
pub fn patch_code_blocks(html: &str, highlighter: &Highlighter) -> String {
    CODE_BLOCK
        .replace_all(html, |caps: &Captures| {
            let lang = caps.get(1).map(|m| m.as_str());
            let escaped = &caps[2];

            let class_attr = lang
                .map(|l| format!(r#" class="language-{}""#, l))
                .unwrap_or_default();
            let body = lang
                .and_then(|l| highlighter.highlight_html(&unescape_html(escaped), &unescape_html(l)))
                .unwrap_or_else(|| escaped.to_string());

            format!(
                r#"<pre class="highlight"><code{}>{}</code></pre>"#,
                class_attr, body
            )
        })
        .into_owned()
}

/// Reverses the four entities comrak's escaper produces.
fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
