use anyhow::Result;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Every highlight span carries this prefix so the stylesheet from
/// [`Highlighter::css`] cannot collide with the site's own classes.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Syntax highlighter that turns fenced code into class-annotated HTML spans.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();

        let theme = theme_set
            .themes
            .get(theme_name)
            .cloned()
            .or_else(|| theme_set.themes.get(DEFAULT_THEME).cloned())
            .unwrap_or_default();

        Self {
            syntax_set,
            theme_set,
            theme,
        }
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        match self.theme_set.themes.get(theme_name) {
            Some(t) => {
                self.theme = t.clone();
                true
            }
            None => {
                log::warn!("Unknown highlight theme '{}', keeping current", theme_name);
                false
            }
        }
    }

    /// Resolves a fence info token (`rust`, `rs`, `Python`, ...) to a syntax.
    /// Plain text counts as unsupported so it stays escaped verbatim.
    pub fn find_syntax<'a>(&'a self, lang: &str) -> Option<&'a SyntaxReference> {
        let token = lang.trim();
        if token.is_empty() {
            return None;
        }
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .filter(|syntax| syntax.name != self.syntax_set.find_syntax_plain_text().name)
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.find_syntax(lang).is_some()
    }

    /// Highlights `code` as `lang`. Returns `None` when the language is not
    /// known or the grammar fails on the input; the caller then keeps the
    /// escaped plain text.
    pub fn highlight_html(&self, code: &str, lang: &str) -> Option<String> {
        let syntax = self.find_syntax(lang)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);

        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                log::warn!("Highlighting {} block failed: {}", lang, e);
                return None;
            }
        }

        Some(generator.finalize())
    }

    /// Stylesheet for the spans produced by [`Highlighter::highlight_html`].
    pub fn css(&self) -> Result<String> {
        Ok(css_for_theme_with_class_style(&self.theme, CLASS_STYLE)?)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}
