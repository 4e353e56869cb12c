pub mod highlight;
pub mod markdown;
pub mod sanitize;
pub mod text;

pub use highlight::Highlighter;
pub use markdown::{render_safe, to_html, Renderer};
pub use text::{extract_plain_text, reading_time, summary, truncate};

#[cfg(test)]
mod tests;
