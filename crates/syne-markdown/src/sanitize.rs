use ammonia::Builder;

pub fn sanitize_html(html: &str) -> String {
    create_secure_sanitizer().clean(html).to_string()
}

/// Sanitizes with the defaults only, dropping highlight classes as well.
pub fn sanitize_strict(html: &str) -> String {
    Builder::new().clean(html).to_string()
}

fn create_secure_sanitizer() -> Builder<'static> {
    // ammonia's defaults plus what the renderer itself emits:
    // highlight classes and task list checkboxes
    let mut builder = Builder::new();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("span", &["class"]);
    builder
}
