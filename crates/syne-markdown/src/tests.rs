#[cfg(test)]
mod unit_tests {
    use super::super::*;

    #[test]
    fn test_sanitize_drops_script_elements() {
        let html = r#"<h2>Intro</h2><script>document.cookie</script><p>Body</p>"#;
        let clean = sanitize::sanitize_html(html);
        assert_eq!(clean, "<h2>Intro</h2><p>Body</p>");
    }

    #[test]
    fn test_sanitize_keeps_highlight_classes() {
        let html = r#"<pre class="highlight"><code class="language-rust"><span class="hl-source hl-rust">fn</span></code></pre>"#;
        let sanitized = sanitize::sanitize_html(html);
        assert!(sanitized.contains(r#"class="highlight""#));
        assert!(sanitized.contains(r#"class="hl-source hl-rust""#));

        let strict = sanitize::sanitize_strict(html);
        assert!(!strict.contains("hl-source"));
    }

    #[test]
    fn test_sanitize_drops_script_urls_and_handlers() {
        let html = r#"<a href="javascript:void(0)" onclick="steal()">demo</a><img src="x.png" onerror="steal()">"#;
        let clean = sanitize::sanitize_html(html);
        assert!(!clean.contains("javascript:"));
        assert!(!clean.contains("steal"));
        assert!(clean.contains("demo"));
    }

    #[test]
    fn test_raw_html_in_article_is_escaped() {
        let html = render_safe("Inline <script>track()</script> tag");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_safe_keeps_highlighting() {
        let html = render_safe("```python\nprint('hi')\n```");
        assert!(html.contains("language-python"));
        assert!(html.contains("hl-"));
    }

    #[test]
    fn test_plain_text_strips_markup() {
        insta::assert_snapshot!(
            extract_plain_text("# Title\n\nHello **world**, see [docs](https://example.com)."),
            @"Title
Hello world, see docs."
        );
    }

    #[test]
    fn test_plain_text_keeps_code() {
        let text = extract_plain_text("Use `ref`:\n\n```ts\nconst a = ref(0)\n```\n");
        assert!(text.contains("Use ref:"));
        assert!(text.contains("const a = ref(0)"));
        assert!(!text.contains("```"));
    }

    #[test]
    fn test_truncate_appends_suffix_only_when_cut() {
        assert_eq!(truncate("hello", 5, "..."), "hello");
        assert_eq!(truncate("hello world", 5, "..."), "hello...");
        assert_eq!(truncate("", 3, "..."), "");
        assert_eq!(truncate("状态管理最佳实践", 4, "…"), "状态管理…");
    }

    #[test]
    fn test_truncate_does_not_split_graphemes() {
        let text = "e\u{301}e\u{301}e\u{301}";
        assert_eq!(truncate(text, 2, ""), "e\u{301}e\u{301}");
    }

    #[test]
    fn test_summary() {
        let md = "# Heading\n\nSome *body* text that goes on.";
        assert_eq!(summary(md, 7), "Heading...");
        assert_eq!(summary("short", text::DEFAULT_SUMMARY_LENGTH), "short");
    }

    #[test]
    fn test_reading_time() {
        let words = vec!["word"; 601].join(" ");
        assert_eq!(reading_time(&words, 300), 3);
        assert_eq!(reading_time("", 300), 0);
        assert_eq!(reading_time("one two", 0), 1);
    }
}
