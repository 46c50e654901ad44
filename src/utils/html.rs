// src/utils/html.rs

/// Sanitizes user-authored question content with ammonia's whitelist.
///
/// Safe formatting tags (<b>, <p>, <em>) survive; <script>, <iframe> and
/// event-handler attributes are stripped together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes and trims; `None` when nothing is left.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(|raw| clean_html(raw).trim().to_string())
        .filter(|cleaned| !cleaned.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_keeps_text() {
        let cleaned = clean_html("<b>Freud</b><script>alert(1)</script>");
        assert_eq!(cleaned, "<b>Freud</b>");
    }

    #[test]
    fn empty_explanation_becomes_none() {
        assert_eq!(clean_optional(Some("<script>x</script>  ")), None);
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some(" ok ")), Some("ok".to_string()));
    }
}
