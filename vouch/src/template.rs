//! Feedback templates.
//!
//! Templates are plain strings with `{{key}}` placeholders. A placeholder
//! whose key has no value renders as the empty string.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.+?)\}\}").expect("placeholder pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Key the status message is rendered under.
pub const STATUS_KEY: &str = "status";

/// Substitute every `{{key}}` in `template` with `values[key]`.
///
/// Keys are matched exactly, whitespace included. Missing keys render as the
/// empty string. Nothing is escaped.
pub fn render(template: &str, values: &HashMap<&str, &str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            values.get(&caps[1]).copied().unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Remove tag-like substrings (`<...>`) from `text`.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    TAG.replace_all(text, "")
}

/// What to do with markup inside validator messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkupPolicy {
    /// Messages are engine-authored and rendered as given.
    #[default]
    Trusted,
    /// Tag-like substrings are stripped before substitution.
    StripTags,
}

impl MarkupPolicy {
    pub fn apply<'a>(&self, message: &'a str) -> Cow<'a, str> {
        match self {
            Self::Trusted => Cow::Borrowed(message),
            Self::StripTags => strip_tags(message),
        }
    }
}

/// Success and error templates for status messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub success: String,
    pub error: String,
}

impl Default for Templates {
    fn default() -> Self {
        let pass_through = format!("{{{{{STATUS_KEY}}}}}");
        Self {
            success: pass_through.clone(),
            error: pass_through,
        }
    }
}

impl Templates {
    pub fn new(success: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            error: error.into(),
        }
    }

    /// The template matching an outcome.
    pub fn select(&self, valid: bool) -> &str {
        if valid { &self.success } else { &self.error }
    }

    /// Render a status message with the template matching `valid`.
    pub fn render_status(&self, valid: bool, message: &str) -> String {
        render(self.select(valid), &HashMap::from([(STATUS_KEY, message)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes() {
        let values = HashMap::from([("status", "ok"), ("name", "first")]);
        assert_eq!(render("<p>{{name}}: {{status}}</p>", &values), "<p>first: ok</p>");
        assert_eq!(render("{{status}}{{status}}", &values), "okok");
    }

    #[test]
    fn test_render_missing_key_is_empty() {
        let values = HashMap::from([("status", "ok")]);
        assert_eq!(render("[{{missing}}]", &values), "[]");
        // Keys are not trimmed.
        assert_eq!(render("[{{ status }}]", &values), "[]");
    }

    #[test]
    fn test_render_without_placeholders() {
        assert_eq!(render("plain", &HashMap::new()), "plain");
        assert_eq!(render("{{}}", &HashMap::new()), "{{}}");
    }

    #[test]
    fn test_render_does_not_escape() {
        let values = HashMap::from([("status", "<b>bold</b>")]);
        assert_eq!(render("{{status}}", &values), "<b>bold</b>");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<script>x</script> hi <b>there</b>"), "x hi there");
        assert_eq!(strip_tags("a < b"), "a < b");
    }

    #[test]
    fn test_markup_policy() {
        assert_eq!(MarkupPolicy::Trusted.apply("<i>x</i>"), "<i>x</i>");
        assert_eq!(MarkupPolicy::StripTags.apply("<i>x</i>"), "x");
    }

    #[test]
    fn test_default_templates_pass_through() {
        let templates = Templates::default();
        assert_eq!(templates.success, "{{status}}");
        assert_eq!(templates.render_status(true, "fine"), "fine");
        assert_eq!(templates.render_status(false, "bad"), "bad");
    }

    #[test]
    fn test_select_by_outcome() {
        let templates = Templates::new("<ok>{{status}}</ok>", "<err>{{status}}</err>");
        assert_eq!(templates.render_status(true, "a"), "<ok>a</ok>");
        assert_eq!(templates.render_status(false, "b"), "<err>b</err>");
    }
}
