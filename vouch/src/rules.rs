//! Rule-based validators for string fields.

use regex::Regex;

use crate::lifecycle::Verdict;

type Rule = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Ordered list of synchronous rules.
///
/// Rules run in the order they were added and the first failure decides the
/// message. A value passing every rule gets the success message, if one was
/// set, and renders nothing otherwise.
///
/// # Example
///
/// ```ignore
/// let password = Rules::new()
///     .required("Password required.")
///     .pattern(Regex::new(r"^\w{4,20}$")?, "4 to 20 word characters.")
///     .success("Password ok.");
///
/// let lifecycle = Lifecycle::new().rules(password);
/// ```
#[derive(Default)]
pub struct Rules {
    rules: Vec<Rule>,
    success: Option<String>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom rule.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.rules
            .push(Box::new(move |v| if f(v) { Ok(()) } else { Err(msg.clone()) }));
        self
    }

    /// Message rendered when every rule passes.
    pub fn success(mut self, msg: impl Into<String>) -> Self {
        self.success = Some(msg.into());
        self
    }

    /// Require the field to be non-blank.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v| !v.trim().is_empty(), msg)
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() >= min, msg)
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v| v.chars().count() <= max, msg)
    }

    /// Require the value to match a regex.
    pub fn pattern(self, re: Regex, msg: impl Into<String>) -> Self {
        self.rule(move |v| re.is_match(v), msg)
    }

    /// Require a valid email address. Empty values pass; combine with
    /// [`Rules::required`] to reject them.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(
            |v| v.is_empty() || email_address::EmailAddress::is_valid(v),
            msg,
        )
    }

    /// Require the value to equal `other`.
    pub fn equals(self, other: impl Into<String>, msg: impl Into<String>) -> Self {
        let other = other.into();
        self.rule(move |v| v == other, msg)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check a value against every rule.
    pub fn check(&self, value: &str) -> Verdict {
        for rule in &self.rules {
            if let Err(msg) = rule(value) {
                return Verdict::fail(msg);
            }
        }
        Verdict::new(true, self.success.clone())
    }
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("rules", &self.rules.len())
            .field("success", &self.success)
            .finish()
    }
}
