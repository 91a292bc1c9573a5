//! Engine configuration.

use formdom::EventKind;

use crate::template::{MarkupPolicy, Templates};

/// Per-engine configuration.
///
/// Everything except the form name has a default, so the usual setup is
/// `Options::new("signup")` plus whatever needs changing.
#[derive(Debug, Clone)]
pub struct Options {
    /// `name` attribute of the form to bind to.
    pub name: Option<String>,

    /// How input events reach the validators.
    pub trigger: Trigger,

    /// Templates for rendered status messages.
    pub templates: Templates,

    /// Behavior when a message has nowhere to be rendered.
    pub status_policy: StatusPolicy,

    /// Handling of markup inside validator messages.
    pub markup: MarkupPolicy,

    /// Classes marking a field as passing or failing.
    pub classes: StatusClasses,

    /// Status targets not declared by a lifecycle are looked up by the id
    /// `<field name><status_suffix>`.
    pub status_suffix: String,

    /// Whether outdated completions still overwrite field state.
    pub stale: StalePolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            name: None,
            trigger: Trigger::default(),
            templates: Templates::default(),
            status_policy: StatusPolicy::default(),
            markup: MarkupPolicy::default(),
            classes: StatusClasses::default(),
            status_suffix: DEFAULT_STATUS_SUFFIX.to_string(),
            stale: StalePolicy::default(),
        }
    }
}

impl Options {
    /// Create options for the form with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the triggering discipline.
    pub fn trigger(mut self, mode: TriggerMode) -> Self {
        self.trigger.mode = mode;
        self
    }

    /// Use one delegated listener on the form.
    pub fn delegated(self) -> Self {
        self.trigger(TriggerMode::Delegated)
    }

    /// Use one listener per input.
    pub fn per_field(self) -> Self {
        self.trigger(TriggerMode::PerField)
    }

    /// Set the default event that runs a field's validator.
    pub fn event(mut self, event: EventKind) -> Self {
        self.trigger.event = event;
        self
    }

    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = templates;
        self
    }

    pub fn success_template(mut self, template: impl Into<String>) -> Self {
        self.templates.success = template.into();
        self
    }

    pub fn error_template(mut self, template: impl Into<String>) -> Self {
        self.templates.error = template.into();
        self
    }

    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Fail when a message has no status target.
    pub fn strict(self) -> Self {
        self.status_policy(StatusPolicy::Strict)
    }

    /// Drop messages that have no status target.
    pub fn lenient(self) -> Self {
        self.status_policy(StatusPolicy::Lenient)
    }

    pub fn markup(mut self, markup: MarkupPolicy) -> Self {
        self.markup = markup;
        self
    }

    pub fn classes(mut self, classes: StatusClasses) -> Self {
        self.classes = classes;
        self
    }

    pub fn status_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.status_suffix = suffix.into();
        self
    }

    pub fn stale(mut self, policy: StalePolicy) -> Self {
        self.stale = policy;
        self
    }
}

const DEFAULT_STATUS_SUFFIX: &str = "-status";

/// Triggering configuration, fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub mode: TriggerMode,
    /// Event that runs a field's validator unless its lifecycle overrides it.
    pub event: EventKind,
}

impl Default for Trigger {
    fn default() -> Self {
        Self {
            mode: TriggerMode::PerField,
            event: EventKind::Input,
        }
    }
}

/// Where validation listeners are attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerMode {
    /// One listener on every registered input.
    #[default]
    PerField,
    /// One listener on the form per event kind, matching the event target's
    /// `name` against the registered fields.
    Delegated,
}

/// Behavior when a message must be rendered but the field has no status target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Report [`Error::StatusTarget`](crate::Error::StatusTarget) and leave
    /// the field's markers untouched.
    #[default]
    Strict,
    /// Apply the markers and drop the message.
    Lenient,
}

/// Whether a completion for an outdated request still updates the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Every completion is applied; the last one to arrive wins.
    #[default]
    Apply,
    /// Only the completion of the most recently issued request is applied.
    /// Resets also supersede requests in flight.
    DiscardSuperseded,
}

/// Class names marking a field's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusClasses {
    pub success: String,
    pub error: String,
}

impl Default for StatusClasses {
    fn default() -> Self {
        Self {
            success: "success".to_string(),
            error: "error".to_string(),
        }
    }
}

impl StatusClasses {
    pub fn new(success: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: success.into(),
            error: error.into(),
        }
    }

    pub fn select(&self, valid: bool) -> &str {
        if valid { &self.success } else { &self.error }
    }
}
