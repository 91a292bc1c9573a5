//! Per-field lifecycle: the validator plus optional hooks.
//!
//! A [`Lifecycle`] is a record of closures. Only `validate` is required; the
//! engine checks for it when the field is registered and calls every other
//! hook only if it is present.

use std::future::Future;
use std::sync::Arc;

use formdom::{Document, EventKind};

use crate::rules::Rules;

/// Validator closure. Receives the field's current value and a [`Completion`]
/// that must eventually be called exactly once.
pub type ValidateFn = Arc<dyn Fn(String, Completion) + Send + Sync>;

/// One-time setup hook, run at registration and after every reset.
pub type InitFn = Arc<dyn Fn(&InputHandle) + Send + Sync>;

/// Rewrites the raw value on every `input` event.
pub type TransformFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Hook receiving the value that was validated.
pub type ValueHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Outcome of one validator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    /// Message to render. `None` (or empty) renders nothing.
    pub message: Option<String>,
}

impl Verdict {
    pub fn new(valid: bool, message: Option<String>) -> Self {
        Self { valid, message }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(true, Some(message.into()))
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(false, Some(message.into()))
    }

    /// An outcome that renders nothing.
    pub fn silent(valid: bool) -> Self {
        Self::new(valid, None)
    }
}

/// Completion handle passed to a validator.
///
/// Consuming `self` makes a second completion impossible. It may be called
/// right away or moved into a task and called later. A validator that drops
/// it without calling it leaves the field's state as it was, and any
/// `validate_all` waiting on it never finishes.
pub struct Completion {
    finish: Box<dyn FnOnce(Verdict) + Send>,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

impl Completion {
    pub(crate) fn new(finish: impl FnOnce(Verdict) + Send + 'static) -> Self {
        Self {
            finish: Box::new(finish),
        }
    }

    pub fn verdict(self, verdict: Verdict) {
        (self.finish)(verdict);
    }

    pub fn complete(self, valid: bool, message: Option<String>) {
        self.verdict(Verdict::new(valid, message));
    }

    pub fn pass(self, message: impl Into<String>) {
        self.verdict(Verdict::pass(message));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.verdict(Verdict::fail(message));
    }

    pub fn silent(self, valid: bool) {
        self.verdict(Verdict::silent(valid));
    }
}

/// Handle to a bound input, given to `init` hooks.
#[derive(Debug, Clone)]
pub struct InputHandle {
    document: Document,
    id: String,
    name: String,
}

impl InputHandle {
    pub(crate) fn new(document: Document, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            document,
            id: id.into(),
            name: name.into(),
        }
    }

    /// Element id of the input.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn value(&self) -> String {
        self.document.value(&self.id).unwrap_or_default()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.document.set_value(&self.id, value);
    }

    pub fn focus(&self) {
        self.document.focus(&self.id);
    }

    pub fn set_attribute(&self, key: &str, value: impl Into<String>) {
        self.document.set_attribute(&self.id, key, value);
    }
}

/// Validation lifecycle for one field.
///
/// # Example
///
/// ```ignore
/// let first = Lifecycle::new()
///     .init(|input| input.focus())
///     .transform(|value| value.trim_start().to_string())
///     .validate(|value, done| {
///         if value.is_empty() {
///             done.fail("First name required.");
///         } else {
///             done.pass("First name ok.");
///         }
///     });
/// ```
#[derive(Clone, Default)]
pub struct Lifecycle {
    /// Required. Registration fails without it.
    pub validate: Option<ValidateFn>,
    pub init: Option<InitFn>,
    pub transform: Option<TransformFn>,
    pub when_valid: Option<ValueHook>,
    pub when_invalid: Option<ValueHook>,
    /// Overrides the engine's default trigger event for this field.
    pub trigger: Option<EventKind>,
    /// Element id of the status target. When unset the engine assigns one
    /// by naming convention.
    pub status_target: Option<String>,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("validate", &self.validate.is_some())
            .field("init", &self.init.is_some())
            .field("transform", &self.transform.is_some())
            .field("when_valid", &self.when_valid.is_some())
            .field("when_invalid", &self.when_invalid.is_some())
            .field("trigger", &self.trigger)
            .field("status_target", &self.status_target)
            .finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validator.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(String, Completion) + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    /// Set an async validator.
    ///
    /// The future is spawned on the current tokio runtime. Outside a runtime
    /// it is driven to completion on the calling thread instead.
    pub fn validate_async<F, Fut>(self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Verdict> + Send + 'static,
    {
        self.validate(move |value, done| drive(f(value), done))
    }

    /// Validate with a set of synchronous rules.
    pub fn rules(self, rules: Rules) -> Self {
        self.validate(move |value, done| done.verdict(rules.check(&value)))
    }

    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&InputHandle) + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(f));
        self
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn when_valid<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.when_valid = Some(Arc::new(f));
        self
    }

    pub fn when_invalid<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.when_invalid = Some(Arc::new(f));
        self
    }

    /// Run this field's validator on `event` instead of the engine default.
    pub fn on(mut self, event: EventKind) -> Self {
        self.trigger = Some(event);
        self
    }

    pub fn status_target(mut self, id: impl Into<String>) -> Self {
        self.status_target = Some(id.into());
        self
    }

    /// Call the init hook if present.
    pub fn call_init(&self, input: &InputHandle) {
        if let Some(init) = &self.init {
            init(input);
        }
    }

    /// Apply the transform if present.
    pub fn call_transform(&self, value: &str) -> Option<String> {
        self.transform.as_ref().map(|transform| transform(value))
    }

    /// Call `when_valid` or `when_invalid`, whichever matches the outcome.
    pub fn call_outcome(&self, valid: bool, value: &str) {
        let hook = if valid {
            &self.when_valid
        } else {
            &self.when_invalid
        };
        if let Some(hook) = hook {
            hook(value);
        }
    }
}

fn drive<Fut>(future: Fut, done: Completion)
where
    Fut: Future<Output = Verdict> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { done.verdict(future.await) });
        }
        Err(_) => {
            log::debug!("no tokio runtime, running async validator in place");
            done.verdict(futures::executor::block_on(future));
        }
    }
}
