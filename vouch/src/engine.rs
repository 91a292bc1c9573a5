//! The per-form engine.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use formdom::{Document, Event, EventKind, ListenerId};
use futures::channel::oneshot;

use crate::error::{Error, Result};
use crate::join::Join;
use crate::lifecycle::{InputHandle, Lifecycle};
use crate::options::{Options, TriggerMode};
use crate::presenter::Presenter;
use crate::registry::{Binding, Field, FormState, FormValues, Registry};
use crate::runner::{self, Run};

/// Observer of validity changes.
pub type StateListener = Arc<dyn Fn(&FormState) + Send + Sync>;

pub(crate) struct Inner {
    pub(crate) document: Document,
    pub(crate) options: Options,
    form_id: String,
    form_name: String,
    registry: RwLock<Registry>,
    subscribers: RwLock<Vec<StateListener>>,
    /// Event kinds that already have a delegated listener on the form.
    delegated: Mutex<HashSet<EventKind>>,
}

impl Inner {
    pub(crate) fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub(crate) fn with_registry_mut<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn presenter(&self) -> Presenter<'_> {
        Presenter::new(&self.document, &self.options)
    }

    fn binding(&self, name: &str) -> Result<Binding> {
        self.with_registry(|registry| registry.get(name).map(|field| field.binding.clone()))
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    fn trigger_of(&self, lifecycle: &Lifecycle) -> EventKind {
        lifecycle.trigger.unwrap_or(self.options.trigger.event)
    }

    /// Send the current snapshot to every subscriber.
    pub(crate) fn notify(&self) {
        let snapshot = self.with_registry(Registry::snapshot);
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

/// Validation engine bound to one form.
///
/// Cheap to clone; clones share the same fields and subscribers. Listeners
/// attached to the document hold only weak references, so dropping every
/// clone detaches the engine from the form's events.
///
/// # Example
///
/// ```ignore
/// let engine = Engine::new(&document, Options::new("signup"))?;
/// engine.delegate([
///     ("username", Lifecycle::new().rules(Rules::new().required("Required."))),
///     ("password", Lifecycle::new().validate(check_password)),
/// ])?;
///
/// engine.validate_all(|all_valid| {
///     if all_valid {
///         submit();
///     }
/// });
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("form", &self.inner.form_name)
            .field("fields", &self.field_names())
            .finish()
    }
}

impl Engine {
    /// Bind an engine to the form named in `options`.
    pub fn new(document: &Document, options: Options) -> Result<Self> {
        let form_name = options
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingFormName)?;
        let form_id = document
            .query_form(&form_name)
            .ok_or_else(|| Error::FormNotFound(form_name.clone()))?;

        log::debug!("[engine] bound to form '{}' ({})", form_name, form_id);

        Ok(Self {
            inner: Arc::new(Inner {
                document: document.clone(),
                options,
                form_id,
                form_name,
                registry: RwLock::default(),
                subscribers: RwLock::default(),
                delegated: Mutex::default(),
            }),
        })
    }

    // Registration

    /// Register fields.
    ///
    /// Every entry is checked before any is registered: if one entry is
    /// invalid the call fails and nothing changes. Registered inputs get
    /// `autocomplete="off"`, their `init` hook runs, and their transform and
    /// trigger listeners are attached, in declaration order.
    pub fn delegate<I, K>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Lifecycle)>,
        K: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for (name, lifecycle) in entries {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateField(name));
            }
            fields.push(self.prepare(name, lifecycle)?);
        }

        let attached: Vec<(Binding, Lifecycle)> = fields
            .iter()
            .map(|field| (field.binding.clone(), field.lifecycle.clone()))
            .collect();

        self.inner.with_registry_mut(|registry| {
            if let Some(taken) = fields.iter().find(|field| registry.contains(field.name())) {
                return Err(Error::DuplicateField(taken.name().to_string()));
            }
            for field in fields {
                registry.insert(field)?;
            }
            Ok(())
        })?;

        for (binding, lifecycle) in &attached {
            log::debug!(
                "[engine] registered '{}' (input {}, status {:?})",
                binding.name,
                binding.input,
                binding.target
            );
            self.attach(binding, lifecycle);
        }
        Ok(())
    }

    fn prepare(&self, name: String, lifecycle: Lifecycle) -> Result<Field> {
        let inner = &self.inner;
        if inner.with_registry(|registry| registry.contains(&name)) {
            return Err(Error::DuplicateField(name));
        }

        let input = inner
            .document
            .query_named(&inner.form_id, &name)
            .ok_or_else(|| Error::FieldNotFound {
                field: name.clone(),
                form: inner.form_name.clone(),
            })?;

        let validate = lifecycle
            .validate
            .clone()
            .ok_or_else(|| Error::MissingValidate(name.clone()))?;

        let target = match &lifecycle.status_target {
            Some(target) if inner.document.contains(target) => Some(target.clone()),
            Some(target) => {
                return Err(Error::StatusTargetNotFound {
                    field: name,
                    target: target.clone(),
                });
            }
            None => {
                let conventional = format!("{name}{}", inner.options.status_suffix);
                inner.document.contains(&conventional).then_some(conventional)
            }
        };

        Ok(Field::new(Binding { name, input, target }, lifecycle, validate))
    }

    fn attach(&self, binding: &Binding, lifecycle: &Lifecycle) {
        let document = &self.inner.document;
        document.set_attribute(&binding.input, "autocomplete", "off");
        lifecycle.call_init(&InputHandle::new(
            document.clone(),
            &binding.input,
            &binding.name,
        ));

        if lifecycle.transform.is_some() {
            let weak = Arc::downgrade(&self.inner);
            let input = binding.input.clone();
            let lifecycle = lifecycle.clone();
            document.add_listener(binding.input.clone(), EventKind::Input, move |_| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let current = inner.document.value(&input).unwrap_or_default();
                if let Some(rewritten) = lifecycle.call_transform(&current) {
                    inner.document.set_value(&input, rewritten);
                }
            });
        }

        let kind = self.inner.trigger_of(lifecycle);
        match self.inner.options.trigger.mode {
            TriggerMode::PerField => {
                let weak = Arc::downgrade(&self.inner);
                let name = binding.name.clone();
                document.add_listener(binding.input.clone(), kind, move |_| {
                    if let Some(inner) = weak.upgrade() {
                        log::debug!("[engine] '{}' triggered on '{}'", name, kind);
                        if let Err(err) = runner::start(&inner, &name, Run::Single) {
                            log::error!("[engine] {err}");
                        }
                    }
                });
            }
            TriggerMode::Delegated => self.ensure_delegated(kind),
        }
    }

    /// Install the form-level listener for `kind` if it is not there yet.
    fn ensure_delegated(&self, kind: EventKind) {
        let installed = !self
            .inner
            .delegated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind);
        if installed {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        self.inner
            .document
            .add_listener(self.inner.form_id.clone(), kind, move |event: &Event| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Some(name) = inner.document.name_of(&event.target) else {
                    return;
                };
                let registered = inner.with_registry(|registry| {
                    registry.get(&name).is_some_and(|field| {
                        field.binding.input == event.target
                            && inner.trigger_of(&field.lifecycle) == kind
                    })
                });
                if registered {
                    log::debug!("[engine] '{}' triggered on '{}' (delegated)", name, kind);
                    if let Err(err) = runner::start(&inner, &name, Run::Single) {
                        log::error!("[engine] {err}");
                    }
                }
            });
    }

    // Validation

    /// Run one field's validator.
    ///
    /// The outcome is observed through the field's state, its status and the
    /// subscribers, whenever the validator completes.
    pub fn run_validation(&self, name: &str) -> Result<()> {
        runner::start(&self.inner, name, Run::Single)
    }

    /// Run every field's validator and call `callback` once with the AND of
    /// all outcomes, after the last one completes.
    ///
    /// Statuses are rendered as each field completes. `when_valid` and
    /// `when_invalid` hooks do not fire, and subscribers are notified once,
    /// right before `callback`. With no fields `callback(true)` runs
    /// immediately.
    pub fn validate_all<F>(&self, callback: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let names = self.field_names();
        if names.is_empty() {
            log::debug!("[engine] validate_all on an empty form");
            callback(true);
            return;
        }

        log::debug!("[engine] validate_all over {} field(s)", names.len());
        let join = Join::new(names.len(), Box::new(callback));
        for name in names {
            if let Err(err) = runner::start(&self.inner, &name, Run::Joined(Arc::clone(&join))) {
                log::error!("[engine] {err}");
            }
        }
    }

    /// [`Engine::validate_all`] as a future.
    ///
    /// Validation starts immediately, not when the future is first polled.
    /// Like the callback form, the future stays pending if a validator never
    /// completes.
    pub fn validate_all_async(&self) -> impl Future<Output = bool> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.validate_all(move |all_valid| {
            let _ = tx.send(all_valid);
        });
        async move {
            match rx.await {
                Ok(all_valid) => all_valid,
                Err(_) => std::future::pending().await,
            }
        }
    }

    // Status

    /// Mark a field and render `message` into its status target.
    pub fn show_status(&self, name: &str, valid: bool, message: Option<&str>) -> Result<()> {
        let binding = self.inner.binding(name)?;
        self.inner.presenter().show(&binding, valid, message)
    }

    /// Clear a field's markers and message.
    pub fn hide_status(&self, name: &str) -> Result<()> {
        let binding = self.inner.binding(name)?;
        self.inner.presenter().hide(&binding);
        Ok(())
    }

    // Reset

    /// Reset every field, then notify subscribers once.
    ///
    /// Per field: hide the status, mark invalid, blank the value when
    /// `clear_values` is set, then run `init` again.
    pub fn reset(&self, clear_values: bool) {
        for name in self.field_names() {
            if let Err(err) = self.reset_one(&name, clear_values) {
                log::error!("[engine] {err}");
            }
        }
        self.inner.notify();
    }

    /// Reset one field, then notify subscribers.
    pub fn reset_field(&self, name: &str, clear_value: bool) -> Result<()> {
        self.reset_one(name, clear_value)?;
        self.inner.notify();
        Ok(())
    }

    fn reset_one(&self, name: &str, clear_value: bool) -> Result<()> {
        let inner = &self.inner;
        let (binding, lifecycle) = inner
            .with_registry_mut(|registry| {
                registry.get_mut(name).map(|field| {
                    inner.presenter().hide(&field.binding);
                    field.valid = false;
                    // Supersedes requests still in flight.
                    field.issued += 1;
                    (field.binding.clone(), field.lifecycle.clone())
                })
            })
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;

        let document = &self.inner.document;
        if clear_value {
            document.set_value(&binding.input, "");
        }
        lifecycle.call_init(&InputHandle::new(
            document.clone(),
            &binding.input,
            &binding.name,
        ));
        Ok(())
    }

    // Queries

    /// True when every field passed its last validation. Runs nothing.
    pub fn is_valid(&self) -> bool {
        self.inner.with_registry(Registry::all_valid)
    }

    pub fn state(&self) -> FormState {
        self.inner.with_registry(Registry::snapshot)
    }

    pub fn values(&self) -> FormValues {
        let bindings: Vec<Binding> = self.inner.with_registry(|registry| {
            registry.iter().map(|field| field.binding.clone()).collect()
        });
        bindings
            .into_iter()
            .map(|binding| {
                let value = self.inner.document.value(&binding.input).unwrap_or_default();
                (binding.name, value)
            })
            .collect()
    }

    /// Write the values of the named fields; others are left alone.
    /// Names that are not registered are skipped.
    pub fn set_values<I, K, V>(&self, values: I, run_validation: bool)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in values {
            let name = name.as_ref();
            let Ok(binding) = self.inner.binding(name) else {
                log::debug!("[engine] set_values: '{}' is not registered", name);
                continue;
            };
            self.inner.document.set_value(&binding.input, value);
            if run_validation {
                if let Err(err) = self.run_validation(name) {
                    log::error!("[engine] {err}");
                }
            }
        }
    }

    // Subscriptions

    /// Observe validity changes.
    pub fn on_state_change<F>(&self, listener: F)
    where
        F: Fn(&FormState) + Send + Sync + 'static,
    {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Listen for events reaching the form, such as `submit` and `reset`.
    pub fn on_form_event<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.inner
            .document
            .add_listener(self.inner.form_id.clone(), kind, listener)
    }

    // Accessors

    pub fn field_names(&self) -> Vec<String> {
        self.inner.with_registry(Registry::names)
    }

    pub fn len(&self) -> usize {
        self.inner.with_registry(Registry::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element id of a field's input.
    pub fn input_id(&self, name: &str) -> Option<String> {
        self.inner.binding(name).ok().map(|binding| binding.input)
    }

    /// Element id of a field's status target.
    pub fn status_target(&self, name: &str) -> Option<String> {
        self.inner.binding(name).ok().and_then(|binding| binding.target)
    }

    pub fn form_id(&self) -> &str {
        &self.inner.form_id
    }

    pub fn form_name(&self) -> &str {
        &self.inner.form_name
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }
}
