//! Shared, mutable document handle.
//!
//! A [`Document`] owns an element tree plus the listeners attached to it. It
//! is cheap to clone: every clone refers to the same tree. Listeners are
//! invoked without any internal lock held, so a listener may freely read and
//! mutate the document or dispatch further events.

use std::sync::{Arc, PoisonError, RwLock};

use crate::element::{find_element, find_element_mut, find_form, find_named, path_to, Content, Element};
use crate::event::{Event, EventKind};
use crate::focus::FocusState;

/// Callback invoked when an event reaches the element it was attached to.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Identifies a listener so it can be detached again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registered {
    id: ListenerId,
    element: String,
    kind: EventKind,
    listener: Listener,
}

struct Tree {
    root: Element,
    focus: FocusState,
    listeners: Vec<Registered>,
    next_listener: u64,
}

#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<Tree>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|tree| {
            f.debug_struct("Document")
                .field("root", &tree.root.id)
                .field("listeners", &tree.listeners.len())
                .finish()
        })
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Tree {
                root,
                focus: FocusState::new(),
                listeners: Vec::new(),
                next_listener: 0,
            })),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Tree) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tree) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Run `f` against the element with `id`, if it exists.
    pub fn with_element<R>(&self, id: &str, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.read(|tree| find_element(&tree.root, id).map(f))
    }

    /// Run `f` against the element with `id` mutably, if it exists.
    pub fn update_element<R>(&self, id: &str, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        self.write(|tree| find_element_mut(&mut tree.root, id).map(f))
    }

    // Queries

    /// ID of the form whose `name` attribute matches.
    pub fn query_form(&self, name: &str) -> Option<String> {
        self.read(|tree| find_form(&tree.root, name).map(|form| form.id.clone()))
    }

    /// ID of the first element named `name` inside the element `scope`.
    pub fn query_named(&self, scope: &str, name: &str) -> Option<String> {
        self.read(|tree| {
            find_element(&tree.root, scope)
                .and_then(|scope| find_named(scope, name))
                .map(|element| element.id.clone())
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.with_element(id, |_| ()).is_some()
    }

    /// The `name` attribute of an element.
    pub fn name_of(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.name.clone()).flatten()
    }

    // Values

    pub fn value(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.value.clone())
    }

    /// Set a control's value. Returns false if the element does not exist.
    /// No event is dispatched; see [`Document::input`] for simulated typing.
    pub fn set_value(&self, id: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_element(id, |el| el.value = value).is_some()
    }

    // Classes

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |el| el.has_class(class))
            .unwrap_or(false)
    }

    pub fn classes(&self, id: &str) -> Vec<String> {
        self.with_element(id, |el| el.classes.clone())
            .unwrap_or_default()
    }

    pub fn add_class(&self, id: &str, class: &str) -> bool {
        self.update_element(id, |el| el.add_class(class))
            .unwrap_or(false)
    }

    pub fn remove_class(&self, id: &str, class: &str) -> bool {
        self.update_element(id, |el| el.remove_class(class))
            .unwrap_or(false)
    }

    // Text

    /// Text content of an element (empty when it has none).
    pub fn text(&self, id: &str) -> Option<String> {
        self.with_element(id, |el| el.text_content().unwrap_or_default().to_string())
    }

    /// Replace an element's content with text, like assigning `innerHTML`.
    pub fn set_text(&self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update_element(id, |el| el.content = Content::Text(text))
            .is_some()
    }

    // Attributes

    pub fn attribute(&self, id: &str, key: &str) -> Option<String> {
        self.with_element(id, |el| el.get_attr(key).cloned()).flatten()
    }

    pub fn set_attribute(&self, id: &str, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_element(id, |el| {
            el.attributes.insert(key.to_string(), value);
        })
        .is_some()
    }

    /// Markup of the element with `id` and its subtree.
    pub fn markup(&self, id: &str) -> Option<String> {
        self.with_element(id, Element::to_markup)
    }

    // Focus

    pub fn focused(&self) -> Option<String> {
        self.read(|tree| tree.focus.focused().map(str::to_string))
    }

    /// Move focus to `id`, dispatching `blur` on the previously focused
    /// element and `focus` on the new one.
    pub fn focus(&self, id: &str) -> bool {
        let changed = self.write(|tree| {
            if find_element(&tree.root, id).is_none() {
                return None;
            }
            let previous = tree.focus.focused().map(str::to_string);
            tree.focus.focus(id).then_some(previous)
        });

        match changed {
            Some(previous) => {
                if let Some(previous) = previous {
                    self.dispatch(Event::new(EventKind::Blur, previous));
                }
                self.dispatch(Event::new(EventKind::Focus, id));
                true
            }
            None => false,
        }
    }

    // Listeners

    /// Attach a listener for `kind` events reaching the element `id`,
    /// either as target or while bubbling from a descendant.
    pub fn add_listener<F>(&self, id: impl Into<String>, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let element = id.into();
        self.write(|tree| {
            let id = ListenerId(tree.next_listener);
            tree.next_listener += 1;
            log::trace!("[document] listener {:?} for '{}' on {}", id, kind, element);
            tree.listeners.push(Registered {
                id,
                element,
                kind,
                listener: Arc::new(listener),
            });
            id
        })
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.write(|tree| {
            let before = tree.listeners.len();
            tree.listeners.retain(|registered| registered.id != id);
            tree.listeners.len() != before
        })
    }

    pub fn listener_count(&self) -> usize {
        self.read(|tree| tree.listeners.len())
    }

    /// Dispatch an event at its target and bubble it to every ancestor.
    ///
    /// Listeners on the target run first, then those on its parent, and so
    /// on up to the root. On a single element listeners run in the order they
    /// were attached. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: Event) -> usize {
        let calls: Vec<(String, Listener)> = self.read(|tree| {
            let mut calls = Vec::new();
            for element in path_to(&tree.root, &event.target).iter().rev() {
                for registered in &tree.listeners {
                    if registered.kind == event.kind && &registered.element == element {
                        calls.push((element.clone(), Arc::clone(&registered.listener)));
                    }
                }
            }
            calls
        });

        log::trace!(
            "[document] dispatch '{}' at {} to {} listener(s)",
            event.kind,
            event.target,
            calls.len()
        );

        let count = calls.len();
        for (current, listener) in calls {
            let event = Event {
                current_target: current,
                ..event.clone()
            };
            listener(&event);
        }
        count
    }

    // Simulated user interaction

    /// Replace a control's value and dispatch `input` at it, as typing would.
    pub fn input(&self, id: &str, value: impl Into<String>) -> bool {
        if !self.set_value(id, value) {
            return false;
        }
        self.dispatch(Event::new(EventKind::Input, id));
        true
    }

    /// Dispatch `change` at a control.
    pub fn change(&self, id: &str) -> usize {
        self.dispatch(Event::new(EventKind::Change, id))
    }

    /// Dispatch `submit` at a form.
    pub fn submit(&self, form: &str) -> usize {
        self.dispatch(Event::new(EventKind::Submit, form))
    }

    /// Dispatch `reset` at a form. Values are left alone; resetting them is
    /// up to the listeners.
    pub fn reset(&self, form: &str) -> usize {
        self.dispatch(Event::new(EventKind::Reset, form))
    }
}
