//! Asynchronous form validation.
//!
//! An [`Engine`] binds to one form in a [`formdom::Document`]. Each field is
//! registered with a [`Lifecycle`]: a validator plus optional hooks. Input
//! events run the field's validator, which reports back through a
//! [`Completion`], right away or later from a task. The engine then records
//! the outcome, renders the status message and notifies subscribers.
//! [`Engine::validate_all`] runs every validator at once and reports a single
//! aggregate result once the last one completes.
//!
//! # Example
//!
//! ```ignore
//! use vouch::prelude::*;
//!
//! let engine = Engine::new(&document, Options::new("signup").event(EventKind::Input))?;
//!
//! engine.delegate([
//!     ("first", Lifecycle::new()
//!         .init(|input| input.focus())
//!         .rules(Rules::new().required("First name required.").success("First name ok."))),
//!     ("username", Lifecycle::new().validate_async(|name| async move {
//!         if lookup(&name).await { Verdict::fail("Taken.") } else { Verdict::pass("Available.") }
//!     })),
//! ])?;
//!
//! engine.on_state_change(|state| println!("valid: {}", state.is_valid()));
//! ```

pub mod engine;
pub mod error;
mod join;
pub mod lifecycle;
pub mod options;
mod presenter;
pub mod registry;
pub mod rules;
mod runner;
pub mod template;

pub use engine::{Engine, StateListener};
pub use error::{Error, ErrorKind, Result};
pub use lifecycle::{Completion, InputHandle, Lifecycle, Verdict};
pub use options::{Options, StalePolicy, StatusClasses, StatusPolicy, Trigger, TriggerMode};
pub use registry::{FormState, FormValues};
pub use rules::Rules;
pub use template::{MarkupPolicy, Templates};

pub use formdom::{Document, Element, EventKind};

pub mod prelude {
    pub use crate::engine::Engine;
    pub use crate::error::{Error, ErrorKind};
    pub use crate::lifecycle::{Completion, InputHandle, Lifecycle, Verdict};
    pub use crate::options::{Options, StalePolicy, StatusClasses, StatusPolicy, TriggerMode};
    pub use crate::registry::{FormState, FormValues};
    pub use crate::rules::Rules;
    pub use crate::template::{MarkupPolicy, Templates};

    pub use formdom::{Document, Element, EventKind};
}
