pub mod document;
pub mod element;
pub mod event;
pub mod focus;

pub use document::{Document, Listener, ListenerId};
pub use element::{Content, Element, Tag};
pub use event::{Event, EventKind};
pub use focus::FocusState;
