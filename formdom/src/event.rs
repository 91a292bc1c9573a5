use std::fmt;

/// Event kinds a document can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The value of a control was edited.
    Input,
    /// An edit was committed (the control lost focus after changing).
    Change,
    Focus,
    Blur,
    /// A form was submitted.
    Submit,
    /// A form was reset.
    Reset,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Submit => "submit",
            Self::Reset => "reset",
        }
    }

    /// Parse an event name such as `"input"`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "input" => Some(Self::Input),
            "change" => Some(Self::Change),
            "focus" => Some(Self::Focus),
            "blur" => Some(Self::Blur),
            "submit" => Some(Self::Submit),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event with element targeting.
///
/// Listeners receive the event as it bubbles: `target` is always the element
/// the event was dispatched at, `current_target` is the element whose listener
/// is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: String,
    pub current_target: String,
}

impl Event {
    pub fn new(kind: EventKind, target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            kind,
            current_target: target.clone(),
            target,
        }
    }
}
