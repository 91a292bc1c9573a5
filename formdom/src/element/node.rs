use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::Content;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// Element kind. Only forms and value-carrying controls get special treatment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tag {
    #[default]
    Div,
    Span,
    Label,
    Form,
    Input,
    TextArea,
    Button,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Span => "span",
            Self::Label => "label",
            Self::Form => "form",
            Self::Input => "input",
            Self::TextArea => "textarea",
            Self::Button => "button",
        }
    }

    /// Whether elements of this kind hold an editable value.
    pub fn has_value(&self) -> bool {
        matches!(self, Self::Input | Self::TextArea)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    // Identity
    pub id: String,
    pub tag: Tag,
    /// The `name` attribute. Forms are looked up by it, and so are the
    /// controls inside a form.
    pub name: Option<String>,

    // Control state
    pub value: String,

    // Visual
    pub classes: Vec<String>,

    // Other attributes (`autocomplete`, `placeholder`, ...)
    pub attributes: BTreeMap<String, String>,

    // Content
    pub content: Content,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            id: generate_id("el"),
            tag: Tag::Div,
            name: None,
            value: String::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            content: Content::None,
        }
    }
}

impl Element {
    pub fn div() -> Self {
        Self {
            id: generate_id("div"),
            ..Default::default()
        }
    }

    pub fn span() -> Self {
        Self {
            id: generate_id("span"),
            tag: Tag::Span,
            ..Default::default()
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            id: generate_id("label"),
            tag: Tag::Label,
            content: Content::Text(text.into()),
            ..Default::default()
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: generate_id("text"),
            tag: Tag::Span,
            content: Content::Text(content.into()),
            ..Default::default()
        }
    }

    /// Create a form container with the given `name` attribute.
    pub fn form(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: generate_id("form"),
            tag: Tag::Form,
            name: Some(name),
            ..Default::default()
        }
    }

    /// Create a text input with the given `name` attribute.
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            id: generate_id("input"),
            tag: Tag::Input,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Create a multi-line text input with the given `name` attribute.
    pub fn textarea(name: impl Into<String>) -> Self {
        Self {
            id: generate_id("textarea"),
            tag: Tag::TextArea,
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self {
            id: generate_id("button"),
            tag: Tag::Button,
            content: Content::Text(label.into()),
            ..Default::default()
        }
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // Control state
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    // Visual
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class. Returns false if it was already present.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    /// Remove a class. Returns false if it was not present.
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    // Attributes
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    // Children
    pub fn child(mut self, child: Element) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => {
                // Replace content with children
                self.content = Content::Children(vec![child]);
            }
        }
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        match &mut self.content {
            Content::Children(children) => children.extend(new_children),
            _ => {
                self.content = Content::Children(new_children.into_iter().collect());
            }
        }
        self
    }

    /// Text content, if this element holds text rather than children.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serialize this element and its subtree to HTML-like markup.
    ///
    /// Attributes are emitted in a fixed order (`id`, `name`, `class`,
    /// `value`, then the rest sorted by key), so two trees with the same
    /// state always produce the same string.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let tag = self.tag.as_str();
        out.push('<');
        out.push_str(tag);
        out.push_str(&format!(" id=\"{}\"", self.id));
        if let Some(name) = &self.name {
            out.push_str(&format!(" name=\"{name}\""));
        }
        if !self.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", self.classes.join(" ")));
        }
        if self.tag.has_value() {
            out.push_str(&format!(" value=\"{}\"", self.value));
        }
        for (key, value) in &self.attributes {
            out.push_str(&format!(" {key}=\"{value}\""));
        }
        out.push('>');

        match &self.content {
            Content::None => {}
            Content::Text(text) => out.push_str(text),
            Content::Children(children) => {
                for child in children {
                    child.write_markup(out);
                }
            }
        }

        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}
