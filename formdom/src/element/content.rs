#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    #[default]
    None,
    /// Rendered markup or plain text. Set wholesale, like `innerHTML`.
    Text(String),
    Children(Vec<super::Element>),
}

impl Content {
    pub fn children(&self) -> &[super::Element] {
        match self {
            Self::Children(children) => children,
            _ => &[],
        }
    }
}
