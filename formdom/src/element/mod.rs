mod content;
mod node;

pub use content::Content;
pub use node::{Element, Tag};

/// Find an element by ID in the tree.
pub fn find_element<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.id == id {
        return Some(root);
    }

    for child in root.content.children() {
        if let Some(found) = find_element(child, id) {
            return Some(found);
        }
    }

    None
}

/// Find an element by ID in the tree, mutably.
pub fn find_element_mut<'a>(root: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    if root.id == id {
        return Some(root);
    }

    if let Content::Children(children) = &mut root.content {
        for child in children {
            if let Some(found) = find_element_mut(child, id) {
                return Some(found);
            }
        }
    }

    None
}

/// Find a form element by its `name` attribute.
pub fn find_form<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    if root.tag == Tag::Form && root.name.as_deref() == Some(name) {
        return Some(root);
    }

    root.content
        .children()
        .iter()
        .find_map(|child| find_form(child, name))
}

/// Find the first descendant of `scope` carrying the given `name` attribute.
/// The scope element itself is not considered.
pub fn find_named<'a>(scope: &'a Element, name: &str) -> Option<&'a Element> {
    for child in scope.content.children() {
        if child.name.as_deref() == Some(name) {
            return Some(child);
        }
        if let Some(found) = find_named(child, name) {
            return Some(found);
        }
    }

    None
}

/// IDs from the root down to (and including) the element with `id`.
/// Empty if the element is not in the tree.
pub fn path_to(root: &Element, id: &str) -> Vec<String> {
    let mut path = Vec::new();
    if collect_path(root, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

fn collect_path(element: &Element, id: &str, path: &mut Vec<String>) -> bool {
    path.push(element.id.clone());
    if element.id == id {
        return true;
    }

    for child in element.content.children() {
        if collect_path(child, id, path) {
            return true;
        }
    }

    path.pop();
    false
}
