//! Field registry and state snapshots.

use std::collections::HashMap;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::lifecycle::{Lifecycle, ValidateFn};

/// Where a field lives in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub name: String,
    /// Element id of the input.
    pub input: String,
    /// Element id of the status target, if the field has one.
    pub target: Option<String>,
}

/// One registered field.
pub(crate) struct Field {
    pub binding: Binding,
    pub lifecycle: Lifecycle,
    pub validate: ValidateFn,
    pub valid: bool,
    /// Sequence number of the latest validation request.
    pub issued: u64,
}

impl Field {
    pub fn new(binding: Binding, lifecycle: Lifecycle, validate: ValidateFn) -> Self {
        Self {
            binding,
            lifecycle,
            validate,
            valid: false,
            issued: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.binding.name
    }
}

/// Registered fields in declaration order.
#[derive(Default)]
pub(crate) struct Registry {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.index.get(name).map(|&i| &mut self.fields[i])
    }

    /// Add a field. Names are unique for the life of the registry.
    pub fn insert(&mut self, field: Field) -> Result<()> {
        if self.contains(field.name()) {
            return Err(Error::DuplicateField(field.name().to_string()));
        }
        self.index.insert(field.name().to_string(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().to_string()).collect()
    }

    pub fn all_valid(&self) -> bool {
        self.fields.iter().all(|f| f.valid)
    }

    pub fn snapshot(&self) -> FormState {
        FormState {
            fields: self
                .fields
                .iter()
                .map(|f| (f.name().to_string(), f.valid))
                .collect(),
        }
    }
}

/// Snapshot of every field's validity, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: Vec<(String, bool)>,
}

impl FormState {
    pub fn get(&self, name: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|&(_, valid)| valid)
    }

    /// True when every field is valid (and vacuously for an empty form).
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|&(_, valid)| valid)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.fields.iter().map(|(name, valid)| (name.as_str(), *valid))
    }
}

impl Index<&str> for FormState {
    type Output = bool;

    /// Panics if `name` is not a field of the form.
    fn index(&self, name: &str) -> &bool {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, valid)| valid)
            .unwrap_or_else(|| panic!("no field named '{name}'"))
    }
}

impl Serialize for FormState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, valid) in &self.fields {
            map.serialize_entry(name, valid)?;
        }
        map.end()
    }
}

/// Field values, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: Vec<(String, String)>,
}

impl FormValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
