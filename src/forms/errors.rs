use std::collections::HashMap;

use serde::{ser::SerializeMap, Serialize, Serializer};

/// Field name -> messages, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
    }

    pub fn all(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

// Templates only ever show the first message per field.
impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, msgs) in &self.0 {
            if let Some(first) = msgs.first() {
                map.serialize_entry(field, first)?;
            }
        }
        map.end()
    }
}
