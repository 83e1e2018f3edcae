//! Confirmed mappings with at most one entry per target field.

use fireems_model::FieldMapping;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered mapping list keyed by target field.
///
/// Inserting a mapping for a target that is already mapped replaces the existing
/// entry in place (last write wins, position kept). One source column may still
/// feed several targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingSet {
    entries: Vec<FieldMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a possibly duplicated list; later entries win.
    pub fn from_vec(mappings: Vec<FieldMapping>) -> Self {
        let mut set = Self::new();
        for mapping in mappings {
            set.insert(mapping);
        }
        set
    }

    /// Inserts a mapping, returning the entry it replaced.
    pub fn insert(&mut self, mapping: FieldMapping) -> Option<FieldMapping> {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.target_field == mapping.target_field)
        {
            Some(existing) => Some(std::mem::replace(existing, mapping)),
            None => {
                self.entries.push(mapping);
                None
            }
        }
    }

    /// Removes the mapping for a target field.
    pub fn remove(&mut self, target_field: &str) -> Option<FieldMapping> {
        let index = self
            .entries
            .iter()
            .position(|mapping| mapping.target_field == target_field)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, target_field: &str) -> Option<&FieldMapping> {
        self.entries
            .iter()
            .find(|mapping| mapping.target_field == target_field)
    }

    pub fn contains_target(&self, target_field: &str) -> bool {
        self.get(target_field).is_some()
    }

    /// Mappings fed by one source column.
    pub fn by_source<'a>(&'a self, source_field: &'a str) -> impl Iterator<Item = &'a FieldMapping> {
        self.entries
            .iter()
            .filter(move |mapping| mapping.source_field == source_field)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldMapping> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[FieldMapping] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<FieldMapping> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'de> Deserialize<'de> for MappingSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<FieldMapping>::deserialize(deserializer).map(Self::from_vec)
    }
}

impl FromIterator<FieldMapping> for MappingSet {
    fn from_iter<I: IntoIterator<Item = FieldMapping>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a FieldMapping;
    type IntoIter = std::slice::Iter<'a, FieldMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<MappingSet> for Vec<FieldMapping> {
    fn from(set: MappingSet) -> Self {
        set.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_in_place() {
        let mut set = MappingSet::new();
        set.insert(FieldMapping::new("Inc #", "incident_id"));
        set.insert(FieldMapping::new("Lat", "latitude"));
        let replaced = set.insert(FieldMapping::new("Incident Number", "incident_id"));

        assert_eq!(replaced.map(|m| m.source_field), Some("Inc #".to_string()));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].source_field, "Incident Number");
        assert_eq!(set.as_slice()[1].target_field, "latitude");
    }

    #[test]
    fn from_vec_dedupes_targets() {
        let set = MappingSet::from_vec(vec![
            FieldMapping::new("a", "x"),
            FieldMapping::new("b", "y"),
            FieldMapping::new("c", "x"),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("x").map(|m| m.source_field.as_str()), Some("c"));
    }

    #[test]
    fn source_may_fan_out() {
        let set = MappingSet::from_vec(vec![
            FieldMapping::new("Call Received", "incident_date"),
            FieldMapping::new("Call Received", "incident_time"),
        ]);
        assert_eq!(set.by_source("Call Received").count(), 2);
    }

    #[test]
    fn deserialize_applies_uniqueness() {
        let set: MappingSet = serde_json::from_str(
            r#"[{"sourceField":"a","targetField":"x"},{"sourceField":"b","targetField":"x"}]"#,
        )
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("x").map(|m| m.source_field.as_str()), Some("b"));
    }

    #[test]
    fn remove_target() {
        let mut set = MappingSet::from_vec(vec![FieldMapping::new("a", "x")]);
        assert!(set.remove("x").is_some());
        assert!(set.remove("x").is_none());
        assert!(set.is_empty());
    }
}
