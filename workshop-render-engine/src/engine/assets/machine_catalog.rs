use std::collections::HashSet;
use std::fmt;

use bevy::prelude::*;
use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Display form of one spec value. Lists are flattened to a comma
/// separated string, nulls are dropped and anything else is shown as JSON.
fn spec_display(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(spec_display)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

/// Ordered key/value technical specifications.
/// Order follows the catalog file, not key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineSpecs(pub Vec<(String, String)>);

impl MachineSpecs {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for MachineSpecs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MachineSpecs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SpecsVisitor;

        impl<'de> Visitor<'de> for SpecsVisitor {
            type Value = MachineSpecs;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of specification names to values")
            }

            // Anything that is not a map leaves the panel empty.
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_str<E: serde::de::Error>(self, _: &str) -> Result<Self::Value, E> {
                Ok(MachineSpecs::default())
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(MachineSpecs::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    if let Some(display) = spec_display(value) {
                        entries.push((key, display));
                    }
                }
                Ok(MachineSpecs(entries))
            }
        }

        deserializer.deserialize_any(SpecsVisitor)
    }
}

/// One machine entry of the workshop catalog. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    pub id: u32,
    pub name: String,
    /// Asset path of the machine texture. Missing images render with the placeholder.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detail_link: String,
    #[serde(default)]
    pub specs: MachineSpecs,
}

/// Ordered machine catalog as a Bevy asset. Mirrors the JSON file.
#[derive(Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineCatalog {
    #[serde(deserialize_with = "deserialize_records")]
    pub machines: Vec<MachineRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Record(MachineRecord),
    Malformed(IgnoredAny),
}

/// Entries that do not form a record are skipped so the rest of the
/// catalog still loads.
fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<MachineRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawRecord>::deserialize(deserializer)?;
    let mut machines = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        match entry {
            RawRecord::Record(record) => machines.push(record),
            RawRecord::Malformed(_) => warn!("Skipping malformed catalog entry at index {index}"),
        }
    }
    Ok(machines)
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate machine id {id} ('{name}') dropped")]
    DuplicateId { id: u32, name: String },
}

impl MachineCatalog {
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&MachineRecord> {
        self.machines.iter().find(|machine| machine.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Drop later entries that reuse an id so ids stay unique.
    /// Returns the cleaned catalog and one error per dropped entry.
    pub fn validated(&self) -> (MachineCatalog, Vec<CatalogError>) {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        let mut machines = Vec::with_capacity(self.machines.len());

        for machine in &self.machines {
            if seen.insert(machine.id) {
                machines.push(machine.clone());
            } else {
                issues.push(CatalogError::DuplicateId {
                    id: machine.id,
                    name: machine.name.clone(),
                });
            }
        }

        (MachineCatalog { machines }, issues)
    }
}

/// Catalog currently driving the scene, after validation.
/// Bumping `generation` invalidates everything derived from the previous catalog.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveCatalog {
    pub catalog: MachineCatalog,
    pub generation: u32,
}

impl ActiveCatalog {
    pub fn replace(&mut self, catalog: MachineCatalog) {
        self.catalog = catalog;
        self.generation = self.generation.wrapping_add(1);
    }
}
