use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use super::Ty;
use crate::error::Result;

/// Struct arm: every key ever observed, plus the distinct key sets seen
/// together in one object (diagnostics only, never compared).
#[derive(Clone, Debug, Default)]
pub struct StructC {
    pub fields: BTreeMap<String, Ty>,
    pub shapes: BTreeSet<Vec<String>>,
}

impl PartialEq for StructC {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for StructC {}

impl StructC {
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, Ty)>) -> Self {
        let fields: BTreeMap<String, Ty> =
            fields.into_iter().map(|(k, ty)| (k.into(), ty)).collect();
        let shapes = BTreeSet::from([fields.keys().cloned().collect()]);
        Self { fields, shapes }
    }

    pub(super) fn observe(map: &Map<String, Value>) -> Result<Self> {
        let mut fields = BTreeMap::new();
        for (k, v) in map {
            fields.insert(k.clone(), super::observe_value(v)?);
        }
        let shapes = BTreeSet::from([fields.keys().cloned().collect()]);
        Ok(Self { fields, shapes })
    }

    /// Keys only on one side are carried as-is; optionality is not tracked.
    pub(super) fn join(mut a: Self, b: Self) -> Self {
        for (k, tb) in b.fields {
            let merged = match a.fields.remove(&k) {
                Some(ta) => super::join(ta, tb),
                None => tb,
            };
            a.fields.insert(k, merged);
        }
        a.shapes.extend(b.shapes);
        a
    }
}
