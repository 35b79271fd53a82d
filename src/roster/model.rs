use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// Trim and uppercase a raw name. Returns `None` when nothing is left.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_uppercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Sorted set of unique, uppercased teacher names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: BTreeSet<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from raw names, normalizing and dropping blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .filter_map(|name| normalize_name(name.as_ref()))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact match; callers normalize first when the input is raw.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Insert a raw name. Returns the normalized name if it was new.
    pub fn insert(&mut self, raw: &str) -> Option<String> {
        let name = normalize_name(raw)?;
        if self.names.insert(name.clone()) {
            Some(name)
        } else {
            None
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn union(&self, other: &Roster) -> Roster {
        Roster {
            names: self.names.union(&other.names).cloned().collect(),
        }
    }

    /// Names present here but not in `other`.
    pub fn difference(&self, other: &Roster) -> Roster {
        Roster {
            names: self.names.difference(&other.names).cloned().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

impl Serialize for Roster {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names.iter())
    }
}

impl<'de> Deserialize<'de> for Roster {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(Roster::from_names(names))
    }
}

/// Roster as returned to the admin panel.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterResponse {
    pub names: Vec<String>,
    pub count: usize,
    /// Names added by users on top of the baked-in list.
    pub custom: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddNameRequest {
    #[schema(example = "Ahmad bin Ali")]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddNameResponse {
    /// Normalized name, or `null` when it was blank or already registered.
    pub added: Option<String>,
    pub roster: RosterResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAddRequest {
    /// One name per line, as pasted from a spreadsheet or chat.
    #[schema(example = "AHMAD BIN ALI\nSITI BINTI ABU")]
    pub names: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAddResponse {
    pub added: usize,
    pub message: String,
    pub roster: RosterResponse,
}
