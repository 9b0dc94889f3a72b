use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::fields::is_blank;

/// An untyped record read from the legacy interest store.
pub type SourceRecord = Value;

// --- Metadata ---

/// Ordered string-to-string bag of auxiliary values.
///
/// Keys are added only when the source value is present and non-blank, so a
/// bag never carries null or empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetadataBag(IndexMap<String, String>);

impl MetadataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` if it is present and non-blank.
    /// The first value written for a key wins. Returns whether it was stored.
    pub fn insert_present(&mut self, key: impl Into<String>, value: Option<String>) -> bool {
        match value {
            Some(value) if !is_blank(&value) => {
                let key = key.into();
                if self.0.contains_key(&key) {
                    return false;
                }
                self.0.insert(key, value);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metadata attached to an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionMetadata {
    /// Field-by-field filtered values (all live rules).
    Bag(MetadataBag),
    /// The source item copied as-is (legacy sports/finance rules).
    Verbatim(Map<String, Value>),
}

impl ActionMetadata {
    pub fn as_bag(&self) -> Option<&MetadataBag> {
        match self {
            ActionMetadata::Bag(bag) => Some(bag),
            ActionMetadata::Verbatim(_) => None,
        }
    }
}

impl Default for ActionMetadata {
    fn default() -> Self {
        ActionMetadata::Bag(MetadataBag::new())
    }
}

// --- Normalized records ---

/// "User follows/prefers target."
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAction {
    pub id: String,
    pub owner_id: String,
    pub partition_key: String,
    pub target_id: String,
    pub target_type: String,
    pub action_type: String,
    pub definition_name: String,
    pub degree: Option<String>,
    pub rank: Option<u32>,
    pub created_date_time: Option<String>,
    pub metadata: ActionMetadata,
}

/// One settings record per user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedUserSettings {
    pub id: String,
    pub partition_key: String,
    pub user_settings: MetadataBag,
}

/// Output of a transformation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedRecord {
    Action(NormalizedAction),
    UserSettings(NormalizedUserSettings),
}

impl NormalizedRecord {
    pub fn id(&self) -> &str {
        match self {
            NormalizedRecord::Action(a) => &a.id,
            NormalizedRecord::UserSettings(s) => &s.id,
        }
    }

    pub fn partition_key(&self) -> &str {
        match self {
            NormalizedRecord::Action(a) => &a.partition_key,
            NormalizedRecord::UserSettings(s) => &s.partition_key,
        }
    }

    pub fn as_action(&self) -> Option<&NormalizedAction> {
        match self {
            NormalizedRecord::Action(a) => Some(a),
            NormalizedRecord::UserSettings(_) => None,
        }
    }

    pub fn as_user_settings(&self) -> Option<&NormalizedUserSettings> {
        match self {
            NormalizedRecord::Action(_) => None,
            NormalizedRecord::UserSettings(s) => Some(s),
        }
    }
}

impl From<NormalizedAction> for NormalizedRecord {
    fn from(action: NormalizedAction) -> Self {
        NormalizedRecord::Action(action)
    }
}

impl From<NormalizedUserSettings> for NormalizedRecord {
    fn from(settings: NormalizedUserSettings) -> Self {
        NormalizedRecord::UserSettings(settings)
    }
}
