//! # WillDraft: Aggregate Root
//!
//! A will-in-progress: one JSON payload per [`StepKey`], plus identity,
//! revision, and save bookkeeping.
//!
//! ## Invariants
//!
//! - `sections` holds an entry for every known step key, including steps
//!   the will type does not use. Missing entries are filled with
//!   [`default_payload`] on construction and on deserialization.
//! - The `dirty` flag is set only by field edits and cleared only by
//!   [`WillDraft::mark_saved`]. It is never persisted.
//! - `revision` increases by one for every snapshot taken for saving, so
//!   stores can discard a snapshot that arrives after a newer one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use testament_core::{
    DraftError, FieldPath, OwnerId, PathSegment, StepKey, Timestamp, WillId, WillType,
};

use crate::payload::default_payload;

/// Upper bound on entries in any list field.
pub const MAX_LIST_ENTRIES: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WillDraft {
    pub id: WillId,
    pub owner: OwnerId,
    pub will_type: WillType,
    sections: BTreeMap<StepKey, Value>,
    pub revision: u64,
    pub last_saved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    #[serde(skip)]
    dirty: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WillDraftRepr {
    id: WillId,
    owner: OwnerId,
    #[serde(default)]
    will_type: WillType,
    #[serde(default)]
    sections: BTreeMap<StepKey, Value>,
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    last_saved_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl From<WillDraftRepr> for WillDraft {
    fn from(repr: WillDraftRepr) -> Self {
        Self {
            id: repr.id,
            owner: repr.owner,
            will_type: repr.will_type,
            sections: with_defaults(repr.sections),
            revision: repr.revision,
            last_saved_at: repr.last_saved_at,
            created_at: repr.created_at,
            dirty: false,
        }
    }
}

impl<'de> Deserialize<'de> for WillDraft {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WillDraftRepr::deserialize(deserializer).map(Self::from)
    }
}

fn with_defaults(mut sections: BTreeMap<StepKey, Value>) -> BTreeMap<StepKey, Value> {
    for step in StepKey::ALL {
        sections.entry(step).or_insert_with(|| default_payload(step));
    }
    sections
}

impl WillDraft {
    /// A fresh draft with a new id and default payloads.
    pub fn new(owner: OwnerId, will_type: WillType) -> Self {
        Self::with_id(owner, WillId::new(), will_type)
    }

    pub fn with_id(owner: OwnerId, id: WillId, will_type: WillType) -> Self {
        Self {
            id,
            owner,
            will_type,
            sections: with_defaults(BTreeMap::new()),
            revision: 0,
            last_saved_at: None,
            created_at: Timestamp::now(),
            dirty: false,
        }
    }

    /// Rebuild a draft from stored parts. Missing sections get defaults.
    pub fn from_parts(
        owner: OwnerId,
        id: WillId,
        will_type: WillType,
        sections: BTreeMap<StepKey, Value>,
        revision: u64,
        last_saved_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            will_type,
            sections: with_defaults(sections),
            revision,
            last_saved_at,
            created_at,
            dirty: false,
        }
    }

    pub fn sections(&self) -> &BTreeMap<StepKey, Value> {
        &self.sections
    }

    /// Payload for a step. Always present.
    pub fn section(&self, step: StepKey) -> &Value {
        // with_defaults guarantees every key; the fallback is unreachable.
        self.sections.get(&step).unwrap_or(&Value::Null)
    }

    /// Replace a step's whole payload.
    pub fn set_section(&mut self, step: StepKey, payload: Value) {
        self.sections.insert(step, payload);
        self.dirty = true;
    }

    /// Value at `path` inside a step's payload.
    pub fn get_field(&self, step: StepKey, path: &FieldPath) -> Option<&Value> {
        lookup(self.section(step), path)
    }

    /// Set `path` inside a step's payload, creating intermediate objects and
    /// lists. Numeric segments index lists, which are padded with empty
    /// objects up to the index.
    ///
    /// # Errors
    ///
    /// [`DraftError::InvalidPath`] for an unparseable path,
    /// [`DraftError::NotAContainer`] when a segment runs into a scalar, and
    /// [`DraftError::IndexOutOfRange`] beyond [`MAX_LIST_ENTRIES`].
    pub fn set_field(&mut self, step: StepKey, path: &str, value: Value) -> Result<(), DraftError> {
        let parsed = FieldPath::parse(path)?;
        self.set_field_at(step, &parsed, value)
    }

    pub fn set_field_at(
        &mut self,
        step: StepKey,
        path: &FieldPath,
        value: Value,
    ) -> Result<(), DraftError> {
        let slot = self
            .sections
            .entry(step)
            .or_insert_with(|| default_payload(step));
        set_at(slot, path.segments(), value, path)?;
        self.dirty = true;
        Ok(())
    }

    /// Reset the value at `path` to `null`, or `[]` if it is a list.
    /// Clearing the root restores the step's default payload. Returns
    /// whether anything changed; a path that does not exist is a no-op.
    pub fn clear_field(&mut self, step: StepKey, path: &str) -> Result<bool, DraftError> {
        let parsed = FieldPath::parse(path)?;
        Ok(self.clear_field_at(step, &parsed))
    }

    pub fn clear_field_at(&mut self, step: StepKey, path: &FieldPath) -> bool {
        if path.is_root() {
            let default = default_payload(step);
            if self.section(step) == &default {
                return false;
            }
            self.sections.insert(step, default);
            self.dirty = true;
            return true;
        }
        let Some(slot) = self.sections.get_mut(&step).and_then(|v| lookup_mut(v, path)) else {
            return false;
        };
        let cleared = match &*slot {
            Value::Array(items) if items.is_empty() => return false,
            Value::Array(_) => Value::Array(Vec::new()),
            Value::Null => return false,
            _ => Value::Null,
        };
        *slot = cleared;
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Advance the revision and return the snapshot to persist.
    pub fn snapshot_for_save(&mut self) -> WillDraft {
        self.revision += 1;
        let mut snapshot = self.clone();
        snapshot.dirty = false;
        snapshot
    }

    /// Record a completed save.
    pub fn mark_saved(&mut self, at: Timestamp) {
        self.last_saved_at = Some(at);
        self.dirty = false;
    }
}

/// Value at `path` inside `root`.
pub fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments().iter().try_fold(root, |node, seg| match (seg, node) {
        (PathSegment::Key(k), Value::Object(map)) => map.get(k),
        (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
        _ => None,
    })
}

fn lookup_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    path.segments().iter().try_fold(root, |node, seg| match (seg, node) {
        (PathSegment::Key(k), Value::Object(map)) => map.get_mut(k),
        (PathSegment::Index(i), Value::Array(items)) => items.get_mut(*i),
        _ => None,
    })
}

fn set_at(
    slot: &mut Value,
    segments: &[PathSegment],
    value: Value,
    full: &FieldPath,
) -> Result<(), DraftError> {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return Ok(());
    };
    match head {
        PathSegment::Key(key) => {
            if slot.is_null() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(map) = slot else {
                return Err(DraftError::NotAContainer {
                    path: full.to_string(),
                    segment: key.clone(),
                });
            };
            let child = map.entry(key.clone()).or_insert(Value::Null);
            set_at(child, rest, value, full)
        }
        PathSegment::Index(index) => {
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(items) = slot else {
                return Err(DraftError::NotAContainer {
                    path: full.to_string(),
                    segment: index.to_string(),
                });
            };
            if *index >= MAX_LIST_ENTRIES {
                return Err(DraftError::IndexOutOfRange {
                    path: full.to_string(),
                    index: *index,
                    max: MAX_LIST_ENTRIES,
                });
            }
            while items.len() <= *index {
                items.push(Value::Object(Map::new()));
            }
            set_at(&mut items[*index], rest, value, full)
        }
    }
}
