//! Schema migrations for the persisted document.
//!
//! Version 0 stored tasks as bare strings. Version 1 stored full task
//! records. Version 2 moved category colors onto the fixed palette. Each step
//! upgrades the `state` object by exactly one version; loading folds every
//! step from the stored version up to [`CURRENT_VERSION`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::collections::HashSet;

use super::{Document, PersistedState};
use crate::core::category::{CategoryItem, default_categories, palette_color};
use crate::core::repeat::Repeat;
use crate::core::task::{Task, new_id};

pub const CURRENT_VERSION: u32 = 2;

type Step = fn(Value) -> Value;

/// Migration steps keyed by the version they upgrade from.
const STEPS: &[(u32, Step)] = &[(0, wrap_plain_texts), (1, remap_category_colors)];

/// How a load went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was stored yet.
    Fresh,
    /// The stored value failed the shape check and was replaced by defaults.
    Reset,
    Upgraded { from: u32 },
    Current,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    pub outcome: Outcome,
}

impl Loaded {
    /// Upgrades and freshly seeded documents are written back immediately so
    /// the default category ids stay stable. A reset leaves the rejected
    /// value on disk until the first mutation.
    pub fn needs_save(&self) -> bool {
        matches!(self.outcome, Outcome::Fresh | Outcome::Upgraded { .. })
    }
}

pub fn default_document() -> Document {
    Document {
        version: CURRENT_VERSION,
        state: PersistedState {
            saved_texts: Vec::new(),
            categories: default_categories(),
        },
    }
}

/// Turn whatever the backing returned into a current document.
pub fn load(raw: Option<Value>) -> Loaded {
    let Some(raw) = raw else {
        return Loaded {
            document: default_document(),
            outcome: Outcome::Fresh,
        };
    };

    let Some((version, state)) = check_shape(raw) else {
        log::warn!("Stored document is malformed, resetting to defaults");
        return Loaded {
            document: default_document(),
            outcome: Outcome::Reset,
        };
    };

    if version > CURRENT_VERSION {
        log::warn!(
            "Stored document has version {} (newer than {}), reading as-is",
            version,
            CURRENT_VERSION
        );
    }

    let state = upgrade(state, version);
    let document = Document {
        version: version.max(CURRENT_VERSION),
        state: repair(state),
    };

    let outcome = if version < CURRENT_VERSION {
        log::info!("Migrated stored document from version {} to {}", version, CURRENT_VERSION);
        Outcome::Upgraded { from: version }
    } else {
        Outcome::Current
    };

    Loaded { document, outcome }
}

/// Extract `(version, state)` or reject the value.
///
/// `savedTexts` must be an array, and so must `categories` from version 1 on.
/// A bare legacy state (`{"savedTexts": [...]}` without the envelope) is
/// accepted as version 0.
fn check_shape(raw: Value) -> Option<(u32, Value)> {
    let Value::Object(mut doc) = raw else {
        return None;
    };

    let version = match doc.get("version") {
        None | Some(Value::Null) => 0,
        Some(v) => u32::try_from(v.as_u64()?).ok()?,
    };

    let state = match doc.remove("state") {
        Some(state @ Value::Object(_)) => state,
        Some(_) => return None,
        None if doc.contains_key("savedTexts") => Value::Object(doc),
        None => return None,
    };

    if !matches!(state.get("savedTexts"), Some(Value::Array(_))) {
        return None;
    }
    // Categories arrive with version 1; the 0 -> 1 step seeds them.
    match state.get("categories") {
        Some(Value::Array(_)) => {}
        None if version == 0 => {}
        _ => return None,
    }

    Some((version, state))
}

fn upgrade(state: Value, version: u32) -> Value {
    STEPS
        .iter()
        .filter(|(from, _)| *from >= version)
        .fold(state, |state, (from, step)| {
            log::debug!("Applying migration {} -> {}", from, from + 1);
            step(state)
        })
}

/// 0 -> 1: wrap bare strings into task records and seed categories.
///
/// Records that already look like tasks pass through untouched. Wrapped
/// items get ascending creation times so their original order survives.
fn wrap_plain_texts(mut state: Value) -> Value {
    let now = crate::now_millis();

    if let Some(items) = state.get_mut("savedTexts").and_then(Value::as_array_mut) {
        let last = items.len() as i64 - 1;
        for (i, item) in items.iter_mut().enumerate() {
            if let Some(text) = item.as_str().map(str::to_owned) {
                *item = json!({
                    "id": new_id(),
                    "text": text,
                    "completed": false,
                    "createdAt": now - (last - i as i64),
                });
            }
        }
    }

    if let Some(obj) = state.as_object_mut() {
        obj.entry("savedTexts").or_insert_with(|| json!([]));
        if !obj.contains_key("categories") {
            let seeded = default_categories()
                .into_iter()
                .map(|c| json!({ "id": c.id, "name": c.name, "color": c.color }))
                .collect();
            obj.insert("categories".to_string(), Value::Array(seeded));
        }
    }

    state
}

/// 1 -> 2: well-known category names take their palette color.
fn remap_category_colors(mut state: Value) -> Value {
    if let Some(categories) = state.get_mut("categories").and_then(Value::as_array_mut) {
        for category in categories.iter_mut() {
            let Some(obj) = category.as_object_mut() else {
                continue;
            };
            let Some(color) = obj.get("name").and_then(Value::as_str).and_then(palette_color) else {
                continue;
            };
            obj.insert("color".to_string(), Value::from(color));
        }
    }
    state
}

/// Parse the upgraded state into typed records and restore invariants.
fn repair(state: Value) -> PersistedState {
    let mut state = match state {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut seen = HashSet::new();

    let categories: Vec<CategoryItem> = take_array(&mut state, "categories")
        .into_iter()
        .filter_map(|mut raw| {
            stringify_field(&mut raw, "id");
            match serde_json::from_value::<CategoryItem>(raw) {
                Ok(mut category) => {
                    if !seen.insert(category.id.clone()) {
                        log::warn!("Duplicate category id {}, reassigning", category.id);
                        category.id = new_id();
                    }
                    Some(category)
                }
                Err(e) => {
                    log::warn!("Dropping malformed category: {}", e);
                    None
                }
            }
        })
        .collect();

    let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    let mut seen = HashSet::new();

    let saved_texts: Vec<Task> = take_array(&mut state, "savedTexts")
        .into_iter()
        .filter_map(|mut raw| {
            normalize_task_value(&mut raw);
            match serde_json::from_value::<Task>(raw) {
                Ok(mut task) => {
                    if !seen.insert(task.id.clone()) {
                        log::warn!("Duplicate task id {}, reassigning", task.id);
                        task.id = new_id();
                    }
                    repair_task(&mut task, &known);
                    Some(task)
                }
                Err(e) => {
                    log::warn!("Dropping malformed task: {}", e);
                    None
                }
            }
        })
        .collect();

    PersistedState {
        saved_texts,
        categories,
    }
}

fn take_array(state: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match state.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Numeric ids (e.g. millisecond timestamps) become strings.
fn stringify_field(raw: &mut Value, key: &str) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    if let Some(n @ Value::Number(_)) = obj.get(key) {
        let s = n.to_string();
        obj.insert(key.to_string(), Value::String(s));
    }
}

fn normalize_task_value(raw: &mut Value) {
    stringify_field(raw, "id");
    stringify_field(raw, "categoryId");

    let Some(obj) = raw.as_object_mut() else {
        return;
    };

    if obj.get("id").is_none_or(Value::is_null) {
        obj.insert("id".to_string(), Value::String(new_id()));
    }

    match obj.get("createdAt") {
        Some(Value::Number(n)) if n.as_i64().is_none() => {
            let ms = n.as_f64().unwrap_or_default() as i64;
            obj.insert("createdAt".to_string(), Value::from(ms));
        }
        None | Some(Value::Null) => {
            obj.insert("createdAt".to_string(), Value::from(crate::now_millis()));
        }
        _ => {}
    }

    if let Some(Value::Number(n)) = obj.get("completedAt") {
        if n.as_i64().is_none() {
            let ms = n.as_f64().unwrap_or_default() as i64;
            obj.insert("completedAt".to_string(), Value::from(ms));
        }
    }

    let reminder = match obj.get("reminder") {
        Some(Value::String(s)) => match s.parse::<DateTime<Utc>>() {
            Ok(dt) => Some(dt),
            Err(_) => {
                log::warn!("Dropping unparsable reminder {:?}", s);
                None
            }
        },
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    match reminder {
        Some(dt) => {
            obj.insert("reminder".to_string(), Value::String(dt.to_rfc3339()));
        }
        None => {
            obj.remove("reminder");
        }
    }

    match obj.get("repeat").and_then(Value::as_str).and_then(Repeat::parse) {
        Some(repeat) => {
            obj.insert("repeat".to_string(), Value::from(repeat.as_str()));
        }
        None => {
            obj.remove("repeat");
        }
    }

    for key in ["description", "categoryId", "completedAt", "archived"] {
        if obj.get(key).is_some_and(Value::is_null) {
            obj.remove(key);
        }
    }
}

fn repair_task(task: &mut Task, known_categories: &HashSet<&str>) {
    match (task.completed, task.completed_at) {
        (true, None) => task.completed_at = Some(task.created_at),
        (false, Some(_)) => task.completed_at = None,
        _ => {}
    }
    if let Some(id) = &task.category_id {
        if !known_categories.contains(id.as_str()) {
            log::warn!("Clearing dangling category {} on task {}", id, task.id);
            task.category_id = None;
        }
    }
}
