//! Garment measurement maps and the change summaries recorded when an item
//! is edited.

use crate::entities::custom_order_item::GarmentType;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Measurement name to value, as typed by staff (`"92"`, `"90.5"`).
pub type Measurements = BTreeMap<String, String>;

/// Keeps only the keys recorded for `garment`, dropping blank values.
pub fn filter_for_garment(garment: GarmentType, raw: &Measurements) -> Measurements {
    let allowed = garment.measurement_fields();
    raw.iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

pub fn to_json(measurements: &Measurements) -> Value {
    Value::Object(
        measurements
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

/// Reads a stored map. Non-string scalars are stringified and nested values skipped.
pub fn from_json(value: &Value) -> Measurements {
    let Some(object) = value.as_object() else {
        return Measurements::new();
    };
    object
        .iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k.clone(), s.clone())),
            Value::Number(n) => Some((k.clone(), n.to_string())),
            _ => None,
        })
        .collect()
}

/// Per-field lines describing how `before` became `after`:
/// `busto: 90 → 92`, `+ manga: 60`, `- cuello`.
pub fn diff_lines(before: &Measurements, after: &Measurements) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, new_value) in after {
        match before.get(key) {
            Some(old_value) if old_value != new_value => {
                lines.push(format!("{key}: {old_value} → {new_value}"))
            }
            Some(_) => {}
            None => lines.push(format!("+ {key}: {new_value}")),
        }
    }
    for key in before.keys().filter(|k| !after.contains_key(*k)) {
        lines.push(format!("- {key}"));
    }
    lines
}

/// History note for an item edit.
pub fn edit_note(
    old_garment: GarmentType,
    new_garment: GarmentType,
    before: &Measurements,
    after: &Measurements,
    notes_changed: bool,
) -> String {
    let mut parts = Vec::new();
    if old_garment != new_garment {
        parts.push(format!("prenda: {old_garment} → {new_garment}"));
    }
    parts.extend(diff_lines(before, after));
    if notes_changed {
        parts.push("notas actualizadas".to_string());
    }
    if parts.is_empty() {
        format!("Prenda editada ({new_garment}): sin cambios")
    } else {
        format!("Prenda editada ({new_garment}): {}", parts.join("; "))
    }
}

/// Stores `measurements` under `garment` in a client's cached map.
pub fn merge_client_cache(cache: &Value, garment: GarmentType, measurements: &Measurements) -> Value {
    let mut object = cache.as_object().cloned().unwrap_or_else(Map::new);
    object.insert(garment.to_string(), to_json(measurements));
    Value::Object(object)
}

pub fn client_cache_entry(cache: &Value, garment: GarmentType) -> Measurements {
    cache
        .get(garment.to_string())
        .map(from_json)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn m(pairs: &[(&str, &str)]) -> Measurements {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_and_blank_keys_are_dropped() {
        let raw = m(&[("busto", " 90 "), ("ruedo", "120"), ("manga", "")]);
        let kept = filter_for_garment(GarmentType::Blusa, &raw);
        assert_eq!(kept, m(&[("busto", "90")]));
    }

    #[test]
    fn diff_reports_changes_additions_and_removals() {
        let before = m(&[("busto", "90"), ("cuello", "38"), ("largo", "60")]);
        let after = m(&[("busto", "92"), ("largo", "60"), ("manga", "60")]);
        assert_eq!(
            diff_lines(&before, &after),
            vec!["busto: 90 → 92", "+ manga: 60", "- cuello"]
        );
    }

    #[test]
    fn edit_note_mentions_garment_change() {
        let note = edit_note(
            GarmentType::Pollera,
            GarmentType::Blusa,
            &m(&[("cintura", "80")]),
            &m(&[("cintura", "80")]),
            false,
        );
        assert_eq!(note, "Prenda editada (blusa): prenda: pollera → blusa");
    }

    #[test]
    fn unchanged_edit_says_so() {
        let same = m(&[("largo", "100")]);
        let note = edit_note(GarmentType::Manta, GarmentType::Manta, &same, &same, false);
        assert!(note.ends_with("sin cambios"));
    }

    #[test]
    fn client_cache_keeps_other_garments() {
        let cache = json!({"pollera": {"cintura": "80"}});
        let merged = merge_client_cache(&cache, GarmentType::Blusa, &m(&[("busto", "90")]));
        assert_eq!(client_cache_entry(&merged, GarmentType::Pollera), m(&[("cintura", "80")]));
        assert_eq!(client_cache_entry(&merged, GarmentType::Blusa), m(&[("busto", "90")]));
    }

    #[test]
    fn numbers_in_stored_maps_are_read_as_text() {
        assert_eq!(from_json(&json!({"largo": 98})), m(&[("largo", "98")]));
        assert!(from_json(&json!(null)).is_empty());
    }
}
