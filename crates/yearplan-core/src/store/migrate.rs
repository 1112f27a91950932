//! State file version upgrades.
//!
//! Migrations run on the raw JSON document before it is deserialized, so a
//! version can add, rename, or reshape keys freely.

use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::PlanError;
use crate::model::{MILESTONE_SLOTS, default_checklist};

/// Version written by this build.
pub const CURRENT_VERSION: u64 = 2;

/// Version assumed for documents with no `version` key.
pub const LEGACY_VERSION: u64 = 1;

/// Read the declared version of a raw state document.
#[must_use]
pub fn document_version(doc: &Value) -> u64 {
    doc.get("version")
        .and_then(Value::as_u64)
        .unwrap_or(LEGACY_VERSION)
}

/// Upgrade `doc` from `from_version` to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns [`PlanError::UnsupportedVersion`] for versions newer than this
/// build understands.
pub fn migrate_document(mut doc: Value, from_version: u64) -> Result<Value, PlanError> {
    if from_version > CURRENT_VERSION {
        return Err(PlanError::UnsupportedVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }
    let mut version = from_version.max(LEGACY_VERSION);
    while version < CURRENT_VERSION {
        if version == LEGACY_VERSION {
            migrate_v1_to_v2(&mut doc);
        }
        version += 1;
        info!(version, "migrated state document");
    }
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("version".into(), json!(CURRENT_VERSION));
    }
    Ok(doc)
}

/// V1 -> v2: fill in fields that early builds never wrote.
///
/// * `nonNegotiableDates` defaults to an empty list.
/// * `kevinRuleEvents` is padded or truncated to exactly six slots.
/// * `weeklyWins` and `prepChecklist` are seeded when missing.
/// * `onboardingComplete` defaults to `false`.
fn migrate_v1_to_v2(doc: &mut Value) {
    let Some(root) = doc.as_object_mut() else {
        return;
    };

    let plan = root
        .entry("annualPlan")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(plan) = plan.as_object_mut() {
        plan.entry("nonNegotiableDates")
            .or_insert_with(|| Value::Array(Vec::new()));

        let slots = plan
            .entry("kevinRuleEvents")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slots.is_array() {
            *slots = Value::Array(Vec::new());
        }
        if let Some(slots) = slots.as_array_mut() {
            slots.resize(MILESTONE_SLOTS, Value::Null);
        }
    }

    root.entry("weeklyWins")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !root.contains_key("prepChecklist") {
        let seeded = default_checklist()
            .into_iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "task": p.task,
                    "description": p.description,
                    "completed": p.completed,
                })
            })
            .collect();
        root.insert("prepChecklist".into(), Value::Array(seeded));
    }
    root.entry("onboardingComplete")
        .or_insert(Value::Bool(false));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_version_is_legacy() {
        assert_eq!(document_version(&json!({})), LEGACY_VERSION);
        assert_eq!(document_version(&json!({"version": 2})), 2);
    }

    #[test]
    fn v1_gains_defaults() {
        let doc = json!({
            "annualPlan": {
                "year": 2026,
                "kevinRuleEvents": [null, {"id": "1", "title": "Trip", "date": "10"}]
            }
        });
        let migrated = migrate_document(doc, 1).expect("migrate");
        let plan = &migrated["annualPlan"];
        assert_eq!(plan["nonNegotiableDates"], json!([]));
        assert_eq!(plan["kevinRuleEvents"].as_array().map(Vec::len), Some(6));
        assert_eq!(plan["kevinRuleEvents"][1]["title"], "Trip");
        assert_eq!(migrated["onboardingComplete"], json!(false));
        assert_eq!(migrated["weeklyWins"], json!([]));
        assert_eq!(migrated["prepChecklist"].as_array().map(Vec::len), Some(9));
        assert_eq!(migrated["version"], json!(CURRENT_VERSION));
    }

    #[test]
    fn v1_keeps_existing_values() {
        let doc = json!({
            "annualPlan": {"nonNegotiableDates": ["4"], "kevinRuleEvents": [null, null, null, null, null, null, null, null]},
            "onboardingComplete": true,
            "prepChecklist": []
        });
        let migrated = migrate_document(doc, 1).expect("migrate");
        assert_eq!(migrated["annualPlan"]["nonNegotiableDates"], json!(["4"]));
        assert_eq!(
            migrated["annualPlan"]["kevinRuleEvents"]
                .as_array()
                .map(Vec::len),
            Some(6)
        );
        assert_eq!(migrated["onboardingComplete"], json!(true));
        assert_eq!(migrated["prepChecklist"], json!([]));
    }

    #[test]
    fn current_version_passthrough() {
        let doc = json!({"version": 2, "onboardingComplete": true});
        let migrated = migrate_document(doc.clone(), CURRENT_VERSION).expect("migrate");
        assert_eq!(migrated, doc);
    }

    #[test]
    fn future_version_is_rejected() {
        let err = migrate_document(json!({}), 99).expect_err("should fail");
        assert!(matches!(
            err,
            PlanError::UnsupportedVersion { found: 99, supported: 2 }
        ));
    }
}
