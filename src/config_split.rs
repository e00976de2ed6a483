//! Splitting the legacy combined config blob into derived payloads.
//!
//! Historically a tenant configuration was one JSON object consumed by
//! both the web application and the simulator bridge. The split keeps
//! simulator-facing keys in sim_config and everything else in app_config.
//! The functions here are pure; both the drift backfill and the read path
//! use them, and neither ever overwrites a value that already exists.

use serde_json::{Map, Value};

/// Top-level keys routed to the simulator-facing payload. Everything else
/// is application-facing.
pub const SIM_CONFIG_KEYS: &[&str] = &[
    "simulation",
    "carla",
    "map",
    "weather",
    "sensors",
    "vehicles",
    "traffic",
];

/// Which side of the split a derived value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSide {
    App,
    Sim,
}

/// Split a combined config blob into (app_config, sim_config).
///
/// Non-object payloads produce two empty objects; the legacy blob is kept
/// verbatim in the config column either way, so nothing is lost.
pub fn split_config(legacy: &Value) -> (Value, Value) {
    let Some(object) = legacy.as_object() else {
        return (Value::Object(Map::new()), Value::Object(Map::new()));
    };

    let mut app = Map::new();
    let mut sim = Map::new();
    for (key, value) in object {
        if SIM_CONFIG_KEYS.contains(&key.as_str()) {
            sim.insert(key.clone(), value.clone());
        } else {
            app.insert(key.clone(), value.clone());
        }
    }

    (Value::Object(app), Value::Object(sim))
}

/// Compute the derived value for one side only when it is currently
/// absent. Returns `None` when an existing value must be kept, `Some`
/// with the derived payload when the slot is empty. Re-running over
/// already-backfilled rows is therefore a no-op.
pub fn derive_if_absent(existing: Option<&Value>, legacy: &Value, side: SplitSide) -> Option<Value> {
    if existing.is_some() {
        return None;
    }

    let (app, sim) = split_config(legacy);
    Some(match side {
        SplitSide::App => app,
        SplitSide::Sim => sim,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_by_top_level_key() {
        let legacy = json!({
            "dashboard": {"refresh_seconds": 5},
            "carla": {"host": "localhost", "port": 2000},
            "weather": {"preset": "ClearNoon"},
            "report_retention_days": 30
        });

        let (app, sim) = split_config(&legacy);
        assert_eq!(
            app,
            json!({"dashboard": {"refresh_seconds": 5}, "report_retention_days": 30})
        );
        assert_eq!(
            sim,
            json!({"carla": {"host": "localhost", "port": 2000}, "weather": {"preset": "ClearNoon"}})
        );
    }

    #[test]
    fn non_object_payload_splits_to_empty_objects() {
        let (app, sim) = split_config(&json!([1, 2, 3]));
        assert_eq!(app, json!({}));
        assert_eq!(sim, json!({}));
    }

    #[test]
    fn derive_if_absent_keeps_existing_value() {
        let existing = json!({"manually": "edited"});
        let legacy = json!({"carla": {"port": 2000}});

        assert_eq!(
            derive_if_absent(Some(&existing), &legacy, SplitSide::Sim),
            None
        );
    }

    #[test]
    fn derive_if_absent_fills_empty_slot() {
        let legacy = json!({"carla": {"port": 2000}, "ui": {"theme": "dark"}});

        let derived = derive_if_absent(None, &legacy, SplitSide::Sim);
        assert_eq!(derived, Some(json!({"carla": {"port": 2000}})));

        let derived = derive_if_absent(None, &legacy, SplitSide::App);
        assert_eq!(derived, Some(json!({"ui": {"theme": "dark"}})));
    }
}
