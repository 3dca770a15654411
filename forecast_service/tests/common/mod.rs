//! On-disk model tree shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub const RESTAURANTS: [&str; 3] = ["Chemicum", "Physicum", "Exactum"];

fn write(root: &Path, relative: &str, artifact: &Value) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(artifact).unwrap()).unwrap();
}

fn hourly_profile(name: &str, component: &str, scale: f64) -> Value {
    let pattern: Vec<f64> = [0.3, 0.6, 1.0, 1.4, 1.2, 0.8, 0.5, 0.2, -0.1]
        .iter()
        .map(|share| share * scale)
        .collect();
    json!({
        "name": name,
        "start": "2024-05-09T10:00:00",
        "frequency": "hourly",
        "components": [
            {"name": component, "model": {"kind": "seasonal", "pattern": pattern}}
        ]
    })
}

fn daily(name: &str, components: &[(&str, Value)]) -> Value {
    let components: Vec<Value> = components
        .iter()
        .map(|(component, model)| json!({"name": component, "model": model}))
        .collect();
    json!({
        "name": name,
        "start": "2024-05-09T00:00:00",
        "frequency": "daily",
        "components": components
    })
}

/// Artifact tree with every model the registry expects.
///
/// The day-ahead receipt model predicts `receipts` for each restaurant on
/// every business day; the waste regressors predict 6 kg customer and 4 kg
/// kitchen waste whatever the menu.
pub fn model_tree(receipts: f64) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for (i, restaurant) in RESTAURANTS.iter().enumerate() {
        let scale = 100.0 + 50.0 * i as f64;

        write(
            root,
            &format!("receipt/{}.json", restaurant),
            &hourly_profile(&format!("receipt-{}", restaurant), "num_receipts", scale),
        );
        write(
            root,
            &format!("occupancy/{}.json", restaurant),
            &json!({
                "name": format!("occupancy-{}", restaurant),
                "start": "2024-05-09T10:00:00",
                "frequency": "hourly",
                "components": [
                    {"name": "occupancy",
                     "model": {"kind": "autoregressive", "intercept": 8.0,
                               "coefficients": [0.8], "differences": 0,
                               "history": [35.0, 42.0, 40.0]}}
                ]
            }),
        );
        write(
            root,
            &format!("biowaste/{}.json", restaurant),
            &daily(
                &format!("biowaste-{}", restaurant),
                &[
                    ("amnt_waste_customer", json!({"kind": "exponential_smoothing", "level": 5.123, "trend": 0.25})),
                    ("amnt_waste_coffee", json!({"kind": "moving_average", "window": 3, "history": [1.0, 1.5, 2.0]})),
                    ("amnt_waste_kitchen", json!({"kind": "autoregressive", "intercept": 0.5, "coefficients": [0.9], "history": [4.0, 4.2]})),
                    ("amnt_waste_hall", json!({"kind": "exponential_smoothing", "level": 0.4, "trend": -0.3})),
                ],
            ),
        );
        write(
            root,
            &format!("meal/{}.json", restaurant),
            &daily(
                &format!("meal-{}", restaurant),
                &[
                    ("num_fish", json!({"kind": "seasonal", "pattern": [40.0, 35.0, 0.0, 0.0, 52.0]})),
                    ("num_chicken", json!({"kind": "seasonal", "pattern": [60.0, 61.0, 0.0, 0.0, 58.0]})),
                    ("num_vegetable", json!({"kind": "exponential_smoothing", "level": 80.0})),
                    ("num_meat", json!({"kind": "moving_average", "window": 2, "history": [30.0, 34.0]})),
                    ("num_NotMapped", json!({"kind": "exponential_smoothing", "level": -2.0})),
                    ("num_vegan", json!({"kind": "autoregressive", "intercept": 10.0, "coefficients": [0.5], "differences": 1, "history": [20.0, 22.0, 21.0]})),
                ],
            ),
        );

        write(
            root,
            &format!("biowaste/from_meal_{}.json", restaurant),
            &json!({
                "name": format!("waste-from-meal-{}", restaurant),
                "features": ["fish", "chicken", "vegetarian", "meat", "vegan"],
                "outputs": ["amnt_waste_customer", "amnt_waste_kitchen"],
                "model": {
                    "kind": "linear",
                    "intercepts": [6.0, 4.0],
                    "coefficients": [[0.0, 0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0, 0.0]]
                }
            }),
        );
        write(
            root,
            &format!("co2/from_meal_{}.json", restaurant),
            &json!({
                "name": format!("co2-from-meal-{}", restaurant),
                "features": ["fish", "chicken", "vegetarian", "meat", "vegan"],
                "outputs": ["co2"],
                "model": {
                    "kind": "tree_ensemble",
                    "base_score": 0.5,
                    "trees": [
                        {"nodes": [
                            {"feature": 3, "threshold": 10.0, "left": 1, "right": 2},
                            {"value": 1.25},
                            {"value": 7.5}
                        ]},
                        {"nodes": [
                            {"feature": 0, "threshold": 5.0, "left": 1, "right": 2},
                            {"value": 0.25},
                            {"value": -0.5}
                        ]}
                    ]
                }
            }),
        );
    }

    let fields: Vec<Value> = RESTAURANTS
        .iter()
        .map(|restaurant| {
            json!({
                "name": format!("{}_rcpts", restaurant),
                "model": {"kind": "exponential_smoothing", "level": receipts}
            })
        })
        .collect();
    write(
        root,
        "receipt/by_day.json",
        &json!({
            "name": "receipts-by-day",
            "start": "2024-05-09T00:00:00",
            "frequency": "business_daily",
            "components": fields
        }),
    );

    dir
}
