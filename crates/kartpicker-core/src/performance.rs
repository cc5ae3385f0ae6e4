//! Build performance estimates.
//!
//! The top speed and acceleration figures are empirically tuned, not derived
//! from physics. Constants and clamp ranges are fixed; the UI and saved
//! comparisons depend on the exact figures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Engine, Part};
use crate::category::PartCategory;

/// Torque = HP x 5252 / RPM.
const TORQUE_CONSTANT: f64 = 5252.0;
/// Reference RPM for estimating torque on small engines without a torque figure.
const REFERENCE_RPM: f64 = 3600.0;
/// Empirical top speed constant.
const TOP_SPEED_CONSTANT: f64 = 200.0;

pub const DEFAULT_BASE_KART_WEIGHT: f64 = 100.0;
/// Used when the engine record has no weight.
pub const DEFAULT_ENGINE_WEIGHT: f64 = 40.0;
pub const DEFAULT_BUILD_WEIGHT: f64 = 200.0;

/// Aggregate performance of a build. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub hp: f64,
    /// lb-ft
    pub torque: f64,
    /// MPH
    pub top_speed: f64,
    /// HP per 100 lbs
    pub power_to_weight: f64,
    #[serde(rename = "acceleration0to20")]
    pub acceleration_0_to_20: f64,
    #[serde(rename = "acceleration0to30")]
    pub acceleration_0_to_30: f64,
    /// lbs
    pub weight: f64,
    pub gear_ratio: f64,
}

/// Round half up (toward positive infinity) to an integer.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up to one decimal place.
pub fn round1(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

fn spec_number(part: &Part, key: &str) -> Option<f64> {
    part.specifications
        .as_ref()
        .and_then(|specs| specs.get(key))
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

fn contribution(part: &Part, key: &str) -> f64 {
    spec_number(part, key).unwrap_or(0.0)
}

/// Engine horsepower plus every part's `hp_contribution`, one decimal.
pub fn calculate_build_hp(engine: Option<&Engine>, parts: &[Part]) -> f64 {
    let Some(engine) = engine else {
        return 0.0;
    };

    let total = parts
        .iter()
        .fold(engine.horsepower, |hp, part| hp + contribution(part, "hp_contribution"));

    round1(total)
}

/// Engine torque plus every part's `torque_contribution`, one decimal.
///
/// Engines without a torque figure are estimated at the reference RPM.
pub fn calculate_build_torque(engine: Option<&Engine>, parts: &[Part]) -> f64 {
    let Some(engine) = engine else {
        return 0.0;
    };

    let base = if engine.torque.is_finite() && engine.torque != 0.0 {
        engine.torque
    } else {
        engine.horsepower * TORQUE_CONSTANT / REFERENCE_RPM
    };

    let total = parts
        .iter()
        .fold(base, |torque, part| torque + contribution(part, "torque_contribution"));

    round1(total)
}

/// Typical weight of a part when the catalog has none, in lbs.
pub fn estimated_part_weight(category: PartCategory) -> f64 {
    match category {
        PartCategory::Clutch => 2.5,
        PartCategory::TorqueConverter => 8.0,
        PartCategory::Chain => 1.0,
        PartCategory::Sprocket => 0.5,
        PartCategory::Carburetor => 1.5,
        PartCategory::Exhaust => 3.0,
        PartCategory::Header => 2.0,
        PartCategory::AirFilter => 0.5,
        PartCategory::Camshaft => 0.8,
        PartCategory::Flywheel => 3.0,
        PartCategory::Piston => 0.3,
        PartCategory::ConnectingRod => 0.2,
        PartCategory::Ignition => 0.5,
        PartCategory::FuelSystem => 2.0,
        PartCategory::Axle => 5.0,
        PartCategory::Wheel => 2.0,
        PartCategory::Tire => 3.0,
        PartCategory::Brake => 2.5,
        PartCategory::Throttle => 0.3,
        PartCategory::Frame => 20.0,
        PartCategory::Gasket => 0.1,
        PartCategory::Hardware => 0.2,
        _ => 1.0,
    }
}

fn part_weight(part: &Part) -> f64 {
    let lbs = spec_number(part, "weight_lbs").filter(|w| *w != 0.0);
    let oz = spec_number(part, "weight_oz").filter(|w| *w != 0.0);

    lbs.or_else(|| oz.map(|oz| oz / 16.0))
        .unwrap_or_else(|| estimated_part_weight(part.category))
}

/// Base kart + engine + parts, rounded to the nearest pound.
pub fn calculate_build_weight(engine: Option<&Engine>, parts: &[Part], base_kart_weight: f64) -> f64 {
    let engine_weight = engine
        .and_then(|e| e.weight_lbs)
        .filter(|w| w.is_finite() && *w != 0.0)
        .unwrap_or(DEFAULT_ENGINE_WEIGHT);

    let total = parts
        .iter()
        .fold(base_kart_weight + engine_weight, |weight, part| {
            weight + part_weight(part)
        });

    round_half_up(total)
}

/// Top speed estimate in MPH: `hp x 200 / (weight / 100) / gear_ratio`.
pub fn estimate_top_speed(hp: f64, weight: f64, gear_ratio: f64) -> f64 {
    if hp <= 0.0 || weight <= 0.0 || gear_ratio <= 0.0 || !gear_ratio.is_finite() {
        return 0.0;
    }
    let speed = (hp * TOP_SPEED_CONSTANT) / (weight / 100.0) / gear_ratio;
    if !speed.is_finite() {
        return 0.0;
    }
    round_half_up(speed)
}

/// Horsepower per 100 lbs, one decimal.
pub fn calculate_power_to_weight(hp: f64, weight: f64) -> f64 {
    if hp <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    let ratio = hp / (weight / 100.0);
    if !ratio.is_finite() {
        return 0.0;
    }
    round1(ratio)
}

/// 0-20 MPH in seconds, clamped to 2..=8.
pub fn estimate_acceleration_0_to_20(hp: f64, weight: f64) -> f64 {
    if hp <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    let p = calculate_power_to_weight(hp, weight);
    round1((10.0 - p * 0.8).clamp(2.0, 8.0))
}

/// 0-30 MPH in seconds, clamped to 3..=12.
pub fn estimate_acceleration_0_to_30(hp: f64, weight: f64) -> f64 {
    if hp <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    let p = calculate_power_to_weight(hp, weight);
    round1((15.0 - p).clamp(3.0, 12.0))
}

/// Final drive ratio, axle teeth over clutch teeth. 1.0 when either is unknown.
pub fn calculate_gear_ratio(clutch_teeth: Option<f64>, axle_teeth: Option<f64>) -> f64 {
    match (clutch_teeth, axle_teeth) {
        (Some(clutch), Some(axle)) if clutch > 0.0 && axle > 0.0 => axle / clutch,
        _ => 1.0,
    }
}

/// Gear ratio from the clutch/torque converter and axle sprocket teeth.
///
/// Only numeric specifications count. When several parts qualify the last
/// one wins.
pub fn gear_ratio_from_parts(parts: &[Part]) -> f64 {
    let mut clutch_teeth = None;
    let mut axle_teeth = None;

    for part in parts {
        match part.category {
            PartCategory::Clutch | PartCategory::TorqueConverter => {
                let teeth = part
                    .specifications
                    .as_ref()
                    .and_then(|specs| {
                        specs
                            .get("sprocket_teeth")
                            .filter(|v| crate::spec::is_truthy(v))
                            .or_else(|| specs.get("teeth"))
                    })
                    .and_then(Value::as_f64);
                if teeth.is_some() {
                    clutch_teeth = teeth;
                }
            }
            PartCategory::Sprocket => {
                if let Some(teeth) = spec_number(part, "teeth") {
                    axle_teeth = Some(teeth);
                }
            }
            _ => {}
        }
    }

    calculate_gear_ratio(clutch_teeth, axle_teeth)
}

/// All metrics for a build with the default base kart weight.
pub fn calculate_performance(engine: Option<&Engine>, parts: &[Part]) -> PerformanceMetrics {
    calculate_performance_with_base(engine, parts, DEFAULT_BASE_KART_WEIGHT)
}

/// All metrics for a build. Weight and gear ratio are computed first since
/// top speed and power-to-weight depend on them.
pub fn calculate_performance_with_base(
    engine: Option<&Engine>,
    parts: &[Part],
    base_kart_weight: f64,
) -> PerformanceMetrics {
    let hp = calculate_build_hp(engine, parts);
    let torque = calculate_build_torque(engine, parts);
    let weight = calculate_build_weight(engine, parts, base_kart_weight);
    let gear_ratio = gear_ratio_from_parts(parts);

    PerformanceMetrics {
        hp,
        torque,
        top_speed: estimate_top_speed(hp, weight, gear_ratio),
        power_to_weight: calculate_power_to_weight(hp, weight),
        acceleration_0_to_20: estimate_acceleration_0_to_20(hp, weight),
        acceleration_0_to_30: estimate_acceleration_0_to_30(hp, weight),
        weight,
        gear_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ShaftType;
    use pretty_assertions::assert_eq;

    fn engine(horsepower: f64, torque: f64, weight_lbs: Option<f64>) -> Engine {
        Engine {
            id: "e1".to_string(),
            name: "Test Engine".to_string(),
            brand: String::new(),
            displacement_cc: 212.0,
            horsepower,
            torque,
            shaft_diameter: 0.75,
            shaft_length: 2.43,
            shaft_type: ShaftType::Straight,
            weight_lbs,
            price: None,
        }
    }

    #[test]
    fn test_no_engine_means_no_power() {
        let parts = vec![Part::new("c", PartCategory::Clutch).with_spec("hp_contribution", 1.0)];
        assert_eq!(calculate_build_hp(None, &parts), 0.0);
        assert_eq!(calculate_build_torque(None, &parts), 0.0);
    }

    #[test]
    fn test_reference_build() {
        let engine = engine(6.5, 0.0, Some(40.0));
        let parts = vec![Part::new("c", PartCategory::Clutch).with_spec("hp_contribution", 0.5)];

        assert_eq!(calculate_build_hp(Some(&engine), &parts), 7.0);
        assert_eq!(calculate_build_torque(Some(&engine), &parts), 9.5);
        // 100 + 40 + 2.5 = 142.5 rounds half up.
        assert_eq!(calculate_build_weight(Some(&engine), &parts, 100.0), 143.0);
    }

    #[test]
    fn test_hp_ignores_non_numeric_contributions() {
        let engine = engine(6.5, 8.1, None);
        let parts = vec![
            Part::new("a", PartCategory::Carburetor).with_spec("hp_contribution", "lots"),
            Part::new("b", PartCategory::Exhaust).with_spec("hp_contribution", 0.75),
            Part::new("c", PartCategory::AirFilter),
        ];
        assert_eq!(calculate_build_hp(Some(&engine), &parts), 7.3);
    }

    #[test]
    fn test_hp_never_below_engine_with_positive_contributions() {
        let engine = engine(9.0, 0.0, None);
        for bump in [0.0, 0.04, 0.05, 1.25, 3.0] {
            let parts =
                vec![Part::new("x", PartCategory::Camshaft).with_spec("hp_contribution", bump)];
            assert!(calculate_build_hp(Some(&engine), &parts) >= engine.horsepower);
        }
    }

    #[test]
    fn test_torque_uses_engine_figure_when_present() {
        let engine = engine(6.5, 8.1, None);
        let parts =
            vec![Part::new("c", PartCategory::Camshaft).with_spec("torque_contribution", 0.4)];
        assert_eq!(calculate_build_torque(Some(&engine), &parts), 8.5);
    }

    #[test]
    fn test_weight_prefers_explicit_part_weight() {
        let parts = vec![
            Part::new("f", PartCategory::Frame).with_spec("weight_lbs", 35.0),
            Part::new("s", PartCategory::Sprocket).with_spec("weight_oz", 8.0),
            Part::new("b", PartCategory::Battery),
            Part::new("u", PartCategory::Unknown),
        ];
        // 100 + 40 (default engine) + 35 + 0.5 + 1.0 + 1.0
        assert_eq!(calculate_build_weight(None, &parts, 100.0), 178.0);
    }

    #[test]
    fn test_top_speed() {
        assert_eq!(estimate_top_speed(7.0, 143.0, 1.0), 979.0);
        assert_eq!(estimate_top_speed(6.5, 200.0, 1.0), 650.0);
        assert_eq!(estimate_top_speed(6.5, 200.0, 6.0), 108.0);
        assert_eq!(estimate_top_speed(0.0, 200.0, 1.0), 0.0);
        assert_eq!(estimate_top_speed(6.5, 0.0, 1.0), 0.0);
        assert_eq!(estimate_top_speed(-1.0, 200.0, 1.0), 0.0);
    }

    #[test]
    fn test_power_to_weight() {
        assert_eq!(calculate_power_to_weight(6.5, 200.0), 3.3);
        assert_eq!(calculate_power_to_weight(10.0, 200.0), 5.0);
        assert_eq!(calculate_power_to_weight(0.0, 200.0), 0.0);
        assert_eq!(calculate_power_to_weight(6.5, -5.0), 0.0);
    }

    #[test]
    fn test_acceleration_is_clamped() {
        assert_eq!(estimate_acceleration_0_to_20(6.5, 200.0), 7.4);
        assert_eq!(estimate_acceleration_0_to_30(6.5, 200.0), 11.7);

        // Tiny power: ceiling.
        assert_eq!(estimate_acceleration_0_to_20(0.1, 1000.0), 8.0);
        assert_eq!(estimate_acceleration_0_to_30(0.1, 1000.0), 12.0);

        // Absurd power: floor.
        assert_eq!(estimate_acceleration_0_to_20(500.0, 100.0), 2.0);
        assert_eq!(estimate_acceleration_0_to_30(500.0, 100.0), 3.0);

        for (hp, weight) in [(0.01, 1e6), (1e6, 0.01), (13.0, 250.0), (f64::MAX, 1.0)] {
            let a20 = estimate_acceleration_0_to_20(hp, weight);
            let a30 = estimate_acceleration_0_to_30(hp, weight);
            assert!((2.0..=8.0).contains(&a20), "0-20 out of range: {a20}");
            assert!((3.0..=12.0).contains(&a30), "0-30 out of range: {a30}");
        }

        assert_eq!(estimate_acceleration_0_to_20(0.0, 200.0), 0.0);
        assert_eq!(estimate_acceleration_0_to_30(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_gear_ratio_defaults() {
        assert_eq!(calculate_gear_ratio(None, Some(60.0)), 1.0);
        assert_eq!(calculate_gear_ratio(Some(12.0), None), 1.0);
        assert_eq!(calculate_gear_ratio(Some(0.0), Some(60.0)), 1.0);
        assert_eq!(calculate_gear_ratio(Some(12.0), Some(-3.0)), 1.0);
        assert_eq!(calculate_gear_ratio(Some(12.0), Some(60.0)), 5.0);
    }

    #[test]
    fn test_gear_ratio_from_parts() {
        let parts = vec![
            Part::new("c", PartCategory::Clutch).with_spec("sprocket_teeth", 10),
            Part::new("s", PartCategory::Sprocket).with_spec("teeth", 60),
        ];
        assert_eq!(gear_ratio_from_parts(&parts), 6.0);

        let teeth_key = vec![
            Part::new("tc", PartCategory::TorqueConverter).with_spec("teeth", 12),
            Part::new("s", PartCategory::Sprocket).with_spec("teeth", 60),
        ];
        assert_eq!(gear_ratio_from_parts(&teeth_key), 5.0);

        let non_numeric = vec![
            Part::new("c", PartCategory::Clutch).with_spec("sprocket_teeth", "10T"),
            Part::new("s", PartCategory::Sprocket).with_spec("teeth", 60),
        ];
        assert_eq!(gear_ratio_from_parts(&non_numeric), 1.0);
    }

    #[test]
    fn test_calculate_performance() {
        let engine = engine(6.5, 0.0, Some(40.0));
        let parts = vec![Part::new("c", PartCategory::Clutch).with_spec("hp_contribution", 0.5)];

        let metrics = calculate_performance(Some(&engine), &parts);

        assert_eq!(
            metrics,
            PerformanceMetrics {
                hp: 7.0,
                torque: 9.5,
                top_speed: 979.0,
                power_to_weight: 4.9,
                acceleration_0_to_20: 6.1,
                acceleration_0_to_30: 10.1,
                weight: 143.0,
                gear_ratio: 1.0,
            }
        );
    }

    #[test]
    fn test_calculate_performance_is_repeatable() {
        let engine = engine(13.0, 17.0, Some(70.0));
        let parts = vec![
            Part::new("c", PartCategory::Clutch).with_spec("sprocket_teeth", 12),
            Part::new("s", PartCategory::Sprocket).with_spec("teeth", 72),
            Part::new("h", PartCategory::Header).with_spec("hp_contribution", 0.8),
        ];

        let first = calculate_performance(Some(&engine), &parts);
        let second = calculate_performance(Some(&engine), &parts);
        assert_eq!(first.hp.to_bits(), second.hp.to_bits());
        assert_eq!(first.top_speed.to_bits(), second.top_speed.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_engine_performance() {
        let metrics = calculate_performance(None, &[]);
        assert_eq!(metrics.hp, 0.0);
        assert_eq!(metrics.top_speed, 0.0);
        assert_eq!(metrics.power_to_weight, 0.0);
        assert_eq!(metrics.acceleration_0_to_20, 0.0);
        assert_eq!(metrics.weight, 140.0);
        assert_eq!(metrics.gear_ratio, 1.0);
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let metrics = calculate_performance(None, &[]);
        let json = serde_json::to_value(metrics).unwrap();
        assert!(json.get("topSpeed").is_some());
        assert!(json.get("powerToWeight").is_some());
        assert!(json.get("acceleration0to20").is_some());
        assert!(json.get("acceleration0to30").is_some());
        assert!(json.get("gearRatio").is_some());
    }
}
