//! Electrical checks for builds powered by an electric motor.

use serde::{Deserialize, Serialize};

use crate::catalog::{ElectricMotor, Specifications};
use crate::category::PartCategory;
use crate::compatibility::SelectedParts;
use crate::performance::round_half_up;
use crate::spec::{format_number, number_of};

const BATTERY_VOLTAGE_KEYS: &[&str] = &["voltage", "voltage_v"];
const CONTROLLER_VOLTAGE_KEYS: &[&str] = &["voltage", "voltage_v", "voltage_max"];
const CONTROLLER_CURRENT_KEYS: &[&str] =
    &["max_current", "rated_current", "current_amps", "continuous_amps"];
const CONTROLLER_POWER_KEYS: &[&str] = &["power_kw", "max_power_kw", "rated_power_kw"];
const CHARGER_VOLTAGE_KEYS: &[&str] = &["voltage", "voltage_v", "output_voltage"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvCheck {
    pub id: String,
    pub label: String,
    pub status: EvStatus,
    pub message: String,
}

impl EvCheck {
    fn new(id: &str, label: &str, status: EvStatus, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            status,
            message: message.into(),
        }
    }
}

fn specs_number(specs: Option<&Specifications>, keys: &[&str]) -> Option<f64> {
    specs.and_then(|s| number_of(s, keys))
}

/// Check battery, controller and charger against the motor's electrical
/// ratings. Parts without usable numbers yield no check or a `warn`.
pub fn check_ev_compatibility(motor: &ElectricMotor, parts: &SelectedParts) -> Vec<EvCheck> {
    let mut checks = Vec::new();

    let motor_v = motor.voltage;
    let motor_kw = motor.power_kw;
    let required_amps = if motor_kw > 0.0 && motor_v > 0.0 {
        motor_kw * 1000.0 / motor_v
    } else {
        0.0
    };

    match parts.first(PartCategory::Battery) {
        Some(battery) => {
            let label = "Battery voltage";
            let check = match specs_number(battery.specifications.as_ref(), BATTERY_VOLTAGE_KEYS) {
                Some(v) if v == motor_v => EvCheck::new(
                    "battery-v",
                    label,
                    EvStatus::Ok,
                    format!("{}V matches motor", format_number(v)),
                ),
                Some(v) => EvCheck::new(
                    "battery-v",
                    label,
                    EvStatus::Error,
                    format!("{}V ≠ motor {}V", format_number(v), format_number(motor_v)),
                ),
                None => EvCheck::new(
                    "battery-v",
                    label,
                    EvStatus::Warn,
                    "Verify battery voltage matches motor",
                ),
            };
            checks.push(check);
        }
        None => checks.push(EvCheck::new(
            "battery-v",
            "Battery voltage",
            EvStatus::Warn,
            "Add a battery matching motor voltage",
        )),
    }

    match parts.first(PartCategory::MotorController) {
        Some(controller) => {
            let specs = controller.specifications.as_ref();

            if let Some(v) = specs_number(specs, CONTROLLER_VOLTAGE_KEYS) {
                checks.push(if v == motor_v {
                    EvCheck::new(
                        "ctrl-v",
                        "Controller voltage",
                        EvStatus::Ok,
                        format!("{}V matches motor", format_number(v)),
                    )
                } else {
                    EvCheck::new(
                        "ctrl-v",
                        "Controller voltage",
                        EvStatus::Error,
                        format!("{}V ≠ motor {}V", format_number(v), format_number(motor_v)),
                    )
                });
            }

            if let Some(amps) = specs_number(specs, CONTROLLER_CURRENT_KEYS) {
                if required_amps > 0.0 {
                    checks.push(if amps < required_amps {
                        EvCheck::new(
                            "ctrl-a",
                            "Controller current",
                            EvStatus::Warn,
                            format!(
                                "Rated {}A may be below motor draw (~{}A)",
                                format_number(amps),
                                format_number(round_half_up(required_amps))
                            ),
                        )
                    } else {
                        EvCheck::new(
                            "ctrl-a",
                            "Controller current",
                            EvStatus::Ok,
                            format!("Rated {}A sufficient", format_number(amps)),
                        )
                    });
                }
            }

            if let Some(kw) = specs_number(specs, CONTROLLER_POWER_KEYS) {
                if kw < motor_kw {
                    checks.push(EvCheck::new(
                        "ctrl-kw",
                        "Controller power",
                        EvStatus::Warn,
                        format!("{} kW < motor {} kW", format_number(kw), format_number(motor_kw)),
                    ));
                }
            }
        }
        None => checks.push(EvCheck::new(
            "ctrl",
            "Controller",
            EvStatus::Warn,
            "Add a controller matching motor voltage and current",
        )),
    }

    if let Some(charger) = parts.first(PartCategory::Charger) {
        if let Some(v) = specs_number(charger.specifications.as_ref(), CHARGER_VOLTAGE_KEYS) {
            checks.push(if v == motor_v {
                EvCheck::new(
                    "charger-v",
                    "Charger voltage",
                    EvStatus::Ok,
                    format!("{}V matches", format_number(v)),
                )
            } else {
                EvCheck::new(
                    "charger-v",
                    "Charger voltage",
                    EvStatus::Error,
                    format!(
                        "{}V ≠ battery/motor {}V",
                        format_number(v),
                        format_number(motor_v)
                    ),
                )
            });
        }
    }

    checks
}

/// Worst status across a set of checks, `None` when empty.
pub fn overall_status(checks: &[EvCheck]) -> Option<EvStatus> {
    if checks.is_empty() {
        None
    } else if checks.iter().any(|c| c.status == EvStatus::Error) {
        Some(EvStatus::Error)
    } else if checks.iter().any(|c| c.status == EvStatus::Warn) {
        Some(EvStatus::Warn)
    } else {
        Some(EvStatus::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Part;
    use pretty_assertions::assert_eq;

    fn motor() -> ElectricMotor {
        ElectricMotor {
            id: "m1".to_string(),
            name: "QS 3kW".to_string(),
            brand: "QS".to_string(),
            voltage: 48.0,
            power_kw: 3.0,
            peak_power_kw: Some(6.0),
            horsepower: 4.0,
            torque_lbft: 10.0,
            shaft_diameter: None,
            weight_lbs: None,
            price: None,
        }
    }

    #[test]
    fn test_empty_ev_build_asks_for_battery_and_controller() {
        let checks = check_ev_compatibility(&motor(), &SelectedParts::new());
        assert_eq!(
            checks,
            vec![
                EvCheck::new(
                    "battery-v",
                    "Battery voltage",
                    EvStatus::Warn,
                    "Add a battery matching motor voltage"
                ),
                EvCheck::new(
                    "ctrl",
                    "Controller",
                    EvStatus::Warn,
                    "Add a controller matching motor voltage and current"
                ),
            ]
        );
        assert_eq!(overall_status(&checks), Some(EvStatus::Warn));
    }

    #[test]
    fn test_matching_build_is_ok() {
        let parts = SelectedParts::from_parts([
            Part::new("b", PartCategory::Battery).with_spec("voltage", 48),
            Part::new("c", PartCategory::MotorController)
                .with_spec("voltage_max", 48)
                .with_spec("max_current", 80)
                .with_spec("power_kw", 4),
            Part::new("ch", PartCategory::Charger).with_spec("output_voltage", 48),
        ]);

        let checks = check_ev_compatibility(&motor(), &parts);
        let messages: Vec<&str> = checks.iter().map(|c| c.message.as_str()).collect();

        assert_eq!(
            messages,
            vec!["48V matches motor", "48V matches motor", "Rated 80A sufficient", "48V matches"]
        );
        assert_eq!(overall_status(&checks), Some(EvStatus::Ok));
    }

    #[test]
    fn test_mismatches() {
        let parts = SelectedParts::from_parts([
            Part::new("b", PartCategory::Battery).with_spec("voltage_v", 36),
            Part::new("c", PartCategory::MotorController)
                .with_spec("voltage", 72)
                .with_spec("continuous_amps", 40)
                .with_spec("rated_power_kw", 2.5),
            Part::new("ch", PartCategory::Charger).with_spec("voltage", 36),
        ]);

        let checks = check_ev_compatibility(&motor(), &parts);

        assert_eq!(checks[0].status, EvStatus::Error);
        assert_eq!(checks[0].message, "36V ≠ motor 48V");
        assert_eq!(checks[1].message, "72V ≠ motor 48V");
        assert_eq!(checks[2].status, EvStatus::Warn);
        assert_eq!(checks[2].message, "Rated 40A may be below motor draw (~63A)");
        assert_eq!(checks[3].message, "2.5 kW < motor 3 kW");
        assert_eq!(checks[4].message, "36V ≠ battery/motor 48V");
        assert_eq!(overall_status(&checks), Some(EvStatus::Error));
    }

    #[test]
    fn test_non_numeric_battery_voltage_needs_verification() {
        let parts = SelectedParts::from_parts([
            Part::new("b", PartCategory::Battery).with_spec("voltage", "48V"),
            Part::new("c", PartCategory::MotorController),
        ]);

        let checks = check_ev_compatibility(&motor(), &parts);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].status, EvStatus::Warn);
        assert_eq!(checks[0].message, "Verify battery voltage matches motor");
    }

    #[test]
    fn test_overall_status_empty() {
        assert_eq!(overall_status(&[]), None);
    }
}
