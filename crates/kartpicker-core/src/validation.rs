use crate::catalog::{ElectricMotor, Engine, Part};
use crate::category::PartCategory;
use crate::error::ValidationError;
use crate::fitment::EnginePartFitment;
use crate::rule::CompatibilityRule;

/// Validator for catalog records entering the system.
pub struct Validator;

impl Validator {
    /// Validate a record id.
    pub fn validate_id(kind: &'static str, id: &str) -> Result<(), ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId(kind));
        }
        Ok(())
    }

    /// Validate a display name.
    pub fn validate_name(kind: &'static str, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName(kind));
        }
        Ok(())
    }

    /// Must be finite and >= 0.
    pub fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < 0.0 {
            return Err(ValidationError::Negative { field, value });
        }
        Ok(())
    }

    /// Must be finite and > 0.
    pub fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
        Self::validate_non_negative(field, value)?;
        if value == 0.0 {
            return Err(ValidationError::NotPositive { field, value });
        }
        Ok(())
    }

    fn validate_optional(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
        match value {
            Some(v) => Self::validate_non_negative(field, v),
            None => Ok(()),
        }
    }

    pub fn validate_engine(engine: &Engine) -> Result<(), ValidationError> {
        Self::validate_id("engine", &engine.id)?;
        Self::validate_name("engine", &engine.name)?;
        Self::validate_non_negative("displacement_cc", engine.displacement_cc)?;
        Self::validate_non_negative("horsepower", engine.horsepower)?;
        Self::validate_non_negative("torque", engine.torque)?;
        Self::validate_non_negative("shaft_diameter", engine.shaft_diameter)?;
        Self::validate_non_negative("shaft_length", engine.shaft_length)?;
        Self::validate_optional("weight_lbs", engine.weight_lbs)?;
        Self::validate_optional("price", engine.price)?;
        Ok(())
    }

    /// Motors also need a positive voltage; the EV checks divide by it.
    pub fn validate_motor(motor: &ElectricMotor) -> Result<(), ValidationError> {
        Self::validate_id("motor", &motor.id)?;
        Self::validate_name("motor", &motor.name)?;
        Self::validate_positive("voltage", motor.voltage)?;
        Self::validate_non_negative("power_kw", motor.power_kw)?;
        Self::validate_optional("peak_power_kw", motor.peak_power_kw)?;
        Self::validate_non_negative("horsepower", motor.horsepower)?;
        Self::validate_non_negative("torque_lbft", motor.torque_lbft)?;
        Self::validate_optional("shaft_diameter", motor.shaft_diameter)?;
        Self::validate_optional("weight_lbs", motor.weight_lbs)?;
        Self::validate_optional("price", motor.price)?;
        Ok(())
    }

    /// Specification contents are free-form and not checked here.
    pub fn validate_part(part: &Part) -> Result<(), ValidationError> {
        Self::validate_id("part", &part.id)?;
        Self::validate_name("part", &part.name)?;
        if part.category == PartCategory::Unknown {
            return Err(ValidationError::UnknownCategory(part.id.clone()));
        }
        Self::validate_optional("price", part.price)?;
        Ok(())
    }

    pub fn validate_rule(rule: &CompatibilityRule) -> Result<(), ValidationError> {
        Self::validate_id("rule", &rule.id)?;
        if rule.source_category.trim().is_empty() || rule.target_category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory(rule.id.clone()));
        }
        if rule.warning_message.trim().is_empty() {
            return Err(ValidationError::EmptyWarningMessage(rule.id.clone()));
        }
        if rule.condition.spec_key_check().is_none() && rule.condition.field_check().is_none() {
            return Err(ValidationError::EmptyCondition(rule.id.clone()));
        }
        Ok(())
    }

    pub fn validate_fitment(fitment: &EnginePartFitment) -> Result<(), ValidationError> {
        Self::validate_id("engine", &fitment.engine_id)?;
        Self::validate_id("part", &fitment.part_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ShaftType;
    use crate::rule::{Comparison, Operator, RuleCondition};

    fn engine() -> Engine {
        Engine {
            id: "e1".to_string(),
            name: "Predator 212".to_string(),
            brand: "Predator".to_string(),
            displacement_cc: 212.0,
            horsepower: 6.5,
            torque: 8.1,
            shaft_diameter: 0.75,
            shaft_length: 2.43,
            shaft_type: ShaftType::Straight,
            weight_lbs: Some(37.0),
            price: Some(149.99),
        }
    }

    fn motor() -> ElectricMotor {
        ElectricMotor {
            id: "m1".to_string(),
            name: "QS 3kW".to_string(),
            brand: "QS".to_string(),
            voltage: 48.0,
            power_kw: 3.0,
            peak_power_kw: None,
            horsepower: 4.0,
            torque_lbft: 10.0,
            shaft_diameter: None,
            weight_lbs: None,
            price: None,
        }
    }

    #[test]
    fn test_valid_engine() {
        assert!(Validator::validate_engine(&engine()).is_ok());
    }

    #[test]
    fn test_invalid_engine() {
        let mut e = engine();
        e.id = "  ".to_string();
        assert_eq!(
            Validator::validate_engine(&e),
            Err(ValidationError::EmptyId("engine"))
        );

        let mut e = engine();
        e.horsepower = f64::NAN;
        assert!(matches!(
            Validator::validate_engine(&e),
            Err(ValidationError::NotFinite { field: "horsepower", .. })
        ));

        let mut e = engine();
        e.price = Some(-1.0);
        assert_eq!(
            Validator::validate_engine(&e),
            Err(ValidationError::Negative {
                field: "price",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_motor_needs_voltage() {
        assert!(Validator::validate_motor(&motor()).is_ok());

        let mut m = motor();
        m.voltage = 0.0;
        assert_eq!(
            Validator::validate_motor(&m),
            Err(ValidationError::NotPositive {
                field: "voltage",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_validate_part() {
        let part = Part::new("c1", PartCategory::Clutch).with_price(39.0);
        assert!(Validator::validate_part(&part).is_ok());

        let part = Part::new("u1", PartCategory::Unknown);
        assert_eq!(
            Validator::validate_part(&part),
            Err(ValidationError::UnknownCategory("u1".to_string()))
        );

        let part = Part::new("c2", PartCategory::Clutch).with_name("");
        assert_eq!(
            Validator::validate_part(&part),
            Err(ValidationError::EmptyName("part"))
        );
    }

    #[test]
    fn test_validate_rule() {
        let mut rule = CompatibilityRule::new(
            "chain",
            "sprocket",
            RuleCondition::spec_keys("pitch", "pitch", Comparison::Equals),
            "Chain pitch mismatch",
        );
        rule.id = "r1".to_string();
        assert!(Validator::validate_rule(&rule).is_ok());

        let mut field_rule = CompatibilityRule::new(
            "engine",
            "clutch",
            RuleCondition::fields(Operator::Equal, "shaft_diameter", "specifications.bore_diameter"),
            "Bore mismatch",
        );
        field_rule.id = "r2".to_string();
        assert!(Validator::validate_rule(&field_rule).is_ok());

        let mut empty = rule.clone();
        empty.condition = RuleCondition::default();
        assert_eq!(
            Validator::validate_rule(&empty),
            Err(ValidationError::EmptyCondition("r1".to_string()))
        );

        let mut silent = rule.clone();
        silent.warning_message = String::new();
        assert_eq!(
            Validator::validate_rule(&silent),
            Err(ValidationError::EmptyWarningMessage("r1".to_string()))
        );

        let mut no_target = rule;
        no_target.target_category = String::new();
        assert_eq!(
            Validator::validate_rule(&no_target),
            Err(ValidationError::EmptyCategory("r1".to_string()))
        );
    }
}
