use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::PartCategory;

/// Open key-value bag of mechanical/electrical attributes.
///
/// Keys vary per category and are not schema-checked.
pub type Specifications = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaftType {
    #[default]
    Straight,
    Tapered,
    Threaded,
}

impl ShaftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShaftType::Straight => "straight",
            ShaftType::Tapered => "tapered",
            ShaftType::Threaded => "threaded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "straight" => Some(ShaftType::Straight),
            "tapered" => Some(ShaftType::Tapered),
            "threaded" => Some(ShaftType::Threaded),
            _ => None,
        }
    }
}

/// A gas engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub displacement_cc: f64,
    pub horsepower: f64,
    /// lb-ft. Zero means unknown.
    #[serde(default)]
    pub torque: f64,
    /// Output shaft diameter in inches.
    #[serde(default)]
    pub shaft_diameter: f64,
    #[serde(default)]
    pub shaft_length: f64,
    #[serde(default)]
    pub shaft_type: ShaftType,
    #[serde(default)]
    pub weight_lbs: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// An electric motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricMotor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub voltage: f64,
    /// Continuous power.
    pub power_kw: f64,
    #[serde(default)]
    pub peak_power_kw: Option<f64>,
    pub horsepower: f64,
    #[serde(default)]
    pub torque_lbft: f64,
    #[serde(default)]
    pub shaft_diameter: Option<f64>,
    #[serde(default)]
    pub weight_lbs: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// The power source of a build. At most one is selected at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerSource {
    Engine(Engine),
    Motor(ElectricMotor),
}

impl PowerSource {
    pub fn as_engine(&self) -> Option<&Engine> {
        match self {
            PowerSource::Engine(engine) => Some(engine),
            PowerSource::Motor(_) => None,
        }
    }

    pub fn as_motor(&self) -> Option<&ElectricMotor> {
        match self {
            PowerSource::Engine(_) => None,
            PowerSource::Motor(motor) => Some(motor),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PowerSource::Engine(engine) => &engine.name,
            PowerSource::Motor(motor) => &motor.name,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self {
            PowerSource::Engine(engine) => engine.price,
            PowerSource::Motor(motor) => motor.price,
        }
    }
}

/// A catalog part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: PartCategory,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub specifications: Option<Specifications>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl Part {
    pub fn new(id: impl Into<String>, category: PartCategory) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category,
            brand: None,
            specifications: None,
            price: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a single specification value, creating the map if needed.
    pub fn with_spec(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.specifications
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}
