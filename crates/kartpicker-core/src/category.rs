use serde::{Deserialize, Serialize};

/// Closed set of part categories known to the catalog.
///
/// Category strings outside this set deserialize to [`PartCategory::Unknown`]
/// and are ignored by every compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    // Drivetrain
    Clutch,
    TorqueConverter,
    Chain,
    Sprocket,
    // Chassis
    Axle,
    Wheel,
    Tire,
    TireFront,
    TireRear,
    Brake,
    Throttle,
    Pedals,
    Frame,
    // Engine performance
    Carburetor,
    Exhaust,
    AirFilter,
    Camshaft,
    ValveSpring,
    Flywheel,
    Ignition,
    ConnectingRod,
    Piston,
    Crankshaft,
    OilSystem,
    Header,
    FuelSystem,
    Gasket,
    Hardware,
    Other,
    // Electric
    Battery,
    MotorController,
    Bms,
    Charger,
    ThrottleController,
    VoltageConverter,
    BatteryMount,
    WiringHarness,
    FuseKillSwitch,
    #[serde(other)]
    Unknown,
}

impl PartCategory {
    /// Every real category, in catalog order.
    pub const ALL: [PartCategory; 38] = [
        PartCategory::Clutch,
        PartCategory::TorqueConverter,
        PartCategory::Chain,
        PartCategory::Sprocket,
        PartCategory::Axle,
        PartCategory::Wheel,
        PartCategory::Tire,
        PartCategory::TireFront,
        PartCategory::TireRear,
        PartCategory::Brake,
        PartCategory::Throttle,
        PartCategory::Pedals,
        PartCategory::Frame,
        PartCategory::Carburetor,
        PartCategory::Exhaust,
        PartCategory::AirFilter,
        PartCategory::Camshaft,
        PartCategory::ValveSpring,
        PartCategory::Flywheel,
        PartCategory::Ignition,
        PartCategory::ConnectingRod,
        PartCategory::Piston,
        PartCategory::Crankshaft,
        PartCategory::OilSystem,
        PartCategory::Header,
        PartCategory::FuelSystem,
        PartCategory::Gasket,
        PartCategory::Hardware,
        PartCategory::Other,
        PartCategory::Battery,
        PartCategory::MotorController,
        PartCategory::Bms,
        PartCategory::Charger,
        PartCategory::ThrottleController,
        PartCategory::VoltageConverter,
        PartCategory::BatteryMount,
        PartCategory::WiringHarness,
        PartCategory::FuseKillSwitch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartCategory::Clutch => "clutch",
            PartCategory::TorqueConverter => "torque_converter",
            PartCategory::Chain => "chain",
            PartCategory::Sprocket => "sprocket",
            PartCategory::Axle => "axle",
            PartCategory::Wheel => "wheel",
            PartCategory::Tire => "tire",
            PartCategory::TireFront => "tire_front",
            PartCategory::TireRear => "tire_rear",
            PartCategory::Brake => "brake",
            PartCategory::Throttle => "throttle",
            PartCategory::Pedals => "pedals",
            PartCategory::Frame => "frame",
            PartCategory::Carburetor => "carburetor",
            PartCategory::Exhaust => "exhaust",
            PartCategory::AirFilter => "air_filter",
            PartCategory::Camshaft => "camshaft",
            PartCategory::ValveSpring => "valve_spring",
            PartCategory::Flywheel => "flywheel",
            PartCategory::Ignition => "ignition",
            PartCategory::ConnectingRod => "connecting_rod",
            PartCategory::Piston => "piston",
            PartCategory::Crankshaft => "crankshaft",
            PartCategory::OilSystem => "oil_system",
            PartCategory::Header => "header",
            PartCategory::FuelSystem => "fuel_system",
            PartCategory::Gasket => "gasket",
            PartCategory::Hardware => "hardware",
            PartCategory::Other => "other",
            PartCategory::Battery => "battery",
            PartCategory::MotorController => "motor_controller",
            PartCategory::Bms => "bms",
            PartCategory::Charger => "charger",
            PartCategory::ThrottleController => "throttle_controller",
            PartCategory::VoltageConverter => "voltage_converter",
            PartCategory::BatteryMount => "battery_mount",
            PartCategory::WiringHarness => "wiring_harness",
            PartCategory::FuseKillSwitch => "fuse_kill_switch",
            PartCategory::Unknown => "unknown",
        }
    }

    /// Parse a category string. Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Human readable label used in warnings and cost breakdowns.
    pub fn label(&self) -> &'static str {
        match self {
            PartCategory::Clutch => "Clutch",
            PartCategory::TorqueConverter => "Torque Converter",
            PartCategory::Chain => "Chain",
            PartCategory::Sprocket => "Sprocket",
            PartCategory::Axle => "Axle",
            PartCategory::Wheel => "Wheel",
            PartCategory::Tire => "Tire",
            PartCategory::TireFront => "Front Tire",
            PartCategory::TireRear => "Rear Tire",
            PartCategory::Brake => "Brake",
            PartCategory::Throttle => "Throttle",
            PartCategory::Pedals => "Pedals",
            PartCategory::Frame => "Frame",
            PartCategory::Carburetor => "Carburetor",
            PartCategory::Exhaust => "Exhaust",
            PartCategory::AirFilter => "Air Filter",
            PartCategory::Camshaft => "Camshaft",
            PartCategory::ValveSpring => "Valve Spring",
            PartCategory::Flywheel => "Flywheel",
            PartCategory::Ignition => "Ignition",
            PartCategory::ConnectingRod => "Connecting Rod",
            PartCategory::Piston => "Piston",
            PartCategory::Crankshaft => "Crankshaft",
            PartCategory::OilSystem => "Oil System",
            PartCategory::Header => "Header",
            PartCategory::FuelSystem => "Fuel System",
            PartCategory::Gasket => "Gasket",
            PartCategory::Hardware => "Hardware",
            PartCategory::Other => "Other",
            PartCategory::Battery => "Battery",
            PartCategory::MotorController => "Motor Controller",
            PartCategory::Bms => "BMS",
            PartCategory::Charger => "Charger",
            PartCategory::ThrottleController => "Throttle Controller",
            PartCategory::VoltageConverter => "Voltage Converter",
            PartCategory::BatteryMount => "Battery Mount",
            PartCategory::WiringHarness => "Wiring Harness",
            PartCategory::FuseKillSwitch => "Fuse / Kill Switch",
            PartCategory::Unknown => "Unknown",
        }
    }

    pub fn group(&self) -> CategoryGroup {
        use PartCategory::*;
        match self {
            Clutch | TorqueConverter | Chain | Sprocket => CategoryGroup::Drivetrain,
            Axle | Wheel | Tire | TireFront | TireRear | Brake | Throttle | Pedals | Frame => {
                CategoryGroup::Chassis
            }
            Carburetor | Exhaust | AirFilter | Camshaft | ValveSpring | Flywheel | Ignition
            | ConnectingRod | Piston | Crankshaft | OilSystem | Header | FuelSystem | Gasket => {
                CategoryGroup::Engine
            }
            Battery | MotorController | Bms | Charger | ThrottleController | VoltageConverter
            | BatteryMount | WiringHarness | FuseKillSwitch => CategoryGroup::Electric,
            Hardware | Other | Unknown => CategoryGroup::Other,
        }
    }
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping of categories for cost breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    PowerSource,
    Drivetrain,
    Chassis,
    Engine,
    Electric,
    Other,
}

impl CategoryGroup {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryGroup::PowerSource => "Power Source",
            CategoryGroup::Drivetrain => "Drivetrain",
            CategoryGroup::Chassis => "Chassis",
            CategoryGroup::Engine => "Engine Parts",
            CategoryGroup::Electric => "Electric",
            CategoryGroup::Other => "Other",
        }
    }
}
