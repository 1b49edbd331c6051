//! Input resolution.
//!
//! Turns the raw form answers submitted by the calculator into a
//! [`ResolvedInputs`] record.  Resolution never fails: missing,
//! non-numeric or non-finite values fall back to a documented default
//! and every figure is then clamped to its valid range.  Category
//! specific defaults come from [`PropertyType::profile`].

use serde_json::{Map, Value};

use crate::models::{MaintenanceType, PropertyType, ResolvedInputs};

/// Raw calculator input as posted by the form: an untyped JSON object
/// keyed by camelCase field names.
pub type RawInputs = Map<String, Value>;

/// Default, lower bound and upper bound of a numeric input.
#[derive(Debug, Clone, Copy)]
struct NumericField {
    key: &'static str,
    default: f64,
    min: f64,
    max: f64,
}

impl NumericField {
    const fn at_least(key: &'static str, default: f64, min: f64) -> Self {
        Self { key, default, min, max: f64::INFINITY }
    }

    const fn between(key: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self { key, default, min, max }
    }

    fn with_default(self, default: f64) -> Self {
        Self { default, ..self }
    }

    fn resolve(&self, raw: &RawInputs) -> f64 {
        coerce_number(raw.get(self.key))
            .unwrap_or(self.default)
            .clamp(self.min, self.max)
    }
}

const ACREAGE: NumericField = NumericField::at_least("acreage", 10.0, 0.0);
const SEASON_WEEKS: NumericField = NumericField::at_least("seasonWeeks", 30.0, 1.0);
const EMPLOYEES: NumericField = NumericField::at_least("employees", 2.0, 0.0);
const HOURLY_RATE: NumericField = NumericField::at_least("hourlyRate", 20.0, 0.0);
const MOWING_TIME_PERCENT: NumericField =
    NumericField::between("mowingTimePercent", 60.0, 0.0, 100.0);
const MONTHLY_CONTRACT: NumericField = NumericField::at_least("monthlyContract", 2000.0, 0.0);
const BENEFITS_RATE: NumericField = NumericField::between("benefitsRate", 30.0, 0.0, 100.0);
const FUEL_COST_PER_GALLON: NumericField =
    NumericField::at_least("fuelCostPerGallon", 3.5, 0.0);
const LABOR_REDUCTION: NumericField = NumericField::between("laborReduction", 85.0, 50.0, 95.0);
const BUFFER_TIME: NumericField = NumericField::between("bufferTime", 15.0, 5.0, 40.0);
const ANNUAL_LABOR_INCREASE: NumericField =
    NumericField::between("annualLaborIncrease", 3.0, 0.0, 10.0);
// Default replaced per property type.
const FUEL_PER_ACRE: NumericField = NumericField::at_least("fuelPerAcre", 0.75, 0.0);
const ANNUAL_FUEL_INCREASE: NumericField =
    NumericField::between("annualFuelIncrease", 5.0, 0.0, 15.0);
const BASE_EQUIPMENT_COST: NumericField =
    NumericField::at_least("baseEquipmentCost", 25000.0, 0.0);
const EQUIPMENT_COST_PER_ACRE: NumericField =
    NumericField::at_least("equipmentCostPerAcre", 1500.0, 0.0);
const MAINTENANCE_RATE: NumericField = NumericField::between("maintenanceRate", 10.0, 5.0, 25.0);
const INSURANCE_RATE: NumericField = NumericField::between("insuranceRate", 3.0, 1.0, 15.0);
const LEASING_PREMIUM: NumericField = NumericField::between("leasingPremium", 8.0, 0.0, 20.0);
const ROBOTIC_MAINTENANCE: NumericField =
    NumericField::at_least("roboticMaintenance", 12.0, 0.0);
const ELECTRICITY_PER_ACRE: NumericField =
    NumericField::at_least("electricityPerAcre", 2.5, 0.0);
const CO2_PER_GALLON: NumericField = NumericField::at_least("co2PerGallon", 19.6, 0.0);
// Default replaced per property type.
const MOWING_TIME_PER_ACRE: NumericField =
    NumericField::at_least("mowingTimePerAcre", 45.0, 0.0);
const AUTOMATION_LEVEL: NumericField =
    NumericField::between("automationLevel", 75.0, 25.0, 100.0);
const DESIRED_MOWING_TIME: NumericField =
    NumericField::between("desiredMowingTime", 20.0, 5.0, 60.0);

/// Resolves raw form answers into a complete configuration.
///
/// `propertyType` falls back to commercial when unrecognised and
/// `maintenanceType` is outsourced only for the exact literal
/// `"outsourced"`.  The raw map is left untouched.
pub fn resolve(raw: &RawInputs) -> ResolvedInputs {
    let property_type = resolve_property_type(raw);
    let maintenance_type = match raw.get("maintenanceType").and_then(Value::as_str) {
        Some("outsourced") => MaintenanceType::Outsourced,
        _ => MaintenanceType::InHouse,
    };
    let profile = property_type.profile();

    ResolvedInputs {
        property_type,
        maintenance_type,
        acreage: ACREAGE.resolve(raw),
        season_weeks: SEASON_WEEKS.resolve(raw),
        mows_per_week: profile.mows_per_week,
        employees: EMPLOYEES.resolve(raw),
        hourly_rate: HOURLY_RATE.resolve(raw),
        mowing_time_percent: MOWING_TIME_PERCENT.resolve(raw),
        is_leased: coerce_flag(raw.get("isLeased")),
        is_hilly: coerce_flag(raw.get("isHilly")),
        monthly_contract: MONTHLY_CONTRACT.resolve(raw),
        benefits_rate: BENEFITS_RATE.resolve(raw),
        fuel_cost_per_gallon: FUEL_COST_PER_GALLON.resolve(raw),
        labor_reduction: LABOR_REDUCTION.resolve(raw),
        buffer_time: BUFFER_TIME.resolve(raw),
        annual_labor_increase: ANNUAL_LABOR_INCREASE.resolve(raw),
        fuel_per_acre: FUEL_PER_ACRE.with_default(profile.fuel_per_acre).resolve(raw),
        annual_fuel_increase: ANNUAL_FUEL_INCREASE.resolve(raw),
        base_equipment_cost: BASE_EQUIPMENT_COST.resolve(raw),
        equipment_cost_per_acre: EQUIPMENT_COST_PER_ACRE.resolve(raw),
        maintenance_rate: MAINTENANCE_RATE.resolve(raw),
        insurance_rate: INSURANCE_RATE.resolve(raw),
        leasing_premium: LEASING_PREMIUM.resolve(raw),
        robotic_maintenance: ROBOTIC_MAINTENANCE.resolve(raw),
        electricity_per_acre: ELECTRICITY_PER_ACRE.resolve(raw),
        co2_per_gallon: CO2_PER_GALLON.resolve(raw),
        mowing_time_per_acre: MOWING_TIME_PER_ACRE
            .with_default(profile.mowing_time_per_acre)
            .resolve(raw),
        automation_level: AUTOMATION_LEVEL.resolve(raw),
        desired_mowing_time: DESIRED_MOWING_TIME.resolve(raw),
    }
}

/// The subset of inputs the equipment recommender needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentQuery {
    pub property_type: PropertyType,
    pub acreage: f64,
    /// Left unclamped here; the recommender clamps it to `0..=100`.
    pub automation_level: f64,
    pub is_hilly: bool,
}

/// Resolves an equipment-only request with the same coercion and
/// defaults as [`resolve`].
pub fn resolve_equipment_query(raw: &RawInputs) -> EquipmentQuery {
    EquipmentQuery {
        property_type: resolve_property_type(raw),
        acreage: ACREAGE.resolve(raw),
        automation_level: coerce_number(raw.get(AUTOMATION_LEVEL.key))
            .unwrap_or(AUTOMATION_LEVEL.default),
        is_hilly: coerce_flag(raw.get("isHilly")),
    }
}

fn resolve_property_type(raw: &RawInputs) -> PropertyType {
    raw.get("propertyType")
        .and_then(Value::as_str)
        .map(PropertyType::parse_lenient)
        .unwrap_or_default()
}

/// Numeric coercion in the spirit of a form field: numbers pass
/// through, numeric strings are parsed, everything else (including
/// blank strings and non-finite results) counts as missing.
pub(crate) fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Checkbox-style coercion; anything but an explicit "yes" is false.
pub(crate) fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
        _ => false,
    }
}
