//! Data models for the Mower ROI engine.
//!
//! The `models` module defines the serialisable records that flow
//! through the calculator: the resolved input configuration, the
//! single-year ROI result, investment metrics, the five-year
//! projection and the flattened calculator data handed to the lead
//! pipeline.  Field names serialise in camelCase so the records can be
//! consumed verbatim by the presentation layer.

use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentRecommendation;

/// Category of property being maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Office parks, campuses and other commercial grounds.
    #[default]
    Commercial,
    /// Golf courses.
    Golf,
    /// Sports fields and athletic complexes.
    Athletic,
}

/// Fixed per-category mowing characteristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyProfile {
    /// Minutes of manual mowing per acre.
    pub mowing_time_per_acre: f64,
    /// Mowing passes per week during the season.
    pub mows_per_week: f64,
    /// Gallons of fuel burned per acre per pass.
    pub fuel_per_acre: f64,
}

impl PropertyType {
    /// Parses a user-supplied category, falling back to
    /// [`PropertyType::Commercial`] for anything unrecognised.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "golf" => PropertyType::Golf,
            "athletic" => PropertyType::Athletic,
            _ => PropertyType::Commercial,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Commercial => "commercial",
            PropertyType::Golf => "golf",
            PropertyType::Athletic => "athletic",
        }
    }

    pub fn profile(self) -> PropertyProfile {
        match self {
            PropertyType::Commercial => PropertyProfile {
                mowing_time_per_acre: 45.0,
                mows_per_week: 1.0,
                fuel_per_acre: 0.75,
            },
            PropertyType::Golf => PropertyProfile {
                mowing_time_per_acre: 60.0,
                mows_per_week: 3.0,
                fuel_per_acre: 1.0,
            },
            PropertyType::Athletic => PropertyProfile {
                mowing_time_per_acre: 50.0,
                mows_per_week: 2.0,
                fuel_per_acre: 0.85,
            },
        }
    }
}

/// Who currently does the mowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaintenanceType {
    /// Own staff and own equipment.
    #[default]
    #[serde(rename = "inhouse")]
    InHouse,
    /// A landscaping contractor billed monthly.
    #[serde(rename = "outsourced")]
    Outsourced,
}

impl MaintenanceType {
    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceType::InHouse => "inhouse",
            MaintenanceType::Outsourced => "outsourced",
        }
    }
}

/// Fully defaulted and clamped calculator configuration.
///
/// Produced once per calculation by [`crate::inputs::resolve`] and
/// never mutated afterwards.  Every numeric field is finite and inside
/// its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInputs {
    /// Category of the property; selects the per-category defaults.
    pub property_type: PropertyType,
    /// Whether mowing is done by own staff or a contractor.
    pub maintenance_type: MaintenanceType,
    /// Total mowed area in acres.
    pub acreage: f64,
    /// Length of the mowing season in weeks, at least one.
    pub season_weeks: f64,
    /// Derived from `property_type`; not user-settable.
    pub mows_per_week: f64,
    /// Grounds staff on the payroll (in-house only).
    pub employees: f64,
    /// Base wage in dollars per hour, before benefits.
    pub hourly_rate: f64,
    /// Share of working time spent mowing, `0..=100`.
    pub mowing_time_percent: f64,
    /// Whether the current mowing fleet is leased.
    pub is_leased: bool,
    /// Sloped terrain; pushes the recommender to the all-terrain models.
    pub is_hilly: bool,
    /// Contractor invoice in dollars per month (outsourced only).
    pub monthly_contract: f64,
    /// Benefits load on top of wages, percent.
    pub benefits_rate: f64,
    pub fuel_cost_per_gallon: f64,
    /// Share of mowing labour the robots take over, `50..=95` percent.
    pub labor_reduction: f64,
    /// Travel and setup overhead on mowing hours, `5..=40` percent.
    pub buffer_time: f64,
    /// Yearly wage growth used by the projection, percent.
    pub annual_labor_increase: f64,
    /// Gallons burned per acre per pass.
    pub fuel_per_acre: f64,
    /// Yearly fuel price growth used by the projection, percent.
    pub annual_fuel_increase: f64,
    /// Fixed value of the current fleet in dollars.
    pub base_equipment_cost: f64,
    /// Fleet value that scales with acreage, dollars per acre.
    pub equipment_cost_per_acre: f64,
    /// Yearly maintenance as a percentage of fleet value.
    pub maintenance_rate: f64,
    /// Yearly insurance as a percentage of fleet value.
    pub insurance_rate: f64,
    /// Extra yearly cost of a leased fleet, percent.
    pub leasing_premium: f64,
    /// Robot upkeep in dollars per automated acre per month.
    pub robotic_maintenance: f64,
    /// Robot energy use in kWh per acre per pass.
    pub electricity_per_acre: f64,
    /// Pounds of CO2 emitted per gallon burned.
    pub co2_per_gallon: f64,
    /// Minutes of manual mowing per acre per pass.
    pub mowing_time_per_acre: f64,
    /// Share of the acreage handed to robots, `25..=100` percent.
    pub automation_level: f64,
    /// Preferred robot mowing window in hours per day.
    pub desired_mowing_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCosts {
    /// Wages and benefits, or the yearly contract when outsourced.
    pub labor: f64,
    /// Fuel burned by the current fleet.
    pub fuel: f64,
    /// Maintenance and insurance on the current fleet.
    pub equipment: f64,
    /// Sum of the three rounded parts.
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Savings {
    /// Labour no longer needed, or the displaced share of the contract.
    pub labor: f64,
    /// Fuel no longer burned; zero when outsourced.
    pub fuel: f64,
    /// Reduced wear on the current fleet; zero when outsourced.
    pub equipment: f64,
    /// Sum of the three rounded parts, before robot running costs.
    pub gross: f64,
}

/// Operating costs of the robotic fleet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCosts {
    /// Yearly robot upkeep.
    pub maintenance: f64,
    /// Yearly charging cost.
    pub electricity: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborImpact {
    /// Manual mowing hours per season, whole hours.
    pub current_hours: f64,
    /// Hours the robots take over, whole hours.
    pub hours_saved: f64,
    /// Staff equivalents spent mowing today; zero when outsourced.
    #[serde(rename = "currentFTE")]
    pub current_fte: f64,
    /// Staff equivalents still needed after automation.
    #[serde(rename = "reducedFTE")]
    pub reduced_fte: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    /// Pounds of CO2 avoided per year.
    pub co2_reduced: f64,
    pub fuel_gallons_saved: f64,
    pub tree_equivalents: f64,
    /// Decibels; a fixed figure rather than a computed one.
    pub noise_reduction: f64,
}

/// Output of the cost and savings engine for a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiResult {
    pub current_costs: CurrentCosts,
    pub savings: Savings,
    pub new_costs: NewCosts,
    pub net_annual_savings: f64,
    pub labor: LaborImpact,
    pub environmental: EnvironmentalImpact,
    pub inputs: ResolvedInputs,
}

impl RoiResult {
    /// Cost components the projection compounds year over year.
    pub fn cost_components(&self) -> CostComponents {
        CostComponents {
            labor_cost: self.current_costs.labor,
            fuel_cost: self.current_costs.fuel,
            equipment_annual_cost: self.current_costs.equipment,
            total_new_costs: self.new_costs.total,
        }
    }
}

/// First-year cost figures shared between the cost engine and the
/// projection engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComponents {
    pub labor_cost: f64,
    pub fuel_cost: f64,
    pub equipment_annual_cost: f64,
    pub total_new_costs: f64,
}

/// Return on the equipment investment.
///
/// `roi`, `payback_years` and `payback_months` may be
/// `f64::INFINITY`; they serialise as the string `"Infinity"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMetrics {
    /// Yearly return as a percentage of the investment, unrounded.
    #[serde(with = "non_finite")]
    pub roi: f64,
    /// Years to recover the investment, 2 dp.
    #[serde(with = "non_finite")]
    pub payback_years: f64,
    /// Payback in months, 1 dp.
    #[serde(with = "non_finite")]
    pub payback_months: f64,
    /// Up-front equipment and installation spend.
    pub total_investment: f64,
    /// Recurring service plan cost per year.
    pub annual_service_cost: f64,
    /// Net annual savings less the service plan.
    pub effective_annual_savings: f64,
}

/// One year of the five-year projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub labor_multiplier: f64,
    pub fuel_multiplier: f64,
    pub traditional_cost: f64,
    pub automated_cost: f64,
    pub annual_savings: f64,
    pub cumulative_traditional: f64,
    pub cumulative_automated: f64,
    pub cumulative_savings: f64,
}

/// Flattened subset of a report, shaped for the lead submission
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorData {
    pub property_type: PropertyType,
    pub acreage: f64,
    pub season_weeks: f64,
    pub maintenance_type: MaintenanceType,
    pub projected_savings: f64,
    #[serde(with = "non_finite")]
    pub roi: f64,
    /// Payback in years.
    #[serde(with = "non_finite")]
    pub payback_period: f64,
    pub recommended_equipment: String,
    pub total_investment: f64,
    pub co2_reduced: f64,
    pub labor_hours_saved: f64,
}

impl CalculatorData {
    pub fn new(
        results: &RoiResult,
        investment: &InvestmentMetrics,
        equipment: &EquipmentRecommendation,
    ) -> Self {
        Self {
            property_type: results.inputs.property_type,
            acreage: results.inputs.acreage,
            season_weeks: results.inputs.season_weeks,
            maintenance_type: results.inputs.maintenance_type,
            projected_savings: results.net_annual_savings,
            roi: investment.roi,
            payback_period: investment.payback_years,
            recommended_equipment: format!(
                "{}x {}",
                equipment.units_needed, equipment.model.name
            ),
            total_investment: investment.total_investment,
            co2_reduced: results.environmental.co2_reduced,
            labor_hours_saved: results.labor.hours_saved,
        }
    }
}

/// Everything the calculator produces for one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorReport {
    pub results: RoiResult,
    pub equipment: EquipmentRecommendation,
    pub investment: InvestmentMetrics,
    pub projection: Vec<ProjectionYear>,
    pub calculator_data: CalculatorData,
}

/// Serde adapter for figures that may hold an infinite sentinel.
///
/// JSON has no representation for infinity, so non-finite values are
/// written as the strings `"Infinity"`, `"-Infinity"` and `"NaN"`.
/// Plain numbers and those strings are accepted when reading.
pub mod non_finite {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(text) => match text.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(de::Error::custom(format!("invalid number {other:?}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_type_parse_lenient() {
        assert_eq!(PropertyType::parse_lenient("GOLF "), PropertyType::Golf);
        assert_eq!(PropertyType::parse_lenient("athletic"), PropertyType::Athletic);
        assert_eq!(PropertyType::parse_lenient("stadium"), PropertyType::Commercial);
        assert_eq!(PropertyType::parse_lenient(""), PropertyType::Commercial);
    }

    #[test]
    fn test_profiles_match_category_table() {
        let golf = PropertyType::Golf.profile();
        assert_eq!(golf.mowing_time_per_acre, 60.0);
        assert_eq!(golf.mows_per_week, 3.0);
        assert_eq!(golf.fuel_per_acre, 1.0);
        let athletic = PropertyType::Athletic.profile();
        assert_eq!(athletic.mows_per_week, 2.0);
        assert_eq!(athletic.fuel_per_acre, 0.85);
    }

    #[test]
    fn test_infinite_metrics_serialise_as_strings() {
        let metrics = InvestmentMetrics {
            roi: f64::INFINITY,
            payback_years: 0.0,
            payback_months: 0.0,
            total_investment: 0.0,
            annual_service_cost: 0.0,
            effective_annual_savings: 1000.0,
        };
        let value = serde_json::to_value(metrics).unwrap();
        assert_eq!(value["roi"], json!("Infinity"));
        assert_eq!(value["paybackYears"], json!(0.0));

        let back: InvestmentMetrics = serde_json::from_value(value).unwrap();
        assert!(back.roi.is_infinite() && back.roi > 0.0);
    }

    #[test]
    fn test_maintenance_type_wire_names() {
        assert_eq!(
            serde_json::to_value(MaintenanceType::InHouse).unwrap(),
            json!("inhouse")
        );
        assert_eq!(
            serde_json::to_value(MaintenanceType::Outsourced).unwrap(),
            json!("outsourced")
        );
    }
}
