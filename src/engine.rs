//! ROI computation engine.
//!
//! The `engine` module turns [`ResolvedInputs`] into an [`RoiResult`],
//! evaluates an equipment investment against the resulting savings and
//! extends the first year into a five-year projection.  Every function
//! here is pure: identical inputs give bit-identical outputs and no
//! state is shared between calls, which is what lets
//! [`evaluate_scenarios`] spread independent calculations across cores
//! with [`rayon`].
//!
//! Monetary figures are rounded to cents at each step rather than only
//! at the end; totals are sums of already rounded parts.

use rayon::prelude::*;

use crate::equipment::{recommend, EquipmentCatalog};
use crate::inputs::{resolve, RawInputs};
use crate::models::{
    CalculatorData, CalculatorReport, CostComponents, CurrentCosts, EnvironmentalImpact,
    InvestmentMetrics, LaborImpact, MaintenanceType, NewCosts, ProjectionYear, ResolvedInputs,
    RoiResult, Savings,
};

/// Share of an outsourced contract that automation displaces.
pub const OUTSOURCED_DISPLACEMENT: f64 = 0.85;
/// Equipment wear falls at half the automation rate.
pub const EQUIPMENT_WEAR_FACTOR: f64 = 0.5;
/// Electricity price in dollars per kWh.
pub const ELECTRICITY_RATE: f64 = 0.12;
/// Pounds of CO2 absorbed by one tree per year.
pub const CO2_PER_TREE: f64 = 48.0;
/// Typical noise reduction of robotic over ride-on mowers, in dB.
pub const NOISE_REDUCTION_DB: f64 = 30.0;
pub const HOURS_PER_WEEK: f64 = 40.0;
pub const PROJECTION_YEARS: usize = 5;

/// Rounds half up (towards positive infinity) to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Current annual labour, fuel and equipment costs.
fn current_costs(inputs: &ResolvedInputs) -> (f64, f64, f64) {
    match inputs.maintenance_type {
        MaintenanceType::Outsourced => (round2(inputs.monthly_contract * 12.0), 0.0, 0.0),
        MaintenanceType::InHouse => {
            let labor = round2(
                inputs.employees
                    * inputs.hourly_rate
                    * (1.0 + inputs.benefits_rate / 100.0)
                    * HOURS_PER_WEEK
                    * inputs.season_weeks
                    * (inputs.mowing_time_percent / 100.0)
                    * (1.0 + inputs.buffer_time / 100.0),
            );
            let fuel = round2(
                inputs.acreage
                    * inputs.fuel_per_acre
                    * inputs.mows_per_week
                    * inputs.season_weeks
                    * inputs.fuel_cost_per_gallon,
            );
            let equipment_base =
                inputs.base_equipment_cost + inputs.equipment_cost_per_acre * inputs.acreage;
            let mut equipment = equipment_base
                * (inputs.maintenance_rate / 100.0 + inputs.insurance_rate / 100.0);
            if inputs.is_leased {
                equipment *= 1.0 + inputs.leasing_premium / 100.0;
            }
            (labor, fuel, round2(equipment))
        }
    }
}

/// Computes first-year costs, savings, labour and environmental impact.
pub fn calculate(inputs: &ResolvedInputs) -> RoiResult {
    let automation = inputs.automation_level / 100.0;
    let reduction = inputs.labor_reduction / 100.0;

    let (labor_cost, fuel_cost, equipment_cost) = current_costs(inputs);
    let current_costs = CurrentCosts {
        labor: labor_cost,
        fuel: fuel_cost,
        equipment: equipment_cost,
        total: round2(labor_cost + fuel_cost + equipment_cost),
    };

    let (labor_savings, fuel_savings, equipment_savings) = match inputs.maintenance_type {
        MaintenanceType::Outsourced => (
            round2(labor_cost * automation * OUTSOURCED_DISPLACEMENT),
            0.0,
            0.0,
        ),
        MaintenanceType::InHouse => (
            round2(labor_cost * automation * reduction),
            round2(fuel_cost * automation),
            round2(equipment_cost * automation * EQUIPMENT_WEAR_FACTOR),
        ),
    };
    let savings = Savings {
        labor: labor_savings,
        fuel: fuel_savings,
        equipment: equipment_savings,
        gross: round2(labor_savings + fuel_savings + equipment_savings),
    };

    let automated_acres = inputs.acreage * automation;
    let maintenance = round2(automated_acres * inputs.robotic_maintenance * 12.0);
    let electricity = round2(
        automated_acres
            * inputs.electricity_per_acre
            * ELECTRICITY_RATE
            * inputs.mows_per_week
            * inputs.season_weeks,
    );
    let new_costs = NewCosts {
        maintenance,
        electricity,
        total: round2(maintenance + electricity),
    };

    let net_annual_savings = round2(savings.gross - new_costs.total);

    let current_hours = round_to(
        inputs.acreage * inputs.mowing_time_per_acre / 60.0
            * inputs.mows_per_week
            * inputs.season_weeks,
        0,
    );
    let hours_saved = round_to(current_hours * automation * reduction, 0);
    let (current_fte, reduced_fte) = match inputs.maintenance_type {
        MaintenanceType::Outsourced => (0.0, 0.0),
        MaintenanceType::InHouse => {
            let current = round_to(inputs.employees * inputs.mowing_time_percent / 100.0, 1);
            let reduced = round_to(current * (1.0 - automation * reduction), 1).max(0.0);
            (current, reduced)
        }
    };

    let fuel_gallons =
        automated_acres * inputs.fuel_per_acre * inputs.mows_per_week * inputs.season_weeks;
    let co2_reduced = round2(
        automated_acres
            * inputs.fuel_per_acre
            * inputs.co2_per_gallon
            * inputs.mows_per_week
            * inputs.season_weeks,
    );

    RoiResult {
        current_costs,
        savings,
        new_costs,
        net_annual_savings,
        labor: LaborImpact {
            current_hours,
            hours_saved,
            current_fte,
            reduced_fte,
        },
        environmental: EnvironmentalImpact {
            co2_reduced,
            fuel_gallons_saved: round2(fuel_gallons),
            tree_equivalents: round_to(co2_reduced / CO2_PER_TREE, 1),
            noise_reduction: NOISE_REDUCTION_DB,
        },
        inputs: inputs.clone(),
    }
}

/// Evaluates an up-front investment and recurring service cost against
/// a year's net savings.
///
/// Infinite results are real `f64::INFINITY` values: ROI is infinite
/// when nothing is invested but savings are positive, and payback is
/// infinite when an investment never pays back.  Non-finite inputs
/// count as zero so NaN never reaches the result.  ROI is left
/// unrounded.
pub fn with_investment(
    net_annual_savings: f64,
    total_investment: f64,
    annual_service_cost: f64,
) -> InvestmentMetrics {
    let net_annual_savings = finite_or_zero(net_annual_savings);
    let total_investment = finite_or_zero(total_investment).max(0.0);
    let annual_service_cost = finite_or_zero(annual_service_cost).max(0.0);
    let effective = round2(net_annual_savings - annual_service_cost);

    let (roi, payback_years, payback_months) = if total_investment == 0.0 {
        let roi = if effective > 0.0 { f64::INFINITY } else { 0.0 };
        (roi, 0.0, 0.0)
    } else if effective <= 0.0 {
        (
            effective / total_investment * 100.0,
            f64::INFINITY,
            f64::INFINITY,
        )
    } else {
        let years = round2(total_investment / effective);
        (
            effective / total_investment * 100.0,
            years,
            round_to(years * 12.0, 1),
        )
    };

    InvestmentMetrics {
        roi,
        payback_years,
        payback_months,
        total_investment,
        annual_service_cost,
        effective_annual_savings: effective,
    }
}

/// Extends first-year costs into a five-year forecast.
///
/// Labour and fuel compound at their annual increase rates; equipment
/// costs stay flat.  The up-front investment is counted once and is
/// present in every cumulative automated total.
pub fn project(
    components: &CostComponents,
    inputs: &ResolvedInputs,
    total_investment: f64,
    annual_service_cost: f64,
) -> [ProjectionYear; PROJECTION_YEARS] {
    let total_investment = total_investment.max(0.0);
    let annual_service_cost = annual_service_cost.max(0.0);
    let automation = inputs.automation_level / 100.0;
    let reduction = inputs.labor_reduction / 100.0;

    let mut cumulative_traditional = 0.0;
    let mut cumulative_operating = 0.0;

    std::array::from_fn(|index| {
        let year = index as u32 + 1;
        let labor_multiplier = (1.0 + inputs.annual_labor_increase / 100.0).powi(year as i32);
        let fuel_multiplier = (1.0 + inputs.annual_fuel_increase / 100.0).powi(year as i32);

        let traditional_cost = round2(
            components.labor_cost * labor_multiplier
                + components.fuel_cost * fuel_multiplier
                + components.equipment_annual_cost,
        );
        let automated_cost = round2(
            components.labor_cost * (1.0 - automation * reduction) * labor_multiplier
                + components.fuel_cost * (1.0 - automation) * fuel_multiplier
                + components.equipment_annual_cost * (1.0 - automation * EQUIPMENT_WEAR_FACTOR)
                + components.total_new_costs
                + annual_service_cost,
        );

        cumulative_traditional = round2(cumulative_traditional + traditional_cost);
        cumulative_operating = round2(cumulative_operating + automated_cost);
        let cumulative_automated = round2(cumulative_operating + total_investment);

        ProjectionYear {
            year,
            labor_multiplier,
            fuel_multiplier,
            traditional_cost,
            automated_cost,
            annual_savings: round2(traditional_cost - automated_cost),
            cumulative_traditional,
            cumulative_automated,
            cumulative_savings: round2(cumulative_traditional - cumulative_automated),
        }
    })
}

/// Runs the whole calculator for one set of raw form answers.
pub fn evaluate(raw: &RawInputs, catalog: &EquipmentCatalog) -> CalculatorReport {
    let inputs = resolve(raw);
    let results = calculate(&inputs);
    let equipment = recommend(
        catalog,
        inputs.property_type,
        inputs.acreage,
        inputs.automation_level,
        inputs.is_hilly,
    );
    let investment = with_investment(
        results.net_annual_savings,
        equipment.costs.total_investment,
        equipment.costs.annual_service,
    );
    let projection = project(
        &results.cost_components(),
        &inputs,
        equipment.costs.total_investment,
        equipment.costs.annual_service,
    );
    let calculator_data = CalculatorData::new(&results, &investment, &equipment);
    CalculatorReport {
        results,
        equipment,
        investment,
        projection: projection.to_vec(),
        calculator_data,
    }
}

/// Evaluates many independent scenarios in parallel.  Output order
/// matches input order.
pub fn evaluate_scenarios(
    scenarios: &[RawInputs],
    catalog: &EquipmentCatalog,
) -> Vec<CalculatorReport> {
    scenarios
        .par_iter()
        .map(|raw| evaluate(raw, catalog))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use serde_json::{json, Value};

    fn raw(value: Value) -> RawInputs {
        value.as_object().cloned().unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn example_inputs() -> RawInputs {
        raw(json!({
            "propertyType": "commercial",
            "acreage": 10,
            "seasonWeeks": 30,
            "maintenanceType": "inhouse",
            "employees": 2,
            "hourlyRate": 20,
            "mowingTimePercent": 60,
            "benefitsRate": 12,
            "fuelCostPerGallon": 3.5,
            "laborReduction": 85,
            "bufferTime": 15,
            "automationLevel": 50,
        }))
    }

    #[test]
    fn test_round_to_rounds_half_up() {
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        assert_eq!(round_to(12.344, 2), 12.34);
    }

    #[test]
    fn test_inhouse_example_costs() {
        let result = calculate(&resolve(&example_inputs()));

        // 2 * 20 * 1.12 * 40 * 30 * 0.6 * 1.15
        assert_close(result.current_costs.labor, 37094.4);
        // 10 acres * 0.75 gal * 1 mow * 30 weeks * $3.50
        assert_close(result.current_costs.fuel, 787.5);
        // (25000 + 1500 * 10) * 13%
        assert_close(result.current_costs.equipment, 5200.0);
        assert_close(result.current_costs.total, 43081.9);

        assert_close(result.savings.labor, 15765.12);
        assert_close(result.savings.fuel, 393.75);
        assert_close(result.savings.equipment, 1300.0);
        assert_close(result.savings.gross, 17458.87);

        // 5 automated acres * $12 * 12 months
        assert_close(result.new_costs.maintenance, 720.0);
        // 5 * 2.5 kWh * $0.12 * 1 * 30
        assert_close(result.new_costs.electricity, 45.0);
        assert_close(result.new_costs.total, 765.0);
        assert_close(result.net_annual_savings, 16693.87);
    }

    #[test]
    fn test_inhouse_example_labor_and_environment() {
        let result = calculate(&resolve(&example_inputs()));
        // 10 * 45 / 60 * 1 * 30 = 225
        assert_eq!(result.labor.current_hours, 225.0);
        // 225 * 0.5 * 0.85 = 95.625
        assert_eq!(result.labor.hours_saved, 96.0);
        assert_close(result.labor.current_fte, 1.2);
        // 1.2 * (1 - 0.425) = 0.69
        assert_close(result.labor.reduced_fte, 0.7);

        // 5 acres * 0.75 gal * 30 weeks
        assert_close(result.environmental.fuel_gallons_saved, 112.5);
        assert_close(result.environmental.co2_reduced, 2205.0);
        assert_close(result.environmental.tree_equivalents, 45.9);
        assert_eq!(result.environmental.noise_reduction, 30.0);
    }

    #[test]
    fn test_leased_equipment_carries_premium() {
        let mut input = example_inputs();
        input.insert("isLeased".into(), json!(true));
        let result = calculate(&resolve(&input));
        assert_close(result.current_costs.equipment, 5616.0);
    }

    #[test]
    fn test_outsourced_branch() {
        let input = raw(json!({
            "maintenanceType": "outsourced",
            "monthlyContract": 3000,
            "automationLevel": 80,
            "acreage": 20,
        }));
        let result = calculate(&resolve(&input));
        assert_close(result.current_costs.labor, 36000.0);
        assert_eq!(result.current_costs.fuel, 0.0);
        assert_eq!(result.current_costs.equipment, 0.0);
        assert_close(result.current_costs.total, 36000.0);
        assert_close(result.savings.labor, 24480.0);
        assert_eq!(result.savings.fuel, 0.0);
        assert_eq!(result.savings.equipment, 0.0);
        assert_eq!(result.labor.current_fte, 0.0);
        assert_eq!(result.labor.reduced_fte, 0.0);
    }

    #[test]
    fn test_totals_are_sums_of_rounded_parts() {
        for property in ["commercial", "golf", "athletic"] {
            for maintenance in ["inhouse", "outsourced"] {
                let input = raw(json!({
                    "propertyType": property,
                    "maintenanceType": maintenance,
                    "acreage": 17.3,
                    "hourlyRate": 23.17,
                    "automationLevel": 63,
                }));
                let r = calculate(&resolve(&input));
                let c = r.current_costs;
                assert_eq!(c.total, round_to(c.labor + c.fuel + c.equipment, 2));
                assert_eq!(
                    r.net_annual_savings,
                    round_to(r.savings.gross - r.new_costs.total, 2)
                );
            }
        }
    }

    #[test]
    fn test_calculate_is_deterministic() {
        let inputs = resolve(&raw(json!({"propertyType": "golf", "acreage": 42.7})));
        let first = calculate(&inputs);
        let second = calculate(&inputs);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_investment_free_equipment_has_infinite_roi() {
        let metrics = with_investment(1000.0, 0.0, 0.0);
        assert!(metrics.roi.is_infinite() && metrics.roi > 0.0);
        assert_eq!(metrics.payback_years, 0.0);
        assert_eq!(metrics.payback_months, 0.0);

        let metrics = with_investment(-50.0, 0.0, 0.0);
        assert_eq!(metrics.roi, 0.0);
        assert_eq!(metrics.payback_years, 0.0);
    }

    #[test]
    fn test_investment_that_never_pays_back() {
        let metrics = with_investment(500.0, 10000.0, 600.0);
        assert_close(metrics.effective_annual_savings, -100.0);
        assert!(metrics.payback_years.is_infinite());
        assert!(metrics.payback_months.is_infinite());
        assert_close(metrics.roi, -1.0);
        assert!(!metrics.roi.is_nan());
    }

    #[test]
    fn test_investment_payback() {
        let metrics = with_investment(12000.0, 20000.0, 2000.0);
        assert_close(metrics.roi, 50.0);
        assert_close(metrics.payback_years, 2.0);
        assert_close(metrics.payback_months, 24.0);

        let metrics = with_investment(7000.0, 10000.0, 0.0);
        assert_close(metrics.payback_years, 1.43);
        assert_close(metrics.payback_months, 17.2);
    }

    #[test]
    fn test_negative_investment_figures_are_clamped() {
        let metrics = with_investment(1000.0, -5.0, -10.0);
        assert_eq!(metrics.total_investment, 0.0);
        assert_eq!(metrics.annual_service_cost, 0.0);
        assert!(metrics.roi.is_infinite());
    }

    #[test]
    fn test_investment_ignores_non_finite_inputs() {
        let metrics = with_investment(f64::NAN, 10000.0, 600.0);
        assert_close(metrics.effective_annual_savings, -600.0);
        assert!(!metrics.roi.is_nan());
        assert!(metrics.payback_years.is_infinite());

        let metrics = with_investment(5000.0, f64::NAN, f64::INFINITY);
        assert_eq!(metrics.total_investment, 0.0);
        assert_eq!(metrics.annual_service_cost, 0.0);
        assert!(metrics.roi.is_infinite());
        assert_eq!(metrics.payback_years, 0.0);
    }

    #[test]
    fn test_roi_is_not_rounded() {
        let metrics = with_investment(7000.0, 30000.0, 0.0);
        assert_eq!(metrics.roi, 7000.0 / 30000.0 * 100.0);
        assert_close(metrics.payback_years, 4.29);
    }

    #[test]
    fn test_projection_first_year() {
        let inputs = resolve(&example_inputs());
        let result = calculate(&inputs);
        let years = project(&result.cost_components(), &inputs, 19295.0, 1600.0);
        assert_eq!(years.len(), PROJECTION_YEARS);

        let first = &years[0];
        assert_eq!(first.year, 1);
        assert_close(first.labor_multiplier, 1.03);
        assert_close(first.fuel_multiplier, 1.05);
        // 37094.4 * 1.03 + 787.5 * 1.05 + 5200
        assert_close(first.traditional_cost, 44234.11);
        assert_close(first.cumulative_traditional, first.traditional_cost);
        assert_close(
            first.cumulative_automated,
            round_to(first.automated_cost + 19295.0, 2),
        );
    }

    #[test]
    fn test_projection_cumulative_invariants() {
        let inputs = resolve(&raw(json!({"propertyType": "athletic", "acreage": 25})));
        let result = calculate(&inputs);
        let investment = 30000.0;
        let years = project(&result.cost_components(), &inputs, investment, 1200.0);

        for (index, year) in years.iter().enumerate() {
            assert_eq!(year.year as usize, index + 1);
            assert!(year.cumulative_automated >= investment);
            assert_close(
                year.cumulative_savings,
                year.cumulative_traditional - year.cumulative_automated,
            );
            assert_close(year.annual_savings, year.traditional_cost - year.automated_cost);
        }
        let summed: f64 = years.iter().map(|y| y.traditional_cost).sum();
        assert_close(years[4].cumulative_traditional, summed);
        let operating: f64 = years.iter().map(|y| y.automated_cost).sum();
        assert_close(years[4].cumulative_automated, operating + investment);
    }

    #[test]
    fn test_projection_equipment_cost_does_not_compound() {
        let inputs = resolve(&raw(json!({
            "employees": 0,
            "fuelCostPerGallon": 0,
            "annualLaborIncrease": 10,
            "annualFuelIncrease": 15,
        })));
        let result = calculate(&inputs);
        let years = project(&result.cost_components(), &inputs, 0.0, 0.0);
        for year in &years {
            assert_close(year.traditional_cost, result.current_costs.equipment);
        }
    }

    #[test]
    fn test_evaluate_example_scenario() {
        let report = evaluate(&example_inputs(), &EquipmentCatalog::builtin());
        assert_eq!(report.equipment.model.short_name, "550 EPOS");
        assert_eq!(report.equipment.units_needed, 2);
        assert_eq!(report.projection.len(), PROJECTION_YEARS);
        assert_close(report.investment.total_investment, 19295.0);
        assert_close(report.investment.annual_service_cost, 1600.0);
        assert_close(report.investment.roi, 15093.87 / 19295.0 * 100.0);
        assert_close(report.investment.payback_years, 1.28);

        let data = &report.calculator_data;
        assert_eq!(data.property_type, PropertyType::Commercial);
        assert_eq!(data.maintenance_type, MaintenanceType::InHouse);
        assert_close(data.projected_savings, 16693.87);
        assert_eq!(data.recommended_equipment, "2x Automower 550 EPOS");
        assert_eq!(data.labor_hours_saved, 96.0);
    }

    #[test]
    fn test_evaluate_scenarios_preserves_order() {
        let scenarios: Vec<RawInputs> = (1..=20)
            .map(|acres| raw(json!({"acreage": acres * 3})))
            .collect();
        let reports = evaluate_scenarios(&scenarios, &EquipmentCatalog::builtin());
        assert_eq!(reports.len(), 20);
        for (index, report) in reports.iter().enumerate() {
            assert_eq!(report.results.inputs.acreage, ((index + 1) * 3) as f64);
        }
    }
}
