//! Equipment catalog and fleet sizing.
//!
//! The `equipment` module holds the robotic mower catalog and the
//! recommender that sizes a fleet for a property.  Catalogs are
//! usually supplied as JSON by the front end's data source; they are
//! parsed into typed records and structurally validated.  Whenever a
//! catalog is unavailable or malformed the built-in catalog is used
//! instead, so a recommendation can always be produced.  The loaded
//! catalog is passed explicitly to [`recommend`]; nothing is cached
//! globally.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{finite_or_zero, round_to};
use crate::error::CatalogError;
use crate::models::PropertyType;

/// Target acreage up to which the smaller model of a family is chosen.
pub const SMALL_SITE_ACRES: f64 = 2.0;

/// A robotic mower model offered by the vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentModel {
    /// Catalog key, e.g. `"550-epos"`.  Filled from the map key when
    /// absent in the JSON record.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub short_name: String,
    /// Unit price in dollars.
    pub price: f64,
    /// Acres a single unit can maintain.
    pub coverage: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub terrain: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryPrices {
    /// One RTK reference station per site.
    pub reference_station: f64,
    /// Weather housing, one per mower.
    pub housing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationPrices {
    pub per_unit: f64,
    /// Flat setup and staff training charge per site.
    pub setup_training: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrices {
    pub annual_maintenance: f64,
    pub remote_support: f64,
    pub winter_storage: f64,
}

/// Models plus accessory, installation and service price tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCatalog {
    pub models: BTreeMap<String, EquipmentModel>,
    pub accessories: AccessoryPrices,
    pub installation: InstallationPrices,
    pub services: ServicePrices,
}

/// The four models the selection table can choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSlot {
    Standard520,
    Standard550,
    AllTerrain520,
    AllTerrain550,
}

impl ModelSlot {
    pub const ALL: [ModelSlot; 4] = [
        ModelSlot::Standard520,
        ModelSlot::Standard550,
        ModelSlot::AllTerrain520,
        ModelSlot::AllTerrain550,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ModelSlot::Standard520 => "520-epos",
            ModelSlot::Standard550 => "550-epos",
            ModelSlot::AllTerrain520 => "520h-epos",
            ModelSlot::AllTerrain550 => "550h-epos",
        }
    }

    /// Picks a model from the property category, target acreage and
    /// terrain.  Golf courses and hilly sites always get the
    /// all-terrain family.
    pub fn select(property_type: PropertyType, target_acreage: f64, is_hilly: bool) -> Self {
        let all_terrain = property_type == PropertyType::Golf || is_hilly;
        let large = target_acreage > SMALL_SITE_ACRES;
        match (all_terrain, large) {
            (true, false) => ModelSlot::AllTerrain520,
            (true, true) => ModelSlot::AllTerrain550,
            (false, false) => ModelSlot::Standard520,
            (false, true) => ModelSlot::Standard550,
        }
    }

    fn builtin_model(self) -> EquipmentModel {
        match self {
            ModelSlot::Standard520 => model(
                self.id(),
                "Automower 520 EPOS",
                "520 EPOS",
                4999.0,
                1.25,
                "Wire-free satellite navigated mower for open, flat grounds.",
                "flat",
                &["commercial", "athletic"],
            ),
            ModelSlot::Standard550 => model(
                self.id(),
                "Automower 550 EPOS",
                "550 EPOS",
                6499.0,
                2.5,
                "High-capacity wire-free mower for large commercial areas.",
                "flat",
                &["commercial", "athletic"],
            ),
            ModelSlot::AllTerrain520 => model(
                self.id(),
                "Automower 520H EPOS",
                "520H EPOS",
                5299.0,
                1.25,
                "Wire-free mower with fine-cut deck and slope handling for greens and surrounds.",
                "hilly",
                &["golf", "commercial"],
            ),
            ModelSlot::AllTerrain550 => model(
                self.id(),
                "Automower 550H EPOS",
                "550H EPOS",
                6899.0,
                2.5,
                "High-capacity wire-free mower for fairways and sloped terrain.",
                "hilly",
                &["golf", "commercial", "athletic"],
            ),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn model(
    id: &str,
    name: &str,
    short_name: &str,
    price: f64,
    coverage: f64,
    description: &str,
    terrain: &str,
    categories: &[&str],
) -> EquipmentModel {
    EquipmentModel {
        id: id.to_string(),
        name: name.to_string(),
        short_name: short_name.to_string(),
        price,
        coverage,
        description: description.to_string(),
        terrain: terrain.to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}

impl EquipmentCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        let mut models: BTreeMap<String, EquipmentModel> = ModelSlot::ALL
            .iter()
            .map(|slot| (slot.id().to_string(), slot.builtin_model()))
            .collect();
        models.insert(
            "535awd-epos".to_string(),
            model(
                "535awd-epos",
                "Automower 535 AWD EPOS",
                "535 AWD EPOS",
                5899.0,
                0.875,
                "All-wheel-drive wire-free mower for steep embankments.",
                "steep",
                &["commercial", "golf"],
            ),
        );
        Self {
            models,
            accessories: AccessoryPrices {
                reference_station: 2499.0,
                housing: 399.0,
            },
            installation: InstallationPrices {
                per_unit: 750.0,
                setup_training: 1500.0,
            },
            services: ServicePrices {
                annual_maintenance: 350.0,
                remote_support: 600.0,
                winter_storage: 150.0,
            },
        }
    }

    /// Parses and validates a catalog from an already fetched JSON value.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let mut catalog: EquipmentCatalog = serde_json::from_value(value)?;
        catalog.fill_ids();
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: EquipmentCatalog = serde_json::from_str(json)?;
        catalog.fill_ids();
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    fn fill_ids(&mut self) {
        for (id, model) in self.models.iter_mut() {
            if model.id.is_empty() {
                model.id = id.clone();
            }
        }
    }

    /// Checks that every selectable model is present and that all
    /// prices and coverages are usable.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for slot in ModelSlot::ALL {
            if !self.models.contains_key(slot.id()) {
                return Err(CatalogError::MissingModel(slot.id().to_string()));
            }
        }
        for (id, model) in &self.models {
            check_price(&format!("models.{id}.price"), model.price)?;
            if !(model.coverage.is_finite() && model.coverage > 0.0) {
                return Err(CatalogError::InvalidCoverage {
                    model: id.clone(),
                    value: model.coverage,
                });
            }
        }
        check_price("accessories.referenceStation", self.accessories.reference_station)?;
        check_price("accessories.housing", self.accessories.housing)?;
        check_price("installation.perUnit", self.installation.per_unit)?;
        check_price("installation.setupTraining", self.installation.setup_training)?;
        check_price("services.annualMaintenance", self.services.annual_maintenance)?;
        check_price("services.remoteSupport", self.services.remote_support)?;
        check_price("services.winterStorage", self.services.winter_storage)?;
        Ok(())
    }

    fn model_for(&self, slot: ModelSlot) -> EquipmentModel {
        self.models
            .get(slot.id())
            .cloned()
            .unwrap_or_else(|| slot.builtin_model())
    }
}

fn check_price(field: &str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidPrice {
            field: field.to_string(),
            value,
        })
    }
}

/// Where the catalog in use came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogSource {
    Builtin,
    Loaded,
    /// A catalog was supplied but rejected.
    Fallback { reason: String },
}

/// A usable catalog together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCatalog {
    pub catalog: EquipmentCatalog,
    pub source: CatalogSource,
}

impl LoadedCatalog {
    pub fn builtin() -> Self {
        Self {
            catalog: EquipmentCatalog::builtin(),
            source: CatalogSource::Builtin,
        }
    }

    /// Accepts a parsed catalog, or logs the failure and falls back to
    /// the built-in one.
    pub fn from_result(result: Result<EquipmentCatalog, CatalogError>) -> Self {
        match result {
            Ok(catalog) => Self {
                catalog,
                source: CatalogSource::Loaded,
            },
            Err(err) => {
                tracing::warn!(error = %err, "equipment catalog rejected, using built-in catalog");
                Self {
                    catalog: EquipmentCatalog::builtin(),
                    source: CatalogSource::Fallback {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }
}

/// Loads a catalog file, falling back to the built-in catalog when the
/// file is missing or malformed.
pub fn load_catalog(path: &Path) -> LoadedCatalog {
    tracing::info!(path = %path.display(), "loading equipment catalog");
    LoadedCatalog::from_result(EquipmentCatalog::from_file(path))
}

/// Resolves an optional catalog path from configuration.
pub fn load_catalog_opt(path: Option<&Path>) -> LoadedCatalog {
    match path {
        Some(path) => load_catalog(path),
        None => LoadedCatalog::builtin(),
    }
}

/// Summary of the chosen model as shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub name: String,
    pub short_name: String,
    pub price: f64,
    pub coverage: f64,
    pub description: String,
}

impl From<&EquipmentModel> for ModelSummary {
    fn from(model: &EquipmentModel) -> Self {
        Self {
            name: model.name.clone(),
            short_name: model.short_name.clone(),
            price: model.price,
            coverage: model.coverage,
            description: model.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentCosts {
    pub mowers: f64,
    pub reference_station: f64,
    pub housing: f64,
    pub installation: f64,
    pub setup: f64,
    /// Hardware only: mowers, reference station and housings.
    pub total_equipment: f64,
    /// Hardware plus installation and setup.
    pub total_investment: f64,
    pub annual_service: f64,
}

/// A single priced line of a breakdown table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLine {
    pub item: String,
    pub quantity: u64,
    pub unit_price: f64,
    pub total: f64,
}

impl CostLine {
    fn new(item: impl Into<String>, quantity: u64, unit_price: f64) -> Self {
        Self {
            item: item.into(),
            quantity,
            unit_price,
            total: round_to(quantity as f64 * unit_price, 2),
        }
    }
}

/// A sized and priced fleet for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecommendation {
    pub model: ModelSummary,
    /// Always at least one.
    pub units_needed: u64,
    pub target_acreage: f64,
    pub costs: EquipmentCosts,
    pub breakdown: Vec<CostLine>,
    pub annual_breakdown: Vec<CostLine>,
}

/// Sizes and prices a fleet for the given property.
///
/// `acreage` is floored at zero and `automation_level` clamped to
/// `0..=100`; non-finite values count as zero.
pub fn recommend(
    catalog: &EquipmentCatalog,
    property_type: PropertyType,
    acreage: f64,
    automation_level: f64,
    is_hilly: bool,
) -> EquipmentRecommendation {
    let acreage = finite_or_zero(acreage).max(0.0);
    let automation_level = finite_or_zero(automation_level).clamp(0.0, 100.0);
    let target_acreage = acreage * automation_level / 100.0;

    let slot = ModelSlot::select(property_type, target_acreage, is_hilly);
    let model = catalog.model_for(slot);
    let units_needed = (target_acreage / model.coverage).ceil().max(1.0) as u64;

    let accessories = catalog.accessories;
    let installation = catalog.installation;
    let services = catalog.services;

    let breakdown = vec![
        CostLine::new(model.name.clone(), units_needed, model.price),
        CostLine::new("EPOS reference station", 1, accessories.reference_station),
        CostLine::new("Weather housing", units_needed, accessories.housing),
        CostLine::new("Installation", units_needed, installation.per_unit),
        CostLine::new("Setup and training", 1, installation.setup_training),
    ];
    let annual_breakdown = vec![
        CostLine::new("Annual maintenance", units_needed, services.annual_maintenance),
        CostLine::new("Remote support", 1, services.remote_support),
        CostLine::new("Winter storage", units_needed, services.winter_storage),
    ];

    let mowers = breakdown[0].total;
    let reference_station = breakdown[1].total;
    let housing = breakdown[2].total;
    let installation_total = breakdown[3].total;
    let setup = breakdown[4].total;
    let total_equipment = round_to(mowers + reference_station + housing, 2);
    let total_investment = round_to(total_equipment + installation_total + setup, 2);
    let annual_service = round_to(annual_breakdown.iter().map(|line| line.total).sum(), 2);

    EquipmentRecommendation {
        model: ModelSummary::from(&model),
        units_needed,
        target_acreage,
        costs: EquipmentCosts {
            mowers,
            reference_station,
            housing,
            installation: installation_total,
            setup,
            total_equipment,
            total_investment,
            annual_service,
        },
        breakdown,
        annual_breakdown,
    }
}
