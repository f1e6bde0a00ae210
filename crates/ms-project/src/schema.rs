//! Case-file schema definitions.

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub cases: Vec<CaseDef>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn case(&self, id: &str) -> Option<&CaseDef> {
        self.cases.iter().find(|c| c.id == id)
    }
}

/// One motor/load combination to be started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub nameplate: NameplateDef,
    pub characteristic: CharacteristicDef,
    #[serde(default)]
    pub load: LoadDef,
    pub soft_start: SoftStartDef,
    pub limits: LimitsDef,
    #[serde(default, skip_serializing_if = "TuningDef::is_empty")]
    pub tuning: TuningDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameplateDef {
    pub rated_power_kw: f64,
    pub rated_speed_rpm: f64,
    pub rated_full_load_current_a: f64,
    pub motor_inertia_kgm2: f64,
    #[serde(default)]
    pub load_inertia_kgm2: f64,
}

/// Motor torque/current against speed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharacteristicDef {
    /// Tabulated columns, order-aligned with `speed_pct`.
    Table {
        speed_pct: Vec<f64>,
        motor_torque_pct: Vec<f64>,
        motor_current_pct: Vec<f64>,
        /// Required when the load is `table`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        load_torque_pct: Vec<f64>,
    },
    /// Datasheet setpoints expanded into a grid.
    Kloss {
        locked_rotor_torque_pct: f64,
        pull_up_torque_pct: f64,
        breakdown_torque_pct: f64,
        locked_rotor_current_pct: f64,
        /// Speed breakpoints; standard set when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed_pct: Option<Vec<f64>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadShapeDef {
    /// The characteristic table's load column.
    Table,
    Centrifugal { breakaway_pct: f64, rated_pct: f64 },
    Constant { rated_pct: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadDef {
    pub shape: LoadShapeDef,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for LoadDef {
    fn default() -> Self {
        Self {
            shape: LoadShapeDef::Table,
            scale: 1.0,
        }
    }
}

/// Soft-start settings. The direct start needs none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoftStartDef {
    /// Defaults to the final limit (no ramp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_current_limit_pct: Option<f64>,
    pub final_current_limit_pct: f64,
    #[serde(default)]
    pub ramp_duration_s: f64,
}

impl SoftStartDef {
    pub fn initial_limit(&self) -> f64 {
        self.initial_current_limit_pct
            .unwrap_or(self.final_current_limit_pct)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsDef {
    pub stall_time_rating_s: f64,
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    #[serde(default = "default_max_time")]
    pub max_time_s: f64,
    #[serde(default = "default_reference")]
    pub locked_rotor_reference_pct: f64,
}

fn default_dt() -> f64 {
    0.01
}

fn default_max_time() -> f64 {
    60.0
}

fn default_reference() -> f64 {
    600.0
}

/// Overrides of the engine thresholds; unset fields keep the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TuningDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stall_epsilon_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settling_guard_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near_sync_speed_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_speed_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_step_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_speed_step_pct: Option<f64>,
}

impl TuningDef {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn values(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("stall_epsilon_pct", self.stall_epsilon_pct),
            ("settling_guard_s", self.settling_guard_s),
            ("near_sync_speed_pct", self.near_sync_speed_pct),
            ("running_speed_pct", self.running_speed_pct),
            ("search_step_pct", self.search_step_pct),
            ("search_speed_step_pct", self.search_speed_step_pct),
        ]
    }
}
