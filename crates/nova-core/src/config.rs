//! Run configuration: typed view over the nested run parameters.
//!
//! A [`Configuration`] is built once from a nested YAML document with
//! four required sections (`hydro`, `model`, `mesh`, `control`) and is
//! immutable afterwards. The `model` section names exactly one physical
//! setup; its key is used as a display label and nothing else.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::ConfigError;

/// Top-level sections every configuration document must carry.
pub const REQUIRED_SECTIONS: [&str; 4] = ["hydro", "model", "mesh", "control"];

/// Time-integration order of the engine's Runge-Kutta scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RungeKuttaOrder {
    /// First order (forward Euler).
    RK1,
    /// Second order.
    RK2,
    /// Third order.
    RK3,
}

/// Approximate Riemann solver used by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiemannSolver {
    /// Harten-Lax-van Leer-Einfeldt.
    HLLE,
    /// HLL with contact restoration.
    HLLC,
}

/// Relativistic hydrodynamics parameters (`hydro` section).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hydro {
    /// Adiabatic index of the gamma-law equation of state.
    pub gamma_law_index: f64,
    /// Piecewise-linear gradient limiter parameter, in `[1, 2]`.
    pub plm_theta: f64,
    /// Courant number, in `[0, 0.7]`.
    pub cfl_number: f64,
    /// Time-integration order.
    pub runge_kutta_order: RungeKuttaOrder,
    /// Riemann solver identifier.
    pub riemann_solver: RiemannSolver,
}

/// The `hydro` section, unwrapping the `hydro: {relativistic: ...}` form
/// written by older runs.
///
/// The form is chosen by shape before deserializing, so a bad field in
/// either form is reported as that field's error.
fn hydro_section(section: Value) -> Result<Hydro, ConfigError> {
    let section = match section {
        Value::Mapping(mut entries) if entries.len() == 1 => match entries.remove("relativistic") {
            Some(inner) => inner,
            None => Value::Mapping(entries),
        },
        other => other,
    };
    Ok(serde_yaml::from_value(section)?)
}

/// The single active physical setup (`model` section).
///
/// Parameters are kept verbatim in document order. They are numeric in
/// practice, but some setups carry optional strings (e.g. a table path).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, Value>",
    into = "IndexMap<String, IndexMap<String, Value>>"
)]
pub struct ModelSetup {
    name: String,
    parameters: IndexMap<String, Value>,
}

impl ModelSetup {
    /// The setup name, e.g. `"kinetic_bomb"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All setup parameters in document order.
    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// A numeric parameter, or `None` if absent or not a number.
    pub fn parameter_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(Value::as_f64)
    }
}

impl TryFrom<IndexMap<String, Value>> for ModelSetup {
    type Error = ConfigError;

    fn try_from(entries: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        if entries.len() != 1 {
            return Err(ConfigError::ModelCount {
                found: entries.len(),
            });
        }
        let Some((name, body)) = entries.into_iter().next() else {
            return Err(ConfigError::ModelCount { found: 0 });
        };
        let parameters = match body {
            Value::Null => IndexMap::new(),
            other => serde_yaml::from_value(other)?,
        };
        Ok(Self { name, parameters })
    }
}

impl From<ModelSetup> for IndexMap<String, IndexMap<String, Value>> {
    fn from(model: ModelSetup) -> Self {
        let mut entries = IndexMap::with_capacity(1);
        entries.insert(model.name, model.parameters);
        entries
    }
}

/// Polar mesh layout (`mesh` section).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mesh {
    /// Radius of the inner boundary at the start time (cm).
    pub inner_radius: f64,
    /// Radius of the outer boundary at the start time (cm).
    pub outer_radius: f64,
    /// Speed at which the inner boundary moves outward (cm/s).
    pub inner_excision_speed: f64,
    /// Speed at which the outer boundary moves outward (cm/s).
    pub outer_excision_speed: f64,
    /// Radius at which block sizes are referenced (cm).
    pub reference_radius: f64,
    /// Number of zones in the polar direction, over `[0, π]`.
    pub num_polar_zones: usize,
    /// Number of zones per decade in the radial direction.
    pub num_radial_zones: usize,
    /// Number of radial zones in each block.
    pub block_size: usize,
}

/// Run control (`control` section).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Control {
    /// Simulation start time. Not necessarily zero: setups may have a
    /// time-dependent background.
    pub start_time: f64,
    /// Simulation end time.
    pub final_time: f64,
    /// Time between checkpoint files.
    pub checkpoint_interval: f64,
    /// Time between products files. Deprecated; products are normally
    /// derived from checkpoints in post-processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_interval: Option<f64>,
    /// Number of iterations between side effects.
    pub fold: usize,
    /// Worker thread count; `None` means twice the available parallelism.
    #[serde(default)]
    pub num_threads: Option<usize>,
    /// Deprecated; accepted so that older run files still parse.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub snappy_compression: bool,
    /// Directory data files are written to.
    #[serde(default = "Control::default_output_directory")]
    pub output_directory: String,
}

impl Control {
    fn default_output_directory() -> String {
        ".".into()
    }

    /// Resolve the worker thread count, applying the default if unset.
    pub fn resolved_num_threads(&self) -> usize {
        match self.num_threads {
            Some(n) => n,
            None => {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
                    * 2
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfiguration {
    hydro: Value,
    model: ModelSetup,
    mesh: Mesh,
    control: Control,
}

/// Validated, immutable run configuration.
///
/// # Examples
///
/// ```
/// use nova_core::Configuration;
///
/// let config = Configuration::from_yaml(r#"
/// hydro:
///   gamma_law_index: 1.3333333333333333
///   plm_theta: 1.5
///   cfl_number: 0.3
///   runge_kutta_order: RK2
///   riemann_solver: HLLC
/// model:
///   kinetic_bomb:
///     external_medium_density: 1.0e-20
///     launch_radius: 1.0e8
/// mesh:
///   inner_radius: 1.0e8
///   outer_radius: 1.0e10
///   inner_excision_speed: 0.0
///   outer_excision_speed: 0.0
///   reference_radius: 1.0e8
///   num_polar_zones: 1
///   num_radial_zones: 64
///   block_size: 32
/// control:
///   start_time: 1.0
///   final_time: 10.0
///   checkpoint_interval: 1.0
///   fold: 10
/// "#).unwrap();
///
/// assert_eq!(config.model_name(), "kinetic_bomb");
/// assert_eq!(config.control().output_directory, ".");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Configuration {
    hydro: Hydro,
    model: ModelSetup,
    mesh: Mesh,
    control: Control,
}

impl Configuration {
    /// Build a configuration from a nested key-value document.
    ///
    /// Checks that the four required sections are present and that
    /// `model` names exactly one setup, then deserializes the typed
    /// sections and validates parameter ranges.
    pub fn from_document(document: Value) -> Result<Self, ConfigError> {
        let mapping = document.as_mapping().ok_or(ConfigError::NotAMapping)?;

        for section in REQUIRED_SECTIONS {
            if !mapping.contains_key(section) {
                return Err(ConfigError::MissingSection { section });
            }
        }
        match mapping.get("model") {
            Some(Value::Mapping(entries)) if entries.len() == 1 => {}
            Some(Value::Mapping(entries)) => {
                return Err(ConfigError::ModelCount {
                    found: entries.len(),
                })
            }
            _ => return Err(ConfigError::ModelCount { found: 0 }),
        }

        let raw: RawConfiguration = serde_yaml::from_value(document)?;
        let config = Self {
            hydro: hydro_section(raw.hydro)?,
            model: raw.model,
            mesh: raw.mesh,
            control: raw.control,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Self::from_document(serde_yaml::from_str(text)?)
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Render the configuration as YAML in its canonical (flat) form.
    ///
    /// The output parses back to an equal configuration.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hydro = &self.hydro;
        if !(1.0..=2.0).contains(&hydro.plm_theta) {
            return Err(invalid("hydro.plm_theta", "must be in the range [1, 2]"));
        }
        if !(0.0..=0.7).contains(&hydro.cfl_number) {
            return Err(invalid("hydro.cfl_number", "must be in the range [0.0, 0.7]"));
        }
        if !(hydro.gamma_law_index > 1.0) {
            return Err(invalid("hydro.gamma_law_index", "must be greater than 1"));
        }

        let mesh = &self.mesh;
        if !(mesh.inner_radius > 0.0 && mesh.inner_radius < mesh.outer_radius) {
            return Err(invalid(
                "mesh.inner_radius",
                "must be positive and less than mesh.outer_radius",
            ));
        }
        if mesh.num_polar_zones == 0 {
            return Err(invalid("mesh.num_polar_zones", "must be at least 1"));
        }
        if mesh.num_radial_zones == 0 {
            return Err(invalid("mesh.num_radial_zones", "must be at least 1"));
        }
        if mesh.block_size == 0 {
            return Err(invalid("mesh.block_size", "must be at least 1"));
        }

        let control = &self.control;
        if let Some(n) = control.num_threads {
            if n == 0 || n >= 1024 {
                return Err(invalid("control.num_threads", "must be > 0 and < 1024"));
            }
        }
        if control.checkpoint_interval < 0.0 {
            return Err(invalid("control.checkpoint_interval", "must be >= 0"));
        }
        if control.products_interval.unwrap_or(0.0) < 0.0 {
            return Err(invalid("control.products_interval", "must be >= 0"));
        }
        Ok(())
    }

    /// Hydrodynamics parameters.
    pub fn hydro(&self) -> &Hydro {
        &self.hydro
    }

    /// The active physical setup.
    pub fn model(&self) -> &ModelSetup {
        &self.model
    }

    /// Display label of the active setup.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Mesh layout.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Run control.
    pub fn control(&self) -> &Control {
        &self.control
    }
}

impl TryFrom<Value> for Configuration {
    type Error = ConfigError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::from_document(document)
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}
