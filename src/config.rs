use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{GavelError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub mechanism: MechanismConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Number of trials per auction type
    pub trials: usize,
    /// Bidders per trial
    pub bidders: usize,
    /// Reasoning-agent (LLM) seats per trial
    #[serde(default = "default_reasoning_per_trial")]
    pub reasoning_per_trial: usize,
    /// Lower bound of the private-value sampling range
    #[serde(default = "default_value_min")]
    pub value_min: f64,
    /// Upper bound of the private-value sampling range
    #[serde(default = "default_value_max")]
    pub value_max: f64,
    /// Shading multiplier for risk-shaded deterministic bidders
    #[serde(default = "default_risk_factor")]
    pub risk_factor: f64,
    /// Force one deterministic strategy label ("truthful" or "shade") for
    /// every non-reasoning seat; omitted = per-mechanism default
    #[serde(default)]
    pub strategy: Option<String>,
    /// RNG seed; omitted = seeded from the wall clock (logged for replay)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_reasoning_per_trial() -> usize {
    1
}

fn default_value_min() -> f64 {
    60.0
}

fn default_value_max() -> f64 {
    100.0
}

fn default_risk_factor() -> f64 {
    0.8
}

#[derive(Debug, Clone, Deserialize)]
pub struct MechanismConfig {
    /// Price step per round for ascending (English/Japanese) auctions
    #[serde(default = "default_price_step")]
    pub increment: f64,
    /// Price step per level for the descending (Dutch) clock
    #[serde(default = "default_price_step")]
    pub decrement: f64,
    /// Opening price of the Dutch clock
    #[serde(default = "default_start_price")]
    pub start_price: f64,
    /// Opening price of the Japanese auction
    #[serde(default)]
    pub japanese_start_price: f64,
    /// Hard cap on rounds for ascending auctions (guards runaway LLM bidders)
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_price_step() -> f64 {
    1.0
}

fn default_start_price() -> f64 {
    100.0
}

fn default_max_rounds() -> u32 {
    10_000
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            increment: default_price_step(),
            decrement: default_price_step(),
            start_price: default_start_price(),
            japanese_start_price: 0.0,
            max_rounds: default_max_rounds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    /// OpenAI-compatible chat completions endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier sent with each query
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry attempts on transport / 5xx failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u8 {
    2
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for CSV exports
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "results".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("simulation.trials", 100)?
            .set_default("simulation.bidders", 5)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/experiment.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GAVEL_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GAVEL_SIMULATION__TRIALS, etc.)
            .add_source(
                Environment::with_prefix("GAVEL")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Reject invalid parameters before any trial runs.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.bidders == 0 {
            return Err(GavelError::InvalidConfig(
                "simulation.bidders must be at least 1".to_string(),
            ));
        }
        if sim.reasoning_per_trial > sim.bidders {
            return Err(GavelError::InvalidConfig(format!(
                "simulation.reasoning_per_trial ({}) exceeds bidders ({})",
                sim.reasoning_per_trial, sim.bidders
            )));
        }
        if sim.value_min < 0.0 || !sim.value_min.is_finite() {
            return Err(GavelError::InvalidConfig(format!(
                "simulation.value_min must be a non-negative number, got {}",
                sim.value_min
            )));
        }
        if sim.value_max < sim.value_min || !sim.value_max.is_finite() {
            return Err(GavelError::InvalidConfig(format!(
                "simulation.value_max ({}) must be >= value_min ({})",
                sim.value_max, sim.value_min
            )));
        }
        if !(sim.risk_factor > 0.0 && sim.risk_factor <= 1.0) {
            return Err(GavelError::InvalidConfig(format!(
                "simulation.risk_factor must be in (0, 1], got {}",
                sim.risk_factor
            )));
        }
        if let Some(label) = &sim.strategy {
            // Fail fast on unknown labels, not mid-auction.
            crate::bidders::Strategy::parse(label, sim.risk_factor)?;
        }

        let mech = &self.mechanism;
        if mech.increment <= 0.0 || !mech.increment.is_finite() {
            return Err(GavelError::InvalidMechanismParam {
                param: "increment",
                value: mech.increment,
            });
        }
        if mech.decrement <= 0.0 || !mech.decrement.is_finite() {
            return Err(GavelError::InvalidMechanismParam {
                param: "decrement",
                value: mech.decrement,
            });
        }
        if mech.start_price < 0.0 || !mech.start_price.is_finite() {
            return Err(GavelError::InvalidMechanismParam {
                param: "start_price",
                value: mech.start_price,
            });
        }
        if mech.japanese_start_price < 0.0 || !mech.japanese_start_price.is_finite() {
            return Err(GavelError::InvalidMechanismParam {
                param: "japanese_start_price",
                value: mech.japanese_start_price,
            });
        }
        if mech.max_rounds == 0 {
            return Err(GavelError::InvalidConfig(
                "mechanism.max_rounds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
