use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and margins in percent units (18.5 = 18.5%). Divided by 100 at
/// the point of use, never stored as fractions.
pub type Percent = Decimal;

/// A single period in a financial projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionPeriod {
    pub year: i32,
    pub label: String,
    pub is_terminal: bool,
}

/// Default number of grid points either side of a sweep axis centre.
pub const DEFAULT_SWEEP_STEPS: u32 = 3;

/// Default increment between adjacent sweep grid points, in percent.
pub const DEFAULT_SWEEP_STEP_SIZE: Percent = dec!(1);

/// One axis of a sensitivity grid: `2 * steps + 1` evenly spaced values
/// centred on `center`, `step_size` percent apart. The centre value is
/// always the exact middle element (index `steps`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepAxis {
    pub center: Percent,
    #[serde(default = "default_sweep_steps")]
    pub steps: u32,
    #[serde(default = "default_sweep_step_size")]
    pub step_size: Percent,
}

fn default_sweep_steps() -> u32 {
    DEFAULT_SWEEP_STEPS
}

fn default_sweep_step_size() -> Percent {
    DEFAULT_SWEEP_STEP_SIZE
}

impl SweepAxis {
    /// Axis with the default step count and step size around `center`.
    pub fn around(center: Percent) -> Self {
        SweepAxis {
            center,
            steps: DEFAULT_SWEEP_STEPS,
            step_size: DEFAULT_SWEEP_STEP_SIZE,
        }
    }

    /// The sweep values in ascending order.
    pub fn values(&self) -> Vec<Percent> {
        let count = 2 * self.steps + 1;
        let start = self.center - Decimal::from(self.steps) * self.step_size;
        (0..count)
            .map(|i| start + Decimal::from(i) * self.step_size)
            .collect()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
