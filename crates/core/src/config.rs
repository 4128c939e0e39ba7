use serde::{Deserialize, Serialize};

/// All empath session parameters. Read from `EMPATH_*` environment
/// variables at startup; anything unset or unparsable keeps its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpathCfg {
    /// Minimum dominant score to report a detected emotion; below this the
    /// session reports "neutral" with zero confidence.
    pub confidence_threshold: f32,

    // channel buffers
    pub input_buffer: usize,
    pub output_buffer: usize,

    /// Per-request timeout for the classification call.
    pub request_timeout_secs: u64,
}

impl Default for EmpathCfg {
    fn default() -> Self {
        Self {
            confidence_threshold: crate::detect::CONFIDENCE_THRESHOLD,
            input_buffer: 16,
            output_buffer: 16,
            request_timeout_secs: 30,
        }
    }
}

impl EmpathCfg {
    /// Build config from the process environment.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            confidence_threshold: get_or("EMPATH_CONFIDENCE_THRESHOLD", d.confidence_threshold),
            input_buffer: get_or("EMPATH_INPUT_BUFFER", d.input_buffer),
            output_buffer: get_or("EMPATH_OUTPUT_BUFFER", d.output_buffer),
            request_timeout_secs: get_or("EMPATH_REQUEST_TIMEOUT_SECS", d.request_timeout_secs),
        }
    }
}

fn get_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
