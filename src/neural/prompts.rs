//! Prompt text and the static fallbacks shown instead of raw errors.

use crate::engine::{EngineMetric, EngineStatus};

/// Metrics included in a deep analysis prompt.
pub const ANALYSIS_WINDOW: usize = 10;

pub const CHART_SYSTEM_INSTRUCTION: &str = "\
You are an expert Highcharts developer. The user wants to visualize data.
Generate a valid Highcharts JSON configuration (Options object).

RULES:
1. Always give a brief explanation of the chart.
2. Return the JSON config inside a triple backtick block tagged with 'json'.
3. Match a dark 'cyberpunk' theme:
   - backgroundColor: 'transparent'
   - contrast colors like #3b82f6 (blue), #ef4444 (red), #10b981 (emerald)
   - styled labels and gridLines
4. If no data is provided, use realistic mock data about crypto markets or engine mechanics.
5. Do not include javascript functions in the JSON, only properties.";

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are the Primed Engine AI interface.";

pub const NO_RESPONSE: &str = "No response.";
pub const CHART_FAILED: &str = "Failed to generate visual chart config.";
pub const COOLING_DOWN: &str = "Neural core cooling down.";
pub const NO_TELEMETRY: &str = "No telemetry data.";
pub const ADVICE_EMPTY: &str = "Stable.";
pub const ADVICE_FAILED: &str = "Telemetry link unstable.";
pub const CHAT_FAILED: &str = "Neural connection interrupted.";
pub const ANALYSIS_EMPTY: &str = "Analysis inconclusive.";
pub const ANALYSIS_FAILED: &str = "Deep analysis failed.";

/// One-sentence advice prompt built from the latest sample.
pub fn advice_prompt(status: EngineStatus, latest: &EngineMetric) -> String {
    format!(
        "Diagnostic update: Status {}, Temp {}C. Efficiency {}%. Give a 1-sentence engineering advice.",
        status, latest.temperature, latest.efficiency
    )
}

/// Deep analysis prompt; both arguments are pre-serialized JSON.
pub fn analysis_prompt(metrics_json: &str, config_json: &str) -> String {
    format!(
        "Perform Deep Analysis: Metrics: {}, Config: {}. 3-step technical plan.",
        metrics_json, config_json
    )
}

/// The trailing analysis window of `metrics`.
pub fn analysis_window(metrics: &[EngineMetric]) -> &[EngineMetric] {
    &metrics[metrics.len().saturating_sub(ANALYSIS_WINDOW)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(temperature: f64) -> EngineMetric {
        EngineMetric {
            timestamp: "t".to_string(),
            throughput: 1.0,
            temperature,
            efficiency: 88.5,
            load: 0.5,
        }
    }

    #[test]
    fn test_advice_prompt() {
        assert_eq!(
            advice_prompt(EngineStatus::Running, &metric(900.0)),
            "Diagnostic update: Status RUNNING, Temp 900C. Efficiency 88.5%. Give a 1-sentence engineering advice."
        );
    }

    #[test]
    fn test_analysis_window() {
        let metrics: Vec<_> = (0..15).map(|i| metric(i as f64)).collect();
        let window = analysis_window(&metrics);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].temperature, 5.0);

        assert_eq!(analysis_window(&metrics[..3]).len(), 3);
    }
}
