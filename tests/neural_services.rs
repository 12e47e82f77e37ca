//! Neural core services end to end over HTTP.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use neural_core::ai::GeminiClient;
use neural_core::config::NeuralConfig;
use neural_core::engine::{EngineConfig, TelemetrySnapshot};
use neural_core::resilience::CircuitRegistry;
use neural_core::NeuralCore;

mod common;

fn core_for(base_url: String, registry: &CircuitRegistry) -> NeuralCore {
    let mut config = NeuralConfig::default();
    config.ai.base_url = base_url;
    config.gate.base_delay_ms = 20;

    let client = GeminiClient::with_api_key(&config.ai, Some("test-key".to_string())).unwrap();
    let circuit = registry.circuit(&config.ai.base_url);
    NeuralCore::from_config(Arc::new(client), circuit, &config)
}

#[tokio::test]
async fn test_chat_returns_grounding_sources() {
    let addr = common::start_programmable_backend(|_| async {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "BTC volume spiked overnight." }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://news.example/btc", "title": "BTC news" } }
                ]}
            }]
        });
        (200, body.to_string())
    })
    .await;

    let registry = CircuitRegistry::default();
    let core = core_for(format!("http://{}", addr), &registry);
    let reply = core.chat("what moved btc?", true).await;

    assert_eq!(reply.text, "BTC volume spiked overnight.");
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.sources[0].uri, "https://news.example/btc");
}

#[tokio::test]
async fn test_services_degrade_once_quota_hit() {
    let hits = Arc::new(AtomicU32::new(0));
    let h = hits.clone();
    let addr = common::start_programmable_backend(move |_| {
        let h = h.clone();
        async move {
            h.fetch_add(1, Ordering::SeqCst);
            (429, common::quota_error_body())
        }
    })
    .await;

    let registry = CircuitRegistry::default();
    let base_url = format!("http://{}", addr);
    let chat_core = core_for(base_url.clone(), &registry);
    let advice_core = core_for(base_url, &registry);

    let reply = chat_core.chat("hello", false).await;
    assert_eq!(reply.text, "Neural connection interrupted.");
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // A second service on the same endpoint shares the open circuit.
    let snapshot = TelemetrySnapshot::from_json(
        r#"{"status": "RUNNING", "metrics": [{"timestamp": "t", "throughput": 1, "temperature": 900, "efficiency": 80, "load": 1}]}"#,
    )
    .unwrap();
    let advice = advice_core
        .engine_advice(&snapshot.metrics, &snapshot.config, snapshot.status)
        .await;
    assert_eq!(advice, "Neural core cooling down.");

    let chart = advice_core.generate_chart_config("plot it").await;
    assert_eq!(chart.text, "Failed to generate visual chart config.");
    assert!(chart.config.is_none());

    let plan = advice_core
        .deep_analysis(&snapshot.metrics, &EngineConfig::default())
        .await;
    assert_eq!(plan, "Deep analysis failed.");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn test_chart_config_over_http() {
    let addr = common::start_programmable_backend(|_| async {
        (
            200,
            common::text_body("Volume by hour.\n```json\n{\"series\":[{\"data\":[1,2,3]}]}\n```"),
        )
    })
    .await;

    let registry = CircuitRegistry::default();
    let reply = core_for(format!("http://{}", addr), &registry)
        .generate_chart_config("volume by hour")
        .await;

    let config = reply.config.expect("chart config should parse");
    assert_eq!(config["series"][0]["data"][2], 3);
}
