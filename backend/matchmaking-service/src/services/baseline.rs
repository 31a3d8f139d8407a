//! Embodied-carbon baseline lookup.
//!
//! The baseline is request-scoped: one figure for the request's primary
//! material, fetched once per ranking run and multiplied by the request
//! weight. It is never fetched per supplier; the lookup sits on a
//! rate-limited EPD dataset and a per-supplier fetch would turn one cheap
//! call into N expensive ones.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::BaselineConfig;

/// Source of embodied-carbon baselines (kg CO2e per ton of material).
#[async_trait]
pub trait CarbonBaselineSource: Send + Sync {
    async fn baseline_kg_per_ton(&self, material: &str) -> Result<f64>;
}

/// HTTP client for the EPD baseline service.
pub struct EpdBaselineClient {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct BaselineResponse {
    kg_co2e_per_ton: f64,
}

impl EpdBaselineClient {
    pub fn new(config: &BaselineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build EPD baseline HTTP client")?;

        Ok(EpdBaselineClient {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CarbonBaselineSource for EpdBaselineClient {
    async fn baseline_kg_per_ton(&self, material: &str) -> Result<f64> {
        let url = format!("{}/v1/baselines", self.api_url);
        let response = self
            .client
            .get(&url)
            .query(&[("material", material)])
            .send()
            .await
            .context("EPD baseline request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("EPD baseline service returned {status} for {material}"));
        }

        let baseline: BaselineResponse = response
            .json()
            .await
            .context("EPD baseline service returned malformed JSON")?;

        if !baseline.kg_co2e_per_ton.is_finite() || baseline.kg_co2e_per_ton < 0.0 {
            return Err(anyhow!(
                "EPD baseline service returned an invalid figure for {material}: {}",
                baseline.kg_co2e_per_ton
            ));
        }

        Ok(baseline.kg_co2e_per_ton)
    }
}
