// stats.rs - Throughput metrics: polled payloads and a synthetic feed
//
// The host polls /global_stats and /sample_transactions on a timer and
// hands the raw JSON to the engine. Parsing is deliberately forgiving:
// unknown fields are ignored and missing ones default, so a stats
// rollout never wedges the animation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("invalid stats payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stats payload is not a JSON object")]
    NotAnObject,
}

/// Snapshot of the global stats endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalStats {
    pub total_txs: u64,
    pub txs_per_second: f64,
    pub peak_txs_per_second: f64,
    pub total_bytes: u64,
    pub bytes_per_second: f64,
    pub total_games: u64,
    pub active_games: u64,
    pub total_players: u64,
    pub active_players: u64,
    pub total_bots: u64,
    pub active_bots: u64,
    pub total_kills: u64,
    pub kills_per_minute: f64,
    pub total_suicides: u64,
    pub suicides_per_minute: f64,
}

/// One entry of the sample-transactions endpoint
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SampleTransaction {
    pub cbor: String,
    pub tx_id: String,
}

pub fn parse_global_stats(json: &str) -> Result<GlobalStats, StatsError> {
    // Go through Value first: the derive would happily fill the struct
    // positionally from a JSON sequence, and a sequence here is garbage
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(StatsError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

pub fn parse_sample_transactions(json: &str) -> Result<Vec<SampleTransaction>, StatsError> {
    Ok(serde_json::from_str(json)?)
}

/// Compact display form: 1_500_000 -> "1.50M", 2_300 -> "2.3k"
pub fn format_count(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{}", value.max(0.0).floor() as u64)
    }
}

// --------------------------------------------------------------------
// Synthetic feed for backend-less demos

const BASE_TPS: f64 = 1_500_000.0;
const RAMP_SECS: f64 = 20.0;
const CUBIC_RAMP_SECS: f64 = 60.0;
const PHASE_SECS: f64 = 35.0;
const BYTES_PER_TX: f64 = 80.0;

/// Deterministic mock of the live stats feed. Ramps up from zero, then
/// cycles through eight activity phases around the baseline: steady,
/// decline, spike, oscillation, lull, recovery, peak, stabilization.
pub struct MockFeed {
    rng: u32,
    total_txs: u64,
    total_bytes: u64,
}

impl MockFeed {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: if seed == 0 { 0xC0FFEE } else { seed },
            total_txs: 0,
            total_bytes: 0,
        }
    }

    fn rand(&mut self) -> f64 {
        crate::sim::FieldWorld::rand(&mut self.rng) as f64
    }

    /// Activity level relative to the baseline at a given elapsed time
    fn phase_level(&mut self, elapsed_secs: f64) -> f64 {
        if elapsed_secs <= RAMP_SECS {
            return elapsed_secs / RAMP_SECS;
        }

        if elapsed_secs <= CUBIC_RAMP_SECS + 10.0 {
            let progress = (elapsed_secs - 10.0) / CUBIC_RAMP_SECS;
            return progress.min(1.0).powi(3);
        }

        let t = elapsed_secs - CUBIC_RAMP_SECS - 10.0;
        let phase = (t / PHASE_SECS) as u64 % 8;
        let p = (t % PHASE_SECS) / PHASE_SECS;

        match phase {
            // Steady state
            0 => 1.0 + (self.rand() - 0.5) * 0.1,
            // Gradual decline
            1 => 1.0 - p * 0.4,
            // Sudden activity spike
            2 => 1.4 + (p * core::f64::consts::PI * 2.0).sin() * 0.2,
            // Recovery oscillation
            3 => 1.0 + (p * core::f64::consts::PI * 4.0).sin() * 0.3,
            // Lull
            4 => 0.2 + self.rand() * 0.2,
            // Fast recovery with ripple
            5 => 0.4 + p * 0.6 + (p * core::f64::consts::PI * 6.0).sin() * 0.1,
            // Peak performance
            6 => 1.6 + (p * core::f64::consts::PI * 8.0).sin() * 0.15,
            // Stabilization
            _ => 1.0 + (self.rand() - 0.5) * (1.0 - p * 0.6),
        }
    }

    fn noisy(&mut self, value: f64) -> f64 {
        value * (1.0 + (self.rand() - 0.5) * 0.05)
    }

    /// Current TPS at a given elapsed time, never negative
    pub fn tps_at(&mut self, elapsed_secs: f64) -> f64 {
        let level = self.phase_level(elapsed_secs.max(0.0)).max(0.0);
        self.noisy(BASE_TPS * level).max(0.0)
    }

    /// Full stats snapshot, accumulating totals between calls. Intended
    /// to be sampled about once per second, like the real poller.
    pub fn sample(&mut self, elapsed_secs: f64) -> GlobalStats {
        let tps = self.tps_at(elapsed_secs);
        let bytes_per_second = self.noisy(tps * BYTES_PER_TX);
        self.total_txs += tps as u64;
        self.total_bytes += bytes_per_second as u64;

        let level = tps / BASE_TPS;
        GlobalStats {
            total_txs: self.total_txs,
            txs_per_second: tps,
            peak_txs_per_second: 2_500_000.0,
            total_bytes: self.total_bytes,
            bytes_per_second,
            total_games: 75,
            active_games: (level * 15.0) as u64,
            total_players: 981,
            active_players: (level * 600.0) as u64,
            total_bots: 100,
            active_bots: (level * 100.0) as u64,
            total_kills: 314,
            kills_per_minute: tps / 30_000.0,
            total_suicides: 0,
            suicides_per_minute: tps / 1_000_000.0,
        }
    }
}
