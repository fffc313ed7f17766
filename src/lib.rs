// txrain-engine - TPS-driven particle field for the throughput dashboard
//
// The browser host owns the requestAnimationFrame loop and the stats
// polling timer; this crate owns the simulation and rasterization.
// Per frame the host calls tick(now) and, when it returns true, blits
// frame_ptr()/frame_len() into the canvas as ImageData. The poller
// pushes TPS via set_tps or raw JSON via ingest_stats (last write wins).
// Teardown is dropping the instance after cancelling both timers.

pub mod render;
pub mod sim;
pub mod stats;

use wasm_bindgen::prelude::*;

use sim::FieldWorld;
use stats::MockFeed as MockFeedInner;

#[wasm_bindgen]
pub struct TxRain {
    world: FieldWorld,
}

#[wasm_bindgen]
impl TxRain {
    #[wasm_bindgen(constructor)]
    pub fn new(w: u32, h: u32) -> Self {
        #[cfg(target_arch = "wasm32")]
        console_error_panic_hook::set_once();

        #[cfg(target_arch = "wasm32")]
        let seed = js_sys::Date::now() as u32 | 1;
        #[cfg(not(target_arch = "wasm32"))]
        let seed = 0xDEADBEEF;

        Self {
            world: FieldWorld::new(w, h, seed),
        }
    }

    /// Write the current TPS value (non-finite or negative clamps to 0)
    pub fn set_tps(&mut self, tps: f64) {
        self.world.set_tps(tps);
    }

    pub fn tps(&self) -> f64 {
        self.world.tps()
    }

    /// Feed a raw /global_stats payload; returns the peak TPS so the
    /// host can update its header without parsing the JSON twice
    pub fn ingest_stats(&mut self, json: &str) -> Result<f64, JsError> {
        let stats = stats::parse_global_stats(json)?;
        self.world.set_tps(stats.txs_per_second);
        Ok(stats.peak_txs_per_second)
    }

    /// Advance one frame if at least ~16ms have passed. Returns true
    /// when a new frame was rendered.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.world.tick(now_ms)
    }

    pub fn resize(&mut self, w: u32, h: u32) {
        self.world.resize(w, h);
    }

    /// Fly a sample-transaction orb toward (x, y) in surface coordinates
    pub fn launch_flight(&mut self, target_x: f32, target_y: f32) {
        self.world.launch_flight(target_x, target_y);
    }

    /// True once per completed flight; the host reveals the details panel
    pub fn flight_arrived(&mut self) -> bool {
        self.world.take_arrival()
    }

    pub fn frame_ptr(&self) -> *const u8 {
        self.world.frame_ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.world.frame_len()
    }

    pub fn width(&self) -> u32 {
        self.world.width()
    }

    pub fn height(&self) -> u32 {
        self.world.height()
    }

    pub fn particle_count(&self) -> usize {
        self.world.particle_count()
    }
}

/// Synthetic stats feed for running the dashboard without a backend
#[wasm_bindgen]
pub struct MockFeed {
    inner: MockFeedInner,
}

#[wasm_bindgen]
impl MockFeed {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Self {
        Self {
            inner: MockFeedInner::new(seed),
        }
    }

    /// TPS at `elapsed_secs` since the feed started
    pub fn tps(&mut self, elapsed_secs: f64) -> f64 {
        self.inner.tps_at(elapsed_secs)
    }

    /// Full stats snapshot as JSON, shaped like the live endpoint
    pub fn stats_json(&mut self, elapsed_secs: f64) -> Result<String, JsError> {
        let snapshot = self.inner.sample(elapsed_secs);
        Ok(serde_json::to_string(&snapshot)?)
    }
}

/// Compact number formatting for the metrics panel (k/M suffixes)
#[wasm_bindgen]
pub fn format_count(value: f64) -> String {
    stats::format_count(value)
}
