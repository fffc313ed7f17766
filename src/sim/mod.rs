// sim/ - TPS-driven particle field simulation
//
// Entity state uses Structure-of-Arrays with fixed capacities.
// The step function is pure with respect to wall-clock time: `advance`
// takes an explicit dt so the whole simulation runs headless in tests.

mod flight;
mod particle;
pub mod tiers;

pub use flight::Flights;
pub use particle::Particles;

use crate::render::Frame;
use tiers::VERY_LOW_TPS;

// Capacity limits
pub const MAX_PARTICLES: usize = 5000;
pub const MAX_FLIGHTS: usize = 8;

// Frame-rate cap: skip callbacks that arrive faster than ~60fps
const MIN_FRAME_MS: f64 = 16.0;
// Clamp pathological gaps (tab in background, first frame) so a single
// step never spawns a flood
const MAX_FRAME_MS: f64 = 100.0;

/// Particle field world
pub struct FieldWorld {
    // Surface dimensions
    w: u32,
    h: u32,

    // Throughput input, written by the poller, read every frame
    tps: f64,
    prev_tps: f64,

    // Entities
    particles: Particles,
    flights: Flights,

    // Arrived flights not yet consumed by the host
    arrivals: usize,

    // Output
    frame: Frame,

    // Frame clock (negative = not yet primed)
    last_frame_ms: f64,

    // RNG state
    rng: u32,
}

impl FieldWorld {
    pub fn new(w: u32, h: u32, seed: u32) -> Self {
        Self {
            w,
            h,
            tps: 0.0,
            prev_tps: 0.0,
            particles: Particles::new(),
            flights: Flights::new(),
            arrivals: 0,
            frame: Frame::new(w, h),
            last_frame_ms: -1.0,
            rng: if seed == 0 { 0xDEADBEEF } else { seed },
        }
    }

    /// Update the TPS scalar. NaN and negative values clamp to zero so a
    /// bad stats payload degrades to an empty field instead of nonsense
    /// in the tier math.
    pub fn set_tps(&mut self, tps: f64) {
        self.tps = if tps.is_finite() && tps > 0.0 { tps } else { 0.0 };
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }

    /// Re-derive spawn bounds for a new surface size. Live particles are
    /// kept; they fall out under the old bounds while new spawns respect
    /// the new ones immediately.
    pub fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
        self.frame.resize(w, h);
    }

    /// Frame callback: caps to ~60fps, clamps stalls, then advances.
    /// Returns false when the callback arrived too early and no frame
    /// was produced. The first call only primes the clock.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.last_frame_ms < 0.0 {
            self.last_frame_ms = now_ms;
            return false;
        }

        let elapsed = now_ms - self.last_frame_ms;
        if elapsed < MIN_FRAME_MS {
            return false;
        }
        self.last_frame_ms = now_ms;

        self.advance(elapsed.min(MAX_FRAME_MS) as f32);
        true
    }

    /// One simulation step: spawn toward the TPS target, move everything,
    /// prune, rasterize
    pub fn advance(&mut self, dt_ms: f32) {
        // Fractional target: at sub-1 TPS the pool must still admit the
        // occasional particle, so the comparison stays in f64
        let target = self.tps.min(MAX_PARTICLES as f64);

        if (self.particles.n as f64) < target {
            let want = tiers::spawn_count(self.tps, self.prev_tps, dt_ms, &mut self.rng);
            let headroom = target.ceil() as usize - self.particles.n;
            let count = want.min(headroom);

            let props = tiers::props_for(self.tps);
            self.particles.spawn(count, &props, self.w as f32, &mut self.rng);

            // The burst reference only trails the scaled path, matching
            // the exact-representation cutoff below VERY_LOW_TPS
            if self.tps > VERY_LOW_TPS {
                self.prev_tps = self.tps;
            }
        }

        self.particles.update(self.h as f32);
        self.arrivals += self.flights.update();

        self.frame.clear();
        self.frame.draw_particles(&self.particles);
        self.frame.draw_flights(&self.flights);
    }

    /// Launch a sample-transaction flight orb toward (x, y)
    pub fn launch_flight(&mut self, target_x: f32, target_y: f32) {
        self.flights.launch(
            target_x,
            target_y,
            self.w as f32,
            self.h as f32,
            &mut self.rng,
        );
    }

    /// Consume one pending flight arrival, if any
    pub fn take_arrival(&mut self) -> bool {
        if self.arrivals > 0 {
            self.arrivals -= 1;
            true
        } else {
            false
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.n
    }

    pub fn flight_count(&self) -> usize {
        self.flights.n
    }

    // Random number generator (xorshift32)
    #[inline(always)]
    pub fn rand(rng: &mut u32) -> f32 {
        *rng ^= *rng << 13;
        *rng ^= *rng >> 17;
        *rng ^= *rng << 5;
        (*rng >> 8) as f32 * (1.0 / 16777216.0)
    }

    // Accessors for WASM
    pub fn frame_ptr(&self) -> *const u8 {
        self.frame.ptr()
    }

    pub fn frame_len(&self) -> usize {
        self.frame.len()
    }

    pub fn width(&self) -> u32 {
        self.w
    }

    pub fn height(&self) -> u32 {
        self.h
    }

    /// Direct pool access for headless inspection
    pub fn particles(&self) -> &Particles {
        &self.particles
    }
}
