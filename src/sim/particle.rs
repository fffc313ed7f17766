// particle.rs - Falling transaction particles
//
// Structure-of-Arrays layout for cache-friendly iteration.
// Particles spawn at the top edge and fall straight down, fading out
// over the bottom quarter of the surface.

use super::{FieldWorld, MAX_PARTICLES};
use super::tiers::{Props, SIZE_MIN};

const SPAWN_Y: f32 = -10.0;
const SIZE_JITTER: f32 = 0.2;
const SPEED_JITTER: f32 = 0.1;

pub const FADE_START_FRAC: f32 = 0.75;
pub const FADE_DECAY: f32 = 0.95;
pub const MIN_OPACITY: f32 = 0.05;

pub struct Particles {
    // Position
    pub x: [f32; MAX_PARTICLES],
    pub y: [f32; MAX_PARTICLES],

    // Appearance and motion
    pub radius: [f32; MAX_PARTICLES],
    pub speed: [f32; MAX_PARTICLES],
    pub opacity: [f32; MAX_PARTICLES],

    // Count
    pub n: usize,
}

impl Particles {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_PARTICLES],
            y: [0.0; MAX_PARTICLES],
            radius: [0.0; MAX_PARTICLES],
            speed: [0.0; MAX_PARTICLES],
            opacity: [0.0; MAX_PARTICLES],
            n: 0,
        }
    }

    /// Spawn new particles at the top edge with tier-derived size and
    /// speed plus independent random jitter
    pub fn spawn(&mut self, count: usize, props: &Props, screen_w: f32, rng: &mut u32) {
        for _ in 0..count {
            if self.n >= MAX_PARTICLES { return; }

            let i = self.n;
            self.x[i] = FieldWorld::rand(rng) * screen_w;
            self.y[i] = SPAWN_Y;
            self.radius[i] =
                (props.size - FieldWorld::rand(rng) * props.size * SIZE_JITTER).max(SIZE_MIN);
            self.speed[i] = props.speed + FieldWorld::rand(rng) * props.speed * SPEED_JITTER;
            self.opacity[i] = 0.7 + FieldWorld::rand(rng) * 0.3;
            self.n += 1;
        }
    }

    /// Advance positions, decay opacity past the fade line, prune dead
    /// particles. Removal happens exactly when a particle leaves the
    /// surface or its opacity falls to the visibility threshold.
    pub fn update(&mut self, screen_h: f32) {
        let fade_start = screen_h * FADE_START_FRAC;
        let mut write = 0;

        for read in 0..self.n {
            let y = self.y[read] + self.speed[read];
            let mut opacity = self.opacity[read];

            if y > fade_start {
                opacity *= FADE_DECAY;
            }

            if y >= screen_h || opacity <= MIN_OPACITY {
                continue;
            }

            self.x[write] = self.x[read];
            self.y[write] = y;
            self.radius[write] = self.radius[read];
            self.speed[write] = self.speed[read];
            self.opacity[write] = opacity;
            write += 1;
        }

        self.n = write;
    }
}
