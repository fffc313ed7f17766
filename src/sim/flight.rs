// flight.rs - Sample-transaction flight orbs
//
// When the host fetches a sample transaction, an orb flies from a random
// point inside the field to the trigger's position. Two phases: a short
// free drift, then a cubic Bezier glide into the target. Arrival latches
// a flag the host consumes to reveal the transaction details.

use super::{FieldWorld, MAX_FLIGHTS};

const PROGRESS_STEP: f32 = 0.008;
const DRIFT_END: f32 = 0.4;
const STEER_GAIN: f32 = 0.0008;
const DRIFT_DAMPING: f32 = 0.95;
const LIFT_START: f32 = 50.0;
const LIFT_END: f32 = 30.0;

pub struct Flights {
    // Position
    pub x: [f32; MAX_FLIGHTS],
    pub y: [f32; MAX_FLIGHTS],

    // Destination
    pub target_x: [f32; MAX_FLIGHTS],
    pub target_y: [f32; MAX_FLIGHTS],

    // Drift velocity
    pub vx: [f32; MAX_FLIGHTS],
    pub vy: [f32; MAX_FLIGHTS],

    // Animation
    pub progress: [f32; MAX_FLIGHTS],
    pub opacity: [f32; MAX_FLIGHTS],
    pub scale: [f32; MAX_FLIGHTS],

    // Count
    pub n: usize,
}

#[inline]
fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

impl Flights {
    pub fn new() -> Self {
        Self {
            x: [0.0; MAX_FLIGHTS],
            y: [0.0; MAX_FLIGHTS],
            target_x: [0.0; MAX_FLIGHTS],
            target_y: [0.0; MAX_FLIGHTS],
            vx: [0.0; MAX_FLIGHTS],
            vy: [0.0; MAX_FLIGHTS],
            progress: [0.0; MAX_FLIGHTS],
            opacity: [0.0; MAX_FLIGHTS],
            scale: [0.0; MAX_FLIGHTS],
            n: 0,
        }
    }

    /// Launch an orb from a random point in the middle of the field
    /// toward (target_x, target_y). When the pool is full the oldest
    /// flight is evicted, matching the restart-on-click behavior.
    pub fn launch(
        &mut self,
        target_x: f32,
        target_y: f32,
        screen_w: f32,
        screen_h: f32,
        rng: &mut u32,
    ) {
        if self.n >= MAX_FLIGHTS {
            self.evict_oldest();
        }

        let i = self.n;
        self.x[i] = screen_w * 0.2 + FieldWorld::rand(rng) * screen_w * 0.6;
        self.y[i] = screen_h * 0.4 + FieldWorld::rand(rng) * screen_h * 0.3;
        self.target_x[i] = target_x;
        self.target_y[i] = target_y;
        self.vx[i] = (FieldWorld::rand(rng) * 2.0 - 1.0) * 0.5;
        self.vy[i] = 1.0 + FieldWorld::rand(rng);
        self.progress[i] = 0.0;
        self.opacity[i] = 1.0;
        self.scale[i] = 1.0;
        self.n += 1;
    }

    fn evict_oldest(&mut self) {
        for i in 1..self.n {
            self.x[i - 1] = self.x[i];
            self.y[i - 1] = self.y[i];
            self.target_x[i - 1] = self.target_x[i];
            self.target_y[i - 1] = self.target_y[i];
            self.vx[i - 1] = self.vx[i];
            self.vy[i - 1] = self.vy[i];
            self.progress[i - 1] = self.progress[i];
            self.opacity[i - 1] = self.opacity[i];
            self.scale[i - 1] = self.scale[i];
        }
        self.n -= 1;
    }

    /// Advance all flights one step. Returns how many arrived this step.
    pub fn update(&mut self) -> usize {
        let mut arrivals = 0;
        let mut write = 0;

        for read in 0..self.n {
            let progress = self.progress[read] + PROGRESS_STEP;
            if progress >= 1.0 {
                arrivals += 1;
                continue;
            }

            let (mut x, mut y) = (self.x[read], self.y[read]);
            let (tx, ty) = (self.target_x[read], self.target_y[read]);
            let (mut vx, mut vy) = (self.vx[read], self.vy[read]);

            if progress < DRIFT_END {
                // Free drift with gentle steering toward the target
                x += vx;
                y += vy;
                vx += (tx - x) * STEER_GAIN;
                vy *= DRIFT_DAMPING;
            } else {
                // Bezier glide, re-anchored at the current position so the
                // handoff from the drift phase is seamless
                let t = ease_out_cubic((progress - DRIFT_END) / (1.0 - DRIFT_END));
                let c1x = x + (tx - x) * 0.3;
                let c2x = x + (tx - x) * 0.7;
                let c1y = y - LIFT_START;
                let c2y = ty - LIFT_END;

                let u = 1.0 - t;
                x = u.powi(3) * x
                    + 3.0 * u.powi(2) * t * c1x
                    + 3.0 * u * t.powi(2) * c2x
                    + t.powi(3) * tx;
                y = u.powi(3) * y
                    + 3.0 * u.powi(2) * t * c1y
                    + 3.0 * u * t.powi(2) * c2y
                    + t.powi(3) * ty;
            }

            self.x[write] = x;
            self.y[write] = y;
            self.target_x[write] = tx;
            self.target_y[write] = ty;
            self.vx[write] = vx;
            self.vy[write] = vy;
            self.progress[write] = progress;
            self.opacity[write] = if progress < DRIFT_END {
                1.0
            } else {
                (1.5 - ease_out_cubic(progress)).min(1.0)
            };
            self.scale[write] = if progress < DRIFT_END {
                1.0
            } else {
                1.0 + ((progress - DRIFT_END) * core::f32::consts::PI).sin() * 0.8
            };
            write += 1;
        }

        self.n = write;
        arrivals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_arrives_within_expected_steps() {
        let mut f = Flights::new();
        let mut rng = 0xDEADBEEF;
        f.launch(700.0, 550.0, 800.0, 600.0, &mut rng);

        let mut arrived = 0;
        for _ in 0..130 {
            arrived += f.update();
        }
        assert_eq!(arrived, 1);
        assert_eq!(f.n, 0);
    }

    #[test]
    fn flight_closes_on_target() {
        let mut f = Flights::new();
        let mut rng = 0xBEEF;
        let (tx, ty) = (700.0, 550.0);
        f.launch(tx, ty, 800.0, 600.0, &mut rng);

        let mut last_dist = f32::MAX;
        while f.n > 0 {
            f.update();
            if f.n > 0 && f.progress[0] > 0.9 {
                last_dist = ((f.x[0] - tx).powi(2) + (f.y[0] - ty).powi(2)).sqrt();
            }
        }
        // By the end of the glide the orb sits on the trigger
        assert!(last_dist < 15.0, "final distance {last_dist}");
    }

    #[test]
    fn opacity_and_scale_stay_bounded() {
        let mut f = Flights::new();
        let mut rng = 0xBEEF;
        f.launch(10.0, 10.0, 800.0, 600.0, &mut rng);

        while f.n > 0 {
            f.update();
            for i in 0..f.n {
                assert!(f.opacity[i] > 0.0 && f.opacity[i] <= 1.0);
                assert!(f.scale[i] >= 1.0 && f.scale[i] <= 1.8 + 1e-4);
            }
        }
    }

    #[test]
    fn launch_when_full_evicts_oldest() {
        let mut f = Flights::new();
        let mut rng = 0xBEEF;
        for k in 0..MAX_FLIGHTS + 2 {
            f.launch(k as f32, 0.0, 800.0, 600.0, &mut rng);
        }
        assert_eq!(f.n, MAX_FLIGHTS);
        assert_eq!(f.target_x[f.n - 1], (MAX_FLIGHTS + 1) as f32);
    }
}
