// tiers.rs - TPS tier table
//
// Maps the current transactions-per-second value to particle size, fall
// speed and spawn rate. Bands are piecewise-linear: within a band the
// ratios interpolate from the band's start values to its end values by
// relative position, clamped at both ends.

use super::FieldWorld;

// Exact-representation threshold: below this every transaction maps to
// one particle (fractional remainder by weighted coin flip).
pub const VERY_LOW_TPS: f64 = 250.0;

// Pixel ranges the ratios map into
pub const SIZE_MIN: f32 = 3.0;
pub const SIZE_MAX: f32 = 20.0;
pub const SPEED_MIN: f32 = 3.0;
pub const SPEED_MAX: f32 = 12.0;

// Per-frame spawn limits on the scaled path
const BASE_COUNT_CAP: f32 = 100.0;
const SPAWN_MIN: f32 = 1.0;
const SPAWN_MAX: f32 = 40.0;

/// One tier band. Ratio pairs are [at lower bound, at upper bound].
pub struct Tier {
    pub lower: f64,
    pub upper: f64,
    pub size: [f32; 2],
    pub speed: [f32; 2],
    pub spawn: [f32; 2],
}

/// Canonical tuning table: dense rain of small fast particles at huge TPS,
/// a few large slow ones at low TPS. The top band keeps scaling until 2M
/// and clamps past that.
pub const TIERS: [Tier; 6] = [
    Tier { lower: 0.0,         upper: 1_000.0,     size: [1.00, 1.00], speed: [0.30, 0.30], spawn: [1.000, 1.000] },
    Tier { lower: 1_000.0,     upper: 10_000.0,    size: [0.85, 0.70], speed: [0.40, 0.50], spawn: [0.015, 0.027] },
    Tier { lower: 10_000.0,    upper: 100_000.0,   size: [0.70, 0.50], speed: [0.50, 0.70], spawn: [0.030, 0.051] },
    Tier { lower: 100_000.0,   upper: 500_000.0,   size: [0.50, 0.35], speed: [0.70, 0.85], spawn: [0.050, 0.080] },
    Tier { lower: 500_000.0,   upper: 1_000_000.0, size: [0.35, 0.20], speed: [0.85, 1.00], spawn: [0.080, 0.120] },
    Tier { lower: 1_000_000.0, upper: 2_000_000.0, size: [0.20, 0.10], speed: [1.00, 1.50], spawn: [0.100, 0.200] },
];

/// Particle parameters for a given TPS value, in pixels per frame.
pub struct Props {
    pub size: f32,
    pub speed: f32,
    pub spawn_multiplier: f32,
}

#[inline]
fn range_ratio(value: f64, lower: f64, upper: f64) -> f32 {
    (((value - lower) / (upper - lower)) as f32).clamp(0.0, 1.0)
}

#[inline]
fn lerp(ends: [f32; 2], t: f32) -> f32 {
    ends[0] + (ends[1] - ends[0]) * t
}

fn tier_for(tps: f64) -> &'static Tier {
    // Walk from the top so the highest matching band wins
    for tier in TIERS.iter().rev() {
        if tps >= tier.lower {
            return tier;
        }
    }
    &TIERS[0]
}

/// Size/speed/spawn-multiplier for a TPS value
pub fn props_for(tps: f64) -> Props {
    let tier = tier_for(tps.max(0.0));
    let t = range_ratio(tps, tier.lower, tier.upper);

    let size_ratio = lerp(tier.size, t);
    let speed_ratio = lerp(tier.speed, t);

    Props {
        size: SIZE_MIN + (SIZE_MAX - SIZE_MIN) * size_ratio,
        speed: SPEED_MIN + (SPEED_MAX - SPEED_MIN) * speed_ratio,
        spawn_multiplier: lerp(tier.spawn, t),
    }
}

/// Steady-state spawn count on the scaled path (no burst), before clamping.
/// Logarithmic so the count stays bounded at multi-million TPS.
pub fn scaled_base(tps: f64) -> f32 {
    let log_scale = tps.max(1.0).log10() as f32;
    (log_scale * props_for(tps).spawn_multiplier * 10.0).min(BASE_COUNT_CAP)
}

/// Particles to spawn this frame.
///
/// Below VERY_LOW_TPS the count is the exact transactions-per-frame with
/// the fractional part resolved probabilistically, preserving one-to-one
/// particle/transaction correspondence. Above it, a log-scaled count with
/// a transient burst proportional to the relative TPS change since the
/// previous frame.
pub fn spawn_count(tps: f64, prev_tps: f64, dt_ms: f32, rng: &mut u32) -> usize {
    if tps <= 0.0 {
        return 0;
    }

    if tps <= VERY_LOW_TPS {
        let exact = (tps * dt_ms as f64 / 1000.0) as f32;
        let whole = exact.floor();
        let frac = exact - whole;
        let extra = if FieldWorld::rand(rng) < frac { 1 } else { 0 };
        return whole as usize + extra;
    }

    let change_ratio = ((tps - prev_tps).abs() / prev_tps.max(1.0)) as f32;
    let burst = 1.0 + change_ratio * 2.0;

    (scaled_base(tps) * burst).clamp(SPAWN_MIN, SPAWN_MAX) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_contiguous_and_ordered() {
        for pair in TIERS.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
            assert!(pair[0].lower < pair[0].upper);
        }
    }

    #[test]
    fn size_shrinks_and_speed_grows_across_bands() {
        for pair in TIERS.windows(2) {
            assert!(pair[1].size[1] <= pair[0].size[0]);
            assert!(pair[1].speed[1] >= pair[0].speed[0]);
        }
    }

    #[test]
    fn props_stay_in_pixel_ranges() {
        // The top band overdrives speed past the ratio-1.0 anchor
        // (ratio runs 1.0 -> 1.5), so its ceiling sits above SPEED_MAX
        let speed_ceiling = SPEED_MIN + (SPEED_MAX - SPEED_MIN) * 1.5;
        for tps in [0.0, 100.0, 999.0, 5_000.0, 50_000.0, 300_000.0, 700_000.0, 1.5e6, 1e9] {
            let p = props_for(tps);
            assert!(p.size >= SIZE_MIN && p.size <= SIZE_MAX, "size at {tps}");
            assert!(p.speed >= SPEED_MIN && p.speed <= speed_ceiling, "speed at {tps}");
            assert!(p.spawn_multiplier > 0.0);
        }
    }

    #[test]
    fn scaled_base_monotone_within_each_band() {
        // Strictly inside each band: the upper endpoint belongs to the
        // next band, where the multiplier steps down
        for tier in TIERS.iter().filter(|t| t.lower > VERY_LOW_TPS) {
            let mut last = 0.0f32;
            for step in 0..20 {
                let tps = tier.lower + (tier.upper - tier.lower) * step as f64 / 20.0;
                let base = scaled_base(tps);
                assert!(base >= last, "non-monotone at {tps}: {base} < {last}");
                last = base;
            }
        }
    }

    #[test]
    fn top_band_clamps_past_upper_bound() {
        let at_cap = props_for(2_000_000.0);
        let beyond = props_for(50_000_000.0);
        assert_eq!(at_cap.size, beyond.size);
        assert_eq!(at_cap.speed, beyond.speed);
        assert_eq!(at_cap.spawn_multiplier, beyond.spawn_multiplier);
    }

    #[test]
    fn zero_tps_spawns_nothing() {
        let mut rng = 0xDEADBEEF;
        for _ in 0..100 {
            assert_eq!(spawn_count(0.0, 0.0, 16.0, &mut rng), 0);
        }
    }

    #[test]
    fn low_rate_expectation_matches_tps() {
        // 60 TPS at 16ms frames: expect ~0.96 particles per frame
        let mut rng = 0x1234_5678;
        let mut total = 0usize;
        let frames = 10_000;
        for _ in 0..frames {
            total += spawn_count(60.0, 60.0, 16.0, &mut rng);
        }
        let mean = total as f64 / frames as f64;
        assert!((mean - 0.96).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn burst_exceeds_steady_state_then_relaxes() {
        let mut rng = 0xDEADBEEF;
        let jump = spawn_count(2_000_000.0, 1_000.0, 16.0, &mut rng);
        let steady = spawn_count(2_000_000.0, 2_000_000.0, 16.0, &mut rng);
        assert!(jump > steady, "jump {jump} <= steady {steady}");
        assert_eq!(jump, SPAWN_MAX as usize);
    }

    #[test]
    fn scaled_path_stays_clamped() {
        let mut rng = 0xDEADBEEF;
        for tps in [251.0, 1e4, 1e6, 1e9] {
            let n = spawn_count(tps, 1.0, 16.0, &mut rng);
            assert!(n >= SPAWN_MIN as usize && n <= SPAWN_MAX as usize);
        }
    }
}
