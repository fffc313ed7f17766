// render.rs - Rasterize simulation state to an RGBA framebuffer
//
// The host blits this buffer straight into a 2D canvas via ImageData,
// so the layout is w * h * 4 bytes, row-major. Circles are drawn without
// antialiasing (the host canvas is created with antialias off).

use crate::sim::{Flights, Particles};

const PARTICLE_FILL: [u8; 3] = [255, 48, 48];
const PARTICLE_STROKE: [u8; 3] = [255, 255, 255];
const STROKE_WIDTH: f32 = 0.75;

const ORB_FILL: [u8; 3] = [255, 48, 48];
const ORB_CORE: [u8; 3] = [255, 255, 255];
const ORB_RADIUS: f32 = 10.0;

pub struct Frame {
    px: Vec<u8>,
    w: u32,
    h: u32,
}

impl Frame {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            px: vec![0; (w * h * 4) as usize],
            w,
            h,
        }
    }

    pub fn resize(&mut self, w: u32, h: u32) {
        self.w = w;
        self.h = h;
        self.px.resize((w * h * 4) as usize, 0);
        self.px.fill(0);
    }

    pub fn clear(&mut self) {
        self.px.fill(0);
    }

    pub fn ptr(&self) -> *const u8 {
        self.px.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.px.len()
    }

    /// Source-over blend of (color, alpha) into one pixel
    #[inline]
    fn blend(&mut self, x: i32, y: i32, color: [u8; 3], alpha: f32) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 {
            return;
        }
        let idx = ((y as u32 * self.w + x as u32) * 4) as usize;
        let inv = 1.0 - alpha;
        for c in 0..3 {
            let dst = self.px[idx + c] as f32;
            self.px[idx + c] = (color[c] as f32 * alpha + dst * inv) as u8;
        }
        let dst_a = self.px[idx + 3] as f32;
        self.px[idx + 3] = (255.0 * alpha + dst_a * inv) as u8;
    }

    /// Filled circle with an outline ring, both alpha-scaled
    fn outlined_circle(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        fill: [u8; 3],
        stroke: [u8; 3],
        alpha: f32,
    ) {
        let r2 = r * r;
        let inner = (r - STROKE_WIDTH).max(0.0);
        let inner2 = inner * inner;

        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 > r2 {
                    continue;
                }
                let color = if d2 >= inner2 { stroke } else { fill };
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Plain filled circle
    fn filled_circle(&mut self, cx: f32, cy: f32, r: f32, color: [u8; 3], alpha: f32) {
        let r2 = r * r;
        let x0 = (cx - r).floor() as i32;
        let x1 = (cx + r).ceil() as i32;
        let y0 = (cy - r).floor() as i32;
        let y1 = (cy + r).ceil() as i32;

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    /// Draw the falling particles as filled, outlined circles with
    /// opacity-scaled alpha
    pub fn draw_particles(&mut self, particles: &Particles) {
        for i in 0..particles.n {
            self.outlined_circle(
                particles.x[i],
                particles.y[i],
                particles.radius[i],
                PARTICLE_FILL,
                PARTICLE_STROKE,
                particles.opacity[i],
            );
        }
    }

    /// Draw flight orbs: wide glow, red body, white core
    pub fn draw_flights(&mut self, flights: &Flights) {
        for i in 0..flights.n {
            let (x, y) = (flights.x[i], flights.y[i]);
            let r = ORB_RADIUS * flights.scale[i];
            let a = flights.opacity[i];

            self.filled_circle(x, y, r * 1.5, ORB_FILL, a * 0.2);
            self.filled_circle(x, y, r, ORB_FILL, a);
            self.filled_circle(x, y, r * 0.5, ORB_CORE, a * 0.4);
        }
    }
}
