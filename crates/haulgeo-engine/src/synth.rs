//! Fallback path synthesis.
//!
//! Each consecutive pair of waypoints is joined by a quadratic Bézier curve
//! whose control point sits off the chord midpoint, perpendicular to it.
//! Computation is planar in (lon, lat) and entirely pure.

use haulgeo_core::Coordinate;

pub const DEFAULT_SAMPLES_PER_SEGMENT: usize = 50;
pub const DEFAULT_CURVE_BIAS: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
pub struct PathSynthesizer {
    samples_per_segment: usize,
}

impl Default for PathSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_SEGMENT)
    }
}

impl PathSynthesizer {
    /// `samples_per_segment` includes both endpoints and is raised to 2 if
    /// smaller.
    #[must_use]
    pub fn new(samples_per_segment: usize) -> Self {
        Self {
            samples_per_segment: samples_per_segment.max(2),
        }
    }

    #[must_use]
    pub fn samples_per_segment(&self) -> usize {
        self.samples_per_segment
    }

    /// Builds a curved path through `coordinates` in order.
    ///
    /// Every input coordinate appears exactly in the output. Adjacent segments
    /// share their joint, so a path over `k` points has
    /// `(k - 1) * (samples - 1) + 1` entries. Fewer than two inputs are
    /// returned unchanged.
    #[must_use]
    pub fn synthesize(&self, coordinates: &[Coordinate], curve_bias: f64) -> Vec<Coordinate> {
        if coordinates.len() < 2 {
            return coordinates.to_vec();
        }

        let capacity = (coordinates.len() - 1) * (self.samples_per_segment - 1) + 1;
        let mut path = Vec::with_capacity(capacity);
        for (idx, pair) in coordinates.windows(2).enumerate() {
            let segment = self.segment(pair[0], pair[1], curve_bias);
            // Joint already emitted as the previous segment's last sample.
            let skip = usize::from(idx > 0);
            path.extend(segment.into_iter().skip(skip));
        }
        path
    }

    fn segment(&self, from: Coordinate, to: Coordinate, curve_bias: f64) -> Vec<Coordinate> {
        let curved = sample_quadratic(from, to, curve_bias, self.samples_per_segment);
        if curved.iter().all(Coordinate::is_valid) {
            return curved;
        }
        tracing::debug!(%from, %to, curve_bias, "curve leaves valid range, using straight chord");
        sample_quadratic(from, to, 0.0, self.samples_per_segment)
    }
}

/// Samples `B(t) = (1-t)²·P0 + 2(1-t)t·P1 + t²·P2` at `samples` evenly spaced
/// `t` in `[0, 1]`. The first and last samples are exactly `from` and `to`.
fn sample_quadratic(
    from: Coordinate,
    to: Coordinate,
    curve_bias: f64,
    samples: usize,
) -> Vec<Coordinate> {
    let (x0, y0) = (from.lon, from.lat);
    let (x2, y2) = (to.lon, to.lat);
    let (dx, dy) = (x2 - x0, y2 - y0);
    // (-dy, dx) is perpendicular to the chord with length |chord|.
    let cx = (x0 + x2) / 2.0 - dy * curve_bias;
    let cy = (y0 + y2) / 2.0 + dx * curve_bias;

    let last = samples - 1;
    (0..samples)
        .map(|i| {
            if i == 0 {
                return from;
            }
            if i == last {
                return to;
            }
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / last as f64;
            let u = 1.0 - t;
            let a = u * u;
            let b = 2.0 * u * t;
            let c = t * t;
            Coordinate::new(a * y0 + b * cy + c * y2, a * x0 + b * cx + c * x2)
        })
        .collect()
}
