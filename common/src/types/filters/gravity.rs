use crate::traits::IMUFilter;
use crate::types::untimed::XYZ;

/// Weight of the previous gravity estimate
pub const GRAVITY_FILTER_ALPHA: f64 = 0.8;

/// Low-pass/high-pass pair separating gravity from linear motion.
///
/// The gravity estimate follows the first-order recurrence
/// `g' = alpha * g + (1 - alpha) * raw`, and the output for each raw sample is the
/// component-wise magnitude of the remaining (linear) acceleration `|raw - g'|`.
///
/// # Example
///
/// ```rust
/// use common::types::filters::GravityFilter;
/// use common::types::untimed::XYZ;
///
/// let mut filter = GravityFilter::new();
/// let linear = filter.update(&XYZ::new([10.0, 0.0, 0.0]));
///
/// assert!((filter.gravity().x() - 2.0).abs() < 1e-9);
/// assert!((linear.x() - 8.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct GravityFilter {
    alpha: f64,
    gravity: XYZ,
}

impl Default for GravityFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl GravityFilter {
    /// Initializes filter with a zero gravity estimate.
    pub fn new() -> Self {
        Self {
            alpha: GRAVITY_FILTER_ALPHA,
            gravity: XYZ::default(),
        }
    }

    /// Advances the gravity estimate with a new raw sample and returns the
    /// absolute linear acceleration on each axis.
    pub fn update(&mut self, raw: &XYZ) -> XYZ {
        self.gravity = self.gravity * self.alpha + *raw * (1.0 - self.alpha);
        (*raw - self.gravity).abs()
    }

    /// Current gravity estimate
    pub fn gravity(&self) -> &XYZ {
        &self.gravity
    }

    pub fn reset(&mut self) {
        self.gravity = XYZ::default();
    }
}

impl IMUFilter<XYZ> for GravityFilter {
    /// Returns linear acceleration for each sample, in order
    fn filter(&mut self, samples: Vec<XYZ>) -> Vec<XYZ> {
        samples.iter().map(|sample| self.update(sample)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    const EPS: f64 = 1e-9;

    static SAMPLE_X10: Lazy<XYZ> = Lazy::new(|| XYZ::new([10.0, 0.0, 0.0]));
    static SAMPLE_RESTING: Lazy<XYZ> = Lazy::new(|| XYZ::new([0.12, -0.3, 9.81]));

    fn assert_close(a: &XYZ, b: [f64; 3]) {
        for (a, b) in a.inner().iter().zip(b.iter()) {
            assert!((a - b).abs() < EPS, "{a} != {b}");
        }
    }

    #[test]
    fn test_first_two_samples() {
        let mut filter = GravityFilter::new();

        let linear = filter.update(&SAMPLE_X10);
        assert_close(filter.gravity(), [2.0, 0.0, 0.0]);
        assert_close(&linear, [8.0, 0.0, 0.0]);

        let linear = filter.update(&SAMPLE_X10);
        assert_close(filter.gravity(), [3.6, 0.0, 0.0]);
        assert_close(&linear, [6.4, 0.0, 0.0]);
    }

    #[test]
    fn test_constant_signal_converges() {
        let mut filter = GravityFilter::new();
        let mut linear = XYZ::default();
        for _ in 0..200 {
            linear = filter.update(&SAMPLE_RESTING);
        }
        assert_close(filter.gravity(), SAMPLE_RESTING.inner());
        assert_close(&linear, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_output_never_negative() {
        let mut filter = GravityFilter::new();
        let samples = vec![
            XYZ::new([-3.0, 4.5, -9.81]),
            XYZ::new([12.0, -0.1, 0.0]),
            XYZ::new([-50.0, -50.0, -50.0]),
            XYZ::new([0.0, 7.0, 1e-6]),
        ];
        for linear in filter.filter(samples) {
            assert!(linear.inner().iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn test_batch_matches_single_updates() {
        let samples = vec![*SAMPLE_X10, *SAMPLE_RESTING, *SAMPLE_X10];

        let mut single = GravityFilter::new();
        let expected: Vec<XYZ> = samples.iter().map(|s| single.update(s)).collect();

        let mut batch = GravityFilter::new();
        assert_eq!(batch.filter(samples), expected);
        assert_eq!(batch.gravity(), single.gravity());
    }

    #[test]
    fn test_reset() {
        let mut filter = GravityFilter::new();
        filter.update(&SAMPLE_RESTING);
        filter.reset();
        assert_eq!(filter.gravity(), &XYZ::default());
        assert_close(&filter.update(&SAMPLE_X10), [8.0, 0.0, 0.0]);
    }
}
