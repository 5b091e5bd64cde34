use super::utils::{ExponentialSmoother, DEFAULT_POSITION_SMOOTH_TIME};

const HEAD_RADIUS: f32 = 0.0875;
const SPEED_OF_SOUND: f32 = 343.0;
/// Head-shadow attenuation of the far ear at 90°, in dB.
const MAX_ILD_DB: f32 = 10.0;
/// Level drop for a source directly behind the head.
const REAR_ATTENUATION: f32 = 0.25;

/// Binaural panner using a simple ITD/ILD model.
///
/// 3D audio for headphones without an HRTF dataset: the far ear hears the
/// source later (Woodworth ITD) and quieter (ILD). Sources behind the head
/// get a mild level drop so front and back do not sound identical.
///
/// Azimuth is smoothed as a (sin, cos) pair, so a source crossing ±180°
/// glides through the back instead of sweeping around the front.
pub(crate) struct BinauralPanner {
    lateral_smoother: ExponentialSmoother,
    frontal_smoother: ExponentialSmoother,
    elevation_smoother: ExponentialSmoother,
    sample_rate: f32,
    delay_buffer_left: Vec<f32>,
    delay_buffer_right: Vec<f32>,
    delay_write_pos: usize,
}

impl BinauralPanner {
    pub(crate) fn new(sample_rate: f32) -> Self {
        let mut panner = Self {
            lateral_smoother: ExponentialSmoother::new(DEFAULT_POSITION_SMOOTH_TIME, sample_rate),
            frontal_smoother: ExponentialSmoother::new(DEFAULT_POSITION_SMOOTH_TIME, sample_rate),
            elevation_smoother: ExponentialSmoother::new(
                DEFAULT_POSITION_SMOOTH_TIME,
                sample_rate,
            ),
            sample_rate,
            delay_buffer_left: Vec::new(),
            delay_buffer_right: Vec::new(),
            delay_write_pos: 0,
        };
        panner.set_sample_rate(sample_rate);
        panner
    }

    pub(crate) fn set_sample_rate(&mut self, sample_rate: f32) {
        // ~1 ms covers the largest ITD with headroom for interpolation
        let len = (sample_rate * 0.001).ceil() as usize + 4;
        self.sample_rate = sample_rate;
        self.lateral_smoother = ExponentialSmoother::new(DEFAULT_POSITION_SMOOTH_TIME, sample_rate);
        self.frontal_smoother = ExponentialSmoother::new(DEFAULT_POSITION_SMOOTH_TIME, sample_rate);
        self.elevation_smoother =
            ExponentialSmoother::new(DEFAULT_POSITION_SMOOTH_TIME, sample_rate);
        self.delay_buffer_left = vec![0.0; len];
        self.delay_buffer_right = vec![0.0; len];
        self.delay_write_pos = 0;
        self.snap(0.0, 0.0);
    }

    /// Jump straight to a position without gliding.
    pub(crate) fn snap(&mut self, azimuth: f32, elevation: f32) {
        let az = azimuth.to_radians();
        self.lateral_smoother.reset(az.sin());
        self.frontal_smoother.reset(az.cos());
        self.elevation_smoother.reset(elevation);
    }

    pub(crate) fn reset(&mut self) {
        self.delay_buffer_left.fill(0.0);
        self.delay_buffer_right.fill(0.0);
        self.delay_write_pos = 0;
        self.snap(0.0, 0.0);
    }

    /// Process mono input to binaural stereo output.
    ///
    /// - `azimuth`: degrees, 0 = front, 90 = left, -90 = right, ±180 = behind
    /// - `elevation`: degrees, 0 = ear level, positive = up
    pub(crate) fn process_mono(&mut self, input: f32, azimuth: f32, elevation: f32) -> (f32, f32) {
        let target = azimuth.to_radians();
        let lateral = self.lateral_smoother.process(target.sin());
        let frontal = self.frontal_smoother.process(target.cos());
        let elevation = self
            .elevation_smoother
            .process(elevation.clamp(-90.0, 90.0));

        // Angle off the median plane; front and back share the same ITD/ILD.
        let norm = lateral.hypot(frontal).max(1e-6);
        let side = (lateral / norm).clamp(-1.0, 1.0).asin();

        // Woodworth ITD: (r / c) * (θ + sin θ)
        let itd_samples =
            HEAD_RADIUS / SPEED_OF_SOUND * (side.abs() + side.abs().sin()) * self.sample_rate;

        let ild_db = side.abs() / core::f32::consts::FRAC_PI_2 * MAX_ILD_DB;
        let far_gain = 10.0_f32.powf(-ild_db / 20.0);
        let (left_gain, right_gain) = if side > 0.0 {
            (1.0, far_gain)
        } else {
            (far_gain, 1.0)
        };

        let rear = 1.0 - REAR_ATTENUATION * (-frontal / norm).max(0.0);
        let elevation_factor = (1.0 - (elevation.abs() / 90.0) * 0.3).max(0.7);
        let level = input * rear * elevation_factor;

        let len = self.delay_buffer_left.len();
        self.delay_buffer_left[self.delay_write_pos] = level * left_gain;
        self.delay_buffer_right[self.delay_write_pos] = level * right_gain;

        let (left_delay, right_delay) = if side > 0.0 {
            (0.0, itd_samples)
        } else {
            (itd_samples, 0.0)
        };
        let left = read_delayed(&self.delay_buffer_left, self.delay_write_pos, left_delay);
        let right = read_delayed(&self.delay_buffer_right, self.delay_write_pos, right_delay);

        self.delay_write_pos = (self.delay_write_pos + 1) % len;
        (left, right)
    }
}

/// Fractional read `delay` samples behind `write_pos`.
#[inline]
fn read_delayed(buffer: &[f32], write_pos: usize, delay: f32) -> f32 {
    let len = buffer.len();
    let delay = delay.clamp(0.0, (len - 2) as f32);
    let whole = delay as usize;
    let frac = delay - whole as f32;
    let a = buffer[(write_pos + len - whole) % len];
    let b = buffer[(write_pos + len - whole - 1) % len];
    a + (b - a) * frac
}
