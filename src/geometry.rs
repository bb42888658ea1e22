// src/geometry.rs - Small math helpers shared by the classifier and controller
use nalgebra::Vector3;
use std::collections::VecDeque;

/// Euclidean distance between two landmarks.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

/// Angle at `b` formed by `a-b-c`, in degrees.
///
/// Degenerate inputs (a zero-length arm) yield 0.0 rather than NaN.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let v1 = a - b;
    let v2 = c - b;
    let mag1 = v1.norm();
    let mag2 = v2.norm();

    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
/// No clamping is applied; a zero-width input range maps to `out_min`.
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / span + out_min
}

/// Sliding-window mean over the last `window_size` samples.
#[derive(Debug, Clone)]
pub struct Smoother {
    window_size: usize,
    values: VecDeque<f64>,
}

impl Smoother {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            values: VecDeque::with_capacity(window_size),
        }
    }

    pub fn smooth(&mut self, value: f64) -> f64 {
        if self.values.len() >= self.window_size {
            self.values.pop_front();
        }
        self.values.push_back(value);

        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-axis [`Smoother`] for 3D signals.
#[derive(Debug, Clone)]
pub struct VectorSmoother {
    axes: [Smoother; 3],
}

impl VectorSmoother {
    pub fn new(window_size: usize) -> Self {
        Self {
            axes: [
                Smoother::new(window_size),
                Smoother::new(window_size),
                Smoother::new(window_size),
            ],
        }
    }

    pub fn smooth(&mut self, value: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.axes[0].smooth(value.x),
            self.axes[1].smooth(value.y),
            self.axes[2].smooth(value.z),
        )
    }

    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }
}

/// Exponential moving average; the first sample passes through unchanged.
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    alpha: f64,
    value: Option<f64>,
}

impl ExponentialSmoother {
    /// `alpha` is the weight of the newest sample, kept within [0.01, 0.99].
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: clamp(alpha, 0.01, 0.99),
            value: None,
        }
    }

    pub fn smooth(&mut self, value: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.value = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Smoother applied to 3D deltas: sliding-window mean or exponential.
#[derive(Debug, Clone)]
pub enum DeltaSmoother {
    Window(VectorSmoother),
    Exponential([ExponentialSmoother; 3]),
}

impl DeltaSmoother {
    /// Exponential when `alpha` is given, otherwise a window of `window_size`.
    pub fn new(window_size: usize, alpha: Option<f64>) -> Self {
        match alpha {
            Some(alpha) => Self::Exponential([
                ExponentialSmoother::new(alpha),
                ExponentialSmoother::new(alpha),
                ExponentialSmoother::new(alpha),
            ]),
            None => Self::Window(VectorSmoother::new(window_size)),
        }
    }

    pub fn smooth(&mut self, value: Vector3<f64>) -> Vector3<f64> {
        match self {
            Self::Window(smoother) => smoother.smooth(value),
            Self::Exponential(axes) => Vector3::new(
                axes[0].smooth(value.x),
                axes[1].smooth(value.y),
                axes[2].smooth(value.z),
            ),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Window(smoother) => smoother.reset(),
            Self::Exponential(axes) => axes.iter_mut().for_each(ExponentialSmoother::reset),
        }
    }
}

/// Zero out `delta` when both |x| and |y| fall below `deadzone`.
pub fn apply_deadzone(delta: Vector3<f64>, deadzone: f64) -> Vector3<f64> {
    if delta.x.abs() < deadzone && delta.y.abs() < deadzone {
        Vector3::zeros()
    } else {
        delta
    }
}
