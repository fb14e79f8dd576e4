//! Detector noise for capture testing
//!
//! Simulates what a real landmark detector does to a clean capture:
//! - Positional jitter
//! - Low-confidence (occluded) points
//! - Hands and faces dropping out
//! - Corrupt frames with non-finite coordinates

use akira_core::{HolisticResult, Landmark};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Visibility given to an occluded landmark
pub const OCCLUDED_VISIBILITY: f32 = 0.1;

/// Jitter distribution type
#[derive(Clone, Debug, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Uniform in [-amplitude, amplitude] per axis
    Uniform { amplitude: f32 },
    /// Normal with zero mean
    Normal { stddev: f32 },
}

impl Jitter {
    /// Sample one axis offset
    pub fn sample(&self, rng: &mut StdRng) -> f32 {
        match *self {
            Jitter::None => 0.0,
            Jitter::Uniform { amplitude } if amplitude > 0.0 => {
                Uniform::new_inclusive(-amplitude, amplitude).sample(rng)
            }
            Jitter::Uniform { .. } => 0.0,
            Jitter::Normal { stddev } => {
                // Box-Muller transform
                let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
                let u2: f32 = rng.gen();
                let z = (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos();
                stddev * z
            }
        }
    }
}

/// Detector noise configuration
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorNoise {
    /// Jitter on world-space points (meters)
    pub jitter: Jitter,
    /// Probability a body point is reported occluded
    pub occlusion_rate: f64,
    /// Probability a hand is not detected in a frame
    pub hand_loss_rate: f64,
    /// Probability the face is not detected in a frame
    pub face_loss_rate: f64,
    /// Probability a frame carries a non-finite coordinate
    pub corrupt_rate: f64,
}

impl Default for DetectorNoise {
    fn default() -> Self {
        Self::typical()
    }
}

impl DetectorNoise {
    /// Noise-free detector
    pub fn clean() -> Self {
        DetectorNoise {
            jitter: Jitter::None,
            occlusion_rate: 0.0,
            hand_loss_rate: 0.0,
            face_loss_rate: 0.0,
            corrupt_rate: 0.0,
        }
    }

    /// Well lit room, performer facing the camera
    pub fn typical() -> Self {
        DetectorNoise {
            jitter: Jitter::Uniform { amplitude: 0.005 },
            occlusion_rate: 0.01,
            hand_loss_rate: 0.02,
            face_loss_rate: 0.01,
            corrupt_rate: 0.0,
        }
    }

    /// Dim room, fast motion, cheap camera
    pub fn poor() -> Self {
        DetectorNoise {
            jitter: Jitter::Normal { stddev: 0.02 },
            occlusion_rate: 0.1,
            hand_loss_rate: 0.2,
            face_loss_rate: 0.1,
            corrupt_rate: 0.02,
        }
    }
}

/// Applies detector noise to clean results
pub struct DetectorChaos {
    noise: DetectorNoise,
    rng: StdRng,
    /// Frames corrupted so far
    corrupted: u64,
}

impl DetectorChaos {
    pub fn new(noise: DetectorNoise, seed: u64) -> Self {
        DetectorChaos {
            noise,
            rng: StdRng::seed_from_u64(seed),
            corrupted: 0,
        }
    }

    pub fn noise(&self) -> &DetectorNoise {
        &self.noise
    }

    pub fn corrupted(&self) -> u64 {
        self.corrupted
    }

    fn roll(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.rng.gen_bool(probability.min(1.0))
    }

    fn jitter(&mut self, points: &mut [Landmark]) {
        for p in points {
            p.x += self.noise.jitter.sample(&mut self.rng);
            p.y += self.noise.jitter.sample(&mut self.rng);
            p.z += self.noise.jitter.sample(&mut self.rng);
        }
    }

    /// Degrade one detector result in place
    pub fn apply(&mut self, result: &mut HolisticResult) {
        if let Some(body) = result
            .pose_world_landmarks
            .as_mut()
            .and_then(|d| d.first_mut())
        {
            let mut points = std::mem::take(body);
            self.jitter(&mut points);
            for p in &mut points {
                if self.roll(self.noise.occlusion_rate) {
                    p.visibility = Some(OCCLUDED_VISIBILITY);
                }
            }
            *body = points;
        }

        if self.roll(self.noise.hand_loss_rate) {
            result.left_hand_landmarks = None;
        } else if let Some(hand) = result.left_hand_landmarks.as_mut().and_then(|d| d.first_mut()) {
            let mut points = std::mem::take(hand);
            self.jitter(&mut points);
            *hand = points;
        }
        if self.roll(self.noise.hand_loss_rate) {
            result.right_hand_landmarks = None;
        } else if let Some(hand) = result.right_hand_landmarks.as_mut().and_then(|d| d.first_mut()) {
            let mut points = std::mem::take(hand);
            self.jitter(&mut points);
            *hand = points;
        }
        if self.roll(self.noise.face_loss_rate) {
            result.face_landmarks = None;
        }

        if self.roll(self.noise.corrupt_rate) {
            if let Some(p) = result
                .pose_world_landmarks
                .as_mut()
                .and_then(|d| d.first_mut())
                .and_then(|points| points.first_mut())
            {
                p.x = f32::NAN;
                self.corrupted += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Choreography, PerformerPose, SyntheticPerformer};

    fn clean_frame() -> HolisticResult {
        SyntheticPerformer::new(30.0, Choreography::Hold(PerformerPose::default())).frame(0)
    }

    fn body(result: &HolisticResult) -> &[Landmark] {
        &result.pose_world_landmarks.as_ref().unwrap()[0]
    }

    #[test]
    fn test_clean_is_identity() {
        let mut chaos = DetectorChaos::new(DetectorNoise::clean(), 1);
        let mut result = clean_frame();
        chaos.apply(&mut result);
        assert_eq!(body(&result), body(&clean_frame()));
        assert!(result.left_hand_landmarks.is_some());
        assert!(result.face_landmarks.is_some());
    }

    #[test]
    fn test_jitter_is_bounded() {
        let noise = DetectorNoise {
            jitter: Jitter::Uniform { amplitude: 0.01 },
            ..DetectorNoise::clean()
        };
        let mut chaos = DetectorChaos::new(noise, 7);
        let mut result = clean_frame();
        chaos.apply(&mut result);

        let moved = body(&result)
            .iter()
            .zip(body(&clean_frame()))
            .filter(|(a, b)| a != b)
            .count();
        assert!(moved > 0);
        for (a, b) in body(&result).iter().zip(body(&clean_frame())) {
            assert!((a.x - b.x).abs() <= 0.01 + 1e-6);
            assert!((a.y - b.y).abs() <= 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_normal_jitter_statistics() {
        let mut rng = StdRng::seed_from_u64(42);
        let jitter = Jitter::Normal { stddev: 0.5 };
        let samples: Vec<f32> = (0..10_000).map(|_| jitter.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / samples.len() as f32;

        assert!(mean.abs() < 0.05);
        assert!((var.sqrt() - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_certain_loss() {
        let noise = DetectorNoise {
            hand_loss_rate: 1.0,
            face_loss_rate: 1.0,
            corrupt_rate: 1.0,
            ..DetectorNoise::clean()
        };
        let mut chaos = DetectorChaos::new(noise, 3);
        let mut result = clean_frame();
        chaos.apply(&mut result);

        assert!(result.left_hand_landmarks.is_none());
        assert!(result.right_hand_landmarks.is_none());
        assert!(result.face_landmarks.is_none());
        assert!(body(&result)[0].x.is_nan());
        assert_eq!(chaos.corrupted(), 1);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let run = |seed| {
            let mut chaos = DetectorChaos::new(DetectorNoise::poor(), seed);
            let mut result = clean_frame();
            chaos.apply(&mut result);
            result
                .pose_world_landmarks
                .map(|d| d[0].iter().map(|p| p.x.to_bits()).collect::<Vec<_>>())
        };
        assert_eq!(run(9), run(9));
        assert_ne!(run(9), run(10));
    }
}
