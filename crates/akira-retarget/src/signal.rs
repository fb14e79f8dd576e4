//! Signal sources and their persistent filters
//!
//! Each point the engine filters has a fixed key. Its filter is created with
//! the engine and survives across frames, so the filter actually sees a
//! continuous signal.

use std::collections::HashMap;

use akira_core::{AkiraResult, Landmark, Side};
use akira_filter::{FilteredLandmark, LandmarkFilterConfig};
use glam::Vec3;

use crate::FilterTuning;

/// Filtered signal source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// World-space shoulder feeding the upper body basis
    TorsoShoulder(Side),
    /// World-space hip feeding the upper/lower body basis
    TorsoHip(Side),
    ArmShoulder(Side),
    ArmElbow(Side),
    ArmWrist(Side),
    LegHip(Side),
    LegKnee(Side),
    LegAnkle(Side),
    /// Image-space hip for root translation
    ScreenHip(Side),
    /// Image-space shoulder for root translation
    ScreenShoulder(Side),
}

impl Signal {
    /// Every signal source the engine filters
    pub fn all() -> Vec<Signal> {
        let per_side: [fn(Side) -> Signal; 10] = [
            Signal::TorsoShoulder,
            Signal::TorsoHip,
            Signal::ArmShoulder,
            Signal::ArmElbow,
            Signal::ArmWrist,
            Signal::LegHip,
            Signal::LegKnee,
            Signal::LegAnkle,
            Signal::ScreenHip,
            Signal::ScreenShoulder,
        ];
        per_side
            .iter()
            .flat_map(|f| Side::BOTH.iter().map(move |side| f(*side)))
            .collect()
    }

    fn config(self, tuning: &FilterTuning) -> &LandmarkFilterConfig {
        match self {
            Signal::TorsoShoulder(_) | Signal::TorsoHip(_) => &tuning.torso,
            Signal::ArmShoulder(_) | Signal::ArmElbow(_) | Signal::ArmWrist(_) => &tuning.arms,
            Signal::LegHip(_) | Signal::LegKnee(_) | Signal::LegAnkle(_) => &tuning.legs,
            Signal::ScreenHip(_) | Signal::ScreenShoulder(_) => &tuning.screen,
        }
    }
}

/// One filter per signal source
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: HashMap<Signal, FilteredLandmark>,
}

impl FilterBank {
    pub fn new(tuning: &FilterTuning) -> AkiraResult<Self> {
        let mut filters = HashMap::new();
        for signal in Signal::all() {
            filters.insert(signal, FilteredLandmark::new(signal.config(tuning))?);
        }
        Ok(Self { filters })
    }

    /// Feed a landmark (y flipped up) observed at `t` seconds
    ///
    /// A missing landmark is no observation: `None`, filter untouched.
    pub fn sample(&mut self, signal: Signal, t: f64, landmark: Option<&Landmark>) -> Option<Vec3> {
        let landmark = landmark?;
        let filter = self.filters.get_mut(&signal)?;
        filter.update(t, landmark.to_vec3_y_up(), landmark.visibility)
    }

    /// Last accepted position of a signal
    pub fn position(&self, signal: Signal) -> Option<Vec3> {
        self.filters.get(&signal).and_then(|f| f.position())
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn reset(&mut self) {
        for filter in self.filters.values_mut() {
            filter.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_filter_per_signal() {
        let bank = FilterBank::new(&FilterTuning::default()).unwrap();
        assert_eq!(bank.len(), 20);
        assert_eq!(Signal::all().len(), 20);
    }

    #[test]
    fn test_sample_flips_y_and_skips_missing() {
        let mut bank = FilterBank::new(&FilterTuning::default()).unwrap();
        let signal = Signal::ArmElbow(Side::Left);

        assert_eq!(bank.sample(signal, 0.0, None), None);
        let l = Landmark::new(0.1, 0.2, 0.3).with_visibility(0.99);
        let out = bank.sample(signal, 0.0, Some(&l)).unwrap();
        assert_eq!(out, Vec3::new(0.1, -0.2, 0.3));
        assert_eq!(bank.position(signal), Some(out));
        assert_eq!(bank.position(Signal::ArmElbow(Side::Right)), None);
    }

    #[test]
    fn test_filters_are_independent() {
        let mut bank = FilterBank::new(&FilterTuning::default()).unwrap();
        let a = Landmark::new(1.0, 0.0, 0.0);
        let b = Landmark::new(-1.0, 0.0, 0.0);
        bank.sample(Signal::LegKnee(Side::Left), 0.0, Some(&a));
        let out = bank.sample(Signal::LegKnee(Side::Right), 0.0, Some(&b)).unwrap();
        assert_eq!(out, b.to_vec3_y_up());
    }

    #[test]
    fn test_reset() {
        let mut bank = FilterBank::new(&FilterTuning::default()).unwrap();
        bank.sample(Signal::TorsoHip(Side::Left), 0.0, Some(&Landmark::new(1.0, 1.0, 1.0)));
        bank.reset();
        assert_eq!(bank.position(Signal::TorsoHip(Side::Left)), None);
    }
}
