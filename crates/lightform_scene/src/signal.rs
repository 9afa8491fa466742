//! Animation signals
//!
//! A signal drives one scalar channel (`property.axis`) of a light panel's
//! transform as a function of elapsed time. Evaluation is pure; applying
//! the value to a transform is the compositor's job.

use serde::{Deserialize, Serialize};

use lightform_math::{lerp, Easing};

use crate::id::{LightId, SignalId};

/// Shortest duration a signal may have, in seconds
pub const MIN_DURATION: f64 = 1e-3;

/// Transform property a signal drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalProperty {
    #[default]
    Position,
    Rotation,
    Scale,
}

/// Component of the driven property
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Playback mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMode {
    /// Restart from `start` every `duration`
    #[default]
    Loop,
    /// `start -> end -> start` over two durations
    Pingpong,
    /// Play once and hold `end`
    Once,
    /// Loop, but add to the channel's static value instead of replacing it
    Additive,
}

/// One animation channel bound to a light
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: SignalId,
    #[serde(default)]
    pub name: String,
    pub target_id: LightId,
    #[serde(default)]
    pub property: SignalProperty,
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default, rename = "animation")]
    pub mode: SignalMode,
    #[serde(default)]
    pub easing: Easing,
    /// Seconds per cycle
    pub duration: f64,
}

/// Evaluated signal for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalSample {
    pub property: SignalProperty,
    pub axis: Axis,
    pub value: f64,
    /// Add `value` to the static channel rather than overwrite it
    pub additive: bool,
}

impl Signal {
    pub fn new(
        id: impl Into<SignalId>,
        target_id: impl Into<LightId>,
        property: SignalProperty,
        axis: Axis,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            target_id: target_id.into(),
            property,
            axis,
            start: 0.0,
            end: 1.0,
            mode: SignalMode::Loop,
            easing: Easing::Linear,
            duration: 1.0,
        }
    }

    /// Set range (builder pattern)
    pub fn with_range(mut self, start: f64, end: f64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set playback (builder pattern)
    pub fn with_mode(mut self, mode: SignalMode, easing: Easing, duration: f64) -> Self {
        self.mode = mode;
        self.easing = easing;
        self.duration = duration;
        self
    }

    /// Clamp the duration to something playable
    pub fn sanitize(&mut self) -> bool {
        if self.duration.is_finite() && self.duration >= MIN_DURATION {
            return false;
        }
        self.duration = if self.duration.is_finite() { MIN_DURATION } else { 1.0 };
        true
    }

    /// Channel value at `elapsed` seconds
    pub fn value_at(&self, elapsed: f64) -> f64 {
        let duration = self.duration.max(MIN_DURATION);
        let elapsed = elapsed.max(0.0);

        match self.mode {
            SignalMode::Loop | SignalMode::Additive => {
                let t = elapsed.rem_euclid(duration) / duration;
                lerp(self.start, self.end, self.easing.ease(t))
            }
            SignalMode::Pingpong => {
                let t = elapsed.rem_euclid(duration * 2.0);
                if t < duration {
                    lerp(self.start, self.end, self.easing.ease(t / duration))
                } else {
                    lerp(self.end, self.start, self.easing.ease((t - duration) / duration))
                }
            }
            SignalMode::Once => {
                let t = elapsed.min(duration) / duration;
                lerp(self.start, self.end, self.easing.ease(t))
            }
        }
    }

    /// Evaluate into a sample the compositor can apply
    pub fn sample(&self, elapsed: f64) -> SignalSample {
        SignalSample {
            property: self.property,
            axis: self.axis,
            value: self.value_at(elapsed),
            additive: self.mode == SignalMode::Additive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(mode: SignalMode) -> Signal {
        Signal::new("s", "light-1", SignalProperty::Position, Axis::X)
            .with_range(0.0, 2.0)
            .with_mode(mode, Easing::Linear, 2.0)
    }

    #[test]
    fn test_loop_wraps() {
        let s = signal(SignalMode::Loop);
        assert!((s.value_at(1.0) - 1.0).abs() < 1e-9);
        assert!((s.value_at(3.0) - 1.0).abs() < 1e-9);
        assert!(s.value_at(4.0).abs() < 1e-9);
    }

    #[test]
    fn test_pingpong_returns() {
        let s = signal(SignalMode::Pingpong);
        assert!((s.value_at(2.0) - 2.0).abs() < 1e-9);
        assert!((s.value_at(3.0) - 1.0).abs() < 1e-9);
        assert!(s.value_at(4.0).abs() < 1e-9);
    }

    #[test]
    fn test_once_holds_end() {
        let s = signal(SignalMode::Once);
        assert!((s.value_at(1.0) - 1.0).abs() < 1e-9);
        assert!((s.value_at(10.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_additive_flag() {
        assert!(signal(SignalMode::Additive).sample(0.5).additive);
        assert!(!signal(SignalMode::Loop).sample(0.5).additive);
    }

    #[test]
    fn test_sanitize_duration() {
        let mut s = signal(SignalMode::Loop);
        s.duration = 0.0;
        assert!(s.sanitize());
        assert_eq!(s.duration, MIN_DURATION);
        assert!(s.value_at(5.0).is_finite());
    }

    #[test]
    fn test_json_field_names() {
        let s = signal(SignalMode::Pingpong);
        let value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["targetId"], "light-1");
        assert_eq!(value["animation"], "pingpong");
        assert_eq!(value["easing"], "linear");
    }
}
