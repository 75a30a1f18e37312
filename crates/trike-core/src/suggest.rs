//! Activity suggestions from a fixed-weight linear classifier.
//!
//! Scores three candidate activities from a [`Snapshot`] and turns the
//! winner into a [`Suggestion`] when it is confident, different from what the
//! driver is doing, and not too soon after the previous suggestion. There is
//! no training: the weights are constants.
//!
//! Feature vector:
//! `[bias, stopped_min, continuous_drive_min, sin(hour), cos(hour), avg_speed_kmh,
//!   last_is_drive, last_is_break, last_is_work]`

use std::f32::consts::TAU;

use chrono::{DateTime, Duration, Utc};

use crate::activity::ActivityType;
use crate::engine::Snapshot;
use crate::tracker::ActivitySwitch;
use crate::types::Confidence;

/// Number of classifier inputs.
pub const FEATURE_COUNT: usize = 9;

/// Minimum confidence before a suggestion is shown.
pub const DEFAULT_SUGGESTION_THRESHOLD: f32 = 0.68;

/// Activities the classifier can propose, in weight-row order.
const CLASSES: [ActivityType; 3] = [
    ActivityType::Drive,
    ActivityType::Break,
    ActivityType::OtherWork,
];

const WEIGHTS: [[f32; FEATURE_COUNT]; 3] = [
    [0.2, -1.2, 0.9, 0.1, -0.1, 2.0, 0.8, -0.6, -0.3],
    [-0.1, 1.6, -0.8, -0.2, 0.1, -2.5, -0.4, 1.2, -0.1],
    [-0.1, 0.4, -0.2, 0.0, 0.0, -0.6, -0.2, -0.3, 0.9],
];

/// Classifier output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Highest-scoring activity.
    pub activity: ActivityType,
    pub confidence: Confidence,
    /// Probability per candidate activity.
    pub scores: [(ActivityType, Confidence); 3],
}

/// Builds the feature vector for a snapshot.
///
/// No location source exists, so average speed is always zero.
pub fn features(snapshot: &Snapshot) -> [f32; FEATURE_COUNT] {
    let stopped = if snapshot.running && snapshot.last_type != Some(ActivityType::Drive) {
        as_minutes(snapshot.elapsed_in_current)
    } else {
        0.0
    };
    let hour_angle = TAU * f32::from(snapshot.hour) / 24.0;
    let last_is = |activity: ActivityType| {
        if snapshot.last_type == Some(activity) {
            1.0
        } else {
            0.0
        }
    };

    [
        1.0,
        stopped,
        as_minutes(snapshot.continuous_drive),
        hour_angle.sin(),
        hour_angle.cos(),
        0.0,
        last_is(ActivityType::Drive),
        last_is(ActivityType::Break),
        last_is(ActivityType::OtherWork),
    ]
}

/// Scores a snapshot. Pure; the same snapshot always yields the same result.
pub fn predict(snapshot: &Snapshot) -> Prediction {
    let x = features(snapshot);
    let logits = WEIGHTS.map(|weights| dot(&weights, &x));
    let probs = softmax(logits);

    let best = (1..probs.len()).fold(0, |best, i| if probs[i] > probs[best] { i } else { best });
    let scores = [0_usize, 1, 2].map(|i| (CLASSES[i], Confidence::clamped(probs[i])));

    Prediction {
        activity: CLASSES[best],
        confidence: scores[best].1,
        scores,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "minute-level precision is plenty for a linear score"
)]
fn as_minutes(duration: Duration) -> f32 {
    duration.num_milliseconds() as f32 / 60_000.0
}

fn dot(weights: &[f32; FEATURE_COUNT], x: &[f32; FEATURE_COUNT]) -> f32 {
    weights.iter().zip(x).map(|(w, v)| w * v).sum()
}

fn softmax<const N: usize>(logits: [f32; N]) -> [f32; N] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.map(|v| (v - max).exp());
    let sum: f32 = exp.iter().sum();
    exp.map(|v| v / sum)
}

/// A proposed activity switch awaiting the driver's decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suggestion {
    pub activity: ActivityType,
    pub confidence: Confidence,
}

impl Suggestion {
    pub fn message(&self) -> String {
        format!(
            "Looks like {} right now ({}%). Switch?",
            self.activity.label(),
            self.confidence.percent()
        )
    }

    /// Applies the suggestion exactly as a manual switch would.
    pub fn accept<S: ActivitySwitch>(self, switch: &mut S, now: DateTime<Utc>) -> Result<(), S::Error> {
        switch.switch_to(self.activity, now)
    }
}

/// Filters predictions into suggestions.
///
/// Suppresses low-confidence predictions, predictions that match the current
/// activity, and anything within `min_interval` of the last suggestion.
#[derive(Debug, Clone)]
pub struct SuggestionGate {
    threshold: Confidence,
    min_interval: Duration,
    last_suggested_at: Option<DateTime<Utc>>,
}

impl Default for SuggestionGate {
    fn default() -> Self {
        Self::new(Confidence::clamped(DEFAULT_SUGGESTION_THRESHOLD))
    }
}

impl SuggestionGate {
    pub fn new(threshold: Confidence) -> Self {
        Self {
            threshold,
            min_interval: Duration::minutes(2),
            last_suggested_at: None,
        }
    }

    #[must_use]
    pub const fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn consider(
        &mut self,
        prediction: &Prediction,
        current: Option<ActivityType>,
        now: DateTime<Utc>,
    ) -> Option<Suggestion> {
        if prediction.confidence < self.threshold || current == Some(prediction.activity) {
            return None;
        }
        if self
            .last_suggested_at
            .is_some_and(|last| now - last <= self.min_interval)
        {
            tracing::debug!(activity = %prediction.activity, "suggestion rate-limited");
            return None;
        }
        self.last_suggested_at = Some(now);
        Some(Suggestion {
            activity: prediction.activity,
            confidence: prediction.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::ledger::Ledger;

    fn snapshot(last: Option<ActivityType>, elapsed_min: i64, continuous_min: i64) -> Snapshot {
        Snapshot {
            elapsed_in_current: Duration::minutes(elapsed_min),
            continuous_drive: Duration::minutes(continuous_min),
            hour: 12,
            last_type: last,
            running: last.is_some(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn features_follow_snapshot() {
        let x = features(&snapshot(Some(ActivityType::Break), 20, 0));
        assert!((x[1] - 20.0).abs() < 1e-4);
        assert!(x[3].abs() < 1e-4, "sin(noon) is zero");
        assert!((x[4] + 1.0).abs() < 1e-4, "cos(noon) is -1");
        assert_eq!(&x[6..], &[0.0, 1.0, 0.0]);

        let driving = features(&snapshot(Some(ActivityType::Drive), 30, 90));
        assert!(driving[1].abs() < f32::EPSILON, "driving is not stopped time");
        assert!((driving[2] - 90.0).abs() < 1e-4);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let prediction = predict(&snapshot(Some(ActivityType::OtherWork), 5, 0));
        let total: f32 = prediction.scores.iter().map(|(_, c)| c.value()).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn idle_work_predicts_break() {
        let prediction = predict(&snapshot(Some(ActivityType::OtherWork), 5, 0));
        assert_eq!(prediction.activity, ActivityType::Break);
        assert!(prediction.confidence.value() > 0.95);
    }

    #[test]
    fn fresh_drive_predicts_drive() {
        let prediction = predict(&snapshot(Some(ActivityType::Drive), 1, 1));
        assert_eq!(prediction.activity, ActivityType::Drive);
        assert!(prediction.confidence.value() > 0.85);
    }

    #[test]
    fn gate_suggests_confident_different_activity() {
        let mut gate = SuggestionGate::default();
        let prediction = predict(&snapshot(Some(ActivityType::OtherWork), 5, 0));
        let suggestion = gate
            .consider(&prediction, Some(ActivityType::OtherWork), noon())
            .unwrap();
        assert_eq!(suggestion.activity, ActivityType::Break);
        assert_eq!(
            suggestion.message(),
            format!(
                "Looks like Break right now ({}%). Switch?",
                suggestion.confidence.percent()
            )
        );
    }

    #[test]
    fn gate_ignores_prediction_matching_current() {
        let mut gate = SuggestionGate::default();
        let prediction = predict(&snapshot(Some(ActivityType::Drive), 1, 1));
        assert!(
            gate.consider(&prediction, Some(ActivityType::Drive), noon())
                .is_none()
        );
    }

    #[test]
    fn gate_ignores_low_confidence() {
        // Idle with no history: drive barely leads (about 44%).
        let mut gate = SuggestionGate::default();
        let prediction = predict(&snapshot(None, 0, 0));
        assert_eq!(prediction.activity, ActivityType::Drive);
        assert!(prediction.confidence.value() < DEFAULT_SUGGESTION_THRESHOLD);
        assert!(gate.consider(&prediction, None, noon()).is_none());
    }

    #[test]
    fn gate_rate_limits_suggestions() {
        let mut gate = SuggestionGate::default();
        let prediction = predict(&snapshot(Some(ActivityType::OtherWork), 5, 0));
        let current = Some(ActivityType::OtherWork);

        assert!(gate.consider(&prediction, current, noon()).is_some());
        assert!(
            gate.consider(&prediction, current, noon() + Duration::minutes(1))
                .is_none()
        );
        assert!(
            gate.consider(&prediction, current, noon() + Duration::minutes(2))
                .is_none()
        );
        assert!(
            gate.consider(&prediction, current, noon() + Duration::seconds(121))
                .is_some()
        );
    }

    #[test]
    fn accepting_switches_like_a_manual_start() {
        let mut ledger = Ledger::new();
        ledger.start(ActivityType::OtherWork, noon() - Duration::minutes(5));

        let suggestion = Suggestion {
            activity: ActivityType::Break,
            confidence: Confidence::clamped(0.9),
        };
        suggestion.accept(&mut ledger, noon()).unwrap();

        assert_eq!(ledger.current().unwrap().activity, ActivityType::Break);
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(ledger.events()[0].end(), noon());
    }
}
