//! Reward shaping.
//!
//! A deterministic map from the outcome of one step to a scalar reward and
//! the set of events that produced it.

use serde::{Deserialize, Serialize};

use crate::config::RewardScheme;
use crate::constraints::Rejection;
use crate::schedule::CommitReceipt;

/// What happened when an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The candidate was committed.
    Committed(CommitReceipt),
    /// The candidate was turned down; state unchanged.
    Rejected(Rejection),
    /// The action addressed an index outside the registry.
    OutOfBounds,
}

/// Reward components, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventTag {
    Committed,
    FirstLesson,
    Progress,
    NewPair,
    FullCoverage,
    Duplicate,
    Violation,
    OutOfBounds,
}

/// Reward plus contributing events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shaped {
    pub reward: f64,
    pub tags: Vec<EventTag>,
}

/// Applies a [`RewardScheme`] to step outcomes.
#[derive(Debug, Clone, Default)]
pub struct RewardShaper {
    scheme: RewardScheme,
}

impl RewardShaper {
    pub fn new(scheme: RewardScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &RewardScheme {
        &self.scheme
    }

    /// Shapes one outcome.
    pub fn shape(&self, outcome: &StepOutcome) -> Shaped {
        let s = &self.scheme;
        let mut reward = 0.0;
        let mut tags = Vec::new();

        match outcome {
            StepOutcome::Committed(receipt) => {
                reward += s.commit;
                tags.push(EventTag::Committed);
                if receipt.first_for_student {
                    reward += s.first_lesson;
                    tags.push(EventTag::FirstLesson);
                }
                if receipt.count_before < receipt.target {
                    reward += s.progress;
                    tags.push(EventTag::Progress);
                }
                if receipt.first_for_pair {
                    reward += s.new_pair;
                    tags.push(EventTag::NewPair);
                }
                if receipt.all_fulfilled {
                    reward += s.full_coverage;
                    tags.push(EventTag::FullCoverage);
                }
            }
            StepOutcome::Rejected(Rejection::Duplicate) => {
                reward += s.duplicate;
                tags.push(EventTag::Duplicate);
            }
            StepOutcome::Rejected(Rejection::UnknownEntity(_)) | StepOutcome::OutOfBounds => {
                reward += s.out_of_bounds;
                tags.push(EventTag::OutOfBounds);
            }
            StepOutcome::Rejected(_) => {
                reward += s.violation;
                tags.push(EventTag::Violation);
            }
        }

        Shaped { reward, tags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::EntityKind;
    use crate::models::Lesson;

    fn receipt(count_before: u32, target: u32, first_pair: bool, all: bool) -> CommitReceipt {
        CommitReceipt {
            lesson: Lesson::new(0, 0, 0, 0),
            position: 0,
            first_for_student: count_before == 0,
            first_for_pair: first_pair,
            count_before,
            count_after: count_before + 1,
            target,
            all_fulfilled: all,
        }
    }

    #[test]
    fn test_first_commit_all_bonuses() {
        let shaper = RewardShaper::default();
        let shaped = shaper.shape(&StepOutcome::Committed(receipt(0, 2, true, false)));
        assert!((shaped.reward - 4.5).abs() < 1e-10);
        assert_eq!(
            shaped.tags,
            vec![
                EventTag::Committed,
                EventTag::FirstLesson,
                EventTag::Progress,
                EventTag::NewPair
            ]
        );
    }

    #[test]
    fn test_full_coverage_bonus() {
        let shaper = RewardShaper::default();
        let shaped = shaper.shape(&StepOutcome::Committed(receipt(0, 1, true, true)));
        assert!((shaped.reward - 9.5).abs() < 1e-10);
        assert_eq!(shaped.tags.last(), Some(&EventTag::FullCoverage));
    }

    #[test]
    fn test_repeat_pair_commit() {
        let shaper = RewardShaper::default();
        let shaped = shaper.shape(&StepOutcome::Committed(receipt(1, 3, false, false)));
        // Base plus progress only.
        assert!((shaped.reward - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_penalties() {
        let shaper = RewardShaper::default();
        let dup = shaper.shape(&StepOutcome::Rejected(Rejection::Duplicate));
        assert!((dup.reward + 1.0).abs() < 1e-10);
        assert_eq!(dup.tags, vec![EventTag::Duplicate]);

        let bad = shaper.shape(&StepOutcome::Rejected(Rejection::InstrumentMismatch));
        assert!((bad.reward + 10.0).abs() < 1e-10);
        assert_eq!(bad.tags, vec![EventTag::Violation]);

        let oob = shaper.shape(&StepOutcome::OutOfBounds);
        assert!((oob.reward + 1.0).abs() < 1e-10);
        let unknown = shaper.shape(&StepOutcome::Rejected(Rejection::UnknownEntity(
            EntityKind::Room,
        )));
        assert_eq!(unknown, oob);
    }

    #[test]
    fn test_custom_scheme() {
        let shaper = RewardShaper::new(RewardScheme {
            violation: -50.0,
            ..RewardScheme::default()
        });
        let bad = shaper.shape(&StepOutcome::Rejected(Rejection::TeacherCapExceeded));
        assert!((bad.reward + 50.0).abs() < 1e-10);
    }
}
