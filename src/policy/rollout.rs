//! Episode rollouts and summary statistics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total reward | Sum of step rewards |
//! | Coverage | Fraction of students with at least one lesson |
//! | Fulfilled | Fraction of students at or above their weekly target |
//! | Completion rate | Fraction of episodes ending with every target met |

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SchedulingPolicy;
use crate::env::{EpisodeController, Termination};
use crate::error::EpisodeError;
use crate::models::ScheduledLesson;
use crate::reward::EventTag;

/// Outcome of one rolled-out episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Name of the policy that acted.
    pub policy: String,
    /// Steps taken.
    pub steps: usize,
    /// Sum of step rewards.
    pub total_reward: f64,
    /// Committed lessons.
    pub commits: usize,
    /// Resubmitted lessons.
    pub duplicates: usize,
    /// Candidates rejected by the validator.
    pub violations: usize,
    /// Final coverage.
    pub coverage: f64,
    /// Final fraction of students at target.
    pub fulfilled: f64,
    /// Why the episode ended.
    pub termination: Termination,
    /// Final schedule with entity ids.
    pub schedule: Vec<ScheduledLesson>,
}

impl EpisodeSummary {
    /// Whether every student reached their target.
    pub fn completed(&self) -> bool {
        self.termination == Termination::Completed
    }
}

/// Resets `env` and lets `policy` act until the episode ends.
///
/// # Errors
/// Only protocol misuse surfaces here; a freshly reset controller never
/// produces one.
pub fn run_episode(
    env: &mut EpisodeController,
    policy: &mut dyn SchedulingPolicy,
    seed: Option<u64>,
) -> Result<EpisodeSummary, EpisodeError> {
    let (mut observation, _) = env.reset(seed);
    let mut total_reward = 0.0;
    let mut commits = 0;
    let mut duplicates = 0;
    let mut violations = 0;

    let termination = loop {
        let action = policy.select(env, &observation);
        let t = env.step(action)?;
        total_reward += t.reward;
        if t.info.new_lesson.is_some() {
            commits += 1;
        }
        if t.info.tags.contains(&EventTag::Duplicate) {
            duplicates += 1;
        }
        if t.info.tags.contains(&EventTag::Violation) {
            violations += 1;
        }
        observation = t.observation;
        if let Some(reason) = t.info.termination {
            break reason;
        }
    };

    let summary = EpisodeSummary {
        policy: policy.name().to_string(),
        steps: env.steps(),
        total_reward,
        commits,
        duplicates,
        violations,
        coverage: env.schedule().coverage(),
        fulfilled: env.schedule().fulfilled_fraction(),
        termination,
        schedule: env.scheduled_lessons(),
    };
    debug!(
        policy = %summary.policy,
        steps = summary.steps,
        reward = summary.total_reward,
        "rollout finished"
    );
    Ok(summary)
}

/// Means over the most recent episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Episodes included.
    pub episodes: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
    pub mean_coverage: f64,
    pub mean_fulfilled: f64,
    /// Fraction of episodes that completed (0.0..1.0).
    pub completion_rate: f64,
}

impl SummaryStats {
    /// Aggregates the last `window` episodes (all of them when `window` is 0).
    pub fn from_episodes(episodes: &[EpisodeSummary], window: usize) -> Self {
        let start = if window == 0 {
            0
        } else {
            episodes.len().saturating_sub(window)
        };
        let recent = &episodes[start..];
        let n = recent.len();
        if n == 0 {
            return Self {
                episodes: 0,
                mean_reward: 0.0,
                mean_steps: 0.0,
                mean_coverage: 0.0,
                mean_fulfilled: 0.0,
                completion_rate: 0.0,
            };
        }

        let mean = |f: fn(&EpisodeSummary) -> f64| recent.iter().map(f).sum::<f64>() / n as f64;
        Self {
            episodes: n,
            mean_reward: mean(|e| e.total_reward),
            mean_steps: mean(|e| e.steps as f64),
            mean_coverage: mean(|e| e.coverage),
            mean_fulfilled: mean(|e| e.fulfilled),
            completion_rate: mean(|e| if e.completed() { 1.0 } else { 0.0 }),
        }
    }
}
