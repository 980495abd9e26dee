use crate::models::{Grade, GradeResult, SubmissionKind};

/// Pass/fail cutoffs applied to already computed scores
///
/// Stateless: the caller owns attempt bookkeeping and supplies counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdGate {
    pub join_min_score: f64,
    pub task_min_score: f64,
    /// Weekly challenge passes strictly above this many points
    pub weekly_challenge_pass_above: u32,
    pub weekly_challenge_max: u32,
    pub learning_support_failures: usize,
    pub skill_map_points: u32,
}

impl Default for ThresholdGate {
    fn default() -> Self {
        Self {
            join_min_score: 70.0,
            task_min_score: 80.0,
            weekly_challenge_pass_above: 6,
            weekly_challenge_max: 10,
            learning_support_failures: 8,
            skill_map_points: 10,
        }
    }
}

impl ThresholdGate {
    pub fn can_join_project(&self, score: f64) -> bool {
        score >= self.join_min_score
    }

    pub fn task_approved(&self, score: f64) -> bool {
        score >= self.task_min_score
    }

    pub fn weekly_challenge_passed(&self, points: u32) -> bool {
        points > self.weekly_challenge_pass_above
    }

    pub fn should_trigger_learning_support(&self, failed_attempt_count: usize) -> bool {
        failed_attempt_count >= self.learning_support_failures
    }

    pub fn skill_map_unlocked(&self, accumulated_challenge_points: u32) -> bool {
        accumulated_challenge_points >= self.skill_map_points
    }

    /// Map a 0-100 grade onto the weekly challenge point scale
    pub fn challenge_points(&self, score: f64) -> u32 {
        if !score.is_finite() || score <= 0.0 {
            return 0;
        }
        let points = (score * self.weekly_challenge_max as f64 / 100.0).floor() as u32;
        points.min(self.weekly_challenge_max)
    }

    /// Pass decision for a 0-100 grade in the given context
    pub fn passes(&self, kind: SubmissionKind, score: f64) -> bool {
        match kind {
            SubmissionKind::ProjectJoin => self.can_join_project(score),
            SubmissionKind::Task => self.task_approved(score),
            SubmissionKind::WeeklyChallenge => {
                self.weekly_challenge_passed(self.challenge_points(score))
            }
        }
    }

    pub fn apply(&self, grade: Grade, kind: SubmissionKind) -> GradeResult {
        GradeResult {
            passed: self.passes(kind, grade.score),
            score: grade.score,
            breakdown: grade.breakdown,
            feedback: grade.feedback,
            automatic_fail: false,
        }
    }
}
