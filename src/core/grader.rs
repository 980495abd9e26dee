use crate::core::{analysis::StaticAnalyzer, gate::ThresholdGate, language::{language_set, normalize_language}};
use crate::error::{Result, ScoringError};
use crate::models::{
    AnalysisSignals, Grade, GradeBreakdown, GradeResult, ProjectListing, RubricPoints,
    SubmissionAttempt,
};

/// Raw signal values that earn a dimension's full points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSaturation {
    pub functions: u32,
    pub control_structures: u32,
    pub comment_ratio: f64,
}

impl Default for SignalSaturation {
    fn default() -> Self {
        Self {
            functions: 3,
            control_structures: 5,
            comment_ratio: 0.2,
        }
    }
}

/// Maps static-analysis signals onto the 100 point rubric
///
/// Threshold-agnostic: whether a score passes depends on what was submitted,
/// which is `ThresholdGate`'s call.
#[derive(Debug, Clone, Copy)]
pub struct AutomationGrader {
    rubric: RubricPoints,
    saturation: SignalSaturation,
}

impl AutomationGrader {
    pub fn new(rubric: RubricPoints, saturation: SignalSaturation) -> Result<Self> {
        if rubric.total() != 100 {
            return Err(ScoringError::InvalidRubric(rubric.total()));
        }
        if saturation.functions == 0
            || saturation.control_structures == 0
            || !(saturation.comment_ratio > 0.0 && saturation.comment_ratio <= 1.0)
        {
            return Err(ScoringError::InvalidWeights(
                "signal saturation points must be positive".to_string(),
            ));
        }
        Ok(Self { rubric, saturation })
    }

    pub fn rubric(&self) -> RubricPoints {
        self.rubric
    }

    /// Weighted rubric points for a set of raw signals
    pub fn score_signals(&self, signals: &AnalysisSignals) -> Grade {
        let rubric = &self.rubric;
        let sat = &self.saturation;

        let breakdown = GradeBreakdown {
            language_match: points(rubric.language_match, if signals.language_match { 1.0 } else { 0.0 }),
            functions: points(
                rubric.functions,
                signals.function_count.min(sat.functions) as f64 / sat.functions as f64,
            ),
            logic: points(
                rubric.logic,
                signals.control_structure_count.min(sat.control_structures) as f64
                    / sat.control_structures as f64,
            ),
            documentation: points(
                rubric.documentation,
                unit_fraction(signals.comment_ratio) / sat.comment_ratio,
            ),
            complexity: points(rubric.complexity, signals.complexity_score),
            structure: points(rubric.structure, signals.structure_score),
        };

        Grade {
            score: breakdown.sum().clamp(0.0, 100.0),
            feedback: self.feedback(&breakdown),
            breakdown,
        }
    }

    /// Language the analyzer should check the submission against
    ///
    /// The declared language wins when the listing accepts it (or accepts
    /// anything); otherwise the listing's first required language.
    pub fn expected_language(submission: &SubmissionAttempt, listing: &ProjectListing) -> String {
        let declared = normalize_language(&submission.language);
        let accepted = language_set(&listing.required_languages);
        if accepted.is_empty() || accepted.contains(&declared) {
            return declared;
        }
        listing
            .required_languages
            .iter()
            .map(|l| normalize_language(l))
            .find(|l| !l.is_empty())
            .unwrap_or(declared)
    }

    /// Analyze and score a submission without applying any threshold
    pub fn score_submission(
        &self,
        submission: &SubmissionAttempt,
        listing: &ProjectListing,
        analyzer: &dyn StaticAnalyzer,
    ) -> Result<Grade> {
        let expected = Self::expected_language(submission, listing);
        let signals = analyzer.analyze(&submission.source_text, &expected)?;
        Ok(self.score_signals(&signals))
    }

    /// Analyze, score and apply the pass threshold for the submission's kind
    pub fn grade(
        &self,
        submission: &SubmissionAttempt,
        listing: &ProjectListing,
        analyzer: &dyn StaticAnalyzer,
        gate: &ThresholdGate,
    ) -> Result<GradeResult> {
        let grade = self.score_submission(submission, listing, analyzer)?;
        Ok(gate.apply(grade, submission.kind))
    }

    fn feedback(&self, breakdown: &GradeBreakdown) -> Vec<String> {
        let rubric = &self.rubric;
        let checks = [
            (breakdown.language_match, rubric.language_match, "Use the language the project requires."),
            (breakdown.functions, rubric.functions, "Break the solution into functions and call them."),
            (breakdown.logic, rubric.logic, "The solution uses few conditionals or loops."),
            (breakdown.documentation, rubric.documentation, "Add comments explaining the approach."),
            (breakdown.complexity, rubric.complexity, "Simplify heavily branched functions."),
            (breakdown.structure, rubric.structure, "Organize the code consistently into functions."),
        ];

        checks
            .iter()
            .filter(|(earned, max, _)| *max > 0 && *earned < *max as f64 / 2.0)
            .map(|(_, _, message)| message.to_string())
            .collect()
    }
}

impl Default for AutomationGrader {
    fn default() -> Self {
        Self {
            rubric: RubricPoints::default(),
            saturation: SignalSaturation::default(),
        }
    }
}

#[inline]
fn unit_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[inline]
fn points(max: u32, fraction: f64) -> f64 {
    max as f64 * unit_fraction(fraction)
}
