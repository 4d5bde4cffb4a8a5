//! Decision policy: probability + attributions -> score, tier, verdict, explanation.

use std::cmp::Ordering;

use crate::domain::{Contribution, Decision, PolicyConfig, PredictionResult, RiskLevel};
use crate::features::feature_label;

pub const SCORE_MIN: f64 = 300.0;
pub const SCORE_MAX: f64 = 850.0;

/// Contributions smaller than this are not worth naming.
const NEGLIGIBLE_IMPACT: f64 = 1e-12;

/// Linear map of default probability onto the 300-850 scale.
pub fn credit_score(probability: f64) -> f64 {
    (SCORE_MAX - probability * (SCORE_MAX - SCORE_MIN)).clamp(SCORE_MIN, SCORE_MAX)
}

impl PolicyConfig {
    pub fn risk_level(&self, probability: f64) -> RiskLevel {
        if probability < self.medium_risk_from {
            RiskLevel::Low
        } else if probability < self.high_risk_from {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// `Pending` is never produced here; manual review is assigned downstream.
    pub fn decision(&self, probability: f64) -> Decision {
        if probability >= self.approval_threshold {
            Decision::Rejected
        } else {
            Decision::Approved
        }
    }

    /// Assemble the result for one prediction.
    ///
    /// `base_value` and `model_version` come from the forest that produced `probability`, so
    /// `base_value + Σ impact == risk_probability` holds on the returned result.
    /// `contributions` arrive in feature declaration order and leave sorted by descending
    /// absolute impact.
    pub fn decide(
        &self,
        model_version: &str,
        base_value: f64,
        probability: f64,
        contributions: Vec<Contribution>,
    ) -> PredictionResult {
        let risk_level = self.risk_level(probability);
        let contributions = rank_contributions(contributions);
        let recommendation_text = recommendation(risk_level, &contributions, self.top_k);

        PredictionResult {
            credit_score: credit_score(probability),
            risk_probability: probability,
            risk_level,
            decision: self.decision(probability),
            recommendation_text,
            contributions,
            factors: Default::default(),
            model_confidence: probability.max(1.0 - probability),
            base_value,
            model_version: model_version.to_string(),
        }
    }
}

/// Sort by descending `|impact|`. The sort is stable, so equal magnitudes keep declaration
/// order (the first-declared feature wins a tie).
pub fn rank_contributions(mut contributions: Vec<Contribution>) -> Vec<Contribution> {
    contributions.sort_by(|a, b| b.impact.abs().partial_cmp(&a.impact.abs()).unwrap_or(Ordering::Equal));
    contributions
}

/// Human-readable summary naming the dominant driver and up to `top_k - 1` runners-up.
pub fn recommendation(level: RiskLevel, ranked: &[Contribution], top_k: usize) -> String {
    let drivers: Vec<&Contribution> = ranked
        .iter()
        .filter(|c| c.impact.abs() >= NEGLIGIBLE_IMPACT)
        .take(top_k.max(1))
        .collect();

    let Some((first, rest)) = drivers.split_first() else {
        return format!(
            "{} risk: no single factor moved the score away from the portfolio baseline.",
            level.display_name()
        );
    };

    let qualifier = if first.impact > 0.0 { "higher" } else { "favourable" };
    let mut text = format!(
        "{} risk: driven primarily by {} {} ({})",
        level.display_name(),
        qualifier,
        feature_label(&first.feature),
        direction(first.impact)
    );

    if !rest.is_empty() {
        let others: Vec<String> = rest
            .iter()
            .map(|c| format!("{} ({})", feature_label(&c.feature), direction(c.impact)))
            .collect();
        text.push_str("; also ");
        text.push_str(&others.join(", "));
    }
    text.push('.');
    text
}

fn direction(impact: f64) -> &'static str {
    if impact > 0.0 { "raises risk" } else { "lowers risk" }
}
