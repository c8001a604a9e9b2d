use crate::model::{NormalizedEstimate, RawEstimate};

/// Values above 1 are read as percentages. Anything else is already a fraction
/// (including 0, negatives and NaN) and passes through.
pub fn normalize_probability(raw: f64) -> f64 {
    if raw > 1.0 { raw / 100.0 } else { raw }
}

/// Confidence targets the 0-100 range: fractions (<= 1) are scaled up,
/// everything else is kept as is.
pub fn normalize_confidence(raw: f64) -> f64 {
    if raw <= 1.0 { raw * 100.0 } else { raw }
}

pub fn normalize(raw: RawEstimate) -> NormalizedEstimate {
    NormalizedEstimate {
        fixture_id: raw.fixture_id,
        probabilities: raw.probabilities.map(normalize_probability),
        rationale: raw.rationale,
        confidence: normalize_confidence(raw.confidence),
    }
}
