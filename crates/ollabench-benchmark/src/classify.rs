//! Fixed-threshold tiers for averaged throughput. Boundaries are exclusive:
//! a rate exactly on a threshold falls into the lower tier.

use ollabench_core::{BenchmarkSummary, Tier};
use serde::Serialize;

const PROMPT_THRESHOLDS: [(f64, Tier); 3] = [
    (3000.0, Tier::Excellent),
    (2000.0, Tier::Good),
    (1000.0, Tier::Fair),
];

const EVAL_THRESHOLDS: [(f64, Tier); 3] = [
    (50.0, Tier::Excellent),
    (30.0, Tier::Good),
    (10.0, Tier::Fair),
];

pub fn classify_prompt_tps(tps: f64) -> Tier {
    classify(tps, &PROMPT_THRESHOLDS)
}

pub fn classify_eval_tps(tps: f64) -> Tier {
    classify(tps, &EVAL_THRESHOLDS)
}

fn classify(tps: f64, thresholds: &[(f64, Tier)]) -> Tier {
    thresholds
        .iter()
        .find(|(min, _)| tps > *min)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Poor)
}

/// Band description for a prompt-processing tier, e.g. `2000-3000 t/s`.
pub fn prompt_band(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => ">3000 t/s",
        Tier::Good => "2000-3000 t/s",
        Tier::Fair => "1000-2000 t/s",
        Tier::Poor => "<1000 t/s",
    }
}

pub fn eval_band(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => ">50 t/s",
        Tier::Good => "30-50 t/s",
        Tier::Fair => "10-30 t/s",
        Tier::Poor => "<10 t/s",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub prompt: Tier,
    pub generation: Tier,
}

pub fn assess(summary: &BenchmarkSummary) -> Assessment {
    Assessment {
        prompt: classify_prompt_tps(summary.avg_prompt_tps),
        generation: classify_eval_tps(summary.avg_eval_tps),
    }
}
