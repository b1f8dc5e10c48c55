//! Kano classification from functional/dysfunctional survey votes.
//!
//! Answers are coded 1=Like, 2=Must-be, 3=Neutral, 4=Live-with, 5=Dislike.
//! Score = `w[major] * (alpha * CS + (1 - beta * DS))`.

use prio_core::config::AnalysisConfig;
use prio_core::entities::Task;
use prio_core::enums::KanoCategory::{
    Attractive as A, Indifferent as I, MustBe as M, Performance as O, Questionable as Q,
    Reverse as R,
};
use prio_core::enums::{KanoCategory, Method};
use prio_core::lookup::TaskLookup;
use prio_core::metadata::parse_number;
use serde_json::{Map, Value, json};

use crate::agent::{ScoringAgent, Scored};
use crate::error::ScoringError;

pub const LABEL: &str = "KANO";

/// Rows: functional answer 1..5. Columns: dysfunctional answer 1..5.
const KANO_TABLE: [[KanoCategory; 5]; 5] = [
    [Q, A, A, A, O],
    [R, I, I, I, M],
    [R, I, I, I, M],
    [R, I, I, I, M],
    [R, R, R, R, Q],
];

/// Category for one (functional, dysfunctional) answer pair.
#[must_use]
pub fn classify(functional: u8, dysfunctional: u8) -> KanoCategory {
    match (functional, dysfunctional) {
        (1..=5, 1..=5) => KANO_TABLE[usize::from(functional - 1)][usize::from(dysfunctional - 1)],
        _ => KanoCategory::Questionable,
    }
}

/// Vote tally indexed like [`KanoCategory::ALL`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KanoCounts([usize; 6]);

impl KanoCounts {
    #[must_use]
    pub fn from_votes(votes: &[(u8, u8)]) -> Self {
        let mut counts = Self::default();
        for &(f, d) in votes {
            counts.0[slot(classify(f, d))] += 1;
        }
        counts
    }

    #[must_use]
    pub const fn get(&self, category: KanoCategory) -> usize {
        self.0[slot(category)]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Most voted category; ties go to the earlier category in
    /// [`KanoCategory::ALL`].
    #[must_use]
    pub fn major(&self) -> KanoCategory {
        let mut best = KanoCategory::ALL[0];
        for category in KanoCategory::ALL {
            if self.get(category) > self.get(best) {
                best = category;
            }
        }
        best
    }

    /// Berger satisfaction and dissatisfaction coefficients.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cs_ds(&self) -> (f64, f64) {
        let a = self.get(A);
        let o = self.get(O);
        let m = self.get(M);
        let i = self.get(I);
        let denom = a + o + m + i;
        if denom == 0 {
            return (0.0, 0.0);
        }
        let denom = denom as f64;
        ((a + o) as f64 / denom, (o + m) as f64 / denom)
    }

    fn to_json(self) -> Value {
        let map: Map<String, Value> = KanoCategory::ALL
            .into_iter()
            .map(|c| (c.as_str().to_string(), json!(self.get(c))))
            .collect();
        Value::Object(map)
    }
}

const fn slot(category: KanoCategory) -> usize {
    match category {
        KanoCategory::MustBe => 0,
        KanoCategory::Performance => 1,
        KanoCategory::Attractive => 2,
        KanoCategory::Indifferent => 3,
        KanoCategory::Reverse => 4,
        KanoCategory::Questionable => 5,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Kano;

impl ScoringAgent for Kano {
    fn method(&self) -> Method {
        Method::Kano
    }

    fn score(
        &self,
        task: &Task,
        config: &AnalysisConfig,
        _lookup: Option<&dyn TaskLookup>,
    ) -> Result<Scored, ScoringError> {
        let cfg = &config.kano;
        let meta = &task.metadata;
        let votes = parse_votes(meta.decoded("kano_votes").as_ref());

        let (major, cs, ds, counts, source) = if votes.is_empty() {
            let sat = meta.number_or("kano_satisfaction", cfg.default_satisfaction);
            let dis = meta.number_or("kano_dissatisfaction", cfg.default_dissatisfaction);
            let major = if sat >= 0.6 && dis >= 0.4 {
                KanoCategory::Performance
            } else if sat >= 0.7 {
                KanoCategory::Attractive
            } else {
                KanoCategory::Indifferent
            };
            (major, sat, dis, None, "heuristic")
        } else {
            let counts = KanoCounts::from_votes(&votes);
            let (cs_calc, ds_calc) = counts.cs_ds();
            let cs = meta.number("kano_cs").unwrap_or(cs_calc);
            let ds = meta.number("kano_ds").unwrap_or(ds_calc);
            (counts.major(), cs, ds, Some(counts), "votes")
        };

        let w_cat = cfg.category_weight(major);
        let score = w_cat * cfg.alpha_cs.mul_add(cs, 1.0 - cfg.beta_ds * ds);

        Ok(Scored::new(score)
            .with_details(json!({
                "category_major": major.as_str(),
                "source": source,
                "counts": counts.map_or_else(|| json!({}), KanoCounts::to_json),
                "valid_votes": votes.len(),
                "CS": cs,
                "DS": ds,
                "w_cat": w_cat,
                "alpha_cs": cfg.alpha_cs,
                "beta_ds": cfg.beta_ds,
            }))
            .with_label(LABEL, major.as_str()))
    }
}

/// Valid `[F, D]` pairs with both answers in 1..=5; anything else is skipped.
fn parse_votes(raw: Option<&Value>) -> Vec<(u8, u8)> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Array(pair) if pair.len() == 2 => Some((answer(&pair[0])?, answer(&pair[1])?)),
            _ => None,
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn answer(value: &Value) -> Option<u8> {
    let x = parse_number(value)?.trunc();
    (1.0..=5.0).contains(&x).then_some(x as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn score(task: &Task) -> Scored {
        Kano.score(task, &AnalysisConfig::default(), None).unwrap()
    }

    #[rstest]
    #[case(1, 5, KanoCategory::Performance)]
    #[case(1, 1, KanoCategory::Questionable)]
    #[case(1, 3, KanoCategory::Attractive)]
    #[case(3, 5, KanoCategory::MustBe)]
    #[case(5, 2, KanoCategory::Reverse)]
    #[case(3, 3, KanoCategory::Indifferent)]
    #[case(9, 1, KanoCategory::Questionable)]
    fn lookup_table(#[case] f: u8, #[case] d: u8, #[case] expected: KanoCategory) {
        assert_eq!(classify(f, d), expected);
    }

    #[test]
    fn like_dislike_vote_is_performance() {
        let task = Task::new("t", "p", "x").with_meta("kano_votes", json!([[1, 5]]));
        let s = score(&task);
        assert_eq!(s.labels[LABEL], "performance");
        // CS = 1, DS = 1: 1.0 * (0.6 + 0.6)
        assert!((s.score - 1.2).abs() < 1e-12);
    }

    #[test]
    fn ties_break_by_category_order() {
        let counts = KanoCounts::from_votes(&[(1, 3), (3, 5)]);
        assert_eq!(counts.get(A), 1);
        assert_eq!(counts.get(M), 1);
        assert_eq!(counts.major(), KanoCategory::MustBe);
    }

    #[test]
    fn encoded_votes_and_overrides() {
        let task = Task::new("t", "p", "x")
            .with_meta("kano_votes", "[[1,3],[1,3],[2,2]]")
            .with_meta("kano_ds", 0.0);
        let s = score(&task);
        assert_eq!(s.labels[LABEL], "attractive");
        assert_eq!(s.details["DS"].as_f64(), Some(0.0));
        assert_eq!(s.details["counts"]["indifferent"], 1);
    }

    #[test]
    fn invalid_votes_fall_back_to_heuristic() {
        let task = Task::new("t", "p", "x")
            .with_meta("kano_votes", json!([[0, 9], "junk"]))
            .with_meta("kano_satisfaction", 0.8)
            .with_meta("kano_dissatisfaction", 0.1);
        let s = score(&task);
        assert_eq!(s.details["source"], "heuristic");
        assert_eq!(s.labels[LABEL], "attractive");
    }

    #[test]
    fn default_heuristic_is_indifferent() {
        let s = score(&Task::new("t", "p", "x"));
        assert_eq!(s.labels[LABEL], "indifferent");
        // 0.4 * (0.3 + 0.8)
        assert!((s.score - 0.44).abs() < 1e-12);
    }
}
