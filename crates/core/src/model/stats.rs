use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::{QuizKind, QuizResult};

/// Aggregate over every stored result of one quiz kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindStats {
    pub kind: QuizKind,
    pub attempts: u32,
    pub best_score: u32,
    pub best_total: u32,
    /// Mean of per-attempt percentages, rounded down.
    pub average_percent: u32,
    pub last_completed_at: DateTime<Utc>,
}

impl KindStats {
    /// Group results by kind. Output follows `QuizKind::ALL`; kinds with no
    /// attempts are left out.
    #[must_use]
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a QuizResult>) -> Vec<Self> {
        let mut acc: HashMap<QuizKind, (Self, u64)> = HashMap::new();

        for result in results {
            let pct = u64::from(result.percent());
            acc.entry(result.kind())
                .and_modify(|(stats, pct_sum)| {
                    stats.attempts = stats.attempts.saturating_add(1);
                    *pct_sum += pct;
                    // Compare as ratios so a 40/50 beats a 70/100.
                    if u64::from(result.score()) * u64::from(stats.best_total)
                        > u64::from(stats.best_score) * u64::from(result.total())
                    {
                        stats.best_score = result.score();
                        stats.best_total = result.total();
                    }
                    if result.completed_at() > stats.last_completed_at {
                        stats.last_completed_at = result.completed_at();
                    }
                })
                .or_insert_with(|| {
                    (
                        Self {
                            kind: result.kind(),
                            attempts: 1,
                            best_score: result.score(),
                            best_total: result.total(),
                            average_percent: 0,
                            last_completed_at: result.completed_at(),
                        },
                        pct,
                    )
                });
        }

        QuizKind::ALL
            .iter()
            .filter_map(|kind| acc.remove(kind))
            .map(|(mut stats, pct_sum)| {
                let avg = pct_sum / u64::from(stats.attempts.max(1));
                stats.average_percent = u32::try_from(avg).unwrap_or(100);
                stats
            })
            .collect()
    }
}
