use super::{
    error::{Result, SchedulerError},
    process::ReadyProcess,
};

/// Weight of the priority in the composite score; the burst rank gets
/// the remaining quarter.
const PRIORITY_WEIGHT: f64 = 3.0;
const SCORE_DIVISOR: f64 = 4.0;

pub struct RankCalculator;

impl RankCalculator {
    /// Assigns 1-based ranks by ascending value. Equal values keep their
    /// encounter order: the earlier element gets the smaller rank.
    pub fn rank(values: &[f64]) -> Vec<usize> {
        let mut order: Vec<(f64, usize)> = values
            .iter()
            .copied()
            .enumerate()
            .map(|(position, value)| (value, position))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut ranks = vec![0; values.len()];
        for (rank, (_, position)) in order.into_iter().enumerate() {
            ranks[position] = rank + 1;
        }
        ranks
    }

    pub fn score(priority: i32, burst_rank: usize) -> f64 {
        (PRIORITY_WEIGHT * priority as f64 + burst_rank as f64) / SCORE_DIVISOR
    }

    /// Recomputes `burst_rank`, `score` and `score_rank` for the ready set
    /// in its current order.
    pub fn assign(ready: &mut [ReadyProcess]) -> Result<()> {
        if ready.is_empty() {
            return Err(SchedulerError::PreconditionViolation(
                "ranked an empty ready set",
            ));
        }

        let remaining: Vec<f64> = ready.iter().map(|process| process.remaining).collect();
        for (process, rank) in ready.iter_mut().zip(RankCalculator::rank(&remaining)) {
            process.burst_rank = rank;
            process.score = RankCalculator::score(process.priority, rank);
        }

        let scores: Vec<f64> = ready.iter().map(|process| process.score).collect();
        for (process, rank) in ready.iter_mut().zip(RankCalculator::rank(&scores)) {
            process.score_rank = rank;
        }
        Ok(())
    }
}
