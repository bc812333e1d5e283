use super::{process::ReadyProcess, Time};

pub struct AdaptiveQuantumPolicy;

impl AdaptiveQuantumPolicy {
    /// Geometric mean of the average and the largest remaining burst of
    /// the ready set. Zero for an empty set.
    pub fn quantum(ready: &[ReadyProcess]) -> Time {
        if ready.is_empty() {
            return 0.0;
        }

        let (sum, max) = ready
            .iter()
            .map(|process| process.remaining)
            .fold((0.0, 0.0_f64), |(sum, max), remaining| {
                (sum + remaining, max.max(remaining))
            });
        (sum / ready.len() as f64 * max).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::process::ProcessRecord;

    fn ready(bursts: &[f64]) -> Vec<ReadyProcess> {
        let records: Vec<ProcessRecord> = bursts
            .iter()
            .enumerate()
            .map(|(index, &burst)| ProcessRecord::new(index as u32 + 1, burst))
            .collect();
        ReadyProcess::snapshot(&records)
    }

    #[test]
    fn quantum_of_single_process_is_its_burst() {
        assert_eq!(AdaptiveQuantumPolicy::quantum(&ready(&[50.0])), 50.0);
    }

    #[test]
    fn quantum_is_sqrt_of_mean_times_max() {
        // mean 60, max 90
        let quantum = AdaptiveQuantumPolicy::quantum(&ready(&[30.0, 60.0, 90.0]));
        assert!((quantum - 5400.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn quantum_shrinks_with_the_workload() {
        let before = AdaptiveQuantumPolicy::quantum(&ready(&[80.0, 60.0, 65.0]));
        let after = AdaptiveQuantumPolicy::quantum(&ready(&[6.0, 20.0]));
        assert!(after < before);
    }

    #[test]
    fn empty_or_idle_sets_yield_zero() {
        assert_eq!(AdaptiveQuantumPolicy::quantum(&[]), 0.0);
        assert_eq!(AdaptiveQuantumPolicy::quantum(&ready(&[0.0, 0.0])), 0.0);
    }
}
