use super::{
    context::SimContext,
    error::{Result, SchedulerError},
    metrics::CompletionTable,
    process::{ProcessId, ProcessRecord, ReadyProcess},
    quantum::AdaptiveQuantumPolicy,
    rank::RankCalculator,
    timeline::Segment,
    Scheduler, Time,
};
use std::collections::VecDeque;

/// Ranking of one process in one round.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub id: ProcessId,
    pub remaining: Time,
    pub burst_rank: usize,
    pub score: f64,
    pub score_rank: usize,
}

/// Quantum and dispatch order chosen at the start of a round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub round: usize,
    pub quantum: Time,
    pub arranged: Vec<RankedEntry>,
}

/// Round robin with a quantum and an ordering that are both recomputed
/// from the current ready set at the start of every round.
///
/// Each round takes the whole ready set, ranks it by remaining burst,
/// scores every process as `(3 * priority + burst_rank) / 4` and
/// dispatches in ascending score order. Processes that outlive the
/// quantum go back to the ready set for the next round, so later rounds
/// see shorter bursts and get a smaller quantum.
///
/// Arrival times are ignored: every process is ready at time zero, and
/// turnaround and response are measured from zero.
pub struct AdaptiveScheduler {
    ready: Vec<ReadyProcess>,
    arranged: VecDeque<ReadyProcess>,
    quantum: Time,
    rounds: Vec<RoundSummary>,
    ctx: SimContext,
}

impl AdaptiveScheduler {
    pub fn with_processes(processes: &[ProcessRecord]) -> Self {
        let ready = ReadyProcess::snapshot(processes);
        let ctx = SimContext::new(CompletionTable::for_processes(&ready, |_| 0.0));

        Self {
            ready,
            arranged: VecDeque::new(),
            quantum: 0.0,
            rounds: Vec::new(),
            ctx,
        }
    }

    pub fn quantum(&self) -> Time {
        self.quantum
    }

    pub fn rounds(&self) -> &[RoundSummary] {
        &self.rounds
    }

    fn start_round(&mut self) -> Result<()> {
        self.quantum = AdaptiveQuantumPolicy::quantum(&self.ready);
        RankCalculator::assign(&mut self.ready)?;

        let mut arranged: Vec<ReadyProcess> = self.ready.drain(..).collect();
        arranged.sort_by_key(|process| process.score_rank);

        let summary = RoundSummary {
            round: self.rounds.len() + 1,
            quantum: self.quantum,
            arranged: arranged
                .iter()
                .map(|process| RankedEntry {
                    id: process.id,
                    remaining: process.remaining,
                    burst_rank: process.burst_rank,
                    score: process.score,
                    score_rank: process.score_rank,
                })
                .collect(),
        };
        log::debug!(
            "round {}: quantum {:.3}, order {:?}",
            summary.round,
            summary.quantum,
            summary.arranged.iter().map(|entry| entry.id).collect::<Vec<_>>()
        );

        self.rounds.push(summary);
        self.arranged = arranged.into();
        Ok(())
    }
}

impl Scheduler for AdaptiveScheduler {
    const NAME: &'static str = "Adaptive Round Robin";

    fn dispatch(&mut self) -> Result<Option<Segment>> {
        if self.arranged.is_empty() {
            if self.ready.is_empty() {
                return Ok(None);
            }
            self.start_round()?;
        }

        let mut process = self.arranged.pop_front().ok_or(
            SchedulerError::PreconditionViolation("round started with nothing to dispatch"),
        )?;
        let segment = self.ctx.execute(&mut process, self.quantum)?;

        if process.remaining > 0.0 {
            self.ready.push(process);
        }
        Ok(Some(segment))
    }

    fn context(&self) -> &SimContext {
        &self.ctx
    }

    fn into_context(self) -> SimContext {
        self.ctx
    }
}
