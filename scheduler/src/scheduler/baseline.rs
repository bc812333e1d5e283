use super::{
    context::SimContext,
    error::{Result, SchedulerError},
    metrics::CompletionTable,
    process::{ProcessRecord, ReadyProcess},
    timeline::Segment,
    Scheduler, Time,
};
use std::{cmp::Ordering, collections::VecDeque, marker::PhantomData};

/// Arrivals closer than this to the clock count as already arrived.
const ARRIVAL_EPSILON: Time = 1e-9;

/// Shortest slice a preemptive longest-job dispatch may take.
const PREEMPT_UNIT: Time = 1.0;

/// Processes that have not arrived yet, in arrival order.
#[derive(Debug)]
pub(super) struct Workload {
    pending: VecDeque<ReadyProcess>,
}

impl Workload {
    pub(super) fn new(mut processes: Vec<ReadyProcess>) -> Self {
        processes.sort_by(|a, b| a.arrival.total_cmp(&b.arrival).then(a.order.cmp(&b.order)));
        Self {
            pending: processes.into(),
        }
    }

    pub(super) fn admit<E: Extend<ReadyProcess>>(&mut self, now: Time, ready: &mut E) {
        while self
            .pending
            .front()
            .map_or(false, |process| process.arrival <= now + ARRIVAL_EPSILON)
        {
            ready.extend(self.pending.pop_front());
        }
    }

    pub(super) fn next_arrival(&self) -> Option<Time> {
        self.pending.front().map(|process| process.arrival)
    }
}

/// Selection rule of a baseline policy.
pub trait Discipline {
    const NAME: &'static str;
    const PREEMPTIVE_NAME: &'static str;

    /// `Less` means `a` runs before `b`. Ties fall back to arrival and
    /// then input order.
    fn compare(a: &ReadyProcess, b: &ReadyProcess) -> Ordering;

    /// Optional cap on a preemptive slice for `ready[chosen]`.
    fn slice_limit(_ready: &[ReadyProcess], _chosen: usize) -> Option<Time> {
        None
    }
}

pub struct Fcfs;

impl Discipline for Fcfs {
    const NAME: &'static str = "First Come First Served";
    const PREEMPTIVE_NAME: &'static str = "First Come First Served";

    fn compare(a: &ReadyProcess, b: &ReadyProcess) -> Ordering {
        a.arrival.total_cmp(&b.arrival)
    }
}

pub struct ShortestJob;

impl Discipline for ShortestJob {
    const NAME: &'static str = "Shortest Job First";
    const PREEMPTIVE_NAME: &'static str = "Shortest Remaining Time First";

    fn compare(a: &ReadyProcess, b: &ReadyProcess) -> Ordering {
        a.remaining.total_cmp(&b.remaining)
    }
}

pub struct LongestJob;

impl Discipline for LongestJob {
    const NAME: &'static str = "Longest Job First";
    const PREEMPTIVE_NAME: &'static str = "Longest Remaining Time First";

    fn compare(a: &ReadyProcess, b: &ReadyProcess) -> Ordering {
        b.remaining.total_cmp(&a.remaining)
    }

    // Run only until the runner-up becomes the longest job.
    fn slice_limit(ready: &[ReadyProcess], chosen: usize) -> Option<Time> {
        let runner_up = ready
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != chosen)
            .map(|(_, process)| process.remaining)
            .max_by(f64::total_cmp)?;
        Some((ready[chosen].remaining - runner_up).max(PREEMPT_UNIT))
    }
}

pub struct PriorityFirst;

impl Discipline for PriorityFirst {
    const NAME: &'static str = "Priority";
    const PREEMPTIVE_NAME: &'static str = "Preemptive Priority";

    fn compare(a: &ReadyProcess, b: &ReadyProcess) -> Ordering {
        a.priority.cmp(&b.priority)
    }
}

/// Dispatches the best ready process according to `D`. Non-preemptive
/// dispatches run to completion; preemptive ones stop at the next arrival.
pub struct BaselineScheduler<D, const PREEMPTIVE: bool> {
    workload: Workload,
    ready: Vec<ReadyProcess>,
    ctx: SimContext,
    discipline: PhantomData<D>,
}

pub type FcfsScheduler = BaselineScheduler<Fcfs, false>;
pub type SjfNonPreemptiveScheduler = BaselineScheduler<ShortestJob, false>;
pub type SjfPreemptiveScheduler = BaselineScheduler<ShortestJob, true>;
pub type LjfNonPreemptiveScheduler = BaselineScheduler<LongestJob, false>;
pub type LjfPreemptiveScheduler = BaselineScheduler<LongestJob, true>;
pub type PriorityNonPreemptiveScheduler = BaselineScheduler<PriorityFirst, false>;
pub type PriorityPreemptiveScheduler = BaselineScheduler<PriorityFirst, true>;

impl<D: Discipline, const PREEMPTIVE: bool> BaselineScheduler<D, PREEMPTIVE> {
    pub fn with_processes(processes: &[ProcessRecord]) -> Self {
        let snapshot = ReadyProcess::snapshot(processes);
        let ctx = SimContext::new(CompletionTable::for_processes(&snapshot, |p| p.arrival));

        Self {
            workload: Workload::new(snapshot),
            ready: Vec::new(),
            ctx,
            discipline: PhantomData,
        }
    }

    fn poll_process(&self) -> Option<usize> {
        self.ready
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                D::compare(a, b)
                    .then(a.arrival.total_cmp(&b.arrival))
                    .then(a.order.cmp(&b.order))
            })
            .map(|(index, _)| index)
    }

    fn slice(&self, chosen: usize) -> Time {
        let process = &self.ready[chosen];
        if !PREEMPTIVE {
            return process.remaining;
        }

        let mut slice = process.remaining;
        if let Some(arrival) = self.workload.next_arrival() {
            slice = slice.min(arrival - self.ctx.now());
        }
        if let Some(limit) = D::slice_limit(&self.ready, chosen) {
            slice = slice.min(limit);
        }
        slice
    }
}

impl<D: Discipline, const PREEMPTIVE: bool> Scheduler for BaselineScheduler<D, PREEMPTIVE> {
    const NAME: &'static str = if PREEMPTIVE {
        D::PREEMPTIVE_NAME
    } else {
        D::NAME
    };

    fn dispatch(&mut self) -> Result<Option<Segment>> {
        self.workload.admit(self.ctx.now(), &mut self.ready);
        if self.ready.is_empty() {
            match self.workload.next_arrival() {
                Some(arrival) => {
                    self.ctx.idle_until(arrival);
                    self.workload.admit(self.ctx.now(), &mut self.ready);
                }
                None => return Ok(None),
            }
        }

        let chosen = self.poll_process().ok_or(SchedulerError::PreconditionViolation(
            "no ready process after admitting arrivals",
        ))?;
        let slice = self.slice(chosen);
        let mut process = self.ready.swap_remove(chosen);
        let segment = self.ctx.execute(&mut process, slice)?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::process::ProcessId;

    fn run<S: Scheduler>(mut scheduler: S) -> (Vec<(ProcessId, Time, Time)>, S) {
        let mut segments = Vec::new();
        while let Some(s) = scheduler.dispatch().unwrap() {
            segments.push((s.process, s.start, s.end));
        }
        (segments, scheduler)
    }

    fn workload() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord::with_priority(1, 8.0, 0.0, 3),
            ProcessRecord::with_priority(2, 4.0, 1.0, 1),
            ProcessRecord::with_priority(3, 2.0, 2.0, 2),
        ]
    }

    #[test]
    fn fcfs_runs_in_arrival_order() {
        let records = vec![
            ProcessRecord::with_arrival(1, 3.0, 5.0),
            ProcessRecord::with_arrival(2, 2.0, 0.0),
        ];
        let (segments, scheduler) = run(FcfsScheduler::with_processes(&records));
        // idle between 2 and 5
        assert_eq!(segments, vec![(2, 0.0, 2.0), (1, 5.0, 8.0)]);

        let metrics = scheduler.context().table().process_metrics();
        assert_eq!(metrics[0].turnaround, 3.0);
        assert_eq!(metrics[0].waiting, 0.0);
    }

    #[test]
    fn sjf_non_preemptive_picks_shortest_arrived() {
        let (segments, _) = run(SjfNonPreemptiveScheduler::with_processes(&workload()));
        assert_eq!(segments, vec![(1, 0.0, 8.0), (3, 8.0, 10.0), (2, 10.0, 14.0)]);
    }

    #[test]
    fn sjf_preemptive_switches_on_arrival() {
        let (segments, scheduler) = run(SjfPreemptiveScheduler::with_processes(&workload()));
        assert_eq!(
            segments,
            vec![
                (1, 0.0, 1.0),
                (2, 1.0, 2.0),
                (3, 2.0, 4.0),
                (2, 4.0, 7.0),
                (1, 7.0, 14.0),
            ]
        );

        let metrics = scheduler.context().table().process_metrics();
        let response: Vec<Time> = metrics.iter().map(|m| m.response).collect();
        assert_eq!(response, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn ljf_non_preemptive_picks_longest_arrived() {
        let records = vec![
            ProcessRecord::with_arrival(1, 2.0, 0.0),
            ProcessRecord::with_arrival(2, 3.0, 1.0),
            ProcessRecord::with_arrival(3, 5.0, 1.0),
        ];
        let (segments, _) = run(LjfNonPreemptiveScheduler::with_processes(&records));
        assert_eq!(segments, vec![(1, 0.0, 2.0), (3, 2.0, 7.0), (2, 7.0, 10.0)]);
    }

    #[test]
    fn ljf_preemptive_alternates_equal_jobs() {
        let records = vec![ProcessRecord::new(1, 4.0), ProcessRecord::new(2, 2.0)];
        let (segments, _) = run(LjfPreemptiveScheduler::with_processes(&records));
        assert_eq!(
            segments,
            vec![(1, 0.0, 2.0), (1, 2.0, 3.0), (2, 3.0, 4.0), (1, 4.0, 5.0), (2, 5.0, 6.0)]
        );
    }

    #[test]
    fn priority_variants_prefer_lower_values() {
        let (segments, _) = run(PriorityNonPreemptiveScheduler::with_processes(&workload()));
        assert_eq!(segments, vec![(1, 0.0, 8.0), (2, 8.0, 12.0), (3, 12.0, 14.0)]);

        let (segments, _) = run(PriorityPreemptiveScheduler::with_processes(&workload()));
        assert_eq!(
            segments,
            vec![(1, 0.0, 1.0), (2, 1.0, 2.0), (2, 2.0, 5.0), (3, 5.0, 7.0), (1, 7.0, 14.0)]
        );
    }

    #[test]
    fn names_follow_preemption() {
        assert_eq!(SjfNonPreemptiveScheduler::NAME, "Shortest Job First");
        assert_eq!(SjfPreemptiveScheduler::NAME, "Shortest Remaining Time First");
    }
}
