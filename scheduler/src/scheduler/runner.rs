use super::{
    adaptive::AdaptiveScheduler,
    baseline::{
        FcfsScheduler, LjfNonPreemptiveScheduler, LjfPreemptiveScheduler,
        PriorityNonPreemptiveScheduler, PriorityPreemptiveScheduler, SjfNonPreemptiveScheduler,
        SjfPreemptiveScheduler,
    },
    error::{Result, SchedulerError},
    metrics::{Metrics, MetricsAggregator, ProcessMetrics},
    process::{self, ProcessRecord},
    round_robin::RoundRobinScheduler,
    timeline::{Segment, Timeline},
    Scheduler, Time,
};
use serde::Serialize;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    Cancel,
}

/// Observer called once per dispatched segment, in chronological order.
/// Returning `Cancel` stops the run after that segment.
pub trait SegmentHook {
    fn on_segment(&mut self, segment: &Segment, live: bool) -> HookAction;
}

struct NoHook;

impl SegmentHook for NoHook {
    fn on_segment(&mut self, _segment: &Segment, _live: bool) -> HookAction {
        HookAction::Continue
    }
}

impl<F> SegmentHook for F
where
    F: FnMut(&Segment, bool) -> HookAction,
{
    fn on_segment(&mut self, segment: &Segment, live: bool) -> HookAction {
        self(segment, live)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub policy: &'static str,
    pub timeline: Timeline,
    pub processes: Vec<ProcessMetrics>,
    pub metrics: Option<Metrics>,
}

/// Result of a run. A cancelled run is never reported as complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum RunOutcome {
    Complete(RunReport),
    Incomplete(RunReport),
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, RunOutcome::Complete(_))
    }

    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Complete(report) | RunOutcome::Incomplete(report) => report,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.report().timeline
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        self.report().metrics.as_ref()
    }
}

/// Drives a scheduler to the end of its workload.
pub struct ProcessRunner<S> {
    scheduler: S,
    live: bool,
}

impl<S: Scheduler> ProcessRunner<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            live: false,
        }
    }

    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn run(self) -> Result<RunOutcome> {
        self.run_with(&mut NoHook)
    }

    pub fn run_with(mut self, hook: &mut dyn SegmentHook) -> Result<RunOutcome> {
        log::info!(
            "{}: scheduling {} processes",
            S::NAME,
            self.scheduler.context().table().len()
        );

        let mut cancelled = false;
        while let Some(segment) = self.scheduler.dispatch()? {
            if hook.on_segment(&segment, self.live) == HookAction::Cancel {
                log::warn!(
                    "{}: cancelled at {:.3} after {} segments",
                    S::NAME,
                    segment.end,
                    self.scheduler.context().timeline().len()
                );
                cancelled = true;
                break;
            }
        }

        let (total_completion_time, timeline, table) = self.scheduler.into_context().into_parts();
        let processes = table.process_metrics();
        let metrics = match MetricsAggregator::aggregate(&processes, total_completion_time) {
            Ok(metrics) => Some(metrics),
            Err(SchedulerError::NoCompletedProcesses) if cancelled => None,
            Err(err) => return Err(err),
        };

        let report = RunReport {
            policy: S::NAME,
            timeline,
            processes,
            metrics,
        };
        if cancelled {
            return Ok(RunOutcome::Incomplete(report));
        }

        log::info!(
            "{}: finished at {:.3}, {} segments",
            S::NAME,
            total_completion_time,
            report.timeline.len()
        );
        Ok(RunOutcome::Complete(report))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    Fcfs,
    SjfNonPreemptive,
    SjfPreemptive,
    LjfNonPreemptive,
    LjfPreemptive,
    PriorityNonPreemptive,
    PriorityPreemptive,
    RoundRobin { quantum: Time },
    Adaptive,
}

impl Policy {
    pub fn all(quantum: Time) -> [Policy; 9] {
        [
            Policy::Fcfs,
            Policy::SjfNonPreemptive,
            Policy::SjfPreemptive,
            Policy::LjfNonPreemptive,
            Policy::LjfPreemptive,
            Policy::PriorityNonPreemptive,
            Policy::PriorityPreemptive,
            Policy::RoundRobin { quantum },
            Policy::Adaptive,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => FcfsScheduler::NAME,
            Policy::SjfNonPreemptive => SjfNonPreemptiveScheduler::NAME,
            Policy::SjfPreemptive => SjfPreemptiveScheduler::NAME,
            Policy::LjfNonPreemptive => LjfNonPreemptiveScheduler::NAME,
            Policy::LjfPreemptive => LjfPreemptiveScheduler::NAME,
            Policy::PriorityNonPreemptive => PriorityNonPreemptiveScheduler::NAME,
            Policy::PriorityPreemptive => PriorityPreemptiveScheduler::NAME,
            Policy::RoundRobin { .. } => RoundRobinScheduler::NAME,
            Policy::Adaptive => AdaptiveScheduler::NAME,
        }
    }

    /// Validates `processes` and runs this policy over a private copy.
    pub fn run(&self, processes: &[ProcessRecord]) -> Result<RunOutcome> {
        self.run_with(processes, &mut NoHook, false)
    }

    pub fn run_with(
        &self,
        processes: &[ProcessRecord],
        hook: &mut dyn SegmentHook,
        live: bool,
    ) -> Result<RunOutcome> {
        process::validate(processes)?;

        match *self {
            Policy::Fcfs => drive(FcfsScheduler::with_processes(processes), hook, live),
            Policy::SjfNonPreemptive => {
                drive(SjfNonPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::SjfPreemptive => {
                drive(SjfPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::LjfNonPreemptive => {
                drive(LjfNonPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::LjfPreemptive => {
                drive(LjfPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::PriorityNonPreemptive => {
                drive(PriorityNonPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::PriorityPreemptive => {
                drive(PriorityPreemptiveScheduler::with_processes(processes), hook, live)
            }
            Policy::RoundRobin { quantum } => drive(
                RoundRobinScheduler::with_processes(processes, quantum)?,
                hook,
                live,
            ),
            Policy::Adaptive => drive(AdaptiveScheduler::with_processes(processes), hook, live),
        }
    }
}

fn drive<S: Scheduler>(scheduler: S, hook: &mut dyn SegmentHook, live: bool) -> Result<RunOutcome> {
    ProcessRunner::new(scheduler).live(live).run_with(hook)
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "{} (quantum {})", self.name(), quantum),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for Policy {
    type Err = SchedulerError;

    /// Parses a policy name; round robin gets the default quantum.
    fn from_str(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "fcfs" => Policy::Fcfs,
            "sjf" => Policy::SjfNonPreemptive,
            "sjf-preemptive" | "srtf" => Policy::SjfPreemptive,
            "ljf" => Policy::LjfNonPreemptive,
            "ljf-preemptive" | "lrtf" => Policy::LjfPreemptive,
            "priority" => Policy::PriorityNonPreemptive,
            "priority-preemptive" => Policy::PriorityPreemptive,
            "round-robin" | "rr" => Policy::RoundRobin {
                quantum: RoundRobinScheduler::DEFAULT_QUANTUM,
            },
            "adaptive" => Policy::Adaptive,
            other => {
                return Err(SchedulerError::InvalidInput(format!(
                    "unknown policy `{other}`"
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::process::ProcessTable;

    #[test]
    fn complete_run_has_metrics() {
        let outcome = Policy::Adaptive.run(ProcessTable::sample().processes()).unwrap();
        assert!(outcome.is_complete());

        let metrics = outcome.metrics().unwrap();
        assert_eq!(metrics.completed, 10);
        assert!((metrics.total_completion_time - 675.0).abs() < 1e-9);
        assert_eq!(outcome.report().policy, "Adaptive Round Robin");
    }

    #[test]
    fn cancelling_on_first_segment_yields_one_segment() {
        // Round one quantum is sqrt(67.5 * 120) = 90, so process 1 (burst 80)
        // completes inside the first segment.
        let mut hook = |_: &Segment, _: bool| HookAction::Cancel;
        let outcome = Policy::Adaptive
            .run_with(ProcessTable::sample().processes(), &mut hook, true)
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.timeline().len(), 1);
        assert_eq!(outcome.metrics().unwrap().completed, 1);
        assert_eq!(outcome.report().processes[0].id, 1);
    }

    #[test]
    fn cancelling_before_any_completion_has_no_metrics() {
        // Quantum sqrt(50.5 * 100) ~ 71 cuts process 1, which scores lowest.
        let records = vec![
            ProcessRecord::with_priority(1, 100.0, 0.0, 1),
            ProcessRecord::with_priority(2, 1.0, 0.0, 5),
        ];
        let mut hook = |_: &Segment, _: bool| HookAction::Cancel;
        let outcome = Policy::Adaptive.run_with(&records, &mut hook, false).unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.timeline().segments()[0].process, 1);
        assert!(outcome.report().processes.is_empty());
        assert!(outcome.metrics().is_none());
    }

    #[test]
    fn partial_metrics_cover_completed_processes() {
        let records = vec![ProcessRecord::new(1, 1.0), ProcessRecord::new(2, 10.0)];
        let mut seen = 0;
        let mut hook = |_: &Segment, _: bool| {
            seen += 1;
            HookAction::Cancel
        };
        let outcome = Policy::Fcfs.run_with(&records, &mut hook, false).unwrap();

        assert_eq!(seen, 1);
        let report = outcome.report();
        assert_eq!(report.processes.len(), 1);
        assert_eq!(report.metrics.unwrap().completed, 1);
    }

    #[test]
    fn hook_sees_every_segment_in_order() {
        let mut ends = Vec::new();
        let mut hook = |segment: &Segment, live: bool| {
            assert!(!live);
            ends.push(segment.end);
            HookAction::Continue
        };
        let outcome = Policy::RoundRobin { quantum: 25.0 }
            .run_with(ProcessTable::sample().processes(), &mut hook, false)
            .unwrap();

        let recorded: Vec<Time> = outcome.timeline().segments().iter().map(|s| s.end).collect();
        assert_eq!(ends, recorded);
    }

    #[test]
    fn invalid_input_is_rejected_before_running() {
        let err = Policy::Adaptive.run(&[]).unwrap_err();
        assert!(err.is_invalid_input());

        let err = Policy::RoundRobin { quantum: -1.0 }
            .run(ProcessTable::sample().processes())
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidQuantum(_)));
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("adaptive".parse::<Policy>().unwrap(), Policy::Adaptive);
        assert_eq!("SRTF".parse::<Policy>().unwrap(), Policy::SjfPreemptive);
        assert!(matches!(
            "rr".parse::<Policy>().unwrap(),
            Policy::RoundRobin { quantum } if quantum == 20.0
        ));
        assert!("lottery".parse::<Policy>().is_err());
    }
}
