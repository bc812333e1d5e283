use super::{
    baseline::Workload,
    context::SimContext,
    error::{Result, SchedulerError},
    metrics::CompletionTable,
    process::{ProcessRecord, ReadyProcess},
    timeline::Segment,
    Scheduler, Time,
};
use std::collections::VecDeque;

pub struct RoundRobinScheduler {
    queue: VecDeque<ReadyProcess>,
    workload: Workload,
    quantum: Time,
    ctx: SimContext,
}

impl RoundRobinScheduler {
    pub const DEFAULT_QUANTUM: Time = 20.0;

    pub fn new(processes: &[ProcessRecord]) -> Result<Self> {
        RoundRobinScheduler::with_processes(processes, RoundRobinScheduler::DEFAULT_QUANTUM)
    }

    pub fn with_processes(processes: &[ProcessRecord], quantum: Time) -> Result<Self> {
        if !quantum.is_finite() || quantum <= 0.0 {
            return Err(SchedulerError::InvalidQuantum(quantum));
        }

        let snapshot = ReadyProcess::snapshot(processes);
        let ctx = SimContext::new(CompletionTable::for_processes(&snapshot, |p| p.arrival));

        Ok(Self {
            queue: VecDeque::new(),
            workload: Workload::new(snapshot),
            quantum,
            ctx,
        })
    }

    pub fn quantum(&self) -> Time {
        self.quantum
    }
}

impl Scheduler for RoundRobinScheduler {
    const NAME: &'static str = "Round Robin";

    fn dispatch(&mut self) -> Result<Option<Segment>> {
        self.workload.admit(self.ctx.now(), &mut self.queue);
        if self.queue.is_empty() {
            match self.workload.next_arrival() {
                Some(arrival) => {
                    self.ctx.idle_until(arrival);
                    self.workload.admit(self.ctx.now(), &mut self.queue);
                }
                None => return Ok(None),
            }
        }

        let mut process = self.queue.pop_front().ok_or(
            SchedulerError::PreconditionViolation("no ready process after admitting arrivals"),
        )?;
        let segment = self.ctx.execute(&mut process, self.quantum)?;

        // Arrivals during the slice queue up ahead of the preempted process
        self.workload.admit(self.ctx.now(), &mut self.queue);
        if process.remaining > 0.0 {
            self.queue.push_back(process);
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
