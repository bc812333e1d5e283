use super::{
    clock::SimulationClock,
    error::Result,
    metrics::CompletionTable,
    process::ReadyProcess,
    timeline::{Segment, Timeline},
    Time,
};

/// State owned by a single run: the clock, the Gantt recorder and the
/// completion table. Built fresh for every run and dropped with it.
#[derive(Debug)]
pub struct SimContext {
    clock: SimulationClock,
    timeline: Timeline,
    table: CompletionTable,
}

impl SimContext {
    pub fn new(table: CompletionTable) -> Self {
        Self {
            clock: SimulationClock::new(),
            timeline: Timeline::new(),
            table,
        }
    }

    pub fn now(&self) -> Time {
        self.clock.now()
    }

    pub fn idle_until(&mut self, time: Time) {
        self.clock.advance_to(time);
    }

    /// Runs `process` for `duration` from the current clock, recording the
    /// segment and the first dispatch. Completion is recorded when the
    /// remaining burst reaches zero.
    pub fn execute(&mut self, process: &mut ReadyProcess, duration: Time) -> Result<Segment> {
        let start = self.clock.now();
        self.table.record_dispatch(process.id, start)?;

        let duration = duration.min(process.remaining);
        let end = self.clock.advance(duration);
        process.remaining = if duration >= process.remaining {
            0.0
        } else {
            process.remaining - duration
        };

        let segment = Segment {
            process: process.id,
            start,
            end,
        };
        self.timeline.record(segment);
        log::trace!(
            "process {} ran {:.3}..{:.3}, {:.3} left",
            process.id,
            start,
            end,
            process.remaining
        );

        if process.remaining == 0.0 {
            self.table.record_completion(process.id, end)?;
        }
        Ok(segment)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn table(&self) -> &CompletionTable {
        &self.table
    }

    pub fn into_parts(self) -> (Time, Timeline, CompletionTable) {
        (self.clock.now(), self.timeline, self.table)
    }
}
