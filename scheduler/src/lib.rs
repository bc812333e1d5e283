//! CPU scheduling simulator.
//!
//! Runs a process list through one scheduling policy at a time and
//! reports the resulting Gantt timeline together with average waiting,
//! turnaround and response times. Besides the classical policies it
//! provides an adaptive round robin whose quantum and dispatch order are
//! recomputed from the ready set every round.

pub mod scheduler;

pub use scheduler::{
    HookAction, Metrics, Policy, ProcessRecord, ProcessTable, RunOutcome, RunReport, Scheduler,
    SchedulerError, Segment, SegmentHook, Timeline,
};
