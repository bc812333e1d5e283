mod adaptive;
mod baseline;
mod clock;
mod config;
mod context;
mod display;
mod error;
mod metrics;
mod process;
mod quantum;
mod rank;
mod round_robin;
mod runner;
mod timeline;

use std::time::Duration;

pub use adaptive::{AdaptiveScheduler, RankedEntry, RoundSummary};
pub use baseline::{
    BaselineScheduler, Discipline, FcfsScheduler, Fcfs, LjfNonPreemptiveScheduler,
    LjfPreemptiveScheduler, LongestJob, PriorityNonPreemptiveScheduler,
    PriorityPreemptiveScheduler, PriorityFirst, ShortestJob, SjfNonPreemptiveScheduler,
    SjfPreemptiveScheduler,
};
pub use clock::SimulationClock;
pub use config::{parse_process_list, Config, OutputFormat};
pub use context::SimContext;
pub use display::DisplayTerminal;
pub use error::{Result, SchedulerError};
pub use metrics::{CompletionTable, Metrics, MetricsAggregator, ProcessMetrics};
pub use process::{validate, ProcessId, ProcessRecord, ProcessTable, ReadyProcess};
pub use quantum::AdaptiveQuantumPolicy;
pub use rank::RankCalculator;
pub use round_robin::RoundRobinScheduler;
pub use runner::{HookAction, Policy, ProcessRunner, RunOutcome, RunReport, SegmentHook};
pub use timeline::{Segment, Timeline};

/// Simulated time units.
pub type Time = f64;

const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(500);

/// A scheduling policy driven one dispatch at a time.
pub trait Scheduler {
    const NAME: &'static str;

    /// Performs the next dispatch and returns its segment, or `None` once
    /// every process has completed.
    fn dispatch(&mut self) -> Result<Option<Segment>>;
    fn context(&self) -> &SimContext;
    fn into_context(self) -> SimContext;
}
