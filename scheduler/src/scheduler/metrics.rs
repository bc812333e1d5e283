use super::{
    error::{Result, SchedulerError},
    process::{ProcessId, ReadyProcess},
    Time,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    arrival: Time,
    burst: Time,
    first_dispatch: Option<Time>,
    completion: Option<Time>,
}

/// Completion, first-dispatch and arrival data keyed by process id.
/// Every id of the run has an entry from the start; `None` marks data
/// that was never produced.
#[derive(Debug, Clone, Default)]
pub struct CompletionTable {
    entries: BTreeMap<ProcessId, Entry>,
}

impl CompletionTable {
    /// `arrival_of` gives the arrival the policy measures times against.
    pub fn for_processes(
        processes: &[ReadyProcess],
        arrival_of: impl Fn(&ReadyProcess) -> Time,
    ) -> Self {
        let entries = processes
            .iter()
            .map(|process| {
                (
                    process.id,
                    Entry {
                        arrival: arrival_of(process),
                        burst: process.burst,
                        first_dispatch: None,
                        completion: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    fn entry_mut(&mut self, id: ProcessId) -> Result<&mut Entry> {
        self.entries
            .get_mut(&id)
            .ok_or(SchedulerError::PreconditionViolation(
                "dispatched a process missing from the completion table",
            ))
    }

    /// Records `time` as the first dispatch of `id`; later calls are ignored.
    pub fn record_dispatch(&mut self, id: ProcessId, time: Time) -> Result<()> {
        let entry = self.entry_mut(id)?;
        entry.first_dispatch.get_or_insert(time);
        Ok(())
    }

    pub fn record_completion(&mut self, id: ProcessId, time: Time) -> Result<()> {
        let entry = self.entry_mut(id)?;
        if entry.completion.is_some() {
            return Err(SchedulerError::PreconditionViolation(
                "process completed twice",
            ));
        }
        entry.completion = Some(time);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.completion.is_some())
            .count()
    }

    pub fn process_metrics(&self) -> Vec<ProcessMetrics> {
        self.entries
            .iter()
            .filter_map(|(&id, entry)| {
                let completion = entry.completion?;
                let first_dispatch = entry.first_dispatch?;
                let turnaround = completion - entry.arrival;
                Some(ProcessMetrics {
                    id,
                    completion,
                    turnaround,
                    waiting: turnaround - entry.burst,
                    response: first_dispatch - entry.arrival,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub id: ProcessId,
    pub completion: Time,
    pub turnaround: Time,
    pub waiting: Time,
    pub response: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub avg_waiting: Time,
    pub avg_turnaround: Time,
    pub avg_response: Time,
    pub total_completion_time: Time,
    pub completed: usize,
}

pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Averages waiting, turnaround and response over the completed
    /// processes. Fails when none completed.
    pub fn aggregate(processes: &[ProcessMetrics], total_completion_time: Time) -> Result<Metrics> {
        if processes.is_empty() {
            return Err(SchedulerError::NoCompletedProcesses);
        }

        let count = processes.len() as f64;
        let mean = |field: fn(&ProcessMetrics) -> Time| {
            processes.iter().map(field).sum::<Time>() / count
        };

        Ok(Metrics {
            avg_waiting: mean(|p| p.waiting),
            avg_turnaround: mean(|p| p.turnaround),
            avg_response: mean(|p| p.response),
            total_completion_time,
            completed: processes.len(),
        })
    }
}
