use super::{
    error::{Result, SchedulerError},
    Time,
};
use serde::{Deserialize, Serialize};

pub type ProcessId = u32;

/// Input attributes of a simulated process. Never mutated by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    id: ProcessId,
    burst_time: Time,
    arrival_time: Time,
    priority: i32,
}

impl ProcessRecord {
    const DEFAULT_PRIORITY: i32 = 0;

    pub fn new(id: ProcessId, burst_time: Time) -> Self {
        ProcessRecord::with_arrival(id, burst_time, 0.0)
    }

    pub fn with_arrival(id: ProcessId, burst_time: Time, arrival_time: Time) -> Self {
        ProcessRecord::with_priority(id, burst_time, arrival_time, ProcessRecord::DEFAULT_PRIORITY)
    }

    pub fn with_priority(
        id: ProcessId,
        burst_time: Time,
        arrival_time: Time,
        priority: i32,
    ) -> Self {
        Self {
            id,
            burst_time,
            arrival_time,
            priority,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn burst_time(&self) -> Time {
        self.burst_time
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Checks the run boundary: non-empty, positive unique ids, finite
/// non-negative burst and arrival times.
pub fn validate(processes: &[ProcessRecord]) -> Result<()> {
    if processes.is_empty() {
        return Err(SchedulerError::EmptyProcessList);
    }

    let mut seen = std::collections::HashSet::with_capacity(processes.len());
    for process in processes {
        if process.id == 0 {
            return Err(SchedulerError::InvalidId(process.id));
        }
        if !seen.insert(process.id) {
            return Err(SchedulerError::DuplicateId(process.id));
        }
        if !process.burst_time.is_finite() || process.burst_time < 0.0 {
            return Err(SchedulerError::InvalidBurst {
                id: process.id,
                value: process.burst_time,
            });
        }
        if !process.arrival_time.is_finite() || process.arrival_time < 0.0 {
            return Err(SchedulerError::InvalidArrival {
                id: process.id,
                value: process.arrival_time,
            });
        }
    }
    Ok(())
}

/// Per-run working copy of a process: remaining burst plus the ranking
/// fields the adaptive policy recomputes every round.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadyProcess {
    pub id: ProcessId,
    pub burst: Time,
    pub remaining: Time,
    pub arrival: Time,
    pub priority: i32,
    pub order: usize,
    pub burst_rank: usize,
    pub score: f64,
    pub score_rank: usize,
}

impl ReadyProcess {
    pub fn snapshot(processes: &[ProcessRecord]) -> Vec<ReadyProcess> {
        processes
            .iter()
            .enumerate()
            .map(|(order, process)| ReadyProcess {
                id: process.id,
                burst: process.burst_time,
                remaining: process.burst_time,
                arrival: process.arrival_time,
                priority: process.priority,
                order,
                burst_rank: 0,
                score: 0.0,
                score_rank: 0,
            })
            .collect()
    }
}

/// The process list a run is built from. Ids are handed out 1-based and
/// are never reused, even after a removal.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: Vec<ProcessRecord>,
    last_id: ProcessId,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ten-process workload used when no input file is given.
    pub fn sample() -> Self {
        let processes: Vec<ProcessRecord> = [
            (80.0, 0.0),
            (60.0, 20.0),
            (65.0, 40.0),
            (120.0, 60.0),
            (30.0, 80.0),
            (90.0, 90.0),
            (25.0, 120.0),
            (40.0, 240.0),
            (90.0, 260.0),
            (75.0, 380.0),
        ]
        .into_iter()
        .zip(1..)
        .map(|((burst, arrival), id)| {
            ProcessRecord::with_priority(id, burst, arrival, id as i32)
        })
        .collect();

        Self {
            last_id: processes.len() as ProcessId,
            processes,
        }
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn add_process(
        &mut self,
        burst_time: Time,
        arrival_time: Time,
        priority: i32,
    ) -> Result<ProcessId> {
        let id = self
            .last_id
            .checked_add(1)
            .ok_or(SchedulerError::IdsExhausted)?;
        self.last_id = id;
        self.processes.push(ProcessRecord::with_priority(
            id,
            burst_time,
            arrival_time,
            priority,
        ));
        Ok(id)
    }

    /// Inserts a record that already carries an id, keeping later
    /// `add_process` ids above it.
    pub fn insert(&mut self, record: ProcessRecord) -> Result<()> {
        if record.id == 0 {
            return Err(SchedulerError::InvalidId(record.id));
        }
        if self.processes.iter().any(|process| process.id == record.id) {
            return Err(SchedulerError::DuplicateId(record.id));
        }
        self.last_id = self.last_id.max(record.id);
        self.processes.push(record);
        Ok(())
    }

    pub fn edit_process(
        &mut self,
        id: ProcessId,
        burst_time: Time,
        arrival_time: Time,
        priority: i32,
    ) -> Result<()> {
        let process = self
            .processes
            .iter_mut()
            .find(|process| process.id == id)
            .ok_or(SchedulerError::UnknownProcess(id))?;

        process.burst_time = burst_time;
        process.arrival_time = arrival_time;
        process.priority = priority;
        Ok(())
    }

    pub fn remove_process(&mut self, id: ProcessId) -> Option<ProcessRecord> {
        self.processes
            .iter()
            .position(|process| process.id == id)
            .map(|index| self.processes.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut table = ProcessTable::new();
        let first = table.add_process(10.0, 0.0, 1).unwrap();
        let second = table.add_process(20.0, 0.0, 2).unwrap();
        assert_eq!((first, second), (1, 2));

        assert!(table.remove_process(second).is_some());
        assert_eq!(table.add_process(5.0, 0.0, 1).unwrap(), 3);
        assert!(table.remove_process(42).is_none());
    }

    #[test]
    fn edit_updates_attributes_in_place() {
        let mut table = ProcessTable::sample();
        table.edit_process(2, 70.0, 25.0, 2).unwrap();

        let edited = &table.processes()[1];
        assert_eq!(edited.id(), 2);
        assert_eq!(edited.burst_time(), 70.0);
        assert_eq!(edited.arrival_time(), 25.0);
        assert!(matches!(
            table.edit_process(99, 1.0, 0.0, 0),
            Err(SchedulerError::UnknownProcess(99))
        ));
    }

    #[test]
    fn insert_keeps_generated_ids_above_explicit_ones() {
        let mut table = ProcessTable::new();
        table.insert(ProcessRecord::new(7, 3.0)).unwrap();
        assert_eq!(table.add_process(1.0, 0.0, 0).unwrap(), 8);
        assert!(matches!(
            table.insert(ProcessRecord::new(7, 1.0)),
            Err(SchedulerError::DuplicateId(7))
        ));
    }

    #[test]
    fn largest_id_is_accepted_but_ends_generation() {
        let mut table = ProcessTable::new();
        table.insert(ProcessRecord::new(ProcessId::MAX, 5.0)).unwrap();
        assert_eq!(table.len(), 1);
        assert!(validate(table.processes()).is_ok());

        assert!(matches!(
            table.add_process(1.0, 0.0, 0),
            Err(SchedulerError::IdsExhausted)
        ));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn validation_rejects_malformed_input() {
        assert!(matches!(validate(&[]), Err(SchedulerError::EmptyProcessList)));
        assert!(matches!(
            validate(&[ProcessRecord::new(1, 5.0), ProcessRecord::new(1, 6.0)]),
            Err(SchedulerError::DuplicateId(1))
        ));
        assert!(matches!(
            validate(&[ProcessRecord::new(0, 5.0)]),
            Err(SchedulerError::InvalidId(0))
        ));
        assert!(matches!(
            validate(&[ProcessRecord::new(3, -1.0)]),
            Err(SchedulerError::InvalidBurst { id: 3, .. })
        ));
        assert!(matches!(
            validate(&[ProcessRecord::with_arrival(4, 1.0, f64::NAN)]),
            Err(SchedulerError::InvalidArrival { id: 4, .. })
        ));
        assert!(validate(ProcessTable::sample().processes()).is_ok());
    }
}
