use super::{process::ProcessId, Time};
use serde::{Deserialize, Serialize};

/// One executed interval of a process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub process: ProcessId,
    pub start: Time,
    pub end: Time,
}

impl Segment {
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

/// Gantt sequence of a run, in execution order. Segments are never
/// reordered or merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn record(&mut self, segment: Segment) {
        debug_assert!(segment.end >= segment.start);
        debug_assert!(
            self.segments
                .last()
                .map_or(true, |last| segment.start >= last.end),
            "segment for process {} starts before the previous one ends",
            segment.process
        );
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn for_process(&self, id: ProcessId) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |segment| segment.process == id)
    }

    pub fn service(&self, id: ProcessId) -> Time {
        self.for_process(id).map(Segment::duration).sum()
    }

    pub fn end(&self) -> Time {
        self.segments.last().map_or(0.0, |segment| segment.end)
    }
}
