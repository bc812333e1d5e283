use super::Time;

/// Simulated time. Only the engine moves it, and only forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    now: Time,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn advance(&mut self, delta: Time) -> Time {
        debug_assert!(delta >= 0.0, "clock cannot move backwards (delta {delta})");
        self.now += delta.max(0.0);
        self.now
    }

    pub fn advance_to(&mut self, time: Time) -> Time {
        if time > self.now {
            self.now = time;
        }
        self.now
    }
}
