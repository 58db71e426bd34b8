//! Staged progress shown while the single request is outstanding.
//!
//! The backend reports no progress; stages advance on a fixed clock and the
//! last one holds until the response arrives.

use std::time::Duration;

pub const STAGES: [&str; 4] = [
    "Validating data...",
    "Detecting drift...",
    "Analyzing impact...",
    "Generating diagnosis...",
];

pub const STAGE_INTERVAL: Duration = Duration::from_secs(1);
pub const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingView {
    pub ticks: u64,
}

impl LoadingView {
    pub fn at_elapsed(elapsed: Duration) -> Self {
        Self {
            ticks: (elapsed.as_millis() / STAGE_INTERVAL.as_millis()) as u64,
        }
    }

    pub fn active_stage(&self) -> usize {
        (self.ticks as usize).min(STAGES.len() - 1)
    }

    pub fn stages(&self) -> impl Iterator<Item = (&'static str, StageState)> + '_ {
        let active = self.active_stage();
        STAGES.iter().enumerate().map(move |(i, text)| {
            let state = if i < active {
                StageState::Done
            } else if i == active {
                StageState::Active
            } else {
                StageState::Pending
            };
            (*text, state)
        })
    }

    pub fn spinner(&self) -> char {
        SPINNER[(self.ticks % SPINNER.len() as u64) as usize]
    }
}
