// src/session.rs

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Work,
    Rest,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Mode::Work => Mode::Rest,
            Mode::Rest => Mode::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Work => "Work",
            Mode::Rest => "Rest",
        }
    }

    /// Message shown once a period of this mode has ended.
    pub fn end_message(self) -> &'static str {
        match self {
            Mode::Work => "Time to rest!",
            Mode::Rest => "Back to work!",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

/**
 * The single running period: its mode, the seconds left and whether it is paused.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub mode: Mode,
    pub remaining: u64,
    pub paused: bool,
}

impl Session {
    pub fn new(mode: Mode, seconds: u64) -> Self {
        Self {
            mode,
            remaining: seconds,
            paused: false,
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn display(&self) -> String {
        format!("{} Time: {}", self.mode.label(), format_clock(self.remaining))
    }
}

pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
