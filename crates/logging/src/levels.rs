//! crates/logging/src/levels.rs
//! Debug flag categories and their verbosity levels.

use std::fmt;
use std::str::FromStr;

/// Debug flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DebugFlag {
    /// Signature generation over the basis.
    Genr,
    /// Block matching and delta computation.
    Delta,
    /// Delta emission towards listeners and writers.
    Send,
    /// Reconstruction of the target from a delta.
    Recv,
    /// File and stream I/O.
    Io,
}

impl DebugFlag {
    /// Every flag, in the order used for rendering filter directives.
    pub const ALL: [Self; 5] = [Self::Genr, Self::Delta, Self::Send, Self::Recv, Self::Io];

    /// Returns the flag name accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Genr => "genr",
            Self::Delta => "delta",
            Self::Send => "send",
            Self::Recv => "recv",
            Self::Io => "io",
        }
    }

    /// Returns the tracing target that events for this flag are emitted under.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Genr => "rdelta::genr",
            Self::Delta => "rdelta::delta",
            Self::Send => "rdelta::send",
            Self::Recv => "rdelta::recv",
            Self::Io => "rdelta::io",
        }
    }
}

impl fmt::Display for DebugFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DebugFlag {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| format!("unknown debug flag: {name}"))
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct DebugLevels {
    /// Signature generation level.
    pub genr: u8,
    /// Block matching level.
    pub delta: u8,
    /// Delta emission level.
    pub send: u8,
    /// Reconstruction level.
    pub recv: u8,
    /// I/O level.
    pub io: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Genr => self.genr,
            DebugFlag::Delta => self.delta,
            DebugFlag::Send => self.send,
            DebugFlag::Recv => self.recv,
            DebugFlag::Io => self.io,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Genr => self.genr = level,
            DebugFlag::Delta => self.delta = level,
            DebugFlag::Send => self.send = level,
            DebugFlag::Recv => self.recv = level,
            DebugFlag::Io => self.io = level,
        }
    }
}
