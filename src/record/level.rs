//! Log severity levels.

use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

/// Severity of a record.
///
/// Levels are plain integers so that intermediate severities (`INFO+2`) are
/// expressible. The named levels are spaced four apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// Parse a level name, a signed integer, or the display form of an
    /// intermediate level (`INFO+2`, `debug-1`).
    ///
    /// `fatal` maps to `ERROR`; an empty string maps to `INFO`.
    pub fn parse(s: &str) -> Result<Self, LogError> {
        let lower = s.trim().to_lowercase();
        if let Some(level) = Self::named(&lower) {
            return Ok(level);
        }
        if let Ok(n) = lower.parse::<i32>() {
            return Ok(Level(n));
        }
        lower
            .find(['+', '-'])
            .filter(|&at| at > 0)
            .and_then(|at| {
                let base = Self::named(&lower[..at])?;
                let offset = lower[at..].parse::<i32>().ok()?;
                base.0.checked_add(offset).map(Level)
            })
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }

    fn named(name: &str) -> Option<Self> {
        match name {
            "debug" => Some(Self::DEBUG),
            "info" | "" => Some(Self::INFO),
            "warn" | "warning" => Some(Self::WARN),
            "error" | "err" | "fatal" => Some(Self::ERROR),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = if self.0 < Self::INFO.0 {
            ("DEBUG", Self::DEBUG.0)
        } else if self.0 < Self::WARN.0 {
            ("INFO", Self::INFO.0)
        } else if self.0 < Self::ERROR.0 {
            ("WARN", Self::WARN.0)
        } else {
            ("ERROR", Self::ERROR.0)
        };

        let offset = self.0 - base;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{}{:+}", name, offset)
        }
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse(s)
    }
}
