//! Three-way result of sampling the active unit.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Outcome of an active-unit lookup.
///
/// `Absent` and `Unknown` are deliberately separate: the first is a confirmed
/// observation that nothing has focus, the second means the foreground loop
/// never went idle before the deadline and nothing was sampled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Active<H> {
    /// The supplier reported this unit as active.
    Handle(H),
    /// The supplier reported that no unit currently has focus.
    Absent,
    /// The foreground loop did not reach idle within the deadline.
    Unknown,
}

impl<H> Active<H> {
    /// True for `Handle` and `Absent`, false for `Unknown`.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// True if a handle was observed.
    #[must_use]
    pub const fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }

    /// Borrow the observed handle, if any.
    #[must_use]
    pub const fn handle(&self) -> Option<&H> {
        match self {
            Self::Handle(h) => Some(h),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// Take the observed handle, if any.
    #[must_use]
    pub fn into_handle(self) -> Option<H> {
        match self {
            Self::Handle(h) => Some(h),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// Map the handle while preserving `Absent` and `Unknown`.
    pub fn map<U, F>(self, f: F) -> Active<U>
    where
        F: FnOnce(H) -> U,
    {
        match self {
            Self::Handle(h) => Active::Handle(f(h)),
            Self::Absent => Active::Absent,
            Self::Unknown => Active::Unknown,
        }
    }
}

impl<H> From<Option<H>> for Active<H> {
    fn from(value: Option<H>) -> Self {
        match value {
            Some(h) => Self::Handle(h),
            None => Self::Absent,
        }
    }
}

impl<H> Display for Active<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Handle(_) => write!(f, "handle"),
            Self::Absent => write!(f, "absent"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
