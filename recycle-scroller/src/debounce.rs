use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::Error;
use crate::key::{KeyCacheKey, KeyMap};

/// Delay (in milliseconds) used to coalesce bursts of size notifications.
///
/// Accepts a number (`Debounce::from(150u64)`) or a numeric string (`"150".parse()`); fractional
/// strings are truncated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Debounce(u64);

impl Debounce {
    pub const NONE: Self = Self(0);

    pub const fn from_ms(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_ms(self) -> u64 {
        self.0
    }

    pub const fn is_immediate(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Debounce {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl From<u32> for Debounce {
    fn from(ms: u32) -> Self {
        Self(ms as u64)
    }
}

impl FromStr for Debounce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ms) = trimmed.parse::<u64>() {
            return Ok(Self(ms));
        }
        match trimmed.parse::<f64>() {
            Ok(ms) if ms.is_finite() && ms >= 0.0 => Ok(Self(ms as u64)),
            _ => Err(Error::InvalidDebounce(s.to_string())),
        }
    }
}

impl TryFrom<&str> for Debounce {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Debounce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingSize {
    pub(crate) index: usize,
    pub(crate) size: u32,
}

/// Pending measurements keyed by item key.
///
/// A new notification overwrites the previous size for its key and pushes the deadline out to
/// `now + delay`. The timer is reset, never stacked.
#[derive(Clone, Debug)]
pub(crate) struct Debouncer<K> {
    delay: Debounce,
    pending: KeyMap<K, PendingSize>,
    deadline_ms: Option<u64>,
}

impl<K: KeyCacheKey> Debouncer<K> {
    pub(crate) fn new(delay: Debounce) -> Self {
        Self {
            delay,
            pending: KeyMap::new(),
            deadline_ms: None,
        }
    }

    pub(crate) fn set_delay(&mut self, delay: Debounce) {
        self.delay = delay;
    }

    pub(crate) fn delay(&self) -> Debounce {
        self.delay
    }

    pub(crate) fn push(&mut self, key: K, index: usize, size: u32, now_ms: u64) {
        self.pending.insert(key, PendingSize { index, size });
        self.deadline_ms = Some(now_ms.saturating_add(self.delay.as_ms()));
    }

    pub(crate) fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub(crate) fn is_due(&self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) => self.is_pending() && now_ms >= deadline,
            None => false,
        }
    }

    /// Drains the pending sizes when the deadline has passed.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Option<Vec<(K, PendingSize)>> {
        if !self.is_due(now_ms) {
            return None;
        }
        self.deadline_ms = None;
        let pending = core::mem::take(&mut self.pending);
        let mut out: Vec<(K, PendingSize)> = pending.into_iter().collect();
        out.sort_by_key(|(_, p)| p.index);
        Some(out)
    }

    pub(crate) fn cancel(&mut self) {
        self.pending.clear();
        self.deadline_ms = None;
    }
}
