//! Start tracking for interval scans.

use crate::domain::Stop;

/// The start of a run that has not yet reached its end.
#[derive(Debug, Clone, Copy, Default)]
pub enum StartCandidate<'a> {
    #[default]
    None,
    Pending {
        stop: &'a Stop,
        is_origin: bool,
        /// Whether the row satisfies the stop and business constraints on its own
        qualifies: bool,
    },
}

impl<'a> StartCandidate<'a> {
    pub fn pending(stop: &'a Stop, is_origin: bool, qualifies: bool) -> Self {
        StartCandidate::Pending {
            stop,
            is_origin,
            qualifies,
        }
    }

    /// Offer a new start row when several rows can start a run.
    ///
    /// The new row replaces the pending one unless the pending one
    /// qualifies and the new one does not.
    pub fn offer(&mut self, stop: &'a Stop, is_origin: bool, qualifies: bool) {
        let keep = matches!(self, StartCandidate::Pending { qualifies: true, .. }) && !qualifies;
        if !keep {
            *self = Self::pending(stop, is_origin, qualifies);
        }
    }

    /// The pending row and whether it is the origin.
    pub fn get(&self) -> Option<(&'a Stop, bool)> {
        match *self {
            StartCandidate::None => None,
            StartCandidate::Pending {
                stop, is_origin, ..
            } => Some((stop, is_origin)),
        }
    }

    pub fn clear(&mut self) {
        *self = StartCandidate::None;
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StartCandidate::Pending { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;

    fn stop(name: &str) -> Stop {
        Stop::new(name, ClockTime::MIDNIGHT, ClockTime::MIDNIGHT)
    }

    fn pending_id(c: &StartCandidate<'_>) -> Option<crate::domain::StopId> {
        c.get().map(|(s, _)| s.id())
    }

    #[test]
    fn transition_table() {
        let (a, b) = (stop("A"), stop("B"));
        // (pending qualifies, new qualifies) -> replaced?
        let cases = [
            (false, false, true),
            (false, true, true),
            (true, true, true),
            (true, false, false),
        ];
        for (prev_q, new_q, replaced) in cases {
            let mut c = StartCandidate::pending(&a, false, prev_q);
            c.offer(&b, false, new_q);
            let expected = if replaced { b.id() } else { a.id() };
            assert_eq!(pending_id(&c), Some(expected), "prev={prev_q} new={new_q}");
        }
    }

    #[test]
    fn empty_always_takes_offer() {
        let a = stop("A");
        let mut c = StartCandidate::default();
        assert!(!c.is_pending());
        c.offer(&a, true, false);
        assert_eq!(c.get().map(|(s, o)| (s.id(), o)), Some((a.id(), true)));
        c.clear();
        assert!(c.get().is_none());
    }
}
