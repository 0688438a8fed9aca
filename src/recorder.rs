//! Append-only call log shared between test doubles.
//!
//! Each double holds a clone of the same [`CallRecorder`]; after the code
//! under test has run, the log holds every call in the order it happened.
//! Arguments are stored as owned snapshots, so mutating a matrix after a
//! call does not rewrite what was recorded.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::DVector;

use crate::Float;

/// Snapshot of one call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Site(usize),
    Direction(usize),
    Values(Vec<Float>),
}

impl From<&DVector<Float>> for Arg {
    fn from(values: &DVector<Float>) -> Self {
        Arg::Values(values.iter().copied().collect())
    }
}

impl From<&[Float]> for Arg {
    fn from(values: &[Float]) -> Self {
        Arg::Values(values.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub name: &'static str,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    log: Rc<RefCell<Vec<CallRecord>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &'static str, args: Vec<Arg>) {
        self.log.borrow_mut().push(CallRecord { name, args });
    }

    /// Clears the log. Call between independent scenarios sharing a recorder.
    pub fn reset(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.log.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.log.borrow().iter().map(|c| c.name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.log.borrow().iter().filter(|c| c.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn test_records_in_call_order() {
        let recorder = CallRecorder::new();
        recorder.record("first", vec![Arg::Site(3)]);
        recorder.record("second", vec![Arg::Site(4), Arg::Direction(1)]);

        assert_eq!(recorder.names(), vec!["first", "second"]);
        assert_eq!(recorder.calls()[1].args, vec![Arg::Site(4), Arg::Direction(1)]);
        assert_eq!(recorder.count("first"), 1);
    }

    #[test]
    fn test_snapshots_do_not_follow_later_mutation() {
        let recorder = CallRecorder::new();
        let mut live = dvector![1.0, 2.0];
        recorder.record("seen", vec![Arg::from(&live)]);
        live[0] = 99.0;

        assert_eq!(recorder.calls()[0].args, vec![Arg::Values(vec![1.0, 2.0])]);
    }

    #[test]
    fn test_clones_share_one_log_and_reset_clears_it() {
        let recorder = CallRecorder::new();
        let other = recorder.clone();
        other.record("from_clone", Vec::new());
        assert_eq!(recorder.len(), 1);

        recorder.reset();
        assert!(other.is_empty());
    }
}
