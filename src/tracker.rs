use std::collections::HashMap;

use crate::scraper::{Observation, SeatStatus};

/// Last-known status per watched CRN. Empty at startup; every cycle replaces
/// it wholesale with the new snapshot's statuses.
pub type CourseStatus = HashMap<String, SeatStatus>;

#[derive(Debug, Clone)]
pub struct Diff {
    /// CRNs that went from full (or missing) to open this cycle, sorted.
    pub opened: Vec<String>,
    pub updated: CourseStatus,
}

/// Pure comparison of the previous cycle's statuses against a fresh
/// snapshot. A CRN with no prior entry (first cycle) never alerts: the user
/// asked to hear about changes, not about courses that were already open
/// when the watcher started. `notify_repeat` restores alert-every-cycle
/// behavior for open courses.
pub fn diff(
    previous: &CourseStatus,
    snapshot: &HashMap<String, Observation>,
    notify_repeat: bool,
) -> Diff {
    let mut opened = Vec::new();
    let mut updated = CourseStatus::with_capacity(snapshot.len());

    for (crn, observation) in snapshot {
        if observation.status.is_open() {
            let newly_open = matches!(
                previous.get(crn),
                Some(SeatStatus::Closed) | Some(SeatStatus::NotFound)
            );
            if newly_open || notify_repeat {
                opened.push(crn.clone());
            }
        }
        updated.insert(crn.clone(), observation.status.clone());
    }

    opened.sort();
    Diff { opened, updated }
}
