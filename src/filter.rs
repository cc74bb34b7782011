use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::search::Mention;

/// Inclusive calendar-date bounds on the mention timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        self.min.is_none_or(|min| date >= min) && self.max.is_none_or(|max| date <= max)
    }
}

/// Reduce the collected mentions to one request per thread.
///
/// Mentions outside the window are dropped, the rest are sorted by time and
/// only the earliest mention of each thread is kept. Mentions outside any
/// thread always survive. Mentions without a sender id (workflow posts) are
/// dropped last.
pub fn filter_mentions(mentions: Vec<Mention>, window: DateWindow) -> Vec<Mention> {
    let mut mentions: Vec<Mention> = mentions
        .into_iter()
        .filter(|m| window.contains(m.timestamp))
        .collect();
    mentions.sort_by_key(|m| m.timestamp);

    let mut seen_threads = HashSet::new();
    mentions
        .into_iter()
        .filter(|m| match m.thread_ts() {
            Some(thread_ts) => seen_threads.insert(thread_ts),
            None => true,
        })
        .filter(|m| m.mentioner_id.is_some())
        .collect()
}
