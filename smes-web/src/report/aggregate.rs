//! Per-question frequency aggregation
//!
//! `aggregate` builds a fresh value→count table for one question over the
//! whole response snapshot. Empty values (empty string, empty list) are
//! "no answer" and contribute nothing; a list answer increments one count
//! per element, so for multi-choice questions the table sums to the total
//! number of selected options, not the number of records.

use smes_common::db::ResponseRecord;

/// Mapping from observed answer value to occurrence count.
///
/// Entries keep the insertion order of first observation. No zero-filling:
/// an option nobody selected is absent, not present with count 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a value, inserting it on first observation
    pub fn bump(&mut self, value: &str) {
        match self.entries.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value.to_string(), 1)),
        }
    }

    /// Count for a value; 0 when never observed
    pub fn get(&self, value: &str) -> u64 {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(v, c)| (v.as_str(), *c))
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(v, _)| v.clone()).collect()
    }

    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|(_, c)| *c).collect()
    }
}

/// Tally the answers to one question across all records.
///
/// Pure function of its inputs; rerunning it over an unmodified snapshot
/// yields an identical table.
pub fn aggregate(records: &[ResponseRecord], question_key: &str) -> FrequencyTable {
    let mut table = FrequencyTable::new();

    for record in records {
        let value = match record.answers.get(question_key) {
            Some(v) if !v.is_empty() => v,
            _ => continue,
        };

        for selected in value.as_list() {
            table.bump(selected);
        }
    }

    table
}
