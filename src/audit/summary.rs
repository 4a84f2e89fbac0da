use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Serialize;

use super::types::DropRecord;

const TOP_REASONS: usize = 5;
const TOP_STATES: usize = 10;

/// Group-by counts over the drop records of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    /// Every record, dropped and flagged.
    pub total_records: usize,
    /// Records from stages that removed the row.
    pub total_dropped: usize,
    /// Records for rows that were kept (reconstructed, zero crime).
    pub total_flagged: usize,
    pub by_year: BTreeMap<u16, usize>,
    /// Descending by count, ties by name.
    pub by_reason: Vec<(String, usize)>,
    pub by_stage: Vec<(String, usize)>,
    pub by_state: Vec<(String, usize)>,
    pub most_common_reasons: Vec<(String, usize)>,
    pub top_states: Vec<(String, usize)>,
}

impl AuditSummary {
    pub fn from_records(records: &[DropRecord]) -> Self {
        let total_dropped = records.iter().filter(|r| r.stage.is_rejecting()).count();

        let mut by_year = BTreeMap::new();
        for r in records {
            *by_year.entry(r.year).or_insert(0) += 1;
        }

        let by_reason = count_desc(records.iter().map(|r| r.reason.clone()));
        let by_stage = count_desc(records.iter().map(|r| r.stage.as_str().to_string()));
        let by_state = count_desc(records.iter().map(|r| r.state_or_unknown().to_string()));

        Self {
            total_records: records.len(),
            total_dropped,
            total_flagged: records.len() - total_dropped,
            by_year,
            most_common_reasons: by_reason.iter().take(TOP_REASONS).cloned().collect(),
            top_states: by_state.iter().take(TOP_STATES).cloned().collect(),
            by_reason,
            by_stage,
            by_state,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

fn count_desc<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for k in keys {
        *counts.entry(k).or_insert(0) += 1;
    }
    let mut out: Vec<_> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Stage;

    fn rec(year: u16, state: Option<&str>, reason: &str, stage: Stage) -> DropRecord {
        DropRecord::new(year, state.map(Into::into), Some("c".into()), reason, None, stage)
    }

    #[test]
    fn groups_and_orders_counts() {
        let records = vec![
            rec(2012, Some("Texas"), "missing city name", Stage::MissingData),
            rec(2012, Some("Texas"), "missing city name", Stage::MissingData),
            rec(2013, Some("Ohio"), "zero violent crime reported, kept", Stage::ZeroCrime),
            rec(2013, None, "negative violent crime value", Stage::NegativeValue),
        ];
        let s = AuditSummary::from_records(&records);

        assert_eq!(s.total_records, 4);
        assert_eq!(s.total_dropped, 3);
        assert_eq!(s.total_flagged, 1);
        assert_eq!(s.by_year.get(&2012), Some(&2));
        assert_eq!(s.by_reason[0], ("missing city name".to_string(), 2));
        assert_eq!(s.by_stage[0], ("missing data filter".to_string(), 2));
        assert_eq!(s.by_state[0], ("Texas".to_string(), 2));
        assert!(s.by_state.contains(&("UNKNOWN".to_string(), 1)));
        assert_eq!(s.most_common_reasons.len(), 3);
    }

    #[test]
    fn empty_log_summarizes_to_nothing() {
        let s = AuditSummary::from_records(&[]);
        assert!(s.is_empty());
        assert!(s.by_year.is_empty());
    }
}
