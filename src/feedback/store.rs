//! In-memory store of the latest feedback per metric.
//!
//! One slot per metric key, kept in order of the key's first write.
//! Writers build a new `Vec` and swap it in, so a reader holding an older
//! [`MetricFeedbackStore::snapshot`] never observes a half-written record.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::types::{FeedbackSnapshot, MetricFeedback};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of write timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Keyed feedback cache shared by clones of the same store.
#[derive(Clone)]
pub struct MetricFeedbackStore {
    entries: Arc<RwLock<Arc<Vec<MetricFeedback>>>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for MetricFeedbackStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricFeedbackStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl Default for MetricFeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricFeedbackStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            clock,
        }
    }

    /// Current contents. Later writes do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<MetricFeedback>> {
        Arc::clone(&self.entries.read())
    }

    fn replace(&self, update: impl FnOnce(&mut Vec<MetricFeedback>)) {
        let mut guard = self.entries.write();
        let mut next = Vec::clone(&guard);
        update(&mut next);
        *guard = Arc::new(next);
    }

    /// Insert or overwrite the slot for `metric`.
    ///
    /// The stored record always carries `metric` as its name and a fresh
    /// timestamp, whatever the caller put in those fields.
    pub fn set_feedback(&self, metric: &str, mut feedback: MetricFeedback) -> MetricFeedback {
        if feedback.metric != metric {
            log::debug!(
                "Feedback for '{}' carried metric name '{}', correcting",
                metric,
                feedback.metric
            );
        }
        feedback.metric = metric.to_string();
        feedback.timestamp = self.clock.now();

        let stored = feedback.clone();
        self.replace(move |entries| {
            match entries.iter_mut().find(|e| e.metric == feedback.metric) {
                Some(slot) => *slot = feedback,
                None => entries.push(feedback),
            }
        });
        stored
    }

    /// Exact-key lookup.
    pub fn get_feedback(&self, metric: &str) -> Option<MetricFeedback> {
        self.snapshot().iter().find(|e| e.metric == metric).cloned()
    }

    /// Exact key first, then the first key (in store order) that starts
    /// with or contains `metric_type`.
    pub fn get_feedback_by_metric_type(&self, metric_type: &str) -> Option<MetricFeedback> {
        let entries = self.snapshot();
        if let Some(exact) = entries.iter().find(|e| e.metric == metric_type) {
            return Some(exact.clone());
        }
        entries
            .iter()
            .find(|e| e.metric.starts_with(metric_type) || e.metric.contains(metric_type))
            .cloned()
    }

    /// Record with the greatest timestamp. On a tie the later slot wins.
    pub fn get_latest_feedback(&self) -> Option<MetricFeedback> {
        let entries = self.snapshot();
        let mut latest: Option<&MetricFeedback> = None;
        for entry in entries.iter() {
            match latest {
                Some(current) if current.timestamp > entry.timestamp => {}
                _ => latest = Some(entry),
            }
        }
        latest.cloned()
    }

    /// Remove one metric. Returns whether a record was removed.
    pub fn clear_feedback(&self, metric: &str) -> bool {
        let mut removed = false;
        self.replace(|entries| {
            let before = entries.len();
            entries.retain(|e| e.metric != metric);
            removed = entries.len() != before;
        });
        removed
    }

    /// Drop every record. Called when the session ends.
    pub fn clear_all(&self) {
        *self.entries.write() = Arc::new(Vec::new());
    }

    /// All records in store order.
    pub fn get_all_feedbacks(&self) -> Vec<MetricFeedback> {
        self.snapshot().to_vec()
    }

    /// All records, newest first.
    pub fn get_all_feedbacks_sorted(&self) -> Vec<MetricFeedback> {
        let mut all = self.get_all_feedbacks();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all
    }

    /// Number of metrics with stored feedback.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when no feedback is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the contents out for persistence.
    pub fn export(&self) -> FeedbackSnapshot {
        FeedbackSnapshot {
            feedbacks: self.get_all_feedbacks(),
        }
    }

    /// Replace the contents with a previously exported snapshot.
    ///
    /// Stored timestamps are kept. Duplicate keys collapse to the last one.
    pub fn import(&self, snapshot: FeedbackSnapshot) {
        let mut next: Vec<MetricFeedback> = Vec::with_capacity(snapshot.feedbacks.len());
        for feedback in snapshot.feedbacks {
            match next.iter_mut().find(|e| e.metric == feedback.metric) {
                Some(slot) => *slot = feedback,
                None => next.push(feedback),
            }
        }
        log::debug!("Restored {} metric feedback records", next.len());
        *self.entries.write() = Arc::new(next);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feedback::types::MechanismFeedback;
    use crate::ocean::OceanScore;
    use chrono::Duration;
    use parking_lot::Mutex;

    /// Clock that advances one second per reading.
    pub(crate) struct StepClock {
        next: Mutex<DateTime<Utc>>,
    }

    impl StepClock {
        pub(crate) fn starting_at(start: DateTime<Utc>) -> Self {
            Self {
                next: Mutex::new(start),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock();
            let now = *next;
            *next = now + Duration::seconds(1);
            now
        }
    }

    /// Clock frozen at one instant.
    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    pub(crate) fn sample(metric: &str, contrib: f64) -> MetricFeedback {
        MetricFeedback {
            metric: metric.to_string(),
            vt: 12.0,
            bt: 10.0,
            r: 0.3,
            n: 14,
            contrib,
            new_ocean_score: OceanScore::neutral(),
            mechanism_feedback: MechanismFeedback::default(),
            reason: format!("{metric} moved"),
            timestamp: DateTime::<Utc>::MIN_UTC,
        }
    }

    fn step_store() -> (MetricFeedbackStore, DateTime<Utc>) {
        let start = Utc::now();
        let store = MetricFeedbackStore::with_clock(Arc::new(StepClock::starting_at(start)));
        (store, start)
    }

    #[test]
    fn test_set_corrects_metric_name_and_stamps() {
        let empty_at = Utc::now();
        let store = MetricFeedbackStore::with_clock(Arc::new(StepClock::starting_at(
            empty_at + Duration::milliseconds(1),
        )));
        assert!(store.is_empty());

        store.set_feedback("daily_spending", sample("wrong_name", 0.1));

        let fb = store.get_feedback("daily_spending").unwrap();
        assert_eq!(fb.metric, "daily_spending");
        assert!(fb.timestamp > empty_at);
        assert!(store.get_feedback("wrong_name").is_none());
    }

    #[test]
    fn test_system_clock_stamp_is_fresh() {
        let store = MetricFeedbackStore::new();
        let mut stale = sample("daily_spending", 0.0);
        stale.timestamp = Utc::now() - Duration::days(3);

        let stored = store.set_feedback("daily_spending", stale);
        assert!(stored.timestamp > Utc::now() - Duration::minutes(1));
    }

    #[test]
    fn test_overwrite_keeps_one_slot() {
        let (store, _) = step_store();
        store.set_feedback("daily_spending", sample("daily_spending", 0.1));
        store.set_feedback("daily_spending", sample("daily_spending", -0.4));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_feedback("daily_spending").unwrap().contrib, -0.4);
    }

    #[test]
    fn test_lookup_by_metric_type() {
        let (store, _) = step_store();
        store.set_feedback("daily_distance_km", sample("", 0.2));

        let fb = store.get_feedback_by_metric_type("daily_distance").unwrap();
        assert_eq!(fb.metric, "daily_distance_km");
        assert!(store.get_feedback_by_metric_type("nonexistent").is_none());
        assert!(store.get_feedback("daily_distance").is_none());
    }

    #[test]
    fn test_lookup_prefers_exact_then_store_order() {
        let (store, _) = step_store();
        store.set_feedback("public_transit_ratio", sample("", 0.1));
        store.set_feedback("transit", sample("", 0.2));
        store.set_feedback("transit_extra", sample("", 0.3));

        assert_eq!(
            store.get_feedback_by_metric_type("transit").unwrap().metric,
            "transit"
        );
        assert_eq!(
            store.get_feedback_by_metric_type("ratio").unwrap().metric,
            "public_transit_ratio"
        );
        assert_eq!(
            store.get_feedback_by_metric_type("transit_").unwrap().metric,
            "public_transit_ratio"
        );
    }

    #[test]
    fn test_latest_follows_most_recent_write() {
        let (store, _) = step_store();
        store.set_feedback("a", sample("a", 0.1));
        store.set_feedback("b", sample("b", 0.2));
        assert_eq!(store.get_latest_feedback().unwrap().metric, "b");

        store.set_feedback("a", sample("a", 0.9));
        let latest = store.get_latest_feedback().unwrap();
        assert_eq!(latest.metric, "a");
        assert_eq!(latest.contrib, 0.9);
    }

    #[test]
    fn test_latest_tie_goes_to_last_slot() {
        let store = MetricFeedbackStore::with_clock(Arc::new(FrozenClock(Utc::now())));
        store.set_feedback("a", sample("a", 0.1));
        store.set_feedback("b", sample("b", 0.2));
        store.set_feedback("c", sample("c", 0.3));

        assert_eq!(store.get_latest_feedback().unwrap().metric, "c");
    }

    #[test]
    fn test_latest_on_empty_store() {
        assert!(MetricFeedbackStore::new().get_latest_feedback().is_none());
    }

    #[test]
    fn test_sorted_is_newest_first() {
        let (store, _) = step_store();
        store.set_feedback("a", sample("a", 0.0));
        store.set_feedback("b", sample("b", 0.0));
        store.set_feedback("c", sample("c", 0.0));
        store.set_feedback("a", sample("a", 0.0));

        let order: Vec<_> = store
            .get_all_feedbacks_sorted()
            .into_iter()
            .map(|f| f.metric)
            .collect();
        assert_eq!(order, vec!["a", "c", "b"]);

        let unsorted: Vec<_> = store
            .get_all_feedbacks()
            .into_iter()
            .map(|f| f.metric)
            .collect();
        assert_eq!(unsorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clear_single_and_all() {
        let (store, _) = step_store();
        store.set_feedback("a", sample("a", 0.0));
        store.set_feedback("b", sample("b", 0.0));

        assert!(store.clear_feedback("a"));
        assert!(!store.clear_feedback("a"));
        assert!(store.get_feedback("a").is_none());
        assert_eq!(store.len(), 1);

        store.clear_all();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let (store, _) = step_store();
        store.set_feedback("a", sample("a", 0.1));
        let before = store.snapshot();

        store.set_feedback("a", sample("a", 0.7));
        store.set_feedback("b", sample("b", 0.2));

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].contrib, 0.1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_clones_share_contents() {
        let (store, _) = step_store();
        let other = store.clone();
        other.set_feedback("a", sample("a", 0.1));
        assert!(store.get_feedback("a").is_some());
    }

    #[test]
    fn test_export_import_preserves_timestamps() {
        let (store, start) = step_store();
        store.set_feedback("a", sample("a", 0.1));
        store.set_feedback("b", sample("b", 0.2));

        let json = serde_json::to_string(&store.export()).unwrap();
        let restored = MetricFeedbackStore::new();
        restored.import(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get_feedback("a").unwrap().timestamp, start);
        assert_eq!(restored.get_latest_feedback().unwrap().metric, "b");
    }

    #[test]
    fn test_import_collapses_duplicate_keys() {
        let store = MetricFeedbackStore::new();
        store.import(FeedbackSnapshot {
            feedbacks: vec![sample("a", 0.1), sample("b", 0.2), sample("a", 0.3)],
        });
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_feedback("a").unwrap().contrib, 0.3);
    }

    #[test]
    fn test_concurrent_writers() {
        use std::thread;

        let store = MetricFeedbackStore::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let key = format!("metric_{t}_{i}");
                        store.set_feedback(&key, sample(&key, 0.0));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 100);
    }
}
