/*!
 * Timeline Tests
 * Ordering and membership checked against a simple vector model
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use timeline_server::{Record, Timeline};

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Remove(u8),
    Contains(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // Small timestamp range so duplicates and misses are common
    prop_oneof![
        3 => (0u8..16).prop_map(Op::Insert),
        2 => (0u8..16).prop_map(Op::Remove),
        1 => (0u8..16).prop_map(Op::Contains),
    ]
}

/// Reference model: newest first, most recent insert first among equal timestamps
#[derive(Default)]
struct Model {
    posts: Vec<Record>,
}

impl Model {
    fn insert(&mut self, record: Record) {
        let at = self
            .posts
            .iter()
            .position(|p| p.timestamp <= record.timestamp)
            .unwrap_or(self.posts.len());
        self.posts.insert(at, record);
    }

    fn remove(&mut self, timestamp: f64) -> bool {
        match self.posts.iter().position(|p| p.timestamp == timestamp) {
            Some(at) => {
                self.posts.remove(at);
                true
            }
            None => false,
        }
    }

    fn contains(&self, timestamp: f64) -> bool {
        self.posts.iter().any(|p| p.timestamp == timestamp)
    }
}

proptest! {
    #[test]
    fn test_timeline_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let timeline = Timeline::new();
        let mut model = Model::default();

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Insert(ts) => {
                    let record = Record::new(format!("post-{step}"), f64::from(ts));
                    timeline.insert(record.body.clone(), record.timestamp);
                    model.insert(record);
                }
                Op::Remove(ts) => {
                    prop_assert_eq!(timeline.remove(f64::from(ts)), model.remove(f64::from(ts)));
                }
                Op::Contains(ts) => {
                    prop_assert_eq!(timeline.contains(f64::from(ts)), model.contains(f64::from(ts)));
                }
            }
        }

        let snapshot = timeline.snapshot();
        prop_assert_eq!(timeline.len(), model.posts.len());
        prop_assert!(snapshot.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        prop_assert_eq!(snapshot, model.posts);
    }

    #[test]
    fn test_snapshot_is_sorted_for_any_timestamps(
        stamps in prop::collection::vec(-1.0e9f64..1.0e9, 0..100)
    ) {
        let timeline = Timeline::new();
        for ts in &stamps {
            timeline.insert("p", *ts);
        }

        let snapshot = timeline.snapshot();
        prop_assert_eq!(snapshot.len(), stamps.len());
        prop_assert!(snapshot.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        for ts in &stamps {
            prop_assert!(timeline.contains(*ts));
        }
    }
}

#[test]
fn test_feed_scenario() {
    let timeline = Timeline::new();
    timeline.insert("hi", 5.0);
    timeline.insert("yo", 10.0);
    assert_eq!(
        timeline.snapshot(),
        vec![Record::new("yo", 10.0), Record::new("hi", 5.0)]
    );

    assert!(timeline.remove(5.0));
    assert!(!timeline.contains(5.0));
    assert_eq!(timeline.snapshot(), vec![Record::new("yo", 10.0)]);
}

#[test]
fn test_negative_and_fractional_timestamps() {
    let timeline = Timeline::new();
    timeline.insert("past", -3.5);
    timeline.insert("now", 0.0);
    timeline.insert("soon", 0.25);

    assert_eq!(
        timeline.snapshot(),
        vec![
            Record::new("soon", 0.25),
            Record::new("now", 0.0),
            Record::new("past", -3.5),
        ]
    );
    assert!(timeline.contains(-3.5));
}

#[test]
fn test_readers_and_writers_interleave() {
    let timeline = Arc::new(Timeline::with_max_readers(2));

    let writers: Vec<_> = (0..2i32)
        .map(|w| {
            let timeline = timeline.clone();
            thread::spawn(move || {
                for i in 0..300i32 {
                    let ts = f64::from(i * 2 + w);
                    timeline.insert(format!("{w}"), ts);
                    if i % 3 == 0 {
                        assert!(timeline.remove(ts));
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let timeline = timeline.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let snapshot = timeline.snapshot();
                    assert!(snapshot.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    // 300 inserts per writer, 100 of them removed again
    assert_eq!(timeline.len(), 400);
}
