//! Tests for FairSelector fairness rules and persistence.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tempfile::tempdir;

use super::fair::weight;
use super::{CandidateGroup, FairSelector, PersistedSelector};

fn seeded(cap: u32, window: usize, seed: u64) -> FairSelector<String, StdRng> {
    FairSelector::with_rng(cap, window, StdRng::seed_from_u64(seed))
}

fn group(id: &str, items: &[&str]) -> CandidateGroup<String> {
    CandidateGroup::new(id, items.iter().map(|s| s.to_string()).collect())
}

#[test]
fn empty_group_is_unavailable() {
    let mut sel = seeded(3, 10, 1);
    assert_eq!(sel.select(&group("empty", &[])), None);
    assert!(sel.usage().is_empty());
    assert!(sel.recent().is_empty());
}

#[test]
fn non_empty_group_always_yields_an_item() {
    let g = group("a", &["a1", "a2", "a3", "a4"]);
    let mut sel = seeded(3, 10, 7);
    for _ in 0..500 {
        let item = sel.select(&g).expect("non-empty group");
        assert!(g.items.contains(&item));
    }
}

#[test]
fn usage_never_exceeds_cap_and_resets_only_when_exhausted() {
    let g = group("a", &["a1", "a2", "a3", "a4", "a5"]);
    let cap = 3;
    let mut sel = seeded(cap, 2, 11);
    let mut resets = 0;
    for _ in 0..400 {
        let exhausted = g.items.iter().all(|i| sel.usage().get(i) >= cap);
        let before: Vec<u32> = g.items.iter().map(|i| sel.usage().get(i)).collect();
        let chosen = sel.select(&g).unwrap();
        let after: Vec<u32> = g.items.iter().map(|i| sel.usage().get(i)).collect();

        if exhausted {
            resets += 1;
            for (item, count) in g.items.iter().zip(&after) {
                let expected = if *item == chosen { 1 } else { 0 };
                assert_eq!(*count, expected, "reset must zero the group before the pick");
            }
        } else {
            for ((item, b), a) in g.items.iter().zip(&before).zip(&after) {
                let expected = if *item == chosen { b + 1 } else { *b };
                assert_eq!(*a, expected, "counts only grow by the chosen item");
                assert!(*a <= cap);
            }
        }
    }
    assert!(resets > 0, "400 picks over 5 items with cap 3 must exhaust the group");
}

#[test]
fn window_of_one_never_repeats_the_previous_pick() {
    let g = group("a", &["a1", "a2"]);
    let mut sel = seeded(1_000, 1, 3);
    let mut prev = sel.select(&g).unwrap();
    for _ in 0..200 {
        let next = sel.select(&g).unwrap();
        assert_ne!(next, prev);
        prev = next;
    }
}

#[test]
fn recent_items_are_skipped_while_fresh_alternatives_exist() {
    let g = group("a", &["a1", "a2", "a3", "a4", "a5", "a6"]);
    let mut sel = seeded(2, 3, 5);
    for _ in 0..300 {
        let recent: HashSet<String> = sel.recent().iter().cloned().collect();
        let exhausted = g.items.iter().all(|i| sel.usage().get(i) >= sel.cap());
        let fresh_exists = g
            .items
            .iter()
            .any(|i| (exhausted || sel.usage().get(i) < sel.cap()) && !recent.contains(i));
        let chosen = sel.select(&g).unwrap();
        if fresh_exists {
            assert!(!recent.contains(&chosen), "{chosen} was picked while in the window");
        }
    }
}

#[test]
fn recency_window_is_bounded() {
    let g = group("a", &["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9", "b1", "b2", "b3"]);
    let mut sel = seeded(3, 4, 9);
    for _ in 0..100 {
        sel.select(&g);
        assert!(sel.recent().len() <= 4);
    }
    assert_eq!(sel.recent().len(), 4);
}

#[test]
fn zero_window_disables_recency() {
    let g = group("a", &["only"]);
    let mut sel = seeded(3, 0, 2);
    for _ in 0..5 {
        assert_eq!(sel.select(&g).as_deref(), Some("only"));
    }
    assert!(sel.recent().is_empty());
}

#[test]
fn first_three_picks_cover_three_fresh_items() {
    for seed in 0..50 {
        let g = group("a", &["a1", "a2", "a3"]);
        let mut sel = seeded(3, 10, seed);
        let picks: HashSet<String> = (0..3).map(|_| sel.select(&g).unwrap()).collect();
        assert_eq!(picks.len(), 3, "seed {seed}: first three picks must be distinct");
    }
}

#[test]
fn single_item_group_keeps_working_through_resets() {
    let g = group("solo", &["s"]);
    let mut sel = seeded(3, 10, 4);
    for pick in 1..=7u32 {
        assert_eq!(sel.select(&g).as_deref(), Some("s"));
        let expected = (pick - 1) % 3 + 1;
        assert_eq!(sel.usage().get(&"s".to_string()), expected);
    }
}

#[test]
fn exhaustion_reset_is_scoped_to_the_group() {
    let a = group("a", &["a1"]);
    let b = group("b", &["b1", "b2"]);
    let mut sel = seeded(1, 0, 8);
    sel.select(&b);
    let b_used: u32 = b.items.iter().map(|i| sel.usage().get(i)).sum();
    assert_eq!(b_used, 1);

    sel.select(&a);
    sel.select(&a);
    assert_eq!(sel.usage().get(&"a1".to_string()), 1);
    let b_after: u32 = b.items.iter().map(|i| sel.usage().get(i)).sum();
    assert_eq!(b_after, 1, "resetting group a must not touch group b");
}

#[test]
fn reciprocal_weights() {
    assert_eq!(weight(0), 1.0);
    assert_eq!(weight(1), 0.5);
    assert_eq!(weight(3), 0.25);
}

#[test]
fn less_used_items_are_drawn_proportionally_more_often() {
    let g = group("a", &["fresh", "used"]);
    let snapshot = PersistedSelector {
        version: 1,
        usage: vec![("used".to_string(), 2)],
        recent: vec![],
    };
    let mut rng = StdRng::seed_from_u64(42);
    let mut fresh = 0;
    for _ in 0..2_000 {
        let mut sel = FairSelector::with_rng(3, 0, &mut rng);
        sel.restore_snapshot(snapshot.clone());
        if sel.select(&g).as_deref() == Some("fresh") {
            fresh += 1;
        }
    }
    // weights 1 vs 1/3: expected share 0.75
    assert!((1_350..=1_650).contains(&fresh), "fresh picked {fresh} of 2000");
}

#[test]
fn explicit_reset_clears_everything() {
    let g = group("a", &["a1", "a2"]);
    let mut sel = seeded(3, 10, 6);
    sel.select(&g);
    sel.select(&g);
    sel.reset();
    assert!(sel.usage().is_empty());
    assert!(sel.recent().is_empty());
}

#[test]
fn reset_group_keeps_recency() {
    let g = group("a", &["a1", "a2"]);
    let mut sel = seeded(3, 10, 6);
    sel.select(&g);
    sel.reset_group(&g);
    assert!(sel.usage().is_empty());
    assert_eq!(sel.recent().len(), 1);
}

#[test]
fn save_and_load_from_path() {
    let g = group("a", &["a1", "a2", "a3"]);
    let mut sel = seeded(3, 10, 12);
    for _ in 0..5 {
        sel.select(&g);
    }
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("usage.json");
    sel.save_to_path(&path).unwrap();

    let mut loaded = seeded(3, 10, 99);
    assert!(loaded.load_from_path(&path).unwrap());
    for item in &g.items {
        assert_eq!(loaded.usage().get(item), sel.usage().get(item));
    }
    let a: Vec<&String> = sel.recent().iter().collect();
    let b: Vec<&String> = loaded.recent().iter().collect();
    assert_eq!(a, b);
}

#[test]
fn load_accepts_snapshot_without_recent_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("usage.json");
    std::fs::write(&path, r#"{"version":1,"usage":[["a1",2],["a2",1]]}"#).unwrap();

    let mut sel = seeded(3, 10, 4);
    assert!(sel.load_from_path(&path).unwrap());
    assert_eq!(sel.usage().get(&"a1".to_string()), 2);
    assert_eq!(sel.usage().get(&"a2".to_string()), 1);
    assert!(sel.recent().is_empty());
}

#[test]
fn load_missing_file_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let mut sel = seeded(3, 10, 1);
    sel.select(&group("a", &["a1"]));
    assert!(!sel.load_from_path(&dir.path().join("missing.json")).unwrap());
    assert_eq!(sel.usage().get(&"a1".to_string()), 1);
}

#[test]
fn restore_keeps_only_newest_entries_that_fit_the_window() {
    let snapshot = PersistedSelector {
        version: 1,
        usage: vec![("x".to_string(), 1), ("y".to_string(), 0)],
        recent: vec!["a".into(), "b".into(), "c".into(), "d".into()],
    };
    let mut sel = seeded(3, 2, 1);
    sel.restore_snapshot(snapshot);
    let recent: Vec<&str> = sel.recent().iter().map(String::as_str).collect();
    assert_eq!(recent, vec!["c", "d"]);
    assert_eq!(sel.usage().get(&"x".to_string()), 1);
    assert_eq!(sel.usage().iter().count(), 1);
}
