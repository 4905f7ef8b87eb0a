use friendverse_types::Stamp;

// ── Construction ─────────────────────────────────────────────────

#[test]
fn now_has_zero_seq() {
    let s = Stamp::now();
    assert_eq!(s.seq(), 0);
    assert!(s.millis() > 0);
}

#[test]
fn new_from_components() {
    let s = Stamp::new(42, 7);
    assert_eq!(s.millis(), 42);
    assert_eq!(s.seq(), 7);
}

#[test]
fn default_is_now() {
    let s = Stamp::default();
    assert!(s.millis() > 0);
    assert_eq!(s.seq(), 0);
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn ordering_by_millis() {
    let a = Stamp::new(100, 0);
    let b = Stamp::new(200, 0);
    assert!(a < b);
}

#[test]
fn ordering_by_seq_when_millis_equal() {
    let a = Stamp::new(100, 0);
    let b = Stamp::new(100, 1);
    assert!(a < b);
}

#[test]
fn equal_stamps() {
    let a = Stamp::new(100, 5);
    let b = Stamp::new(100, 5);
    assert_eq!(a, b);
    assert!(!(a < b));
    assert!(!(a > b));
}

#[test]
fn partial_ord_consistent_with_ord() {
    let a = Stamp::new(50, 1);
    let b = Stamp::new(50, 2);
    assert_eq!(a.partial_cmp(&b), Some(std::cmp::Ordering::Less));
}

// ── tick ─────────────────────────────────────────────────────────

#[test]
fn tick_is_monotonic() {
    let t1 = Stamp::now();
    let t2 = t1.tick();
    let t3 = t2.tick();
    assert!(t1 < t2);
    assert!(t2 < t3);
}

#[test]
fn tick_increments_seq_when_millis_same() {
    // Use a far-future wall time so `now()` inside tick will be less
    let s = Stamp::new(u64::MAX / 2, 0);
    let ticked = s.tick();
    assert_eq!(ticked.millis(), s.millis());
    assert_eq!(ticked.seq(), 1);
}

#[test]
fn tick_resets_seq_when_millis_advances() {
    // Use a wall time in the past so `now()` inside tick will be greater
    let s = Stamp::new(1, 99);
    let ticked = s.tick();
    assert!(ticked.millis() > 1);
    assert_eq!(ticked.seq(), 0);
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serialization_roundtrip() {
    let s = Stamp::new(1234567890, 42);
    let json = serde_json::to_string(&s).unwrap();
    let parsed: Stamp = serde_json::from_str(&json).unwrap();
    assert_eq!(s, parsed);
}

#[test]
fn display_shows_both_components() {
    let s = Stamp::new(100, 3);
    assert_eq!(s.to_string(), "100.3");
}

// ── Hash ─────────────────────────────────────────────────────────

#[test]
fn hash_consistent_with_eq() {
    use std::collections::HashSet;
    let s = Stamp::new(100, 5);
    let mut set = HashSet::new();
    set.insert(s);
    set.insert(s);
    assert_eq!(set.len(), 1);
}
