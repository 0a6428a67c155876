use trellis_sync::{SyncCursor, SyncPage, VersionTransition};
use trellis_types::Link;

#[test]
fn initial_cursor_requests_a_full_snapshot() {
    let cursor = SyncCursor::initial();
    assert_eq!(cursor.last_model_version, None);
    assert_eq!(cursor.offset, None);
}

#[test]
fn after_cursor_requests_a_strict_delta() {
    let cursor = SyncCursor::after(7);
    assert_eq!(cursor.last_model_version, Some(7));
    assert_eq!(cursor.offset, None);
}

#[test]
fn with_offset_preserves_the_version() {
    let cursor = SyncCursor::after(7).with_offset(200);
    assert_eq!(cursor.last_model_version, Some(7));
    assert_eq!(cursor.offset, Some(200));
}

#[test]
fn cursor_serde_roundtrip() {
    let cursor = SyncCursor::after(3).with_offset(100);
    let json = serde_json::to_string(&cursor).unwrap();
    let back: SyncCursor = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cursor);
}

#[test]
fn version_transition_equality() {
    let a = VersionTransition {
        old_model_version: 1,
        new_model_version: 2,
    };
    let b = VersionTransition {
        old_model_version: 1,
        new_model_version: 2,
    };
    assert_eq!(a, b);
}

#[test]
fn empty_page_is_consistent() {
    let page: SyncPage<Link> = SyncPage {
        items: Vec::new(),
        model_version: 2,
        total: Some(0),
        has_more: false,
        next_offset: None,
    };
    assert!(page.items.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.next_offset, None);
}
