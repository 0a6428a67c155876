use trellis_types::{Muid, Token};

// ── Muid ────────────────────────────────────────────────────────

#[test]
fn muid_generate_is_unique() {
    let a = Muid::generate();
    let b = Muid::generate();
    assert_ne!(a, b);
}

#[test]
fn muid_display_matches_value() {
    let muid = Muid::new("space-123");
    assert_eq!(muid.to_string(), "space-123");
    assert_eq!(muid.as_str(), "space-123");
}

#[test]
fn muid_from_conversions() {
    let from_str: Muid = "abc".into();
    let from_string: Muid = String::from("abc").into();
    assert_eq!(from_str, from_string);
}

#[test]
fn muid_serde_transparent() {
    let muid = Muid::new("m-1");
    let json = serde_json::to_string(&muid).unwrap();
    assert_eq!(json, "\"m-1\"");

    let back: Muid = serde_json::from_str("\"m-1\"").unwrap();
    assert_eq!(back, muid);
}

// ── Token ───────────────────────────────────────────────────────

#[test]
fn token_debug_is_redacted() {
    let token = Token::new("super-secret-value");
    let debug = format!("{:?}", token);
    assert!(!debug.contains("super-secret-value"));
    assert!(debug.contains("redacted"));
}

#[test]
fn token_as_str_returns_raw_value() {
    let token = Token::new("tok-1");
    assert_eq!(token.as_str(), "tok-1");
}

#[test]
fn token_equality_by_value() {
    assert_eq!(Token::new("a"), Token::new("a"));
    assert_ne!(Token::new("a"), Token::new("b"));
}

#[test]
fn token_serde_transparent() {
    let token = Token::new("tok-2");
    let json = serde_json::to_string(&token).unwrap();
    assert_eq!(json, "\"tok-2\"");

    let back: Token = serde_json::from_str(&json).unwrap();
    assert_eq!(back, token);
}
