use super::*;

fn alice() -> ExternalIdentity {
    ExternalIdentity::DisplayName("alice".into())
}

// =============================================================================
// bytes_to_hex / generate_token
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// create_session / lookup
// =============================================================================

#[test]
fn new_store_is_empty() {
    let store = IdentityStore::new();
    assert!(store.is_empty());
    assert!(store.lookup("anything").is_none());
}

#[test]
fn created_session_is_found_with_no_placement() {
    let mut store = IdentityStore::new();
    let token = store.create_session(alice(), "alice");

    let session = store.lookup(&token).expect("session should exist");
    assert_eq!(session.token, token);
    assert_eq!(session.name, "alice");
    assert_eq!(session.identity, alice());
    assert!(session.last_placement.is_none());
}

#[test]
fn relogin_invalidates_previous_token() {
    let mut store = IdentityStore::new();
    let first = store.create_session(alice(), "alice");
    let second = store.create_session(alice(), "alice");

    assert_ne!(first, second);
    assert!(store.lookup(&first).is_none());
    assert!(store.lookup(&second).is_some());
    assert_eq!(store.len(), 1);
}

#[test]
fn relogin_resets_cooldown_state() {
    let mut store = IdentityStore::new();
    let first = store.create_session(alice(), "alice");
    store.lookup_mut(&first).unwrap().last_placement = Some(Instant::now());

    let second = store.create_session(alice(), "alice");
    assert!(store.lookup(&second).unwrap().last_placement.is_none());
}

#[test]
fn distinct_identities_keep_separate_sessions() {
    let mut store = IdentityStore::new();
    let a = store.create_session(alice(), "alice");
    let b = store.create_session(ExternalIdentity::Discord { user_id: "42".into() }, "bob");

    assert!(store.lookup(&a).is_some());
    assert!(store.lookup(&b).is_some());
    assert_eq!(store.len(), 2);
}

#[test]
fn same_name_different_provider_does_not_collide() {
    let mut store = IdentityStore::new();
    let a = store.create_session(ExternalIdentity::DisplayName("42".into()), "42");
    let b = store.create_session(ExternalIdentity::Discord { user_id: "42".into() }, "42");

    assert!(store.lookup(&a).is_some());
    assert!(store.lookup(&b).is_some());
}

#[test]
fn external_identity_display() {
    assert_eq!(alice().to_string(), "name:alice");
    assert_eq!(ExternalIdentity::Discord { user_id: "7".into() }.to_string(), "discord:7");
}
