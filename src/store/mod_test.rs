use super::*;
use crate::types::Role;
use serde_json::json;

/// Memory backend that refuses writes to one key.
struct RejectingStore {
    inner: MemoryStore,
    reject: &'static str,
}

impl SessionStore for RejectingStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        if key == self.reject {
            return Err(SessionError::Storage(format!("{key} is read-only")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        self.inner.remove_item(key);
    }
}

fn sample_user(role: &str) -> serde_json::Value {
    json!({ "id": "u1", "name": "Ana", "email": "ana@example.test", "role": role })
}

#[test]
fn get_on_empty_namespace_returns_nones() {
    let store = CredentialStore::in_memory();
    for kind in TokenKind::ALL {
        assert_eq!(store.get(kind), Credentials::default());
    }
}

#[test]
fn set_then_get_round_trips_per_namespace() {
    let store = CredentialStore::in_memory();
    store.set(TokenKind::Seller, "seller-tok", &sample_user("seller")).unwrap();

    let seller = store.get(TokenKind::Seller);
    assert_eq!(seller.token.as_deref(), Some("seller-tok"));
    assert_eq!(seller.user().unwrap().role, Some(Role::Seller));
    assert_eq!(store.get(TokenKind::User), Credentials::default());
}

#[test]
fn set_rejects_empty_token() {
    let store = CredentialStore::in_memory();
    let err = store.set(TokenKind::User, "", &sample_user("customer")).unwrap_err();
    assert!(matches!(err, SessionError::EmptyToken));
    assert!(!store.get(TokenKind::User).is_complete());
}

#[test]
fn set_accepts_any_non_empty_token_shape() {
    let store = CredentialStore::in_memory();
    store.set(TokenKind::User, "not-a-jwt", &sample_user("customer")).unwrap();
    assert_eq!(store.token(TokenKind::User).as_deref(), Some("not-a-jwt"));
}

#[test]
fn clear_removes_only_that_namespace() {
    let store = CredentialStore::in_memory();
    store.set(TokenKind::User, "u", &sample_user("customer")).unwrap();
    store.set(TokenKind::Delivery, "d", &sample_user("deliveryAgent")).unwrap();

    store.clear(TokenKind::User);
    assert_eq!(store.get(TokenKind::User), Credentials::default());
    assert!(store.get(TokenKind::Delivery).is_complete());
}

#[test]
fn clear_all_is_idempotent() {
    let backend = Arc::new(MemoryStore::new());
    let store = CredentialStore::new(backend.clone());
    for kind in TokenKind::ALL {
        store.set(kind, "tok", &sample_user("customer")).unwrap();
    }

    store.clear_all();
    assert!(backend.is_empty());
    store.clear_all();
    assert!(backend.is_empty());
}

#[test]
fn clear_all_keeps_logout_flag() {
    let store = CredentialStore::in_memory();
    store.set(TokenKind::User, "tok", &sample_user("customer")).unwrap();
    store.begin_logout(Duration::from_secs(30));

    store.clear_all();
    assert!(!store.get(TokenKind::User).is_complete());
    assert!(store.logout_in_progress());
}

#[test]
fn failed_set_leaves_namespace_without_token() {
    for reject in ["token", "user"] {
        let backend = Arc::new(RejectingStore { inner: MemoryStore::new(), reject });
        let store = CredentialStore::new(backend.clone());

        let err = store.set(TokenKind::User, "tok", &sample_user("customer")).unwrap_err();

        assert!(matches!(err, SessionError::Storage(_)), "reject={reject}");
        assert_eq!(store.get(TokenKind::User), Credentials::default(), "reject={reject}");
        assert!(backend.inner.is_empty());
    }
}

#[test]
fn empty_record_reads_as_absent() {
    let backend = Arc::new(MemoryStore::new());
    backend.set_item("token", "tok").unwrap();
    backend.set_item("user", "").unwrap();
    let creds = CredentialStore::new(backend).get(TokenKind::User);

    assert_eq!(creds.raw_user, None);
    assert!(!creds.is_complete());
}

#[test]
fn corrupt_record_parses_to_none_but_counts_as_present() {
    let backend = Arc::new(MemoryStore::new());
    backend.set_item("token", "tok").unwrap();
    backend.set_item("user", "{broken").unwrap();
    let creds = CredentialStore::new(backend).get(TokenKind::User);

    assert!(creds.is_complete());
    assert!(creds.user().is_none());
}

#[test]
fn logout_flag_expires_after_grace() {
    let store = CredentialStore::in_memory();
    assert!(!store.logout_in_progress());

    store.begin_logout(Duration::from_millis(40));
    assert!(store.logout_in_progress());

    std::thread::sleep(Duration::from_millis(80));
    assert!(!store.logout_in_progress());
}

#[test]
fn logout_flag_can_be_ended_early() {
    let store = CredentialStore::in_memory();
    store.begin_logout(Duration::from_secs(60));
    store.end_logout();
    assert!(!store.logout_in_progress());
}

#[test]
fn unparsable_logout_flag_reads_as_unset() {
    let backend = Arc::new(MemoryStore::new());
    backend.set_item(LOGGING_OUT_KEY, "true").unwrap();
    assert!(!CredentialStore::new(backend).logout_in_progress());
}
