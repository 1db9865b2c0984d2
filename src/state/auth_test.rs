use super::*;
use crate::notify::{MSG_SESSION_EXPIRED, MSG_TRANSPORT, ToastLog};
use crate::state::test_helpers::{MockAuth, alice, coded, unauthorized};
use tokio::sync::Semaphore;

fn store_with(api: MockAuth) -> (Arc<SessionStore>, Arc<MockAuth>, Arc<ToastLog>) {
    let api = Arc::new(api);
    let toasts = Arc::new(ToastLog::default());
    let store = Arc::new(SessionStore::new(api.clone(), toasts.clone()));
    (store, api, toasts)
}

// =============================================================
// SessionState
// =============================================================

#[test]
fn startup_state_is_loading_without_user() {
    let state = SessionState::default();
    assert!(state.is_loading);
    assert!(state.user.is_none());
    assert!(!state.is_authenticated());
    assert!(state.error.is_none());
}

#[test]
fn authenticated_iff_user_present() {
    let state = SessionState { user: Some(alice()), is_loading: false, error: None };
    assert!(state.is_authenticated());
}

// =============================================================
// initialize
// =============================================================

#[tokio::test]
async fn initialize_adopts_current_user() {
    let mock = MockAuth::default();
    mock.push_me(Ok(alice()));
    let (store, _, toasts) = store_with(mock);

    store.initialize().await;

    let state = store.state();
    assert_eq!(state.user, Some(alice()));
    assert!(state.is_authenticated());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn initialize_401_is_quietly_logged_out() {
    let mock = MockAuth::default();
    mock.push_me(Err(unauthorized()));
    let (store, _, toasts) = store_with(mock);

    store.initialize().await;

    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn initialize_expired_code_is_also_quiet() {
    let mock = MockAuth::default();
    mock.push_me(Err(coded(401, "HTTP_401", "expired")));
    let (store, _, toasts) = store_with(mock);

    store.initialize().await;

    assert!(store.state().user.is_none());
    assert!(store.state().error.is_none());
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn initialize_transport_failure_is_swallowed_into_error() {
    let mock = MockAuth::default();
    mock.push_me(Err(ApiError::transport("connection refused")));
    let (store, _, toasts) = store_with(mock);

    store.initialize().await;

    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some(MSG_SESSION_CHECK_FAILED));
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts.snapshot()[0].message, MSG_TRANSPORT);
}

#[tokio::test]
async fn initialize_twice_yields_same_user() {
    let mock = MockAuth::default();
    mock.push_me(Ok(alice()));
    mock.push_me(Ok(alice()));
    let (store, api, _) = store_with(mock);

    store.initialize().await;
    let first = store.state().user;
    store.initialize().await;
    let second = store.state().user;

    assert_eq!(first, second);
    assert_eq!(api.calls(), vec!["me", "me"]);
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_success_sets_user_and_clears_error() {
    let mock = MockAuth::default();
    mock.push_login(Err(unauthorized()));
    mock.push_login(Ok(alice()));
    let (store, _, _) = store_with(mock);

    let _ = store.login("alice", "wrong").await;
    assert!(store.state().error.is_some());

    let user = store.login("alice", "x").await.unwrap();
    assert_eq!(user, alice());
    let state = store.state();
    assert_eq!(state.user, Some(alice()));
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn login_failure_reraises_and_settles() {
    let mock = MockAuth::default();
    mock.push_login(Err(coded(401, "HTTP_401", "Invalid credentials")));
    let (store, _, toasts) = store_with(mock);

    let err = store.login("alice", "bad").await.unwrap_err();

    assert_eq!(err.status, 401);
    assert_eq!(err.message, "Invalid credentials");
    let state = store.state();
    assert!(!state.is_loading);
    assert!(state.user.is_none());
    assert_eq!(state.error.as_deref(), Some(MSG_LOGIN_FAILED));
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts.snapshot()[0].message, MSG_SESSION_EXPIRED);
}

#[tokio::test]
async fn login_failure_keeps_previous_user() {
    let mock = MockAuth::default();
    mock.push_me(Ok(alice()));
    mock.push_login(Err(ApiError::transport("reset")));
    let (store, _, _) = store_with(mock);

    store.initialize().await;
    let _ = store.login("bob", "pw").await;

    assert_eq!(store.state().user, Some(alice()));
}

#[tokio::test]
async fn login_reports_loading_while_pending() {
    // One permit lets the startup check through; login then blocks.
    let gate = Arc::new(Semaphore::new(1));
    let mock = MockAuth::gated(gate.clone());
    mock.push_login(Ok(alice()));
    let (store, _, _) = store_with(mock);
    store.initialize().await;
    assert!(!store.state().is_loading);
    let mut rx = store.subscribe();

    let task = tokio::spawn({
        let store = store.clone();
        async move { store.login("alice", "x").await }
    });

    let pending = rx.wait_for(|s| s.is_loading && s.user.is_none()).await.unwrap().clone();
    assert!(pending.error.is_none());

    gate.add_permits(1);
    task.await.unwrap().unwrap();

    let settled = store.state();
    assert!(!settled.is_loading);
    assert_eq!(settled.user, Some(alice()));
}

// =============================================================
// logout
// =============================================================

#[tokio::test]
async fn logout_clears_user() {
    let mock = MockAuth::default();
    mock.push_login(Ok(alice()));
    let (store, _, toasts) = store_with(mock);

    store.login("alice", "x").await.unwrap();
    store.logout().await;

    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn logout_failure_still_clears_user() {
    let mock = MockAuth::default();
    mock.push_login(Ok(alice()));
    mock.push_logout(Err(coded(503, "CIRCUIT_OPEN", "breaker open")));
    let (store, _, toasts) = store_with(mock);

    store.login("alice", "x").await.unwrap();
    store.logout().await;

    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some(MSG_LOGOUT_FAILED));
    assert_eq!(toasts.len(), 1);
}

// =============================================================
// serialization
// =============================================================

#[tokio::test]
async fn overlapping_operations_run_in_order() {
    let gate = Arc::new(Semaphore::new(0));
    let mock = MockAuth::gated(gate.clone());
    mock.push_login(Ok(alice()));
    let (store, api, _) = store_with(mock);

    let login = tokio::spawn({
        let store = store.clone();
        async move { store.login("alice", "x").await }
    });
    // Let the login reach the gate before queuing the logout.
    while api.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    let logout = tokio::spawn({
        let store = store.clone();
        async move { store.logout().await }
    });

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(api.calls(), vec!["login:alice"], "logout must wait for login to settle");

    gate.add_permits(2);
    login.await.unwrap().unwrap();
    logout.await.unwrap();

    assert_eq!(api.calls(), vec!["login:alice", "logout"]);
    let state = store.state();
    assert!(state.user.is_none());
    assert!(!state.is_loading);
}
