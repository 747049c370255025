use super::*;

#[test]
fn status_exposes_code_only_for_server_errors() {
    let err = SessionError::Status { status: 404, message: "not found".into() };
    assert_eq!(err.status(), Some(404));
    assert_eq!(SessionError::Transport("refused".into()).status(), None);
}

#[test]
fn is_unauthorized_matches_401() {
    assert!(SessionError::Status { status: 401, message: "expired".into() }.is_unauthorized());
    assert!(!SessionError::Status { status: 403, message: "forbidden".into() }.is_unauthorized());
    assert!(!SessionError::EmptyToken.is_unauthorized());
}

#[test]
fn display_includes_status_and_message() {
    let err = SessionError::Status { status: 500, message: "boom".into() };
    assert_eq!(err.to_string(), "server returned 500: boom");
}
