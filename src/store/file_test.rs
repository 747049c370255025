use super::*;

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("foodcourt-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

#[test]
fn missing_file_reads_as_empty() {
    let store = FileStore::new(temp_path());
    assert_eq!(store.get_item("token"), None);
    store.remove_item("token");
    assert!(!store.path().exists());
}

#[test]
fn writes_survive_a_new_handle() {
    let path = temp_path();
    FileStore::new(&path).set_item("token", "abc").unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get_item("token").as_deref(), Some("abc"));

    reopened.remove_item("token");
    assert_eq!(FileStore::new(&path).get_item("token"), None);
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn corrupt_file_reads_as_empty_and_is_overwritten() {
    let path = temp_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{not json").unwrap();

    let store = FileStore::new(&path);
    assert_eq!(store.get_item("token"), None);
    store.set_item("token", "fresh").unwrap();
    assert_eq!(store.get_item("token").as_deref(), Some("fresh"));
    let _ = fs::remove_dir_all(path.parent().unwrap());
}
