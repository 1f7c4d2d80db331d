use promptline::{JsonFileStore, Key, PromptRequest, Prompter, SessionDescriptor, DEFAULT_SESSION};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn send_str(tx: &mpsc::UnboundedSender<Key>, text: &str) {
    for ch in text.chars() {
        tx.send(Key::Char(ch)).expect("send key");
    }
}

#[tokio::test]
async fn submitted_line_survives_a_prompter_restart() {
    let dir = TempDir::new().expect("tempdir");

    {
        let store = JsonFileStore::new(dir.path());
        let (mut prompter, keys) = Prompter::new(store, Vec::<u8>::new());
        prompter
            .load_session(SessionDescriptor::new(DEFAULT_SESSION).with_eager_save(true))
            .expect("load session");
        send_str(&keys, "make test");
        keys.send(Key::Enter).expect("send key");
        let line = prompter.prompt(PromptRequest::default()).await.expect("prompt");
        assert_eq!(line, "make test");
    }

    // A fresh prompter over the same directory sees the committed entry.
    let store = JsonFileStore::new(dir.path());
    let (mut prompter, keys) = Prompter::new(store, Vec::<u8>::new());
    keys.send(Key::Up).expect("send key");
    keys.send(Key::Enter).expect("send key");
    let recalled = prompter.prompt(PromptRequest::default()).await.expect("prompt");
    assert_eq!(recalled, "make test");
}

#[tokio::test]
async fn corrupted_history_file_degrades_to_empty_history() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("default-history.json");
    std::fs::write(&path, "[\"ls\", truncated").expect("write corrupt file");

    let store = JsonFileStore::new(dir.path());
    let (mut prompter, keys) = Prompter::new(store, Vec::<u8>::new());
    send_str(&keys, "ok");
    keys.send(Key::Enter).expect("send key");

    // The prompt stays usable and starts from a clean list.
    let line = prompter.prompt(PromptRequest::default()).await.expect("prompt");
    assert_eq!(line, "ok");
    assert_eq!(
        prompter.history(DEFAULT_SESSION).expect("session history"),
        &["ok".to_string(), String::new()]
    );
}

#[tokio::test]
async fn storage_key_overrides_session_name() {
    let dir = TempDir::new().expect("tempdir");
    let store = JsonFileStore::new(dir.path());
    let (mut prompter, keys) = Prompter::new(store, Vec::<u8>::new());
    prompter
        .load_session(
            SessionDescriptor::new("files")
                .with_storage_key("shared")
                .with_eager_save(true),
        )
        .expect("load session");

    send_str(&keys, "a.txt");
    keys.send(Key::Enter).expect("send key");
    prompter.prompt(PromptRequest::named("files")).await.expect("prompt");

    assert!(dir.path().join("shared-history.json").exists());
    assert!(!dir.path().join("files-history.json").exists());
}
