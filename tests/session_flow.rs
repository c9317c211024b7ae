/// End-to-end session tests for IP Tracker.
///
/// These tests drive a `Session` against a mock lookup service and check what
/// ends up in the session log, the history file and the saved-result file:
/// - a successful lookup is displayed and recorded once,
/// - rejected and failed lookups leave every log untouched,
/// - flushing at the end of a session merges into the existing file,
/// - a saved result reloads with its capture time.
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iptracker::models::{now_timestamp, DATETIME_FIELD};
use iptracker::{
    Command, HistoryRecord, HistoryScope, HistoryStore, LookupClient, Outcome, SavedResultStore,
    Session, ThemeName, TrackerError,
};

fn session_for(uri: &str, dir: &Path) -> Session {
    Session::new(
        LookupClient::new(uri).expect("mock server URI is valid"),
        HistoryStore::new(dir.join("data.json")),
        SavedResultStore::new(dir.join("fetched_data.json")),
        ThemeName::Classic,
    )
}

async fn mount_google_dns(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/8.8.8.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "8.8.8.8",
            "country": "US"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lookup_displays_and_records() {
    let server = MockServer::start().await;
    mount_google_dns(&server).await;
    let dir = tempdir().unwrap();
    let uri = server.uri();
    let dir_path = dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = session_for(&uri, &dir_path);
        let started = now_timestamp();
        let outcome = session
            .execute(Command::Lookup { query: "8.8.8.8".to_string(), save: false })
            .unwrap();

        let Outcome::Fetched { result, saved } = outcome else {
            panic!("expected a fetched result");
        };
        assert!(!saved);
        let text = result.display_text();
        assert!(text.contains("IP : 8.8.8.8"));
        assert!(text.contains("COUNTRY : US"));

        let records: Vec<&HistoryRecord> = session.history().list_session().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query, "8.8.8.8");
        // Millisecond timestamps: allow for the rounding of both readings.
        assert!(records[0].timestamp >= started - 0.001);
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_rejected_and_failed_lookups_record_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ab"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/999.999.1.1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"title": "Wrong ip", "message": "Please provide a valid IP address"}
        })))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let uri = server.uri();
    let dir_path = dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = session_for(&uri, &dir_path);

        let short = session.execute(Command::Lookup { query: "ab".to_string(), save: false });
        assert!(matches!(short, Err(TrackerError::InvalidQuery { .. })));

        let remote = session.execute(Command::Lookup { query: "999.999.1.1".to_string(), save: true });
        match remote {
            Err(TrackerError::Remote { title, message, .. }) => {
                assert_eq!(title, "Wrong ip");
                assert_eq!(message, "Please provide a valid IP address");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(session.history().session_len(), 0);
        assert_eq!(session.finish().unwrap(), None);
        assert!(!dir_path.join("data.json").exists());
        assert!(!dir_path.join("fetched_data.json").exists());
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_finish_merges_into_existing_history() {
    let server = MockServer::start().await;
    mount_google_dns(&server).await;
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("data.json"), r#"[{"ip": "1.1.1.1", "timestamp": 100.0}]"#).unwrap();
    let uri = server.uri();
    let dir_path = dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = session_for(&uri, &dir_path);
        session.execute(Command::Lookup { query: "8.8.8.8".to_string(), save: false }).unwrap();
        session.execute(Command::Lookup { query: "8.8.8.8".to_string(), save: false }).unwrap();
        assert_eq!(session.finish().unwrap(), Some(3));

        let outcome = session.execute(Command::ShowHistory(HistoryScope::Persisted)).unwrap();
        let Outcome::History { records, .. } = outcome else {
            panic!("expected history");
        };
        let queries: Vec<&str> = records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["1.1.1.1", "8.8.8.8", "8.8.8.8"]);

        session.execute(Command::ClearHistory(HistoryScope::Persisted)).unwrap();
        let outcome = session.execute(Command::ShowHistory(HistoryScope::Persisted)).unwrap();
        assert!(matches!(outcome, Outcome::History { records, .. } if records.is_empty()));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_lookup_and_save_then_show_saved() {
    let server = MockServer::start().await;
    mount_google_dns(&server).await;
    let dir = tempdir().unwrap();
    let uri = server.uri();
    let dir_path = dir.path().to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut session = session_for(&uri, &dir_path);
        let outcome = session
            .execute(Command::Lookup { query: "8.8.8.8".to_string(), save: true })
            .unwrap();
        let Outcome::Fetched { result, saved: true } = outcome else {
            panic!("expected a saved result");
        };

        let Outcome::Saved(loaded) = session.execute(Command::ShowSaved).unwrap() else {
            panic!("expected the saved result");
        };
        assert_eq!(loaded.len(), result.len() + 1);
        assert!(loaded.get(DATETIME_FIELD).is_some());
        assert_eq!(loaded.get("ip"), result.get("ip"));
        assert_eq!(loaded.get("country"), result.get("country"));
    })
    .await
    .unwrap();
}
