use chrono::Utc;
use friendverse_sync::{JsonBinConfig, JsonBinRemote, RemoteStore, SyncError};
use friendverse_types::{DeviceId, Post, Snapshot, SnapshotPatch, Stamp, User, UserRole};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn make_user(id: &str, name: &str, at: u64) -> User {
    User {
        id: id.into(),
        email: format!("{name}@example.com"),
        username: name.to_owned(),
        display_name: name.to_owned(),
        birthdate: "1990-01-01".to_owned(),
        avatar: None,
        role: UserRole::User,
        updated_at: Stamp::new(at, 0),
    }
}

fn make_post(id: &str, content: &str, at: u64) -> Post {
    Post {
        id: id.into(),
        user_id: "user-1".into(),
        content: content.to_owned(),
        attachments: Vec::new(),
        likes: Vec::new(),
        comments: Vec::new(),
        created_at: Utc::now(),
        updated_at: Stamp::new(at, 0),
    }
}

fn users_patch(users: Vec<User>) -> SnapshotPatch {
    SnapshotPatch {
        users: Some(users),
        ..SnapshotPatch::default()
    }
}

fn posts_patch(posts: Vec<Post>) -> SnapshotPatch {
    SnapshotPatch {
        posts: Some(posts),
        ..SnapshotPatch::default()
    }
}

fn mock_config(server: &MockServer) -> JsonBinConfig {
    JsonBinConfig {
        api_key: "test-master-key".to_owned(),
        api_base_url: server.uri(),
        ..JsonBinConfig::default()
    }
}

// ── Configuration ───────────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = JsonBinConfig::default();
    assert_eq!(config.api_key, "");
    assert_eq!(config.document_id, None);
    assert_eq!(config.api_base_url, "https://api.jsonbin.io");
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn config_serde_round_trip() {
    let config = JsonBinConfig {
        api_key: "key-1".to_owned(),
        document_id: Some("bin_1".to_owned()),
        api_base_url: "https://example.test".to_owned(),
        timeout_secs: 5,
    };

    let raw = serde_json::to_string(&config).unwrap();
    let parsed: JsonBinConfig = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.api_key, config.api_key);
    assert_eq!(parsed.document_id, config.document_id);
    assert_eq!(parsed.api_base_url, config.api_base_url);
    assert_eq!(parsed.timeout_secs, config.timeout_secs);
}

#[tokio::test]
async fn provider_name_is_jsonbin() {
    let remote = JsonBinRemote::new(DeviceId::new(), JsonBinConfig::default());
    assert_eq!(remote.provider_name(), "JSONBin");
}

#[tokio::test]
async fn configured_document_id_is_adopted() {
    let config = JsonBinConfig {
        document_id: Some("bin_7".to_owned()),
        ..JsonBinConfig::default()
    };
    let remote = JsonBinRemote::new(DeviceId::new(), config);
    assert_eq!(remote.document_id().await.as_deref(), Some("bin_7"));
}

#[tokio::test]
async fn set_document_id_joins_a_shared_document() {
    let remote = JsonBinRemote::new(DeviceId::new(), JsonBinConfig::default());
    assert_eq!(remote.document_id().await, None);

    remote.set_document_id("shared-bin").await;
    assert_eq!(remote.document_id().await.as_deref(), Some("shared-bin"));
}

// ── Provisioning ────────────────────────────────────────────────

#[tokio::test]
async fn first_save_provisions_a_document() {
    let server = MockServer::start().await;
    let device = DeviceId::new();

    Mock::given(method("POST"))
        .and(path("/v3/b"))
        .and(header("X-Master-Key", "test-master-key"))
        .and(header("X-Bin-Private", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(Snapshot::empty(device)).unwrap(),
            "metadata": { "id": "bin_1", "private": true },
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_1/latest"))
        .and(header("X-Master-Key", "test-master-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(Snapshot::empty(device)).unwrap(),
            "metadata": { "id": "bin_1" },
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v3/b/bin_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": { "parentId": "bin_1" },
        })))
        .expect(2)
        .mount(&server)
        .await;

    let remote = JsonBinRemote::new(device, mock_config(&server));

    remote
        .save(users_patch(vec![make_user("u1", "alice", 100)]))
        .await
        .unwrap();
    assert_eq!(remote.document_id().await.as_deref(), Some("bin_1"));

    // The provisioned id is cached; the second save creates nothing.
    remote
        .save(users_patch(vec![make_user("u1", "alice", 101)]))
        .await
        .unwrap();
}

#[tokio::test]
async fn load_provisions_when_no_document_exists() {
    let server = MockServer::start().await;
    let device = DeviceId::new();

    Mock::given(method("POST"))
        .and(path("/v3/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(Snapshot::empty(device)).unwrap(),
            "metadata": { "id": "bin_new" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_new/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(Snapshot::empty(device)).unwrap(),
            "metadata": { "id": "bin_new" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let remote = JsonBinRemote::new(device, mock_config(&server));

    let doc = remote.load().await.unwrap().unwrap();
    assert!(doc.is_empty());
    assert_eq!(remote.document_id().await.as_deref(), Some("bin_new"));
}

#[tokio::test]
async fn failed_provisioning_leaves_no_document_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let remote = JsonBinRemote::new(DeviceId::new(), mock_config(&server));

    let err = remote.save(users_patch(Vec::new())).await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
    assert_eq!(remote.document_id().await, None);
}

// ── Saving ──────────────────────────────────────────────────────

#[tokio::test]
async fn save_merges_into_latest_remote_document() {
    let server = MockServer::start().await;
    let device_a = DeviceId::new();
    let device_b = DeviceId::new();

    let mut shared = Snapshot::empty(device_b);
    shared.users = vec![make_user("u-b", "bob", 200)];

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_9/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(&shared).unwrap(),
            "metadata": { "id": "bin_9" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/v3/b/bin_9"))
        .and(header("X-Master-Key", "test-master-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": { "parentId": "bin_9" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("bin_9".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(device_a, config);

    remote
        .save(posts_patch(vec![make_post("p1", "hello", 300)]))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.url.path() == "/v3/b/bin_9")
        .unwrap();
    let body: Snapshot = serde_json::from_slice(&put.body).unwrap();

    // The untouched collection from the shared document survives the write.
    assert_eq!(body.users, shared.users);
    assert_eq!(body.posts.len(), 1);
    assert_eq!(body.origin_device_id, device_a);
    assert!(body.last_updated >= shared.last_updated);
}

#[tokio::test]
async fn rejected_save_is_an_error() {
    let server = MockServer::start().await;
    let device = DeviceId::new();

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_2/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(Snapshot::empty(device)).unwrap(),
            "metadata": { "id": "bin_2" },
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v3/b/bin_2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("bin_2".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(device, config);

    let err = remote.save(users_patch(Vec::new())).await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

// ── Loading ─────────────────────────────────────────────────────

#[tokio::test]
async fn load_returns_the_document_record() {
    let server = MockServer::start().await;
    let device = DeviceId::new();

    let mut doc = Snapshot::empty(device);
    doc.users = vec![make_user("u1", "alice", 100)];
    doc.posts = vec![make_post("p1", "hello", 150)];

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_3/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": serde_json::to_value(&doc).unwrap(),
            "metadata": { "id": "bin_3" },
        })))
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("bin_3".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(device, config);

    let loaded = remote.load().await.unwrap().unwrap();
    assert_eq!(loaded, doc);
}

#[tokio::test]
async fn load_of_missing_document_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/b/gone/latest"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("gone".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(DeviceId::new(), config);

    assert_eq!(remote.load().await.unwrap(), None);
}

#[tokio::test]
async fn server_error_is_a_network_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_4/latest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("bin_4".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(DeviceId::new(), config);

    let err = remote.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}

#[tokio::test]
async fn auth_rejection_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/b/bin_5/latest"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = JsonBinConfig {
        document_id: Some("bin_5".to_owned()),
        ..mock_config(&server)
    };
    let remote = JsonBinRemote::new(DeviceId::new(), config);

    let err = remote.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Auth(_)));
}

#[tokio::test]
async fn unreachable_server_is_an_error() {
    // An exclusive (non-pooled) server releases its port on drop.
    let server = MockServer::builder().start().await;
    let config = JsonBinConfig {
        document_id: Some("bin_6".to_owned()),
        ..mock_config(&server)
    };
    drop(server);

    let remote = JsonBinRemote::new(DeviceId::new(), config);
    let err = remote.load().await.unwrap_err();
    assert!(matches!(err, SyncError::Network(_)));
}
