/// Integration tests for the request ledger through its public API
use hoststats::config::LedgerConfig;
use hoststats::ledger::{HostIdentity, LedgerPage, LedgerStore};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> LedgerConfig {
    LedgerConfig {
        database_path: dir.path().join("requests.db").to_string_lossy().into_owned(),
        create_parent_dir: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sequential_starts_share_one_server_row() {
    let dir = TempDir::new().unwrap();
    let identity = HostIdentity::new("node-a", "192.168.1.20", "Linux-6.8-aarch64");

    // First process
    let first = LedgerStore::open(&config_in(&dir)).await;
    let first_id = first.register_self(&identity).await;
    first.put_request(Some("10.0.0.1"), Some("curl/8.0"), Some("http://node-a/")).await;
    first.close().await;

    // Restart on the same host
    let second = LedgerStore::open(&config_in(&dir)).await;
    let second_id = second.register_self(&identity).await;

    assert!(first_id > 0);
    assert_eq!(first_id, second_id);
    assert_eq!(second.total_servers().await, 1);

    let servers = second.list_servers(1, 10).await;
    assert_eq!(servers.rows().len(), 1);
    assert_eq!(servers.rows()[0].hostname, "node-a");
    assert_eq!(servers.rows()[0].request_count, 1);
}

#[tokio::test]
async fn test_instances_on_different_hosts_get_distinct_ids() {
    let dir = TempDir::new().unwrap();

    let a = LedgerStore::open(&config_in(&dir)).await;
    let b = LedgerStore::open(&config_in(&dir)).await;
    let id_a = a.register_self(&HostIdentity::new("pod-0", "10.1.0.10", "Linux")).await;
    let id_b = b.register_self(&HostIdentity::new("pod-1", "10.1.0.11", "Linux")).await;
    assert_ne!(id_a, id_b);

    a.put_request(Some("1.1.1.1"), None, Some("/")).await;
    b.put_request(Some("2.2.2.2"), None, Some("/")).await;
    b.put_request(Some("2.2.2.2"), None, Some("/servers")).await;

    let for_b = a.list_requests_for_server(id_b, 1, 10).await;
    assert_eq!(for_b.rows().len(), 2);
    assert!(for_b.rows().iter().all(|r| r.server_id == id_b));
    assert_eq!(a.last_request_for_server(id_b).await, 3);
    assert_eq!(
        a.server_socket(id_a).await,
        Some(("pod-0".to_string(), "10.1.0.10".to_string()))
    );
}

#[tokio::test]
async fn test_request_windows_never_skip_or_duplicate() {
    let dir = TempDir::new().unwrap();
    let store = LedgerStore::open(&config_in(&dir)).await;
    store.register_self(&HostIdentity::new("h", "127.0.0.1", "p")).await;

    let before = store.total_requests().await;
    for i in 0..25 {
        assert!(store.put_request(Some("::1"), Some("test"), Some(&format!("/{}", i))).await);
    }
    assert_eq!(store.total_requests().await, before + 25);

    let mut seen = Vec::new();
    for start in [1, 11, 21] {
        let page = store.list_requests(start, 10).await;
        seen.extend(page.rows().iter().map(|r| r.request_id));
    }
    // The last window snaps back to 16..=25, so 16..=20 appear twice
    assert_eq!(seen.len(), 30);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (1..=25).collect::<Vec<i64>>());

    let last = store.list_requests(21, 10).await;
    let ids: Vec<i64> = last.rows().iter().map(|r| r.request_id).collect();
    assert_eq!(ids, (16..=25).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_missing_directory_degrades_every_operation() {
    let dir = TempDir::new().unwrap();
    let config = LedgerConfig {
        database_path: dir
            .path()
            .join("absent")
            .join("requests.db")
            .to_string_lossy()
            .into_owned(),
        create_parent_dir: false,
        ..Default::default()
    };

    let store = LedgerStore::open(&config).await;

    assert!(!store.is_available());
    assert_eq!(store.register_self(&HostIdentity::new("h", "1.2.3.4", "p")).await, 0);
    assert!(!store.put_request(Some("1.2.3.4"), None, None).await);
    assert_eq!(store.total_requests().await, 0);
    assert_eq!(store.list_servers(1, 10).await, LedgerPage::NoData);
    assert_eq!(store.list_requests(1, 10).await, LedgerPage::NoData);
    assert!(!dir.path().join("absent").exists());
}

#[tokio::test]
async fn test_create_parent_dir_opens_nested_path() {
    let dir = TempDir::new().unwrap();
    let config = LedgerConfig {
        database_path: dir
            .path()
            .join("var")
            .join("lib")
            .join("requests.db")
            .to_string_lossy()
            .into_owned(),
        create_parent_dir: true,
        ..Default::default()
    };

    let store = LedgerStore::open(&config).await;
    assert!(store.is_available());
    assert!(store.put_request(None, None, None).await);
    assert_eq!(store.total_requests().await, 1);
}
