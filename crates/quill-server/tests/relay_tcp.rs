//! Relay integration tests over real TCP sockets.
//!
//! Each test binds a relay on an ephemeral port and connects full client
//! sessions (controller + transport) to it, or raw sockets where the test
//! needs to speak the wire protocol directly.

use std::sync::Arc;
use std::time::Duration;

use quill_client::{
    ClientConfig, Lifecycle, MemorySurface, SessionHandle, SessionSnapshot, connect_session,
};
use quill_server::{Relay, RelayConfig};
use quill_types::{ServerMessage, SiteId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

// ============================================================================
// Shared test setup
// ============================================================================

async fn start_relay(history_limit: usize) -> String {
    let config = RelayConfig {
        bind: "127.0.0.1".into(),
        port: 0,
        history_limit,
    };
    let listener = quill_server::bind(&config).await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(quill_server::serve(listener, Arc::new(Relay::new(history_limit))));
    addr
}

fn client_config(addr: &str) -> ClientConfig {
    ClientConfig {
        relay_addr: addr.to_string(),
        debounce_ms: 10,
        ..ClientConfig::default()
    }
}

async fn join(addr: &str) -> (SessionHandle, MemorySurface) {
    let surface = MemorySurface::new();
    let (handle, _task) = connect_session(&client_config(addr), surface.clone())
        .await
        .unwrap();
    wait_until(&handle, |s| s.lifecycle == Lifecycle::Ready).await;
    (handle, surface)
}

async fn wait_until(
    handle: &SessionHandle,
    done: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    timeout(Duration::from_secs(5), async {
        loop {
            let snap = handle.snapshot().await.unwrap();
            if done(&snap) {
                return snap;
            }
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session did not reach expected state")
}

fn shows(text: &'static str) -> impl Fn(&SessionSnapshot) -> bool {
    move |s: &SessionSnapshot| s.display_text.as_deref() == Some(text)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_insert_then_delete_across_sites() {
    let addr = start_relay(0).await;
    let (a, a_surface) = join(&addr).await;
    let (b, b_surface) = join(&addr).await;

    assert!(a_surface.type_text("X"));
    wait_until(&b, shows("X")).await;
    assert_eq!(b_surface.current(), "X");

    assert!(b_surface.edit(""));
    wait_until(&a, shows("")).await;
    wait_until(&a, |s| s.stats.ops_applied == 1).await;
    assert_eq!(a_surface.current(), "");
}

#[tokio::test]
async fn test_sites_get_distinct_identities() {
    let addr = start_relay(0).await;
    let (a, _) = join(&addr).await;
    let (b, _) = join(&addr).await;

    let a_site = a.snapshot().await.unwrap().site_id;
    let b_site = b.snapshot().await.unwrap().site_id;
    assert!(a_site.is_assigned() && b_site.is_assigned());
    assert_ne!(a_site, b_site);
}

#[tokio::test]
async fn test_late_joiner_catches_up() {
    let addr = start_relay(0).await;
    let (a, a_surface) = join(&addr).await;

    a_surface.type_text("hel");
    wait_until(&a, |s| s.stats.batches_sent == 1).await;
    a_surface.type_text("lo");
    wait_until(&a, |s| s.stats.batches_sent == 2).await;
    a_surface.edit("help");
    wait_until(&a, |s| s.stats.batches_sent == 3).await;

    let (late, late_surface) = join(&addr).await;
    wait_until(&late, shows("help")).await;
    assert_eq!(late_surface.current(), "help");
}

#[tokio::test]
async fn test_full_log_turns_new_sites_away() {
    let addr = start_relay(1).await;
    let (a, a_surface) = join(&addr).await;

    a_surface.type_text("a");
    wait_until(&a, |s| s.stats.batches_sent == 1).await;
    a_surface.type_text("b");
    wait_until(&a, |s| s.stats.batches_sent == 2).await;

    // The relay closes the socket without ever assigning an identity.
    let stream = TcpStream::connect(&addr).await.unwrap();
    let mut lines = BufReader::new(stream).lines();
    let first = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, None);
}

#[tokio::test]
async fn test_concurrent_typing_converges() {
    let addr = start_relay(0).await;
    let (a, a_surface) = join(&addr).await;
    let (b, b_surface) = join(&addr).await;

    a_surface.type_text("left");
    b_surface.type_text("right");

    let a_snap = wait_until(&a, |s| s.display_text.as_ref().is_some_and(|t| t.len() == 9)).await;
    let b_snap = wait_until(&b, |s| s.display_text.as_ref().is_some_and(|t| t.len() == 9)).await;
    assert_eq!(a_snap.display_text, b_snap.display_text);
}

#[tokio::test]
async fn test_malformed_line_is_skipped() {
    let addr = start_relay(0).await;

    let stream = TcpStream::connect(&addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let first = lines.next_line().await.unwrap().unwrap();
    assert_eq!(
        ServerMessage::from_line(&first).unwrap(),
        ServerMessage::SiteId(SiteId::new(1))
    );

    let (b, b_surface) = join(&addr).await;

    write.write_all(b"this is not json\n").await.unwrap();
    // One insert of 'k' at the head, from site 1.
    let line = concat!(
        r#"{"event":"text_operations","data":[{"operationKind":"Insert","#,
        r#""character":{"value":"k","identity":{"siteId":1,"counter":1},"anchor":null}}]}"#,
        "\n"
    );
    write.write_all(line.as_bytes()).await.unwrap();

    wait_until(&b, shows("k")).await;
    assert_eq!(b_surface.current(), "k");
}
