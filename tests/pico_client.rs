use hydro_relay::config::PeerConfig;
use hydro_relay::pico_client::{PicoClient, PollResult};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TIMEOUT: Duration = Duration::from_millis(200);
const RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy)]
enum PeerBehavior {
    /// Answer every request with the given status and body
    Respond(&'static str, &'static str),
    /// Accept the connection but never answer
    Hang,
}

struct MockPeer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockPeer {
    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockPeer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// Integration tests for the retrying peer client
async fn start_mock_peer(behavior: PeerBehavior) -> MockPeer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock peer");
    let addr = listener.local_addr().expect("failed to get local address");
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let counter = counter.clone();

            tokio::spawn(async move {
                let mut reader = BufReader::new(&mut stream);

                // Read HTTP headers
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                        return;
                    }

                    if line.trim().is_empty() {
                        break;
                    }
                }

                counter.fetch_add(1, Ordering::SeqCst);

                match behavior {
                    PeerBehavior::Respond(status, body) => {
                        let http_response = format!(
                            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = stream.write_all(http_response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                    PeerBehavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            });
        }
    });

    MockPeer {
        addr,
        requests,
        handle,
    }
}

fn client_for(addr: SocketAddr, max_retries: u32) -> PicoClient {
    PicoClient::new(PeerConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        max_retries,
        timeout: TIMEOUT,
        retry_delay: RETRY_DELAY,
    })
    .expect("failed to create peer client")
}

#[tokio::test]
async fn test_poll_returns_first_valid_reading() {
    let peer = start_mock_peer(PeerBehavior::Respond(
        "200 OK",
        r#"{"tag_detected": true, "timestamp": 123}"#,
    ))
    .await;
    let client = client_for(peer.addr, 3);

    let result = client.poll().await;

    assert_eq!(peer.requests(), 1);
    assert!(result.tag_detected);
    assert_eq!(result.position.as_deref(), Some("unknown"));
    assert_eq!(result.timestamp, Some(json!(123)));
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_poll_retries_on_timeout_for_every_retry_count() {
    for max_retries in 1..=3 {
        let peer = start_mock_peer(PeerBehavior::Hang).await;
        let client = client_for(peer.addr, max_retries);

        let started = Instant::now();
        let result = client.poll().await;
        let elapsed = started.elapsed();

        assert_eq!(peer.requests(), max_retries as usize, "retries: {max_retries}");
        assert!(
            elapsed >= TIMEOUT * max_retries + RETRY_DELAY * (max_retries - 1),
            "retries: {max_retries}, elapsed: {elapsed:?}"
        );
        assert_eq!(result, PollResult::unreachable());
    }
}

#[tokio::test]
async fn test_poll_retries_when_tag_detected_is_missing() {
    let peer = start_mock_peer(PeerBehavior::Respond("200 OK", r#"{"timestamp": 5}"#)).await;
    let client = client_for(peer.addr, 3);

    let started = Instant::now();
    let result = client.poll().await;

    assert_eq!(peer.requests(), 3);
    assert!(started.elapsed() >= RETRY_DELAY * 2);
    assert!(!result.tag_detected);
    assert_eq!(result.error.as_deref(), Some(PollResult::UNREACHABLE_MESSAGE));
}

#[tokio::test]
async fn test_poll_retries_on_malformed_json() {
    let peer = start_mock_peer(PeerBehavior::Respond("200 OK", "not json")).await;
    let client = client_for(peer.addr, 2);

    let result = client.poll().await;

    assert_eq!(peer.requests(), 2);
    assert_eq!(result, PollResult::unreachable());
}

#[tokio::test]
async fn test_poll_retries_on_error_status() {
    let peer = start_mock_peer(PeerBehavior::Respond(
        "503 Service Unavailable",
        r#"{"tag_detected": true}"#,
    ))
    .await;
    let client = client_for(peer.addr, 2);

    let result = client.poll().await;

    assert_eq!(peer.requests(), 2);
    assert_eq!(result, PollResult::unreachable());
}

#[tokio::test]
async fn test_poll_gives_up_when_connection_is_refused() {
    // Reserve a free port, then close it so nothing is listening there
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        listener.local_addr().expect("failed to get local address")
    };
    let client = client_for(addr, 3);

    let started = Instant::now();
    let result = client.poll().await;

    assert!(started.elapsed() >= RETRY_DELAY * 2);
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "tag_detected": false,
            "position": null,
            "timestamp": null,
            "error": "Kon geen verbinding maken met Pico W of geen geldige response ontvangen",
        })
    );
}
