//! End-to-end tests for the key press → HTTP request pipeline.
//!
//! A real [`HttpActionSender`] talks to an in-process HTTP listener, while
//! an [`EventFeedHost`] replays a scripted radio session on its own thread.
//! Nothing here needs radio hardware or a network beyond loopback.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use keypad_bridge::application::dispatch_keys::{spawn_sender_task, KeyDispatcher};
use keypad_bridge::application::link_state::LinkStateMachine;
use keypad_bridge::application::route_events::HostEventRouter;
use keypad_bridge::application::startup::bring_up_host;
use keypad_bridge::infrastructure::http::HttpActionSender;
use keypad_bridge::infrastructure::radio::{event_feed::EventFeedHost, HidHostEvent, HostEventSink};
use keypad_core::{ConnectionState, HidReport, KeyActionTable, ReportStatus, Resolution};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serves `200 OK` to every request and reports each request path.
async fn action_server() -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let mut stream = BufReader::new(stream);
            let mut request_line = String::new();
            if stream.read_line(&mut request_line).await.is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match stream.read_line(&mut header).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => {}
                }
            }
            let _ = stream
                .get_mut()
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
            if let Some(path) = request_line.split_whitespace().nth(1) {
                let _ = tx.send(path.to_string());
            }
        }
    });

    (addr, rx)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_replayed_session_produces_requests_in_key_order() {
    // Arrange
    let (addr, mut requests) = action_server().await;
    let script = "\
# keypad wakes up and connects
ready
open connected
data ok 01 00 00 59 00 00 00 00 00
data ok 01 00 00 00 00 00 00 00 00
data ok 01 00 00 04 00 00 00 00 00
data ok 01 00 00 57 00 00 00 00 00
data ok 01 00
data err=2 01 00 00 62 00 00 00 00 00
data ok 01 00 00 58 00 00 00 00 00
close
";
    let link = Arc::new(LinkStateMachine::new());
    link.initialize();
    let (dispatcher, queue) = KeyDispatcher::new(Arc::new(KeyActionTable::keypad_default()), 16);
    let sender = Arc::new(
        HttpActionSender::new(addr, "/remote/", Duration::from_secs(5)).expect("client builds"),
    );
    let stats = dispatcher.stats_handle();
    let sender_task = spawn_sender_task(queue, sender, Arc::clone(&stats));
    let host = EventFeedHost::new("script", Cursor::new(script.as_bytes().to_vec()));
    let router = Arc::new(HostEventRouter::new(Arc::clone(&link), dispatcher.clone()));

    // Act
    bring_up_host(&host, router, "BT KB Receiver", true).expect("bring-up");
    let mut paths = Vec::new();
    for _ in 0..3 {
        let path = tokio::time::timeout(Duration::from_secs(5), requests.recv())
            .await
            .expect("request within 5 s")
            .expect("server alive");
        paths.push(path);
    }

    // Assert – unmapped, short and failed reports produce nothing
    assert_eq!(paths, vec!["/remote/1", "/remote/plus", "/remote/enter"]);

    let mut state = link.subscribe();
    state
        .wait_for(|s| *s == ConnectionState::Closed)
        .await
        .expect("state machine alive");
    assert_eq!(
        link.wait_resolved(Duration::from_millis(10)).await,
        Resolution::Closed
    );

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.queued, 3);
    assert_eq!(snapshot.unmapped, 1);

    drop(dispatcher);
    sender_task.abort();
}

#[tokio::test]
async fn test_custom_table_routes_to_custom_paths() {
    // Arrange
    let (addr, mut requests) = action_server().await;
    let table = KeyActionTable::from_named([("Numpad5", "lights/toggle")]).unwrap();
    let (dispatcher, queue) = KeyDispatcher::new(Arc::new(table), 4);
    let sender = Arc::new(
        HttpActionSender::new(addr, "/api/", Duration::from_secs(5)).expect("client builds"),
    );
    let _task = spawn_sender_task(queue, sender, dispatcher.stats_handle());
    let link = Arc::new(LinkStateMachine::new());
    let router = HostEventRouter::new(link, dispatcher);

    // Act
    router.handle_event(HidHostEvent::DataIndication(HidReport::new(
        ReportStatus::Ok,
        vec![0x01, 0x00, 0x00, 0x5D, 0x00, 0x00, 0x00, 0x00, 0x00],
    )));

    // Assert
    let path = tokio::time::timeout(Duration::from_secs(5), requests.recv())
        .await
        .expect("request within 5 s")
        .expect("server alive");
    assert_eq!(path, "/api/lights/toggle");
}
