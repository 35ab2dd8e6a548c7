//! WebSocket session handler tests.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle};
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::ports::ChangePublisher;
use crate::domain::{ChangeEvent, RecordKind, UserId};
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::outbound::feed::ChangeHub;

#[fixture]
async fn start_ws_server() -> (String, Arc<ChangeHub>, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let hub = Arc::new(ChangeHub::new());
    let ws_state = WsState::new(hub.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, hub, server)
}

async fn connect(url: &str, user_id: &UserId) -> actix_codec::Framed<BoxedSocket, Codec> {
    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws/{}", user_id.as_uuid()))
        .connect()
        .await
        .expect("websocket connect");
    socket
}

async fn next_text_frame(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) -> Vec<u8> {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return bytes.to_vec(),
            Frame::Ping(payload) => {
                socket
                    .send(Message::Pong(payload))
                    .await
                    .expect("send pong");
            }
            Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn forwards_change_events_as_json_frames(
    #[future] start_ws_server: (String, Arc<ChangeHub>, Server),
) {
    let (url, hub, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let user_id = UserId::random();
    let mut socket = connect(&url, &user_id).await;
    // Let the session subscribe before publishing; the hub does not replay.
    next_ping(&mut socket).await;

    hub.publish(ChangeEvent::insert(
        user_id,
        RecordKind::Link,
        &json!({ "title": "My site" }),
    ));

    let body = next_text_frame(&mut socket).await;
    let payload: Value = serde_json::from_slice(&body).expect("json frame");
    assert_eq!(payload["userId"], user_id.as_uuid().to_string());
    assert_eq!(payload["record"], "link");
    assert_eq!(payload["action"], "insert");
    assert_eq!(payload["data"]["title"], "My site");

    stop_server(handle).await;
}

#[rstest]
#[actix_rt::test]
async fn does_not_forward_other_users_events(
    #[future] start_ws_server: (String, Arc<ChangeHub>, Server),
) {
    let (url, hub, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let subscriber = UserId::random();
    let other = UserId::random();
    let mut socket = connect(&url, &subscriber).await;
    next_ping(&mut socket).await;

    hub.publish(ChangeEvent::insert(
        other,
        RecordKind::Tip,
        &json!({ "amount": 1.0 }),
    ));
    hub.publish(ChangeEvent::insert(
        subscriber,
        RecordKind::Notification,
        &json!({ "message": "hello" }),
    ));

    let body = next_text_frame(&mut socket).await;
    let payload: Value = serde_json::from_slice(&body).expect("json frame");
    assert_eq!(payload["userId"], subscriber.as_uuid().to_string());
    assert_eq!(payload["record"], "notification");

    stop_server(handle).await;
}

#[rstest]
#[actix_rt::test]
async fn client_close_tears_down_the_subscription(
    #[future] start_ws_server: (String, Arc<ChangeHub>, Server),
) {
    let (url, hub, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let user_id = UserId::random();
    let mut socket = connect(&url, &user_id).await;
    next_ping(&mut socket).await;
    assert_eq!(hub.subscriber_count(), 1);

    socket
        .send(Message::Close(None))
        .await
        .expect("send close");
    drop(socket);

    wait_for_teardown(&hub).await;
    assert_eq!(hub.subscriber_count(), 0);

    stop_server(handle).await;
}

#[rstest]
#[actix_rt::test]
async fn rejects_malformed_user_id(#[future] start_ws_server: (String, Arc<ChangeHub>, Server)) {
    let (url, _hub, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let result = awc::Client::default()
        .ws(format!("{url}/ws/not-a-uuid"))
        .connect()
        .await;
    assert!(result.is_err());

    stop_server(handle).await;
}

/// Wait until the server's session has registered with the hub, using the
/// first heartbeat ping as the signal.
async fn next_ping(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        if let Frame::Ping(payload) = frame {
            socket
                .send(Message::Pong(payload))
                .await
                .expect("send pong");
            return;
        }
    }
}

async fn wait_for_teardown(hub: &ChangeHub) {
    for _ in 0..50 {
        if hub.subscriber_count() == 0 {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

async fn stop_server(handle: ServerHandle) {
    handle.stop(true).await;
}
