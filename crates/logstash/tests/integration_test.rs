// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use logstash::{
    adapter::LogstashAdapter,
    config::AdapterConfig,
    errors::ConstructionError,
    message::{Container, Message},
    route::Route,
    transport::TransportRegistry,
};
use serde_json::{json, Value};
use tokio::{
    io::AsyncReadExt,
    net::{TcpListener, UdpSocket},
    sync::mpsc,
    time::{timeout, Duration},
};

fn container() -> Container {
    Container {
        name: "web".to_string(),
        id: "c1".to_string(),
        image: "nginx".to_string(),
        hostname: "h1".to_string(),
    }
}

#[tokio::test]
async fn tcp_route_streams_back_to_back_records() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("unable to bind TCP listener");
    let route = Route::parse(&format!(
        "logstash://{}",
        listener.local_addr().expect("no local address")
    ))
    .expect("failed to parse route");

    let adapter = LogstashAdapter::new(
        route,
        &AdapterConfig::default(),
        &TransportRegistry::with_builtin(),
    )
    .await
    .expect("failed to construct adapter");
    let (mut socket, _) = listener.accept().await.expect("no connection");

    let (tx, rx) = mpsc::channel(8);
    let stream_task = tokio::spawn(adapter.stream(rx));
    for data in [r#"{"a":1}"#, "not-json", ""] {
        tx.send(Message::new(data, container()))
            .await
            .expect("channel closed");
    }
    drop(tx);
    stream_task.await.expect("stream task failed");

    let mut received = Vec::new();
    timeout(Duration::from_secs(5), socket.read_to_end(&mut received))
        .await
        .expect("timed out reading from adapter")
        .expect("read failed");

    // no delimiter between records
    let records: Vec<Value> = serde_json::Deserializer::from_slice(&received)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .expect("stream was not a sequence of json objects");

    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0],
        json!({
            "docker.name": "web",
            "docker.id": "c1",
            "docker.image": "nginx",
            "docker.hostname": "h1",
            "data": {"a": 1}
        })
    );
    assert!(records[1]["data"]
        .as_str()
        .expect("data should be a string")
        .starts_with("ERROR: Failed to parse json: "));
    assert!(records[2].get("data").is_none());
}

#[tokio::test]
async fn udp_route_sends_one_datagram_per_record() {
    let receiver = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("unable to bind UDP socket");
    let route = Route::parse(&format!(
        "logstash+udp://{}",
        receiver.local_addr().expect("no local address")
    ))
    .expect("failed to parse route");
    let config = AdapterConfig {
        token: Some("T".to_string()),
        ..Default::default()
    };

    let adapter = LogstashAdapter::new(route, &config, &TransportRegistry::with_builtin())
        .await
        .expect("failed to construct adapter");

    let (tx, rx) = mpsc::channel(8);
    let stream_task = tokio::spawn(adapter.stream(rx));
    tx.send(Message::new("not-json", container()))
        .await
        .expect("channel closed");
    tx.send(Message::new(r#"[1,2]"#, container()))
        .await
        .expect("channel closed");
    drop(tx);
    stream_task.await.expect("stream task failed");

    let mut buf = [0u8; 1024];
    let mut records = Vec::new();
    for _ in 0..2 {
        let (amt, _) = timeout(Duration::from_secs(5), receiver.recv_from(&mut buf))
            .await
            .expect("timed out waiting for datagram")
            .expect("recv failed");
        let record: Value = serde_json::from_slice(&buf[..amt]).expect("invalid json datagram");
        records.push(record);
    }

    assert!(records[0]["data"]
        .as_str()
        .expect("data should be a string")
        .starts_with("ERROR: Failed to parse json:"));
    assert_eq!(records[1]["data"], json!([1, 2]));
    for record in &records {
        assert_eq!(record["token"], json!("T"));
    }
}

#[tokio::test]
async fn unknown_transport_never_dials() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("unable to bind TCP listener");
    let route = Route::parse(&format!(
        "logstash+carrier-pigeon://{}",
        listener.local_addr().expect("no local address")
    ))
    .expect("failed to parse route");

    let result = LogstashAdapter::new(
        route,
        &AdapterConfig::default(),
        &TransportRegistry::with_builtin(),
    )
    .await;
    assert!(matches!(
        result,
        Err(ConstructionError::TransportNotFound { .. })
    ));

    let accepted = timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}

#[tokio::test]
async fn refused_connection_fails_construction() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("unable to bind TCP listener");
    let address = listener.local_addr().expect("no local address");
    drop(listener);

    let result = LogstashAdapter::new(
        Route::new("logstash", address.to_string()),
        &AdapterConfig::default(),
        &TransportRegistry::with_builtin(),
    )
    .await;
    assert!(matches!(result, Err(ConstructionError::Connection(_))));
}
