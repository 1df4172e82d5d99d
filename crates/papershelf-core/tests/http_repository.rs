//! [`HttpRepository`] against a one-shot local HTTP responder.

use std::time::Duration;

use papershelf_core::{ErrorPayload, HttpRepository, PaperRepository, RepoError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accept one connection, answer it with `status` and `body`, and return the
/// request head that was received.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.expect("accept");
        let mut buf = vec![0u8; 8192];
        let mut read = 0;
        while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut buf[read..]).await.expect("read");
            if n == 0 {
                break;
            }
            read += n;
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        sock.write_all(response.as_bytes()).await.expect("write");
        sock.shutdown().await.ok();
        String::from_utf8_lossy(&buf[..read]).into_owned()
    });
    (format!("http://{addr}"), handle)
}

fn repo(base: &str) -> HttpRepository {
    HttpRepository::new(base, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn list_papers_decodes_backend_json() {
    let body = r#"[{"paper_id": 3, "title": "T", "authors": [{"name": "A"}],
                   "status": "Completed", "isFavourite": false,
                   "addedDate": "2024-05-01T08:00:00", "keywords": null}]"#;
    let (base, server) = respond_once("200 OK", body).await;
    let papers = repo(&base).list_papers().await.expect("papers");
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].paper_id, 3);
    assert!(papers[0].keywords.is_empty());
    let head = server.await.expect("server");
    assert!(head.starts_with("GET /papers HTTP/1.1"));
}

#[tokio::test]
async fn not_found_keeps_detail_payload() {
    let (base, server) = respond_once("404 Not Found", r#"{"detail": "Paper not found"}"#).await;
    let err = repo(&base).get_paper(42).await.expect_err("404");
    match &err {
        RepoError::Server { status, payload } => {
            assert_eq!(*status, 404);
            assert_eq!(payload, &ErrorPayload::Detail("Paper not found".into()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "Paper not found");
    let head = server.await.expect("server");
    assert!(head.starts_with("GET /paper_/42 "));
}

#[tokio::test]
async fn collection_name_is_percent_encoded() {
    let (base, server) = respond_once("200 OK", "{}").await;
    repo(&base)
        .delete_collection("Machine Learning")
        .await
        .expect("deleted");
    let head = server.await.expect("server");
    assert!(head.starts_with("DELETE /delete-collection/Machine%20Learning/ "));
}

#[tokio::test]
async fn empty_error_body_uses_fallback_message() {
    let (base, server) = respond_once("502 Bad Gateway", "").await;
    let err = repo(&base).delete_paper(1).await.expect_err("502");
    assert_eq!(err.user_message(), "Request failed (HTTP 502)");
    server.await.expect("server");
}

#[tokio::test]
async fn chatbot_reply_is_unwrapped_from_json_string() {
    let (base, server) = respond_once("200 OK", r#""It is about graphs.""#).await;
    let reply = repo(&base)
        .ask_chatbot("what?", Some(7), 2)
        .await
        .expect("reply");
    assert_eq!(reply, "It is about graphs.");
    let head = server.await.expect("server");
    assert!(head.starts_with("POST /chatbot?"));
    assert!(head.contains("paper_id=7"));
    assert!(head.contains("top_k=2"));
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let err = repo(&format!("http://{addr}"))
        .list_papers()
        .await
        .expect_err("refused");
    assert!(matches!(err, RepoError::Network(_)));
}
