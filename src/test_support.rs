//! 테스트용 로컬 HTTP 서버
//!
//! 외부 네트워크 없이 fetcher / report / CLI 경로를 검증하기 위해
//! `TcpListener` 위에 고정 응답을 돌려주는 최소 서버를 띄웁니다.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 고정된 HTML 본문을 응답하는 서버를 띄우고 베이스 URL 반환
pub(crate) async fn serve_html(status: u16, body: &str) -> String {
    serve_raw(status, "text/html; charset=utf-8", body.as_bytes().to_vec()).await
}

/// 임의의 바이트 본문을 응답하는 서버
pub(crate) async fn serve_raw(status: u16, content_type: &str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut response = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(&body);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let response = response.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/")
}

/// 연결은 받지만 응답하지 않는 서버
pub(crate) async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}/")
}

/// 바인딩 후 즉시 닫아 연결 거부되는 주소
pub(crate) async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// 항상 패닉하는 추출기
pub(crate) struct PanickingExtractor;

impl crate::extractor::ContentExtractor for PanickingExtractor {
    fn extract_main_text(&self, _markup: &str) -> String {
        panic!("extractor blew up");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
