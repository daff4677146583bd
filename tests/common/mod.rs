#![allow(dead_code)]

use brandsmith::{
    BackendCredentials, GatewayConfig, GatewayContext, GenerationRequest, LLMBackend,
    LocalInferenceBackend,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// Minimal HTTP/1.1 stub: answers every request with the same canned
/// response and records what it received.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body: Arc<Vec<u8>> = Arc::new(body.into());

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    serve(stream, status, content_type, &body, &recorded).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub async fn json(status: u16, body: serde_json::Value) -> Self {
        Self::start(status, "application/json", body.to_string()).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    status: u16,
    content_type: &str,
    body: &[u8],
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    // recorded before replying so callers see it as soon as they get a response
    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body: buf[header_end..].to_vec(),
    });

    let head = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    stream.write_all(head.as_bytes()).await.ok()?;
    stream.write_all(body).await.ok()?;
    stream.flush().await.ok()?;
    Some(())
}

pub fn chat_completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test http client")
}

pub fn credentials(chat: Option<&StubServer>, image: Option<&StubServer>) -> BackendCredentials {
    let mut credentials = BackendCredentials::default();
    if let Some(server) = chat {
        credentials.chat_api_key = Some("gsk-test".to_string());
        credentials.chat_endpoint = server.url("/openai/v1/chat/completions");
    }
    if let Some(server) = image {
        credentials.image_api_key = Some("hf-test".to_string());
        credentials.image_endpoint = server.url("/models/sdxl");
    }
    credentials
}

pub fn context(
    credentials: BackendCredentials,
    artifacts_dir: &Path,
    local: LocalInferenceBackend,
) -> GatewayContext {
    let mut config = GatewayConfig::default();
    config.credentials = credentials;
    config.artifacts.directory = artifacts_dir.to_path_buf();
    config.local.enabled = false;
    GatewayContext::assemble(config, http_client(), local)
}

/// Local model double that answers with a fixed reply.
pub struct ScriptedModel {
    pub reply: String,
}

impl LLMBackend for ScriptedModel {
    fn generate(&mut self, request: &GenerationRequest) -> brandsmith::Result<String> {
        Ok(format!("{} ({})", self.reply, request.prompt_text))
    }
}

/// Local model double whose decode always fails.
pub struct FailingModel;

impl LLMBackend for FailingModel {
    fn generate(&mut self, _request: &GenerationRequest) -> brandsmith::Result<String> {
        Err(brandsmith::GatewayError::Tokenizer(
            "token id out of range".to_string(),
        ))
    }
}
