//! Backends against a throwaway local HTTP server speaking canned responses.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use ocelot::core::adapters::FragmentStream;
use ocelot::core::backends::{Backend, OllamaBackend};
use ocelot::core::error::Error;
use ocelot::core::fragment::Fragment;
use ocelot::core::message::Message;
use ocelot::core::providers::{build_backend, ProviderKind, ResolvedProvider};
use ocelot::core::session::ChatSession;
use ocelot::core::splitter::ReasoningSplitter;

struct CannedResponse {
    status: &'static str,
    content_type: &'static str,
    chunks: Vec<String>,
}

impl CannedResponse {
    fn ok(content_type: &'static str, chunks: &[&str]) -> Self {
        Self {
            status: "200 OK",
            content_type,
            chunks: chunks.iter().map(|chunk| chunk.to_string()).collect(),
        }
    }
}

/// Serves one request and returns the raw request text it received.
async fn serve_once(response: CannedResponse) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let length: usize = response.chunks.iter().map(String::len).sum();
        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response.status, response.content_type, length
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        for chunk in &response.chunks {
            // The client may stop reading early, so write errors are expected.
            if socket.write_all(chunk.as_bytes()).await.is_err() {
                break;
            }
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let read = socket.read(&mut buf).await.unwrap();
        if read == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..read]);

        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}

async fn drain(stream: FragmentStream, show_reasoning: bool) -> (Vec<Fragment>, ReasoningSplitter) {
    let mut splitter = ReasoningSplitter::new(show_reasoning);
    let mut fragments = Vec::new();
    let mut stream = stream;
    while let Some(fragment) = stream.next().await {
        let fragment = fragment.unwrap();
        splitter.push(&fragment);
        fragments.push(fragment);
    }
    (fragments, splitter)
}

fn resolved(kind: ProviderKind, base_url: &str, model: &str) -> ResolvedProvider {
    ResolvedProvider {
        name: kind.as_str().to_string(),
        kind,
        base_url: base_url.to_string(),
        model: model.to_string(),
        api_key: Some("test-key".to_string()),
    }
}

#[tokio::test]
async fn ollama_generate_streams_ndjson_and_hides_reasoning() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/x-ndjson",
        &[
            "{\"response\":\"<thi\"}\n",
            "{\"response\":\"nk>hidden</th\"}\n{\"resp",
            "onse\":\"ink>visible\"}\n",
            "{\"response\":\"\",\"done\":true}\n",
        ],
    ))
    .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), "ollama", base_url, "qwen3", true);
    let stream = backend.generate("Why is the sky blue?").await.unwrap();
    let (fragments, splitter) = drain(stream, false).await;

    assert_eq!(fragments.len(), 3);
    assert_eq!(splitter.content(), "visible");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/generate HTTP/1.1"));
    assert!(request.contains("\"prompt\":\"Why is the sky blue?\""));
    assert!(request.contains("\"stream\":true"));
}

#[tokio::test]
async fn ollama_sends_a_configured_credential() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/x-ndjson",
        &["{\"response\":\"ok\",\"done\":true}\n"],
    ))
    .await;

    let mut provider = resolved(ProviderKind::Ollama, &base_url, "llama3");
    provider.api_key = Some("proxy-secret".to_string());
    let backend = build_backend(provider, reqwest::Client::new(), true);
    let (_, splitter) = drain(backend.generate("hi").await.unwrap(), false).await;
    assert_eq!(splitter.content(), "ok");

    let request = server.await.unwrap().to_lowercase();
    assert!(request.contains("authorization: bearer proxy-secret"));
}

#[tokio::test]
async fn ollama_without_credential_sends_no_authorization() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/x-ndjson",
        &["{\"response\":\"ok\",\"done\":true}\n"],
    ))
    .await;

    let mut provider = resolved(ProviderKind::Ollama, &base_url, "llama3");
    provider.api_key = None;
    let backend = build_backend(provider, reqwest::Client::new(), true);
    drain(backend.generate("hi").await.unwrap(), false).await;

    let request = server.await.unwrap().to_lowercase();
    assert!(!request.contains("authorization:"));
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let (base_url, _server) = serve_once(CannedResponse {
        status: "400 Bad Request",
        content_type: "application/json",
        chunks: vec!["{\"error\":\"model 'nope' not found\"}".to_string()],
    })
    .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), "ollama", base_url, "nope", true);
    let err = match backend.generate("hi").await {
        Ok(_) => panic!("expected a status error"),
        Err(err) => err,
    };

    assert_eq!(err.status(), Some(400));
    assert!(matches!(err, Error::Status { ref body, .. } if body.contains("not found")));
}

#[tokio::test]
async fn openrouter_chat_streams_sse_with_attribution_headers() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "text/event-stream",
        &[
            ": OPENROUTER PROCESSING\n\n",
            "data: {\"choices\":[{\"delta\":{\"reasoning\":\"Let me think\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\ndata: [DONE]\n\n",
        ],
    ))
    .await;

    let backend = build_backend(
        resolved(ProviderKind::OpenRouter, &base_url, "deepseek/deepseek-r1"),
        reqwest::Client::new(),
        true,
    );
    let stream = backend.chat(&[Message::user("hello")]).await.unwrap();
    let (fragments, splitter) = drain(stream, false).await;

    assert_eq!(
        fragments,
        vec![
            Fragment::Reasoning("Let me think".to_string()),
            Fragment::Content("Hi".to_string()),
            Fragment::Content(" there".to_string()),
            Fragment::Done,
        ]
    );
    assert_eq!(splitter.content(), "Hi there");

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("post /chat/completions http/1.1"));
    assert!(request.contains("authorization: bearer test-key"));
    assert!(request.contains("http-referer: https://github.com/bazoocaze/ocelot"));
    assert!(request.contains("x-title: ocelot cli"));
    assert!(request.contains("\"model\":\"deepseek/deepseek-r1\""));
}

#[tokio::test]
async fn openai_without_streaming_reads_one_document() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/json",
        &[
            "{\"choices\":[{\"message\":{\"role\":\"assistant\",",
            "\"content\":\"<think>plan</think>Answer\"}}]}",
        ],
    ))
    .await;

    let backend = build_backend(
        resolved(ProviderKind::OpenAi, &base_url, "gpt-4o-mini"),
        reqwest::Client::new(),
        false,
    );
    let stream = backend.generate("hi").await.unwrap();
    let (fragments, splitter) = drain(stream, true).await;

    assert_eq!(fragments.len(), 1);
    assert_eq!(splitter.content(), "\\<think\\>plan\\</think\\>Answer");
    assert_eq!(splitter.answer(), "Answer");

    let request = server.await.unwrap();
    assert!(request.contains("\"stream\":false"));
    assert!(request.contains("\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]"));
}

#[tokio::test]
async fn gemini_generate_is_single_shot() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/json",
        &["{\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hello from Gemini\"}]}}]}"],
    ))
    .await;

    let backend = build_backend(
        resolved(ProviderKind::Gemini, &base_url, "gemini-2.5-flash"),
        reqwest::Client::new(),
        true,
    );
    let stream = backend.generate("hi").await.unwrap();
    let (fragments, _) = drain(stream, false).await;

    assert_eq!(
        fragments,
        vec![Fragment::Content("Hello from Gemini".to_string())]
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /models/gemini-2.5-flash:generateContent HTTP/1.1"));
    assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
}

#[tokio::test]
async fn chat_session_records_answer_from_ollama_chat() {
    let (base_url, server) = serve_once(CannedResponse::ok(
        "application/x-ndjson",
        &[
            "{\"message\":{\"role\":\"assistant\",\"content\":\"<think>hmm\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"</think>Paris\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        ],
    ))
    .await;

    let backend = OllamaBackend::new(reqwest::Client::new(), "ollama", base_url, "qwen3", true);
    let mut session = ChatSession::new(Box::new(backend));
    let mut updates = Vec::new();

    let answer = session
        .ask(
            "Capital of France?",
            false,
            &CancellationToken::new(),
            |_, splitter| {
                updates.push(splitter.content().to_string());
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(answer, "Paris");
    assert_eq!(updates, vec!["".to_string(), "Paris".to_string()]);
    assert_eq!(
        session.log().messages(),
        &[
            Message::user("Capital of France?"),
            Message::assistant("Paris")
        ]
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat HTTP/1.1"));
    assert!(request.contains("\"messages\":[{\"role\":\"user\",\"content\":\"Capital of France?\"}]"));
}
