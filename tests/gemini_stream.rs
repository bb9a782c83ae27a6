//! End-to-end tests for the Gemini streaming adapter, run against a
//! local server that speaks the same SSE chunk format.

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use snapcode::{ChatMessage, GeminiClient, Llm, StreamError, Timeouts};

use mock_server::{
    spawn_byte_chunk_server, spawn_error_server, spawn_hanging_server, spawn_stream_server,
};

/// One SSE data payload in the Gemini chunk shape.
fn chunk_json(parts: &[(&str, bool)]) -> String {
    let parts: Vec<_> = parts
        .iter()
        .map(|(text, thought)| json!({"text": text, "thought": thought}))
        .collect();
    json!({"candidates": [{"content": {"parts": parts}}]}).to_string()
}

fn image_request() -> Vec<ChatMessage> {
    vec![ChatMessage::user_with_image(
        "Generate code for this screenshot",
        "data:image/png;base64,aGVsbG8=",
    )]
}

#[tokio::test]
async fn streams_code_chunks_and_suppresses_thoughts() {
    let lines = vec![
        chunk_json(&[("sketching the layout first", true)]),
        chunk_json(&[("<html>", false)]),
        chunk_json(&[("</html>", false)]),
    ];
    let (url, shutdown) = spawn_stream_server(lines).await;
    let client = GeminiClient::new("test-key".to_string(), Some(url));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let completion = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap();

    assert_eq!(completion.code, "<html></html>");
    assert!(completion.duration >= 0.0);
    assert_eq!(rx.recv().await.unwrap(), "<html>");
    assert_eq!(rx.recv().await.unwrap(), "</html>");
    assert!(rx.recv().await.is_none());
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn sink_concatenation_equals_final_code() {
    let lines = vec![
        chunk_json(&[("const a = 1;\n", false), ("const b = 2;\n", false)]),
        chunk_json(&[("console.log(a + b);\n", false)]),
    ];
    let (url, shutdown) = spawn_stream_server(lines).await;
    let client = GeminiClient::new("test-key".to_string(), Some(url));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let completion = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap();

    let mut streamed = String::new();
    while let Some(chunk) = rx.recv().await {
        streamed.push_str(&chunk);
    }
    assert_eq!(streamed, completion.code);
    assert_eq!(
        completion.code,
        "const a = 1;\nconst b = 2;\nconsole.log(a + b);\n"
    );
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn reassembles_code_point_split_across_network_chunks() {
    // The 'é' (0xC3 0xA9) is cut across two body chunks.
    let frame = format!("data: {}\n\n", chunk_json(&[("<p>café</p>", false)])).into_bytes();
    let cut = frame.iter().position(|&b| b == 0xC3).unwrap() + 1;
    let frames = vec![frame[..cut].to_vec(), frame[cut..].to_vec()];
    let (url, shutdown) = spawn_byte_chunk_server(frames).await;
    let client = GeminiClient::new("test-key".to_string(), Some(url));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let completion = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap();

    assert_eq!(completion.code, "<p>café</p>");
    assert_eq!(rx.recv().await.unwrap(), "<p>café</p>");
    assert!(rx.recv().await.is_none());
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn times_out_when_stream_hangs() {
    let lines = vec![chunk_json(&[("<div>", false)])];
    let (url, shutdown) = spawn_hanging_server(lines).await;
    let timeouts = Timeouts {
        gemini_default: Duration::from_secs(1),
        ..Timeouts::default()
    };
    let client = GeminiClient::new("test-key".to_string(), Some(url)).with_timeouts(timeouts);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StreamError::Timeout {
            model: Llm::Gemini20Flash,
            timeout_secs: 1,
        }
    ));

    // The chunk sent before the hang made it through, then the sink
    // closed with the cancelled call; nothing arrives after the bound.
    assert_eq!(rx.recv().await.unwrap(), "<div>");
    assert!(rx.recv().await.is_none());
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn surfaces_api_error_status_and_body() {
    let (url, shutdown) = spawn_error_server(500, "backend exploded").await;
    let client = GeminiClient::new("test-key".to_string(), Some(url));
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap_err();

    match err {
        StreamError::Api { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected Api error, got: {:?}", other),
    }
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn missing_image_fails_before_any_request() {
    // Unroutable base: if the adapter tried the network first, this
    // would come back as a transport error instead.
    let client = GeminiClient::new(
        "test-key".to_string(),
        Some("http://127.0.0.1:9".to_string()),
    );
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = client
        .stream_completion(&[ChatMessage::user("text only")], Llm::Gemini20Flash, tx)
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::MissingImage));
}

#[tokio::test]
async fn malformed_chunk_is_a_decode_error() {
    let lines = vec!["{not valid json".to_string()];
    let (url, shutdown) = spawn_stream_server(lines).await;
    let client = GeminiClient::new("test-key".to_string(), Some(url));
    let (tx, _rx) = mpsc::unbounded_channel();

    let err = client
        .stream_completion(&image_request(), Llm::Gemini20Flash, tx)
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Decode(_)));
    let _ = shutdown.send(()).await;
}
