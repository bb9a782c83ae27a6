//! Deterministic local stream for development.
//!
//! When `Config::should_mock_ai_response` is set, call sites swap
//! this generator in for a real adapter, so the rest of the pipeline
//! can be exercised without spending API credits. The adapters
//! themselves never know the flag exists.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::types::Completion;

const CHUNK_SIZE: usize = 64;
const CHUNK_DELAY: Duration = Duration::from_millis(10);

// The page body contains `"#` (bare fragment anchors), so the literal
// needs double-hash delimiters.
const MOCK_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Mock Landing Page</title>
  <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-100">
  <header class="bg-white shadow">
    <div class="max-w-5xl mx-auto px-4 py-6 flex items-center justify-between">
      <h1 class="text-2xl font-bold text-gray-900">Acme Inc.</h1>
      <nav class="space-x-4">
        <a href="#" class="text-gray-600 hover:text-gray-900">Home</a>
        <a href="#" class="text-gray-600 hover:text-gray-900">Pricing</a>
        <a href="#" class="text-gray-600 hover:text-gray-900">Contact</a>
      </nav>
    </div>
  </header>
  <main class="max-w-5xl mx-auto px-4 py-12">
    <section class="text-center">
      <h2 class="text-4xl font-extrabold text-gray-900">Ship faster</h2>
      <p class="mt-4 text-lg text-gray-600">A placeholder page streamed by the local mock backend.</p>
      <button class="mt-8 px-6 py-3 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700">
        Get Started
      </button>
    </section>
  </main>
  <footer class="border-t mt-12">
    <p class="text-center text-sm text-gray-500 py-6">&copy; 2025 Acme Inc.</p>
  </footer>
</body>
</html>
"##;

/// Stream the canned page through `chunk_tx`, paced like a live
/// backend, and return the completion record an adapter would.
pub async fn stream_mock_completion(chunk_tx: mpsc::UnboundedSender<String>) -> Completion {
    let start = Instant::now();
    let mut buffer = String::with_capacity(CHUNK_SIZE);

    for ch in MOCK_HTML.chars() {
        buffer.push(ch);
        if buffer.len() >= CHUNK_SIZE {
            let _ = chunk_tx.send(std::mem::take(&mut buffer));
            tokio::time::sleep(CHUNK_DELAY).await;
        }
    }
    if !buffer.is_empty() {
        let _ = chunk_tx.send(buffer);
    }

    Completion {
        duration: start.elapsed().as_secs_f64(),
        code: MOCK_HTML.to_string(),
    }
}
