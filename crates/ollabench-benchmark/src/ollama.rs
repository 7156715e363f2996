use std::io::{BufRead, BufReader};
use std::time::Duration;

use ollabench_core::StreamConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Failure of a single call to the generation endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("connection error: {0}")]
    Connectivity(String),
    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl GenerateRequest {
    /// Non-streaming request with default sampling.
    pub fn completion(model: &str, prompt: &str, num_predict: u32) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                num_predict,
                ..Default::default()
            },
        }
    }

    pub fn streaming(config: &StreamConfig) -> Self {
        Self {
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            stream: true,
            options: GenerateOptions {
                num_predict: config.max_tokens,
                temperature: Some(config.temperature),
                top_p: Some(config.top_p),
            },
        }
    }
}

/// Body of a non-streaming `/api/generate` reply. Absent counters and
/// durations read as 0; durations are nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
    pub prompt_eval_count: u64,
    pub eval_count: u64,
    pub prompt_eval_duration: u64,
    pub eval_duration: u64,
}

/// One line of a streaming `/api/generate` reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamChunk {
    pub response: String,
    pub done: bool,
}

pub type FragmentStream = Box<dyn Iterator<Item = Result<StreamChunk, CallError>>>;

/// Transport used by the benchmark and streaming runners.
pub trait GenerateBackend {
    fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<GenerateResponse, CallError>;

    fn generate_stream(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<FragmentStream, CallError>;
}

#[derive(Clone)]
pub struct OllamaClient {
    host: String,
    agent: ureq::Agent,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        Self {
            host,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.host)
    }

    fn send(&self, call: ureq::Request, request: &GenerateRequest) -> Result<ureq::Response, CallError> {
        debug!(url = %call.url(), stream = request.stream, num_predict = request.options.num_predict, "POST");
        call.send_json(request).map_err(map_ureq_error)
    }
}

impl GenerateBackend for OllamaClient {
    #[instrument(skip(self, request), fields(host = %self.host, model = %request.model))]
    fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<GenerateResponse, CallError> {
        // Deadline covers connect, generation and reading the body.
        let call = self.agent.post(&self.generate_url()).timeout(timeout);
        let body = self
            .send(call, request)?
            .into_string()
            .map_err(|e| CallError::Connectivity(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            CallError::Decode(format!("{} - Body: {}", e, truncate(&body, 500)))
        })
    }

    #[instrument(skip(self, request), fields(host = %self.host, model = %request.model))]
    fn generate_stream(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<FragmentStream, CallError> {
        // Idle timeout per read: a long generation may stream for longer than
        // `timeout` as long as fragments keep arriving.
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        let call = agent.post(&self.generate_url());

        let reader = BufReader::new(self.send(call, request)?.into_reader());
        Ok(ndjson_chunks(reader))
    }
}

/// Decode newline-delimited stream chunks. Blank lines are skipped; the
/// stream ends after the first read error.
fn ndjson_chunks<R: BufRead + 'static>(reader: R) -> FragmentStream {
    let chunks = reader
        .lines()
        .scan(false, |failed, line| {
            if *failed {
                return None;
            }
            Some(match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(serde_json::from_str::<StreamChunk>(&line).map_err(|e| {
                    CallError::Decode(format!("{} - Line: {}", e, truncate(&line, 200)))
                })),
                Err(e) => {
                    *failed = true;
                    Some(Err(CallError::Connectivity(e.to_string())))
                }
            })
        })
        .flatten();

    Box::new(chunks)
}

/// Map ureq errors to CallError, detecting connection failures
fn map_ureq_error(e: ureq::Error) -> CallError {
    match e {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            error!(status, "Generation endpoint returned an error status");
            CallError::Protocol { status, body }
        }
        ureq::Error::Transport(t) if t.kind() == ureq::ErrorKind::ConnectionFailed => {
            error!("Connection refused - is Ollama running?");
            CallError::Connectivity(format!("connection refused - is Ollama running? ({})", t))
        }
        ureq::Error::Transport(t) => {
            error!("HTTP transport error: {}", t);
            CallError::Connectivity(t.to_string())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_completion_request_omits_sampling() {
        let request = GenerateRequest::completion("gpt-oss:20b", "Say hi", 128);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-oss:20b",
                "prompt": "Say hi",
                "stream": false,
                "options": {"num_predict": 128}
            })
        );
    }

    #[test]
    fn test_streaming_request_carries_sampling() {
        let config = StreamConfig::new("gpt-oss:20b", "Write code").with_max_tokens(500);
        let json = serde_json::to_value(GenerateRequest::streaming(&config)).unwrap();
        assert_eq!(json["stream"], true);
        assert_eq!(json["options"]["num_predict"], 500);
        assert!((json["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((json["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_response_missing_counters_default_to_zero() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"response": "hello", "done": true, "eval_count": 12}"#)
                .unwrap();
        assert_eq!(response.eval_count, 12);
        assert_eq!(response.prompt_eval_count, 0);
        assert_eq!(response.prompt_eval_duration, 0);
        assert_eq!(response.eval_duration, 0);
    }

    #[test]
    fn test_response_ignores_unknown_fields() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"model": "m", "created_at": "2024-01-01T00:00:00Z", "response": "",
                "done": true, "context": [1, 2, 3], "total_duration": 5,
                "prompt_eval_count": 3, "prompt_eval_duration": 1000}"#,
        )
        .unwrap();
        assert_eq!(response.prompt_eval_count, 3);
        assert_eq!(response.prompt_eval_duration, 1000);
    }

    #[test]
    fn test_stream_chunk_defaults() {
        let chunk: StreamChunk = serde_json::from_str(r#"{"response": "fn"}"#).unwrap();
        assert_eq!(chunk.response, "fn");
        assert!(!chunk.done);
    }

    #[test]
    fn test_host_trailing_slash_stripped() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[test]
    fn test_unreachable_host_is_connectivity_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = OllamaClient::new(format!("http://{addr}"));
        let request = GenerateRequest::completion("m", "p", 1);
        let err = client.generate(&request, Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, CallError::Connectivity(_)));
    }

    #[test]
    fn test_error_status_is_protocol_error() {
        let response = ureq::Response::new(503, "Service Unavailable", "loading model").unwrap();
        let err = map_ureq_error(ureq::Error::Status(503, response));
        assert_eq!(
            err,
            CallError::Protocol {
                status: 503,
                body: "loading model".into()
            }
        );
    }

    #[test]
    fn test_stream_outlives_read_timeout() {
        // 8 lines, 150ms apart: ~1.2s in total against a 500ms timeout.
        let mut lines: Vec<String> = (0..7)
            .map(|i| format!(r#"{{"response": "t{i}", "done": false}}"#))
            .collect();
        lines.push(r#"{"response": "", "done": true}"#.to_string());
        let host = serve_ndjson(lines, Duration::from_millis(150));

        let client = OllamaClient::new(host);
        let config = StreamConfig::new("m", "p").with_max_tokens(8);
        let chunks: Vec<_> = client
            .generate_stream(&GenerateRequest::streaming(&config), Duration::from_millis(500))
            .unwrap()
            .collect();

        assert_eq!(chunks.len(), 8);
        assert!(chunks.iter().all(Result::is_ok));
        assert_eq!(chunks[0], Ok(StreamChunk { response: "t0".into(), done: false }));
        assert_eq!(chunks[7], Ok(StreamChunk { response: String::new(), done: true }));
    }

    #[test]
    fn test_stream_ends_after_read_error() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"{\"response\": \"a\"}\n\n".to_vec()),
        });
        let chunks: Vec<_> = ndjson_chunks(reader).collect();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], Ok(StreamChunk { response: "a".into(), done: false }));
        assert!(matches!(chunks[1], Err(CallError::Connectivity(_))));
    }

    #[test]
    fn test_malformed_line_does_not_end_stream() {
        let reader = Cursor::new(b"garbage\n{\"response\": \"b\", \"done\": true}\n".to_vec());
        let chunks: Vec<_> = ndjson_chunks(reader).collect();

        assert_eq!(chunks.len(), 2);
        assert!(matches!(chunks[0], Err(CallError::Decode(_))));
        assert_eq!(chunks[1], Ok(StreamChunk { response: "b".into(), done: true }));
    }

    /// Yields its data, then fails every read.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out reading response")),
                n => Ok(n),
            }
        }
    }

    /// Serve one request with a chunked NDJSON body, sleeping `gap` before
    /// each line. Returns the base URL.
    fn serve_ndjson(lines: Vec<String>, gap: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();

            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\n\r\n")
                .unwrap();
            for line in lines {
                thread::sleep(gap);
                let data = format!("{line}\n");
                write!(stream, "{:x}\r\n{}\r\n", data.len(), data).unwrap();
                stream.flush().unwrap();
            }
            stream.write_all(b"0\r\n\r\n").unwrap();
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
