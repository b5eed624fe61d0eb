use crate::config::Config;
use crate::prompt::Prompt;
use async_trait::async_trait;
use std::time::Duration;

/// Output length cap sent with every request.
pub const MAX_TOKENS: u32 = 1000;

/// Every failure of a completion call collapses into this one kind.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        CompletionError::RequestFailed(e.to_string())
    }
}

/// Sends one prompt and resolves to the text of the single returned candidate.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError>;
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    n: u32,
    max_tokens: u32,
    stop: Option<&'a str>,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(serde::Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Surrounding whitespace is trimmed; chat models tend to lead with newlines
/// that would otherwise end up in the heading and the clipboard.
fn first_choice_text(resp: ChatResponse) -> Result<String, CompletionError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::RequestFailed("response contained no choices".into()))?;
    Ok(choice
        .message
        .and_then(|m| m.content)
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

/// OpenAI-compatible chat completions client. Built once at startup.
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}/chat/completions", cfg.api_base.trim_end_matches('/')),
            api_key: cfg.openai_api_key.clone(),
            model: cfg.openai_model.clone(),
        })
    }

    /// Instruction as the system message, the untouched user text as its own message.
    fn request<'a>(&'a self, instruction: &'a str, prompt: &'a Prompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: instruction },
                ChatMessage { role: "user", content: prompt.message() },
            ],
            n: 1,
            max_tokens: MAX_TOKENS,
            stop: None,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, CompletionError> {
        let instruction = prompt.instruction();
        let req = self.request(&instruction, prompt);

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CompletionError::RequestFailed(format!("OpenAI error {}: {}", status, text)));
        }

        let parsed: ChatResponse = resp.json().await?;
        first_choice_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves a single HTTP exchange on an ephemeral port and hands back the
    /// request body it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/v1", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();
            let _ = tx.send(String::from_utf8(request_body).unwrap());

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
        });
        (base, rx)
    }

    fn client_for(base: String) -> OpenAiClient {
        let cfg = Config {
            openai_api_key: "sk-test".into(),
            api_base: base,
            request_timeout_secs: Some(10),
            ..Config::default()
        };
        OpenAiClient::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn success_reply_yields_first_choice_text() {
        let (base, received) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Bila gwabba"}},{"message":{"content":"other"}}]}"#,
        );
        let prompt = build_prompt("Evacuate now", "Australian Aboriginal Noongar", None);
        let text = client_for(base).complete(&prompt).await.unwrap();
        assert_eq!(text, "Bila gwabba");

        let sent: serde_json::Value = serde_json::from_str(&received.recv().unwrap()).unwrap();
        assert_eq!(sent["n"], 1);
        assert_eq!(sent["max_tokens"], 1000);
        assert!(sent["stop"].is_null());
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][1]["role"], "user");
        assert_eq!(sent["messages"][1]["content"], "Evacuate now");
    }

    #[tokio::test]
    async fn unauthorized_reply_is_request_failed() {
        let (base, _received) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        );
        let prompt = build_prompt("Evacuate now", "Australian Aboriginal Kriol", None);
        let err = client_for(base).complete(&prompt).await.unwrap_err();
        let CompletionError::RequestFailed(msg) = err;
        assert!(msg.contains("401"), "{}", msg);
    }

    fn parse(body: &str) -> ChatResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn request_body_carries_fixed_parameters() {
        let cfg = Config { openai_model: "gpt-test".into(), ..Config::default() };
        let client = OpenAiClient::new(&cfg).unwrap();
        let prompt = build_prompt("Evacuate now", "Australian Aboriginal Kriol", None);
        let instruction = prompt.instruction();

        let v = serde_json::to_value(client.request(&instruction, &prompt)).unwrap();
        assert_eq!(v["model"], "gpt-test");
        assert_eq!(v["n"], 1);
        assert_eq!(v["max_tokens"], 1000);
        assert!(v["stop"].is_null());

        let messages = v["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], instruction.as_str());
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Evacuate now");
    }

    #[test]
    fn takes_first_choice_trimmed() {
        let resp = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":"\n\nBila gwabba "}},
                           {"message":{"content":"second"}}]}"#,
        );
        assert_eq!(first_choice_text(resp).unwrap(), "Bila gwabba");
    }

    #[test]
    fn missing_content_defaults_to_empty() {
        assert_eq!(first_choice_text(parse(r#"{"choices":[{"message":{"content":null}}]}"#)).unwrap(), "");
        assert_eq!(first_choice_text(parse(r#"{"choices":[{}]}"#)).unwrap(), "");
    }

    #[test]
    fn no_choices_is_request_failed() {
        let err = first_choice_text(parse(r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, CompletionError::RequestFailed(_)));
    }

    #[test]
    fn endpoint_joins_api_base() {
        let cfg = Config { api_base: "http://localhost:8080/v1/".into(), ..Config::default() };
        let client = OpenAiClient::new(&cfg).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_failed() {
        let cfg = Config {
            api_base: "http://127.0.0.1:9".into(),
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        let client = OpenAiClient::new(&cfg).unwrap();
        let prompt = build_prompt("Evacuate now", "Kriol", None);
        let err = client.complete(&prompt).await.unwrap_err();
        assert!(matches!(err, CompletionError::RequestFailed(_)));
    }
}
