use anyhow::{Context, Result, bail};
use finwise_finance::{StreamDecoder, StreamEvent};
use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;

use crate::config::LlmSection;

#[derive(Serialize)]
struct OaiMsg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OaiReq<'a> {
    model: &'a str,
    messages: Vec<OaiMsg<'a>>,
    temperature: f32,
    stream: bool,
}

/// Send one user message to an OpenAI-compatible endpoint and stream the reply.
///
/// Returns the full reply once the stream ends.
pub async fn stream_chat(
    cfg: &LlmSection,
    system: &str,
    message: &str,
    mut on_event: impl FnMut(&StreamEvent),
) -> Result<String> {
    let key = std::env::var(&cfg.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .with_context(|| format!("missing API key; set {}", cfg.api_key_env))?;

    let body = OaiReq {
        model: &cfg.model,
        messages: vec![
            OaiMsg { role: "system", content: system },
            OaiMsg { role: "user", content: message },
        ],
        temperature: cfg.temperature,
        stream: true,
    };

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')))
        .headers(headers)
        .json(&body)
        .send()
        .await
        .context("chat streaming request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("chat streaming error: {status} {txt}");
    }

    let mut decoder = StreamDecoder::new();
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("stream chunk")?;
        for ev in decoder.push(chunk.as_ref()) {
            on_event(&ev);
        }
        if decoder.is_done() {
            break;
        }
    }
    for ev in decoder.finish() {
        on_event(&ev);
    }

    Ok(decoder.reply().to_string())
}
