//! Server-sent event decoding shared by the streaming providers.
//!
//! Bodies are newline-delimited `data: {json}` events. Bytes are buffered
//! across network chunks so neither lines nor UTF-8 sequences are split.

use std::collections::VecDeque;

use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, trace};

use crate::error::ProviderError;
use crate::provider::TextStream;

/// Incremental decoder yielding the payload of every `data:` line.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    line: String,
    utf8: Vec<u8>,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed raw body bytes, returning payloads of the lines completed so far.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.utf8.extend_from_slice(bytes);

        let mut consumed = 0;
        while consumed < self.utf8.len() {
            match std::str::from_utf8(&self.utf8[consumed..]) {
                Ok(valid) => {
                    self.line.push_str(valid);
                    consumed = self.utf8.len();
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    self.line
                        .push_str(&String::from_utf8_lossy(&self.utf8[consumed..valid_end]));
                    match e.error_len() {
                        // Invalid bytes: replace them and keep decoding
                        Some(len) => {
                            self.line.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + len;
                        }
                        // Incomplete sequence at the end: keep it for the next chunk
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.utf8.drain(..consumed);

        let mut payloads = Vec::new();
        while let Some(pos) = self.line.find('\n') {
            let line: String = self.line.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush whatever is left once the body has closed.
    pub(crate) fn finish(&mut self) -> Vec<String> {
        if !self.utf8.is_empty() {
            let rest = String::from_utf8_lossy(&self.utf8).into_owned();
            self.utf8.clear();
            self.line.push_str(&rest);
        }
        let line = std::mem::take(&mut self.line);
        data_payload(&line).into_iter().collect()
    }
}

fn data_payload(line: &str) -> Option<String> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("data:")
        .map(|data| data.trim_start().to_string())
        .filter(|data| !data.is_empty())
}

struct SseState<S, F> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    extract: F,
    provider: String,
    deltas: usize,
    finished: bool,
}

/// Turn a streaming body into text deltas.
///
/// `extract` maps one event payload to a delta, an in-band error, or
/// nothing (events without text are skipped). The body is owned by the
/// returned stream and dropped with it.
pub(crate) fn text_deltas<S, B, E, F>(provider: &str, body: S, extract: F) -> TextStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    F: Fn(&str) -> Option<Result<String, ProviderError>> + Send + 'static,
{
    let state = SseState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        extract,
        provider: provider.to_string(),
        deltas: 0,
        finished: false,
    };

    let deltas = stream::unfold(state, |mut st| async move {
        loop {
            if let Some(data) = st.pending.pop_front() {
                match (st.extract)(&data) {
                    Some(Ok(text)) => {
                        st.deltas += 1;
                        return Some((Ok(text), st));
                    }
                    Some(Err(e)) => {
                        st.pending.clear();
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                    None => {
                        trace!(provider = %st.provider, "Skipping event without text");
                        continue;
                    }
                }
            }

            if st.finished {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = st.decoder.push(bytes.as_ref());
                    st.pending.extend(payloads);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((
                        Err(ProviderError::Stream(format!("stream read error: {}", e))),
                        st,
                    ));
                }
                None => {
                    debug!(provider = %st.provider, deltas = st.deltas, "Stream closed");
                    st.finished = true;
                    let rest = st.decoder.finish();
                    st.pending.extend(rest);
                }
            }
        }
    });

    Box::pin(deltas)
}
