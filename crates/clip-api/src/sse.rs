// Server-Sent Events decoding
//
// The daemon pushes its connection heartbeat and live logs over
// `text/event-stream` responses. `SseDecoder` is an incremental line
// parser fed with arbitrary byte chunks; `decode_stream` adapts a
// reqwest byte stream into a stream of decoded events that ends with
// `Error::ChannelClosed` when the daemon hangs up.

use std::pin::Pin;

use bytes::{Buf, Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use tracing::{debug, trace};

use crate::client::DaemonClient;
use crate::error::Error;

/// A persistent, server-pushed event channel.
///
/// Yields decoded events until the transport fails or the daemon closes
/// the response; either way the last item is an `Err`.
pub type EventChannel = Pin<Box<dyn Stream<Item = Result<SseEvent, Error>> + Send>>;

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, if the producer set one.
    pub event: Option<String>,
    /// All `data:` lines joined with `\n`.
    pub data: String,
    /// Last event ID seen on the channel.
    pub id: Option<String>,
}

impl SseEvent {
    /// Event type, defaulting to `message` per the event-stream format.
    pub fn name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

// ── Decoder ──────────────────────────────────────────────────────────

/// Incremental `text/event-stream` parser.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    event: Option<String>,
    data: Vec<String>,
    last_id: Option<String>,
    /// Bytes of `buf` already searched for a line terminator.
    scanned: usize,
    /// The last line ended in `\r`; a `\n` that follows belongs to it.
    skip_lf: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it.
    ///
    /// Partial lines are buffered until their terminator arrives, so
    /// chunk boundaries may fall anywhere (including inside a UTF-8
    /// sequence or between `\r` and `\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        loop {
            if self.skip_lf && !self.buf.is_empty() {
                if self.buf.first() == Some(&b'\n') {
                    self.buf.advance(1);
                }
                self.skip_lf = false;
            }

            let Some(offset) = self.buf[self.scanned..]
                .iter()
                .position(|b| matches!(b, b'\r' | b'\n'))
            else {
                self.scanned = self.buf.len();
                break;
            };

            let raw = self.buf.split_to(self.scanned + offset);
            self.skip_lf = self.buf.get_u8() == b'\r';
            self.scanned = 0;

            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.process_line(&line) {
                out.push(event);
            }
        }

        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            trace!(comment = &line[1..], "sse comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            "id" if !value.contains('\0') => self.last_id = Some(value.to_owned()),
            // Reconnect timing is owned by the caller's fixed interval.
            "retry" => {}
            other => trace!(field = other, "ignoring unknown sse field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if event.is_none() && self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event,
            data,
            id: self.last_id.clone(),
        })
    }
}

// ── Stream adapter ───────────────────────────────────────────────────

/// Decode a byte stream into events.
///
/// A clean end of the byte stream is reported as `Error::ChannelClosed`:
/// event channels are meant to stay open indefinitely.
pub fn decode_stream<S, E>(bytes: S) -> impl Stream<Item = Result<SseEvent, Error>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    async_stream::try_stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = Box::pin(bytes);
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(Into::<Error>::into)?;
            for event in decoder.push(&chunk) {
                yield event;
            }
        }
        debug!("event stream ended");
        Err::<(), Error>(Error::ChannelClosed)?;
    }
}

impl DaemonClient {
    /// Open an event-stream endpoint and decode it.
    pub(crate) async fn open_channel(&self, path: &str) -> Result<EventChannel, Error> {
        let resp = self.open_stream(path).await?;

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !content_type.starts_with("text/event-stream") {
            return Err(Error::NotEventStream { content_type });
        }

        Ok(Box::pin(decode_stream(resp.bytes_stream())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::stream;
    use pretty_assertions::assert_eq;

    use super::*;

    fn event(name: Option<&str>, data: &str) -> SseEvent {
        SseEvent {
            event: name.map(str::to_owned),
            data: data.to_owned(),
            id: None,
        }
    }

    #[test]
    fn decodes_named_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: log\ndata: {\"a\":1}\n\n");
        assert_eq!(events, vec![event(Some("log"), "{\"a\":1}")]);
        assert_eq!(events[0].name(), "log");
    }

    #[test]
    fn unnamed_event_defaults_to_message() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: hello\n\n");
        assert_eq!(events[0].name(), "message");
    }

    #[test]
    fn handles_split_chunks_and_crlf() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: conn").is_empty());
        assert!(decoder.push(b"ected\r\ndata: ok\r").is_empty());
        let events = decoder.push(b"\n\r\n");
        assert_eq!(events, vec![event(Some("connected"), "ok")]);
    }

    #[test]
    fn lone_cr_terminates_lines() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: log\rdata: hi\r\r");
        assert_eq!(events, vec![event(Some("log"), "hi")]);
    }

    #[test]
    fn mixed_line_endings_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: a\r\n\ndata: b\r\rdata: c\n\r\n");
        assert_eq!(
            events,
            vec![event(None, "a"), event(None, "b"), event(None, "c")]
        );
    }

    #[test]
    fn long_line_across_many_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: ").is_empty());
        for _ in 0..500 {
            assert!(decoder.push(b"xxxxxxxx").is_empty());
        }
        let events = decoder.push(b"\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data.len(), 4000);
        assert!(decoder.buf.is_empty());
        assert_eq!(decoder.scanned, 0);
    }

    #[test]
    fn joins_multiline_data_and_skips_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\ndata: one\ndata:two\n\n");
        assert_eq!(events, vec![event(None, "one\ntwo")]);
    }

    #[test]
    fn name_only_event_is_dispatched() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: ping\n\n");
        assert_eq!(events, vec![event(Some("ping"), "")]);
    }

    #[test]
    fn blank_lines_alone_dispatch_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"\n\n: comment\n\n").is_empty());
    }

    #[test]
    fn id_persists_across_events() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"id: 7\ndata: a\n\ndata: b\n\n");
        assert_eq!(events[0].id.as_deref(), Some("7"));
        assert_eq!(events[1].id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn stream_ends_with_channel_closed() {
        let chunks: Vec<Result<Bytes, Error>> = vec![
            Ok(Bytes::from_static(b"event: connected\ndata: \n\n")),
            Ok(Bytes::from_static(b"event: ping\n\n")),
        ];
        let decoded: Vec<_> = decode_stream(stream::iter(chunks)).collect().await;

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].as_ref().unwrap().name(), "connected");
        assert_eq!(decoded[1].as_ref().unwrap().name(), "ping");
        assert!(matches!(decoded[2], Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn transport_error_terminates_stream() {
        let chunks: Vec<Result<Bytes, Error>> = vec![
            Ok(Bytes::from_static(b"data: first\n\n")),
            Err(Error::Timeout { timeout_secs: 1 }),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ];
        let decoded: Vec<_> = decode_stream(stream::iter(chunks)).collect().await;

        assert_eq!(decoded.len(), 2);
        assert!(matches!(decoded[1], Err(Error::Timeout { .. })));
    }
}
