use crate::errors::TransportError;

/// One dispatched SSE event (a block of lines ended by a blank line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

impl SseFrame {
    /// Payload to hand to a `message` listener.
    ///
    /// Named events other than `message` and frames without data never reach
    /// the default listener, same as a browser `EventSource`.
    pub fn into_message(self) -> Option<String> {
        match self.event.as_deref() {
            None | Some("message") if !self.data.is_empty() => Some(self.data),
            _ => None,
        }
    }
}

/// Largest frame kept buffered while waiting for its delimiter.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Incremental decoder for a `text/event-stream` body.
pub struct SseDecoder {
    buf: Vec<u8>,
    /// Bytes of `buf` already searched for a delimiter.
    scanned: usize,
    max_frame_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_frame_bytes(DEFAULT_MAX_FRAME_BYTES)
    }
}

impl SseDecoder {
    pub fn with_max_frame_bytes(max_frame_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_frame_bytes,
        }
    }

    /// Feeds a body chunk and returns every frame completed by it.
    ///
    /// Partial frames stay buffered until a later chunk closes them. A partial
    /// frame growing past the size limit is a read error.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>, TransportError> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        // A delimiter may straddle the previous chunk boundary.
        let mut from = self.scanned.saturating_sub(3);
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf, from) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
            from = 0;
        }
        self.scanned = self.buf.len();
        if self.buf.len() > self.max_frame_bytes {
            return Err(TransportError::read(format!(
                "SSE frame exceeds {} bytes",
                self.max_frame_bytes
            )));
        }
        Ok(frames)
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }
}

fn find_frame_delimiter(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data_lines.push(value),
            // id / retry only matter for reconnection, which is never attempted.
            _ => {}
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"data: {\"event_type\":\"started\",\"data\":{\"query\":\"ru";
        let part2 = b"st\"}}\n\n";
        assert!(decoder.push_chunk(part1).expect("chunk").is_empty());
        assert!(decoder.buffered_len() > 0);
        let frames = decoder.push_chunk(part2).expect("chunk");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert!(frames[0].data.contains("\"query\":\"rust\""));
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn crlf_delimiters_and_multiple_frames_per_chunk() {
        let mut decoder = SseDecoder::default();
        let frames = decoder
            .push_chunk(b"data: one\r\n\r\ndata: two\n\n")
            .expect("chunk");
        let data: Vec<_> = frames.into_iter().map(|f| f.data).collect();
        assert_eq!(data, vec!["one", "two"]);
    }

    #[test]
    fn multiline_data_is_joined_and_comments_skipped() {
        let mut decoder = SseDecoder::default();
        let frames = decoder
            .push_chunk(b": keep-alive\ndata: a\ndata:b\nid: 7\n\n")
            .expect("chunk");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "a\nb");
    }

    #[test]
    fn comment_only_frames_are_dropped() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b": ping\n\n").expect("chunk").is_empty());
    }

    #[test]
    fn only_default_message_frames_reach_the_listener() {
        let unnamed = SseFrame {
            event: None,
            data: "x".into(),
        };
        let message = SseFrame {
            event: Some("message".into()),
            data: "y".into(),
        };
        let named = SseFrame {
            event: Some("progress".into()),
            data: "z".into(),
        };
        let empty = SseFrame {
            event: None,
            data: String::new(),
        };
        assert_eq!(unnamed.into_message().as_deref(), Some("x"));
        assert_eq!(message.into_message().as_deref(), Some("y"));
        assert_eq!(named.into_message(), None);
        assert_eq!(empty.into_message(), None);
    }

    #[test]
    fn delimiter_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"data: a\n").expect("chunk").is_empty());
        let frames = decoder.push_chunk(b"\ndata: b\r\n\r").expect("chunk");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "a");
        let frames = decoder.push_chunk(b"\n").expect("chunk");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "b");
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn large_frame_in_small_chunks_is_decoded() {
        let mut decoder = SseDecoder::default();
        let payload = "x".repeat(10_000);
        let body = format!("data: {payload}\n\n");
        let mut frames = Vec::new();
        for chunk in body.as_bytes().chunks(7) {
            frames.extend(decoder.push_chunk(chunk).expect("chunk"));
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, payload);
    }

    #[test]
    fn oversized_partial_frame_is_a_read_error() {
        let mut decoder = SseDecoder::with_max_frame_bytes(16);
        assert!(decoder.push_chunk(b"data: 0123456789").is_ok());
        let err = decoder.push_chunk(b"abcdef").expect_err("too large");
        assert!(matches!(err, TransportError::Read(ref msg) if msg.contains("16 bytes")));
    }

    #[test]
    fn limit_applies_to_the_unfinished_remainder_only() {
        let mut decoder = SseDecoder::with_max_frame_bytes(16);
        let frames = decoder
            .push_chunk(b"data: 0123456789\n\ndata: ab")
            .expect("complete frames are released first");
        assert_eq!(frames[0].data, "0123456789");
        assert_eq!(decoder.buffered_len(), 8);
    }
}
