//! Streaming decoder for bulk port uploads.
//!
//! Reads a payload shaped `{ "<id>": { ...port fields... }, ... }` from a
//! chunked byte stream and yields one [`PortFragment`] per entry. Only the
//! current chunk and the entry being decoded are held in memory, so the
//! footprint does not grow with the size of the payload.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use serde::Deserialize;

use crate::domain::foundation::ValidationError;
use crate::domain::port::{Port, PortAttributes, PortError};

/// Port fields exactly as they appear in an upload payload.
///
/// Missing fields decode to empty values and unknown fields are ignored;
/// required-field checks happen later in [`Port::new`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPort {
    pub name: String,
    pub code: String,
    pub city: String,
    pub country: String,
    pub alias: Vec<String>,
    pub regions: Vec<String>,
    pub coordinates: Vec<f64>,
    pub province: String,
    pub timezone: String,
    pub unlocs: Vec<String>,
}

impl From<RawPort> for PortAttributes {
    fn from(raw: RawPort) -> Self {
        PortAttributes {
            name: raw.name,
            code: raw.code,
            city: raw.city,
            country: raw.country,
            alias: raw.alias,
            regions: raw.regions,
            coordinates: raw.coordinates,
            province: raw.province,
            timezone: raw.timezone,
            unlocs: raw.unlocs,
        }
    }
}

/// One decoded entry: the object key and its unvalidated fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PortFragment {
    pub id: String,
    pub record: RawPort,
}

impl PortFragment {
    /// Validate the fragment into a port, using the object key as its id.
    pub fn into_port(self) -> Result<Port, ValidationError> {
        Port::new(self.id, self.record.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Start,
    Entries { first: bool },
    Finished,
    Failed,
}

/// Tracks nesting and string state while copying a raw JSON value.
#[derive(Debug, Default)]
struct RawScanner {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl RawScanner {
    /// Feeds one byte; returns `true` once the value is complete.
    fn feed(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
                return self.depth == 0;
            }
            return false;
        }
        match byte {
            b'"' => {
                self.in_string = true;
                false
            }
            b'{' | b'[' => {
                self.depth += 1;
                false
            }
            b'}' | b']' => {
                self.depth = self.depth.saturating_sub(1);
                self.depth == 0
            }
            _ => false,
        }
    }
}

fn is_json_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn describe(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("byte 0x{:02x}", byte)
    }
}

fn unexpected_eof() -> PortError {
    PortError::malformed("unexpected end of input")
}

/// Pull-based decoder over a stream of byte chunks.
///
/// Not restartable: once it has finished or failed it only yields `None`.
pub struct FragmentDecoder<S> {
    stream: S,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    bytes_read: u64,
    limit: Option<u64>,
    state: DecoderState,
}

impl<S, B, E> FragmentDecoder<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            bytes_read: 0,
            limit: None,
            state: DecoderState::Start,
        }
    }

    /// Fail with `PayloadTooLarge` once more than `limit` bytes were read.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Total bytes pulled from the underlying stream so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Decode the next entry.
    ///
    /// Returns `Ok(None)` after the closing `}`, and after any error.
    ///
    /// # Errors
    ///
    /// - `MalformedInput` if the payload is not a JSON object of port
    ///   records, ends early, or the stream fails
    /// - `PayloadTooLarge` if the configured limit is exceeded
    pub async fn next_fragment(&mut self) -> Result<Option<PortFragment>, PortError> {
        if matches!(self.state, DecoderState::Finished | DecoderState::Failed) {
            return Ok(None);
        }
        match self.advance().await {
            Ok(Some(fragment)) => Ok(Some(fragment)),
            Ok(None) => {
                self.state = DecoderState::Finished;
                Ok(None)
            }
            Err(err) => {
                self.state = DecoderState::Failed;
                Err(err)
            }
        }
    }

    async fn advance(&mut self) -> Result<Option<PortFragment>, PortError> {
        if self.state == DecoderState::Start {
            self.skip_whitespace().await?;
            match self.next_byte().await? {
                Some(b'{') => self.state = DecoderState::Entries { first: true },
                Some(other) => {
                    return Err(PortError::malformed(format!(
                        "expected '{{' at start of payload, found {}",
                        describe(other)
                    )))
                }
                None => return Err(PortError::malformed("empty payload")),
            }
        }
        let first = self.state == DecoderState::Entries { first: true };

        self.skip_whitespace().await?;
        match self.peek_byte().await? {
            None => return Err(unexpected_eof()),
            Some(b'}') => {
                self.pos += 1;
                self.expect_end().await?;
                return Ok(None);
            }
            Some(_) => {}
        }

        if !first {
            match self.next_byte().await? {
                Some(b',') => {}
                Some(other) => {
                    return Err(PortError::malformed(format!(
                        "expected ',' or '}}' after entry, found {}",
                        describe(other)
                    )))
                }
                None => return Err(unexpected_eof()),
            }
            self.skip_whitespace().await?;
        }

        let id = self.read_key().await?;

        self.skip_whitespace().await?;
        match self.next_byte().await? {
            Some(b':') => {}
            Some(other) => {
                return Err(PortError::malformed(format!(
                    "expected ':' after key '{}', found {}",
                    id,
                    describe(other)
                )))
            }
            None => return Err(unexpected_eof()),
        }
        self.skip_whitespace().await?;

        let record = self.read_record(&id).await?;
        self.state = DecoderState::Entries { first: false };

        Ok(Some(PortFragment { id, record }))
    }

    async fn read_key(&mut self) -> Result<String, PortError> {
        match self.peek_byte().await? {
            Some(b'"') => {}
            Some(other) => {
                return Err(PortError::malformed(format!(
                    "object key must be a string, found {}",
                    describe(other)
                )))
            }
            None => return Err(unexpected_eof()),
        }
        let raw = self.read_raw().await?;
        serde_json::from_slice::<String>(&raw)
            .map_err(|e| PortError::malformed(format!("invalid object key: {}", e)))
    }

    async fn read_record(&mut self, id: &str) -> Result<RawPort, PortError> {
        match self.peek_byte().await? {
            Some(b'{') => {}
            Some(other) => {
                return Err(PortError::malformed(format!(
                    "entry '{}': expected an object, found {}",
                    id,
                    describe(other)
                )))
            }
            None => return Err(unexpected_eof()),
        }
        let raw = self.read_raw().await?;
        serde_json::from_slice::<RawPort>(&raw)
            .map_err(|e| PortError::malformed(format!("entry '{}': {}", id, e)))
    }

    /// Copies one string or object, starting at the current byte.
    async fn read_raw(&mut self) -> Result<Vec<u8>, PortError> {
        let mut scanner = RawScanner::default();
        let mut raw = Vec::new();
        loop {
            if !self.fill().await? {
                return Err(unexpected_eof());
            }
            let available = &self.buf[self.pos..];
            let complete_at = available.iter().position(|&b| scanner.feed(b));
            let take = complete_at.map_or(available.len(), |i| i + 1);
            raw.extend_from_slice(&available[..take]);
            self.pos += take;
            if complete_at.is_some() {
                return Ok(raw);
            }
        }
    }

    /// Only whitespace may follow the closing brace.
    async fn expect_end(&mut self) -> Result<(), PortError> {
        self.skip_whitespace().await?;
        match self.peek_byte().await? {
            None => Ok(()),
            Some(other) => Err(PortError::malformed(format!(
                "unexpected {} after closing '}}'",
                describe(other)
            ))),
        }
    }

    async fn skip_whitespace(&mut self) -> Result<(), PortError> {
        loop {
            if !self.fill().await? {
                return Ok(());
            }
            let available = &self.buf[self.pos..];
            match available.iter().position(|&b| !is_json_whitespace(b)) {
                Some(offset) => {
                    self.pos += offset;
                    return Ok(());
                }
                None => self.pos = self.buf.len(),
            }
        }
    }

    async fn peek_byte(&mut self) -> Result<Option<u8>, PortError> {
        if !self.fill().await? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    async fn next_byte(&mut self) -> Result<Option<u8>, PortError> {
        let byte = self.peek_byte().await?;
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    /// Ensures at least one unread byte is buffered; `false` at end of input.
    async fn fill(&mut self) -> Result<bool, PortError> {
        while self.pos >= self.buf.len() {
            if self.eof {
                return Ok(false);
            }
            match self.stream.next().await {
                None => {
                    self.eof = true;
                    return Ok(false);
                }
                Some(Err(e)) => {
                    return Err(PortError::malformed(format!("failed to read payload: {}", e)))
                }
                Some(Ok(chunk)) => {
                    let chunk = chunk.as_ref();
                    self.bytes_read += chunk.len() as u64;
                    if let Some(limit) = self.limit {
                        if self.bytes_read > limit {
                            return Err(PortError::payload_too_large(limit));
                        }
                    }
                    self.buf.clear();
                    self.buf.extend_from_slice(chunk);
                    self.pos = 0;
                }
            }
        }
        Ok(true)
    }
}
