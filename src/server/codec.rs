/*!
 * Request/Response Codec
 *
 * The dispatcher only sees `RequestDecoder` and `ResponseEncoder`; the JSON
 * implementations below are what the binary wires to stdin and stdout.
 *
 * # Wire Format
 *
 * Requests: `{"command": "ADD", "id": 1, "body": "hi", "timestamp": 5.0}`,
 * separated by any whitespace. Objects may span lines.
 *
 * Responses: one JSON object per line.
 */

use super::types::{Command, Request, RequestId, Response, Task};
use crate::core::errors::{CodecError, CodecResult};
use serde::{Deserialize, Deserializer};
use std::io::{BufRead, Write};

/// Source of decoded requests
pub trait RequestDecoder {
    /// Next request, an error for a record that had to be skipped, or `None`
    /// once the input is exhausted
    ///
    /// After an error the decoder must be positioned past the bad record so
    /// the next call can make progress.
    fn next_request(&mut self) -> Option<CodecResult<Request>>;
}

/// Sink for responses
pub trait ResponseEncoder: Send {
    /// Encode and write one complete response
    fn encode(&mut self, response: &Response) -> CodecResult<()>;
}

impl<D: RequestDecoder + ?Sized> RequestDecoder for &mut D {
    fn next_request(&mut self) -> Option<CodecResult<Request>> {
        (**self).next_request()
    }
}

impl<E: ResponseEncoder + ?Sized> ResponseEncoder for Box<E> {
    fn encode(&mut self, response: &Response) -> CodecResult<()> {
        (**self).encode(response)
    }
}

/// Request as it appears on the wire, before validation
#[derive(Debug, Deserialize)]
struct WireRequest {
    command: String,
    #[serde(default, deserialize_with = "deserialize_request_id")]
    id: Option<RequestId>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    timestamp: Option<f64>,
}

/// Accept integral or fractional ids; fractions are truncated
fn deserialize_request_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f as RequestId))))
}

impl WireRequest {
    fn into_request(self) -> CodecResult<Request> {
        if self.command == "DONE" {
            return Ok(Request::Done);
        }

        let id = self.id.ok_or_else(|| {
            CodecError::InvalidRequest(format!("{} request without an id", self.command))
        })?;

        let command = match self.command.as_str() {
            "ADD" => Command::Add {
                body: self.body.ok_or_else(|| {
                    CodecError::InvalidRequest(format!("ADD request {id} without a body"))
                })?,
                timestamp: require_timestamp(self.timestamp, "ADD", id)?,
            },
            "REMOVE" => Command::Remove {
                timestamp: require_timestamp(self.timestamp, "REMOVE", id)?,
            },
            "CONTAINS" => Command::Contains {
                timestamp: require_timestamp(self.timestamp, "CONTAINS", id)?,
            },
            "FEED" => Command::Feed,
            other => Command::Unknown(other.to_string()),
        };

        Ok(Request::Task(Task::new(id, command)))
    }
}

fn require_timestamp(timestamp: Option<f64>, command: &str, id: RequestId) -> CodecResult<f64> {
    match timestamp {
        Some(ts) if ts.is_finite() => Ok(ts),
        Some(ts) => Err(CodecError::InvalidRequest(format!(
            "{command} request {id} has non-finite timestamp {ts}"
        ))),
        None => Err(CodecError::InvalidRequest(format!(
            "{command} request {id} without a timestamp"
        ))),
    }
}

/// Outcome of one parse attempt over the buffered input
enum Parsed {
    Value(serde_json::Value, usize),
    NeedMore,
    Failed(serde_json::Error),
}

/// Streaming JSON request decoder
///
/// Reads line by line into a buffer and parses whole JSON values out of it.
/// A syntax error discards the buffered text, so decoding resumes at the
/// next line. Bytes that are not valid UTF-8 are replaced with U+FFFD; only a
/// failing reader ends the input early.
///
/// An object left incomplete is parsed again only once a line brings a
/// closing `}` or `]`, so an object spread over many lines is not re-parsed
/// once per line.
pub struct JsonRequestDecoder<R> {
    reader: R,
    line: Vec<u8>,
    pending: String,
    incomplete: bool,
    exhausted: bool,
}

impl<R: BufRead> JsonRequestDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending: String::new(),
            incomplete: false,
            exhausted: false,
        }
    }

    fn parse_pending(&self) -> Parsed {
        if self.pending.trim().is_empty() {
            return Parsed::NeedMore;
        }

        let mut stream =
            serde_json::Deserializer::from_str(&self.pending).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(value)) => Parsed::Value(value, stream.byte_offset()),
            Some(Err(err)) if err.is_eof() && !self.exhausted => Parsed::NeedMore,
            Some(Err(err)) => Parsed::Failed(err),
            None => Parsed::NeedMore,
        }
    }

    /// Append the next line to the pending text
    fn fill(&mut self) -> CodecResult<()> {
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line) {
            Ok(0) => {
                self.exhausted = true;
                Ok(())
            }
            Ok(_) => {
                let start = self.pending.len();
                self.pending.push_str(&String::from_utf8_lossy(&self.line));
                if self.pending[start..].contains(&['}', ']'][..]) {
                    self.incomplete = false;
                }
                Ok(())
            }
            Err(err) => {
                self.exhausted = true;
                Err(CodecError::Io(err))
            }
        }
    }
}

impl<R: BufRead> RequestDecoder for JsonRequestDecoder<R> {
    fn next_request(&mut self) -> Option<CodecResult<Request>> {
        loop {
            if !self.incomplete || self.exhausted {
                match self.parse_pending() {
                    Parsed::Value(value, consumed) => {
                        self.pending.drain(..consumed);
                        let request = serde_json::from_value::<WireRequest>(value)
                            .map_err(|err| CodecError::InvalidRequest(err.to_string()))
                            .and_then(WireRequest::into_request);
                        return Some(request);
                    }
                    Parsed::Failed(err) => {
                        self.pending.clear();
                        self.incomplete = false;
                        return Some(Err(CodecError::Malformed(err.to_string())));
                    }
                    Parsed::NeedMore if self.exhausted => {
                        self.pending.clear();
                        return None;
                    }
                    Parsed::NeedMore => {
                        self.incomplete = !self.pending.trim().is_empty();
                    }
                }
            }

            if let Err(err) = self.fill() {
                return Some(Err(err));
            }
        }
    }
}

/// Line-delimited JSON response encoder
pub struct JsonResponseEncoder<W> {
    writer: W,
}

impl<W: Write + Send> JsonResponseEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResponseEncoder for JsonResponseEncoder<W> {
    fn encode(&mut self, response: &Response) -> CodecResult<()> {
        let mut line = serde_json::to_vec(response)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}
