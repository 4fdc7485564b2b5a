//! Stream transport: envelopes as `Content-Length` framed JSON.
//!
//! Frame layout is `Content-Length: N\r\n\r\n` followed by N bytes of JSON, the
//! same framing LSP servers use on stdio. Each endpoint built here owns a writer
//! loop and a reader loop on the given runtime; both end when their stream does.

use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::{HostEndpoint, PluginEndpoint, Subject};
use crate::error::EnvelopeError;
use crate::protocol::{Inbound, Outbound};

pub const DEFAULT_MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

impl HostEndpoint {
    /// Host half speaking to a plugin over `reader`/`writer`.
    pub fn over_stream<R, W>(handle: &Handle, reader: R, writer: W, max_frame_bytes: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let responses = Subject::new(handle);
        let (to_plugin, rx) = unbounded_channel();
        handle.spawn(writer_loop("host", writer, rx, Inbound::to_value));
        handle.spawn(reader_loop(
            "host",
            reader,
            max_frame_bytes,
            responses.sender(),
            Outbound::from_value,
        ));
        Self {
            to_plugin,
            responses,
        }
    }
}

impl PluginEndpoint {
    /// Plugin half speaking to its host over `reader`/`writer` (typically stdin/stdout).
    pub fn over_stream<R, W>(handle: &Handle, reader: R, writer: W, max_frame_bytes: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let requests = Subject::new(handle);
        let (to_host, rx) = unbounded_channel();
        handle.spawn(writer_loop("plugin", writer, rx, Outbound::to_value));
        handle.spawn(reader_loop(
            "plugin",
            reader,
            max_frame_bytes,
            requests.sender(),
            Inbound::from_value,
        ));
        Self { to_host, requests }
    }
}

async fn writer_loop<T, W>(
    side: &'static str,
    mut writer: W,
    mut rx: UnboundedReceiver<T>,
    encode: fn(&T) -> Value,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = rx.recv().await {
        let frame = encode_frame(&encode(&envelope));
        if let Err(e) = writer.write_all(&frame).await {
            tracing::warn!(side, error = %e, "envelope write failed");
            break;
        }
        let _ = writer.flush().await;
    }

    tracing::debug!(side, "writer loop ended");
}

async fn reader_loop<T, R>(
    side: &'static str,
    reader: R,
    max_frame_bytes: usize,
    sink: UnboundedSender<T>,
    decode: fn(Value) -> Result<T, EnvelopeError>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut header_line = String::new();

    loop {
        match read_frame(&mut reader, &mut header_line, max_frame_bytes).await {
            Ok(Some(bytes)) => {
                let envelope = serde_json::from_slice::<Value>(&bytes)
                    .map_err(EnvelopeError::from)
                    .and_then(decode);
                match envelope {
                    Ok(envelope) => {
                        if sink.send(envelope).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(side, error = %e, "dropping undecodable envelope"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(side, error = %e, "envelope read failed");
                break;
            }
        }
    }

    tracing::debug!(side, "reader loop ended");
}

const CONTENT_LENGTH: &str = "Content-Length";

pub fn encode_frame(msg: &Value) -> Vec<u8> {
    let body = serde_json::to_vec(msg).unwrap_or_else(|_| b"{}".to_vec());
    let mut frame = format!("{CONTENT_LENGTH}: {}\r\n\r\n", body.len()).into_bytes();
    frame.extend_from_slice(&body);
    frame
}

/// Reads one frame body. `Ok(None)` means the stream ended cleanly between frames.
///
/// The header block shares the `max_frame_bytes` budget with the body, so a peer
/// that never sends a line break cannot grow `header_line` without bound.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
    header_line: &mut String,
    max_frame_bytes: usize,
) -> io::Result<Option<Vec<u8>>> {
    let mut content_len = None;
    let mut header_bytes = 0usize;

    loop {
        let budget = max_frame_bytes.saturating_sub(header_bytes);
        if budget == 0 {
            return Err(invalid_data("frame header too large"));
        }

        header_line.clear();
        let n = (&mut *reader)
            .take(budget as u64)
            .read_line(header_line)
            .await?;
        if n == 0 {
            if header_bytes == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside a frame header",
            ));
        }
        header_bytes += n;

        if !header_line.ends_with('\n') {
            if n == budget {
                return Err(invalid_data("frame header too large"));
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside a frame header",
            ));
        }

        match parse_header(header_line) {
            Header::End => break,
            Header::ContentLength(len) => content_len = Some(len),
            Header::Other => {}
        }
    }

    let len = content_len.ok_or_else(|| invalid_data("missing Content-Length"))?;
    if len > max_frame_bytes {
        return Err(invalid_data("message too large"));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

enum Header {
    End,
    ContentLength(usize),
    Other,
}

fn parse_header(line: &str) -> Header {
    let line = line.trim_end();
    if line.is_empty() {
        return Header::End;
    }
    match line.split_once(':') {
        Some((name, value)) if name.trim().eq_ignore_ascii_case(CONTENT_LENGTH) => value
            .trim()
            .parse()
            .map(Header::ContentLength)
            .unwrap_or(Header::Other),
        _ => Header::Other,
    }
}

fn invalid_data(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
#[path = "../../tests/unit/channel/framing.rs"]
mod tests;
