//! In-memory transport serving a fixed resource.
//!
//! Used for tests and local development. Every request is counted, and
//! individual ranges can be made to misbehave through [`Fault`].

use super::{BodyStream, HeadResponse, RangeResponse, Result, Transport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Misbehaviour injected for the range request starting at a given offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with this status and an empty body.
    Status(u16),
    /// Ignore the `Range` header and answer `200` with the full resource.
    IgnoreRange,
    /// Answer `206` but deliver only this many bytes.
    Truncate(usize),
    /// Answer `206` and append this many bytes past the requested range.
    Overrun(usize),
    /// Deliver the first body piece, then fail as if the connection reset.
    Disconnect,
    /// Deliver the first body piece, then never finish.
    Stall,
    /// Answer `206` with an equally long range starting this many bytes
    /// later, labelled as such in `Content-Range`.
    ShiftedRange(u64),
}

pub struct InMemoryTransport {
    data: Bytes,
    head_status: u16,
    advertise_length: bool,
    piece_size: usize,
    faults: HashMap<u64, Fault>,
    head_calls: AtomicUsize,
    range_calls: AtomicUsize,
}

impl InMemoryTransport {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            head_status: 200,
            advertise_length: true,
            piece_size: 8 * 1024,
            faults: HashMap::new(),
            head_calls: AtomicUsize::new(0),
            range_calls: AtomicUsize::new(0),
        }
    }

    /// Status returned by `HEAD`.
    pub fn with_head_status(mut self, status: u16) -> Self {
        self.head_status = status;
        self
    }

    /// Omit `Content-Length` from `HEAD` responses.
    pub fn without_content_length(mut self) -> Self {
        self.advertise_length = false;
        self
    }

    /// Size of the pieces response bodies are split into.
    pub fn with_piece_size(mut self, piece_size: usize) -> Self {
        self.piece_size = piece_size.max(1);
        self
    }

    /// Inject a fault for the range request starting at `start`.
    pub fn with_fault(mut self, start: u64, fault: Fault) -> Self {
        self.faults.insert(start, fault);
        self
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    /// Total number of requests of any kind.
    pub fn total_calls(&self) -> usize {
        self.head_calls() + self.range_calls()
    }

    fn pieces(&self, body: Bytes) -> Vec<Result<Bytes>> {
        let mut pieces = Vec::new();
        let mut offset = 0;
        while offset < body.len() {
            let end = (offset + self.piece_size).min(body.len());
            pieces.push(Ok(body.slice(offset..end)));
            offset = end;
        }
        pieces
    }

    fn content_range(&self, start: u64, end: u64) -> String {
        let len = self.data.len() as u64;
        format!("bytes {}-{}/{}", start, end.min(len.saturating_sub(1)), len)
    }

    fn slice(&self, start: u64, end: u64) -> Bytes {
        let len = self.data.len() as u64;
        if start >= len {
            return Bytes::new();
        }
        let end = end.min(len - 1);
        self.data.slice(start as usize..=end as usize)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn head(&self, _url: &str) -> Result<HeadResponse> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);

        Ok(HeadResponse {
            status: self.head_status,
            content_length: self.advertise_length.then_some(self.data.len() as u64),
        })
    }

    async fn get_range(&self, _url: &str, start: u64, end: u64) -> Result<RangeResponse> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);

        let requested = self.slice(start, end);
        let mut content_range = Some(self.content_range(start, end));

        let (status, body): (u16, BodyStream) = match self.faults.get(&start) {
            None => (206, Box::pin(stream::iter(self.pieces(requested)))),
            Some(Fault::Status(status)) => {
                content_range = None;
                (*status, Box::pin(stream::empty()))
            }
            Some(Fault::IgnoreRange) => {
                content_range = None;
                (200, Box::pin(stream::iter(self.pieces(self.data.clone()))))
            }
            Some(Fault::ShiftedRange(shift)) => {
                let (start, end) = (start + shift, end + shift);
                content_range = Some(self.content_range(start, end));
                (206, Box::pin(stream::iter(self.pieces(self.slice(start, end)))))
            }
            Some(Fault::Truncate(keep)) => {
                let keep = (*keep).min(requested.len());
                (206, Box::pin(stream::iter(self.pieces(requested.slice(..keep)))))
            }
            Some(Fault::Overrun(extra)) => {
                let mut body = requested.to_vec();
                body.resize(body.len() + extra, 0);
                (206, Box::pin(stream::iter(self.pieces(Bytes::from(body)))))
            }
            Some(Fault::Disconnect) => {
                let first = self.pieces(requested).into_iter().take(1);
                let reset = std::iter::once(Err(TransportError::Body(
                    "connection reset by peer".to_string(),
                )));
                (206, Box::pin(stream::iter(first.chain(reset))))
            }
            Some(Fault::Stall) => {
                let first = self.pieces(requested).into_iter().take(1);
                (206, Box::pin(stream::iter(first).chain(stream::pending())))
            }
        };

        Ok(RangeResponse {
            status,
            content_range,
            body,
        })
    }
}
