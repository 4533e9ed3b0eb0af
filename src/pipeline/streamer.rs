//! Sequential synthesis of planned chunks.
//!
//! [`SynthesisStream`] is pull-based: each [`next_block`] call performs at
//! most one synthesis request, so block *i* can be written out before
//! block *i + 1* is requested. Requests never overlap and blocks come out
//! in chunk order.
//!
//! [`next_block`]: SynthesisStream::next_block

use crate::error::Result;
use crate::services::SynthesisService;
use crate::text::{Chunk, ChunkPlanner};
use futures_util::Stream;
use std::collections::VecDeque;

/// Audio returned for one chunk piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlock {
    /// Zero-based position in the stream.
    pub index: usize,
    pub data: Vec<u8>,
}

/// Finite, non-restartable stream of audio blocks.
pub struct SynthesisStream<'a> {
    service: &'a dyn SynthesisService,
    pending: VecDeque<String>,
    next_index: usize,
    failed: bool,
}

impl<'a> SynthesisStream<'a> {
    /// Plan `text` and prepare one request per chunk piece.
    pub fn new(service: &'a dyn SynthesisService, planner: &ChunkPlanner, text: &str) -> Self {
        Self::from_chunks(service, planner.plan(text))
    }

    /// Stream already-planned chunks. Sliced chunks expand to one request
    /// per slice, in slice order.
    pub fn from_chunks(service: &'a dyn SynthesisService, chunks: Vec<Chunk>) -> Self {
        let pending = chunks
            .into_iter()
            .flat_map(|chunk| match chunk {
                Chunk::Text(text) => vec![text],
                Chunk::Slices(slices) => slices,
            })
            .collect();

        Self {
            service,
            pending,
            next_index: 0,
            failed: false,
        }
    }

    /// Requests not yet made.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Byte sizes of the requests not yet made.
    pub fn pending_sizes(&self) -> Vec<usize> {
        self.pending.iter().map(String::len).collect()
    }

    /// Synthesize the next piece.
    ///
    /// Returns `None` when every piece is done. After an error the stream
    /// is over: later calls return `None`.
    pub async fn next_block(&mut self) -> Option<Result<AudioBlock>> {
        if self.failed {
            return None;
        }
        let text = self.pending.pop_front()?;

        match self.service.synthesize(&text).await {
            Ok(data) => {
                let block = AudioBlock {
                    index: self.next_index,
                    data,
                };
                self.next_index += 1;
                Some(Ok(block))
            }
            Err(e) => {
                self.failed = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }

    /// Adapt into a [`Stream`] with the same ordering and abort rules.
    pub fn into_stream(self) -> impl Stream<Item = Result<AudioBlock>> + 'a {
        futures_util::stream::unfold(self, |mut stream| async move {
            stream.next_block().await.map(|item| (item, stream))
        })
    }
}
