//! Pure text processing: sentence splitting, chunk planning and
//! completion parsing.

pub mod chunker;
pub mod extract;
pub mod tokenizer;

pub use chunker::{Chunk, ChunkPlanner, ChunkPolicy, SynthesisInput, byte_windows};
pub use extract::{SectionMarker, extract_section};
pub use tokenizer::{SentenceRules, SentenceTokenizer, tokenize};
