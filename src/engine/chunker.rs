// src/engine/chunker.rs

//! Splitting oversized files into numbered chunks.
//!
//! [`ChunkSplitter`] is a single-pass iterator over a reader. Every chunk is
//! exactly `chunk_size` bytes except possibly the last. On a read error the
//! iterator yields that error once and then ends; it never retries, and
//! chunks already handed out stay handed out.

use std::io::{self, ErrorKind, Read};
use std::num::NonZeroUsize;

/// One slice of a large file, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub number: u64,
    pub bytes: Vec<u8>,
}

/// Topic for chunk `number` of the file published on `topic`.
pub fn chunk_topic(topic: &str, number: u64) -> String {
    format!("{topic}/chunk_{number}")
}

#[derive(Debug)]
pub struct ChunkSplitter<R> {
    reader: R,
    chunk_size: NonZeroUsize,
    next_number: u64,
    finished: bool,
}

impl<R: Read> ChunkSplitter<R> {
    pub fn new(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self {
            reader,
            chunk_size,
            next_number: 1,
            finished: false,
        }
    }

    /// Read until `buf` is full or EOF; returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for ChunkSplitter<R> {
    type Item = io::Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = vec![0u8; self.chunk_size.get()];
        match self.fill(&mut buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(n) => {
                if n < buf.len() {
                    buf.truncate(n);
                    self.finished = true;
                }
                let number = self.next_number;
                self.next_number += 1;
                Some(Ok(Chunk { number, bytes: buf }))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Split `reader` into numbered chunks of `chunk_size` bytes.
pub fn split<R: Read>(reader: R, chunk_size: NonZeroUsize) -> ChunkSplitter<R> {
    ChunkSplitter::new(reader, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle {
        data: Cursor<Vec<u8>>,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.step);
            self.data.read(&mut buf[..n])
        }
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert_eq!(split(Cursor::new(Vec::new()), size(4)).count(), 0);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let chunks: Vec<_> = split(Cursor::new(vec![1u8; 8]), size(4))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].number, 2);
        assert_eq!(chunks[1].bytes.len(), 4);
    }

    #[test]
    fn short_reads_still_fill_whole_chunks() {
        let data: Vec<u8> = (0..=255u8).cycle().take(250).collect();
        let reader = Trickle {
            data: Cursor::new(data.clone()),
            step: 7,
        };
        let sizes: Vec<usize> = split(reader, size(64))
            .map(|c| c.unwrap().bytes.len())
            .collect();
        assert_eq!(sizes, vec![64, 64, 64, 58]);
    }

    #[test]
    fn read_error_is_yielded_once_then_ends() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("boom"))
            }
        }
        let mut it = split(Broken, size(4));
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn chunk_topic_has_no_padding() {
        assert_eq!(chunk_topic("/data/big.bin", 12), "/data/big.bin/chunk_12");
    }

    proptest! {
        #[test]
        fn chunks_cover_input_in_order(len in 0usize..2048, chunk in 1usize..300) {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let chunks: Vec<Chunk> = split(Cursor::new(data.clone()), size(chunk))
                .collect::<io::Result<_>>()
                .unwrap();

            prop_assert_eq!(chunks.len(), len.div_ceil(chunk));
            for (i, c) in chunks.iter().enumerate() {
                prop_assert_eq!(c.number, i as u64 + 1);
            }
            let joined: Vec<u8> = chunks.into_iter().flat_map(|c| c.bytes).collect();
            prop_assert_eq!(joined, data);
        }
    }
}
