//! Payload splitting

/// Number of chunks `len` bytes occupy at `max_len` bytes per chunk
pub fn chunk_count(len: usize, max_len: usize) -> usize {
    debug_assert!(max_len > 0);
    len.div_ceil(max_len)
}

/// Split `data` into slices of at most `max_len` bytes
///
/// Every slice but the last is exactly `max_len` long. An empty payload
/// yields no chunks, and a payload that is an exact multiple of `max_len`
/// yields no trailing empty chunk.
pub fn split(data: &[u8], max_len: usize) -> Chunks<'_> {
    debug_assert!(max_len > 0);
    Chunks {
        inner: data.chunks(max_len),
    }
}

/// Iterator over the chunks of a payload, see [`split`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    inner: std::slice::Chunks<'a, u8>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Chunks<'_> {}
