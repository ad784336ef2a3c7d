//! Splitting oversized message content into segments that each fit a byte limit.
//!
//! Content is buffered line by line; a single line longer than the limit is cut into
//! fixed-size byte chunks instead. Limits are in bytes, not characters.

/// How a segment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOrigin {
    /// One or more whole lines joined with `\n`.
    Lines,
    /// A byte-sized chunk of a line that alone exceeds the limit.
    Fallback,
}

/// One size-compliant piece of the original content. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub content: String,
    pub origin: SegmentOrigin,
}

impl Segment {
    fn lines(content: String) -> Self {
        Self {
            content,
            origin: SegmentOrigin::Lines,
        }
    }
}

/// Lines accumulated for the next segment.
#[derive(Default)]
struct LineBuffer {
    text: String,
    lines: usize,
}

impl LineBuffer {
    /// Length of the buffer once `line` is appended, counting the joining newline.
    fn len_with(&self, line: &str) -> usize {
        let sep = usize::from(self.lines > 0);
        self.text.len() + sep + line.len()
    }

    fn push(&mut self, line: &str) {
        if self.lines > 0 {
            self.text.push('\n');
        }
        self.text.push_str(line);
        self.lines += 1;
    }

    fn take(&mut self) -> String {
        self.lines = 0;
        std::mem::take(&mut self.text)
    }
}

/// Split `content` into segments of at most `limit` bytes.
///
/// Content that already fits comes back as a single unchanged segment. Otherwise lines
/// are packed greedily; a line longer than `limit` is handed to [`split_bytes`] after the
/// pending buffer is flushed. Segments are returned in delivery order and none is empty.
pub fn split_content(content: &str, limit: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    if content.len() <= limit {
        if !content.is_empty() {
            segments.push(Segment::lines(content.to_string()));
        }
        return segments;
    }

    let mut buf = LineBuffer::default();
    for line in content.lines() {
        if buf.len_with(line) <= limit {
            buf.push(line);
            continue;
        }
        flush(&mut segments, buf.take());
        if line.len() > limit {
            segments.extend(split_bytes(line, limit));
        } else {
            buf.push(line);
        }
    }
    flush(&mut segments, buf.take());
    segments
}

fn flush(segments: &mut Vec<Segment>, text: String) {
    if !text.is_empty() {
        segments.push(Segment::lines(text));
    }
}

/// Cut `content` into consecutive chunks of at most `limit` bytes, keeping every byte.
///
/// Chunks end on the last UTF-8 character boundary at or before `limit`, so a multi-byte
/// character is never torn in half; for ASCII every chunk but the last is exactly `limit`
/// bytes and there are `ceil(len / limit)` of them.
pub fn split_bytes(content: &str, limit: usize) -> Vec<Segment> {
    let mut chunks = Vec::with_capacity(content.len() / limit.max(1) + 1);
    let mut rest = content;
    while !rest.is_empty() {
        let mut end = rest.len().min(limit);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // limit is narrower than the next character; emit it whole
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(Segment {
            content: chunk.to_string(),
            origin: SegmentOrigin::Fallback,
        });
        rest = tail;
    }
    chunks
}
