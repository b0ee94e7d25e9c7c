//! Path segmenter.

use smallvec::SmallVec;

/// Maximum number of path segments before heap allocation.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Stack-allocated segment list borrowed from the request path.
pub type SegmentVec<'a> = SmallVec<[&'a str; MAX_INLINE_SEGMENTS]>;

/// Split `path` on `/` and drop empty tokens.
///
/// Leading, trailing and repeated slashes therefore never produce segments,
/// and `"/"` (or `""`) yields an empty list. Any input is accepted.
///
/// ```
/// use treerouter::router::segments;
///
/// assert_eq!(segments("/users//42/").as_slice(), ["users", "42"]);
/// assert!(segments("/").is_empty());
/// ```
#[inline]
#[must_use]
pub fn segments(path: &str) -> SegmentVec<'_> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_drops_empty_tokens() {
        assert_eq!(segments("/a/b/c").as_slice(), ["a", "b", "c"]);
        assert_eq!(segments("a/b").as_slice(), ["a", "b"]);
        assert_eq!(segments("//a///b//").as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_segments_of_root_and_empty() {
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
        assert!(segments("////").is_empty());
    }

    #[test]
    fn test_segments_keep_literal_text() {
        // no decoding happens here
        assert_eq!(segments("/files/a%20b/:id").as_slice(), ["files", "a%20b", ":id"]);
    }

    #[test]
    fn test_segments_spill_to_heap_past_inline_capacity() {
        let path = "/1/2/3/4/5/6/7/8/9/10";
        let segs = segments(path);
        assert_eq!(segs.len(), 10);
        assert!(segs.spilled());
        assert_eq!(segs[9], "10");
    }
}
