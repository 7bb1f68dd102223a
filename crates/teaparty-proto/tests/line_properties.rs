//! Property tests for the line framer.
//!
//! The framer must reassemble the same lines no matter how the byte stream is
//! cut into chunks.

use proptest::prelude::*;
use teaparty_proto::LineFramer;

proptest! {
    #[test]
    fn reassembles_lines_across_arbitrary_chunk_boundaries(
        lines in prop::collection::vec("[a-zA-Z0-9 !?.,:]{0,32}", 0..12),
        chunk_sizes in prop::collection::vec(1usize..8, 1..64),
    ) {
        let mut stream = Vec::new();
        for line in &lines {
            stream.extend_from_slice(line.as_bytes());
            stream.extend_from_slice(b"\r\n");
        }

        let mut framer = LineFramer::new();
        let mut out = Vec::new();
        let mut offset = 0;
        let mut chunk = 0;
        while offset < stream.len() {
            let end = (offset + chunk_sizes[chunk % chunk_sizes.len()]).min(stream.len());
            chunk += 1;
            framer.extend(&stream[offset..end]);
            while let Some(line) = framer.next_line() {
                out.push(line);
            }
            offset = end;
        }

        prop_assert_eq!(out, lines);
        prop_assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn partial_line_is_retained_until_terminated(prefix in "[a-z]{1,16}") {
        let mut framer = LineFramer::new();

        framer.extend(prefix.as_bytes());
        prop_assert!(framer.next_line().is_none());
        prop_assert_eq!(framer.pending(), prefix.len());

        framer.extend(b"\r\n");
        prop_assert_eq!(framer.next_line(), Some(prefix.clone()));
        prop_assert_eq!(framer.pending(), 0);
    }
}
