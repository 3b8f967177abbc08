//! On-disk serialization of the keyword trie
//!
//! Each node becomes a variable-length block:
//!
//! ```text
//! size (u16, excluding this field)
//! article offset (u32, absolute, 0 if the key does not end here)
//! word list offset (u32, absolute, 0 if the key does not end here)
//! number of children (u8)
//! child block offsets (u32 * n, absolute)
//! zero terminated child edge labels (charset encoded)
//! ```
//!
//! A parent block embeds the absolute offsets of child blocks whose
//! sizes are only known after their whole subtrees are written. Rather
//! than buffering the serialized trie, each node writes placeholders,
//! recurses, then seeks back to patch its size field and pointer slots.
//! Seeks stay local to the block plus one forward seek to resume the
//! main cursor, so total I/O is proportional to the serialized size.

use std::io::{Seek, SeekFrom, Write};

use crate::base::{ByteOffset, IndexError, Payload};
use crate::codec::{self, Charset};
use crate::trie::RadixNode;

/// Hard cap from the one byte child count field
pub const MAX_CHILDREN: usize = u8::MAX as usize;

/// Serializes the trie rooted at `node`, whose block starts at the
/// absolute position `offset` (the cursor of `out` must already be
/// there). Terminal payloads are rebased by the section base offsets so
/// the values on disk are absolute from the start of the file.
///
/// Returns the next free offset after the subtree, leaving the cursor
/// on it.
pub fn serialize_trie<O: Write + Seek>(
    out: &mut O,
    node: &RadixNode<Payload>,
    charset: Charset,
    offset: u64,
    article_base: ByteOffset,
    word_list_base: ByteOffset,
) -> Result<u64, IndexError> {
    let initial_offset = offset;

    // Block size, patched once known; `size` counts the bytes that
    // follow this field
    codec::write_u16(out, 0)?;
    let mut size: usize = 0;

    // Terminal payload (absolute offsets), zero otherwise
    let (article, word_list) = match node.value {
        Some(payload) => (
            rebase(payload.article_offset, article_base)?,
            rebase(payload.word_list_offset, word_list_base)?,
        ),
        None => (0, 0),
    };
    size += codec::write_u32(out, article)?;
    size += codec::write_u32(out, word_list)?;

    let n_children = node.children.len();
    if n_children > MAX_CHILDREN {
        return Err(IndexError::TooManyChildren(n_children));
    }
    out.write_all(&[n_children as u8])?;
    size += 1;

    // Child pointer slots, filled in after the subtrees are written
    let children_ptr_offset = offset + 2 + size as u64;
    for _ in node.children.iter() {
        size += codec::write_u32(out, 0)?;
    }

    // Child edge labels
    for child in node.children.iter() {
        size += codec::write_terminated(out, charset, &child.key)?;
    }

    if size > u16::MAX as usize {
        return Err(IndexError::BlockTooLarge {
            offset: initial_offset,
            size,
        });
    }

    // Each child block starts where the previous subtree ended
    let mut next = initial_offset + 2 + size as u64;
    let mut children_offsets = Vec::with_capacity(n_children);
    for child in node.children.iter() {
        children_offsets
            .push(u32::try_from(next).map_err(|_| IndexError::OffsetOverflow(next))?);
        next = serialize_trie(out, child, charset, next, article_base, word_list_base)?;
    }

    // Patch the block size
    out.seek(SeekFrom::Start(initial_offset))?;
    codec::write_u16(out, size as u16)?;

    // Patch the child pointers
    out.seek(SeekFrom::Start(children_ptr_offset))?;
    for child_offset in children_offsets {
        codec::write_u32(out, child_offset)?;
    }

    // Resume the main cursor past the subtree
    out.seek(SeekFrom::Start(next))?;
    Ok(next)
}

fn rebase(offset: ByteOffset, base: ByteOffset) -> Result<u32, IndexError> {
    let absolute = offset as u64 + base as u64;
    u32::try_from(absolute).map_err(|_| IndexError::OffsetOverflow(absolute))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::base::Payload;
    use crate::trie::RadixTree;

    fn payload(n: u32) -> Payload {
        Payload {
            article_offset: n,
            word_list_offset: n * 10,
        }
    }

    #[test]
    fn test_single_node() {
        let mut tree = RadixTree::new();
        tree.insert("a", payload(4)).unwrap();

        let mut out = Cursor::new(Vec::new());
        let next =
            serialize_trie(&mut out, tree.root(), Charset::Utf16Le, 0, 100, 200).unwrap();

        let data = out.into_inner();
        assert_eq!(next as usize, data.len());

        // Root: empty payload, one child pointer, label "a"
        let root_size = codec::read_u16(&data, 0).unwrap() as usize;
        assert_eq!(root_size, 4 + 4 + 1 + 4 + 4);
        assert_eq!(codec::read_u32(&data, 2), Some(0));
        assert_eq!(codec::read_u32(&data, 6), Some(0));
        assert_eq!(data[10], 1);
        let child_ptr = codec::read_u32(&data, 11).unwrap() as usize;
        assert_eq!(child_ptr, 2 + root_size);
        assert_eq!(&data[15..19], &[b'a', 0, 0, 0]);

        // Child: rebased payload, no children
        assert_eq!(codec::read_u16(&data, child_ptr), Some(9));
        assert_eq!(codec::read_u32(&data, child_ptr + 2), Some(104));
        assert_eq!(codec::read_u32(&data, child_ptr + 6), Some(240));
        assert_eq!(data[child_ptr + 10], 0);
    }

    #[test]
    fn test_block_sizes_and_pointers() {
        let mut tree = RadixTree::new();
        tree.insert("on", payload(0)).unwrap();
        tree.insert("one", payload(1)).unwrap();
        tree.insert("once", payload(2)).unwrap();

        let mut out = Cursor::new(Vec::new());
        let base = 1024;
        let next = serialize_trie(
            &mut out,
            tree.root(),
            Charset::Utf16Le,
            0,
            base,
            base,
        )
        .unwrap();
        let data = out.into_inner();
        assert_eq!(next as usize, data.len());

        // Walk every block and check its size field against the actual span
        let mut stack = vec![0usize];
        let mut seen = 0;
        while let Some(at) = stack.pop() {
            seen += 1;
            let size = codec::read_u16(&data, at).unwrap() as usize;
            assert!(size > 0);
            let n = data[at + 2 + 8] as usize;
            let mut labels = 0;
            let labels_start = at + 2 + 8 + 1 + 4 * n;
            let mut cursor = labels_start;
            while cursor < at + 2 + size {
                if data[cursor] == 0 && data[cursor + 1] == 0 {
                    labels += 1;
                }
                cursor += 2;
            }
            assert_eq!(labels, n, "child count vs labels at block {}", at);

            for i in 0..n {
                let ptr = codec::read_u32(&data, at + 2 + 8 + 1 + 4 * i).unwrap() as usize;
                assert!(ptr > at && ptr < data.len());
                stack.push(ptr);
            }
        }
        // root, "on", "e", "ce"
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_too_many_children() {
        let mut tree = RadixTree::new();
        // 256 one-character keys from a two-byte alphabet would collapse,
        // so build distinct first characters directly
        for i in 0..256u32 {
            let key = char::from_u32(0x4e00 + i).unwrap().to_string();
            tree.insert(&key, payload(i)).unwrap();
        }

        let mut out = Cursor::new(Vec::new());
        let result = serialize_trie(&mut out, tree.root(), Charset::Utf16Le, 0, 0, 0);
        assert!(matches!(result, Err(IndexError::TooManyChildren(256))));
    }

    #[test]
    fn test_block_too_large() {
        let mut tree = RadixTree::new();
        // A single child with a 40k character label overflows the u16
        // size field of the root block
        let key = "a".repeat(40_000);
        tree.insert(&key, payload(0)).unwrap();

        let mut out = Cursor::new(Vec::new());
        let result = serialize_trie(&mut out, tree.root(), Charset::Utf16Le, 0, 0, 0);
        assert!(matches!(result, Err(IndexError::BlockTooLarge { .. })));
    }
}
