//! Exact-match lookup over a compiled dictionary
//!
//! This is the reading counterpart of the compiler, following the same
//! walk the device performs: match the keyword against child edge
//! labels block by block, then fetch the article behind the terminal
//! payload. It doubles as the verification tool for compiled files.

use std::path::Path;

use log::debug;

use crate::base::{Len, IndexError, HEADER_SIZE, MAGIC, VERSION_HI, VERSION_LO};
use crate::codec::{read_u16, read_u32, Charset};
use crate::utils::buffer::{open_buffer, Buffer};

/// A resolved word: the article body plus its word list record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub keyword: String,
    pub translation: String,
    pub short_translation: String,
}

pub struct Dictionary {
    buffer: Box<dyn Buffer>,
    word_list_offset: u32,
    trie_offset: u32,
}

/// One parsed trie node block
struct NodeBlock<'a> {
    article_offset: u32,
    word_list_offset: u32,
    children: Vec<(&'a [u8], u32)>,
}

impl Dictionary {
    /// Opens a compiled file, either memory mapped or fully loaded
    pub fn open(path: &Path, in_memory: bool) -> Result<Dictionary, IndexError> {
        let buffer = open_buffer(path, in_memory)?;

        let header = buffer
            .slice(0, HEADER_SIZE as usize)
            .ok_or(IndexError::BadMagic)?;
        if &header[0..MAGIC.len()] != MAGIC {
            return Err(IndexError::BadMagic);
        }
        let (lo, hi) = (header[10], header[11]);
        if (lo, hi) != (VERSION_LO, VERSION_HI) {
            return Err(IndexError::UnsupportedVersion { hi, lo });
        }

        // The offsets behind the version are the section table
        let word_list_offset = read_u32(header, 12).ok_or(IndexError::BadMagic)?;
        let trie_offset = read_u32(header, 16).ok_or(IndexError::BadMagic)?;
        debug!(
            "Opened dictionary: word list at {}, trie at {}",
            word_list_offset, trie_offset
        );

        Ok(Dictionary {
            buffer,
            word_list_offset,
            trie_offset,
        })
    }

    pub fn word_list_offset(&self) -> u32 {
        self.word_list_offset
    }

    pub fn trie_offset(&self) -> u32 {
        self.trie_offset
    }

    /// Looks up the exact keyword. None for absent keys and for
    /// structurally broken files.
    pub fn lookup(&self, keyword: &str) -> Option<Entry> {
        let key = Charset::Utf16Le.encode(keyword);
        let mut remaining = &key[..];
        let mut at = self.trie_offset as usize;

        loop {
            let node = self.read_node(at)?;
            if remaining.is_empty() {
                // Article offsets start behind the header, 0 marks a
                // non-terminal node
                if node.article_offset == 0 {
                    return None;
                }
                return self.fetch(keyword, node.article_offset, node.word_list_offset);
            }

            let mut next = None;
            for (label, pointer) in node.children.iter() {
                if remaining.starts_with(label) {
                    remaining = &remaining[label.len()..];
                    next = Some(*pointer as usize);
                    break;
                }
            }
            // No child continues the keyword (a label that only starts
            // with the rest of the key cannot end it either)
            at = next?;
        }
    }

    /// All word list records, in file order (keyword, short translation)
    pub fn word_list(&self) -> Option<Vec<(String, String)>> {
        let data = self
            .buffer
            .slice(self.word_list_offset as usize, self.trie_offset as usize)?;
        let mut records = Vec::new();
        let mut rest = data;
        while !rest.is_empty() {
            let (keyword, after) = take_terminated(rest)?;
            let (short, after) = take_terminated(after)?;
            records.push((keyword, short));
            rest = after;
        }
        Some(records)
    }

    fn read_node(&self, at: usize) -> Option<NodeBlock<'_>> {
        let size = read_u16(self.buffer.slice(at, at + 2)?, 0)? as usize;
        let block = self.buffer.slice(at + 2, at + 2 + size)?;

        let article_offset = read_u32(block, 0)?;
        let word_list_offset = read_u32(block, 4)?;
        let n_children = *block.get(8)? as usize;

        let labels_start = 9 + 4 * n_children;
        let mut labels = block.get(labels_start..)?;
        let mut children = Vec::with_capacity(n_children);
        for i in 0..n_children {
            let pointer = read_u32(block, 9 + 4 * i)?;
            let (label, rest) = split_utf16_label(labels)?;
            children.push((label, pointer));
            labels = rest;
        }
        Some(NodeBlock {
            article_offset,
            word_list_offset,
            children,
        })
    }

    fn fetch(&self, keyword: &str, article_offset: u32, word_list_offset: u32) -> Option<Entry> {
        let at = article_offset as usize;
        let length = read_u32(self.buffer.slice(at, at + 4)?, 0)? as usize;
        let body = self.buffer.slice(at + 4, at + 4 + length)?;

        // Word list record: keyword NUL short NUL
        let record = self
            .buffer
            .slice(word_list_offset as usize, self.buffer.len())?;
        let (_, rest) = take_terminated(record)?;
        let (short_translation, _) = take_terminated(rest)?;

        Some(Entry {
            keyword: keyword.to_string(),
            translation: String::from_utf8_lossy(body).into_owned(),
            short_translation,
        })
    }
}

/// Splits one NUL-NUL terminated UTF-16LE label off `data`, returning
/// the label bytes (terminator excluded) and the rest
fn split_utf16_label(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut index = 0;
    while index + 1 < data.len() {
        if data[index] == 0 && data[index + 1] == 0 {
            return Some((&data[..index], &data[index + 2..]));
        }
        index += 2;
    }
    None
}

/// Splits one NUL terminated UTF-8 string off `data`
fn take_terminated(data: &[u8]) -> Option<(String, &[u8])> {
    let end = data.iter().position(|byte| *byte == 0)?;
    Some((
        String::from_utf8_lossy(&data[..end]).into_owned(),
        &data[end + 1..],
    ))
}
