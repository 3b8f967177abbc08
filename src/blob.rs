//! Append-only article and word list blobs
//!
//! Articles go to the main output as `u32 length + UTF-8 bytes`; word
//! list records (`keyword NUL short NUL`) go to a scratch sink that the
//! compiler concatenates behind the articles afterwards. The offsets
//! returned here are relative to the start of each blob; the trie
//! serializer rebases them once the section layout is known.

use std::io::Write;

use crate::base::{ByteOffset, IndexError, Payload};
use crate::codec::{self, Charset};

pub struct BlobWriter<A: Write, W: Write> {
    articles: A,
    word_list: W,
    articles_len: ByteOffset,
    word_list_len: ByteOffset,
    short_translation_len: usize,
}

impl<A: Write, W: Write> BlobWriter<A, W> {
    pub fn new(articles: A, word_list: W, short_translation_len: usize) -> Self {
        Self {
            articles,
            word_list,
            articles_len: 0,
            word_list_len: 0,
            short_translation_len,
        }
    }

    /// Appends one record to both blobs and returns its relative offsets
    pub fn append(
        &mut self,
        keyword: &str,
        translation: &str,
        short_translation: &str,
    ) -> Result<Payload, IndexError> {
        let payload = Payload {
            article_offset: self.articles_len,
            word_list_offset: self.word_list_len,
        };

        // Article: u32 length + body
        let content = Charset::Utf8.encode(translation);
        let length = u32::try_from(content.len())
            .map_err(|_| IndexError::OffsetOverflow(content.len() as u64))?;
        codec::write_u32(&mut self.articles, length)?;
        self.articles.write_all(&content)?;
        self.articles_len = checked_advance(self.articles_len, 4 + content.len())?;

        // Word list record: keyword NUL short NUL, self delimiting
        let short = normalize_short(short_translation, self.short_translation_len);
        let mut written = codec::write_terminated(&mut self.word_list, Charset::Utf8, keyword)?;
        written += codec::write_terminated(&mut self.word_list, Charset::Utf8, &short)?;
        self.word_list_len = checked_advance(self.word_list_len, written)?;

        Ok(payload)
    }

    /// Bytes appended to the article blob so far
    pub fn articles_len(&self) -> ByteOffset {
        self.articles_len
    }

    /// Bytes appended to the word list blob so far
    pub fn word_list_len(&self) -> ByteOffset {
        self.word_list_len
    }

    /// Gives the word list sink back so it can be copied into place
    pub fn into_word_list(self) -> W {
        self.word_list
    }
}

fn checked_advance(offset: ByteOffset, by: usize) -> Result<ByteOffset, IndexError> {
    let next = offset as u64 + by as u64;
    u32::try_from(next).map_err(|_| IndexError::OffsetOverflow(next))
}

/// Cuts the short translation to `cap` characters, then turns hyphens
/// into spaces and collapses whitespace runs. Truncation happens first;
/// a partial word at the boundary is kept as-is, the device tolerates it.
pub fn normalize_short(text: &str, cap: usize) -> String {
    let mut out = String::with_capacity(cap);
    let mut in_space = false;
    for c in text.chars().take(cap) {
        let c = if c == '-' { ' ' } else { c };
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_short("a-b", 80), "a b");
        assert_eq!(normalize_short("a \t\n b", 80), "a b");
        assert_eq!(normalize_short("a - b", 80), "a b");
        assert_eq!(normalize_short("plain", 80), "plain");
    }

    #[test]
    fn test_normalize_truncates_before_collapsing() {
        // The cap applies to the raw text; collapsing may shorten it further
        let text = "x".repeat(79) + "--tail";
        let normalized = normalize_short(&text, 80);
        assert_eq!(normalized, "x".repeat(79) + " ");
        assert!(normalized.chars().count() <= 80);
    }

    #[test]
    fn test_append_offsets() {
        let mut articles = Vec::new();
        let mut word_list = Vec::new();
        let mut writer = BlobWriter::new(&mut articles, &mut word_list, 80);

        let first = writer.append("on", "tr1", "tr1").unwrap();
        assert_eq!(first.article_offset, 0);
        assert_eq!(first.word_list_offset, 0);

        let second = writer.append("one", "tr22", "tr22").unwrap();
        // 4 byte length prefix + 3 bytes of body
        assert_eq!(second.article_offset, 7);
        // "on\0tr1\0"
        assert_eq!(second.word_list_offset, 7);

        assert_eq!(writer.articles_len(), 7 + 8);
        assert_eq!(writer.word_list_len(), 7 + 9);

        assert_eq!(&articles[..7], b"\x03\0\0\0tr1");
        assert_eq!(&word_list[..7], b"on\0tr1\0");
    }

    #[test]
    fn test_short_translation_cap() {
        let mut articles = Vec::new();
        let mut word_list = Vec::new();
        let mut writer = BlobWriter::new(&mut articles, &mut word_list, 4);

        writer.append("k", "body", "long short text").unwrap();
        assert_eq!(word_list, b"k\0long\0");
    }
}
