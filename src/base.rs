pub type ByteOffset = u32;
pub type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

use std::fmt;

use thiserror::Error;

/// Marks object that have a length
pub trait Len {
    fn len(&self) -> usize;
}

/// Magic tag at the start of every dictionary file
pub const MAGIC: &[u8; 8] = b"PRSPDICT";

/// Total header size, including the magic tag and the zero padding
pub const HEADER_SIZE: u32 = 1024;

pub const VERSION_LO: u8 = 0;
pub const VERSION_HI: u8 = 1;

/// Short translations are cut to this many characters in the word list
pub const SHORT_TRANSLATION_LEN: usize = 80;

/// A dictionary entry, as produced by an upstream parser
#[derive(Debug, Clone)]
pub struct Article {
    /// Lookup key (the trie is built over these)
    pub keyword: String,

    /// Full article body
    pub translation: String,

    /// Preview text stored in the word list
    pub short_translation: String,
}

impl Article {
    pub fn new(keyword: &str, translation: &str, short_translation: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            translation: translation.to_string(),
            short_translation: short_translation.to_string(),
        }
    }
}

/// Blob positions of a keyword, relative to the start of each blob until
/// the serializer rebases them. Set once when the keyword is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    pub article_offset: ByteOffset,
    pub word_list_offset: ByteOffset,
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.article_offset, self.word_list_offset)
    }
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A trie node block does not fit in the 16 bit size field
    #[error("trie block at {offset} is {size} bytes and overflows the 16 bit size field")]
    BlockTooLarge { offset: u64, size: usize },

    /// The child count field is a single byte
    #[error("trie node has {0} children (at most 255 are supported)")]
    TooManyChildren(usize),

    #[error("offset {0} does not fit in 32 bits")]
    OffsetOverflow(u64),

    #[error("parse error in the article source: {0}")]
    Source(String),

    #[error("not a prspdict file (bad magic tag)")]
    BadMagic,

    #[error("unsupported dictionary version {hi}.{lo}")]
    UnsupportedVersion { hi: u8, lo: u8 },
}

/// What a compilation run did, including the diagnostics that do not
/// abort the run (duplicates are reported here rather than through
/// a logging side channel)
#[derive(Debug, Default)]
pub struct CompilationStats {
    /// Number of articles written out
    pub articles: u64,

    /// Keywords that were seen more than once (the first payload wins)
    pub duplicates: Vec<String>,

    /// Final size of the output file
    pub file_size: u64,
}
