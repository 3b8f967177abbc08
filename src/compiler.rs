//! Dictionary compilation: section layout and final file assembly
//!
//! A run is a single forward pass. Articles land behind the reserved
//! header as they stream in, word list records go to a scratch file,
//! and both running lengths feed the radix tree payloads. Once the
//! source is exhausted the section bases are known: the header is
//! written, the word list is copied into place and the trie is
//! serialized last, with payload offsets rebased to absolute positions.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use derivative::Derivative;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::base::{
    CompilationStats, IndexError, Payload, HEADER_SIZE, MAGIC, SHORT_TRANSLATION_LEN, VERSION_HI,
    VERSION_LO,
};
use crate::blob::BlobWriter;
use crate::codec::{self, Charset};
use crate::serializer::serialize_trie;
use crate::source::ArticleSource;
use crate::trie::RadixTree;

#[derive(Derivative, Clone)]
#[derivative(Default)]
pub struct CompilerOptions {
    /// Character cap for short translations in the word list
    #[derivative(Default(value = "SHORT_TRANSLATION_LEN"))]
    pub short_translation_len: usize,

    /// Show a progress spinner while reading articles
    #[derivative(Default(value = "true"))]
    pub progress: bool,
}

pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: &CompilerOptions) -> Compiler {
        Compiler {
            options: options.clone(),
        }
    }

    /// Compiles all articles of `source` into the file at `path`.
    /// The target is truncated first; on error it must be discarded,
    /// partial output is not a valid dictionary.
    pub fn compile(
        &self,
        source: &mut dyn ArticleSource,
        path: &Path,
    ) -> Result<CompilationStats, IndexError> {
        let mut out = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        // Reserve the header; set_len zeroes it, which also provides
        // the padding behind the header fields
        out.set_len(HEADER_SIZE as u64)?;
        out.seek(SeekFrom::Start(HEADER_SIZE as u64))?;

        // Word list records go to a scratch file first, they can only
        // land behind the articles whose total length is unknown yet
        let scratch = tempfile::tempfile()?;

        let mut stats = CompilationStats::default();
        let mut tree = RadixTree::<Payload>::new();
        let mut blobs = BlobWriter::new(&mut out, scratch, self.options.short_translation_len);

        let progress = if self.options.progress {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(ProgressStyle::default_spinner().template("{spinner} {pos} articles"));

        while let Some(article) = source.next_article()? {
            if article.keyword.is_empty() {
                // Malformed upstream record, never reaches the blobs
                debug!("Skipping an article without keyword");
                continue;
            }

            let payload = Payload {
                article_offset: blobs.articles_len(),
                word_list_offset: blobs.word_list_len(),
            };
            match tree.insert(&article.keyword, payload) {
                Ok(()) => {
                    blobs.append(
                        &article.keyword,
                        &article.translation,
                        &article.short_translation,
                    )?;
                    stats.articles += 1;
                    progress.inc(1);
                }
                Err(duplicate) => {
                    warn!("Duplicate article: {}", duplicate.0);
                    stats.duplicates.push(duplicate.0);
                }
            }
        }
        source.close();
        progress.finish_and_clear();
        info!("Finished reading articles ({})", stats.articles);

        let articles_len = blobs.articles_len();
        let word_list_len = blobs.word_list_len();
        let mut word_list = blobs.into_word_list();

        let word_list_offset = section_offset(HEADER_SIZE as u64 + articles_len as u64)?;
        let trie_offset = section_offset(word_list_offset as u64 + word_list_len as u64)?;

        // Header
        info!("Writing header");
        out.seek(SeekFrom::Start(0))?;
        out.write_all(MAGIC)?;
        codec::write_u16(&mut out, (HEADER_SIZE - MAGIC.len() as u32) as u16)?;
        out.write_all(&[VERSION_LO, VERSION_HI])?;
        codec::write_u32(&mut out, word_list_offset)?;
        codec::write_u32(&mut out, trie_offset)?;

        // Word list, copied behind the articles
        out.seek(SeekFrom::Start(word_list_offset as u64))?;
        word_list.seek(SeekFrom::Start(0))?;
        io::copy(&mut word_list, &mut out)?;

        let position = out.stream_position()?;
        assert!(
            position == trie_offset as u64,
            "Write cursor ({}) should be at the trie base ({})",
            position,
            trie_offset
        );

        // Index
        info!("Writing the index (this might take a while)");
        debug!(
            "Sections: articles at {}, word list at {}, trie at {}",
            HEADER_SIZE, word_list_offset, trie_offset
        );
        stats.file_size = serialize_trie(
            &mut out,
            tree.root(),
            Charset::Utf16Le,
            trie_offset as u64,
            HEADER_SIZE,
            word_list_offset,
        )?;
        out.flush()?;

        Ok(stats)
    }
}

fn section_offset(offset: u64) -> Result<u32, IndexError> {
    u32::try_from(offset).map_err(|_| IndexError::OffsetOverflow(offset))
}

/// Compiles with default options
pub fn compile_dictionary(
    source: &mut dyn ArticleSource,
    path: &Path,
) -> Result<CompilationStats, IndexError> {
    Compiler::new(&CompilerOptions::default()).compile(source, path)
}
