//! Upstream article sources
//!
//! Concrete dictionary formats (XDXF markup, StarDict index + blob, ...)
//! are parsed outside of this crate; a parser only has to hand over
//! articles one at a time through [`ArticleSource`].

use crate::base::{Article, IndexError};

pub trait ArticleSource {
    /// Returns the next article, or None once the source is exhausted
    fn next_article(&mut self) -> Result<Option<Article>, IndexError>;

    /// Releases whatever the source holds open
    fn close(&mut self) {}
}

/// Adapter over any iterator of articles; in-memory callers and tests
/// use this directly
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator<Item = Article>> ArticleSource for IterSource<I> {
    fn next_article(&mut self) -> Result<Option<Article>, IndexError> {
        Ok(self.iter.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_source() {
        let articles = vec![Article::new("a", "t", "s")];
        let mut source = IterSource::new(articles.into_iter());
        assert_eq!(source.next_article().unwrap().unwrap().keyword, "a");
        assert!(source.next_article().unwrap().is_none());
    }
}
