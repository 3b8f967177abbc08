//! Compiler for the PRS+ dictionary file format
//!
//! A dictionary is one randomly seekable file (all offsets absolute):
//!
//! ```text
//! [header]     "PRSPDICT", header size, version, section offsets,
//!              zero padded to 1024 bytes
//! [articles]   u32 length + UTF-8 article text, per record
//! [word list]  keyword NUL short-translation NUL, UTF-8, per record
//! [radix]      pre-order trie node blocks with absolute child offsets
//! ```
//!
//! The radix section makes the file its own index: keyword lookup on
//! the device walks edge labels without loading anything up front.
//! See [`serializer`] for the node block layout.

pub mod base;
pub mod blob;
pub mod codec;
pub mod compiler;
pub mod lookup;
pub mod serializer;
pub mod source;
pub mod trie;
pub mod utils;

pub use base::{Article, CompilationStats, IndexError};
pub use compiler::{compile_dictionary, Compiler, CompilerOptions};
pub use lookup::Dictionary;
