//! Read-side views on a compiled dictionary file

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::base::Len;

/// Random access view on the bytes of a dictionary file
pub trait Buffer: Len {
    /// Bytes in `start..end`, or None when out of bounds (a corrupt
    /// file must not take the reader down)
    fn slice(&self, start: usize, end: usize) -> Option<&[u8]>;
}

/// Holds the whole file in memory
pub struct MemoryBuffer {
    data: Vec<u8>,
}

impl MemoryBuffer {
    pub fn new(path: &Path) -> Result<Self, std::io::Error> {
        let mut file = File::options().read(true).open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Self { data })
    }
}

impl Len for MemoryBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }
}

impl Buffer for MemoryBuffer {
    fn slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.data.get(start..end)
    }
}

/// Uses a memory map
pub struct MmapBuffer {
    mmap: Mmap,
}

impl MmapBuffer {
    pub fn new(path: &Path) -> Result<Self, std::io::Error> {
        let file = File::options().read(true).open(path)?;
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self { mmap })
    }
}

impl Len for MmapBuffer {
    fn len(&self) -> usize {
        self.mmap.len()
    }
}

impl Buffer for MmapBuffer {
    fn slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.mmap.get(start..end)
    }
}

pub fn open_buffer(path: &Path, in_memory: bool) -> Result<Box<dyn Buffer>, std::io::Error> {
    Ok(if in_memory {
        Box::new(MemoryBuffer::new(path)?)
    } else {
        Box::new(MmapBuffer::new(path)?)
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_buffers() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        File::create(&path)
            .unwrap()
            .write_all(b"0123456789")
            .unwrap();

        for in_memory in [true, false] {
            let buffer = open_buffer(&path, in_memory).unwrap();
            assert_eq!(buffer.len(), 10);
            assert_eq!(buffer.slice(2, 5), Some(&b"234"[..]));
            assert_eq!(buffer.slice(5, 11), None);
        }
    }
}
