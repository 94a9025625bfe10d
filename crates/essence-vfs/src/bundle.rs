//! Binary snapshot format for a [`Vfs`] tree.
//!
//! Layout: magic `ESSV`, one version byte, then the root node encoded
//! recursively. A node is a kind byte (`0` directory, `1` file), its name
//! as a `u32` length plus UTF-8 bytes, the modification time as `u64`
//! seconds plus `u32` nanoseconds, the `u32` mode, then either the file
//! data (`u64` length plus bytes) or the child count (`u32`) followed by
//! each child. All integers are little-endian.
//!
//! # Examples
//!
//! ```
//! use essence_vfs::{unix_time, VFile, Vfs};
//!
//! let vfs = Vfs::from_children(
//!     unix_time(5, 0),
//!     [VFile::file("a.txt", unix_time(5, 0), &b"abc"[..])],
//! );
//!
//! let bytes = vfs.to_bundle()?;
//! let decoded = Vfs::from_bundle(&bytes)?;
//! assert_eq!(decoded.walk_files(), vec!["/a.txt"]);
//! # Ok::<(), essence_vfs::VfsError>(())
//! ```

use crate::error::{Result, VfsError};
use crate::node::{FileKind, VFile, unix_parts, unix_time};
use crate::tree::Vfs;

const MAGIC: &[u8; 4] = b"ESSV";
const VERSION: u8 = 1;
const KIND_DIR: u8 = 0;
const KIND_FILE: u8 = 1;

impl Vfs {
    /// Encodes the whole tree into the bundle format.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::CorruptBundle` if a name or child list is too
    /// large for the format's length fields.
    pub fn to_bundle(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        encode_node(&self.root(), &mut out)?;
        Ok(out)
    }

    /// Decodes a tree from bundle bytes.
    ///
    /// # Errors
    ///
    /// Returns `VfsError::CorruptBundle` on a bad header, truncated input,
    /// invalid UTF-8 names, a non-directory root, or trailing bytes.
    pub fn from_bundle(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(corrupt("missing ESSV header"));
        }
        let version = reader.u8()?;
        if version != VERSION {
            return Err(corrupt(format!("unsupported version {version}")));
        }

        let root = decode_node(&mut reader)?;
        if !root.is_dir() {
            return Err(corrupt("root node is not a directory"));
        }
        if reader.pos != bytes.len() {
            return Err(corrupt(format!(
                "{} trailing bytes after root node",
                bytes.len() - reader.pos
            )));
        }

        Ok(Self::from_children(root.mod_time(), root.into_children()))
    }
}

fn corrupt(reason: impl Into<String>) -> VfsError {
    VfsError::CorruptBundle {
        reason: reason.into(),
    }
}

fn encode_node(node: &VFile, out: &mut Vec<u8>) -> Result<()> {
    out.push(match node.kind() {
        FileKind::Directory => KIND_DIR,
        FileKind::File => KIND_FILE,
    });

    let name = node.name().as_bytes();
    let name_len = u32::try_from(name.len()).map_err(|_| corrupt("name too long"))?;
    out.extend_from_slice(&name_len.to_le_bytes());
    out.extend_from_slice(name);

    let (secs, nanos) = unix_parts(node.mod_time());
    out.extend_from_slice(&secs.to_le_bytes());
    out.extend_from_slice(&nanos.to_le_bytes());
    out.extend_from_slice(&node.mode().to_le_bytes());

    if node.is_dir() {
        let count = u32::try_from(node.children().len()).map_err(|_| corrupt("too many children"))?;
        out.extend_from_slice(&count.to_le_bytes());
        for child in node.children() {
            encode_node(child, out)?;
        }
    } else {
        out.extend_from_slice(&node.size().to_le_bytes());
        out.extend_from_slice(node.data());
    }

    Ok(())
}

fn decode_node(reader: &mut Reader<'_>) -> Result<VFile> {
    let kind = reader.u8()?;

    let name_len = reader.len_u32()?;
    let name = std::str::from_utf8(reader.take(name_len)?)
        .map_err(|e| corrupt(format!("node name is not UTF-8: {e}")))?
        .to_string();

    let secs = reader.u64()?;
    let nanos = reader.u32()?;
    if nanos >= 1_000_000_000 {
        return Err(corrupt(format!("invalid nanoseconds {nanos} for {name}")));
    }
    let mod_time = unix_time(secs, nanos);
    let mode = reader.u32()?;

    match kind {
        KIND_DIR => {
            let count = reader.u32()?;
            let mut dir = VFile::dir(name, mod_time).with_mode(mode);
            for _ in 0..count {
                dir.append(decode_node(reader)?);
            }
            Ok(dir)
        }
        KIND_FILE => {
            let len = usize::try_from(reader.u64()?).map_err(|_| corrupt("file too large"))?;
            let data = reader.take(len)?.to_vec();
            Ok(VFile::file(name, mod_time, data).with_mode(mode))
        }
        other => Err(corrupt(format!("unknown node kind {other}"))),
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| corrupt(format!("truncated at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn len_u32(&mut self) -> Result<usize> {
        usize::try_from(self.u32()?).map_err(|_| corrupt("length overflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> Vfs {
        let t = unix_time(1_650_000_000, 123);
        Vfs::from_children(
            t,
            [
                VFile::file("hello.txt", t, &b"hello essence\n"[..]),
                VFile::file("empty.bin", t, Vec::new()).with_mode(0o600),
                VFile::dir("subdir", t).with_children([VFile::file("bytes.bin", t, vec![0, 255, 10, 13])]),
            ],
        )
    }

    #[test]
    fn test_roundtrip_preserves_structure_and_bytes() {
        let original = sample();
        let decoded = Vfs::from_bundle(&original.to_bundle().unwrap()).unwrap();

        assert_eq!(decoded.walk_files(), original.walk_files());
        for path in original.walk_files() {
            let mut a = Vec::new();
            let mut b = Vec::new();
            original.open(&path).unwrap().read_to_end(&mut a).unwrap();
            decoded.open(&path).unwrap().read_to_end(&mut b).unwrap();
            assert_eq!(a, b, "content mismatch for {path}");

            let stat_a = original.open(&path).unwrap().stat();
            let stat_b = decoded.open(&path).unwrap().stat();
            assert_eq!(stat_a, stat_b);
        }
    }

    #[test]
    fn test_rejects_bad_magic() {
        let err = Vfs::from_bundle(b"NOPE\x01").unwrap_err();
        assert!(matches!(err, VfsError::CorruptBundle { .. }));
    }

    #[test]
    fn test_rejects_truncation() {
        let bytes = sample().to_bundle().unwrap();
        let err = Vfs::from_bundle(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = sample().to_bundle().unwrap();
        bytes.push(0);
        let err = Vfs::from_bundle(&bytes).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn test_rejects_file_root() {
        let mut bytes = MAGIC.to_vec();
        bytes.push(VERSION);
        encode_node(&VFile::file("/", unix_time(0, 0), Vec::new()), &mut bytes).unwrap();
        let err = Vfs::from_bundle(&bytes).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
