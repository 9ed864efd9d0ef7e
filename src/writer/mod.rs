//! Serialization of grove containers and raw element buffers

mod buffer;
mod node;

pub use buffer::encode_buffer;
pub use node::{write_dataset, write_group};

use crate::container::{Group, MAGIC, VERSION};
use std::io::{self, Write};

/// Write a container (header plus root group) to a writer
pub fn write<W: Write>(writer: &mut W, root: &Group) -> io::Result<()> {
    // Write header
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // flags (reserved)

    write_group(writer, root)
}

/// Write a container to bytes
pub fn to_bytes(root: &Group) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    write(&mut buf, root)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HEADER_SIZE;

    #[test]
    fn test_write_header() {
        let bytes = to_bytes(&Group::new()).unwrap();

        assert_eq!(&bytes[0..8], MAGIC);
        assert_eq!(
            u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            VERSION
        );
        // empty root: tag + zero count
        assert_eq!(bytes.len(), HEADER_SIZE + 1 + 4);
    }
}
