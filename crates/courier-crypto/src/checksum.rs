//! CRC32 checksum shared with the server.

/// CRC32 (IEEE 802.3, reflected, init and final XOR `0xFFFFFFFF`) of `data`.
#[must_use]
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_empty() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let mut hasher = crc32fast::Hasher::new();
        for chunk in data.chunks(5) {
            hasher.update(chunk);
        }
        assert_eq!(hasher.finalize(), checksum(data));
        assert_eq!(checksum(data), 0x414F_A339);
    }
}
