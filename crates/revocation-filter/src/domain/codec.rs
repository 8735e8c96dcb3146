//! Filter state encoding
//!
//! Versioned, little-endian binary layout:
//!
//! ```text
//! magic     [u8; 4]  "CKF\0"
//! version   u8       FORMAT_VERSION
//! fp_size   u8       fingerprint length in bytes
//! count     u64      advisory item count
//! mask      u64      bucket index mask
//! buckets   u32      bucket count (== mask + 1, power of two)
//! per bucket:
//!   slots   u32      slot count (same for every bucket)
//!   per slot:
//!     len   u8       0 for empty, otherwise fp_size
//!     bytes [u8; len]
//! crc32     u32      CRC32 of everything above
//! ```
//!
//! Bucket size is not stored; it is the per-bucket slot count.

use super::bucket::{Bucket, Fingerprint};
use super::config::MAX_FINGERPRINT_SIZE;
use super::cuckoo::CuckooFilter;
use crate::error::CodecError;

/// Leading bytes of every encoded filter.
pub const MAGIC: [u8; 4] = *b"CKF\0";

/// Current layout version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + 1 + 8 + 8 + 4;
const CHECKSUM_LEN: usize = 4;

/// Encode a filter into its persisted form.
///
/// Fails when the filter's shape cannot be represented, so nothing is ever
/// written that `decode` would refuse.
pub fn encode(filter: &CuckooFilter) -> Result<Vec<u8>, CodecError> {
    let bucket_count = u32::try_from(filter.bucket_count())
        .ok()
        .filter(|count| count.is_power_of_two())
        .ok_or_else(|| CodecError::UnencodableBucketCount(filter.bucket_count()))?;
    let fp_size = u8::try_from(filter.fingerprint_size())
        .ok()
        .filter(|&size| size != 0 && usize::from(size) <= MAX_FINGERPRINT_SIZE)
        .ok_or_else(|| CodecError::UnencodableFingerprintSize(filter.fingerprint_size()))?;

    let slot_bytes: usize = filter
        .buckets()
        .iter()
        .map(|b| 4 + b.size() + b.len() * filter.fingerprint_size())
        .sum();
    let mut out = Vec::with_capacity(HEADER_LEN + slot_bytes + CHECKSUM_LEN);

    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.push(fp_size);
    out.extend_from_slice(&(filter.len() as u64).to_le_bytes());
    out.extend_from_slice(&(filter.bucket_index_mask() as u64).to_le_bytes());
    out.extend_from_slice(&bucket_count.to_le_bytes());

    for (index, bucket) in filter.buckets().iter().enumerate() {
        let slots = u32::try_from(bucket.size())
            .ok()
            .filter(|&slots| slots != 0)
            .ok_or_else(|| CodecError::UnencodableBucketSize {
                bucket: index,
                slots: bucket.size(),
            })?;
        out.extend_from_slice(&slots.to_le_bytes());

        for slot in bucket.slots() {
            if !slot.is_empty() && slot.len() != usize::from(fp_size) {
                return Err(CodecError::UnencodableSlot {
                    bucket: index,
                    len: slot.len(),
                });
            }
            out.push(slot.len() as u8);
            out.extend_from_slice(slot.as_bytes());
        }
    }

    let checksum = crc32fast::hash(&out);
    out.extend_from_slice(&checksum.to_le_bytes());
    Ok(out)
}

/// Decode persisted state, rejecting anything structurally invalid.
pub fn decode(bytes: &[u8]) -> Result<CuckooFilter, CodecError> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(CodecError::Truncated {
            offset: bytes.len(),
            needed: HEADER_LEN + CHECKSUM_LEN - bytes.len(),
        });
    }

    let mut reader = Reader::new(bytes);
    let magic = reader.array::<4>()?;
    if magic != MAGIC {
        return Err(CodecError::BadMagic { found: magic });
    }
    let version = reader.u8()?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(CodecError::ChecksumMismatch { expected, actual });
    }

    let mut reader = Reader::new(body);
    reader.skip(MAGIC.len() + 1)?;

    let fp_size = reader.u8()?;
    if fp_size == 0 || fp_size as usize > MAX_FINGERPRINT_SIZE {
        return Err(CodecError::InvalidFingerprintSize(fp_size));
    }
    let count = reader.u64()?;
    let count = usize::try_from(count).map_err(|_| CodecError::CountOverflow(count))?;
    let mask = reader.u64()?;
    let bucket_count = reader.u32()?;

    if bucket_count == 0 || !bucket_count.is_power_of_two() {
        return Err(CodecError::InvalidBucketCount(bucket_count));
    }
    if mask != u64::from(bucket_count) - 1 {
        return Err(CodecError::MaskMismatch {
            mask,
            buckets: bucket_count,
        });
    }

    let mut buckets = Vec::with_capacity(bucket_count.min(1 << 16) as usize);
    let mut bucket_size = None;

    for index in 0..bucket_count as usize {
        let slot_count = reader.u32()?;
        let expected_slots = *bucket_size.get_or_insert(slot_count);
        if slot_count == 0 || slot_count != expected_slots {
            return Err(CodecError::NonUniformBucket {
                bucket: index,
                found: slot_count,
                expected: expected_slots,
            });
        }

        let mut slots = Vec::with_capacity(slot_count.min(256) as usize);
        for _ in 0..slot_count {
            let len = reader.u8()?;
            if len != 0 && len != fp_size {
                return Err(CodecError::InvalidSlotLength {
                    bucket: index,
                    len,
                    fp_size,
                });
            }
            slots.push(Fingerprint::from(reader.take(len as usize)?));
        }
        buckets.push(Bucket::from_slots(slots));
    }

    if reader.remaining() > 0 {
        return Err(CodecError::TrailingBytes(reader.remaining()));
    }

    Ok(CuckooFilter::from_parts(
        buckets,
        count,
        mask as usize,
        fp_size as usize,
    ))
}

/// Bounds-checked cursor over the encoded bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), CodecError> {
        self.take(n).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        self.array::<4>().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64, CodecError> {
        self.array::<8>().map(u64::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::DEFAULT_BUCKET_SIZE;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn populated(n: u32) -> CuckooFilter {
        let mut filter = CuckooFilter::new(100, DEFAULT_BUCKET_SIZE);
        let mut rng = StdRng::seed_from_u64(5);
        for i in 0..n {
            assert!(filter.insert_with_rng(format!("item_{}", i).as_bytes(), &mut rng));
        }
        filter
    }

    /// Recompute the trailing checksum after tampering with the body.
    fn reseal(bytes: &mut Vec<u8>) {
        bytes.truncate(bytes.len() - CHECKSUM_LEN);
        let checksum = crc32fast::hash(bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
    }

    #[test]
    fn test_roundtrip_preserves_membership() {
        let filter = populated(50);

        let decoded = decode(&encode(&filter).unwrap()).expect("decode");

        for i in 0..50 {
            assert!(decoded.lookup(format!("item_{}", i).as_bytes()));
        }
        assert_eq!(decoded, filter);
        assert_eq!(decoded.len(), 50);
        assert_eq!(decoded.bucket_size(), DEFAULT_BUCKET_SIZE);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let filter = populated(20);
        assert_eq!(encode(&filter).unwrap(), encode(&filter.clone()).unwrap());
    }

    #[test]
    fn test_empty_filter_layout() {
        let filter = CuckooFilter::new(2, 3);
        let bytes = encode(&filter).unwrap();

        // header + 2 * (slot count + 3 empty slot lengths) + checksum
        assert_eq!(bytes.len(), HEADER_LEN + 2 * (4 + 3) + CHECKSUM_LEN);
        assert_eq!(&bytes[..4], b"CKF\0");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(bytes[5], 8);
    }

    #[test]
    fn test_rejects_truncated_input() {
        let bytes = encode(&populated(5)).unwrap();

        assert!(matches!(decode(&[]), Err(CodecError::Truncated { .. })));
        assert!(matches!(
            decode(&bytes[..10]),
            Err(CodecError::Truncated { .. })
        ));

        let mut short = bytes[..bytes.len() - 20].to_vec();
        short.extend_from_slice(&[0; CHECKSUM_LEN]);
        reseal(&mut short);
        assert!(matches!(decode(&short), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn test_rejects_bad_magic_and_version() {
        let mut bytes = encode(&populated(1)).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(CodecError::BadMagic { .. })));

        let mut bytes = encode(&populated(1)).unwrap();
        bytes[4] = 9;
        assert_eq!(decode(&bytes), Err(CodecError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_rejects_corruption() {
        let mut bytes = encode(&populated(10)).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;

        assert!(matches!(
            decode(&bytes),
            Err(CodecError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_mask_mismatch() {
        let mut bytes = encode(&CuckooFilter::new(4, 2)).unwrap();
        // mask lives after magic, version, fp_size and count
        bytes[14] = 7;
        reseal(&mut bytes);

        assert!(matches!(
            decode(&bytes),
            Err(CodecError::MaskMismatch { mask: 7, buckets: 4 })
        ));
    }

    #[test]
    fn test_rejects_non_uniform_buckets() {
        let mut bytes = encode(&CuckooFilter::new(2, 2)).unwrap();
        // second bucket's slot count: header + first bucket (4 + 2)
        let offset = HEADER_LEN + 4 + 2;
        bytes[offset] = 1;
        bytes.remove(offset + 4);
        reseal(&mut bytes);

        assert!(matches!(
            decode(&bytes),
            Err(CodecError::NonUniformBucket {
                bucket: 1,
                found: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_rejects_invalid_slot_length() {
        let mut bytes = encode(&CuckooFilter::new(1, 1)).unwrap();
        bytes[HEADER_LEN + 4] = 3;
        bytes.splice(HEADER_LEN + 5..HEADER_LEN + 5, [1, 2, 3]);
        reseal(&mut bytes);

        assert!(matches!(
            decode(&bytes),
            Err(CodecError::InvalidSlotLength { len: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = encode(&populated(3)).unwrap();
        let end = bytes.len() - CHECKSUM_LEN;
        bytes.splice(end..end, [0, 0]);
        reseal(&mut bytes);

        assert_eq!(decode(&bytes), Err(CodecError::TrailingBytes(2)));
    }

    #[test]
    fn test_rejects_zero_buckets() {
        let mut bytes = encode(&CuckooFilter::new(1, 1)).unwrap();
        // bucket count field
        bytes[22..26].copy_from_slice(&0u32.to_le_bytes());
        reseal(&mut bytes);

        assert_eq!(decode(&bytes), Err(CodecError::InvalidBucketCount(0)));
    }

    #[test]
    fn test_encode_rejects_oversized_fingerprints() {
        let mut filter = CuckooFilter::with_fingerprint_size(16, 4, 64);
        assert!(filter.insert(b"vc-1"));

        assert_eq!(
            encode(&filter),
            Err(CodecError::UnencodableFingerprintSize(64))
        );
        // would wrap to 0 as a u8
        assert_eq!(
            encode(&CuckooFilter::with_fingerprint_size(16, 4, 256)),
            Err(CodecError::UnencodableFingerprintSize(256))
        );
    }

    #[test]
    fn test_encode_rejects_zero_fingerprint_size() {
        assert_eq!(
            encode(&CuckooFilter::with_fingerprint_size(16, 4, 0)),
            Err(CodecError::UnencodableFingerprintSize(0))
        );
    }

    #[test]
    fn test_encode_rejects_zero_slot_buckets() {
        assert_eq!(
            encode(&CuckooFilter::new(4, 0)),
            Err(CodecError::UnencodableBucketSize {
                bucket: 0,
                slots: 0
            })
        );
    }

    #[test]
    fn test_encode_rejects_uninitialized_filter() {
        assert_eq!(
            encode(&CuckooFilter::default()),
            Err(CodecError::UnencodableBucketCount(0))
        );
    }

    #[test]
    fn test_encode_rejects_foreign_fingerprint_length() {
        let short = Bucket::from_slots(vec![
            Fingerprint::from(vec![1, 2, 3]),
            Fingerprint::empty(),
        ]);
        let filter = CuckooFilter::from_parts(vec![short], 1, 0, 8);

        assert_eq!(
            encode(&filter),
            Err(CodecError::UnencodableSlot { bucket: 0, len: 3 })
        );
    }

    #[test]
    fn test_slot_count_is_not_limited_to_a_byte() {
        let filter = CuckooFilter::new(2, 300);

        let decoded = decode(&encode(&filter).unwrap()).unwrap();
        assert_eq!(decoded.bucket_size(), 300);
    }

    #[test]
    fn test_largest_fingerprint_roundtrips() {
        let mut filter = CuckooFilter::with_fingerprint_size(16, 4, MAX_FINGERPRINT_SIZE);
        assert!(filter.insert(b"vc-1"));

        let decoded = decode(&encode(&filter).unwrap()).unwrap();
        assert!(decoded.lookup(b"vc-1"));
        assert_eq!(decoded.fingerprint_size(), MAX_FINGERPRINT_SIZE);
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = decode(&bytes);
        }

        #[test]
        fn prop_roundtrip_no_false_negatives(
            items in proptest::collection::hash_set(proptest::collection::vec(any::<u8>(), 1..64), 1..100)
        ) {
            let mut filter = CuckooFilter::new(256, DEFAULT_BUCKET_SIZE);
            let mut rng = StdRng::seed_from_u64(1);
            let inserted: Vec<_> = items
                .into_iter()
                .filter(|item| filter.insert_with_rng(item, &mut rng))
                .collect();

            let decoded = decode(&encode(&filter).unwrap()).unwrap();
            for item in &inserted {
                prop_assert!(decoded.lookup(item));
            }
        }
    }
}
