//! Fingerprint buckets
//!
//! A bucket is a fixed number of slots. A slot holding a zero-length
//! fingerprint is empty; there are no tombstones, insertion always takes the
//! first empty slot.

use std::fmt;

use rand::Rng;

/// Fixed-length digest stored in place of an item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    /// The empty-slot marker.
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Zero-length fingerprints mark an empty slot.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Fingerprint {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A bucket containing a fixed number of fingerprint slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    slots: Vec<Fingerprint>,
}

impl Bucket {
    /// Create an empty bucket with `size` slots.
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![Fingerprint::empty(); size],
        }
    }

    /// Rebuild a bucket from decoded slots; slot count becomes the bucket size.
    pub fn from_slots(slots: Vec<Fingerprint>) -> Self {
        Self { slots }
    }

    /// Insert a copy of `fp` into the first empty slot.
    pub fn insert(&mut self, fp: &[u8]) -> bool {
        if fp.is_empty() {
            return false;
        }
        match self.slots.iter_mut().find(|slot| slot.is_empty()) {
            Some(slot) => {
                *slot = Fingerprint::from(fp);
                true
            }
            None => false,
        }
    }

    /// Check if a byte-exact copy of `fp` is stored.
    pub fn contains(&self, fp: &[u8]) -> bool {
        !fp.is_empty() && self.slots.iter().any(|slot| slot.as_bytes() == fp)
    }

    /// Remove the first exact match of `fp`.
    pub fn delete(&mut self, fp: &[u8]) -> bool {
        if fp.is_empty() {
            return false;
        }
        match self.slots.iter_mut().find(|slot| slot.as_bytes() == fp) {
            Some(slot) => {
                *slot = Fingerprint::empty();
                true
            }
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Fingerprint::is_empty)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Number of slots, occupied or not.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Fingerprint] {
        &self.slots
    }

    /// Clear every slot.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Fingerprint::empty());
    }

    /// Pick an occupied slot uniformly at random.
    ///
    /// Returns the slot index and a copy of its fingerprint; the bucket is
    /// left untouched.
    pub fn random_occupant<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, Fingerprint)> {
        let occupied: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_empty())
            .map(|(i, _)| i)
            .collect();

        if occupied.is_empty() {
            return None;
        }
        let slot = occupied[rng.gen_range(0..occupied.len())];
        Some((slot, self.slots[slot].clone()))
    }

    /// Overwrite a specific slot, returning what it held.
    pub(crate) fn replace(&mut self, slot: usize, fp: Fingerprint) -> Option<Fingerprint> {
        self.slots
            .get_mut(slot)
            .map(|s| std::mem::replace(s, fp))
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for slot in &self.slots {
            if slot.is_empty() {
                write!(f, "null ")?;
            } else {
                write!(f, "{} ", hex::encode(slot.as_bytes()))?;
            }
        }
        write!(f, "]")
    }
}
