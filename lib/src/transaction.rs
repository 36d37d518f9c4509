// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use crate::trits::{Hash243, Message, WidthError};

/// A ledger transaction as the storage layer sees it: eight fixed-width
/// fields, written once, never updated.
///
/// `trunk` and `branch` are the two approvee hashes; a transaction refers
/// to two earlier transactions by hash, which is what the edge table
/// indexes in reverse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    bundle: Hash243,
    address: Hash243,
    hash: Hash243,
    message: Message,
    value: i64,
    timestamp: i64,
    trunk: Hash243,
    branch: Hash243,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bundle: Hash243,
        address: Hash243,
        hash: Hash243,
        message: Message,
        value: i64,
        timestamp: i64,
        trunk: Hash243,
        branch: Hash243,
    ) -> Self {
        Self {
            bundle,
            address,
            hash,
            message,
            value,
            timestamp,
            trunk,
            branch,
        }
    }

    pub fn bundle(&self) -> &Hash243 {
        &self.bundle
    }

    pub fn address(&self) -> &Hash243 {
        &self.address
    }

    pub fn hash(&self) -> &Hash243 {
        &self.hash
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn trunk(&self) -> &Hash243 {
        &self.trunk
    }

    pub fn branch(&self) -> &Hash243 {
        &self.branch
    }

    /// The slice-based mutators check widths at runtime for callers that
    /// hand over raw wire bytes. Each one stores the bytes verbatim or
    /// leaves the record untouched.
    pub fn set_bundle(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.bundle = Hash243::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_address(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.address = Hash243::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_hash(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.hash = Hash243::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_message(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.message = Message::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_trunk(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.trunk = Hash243::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_branch(&mut self, bytes: &[u8]) -> Result<(), WidthError> {
        self.branch = Hash243::from_slice(bytes)?;
        Ok(())
    }

    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }

    pub fn set_timestamp(&mut self, timestamp: i64) {
        self.timestamp = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::trits::{HASH_LEN, MESSAGE_LEN};

    fn random_bytes(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        rng.fill(&mut bytes[..]);
        bytes
    }

    #[test]
    fn hash_mutators_enforce_declared_widths() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut record = Transaction::default();

        let setters: [fn(&mut Transaction, &[u8]) -> Result<(), WidthError>; 5] = [
            Transaction::set_bundle,
            Transaction::set_address,
            Transaction::set_hash,
            Transaction::set_trunk,
            Transaction::set_branch,
        ];
        for set in setters {
            for len in [0, HASH_LEN - 1, HASH_LEN + 1] {
                let err = set(&mut record, &random_bytes(&mut rng, len)).unwrap_err();
                assert_eq!(
                    err,
                    WidthError {
                        expected: HASH_LEN,
                        actual: len
                    }
                );
            }
            assert!(set(&mut record, &random_bytes(&mut rng, HASH_LEN)).is_ok());
        }
    }

    #[test]
    fn message_mutator_enforces_declared_width() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut record = Transaction::default();

        for len in [0, MESSAGE_LEN - 1, MESSAGE_LEN + 1] {
            let err = record
                .set_message(&random_bytes(&mut rng, len))
                .unwrap_err();
            assert_eq!(err.expected, MESSAGE_LEN);
        }
        assert!(record
            .set_message(&random_bytes(&mut rng, MESSAGE_LEN))
            .is_ok());
    }

    #[test]
    fn mutators_store_bytes_verbatim() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut record = Transaction::default();

        let bundle = random_bytes(&mut rng, HASH_LEN);
        let message = random_bytes(&mut rng, MESSAGE_LEN);
        record.set_bundle(&bundle).unwrap();
        record.set_message(&message).unwrap();

        assert_eq!(record.bundle().as_slice(), &bundle[..]);
        assert_eq!(record.message().as_slice(), &message[..]);
    }

    #[test]
    fn value_and_timestamp_take_any_i64() {
        let mut record = Transaction::default();
        record.set_value(i64::MIN);
        record.set_timestamp(i64::MAX);
        assert_eq!(record.value(), i64::MIN);
        assert_eq!(record.timestamp(), i64::MAX);

        record.set_value(-1);
        assert_eq!(record.value(), -1);
    }

    #[test]
    fn failed_mutation_leaves_the_record_untouched() {
        let mut record = Transaction::default();
        record.set_hash(&[3; HASH_LEN]).unwrap();
        assert!(record.set_hash(&[4; HASH_LEN - 1]).is_err());
        assert_eq!(record.hash().as_slice(), &[3; HASH_LEN]);
    }
}
