// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! Ledger value types shared across the tangledb crates.
//!
//! Everything the storage layer persists is built from two opaque
//! fixed-width byte strings: the 81-byte flex-trit encoding of a 243-trit
//! hash and the 2187-byte signature/message fragment. The widths are
//! compile-time constants, so a [`Transaction`] assembled from typed values
//! can never carry a mis-sized field; the slice-based mutators keep a
//! runtime width check for callers decoding untrusted input.

pub mod transaction;
pub mod trits;

pub use transaction::Transaction;
pub use trits::{Hash243, Message, WidthError, HASH_LEN, MESSAGE_LEN};
