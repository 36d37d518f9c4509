// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! # Tangledb storage
//!
//! Persists tangle transactions in a wide-column store and answers lookups
//! by bundle, by address and by approvee hash.
//!
//! The column store only gives efficient access by partition key, so the
//! layer keeps two tables. The primary table partitions the records by the
//! bundle that committed them:
//!
//!  ____________________________________________________________________
//! | bundleTable                                                        |
//! |____________________________________________________________________|
//! | bundle | address | hash | message | value | timestamp | trunk | branch |
//! |________|_________|______|_________|_______|___________|_______|________|
//!   partition  ^--- clustering ---^
//!
//! The edge table is a hand-rolled reverse index. Every transaction fans
//! out three rows, one per hash that mentions it:
//!
//!  _________________________________
//! | edgeTable                       |
//! |_________________________________|
//! | edge | bundle | address | hash  |
//! |______|________|_________|_______|
//!   partition  ^--- clustering ---^
//!
//! with `edge` set to the record's address, trunk and branch in turn, all
//! three pointing back at the same `(bundle, address, hash)` triple. A
//! lookup "which transactions mention X" is then a single-partition read.
//!
//! Records are immutable: inserted exactly once, never updated or deleted
//! here. Re-inserting the same record lands on the same primary keys, so
//! retrying a partially applied write is safe.
//!
//! [`TangleStore`] is the backend seam. [`ScyllaStore`] talks to a
//! ScyllaDB/Cassandra cluster through prepared statements;
//! [`InMemoryStore`] mirrors the exact table semantics in ordered maps for
//! tests and embedded use. The combined traversal is a provided trait
//! method, so every backend answers combined queries identically.

// Imports
// ----------------------------------------------------------------
use std::collections::{BTreeSet, HashSet, VecDeque};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(feature = "scylla")]
use tracing::error;

pub use tangledb_lib::{Hash243, Message, Transaction, WidthError, HASH_LEN, MESSAGE_LEN};

#[cfg(feature = "in-memory")]
pub mod mem_db;
#[cfg(feature = "scylla")]
pub mod scylla_db;

#[cfg(feature = "in-memory")]
pub use mem_db::InMemoryStore;
#[cfg(feature = "scylla")]
pub use scylla_db::ScyllaStore;

// Types
// ----------------------------------------------------------------

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A byte slice had the wrong width for its column, or an identifier
    /// could not be spliced into DDL.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot reach the cluster: {0}")]
    ConnectFail(String),
    #[error("query failed: {0}")]
    QueryFail(String),
    /// Downstream synchronization failure. Produced by ingest
    /// collaborators, never by this crate.
    #[error("synchronization failed: {0}")]
    Sync(String),
}

impl From<WidthError> for StoreError {
    fn from(err: WidthError) -> Self {
        StoreError::InvalidInput(err.to_string())
    }
}

#[cfg(feature = "scylla")]
impl StoreError {
    pub(crate) fn connect(err: impl std::fmt::Display) -> Self {
        error!("cannot reach the cluster: {err}");
        StoreError::ConnectFail(err.to_string())
    }

    /// The raw driver message is logged here; the caller still gets the
    /// error back.
    pub(crate) fn query(err: impl std::fmt::Display) -> Self {
        error!("query failed: {err}");
        StoreError::QueryFail(err.to_string())
    }
}

/// Connection options for the column-store backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOpts {
    /// Comma-separated contact points.
    pub hosts: String,
    /// Keyspace to create and bind.
    pub keyspace: String,
    /// Create both tables on connect if they do not exist.
    pub create_tables: bool,
}

impl Default for StoreOpts {
    fn default() -> Self {
        Self {
            hosts: "127.0.0.1".to_owned(),
            keyspace: "tangle".to_owned(),
            create_tables: true,
        }
    }
}

/// Column of an edge row to project into the result queue.
///
/// One prepared select serves every traversal step; the caller picks which
/// column of each returned row it is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeColumn {
    Bundle,
    Address,
    Hash,
}

// Backend seam
// ----------------------------------------------------------------

/// Operations every transaction store answers.
///
/// The per-table primitives stream their rows into the caller-owned queue
/// one by one; nothing buffers a full result set except the explicitly
/// diagnostic [`transactions_by_bundle`](TangleStore::transactions_by_bundle).
#[async_trait]
pub trait TangleStore {
    /// Insert records into the primary table, one row each, stopping at
    /// the first failure. Nothing is rolled back; re-running with the same
    /// records is safe because the rows are keyed by content.
    async fn insert_transactions(&self, records: &[Transaction]) -> StoreResult<()>;

    /// Fan out the reverse index: three edge rows per record, keyed by the
    /// record's address, trunk and branch in turn.
    async fn insert_edges(&self, records: &[Transaction]) -> StoreResult<()>;

    /// Materialize the full records of a bundle, optionally narrowed to
    /// one address. Diagnostic path: buffers the whole result set.
    async fn transactions_by_bundle(
        &self,
        bundle: &Hash243,
        address: Option<&Hash243>,
    ) -> StoreResult<Vec<Transaction>>;

    /// Push the hash of every record in `bundle` onto `out`.
    async fn push_hashes_by_bundle(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
    ) -> StoreResult<()>;

    /// Push the hash of every record in `bundle` carrying `address` onto
    /// `out`.
    async fn push_hashes_by_bundle_and_address(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
        address: &Hash243,
    ) -> StoreResult<()>;

    /// Project `column` of every edge row keyed by `edge` onto `out`.
    async fn get_column_from_edge(
        &self,
        out: &mut VecDeque<Hash243>,
        edge: &Hash243,
        column: EdgeColumn,
    ) -> StoreResult<()>;

    /// Insert into the primary table, then fan out the edge rows, keeping
    /// the two tables consistent with a single call.
    async fn store_transactions(&self, records: &[Transaction]) -> StoreResult<()> {
        self.insert_transactions(records).await?;
        self.insert_edges(records).await
    }

    /// Union query: the hash of every record whose bundle is in `bundles`,
    /// whose address is in `addresses`, or which approves a hash in
    /// `approves` by trunk or branch.
    ///
    /// Insertion order is preserved and a hash satisfying several
    /// predicates shows up several times; see [`dedup_hashes`] for callers
    /// that want set semantics.
    async fn get_transactions(
        &self,
        out: &mut VecDeque<Hash243>,
        bundles: &[Hash243],
        addresses: &[Hash243],
        approves: &[Hash243],
    ) -> StoreResult<()> {
        for bundle in bundles {
            self.push_hashes_by_bundle(out, bundle).await?;
        }
        for address in addresses {
            // The edge table maps the address to the bundles mentioning
            // it; the primary table then narrows each bundle partition to
            // the rows carrying the address.
            let mut bundle_queue = VecDeque::new();
            self.get_column_from_edge(&mut bundle_queue, address, EdgeColumn::Bundle)
                .await?;
            let bundles_seen: BTreeSet<Hash243> = bundle_queue.into_iter().collect();
            for bundle in &bundles_seen {
                self.push_hashes_by_bundle_and_address(out, bundle, address)
                    .await?;
            }
        }
        for approvee in approves {
            self.get_column_from_edge(out, approvee, EdgeColumn::Hash)
                .await?;
        }
        Ok(())
    }
}

/// Drop duplicate hashes, keeping the first occurrence of each.
pub fn dedup_hashes(hashes: impl IntoIterator<Item = Hash243>) -> Vec<Hash243> {
    let mut seen = HashSet::new();
    hashes.into_iter().filter(|hash| seen.insert(*hash)).collect()
}
