// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! In-memory backend. Ordered maps stand in for the two tables, keyed the
//! way the cluster keys them, so tests and embedders get the exact storage
//! semantics without a cluster: idempotent inserts, clustering order,
//! three edge rows per record.

// Imports
// ----------------------------------------------------------------
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{EdgeColumn, Hash243, StoreResult, TangleStore, Transaction};

/// Primary key of the bundle table.
type BundleKey = (Hash243, Hash243, Hash243);
/// Full edge row: (edge, bundle, address, hash).
type EdgeRow = (Hash243, Hash243, Hash243, Hash243);

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    bundle_table: BTreeMap<BundleKey, Transaction>,
    edge_table: BTreeSet<EdgeRow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TangleStore for InMemoryStore {
    async fn insert_transactions(&self, records: &[Transaction]) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        for record in records {
            let key = (*record.bundle(), *record.address(), *record.hash());
            tables.bundle_table.insert(key, record.clone());
        }
        Ok(())
    }

    async fn insert_edges(&self, records: &[Transaction]) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        for record in records {
            for edge in [record.address(), record.trunk(), record.branch()] {
                tables.edge_table.insert((
                    *edge,
                    *record.bundle(),
                    *record.address(),
                    *record.hash(),
                ));
            }
        }
        Ok(())
    }

    async fn transactions_by_bundle(
        &self,
        bundle: &Hash243,
        address: Option<&Hash243>,
    ) -> StoreResult<Vec<Transaction>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bundle_table
            .values()
            .filter(|record| record.bundle() == bundle)
            .filter(|record| address.map_or(true, |address| record.address() == address))
            .cloned()
            .collect())
    }

    async fn push_hashes_by_bundle(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
    ) -> StoreResult<()> {
        let tables = self.tables.lock().await;
        for record in tables
            .bundle_table
            .values()
            .filter(|record| record.bundle() == bundle)
        {
            out.push_back(*record.hash());
        }
        Ok(())
    }

    async fn push_hashes_by_bundle_and_address(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
        address: &Hash243,
    ) -> StoreResult<()> {
        let tables = self.tables.lock().await;
        for record in tables
            .bundle_table
            .values()
            .filter(|record| record.bundle() == bundle && record.address() == address)
        {
            out.push_back(*record.hash());
        }
        Ok(())
    }

    async fn get_column_from_edge(
        &self,
        out: &mut VecDeque<Hash243>,
        edge: &Hash243,
        column: EdgeColumn,
    ) -> StoreResult<()> {
        let tables = self.tables.lock().await;
        for (_, bundle, address, hash) in
            tables.edge_table.iter().filter(|(key, ..)| key == edge)
        {
            out.push_back(match column {
                EdgeColumn::Bundle => *bundle,
                EdgeColumn::Address => *address,
                EdgeColumn::Hash => *hash,
            });
        }
        Ok(())
    }
}
