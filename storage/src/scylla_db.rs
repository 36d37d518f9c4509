// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

//! ScyllaDB backend: keyspace and schema management, the prepared-statement
//! cache, the write fan-out and the streaming selects.

// Imports
// ----------------------------------------------------------------
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::TryStreamExt;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use scylla::DeserializeRow;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    EdgeColumn, Hash243, Message, StoreError, StoreOpts, StoreResult, TangleStore, Transaction,
};

// Statements
// ----------------------------------------------------------------
// The whole query surface, statically enumerated. Each template is
// prepared at most once per session (concurrent first use may prepare
// twice; the last handle wins).

const CREATE_BUNDLE_TABLE: &str = "CREATE TABLE IF NOT EXISTS bundleTable (\
     bundle blob, address blob, hash blob, message blob, \
     value bigint, timestamp bigint, trunk blob, branch blob, \
     PRIMARY KEY (bundle, address, hash))";

const CREATE_EDGE_TABLE: &str = "CREATE TABLE IF NOT EXISTS edgeTable (\
     edge blob, bundle blob, address blob, hash blob, \
     PRIMARY KEY (edge, bundle, address, hash))";

const DROP_BUNDLE_TABLE: &str = "DROP TABLE IF EXISTS bundleTable";
const DROP_EDGE_TABLE: &str = "DROP TABLE IF EXISTS edgeTable";

const INSERT_BUNDLE: &str = "INSERT INTO bundleTable \
     (bundle, address, hash, message, value, timestamp, trunk, branch) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

const INSERT_EDGE: &str =
    "INSERT INTO edgeTable (edge, bundle, address, hash) VALUES (?, ?, ?, ?)";

const SELECT_BY_BUNDLE: &str = "SELECT * FROM bundleTable WHERE bundle = ?";

const SELECT_BY_BUNDLE_AND_ADDRESS: &str =
    "SELECT * FROM bundleTable WHERE bundle = ? AND address = ?";

// The edge key is the bound parameter, so only the payload triple comes
// back; the caller plucks the column it is after.
const SELECT_EDGE: &str = "SELECT bundle, address, hash FROM edgeTable WHERE edge = ?";

// Row shapes
// ----------------------------------------------------------------

#[derive(DeserializeRow)]
struct BundleRow {
    bundle: Vec<u8>,
    address: Vec<u8>,
    hash: Vec<u8>,
    message: Vec<u8>,
    value: i64,
    timestamp: i64,
    trunk: Vec<u8>,
    branch: Vec<u8>,
}

impl TryFrom<BundleRow> for Transaction {
    type Error = StoreError;

    // A width mismatch here means the table holds a row this layer never
    // wrote; surface it instead of truncating.
    fn try_from(row: BundleRow) -> Result<Self, Self::Error> {
        Ok(Transaction::new(
            Hash243::from_slice(&row.bundle)?,
            Hash243::from_slice(&row.address)?,
            Hash243::from_slice(&row.hash)?,
            Message::from_slice(&row.message)?,
            row.value,
            row.timestamp,
            Hash243::from_slice(&row.trunk)?,
            Hash243::from_slice(&row.branch)?,
        ))
    }
}

#[derive(DeserializeRow)]
struct EdgeRow {
    bundle: Vec<u8>,
    address: Vec<u8>,
    hash: Vec<u8>,
}

impl EdgeRow {
    fn column(&self, column: EdgeColumn) -> StoreResult<Hash243> {
        let bytes = match column {
            EdgeColumn::Bundle => &self.bundle,
            EdgeColumn::Address => &self.address,
            EdgeColumn::Hash => &self.hash,
        };
        Ok(Hash243::from_slice(bytes)?)
    }
}

// Store
// ----------------------------------------------------------------

/// A live connection to the cluster, bound to one keyspace.
///
/// Cheap to share behind `&self`: the driver session multiplexes
/// concurrent executes, and the statement cache hands out clones of its
/// prepared handles.
pub struct ScyllaStore {
    session: Session,
    statements: RwLock<HashMap<&'static str, PreparedStatement>>,
}

impl ScyllaStore {
    /// Connect to the cluster, create the keyspace if missing, bind it,
    /// and (with `opts.create_tables`) make sure both tables exist.
    ///
    /// Never drops anything; [`reset_schema`](Self::reset_schema) is the
    /// destructive bring-up path.
    pub async fn connect(opts: &StoreOpts) -> StoreResult<Self> {
        check_identifier(&opts.keyspace)?;

        let session = SessionBuilder::new()
            .known_nodes(opts.hosts.split(',').map(str::trim))
            .build()
            .await
            .map_err(StoreError::connect)?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = \
                     {{'class': 'SimpleStrategy', 'replication_factor': '2'}}",
                    opts.keyspace
                ),
                (),
            )
            .await
            .map_err(StoreError::query)?;
        session
            .use_keyspace(&opts.keyspace, false)
            .await
            .map_err(StoreError::query)?;
        info!(keyspace = %opts.keyspace, "keyspace bound");

        let store = Self {
            session,
            statements: RwLock::new(HashMap::new()),
        };
        if opts.create_tables {
            store.ensure_schema().await?;
        }
        Ok(store)
    }

    /// Create both tables if missing. Idempotent.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.ddl(CREATE_BUNDLE_TABLE).await?;
        self.ddl(CREATE_EDGE_TABLE).await
    }

    /// Drop and recreate both tables, destroying every persisted record.
    /// For bring-up and test clusters only.
    pub async fn reset_schema(&self) -> StoreResult<()> {
        self.ddl(DROP_BUNDLE_TABLE).await?;
        self.ddl(CREATE_BUNDLE_TABLE).await?;
        self.ddl(DROP_EDGE_TABLE).await?;
        self.ddl(CREATE_EDGE_TABLE).await?;
        info!("schema reset");
        Ok(())
    }

    async fn ddl(&self, cql: &str) -> StoreResult<()> {
        self.session
            .query_unpaged(cql, ())
            .await
            .map_err(StoreError::query)?;
        Ok(())
    }

    /// One prepared handle per template for the session's lifetime.
    async fn prepared(&self, cql: &'static str) -> StoreResult<PreparedStatement> {
        if let Some(statement) = self.statements.read().await.get(cql) {
            return Ok(statement.clone());
        }
        let statement = self
            .session
            .prepare(cql)
            .await
            .map_err(StoreError::query)?;
        self.statements
            .write()
            .await
            .insert(cql, statement.clone());
        Ok(statement)
    }
}

#[async_trait]
impl TangleStore for ScyllaStore {
    async fn insert_transactions(&self, records: &[Transaction]) -> StoreResult<()> {
        let insert = self.prepared(INSERT_BUNDLE).await?;
        for record in records {
            self.session
                .execute_unpaged(
                    &insert,
                    (
                        record.bundle().as_slice(),
                        record.address().as_slice(),
                        record.hash().as_slice(),
                        record.message().as_slice(),
                        record.value(),
                        record.timestamp(),
                        record.trunk().as_slice(),
                        record.branch().as_slice(),
                    ),
                )
                .await
                .map_err(StoreError::query)?;
        }
        Ok(())
    }

    async fn insert_edges(&self, records: &[Transaction]) -> StoreResult<()> {
        let insert = self.prepared(INSERT_EDGE).await?;
        for record in records {
            for edge in [record.address(), record.trunk(), record.branch()] {
                self.session
                    .execute_unpaged(
                        &insert,
                        (
                            edge.as_slice(),
                            record.bundle().as_slice(),
                            record.address().as_slice(),
                            record.hash().as_slice(),
                        ),
                    )
                    .await
                    .map_err(StoreError::query)?;
            }
        }
        Ok(())
    }

    async fn transactions_by_bundle(
        &self,
        bundle: &Hash243,
        address: Option<&Hash243>,
    ) -> StoreResult<Vec<Transaction>> {
        let pager = match address {
            Some(address) => {
                let select = self.prepared(SELECT_BY_BUNDLE_AND_ADDRESS).await?;
                self.session
                    .execute_iter(select, (bundle.as_slice(), address.as_slice()))
                    .await
            }
            None => {
                let select = self.prepared(SELECT_BY_BUNDLE).await?;
                self.session
                    .execute_iter(select, (bundle.as_slice(),))
                    .await
            }
        }
        .map_err(StoreError::query)?;

        let mut rows = pager
            .rows_stream::<BundleRow>()
            .map_err(StoreError::query)?;
        let mut records = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(StoreError::query)? {
            records.push(Transaction::try_from(row)?);
        }
        debug!(rows = records.len(), "bundle select");
        Ok(records)
    }

    async fn push_hashes_by_bundle(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
    ) -> StoreResult<()> {
        let select = self.prepared(SELECT_BY_BUNDLE).await?;
        let mut rows = self
            .session
            .execute_iter(select, (bundle.as_slice(),))
            .await
            .map_err(StoreError::query)?
            .rows_stream::<BundleRow>()
            .map_err(StoreError::query)?;
        while let Some(row) = rows.try_next().await.map_err(StoreError::query)? {
            out.push_back(Hash243::from_slice(&row.hash)?);
        }
        Ok(())
    }

    async fn push_hashes_by_bundle_and_address(
        &self,
        out: &mut VecDeque<Hash243>,
        bundle: &Hash243,
        address: &Hash243,
    ) -> StoreResult<()> {
        let select = self.prepared(SELECT_BY_BUNDLE_AND_ADDRESS).await?;
        let mut rows = self
            .session
            .execute_iter(select, (bundle.as_slice(), address.as_slice()))
            .await
            .map_err(StoreError::query)?
            .rows_stream::<BundleRow>()
            .map_err(StoreError::query)?;
        while let Some(row) = rows.try_next().await.map_err(StoreError::query)? {
            out.push_back(Hash243::from_slice(&row.hash)?);
        }
        Ok(())
    }

    async fn get_column_from_edge(
        &self,
        out: &mut VecDeque<Hash243>,
        edge: &Hash243,
        column: EdgeColumn,
    ) -> StoreResult<()> {
        let select = self.prepared(SELECT_EDGE).await?;
        let mut rows = self
            .session
            .execute_iter(select, (edge.as_slice(),))
            .await
            .map_err(StoreError::query)?
            .rows_stream::<EdgeRow>()
            .map_err(StoreError::query)?;
        while let Some(row) = rows.try_next().await.map_err(StoreError::query)? {
            out.push_back(row.column(column)?);
        }
        Ok(())
    }
}

/// Keyspace names get spliced into DDL and must be bare identifiers.
fn check_identifier(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic()
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidInput(format!(
            "{name:?} is not a valid keyspace name"
        )))
    }
}
