use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

/// Table definition shared by every blob table: string key, opaque bytes.
pub type BlobTableDefinition = TableDefinition<'static, &'static str, &'static [u8]>;

/// A redb table holding whole blobs under string keys.
///
/// Implementors name their table and hand out the database; reads and
/// writes each run in their own transaction.
pub trait BlobTable: Send + Sync {
    const TABLE: BlobTableDefinition;

    fn db(&self) -> &Arc<Database>;

    fn read_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(Self::TABLE)?;
        Ok(table.get(key)?.map(|value| value.value().to_vec()))
    }

    /// Write `blob` under `key`, or remove the key when `blob` is `None`.
    ///
    /// Returns whether the key held a value before.
    fn replace_blob(&self, key: &str, blob: Option<&[u8]>) -> Result<bool> {
        let write_txn = self.db().begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(Self::TABLE)?;
            match blob {
                Some(data) => table.insert(key, data)?.is_some(),
                None => table.remove(key)?.is_some(),
            }
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let read_txn = self.db().begin_read()?;
        let table = read_txn.open_table(Self::TABLE)?;

        let mut keys = Vec::new();
        for item in table.iter()? {
            let (key, _) = item?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

/// Declare a struct backed by its own [`BlobTable`].
#[macro_export]
macro_rules! define_blob_table {
    ( $(#[$meta:meta])* $vis:vis struct $name:ident { table: $table_name:literal } ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            db: std::sync::Arc<redb::Database>,
        }

        impl $name {
            /// Bind to `db`, creating the table on first use.
            pub fn new(db: std::sync::Arc<redb::Database>) -> anyhow::Result<Self> {
                let write_txn = db.begin_write()?;
                write_txn.open_table(<Self as $crate::BlobTable>::TABLE)?;
                write_txn.commit()?;
                Ok(Self { db })
            }
        }

        impl $crate::BlobTable for $name {
            const TABLE: $crate::BlobTableDefinition = redb::TableDefinition::new($table_name);

            fn db(&self) -> &std::sync::Arc<redb::Database> {
                &self.db
            }
        }
    };
}
