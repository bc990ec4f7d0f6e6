use libmdbx::{Database, DatabaseOptions, TableFlags, WriteFlags, WriteMap};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("mdbx error: {0}")]
    Mdbx(#[from] libmdbx::Error),

    #[error("database mutex poisoned")]
    Poisoned,
}

/// Shared handle to one libmdbx environment. Cloning shares the environment.
#[derive(Clone)]
pub struct InnerDatabase {
    db: Arc<Mutex<Database<WriteMap>>>,
}

/// Named tables of string keys to byte values.
///
/// Tables are created on first write; reading a table that was never written
/// behaves like reading an empty one.
pub trait SafeDatabase: Clone + Send + Sync + 'static {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError>;

    fn write(&self, key: &str, value: &str, table: &str) -> Result<(), DbError>;

    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, DbError>;

    fn read_all(&self, table: &str) -> Result<HashMap<Vec<u8>, Vec<u8>>, DbError>;

    /// Returns `true` when the key existed.
    fn delete(&self, key: &str, table: &str) -> Result<bool, DbError>;
}

impl InnerDatabase {
    fn lock(&self) -> Result<MutexGuard<'_, Database<WriteMap>>, DbError> {
        self.db.lock().map_err(|_| DbError::Poisoned)
    }
}

impl SafeDatabase for InnerDatabase {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let mut options = DatabaseOptions::default();
        options.max_tables = Some(100);
        let db = Database::<WriteMap>::open_with_options(path, options)?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn write(&self, key: &str, value: &str, table: &str) -> Result<(), DbError> {
        let db = self.lock()?;
        let transaction = db.begin_rw_txn()?;
        let table = transaction.create_table(Some(table), TableFlags::default())?;

        transaction.put(&table, key, value, WriteFlags::default())?;
        transaction.commit()?;
        Ok(())
    }

    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, DbError> {
        let db = self.lock()?;
        let transaction = db.begin_ro_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let result = transaction.get(&table, key.as_bytes())?;
            return Ok(result);
        }

        Ok(None)
    }

    fn read_all(&self, table: &str) -> Result<HashMap<Vec<u8>, Vec<u8>>, DbError> {
        let mut map = HashMap::new();
        let db = self.lock()?;
        let transaction = db.begin_ro_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let cursor = transaction.cursor(&table)?;

            for item in cursor {
                let (key, value) = item?;
                map.insert(key.to_vec(), value.to_vec());
            }
        }

        Ok(map)
    }

    fn delete(&self, key: &str, table: &str) -> Result<bool, DbError> {
        let db = self.lock()?;
        let transaction = db.begin_rw_txn()?;

        let removed = match transaction.open_table(Some(table)) {
            Ok(table) => transaction.del(&table, key, None)?,
            Err(_) => false,
        };

        transaction.commit()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> Result<(tempfile::TempDir, InnerDatabase), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let db = InnerDatabase::open(temp_dir.path().join("test_db"))?;
        Ok((temp_dir, db))
    }

    #[test]
    fn write_then_read() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, db) = open_temp()?;

        db.write("alice", "{\"name\":\"Alice\"}", "users")?;

        let value = db.read("alice", "users")?;
        assert_eq!(value.as_deref(), Some(&b"{\"name\":\"Alice\"}"[..]));
        assert_eq!(db.read("bob", "users")?, None);
        Ok(())
    }

    #[test]
    fn untouched_table_reads_empty() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, db) = open_temp()?;

        assert_eq!(db.read("anything", "posts")?, None);
        assert!(db.read_all("posts")?.is_empty());
        assert!(!db.delete("anything", "posts")?);
        Ok(())
    }

    #[test]
    fn read_all_returns_every_entry() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, db) = open_temp()?;

        for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
            db.write(key, value, "letters")?;
        }

        let all = db.read_all("letters")?;
        assert_eq!(all.len(), 3);
        assert_eq!(all.get(&b"b".to_vec()), Some(&b"2".to_vec()));
        Ok(())
    }

    #[test]
    fn delete_removes_only_the_key() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, db) = open_temp()?;
        db.write("a", "1", "letters")?;
        db.write("b", "2", "letters")?;

        assert!(db.delete("a", "letters")?);
        assert!(!db.delete("a", "letters")?);

        assert_eq!(db.read("a", "letters")?, None);
        assert_eq!(db.read("b", "letters")?, Some(b"2".to_vec()));
        Ok(())
    }

    #[test]
    fn clones_share_the_environment() -> Result<(), Box<dyn std::error::Error>> {
        let (_dir, db) = open_temp()?;
        let other = db.clone();

        other.write("k", "v", "shared")?;
        assert_eq!(db.read("k", "shared")?, Some(b"v".to_vec()));
        Ok(())
    }
}
