use connector_database::basic_db::{DbError, SafeDatabase};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::string::FromUtf8Error;
use thiserror::Error;

pub const USERS: &str = "users";
pub const PROFILES: &str = "profiles";
pub const POSTS: &str = "posts";
pub const SESSIONS: &str = "sessions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("invalid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A record persisted as JSON under `key()` in `TABLE`.
pub trait Document: Serialize + DeserializeOwned {
    const TABLE: &'static str;

    fn key(&self) -> String;
}

/// Typed JSON collections on top of a [`SafeDatabase`].
#[derive(Clone)]
pub struct DocumentStore<D> {
    database: D,
}

impl<D: SafeDatabase> DocumentStore<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn find<T: Document>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.database.read(key, T::TABLE)? {
            Some(data) => Ok(Some(decode(data)?)),
            None => Ok(None),
        }
    }

    pub fn save<T: Document>(&self, document: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(document)?;
        self.database.write(&document.key(), &json, T::TABLE)?;
        Ok(())
    }

    /// Returns `true` when a document was removed.
    pub fn remove<T: Document>(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.database.delete(key, T::TABLE)?)
    }

    /// Every document in the collection, in key order.
    pub fn all<T: Document>(&self) -> Result<Vec<T>, StoreError> {
        let mut entries: Vec<_> = self.database.read_all(T::TABLE)?.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        entries.into_iter().map(|(_, value)| decode(value)).collect()
    }
}

fn decode<T: DeserializeOwned>(data: Vec<u8>) -> Result<T, StoreError> {
    let text = String::from_utf8(data)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use connector_database::basic_db::InnerDatabase;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Document for Note {
        const TABLE: &'static str = "notes";

        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn save_find_remove() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let store = DocumentStore::new(InnerDatabase::open(temp_dir.path().join("test_db"))?);

        store.save(&note("n1", "first"))?;
        assert_eq!(store.find::<Note>("n1")?, Some(note("n1", "first")));

        store.save(&note("n1", "rewritten"))?;
        assert_eq!(store.find::<Note>("n1")?.map(|n| n.body), Some("rewritten".to_string()));

        assert!(store.remove::<Note>("n1")?);
        assert_eq!(store.find::<Note>("n1")?, None);
        Ok(())
    }

    #[test]
    fn all_is_key_ordered() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let store = DocumentStore::new(InnerDatabase::open(temp_dir.path().join("test_db"))?);

        store.save(&note("b", "2"))?;
        store.save(&note("a", "1"))?;

        let ids: Vec<String> = store.all::<Note>()?.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn corrupt_document_is_a_serialization_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempdir()?;
        let database = InnerDatabase::open(temp_dir.path().join("test_db"))?;
        database.write("broken", "{not json", "notes")?;

        let store = DocumentStore::new(database);
        assert!(matches!(
            store.find::<Note>("broken"),
            Err(StoreError::Serialization(_))
        ));
        Ok(())
    }
}
