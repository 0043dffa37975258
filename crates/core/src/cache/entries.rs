//! Entry operations within a named store.
//!
//! Entries are keyed by [`compute_request_key`]; writes overwrite any entry
//! with the same key. [`CacheDb::put_all`] writes a whole batch in one
//! transaction so a failed batch leaves the store unchanged.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::http::{GatewayResponse, Header};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// A response to be written under a request identity.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub method: String,
    pub url: String,
    pub response: GatewayResponse,
}

impl NewEntry {
    pub fn get(url: impl Into<String>, response: GatewayResponse) -> Self {
        Self { method: "GET".into(), url: url.into(), response }
    }

    fn key(&self) -> String {
        compute_request_key(&self.method, &self.url)
    }
}

/// A stored entry as read back from a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: String,
    pub method: String,
    pub url: String,
    pub response: GatewayResponse,
    pub stored_at: String,
}

fn require_store(conn: &rusqlite::Connection, store: &str) -> Result<(), Error> {
    let exists: bool =
        conn.query_row("SELECT EXISTS(SELECT 1 FROM stores WHERE name = ?1)", params![store], |row| row.get(0))?;
    if exists { Ok(()) } else { Err(Error::CacheMiss(format!("no store named {store}"))) }
}

fn insert(conn: &rusqlite::Connection, store: &str, entry: &NewEntry, stored_at: &str) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.response.headers)?;
    conn.execute(
        "INSERT INTO entries (
            store_name, key, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(store_name, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            store,
            entry.key(),
            entry.method.to_ascii_uppercase(),
            &entry.url,
            entry.response.status,
            &entry.response.status_text,
            headers_json,
            &entry.response.body,
            stored_at,
        ],
    )?;
    Ok(())
}

fn read_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(StoredEntry, String)> {
    let headers_json: String = row.get(5)?;
    let entry = StoredEntry {
        key: row.get(0)?,
        method: row.get(1)?,
        url: row.get(2)?,
        response: GatewayResponse {
            status: row.get(3)?,
            status_text: row.get(4)?,
            headers: Vec::new(),
            body: row.get(6)?,
        },
        stored_at: row.get(7)?,
    };
    Ok((entry, headers_json))
}

fn decode((mut entry, headers_json): (StoredEntry, String)) -> Result<StoredEntry, Error> {
    entry.response.headers = serde_json::from_str::<Vec<Header>>(&headers_json)?;
    Ok(entry)
}

const SELECT_ENTRY: &str = "SELECT key, method, url, status, status_text, headers_json, body, stored_at FROM entries";

impl CacheDb {
    /// Look up a request in a store.
    ///
    /// Returns None if the store or the entry doesn't exist.
    pub async fn get_entry(&self, store: &str, method: &str, url: &str) -> Result<Option<StoredEntry>, Error> {
        let store = store.to_string();
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} WHERE store_name = ?1 AND key = ?2"))?;
                match stmt.query_row(params![store, key], read_entry) {
                    Ok(row) => Ok(Some(decode(row)?)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Stored response for a request, if any.
    pub async fn match_request(&self, store: &str, method: &str, url: &str) -> Result<Option<GatewayResponse>, Error> {
        Ok(self.get_entry(store, method, url).await?.map(|e| e.response))
    }

    /// Write one entry, overwriting any entry with the same identity.
    pub async fn put_entry(&self, store: &str, entry: NewEntry) -> Result<(), Error> {
        self.put_all(store, vec![entry]).await.map(|_| ())
    }

    /// Write a batch of entries in a single transaction.
    ///
    /// Either every entry is written or none is. Returns the number of
    /// distinct entries now stored for the batch.
    pub async fn put_all(&self, store: &str, entries: Vec<NewEntry>) -> Result<usize, Error> {
        let store = store.to_string();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                require_store(&tx, &store)?;
                let mut keys = std::collections::HashSet::new();
                for entry in &entries {
                    insert(&tx, &store, entry, &stored_at)?;
                    keys.insert(entry.key());
                }
                tx.commit()?;
                Ok(keys.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Every entry in a store, in URL order.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<StoredEntry>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<StoredEntry>, Error> {
                let mut stmt = conn.prepare(&format!("{SELECT_ENTRY} WHERE store_name = ?1 ORDER BY url, method"))?;
                let rows = stmt
                    .query_map(params![store], read_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(decode).collect()
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_entries(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store_name = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
