//! Entry operations within a Cache Store: match, put, atomic batch put.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::http::{CapturedResponse, InterceptedRequest};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Listing row for a stored entry, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheEntryMeta {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body_len: u64,
    pub stored_at: String,
}

/// Owned, thread-movable form of one row to write.
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &InterceptedRequest, response: &CapturedResponse) -> Result<Self, Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("only GET requests can be stored, got {}", request.method)));
        }
        Ok(Self {
            key_hash: compute_request_key(&request.method, request.url.as_str()),
            method: request.method.clone(),
            url: request.url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json: serde_json::to_string(&response.headers)?,
            body: response.body.to_vec(),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection, store: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT INTO cache_entries (
                store, key_hash, method, url, status, status_text, headers_json, body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(store, key_hash) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                status = excluded.status,
                status_text = excluded.status_text,
                headers_json = excluded.headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                store,
                &self.key_hash,
                &self.method,
                &self.url,
                self.status as i64,
                &self.status_text,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

fn ensure_store(conn: &rusqlite::Connection, store: &str, now: &str) -> Result<(), Error> {
    conn.execute(
        "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
        params![store, now],
    )?;
    Ok(())
}

impl CacheDb {
    /// Look up a request in the named store.
    ///
    /// Only GET entries exist, so any other method is a miss without
    /// touching the database.
    pub async fn match_request(
        &self, store: &str, request: &InterceptedRequest,
    ) -> Result<Option<CapturedResponse>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let store = store.to_string();
        let key_hash = compute_request_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<CapturedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, status_text, headers_json, body
                     FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                let (status, status_text, headers_json, body) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?;
                let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;

                Ok(Some(CapturedResponse { status, status_text, headers, body: Bytes::from(body) }))
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response for a GET request, replacing any previous entry.
    ///
    /// The store is created if it does not exist.
    pub async fn put(&self, store: &str, request: &InterceptedRequest, response: &CapturedResponse) -> Result<(), Error> {
        let row = EntryRow::new(request, response)?;
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_store(conn, &store, &now)?;
                row.insert(conn, &store, &now)
            })
            .await
            .map_err(Error::from)
    }

    /// Store several entries in one transaction: either all land or none do.
    pub async fn put_all(&self, store: &str, entries: &[(InterceptedRequest, CapturedResponse)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(req, res)| EntryRow::new(req, res))
            .collect::<Result<Vec<_>, _>>()?;
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                ensure_store(&tx, &store, &now)?;
                for row in &rows {
                    row.insert(&tx, &store, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the named store.
    pub async fn entry_count(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// List entries of the named store ordered by URL.
    pub async fn list_entries(&self, store: &str) -> Result<Vec<CacheEntryMeta>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CacheEntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, headers_json, LENGTH(body), stored_at
                     FROM cache_entries WHERE store = ?1 ORDER BY url ASC",
                )?;
                let rows = stmt
                    .query_map(params![store], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(method, url, status, headers_json, body_len, stored_at)| -> Result<CacheEntryMeta, Error> {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                        let content_type = headers
                            .into_iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                            .map(|(_, v)| v);
                        Ok(CacheEntryMeta {
                            method,
                            url,
                            status: u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?,
                            content_type,
                            body_len: body_len as u64,
                            stored_at,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }
}
