//! SQLite-backed [`CacheStore`] operations.
//!
//! Versions live in `cache_versions`; entries in `cache_entries` cascade
//! when their version is deleted.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, types::Type};

use super::connection::CacheDb;
use super::{CacheStore, CacheVersion, CachedResponse, RequestKey, VersionInfo};
use crate::Error;

fn encode_headers(headers: &[(String, String)]) -> Result<String, Error> {
    serde_json::to_string(headers).map_err(|e| Error::InvalidInput(format!("failed to encode headers: {e}")))
}

fn decode_headers(json: &str) -> Result<Vec<(String, String)>, rusqlite::Error> {
    serde_json::from_str(json).map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))
}

fn upsert_entry(
    conn: &rusqlite::Connection, version: &str, key: &str, response: &CachedResponse, headers_json: &str,
    stored_at: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO cache_entries (version, request_key, url, status_code, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(version, request_key) DO UPDATE SET
            url = excluded.url,
            status_code = excluded.status_code,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![version, key, &response.url, response.status, headers_json, &response.body, stored_at],
    )?;
    Ok(())
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, version: &CacheVersion) -> Result<(), Error> {
        let name = version.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_versions (name, ready, created_at) VALUES (?1, 0, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn get(&self, version: &CacheVersion, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let name = version.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status_code, headers_json, body
                     FROM cache_entries WHERE version = ?1 AND request_key = ?2",
                )?;

                let response = stmt
                    .query_row(params![name, key], |row| {
                        let headers_json: String = row.get(2)?;
                        Ok(CachedResponse {
                            url: row.get(0)?,
                            status: row.get(1)?,
                            headers: decode_headers(&headers_json)?,
                            body: row.get(3)?,
                        })
                    })
                    .optional()?;

                Ok(response)
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, version: &CacheVersion, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        let name = version.to_string();
        let key = key.to_string();
        let response = response.clone();
        let headers_json = encode_headers(&response.headers)?;
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_versions WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                if !exists {
                    return Err(Error::CacheMiss(name));
                }

                upsert_entry(conn, &name, &key, &response, &headers_json, &stored_at)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn put_all(&self, version: &CacheVersion, entries: Vec<(RequestKey, CachedResponse)>) -> Result<(), Error> {
        let name = version.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let encoded = entries
            .into_iter()
            .map(|(key, response)| Ok((key, encode_headers(&response.headers)?, response)))
            .collect::<Result<Vec<_>, Error>>()?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO cache_versions (name, ready, created_at) VALUES (?1, 0, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, now],
                )?;
                for (key, headers_json, response) in &encoded {
                    upsert_entry(&tx, &name, key.as_str(), response, headers_json, &now)?;
                }
                tx.execute("UPDATE cache_versions SET ready = 1 WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, version: &CacheVersion, key: &RequestKey) -> Result<bool, Error> {
        let name = version.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE version = ?1 AND request_key = ?2",
                    params![name, key],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn list_versions(&self) -> Result<Vec<CacheVersion>, Error> {
        let names = self
            .conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_versions ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)?;

        names.into_iter().map(CacheVersion::new).collect()
    }

    async fn delete_version(&self, version: &CacheVersion) -> Result<bool, Error> {
        let name = version.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_versions WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn is_ready(&self, version: &CacheVersion) -> Result<bool, Error> {
        let name = version.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let ready: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_versions WHERE name = ?1 AND ready = 1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(ready)
            })
            .await
            .map_err(Error::from)
    }

    async fn describe(&self) -> Result<Vec<VersionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<VersionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT v.name, v.ready, v.created_at, COUNT(e.request_key)
                     FROM cache_versions v
                     LEFT JOIN cache_entries e ON e.version = v.name
                     GROUP BY v.name
                     ORDER BY v.name",
                )?;
                let infos = stmt
                    .query_map([], |row| {
                        Ok(VersionInfo {
                            name: row.get(0)?,
                            ready: row.get::<_, i32>(1)? == 1,
                            created_at: row.get(2)?,
                            entries: row.get::<_, i64>(3)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(infos)
            })
            .await
            .map_err(Error::from)
    }
}
