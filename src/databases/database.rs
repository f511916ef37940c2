
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use strum_macros::EnumIter;

use std::collections::HashSet;
use std::sync::Arc;
use std::fmt;

use crate::utility::*;


#[derive(EnumIter, Clone, Copy, PartialEq)]
pub enum DB {
    Config,
    Intake,
    Decisions,
}

impl fmt::Display for DB {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DB::Config => write!(f, "config"),
            DB::Intake => write!(f, "intake"),
            DB::Decisions => write!(f, "decisions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DBEntry {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub timestamp: i64,
}

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
    pub identifier: DB,
}

impl Database {

    pub fn directory() -> String {
        std::env::var("BOT_DATABASE_DIR").unwrap_or("databases".to_string())
    }

    pub fn new(identifier: DB) -> Self {
        let directory = Database::directory();
        if let Err(err) = std::fs::create_dir_all(&directory) {
            Logger::err_long("Failed to create database directory", &err.to_string());
        }
        let path = format!("{}/{}.db", directory, identifier);
        let connection = Connection::open(&path)
            .unwrap_or_else(|err| panic!("Failed to open database '{}': {}", path, err));
        Database::with_connection(connection, identifier)
    }

    pub fn in_memory(identifier: DB) -> Self {
        let connection = Connection::open_in_memory()
            .unwrap_or_else(|err| panic!("Failed to open in-memory database: {}", err));
        Database::with_connection(connection, identifier)
    }

    fn with_connection(connection: Connection, identifier: DB) -> Self {
        connection.execute(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id        INTEGER PRIMARY KEY,
                key       TEXT    NOT NULL,
                value     TEXT    NOT NULL,
                timestamp INTEGER
            )", identifier),
            [],
        ).unwrap_or_else(|err| panic!("Failed to create table '{}': {}", identifier, err));
        Database { connection: Arc::new(Mutex::new(connection)), identifier }
    }

    pub async fn get_keys(&self) -> Result<Vec<String>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(&format!("SELECT key FROM {}", self.identifier))
            .map_err(|err| err.to_string())?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))
            .map_err(|err| err.to_string())?;
        let keys = rows.filter_map(|key| key.ok()).collect::<HashSet<String>>();
        Ok(keys.into_iter().collect())
    }

    pub async fn query(&self, key: &str, query_string: &str) -> Result<Vec<DBEntry>> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(&format!(
            "SELECT id, key, value, timestamp FROM {} WHERE key = ? {}",
            self.identifier,
            query_string
        )).map_err(|err| err.to_string())?;
        let entry_iter = statement.query_map([key], |entry| {
            Ok(DBEntry {
                id: entry.get(0)?,
                key: entry.get(1)?,
                value: entry.get(2)?,
                timestamp: entry.get(3)?,
            })
        }).map_err(|err| err.to_string())?;
        let entries = entry_iter
            .map(|entry| entry.map_err(|err| err.to_string()))
            .collect::<Result<Vec<DBEntry>>>();
        entries
    }

    pub async fn get(&self, key: &str) -> Result<DBEntry> {
        self.query(key, "ORDER BY timestamp ASC LIMIT 1").await?
            .pop()
            .ok_or(format!("Failed to get value for '{}'", key))
    }

    pub async fn get_all(&self, key: &str) -> Result<Vec<DBEntry>> {
        self.query(key, "ORDER BY timestamp ASC, id ASC").await
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let connection = self.connection.lock().await;

        // Delete old values
        connection.execute(
            &format!("DELETE FROM {} WHERE key = ?", self.identifier),
            params![key],
        ).map_err(|err| err.to_string())?;

        connection.execute(
            &format!("INSERT INTO {} (key, value, timestamp) VALUES (?, ?, ?)", self.identifier),
            params![key, value, chrono::Utc::now().timestamp()],
        ).map_err(|err| err.to_string())?;
        Ok(())
    }

    pub async fn append(&self, key: &str, value: &str) -> Result<()> {
        let connection = self.connection.lock().await;
        connection.execute(
            &format!("INSERT INTO {} (key, value, timestamp) VALUES (?, ?, ?)", self.identifier),
            params![key, value, chrono::Utc::now().timestamp()],
        ).map_err(|err| err.to_string())?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let connection = self.connection.lock().await;
        connection.execute(
            &format!("DELETE FROM {} WHERE key = ?", self.identifier),
            params![key],
        ).map_err(|err| err.to_string())?;
        Ok(())
    }

}
