
use serde::{Serialize, Deserialize};
use serenity::model::id::GuildId;

use crate::applications::{DecisionReport, IntakeConfig, ReviewerId};
use crate::databases::database::{Database, DBEntry, DB};
use crate::utility::*;
use crate::impl_singleton;


/// Anything that can be rebuilt from a raw table row.
pub trait DBRecord: Sized + Send {
    fn from_entry(entry: DBEntry) -> Result<Self>;
}

impl DBRecord for DBEntry {
    fn from_entry(entry: DBEntry) -> Result<Self> {
        Ok(entry)
    }
}

macro_rules! as_db_entry {
    ($name:ident, $($field_name:ident: $field_type:ty),*) => {

        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        pub struct $name {
            #[serde(skip)]
            pub id: i64,
            #[serde(skip)]
            pub key: String,
            #[serde(skip)]
            pub timestamp: i64,
            $(pub $field_name: $field_type),*
        }

        impl $name {
            pub fn new($($field_name: $field_type),*) -> Self {
                $name {
                    id: 0,
                    key: "".to_string(),
                    timestamp: 0,
                    $($field_name),*
                }
            }
            pub fn to_value(&self) -> String {
                serde_json::to_string(self).unwrap_or_default()
            }
        }

        impl DBRecord for $name {
            fn from_entry(entry: DBEntry) -> Result<$name> {
                let mut record: $name = serde_json::from_str(&entry.value)
                    .map_err(|err| format!("Malformed {} entry {}: {}", stringify!($name), entry.id, err))?;
                record.id = entry.id;
                record.key = entry.key;
                record.timestamp = entry.timestamp;
                Ok(record)
            }
        }
    }
}

as_db_entry!(DecisionLog, application_id: String, reviewer_id: String, status: String, panel: String);

impl DecisionLog {
    pub fn from_report(report: &DecisionReport, reviewer: ReviewerId) -> DecisionLog {
        DecisionLog::new(
            report.reference.application_id.to_string(),
            reviewer.to_string(),
            report.status.to_string(),
            report.panel.clone())
    }
}

pub trait DatabaseWrapper<T: DBRecord>: Send + Sync {

    fn get_database(&self) -> &Database;

    fn get_keys<'a>(&'a self) -> BoxedFuture<'a, Result<Vec<String>>> {
        Box::pin(async move {
            self.get_database().get_keys().await
        })
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxedFuture<'a, Result<T>> {
        Box::pin(async move {
            let entry = self.get_database().get(key).await?;
            T::from_entry(entry)
        })
    }

    fn get_all<'a>(&'a self, key: &'a str) -> BoxedFuture<'a, Result<Vec<T>>> {
        Box::pin(async move {
            let entries = self.get_database().get_all(key).await?;
            entries.into_iter().map(T::from_entry).collect()
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxedFuture<'a, Result<()>> {
        Box::pin(async move {
            self.get_database().set(key, value).await
        })
    }

    fn append<'a>(&'a self, key: &'a str, value: &'a str) -> BoxedFuture<'a, Result<()>> {
        Box::pin(async move {
            self.get_database().append(key, value).await
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxedFuture<'a, Result<()>> {
        Box::pin(async move {
            self.get_database().delete(key).await
        })
    }
}

macro_rules! impl_database_wrapper {

    ($name:ident, $db_type:expr, $log_type:ty) => {
        pub struct $name {
            database: Database
        }

        impl $name {
            pub fn new() -> Self {
                $name { database: Database::new($db_type) }
            }

            #[allow(unused)]
            pub fn in_memory() -> Self {
                $name { database: Database::in_memory($db_type) }
            }
        }

        impl DatabaseWrapper<$log_type> for $name {
            fn get_database(&self) -> &Database {
                &self.database
            }
        }

        impl_singleton!($name);
    };

    ($name:ident, $db_type:expr) => {
        impl_database_wrapper!($name, $db_type, DBEntry);
    };
}

impl_database_wrapper!(ConfigDB, DB::Config);
impl_database_wrapper!(IntakeDB, DB::Intake);
impl_database_wrapper!(DecisionsDB, DB::Decisions, DecisionLog);

impl IntakeDB {

    pub async fn load_all(&self) -> Vec<(GuildId, IntakeConfig)> {
        let keys = match self.get_keys().await {
            Ok(keys) => keys,
            Err(err) => {
                Logger::err_long("Failed to read intake configs", &err);
                return Vec::new();
            }
        };
        let mut configs = Vec::new();
        for key in keys.iter() {
            let guild = match key.parse::<u64>() {
                Ok(id) if id != 0 => GuildId::new(id),
                _ => continue,
            };
            match self.get(key).await.map(|entry| IntakeConfig::from_json(&entry.value)) {
                Ok(Some(config)) => configs.push((guild, config)),
                _ => Logger::warn_long("Skipping malformed intake config", key),
            }
        }
        configs
    }

    pub async fn store(&self, guild: GuildId, config: &IntakeConfig) -> Result<()> {
        self.set(&guild.to_string(), &config.to_json()).await
    }
}
