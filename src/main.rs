extern crate alloc;

use serenity::all::Http;
use serenity::prelude::{Client, GatewayIntents};

use std::sync::Arc;

use applications::ApplicationReviewWorkflow;
use commands::command_manager::CommandManager;
use handler::Handler;
use utility::*;
use databases::*;

mod applications;
mod handler;
mod utility;
mod databases;
mod commands;


#[tokio::main]
async fn main() {

    // setup
    let token = match read_token().await {
        Some(token) => token,
        None => {
            Logger::err("No token found, set DISCORD_TOKEN or the 'token' config entry");
            return;
        }
    };
    let http = Arc::new(Http::new(&token));
    let workflow = Arc::new(ApplicationReviewWorkflow::new(
        Arc::new(DiscordNotifier::new(Arc::clone(&http))),
        Arc::new(DiscordMembership::new(http))));
    let handler = Handler::new(CommandManager::new(), workflow);

    // start threads
    let intents = GatewayIntents::GUILDS                    |
                  GatewayIntents::GUILD_MESSAGES            |
                  GatewayIntents::MESSAGE_CONTENT           |
                  GatewayIntents::GUILD_MEMBERS;
    let mut client = match Client::builder(&token, intents).event_handler(handler).await {
        Ok(client) => client,
        Err(err) => {
            Logger::err_long("Error creating client", &err.to_string());
            return;
        }
    };

    #[cfg(feature = "db_interface")]
    console::spawn_database_thread();

    if let Err(err) = client.start().await {
        Logger::err_long("Client stopped", &err.to_string());
    }
}

async fn read_token() -> Option<String> {
    if let Ok(token) = std::env::var("DISCORD_TOKEN") {
        if !token.trim().is_empty() {
            return Some(token.trim().to_string());
        }
    }
    ConfigDB::get_instance().lock().await
        .get("token").await
        .ok()
        .map(|entry| entry.value)
}


#[cfg(feature = "db_interface")]
mod console {

    use strum::IntoEnumIterator;
    use tokio::runtime::Runtime;

    use std::thread;

    use crate::databases::{Database, DB};
    use crate::utility::Logger;


    pub fn spawn_database_thread() {
        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => return Logger::err_long("Failed to start database console", &err.to_string()),
            };
            let mut database = Database::new(DB::Config);
            Logger::info_long("Connected to database", &database.identifier.to_string());
            runtime.block_on(async {
                loop {
                    let input = match Logger::input("Enter a command") {
                        Some(input) => input,
                        None => break,
                    };
                    let words = input.split_whitespace().collect::<Vec<&str>>();

                    match words.as_slice() {
                        [] => continue,
                        ["ls"] => {
                            match database.get_keys().await {
                                Ok(keys) => Logger::info_long("Keys", &keys.join(", ")),
                                Err(err) => Logger::err(&err),
                            }
                        }
                        ["get", key] => {
                            match database.get_all(key).await {
                                Ok(entries) if entries.is_empty() => Logger::warn_long("No value for", key),
                                Ok(entries) => {
                                    let values = entries.iter()
                                        .map(|entry| entry.value.clone())
                                        .collect::<Vec<String>>();
                                    Logger::info_long(&format!("Values of {}", key), &values.join("\n"));
                                },
                                Err(err) => Logger::err(&err),
                            }
                        }
                        ["set", key, value @ ..] if !value.is_empty() => {
                            let value = value.join(" ");
                            match database.set(key, &value).await {
                                Ok(_) => Logger::info_long(&format!("Set value for {}", key), &value),
                                Err(err) => Logger::err(&err),
                            }
                        }
                        ["rm", key] => {
                            match database.delete(key).await {
                                Ok(_) => Logger::info_long("Removed key", key),
                                Err(err) => Logger::err(&err),
                            }
                        }
                        ["use", name] => {
                            match DB::iter().find(|db| db.to_string() == *name) {
                                Some(db) => {
                                    database = Database::new(db);
                                    Logger::info_long("Switched to database", name);
                                },
                                None => Logger::warn_long("Invalid database", name),
                            }
                        }
                        _ => {
                            Logger::err("Invalid command (ls | get <key> | set <key> <value> | rm <key> | use <database>)");
                        }
                    }
                }
            });
        });
    }
}
