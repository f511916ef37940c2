
use once_cell::sync::Lazy;
use regex::Regex;

use std::pin::Pin;
use std::future::Future;


pub type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type Result<T> = std::result::Result<T, String>;

static ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{17,20}").unwrap());
static USER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@!?([0-9]{17,20})>$").unwrap());
static ROLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<@&([0-9]{17,20})>$").unwrap());
static CHANNEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<#([0-9]{17,20})>$").unwrap());

pub struct RegexManager {}

impl RegexManager {

    pub fn get_user_regex() -> &'static Regex {
        &USER_REGEX
    }

    pub fn get_role_regex() -> &'static Regex {
        &ROLE_REGEX
    }

    pub fn get_channel_regex() -> &'static Regex {
        &CHANNEL_REGEX
    }

    /// Extracts the snowflake of a mention like `<#123>` (or a bare id).
    pub fn mentioned_id(regex: &Regex, word: &str) -> Option<u64> {
        let id = match regex.captures(word) {
            Some(captures) => captures[1].to_string(),
            None if ID_REGEX.find(word).map(|hit| hit.as_str()) == Some(word) => word.to_string(),
            None => return None,
        };
        id.parse::<u64>().ok().filter(|id| *id != 0)
    }
}
