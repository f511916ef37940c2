
use colored::*;

use std::io;


pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

pub struct Logger {}

impl Logger {

    fn log(level: Level, label: &str, content: Option<&str>, inline: bool) {
        let prefix = match level {
            Level::Debug => "DEBUG".truecolor(120, 120, 255),
            Level::Info  => "INFO".green(),
            Level::Warn  => "WARN".truecolor(255, 130, 0),
            Level::Error => "ERROR".truecolor(255, 20, 0),
        };
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        let content = match content {
            Some(content) => format!("{}: {}", label.truecolor(140, 140, 140), content),
            None          => label.to_string()
        };
        match inline {
            true  => print!("{} [{}] {}", time.dimmed(), prefix, content),
            false => println!("{} [{}] {}", time.dimmed(), prefix, content),
        }
    }

    /// Only printed when built with the `debug` feature.
    #[allow(unused)]
    pub fn debug(label: &str, content: &str) {
        if cfg!(feature = "debug") {
            Logger::log(Level::Debug, label, Some(content), false);
        }
    }

    #[allow(unused)]
    pub fn info(label: &str) {
        Logger::log(Level::Info, label, None, false);
    }

    #[allow(unused)]
    pub fn warn(label: &str) {
        Logger::log(Level::Warn, label, None, false);
    }

    #[allow(unused)]
    pub fn err(label: &str) {
        Logger::log(Level::Error, label, None, false);
    }

    #[allow(unused)]
    pub fn info_long(label: &str, content: &str) {
        Logger::log(Level::Info, label, Some(content), false);
    }

    #[allow(unused)]
    pub fn warn_long(label: &str, content: &str) {
        Logger::log(Level::Warn, label, Some(content), false);
    }

    #[allow(unused)]
    pub fn err_long(label: &str, content: &str) {
        Logger::log(Level::Error, label, Some(content), false);
    }

    /// `None` once stdin is closed.
    #[allow(unused)]
    pub fn input(label: &str) -> Option<String> {

        // input label
        Logger::log(Level::Info, label, Some(""), true);

        let _ = io::Write::flush(&mut io::stdout());
        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }

    }

}
