
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::id::RoleId;
use tokio::sync::Mutex;


pub trait Singleton: Sized {
    fn get_instance() -> &'static Mutex<Self>;
    fn new() -> Self;
}

#[macro_export]
macro_rules! impl_singleton {
    ($t:ty) => {
        impl $crate::utility::traits::Singleton for $t {
            fn get_instance() -> &'static tokio::sync::Mutex<Self> {
                static INSTANCE: once_cell::sync::Lazy<tokio::sync::Mutex<$t>> =
                    once_cell::sync::Lazy::new(|| tokio::sync::Mutex::new(<$t>::new()));
                &INSTANCE
            }

            fn new() -> Self {
                <$t>::new()
            }
        }
    };
}


pub trait ToList<T> {
    fn to_list(&self) -> Vec<T>;
}

impl<'a> ToList<&'a str> for &'a str {
    fn to_list(&self) -> Vec<&'a str> {
        vec![*self]
    }
}

impl<'a> ToList<&'a str> for Vec<&'a str> {
    fn to_list(&self) -> Vec<&'a str> {
        self.clone()
    }
}

impl ToList<RoleId> for RoleId {
    fn to_list(&self) -> Vec<RoleId> {
        vec![*self]
    }
}



pub trait ToMessage {
    fn to_message(&self) -> CreateMessage;
}
impl ToMessage for CreateEmbed {
    fn to_message(&self) -> CreateMessage {
        CreateMessage::default().embed(self.clone())
    }
}
