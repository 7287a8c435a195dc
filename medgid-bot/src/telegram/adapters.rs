//! Conversions from teloxide types to core types.

use medgid_core::{Chat, User};

pub fn to_core_user(user: &teloxide::types::User) -> User {
    User {
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

pub fn to_core_chat(chat: &teloxide::types::Chat) -> Chat {
    Chat { id: chat.id.0 }
}
