//! REPL runner: decodes each Telegram message into a [`SessionEvent`] and
//! dispatches it to a per-chat worker, so events within one chat are handled
//! strictly in arrival order while chats proceed concurrently. A slow scrape
//! in one chat never blocks the update loop or other sessions.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use medgid_core::{Chat, User};
use teloxide::prelude::*;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use super::adapters::{to_core_chat, to_core_user};
use crate::events::SessionEvent;
use crate::router::Router;
use crate::users::UserRegistry;

const BROADCAST_PREFIX: &str = "/broadcast ";

type SessionTx = mpsc::UnboundedSender<(User, Chat, SessionEvent)>;

/// One worker task per chat, each draining its own queue through the router.
struct SessionWorkers {
    router: Arc<Router>,
    senders: Mutex<HashMap<i64, SessionTx>>,
}

impl SessionWorkers {
    fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Enqueues an event for its chat's worker, spawning the worker on first
    /// contact. Queue order is arrival order.
    async fn dispatch(&self, user: User, chat: Chat, event: SessionEvent) {
        let mut senders = self.senders.lock().await;
        let tx = senders
            .entry(chat.id)
            .or_insert_with(|| self.spawn_worker(chat.id));
        let chat_id = chat.id;
        if tx.send((user, chat, event)).is_err() {
            error!(chat_id = chat_id, "Session worker gone, event dropped");
        }
    }

    fn spawn_worker(&self, chat_id: i64) -> SessionTx {
        let (tx, mut rx) = mpsc::unbounded_channel::<(User, Chat, SessionEvent)>();
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            while let Some((user, chat, event)) = rx.recv().await {
                router.handle(&user, &chat, event).await;
            }
            info!(chat_id, "Session worker finished");
        });
        tx
    }
}

/// Starts long polling. Each message is decoded once at this boundary and
/// queued for its chat's worker.
pub async fn run_repl(
    bot: teloxide::Bot,
    router: Arc<Router>,
    users: Arc<UserRegistry>,
    admin_id: Option<i64>,
) -> Result<()> {
    let workers = Arc::new(SessionWorkers::new(router));

    teloxide::repl(bot, move |bot: Bot, msg: teloxide::types::Message| {
        let workers = Arc::clone(&workers);
        let users = Arc::clone(&users);

        async move {
            let text = match msg.text() {
                Some(text) => text.to_string(),
                None => {
                    info!(chat_id = msg.chat.id.0, "Ignoring non-text message");
                    return Ok(());
                }
            };
            let user = match msg.from.as_ref() {
                Some(user) => to_core_user(user),
                None => {
                    info!(chat_id = msg.chat.id.0, "Ignoring message without sender");
                    return Ok(());
                }
            };
            let chat = to_core_chat(&msg.chat);

            info!(
                user_id = user.id,
                chat_id = chat.id,
                input = %text,
                "Received message"
            );

            if admin_id == Some(user.id) {
                if let Some(body) = text.strip_prefix(BROADCAST_PREFIX) {
                    let body = body.trim().to_string();
                    tokio::spawn(broadcast(bot, users, chat.id, body));
                    return Ok(());
                }
            }

            let event = SessionEvent::decode(&text);
            if event == SessionEvent::Start {
                if let Err(e) = users.record(&user).await {
                    warn!(user_id = user.id, error = %e, "Could not record user");
                }
            }

            workers.dispatch(user, chat, event).await;
            Ok(())
        }
    })
    .await;

    Ok(())
}

/// Sends `body` to every registered user. Per-recipient failures are logged
/// and skipped; the admin gets a delivery summary.
async fn broadcast(bot: Bot, users: Arc<UserRegistry>, admin_chat: i64, body: String) {
    if body.is_empty() {
        if let Err(e) = bot
            .send_message(ChatId(admin_chat), "Usage: /broadcast <text>")
            .await
        {
            error!(error = %e, "Could not answer empty broadcast");
        }
        return;
    }

    let recipients = users.all().await;
    let total = recipients.len();
    let mut delivered = 0usize;
    for profile in recipients {
        match bot.send_message(ChatId(profile.id), body.clone()).await {
            Ok(_) => delivered += 1,
            Err(e) => warn!(user_id = profile.id, error = %e, "Broadcast delivery failed"),
        }
    }

    info!(delivered, total, "Broadcast finished");
    if let Err(e) = bot
        .send_message(
            ChatId(admin_chat),
            format!("Broadcast delivered to {} of {} users.", delivered, total),
        )
        .await
    {
        error!(error = %e, "Could not send broadcast summary");
    }
}
