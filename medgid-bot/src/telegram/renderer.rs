//! Renders abstract outputs as Telegram messages.
//!
//! Provider cards go out as photo-with-caption when the card has a photo URL,
//! with a plain-text fallback when Telegram rejects the send. Scrape progress
//! is one message per chat, edited in place and deleted on completion.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use medgid_core::{Chat, CoreError};
use medgid_directory::{ProviderRecord, ScrapeProgress};
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::keyboards;
use crate::output::{Output, OutputPort};

const WELCOME_CAPTION: &str = "👋 Welcome to <b>MedGid</b>! 🩺\n\n\
What I can do:\n\
🔹 Find the best doctors by rating\n\
🔹 Analyze your symptoms and suggest specialists\n\
🔹 Show clinics, contacts, and prices\n\n\
Choose how you want to find a specialist 👇";
const MSG_PICK_SPECIALIST: &str = "Choose a specialist from the list:";
const MSG_SYMPTOM_PROMPT: &str = "✍️ Describe what is bothering you:";
const MSG_SYMPTOMS_RETRY: &str = "Please describe your symptoms.";
const MSG_ANALYZING: &str = "🔍 Analyzing symptoms...";
const MSG_GUIDANCE: &str = "Please use the menu buttons to navigate.";
const MSG_DONE: &str =
    "✅ Done! Tap \"Open profile\" under a doctor to see the full record.";
const BTN_OPEN_PROFILE: &str = "📋 Open profile";

/// [`OutputPort`] over a teloxide bot.
pub struct TelegramRenderer {
    bot: teloxide::Bot,
    welcome_photo: PathBuf,
    progress_messages: Mutex<HashMap<i64, MessageId>>,
}

impl TelegramRenderer {
    pub fn new(bot: teloxide::Bot, welcome_photo: impl Into<PathBuf>) -> Self {
        Self {
            bot,
            welcome_photo: welcome_photo.into(),
            progress_messages: Mutex::new(HashMap::new()),
        }
    }

    async fn send_welcome(&self, chat: &Chat) -> Result<(), CoreError> {
        if self.welcome_photo.exists() {
            let sent = self
                .bot
                .send_photo(ChatId(chat.id), InputFile::file(&self.welcome_photo))
                .caption(WELCOME_CAPTION)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::start_keyboard())
                .await;
            match sent {
                Ok(_) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "Welcome photo send failed, falling back to text")
                }
            }
        }
        self.bot
            .send_message(ChatId(chat.id), WELCOME_CAPTION)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::start_keyboard())
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn update_progress(&self, chat: &Chat, progress: ScrapeProgress) -> Result<(), CoreError> {
        let mut messages = self.progress_messages.lock().await;
        if progress == ScrapeProgress::Complete {
            if let Some(id) = messages.remove(&chat.id) {
                if let Err(e) = self.bot.delete_message(ChatId(chat.id), id).await {
                    debug!(chat_id = chat.id, error = %e, "Progress message delete failed");
                }
            }
            return Ok(());
        }

        let text = format!("🔍 Searching for doctors... {}%", progress.percent());
        match messages.get(&chat.id) {
            Some(id) => {
                // Best-effort edit; an unchanged percent is a no-op error.
                if let Err(e) = self
                    .bot
                    .edit_message_text(ChatId(chat.id), *id, text)
                    .await
                {
                    debug!(chat_id = chat.id, error = %e, "Progress edit failed");
                }
            }
            None => {
                let sent = self
                    .bot
                    .send_message(ChatId(chat.id), text)
                    .await
                    .map_err(transport)?;
                messages.insert(chat.id, sent.id);
            }
        }
        Ok(())
    }

    async fn send_provider_list(
        &self,
        chat: &Chat,
        specialization: &str,
        providers: &[ProviderRecord],
        recommended: &[String],
    ) -> Result<(), CoreError> {
        self.bot
            .send_message(
                ChatId(chat.id),
                format!("⭐ <b>{} doctors</b>", escape_html(specialization)),
            )
            .parse_mode(ParseMode::Html)
            .await
            .map_err(transport)?;

        for (i, provider) in providers.iter().enumerate() {
            self.send_provider_card(chat, i + 1, provider).await?;
        }

        let footer = self.bot.send_message(ChatId(chat.id), MSG_DONE);
        if recommended.is_empty() {
            footer
                .reply_markup(keyboards::back_to_menu_keyboard())
                .await
                .map_err(transport)?;
        } else {
            footer
                .reply_markup(keyboards::recommended_keyboard(recommended))
                .await
                .map_err(transport)?;
        }
        Ok(())
    }

    async fn send_provider_card(
        &self,
        chat: &Chat,
        index: usize,
        provider: &ProviderRecord,
    ) -> Result<(), CoreError> {
        let caption = provider_caption(index, provider);
        let markup = profile_button(provider);

        let photo_url = provider
            .photo
            .as_deref()
            .and_then(|p| url::Url::parse(p).ok());

        let sent = match photo_url {
            Some(photo) => {
                let mut request = self
                    .bot
                    .send_photo(ChatId(chat.id), InputFile::url(photo))
                    .caption(caption.clone())
                    .parse_mode(ParseMode::Html);
                if let Some(markup) = markup.clone() {
                    request = request.reply_markup(markup);
                }
                request.await.map(|_| ())
            }
            None => {
                let mut request = self
                    .bot
                    .send_message(ChatId(chat.id), caption.clone())
                    .parse_mode(ParseMode::Html);
                if let Some(markup) = markup.clone() {
                    request = request.reply_markup(markup);
                }
                request.await.map(|_| ())
            }
        };

        if let Err(e) = sent {
            // Photo URLs and tel links can be rejected; the plain-text card
            // always goes through.
            warn!(chat_id = chat.id, provider = %provider.name, error = %e, "Card send failed, sending plain text");
            let mut request = self
                .bot
                .send_message(ChatId(chat.id), plain_caption(index, provider));
            if let Some(markup) = markup {
                request = request.reply_markup(markup);
            }
            request.await.map_err(transport)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OutputPort for TelegramRenderer {
    async fn emit(&self, chat: &Chat, output: Output) -> medgid_core::Result<()> {
        match output {
            Output::Welcome => self.send_welcome(chat).await,
            Output::SpecializationList => {
                self.bot
                    .send_message(ChatId(chat.id), MSG_PICK_SPECIALIST)
                    .reply_markup(keyboards::specializations_keyboard())
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::SymptomPrompt => {
                self.bot
                    .send_message(ChatId(chat.id), MSG_SYMPTOM_PROMPT)
                    .reply_markup(keyboards::back_to_menu_keyboard())
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::SymptomsRetry => {
                self.bot
                    .send_message(ChatId(chat.id), MSG_SYMPTOMS_RETRY)
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::Analyzing => {
                self.bot
                    .send_message(ChatId(chat.id), MSG_ANALYZING)
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::TriageSummary {
                diagnosis,
                specialists,
            } => {
                let text = format!(
                    "<b>Possible diagnosis:</b> {}\n\n<b>I recommend seeing:</b> {}\n\n\
                     Tap a button to see the doctors.",
                    escape_html(&diagnosis),
                    escape_html(&specialists.join(", "))
                );
                self.bot
                    .send_message(ChatId(chat.id), text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboards::recommended_keyboard(&specialists))
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::SearchProgress(progress) => self.update_progress(chat, progress).await,
            Output::ProviderList {
                specialization,
                providers,
                recommended,
            } => {
                self.send_provider_list(chat, &specialization, &providers, &recommended)
                    .await
            }
            Output::NoProvidersFound { specialization } => {
                self.bot
                    .send_message(
                        ChatId(chat.id),
                        format!("😕 Could not find any {} doctors.", specialization),
                    )
                    .reply_markup(keyboards::back_to_menu_keyboard())
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::ServiceError(text) => {
                self.bot
                    .send_message(ChatId(chat.id), text)
                    .reply_markup(keyboards::back_to_menu_keyboard())
                    .await
                    .map_err(transport)?;
                Ok(())
            }
            Output::Guidance => {
                self.bot
                    .send_message(ChatId(chat.id), MSG_GUIDANCE)
                    .reply_markup(keyboards::start_keyboard())
                    .await
                    .map_err(transport)?;
                Ok(())
            }
        }
    }
}

fn transport(e: teloxide::RequestError) -> CoreError {
    CoreError::Transport(e.to_string())
}

/// Inline "open profile" button when the card resolved a valid profile URL.
fn profile_button(provider: &ProviderRecord) -> Option<InlineKeyboardMarkup> {
    let link = provider.link.as_deref()?;
    let url = url::Url::parse(link).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url(BTN_OPEN_PROFILE, url),
    ]]))
}

/// HTML caption for one provider card.
fn provider_caption(index: usize, provider: &ProviderRecord) -> String {
    let phone = match &provider.phone_clean {
        Some(clean) => format!(
            r#"<a href="tel:{}">{}</a>"#,
            clean,
            escape_html(&provider.phone)
        ),
        None => escape_html(&provider.phone),
    };
    format!(
        "<b>{index}. {name}</b> (⭐ {rating:.1})\n\
         📅 Experience: {experience}\n\
         🏥 Clinic: {clinic}\n\
         📍 Address: {address}\n\
         💰 Visit: {price}\n\
         📞 Phone: {phone}",
        index = index,
        name = escape_html(&provider.name),
        rating = provider.rating,
        experience = escape_html(&provider.experience),
        clinic = escape_html(&provider.clinic),
        address = escape_html(&provider.address),
        price = escape_html(&provider.price),
        phone = phone,
    )
}

/// Markup-free caption for the fallback send.
fn plain_caption(index: usize, provider: &ProviderRecord) -> String {
    format!(
        "{index}. {name} (⭐ {rating:.1})\n\
         Experience: {experience}\n\
         Clinic: {clinic}\n\
         Address: {address}\n\
         Visit: {price}\n\
         Phone: {phone}",
        index = index,
        name = provider.name,
        rating = provider.rating,
        experience = provider.experience,
        clinic = provider.clinic,
        address = provider.address,
        price = provider.price,
        phone = provider.phone,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
