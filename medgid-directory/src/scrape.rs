//! Listing scraper: fetches a specialty's provider page and extracts cards.
//!
//! Extraction is split from fetching: [`collect_cards`] and [`extract_card`]
//! work on markup strings and are tested against saved fixtures; the network
//! only appears in [`ProviderScraper::fetch`]. One bad card is skipped, never
//! the whole page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument, warn};

use crate::error::DirectoryError;
use crate::progress::{ProgressCallback, ScrapeProgress};
use crate::record::{normalize_phone, sort_by_rating, ProviderRecord, NOT_SPECIFIED};
use crate::registry::Specialization;
use crate::selectors::{self, sel, SELECTOR_CONTRACT_VERSION};
use crate::service::ProviderSource;

/// Maximum providers returned per listing.
pub const MAX_PROVIDERS: usize = 5;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause between card extractions, yielding between progress updates.
const PER_CARD_DELAY: Duration = Duration::from_millis(100);

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.8,en-US;q=0.5,en;q=0.3";

/// Scrapes `{base}/{city}/{slug}/` and extracts up to [`MAX_PROVIDERS`] cards,
/// sorted descending by rating.
pub struct ProviderScraper {
    client: reqwest::Client,
    base_url: String,
    city: String,
    max_providers: usize,
}

impl ProviderScraper {
    pub fn new(base_url: impl Into<String>, city: impl Into<String>) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            city: city.into(),
            max_providers: MAX_PROVIDERS,
        })
    }

    pub fn with_max_providers(mut self, max: usize) -> Self {
        self.max_providers = max;
        self
    }

    /// Canonical listing URL for a specialization.
    pub fn listing_url(&self, specialization: &Specialization) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.city,
            specialization.slug
        )
    }

    #[instrument(skip_all, fields(slug = specialization.slug))]
    async fn scrape(
        &self,
        specialization: &Specialization,
        progress: &mut ProgressCallback,
    ) -> Result<Vec<ProviderRecord>, DirectoryError> {
        let url = self.listing_url(specialization);
        progress(ScrapeProgress::Connecting).await;

        let response = self
            .client
            .get(&url)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %url, status = %status, "Listing fetch rejected");
            return Err(DirectoryError::UpstreamStatus(status));
        }

        let html = response.text().await?;
        progress(ScrapeProgress::PageLoaded).await;

        let listing = collect_cards(&html, self.max_providers);
        if listing.cards.is_empty() {
            progress(ScrapeProgress::Complete).await;
            if listing.no_results_marker {
                info!(slug = specialization.slug, "Listing reports no providers");
                return Ok(Vec::new());
            }
            warn!(
                url = %url,
                contract_version = SELECTOR_CONTRACT_VERSION,
                "No cards and no empty marker"
            );
            return Err(DirectoryError::Parse(SELECTOR_CONTRACT_VERSION));
        }
        progress(ScrapeProgress::CardsLocated(listing.cards.len())).await;

        let total = listing.cards.len();
        let mut providers = Vec::with_capacity(total);
        for (i, card_html) in listing.cards.iter().enumerate() {
            match extract_card(card_html, &self.base_url) {
                Some(record) => providers.push(record),
                None => debug!(slug = specialization.slug, card = i, "Skipped unreadable card"),
            }
            progress(ScrapeProgress::CardProcessed { index: i + 1, total }).await;
            tokio::time::sleep(PER_CARD_DELAY).await;
        }

        sort_by_rating(&mut providers);
        progress(ScrapeProgress::Complete).await;
        info!(
            slug = specialization.slug,
            providers = providers.len(),
            "Listing scraped"
        );
        Ok(providers)
    }
}

#[async_trait]
impl ProviderSource for ProviderScraper {
    async fn fetch(
        &self,
        specialization: &Specialization,
        progress: &mut ProgressCallback,
    ) -> Result<Vec<ProviderRecord>, DirectoryError> {
        self.scrape(specialization, progress).await
    }
}

/// Card markup located on a listing page, bounded to `max` entries, plus
/// whether the explicit "no results" marker was present.
pub struct Listing {
    pub cards: Vec<String>,
    pub no_results_marker: bool,
}

/// Locates provider cards in a listing page. Returns the outer HTML of at most
/// `max` cards so each can be parsed independently later.
pub fn collect_cards(html: &str, max: usize) -> Listing {
    let document = Html::parse_document(html);
    let cards: Vec<String> = document
        .select(&sel(selectors::CARD))
        .take(max)
        .map(|card| card.html())
        .collect();
    let no_results_marker = document.select(&sel(selectors::NO_RESULTS)).next().is_some();
    Listing {
        cards,
        no_results_marker,
    }
}

/// Extracts one provider from a card fragment. Returns `None` only when the
/// card has no name at all; every other field degrades to its sentinel.
pub fn extract_card(card_html: &str, base_url: &str) -> Option<ProviderRecord> {
    let fragment = Html::parse_fragment(card_html);
    let card = fragment.root_element();

    let name = select_text(card, selectors::NAME)?;

    let link = extract_link(card, base_url);
    let rating = extract_rating(card);
    let photo = card
        .select(&sel(selectors::PHOTO))
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| absolutize(src, base_url));

    let experience =
        select_text(card, selectors::EXPERIENCE).unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let (clinic, address) = extract_clinic(card);

    let price = selectors::PRICE_CANDIDATES
        .iter()
        .find_map(|s| select_text(card, s))
        .map(|p| p.replace('\u{a0}', " "))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let phone = selectors::PHONE_CANDIDATES
        .iter()
        .find_map(|s| select_text(card, s));
    let phone_clean = phone.as_deref().and_then(normalize_phone);
    let phone = phone.unwrap_or_else(|| NOT_SPECIFIED.to_string());

    Some(ProviderRecord {
        name,
        link,
        rating,
        photo,
        experience,
        clinic,
        address,
        price,
        phone,
        phone_clean,
    })
}

/// First non-empty text under the selector, whitespace-collapsed.
fn select_text(card: ElementRef<'_>, selector: &str) -> Option<String> {
    let element = card.select(&sel(selector)).next()?;
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Profile link: ordered candidate selectors, then any link in the card.
fn extract_link(card: ElementRef<'_>, base_url: &str) -> Option<String> {
    for candidate in selectors::LINK_CANDIDATES {
        if let Some(href) = card
            .select(&sel(candidate))
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            return Some(absolutize(href, base_url));
        }
    }
    card.select(&sel(selectors::ANY_LINK))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolutize(href, base_url))
}

/// Rating from the star-bar width: `width: Xem` → X / 1.28, one decimal.
/// Missing or malformed → 0.0.
fn extract_rating(card: ElementRef<'_>) -> f64 {
    let style = match card
        .select(&sel(selectors::RATING_BAR))
        .next()
        .and_then(|bar| bar.value().attr("style"))
    {
        Some(style) => style,
        None => return 0.0,
    };
    parse_rating_style(style).unwrap_or(0.0)
}

/// Parses `width: 5.63em;` style text into a 0–5 rating rounded to 1 decimal.
pub fn parse_rating_style(style: &str) -> Option<f64> {
    let width: f64 = style
        .replace("width:", "")
        .replace("em", "")
        .replace(';', "")
        .trim()
        .parse()
        .ok()?;
    Some((width / selectors::RATING_EM_PER_POINT * 10.0).round() / 10.0)
}

fn extract_clinic(card: ElementRef<'_>) -> (String, String) {
    let container = card.select(&sel(selectors::CLINIC_CONTAINER)).next();
    match container {
        Some(container) => {
            let clinic = select_text(container, selectors::CLINIC_NAME)
                .unwrap_or_else(|| NOT_SPECIFIED.to_string());
            let address = select_text(container, selectors::CLINIC_ADDRESS)
                .unwrap_or_else(|| NOT_SPECIFIED.to_string());
            (clinic, address)
        }
        None => (NOT_SPECIFIED.to_string(), NOT_SPECIFIED.to_string()),
    }
}

/// Root-relative hrefs get the base prepended; absolute ones pass through.
fn absolutize(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}
