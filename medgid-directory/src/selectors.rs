//! Versioned selector contract for the provider listing markup.
//!
//! Field extraction is an ordered list of candidate selectors, first match
//! wins. Bump [`SELECTOR_CONTRACT_VERSION`] whenever a selector changes so
//! parse failures in the logs can be tied to a contract revision.

use scraper::Selector;

/// Revision of the selector set below.
pub const SELECTOR_CONTRACT_VERSION: u32 = 1;

/// One provider card.
pub const CARD: &str = "div.b-doctor-card";
/// Explicit empty-listing marker; its presence makes zero cards a success.
pub const NO_RESULTS: &str = "div.b-search-page__nothing-found";

pub const NAME: &str = "span.b-doctor-card__name-surname";

/// Profile link candidates, most specific first; any `a[href]` in the card is
/// the last resort.
pub const LINK_CANDIDATES: &[&str] = &[
    "a.b-doctor-card__name",
    "a[href*=\"/vrach/\"]",
    "a.b-doctor-card__link",
    "a.b-profile-card__name",
];
pub const ANY_LINK: &str = "a[href]";

/// Star bar whose `style` width (em) encodes the rating.
pub const RATING_BAR: &str = "div.b-stars-rate__progress";
/// Width-em → rating divisor: the full 5-star bar is 6.4 em wide.
pub const RATING_EM_PER_POINT: f64 = 1.28;

pub const PHOTO: &str = "img.b-profile-card__img";
pub const EXPERIENCE: &str = "div.b-doctor-card__experience .ui-text_subtitle-1";

pub const CLINIC_CONTAINER: &str = "div.b-doctor-card__lpu-select";
pub const CLINIC_NAME: &str = "span.b-select__trigger-main-text";
pub const CLINIC_ADDRESS: &str = "span.b-select__trigger-adit-text";

pub const PRICE_CANDIDATES: &[&str] = &[
    ".b-doctor-card__price .ui-text_subtitle-1",
    ".b-doctor-card__tabs-wrapper_club fieldset .ui-text_subtitle-1",
];

pub const PHONE_CANDIDATES: &[&str] = &[
    ".b-doctor-card__lpu-phone-container .b-doctor-card__lpu-phone",
    ".b-doctor-card__phone .ui-text_subtitle-1",
];

/// Parses a selector from this contract. All contract strings are statically
/// known to be valid.
pub(crate) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("selector contract entries are valid CSS")
}
