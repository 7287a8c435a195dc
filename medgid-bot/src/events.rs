//! Inbound event decoding.
//!
//! Raw message text is classified exactly once, at the transport boundary;
//! the router never inspects display strings. Button captions live here so the
//! keyboards and the decoder cannot drift apart.

use medgid_directory::{registry, Specialization};

pub const CMD_START: &str = "/start";
pub const BTN_MAIN_MENU: &str = "Main menu";
pub const BTN_FIND_SPECIALIST: &str = "🔵 Find a specialist";
pub const BTN_DESCRIBE_SYMPTOMS: &str = "🔴 Describe symptoms";

/// One decoded inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// `/start` command.
    Start,
    /// "Main menu" button; same effect as [`Self::Start`].
    MainMenu,
    FindSpecialist,
    DescribeSymptoms,
    /// A registry display name (specialization keyboard or recommendation).
    SpecialistChosen(&'static Specialization),
    /// Anything else, symptoms included. May be empty.
    Text(String),
}

impl SessionEvent {
    pub fn decode(text: &str) -> Self {
        match text.trim() {
            CMD_START => Self::Start,
            BTN_MAIN_MENU => Self::MainMenu,
            BTN_FIND_SPECIALIST => Self::FindSpecialist,
            BTN_DESCRIBE_SYMPTOMS => Self::DescribeSymptoms,
            trimmed => match registry::by_display_name(trimmed) {
                Some(spec) => Self::SpecialistChosen(spec),
                None => Self::Text(text.to_string()),
            },
        }
    }
}
