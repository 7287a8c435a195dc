//! Static specialization registry: display name ↔ directory slug.
//!
//! Loaded once, process lifetime, read-only. Iteration order is the keyboard
//! order shown to users. Slugs are the canonical path segments of the provider
//! directory; display names are what the triage prompt and keyboards use.

/// One specialization: display name and the canonical listing slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specialization {
    pub display_name: &'static str,
    pub slug: &'static str,
}

const SPECIALIZATIONS: &[Specialization] = &[
    Specialization { display_name: "Gynecologist", slug: "ginekolog" },
    Specialization { display_name: "Ophthalmologist", slug: "oftalmolog" },
    Specialization { display_name: "Ultrasound specialist", slug: "ultrazvukovoy-diagnost" },
    Specialization { display_name: "Mammologist", slug: "mammolog" },
    Specialization { display_name: "Urologist", slug: "urolog" },
    Specialization { display_name: "Endocrinologist", slug: "endokrinolog" },
    Specialization { display_name: "Therapist", slug: "terapevt" },
    Specialization { display_name: "Cardiologist", slug: "kardiolog" },
    Specialization { display_name: "Otolaryngologist", slug: "otorinolaringolog" },
    Specialization { display_name: "Neurologist", slug: "nevrolog" },
    Specialization { display_name: "Dermatologist", slug: "dermatolog" },
    Specialization { display_name: "Radiologist", slug: "rentgenolog" },
    Specialization { display_name: "Pulmonologist", slug: "pulmonolog" },
    Specialization { display_name: "Nutritionist", slug: "nutriciolog" },
    Specialization { display_name: "Traumatologist", slug: "travmatolog" },
    Specialization { display_name: "Psychotherapist", slug: "psihoterapevt" },
    Specialization { display_name: "Orthopedist", slug: "ortoped" },
    Specialization { display_name: "Massage therapist", slug: "massazhist" },
    Specialization { display_name: "Cosmetologist", slug: "kosmetolog" },
    Specialization { display_name: "Oncologist", slug: "onkolog" },
    Specialization { display_name: "Narcologist", slug: "narkolog" },
    Specialization { display_name: "Pediatrician", slug: "pediatr" },
    Specialization { display_name: "Psychologist", slug: "psiholog" },
    Specialization { display_name: "Phlebologist", slug: "flebolog" },
    Specialization { display_name: "Phthisiatrician", slug: "ftiziatr" },
    Specialization { display_name: "Endoscopist", slug: "endoskopist" },
];

/// All specializations, in keyboard order.
pub fn all() -> &'static [Specialization] {
    SPECIALIZATIONS
}

/// Exact display-name lookup.
pub fn by_display_name(name: &str) -> Option<&'static Specialization> {
    SPECIALIZATIONS.iter().find(|s| s.display_name == name)
}

/// Display-name lookup ignoring ASCII case and surrounding whitespace or
/// trailing periods (tokens split out of a model reply).
pub fn by_display_name_relaxed(token: &str) -> Option<&'static Specialization> {
    let cleaned = token.trim().trim_end_matches('.').trim();
    SPECIALIZATIONS
        .iter()
        .find(|s| s.display_name.eq_ignore_ascii_case(cleaned))
}

/// Slug lookup.
pub fn by_slug(slug: &str) -> Option<&'static Specialization> {
    SPECIALIZATIONS.iter().find(|s| s.slug == slug)
}

/// Scans free text for registry names, case-insensitive and bounded on word
/// edges (so "neurologist" never matches Urologist), in order of appearance,
/// capped at `cap` matches.
pub fn scan_names(text: &str, cap: usize) -> Vec<&'static Specialization> {
    let lowered = text.to_lowercase();
    let mut found: Vec<(usize, &'static Specialization)> = SPECIALIZATIONS
        .iter()
        .filter_map(|s| find_word(&lowered, &s.display_name.to_lowercase()).map(|pos| (pos, s)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, s)| s).take(cap).collect()
}

/// First occurrence of `needle` in `haystack` whose neighbours are not
/// letters. Both inputs are lowercase; the needle is ASCII.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = haystack[start..].find(needle) {
        let pos = start + rel;
        let end = pos + needle.len();
        let letter_before = haystack[..pos]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphabetic());
        let letter_after = haystack[end..].chars().next().is_some_and(|c| c.is_alphabetic());
        if !letter_before && !letter_after {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}

/// The safe fallback specialist, guaranteed to exist in the registry.
pub fn fallback() -> &'static Specialization {
    by_display_name("Therapist").expect("fallback specialist must be in the registry")
}
