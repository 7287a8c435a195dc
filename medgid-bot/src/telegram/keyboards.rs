//! Reply keyboards: start menu, specialization grid, back-to-menu, and the
//! recommended-specialists keyboard built from triage output.

use medgid_directory::registry;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::events::{BTN_DESCRIBE_SYMPTOMS, BTN_FIND_SPECIALIST, BTN_MAIN_MENU};

/// Two ways in: pick a specialty or describe symptoms.
pub fn start_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_FIND_SPECIALIST)],
        vec![KeyboardButton::new(BTN_DESCRIBE_SYMPTOMS)],
    ])
    .resize_keyboard()
}

/// Every specialization in registry order, two per row, plus "Main menu".
pub fn specializations_keyboard() -> KeyboardMarkup {
    let mut buttons: Vec<KeyboardButton> = registry::all()
        .iter()
        .map(|s| KeyboardButton::new(s.display_name))
        .collect();
    buttons.push(KeyboardButton::new(BTN_MAIN_MENU));
    KeyboardMarkup::new(two_per_row(buttons)).resize_keyboard()
}

pub fn back_to_menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(BTN_MAIN_MENU)]]).resize_keyboard()
}

/// Recommended specialists, two per row, plus "Main menu".
pub fn recommended_keyboard(specialists: &[String]) -> KeyboardMarkup {
    let mut buttons: Vec<KeyboardButton> = specialists
        .iter()
        .map(|name| KeyboardButton::new(name.clone()))
        .collect();
    buttons.push(KeyboardButton::new(BTN_MAIN_MENU));
    KeyboardMarkup::new(two_per_row(buttons)).resize_keyboard()
}

fn two_per_row(buttons: Vec<KeyboardButton>) -> Vec<Vec<KeyboardButton>> {
    buttons.chunks(2).map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_keyboard_has_both_entries() {
        let kb = start_keyboard();
        assert_eq!(kb.keyboard.len(), 2);
        assert_eq!(kb.keyboard[0][0].text, BTN_FIND_SPECIALIST);
        assert_eq!(kb.keyboard[1][0].text, BTN_DESCRIBE_SYMPTOMS);
    }

    #[test]
    fn test_specializations_keyboard_covers_registry_plus_menu() {
        let kb = specializations_keyboard();
        let cells: Vec<&str> = kb
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(cells.len(), registry::all().len() + 1);
        assert!(cells.contains(&"Cardiologist"));
        assert_eq!(*cells.last().unwrap(), BTN_MAIN_MENU);
        for row in &kb.keyboard {
            assert!(row.len() <= 2);
        }
    }

    #[test]
    fn test_recommended_keyboard_layout() {
        let kb = recommended_keyboard(&["Cardiologist".to_string(), "Therapist".to_string()]);
        let cells: Vec<&str> = kb
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(cells, vec!["Cardiologist", "Therapist", BTN_MAIN_MENU]);
    }
}
