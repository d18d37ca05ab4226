//! Text binding: copy participant names into the card's display slots.

use crate::{Card, CardConfig, Role};

/// Trim a raw input value, falling back to the role's fixed placeholder
/// when nothing is left.
pub fn resolve_name<'a>(raw: &'a str, role: Role, config: &'a CardConfig) -> &'a str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        role.placeholder(config)
    } else {
        trimmed
    }
}

/// Write both resolved names into every bound display location.
///
/// Side effect only: after a call, all locations bound to a role show the
/// identical resolved value. Never fails.
pub fn bind(card: &mut Card, requester: &str, recipient: &str, config: &CardConfig) {
    card.set_slot_text(Role::Requester, resolve_name(requester, Role::Requester, config));
    card.set_slot_text(Role::Recipient, resolve_name(recipient, Role::Recipient, config));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_writes_trimmed_values_everywhere() {
        let config = CardConfig::default();
        let mut card = Card::default_template();
        bind(&mut card, "  Ada  ", "Grace", &config);
        assert!(card.slot_texts(Role::Requester).iter().all(|t| t == "Ada"));
        assert!(card.slot_texts(Role::Recipient).iter().all(|t| t == "Grace"));
    }

    #[test]
    fn bind_substitutes_placeholders_for_empty_input() {
        let config = CardConfig::default();
        let mut card = Card::default_template();
        bind(&mut card, "", "   ", &config);
        assert!(card
            .slot_texts(Role::Requester)
            .iter()
            .all(|t| t == "Your Name"));
        assert!(card
            .slot_texts(Role::Recipient)
            .iter()
            .all(|t| t == "Their Name"));
    }

    #[test]
    fn resolve_name_prefers_user_input() {
        let config = CardConfig::default();
        assert_eq!(resolve_name("Ada", Role::Requester, &config), "Ada");
        assert_eq!(resolve_name(" \t", Role::Recipient, &config), "Their Name");
    }
}
