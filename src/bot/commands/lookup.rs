use teloxide::types::ChatId;

use crate::data::ReferenceData;
use crate::delivery::Directive;
use crate::facts::{compose_with_fact, FactCache};
use crate::utils::feedback::CommandFeedback;
use crate::utils::markdown::{bold, escape_markdown};
use crate::utils::validation::validate_region_argument;

/// `/capital <name>`: accepts a country or a capital under any known
/// spelling and answers with the pair, the flag and a cached fact.
pub fn capital_lookup(
    reference: &ReferenceData,
    facts: &FactCache,
    chat: ChatId,
    query: &str,
) -> Directive {
    let feedback = CommandFeedback::new(chat);
    let query = match validate_region_argument(query) {
        Ok(query) if !query.is_empty() => query,
        Ok(_) => {
            return feedback.validation_error(
                "Укажите страну или столицу.",
                "Например: /capital Франция или /capital Париж",
            )
        }
        Err(e) => return feedback.validation_error(&e.to_string(), "Напишите одно название."),
    };

    let Some(name) = reference.normalize(&query) else {
        return feedback.validation_error(
            &format!("Не знаю «{query}»."),
            "Проверьте написание или попробуйте другое название.",
        );
    };
    let country = reference.country_of(name).unwrap_or(name);
    let Some(entry) = reference.entry(country) else {
        return feedback.error("Не удалось найти страну.");
    };

    let flag = entry.flag.as_deref().map(|f| format!("{f} ")).unwrap_or_default();
    let body = format!(
        "{}{}\nСтолица: {}\nРегион: {}",
        flag,
        bold(&entry.name),
        bold(&entry.capital),
        escape_markdown(&entry.continent)
    );
    Directive::message(chat, compose_with_fact(&body, &facts.static_fact(&entry.name)))
}
