use crate::data::ReferenceData;
use crate::delivery::ContinentChoice;
use crate::error::QuizError;
use crate::utils::validation::validate_region_argument;

/// Region argument of `/coop` and `/cooptest`: empty, "мир", a continent
/// index, or a continent name in any case.
pub fn parse_region_arg(
    reference: &ReferenceData,
    arg: &str,
) -> Result<Option<ContinentChoice>, QuizError> {
    let arg = validate_region_argument(arg).map_err(|e| QuizError::Validation(e.to_string()))?;
    if arg.is_empty() {
        return Ok(None);
    }
    if matches!(arg.to_lowercase().as_str(), "мир" | "весь мир" | "world" | "w") {
        return Ok(Some(ContinentChoice::World));
    }

    let continents = reference.continents();
    if let Ok(index) = arg.parse::<usize>() {
        return if index < continents.len() {
            Ok(Some(ContinentChoice::Index(index)))
        } else {
            Err(QuizError::Validation(format!("no continent number {index}")))
        };
    }

    let canonical = reference
        .continent(&arg)
        .ok_or_else(|| QuizError::Validation(format!("unknown continent '{arg}'")))?;
    continents
        .iter()
        .position(|c| c == canonical)
        .map(|i| Some(ContinentChoice::Index(i)))
        .ok_or_else(|| QuizError::Validation(format!("unknown continent '{arg}'")))
}
