/// Utility functions for handling Telegram MarkdownV2 formatting
///
/// Every outbound text is MarkdownV2. Literal text goes through
/// [`escape_markdown`]; the helpers below wrap already-escaped spans.
/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// # Example
/// ```
/// use capitals_quiz_bot::utils::markdown::escape_markdown;
///
/// let text = "Hello *world* (test)";
/// let escaped = escape_markdown(text);
/// assert_eq!(escaped, "Hello \\*world\\* \\(test\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}

/// Bold span around literal text.
pub fn bold(text: &str) -> String {
    format!("*{}*", escape_markdown(text))
}

/// Italic span around literal text.
pub fn italic(text: &str) -> String {
    format!("_{}_", escape_markdown(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_basic_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("_italic_"), "\\_italic\\_");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
    }

    #[test]
    fn test_escape_brackets_and_parentheses() {
        assert_eq!(escape_markdown("[link](url)"), "\\[link\\]\\(url\\)");
        assert_eq!(escape_markdown("{code}"), "\\{code\\}");
    }

    #[test]
    fn test_escape_backslash_first() {
        assert_eq!(escape_markdown("a\\b"), "a\\\\b");
        assert_eq!(escape_markdown("\\."), "\\\\\\.");
    }

    #[test]
    fn test_escape_russian_text() {
        assert_eq!(escape_markdown("Нью-Дели!"), "Нью\\-Дели\\!");
        assert_eq!(escape_markdown("Счёт 3 : 0"), "Счёт 3 : 0");
        assert_eq!(escape_markdown("Алжир (город)"), "Алжир \\(город\\)");
    }

    #[test]
    fn test_bold_and_italic_escape_contents() {
        assert_eq!(bold("Раунд 1."), "*Раунд 1\\.*");
        assert_eq!(italic("Улан-Батор"), "_Улан\\-Батор_");
    }

    #[test]
    fn test_escape_empty_and_plain_text() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("🇫🇷 Франция"), "🇫🇷 Франция");
    }
}
