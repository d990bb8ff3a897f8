use capitals_quiz_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_simple_commands_parse() {
        let cases = [
            ("/help", Command::Help),
            ("/quit", Command::Quit),
            ("/cancel", Command::Cancel),
            ("/cards", Command::Cards),
            ("/sprint", Command::Sprint),
            ("/test", Command::Test),
            ("/stop", Command::Stop),
        ];
        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "testbot").unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_start_with_and_without_payload() {
        assert_eq!(Command::parse("/start", "testbot").unwrap(), Command::Start(String::new()));
        assert_eq!(
            Command::parse("/start coop-3", "testbot").unwrap(),
            Command::Start("coop-3".to_string())
        );
    }

    #[test]
    fn test_region_and_lookup_arguments() {
        assert_eq!(
            Command::parse("/coop Южная Америка", "testbot").unwrap(),
            Command::Coop("Южная Америка".to_string())
        );
        assert_eq!(
            Command::parse("/capital Буэнос-Айрес", "testbot").unwrap(),
            Command::Capital("Буэнос-Айрес".to_string())
        );
    }

    #[test]
    fn test_command_with_bot_mention() {
        assert_eq!(Command::parse("/coop@testbot", "testbot").unwrap(), Command::Coop(String::new()));
        assert!(Command::parse("/coop@otherbot", "testbot").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("/schedule", "testbot").is_err());
        assert!(Command::parse("/unknown", "testbot").is_err());
    }
}
