pub mod coop;
pub mod lookup;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Викторина «Столицы мира». Команды:")]
pub enum Command {
    #[command(description = "Показать эту справку")]
    Help,
    #[command(description = "Начать работу с ботом")]
    Start(String),
    #[command(description = "Совместная игра против ботов, можно указать регион")]
    Coop(String),
    #[command(description = "Совместная игра с тестовым напарником (для админов)")]
    CoopTest(String),
    #[command(description = "Выйти из совместной игры")]
    Quit,
    #[command(description = "Отменить совместную игру")]
    Cancel,
    #[command(description = "Карточки: страна и столица")]
    Cards,
    #[command(description = "Спринт на время")]
    Sprint,
    #[command(description = "Тест из 10 вопросов")]
    Test,
    #[command(description = "Завершить тренировку")]
    Stop,
    #[command(description = "Столица или страна по названию")]
    Capital(String),
}

impl Command {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Start(_) => "start",
            Command::Coop(_) => "coop",
            Command::CoopTest(_) => "cooptest",
            Command::Quit => "quit",
            Command::Cancel => "cancel",
            Command::Cards => "cards",
            Command::Sprint => "sprint",
            Command::Test => "test",
            Command::Stop => "stop",
            Command::Capital(_) => "capital",
        }
    }
}

pub fn welcome_text() -> String {
    crate::utils::markdown::escape_markdown(
        "🌍 Привет! Это викторина о странах и столицах.\n\n\
         /cards — карточки\n/sprint — спринт на время\n/test — тест из 10 вопросов\n\
         /coop — совместная игра против ботов\n/capital <название> — справка по стране\n\n\
         /help — все команды",
    )
}

pub fn help_text() -> String {
    crate::utils::markdown::escape_markdown(&Command::descriptions().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("/coop Европа", "capitals_bot").unwrap(),
            Command::Coop("Европа".to_string())
        );
        assert_eq!(
            Command::parse("/capital Париж", "capitals_bot").unwrap(),
            Command::Capital("Париж".to_string())
        );
        assert_eq!(
            Command::parse("/start coop_42_a1b2c3d4", "capitals_bot").unwrap(),
            Command::Start("coop_42_a1b2c3d4".to_string())
        );
        assert_eq!(Command::parse("/cooptest", "capitals_bot").unwrap(), Command::CoopTest(String::new()));
    }

    #[test]
    fn test_help_mentions_all_modes() {
        let help = Command::descriptions().to_string();
        for command in ["/coop", "/cards", "/sprint", "/test", "/stop", "/capital"] {
            assert!(help.contains(command), "{command} missing from help");
        }
    }
}
