//! Texts and keyboards of the cooperative match. All output is MarkdownV2.

use std::fmt::Write;

use teloxide::types::ChatId;

use crate::constants::ROUND_CHOICES;
use crate::coop::session::{AnswerRecord, CoopSession, Difficulty, Region};
use crate::delivery::{
    Button, CallbackData, ContinentChoice, CoopButton, Directive, Keyboard, StartPayload,
};
use crate::quiz::Question;
use crate::utils::markdown::{bold, escape_markdown, italic};

fn coop_button(session: &CoopSession, text: impl Into<String>, button: CoopButton) -> Button {
    Button::callback(
        text,
        CallbackData::Coop {
            chat: session.chat,
            session: session.id.clone(),
            button,
        },
    )
}

/// Keyboard with the single "another fact" button.
pub fn another_fact_keyboard() -> Keyboard {
    vec![vec![Button::callback("🔄 Другой факт", CallbackData::AnotherFact)]]
}

pub fn invite(session: &CoopSession, bot_username: Option<&str>) -> (String, Keyboard) {
    let organizer = session
        .players
        .first()
        .map(|p| p.display_name())
        .unwrap_or_default();
    let mut text = format!(
        "🤝 {}\n\n{} приглашает сыграть вдвоём против ботов\\.",
        bold("Совместная игра"),
        escape_markdown(organizer)
    );
    if let Some(region) = &session.region {
        let _ = write!(text, "\nРегион: {}", escape_markdown(region.label()));
    }

    let mut keyboard = vec![vec![coop_button(session, "🙋 Присоединиться", CoopButton::Join)]];
    if let Some(bot) = bot_username {
        let link = format!(
            "https://t.me/{}?start={}",
            bot,
            StartPayload::join_link(session.chat, &session.id)
        );
        keyboard.push(vec![Button::url("🔗 Пригласить по ссылке", link)]);
    }
    keyboard.push(vec![coop_button(
        session,
        "🤖 Играть без напарника",
        CoopButton::PlayWithoutPartner,
    )]);
    keyboard.push(vec![coop_button(session, "✖️ Отменить", CoopButton::Cancel)]);
    (text, keyboard)
}

pub fn name_prompt() -> String {
    format!(
        "✍️ Как вас называть в матче? Напишите имя одним сообщением {}\\.",
        italic("(до 32 символов)")
    )
}

pub fn joined(name: &str) -> String {
    format!("🙌 {} присоединяется к матчу\\!", escape_markdown(name))
}

pub fn name_accepted(name: &str, waiting: bool) -> String {
    let mut text = format!("👍 Вы играете как {}\\.", bold(name));
    if waiting {
        text.push_str("\nЖдём имя напарника\\.");
    }
    text
}

pub fn waiting_for_organizer() -> String {
    "⏳ Организатор выбирает настройки матча\\.".to_string()
}

pub fn continent_prompt(session: &CoopSession, continents: &[String]) -> (String, Keyboard) {
    let mut keyboard = vec![vec![coop_button(
        session,
        "🌍 Весь мир",
        CoopButton::Continent(ContinentChoice::World),
    )]];
    for pair in continents.iter().enumerate().collect::<Vec<_>>().chunks(2) {
        keyboard.push(
            pair.iter()
                .map(|(i, name)| {
                    coop_button(session, name.as_str(), CoopButton::Continent(ContinentChoice::Index(*i)))
                })
                .collect(),
        );
    }
    ("🗺 Выберите регион для вопросов:".to_string(), keyboard)
}

pub fn settings_prompt(session: &CoopSession, max_rounds: usize) -> (String, Keyboard) {
    let region = session.region.as_ref().map(Region::label).unwrap_or("Весь мир");
    let rounds = session
        .rounds
        .map(|r| r.to_string())
        .unwrap_or_else(|| "не выбрано".to_string());
    let difficulty = session.difficulty.map(Difficulty::label).unwrap_or("не выбрано");
    let text = format!(
        "⚙️ {}\n\nРегион: {}\nРаундов: {}\nСоперники: {}\n\nВыберите число раундов и силу ботов\\.",
        bold("Настройки матча"),
        escape_markdown(region),
        escape_markdown(&rounds),
        escape_markdown(difficulty)
    );

    let mark = |selected: bool, label: String| if selected { format!("✓ {label}") } else { label };
    let rounds_row: Vec<Button> = ROUND_CHOICES
        .iter()
        .filter(|n| **n <= max_rounds)
        .map(|n| {
            coop_button(
                session,
                mark(session.rounds == Some(*n), n.to_string()),
                CoopButton::Rounds(*n),
            )
        })
        .collect();
    let difficulty_row: Vec<Button> = Difficulty::ALL
        .iter()
        .map(|d| {
            coop_button(
                session,
                mark(session.difficulty == Some(*d), d.label().to_string()),
                CoopButton::Difficulty(*d),
            )
        })
        .collect();
    let keyboard = vec![
        rounds_row,
        difficulty_row,
        vec![coop_button(session, "✖️ Отменить", CoopButton::Cancel)],
    ];
    (text, keyboard)
}

pub fn match_started(session: &CoopSession) -> String {
    let team: Vec<String> = session
        .players
        .iter()
        .map(|p| escape_markdown(p.display_name()))
        .collect();
    let bots: Vec<String> = session.bots.iter().map(|b| escape_markdown(&b.name)).collect();
    format!(
        "🚀 {}\n\nКоманда: {}\nБоты: {}\nРаундов: {}",
        bold("Матч начинается!"),
        team.join(", "),
        bots.join(", "),
        session.rounds.unwrap_or(0)
    )
}

pub fn round_header(session: &CoopSession) -> String {
    format!(
        "🔔 {}",
        bold(&format!(
            "Раунд {} из {}",
            session.current_round(),
            session.rounds.unwrap_or(0)
        ))
    )
}

pub fn question(session: &CoopSession, question: &Question, responder: &str) -> (String, Keyboard) {
    let text = format!(
        "❓ {}, ваш ход\\!\n\n{}",
        bold(responder),
        escape_markdown(&question.prompt)
    );
    let keyboard = question
        .options
        .iter()
        .enumerate()
        .map(|(option, label)| {
            vec![coop_button(
                session,
                label.as_str(),
                CoopButton::Answer {
                    turn: session.turn,
                    option,
                },
            )]
        })
        .collect();
    (text, keyboard)
}

pub fn waiting_for(name: &str) -> String {
    format!("⏳ Отвечает {}\\.\\.\\.", escape_markdown(name))
}

pub fn answer_locked(question: &Question, picked: &str) -> String {
    format!(
        "{}\n\nВаш ответ: {}\\. Результат покажем, когда ответит вся команда\\.",
        escape_markdown(&question.prompt),
        bold(picked)
    )
}

fn answer_lines(answers: &[AnswerRecord]) -> String {
    answers
        .iter()
        .map(|a| {
            format!(
                "{} {}: {}",
                if a.correct { "✅" } else { "❌" },
                escape_markdown(&a.player),
                escape_markdown(&a.picked)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reveal of a resolved question, without the fact section.
pub fn reveal(title: &str, question: &Question, answers: &[AnswerRecord], hit: bool) -> String {
    format!(
        "{} {}\n{}\n\n{}\nПравильный ответ: {}",
        if hit { "🎉" } else { "😕" },
        bold(title),
        escape_markdown(&question.prompt),
        answer_lines(answers),
        bold(&question.answer)
    )
}

pub fn scoreboard(session: &CoopSession) -> String {
    format!(
        "📊 Счёт: команда {} : {} боты\nОсталось вопросов: {}",
        session.team_score,
        session.bot_score,
        session.remaining_questions()
    )
}

pub fn final_result(session: &CoopSession) -> String {
    let verdict = match session.team_score.cmp(&session.bot_score) {
        std::cmp::Ordering::Greater => "🏆 Победила команда людей!",
        std::cmp::Ordering::Less => "🤖 Победили боты!",
        std::cmp::Ordering::Equal => "🤝 Ничья!",
    };
    let mut text = format!(
        "🏁 {}\n\nКоманда {} : {} боты\n{}\n",
        bold("Матч окончен"),
        session.team_score,
        session.bot_score,
        bold(verdict)
    );
    for player in &session.players {
        let _ = write!(
            text,
            "\n👤 {}: {}",
            escape_markdown(player.display_name()),
            session.tally(player.id)
        );
    }
    for bot in &session.bots {
        let _ = write!(text, "\n🤖 {}: {}", escape_markdown(&bot.name), bot.correct);
    }
    text
}

pub fn cancelled(by: &str) -> String {
    format!("🛑 Матч отменён игроком {}\\.", escape_markdown(by))
}

/// Sends the same text to every chat in `targets`.
pub fn broadcast(targets: &[ChatId], text: &str) -> Vec<Directive> {
    targets
        .iter()
        .map(|chat| Directive::message(*chat, text))
        .collect()
}
