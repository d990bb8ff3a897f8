use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use capitals_quiz_bot::app::{AppParts, QuizApp};
use capitals_quiz_bot::bot::commands::Command;
use capitals_quiz_bot::coop::CoopSettings;
use capitals_quiz_bot::data::ReferenceData;
use capitals_quiz_bot::delivery::{Actor, Directive, EditBody, ScheduledAction};
use capitals_quiz_bot::error::QuizError;
use capitals_quiz_bot::facts::{DisabledFactGenerator, ExtraFacts, FactCache};
use capitals_quiz_bot::quiz::ScriptedRng;
use capitals_quiz_bot::session_id::SessionId;
use teloxide::types::{ChatId, MessageId, UserId};

const COUNTRIES: &str = r#"{
    "continents": ["Европа", "Азия", "Океания"],
    "countries": [
        {"name": "Франция", "capital": "Париж", "continent": "Европа"},
        {"name": "Германия", "capital": "Берлин", "continent": "Европа"},
        {"name": "Италия", "capital": "Рим", "continent": "Европа"},
        {"name": "Испания", "capital": "Мадрид", "continent": "Европа"},
        {"name": "Япония", "capital": "Токио", "continent": "Азия"},
        {"name": "Австралия", "capital": "Канберра", "continent": "Океания",
         "image": "https://flagcdn.com/w320/au.png"}
    ]
}"#;

fn app() -> QuizApp {
    let parts = AppParts {
        reference: Arc::new(ReferenceData::from_json_str(COUNTRIES).unwrap()),
        facts: Arc::new(FactCache::in_memory(HashMap::new())),
        extra_facts: Arc::new(ExtraFacts::new()),
        generator: Arc::new(DisabledFactGenerator),
        coop_settings: CoopSettings::default(),
        sprint_duration: Duration::from_secs(60),
        admins: Vec::new(),
        seed: None,
    };
    QuizApp::with_rngs(
        parts,
        Box::new(ScriptedRng::constant(0.5)),
        Box::new(ScriptedRng::constant(0.5)),
    )
}

fn player() -> Actor {
    Actor::new(UserId(7), "Вера", ChatId(7))
}

fn run_id(app: &QuizApp) -> SessionId {
    app.solo().registry().get(UserId(7)).expect("run exists").id
}

fn acks(directives: &[Directive]) -> Vec<String> {
    directives
        .iter()
        .filter_map(|d| match d {
            Directive::Ack { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn last_text(directives: &[Directive]) -> String {
    directives
        .iter()
        .rev()
        .find_map(|d| match d {
            Directive::SendMessage { text, .. } => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_test_mode_counts_and_lists_mistakes() {
    let app = app();
    let actor = player();

    let out = app.handle_command(&actor, Command::Test);
    assert!(out[0].text().unwrap().contains("Выберите регион"));

    let out = app.handle_callback(&actor, Some(MessageId(1)), "s:m:t:0").await;
    assert!(out[0].text().unwrap().contains("Что спрашивать"));

    app.handle_callback(&actor, Some(MessageId(1)), "s:d:t:0:cc").await;
    let id = run_id(&app);

    // First answer right, the rest wrong.
    let mut answered = 0;
    let mut final_out = Vec::new();
    while let Some(run) = app.solo().registry().get(UserId(7)) {
        let question = run.current.clone().unwrap();
        let correct = question.correct_index().unwrap();
        let option = if answered == 0 { correct } else { (correct + 1) % question.options.len() };
        let out = app
            .handle_callback(&actor, Some(MessageId(10 + answered)), &format!("s:a:{id}:{option}"))
            .await;
        if answered == 0 {
            assert_eq!(acks(&out), vec!["Верно!".to_string()]);
            assert!(out
                .iter()
                .any(|d| matches!(d, Directive::SendMessage { fact: Some(_), .. })));
        }
        answered += 1;
        final_out = out;
    }

    assert_eq!(answered, 4);
    let summary = last_text(&final_out);
    assert!(summary.contains("1 из 4"), "{summary}");
    assert!(summary.contains("Стоит повторить"));
}

#[tokio::test]
async fn test_cards_repeat_requeues_once() {
    let app = app();
    let actor = player();

    app.handle_command(&actor, Command::Cards);
    app.handle_callback(&actor, Some(MessageId(1)), "s:m:c:1").await;
    let out = app.handle_callback(&actor, Some(MessageId(1)), "s:d:c:1:cc").await;
    assert!(out.iter().any(|d| d.text().is_some_and(|t| t.contains("Япония"))));
    let id = run_id(&app);

    let out = app.handle_callback(&actor, Some(MessageId(2)), &format!("s:v:{id}")).await;
    assert!(matches!(
        &out[0],
        Directive::EditMessage { body: EditBody::Text(text), .. } if text.contains("Токио")
    ));

    // The card comes back after "repeat".
    app.handle_callback(&actor, Some(MessageId(2)), &format!("s:r:{id}")).await;
    let run = app.solo().registry().get(UserId(7)).unwrap();
    assert_eq!(run.current.as_ref().unwrap().country, "Япония");

    app.handle_callback(&actor, Some(MessageId(3)), &format!("s:v:{id}")).await;
    let out = app.handle_callback(&actor, Some(MessageId(3)), &format!("s:k:{id}")).await;

    let summary = last_text(&out);
    assert!(summary.contains("1 из 2"), "{summary}");
    assert!(summary.contains("Япония"));
    assert!(app.solo().registry().get(UserId(7)).is_none());
}

#[tokio::test]
async fn test_card_with_image_is_sent_as_photo() {
    let app = app();
    let actor = player();

    app.handle_command(&actor, Command::Cards);
    let out = app.handle_callback(&actor, Some(MessageId(1)), "s:d:c:2:cc").await;
    assert!(out.iter().any(|d| matches!(
        d,
        Directive::SendPhoto { image, .. } if image == "https://flagcdn.com/w320/au.png"
    )));

    let id = run_id(&app);
    let out = app.handle_callback(&actor, Some(MessageId(2)), &format!("s:v:{id}")).await;
    assert!(matches!(
        &out[0],
        Directive::EditMessage { body: EditBody::Caption(caption), .. } if caption.contains("Канберра")
    ));
}

#[tokio::test]
async fn test_sprint_ends_when_timer_fires() {
    let app = app();
    let actor = player();

    app.handle_command(&actor, Command::Sprint);
    let out = app.handle_callback(&actor, Some(MessageId(1)), "s:m:s:1").await;
    let timer = out
        .iter()
        .find_map(|d| match d {
            Directive::ScheduleAfter { delay, payload } => Some((*delay, payload.clone())),
            _ => None,
        })
        .expect("sprint schedules its end");
    assert_eq!(timer.0, Duration::from_secs(60));
    let id = run_id(&app);

    // A one-country sprint keeps cycling.
    for n in 0..3 {
        let run = app.solo().registry().get(UserId(7)).unwrap();
        let option = run.current.unwrap().correct_index().unwrap();
        app.handle_callback(&actor, Some(MessageId(10 + n)), &format!("s:a:{id}:{option}"))
            .await;
    }

    let out = app.on_scheduled(&timer.1);
    let text = last_text(&out);
    assert!(text.contains("Время вышло"));
    assert!(text.contains("3 из 3"), "{text}");
    assert!(app.solo().registry().get(UserId(7)).is_none());

    let out = app
        .handle_callback(&actor, Some(MessageId(20)), &format!("s:a:{id}:0"))
        .await;
    assert_eq!(acks(&out), vec![QuizError::SessionNotFound.notice().to_string()]);
}

#[tokio::test]
async fn test_sprint_timer_after_stop_is_ignored() {
    let app = app();
    let actor = player();

    app.handle_command(&actor, Command::Sprint);
    app.handle_callback(&actor, Some(MessageId(1)), "s:m:s:0").await;
    let id = run_id(&app);

    let out = app.handle_command(&actor, Command::Stop);
    assert!(last_text(&out).contains("Спринт"));

    let fired = ScheduledAction::SprintOver {
        user: UserId(7),
        session: id,
    };
    assert!(app.on_scheduled(&fired).is_empty());
}

#[test]
fn test_stop_without_run() {
    let app = app();
    let out = app.handle_command(&player(), Command::Stop);
    assert!(out[0].text().unwrap().contains("нет активной тренировки"));
}

#[tokio::test]
async fn test_old_run_buttons_are_stale() {
    let app = app();
    let actor = player();

    app.handle_callback(&actor, Some(MessageId(1)), "s:d:t:0:cc").await;
    let old = run_id(&app);
    app.handle_callback(&actor, Some(MessageId(2)), "s:d:t:1:cc").await;
    assert_ne!(run_id(&app), old);

    let out = app
        .handle_callback(&actor, Some(MessageId(3)), &format!("s:a:{old}:0"))
        .await;
    assert_eq!(acks(&out), vec![QuizError::StaleAction.notice().to_string()]);
}
