//! Cards, sprint and test: per-user linear practice runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use teloxide::types::{MessageId, UserId};
use uuid::Uuid;

use crate::constants::{CARDS_LENGTH, TEST_LENGTH};
use crate::coop::messages::another_fact_keyboard;
use crate::data::ReferenceData;
use crate::delivery::{
    Actor, Button, CallbackData, ContinentChoice, Directive, EditBody, FactAttachment, Keyboard,
    ScheduledAction, SoloButton,
};
use crate::error::QuizError;
use crate::facts::{compose_with_fact, FactCache};
use crate::quiz::rng::shuffle;
use crate::quiz::{generate_for, Direction, DirectionChoice, QuizRng};
use crate::session_id::SessionId;
use crate::solo::session::{SoloMode, SoloRegistry, SoloSession};
use crate::utils::logging::{log_session_event, log_stale_schedule};
use crate::utils::markdown::{bold, escape_markdown};

pub type SoloResult = Result<Vec<Directive>, QuizError>;

fn solo_button(text: impl Into<String>, button: SoloButton) -> Button {
    Button::callback(text, CallbackData::Solo(button))
}

pub struct SoloEngine {
    reference: Arc<ReferenceData>,
    facts: Arc<FactCache>,
    registry: SoloRegistry,
    sprint_duration: Duration,
    rng: Mutex<Box<dyn QuizRng>>,
}

impl SoloEngine {
    pub fn new(
        reference: Arc<ReferenceData>,
        facts: Arc<FactCache>,
        registry: SoloRegistry,
        sprint_duration: Duration,
        rng: Box<dyn QuizRng>,
    ) -> Self {
        Self {
            reference,
            facts,
            registry,
            sprint_duration,
            rng: Mutex::new(rng),
        }
    }

    pub fn registry(&self) -> &SoloRegistry {
        &self.registry
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn QuizRng>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn continent_name(&self, choice: ContinentChoice) -> Result<Option<String>, QuizError> {
        match choice {
            ContinentChoice::World => Ok(None),
            ContinentChoice::Index(i) => self
                .reference
                .continents()
                .get(i)
                .cloned()
                .map(Some)
                .ok_or_else(|| QuizError::Validation(format!("unknown continent index {i}"))),
        }
    }

    /// `/cards`, `/sprint`, `/test`: asks for a region.
    pub fn begin(&self, actor: &Actor, mode: SoloMode) -> Vec<Directive> {
        let mut keyboard: Keyboard = vec![vec![solo_button(
            "🌍 Весь мир",
            SoloButton::Continent {
                mode,
                continent: ContinentChoice::World,
            },
        )]];
        let continents: Vec<(usize, &String)> = self.reference.continents().iter().enumerate().collect();
        for pair in continents.chunks(2) {
            keyboard.push(
                pair.iter()
                    .map(|(i, name)| {
                        solo_button(
                            name.as_str(),
                            SoloButton::Continent {
                                mode,
                                continent: ContinentChoice::Index(*i),
                            },
                        )
                    })
                    .collect(),
            );
        }
        let text = format!("{}\n\nВыберите регион:", bold(mode.label()));
        vec![Directive::with_buttons(actor.chat, text, keyboard)]
    }

    /// Region picked. Sprint starts right away; the other modes ask for a
    /// direction next.
    pub fn choose_continent(
        &self,
        actor: &Actor,
        mode: SoloMode,
        continent: ContinentChoice,
        message_id: MessageId,
    ) -> SoloResult {
        if mode == SoloMode::Sprint {
            return self.start(actor, mode, continent, DirectionChoice::Mixed, message_id);
        }
        self.continent_name(continent)?;

        let directions = [
            DirectionChoice::Fixed(Direction::CountryToCapital),
            DirectionChoice::Fixed(Direction::CapitalToCountry),
            DirectionChoice::Mixed,
        ];
        let keyboard = directions
            .into_iter()
            .map(|direction| {
                vec![solo_button(
                    direction.label(),
                    SoloButton::Direction {
                        mode,
                        continent,
                        direction,
                    },
                )]
            })
            .collect();
        Ok(vec![
            Directive::EditMessage {
                chat: actor.chat,
                message_id,
                body: EditBody::Text(format!("{}\n\nЧто спрашивать?", bold(mode.label()))),
                buttons: Some(keyboard),
            },
            Directive::ack(""),
        ])
    }

    /// Builds the run and sends its first item.
    pub fn start(
        &self,
        actor: &Actor,
        mode: SoloMode,
        continent: ContinentChoice,
        direction: DirectionChoice,
        message_id: MessageId,
    ) -> SoloResult {
        let continent = self.continent_name(continent)?;
        let mut pool = self.reference.list_countries(continent.as_deref());
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        shuffle(&mut **self.rng(), &mut pool);

        let queue: VecDeque<String> = match mode {
            SoloMode::Cards => pool.iter().take(CARDS_LENGTH).cloned().collect(),
            SoloMode::Test => pool.iter().take(TEST_LENGTH).cloned().collect(),
            SoloMode::Sprint => pool.iter().cloned().collect(),
        };
        let mut session = SoloSession::new(actor.user, actor.chat, mode, direction, pool, queue);

        let region = continent.unwrap_or_else(|| "Весь мир".to_string());
        let mut intro = format!(
            "▶️ {}: {}, {}",
            bold(mode.label()),
            escape_markdown(&region),
            escape_markdown(&direction.label().to_lowercase())
        );
        let mut out = Vec::new();
        if mode == SoloMode::Sprint {
            session.deadline = Some(
                Utc::now()
                    + chrono::Duration::from_std(self.sprint_duration)
                        .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            );
            intro.push_str(&format!(
                "\n⏱ У вас {} секунд\\!",
                self.sprint_duration.as_secs()
            ));
            out.push(Directive::schedule(
                self.sprint_duration,
                ScheduledAction::SprintOver {
                    user: actor.user,
                    session: session.id.clone(),
                },
            ));
        }
        out.insert(
            0,
            Directive::EditMessage {
                chat: actor.chat,
                message_id,
                body: EditBody::Text(intro),
                buttons: None,
            },
        );
        out.push(Directive::ack(mode.label()));

        log_session_event(
            session.id.as_str(),
            actor.chat.0,
            "solo_started",
            Some(mode.label()),
        );
        out.extend(self.next_item(&mut session)?);
        self.registry.insert(session);
        Ok(out)
    }

    fn next_subject(&self, s: &mut SoloSession) -> Option<String> {
        if s.mode == SoloMode::Sprint && s.queue.is_empty() {
            let mut refill = s.pool.clone();
            shuffle(&mut **self.rng(), &mut refill);
            s.queue = refill.into();
        }
        s.queue.pop_front()
    }

    /// Sends the next card or question, or the summary when the run is over.
    fn next_item(&self, s: &mut SoloSession) -> SoloResult {
        let Some(subject) = self.next_subject(s) else {
            s.current = None;
            return Ok(vec![Directive::message(s.chat, summary(s))]);
        };
        let question = {
            let mut rng = self.rng();
            generate_for(&self.reference, &subject, &s.pool, s.direction, &mut **rng)?
        };

        let directive = match s.mode {
            SoloMode::Cards => {
                let text = format!("🃏 {}", bold(&question.subject));
                let keyboard = vec![
                    vec![solo_button("👀 Показать ответ", SoloButton::Reveal { session: s.id.clone() })],
                    vec![solo_button("⏹ Завершить", SoloButton::Stop { session: s.id.clone() })],
                ];
                let image = match question.direction {
                    Direction::CountryToCapital => self.reference.image_of(&question.country),
                    Direction::CapitalToCountry => None,
                };
                s.current_is_photo = image.is_some();
                match image {
                    Some(image) => Directive::SendPhoto {
                        chat: s.chat,
                        image: image.to_string(),
                        caption: text,
                        buttons: Some(keyboard),
                    },
                    None => Directive::with_buttons(s.chat, text, keyboard),
                }
            }
            SoloMode::Sprint | SoloMode::Test => {
                let mut keyboard: Keyboard = question
                    .options
                    .iter()
                    .enumerate()
                    .map(|(option, label)| {
                        vec![solo_button(
                            label.as_str(),
                            SoloButton::Answer {
                                session: s.id.clone(),
                                option,
                            },
                        )]
                    })
                    .collect();
                keyboard.push(vec![solo_button("⏹ Завершить", SoloButton::Stop { session: s.id.clone() })]);
                let text = match s.mode {
                    SoloMode::Test => format!(
                        "❓ {}\n{}",
                        bold(&format!("Вопрос {} из {}", s.total + 1, TEST_LENGTH.min(s.pool.len()))),
                        escape_markdown(&question.prompt)
                    ),
                    _ => format!("⚡️ {}", escape_markdown(&question.prompt)),
                };
                s.current_is_photo = false;
                Directive::with_buttons(s.chat, text, keyboard)
            }
        };
        s.current = Some(question);
        Ok(vec![directive])
    }

    fn mutate<R>(
        &self,
        user: UserId,
        id: &SessionId,
        f: impl FnOnce(&mut SoloSession) -> Result<R, QuizError>,
    ) -> Result<R, QuizError> {
        match self.registry.with_session(user, id, f) {
            Some(result) => result,
            None if self.registry.get(user).is_some() => Err(QuizError::StaleAction),
            None => Err(QuizError::SessionNotFound),
        }
    }

    /// Drops the run once it produced its summary.
    fn settle(&self, user: UserId, id: &SessionId) {
        let finished = self
            .registry
            .with_session(user, id, |s| s.current.is_none().then_some(s.chat));
        if let Some(Some(chat)) = finished {
            self.registry.remove_if(user, id);
            log_session_event(id.as_str(), chat.0, "solo_finished", None);
        }
    }

    /// Answer button in sprint and test.
    pub fn answer(&self, actor: &Actor, id: &SessionId, option: usize, message_id: MessageId) -> SoloResult {
        if self.sprint_expired(actor.user, id) {
            return Ok(self.on_sprint_over(actor.user, id));
        }
        let out = self.mutate(actor.user, id, |s| {
            if s.mode == SoloMode::Cards {
                return Err(QuizError::StaleAction);
            }
            let question = s.current.clone().ok_or(QuizError::StaleAction)?;
            let picked = question
                .options
                .get(option)
                .cloned()
                .ok_or_else(|| QuizError::Validation(format!("option {option} out of range")))?;
            let correct = question.is_correct(option);
            s.total += 1;
            if correct {
                s.correct += 1;
            } else {
                s.mark_for_repeat(&question.country);
            }

            let verdict = if correct {
                format!("✅ {}", bold(&picked))
            } else {
                format!(
                    "❌ {}, правильно: {}",
                    escape_markdown(&picked),
                    bold(&question.answer)
                )
            };
            let mut out = vec![
                Directive::EditMessage {
                    chat: actor.chat,
                    message_id,
                    body: EditBody::Text(format!("{}\n\n{}", escape_markdown(&question.prompt), verdict)),
                    buttons: None,
                },
                Directive::ack(if correct { "Верно!" } else { "Неверно" }),
            ];
            if s.mode == SoloMode::Test && correct {
                let body = format!("🎉 {}", bold("Верно!"));
                let fact = self.facts.static_fact(&question.country);
                out.push(Directive::SendMessage {
                    chat: s.chat,
                    text: compose_with_fact(&body, &fact),
                    buttons: Some(another_fact_keyboard()),
                    fact: Some(FactAttachment {
                        group: Uuid::new_v4(),
                        subject: question.country.clone(),
                        body,
                        fact,
                    }),
                });
            }
            out.extend(self.next_item(s)?);
            Ok(out)
        })?;
        self.settle(actor.user, id);
        Ok(out)
    }

    fn sprint_expired(&self, user: UserId, id: &SessionId) -> bool {
        self.registry
            .with_session(user, id, |s| s.mode == SoloMode::Sprint && s.is_expired(Utc::now()))
            .unwrap_or(false)
    }

    /// "Show answer" on a card.
    pub fn reveal(&self, actor: &Actor, id: &SessionId, message_id: MessageId) -> SoloResult {
        self.mutate(actor.user, id, |s| {
            let question = s.current.clone().ok_or(QuizError::StaleAction)?;
            if s.mode != SoloMode::Cards {
                return Err(QuizError::StaleAction);
            }
            let text = format!(
                "🃏 {}\n\n➡️ {}",
                bold(&question.subject),
                bold(&question.answer)
            );
            let keyboard = vec![vec![
                solo_button("👍 Знаю", SoloButton::Know { session: s.id.clone() }),
                solo_button("🔁 Повторить", SoloButton::Repeat { session: s.id.clone() }),
            ]];
            let body = if s.current_is_photo {
                EditBody::Caption(text)
            } else {
                EditBody::Text(text)
            };
            Ok(vec![
                Directive::EditMessage {
                    chat: actor.chat,
                    message_id,
                    body,
                    buttons: Some(keyboard),
                },
                Directive::ack(""),
            ])
        })
    }

    /// "Know" on a revealed card.
    pub fn know(&self, actor: &Actor, id: &SessionId) -> SoloResult {
        let out = self.mutate(actor.user, id, |s| {
            s.current.as_ref().ok_or(QuizError::StaleAction)?;
            s.total += 1;
            s.correct += 1;
            let mut out = vec![Directive::ack("👍")];
            out.extend(self.next_item(s)?);
            Ok(out)
        })?;
        self.settle(actor.user, id);
        Ok(out)
    }

    /// "Repeat" on a revealed card: the card comes back once, later.
    pub fn repeat(&self, actor: &Actor, id: &SessionId) -> SoloResult {
        let out = self.mutate(actor.user, id, |s| {
            let country = s
                .current
                .as_ref()
                .map(|q| q.country.clone())
                .ok_or(QuizError::StaleAction)?;
            s.total += 1;
            s.mark_for_repeat(&country);
            if s.requeued.insert(country.clone()) {
                s.queue.push_back(country);
            }
            let mut out = vec![Directive::ack("🔁")];
            out.extend(self.next_item(s)?);
            Ok(out)
        })?;
        self.settle(actor.user, id);
        Ok(out)
    }

    /// Stop button of a specific run.
    pub fn stop_button(&self, actor: &Actor, id: &SessionId) -> SoloResult {
        let session = self
            .registry
            .remove_if(actor.user, id)
            .ok_or(QuizError::StaleAction)?;
        log_session_event(id.as_str(), actor.chat.0, "solo_stopped", None);
        Ok(vec![Directive::message(session.chat, summary(&session)), Directive::ack("")])
    }

    /// `/stop`: ends whatever run the user has.
    pub fn stop(&self, actor: &Actor) -> Option<Vec<Directive>> {
        let session = self.registry.remove(actor.user)?;
        log_session_event(session.id.as_str(), actor.chat.0, "solo_stopped", None);
        Some(vec![Directive::message(session.chat, summary(&session))])
    }

    /// Sprint timer fired. A run that was stopped or replaced meanwhile is
    /// left alone.
    pub fn on_sprint_over(&self, user: UserId, id: &SessionId) -> Vec<Directive> {
        match self.registry.remove_if(user, id) {
            Some(session) => {
                log_session_event(id.as_str(), session.chat.0, "sprint_over", None);
                vec![Directive::message(
                    session.chat,
                    format!("⏰ {}\n\n{}", bold("Время вышло!"), summary(&session)),
                )]
            }
            None => {
                log_stale_schedule("sprint_over", &format!("session {id} of user {}", user.0));
                Vec::new()
            }
        }
    }
}

/// Result line plus the subjects worth repeating.
pub fn summary(s: &SoloSession) -> String {
    let mut text = format!(
        "🏁 {}: {} из {}",
        bold(s.mode.label()),
        s.correct,
        s.total
    );
    if !s.to_repeat.is_empty() {
        let list: Vec<String> = s.to_repeat.iter().map(|c| escape_markdown(c)).collect();
        text.push_str(&format!("\n\n🔁 Стоит повторить: {}", list.join(", ")));
    }
    text
}
