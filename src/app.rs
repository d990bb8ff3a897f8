//! Routes typed inbound actions to the engines and turns their errors into
//! user-facing notices. Everything here is transport-free; the Telegram
//! handlers only build an [`Actor`] and execute what comes back.

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{MessageId, UserId};

use crate::bot::commands::coop::parse_region_arg;
use crate::bot::commands::lookup::capital_lookup;
use crate::bot::commands::{help_text, welcome_text, Command};
use crate::coop::{CoopSettings, SessionRegistry, TurnCoordinator};
use crate::data::ReferenceData;
use crate::delivery::{
    Actor, CallbackData, CoopButton, Directive, ScheduledAction, SoloButton, StartPayload,
};
use crate::error::QuizError;
use crate::facts::{AnotherFact, ExtraFacts, FactCache, FactGenerator};
use crate::quiz::{QuizRng, SeededRng};
use crate::solo::{SoloEngine, SoloMode, SoloRegistry};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_rejected, log_command_start, log_command_success,
    log_validation_error,
};

/// Counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppStatus {
    pub coop_sessions: usize,
    pub solo_sessions: usize,
    pub countries: usize,
    pub continents: usize,
    pub cached_facts: usize,
}

pub struct QuizApp {
    reference: Arc<ReferenceData>,
    facts: Arc<FactCache>,
    extra_facts: Arc<ExtraFacts>,
    generator: Arc<dyn FactGenerator>,
    coop: TurnCoordinator,
    solo: SoloEngine,
    admins: Vec<UserId>,
}

/// Everything a [`QuizApp`] is assembled from.
pub struct AppParts {
    pub reference: Arc<ReferenceData>,
    pub facts: Arc<FactCache>,
    pub extra_facts: Arc<ExtraFacts>,
    pub generator: Arc<dyn FactGenerator>,
    pub coop_settings: CoopSettings,
    pub sprint_duration: Duration,
    pub admins: Vec<UserId>,
    /// Fixed seed for reproducible games; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl QuizApp {
    pub fn new(parts: AppParts) -> Self {
        let coop_rng: Box<dyn QuizRng> = Box::new(SeededRng::new(parts.seed));
        let solo_rng: Box<dyn QuizRng> =
            Box::new(SeededRng::new(parts.seed.map(|s| s.wrapping_add(1))));
        Self::with_rngs(parts, coop_rng, solo_rng)
    }

    /// Same as [`QuizApp::new`] with explicit randomness sources.
    pub fn with_rngs(parts: AppParts, coop_rng: Box<dyn QuizRng>, solo_rng: Box<dyn QuizRng>) -> Self {
        let coop = TurnCoordinator::new(
            parts.reference.clone(),
            parts.facts.clone(),
            SessionRegistry::new(),
            parts.coop_settings,
            coop_rng,
        );
        let solo = SoloEngine::new(
            parts.reference.clone(),
            parts.facts.clone(),
            SoloRegistry::new(),
            parts.sprint_duration,
            solo_rng,
        );
        Self {
            reference: parts.reference,
            facts: parts.facts,
            extra_facts: parts.extra_facts,
            generator: parts.generator,
            coop,
            solo,
            admins: parts.admins,
        }
    }

    pub fn coop(&self) -> &TurnCoordinator {
        &self.coop
    }

    pub fn solo(&self) -> &SoloEngine {
        &self.solo
    }

    pub fn status(&self) -> AppStatus {
        AppStatus {
            coop_sessions: self.coop.registry().active_count(),
            solo_sessions: self.solo.registry().active_count(),
            countries: self.reference.len(),
            continents: self.reference.continents().len(),
            cached_facts: self.facts.len(),
        }
    }

    fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    pub fn handle_command(&self, actor: &Actor, command: Command) -> Vec<Directive> {
        let name = command.name();
        log_command_start(name, &actor.name, actor.user.0, actor.chat.0, None);

        let result = self.dispatch_command(actor, command);
        match result {
            Ok(directives) => {
                log_command_success(name, &actor.name, actor.user.0, actor.chat.0, None);
                directives
            }
            Err(error) => {
                log_failure(name, actor, &error);
                vec![Directive::notice(actor.chat, &error)]
            }
        }
    }

    fn dispatch_command(&self, actor: &Actor, command: Command) -> Result<Vec<Directive>, QuizError> {
        let feedback = CommandFeedback::new(actor.chat);
        match command {
            Command::Help => Ok(vec![Directive::message(actor.chat, help_text())]),
            Command::Start(payload) => match StartPayload::parse(&payload)? {
                None => Ok(vec![Directive::message(actor.chat, welcome_text())]),
                Some(StartPayload::Join { chat, session }) => self.coop.join(actor, chat, &session),
                Some(StartPayload::NewMatch { continent }) => {
                    self.coop.start_match(actor, Some(continent))
                }
            },
            Command::Coop(arg) => {
                let preset = parse_region_arg(&self.reference, &arg)?;
                self.coop.start_match(actor, preset)
            }
            Command::CoopTest(arg) => {
                if !self.is_admin(actor.user) {
                    return Ok(vec![feedback.error("Эта команда доступна только администраторам.")]);
                }
                let preset = parse_region_arg(&self.reference, &arg)?;
                self.coop.start_with_partner(actor, preset)
            }
            Command::Quit | Command::Cancel => self.coop.cancel_by_player(actor),
            Command::Cards => Ok(self.solo.begin(actor, SoloMode::Cards)),
            Command::Sprint => Ok(self.solo.begin(actor, SoloMode::Sprint)),
            Command::Test => Ok(self.solo.begin(actor, SoloMode::Test)),
            Command::Stop => Ok(self
                .solo
                .stop(actor)
                .unwrap_or_else(|| vec![feedback.info("Сейчас нет активной тренировки.")])),
            Command::Capital(query) => Ok(vec![capital_lookup(
                &self.reference,
                &self.facts,
                actor.chat,
                &query,
            )]),
        }
    }

    /// Button press. `message_id` is the message carrying the button.
    pub async fn handle_callback(
        &self,
        actor: &Actor,
        message_id: Option<MessageId>,
        data: &str,
    ) -> Vec<Directive> {
        let parsed: Result<CallbackData, QuizError> = data.parse();
        let result = match (parsed, message_id) {
            (Err(error), _) => Err(error),
            (Ok(_), None) => Err(QuizError::StaleAction),
            (Ok(CallbackData::AnotherFact), Some(message_id)) => {
                Ok(self.another_fact(actor, message_id).await)
            }
            (Ok(data), Some(message_id)) => self.dispatch_callback(actor, message_id, data),
        };

        match result {
            Ok(directives) => directives,
            Err(error) => {
                log_failure("callback", actor, &error);
                vec![Directive::ack_error(&error)]
            }
        }
    }

    fn dispatch_callback(
        &self,
        actor: &Actor,
        message_id: MessageId,
        data: CallbackData,
    ) -> Result<Vec<Directive>, QuizError> {
        match data {
            CallbackData::Coop {
                chat,
                session,
                button,
            } => match button {
                CoopButton::Join => {
                    let mut out = self.coop.join(actor, chat, &session)?;
                    out.push(Directive::ack("Вы в игре!"));
                    Ok(out)
                }
                CoopButton::PlayWithoutPartner => {
                    let mut out = self.coop.play_without_partner(actor, chat, &session)?;
                    out.push(Directive::ack("Играем без напарника"));
                    Ok(out)
                }
                CoopButton::Continent(choice) => {
                    self.coop.choose_continent(actor, chat, &session, choice, message_id)
                }
                CoopButton::Rounds(rounds) => {
                    self.coop.choose_rounds(actor, chat, &session, rounds, message_id)
                }
                CoopButton::Difficulty(difficulty) => {
                    self.coop.choose_difficulty(actor, chat, &session, difficulty, message_id)
                }
                CoopButton::Answer { turn, option } => {
                    self.coop.answer(actor, chat, &session, turn, option, message_id)
                }
                CoopButton::Cancel => self.coop.cancel(actor, chat, &session),
            },
            CallbackData::Solo(button) => match button {
                SoloButton::Continent { mode, continent } => {
                    self.solo.choose_continent(actor, mode, continent, message_id)
                }
                SoloButton::Direction {
                    mode,
                    continent,
                    direction,
                } => self.solo.start(actor, mode, continent, direction, message_id),
                SoloButton::Answer { session, option } => {
                    self.solo.answer(actor, &session, option, message_id)
                }
                SoloButton::Reveal { session } => self.solo.reveal(actor, &session, message_id),
                SoloButton::Know { session } => self.solo.know(actor, &session),
                SoloButton::Repeat { session } => self.solo.repeat(actor, &session),
                SoloButton::Stop { session } => self.solo.stop_button(actor, &session),
            },
            CallbackData::AnotherFact => Err(QuizError::StaleAction),
        }
    }

    async fn another_fact(&self, actor: &Actor, message_id: MessageId) -> Vec<Directive> {
        match self
            .extra_facts
            .another_fact(actor.chat, message_id, self.generator.as_ref())
            .await
        {
            AnotherFact::Edited(mut edits) => {
                edits.push(Directive::ack("Новый факт"));
                edits
            }
            AnotherFact::AlreadyUsed => vec![Directive::ack("Факт уже обновлён")],
            AnotherFact::Failed(error) => {
                log_failure("another_fact", actor, &error);
                vec![Directive::ack_error(&error)]
            }
        }
    }

    /// Free text that is not a command: a display name during match setup,
    /// otherwise a hint when the text looks like a misspelled command.
    pub fn handle_text(&self, actor: &Actor, text: &str) -> Vec<Directive> {
        let feedback = CommandFeedback::new(actor.chat);
        match self.coop.submit_name(actor, text) {
            Some(Ok(directives)) => return directives,
            Some(Err(QuizError::Validation(reason))) => {
                log_validation_error("name", "display_name", text, &reason, actor.user.0);
                return vec![feedback.validation_error(
                    "Такое имя не подходит.",
                    "Имя должно быть одной строкой длиной от 1 до 32 символов.",
                )];
            }
            Some(Err(error)) => {
                log_failure("name", actor, &error);
                return vec![Directive::notice(actor.chat, &error)];
            }
            None => {}
        }

        let lowered = text.to_lowercase();
        if let Some(command) = text.strip_prefix('/') {
            let command = command.split_whitespace().next().unwrap_or_default();
            vec![feedback.validation_error(
                &format!("Неизвестная команда: /{command}"),
                "Список команд: /help",
            )]
        } else if lowered.contains("столиц") {
            vec![feedback.info("Чтобы узнать столицу, напишите /capital и название страны.")]
        } else {
            Vec::new()
        }
    }

    /// Deferred action fired by the scheduler loop.
    pub fn on_scheduled(&self, action: &ScheduledAction) -> Vec<Directive> {
        match action {
            ScheduledAction::SprintOver { user, session } => self.solo.on_sprint_over(*user, session),
            _ => self.coop.on_scheduled(action),
        }
    }
}

fn log_failure(source: &str, actor: &Actor, error: &QuizError) {
    match error {
        QuizError::DataIntegrity(_) | QuizError::Generation(_) => log_command_error(
            source,
            &actor.name,
            actor.user.0,
            actor.chat.0,
            &error.to_string(),
        ),
        _ => log_command_rejected(
            source,
            &actor.name,
            actor.user.0,
            actor.chat.0,
            &error.to_string(),
        ),
    }
}
