//! The cooperative match state machine.
//!
//! Every operation validates and mutates the session inside one registry
//! closure, then hands back directives for the delivery layer. Nothing here
//! awaits, so no lock is ever held across a suspension point.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use teloxide::types::{ChatId, MessageId, UserId};
use uuid::Uuid;

use crate::constants::{accuracy, MAX_HUMAN_PLAYERS, WORLD_SAMPLE_SIZE};
use crate::coop::messages;
use crate::coop::registry::SessionRegistry;
use crate::coop::session::{AnswerRecord, CoopSession, Difficulty, Player, PlayerKind, Region, Stage};
use crate::coop::turns::{closes_question, Slot};
use crate::data::ReferenceData;
use crate::delivery::{
    Actor, ContinentChoice, Directive, EditBody, FactAttachment, ScheduledAction,
};
use crate::error::QuizError;
use crate::facts::{compose_with_fact, FactCache};
use crate::quiz::rng::{sample, shuffle};
use crate::quiz::{generate_for, DirectionChoice, Question, QuizRng};
use crate::session_id::SessionId;
use crate::utils::logging::{log_session_event, log_stale_schedule};
use crate::utils::validation::{validate_display_name, validate_round_count};

/// Timing and limits of cooperative matches.
#[derive(Debug, Clone)]
pub struct CoopSettings {
    /// Pause before a simulated player answers.
    pub bot_move_delay: Duration,
    /// Pause between the end of one round and the next question.
    pub round_pause: Duration,
    pub max_rounds: usize,
    /// Used to build invite deep links.
    pub bot_username: Option<String>,
}

impl Default for CoopSettings {
    fn default() -> Self {
        Self {
            bot_move_delay: Duration::from_millis(1500),
            round_pause: Duration::from_millis(2000),
            max_rounds: 10,
            bot_username: None,
        }
    }
}

pub type CoopResult = Result<Vec<Directive>, QuizError>;

pub struct TurnCoordinator {
    reference: Arc<ReferenceData>,
    facts: Arc<FactCache>,
    registry: SessionRegistry,
    settings: CoopSettings,
    rng: Mutex<Box<dyn QuizRng>>,
}

impl TurnCoordinator {
    pub fn new(
        reference: Arc<ReferenceData>,
        facts: Arc<FactCache>,
        registry: SessionRegistry,
        settings: CoopSettings,
        rng: Box<dyn QuizRng>,
    ) -> Self {
        Self {
            reference,
            facts,
            registry,
            settings,
            rng: Mutex::new(rng),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn QuizRng>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(
        &self,
        chat: ChatId,
        id: &SessionId,
        f: impl FnOnce(&mut CoopSession) -> Result<R, QuizError>,
    ) -> Result<R, QuizError> {
        self.registry
            .with_session(chat, id, f)
            .unwrap_or(Err(QuizError::SessionNotFound))
    }

    fn resolve_region(&self, choice: ContinentChoice) -> Result<Region, QuizError> {
        match choice {
            ContinentChoice::World => Ok(Region::World),
            ContinentChoice::Index(i) => self
                .reference
                .continents()
                .get(i)
                .map(|name| Region::Continent(name.clone()))
                .ok_or_else(|| QuizError::Validation(format!("unknown continent index {i}"))),
        }
    }

    fn ensure_free(&self, user: UserId) -> Result<(), QuizError> {
        if self.registry.find_by_player(user).is_some() {
            Err(QuizError::AlreadyInMatch)
        } else {
            Ok(())
        }
    }

    // ---- AwaitingJoin ----

    /// `/coop [continent]`: opens a match and posts the invite.
    pub fn start_match(&self, actor: &Actor, preset: Option<ContinentChoice>) -> CoopResult {
        self.ensure_free(actor.user)?;
        let region = preset.map(|c| self.resolve_region(c)).transpose()?;

        let id = self.registry.create(actor.chat, Player::human(actor));
        let invite = self.mutate(actor.chat, &id, |s| {
            s.region = region;
            Ok(messages::invite(s, self.settings.bot_username.as_deref()))
        })?;
        log_session_event(id.as_str(), actor.chat.0, "created", Some(&actor.name));

        let (text, keyboard) = invite;
        Ok(vec![Directive::with_buttons(actor.chat, text, keyboard)])
    }

    /// `/cooptest`: the organizer plays alongside a simulated partner and
    /// goes straight to the region or settings stage.
    pub fn start_with_partner(&self, actor: &Actor, preset: Option<ContinentChoice>) -> CoopResult {
        self.ensure_free(actor.user)?;
        let region = preset.map(|c| self.resolve_region(c)).transpose()?;

        let id = self.registry.create(actor.chat, Player::human(actor));
        let directives = self.mutate(actor.chat, &id, |s| {
            s.players[0].name = Some(actor.name.clone());
            s.players.push(Player::simulated_partner());
            s.seal_roster();
            let next = if region.is_some() {
                Stage::AwaitingDifficulty
            } else {
                Stage::AwaitingContinent
            };
            s.region = region;
            s.advance_stage(next)?;
            Ok(vec![self.setup_prompt(s, actor.chat)])
        })?;
        log_session_event(id.as_str(), actor.chat.0, "created_with_partner", Some(&actor.name));
        Ok(directives)
    }

    /// Second human joins through the button or the deep link.
    pub fn join(&self, actor: &Actor, chat: ChatId, id: &SessionId) -> CoopResult {
        self.ensure_free(actor.user)?;
        let directives = self.mutate(chat, id, |s| {
            s.expect_stage(Stage::AwaitingJoin)?;
            if s.players.len() >= MAX_HUMAN_PLAYERS {
                return Err(QuizError::StaleAction);
            }
            s.players.push(Player::human(actor));
            s.advance_stage(Stage::AwaitingNames)?;

            let mut out = messages::broadcast(&s.targets(), &messages::joined(&actor.name));
            out.extend(
                s.targets()
                    .into_iter()
                    .map(|target| Directive::message(target, messages::name_prompt())),
            );
            Ok(out)
        })?;
        log_session_event(id.as_str(), chat.0, "joined", Some(&actor.name));
        Ok(directives)
    }

    pub fn play_without_partner(&self, actor: &Actor, chat: ChatId, id: &SessionId) -> CoopResult {
        self.mutate(chat, id, |s| {
            s.expect_organizer(actor.user)?;
            s.expect_stage(Stage::AwaitingJoin)?;
            s.advance_stage(Stage::AwaitingNames)?;
            Ok(s.targets()
                .into_iter()
                .map(|target| Directive::message(target, messages::name_prompt()))
                .collect())
        })
    }

    // ---- AwaitingNames ----

    /// Free text from a player who still owes a display name. Returns `None`
    /// when the text is not a name submission at all.
    pub fn submit_name(&self, actor: &Actor, text: &str) -> Option<CoopResult> {
        let (chat, session) = self.registry.find_by_player(actor.user)?;
        if session.stage != Stage::AwaitingNames
            || session.player(actor.user).map_or(true, |p| p.name.is_some())
        {
            return None;
        }

        let name = match validate_display_name(text) {
            Ok(name) => name,
            Err(e) => return Some(Err(QuizError::Validation(e.to_string()))),
        };

        Some(self.mutate(chat, &session.id, |s| {
            s.expect_stage(Stage::AwaitingNames)?;
            let player = s.player_mut(actor.user).ok_or(QuizError::NotInMatch)?;
            player.name = Some(name.clone());
            let reply_to = player.target.unwrap_or(actor.chat);

            if !s.all_named() {
                return Ok(vec![Directive::message(reply_to, messages::name_accepted(&name, true))]);
            }

            s.seal_roster();
            let next = if s.region.is_some() {
                Stage::AwaitingDifficulty
            } else {
                Stage::AwaitingContinent
            };
            s.advance_stage(next)?;
            log_session_event(s.id.as_str(), s.chat.0, "named", None);

            let mut out = vec![Directive::message(reply_to, messages::name_accepted(&name, false))];
            let organizer_chat = s
                .player(s.organizer)
                .and_then(|p| p.target)
                .unwrap_or(s.chat);
            for target in s.targets() {
                if target != organizer_chat {
                    out.push(Directive::message(target, messages::waiting_for_organizer()));
                }
            }
            out.push(self.setup_prompt(s, organizer_chat));
            Ok(out)
        }))
    }

    /// Region keyboard or settings keyboard, whichever the stage asks for.
    fn setup_prompt(&self, s: &CoopSession, chat: ChatId) -> Directive {
        let (text, keyboard) = if s.stage == Stage::AwaitingContinent {
            messages::continent_prompt(s, self.reference.continents())
        } else {
            messages::settings_prompt(s, self.settings.max_rounds)
        };
        Directive::with_buttons(chat, text, keyboard)
    }

    // ---- AwaitingContinent / AwaitingDifficulty ----

    pub fn choose_continent(
        &self,
        actor: &Actor,
        chat: ChatId,
        id: &SessionId,
        choice: ContinentChoice,
        message_id: MessageId,
    ) -> CoopResult {
        let region = self.resolve_region(choice)?;
        self.mutate(chat, id, |s| {
            s.expect_organizer(actor.user)?;
            s.expect_stage(Stage::AwaitingContinent)?;
            s.region = Some(region);
            s.advance_stage(Stage::AwaitingDifficulty)?;
            let (text, keyboard) = messages::settings_prompt(s, self.settings.max_rounds);
            Ok(vec![
                Directive::EditMessage {
                    chat: actor.chat,
                    message_id,
                    body: EditBody::Text(text),
                    buttons: Some(keyboard),
                },
                Directive::ack(s.region.as_ref().map(Region::label).unwrap_or_default()),
            ])
        })
    }

    pub fn choose_rounds(
        &self,
        actor: &Actor,
        chat: ChatId,
        id: &SessionId,
        rounds: usize,
        message_id: MessageId,
    ) -> CoopResult {
        validate_round_count(rounds, self.settings.max_rounds)
            .map_err(|e| QuizError::Validation(e.to_string()))?;
        self.mutate(chat, id, |s| {
            s.expect_organizer(actor.user)?;
            s.expect_stage(Stage::AwaitingDifficulty)?;
            s.rounds = Some(rounds);
            self.settings_changed(s, actor.chat, message_id)
        })
    }

    pub fn choose_difficulty(
        &self,
        actor: &Actor,
        chat: ChatId,
        id: &SessionId,
        difficulty: Difficulty,
        message_id: MessageId,
    ) -> CoopResult {
        self.mutate(chat, id, |s| {
            s.expect_organizer(actor.user)?;
            s.expect_stage(Stage::AwaitingDifficulty)?;
            s.difficulty = Some(difficulty);
            self.settings_changed(s, actor.chat, message_id)
        })
    }

    fn settings_changed(&self, s: &mut CoopSession, chat: ChatId, message_id: MessageId) -> CoopResult {
        if s.rounds.is_some() && s.difficulty.is_some() {
            return Ok(self.begin_match(s, chat, message_id));
        }
        let (text, keyboard) = messages::settings_prompt(s, self.settings.max_rounds);
        Ok(vec![
            Directive::EditMessage {
                chat,
                message_id,
                body: EditBody::Text(text),
                buttons: Some(keyboard),
            },
            Directive::ack("Сохранено"),
        ])
    }

    /// Aborts a match that cannot be played and tells every human why.
    fn abort(&self, s: &mut CoopSession, error: QuizError) -> Vec<Directive> {
        s.stage = Stage::Cancelled;
        log_session_event(s.id.as_str(), s.chat.0, "aborted", Some(&error.to_string()));
        let mut out: Vec<Directive> = s
            .targets()
            .into_iter()
            .map(|target| Directive::notice(target, &error))
            .collect();
        out.push(Directive::ack_error(&error));
        out
    }

    fn build_pool(&self, region: &Region) -> Vec<String> {
        let mut rng = self.rng();
        let mut pool = match region {
            Region::World => sample(
                &mut **rng,
                &self.reference.list_countries(None),
                WORLD_SAMPLE_SIZE,
            ),
            Region::Continent(name) => self.reference.list_countries(Some(name.as_str())),
        };
        shuffle(&mut **rng, &mut pool);
        pool
    }

    fn begin_match(&self, s: &mut CoopSession, chat: ChatId, message_id: MessageId) -> Vec<Directive> {
        let region = s.region.clone().unwrap_or(Region::World);
        let pool = self.build_pool(&region);
        if pool.is_empty() {
            return self.abort(s, QuizError::EmptyPool);
        }

        let requested = s.rounds.unwrap_or(0);
        let rounds = requested.min(pool.len() / 2);
        if rounds == 0 {
            return self.abort(
                s,
                QuizError::DataIntegrity(format!(
                    "{} has {} countries, two are needed per round",
                    region.label(),
                    pool.len()
                )),
            );
        }

        s.queue = pool.iter().take(rounds * 2).cloned().collect();
        s.pool = pool;
        s.rounds = Some(rounds);
        s.turn = 0;
        if s.advance_stage(Stage::InProgress).is_err() {
            return vec![Directive::ack_error(&QuizError::StaleAction)];
        }
        log_session_event(
            s.id.as_str(),
            s.chat.0,
            "started",
            Some(&format!("{} rounds, {}", rounds, region.label())),
        );

        let mut out = vec![
            Directive::EditMessage {
                chat,
                message_id,
                body: EditBody::Text(messages::match_started(s)),
                buttons: None,
            },
            Directive::ack("Поехали!"),
        ];
        for target in s.targets() {
            if target != chat {
                out.push(Directive::message(target, messages::match_started(s)));
            }
        }
        out.extend(self.enter_turn(s));
        out
    }

    // ---- InProgress ----

    fn next_question(&self, s: &mut CoopSession) -> Result<Question, QuizError> {
        let subject = s.queue.pop_front().ok_or(QuizError::EmptyPool)?;
        let mut rng = self.rng();
        generate_for(&self.reference, &subject, &s.pool, DirectionChoice::Mixed, &mut **rng)
    }

    /// Announces the current slot: a question for a human, or a delayed
    /// move for a simulated player.
    fn enter_turn(&self, s: &mut CoopSession) -> Vec<Directive> {
        let Some(slot) = s.current_slot() else {
            return self.finish(s);
        };

        let mut out = Vec::new();
        if s.cycle_position() == 0 {
            let team = self.next_question(s);
            let bots = self.next_question(s);
            match (team, bots) {
                (Ok(team), Ok(bots)) => {
                    s.team_question = Some(team);
                    s.bot_question = Some(bots);
                }
                (Err(e), _) | (_, Err(e)) => return self.abort(s, e),
            }
            s.answered.clear();
            s.team_answers.clear();
            s.bot_answers.clear();
            s.team_hit = false;
            s.bot_hit = false;
            out.extend(messages::broadcast(&s.targets(), &messages::round_header(s)));
        }

        let simulated_move = Directive::schedule(
            self.settings.bot_move_delay,
            ScheduledAction::SimulatedMove {
                chat: s.chat,
                session: s.id.clone(),
                turn: s.turn,
            },
        );

        match slot {
            Slot::Human(seat) => {
                let Some(player) = s.players.get(seat) else {
                    return out;
                };
                match (player.kind, player.target, &s.team_question) {
                    (PlayerKind::Human, Some(target), Some(question)) => {
                        let name = player.display_name().to_string();
                        let (text, keyboard) = messages::question(s, question, &name);
                        for other in s.targets() {
                            if other != target {
                                out.push(Directive::message(other, messages::waiting_for(&name)));
                            }
                        }
                        out.push(Directive::with_buttons(target, text, keyboard));
                    }
                    _ => {
                        let name = player.display_name().to_string();
                        out.extend(messages::broadcast(&s.targets(), &messages::waiting_for(&name)));
                        out.push(simulated_move);
                    }
                }
            }
            Slot::Bot(index) => {
                if let Some(bot) = s.bots.get(index) {
                    out.extend(messages::broadcast(&s.targets(), &messages::waiting_for(&bot.name)));
                }
                out.push(simulated_move);
            }
        }
        out
    }

    /// A human answer button.
    pub fn answer(
        &self,
        actor: &Actor,
        chat: ChatId,
        id: &SessionId,
        turn: usize,
        option: usize,
        message_id: MessageId,
    ) -> CoopResult {
        self.mutate(chat, id, |s| {
            if !s.is_enrolled(actor.user) {
                return Err(QuizError::NotInMatch);
            }
            s.expect_stage(Stage::InProgress)?;
            if turn != s.turn {
                return Err(QuizError::StaleAction);
            }
            let seat = match s.current_slot() {
                Some(Slot::Human(seat)) => seat,
                _ => return Err(QuizError::WrongTurn),
            };
            if s.players.get(seat).map(|p| p.id) != Some(actor.user) {
                return Err(QuizError::WrongTurn);
            }
            if s.answered.contains(&actor.user) {
                return Err(QuizError::AlreadyAnswered);
            }
            let question = s.team_question.clone().ok_or(QuizError::StaleAction)?;
            let picked = question
                .options
                .get(option)
                .cloned()
                .ok_or_else(|| QuizError::Validation(format!("option {option} out of range")))?;

            let correct = question.is_correct(option);
            let name = s.players[seat].display_name().to_string();
            s.answered.insert(actor.user);
            s.team_answers.push(AnswerRecord {
                player: name,
                picked: picked.clone(),
                correct,
            });
            if correct {
                *s.tallies.entry(actor.user).or_insert(0) += 1;
                s.team_hit = true;
            }

            let mut out = vec![
                Directive::EditMessage {
                    chat: actor.chat,
                    message_id,
                    body: EditBody::Text(messages::answer_locked(&question, &picked)),
                    buttons: None,
                },
                Directive::ack("Ответ принят"),
            ];
            out.extend(self.complete_slot(s));
            Ok(out)
        })
    }

    /// Picks the answer of a simulated player: correct when the draw falls
    /// below `accuracy`, otherwise one of the wrong options.
    fn simulated_pick(&self, question: &Question, accuracy: f64) -> (String, bool) {
        let mut rng = self.rng();
        if rng.next_f64() < accuracy {
            return (question.answer.clone(), true);
        }
        let wrong: Vec<&String> = question.options.iter().filter(|o| **o != question.answer).collect();
        if wrong.is_empty() {
            return (question.answer.clone(), true);
        }
        let picked = wrong[rng.next_index(wrong.len())].clone();
        (picked, false)
    }

    fn simulated_move(&self, s: &mut CoopSession) -> Vec<Directive> {
        match s.current_slot() {
            Some(Slot::Bot(index)) => {
                let (Some(question), Some(bot)) = (s.bot_question.clone(), s.bots.get(index)) else {
                    return Vec::new();
                };
                let name = bot.name.clone();
                let accuracy = s.difficulty.unwrap_or(Difficulty::Medium).accuracy();
                let (picked, correct) = self.simulated_pick(&question, accuracy);
                if correct {
                    s.bot_hit = true;
                    if let Some(bot) = s.bots.get_mut(index) {
                        bot.correct += 1;
                    }
                }
                s.bot_answers.push(AnswerRecord {
                    player: name,
                    picked,
                    correct,
                });
            }
            Some(Slot::Human(seat)) => {
                let Some(player) = s.players.get(seat) else {
                    return Vec::new();
                };
                if player.kind != PlayerKind::Simulated {
                    return Vec::new();
                }
                let Some(question) = s.team_question.clone() else {
                    return Vec::new();
                };
                let (id, name) = (player.id, player.display_name().to_string());
                let (picked, correct) = self.simulated_pick(&question, accuracy::PARTNER);
                if correct {
                    *s.tallies.entry(id).or_insert(0) += 1;
                    s.team_hit = true;
                }
                s.answered.insert(id);
                s.team_answers.push(AnswerRecord {
                    player: name,
                    picked,
                    correct,
                });
            }
            None => return Vec::new(),
        }
        self.complete_slot(s)
    }

    fn reveal_team(&self, s: &CoopSession) -> Vec<Directive> {
        let Some(question) = &s.team_question else {
            return Vec::new();
        };
        let body = messages::reveal("Ответ команды", question, &s.team_answers, s.team_hit);
        if !s.team_hit {
            return messages::broadcast(&s.targets(), &body);
        }

        let fact = self.facts.static_fact(&question.country);
        let attachment = FactAttachment {
            group: Uuid::new_v4(),
            subject: question.country.clone(),
            body: body.clone(),
            fact: fact.clone(),
        };
        let text = compose_with_fact(&body, &fact);
        s.targets()
            .into_iter()
            .map(|chat| Directive::SendMessage {
                chat,
                text: text.clone(),
                buttons: Some(messages::another_fact_keyboard()),
                fact: Some(attachment.clone()),
            })
            .collect()
    }

    fn reveal_bots(&self, s: &CoopSession) -> Vec<Directive> {
        match &s.bot_question {
            Some(question) => messages::broadcast(
                &s.targets(),
                &messages::reveal("Ответ ботов", question, &s.bot_answers, s.bot_hit),
            ),
            None => Vec::new(),
        }
    }

    /// Closes the current slot: resolves its question if everyone on that
    /// side has answered, then moves the turn pointer on.
    fn complete_slot(&self, s: &mut CoopSession) -> Vec<Directive> {
        let position = s.cycle_position();
        let mut out = Vec::new();

        if let Some(slot) = s.rotation.get(position).copied() {
            if closes_question(&s.rotation, position) {
                if slot.is_human() {
                    s.team_score += u32::from(s.team_hit);
                    out.extend(self.reveal_team(s));
                } else {
                    s.bot_score += u32::from(s.bot_hit);
                    out.extend(self.reveal_bots(s));
                }
                s.resolved += 1;
                out.extend(messages::broadcast(&s.targets(), &messages::scoreboard(s)));
            }
        }

        s.turn += 1;
        if s.turn >= s.total_turns() {
            out.extend(self.finish(s));
        } else if s.cycle_position() == 0 {
            out.push(Directive::schedule(
                self.settings.round_pause,
                ScheduledAction::NextRound {
                    chat: s.chat,
                    session: s.id.clone(),
                    turn: s.turn,
                },
            ));
        } else {
            out.extend(self.enter_turn(s));
        }
        out
    }

    fn finish(&self, s: &mut CoopSession) -> Vec<Directive> {
        if s.advance_stage(Stage::Finished).is_err() {
            return Vec::new();
        }
        log_session_event(
            s.id.as_str(),
            s.chat.0,
            "finished",
            Some(&format!("team {} : bots {}", s.team_score, s.bot_score)),
        );
        messages::broadcast(&s.targets(), &messages::final_result(s))
    }

    /// Fired by the scheduler. Anything that no longer matches the live
    /// session (gone, cancelled, turn moved on) is dropped silently.
    pub fn on_scheduled(&self, action: &ScheduledAction) -> Vec<Directive> {
        let (chat, id, turn) = match action {
            ScheduledAction::SimulatedMove { chat, session, turn }
            | ScheduledAction::NextRound { chat, session, turn } => (*chat, session, *turn),
            ScheduledAction::SprintOver { .. } => return Vec::new(),
        };

        let outcome = self.registry.with_session(chat, id, |s| {
            if s.stage != Stage::InProgress || s.turn != turn {
                return None;
            }
            match action {
                ScheduledAction::SimulatedMove { .. } => Some(self.simulated_move(s)),
                ScheduledAction::NextRound { .. } if s.cycle_position() == 0 => Some(self.enter_turn(s)),
                _ => None,
            }
        });

        match outcome.flatten() {
            Some(directives) => directives,
            None => {
                log_stale_schedule(action.name(), &format!("session {id} turn {turn}"));
                Vec::new()
            }
        }
    }

    // ---- Cancellation ----

    fn cancel_session(&self, s: &mut CoopSession, by: &str) -> CoopResult {
        s.advance_stage(Stage::Cancelled)?;
        log_session_event(s.id.as_str(), s.chat.0, "cancelled", Some(by));
        Ok(messages::broadcast(&s.targets(), &messages::cancelled(by)))
    }

    /// `/quit` and `/cancel`: finds the caller's match in any chat.
    pub fn cancel_by_player(&self, actor: &Actor) -> CoopResult {
        let (chat, session) = self
            .registry
            .find_by_player(actor.user)
            .ok_or(QuizError::NotInMatch)?;
        self.mutate(chat, &session.id, |s| {
            let name = s
                .player(actor.user)
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| actor.name.clone());
            self.cancel_session(s, &name)
        })
    }

    /// The cancel button on the invite or settings message.
    pub fn cancel(&self, actor: &Actor, chat: ChatId, id: &SessionId) -> CoopResult {
        self.mutate(chat, id, |s| {
            let name = s
                .player(actor.user)
                .map(|p| p.display_name().to_string())
                .ok_or(QuizError::NotInMatch)?;
            let mut out = self.cancel_session(s, &name)?;
            out.push(Directive::ack("Матч отменён"));
            Ok(out)
        })
    }
}
