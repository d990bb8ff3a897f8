use std::collections::{HashMap, HashSet, VecDeque};

use teloxide::types::{ChatId, UserId};

use crate::constants::{accuracy, BOT_NAMES, PARTNER_NAME};
use crate::coop::turns::{build_rotation, Slot};
use crate::delivery::Actor;
use crate::error::QuizError;
use crate::quiz::Question;
use crate::session_id::SessionId;

/// Lifecycle of a cooperative match. Transitions only move forward;
/// `Cancelled` is reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    AwaitingJoin,
    AwaitingNames,
    AwaitingContinent,
    AwaitingDifficulty,
    InProgress,
    Finished,
    Cancelled,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Finished | Stage::Cancelled)
    }
}

/// Bot difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Probability that a bot persona answers correctly.
    pub fn accuracy(self) -> f64 {
        match self {
            Difficulty::Easy => accuracy::EASY,
            Difficulty::Medium => accuracy::MEDIUM,
            Difficulty::Hard => accuracy::HARD,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "e",
            Difficulty::Medium => "m",
            Difficulty::Hard => "h",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "e" => Some(Difficulty::Easy),
            "m" => Some(Difficulty::Medium),
            "h" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Лёгкие боты",
            Difficulty::Medium => "Средние боты",
            Difficulty::Hard => "Сильные боты",
        }
    }
}

/// Question filter of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    World,
    Continent(String),
}

impl Region {
    pub fn label(&self) -> &str {
        match self {
            Region::World => "Весь мир",
            Region::Continent(name) => name,
        }
    }

    pub fn continent(&self) -> Option<&str> {
        match self {
            Region::World => None,
            Region::Continent(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    /// Partner enrolled by the admin shortcut; answers by a draw.
    Simulated,
}

/// A member of the human team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: UserId,
    /// Chosen display name; `None` until submitted.
    pub name: Option<String>,
    /// Telegram first name, shown while no display name is set.
    pub telegram_name: String,
    /// Where this player's messages go. Simulated partners have none.
    pub target: Option<ChatId>,
    pub kind: PlayerKind,
}

impl Player {
    pub fn human(actor: &Actor) -> Self {
        Self {
            id: actor.user,
            name: None,
            telegram_name: actor.name.clone(),
            target: Some(actor.chat),
            kind: PlayerKind::Human,
        }
    }

    pub fn simulated_partner() -> Self {
        Self {
            id: UserId(0),
            name: Some(PARTNER_NAME.to_string()),
            telegram_name: PARTNER_NAME.to_string(),
            target: None,
            kind: PlayerKind::Simulated,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.telegram_name)
    }

    pub fn is_human(&self) -> bool {
        self.kind == PlayerKind::Human
    }
}

/// One simulated-team member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotPersona {
    pub name: String,
    pub correct: u32,
}

/// How one human-team member did on the current team question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub player: String,
    pub picked: String,
    pub correct: bool,
}

/// State of one cooperative match.
#[derive(Debug, Clone)]
pub struct CoopSession {
    pub id: SessionId,
    /// Chat the match was created from; the registry key.
    pub chat: ChatId,
    pub organizer: UserId,
    pub players: Vec<Player>,
    pub bots: Vec<BotPersona>,
    /// `None` until the organizer picks one (or it was preset).
    pub region: Option<Region>,
    pub difficulty: Option<Difficulty>,
    /// Requested round count, bounded by the pool once the match starts.
    pub rounds: Option<usize>,
    pub pool: Vec<String>,
    pub queue: VecDeque<String>,
    pub rotation: Vec<Slot>,
    /// Absolute index into the turn sequence.
    pub turn: usize,
    pub team_question: Option<Question>,
    pub bot_question: Option<Question>,
    /// Humans who already answered the current team question.
    pub answered: HashSet<UserId>,
    pub team_answers: Vec<AnswerRecord>,
    pub bot_answers: Vec<AnswerRecord>,
    pub team_hit: bool,
    pub bot_hit: bool,
    /// Individual correct answers per human-team member.
    pub tallies: HashMap<UserId, u32>,
    pub team_score: u32,
    pub bot_score: u32,
    pub resolved: usize,
    pub stage: Stage,
}

impl CoopSession {
    pub fn new(id: SessionId, chat: ChatId, organizer: Player) -> Self {
        Self {
            id,
            chat,
            organizer: organizer.id,
            players: vec![organizer],
            bots: Vec::new(),
            region: None,
            difficulty: None,
            rounds: None,
            pool: Vec::new(),
            queue: VecDeque::new(),
            rotation: Vec::new(),
            turn: 0,
            team_question: None,
            bot_question: None,
            answered: HashSet::new(),
            team_answers: Vec::new(),
            bot_answers: Vec::new(),
            team_hit: false,
            bot_hit: false,
            tallies: HashMap::new(),
            team_score: 0,
            bot_score: 0,
            resolved: 0,
            stage: Stage::AwaitingJoin,
        }
    }

    /// Moves to `next`, refusing to go backwards or leave a terminal stage.
    pub fn advance_stage(&mut self, next: Stage) -> Result<(), QuizError> {
        if self.stage.is_terminal() || (next <= self.stage && next != Stage::Cancelled) {
            return Err(QuizError::StaleAction);
        }
        self.stage = next;
        Ok(())
    }

    pub fn expect_stage(&self, stage: Stage) -> Result<(), QuizError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(QuizError::StaleAction)
        }
    }

    pub fn expect_organizer(&self, user: UserId) -> Result<(), QuizError> {
        if self.organizer == user {
            Ok(())
        } else if self.is_enrolled(user) {
            Err(QuizError::NotOrganizer)
        } else {
            Err(QuizError::NotInMatch)
        }
    }

    pub fn is_enrolled(&self, user: UserId) -> bool {
        self.players.iter().any(|p| p.is_human() && p.id == user)
    }

    pub fn player(&self, user: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.is_human() && p.id == user)
    }

    pub fn player_mut(&mut self, user: UserId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.is_human() && p.id == user)
    }

    /// Delivery chats of every human player, each chat once.
    pub fn targets(&self) -> Vec<ChatId> {
        let mut targets = Vec::with_capacity(self.players.len());
        for target in self.players.iter().filter_map(|p| p.target) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    pub fn all_named(&self) -> bool {
        self.players.iter().all(|p| p.name.is_some())
    }

    /// Fixes the roster: one bot persona per seat and the turn rotation.
    pub fn seal_roster(&mut self) {
        self.bots = BOT_NAMES
            .iter()
            .cycle()
            .take(self.players.len())
            .map(|name| BotPersona {
                name: (*name).to_string(),
                correct: 0,
            })
            .collect();
        self.rotation = build_rotation(self.players.len());
    }

    pub fn total_turns(&self) -> usize {
        self.rotation.len() * self.rounds.unwrap_or(0)
    }

    /// Position of the current turn within the rotation cycle.
    pub fn cycle_position(&self) -> usize {
        if self.rotation.is_empty() {
            0
        } else {
            self.turn % self.rotation.len()
        }
    }

    pub fn current_round(&self) -> usize {
        if self.rotation.is_empty() {
            0
        } else {
            self.turn / self.rotation.len() + 1
        }
    }

    pub fn current_slot(&self) -> Option<Slot> {
        if self.stage != Stage::InProgress || self.turn >= self.total_turns() {
            return None;
        }
        self.rotation.get(self.cycle_position()).copied()
    }

    /// Questions per match: one for the team and one for the bots per round.
    pub fn total_questions(&self) -> usize {
        self.rounds.unwrap_or(0) * 2
    }

    pub fn remaining_questions(&self) -> usize {
        self.total_questions().saturating_sub(self.resolved)
    }

    pub fn tally(&self, user: UserId) -> u32 {
        self.tallies.get(&user).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: u64) -> Actor {
        Actor::new(UserId(id), format!("user{id}"), ChatId(id as i64))
    }

    fn session() -> CoopSession {
        CoopSession::new("a1b2c3d4".parse().unwrap(), ChatId(1), Player::human(&actor(1)))
    }

    #[test]
    fn test_stages_only_move_forward() {
        let mut s = session();
        assert!(s.advance_stage(Stage::AwaitingNames).is_ok());
        assert!(s.advance_stage(Stage::AwaitingJoin).is_err());
        assert!(s.advance_stage(Stage::AwaitingNames).is_err());
        assert!(s.advance_stage(Stage::AwaitingDifficulty).is_ok());
        assert!(s.advance_stage(Stage::Cancelled).is_ok());
        assert!(s.advance_stage(Stage::InProgress).is_err());
        assert!(s.advance_stage(Stage::Cancelled).is_err());
    }

    #[test]
    fn test_roster_mirrors_human_team() {
        let mut s = session();
        s.players.push(Player::human(&actor(2)));
        s.seal_roster();
        assert_eq!(s.bots.len(), 2);
        assert_eq!(s.rotation.len(), 4);
        s.rounds = Some(3);
        assert_eq!(s.total_turns(), 12);
        assert_eq!(s.total_questions(), 6);
    }

    #[test]
    fn test_simulated_partner_is_not_enrolled_as_human() {
        let mut s = session();
        s.players.push(Player::simulated_partner());
        assert!(!s.is_enrolled(UserId(0)));
        assert_eq!(s.targets(), vec![ChatId(1)]);
        assert!(!s.all_named());
        s.players[0].name = Some("Аня".into());
        assert!(s.all_named());
    }

    #[test]
    fn test_organizer_checks() {
        let mut s = session();
        s.players.push(Player::human(&actor(2)));
        assert!(s.expect_organizer(UserId(1)).is_ok());
        assert_eq!(s.expect_organizer(UserId(2)), Err(QuizError::NotOrganizer));
        assert_eq!(s.expect_organizer(UserId(3)), Err(QuizError::NotInMatch));
    }
}
