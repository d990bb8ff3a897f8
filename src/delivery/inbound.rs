//! Typed inbound actions.
//!
//! Button payloads travel as compact colon-delimited strings (Telegram caps
//! callback data at 64 bytes). They are parsed here, once, into a closed
//! set of variants; anything else is a validation error.

use std::fmt::{self, Display};
use std::str::FromStr;

use teloxide::types::{ChatId, UserId};

use crate::coop::Difficulty;
use crate::error::QuizError;
use crate::quiz::{Direction, DirectionChoice};
use crate::session_id::SessionId;
use crate::solo::SoloMode;
use crate::utils::validation::validate_telegram_chat_id;

/// Who performed an inbound action and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user: UserId,
    /// Telegram first name, used until a display name is chosen.
    pub name: String,
    /// Chat the action came from; private chat for direct play.
    pub chat: ChatId,
}

impl Actor {
    pub fn new(user: UserId, name: impl Into<String>, chat: ChatId) -> Self {
        Self {
            user,
            name: name.into(),
            chat,
        }
    }
}

/// Region filter picked from a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinentChoice {
    World,
    /// Index into the reference continent list.
    Index(usize),
}

/// Cooperative match buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoopButton {
    Join,
    PlayWithoutPartner,
    Continent(ContinentChoice),
    Rounds(usize),
    Difficulty(Difficulty),
    Answer { turn: usize, option: usize },
    Cancel,
}

/// Solo mode buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoloButton {
    Continent {
        mode: SoloMode,
        continent: ContinentChoice,
    },
    Direction {
        mode: SoloMode,
        continent: ContinentChoice,
        direction: DirectionChoice,
    },
    Answer {
        session: SessionId,
        option: usize,
    },
    Reveal { session: SessionId },
    Know { session: SessionId },
    Repeat { session: SessionId },
    Stop { session: SessionId },
}

/// Every button payload the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    Coop {
        chat: ChatId,
        session: SessionId,
        button: CoopButton,
    },
    Solo(SoloButton),
    AnotherFact,
}

fn invalid(data: &str) -> QuizError {
    QuizError::Validation(format!("unrecognized callback data '{data}'"))
}

fn parse_number(part: Option<&str>, data: &str) -> Result<usize, QuizError> {
    part.and_then(|p| p.parse().ok()).ok_or_else(|| invalid(data))
}

fn parse_session(part: Option<&str>, data: &str) -> Result<SessionId, QuizError> {
    part.ok_or_else(|| invalid(data))?.parse()
}

impl Display for ContinentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinentChoice::World => f.write_str("w"),
            ContinentChoice::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for ContinentChoice {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(ContinentChoice::World),
            other => other
                .parse()
                .map(ContinentChoice::Index)
                .map_err(|_| invalid(s)),
        }
    }
}

fn direction_code(direction: DirectionChoice) -> &'static str {
    match direction {
        DirectionChoice::Fixed(Direction::CountryToCapital) => "cc",
        DirectionChoice::Fixed(Direction::CapitalToCountry) => "cp",
        DirectionChoice::Mixed => "mx",
    }
}

fn parse_direction(code: Option<&str>, data: &str) -> Result<DirectionChoice, QuizError> {
    match code {
        Some("cc") => Ok(DirectionChoice::Fixed(Direction::CountryToCapital)),
        Some("cp") => Ok(DirectionChoice::Fixed(Direction::CapitalToCountry)),
        Some("mx") => Ok(DirectionChoice::Mixed),
        _ => Err(invalid(data)),
    }
}

fn parse_mode(code: Option<&str>, data: &str) -> Result<SoloMode, QuizError> {
    code.and_then(SoloMode::from_code).ok_or_else(|| invalid(data))
}

impl Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Coop {
                chat,
                session,
                button,
            } => {
                write!(f, "c:{}:{}:", chat.0, session)?;
                match button {
                    CoopButton::Join => f.write_str("j"),
                    CoopButton::PlayWithoutPartner => f.write_str("p"),
                    CoopButton::Continent(choice) => write!(f, "ct:{choice}"),
                    CoopButton::Rounds(n) => write!(f, "r:{n}"),
                    CoopButton::Difficulty(d) => write!(f, "d:{}", d.code()),
                    CoopButton::Answer { turn, option } => write!(f, "a:{turn}:{option}"),
                    CoopButton::Cancel => f.write_str("x"),
                }
            }
            CallbackData::Solo(button) => match button {
                SoloButton::Continent { mode, continent } => {
                    write!(f, "s:m:{}:{continent}", mode.code())
                }
                SoloButton::Direction {
                    mode,
                    continent,
                    direction,
                } => write!(
                    f,
                    "s:d:{}:{continent}:{}",
                    mode.code(),
                    direction_code(*direction)
                ),
                SoloButton::Answer { session, option } => write!(f, "s:a:{session}:{option}"),
                SoloButton::Reveal { session } => write!(f, "s:v:{session}"),
                SoloButton::Know { session } => write!(f, "s:k:{session}"),
                SoloButton::Repeat { session } => write!(f, "s:r:{session}"),
                SoloButton::Stop { session } => write!(f, "s:q:{session}"),
            },
            CallbackData::AnotherFact => f.write_str("fx"),
        }
    }
}

impl FromStr for CallbackData {
    type Err = QuizError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut parts = data.split(':');
        let parsed = match parts.next() {
            Some("fx") => CallbackData::AnotherFact,
            Some("c") => {
                let chat: i64 = parts
                    .next()
                    .and_then(|p| p.parse().ok())
                    .ok_or_else(|| invalid(data))?;
                validate_telegram_chat_id(chat).map_err(|_| invalid(data))?;
                let session = parse_session(parts.next(), data)?;
                let button = match parts.next() {
                    Some("j") => CoopButton::Join,
                    Some("p") => CoopButton::PlayWithoutPartner,
                    Some("x") => CoopButton::Cancel,
                    Some("ct") => CoopButton::Continent(parts.next().ok_or_else(|| invalid(data))?.parse()?),
                    Some("r") => CoopButton::Rounds(parse_number(parts.next(), data)?),
                    Some("d") => CoopButton::Difficulty(
                        parts
                            .next()
                            .and_then(Difficulty::from_code)
                            .ok_or_else(|| invalid(data))?,
                    ),
                    Some("a") => CoopButton::Answer {
                        turn: parse_number(parts.next(), data)?,
                        option: parse_number(parts.next(), data)?,
                    },
                    _ => return Err(invalid(data)),
                };
                CallbackData::Coop {
                    chat: ChatId(chat),
                    session,
                    button,
                }
            }
            Some("s") => {
                let button = match parts.next() {
                    Some("m") => SoloButton::Continent {
                        mode: parse_mode(parts.next(), data)?,
                        continent: parts.next().ok_or_else(|| invalid(data))?.parse()?,
                    },
                    Some("d") => SoloButton::Direction {
                        mode: parse_mode(parts.next(), data)?,
                        continent: parts.next().ok_or_else(|| invalid(data))?.parse()?,
                        direction: parse_direction(parts.next(), data)?,
                    },
                    Some("a") => SoloButton::Answer {
                        session: parse_session(parts.next(), data)?,
                        option: parse_number(parts.next(), data)?,
                    },
                    Some("v") => SoloButton::Reveal {
                        session: parse_session(parts.next(), data)?,
                    },
                    Some("k") => SoloButton::Know {
                        session: parse_session(parts.next(), data)?,
                    },
                    Some("r") => SoloButton::Repeat {
                        session: parse_session(parts.next(), data)?,
                    },
                    Some("q") => SoloButton::Stop {
                        session: parse_session(parts.next(), data)?,
                    },
                    _ => return Err(invalid(data)),
                };
                CallbackData::Solo(button)
            }
            _ => return Err(invalid(data)),
        };

        if parts.next().is_some() {
            return Err(invalid(data));
        }
        Ok(parsed)
    }
}

/// Deep-link payloads accepted by `/start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartPayload {
    /// `coop_<chat>_<session>`: join an existing match.
    Join { chat: ChatId, session: SessionId },
    /// `coop-<n>`: open a new match with continent `n` preselected.
    NewMatch { continent: ContinentChoice },
}

impl StartPayload {
    pub fn join_link(chat: ChatId, session: &SessionId) -> String {
        format!("coop_{}_{}", chat.0, session)
    }

    pub fn parse(payload: &str) -> Result<Option<Self>, QuizError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Ok(None);
        }
        if let Some(rest) = payload.strip_prefix("coop_") {
            let (chat, session) = rest
                .rsplit_once('_')
                .ok_or_else(|| QuizError::Validation(format!("bad join link '{payload}'")))?;
            let chat: i64 = chat
                .parse()
                .map_err(|_| QuizError::Validation(format!("bad join link '{payload}'")))?;
            return Ok(Some(StartPayload::Join {
                chat: ChatId(chat),
                session: session.parse()?,
            }));
        }
        if let Some(rest) = payload.strip_prefix("coop-") {
            return Ok(Some(StartPayload::NewMatch {
                continent: rest.parse()?,
            }));
        }
        Err(QuizError::Validation(format!("unknown start payload '{payload}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid() -> SessionId {
        "a1b2c3d4".parse().unwrap()
    }

    #[test]
    fn test_answer_button_encoding() {
        let data = CallbackData::Coop {
            chat: ChatId(-1001234567890),
            session: sid(),
            button: CoopButton::Answer { turn: 12, option: 3 },
        };
        let encoded = data.to_string();
        assert_eq!(encoded, "c:-1001234567890:a1b2c3d4:a:12:3");
        assert!(encoded.len() <= 64);
        assert_eq!(encoded.parse::<CallbackData>().unwrap(), data);
    }

    #[test]
    fn test_solo_direction_button_parses() {
        let parsed: CallbackData = "s:d:t:2:cp".parse().unwrap();
        assert_eq!(
            parsed,
            CallbackData::Solo(SoloButton::Direction {
                mode: SoloMode::Test,
                continent: ContinentChoice::Index(2),
                direction: DirectionChoice::Fixed(Direction::CapitalToCountry),
            })
        );
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        for data in [
            "",
            "zz",
            "c:abc:a1b2c3d4:j",
            "c:0:a1b2c3d4:j",
            "c:42:NOPE:j",
            "c:42:a1b2c3d4:a:1",
            "c:42:a1b2c3d4:d:impossible",
            "c:42:a1b2c3d4:j:extra",
            "s:a:a1b2c3d4:x",
            "s:m:z:w",
            "fx:1",
        ] {
            let err = data.parse::<CallbackData>().unwrap_err();
            assert!(matches!(err, QuizError::Validation(_)), "{data} should fail");
        }
    }

    #[test]
    fn test_start_payloads() {
        assert_eq!(StartPayload::parse("").unwrap(), None);
        assert_eq!(
            StartPayload::parse("coop_-100123_a1b2c3d4").unwrap(),
            Some(StartPayload::Join {
                chat: ChatId(-100123),
                session: sid()
            })
        );
        assert_eq!(
            StartPayload::parse("coop-w").unwrap(),
            Some(StartPayload::NewMatch {
                continent: ContinentChoice::World
            })
        );
        assert!(StartPayload::parse("hello").is_err());
        assert_eq!(
            StartPayload::join_link(ChatId(77), &sid()),
            "coop_77_a1b2c3d4"
        );
    }
}
