//! Game tuning constants shared by the engines.

/// Maximum number of options in a multiple-choice question.
pub const MAX_OPTIONS: usize = 4;

/// Subjects sampled for an unfiltered ("world") cooperative match.
pub const WORLD_SAMPLE_SIZE: usize = 30;

/// Human seats in a cooperative match.
pub const MAX_HUMAN_PLAYERS: usize = 2;

/// Round counts offered when a match is configured.
pub const ROUND_CHOICES: [usize; 3] = [3, 5, 10];

/// Bot accuracy per difficulty tier.
pub mod accuracy {
    /// Easy bots answer correctly 30% of the time.
    pub const EASY: f64 = 0.3;
    /// Medium bots answer correctly 60% of the time.
    pub const MEDIUM: f64 = 0.6;
    /// Hard bots answer correctly 80% of the time.
    pub const HARD: f64 = 0.8;
    /// The simulated partner enrolled by the admin shortcut.
    pub const PARTNER: f64 = 0.5;
}

/// Display names of the simulated team, one per human-team seat.
pub const BOT_NAMES: [&str; 2] = ["Робо-Колумб", "Робо-Магеллан"];

/// Display name of the simulated partner.
pub const PARTNER_NAME: &str = "Тестовый напарник";

/// Solo test length.
pub const TEST_LENGTH: usize = 10;

/// Flash cards per solo card session.
pub const CARDS_LENGTH: usize = 20;

/// Display name limits.
pub mod names {
    /// Shortest accepted display name.
    pub const MIN_LENGTH: usize = 1;
    /// Longest accepted display name.
    pub const MAX_LENGTH: usize = 32;
}

/// Shown when no cached fact exists for a subject.
pub const FACT_PLACEHOLDER: &str = "Интересные факты об этом месте скоро появятся.";

/// Fact-carrying broadcasts kept pressable; older ones are evicted first.
pub const MAX_TRACKED_FACT_GROUPS: usize = 5_000;

/// Facts kept per subject in the cache; a refresh puts the new one first.
pub const FACTS_PER_SUBJECT: usize = 3;
