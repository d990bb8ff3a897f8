//! Turn rotation for cooperative matches.
//!
//! One rotation cycle is one round. Human seats and bot personas alternate,
//! so two humans give `[H1, S1, H2, S2]` and a single human gives `[H, S]`.

/// One responder position in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Index into the session's player list.
    Human(usize),
    /// Index into the session's bot personas.
    Bot(usize),
}

impl Slot {
    pub fn is_human(self) -> bool {
        matches!(self, Slot::Human(_))
    }
}

/// Builds the rotation for `seats` human-team members; the simulated team
/// mirrors the human team with one persona per seat.
pub fn build_rotation(seats: usize) -> Vec<Slot> {
    (0..seats)
        .flat_map(|seat| [Slot::Human(seat), Slot::Bot(seat)])
        .collect()
}

/// Full turn sequence for a match of `rounds` rounds.
pub fn turn_sequence(rotation: &[Slot], rounds: usize) -> Vec<Slot> {
    rotation
        .iter()
        .copied()
        .cycle()
        .take(rotation.len() * rounds)
        .collect()
}

/// Whether the slot at `pos` is the last one of its side within the cycle,
/// i.e. everyone who needs to answer that side's question has answered.
pub fn closes_question(rotation: &[Slot], pos: usize) -> bool {
    let Some(slot) = rotation.get(pos) else {
        return false;
    };
    !rotation[pos + 1..]
        .iter()
        .any(|later| later.is_human() == slot.is_human())
}

#[cfg(test)]
mod tests {
    use super::*;
    use Slot::{Bot, Human};

    #[test]
    fn test_two_humans_rotation() {
        assert_eq!(build_rotation(2), vec![Human(0), Bot(0), Human(1), Bot(1)]);
    }

    #[test]
    fn test_single_human_alternates_with_bot() {
        let sequence = turn_sequence(&build_rotation(1), 3);
        assert_eq!(sequence, vec![Human(0), Bot(0), Human(0), Bot(0), Human(0), Bot(0)]);
    }

    #[test]
    fn test_three_rounds_with_two_humans() {
        let sequence = turn_sequence(&build_rotation(2), 3);
        assert_eq!(
            sequence,
            vec![
                Human(0), Bot(0), Human(1), Bot(1),
                Human(0), Bot(0), Human(1), Bot(1),
                Human(0), Bot(0), Human(1), Bot(1),
            ]
        );
    }

    #[test]
    fn test_closing_slots() {
        let rotation = build_rotation(2);
        assert!(!closes_question(&rotation, 0));
        assert!(!closes_question(&rotation, 1));
        assert!(closes_question(&rotation, 2));
        assert!(closes_question(&rotation, 3));
        assert!(!closes_question(&rotation, 4));

        let solo = build_rotation(1);
        assert!(closes_question(&solo, 0));
        assert!(closes_question(&solo, 1));
    }
}
