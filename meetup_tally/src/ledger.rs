//! The vote ledger and the submission of votes.
//!
//! The ledger is an external, append-only store. It is passed explicitly to
//! the functions that need it, so that any backend (a file, a spreadsheet, an
//! in-memory list for tests) can be used.

use std::convert::Infallible;
use std::fmt::Display;

use log::{debug, info, warn};

use crate::config::*;
use crate::identity::AllowList;
use crate::{compute_standings, normalize_text};

/// An append-only store of raw vote rows.
pub trait Ledger {
    type Error: std::error::Error;

    /// Appends one row. The row is never modified afterwards.
    fn append(&mut self, row: &RawVoteRow) -> Result<(), Self::Error>;

    /// Reads all the rows, in the order they were appended.
    fn read_all(&self) -> Result<Vec<RawVoteRow>, Self::Error>;
}

/// A ledger that lives in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryLedger {
    rows: Vec<RawVoteRow>,
}

impl MemoryLedger {
    pub fn new() -> MemoryLedger {
        MemoryLedger::default()
    }

    pub fn with_rows(rows: Vec<RawVoteRow>) -> MemoryLedger {
        MemoryLedger { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Ledger for MemoryLedger {
    type Error = Infallible;

    fn append(&mut self, row: &RawVoteRow) -> Result<(), Infallible> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<RawVoteRow>, Infallible> {
        Ok(self.rows.clone())
    }
}

/// The reasons a vote is refused before reaching the ledger.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Rejection {
    /// No name was entered.
    MissingName,
    /// The name is not on the allow-list.
    UnknownVoter(String),
    /// The choice is not one of the options of the ballot.
    UnknownChoice(String),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::MissingName => write!(f, "please enter your name before voting"),
            Rejection::UnknownVoter(name) => write!(
                f,
                "{} is not on the list of voters, please contact the organizer",
                name
            ),
            Rejection::UnknownChoice(choice) => {
                write!(f, "{:?} is not one of the options of this ballot", choice)
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Submission {
    /// The vote was appended to the ledger as this row.
    Accepted(RawVoteRow),
    Rejected(Rejection),
}

/// Checks a vote and appends it to the ledger.
///
/// A refused vote is not an error: it is returned as `Submission::Rejected`
/// and the ledger is left untouched. Only the failures of the ledger itself
/// are errors.
///
/// Nothing prevents the same person from voting several times: every
/// accepted submission adds a row.
pub fn submit_vote<L: Ledger>(
    ledger: &mut L,
    allow_list: &AllowList,
    ballot: &Ballot,
    name: &str,
    choice: &str,
) -> Result<Submission, L::Error> {
    let name = name.trim();
    if name.is_empty() {
        warn!("submit_vote: {}: missing name", ballot.ballot_type);
        return Ok(Submission::Rejected(Rejection::MissingName));
    }
    if !allow_list.is_allowed(name) {
        warn!("submit_vote: {}: unknown voter {:?}", ballot.ballot_type, name);
        return Ok(Submission::Rejected(Rejection::UnknownVoter(
            name.to_string(),
        )));
    }
    let key = normalize_text(choice);
    let option = match ballot.options.iter().find(|o| normalize_text(o) == key) {
        Some(o) => o,
        None => {
            warn!(
                "submit_vote: {}: unknown choice {:?}",
                ballot.ballot_type, choice
            );
            return Ok(Submission::Rejected(Rejection::UnknownChoice(
                choice.to_string(),
            )));
        }
    };

    // The vote is stored lowercased, the way it will be compared.
    let row = RawVoteRow::new(name, ballot.ballot_type.ledger_label(), &normalize_text(option));
    debug!("submit_vote: appending {:?}", row);
    ledger.append(&row)?;
    info!("submit_vote: {} voted on {}", name, ballot.ballot_type);
    Ok(Submission::Accepted(row))
}

/// Reads the whole ledger and computes the standings of all the ballots.
pub fn refresh_standings<L: Ledger>(
    ledger: &L,
    allow_list: &AllowList,
    ballots: &[Ballot],
) -> Result<Standings, L::Error> {
    let rows = ledger.read_all()?;
    Ok(compute_standings(&rows, allow_list, ballots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unreachable;

    impl std::error::Error for Unreachable {}

    impl Display for Unreachable {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "ledger unreachable")
        }
    }

    struct BrokenLedger;

    impl Ledger for BrokenLedger {
        type Error = Unreachable;

        fn append(&mut self, _row: &RawVoteRow) -> Result<(), Unreachable> {
            Err(Unreachable)
        }

        fn read_all(&self) -> Result<Vec<RawVoteRow>, Unreachable> {
            Err(Unreachable)
        }
    }

    #[test]
    fn accepted_vote_is_appended() {
        let mut ledger = MemoryLedger::new();
        let al = AllowList::default_roster();
        let res = submit_vote(
            &mut ledger,
            &al,
            &Ballot::route(),
            " Annie Yao ",
            "Trailhead Route 登山口路線",
        )
        .unwrap();
        let expected = RawVoteRow::new("Annie Yao", "Route", "trailhead route 登山口路線");
        assert_eq!(res, Submission::Accepted(expected.clone()));
        assert_eq!(ledger.read_all().unwrap(), vec![expected]);

        let s = refresh_standings(&ledger, &al, &Ballot::defaults()).unwrap();
        let route = s.tally_for(BallotType::Route).unwrap();
        assert_eq!(route.count_of("trailhead route 登山口路線"), Some(1));
        assert_eq!(route.count_of("songde route 松德路線"), Some(0));
        assert_eq!(route.count_of("lingyin trail 靈隱寺象山步道"), Some(0));
    }

    #[test]
    fn unknown_voter_is_rejected() {
        let al = AllowList::default_roster();
        let mut ledger = MemoryLedger::with_rows(vec![RawVoteRow::new(
            "Lily Wang",
            "TeamName",
            "shohei blowtani",
        )]);
        let before = refresh_standings(&ledger, &al, &Ballot::defaults()).unwrap();
        let res = submit_vote(
            &mut ledger,
            &al,
            &Ballot::team_name(),
            "Unknown Person",
            "Shohei Blowtani",
        )
        .unwrap();
        assert_eq!(
            res,
            Submission::Rejected(Rejection::UnknownVoter("Unknown Person".to_string()))
        );
        assert_eq!(ledger.len(), 1);
        let after = refresh_standings(&ledger, &al, &Ballot::defaults()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut ledger = MemoryLedger::new();
        let res = submit_vote(
            &mut ledger,
            &AllowList::default_roster(),
            &Ballot::route(),
            "   ",
            "Songde Route 松德路線",
        )
        .unwrap();
        assert_eq!(res, Submission::Rejected(Rejection::MissingName));
        assert!(ledger.is_empty());
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let mut ledger = MemoryLedger::new();
        let res = submit_vote(
            &mut ledger,
            &AllowList::default_roster(),
            &Ballot::route(),
            "Max Chen",
            "Elevator",
        )
        .unwrap();
        assert_eq!(
            res,
            Submission::Rejected(Rejection::UnknownChoice("Elevator".to_string()))
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn repeated_votes_all_count() {
        let mut ledger = MemoryLedger::new();
        let al = AllowList::default_roster();
        for _ in 0..3 {
            submit_vote(&mut ledger, &al, &Ballot::team_name(), "JC Khoo", "blowtani 八八八八八")
                .unwrap();
        }
        let s = refresh_standings(&ledger, &al, &Ballot::defaults()).unwrap();
        let team = s.tally_for(BallotType::TeamName).unwrap();
        assert_eq!(team.count_of("Blowtani 八八八八八"), Some(3));
    }

    #[test]
    fn ledger_failures_are_errors() {
        let al = AllowList::default_roster();
        let res = submit_vote(
            &mut BrokenLedger,
            &al,
            &Ballot::route(),
            "Chris Wu",
            "Songde Route 松德路線",
        );
        assert!(res.is_err());
        assert!(refresh_standings(&BrokenLedger, &al, &Ballot::defaults()).is_err());
    }

    #[test]
    fn rejected_names_never_reach_the_ledger() {
        let res = submit_vote(
            &mut BrokenLedger,
            &AllowList::default_roster(),
            &Ballot::route(),
            "Unknown Person",
            "Songde Route 松德路線",
        );
        assert!(matches!(
            res,
            Ok(Submission::Rejected(Rejection::UnknownVoter(_)))
        ));
    }
}
