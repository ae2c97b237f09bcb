pub use crate::config::*;
use crate::identity::AllowList;

/// A builder for computing standings from raw rows.
///
/// ```
/// pub use meetup_tally::builder::Builder;
/// pub use meetup_tally::{AllowList, Ballot, BallotType};
///
/// let standings = Builder::new(&AllowList::default_roster())
///     .ballots(&[Ballot::route()])
///     .add_vote("Annie Yao", "Route", "trailhead route 登山口路線")
///     .add_vote("Jill Yu", "route", "Songde Route 松德路線 ")
///     .build();
///
/// let route = standings.tally_for(BallotType::Route).unwrap();
/// assert_eq!(route.total(), 2);
/// ```
pub struct Builder {
    pub(crate) _allow_list: AllowList,
    pub(crate) _ballots: Vec<Ballot>,
    pub(crate) _rows: Vec<RawVoteRow>,
}

impl Builder {
    /// Starts with both default ballots and no vote.
    pub fn new(allow_list: &AllowList) -> Builder {
        Builder {
            _allow_list: allow_list.clone(),
            _ballots: Ballot::defaults(),
            _rows: Vec::new(),
        }
    }

    pub fn ballots(self, ballots: &[Ballot]) -> Builder {
        Builder {
            _ballots: ballots.to_vec(),
            ..self
        }
    }

    /// Adds a complete vote.
    pub fn add_vote(self, name: &str, ballot_type: &str, choice: &str) -> Builder {
        self.add_row(RawVoteRow::new(name, ballot_type, choice))
    }

    /// Adds a row as read from a ledger, possibly with missing columns.
    pub fn add_row(mut self, row: RawVoteRow) -> Builder {
        self._rows.push(row);
        self
    }

    pub fn build(&self) -> Standings {
        crate::compute_standings(&self._rows, &self._allow_list, &self._ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let s = Builder::new(&AllowList::default_roster())
            .add_vote("Danny Lim", "TeamName", "八八八 i'm lovin' it")
            .add_row(RawVoteRow {
                name: Some("Danny Lim".to_string()),
                ballot_type: None,
                choice: Some("shohei blowtani".to_string()),
            })
            .build();
        assert_eq!(s.tallies.len(), 2);
        assert_eq!(s.malformed, 1);
        let team = s.tally_for(BallotType::TeamName).unwrap();
        assert_eq!(team.count_of("八八八 I'm lovin' it"), Some(1));
    }
}
