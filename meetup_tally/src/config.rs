// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A vote, as stored in the ledger.
///
/// The ledger is a loosely structured table: any of the columns may be missing
/// or empty. The readers keep this information instead of guessing a value.
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash)]
pub struct RawVoteRow {
    pub name: Option<String>,
    pub ballot_type: Option<String>,
    pub choice: Option<String>,
}

impl RawVoteRow {
    pub fn new(name: &str, ballot_type: &str, choice: &str) -> RawVoteRow {
        RawVoteRow {
            name: Some(name.to_string()),
            ballot_type: Some(ballot_type.to_string()),
            choice: Some(choice.to_string()),
        }
    }
}

/// A vote after trimming and lowercasing each of its columns.
///
/// Missing columns are represented by the empty string.
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash)]
pub struct NormalizedVote {
    pub name: String,
    pub ballot_type: String,
    pub choice: String,
}

impl NormalizedVote {
    /// A vote with an empty column cannot be attributed and is quarantined.
    pub fn is_well_formed(&self) -> bool {
        !(self.name.is_empty() || self.ballot_type.is_empty() || self.choice.is_empty())
    }
}

impl From<NormalizedVote> for RawVoteRow {
    fn from(v: NormalizedVote) -> RawVoteRow {
        RawVoteRow {
            name: Some(v.name),
            ballot_type: Some(v.ballot_type),
            choice: Some(v.choice),
        }
    }
}

/// The two independent ballots of the meetup.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum BallotType {
    Route,
    TeamName,
}

impl BallotType {
    pub const ALL: [BallotType; 2] = [BallotType::Route, BallotType::TeamName];

    /// The label written in the `type` column when appending to the ledger.
    pub fn ledger_label(&self) -> &'static str {
        match self {
            BallotType::Route => "Route",
            BallotType::TeamName => "TeamName",
        }
    }

    /// The normalized label, as found in the ledger after normalization.
    pub fn key(&self) -> &'static str {
        match self {
            BallotType::Route => "route",
            BallotType::TeamName => "teamname",
        }
    }

    /// Parses a ballot type, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<BallotType> {
        let k = s.trim().to_lowercase();
        BallotType::ALL.iter().find(|bt| bt.key() == k).cloned()
    }
}

impl Display for BallotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A ballot: its type and the ordered list of options that can be picked.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub ballot_type: BallotType,
    pub title: String,
    pub options: Vec<String>,
}

impl Ballot {
    pub fn route() -> Ballot {
        Ballot {
            ballot_type: BallotType::Route,
            title: "Route Voting｜路線票選".to_string(),
            options: ROUTE_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn team_name() -> Ballot {
        Ballot {
            ballot_type: BallotType::TeamName,
            title: "Team Name Voting｜隊名票選".to_string(),
            options: TEAM_NAME_OPTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn defaults() -> Vec<Ballot> {
        vec![Ballot::route(), Ballot::team_name()]
    }
}

/// An entry of the step challenge roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterEntry {
    pub name: String,
    pub recorded_steps: u64,
}

/// The fixed numbers of the step challenge.
#[derive(PartialEq, Debug, Clone)]
pub struct ChallengeParameters {
    /// The maximum team bonus for hiking Xiangshan.
    pub xiangshan_bonus: u64,
    /// The current team step count used by the bonus table.
    pub total_steps: u64,
    /// The average of the leading team.
    pub target_avg: u64,
    pub team_size: u32,
    /// Below this number of hikers, the bonus does not count.
    pub min_participants: u32,
    /// The maximum number of extra steps a single person can walk.
    pub per_person_limit: u64,
    /// Individual step counts are clamped to this value.
    pub step_cap: u64,
}

impl ChallengeParameters {
    pub const DEFAULT: ChallengeParameters = ChallengeParameters {
        xiangshan_bonus: 55_000,
        total_steps: 1_146_027,
        target_avg: 175_348,
        team_size: 12,
        min_participants: 5,
        per_person_limit: 200_000,
        step_cap: 100_000,
    };

    /// The step count of the leading team, scaled to our team size. `None` if
    /// it does not fit in a signed 64-bit step count.
    pub fn target_total(&self) -> Option<u64> {
        self.target_avg
            .checked_mul(self.team_size as u64)
            .filter(|t| i64::try_from(*t).is_ok())
    }
}

// ******** Output data structures *********

/// The vote counts for one ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TallyResult {
    pub ballot_type: String,
    /// One entry per option, in the order of the options.
    pub counts: Vec<(String, u64)>,
    /// Votes of this type whose choice does not match any option.
    pub unrecognized: u64,
}

impl TallyResult {
    /// The number of votes counted for the options.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    /// The count of an option. The option is matched after normalization.
    pub fn count_of(&self, option: &str) -> Option<u64> {
        let key = crate::normalize_text(option);
        self.counts
            .iter()
            .find(|(o, _)| crate::normalize_text(o) == key)
            .map(|(_, c)| *c)
    }

    /// The options with the highest non-zero count, in option order.
    pub fn leaders(&self) -> Vec<&str> {
        let max = self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        if max == 0 {
            return vec![];
        }
        self.counts
            .iter()
            .filter(|(_, c)| *c == max)
            .map(|(o, _)| o.as_str())
            .collect()
    }
}

/// The current standings of all the ballots, computed from a full read of the ledger.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Standings {
    pub tallies: Vec<TallyResult>,
    /// Number of rows read from the ledger.
    pub total_rows: usize,
    /// Rows with a missing name, type or vote.
    pub malformed: usize,
    /// Rows from a voter who is not on the allow-list.
    pub unlisted: usize,
}

impl Standings {
    pub fn tally_for(&self, ballot_type: BallotType) -> Option<&TallyResult> {
        self.tallies
            .iter()
            .find(|t| t.ballot_type == ballot_type.key())
    }
}

/// One row of the Xiangshan bonus table.
#[derive(PartialEq, Debug, Clone)]
pub struct BonusRow {
    pub participants: u32,
    pub effective_bonus: f64,
    pub remaining_steps: f64,
    pub per_person: f64,
    pub feasible: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TargetShare {
    pub name: String,
    pub recorded_steps: u64,
    pub capped_steps: u64,
    pub target_share: f64,
}

/// The distribution of the remaining steps across the roster.
#[derive(PartialEq, Debug, Clone)]
pub struct ShareTable {
    pub shares: Vec<TargetShare>,
    pub capped_total: u64,
    pub target_total: u64,
    /// May be negative if the team is already above the target.
    pub remaining: i64,
}

impl ShareTable {
    /// The extra steps per person if the remaining steps were split evenly.
    pub fn per_person_gap(&self) -> f64 {
        if self.shares.is_empty() {
            0.0
        } else {
            self.remaining as f64 / self.shares.len() as f64
        }
    }
}

/// Errors that prevent the calculator from producing a table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CalculatorError {
    /// The team has no member.
    EmptyTeam,
    /// Nobody recorded any step: the remaining steps cannot be distributed
    /// in proportion to the contributions.
    NoRecordedSteps,
    /// A step total does not fit in a signed 64-bit integer.
    StepsOverflow,
}

impl Error for CalculatorError {}

impl Display for CalculatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculatorError::EmptyTeam => write!(f, "the team has no member"),
            CalculatorError::NoRecordedSteps => {
                write!(f, "no steps recorded, cannot distribute the remaining steps")
            }
            CalculatorError::StepsOverflow => write!(f, "the step totals are too large"),
        }
    }
}

// ********* Static data **********

pub const DEFAULT_VOTERS: [&str; 12] = [
    "Annie Yao",
    "Ashley Shih",
    "Carmelo Lin",
    "Chris Wu",
    "Danny Lim",
    "Fanny Ting",
    "JC Khoo",
    "Jill Yu",
    "Joanne Chen",
    "Lily Wang",
    "Max Chen",
    "Susan Lee",
];

pub const DEFAULT_RECORDED_STEPS: [u64; 12] = [
    85895, 103755, 94809, 96134, 100107, 93328, 105953, 92161, 84912, 69979, 211115, 59983,
];

pub const ROUTE_OPTIONS: [&str; 3] = [
    "Trailhead Route 登山口路線",
    "Songde Route 松德路線",
    "Lingyin Trail 靈隱寺象山步道",
];

pub const TEAM_NAME_OPTIONS: [&str; 3] = [
    "Shohei Blowtani",
    "八八八 I'm lovin' it",
    "Blowtani 八八八八八",
];

pub fn default_roster() -> Vec<RosterEntry> {
    DEFAULT_VOTERS
        .iter()
        .zip(DEFAULT_RECORDED_STEPS.iter())
        .map(|(name, steps)| RosterEntry {
            name: name.to_string(),
            recorded_steps: *steps,
        })
        .collect()
}
