use crate::meetup::*;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotConfig {
    #[serde(rename = "type")]
    pub ballot_type: String,
    pub title: Option<String>,
    pub options: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub name: String,
    #[serde(rename = "stepsRecorded")]
    pub steps_recorded: JSValue,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeConfig {
    #[serde(rename = "xiangshanBonus")]
    pub xiangshan_bonus: Option<JSValue>,
    #[serde(rename = "totalSteps")]
    pub total_steps: Option<JSValue>,
    #[serde(rename = "targetAvg")]
    pub target_avg: Option<JSValue>,
    #[serde(rename = "minParticipants")]
    pub min_participants: Option<JSValue>,
    #[serde(rename = "perPersonLimit")]
    pub per_person_limit: Option<JSValue>,
    #[serde(rename = "stepCap")]
    pub step_cap: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetupConfig {
    pub voters: Option<Vec<String>>,
    pub ballots: Option<Vec<BallotConfig>>,
    pub roster: Option<Vec<RosterConfig>>,
    pub challenge: Option<ChallengeConfig>,
}

/// The validated configuration of the meetup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub allow_list: AllowList,
    pub ballots: Vec<Ballot>,
    pub roster: Vec<RosterEntry>,
    pub challenge: ChallengeParameters,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            allow_list: AllowList::default_roster(),
            ballots: Ballot::defaults(),
            roster: default_roster(),
            challenge: ChallengeParameters::DEFAULT,
        }
    }
}

/// Reads the settings from a JSON file, or returns the built-in settings.
pub fn read_settings(path: &Option<String>) -> MeetupResult<Settings> {
    match path {
        Some(p) => {
            info!("Reading configuration {:?}", p);
            let contents = fs::read_to_string(p).context(OpeningJsonSnafu { path: p })?;
            let config: MeetupConfig =
                serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
            validate_config(&config)
        }
        None => {
            info!("No configuration provided, using the built-in settings");
            Ok(Settings::default())
        }
    }
}

pub fn validate_config(config: &MeetupConfig) -> MeetupResult<Settings> {
    let defaults = Settings::default();

    let allow_list = match &config.voters {
        Some(voters) => {
            let names: Vec<String> = voters.iter().map(|s| s.trim().to_string()).collect();
            if names.iter().any(|n| n.is_empty()) {
                whatever!("The list of voters contains an empty name")
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for n in names.iter() {
                if !seen.insert(n.as_str()) {
                    whatever!("The voter {:?} is listed more than once", n)
                }
            }
            AllowList::new(&names)
        }
        None => defaults.allow_list,
    };

    let ballots = match &config.ballots {
        Some(bcs) => {
            let mut ballots: Vec<Ballot> = Vec::new();
            for bc in bcs.iter() {
                ballots.push(validate_ballot(bc)?);
            }
            for bt in BallotType::ALL {
                if ballots.iter().filter(|b| b.ballot_type == bt).count() > 1 {
                    whatever!("The ballot {} is defined more than once", bt)
                }
            }
            ballots
        }
        None => defaults.ballots,
    };

    let roster = match &config.roster {
        Some(rcs) => {
            let mut roster: Vec<RosterEntry> = Vec::new();
            for rc in rcs.iter() {
                roster.push(RosterEntry {
                    name: rc.name.clone(),
                    recorded_steps: read_js_int(&Some(rc.steps_recorded.clone()))?,
                });
            }
            roster
        }
        None => defaults.roster,
    };

    let d = ChallengeParameters::DEFAULT;
    let cc = config.challenge.clone().unwrap_or_default();
    let team_size = match u32::try_from(allow_list.len()) {
        Ok(n) => n,
        Err(_) => whatever!("Too many voters: {}", allow_list.len()),
    };
    let min_participants = read_js_int_or(&cc.min_participants, d.min_participants as u64)?;
    let min_participants = u32::try_from(min_participants)
        .ok()
        .context(ParsingJsonNumberSnafu {
            value: min_participants.to_string(),
        })?;
    let challenge = ChallengeParameters {
        xiangshan_bonus: read_js_int_or(&cc.xiangshan_bonus, d.xiangshan_bonus)?,
        total_steps: read_js_int_or(&cc.total_steps, d.total_steps)?,
        target_avg: read_js_int_or(&cc.target_avg, d.target_avg)?,
        // The team is made of the people who can vote.
        team_size,
        min_participants,
        per_person_limit: read_js_int_or(&cc.per_person_limit, d.per_person_limit)?,
        step_cap: read_js_int_or(&cc.step_cap, d.step_cap)?,
    };
    if challenge.target_total().is_none() {
        whatever!(
            "The target average {} is too large for a team of {}",
            challenge.target_avg,
            challenge.team_size
        )
    }

    Ok(Settings {
        allow_list,
        ballots,
        roster,
        challenge,
    })
}

fn validate_ballot(bc: &BallotConfig) -> MeetupResult<Ballot> {
    let ballot_type = match BallotType::parse(&bc.ballot_type) {
        Some(bt) => bt,
        None => whatever!("Unknown ballot type {:?}", bc.ballot_type),
    };
    if bc.options.is_empty() {
        whatever!("The ballot {} has no option", ballot_type)
    }
    Ok(Ballot {
        ballot_type,
        title: bc.title.clone().unwrap_or_else(|| ballot_type.to_string()),
        options: bc.options.clone(),
    })
}

pub fn read_summary(path: &str) -> MeetupResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int_or(x: &Option<JSValue>, default: u64) -> MeetupResult<u64> {
    match x {
        None | Some(JSValue::Null) => Ok(default),
        _ => read_js_int(x),
    }
}

fn read_js_int(x: &Option<JSValue>) -> MeetupResult<u64> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().context(ParsingJsonNumberSnafu {
            value: n.to_string(),
        }),
        // Spreadsheets often export numbers with thousands separators.
        Some(JSValue::String(s)) => s
            .trim()
            .replace(',', "")
            .parse::<u64>()
            .ok()
            .context(ParsingJsonNumberSnafu { value: s.clone() }),
        _ => None.context(ParsingJsonNumberSnafu {
            value: format!("{:?}", x),
        }),
    }
}
