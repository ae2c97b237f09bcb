mod config;
use log::{debug, info};

use std::collections::HashMap;

pub mod bonus;
pub mod builder;
pub mod identity;
pub mod ledger;
pub mod manual;

pub use crate::bonus::{bonus_table, target_shares};
pub use crate::config::*;
pub use crate::identity::AllowList;
pub use crate::ledger::{refresh_standings, submit_vote, Ledger, MemoryLedger};

/// Trims and lowercases a piece of text.
///
/// This is the only comparison key used between the ledger and the ballots.
/// Both sides must go through it, otherwise the counts silently drop to zero.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalizes each column of a ledger row. Missing columns become empty.
pub fn normalize(row: &RawVoteRow) -> NormalizedVote {
    let col = |c: &Option<String>| c.as_deref().map(normalize_text).unwrap_or_default();
    NormalizedVote {
        name: col(&row.name),
        ballot_type: col(&row.ballot_type),
        choice: col(&row.choice),
    }
}

/// Counts the votes of one ballot type.
///
/// Arguments:
/// * `rows` the normalized votes, usually the full content of the ledger
/// * `ballot_type` only the rows of this type are counted
/// * `options` the enumerated options of the ballot. Every option appears in
///   the result, in this order, even without any vote.
///
/// Choices that do not match an option are not attributed to any option,
/// they are counted in `unrecognized`.
pub fn tally<S: AsRef<str>>(
    rows: &[NormalizedVote],
    ballot_type: &str,
    options: &[S],
) -> TallyResult {
    let wanted = normalize_text(ballot_type);
    let mut grouped: HashMap<&str, u64> = HashMap::new();
    for r in rows.iter().filter(|r| r.ballot_type == wanted) {
        *grouped.entry(r.choice.as_str()).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, u64)> = Vec::new();
    for opt in options {
        let key = normalize_text(opt.as_ref());
        // Removing the entry ensures that two options with the same key
        // do not count the same votes twice.
        let c = grouped.remove(key.as_str()).unwrap_or(0);
        counts.push((opt.as_ref().to_string(), c));
    }

    for (choice, c) in grouped.iter() {
        debug!(
            "tally: {}: {} vote(s) for unrecognized choice {:?}",
            wanted, c, choice
        );
    }
    TallyResult {
        ballot_type: wanted,
        counts,
        unrecognized: grouped.values().sum(),
    }
}

/// Computes the standings of all the ballots from a full snapshot of the ledger.
///
/// Rows with a missing column are quarantined and rows from voters who are not
/// on the allow-list are set aside. Both are reported in the result.
pub fn compute_standings(
    rows: &[RawVoteRow],
    allow_list: &AllowList,
    ballots: &[Ballot],
) -> Standings {
    info!("compute_standings: processing {} ledger rows", rows.len());
    let mut malformed = 0;
    let mut unlisted = 0;
    let mut valid: Vec<NormalizedVote> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let v = normalize(row);
        if !v.is_well_formed() {
            debug!("compute_standings: row {}: quarantined {:?}", idx, row);
            malformed += 1;
        } else if !allow_list.contains_normalized(&v.name) {
            debug!("compute_standings: row {}: voter not listed {:?}", idx, v.name);
            unlisted += 1;
        } else {
            valid.push(v);
        }
    }

    let tallies: Vec<TallyResult> = ballots
        .iter()
        .map(|b| tally(&valid, b.ballot_type.key(), &b.options))
        .collect();
    for t in tallies.iter() {
        info!(
            "compute_standings: {}: {} vote(s), {} unrecognized",
            t.ballot_type,
            t.total(),
            t.unrecognized
        );
    }

    Standings {
        tallies,
        total_rows: rows.len(),
        malformed,
        unlisted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<RawVoteRow> {
        vec![
            RawVoteRow::new("Annie Yao", "Route", "trailhead route 登山口路線"),
            RawVoteRow::new("Chris Wu", " route", "Songde Route 松德路線 "),
            RawVoteRow::new("Chris Wu", "ROUTE", "songde route 松德路線"),
            RawVoteRow::new("Max Chen", "TeamName", "shohei blowtani"),
            RawVoteRow::new("Max Chen", "TeamName", "some other name"),
            RawVoteRow::new("Jill Yu", "lunch", "pizza"),
            RawVoteRow {
                name: None,
                ballot_type: Some("Route".to_string()),
                choice: Some("lingyin trail 靈隱寺象山步道".to_string()),
            },
        ]
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        let v = normalize(&RawVoteRow::new("  Annie Yao ", "Route\t", " Shohei Blowtani"));
        assert_eq!(
            v,
            NormalizedVote {
                name: "annie yao".to_string(),
                ballot_type: "route".to_string(),
                choice: "shohei blowtani".to_string(),
            }
        );
    }

    #[test]
    fn normalize_missing_columns() {
        let v = normalize(&RawVoteRow::default());
        assert_eq!(v, NormalizedVote::default());
        assert!(!v.is_well_formed());
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut rows = sample_rows();
        rows.push(RawVoteRow::default());
        rows.push(RawVoteRow::new(" 八八八 I'M LOVIN' IT ", "TEAMNAME ", "\n"));
        for r in rows.iter() {
            let once = normalize(r);
            let twice = normalize(&RawVoteRow::from(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn single_route_vote() {
        let rows = vec![normalize(&RawVoteRow::new(
            "Annie Yao",
            "Route",
            "trailhead route 登山口路線",
        ))];
        let t = tally(&rows, "route", &ROUTE_OPTIONS);
        assert_eq!(
            t.counts,
            vec![
                ("Trailhead Route 登山口路線".to_string(), 1),
                ("Songde Route 松德路線".to_string(), 0),
                ("Lingyin Trail 靈隱寺象山步道".to_string(), 0),
            ]
        );
        assert_eq!(t.unrecognized, 0);
        assert_eq!(t.leaders(), vec!["Trailhead Route 登山口路線"]);
    }

    #[test]
    fn case_and_whitespace_variants_count_together() {
        let rows: Vec<NormalizedVote> = vec![
            RawVoteRow::new("Chris Wu", "Route", "Songde Route "),
            RawVoteRow::new("Jill Yu", "Route", "songde route"),
        ]
        .iter()
        .map(normalize)
        .collect();
        let t = tally(&rows, "Route", &["Songde Route", "Lingyin Trail"]);
        assert_eq!(t.count_of("songde route"), Some(2));
        assert_eq!(t.count_of("Lingyin Trail"), Some(0));
        assert_eq!(t.count_of("Trailhead Route"), None);
    }

    #[test]
    fn empty_ledger_has_all_options() {
        let t = tally::<&str>(&[], "teamname", &TEAM_NAME_OPTIONS);
        assert_eq!(t.counts.len(), 3);
        assert_eq!(t.total(), 0);
        assert!(t.leaders().is_empty());
    }

    #[test]
    fn unrecognized_choices_are_reported() {
        let rows: Vec<NormalizedVote> = sample_rows().iter().map(normalize).collect();
        let t = tally(&rows, "teamname", &TEAM_NAME_OPTIONS);
        assert_eq!(t.count_of("Shohei Blowtani"), Some(1));
        assert_eq!(t.total(), 1);
        assert_eq!(t.unrecognized, 1);
    }

    #[test]
    fn tally_conserves_votes() {
        let rows: Vec<NormalizedVote> = sample_rows().iter().map(normalize).collect();
        for b in Ballot::defaults() {
            let t = tally(&rows, b.ballot_type.key(), &b.options);
            let keys: Vec<String> = b.options.iter().map(|o| normalize_text(o)).collect();
            let expected = rows
                .iter()
                .filter(|r| r.ballot_type == b.ballot_type.key() && keys.contains(&r.choice))
                .count() as u64;
            assert_eq!(t.total(), expected);
        }
    }

    #[test]
    fn duplicate_options_are_counted_once() {
        let rows = vec![normalize(&RawVoteRow::new("a", "route", "x"))];
        let t = tally(&rows, "route", &["X", " x "]);
        assert_eq!(t.counts, vec![("X".to_string(), 1), (" x ".to_string(), 0)]);
    }

    #[test]
    fn standings_quarantine_and_allow_list() {
        let mut rows = sample_rows();
        rows.push(RawVoteRow::new("Unknown Person", "Route", "songde route 松德路線"));
        let s = compute_standings(&rows, &AllowList::default_roster(), &Ballot::defaults());
        assert_eq!(s.total_rows, 8);
        assert_eq!(s.malformed, 1);
        assert_eq!(s.unlisted, 1);
        let route = s.tally_for(BallotType::Route).unwrap();
        assert_eq!(route.count_of("Trailhead Route 登山口路線"), Some(1));
        // Duplicate votes from the same person are all counted.
        assert_eq!(route.count_of("Songde Route 松德路線"), Some(2));
        assert_eq!(route.count_of("Lingyin Trail 靈隱寺象山步道"), Some(0));
        let team = s.tally_for(BallotType::TeamName).unwrap();
        assert_eq!(team.total(), 1);
    }
}
