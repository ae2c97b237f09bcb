use log::{debug, info, warn};

use meetup_tally::ledger::Submission;
use meetup_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::meetup::config_reader::*;
use crate::meetup::io_csv::CsvLedger;
use crate::meetup::io_excel::XlsxLedger;

pub mod config_reader;
mod io_csv;
mod io_excel;
mod render;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MeetupError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} has no worksheet {worksheet}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("The file {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("The spreadsheet is empty"))]
    EmptyExcel {},
    #[snafu(display("Line {lineno}: cannot understand the cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Cannot find the column {column} in the header"))]
    MissingColumn { column: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Cannot understand the number {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error opening the ledger {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the ledger"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error appending to the ledger {path}"))]
    CsvAppend { source: csv::Error, path: String },
    #[snafu(display("Error accessing the ledger {path}"))]
    LedgerIo {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The ledger {path} is read-only"))]
    ReadOnlyLedger { path: String },
    #[snafu(display("Unknown ledger type {ledger_type} (expected csv or xlsx)"))]
    UnknownLedgerType { ledger_type: String },
    #[snafu(display("Unknown ballot {ballot}"))]
    UnknownBallot { ballot: String },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot compute the step challenge"))]
    Calculator { source: CalculatorError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MeetupResult<T> = Result<T, MeetupError>;

/// The ledgers that can be opened from the command line.
pub enum LedgerBackend {
    Csv(CsvLedger),
    Xlsx(XlsxLedger),
}

impl LedgerBackend {
    pub fn open(args: &Args) -> MeetupResult<LedgerBackend> {
        let ledger_type = args.ledger_type.clone().unwrap_or_else(|| "csv".to_string());
        let path = args.ledger.clone().unwrap_or_else(|| "votes.csv".to_string());
        info!("Opening {} ledger {:?}", ledger_type, path);
        match ledger_type.as_str() {
            "csv" => Ok(LedgerBackend::Csv(CsvLedger::new(path))),
            "xlsx" => Ok(LedgerBackend::Xlsx(XlsxLedger::new(
                path,
                args.excel_worksheet_name.clone(),
            ))),
            x => UnknownLedgerTypeSnafu { ledger_type: x }.fail(),
        }
    }
}

impl Ledger for LedgerBackend {
    type Error = MeetupError;

    fn append(&mut self, row: &RawVoteRow) -> MeetupResult<()> {
        match self {
            LedgerBackend::Csv(l) => l.append(row),
            LedgerBackend::Xlsx(l) => l.append(row),
        }
    }

    fn read_all(&self) -> MeetupResult<Vec<RawVoteRow>> {
        match self {
            LedgerBackend::Csv(l) => l.read_all(),
            LedgerBackend::Xlsx(l) => l.read_all(),
        }
    }
}

fn find_ballot<'a>(settings: &'a Settings, ballot: &str) -> MeetupResult<&'a Ballot> {
    BallotType::parse(ballot)
        .and_then(|bt| settings.ballots.iter().find(|b| b.ballot_type == bt))
        .context(UnknownBallotSnafu { ballot })
}

fn roster_for(
    settings: &Settings,
    roster_path: &Option<String>,
    args: &Args,
) -> MeetupResult<Vec<RosterEntry>> {
    match roster_path {
        Some(p) => io_excel::read_roster(p, args.excel_worksheet_name.clone()),
        None => Ok(settings.roster.clone()),
    }
}

fn standings_to_json(standings: &Standings) -> JSValue {
    let ballots: Vec<JSValue> = standings
        .tallies
        .iter()
        .map(|t| {
            let tally: Vec<JSValue> = t
                .counts
                .iter()
                .map(|(option, count)| json!({"option": option, "votes": count}))
                .collect();
            json!({"ballot": t.ballot_type, "tally": tally, "unrecognized": t.unrecognized})
        })
        .collect();
    json!({
        "ledger": {
            "rows": standings.total_rows,
            "malformed": standings.malformed,
            "unlisted": standings.unlisted,
        },
        "ballots": ballots,
    })
}

fn bonus_to_json(rows: &[BonusRow]) -> JSValue {
    let l: Vec<JSValue> = rows
        .iter()
        .map(|r| {
            json!({
                "participants": r.participants,
                "effectiveBonus": r.effective_bonus.round() as i64,
                "remainingSteps": r.remaining_steps.round() as i64,
                "perPerson": r.per_person.round() as i64,
                "feasible": r.feasible,
            })
        })
        .collect();
    JSValue::Array(l)
}

fn shares_to_json(table: &ShareTable) -> JSValue {
    let members: Vec<JSValue> = table
        .shares
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "cappedSteps": s.capped_steps,
                "targetShare": s.target_share.round() as i64,
            })
        })
        .collect();
    json!({
        "cappedTotal": table.capped_total,
        "targetTotal": table.target_total,
        "remaining": table.remaining,
        "members": members,
    })
}

fn build_summary_js(standings: &Standings, bonus: &[BonusRow], shares: &ShareTable) -> JSValue {
    json!({
        "standings": standings_to_json(standings),
        "bonus": bonus_to_json(bonus),
        "shares": shares_to_json(shares),
    })
}

fn write_summary(pretty_js: &str, out: &Option<String>) -> MeetupResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js);
            Ok(())
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })
        }
    }
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> MeetupResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between the summary and the reference summary")
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

fn run_vote<L: Ledger<Error = MeetupError>>(
    ledger: &mut L,
    settings: &Settings,
    name: &str,
    ballot: &str,
    choice: &str,
) -> MeetupResult<String> {
    let ballot = find_ballot(settings, ballot)?;
    match submit_vote(ledger, &settings.allow_list, ballot, name, choice)? {
        Submission::Accepted(row) => {
            println!(
                "Your {} vote 「{}」 has been saved!",
                ballot.ballot_type,
                row.choice.unwrap_or_default()
            );
        }
        Submission::Rejected(rejection) => {
            eprintln!("❌ {}", rejection);
        }
    }
    // Always display what the ledger holds, not what was just written.
    let standings = refresh_standings(ledger, &settings.allow_list, &settings.ballots)?;
    Ok(render::standings_text(&standings, &[ballot.ballot_type]))
}

pub fn run(args: &Args) -> MeetupResult<()> {
    let settings = read_settings(&args.config)?;
    debug!("settings: {:?}", settings);

    match &args.command {
        Command::Vote {
            name,
            ballot,
            choice,
        } => {
            let mut ledger = LedgerBackend::open(args)?;
            let text = run_vote(&mut ledger, &settings, name, ballot, choice)?;
            print!("{}", text);
            Ok(())
        }
        Command::Standings { ballot } => {
            let ledger = LedgerBackend::open(args)?;
            let selected: Vec<BallotType> = match ballot {
                Some(b) => vec![find_ballot(&settings, b)?.ballot_type],
                None => settings.ballots.iter().map(|b| b.ballot_type).collect(),
            };
            let standings = refresh_standings(&ledger, &settings.allow_list, &settings.ballots)?;
            print!("{}", render::standings_text(&standings, &selected));
            Ok(())
        }
        Command::Bonus => {
            let rows = bonus_table(&settings.challenge).context(CalculatorSnafu {})?;
            print!("{}", render::bonus_text(&settings.challenge, &rows));
            Ok(())
        }
        Command::Shares { roster } => {
            let roster = roster_for(&settings, roster, args)?;
            let table = target_shares(&roster, &settings.challenge).context(CalculatorSnafu {})?;
            print!("{}", render::shares_text(&table));
            Ok(())
        }
        Command::Report {
            out,
            reference,
            roster,
        } => {
            let ledger = LedgerBackend::open(args)?;
            let standings = refresh_standings(&ledger, &settings.allow_list, &settings.ballots)?;
            let bonus = bonus_table(&settings.challenge).context(CalculatorSnafu {})?;
            let roster = roster_for(&settings, roster, args)?;
            let shares = target_shares(&roster, &settings.challenge).context(CalculatorSnafu {})?;
            let result_js = build_summary_js(&standings, &bonus, &shares);
            let pretty_js_stats =
                serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
            write_summary(&pretty_js_stats, out)?;
            if let Some(reference_path) = reference {
                check_reference(&pretty_js_stats, reference_path)?;
            }
            Ok(())
        }
        Command::Preview { input } => {
            let rows = io_excel::preview(input, args.excel_worksheet_name.clone())?;
            print!("{}", render::preview_text(&rows));
            Ok(())
        }
    }
}
