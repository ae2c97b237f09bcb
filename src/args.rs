use clap::{Parser, Subcommand};

/// Ballots and step challenge calculator for the team lunch meetup.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the voters, the ballots, the roster and the
    /// constants of the step challenge. The built-in values are used when not provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default votes.csv) The ledger containing all the votes.
    #[clap(short, long, value_parser)]
    pub ledger: Option<String>,

    /// (default csv) The type of the ledger: csv or xlsx. An xlsx ledger is read-only.
    #[clap(long, value_parser)]
    pub ledger_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Submits a vote, then displays the updated standings of the ballot.
    Vote {
        /// The name of the voter, exactly as it appears on the voter list.
        #[clap(short, long, value_parser)]
        name: String,
        /// The ballot: route or teamname.
        #[clap(short, long, value_parser)]
        ballot: String,
        /// One of the options of the ballot (case is ignored).
        #[clap(long, value_parser)]
        choice: String,
    },
    /// Displays the current standings, recomputed from the full ledger.
    Standings {
        /// (route or teamname) Only display this ballot.
        #[clap(short, long, value_parser)]
        ballot: Option<String>,
    },
    /// Displays the Xiangshan bonus table.
    Bonus,
    /// Displays how the remaining steps are distributed across the roster.
    Shares {
        /// (file path, optional) An Excel file with the columns Name and Steps_Recorded.
        /// It replaces the roster of the configuration.
        #[clap(short, long, value_parser)]
        roster: Option<String>,
    },
    /// Writes a JSON summary of the standings, the bonus table and the shares.
    Report {
        /// (file path or 'stdout', default stdout) Where to write the summary.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference summary in JSON format. If provided, the program will
        /// check that the generated summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
        /// (file path, optional) An Excel roster, as for the shares command.
        #[clap(long, value_parser)]
        roster: Option<String>,
    },
    /// Displays the content of an uploaded Excel file.
    Preview {
        #[clap(short, long, value_parser)]
        input: String,
    },
}
