// A ledger stored in a CSV file.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::meetup::*;

pub const LEDGER_HEADER: [&str; 3] = ["name", "type", "vote"];

/// A CSV file with the columns `name`, `type` and `vote`.
///
/// The columns are found by name, ignoring case and surrounding spaces. A file
/// that does not exist yet is an empty ledger; it is created by the first vote.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: String,
}

impl CsvLedger {
    pub fn new(path: String) -> CsvLedger {
        CsvLedger { path }
    }
}

impl Ledger for CsvLedger {
    type Error = MeetupError;

    fn append(&mut self, row: &RawVoteRow) -> MeetupResult<()> {
        let path = self.path.clone();
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&path)
            .context(LedgerIoSnafu { path: path.clone() })?;
        // Exports and hand-edited files often lack the final line break.
        let terminated = ends_with_newline(&mut file).context(LedgerIoSnafu { path: path.clone() })?;
        if !terminated {
            debug!("append: terminating the last line of {:?}", path);
            file.write_all(b"\n")
                .context(LedgerIoSnafu { path: path.clone() })?;
        }
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            debug!("append: creating the ledger {:?}", path);
            wtr.write_record(LEDGER_HEADER)
                .context(CsvAppendSnafu { path: path.clone() })?;
        }
        let cell = |c: &Option<String>| c.clone().unwrap_or_default();
        wtr.write_record([cell(&row.name), cell(&row.ballot_type), cell(&row.choice)])
            .context(CsvAppendSnafu { path: path.clone() })?;
        wtr.flush().context(LedgerIoSnafu { path })?;
        Ok(())
    }

    fn read_all(&self) -> MeetupResult<Vec<RawVoteRow>> {
        if !Path::new(&self.path).exists() {
            info!("read_all: the ledger {:?} does not exist yet", self.path);
            return Ok(vec![]);
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .context(CsvOpenSnafu {
                path: self.path.clone(),
            })?;
        let header = rdr
            .headers()
            .context(CsvOpenSnafu {
                path: self.path.clone(),
            })?
            .clone();
        let columns = get_col_index_mapping(header.iter())?;
        debug!("read_all: columns: {:?}", columns);

        let mut res: Vec<RawVoteRow> = Vec::new();
        for (idx, line_r) in rdr.records().enumerate() {
            // The header is the first line.
            let lineno = idx + 2;
            let line = line_r.context(CsvLineParseSnafu { lineno })?;
            let cell = |col: &str| {
                columns
                    .get(col)
                    .and_then(|i| line.get(*i))
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            };
            let row = RawVoteRow {
                name: cell("name"),
                ballot_type: cell("type"),
                choice: cell("vote"),
            };
            debug!("read_all: lineno: {:?} row: {:?}", lineno, row);
            res.push(row);
        }
        info!("read_all: read {} rows from {:?}", res.len(), self.path);
        Ok(res)
    }
}

/// Whether the last line of a non-empty file is terminated.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n' || last[0] == b'\r')
}

/// Maps the normalized name of each ledger column to its position.
///
/// A missing column is not an error: the rows simply lack this value and will
/// be quarantined when the standings are computed.
pub fn get_col_index_mapping<'a, I>(header: I) -> MeetupResult<HashMap<String, usize>>
where
    I: Iterator<Item = &'a str>,
{
    let mut mapping: HashMap<String, usize> = HashMap::new();
    for (idx, col) in header.enumerate() {
        let key = meetup_tally::normalize_text(col);
        if LEDGER_HEADER.contains(&key.as_str()) && mapping.insert(key.clone(), idx).is_some() {
            whatever!("The column {:?} appears more than once in the ledger", key)
        }
    }
    for col in LEDGER_HEADER {
        if !mapping.contains_key(col) {
            warn!("The ledger has no column {:?}", col);
        }
    }
    Ok(mapping)
}
