use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::meetup::io_csv::get_col_index_mapping;
use crate::meetup::*;

/// An Excel export of the ledger. It can be read but not appended to.
#[derive(Debug, Clone)]
pub struct XlsxLedger {
    path: String,
    worksheet: Option<String>,
}

impl XlsxLedger {
    pub fn new(path: String, worksheet: Option<String>) -> XlsxLedger {
        XlsxLedger { path, worksheet }
    }
}

impl Ledger for XlsxLedger {
    type Error = MeetupError;

    fn append(&mut self, _row: &RawVoteRow) -> MeetupResult<()> {
        ReadOnlyLedgerSnafu {
            path: self.path.clone(),
        }
        .fail()
    }

    fn read_all(&self) -> MeetupResult<Vec<RawVoteRow>> {
        let wrange = get_range(&self.path, self.worksheet.clone())?;
        let res = parse_ledger_rows(wrange.rows())?;
        info!("read_all: read {} rows from {:?}", res.len(), self.path);
        Ok(res)
    }
}

/// Reads a roster with the columns `Name` and `Steps_Recorded`.
pub fn read_roster(path: &str, worksheet: Option<String>) -> MeetupResult<Vec<RosterEntry>> {
    info!("Attempting to read roster file {:?}", path);
    let wrange = get_range(path, worksheet)?;
    parse_roster_rows(wrange.rows())
}

/// The content of a spreadsheet, as text.
pub fn preview(path: &str, worksheet: Option<String>) -> MeetupResult<Vec<Vec<String>>> {
    let wrange = get_range(path, worksheet)?;
    let rows = wrange
        .rows()
        .map(|row| {
            row.iter()
                .map(|c| cell_text(c).unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(rows)
}

pub fn parse_ledger_rows<'a, I>(mut rows: I) -> MeetupResult<Vec<RawVoteRow>>
where
    I: Iterator<Item = &'a [DataType]>,
{
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let header_names: Vec<String> = header
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();
    debug!("parse_ledger_rows: header: {:?}", header_names);
    let columns = get_col_index_mapping(header_names.iter().map(|s| s.as_str()))?;

    let mut res: Vec<RawVoteRow> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let cell = |col: &str| columns.get(col).and_then(|i| row.get(*i)).and_then(cell_text);
        let r = RawVoteRow {
            name: cell("name"),
            ballot_type: cell("type"),
            choice: cell("vote"),
        };
        debug!("parse_ledger_rows: idx: {:?} row: {:?}", idx, r);
        res.push(r);
    }
    Ok(res)
}

pub fn parse_roster_rows<'a, I>(mut rows: I) -> MeetupResult<Vec<RosterEntry>>
where
    I: Iterator<Item = &'a [DataType]>,
{
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let find_col = |column: &str| {
        header
            .iter()
            .position(|c| {
                cell_text(c)
                    .map(|s| meetup_tally::normalize_text(&s).replace(' ', "_") == column)
                    .unwrap_or(false)
            })
            .context(MissingColumnSnafu { column })
    };
    let name_idx = find_col("name")?;
    let steps_idx = find_col("steps_recorded")?;

    let mut res: Vec<RosterEntry> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let name = match row.get(name_idx).and_then(cell_text) {
            Some(n) => n.trim().to_string(),
            None => {
                debug!("parse_roster_rows: line {}: skipping row without name", lineno);
                continue;
            }
        };
        let steps_cell = row.get(steps_idx).unwrap_or(&DataType::Empty);
        let recorded_steps = cell_steps(steps_cell).context(ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", steps_cell),
        })?;
        res.push(RosterEntry {
            name,
            recorded_steps,
        });
    }
    Ok(res)
}

fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) if s.is_empty() => None,
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::Empty => None,
        _ => {
            debug!("cell_text: skipping cell {:?}", cell);
            None
        }
    }
}

fn cell_steps(cell: &DataType) -> Option<u64> {
    match cell {
        DataType::Int(i) if *i >= 0 => Some(*i as u64),
        DataType::Float(f) if *f >= 0.0 => Some(f.round() as u64),
        DataType::String(s) => s.trim().replace(',', "").parse::<u64>().ok(),
        _ => None,
    }
}

fn get_range(path: &str, worksheet_name_o: Option<String>) -> MeetupResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu { path }.fail(),
        }
    }
}
