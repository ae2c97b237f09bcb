// Text output of the command line.

use std::fmt::Write;

use crate::meetup::*;

const BAR_WIDTH: u64 = 30;

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH + max - 1) / max;
    "█".repeat(len as usize)
}

/// The standings of the selected ballots, with a bar chart.
pub fn standings_text(standings: &Standings, selected: &[BallotType]) -> String {
    let mut out = String::new();
    if standings.total_rows == 0 {
        let _ = writeln!(out, "No votes yet.");
        return out;
    }
    for bt in selected {
        let t = match standings.tally_for(*bt) {
            Some(t) => t,
            None => continue,
        };
        let _ = writeln!(out, "🏅 {} standings", bt);
        if t.total() == 0 {
            let _ = writeln!(out, "   no vote of this type yet");
        }
        let max = t.counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let width = t
            .counts
            .iter()
            .map(|(o, _)| o.chars().count())
            .max()
            .unwrap_or(0);
        for (option, count) in t.counts.iter() {
            let pad = width - option.chars().count();
            let _ = writeln!(
                out,
                "  {}{} {:>4} {}",
                option,
                " ".repeat(pad),
                count,
                bar(*count, max)
            );
        }
        let leaders = t.leaders();
        if !leaders.is_empty() {
            let _ = writeln!(out, "  leading: {}", leaders.join(", "));
        }
        if t.unrecognized > 0 {
            let _ = writeln!(out, "  {} vote(s) with an unrecognized choice", t.unrecognized);
        }
    }
    if standings.malformed > 0 || standings.unlisted > 0 {
        let _ = writeln!(
            out,
            "({} malformed row(s), {} row(s) from unlisted voters not counted)",
            standings.malformed, standings.unlisted
        );
    }
    out
}

pub fn bonus_text(params: &ChallengeParameters, rows: &[BonusRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📈 Xiangshan bonus table");
    let _ = writeln!(
        out,
        "current total {} steps, target {} steps ({} x {}), bonus up to {} steps with at least {} hikers",
        params.total_steps,
        params.target_total().unwrap_or_default(),
        params.target_avg,
        params.team_size,
        params.xiangshan_bonus,
        params.min_participants
    );
    let _ = writeln!(
        out,
        "{:>12} {:>15} {:>15} {:>12} {:>9}",
        "Participants", "Effective Bonus", "Remaining Steps", "Per Person", "Feasible"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:>12} {:>15} {:>15} {:>12} {:>9}",
            r.participants,
            r.effective_bonus.round() as i64,
            r.remaining_steps.round() as i64,
            r.per_person.round() as i64,
            if r.feasible { "yes" } else { "no" }
        );
    }
    out
}

pub fn shares_text(table: &ShareTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📊 Step challenge progress");
    let _ = writeln!(
        out,
        "capped total {} steps, target {} steps, still missing {} steps ({} per person if split evenly)",
        table.capped_total,
        table.target_total,
        table.remaining,
        table.per_person_gap().round() as i64
    );
    let width = table
        .shares
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let _ = writeln!(
        out,
        "{}{} {:>12} {:>12}",
        "Name",
        " ".repeat(width - 4),
        "Capped Steps",
        "Target Share"
    );
    for s in table.shares.iter() {
        let _ = writeln!(
            out,
            "{}{} {:>12} {:>12}",
            s.name,
            " ".repeat(width - s.name.chars().count()),
            s.capped_steps,
            s.target_share.round() as i64
        );
    }
    out
}

pub fn preview_text(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    let _ = writeln!(out, "({} rows)", rows.len());
    out
}
