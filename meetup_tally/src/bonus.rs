//! The step challenge calculator.
//!
//! The team is behind the leading team. Hiking Xiangshan gives a team bonus,
//! scaled by the number of hikers, as long as enough people participate. The
//! rest of the gap has to be walked by the team members.

use log::debug;

use crate::config::*;

/// Clamps an individual step count.
pub fn cap_steps(recorded: u64, cap: u64) -> u64 {
    recorded.min(cap)
}

/// The bonus table: one row for each possible number of hikers, from nobody
/// to the whole team.
pub fn bonus_table(params: &ChallengeParameters) -> Result<Vec<BonusRow>, CalculatorError> {
    if params.team_size == 0 {
        return Err(CalculatorError::EmptyTeam);
    }
    let team_size = params.team_size as f64;
    let target_total = params
        .target_total()
        .ok_or(CalculatorError::StepsOverflow)?;
    let base_remaining = target_total as f64 - params.total_steps as f64;
    debug!(
        "bonus_table: target total {} remaining before bonus {}",
        target_total, base_remaining
    );

    let rows = (0..=params.team_size)
        .map(|participants| {
            let effective_bonus = if participants < params.min_participants {
                0.0
            } else {
                params.xiangshan_bonus as f64 * participants as f64 / team_size
            };
            let remaining_steps = base_remaining - effective_bonus;
            let per_person = remaining_steps / team_size;
            BonusRow {
                participants,
                effective_bonus,
                remaining_steps,
                per_person,
                feasible: per_person <= params.per_person_limit as f64,
            }
        })
        .collect();
    Ok(rows)
}

/// Distributes the remaining steps across the roster, in proportion to the
/// (capped) steps that each member already contributed.
///
/// The team size is the size of the roster.
pub fn target_shares(
    roster: &[RosterEntry],
    params: &ChallengeParameters,
) -> Result<ShareTable, CalculatorError> {
    if roster.is_empty() {
        return Err(CalculatorError::EmptyTeam);
    }
    let capped: Vec<u64> = roster
        .iter()
        .map(|e| cap_steps(e.recorded_steps, params.step_cap))
        .collect();
    let capped_total = capped
        .iter()
        .try_fold(0u64, |acc, c| acc.checked_add(*c))
        .filter(|t| i64::try_from(*t).is_ok())
        .ok_or(CalculatorError::StepsOverflow)?;
    if capped_total == 0 {
        return Err(CalculatorError::NoRecordedSteps);
    }
    let roster_params = ChallengeParameters {
        team_size: u32::try_from(roster.len()).map_err(|_| CalculatorError::StepsOverflow)?,
        ..params.clone()
    };
    let target_total = roster_params
        .target_total()
        .ok_or(CalculatorError::StepsOverflow)?;
    // Both totals fit in an i64, the difference cannot overflow.
    let remaining = target_total as i64 - capped_total as i64;
    debug!(
        "target_shares: capped total {} target {} remaining {}",
        capped_total, target_total, remaining
    );

    let shares = roster
        .iter()
        .zip(capped.iter())
        .map(|(e, c)| TargetShare {
            name: e.name.clone(),
            recorded_steps: e.recorded_steps,
            capped_steps: *c,
            target_share: *c as f64 / capped_total as f64 * remaining as f64,
        })
        .collect();

    Ok(ShareTable {
        shares,
        capped_total,
        target_total,
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn bonus_table_default_challenge() {
        let rows = bonus_table(&ChallengeParameters::DEFAULT).unwrap();
        assert_eq!(rows.len(), 13);
        assert_eq!(rows[0].participants, 0);
        assert_close(rows[0].effective_bonus, 0.0);
        // 175348 * 12 - 1146027
        assert_close(rows[0].remaining_steps, 958_149.0);
        assert_eq!(rows[0].per_person.round(), 79_846.0);

        let six = &rows[6];
        assert_eq!(six.participants, 6);
        assert_close(six.effective_bonus, 27_500.0);
        assert_close(six.remaining_steps, 930_649.0);
        assert!(six.feasible);

        let all = &rows[12];
        assert_close(all.effective_bonus, 55_000.0);
    }

    #[test]
    fn bonus_needs_minimum_participants() {
        let rows = bonus_table(&ChallengeParameters::DEFAULT).unwrap();
        for r in rows.iter().filter(|r| r.participants < 5) {
            assert_close(r.effective_bonus, 0.0);
            assert_close(r.remaining_steps, rows[0].remaining_steps);
        }
        let counted: Vec<&BonusRow> = rows.iter().filter(|r| r.participants >= 5).collect();
        assert!(counted[0].effective_bonus > 0.0);
        for w in counted.windows(2) {
            assert!(w[0].effective_bonus <= w[1].effective_bonus);
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn feasible_at_the_limit() {
        init_logs();
        let params = ChallengeParameters {
            target_avg: 200_000,
            total_steps: 0,
            ..ChallengeParameters::DEFAULT
        };
        let rows = bonus_table(&params).unwrap();
        for r in rows.iter().filter(|r| r.participants < 5) {
            assert_eq!(r.per_person, 200_000.0);
            assert!(r.feasible);
        }
        for r in rows.iter().filter(|r| r.participants >= 5) {
            assert!(r.per_person < 200_000.0);
            assert!(r.feasible);
        }
    }

    #[test]
    fn infeasible_above_the_limit() {
        init_logs();
        let params = ChallengeParameters {
            target_avg: 200_001,
            total_steps: 0,
            ..ChallengeParameters::DEFAULT
        };
        let rows = bonus_table(&params).unwrap();
        for r in rows.iter().filter(|r| r.participants < 5) {
            assert_eq!(r.per_person, 200_001.0);
            assert!(!r.feasible);
        }
        // With 5 hikers, the bonus brings it back under the limit.
        assert!(rows[5].feasible);
    }

    #[test]
    fn step_totals_too_large() {
        init_logs();
        let params = ChallengeParameters {
            target_avg: u64::MAX / 4,
            ..ChallengeParameters::DEFAULT
        };
        assert_eq!(bonus_table(&params), Err(CalculatorError::StepsOverflow));
        assert_eq!(
            target_shares(&default_roster(), &params),
            Err(CalculatorError::StepsOverflow)
        );

        // Fits in a u64 but not in an i64.
        let params = ChallengeParameters {
            target_avg: u64::MAX / 12,
            ..ChallengeParameters::DEFAULT
        };
        assert_eq!(bonus_table(&params), Err(CalculatorError::StepsOverflow));

        let roster = vec![
            RosterEntry {
                name: "a".to_string(),
                recorded_steps: u64::MAX,
            },
            RosterEntry {
                name: "b".to_string(),
                recorded_steps: u64::MAX,
            },
        ];
        let params = ChallengeParameters {
            step_cap: u64::MAX,
            ..ChallengeParameters::DEFAULT
        };
        assert_eq!(
            target_shares(&roster, &params),
            Err(CalculatorError::StepsOverflow)
        );
    }

    #[test]
    fn bonus_table_empty_team() {
        let params = ChallengeParameters {
            team_size: 0,
            ..ChallengeParameters::DEFAULT
        };
        assert_eq!(bonus_table(&params), Err(CalculatorError::EmptyTeam));
    }

    #[test]
    fn shares_of_default_roster() {
        let roster = default_roster();
        let table = target_shares(&roster, &ChallengeParameters::DEFAULT).unwrap();
        assert_eq!(table.capped_total, 1_077_201);
        assert_eq!(table.target_total, 2_104_176);
        assert_eq!(table.remaining, 1_026_975);
        assert_eq!(table.per_person_gap().round(), 85_581.0);
        for s in table.shares.iter() {
            assert!(s.capped_steps <= 100_000);
        }
        let max = table.shares.iter().find(|s| s.name == "Max Chen").unwrap();
        assert_eq!(max.recorded_steps, 211_115);
        assert_eq!(max.capped_steps, 100_000);
        let total: f64 = table.shares.iter().map(|s| s.target_share).sum();
        assert_close(total, 1_026_975.0);
    }

    #[test]
    fn shares_are_proportional() {
        let roster = vec![
            RosterEntry {
                name: "a".to_string(),
                recorded_steps: 100,
            },
            RosterEntry {
                name: "b".to_string(),
                recorded_steps: 300,
            },
        ];
        let params = ChallengeParameters {
            target_avg: 600,
            ..ChallengeParameters::DEFAULT
        };
        let table = target_shares(&roster, &params).unwrap();
        assert_eq!(table.remaining, 800);
        assert_close(table.shares[0].target_share, 200.0);
        assert_close(table.shares[1].target_share, 600.0);
    }

    #[test]
    fn shares_without_steps() {
        let roster = vec![RosterEntry {
            name: "a".to_string(),
            recorded_steps: 0,
        }];
        assert_eq!(
            target_shares(&roster, &ChallengeParameters::DEFAULT),
            Err(CalculatorError::NoRecordedSteps)
        );
        assert_eq!(
            target_shares(&[], &ChallengeParameters::DEFAULT),
            Err(CalculatorError::EmptyTeam)
        );
    }
}
