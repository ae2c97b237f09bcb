/*!

This is the long-form manual for `meetup_tally` and `teamvote`.

## Ballots

Two independent ballots are open to the members of the team:

* `route`: the route to the shooting platform of Xiangshan
  (`Trailhead Route 登山口路線`, `Songde Route 松德路線`, `Lingyin Trail 靈隱寺象山步道`)
* `teamname`: the name of the team
  (`Shohei Blowtani`, `八八八 I'm lovin' it`, `Blowtani 八八八八八`)

Only the names on the voter list can vote. The name must be typed exactly as it
appears in the list (surrounding spaces are ignored). A person can vote several
times, every vote counts.

## Ledger

The votes are stored in a ledger, a table with three columns:

| name      | type  | vote                      |
|-----------|-------|---------------------------|
| Annie Yao | Route | trailhead route 登山口路線 |

The names of the columns and all the values are compared after trimming and
lowercasing. The standings are always recomputed from the full content of the
ledger:
* rows with an empty column are quarantined and reported as malformed,
* rows from a name that is not on the voter list are reported as unlisted,
* votes that do not match any option are reported as unrecognized.

The following formats are supported:
* `csv` a comma-separated file. New votes are appended at the end of the file.
* `xlsx` an Excel export of the ledger. It is read-only.

## Step challenge

The bonus table lists, for each possible number of hikers, the Xiangshan bonus,
the steps that remain to be walked to pass the leading team, and the steps
that each person would have to walk. The bonus only counts with at least 5
hikers, and it is scaled by the share of the team that hikes:

```text
bonus      = xiangshan_bonus * hikers / team_size     (0 below 5 hikers)
remaining  = target_avg * team_size - total_steps - bonus
per_person = remaining / team_size
feasible   = per_person <= 200000
```

The share table distributes the remaining steps across the roster, in
proportion to what each person already walked. The individual step counts are
capped to 100000 first.

## Configuration

All the constants can be overridden with a JSON file passed with `--config`:

```json
{
  "voters": ["Annie Yao", "Chris Wu"],
  "ballots": [
    {"type": "route", "title": "Route", "options": ["Trailhead Route", "Songde Route"]}
  ],
  "roster": [
    {"name": "Annie Yao", "stepsRecorded": 85895},
    {"name": "Chris Wu", "stepsRecorded": "96134"}
  ],
  "challenge": {
    "xiangshanBonus": 55000,
    "totalSteps": 1146027,
    "targetAvg": 175348,
    "minParticipants": 5,
    "perPersonLimit": 200000,
    "stepCap": 100000
  }
}
```

Every section is optional. The team size is the number of voters, so a voter
cannot be listed twice.

*/
