//! Sample dataset for the demo grid.

use chrono::NaiveDate;
use trestle::prelude::*;

const FIRST: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Radia", "Ken", "Dennis", "Margaret",
    "Tony", "Leslie",
];
const LAST: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Perlman", "Thompson",
    "Ritchie", "Hamilton", "Hoare", "Lamport",
];
const TEAMS: &[&str] = &["core", "infra", "tooling", "support"];

/// Column layout with a flat column, two groups, and both footer kinds.
pub fn columns() -> Vec<ColumnSpec> {
    vec![
        Column::new("name", "Name", DataType::Text).width(18).into(),
        ColumnGroup::new(
            "Profile",
            vec![
                Column::new("team", "Team", DataType::Text).width(9),
                Column::new("age", "Age", DataType::Number)
                    .width(5)
                    .footer(FooterRule::Avg),
                Column::new("joined", "Joined", DataType::Date).width(12),
                Column::new("active", "Active", DataType::Boolean).width(7),
            ],
        )
        .into(),
        ColumnGroup::new(
            "Performance",
            vec![
                Column::new("score", "Score", DataType::Number)
                    .width(7)
                    .footer(FooterRule::Max),
                Column::new("reviews", "Reviews", DataType::Number).width(8),
            ],
        )
        .footer("Total score", "score", FooterRule::Sum)
        .into(),
    ]
}

/// Deterministic fake staff records, enough for a few pages.
pub fn records() -> Vec<Record> {
    (0..60)
        .map(|i| {
            let name = format!("{} {}", FIRST[i % FIRST.len()], LAST[(i * 5 + 3) % LAST.len()]);
            let joined = NaiveDate::from_ymd_opt(
                2018 + (i % 7) as i32,
                1 + (i % 12) as u32,
                1 + ((i * 11) % 28) as u32,
            );
            let mut record = Record::new(format!("emp-{i:03}"))
                .set("name", name)
                .set("team", TEAMS[i % TEAMS.len()])
                .set("age", 22 + ((i * 7) % 31) as i64)
                .set("active", i % 3 != 0)
                .set("score", ((i * 37) % 100) as i64)
                .set("reviews", (i % 9) as i64);
            if let Some(date) = joined {
                record.insert("joined", date);
            }
            record
        })
        .collect()
}
