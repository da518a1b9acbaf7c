//! Investor summary table built from structured API records.

use crate::model::{ReconstructionState, Row, RowKind, Table};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

pub const FIELD_COUNT: usize = 10;

const YEARS_COLUMN: usize = 5;
const RATE_COLUMN: usize = 6;
const COMBINED_YEARS_COLUMN: usize = 8;
const COMBINED_RATE_COLUMN: usize = 9;

/// Group pairs whose averages are combined onto the second group's row.
pub const COMBINED_PAIRS: &[(&str, &str)] = &[("1-100-10", "1-200-10"), ("1-100-15", "1-200-15")];

/// One investor group as returned by the records endpoint. Numeric fields
/// accept JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorRecord {
    #[serde(deserialize_with = "decimal_any")]
    pub num_loans: Decimal,
    pub inv_name: String,
    #[serde(deserialize_with = "code_any")]
    pub inv_bank_cd: String,
    #[serde(deserialize_with = "code_any")]
    pub inv_cd: String,
    #[serde(deserialize_with = "code_any")]
    pub inv_group_cd: String,
    #[serde(deserialize_with = "decimal_any")]
    pub balances: Decimal,
    #[serde(deserialize_with = "decimal_any")]
    pub rem_term: Decimal,
    #[serde(deserialize_with = "decimal_any")]
    pub years: Decimal,
    #[serde(deserialize_with = "decimal_any")]
    pub int_rate: Decimal,
}

impl InvestorRecord {
    /// `"{bank}-{investor}-{group}"`, e.g. `1-100-10`.
    pub fn group_key(&self) -> String {
        format!("{}-{}-{}", self.inv_bank_cd, self.inv_cd, self.inv_group_cd)
    }
}

fn decimal_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let text = match &value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().replace(',', ""),
        other => return Err(serde::de::Error::custom(format!("expected a number, got {other}"))),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| serde::de::Error::custom(format!("invalid number '{text}': {e}")))
}

fn code_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s.trim().to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected a code, got {other}"))),
    }
}

pub fn title_row() -> Row {
    let mut row = vec![String::new(); FIELD_COUNT];
    for (i, title) in [
        "Num Loans",
        "Investor Name",
        "Bk-Inv-Grp",
        "Total Balances",
        "Avg Rem Term",
        "Years",
        "Avg Int Rate",
    ]
    .into_iter()
    .enumerate()
    {
        row[i] = title.to_string();
    }
    row[COMBINED_YEARS_COLUMN] = "Combined Avg Years".to_string();
    row[COMBINED_RATE_COLUMN] = "Combined Avg Int Rate".to_string();
    row
}

/// Numeric-aware ordering so group `9` sorts before `10`.
fn compare_groups(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn round3(d: Decimal) -> Decimal {
    d.round_dp(3)
}

/// Build the investor summary: title row, one row per record sorted by
/// group code, combined averages for paired groups, and a `Total` row.
pub fn reconstruct(records: &[InvestorRecord]) -> Table {
    let mut sorted: Vec<&InvestorRecord> = records.iter().collect();
    sorted.sort_by(|a, b| compare_groups(&a.inv_group_cd, &b.inv_group_cd));

    let mut state = ReconstructionState::new(FIELD_COUNT);
    state.header_seen = true;
    state.emit(RowKind::Header, title_row());

    let mut totals = [Decimal::ZERO; 5];
    let mut row_by_group: HashMap<String, usize> = HashMap::new();

    for record in &sorted {
        let mut row = vec![String::new(); FIELD_COUNT];
        row[0] = record.num_loans.to_string();
        row[1] = record.inv_name.clone();
        row[2] = record.group_key();
        row[3] = record.balances.to_string();
        row[4] = record.rem_term.to_string();
        row[YEARS_COLUMN] = round3(record.years).to_string();
        row[RATE_COLUMN] = round3(record.int_rate).to_string();

        for (total, value) in totals.iter_mut().zip([
            record.num_loans,
            record.balances,
            record.rem_term,
            record.years,
            record.int_rate,
        ]) {
            *total += value;
        }

        if row_by_group.insert(row[2].clone(), state.rows.len()).is_some() {
            state.warn(format!("group {} appears more than once", row[2]));
        }
        state.emit(RowKind::Data, row);
    }

    for (first, second) in COMBINED_PAIRS {
        let (Some(a), Some(b)) = (
            sorted.iter().find(|r| r.group_key() == *first),
            sorted.iter().find(|r| r.group_key() == *second),
        ) else {
            continue;
        };
        let Some(&idx) = row_by_group.get(*second) else {
            continue;
        };
        let two = Decimal::TWO;
        let cells = &mut state.rows[idx].cells;
        cells[COMBINED_YEARS_COLUMN] = round3((a.years + b.years) / two).to_string();
        cells[COMBINED_RATE_COLUMN] = round3((a.int_rate + b.int_rate) / two).to_string();
    }

    let [loans, balances, rem_term, years, rate] = totals;
    let mut total_row = vec![String::new(); FIELD_COUNT];
    total_row[0] = loans.to_string();
    total_row[1] = "Total".to_string();
    total_row[3] = balances.to_string();
    total_row[4] = rem_term.to_string();
    // Sums are written unrounded.
    total_row[YEARS_COLUMN] = years.to_string();
    total_row[RATE_COLUMN] = rate.to_string();
    state.emit(RowKind::Subtotal, total_row);

    log::info!("aggregated {} investor record(s)", records.len());
    state.into_table()
}
