//! Column role classification from header labels.

use serde::Serialize;
use std::fmt;

use crate::table::RawTable;

pub const TEMPERATURE_KEYWORDS: &[&str] = &["temper"];
pub const HUMIDITY_KEYWORDS: &[&str] = &["umid", "humid"];
pub const DATE_KEYWORDS: &[&str] = &["data", "date"];
pub const TIME_KEYWORDS: &[&str] = &["hora", "time", "tempo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Timestamp,
    Date,
    Time,
    Temperature,
    Humidity,
}

impl ColumnRole {
    pub fn is_date_bearing(self) -> bool {
        matches!(self, ColumnRole::Timestamp | ColumnRole::Date | ColumnRole::Time)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::Timestamp => "timestamp",
            ColumnRole::Date => "date",
            ColumnRole::Time => "time",
            ColumnRole::Temperature => "temperature",
            ColumnRole::Humidity => "humidity",
        };
        f.pad(name)
    }
}

fn contains_any(label: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| label.contains(k))
}

/// Does the (already lower-cased) text mention any role keyword?
pub fn mentions_role_keyword(lowered: &str) -> bool {
    [TEMPERATURE_KEYWORDS, HUMIDITY_KEYWORDS, DATE_KEYWORDS, TIME_KEYWORDS]
        .iter()
        .any(|set| contains_any(lowered, set))
}

/// Assign a role to one label. Rules are checked in priority order and the
/// first match wins.
pub fn classify_label(label: &str) -> Option<ColumnRole> {
    let low = label.trim().to_lowercase();
    let has_date = contains_any(&low, DATE_KEYWORDS);
    let has_time = contains_any(&low, TIME_KEYWORDS);

    if contains_any(&low, TEMPERATURE_KEYWORDS) {
        Some(ColumnRole::Temperature)
    } else if contains_any(&low, HUMIDITY_KEYWORDS) {
        Some(ColumnRole::Humidity)
    } else if has_date && has_time {
        Some(ColumnRole::Timestamp)
    } else if has_date {
        Some(ColumnRole::Date)
    } else if has_time {
        Some(ColumnRole::Time)
    } else {
        None
    }
}

/// Role per column position. Several columns may share a role; they are
/// resolved row-wise by first non-absent value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRoleMap {
    roles: Vec<Option<ColumnRole>>,
}

impl ColumnRoleMap {
    pub fn classify<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            roles: labels.iter().map(|l| classify_label(l.as_ref())).collect(),
        }
    }

    pub fn role_of(&self, col: usize) -> Option<ColumnRole> {
        self.roles.get(col).copied().flatten()
    }

    /// Column positions carrying `role`, in column order.
    pub fn columns_for(&self, role: ColumnRole) -> Vec<usize> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == Some(role))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has(&self, role: ColumnRole) -> bool {
        self.roles.contains(&Some(role))
    }

    pub fn has_date_bearing(&self) -> bool {
        self.roles.iter().flatten().any(|r| r.is_date_bearing())
    }

    pub fn is_empty(&self) -> bool {
        self.roles.iter().all(Option::is_none)
    }

    /// Force `col` to be the only date column: other timestamp/date columns
    /// lose their role, time columns are kept.
    pub fn with_forced_date(&self, col: usize) -> Self {
        let mut roles: Vec<Option<ColumnRole>> = self
            .roles
            .iter()
            .map(|r| match r {
                Some(ColumnRole::Timestamp) | Some(ColumnRole::Date) => None,
                other => *other,
            })
            .collect();
        if col < roles.len() {
            roles[col] = Some(ColumnRole::Date);
        }
        Self { roles }
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<ColumnRole>)> + '_ {
        self.roles.iter().copied().enumerate()
    }
}

/// A labeled table together with its role assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTable {
    pub table: RawTable,
    pub roles: ColumnRoleMap,
}

impl RoleTable {
    pub fn new(table: RawTable) -> Self {
        let roles = ColumnRoleMap::classify(&table.labels);
        Self { table, roles }
    }

    pub fn with_roles(table: RawTable, roles: ColumnRoleMap) -> Self {
        Self { table, roles }
    }

    /// Labels carrying `role`, for logs and reports.
    pub fn labels_for(&self, role: ColumnRole) -> Vec<String> {
        self.roles
            .columns_for(role)
            .into_iter()
            .map(|c| self.table.labels[c].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_wins_over_everything() {
        for label in [
            "Temperatura",
            "TEMPERATURE (°C)",
            "temperatura/umidade",
            "Data Temperatura",
            "Hora da temperatura",
        ] {
            assert_eq!(classify_label(label), Some(ColumnRole::Temperature), "{label}");
        }
    }

    #[test]
    fn test_humidity() {
        assert_eq!(classify_label("Umidade (%)"), Some(ColumnRole::Humidity));
        assert_eq!(classify_label("Humidity %RH"), Some(ColumnRole::Humidity));
        assert_eq!(classify_label("Data umidade"), Some(ColumnRole::Humidity));
    }

    #[test]
    fn test_combined_date_time() {
        assert_eq!(classify_label("Data/Hora"), Some(ColumnRole::Timestamp));
        assert_eq!(classify_label("Date Time"), Some(ColumnRole::Timestamp));
        assert_eq!(classify_label("datetime"), Some(ColumnRole::Timestamp));
    }

    #[test]
    fn test_date_and_time_alone() {
        assert_eq!(classify_label(" Data "), Some(ColumnRole::Date));
        assert_eq!(classify_label("Date"), Some(ColumnRole::Date));
        assert_eq!(classify_label("Hora"), Some(ColumnRole::Time));
        assert_eq!(classify_label("Time"), Some(ColumnRole::Time));
        assert_eq!(classify_label("Tempo"), Some(ColumnRole::Time));
    }

    #[test]
    fn test_unmapped() {
        assert_eq!(classify_label("Nº"), None);
        assert_eq!(classify_label(""), None);
        assert_eq!(classify_label("Serial"), None);
    }

    #[test]
    fn test_role_map_duplicates_and_forcing() {
        let map = ColumnRoleMap::classify(&["Data", "Hora", "Temp. Temperatura", "Temperatura", "x"]);
        assert_eq!(map.columns_for(ColumnRole::Temperature), vec![2, 3]);
        assert_eq!(map.role_of(4), None);
        assert!(map.has_date_bearing());

        let forced = map.with_forced_date(4);
        assert_eq!(forced.columns_for(ColumnRole::Date), vec![4]);
        assert_eq!(forced.columns_for(ColumnRole::Time), vec![1]);
    }

    #[test]
    fn test_keyword_scan() {
        assert!(mentions_role_keyword("data/hora"));
        assert!(mentions_role_keyword("umidade"));
        assert!(!mentions_role_keyword("elitech rc-4hc"));
    }
}
