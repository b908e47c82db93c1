//! Filter and sort over the city table.
//!
//! Everything here is pure: the list controller re-runs [`project`] over the
//! full city list whenever rows, filters or the sort change.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

use citywx_catalog::CityRecord;

/// A sortable, filterable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Country,
    TimeZone,
    CountryCode,
    Population,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Name,
        Column::Country,
        Column::TimeZone,
        Column::CountryCode,
        Column::Population,
    ];

    /// Header text.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Name => "City Name",
            Column::Country => "Country",
            Column::TimeZone => "Timezone",
            Column::CountryCode => "Country Code",
            Column::Population => "Population",
        }
    }

    /// Cell text for `city`, which is also what filters match against.
    pub fn value<'a>(&self, city: &'a CityRecord) -> Cow<'a, str> {
        match self {
            Column::Name => Cow::Borrowed(&city.name),
            Column::Country => Cow::Borrowed(&city.country),
            Column::TimeZone => Cow::Borrowed(&city.time_zone),
            Column::CountryCode => Cow::Borrowed(&city.country_code),
            Column::Population => Cow::Owned(city.population_label()),
        }
    }

    /// Ordering used by the sort. Population compares as a number with
    /// unknown values first; every other column compares as text.
    pub fn compare(&self, a: &CityRecord, b: &CityRecord) -> Ordering {
        match self {
            Column::Population => a.population.cmp(&b.population),
            _ => self.value(a).cmp(&self.value(b)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown column: {0} (expected name, country, timezone, country_code or population)")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "name" | "city" => Ok(Column::Name),
            "country" => Ok(Column::Country),
            "timezone" => Ok(Column::TimeZone),
            "countrycode" | "code" => Ok(Column::CountryCode),
            "population" => Ok(Column::Population),
            _ => Err(UnknownColumn(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub order: SortOrder,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::Name,
            order: SortOrder::Asc,
        }
    }
}

impl SortState {
    /// Header click: the active ascending column flips to descending,
    /// anything else starts ascending.
    pub fn toggle(&mut self, column: Column) {
        self.order = if self.column == column && self.order == SortOrder::Asc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        self.column = column;
    }

    pub fn compare(&self, a: &CityRecord, b: &CityRecord) -> Ordering {
        let ord = self.column.compare(a, b);
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Per-column filter text plus the free-text search box.
///
/// Empty strings impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub name: String,
    pub country: String,
    pub time_zone: String,
    pub country_code: String,
    pub population: String,
    /// Matches name or country
    pub search: String,
}

impl FilterState {
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Name => &self.name,
            Column::Country => &self.country,
            Column::TimeZone => &self.time_zone,
            Column::CountryCode => &self.country_code,
            Column::Population => &self.population,
        }
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        let slot = match column {
            Column::Name => &mut self.name,
            Column::Country => &mut self.country,
            Column::TimeZone => &mut self.time_zone,
            Column::CountryCode => &mut self.country_code,
            Column::Population => &mut self.population,
        };
        *slot = value.into();
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && Column::ALL.iter().all(|c| self.get(*c).is_empty())
    }

    pub fn matches(&self, city: &CityRecord) -> bool {
        let columns_match = Column::ALL.iter().all(|column| {
            let needle = self.get(*column);
            needle.is_empty() || contains_ignore_case(&column.value(city), needle)
        });

        let search_matches = self.search.is_empty()
            || contains_ignore_case(&city.name, &self.search)
            || contains_ignore_case(&city.country, &self.search);

        columns_match && search_matches
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Rows of `list` that satisfy every filter, in their original order.
pub fn apply_filters(list: &[CityRecord], filters: &FilterState) -> Vec<CityRecord> {
    list.iter().filter(|c| filters.matches(c)).cloned().collect()
}

/// Sort `list` in place. The sort is stable.
pub fn sort_cities(list: &mut [CityRecord], sort: SortState) {
    list.sort_by(|a, b| sort.compare(a, b));
}

/// The visible table: filtered, then sorted.
pub fn project(list: &[CityRecord], filters: &FilterState, sort: SortState) -> Vec<CityRecord> {
    let mut visible = apply_filters(list, filters);
    sort_cities(&mut visible, sort);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, country: &str, tz: &str, code: &str, pop: Option<u64>) -> CityRecord {
        CityRecord {
            name: name.to_string(),
            country: country.to_string(),
            time_zone: tz.to_string(),
            country_code: code.to_string(),
            population: pop,
        }
    }

    fn fixture() -> Vec<CityRecord> {
        vec![
            city("Paris", "France", "Europe/Paris", "FR", Some(2_138_551)),
            city("Lyon", "France", "Europe/Paris", "FR", Some(472_317)),
            city("Berlin", "Germany", "Europe/Berlin", "DE", Some(3_426_354)),
            city("Perth", "Australia", "Australia/Perth", "AU", Some(9)),
            city("Oslo", "Norway", "Europe/Oslo", "NO", Some(80_000)),
            city("Lima", "Peru", "America/Lima", "PE", None),
            city("paramaribo", "Suriname", "America/Paramaribo", "SR", Some(223_757)),
        ]
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut filters = FilterState::default();
        filters.set(Column::Name, "PAR");

        let names: Vec<_> = apply_filters(&fixture(), &filters)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Paris", "paramaribo"]);
    }

    #[test]
    fn test_filter_soundness_and_completeness() {
        let list = fixture();
        for column in Column::ALL {
            for needle in ["e", "FR", "pa", "000", "zz", ""] {
                let mut filters = FilterState::default();
                filters.set(column, needle);
                let visible = apply_filters(&list, &filters);

                for c in &list {
                    let expected = column
                        .value(c)
                        .to_lowercase()
                        .contains(&needle.to_lowercase());
                    assert_eq!(
                        visible.contains(c),
                        expected,
                        "{:?} filter {:?} on {}",
                        column,
                        needle,
                        c.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let mut filters = FilterState::default();
        filters.set(Column::Country, "france");
        filters.set(Column::Name, "y");

        let visible = apply_filters(&fixture(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Lyon");
    }

    #[test]
    fn test_search_matches_name_or_country() {
        let filters = FilterState {
            search: "per".to_string(),
            ..FilterState::default()
        };

        let names: Vec<_> = apply_filters(&fixture(), &filters)
            .into_iter()
            .map(|c| c.name)
            .collect();
        // Perth by name, Lima via Peru
        assert_eq!(names, vec!["Perth", "Lima"]);
    }

    #[test]
    fn test_population_filter_on_unknown_population() {
        let mut filters = FilterState::default();
        filters.set(Column::Population, "1");
        let visible = apply_filters(&fixture(), &filters);
        assert!(visible.iter().all(|c| c.population.is_some()));
    }

    #[test]
    fn test_sort_adjacent_pairs_respect_order() {
        let list = fixture();
        for column in Column::ALL {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let sort = SortState { column, order };
                let mut sorted = list.clone();
                sort_cities(&mut sorted, sort);

                for pair in sorted.windows(2) {
                    let ord = column.compare(&pair[0], &pair[1]);
                    match order {
                        SortOrder::Asc => assert_ne!(ord, Ordering::Greater),
                        SortOrder::Desc => assert_ne!(ord, Ordering::Less),
                    }
                }
            }
        }
    }

    #[test]
    fn test_population_sorts_numerically() {
        let mut list = fixture();
        sort_cities(
            &mut list,
            SortState {
                column: Column::Population,
                order: SortOrder::Asc,
            },
        );
        let pops: Vec<_> = list.iter().map(|c| c.population).collect();
        assert_eq!(pops[0], None);
        assert_eq!(pops[1], Some(9));
        assert_eq!(pops[2], Some(80_000));
        assert_eq!(pops.last().copied().flatten(), Some(3_426_354));
    }

    #[test]
    fn test_text_sort_is_case_sensitive_ordinal() {
        let mut list = fixture();
        sort_cities(&mut list, SortState::default());
        // Uppercase sorts before lowercase
        assert_eq!(list.last().map(|c| c.name.as_str()), Some("paramaribo"));
        assert_eq!(list[0].name, "Berlin");
    }

    #[test]
    fn test_toggle_same_column_twice_returns_to_ascending() {
        let mut sort = SortState::default();
        sort.toggle(Column::Country);
        assert_eq!(sort.order, SortOrder::Asc);
        sort.toggle(Column::Country);
        assert_eq!(sort.order, SortOrder::Desc);
        sort.toggle(Column::Country);
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_new_column_starts_ascending() {
        let mut sort = SortState::default();
        sort.toggle(Column::Name);
        assert_eq!(sort.order, SortOrder::Desc);
        sort.toggle(Column::Population);
        assert_eq!(
            sort,
            SortState {
                column: Column::Population,
                order: SortOrder::Asc
            }
        );
    }

    #[test]
    fn test_projection_is_idempotent() {
        let list = fixture();
        let mut filters = FilterState::default();
        filters.set(Column::TimeZone, "europe");
        let sort = SortState {
            column: Column::Population,
            order: SortOrder::Desc,
        };

        let first = project(&list, &filters, sort);
        let second = project(&list, &filters, sort);
        assert_eq!(first, second);
        assert_eq!(project(&first, &filters, sort), first);
    }

    #[test]
    fn test_column_parsing() {
        assert_eq!("timeZone".parse::<Column>().unwrap(), Column::TimeZone);
        assert_eq!("country_code".parse::<Column>().unwrap(), Column::CountryCode);
        assert_eq!("Population".parse::<Column>().unwrap(), Column::Population);
        assert!("temperature".parse::<Column>().is_err());
    }

    #[test]
    fn test_empty_filter_state() {
        let mut filters = FilterState::default();
        assert!(filters.is_empty());
        filters.set(Column::Country, "x");
        assert!(!filters.is_empty());
    }
}
