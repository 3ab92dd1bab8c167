use crate::dates::parse_date_cell;
use crate::range::RowChecks;
use crate::{DatasetKind, FilterContext, FilterPolicy, NumericRange};
use housefilter_formats::{Cell, ColumnType, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DATE: &str = "date";
const PRICE: &str = "price";

/// Year-indexed price change series.
///
/// The `date` column is parsed and stored as a datetime; rows whose date
/// cannot be read are dropped. `price` holds a percentage change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexByYearPolicy {
    pub price: NumericRange,
}

impl Default for IndexByYearPolicy {
    fn default() -> Self {
        Self {
            price: NumericRange::inclusive(-200.0, 200.0),
        }
    }
}

impl FilterPolicy for IndexByYearPolicy {
    fn kind(&self) -> DatasetKind {
        DatasetKind::IndexByYear
    }

    fn apply(&self, table: &Table, _ctx: &FilterContext) -> Table {
        let parsed = match table.column_index(DATE) {
            Some(idx) => {
                let converted = table.map_column(idx, ColumnType::DateTime, |cell| {
                    parse_date_cell(cell).map_or(Cell::Null, Cell::DateTime)
                });
                debug!(
                    "Parsed {} of {} dates",
                    converted.height() - converted.null_counts()[idx],
                    converted.height()
                );
                converted
            }
            None => table.clone(),
        };

        RowChecks::for_table(&parsed)
            .not_null(DATE)
            .in_range(PRICE, self.price)
            .apply()
    }

    fn describe(&self, _ctx: &FilterContext) -> Vec<String> {
        vec![
            format!("{} parsed as a date, unreadable dates dropped", DATE),
            format!("{} in {}", PRICE, self.price),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_util::{assert_well_behaved, ctx, table};
    use chrono::NaiveDate;

    #[test]
    fn test_parses_dates_and_drops_bad_ones() {
        let input = table("date,price\n2001-01-01,3.5\nsoon,2.0\n,1.0\n2003,4.0\n");
        let kept = IndexByYearPolicy::default().apply(&input, &ctx());

        assert_eq!(kept.height(), 2);
        assert_eq!(kept.column_type(0), ColumnType::DateTime);
        let expected = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(kept.rows()[1][0], Cell::DateTime(expected));
    }

    #[test]
    fn test_integer_years() {
        let input = table("date,price\n1999,1.0\n2000,2.0\n");
        let kept = IndexByYearPolicy::default().apply(&input, &ctx());
        assert_eq!(kept.height(), 2);
        assert_eq!(kept.rows()[0][0].to_string(), "1999-01-01");
    }

    #[test]
    fn test_price_bounds() {
        let input = table("date,price\n2001,-200\n2002,200.5\n2003,\n2004,0\n");
        let kept = IndexByYearPolicy::default().apply(&input, &ctx());
        assert_eq!(kept.height(), 2);
    }

    #[test]
    fn test_without_date_column() {
        let input = table("price\n10\n300\n");
        let kept = IndexByYearPolicy::default().apply(&input, &ctx());
        assert_eq!(kept.height(), 1);
        assert_eq!(kept.column_types(), input.column_types());
    }

    #[test]
    fn test_well_behaved() {
        let input = table("date,price\n2001-01-01,3.5\nsoon,2.0\n2002-06,250\n");
        assert_well_behaved(&IndexByYearPolicy::default(), &input);
    }
}
