use super::build_year_range;
use crate::range::RowChecks;
use crate::{DatasetKind, FilterContext, FilterPolicy, NumericRange};
use housefilter_formats::Table;
use serde::{Deserialize, Serialize};

const PRICE: &str = "price";
const BEDROOMS: &str = "bedrooms";
const BATHROOMS: &str = "bathrooms";
const SQFT_LIVING: &str = "sqft_living";
const SQFT_LOT: &str = "sqft_lot";
const LATITUDE: &str = "lat";
const LONGITUDE: &str = "long";
const YEAR_BUILT: &str = "yr_built";
const GRADE: &str = "grade";

/// County sales records, with coordinates bounded to the county.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountySalesPolicy {
    pub price: NumericRange,
    pub bedrooms: NumericRange,
    pub bathrooms: NumericRange,
    pub sqft_living: NumericRange,
    pub sqft_lot: NumericRange,
    pub latitude: NumericRange,
    pub longitude: NumericRange,
    pub earliest_build_year: f64,
    pub grade: NumericRange,
}

impl Default for CountySalesPolicy {
    fn default() -> Self {
        Self {
            price: NumericRange::inclusive(10_000.0, 50_000_000.0),
            bedrooms: NumericRange::inclusive(0.0, 20.0),
            bathrooms: NumericRange::inclusive(0.0, 15.0),
            sqft_living: NumericRange::above(0.0, 20_000.0),
            sqft_lot: NumericRange::above(0.0, 2_000_000.0),
            latitude: NumericRange::inclusive(47.0, 48.0),
            longitude: NumericRange::inclusive(-122.6, -121.0),
            earliest_build_year: 1800.0,
            grade: NumericRange::inclusive(1.0, 13.0),
        }
    }
}

impl FilterPolicy for CountySalesPolicy {
    fn kind(&self) -> DatasetKind {
        DatasetKind::CountySales
    }

    fn apply(&self, table: &Table, ctx: &FilterContext) -> Table {
        RowChecks::for_table(table)
            .in_range(PRICE, self.price)
            .in_range(BEDROOMS, self.bedrooms)
            .in_range(BATHROOMS, self.bathrooms)
            .in_range(SQFT_LIVING, self.sqft_living)
            .in_range(SQFT_LOT, self.sqft_lot)
            .coordinates(LATITUDE, LONGITUDE, Some((self.latitude, self.longitude)))
            .in_range(
                YEAR_BUILT,
                build_year_range(self.earliest_build_year, ctx.current_year),
            )
            .in_range(GRADE, self.grade)
            .apply()
    }

    fn describe(&self, ctx: &FilterContext) -> Vec<String> {
        vec![
            format!("{} in {}", PRICE, self.price),
            format!("{} in {}", BEDROOMS, self.bedrooms),
            format!("{} in {}", BATHROOMS, self.bathrooms),
            format!("{} in {}", SQFT_LIVING, self.sqft_living),
            format!("{} in {}", SQFT_LOT, self.sqft_lot),
            format!("{} in {}, {} in {}", LATITUDE, self.latitude, LONGITUDE, self.longitude),
            format!(
                "{} in {}",
                YEAR_BUILT,
                build_year_range(self.earliest_build_year, ctx.current_year)
            ),
            format!("{} in {}", GRADE, self.grade),
        ]
    }
}
