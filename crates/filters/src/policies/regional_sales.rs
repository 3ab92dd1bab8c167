use super::build_year_range;
use crate::range::RowChecks;
use crate::{DatasetKind, FilterContext, FilterPolicy, NumericRange};
use housefilter_formats::Table;
use serde::{Deserialize, Serialize};

const PRICE: &str = "Price";
const BEDROOMS: &str = "number of bedrooms";
const BATHROOMS: &str = "number of bathrooms";
const LIVING_AREA: &str = "living area";
const LOT_AREA: &str = "lot area";
const LATITUDE: &str = "Lattitude";
const LONGITUDE: &str = "Longitude";
const BUILT_YEAR: &str = "Built Year";

/// Detailed regional sales listings.
///
/// Coordinates are only required to be present and not the `(0, 0)`
/// placeholder; the region is not bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalSalesPolicy {
    pub price: NumericRange,
    pub bedrooms: NumericRange,
    pub bathrooms: NumericRange,
    pub living_area: NumericRange,
    pub lot_area: NumericRange,
    pub earliest_build_year: f64,
}

impl Default for RegionalSalesPolicy {
    fn default() -> Self {
        Self {
            price: NumericRange::inclusive(50_000.0, 500_000_000.0),
            bedrooms: NumericRange::inclusive(1.0, 20.0),
            bathrooms: NumericRange::inclusive(0.5, 15.0),
            living_area: NumericRange::above(0.0, 50_000.0),
            lot_area: NumericRange::above(0.0, 1_000_000.0),
            earliest_build_year: 1800.0,
        }
    }
}

impl FilterPolicy for RegionalSalesPolicy {
    fn kind(&self) -> DatasetKind {
        DatasetKind::RegionalSales
    }

    fn apply(&self, table: &Table, ctx: &FilterContext) -> Table {
        RowChecks::for_table(table)
            .in_range(PRICE, self.price)
            .in_range(BEDROOMS, self.bedrooms)
            .in_range(BATHROOMS, self.bathrooms)
            .in_range(LIVING_AREA, self.living_area)
            .in_range(LOT_AREA, self.lot_area)
            .coordinates(LATITUDE, LONGITUDE, None)
            .in_range(
                BUILT_YEAR,
                build_year_range(self.earliest_build_year, ctx.current_year),
            )
            .apply()
    }

    fn describe(&self, ctx: &FilterContext) -> Vec<String> {
        vec![
            format!("{} in {}", PRICE, self.price),
            format!("{} in {}", BEDROOMS, self.bedrooms),
            format!("{} in {}", BATHROOMS, self.bathrooms),
            format!("{} in {}", LIVING_AREA, self.living_area),
            format!("{} in {}", LOT_AREA, self.lot_area),
            format!("{} / {} present and not both 0", LATITUDE, LONGITUDE),
            format!(
                "{} in {}",
                BUILT_YEAR,
                build_year_range(self.earliest_build_year, ctx.current_year)
            ),
        ]
    }
}
