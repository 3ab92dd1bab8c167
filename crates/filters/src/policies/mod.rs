//! The built-in filter policies, one per dataset kind

mod county_sales;
mod generic;
mod index_by_year;
mod numeric_index;
mod regional_sales;

pub use county_sales::CountySalesPolicy;
pub use generic::GenericPolicy;
pub use index_by_year::IndexByYearPolicy;
pub use numeric_index::NumericIndexPolicy;
pub use regional_sales::RegionalSalesPolicy;

use crate::NumericRange;

/// `[1800, current_year]`
pub(crate) fn build_year_range(earliest: f64, current_year: i32) -> NumericRange {
    NumericRange::inclusive(earliest, f64::from(current_year))
}
