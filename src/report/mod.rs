//! Monthly reports over the stored transactions: sales statistics, the price
//! range histogram and the per-category breakdown.

mod bar_chart;
mod categories;
mod handlers;
mod period;
mod statistics;

pub use bar_chart::{BarChartData, get_price_range_histogram};
pub use categories::{CategoryCount, get_category_counts};
pub use handlers::{get_bar_chart, get_categories, get_combined, get_statistics};
pub use period::{MonthPeriod, local_offset, local_timezone};
pub use statistics::{MonthlyStatistics, get_monthly_statistics};

#[cfg(test)]
pub(crate) use bar_chart::bucket_prices;
