//! Table views for dashboard data display.
//!
//! Provides the transactions table, the statistics summary, the pagination
//! controls and the panel shown when the transactions could not be loaded.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    html::{
        BUTTON_DISABLED_STYLE, BUTTON_SECONDARY_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency,
    },
    report::MonthlyStatistics,
    transaction::Transaction,
};

use super::state::DashboardParams;

/// The element that htmx swaps with each new dashboard state.
pub(super) const DASHBOARD_TARGET: &str = "#dashboard";
/// Requests from every control are synchronised on this element so a newer
/// request aborts the one in flight.
pub(super) const DASHBOARD_SYNC: &str = "#dashboard-root:replace";

const TABLE_HEADERS: [&str; 7] = [
    "Title",
    "Price",
    "Description",
    "Category",
    "Sold",
    "Image",
    "Date of Sale",
];

const STATISTIC_CARD_STYLE: &str = "flex flex-col p-4 rounded-lg shadow bg-white dark:bg-gray-800";
const STATISTIC_LABEL_STYLE: &str = "text-sm text-gray-500 dark:text-gray-400";
const STATISTIC_VALUE_STYLE: &str = "text-2xl font-semibold";

/// A link to another dashboard state that swaps the dashboard in place when
/// htmx is available.
pub(super) fn dashboard_link(params: &DashboardParams, text: &str, style: &str) -> Markup {
    let url = params.to_url();

    html! {
        a
            href=(url)
            hx-get=(url)
            hx-target=(DASHBOARD_TARGET)
            hx-swap="outerHTML"
            hx-push-url="true"
            hx-sync=(DASHBOARD_SYNC)
            hx-indicator="#indicator"
            class=(style)
        {
            (text)
        }
    }
}

/// Renders the sales figures for the selected month.
pub(super) fn statistics_view(statistics: &MonthlyStatistics) -> Markup {
    html! {
        section id="statistics" class="w-full mb-4"
        {
            h2 class="text-xl font-semibold mb-2"
            {
                "Statistics for " (month_name(statistics.month)) " " (statistics.year)
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                div class=(STATISTIC_CARD_STYLE)
                {
                    span class=(STATISTIC_LABEL_STYLE) { "Total Sale Amount" }
                    span class=(STATISTIC_VALUE_STYLE) data-statistic="total-sale"
                    {
                        (format_currency(statistics.total_sale))
                    }
                }

                div class=(STATISTIC_CARD_STYLE)
                {
                    span class=(STATISTIC_LABEL_STYLE) { "Total Sold Items" }
                    span class=(STATISTIC_VALUE_STYLE) data-statistic="sold"
                    {
                        (statistics.sold_items_count)
                    }
                }

                div class=(STATISTIC_CARD_STYLE)
                {
                    span class=(STATISTIC_LABEL_STYLE) { "Total Not Sold Items" }
                    span class=(STATISTIC_VALUE_STYLE) data-statistic="not-sold"
                    {
                        (statistics.not_sold_items_count)
                    }
                }
            }
        }
    }
}

/// Renders one page of transactions.
///
/// Sale dates are shown in `local_offset`.
pub(super) fn transactions_table(transactions: &[Transaction], local_offset: UtcOffset) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow mb-4"
        {
            table id="transactions" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for header in TABLE_HEADERS {
                            th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.title) }
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
                            {
                                (format_currency(transaction.price))
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(TABLE_CELL_STYLE) { (transaction.category) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if transaction.sold { "Yes" } @else { "No" }
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if transaction.image.is_empty() {
                                    "No Image"
                                } @else {
                                    img
                                        src=(transaction.image)
                                        alt=(transaction.title)
                                        width="50"
                                        height="50"
                                        class="w-[50px] h-[50px] object-contain";
                                }
                            }
                            td class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
                            {
                                (transaction.date_of_sale.to_offset(local_offset).date())
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="7" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the previous and next page controls.
///
/// The controls never lead outside `1..=total_pages`.
pub(super) fn pagination_view(params: &DashboardParams, total_pages: u64) -> Markup {
    let total_pages = total_pages.max(1);

    html! {
        nav id="pagination" class="flex items-center justify-center gap-4 mb-8"
        {
            @match params.previous_page(total_pages) {
                Some(previous) => {
                    (dashboard_link(&previous, "Previous Page", BUTTON_SECONDARY_STYLE))
                }
                None => {
                    span aria-disabled="true" class=(BUTTON_DISABLED_STYLE) { "Previous Page" }
                }
            }

            span { "Page " (params.page) " of " (total_pages) }

            @match params.next_page(total_pages) {
                Some(next) => {
                    (dashboard_link(&next, "Next Page", BUTTON_SECONDARY_STYLE))
                }
                None => {
                    span aria-disabled="true" class=(BUTTON_DISABLED_STYLE) { "Next Page" }
                }
            }
        }
    }
}

/// Replaces the table when a query failed and there is nothing to show.
pub(super) fn error_panel(params: &DashboardParams, message: &str) -> Markup {
    html! {
        div
            id="error-panel"
            role="alert"
            class="w-full flex flex-col items-center gap-4 p-6 mb-4 rounded-lg
                text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400"
        {
            p { "Error: " (message) }

            (dashboard_link(&params.clear(), "Return to Full List", BUTTON_SECONDARY_STYLE))
        }
    }
}

/// Shown above the table when a query failed but some transactions loaded.
pub(super) fn error_banner(message: &str) -> Markup {
    html! {
        p
            id="error-banner"
            role="alert"
            class="w-full p-4 mb-4 text-sm rounded-lg text-red-800 bg-red-50
                dark:bg-gray-800 dark:text-red-400"
        {
            "Error: " (message)
        }
    }
}

/// The English name of `month`, e.g. "March" for 3.
pub(super) fn month_name(month: u8) -> &'static str {
    time::Month::try_from(month).map_or("Unknown", |month| match month {
        time::Month::January => "January",
        time::Month::February => "February",
        time::Month::March => "March",
        time::Month::April => "April",
        time::Month::May => "May",
        time::Month::June => "June",
        time::Month::July => "July",
        time::Month::August => "August",
        time::Month::September => "September",
        time::Month::October => "October",
        time::Month::November => "November",
        time::Month::December => "December",
    })
}
