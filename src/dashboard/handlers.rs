//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The state used by the handler

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use rusqlite::Connection;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, PAGE_CONTAINER_STYLE, base, error_view, loading_spinner,
    },
    pagination::PaginationConfig,
    report::local_offset,
};

use super::{
    charts::{DashboardChart, ECHARTS_SCRIPT_URL, category_chart, chart_view, price_range_chart},
    state::{DashboardData, DashboardParams, DashboardQuery, load_dashboard},
    tables::{
        DASHBOARD_SYNC, DASHBOARD_TARGET, dashboard_link, error_banner, error_panel, month_name,
        pagination_view, statistics_view, transactions_table,
    },
};

/// How many years the year selector offers, counting back from the current year.
const SELECTABLE_YEARS: i32 = 5;

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection, timezone and page size required
/// by the dashboard handler.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The config that controls the page size of the transactions table.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Display the dashboard for the state in the query string.
///
/// htmx requests get just the dashboard so it can be swapped in place, other
/// requests get the full page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let local_offset = local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);
    let current_year = OffsetDateTime::now_utc().to_offset(local_offset).year();
    let params = DashboardParams::from_query(&query, current_year);

    let data = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Sorry, something went wrong.",
                        "Try again later or check the server logs",
                    ),
                )
                    .into_response();
            }
        };

        load_dashboard(
            params,
            &state.local_timezone,
            &state.pagination_config,
            &connection,
        )
    };

    let dashboard = dashboard_view(&data, current_year, local_offset);

    if is_htmx_request {
        return dashboard.into_response();
    }

    let content = html!(
        main id="dashboard-root" class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Transactions Dashboard" }

            (dashboard)
        }
    );
    let scripts = [HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned())];

    base("Dashboard", &scripts, &content).into_response()
}

/// Renders the swappable part of the dashboard.
///
/// The current state is kept in `data-state` so each response names the
/// state it was rendered for.
fn dashboard_view(data: &DashboardData, current_year: i32, local_offset: UtcOffset) -> Markup {
    let params = &data.params;
    let charts = build_dashboard_charts(data);

    html!(
        div
            id="dashboard"
            data-state=(params.to_query_string())
            class="w-full max-w-screen-xl flex flex-col items-center"
        {
            (controls_view(params, current_year))

            @if let Some(statistics) = &data.statistics {
                (statistics_view(statistics))
            }

            @if let Some(message) = &data.error {
                @if data.show_error_panel() {
                    (error_panel(params, message))
                } @else {
                    (error_banner(message))
                }
            }

            @if !data.show_error_panel() {
                (transactions_table(&data.transactions, local_offset))
                (pagination_view(params, data.total_pages))
            }

            @if !charts.is_empty() {
                section id="charts" class="w-full mx-auto mb-4"
                {
                    div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                    {
                        @for chart in &charts {
                            div { (chart_view(chart)) }
                        }
                    }
                }
            }
        }
    )
}

fn build_dashboard_charts(data: &DashboardData) -> Vec<DashboardChart> {
    let mut charts = Vec::new();

    if let Some(bar_chart) = &data.bar_chart {
        charts.push(DashboardChart {
            id: "price-range-chart",
            options: price_range_chart(bar_chart).to_string(),
        });
    }

    if let Some(categories) = &data.categories {
        charts.push(DashboardChart {
            id: "category-chart",
            options: category_chart(categories).to_string(),
        });
    }

    charts
}

/// The years offered by the year selector, newest first.
///
/// `selected` is included even when it is older than the usual range.
fn selectable_years(current_year: i32, selected: i32) -> Vec<i32> {
    let mut years: Vec<i32> = (0..SELECTABLE_YEARS)
        .map(|years_ago| current_year - years_ago)
        .collect();

    if !years.contains(&selected) {
        years.push(selected);
        years.sort_unstable_by(|a, b| b.cmp(a));
    }

    years
}

/// Renders the search box, the month and year selectors and the buttons.
///
/// Submitting the form, or changing the month or year, goes back to the first page.
fn controls_view(params: &DashboardParams, current_year: i32) -> Markup {
    let spinner = loading_spinner();

    html!(
        form
            id="controls"
            action=(endpoints::DASHBOARD_VIEW)
            method="get"
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-target=(DASHBOARD_TARGET)
            hx-swap="outerHTML"
            hx-push-url="true"
            hx-sync=(DASHBOARD_SYNC)
            hx-indicator="#indicator"
            hx-trigger="submit, change from:#month, change from:#year"
            class="w-full flex flex-wrap items-end gap-4 mb-4"
        {
            input type="hidden" name="page" value="1";

            div class="grow"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="text"
                    name="search"
                    placeholder="Search here"
                    value=(params.search)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[params.month.is_none()] { "All Items" }

                    @for month in 1..=12u8 {
                        option value=(month) selected[params.month == Some(month)]
                        {
                            (month_name(month))
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                select id="year" name="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in selectable_years(current_year, params.year) {
                        option value=(year) selected[params.year == year] { (year) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (spinner) }
                "Search"
            }

            (dashboard_link(&params.clear(), "Clear", BUTTON_SECONDARY_STYLE))
        }
    )
}
