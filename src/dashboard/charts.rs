//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for the selected month:
//! - **Price Range Chart**: Number of products sold in each price range
//! - **Category Chart**: Share of the month's items in each category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered as a container with the script that draws into it. The script runs
//! as soon as it is inserted, so charts also draw after an htmx swap.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::report::{BarChartData, CategoryCount};

/// The ECharts build loaded by the dashboard page.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the container for `chart` followed by the script that draws it.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="min-h-[380px] rounded dark:bg-gray-100"
        {}

        script { (chart_script(chart)) }
    )
}

/// Generates the JavaScript that initializes the ECharts instance for `chart`.
///
/// The chart follows the system colour scheme and resizes with the window.
fn chart_script(chart: &DashboardChart) -> PreEscaped<String> {
    PreEscaped(format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            if (!chartDom || typeof echarts === "undefined") {{
                return;
            }}
            const chart = echarts.init(chartDom);
            const option = {};
            chart.setOption(option);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                const isDarkMode = darkModeMediaQuery.matches;
                chart.setTheme(isDarkMode ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#,
        chart.id, chart.options
    ))
}

pub(super) fn price_range_chart(bar_chart: &BarChartData) -> Chart {
    let labels: Vec<&str> = bar_chart.data.iter().map(|bucket| bucket.range).collect();
    let counts: Vec<f64> = bar_chart
        .data
        .iter()
        .map(|bucket| bucket.count as f64)
        .collect();

    Chart::new()
        .title(Title::new().text("Price Range").subtext("Items sold in the month, any year"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Number of Products").data(counts))
}

pub(super) fn category_chart(categories: &[CategoryCount]) -> Chart {
    let slices: Vec<(f64, &str)> = categories
        .iter()
        .map(|category| (category.count as f64, category.category.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Categories").subtext("Items sold in the month"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Items")
                .radius(vec!["40%", "70%"])
                .data(slices),
        )
}
