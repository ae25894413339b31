use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points};

use crate::color::SeriesColors;
use crate::data::model::{columns, Dataset};
use crate::data::view::ViewModel;
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel: filtered table and charts
// ---------------------------------------------------------------------------

/// Render the dashboard body for the current view.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data to show. Open a workbook or reload  (File → Open workbook…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Career Accelerator Program Dashboard");
            ui.add_space(8.0);

            section(ui, "Filtered Customer Data", |ui| table::customer_table(ui, dataset, view));
            section(ui, "Competitor Pricing Insights", |ui| competitor_chart(ui, view));
            section(ui, "Marketing Campaign Performance", |ui| marketing_chart(ui, view));
            section(ui, "Campaign Efficiency", |ui| campaign_scatter(ui, view));
            section(ui, "Survey Insights", |ui| survey_chart(ui, view));
            section(ui, "Enrollment and Revenue Insights", |ui| enrollment_chart(ui, view));
            section(ui, "Age Distribution", |ui| age_histogram(ui, dataset, view));
        });
}

fn section(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    ui.separator();
    ui.strong(title);
    body(ui);
    ui.add_space(12.0);
}

/// Label for integer grid marks on a categorical axis; blank elsewhere.
fn category_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

/// Plot whose x axis is category index `0..labels.len()`.
fn categorical_plot(ui: &mut Ui, id: &str, labels: Vec<String>, add_contents: impl FnOnce(&mut PlotUi)) {
    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, add_contents);
}

/// Runs of consecutive present values as `[x, y]` points, x being the
/// category index. A missing value ends a run so lines show a gap there.
fn segments(values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(y) => current.push([i as f64, *y]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// One line per run of present values, all under the same legend entry.
fn gapped_line(plot_ui: &mut PlotUi, name: &str, color: egui::Color32, values: &[Option<f64>], fill: bool) {
    for run in segments(values) {
        if run.len() == 1 {
            plot_ui.points(Points::new(run).name(name).color(color).radius(3.0));
            continue;
        }
        let line = Line::new(PlotPoints::from(run)).name(name).color(color).width(2.0);
        plot_ui.line(if fill { line.fill(0.0_f32) } else { line });
    }
}

/// Side-by-side bars, one series per value column. Missing values get no bar.
fn grouped_bars(ui: &mut Ui, id: &str, labels: Vec<String>, series: Vec<(String, Vec<Option<f64>>)>) {
    let colors = SeriesColors::new(series.iter().map(|(name, _)| name.clone()));
    let n = series.len().max(1) as f64;
    let width = 0.8 / n;

    categorical_plot(ui, id, labels, |plot_ui| {
        for (s, (name, values)) in series.iter().enumerate() {
            let offset = (s as f64 - (n - 1.0) / 2.0) * width;
            let bars: Vec<Bar> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| Bar::new(i as f64 + offset, v).width(width * 0.95)))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(name).color(colors.color_for(name)));
        }
    });
}

fn competitor_chart(ui: &mut Ui, view: &ViewModel) {
    let agg = &view.competitors;
    let labels: Vec<String> = agg.groups.keys().cloned().collect();
    let series = agg
        .columns
        .iter()
        .map(|col| (col.clone(), agg.series(col).into_iter().map(|(_, v)| v).collect()))
        .collect();
    grouped_bars(ui, "competitor_chart", labels, series);
}

fn marketing_chart(ui: &mut Ui, view: &ViewModel) {
    let agg = &view.marketing;
    let labels: Vec<String> = agg.groups.keys().cloned().collect();
    let colors = SeriesColors::new(agg.columns.iter().cloned());

    categorical_plot(ui, "marketing_chart", labels, |plot_ui| {
        for col in &agg.columns {
            let values: Vec<Option<f64>> = agg.series(col).into_iter().map(|(_, v)| v).collect();
            gapped_line(plot_ui, col, colors.color_for(col), &values, false);
        }
    });
}

/// CTR against conversion rate, one point per campaign type.
fn campaign_scatter(ui: &mut Ui, view: &ViewModel) {
    let agg = &view.marketing;
    let colors = SeriesColors::new(agg.groups.keys().cloned());

    Plot::new("campaign_scatter")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(columns::CTR)
        .y_axis_label(columns::CONVERSION_RATE)
        .show(ui, |plot_ui| {
            for campaign in agg.groups.keys() {
                let (Some(ctr), Some(conv)) = (
                    agg.value(campaign, columns::CTR),
                    agg.value(campaign, columns::CONVERSION_RATE),
                ) else {
                    continue;
                };
                plot_ui.points(
                    Points::new(vec![[ctr, conv]])
                        .name(campaign)
                        .color(colors.color_for(campaign))
                        .radius(6.0),
                );
            }
        });
}

fn survey_chart(ui: &mut Ui, view: &ViewModel) {
    let entries = view.survey.entries();
    let labels: Vec<String> = entries
        .iter()
        .map(|(name, _)| {
            name.trim_start_matches("Feature Importance (")
                .trim_end_matches(')')
                .to_string()
        })
        .collect();
    let colors = SeriesColors::new(labels.iter().cloned());

    categorical_plot(ui, "survey_chart", labels.clone(), |plot_ui| {
        for (i, ((_, mean), label)) in entries.iter().zip(&labels).enumerate() {
            let Some(mean) = mean else { continue };
            let bar = Bar::new(i as f64, *mean).width(0.6);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(colors.color_for(label)));
        }
    });
}

fn enrollment_chart(ui: &mut Ui, view: &ViewModel) {
    let agg = &view.enrollment;
    let labels: Vec<String> = agg
        .groups
        .keys()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    let colors = SeriesColors::new(agg.columns.iter().cloned());

    categorical_plot(ui, "enrollment_chart", labels, |plot_ui| {
        for col in &agg.columns {
            let values: Vec<Option<f64>> = agg.series(col).into_iter().map(|(_, v)| v).collect();
            gapped_line(plot_ui, col, colors.color_for(col), &values, true);
        }
    });
}

fn age_histogram(ui: &mut Ui, dataset: &Dataset, view: &ViewModel) {
    let Some(hist) = &view.age_histogram else {
        ui.label("No ages to plot.");
        return;
    };
    ui.label(format!(
        "{} of {} customers",
        hist.total(),
        dataset.customers.len()
    ));

    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| Bar::new(hist.bin_center(i), count as f64).width(hist.bin_width * 0.95))
        .collect();

    Plot::new("age_histogram")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(columns::AGE)
        .y_axis_label("Customers")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(columns::AGE));
        });
}
