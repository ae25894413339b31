use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::source::DataSource;
use crate::report::{export_filtered_csv, write_report, Report};
use crate::state::{AppState, FilterField};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and key metrics
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            age_range(ui, state);
            ui.separator();

            for field in FilterField::ALL {
                multiselect(ui, state, field);
            }
            ui.separator();

            key_metrics(ui, state);
        });
}

fn age_range(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Age Range");
    let Some((lo, hi)) = state.domain.age_bounds else {
        ui.label("No ages in the customer sheet.");
        return;
    };

    let mut min = state.criteria.age.min;
    let mut max = state.criteria.age.max;
    let min_changed = ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("from").step_by(1.0))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("to").step_by(1.0))
        .changed();

    // Keep the handles from crossing.
    if min_changed && min > max {
        max = min;
    }
    if max_changed && max < min {
        min = max;
    }
    if min_changed || max_changed {
        state.set_age_range(min, max);
    }
}

fn multiselect(ui: &mut Ui, state: &mut AppState, field: FilterField) {
    let options: Vec<String> = field.options(&state.domain).iter().cloned().collect();
    let n_selected = field.selection(&state.criteria).len();
    let n_total = options.len();

    // Empty education/industry selections mean "no restriction"; gender does not.
    let header_text = if n_selected == 0 && field != FilterField::Gender {
        format!("{}  (all)", field.label())
    } else {
        format!("{}  ({n_selected}/{n_total})", field.label())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(field.label())
        .default_open(field == FilterField::Gender)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(field);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(field);
                }
            });

            for val in &options {
                let mut checked = field.selection(&state.criteria).contains(val);
                let label = if val.is_empty() { "<blank>" } else { val.as_str() };
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_filter_value(field, val);
                }
            }
        });
}

fn key_metrics(ui: &mut Ui, state: &AppState) {
    ui.heading("Key Metrics");
    let Some(view) = &state.view else {
        return;
    };
    metric(ui, "Total Revenue", &view.kpis.total_revenue_label());
    metric(ui, "Average CPA", &view.kpis.average_cpa_label());
    metric(ui, "Average ROI", &view.kpis.average_roi_label());
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.label(RichText::new(label).weak());
    ui.label(RichText::new(value).size(22.0).strong());
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open workbook…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            let has_view = state.view.is_some();
            if ui
                .add_enabled(has_view, egui::Button::new("Generate Report…"))
                .clicked()
            {
                save_report_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_view, egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(RichText::new(state.source.to_string()).weak());

        if let Some(ds) = &state.dataset {
            ui.separator();
            ui.label(format!(
                "{} customers loaded, {} visible",
                ds.len(),
                state.visible_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open marketing workbook")
        .add_filter("Excel workbook", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        state.open_source(DataSource::Local(path));
    }
}

fn save_report_dialog(state: &mut AppState) {
    let (Some(ds), Some(view)) = (&state.dataset, &state.view) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save report")
        .add_filter("JSON", &["json"])
        .set_file_name("career_dash_report.json")
        .save_file()
    else {
        return;
    };

    let result = write_report(&path, &Report::new(&state.source, ds, view));
    state.status_message = Some(match result {
        Ok(()) => format!("Report saved to {}", path.display()),
        Err(e) => {
            log::error!("Failed to write report: {e:#}");
            format!("Error: {e:#}")
        }
    });
}

fn export_csv_dialog(state: &mut AppState) {
    let (Some(ds), Some(view)) = (&state.dataset, &state.view) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export filtered customers")
        .add_filter("CSV", &["csv"])
        .set_file_name("filtered_customers.csv")
        .save_file()
    else {
        return;
    };

    let result = export_filtered_csv(&path, ds, view);
    state.status_message = Some(match result {
        Ok(n) => format!("{n} customers exported to {}", path.display()),
        Err(e) => {
            log::error!("Failed to export CSV: {e:#}");
            format!("Error: {e:#}")
        }
    });
}
