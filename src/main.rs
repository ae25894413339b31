use std::path::Path;

use anyhow::Context;
use career_dash::app::CareerDashApp;
use career_dash::config::Config;
use career_dash::data::filter::{CustomerDomain, FilterCriteria};
use career_dash::data::loader::load_dataset;
use career_dash::data::view::render_view;
use career_dash::report::{write_report, Report};
use career_dash::state::AppState;
use clap::Parser;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::parse();
    log::info!("Data source: {}", config.data_source());

    if let Some(path) = &config.report {
        return write_headless_report(&config, path);
    }

    let mut state = AppState::new(config.data_source(), config.timeout());
    state.load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Career Dash – Program Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CareerDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Load, compute the initial view and write its report without a window.
fn write_headless_report(config: &Config, path: &Path) -> anyhow::Result<()> {
    let source = config.data_source();
    let dataset = load_dataset(&source, config.timeout())
        .with_context(|| format!("loading workbook from {source}"))?;
    let domain = CustomerDomain::from_customers(&dataset.customers);
    let view = render_view(&dataset, &FilterCriteria::initial(&domain));
    write_report(path, &Report::new(&source, &dataset, &view))
}
