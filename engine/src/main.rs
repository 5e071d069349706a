// Dashboard entry point: one fetch-compute-render cycle per invocation
use anyhow::Context;
use clap::Parser;
use engine::cli::CliArgs;
use engine::config::DashboardSettings;
use engine::data::provider_from_settings;
use engine::logging::init_logging;
use engine::pipeline::Dashboard;
use engine::presentation::{HtmlPresenter, JsonPresenter, Presenter, TerminalPresenter};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = CliArgs::parse();

    let mut settings = DashboardSettings::load(args.config.as_deref()).context("Failed to load settings")?;
    args.apply_to(&mut settings);
    let request = args.request(&settings);

    info!(
        symbol = %request.ticker,
        interval = %request.interval,
        period = %request.period,
        source = ?settings.data.source,
        config_version = %settings.version,
        "Starting Ticker Dashboard..."
    );

    let provider = provider_from_settings(&settings.data)?;
    let dashboard = Dashboard::new(provider, &settings)?;
    let view = dashboard.render(&request).map_err(|e| {
        tracing::error!(error_detail = %e, "Dashboard cycle failed");
        e
    })?;

    let mut presenters: Vec<Box<dyn Presenter>> = Vec::new();
    match &args.json {
        Some(path) => presenters.push(Box::new(JsonPresenter::new(path.clone()))),
        None => presenters.push(Box::new(TerminalPresenter::new())),
    }
    if let Some(path) = &args.html {
        presenters.push(Box::new(HtmlPresenter::new(path, settings.chart.width)));
    }
    for presenter in &presenters {
        presenter.present(&view)?;
    }

    Ok(())
}
