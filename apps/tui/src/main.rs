use clap::Parser;
use color_eyre::Result;
use shadowcheck_tui::app::{App, AppActions};
use shadowcheck_tui::cli::CliArgs;
use shadowcheck_tui::config::AppConfig;
use shadowcheck_tui::event::{self, HeadlessRequest};
use shadowcheck_tui::logging::{self, LogTarget};
use shadowcheck_tui::terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = AppConfig::from_env()?;

    let view = args.view_mode()?;
    let filters = args.filter_state()?;
    let sort = args.sort_model()?;

    // Piped output gets plain rows instead of the dashboard.
    let headless = args.wants_headless() || !is_terminal();
    if headless {
        logging::init(LogTarget::Stderr, args.debug)?;
    } else {
        logging::init(LogTarget::File(&config.log_path), args.debug)?;
    }
    tracing::info!(
        api = %config.api_base_url,
        view = view.as_str(),
        headless,
        "starting shadowcheck"
    );

    let mut actions = AppActions::new(&config)?;
    if let Err(e) = actions.initialize(&config.database_url).await {
        tracing::warn!(error = %e, "preference database unavailable, preferences will not be saved");
    }

    if headless {
        let request = HeadlessRequest {
            view,
            filters,
            sort,
            limit: args.limit,
            json: args.json,
            csv: args.csv.clone(),
        };
        return event::run_headless(&actions, request).await;
    }

    let mut app = App::new(actions, view);
    app.load_preferences().await;
    app.apply_startup_query(filters, sort).await;

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    result
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
