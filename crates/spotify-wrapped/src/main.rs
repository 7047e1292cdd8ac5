mod bootstrap;
mod report;

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use wrapped_core::settings::Settings;
use wrapped_core::time_utils::{resolve_timezone, TimezoneHandler};
use wrapped_data::filter::parse_calendar_date;
use wrapped_data::reader::expand_inputs;
use wrapped_runtime::session::Session;
use wrapped_runtime::store::{ingest, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("spotify-wrapped v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Timezone: {}, Top: {}, Format: {}",
        settings.timezone,
        settings.top,
        settings.format
    );

    let tz = TimezoneHandler::from_tz(resolve_timezone(&settings.timezone)?);
    let year = tz.now().year();

    let files = expand_inputs(&settings.inputs)?;
    tracing::info!("Loading {} file(s)", files.len());

    let store = SessionStore::new();
    let session = ingest(&store, files, tz, year)
        .await?
        .ok_or_else(|| anyhow!("batch was superseded before it could be committed"))?;

    let session = apply_requested_range(&session, &settings)?;
    let stats = session.stats();

    if let Some(path) = &settings.output {
        let json = report::render_json(stats)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing stats to {}", path.display()))?;
        tracing::info!("Stats written to {}", path.display());
    }

    match settings.format.as_str() {
        "json" => println!("{}", report::render_json(stats)?),
        _ => {
            let label = session
                .supports_filtering()
                .then(|| session.range().describe(session.timezone()));
            print!(
                "{}",
                report::render_text(stats, label.as_deref(), usize::from(settings.top))
            );
        }
    }

    Ok(())
}

/// Apply `--preset` or `--from/--to` to a freshly loaded session.
fn apply_requested_range(session: &Session, settings: &Settings) -> Result<Session> {
    if !settings.wants_date_filter() {
        return Ok(session.clone());
    }
    if let Some(preset) = &settings.preset {
        return Ok(session.apply_preset(preset, session.timezone().now())?);
    }

    match (&settings.from, &settings.to) {
        (Some(from), Some(to)) => {
            let start = parse_calendar_date(from)?;
            let end = parse_calendar_date(to)?;
            Ok(session.apply_custom(start, end)?)
        }
        _ => Ok(session.clone()),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
