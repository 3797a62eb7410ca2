//! Replays recorded console data offline.
//!
//! ```text
//! traffic-console render <snapshot.json> [vehicles|traffic|network]
//! traffic-console analyze <kpi.json>
//! ```

use std::process::ExitCode;

use traffic_console::render::{FrameRenderer, RecordingCanvas, RenderOptions, ViewMode};
use traffic_console::{AnalyticsConfig, DerivedAnalytics, KpiBundle, Result, SimulationSnapshot};

const CANVAS_WIDTH: f64 = 1200.0;
const CANVAS_HEIGHT: f64 = 800.0;

const USAGE: &str = "usage: traffic-console render <snapshot.json> [vehicles|traffic|network]
       traffic-console analyze <kpi.json>";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();
    let result = match args[..] {
        ["render", path] => render(path, ViewMode::default()),
        ["render", path, mode] => match mode.parse() {
            Ok(mode) => render(path, mode),
            Err(err) => {
                eprintln!("{}\n{}", err, USAGE);
                return ExitCode::FAILURE;
            }
        },
        ["analyze", path] => analyze(path),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Draws one frame of a recorded snapshot and returns its draw commands.
fn render(path: &str, mode: ViewMode) -> Result<String> {
    let snapshot: SimulationSnapshot = serde_json::from_str(&std::fs::read_to_string(path)?)?;

    let mut canvas = RecordingCanvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    let options = RenderOptions {
        mode,
        ..Default::default()
    };
    FrameRenderer::default().render(&mut canvas, Some(&snapshot), &options);
    log::info!(
        "rendered {} vehicles as {} draw commands",
        snapshot.vehicles.len(),
        canvas.commands().len()
    );
    Ok(canvas.to_json().to_string())
}

/// Derives the results views from a downloaded KPI bundle.
fn analyze(path: &str) -> Result<String> {
    let bundle: KpiBundle = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let analytics = DerivedAnalytics::build(&bundle, &AnalyticsConfig::default());
    Ok(serde_json::to_string_pretty(&analytics)?)
}
