use clap::Parser;
use serde::{Deserialize, Serialize};

use heliocast::analysis::{self, WeatherAnalysis};
use heliocast::forecast::{ForecastPoint, Forecaster, GeoLocation};
use heliocast::server;
use heliocast::weather::{HourlyChannels, WeatherSeries};

/// Heliocast — hourly solar irradiance forecasts from fetched weather data.
///
/// Reads an already-downloaded hourly weather JSON (either the provider's
/// response with an "hourly" object, or that object on its own), runs the
/// forecast engine for the given coordinates, and prints the result as
/// JSON on stdout with a human summary on stderr.
///
/// Examples:
///   heliocast --lat 40.0 --lon -74.0 --weather hourly.json
///   heliocast --lat 59.33 --lon 18.07 --weather hourly.json --analysis
///   heliocast --serve --port 8080
#[derive(Parser)]
#[command(name = "heliocast", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Path to the hourly weather JSON file.
    #[arg(long, short = 'w')]
    weather: Option<String>,

    /// Also run the trend/alert/quality analysis on the series.
    #[arg(long)]
    analysis: bool,

    /// Start the HTTP service instead of a one-shot run.
    #[arg(long)]
    serve: bool,

    /// Bind host for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port for --serve.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

/// Provider response wrapper: the channels live under "hourly".
#[derive(Deserialize)]
struct WeatherDocument {
    hourly: HourlyChannels,
}

#[derive(Serialize)]
struct CliReport {
    latitude: f64,
    longitude: f64,
    forecast: Vec<ForecastPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<WeatherAnalysis>,
}

fn main() {
    let cli = Cli::parse();

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, cli.port));
        return;
    }

    let (lat, lon) = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            eprintln!("Error: No location specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  heliocast --lat 40.0 --lon -74.0 --weather hourly.json");
            eprintln!("  heliocast --serve");
            std::process::exit(1);
        }
    };

    let location = GeoLocation::new(lat, lon).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let weather_path = cli.weather.unwrap_or_else(|| {
        eprintln!("Error: No weather file specified. Use --weather <file.json>.");
        std::process::exit(1);
    });

    let series = load_weather(&weather_path).unwrap_or_else(|e| {
        eprintln!("Error: Cannot load '{}': {}", weather_path, e);
        std::process::exit(1);
    });

    let points = Forecaster::new(location).forecast(&series);
    let summary = cli.analysis.then(|| analysis::analyze(&series));

    // Human summary to stderr, JSON to stdout
    eprint!("{}", render_summary(&location, &points));
    if let Some(ref s) = summary {
        eprint!("{}", render_analysis(s));
    }

    let report = CliReport {
        latitude: location.latitude(),
        longitude: location.longitude(),
        forecast: points,
        analysis: summary,
    };
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

/// Load an hourly weather series from a JSON file, accepting either the
/// provider's full response or a bare channels object.
fn load_weather(path: &str) -> Result<WeatherSeries, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let hourly = match serde_json::from_str::<WeatherDocument>(&content) {
        Ok(doc) => doc.hourly,
        Err(_) => serde_json::from_str::<HourlyChannels>(&content)?,
    };
    Ok(WeatherSeries::from_hourly(&hourly)?)
}

// ─── Stderr summary rendering ────────────────────────────────────

fn render_summary(location: &GeoLocation, points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  Forecast for {:.4}, {:.4} \u{2014} {} hours (UTC)\n",
        location.latitude(),
        location.longitude(),
        points.len()
    ));

    for p in points {
        let bar_len = ((p.predicted_irradiance / 1000.0) * 20.0).round() as usize;
        let bar: String = "\u{2588}".repeat(bar_len.min(20));
        out.push_str(&format!(
            "  {}  {:>6.0} W/m\u{b2}  conf {:.2}  {}\n",
            p.time.format("%m-%d %H:%M"),
            p.predicted_irradiance,
            p.confidence,
            bar
        ));
    }

    if let Some(peak) = points
        .iter()
        .max_by(|a, b| a.predicted_irradiance.total_cmp(&b.predicted_irradiance))
    {
        if peak.predicted_irradiance > 0.0 {
            out.push_str(&format!(
                "  Peak {:.0} W/m\u{b2} at {}\n",
                peak.predicted_irradiance,
                peak.time.format("%H:%M")
            ));
        }
    }
    out
}

fn render_analysis(summary: &WeatherAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  Quality {:.2}  trends: temp {:+.2}\u{b0}C/h cloud {:+.1}%/h pressure {:+.2} hPa/h\n",
        summary.forecast_quality,
        summary.trends.temperature,
        summary.trends.cloud_cover,
        summary.trends.pressure
    ));

    let alerts = &summary.alerts;
    let active: Vec<&str> = [
        ("cloud", alerts.cloud_cover),
        ("temperature", alerts.temperature),
        ("wind", alerts.wind),
        ("pressure", alerts.pressure),
        ("precipitation", alerts.precipitation),
    ]
    .iter()
    .filter_map(|(name, on)| on.then_some(*name))
    .collect();

    if active.is_empty() {
        out.push_str("  No active weather alerts\n");
    } else {
        out.push_str(&format!("  \u{26A0} Alerts: {}\n", active.join(", ")));
    }
    out
}
