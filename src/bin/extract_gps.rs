use gsyrocks::models::GeoCoordinate;
use gsyrocks::services::gps::extract_gps_with_source;
use serde_json::json;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PRECISION: u32 = 6;

fn print_help() {
    eprintln!(
        "\
Usage: extract_gps [OPTIONS] FILE...

Print the GPS position embedded in each image, one line per file.

Options:
  --json                Output one JSON object per line
  --precision=N         Decimal places for coordinates (default: 6)
  --help                Show this help message"
    );
}

/// Rounded for output; a precision that would collapse the position onto
/// (0, 0) prints it unrounded instead.
fn display_coordinates(coordinates: GeoCoordinate, precision: u32) -> GeoCoordinate {
    coordinates.round(precision).unwrap_or(coordinates)
}

fn main() -> ExitCode {
    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gsyrocks=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help") {
        print_help();
        return ExitCode::from(2);
    }

    let json_output = args.iter().any(|a| a == "--json");
    let precision: u32 = args
        .iter()
        .find_map(|a| a.strip_prefix("--precision="))
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PRECISION);
    let files: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let mut failed = false;
    for file in files {
        let path = Path::new(file);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                failed = true;
                if json_output {
                    println!("{}", json!({ "file": file, "error": e.to_string() }));
                } else {
                    eprintln!("{}: {}", file, e);
                }
                continue;
            }
        };

        let mime = mime_guess::from_path(path).first_raw();
        let fix = extract_gps_with_source(&bytes, mime);

        if json_output {
            println!(
                "{}",
                json!({
                    "file": file,
                    "coordinates": fix.map(|f| display_coordinates(f.coordinates, precision)),
                    "source": fix.map(|f| f.source),
                })
            );
        } else {
            match fix {
                Some(fix) => {
                    let c = display_coordinates(fix.coordinates, precision);
                    println!(
                        "{}\t{}, {}\t{}",
                        file,
                        c.latitude(),
                        c.longitude(),
                        fix.source
                    );
                }
                None => println!("{}\tno GPS data", file),
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
