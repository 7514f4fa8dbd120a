//! # Laudo CLI
//!
//! Usage:
//!   laudo report.json -o report.pdf
//!   echo '{ ... }' | laudo -o report.pdf
//!   laudo --example > report.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        match fs::read_to_string(&args[1]) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("✗ Failed to read {}: {}", args[1], e);
                std::process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("✗ Failed to read stdin: {}", e);
            std::process::exit(1);
        }
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "report.pdf".to_string());

    let report: laudo::Report = match serde_json::from_str(&input) {
        Ok(report) => report,
        Err(e) => {
            let err: laudo::Error = e.into();
            eprintln!("✗ {}", err);
            std::process::exit(1);
        }
    };

    match laudo::render_to_file(&report, Path::new(&output_path)) {
        Ok(warnings) => {
            for warning in &warnings {
                eprintln!("⚠ {}", warning);
            }
            let size = fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
            eprintln!("✓ Written {} bytes to {}", size, output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_report_json() -> String {
    let mut report = laudo::Report::with_defaults();
    report.patient = laudo::Patient {
        animal_name: "Rex".to_string(),
        species: "Canine".to_string(),
        breed: "Labrador Retriever".to_string(),
        age: "7 years".to_string(),
        owner: "J. Martins".to_string(),
        date: "2026-08-24".to_string(),
    };
    let mut json = serde_json::to_string_pretty(&report).unwrap_or_default();
    json.push('\n');
    json
}
