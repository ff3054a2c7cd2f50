use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use wacai_import::{logging, print_entries, ImporterConfig, WacaiImporter};

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("identify") if args.len() > 2 => run_identify(&args[2..]),
        Some("extract") if args.len() > 3 => run_extract(&args[2], &args[3..]),
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    eprintln!("wacai-import {}", wacai_import::VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  wacai-import identify <file>...");
    eprintln!("  wacai-import extract <config.json> <file>...");
}

fn run_identify(files: &[String]) -> Result<()> {
    let importer = WacaiImporter::new(ImporterConfig::default());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for file in files {
        let claimed = importer.identify(Path::new(file));
        writeln!(out, "{}: {}", file, if claimed { "yes" } else { "no" })?;
    }

    Ok(())
}

fn run_extract(config_path: &str, files: &[String]) -> Result<()> {
    let config = ImporterConfig::from_file(config_path)?;
    let mut importer = WacaiImporter::new(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for file in files {
        let path = Path::new(file);
        if !importer.identify(path) {
            info!(file = %file, "skipping file not claimed by the {} importer", importer.name());
            continue;
        }

        let entries = importer
            .extract(path)
            .with_context(|| format!("Failed to extract {}", file))?;
        print_entries(&mut out, &entries)?;
    }
    out.flush()?;

    importer.write_diagnostics(&mut io::stderr().lock())?;

    Ok(())
}
