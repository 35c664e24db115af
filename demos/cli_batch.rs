//! Batch CLI for fry_colorscan
//!
//! Grades every image in a directory in parallel and writes one JSON result
//! per image next to a run summary.

use fry_colorscan::{
    analyze_batch,
    image_loader::{is_supported_extension, load_image},
    ImageSample, PipelineConfig,
};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_help(&args[0]);
        process::exit(1);
    }

    let input_dir = Path::new(&args[1]);
    let output_dir = Path::new(&args[2]);

    let config = match args.get(3) {
        Some(path) => match PipelineConfig::from_json_file(Path::new(path)) {
            Ok(cfg) => {
                eprintln!("Loaded configuration from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("Error loading config file: {}", e);
                process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };

    if let Err(e) = fs::create_dir_all(output_dir) {
        eprintln!("Error creating output directory: {}", e);
        process::exit(1);
    }

    let image_files = match find_image_files(input_dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error finding image files: {}", e);
            process::exit(1);
        }
    };

    if image_files.is_empty() {
        eprintln!("No image files found in {}", input_dir.display());
        process::exit(1);
    }

    eprintln!("Found {} image files to process", image_files.len());

    // Decode sequentially, grade in parallel
    let mut names = Vec::new();
    let mut samples: Vec<ImageSample> = Vec::new();
    let mut error_count = 0;
    for path in &image_files {
        match load_image(path) {
            Ok(sample) => {
                names.push(
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("output")
                        .to_string(),
                );
                samples.push(sample);
            }
            Err(error) => {
                eprintln!("✗ {}: {}", path.display(), error);
                error_count += 1;
            }
        }
    }

    let results = analyze_batch(&samples, &config);

    for (name, result) in names.iter().zip(&results) {
        eprintln!(
            "{}: PQI {} ({}), scores {:?}",
            name,
            result.quality_index,
            result.risk_level,
            result.scores.as_array()
        );

        let out = output_dir.join(format!("{}.json", name));
        let written = serde_json::to_string_pretty(result)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&out, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("Warning: failed to write {}: {}", out.display(), e);
            error_count += 1;
        }
    }

    eprintln!();
    eprintln!("Batch processing complete:");
    eprintln!("  Graded: {}", results.len());
    eprintln!("  Errors: {}", error_count);
    eprintln!("  Results saved to: {}", output_dir.display());

    if error_count > 0 {
        process::exit(1);
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} <input_dir> <output_dir> [config.json]", program_name);
    eprintln!();
    eprintln!("Grade every fry image in a directory.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG=debug   Trace pipeline stages");
    eprintln!("  RAYON_NUM_THREADS  Limit worker threads");
}

fn find_image_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if dir.is_file() {
        return Ok(vec![dir.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(is_supported_extension);
        if path.is_file() && supported {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
