//! Command-line interface for fry_colorscan
//!
//! Analyses one image and prints the result as JSON on stdout, with a human
//! summary on stderr. Set `RUST_LOG=debug` to trace the pipeline stages.

use fry_colorscan::{image_loader::load_image, AnalysisResult, PipelineConfig, QualityPipeline};
use std::{env, path::Path, process};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut px_per_mm = None;
    let mut image_path_arg = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(path.clone()),
                    None => {
                        eprintln!("Error: --config needs a file");
                        process::exit(1);
                    }
                }
            }
            "--px-per-mm" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse::<f64>().ok()) {
                    Some(ratio) => px_per_mm = Some(ratio),
                    None => {
                        eprintln!("Error: --px-per-mm needs a number");
                        process::exit(1);
                    }
                }
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(image_path_str) = image_path_arg else {
        print_help(&args[0]);
        process::exit(1);
    };

    let mut config = match config_path {
        Some(path) => match PipelineConfig::from_json_file(Path::new(&path)) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("{}", error);
                eprintln!("Suggestion: {}", error.user_message());
                process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };
    if let Some(ratio) = px_per_mm {
        config = config.with_px_per_mm(ratio);
    }

    let sample = match load_image(Path::new(&image_path_str)) {
        Ok(sample) => sample,
        Err(error) => {
            eprintln!("Analysis failed: {}", error);
            eprintln!("Suggestion: {}", error.user_message());
            process::exit(1);
        }
    };

    let result = QualityPipeline::new(config).analyze(&sample);
    print_result(&result);
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Grade a photo of fried potato strips.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE      JSON pipeline configuration");
    eprintln!("  --px-per-mm RATIO  Spatial calibration for physical defect areas");
    eprintln!("  --help, -h         Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} tray.jpg", program_name);
    eprintln!("  RUST_LOG=debug {} --px-per-mm 4.2 tray.png", program_name);
}

fn print_result(result: &AnalysisResult) {
    // JSON to stdout for programmatic use
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }

    // Summary to stderr for human reading
    let scores = &result.scores;
    eprintln!();
    eprintln!("Quality Summary:");
    eprintln!(
        "  PQI: {} ({} risk)",
        result.quality_index, result.risk_level
    );
    eprintln!(
        "  Scores: color {}, hue {}, mottling {}, defect {}",
        scores.process_color, scores.hue, scores.mottling, scores.defect
    );
    eprintln!("  Agtron: {}, USDA: {:.1}", result.agtron, result.usda);
    eprintln!(
        "  Lab: L*={:.1}, a*={:.1}, b*={:.1} (ΔE2000 to target {:.1})",
        result.mean_lab.l, result.mean_lab.a, result.mean_lab.b, result.delta_e_target
    );
    eprintln!("  Crunch: {}", result.crunch_score);
    eprintln!(
        "  Defects: {} scored, {} shadow artifacts",
        result.scored_defects().count(),
        result.defects.len() - result.scored_defects().count()
    );

    if result.stats.shadow_suppression_ratio > 0.2 {
        eprintln!("  Warning: heavy cast shadow. Consider diffuse lighting.");
    }
}
