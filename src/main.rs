//! Maxima GA CLI - Run the optimizer from an optional JSON configuration.

use std::fs;
use std::path::PathBuf;

use maxima_ga::{
    Optimizer,
    schema::{OptimizerConfig, RunResult},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).is_some_and(|a| a == "--help" || a == "-h") {
        print_usage(program_name(&args));
        return;
    }

    if args.get(1).is_some_and(|a| a == "--example") {
        print_example_config();
        return;
    }

    // Load configuration
    let config = match args.get(1) {
        Some(path) => OptimizerConfig::load(path).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        None => OptimizerConfig::default(),
    };
    let output_path = args.get(2).map(PathBuf::from);

    let mut optimizer = Optimizer::new(config).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    println!("Maxima GA");
    println!("=========");
    println!("Population: {}", optimizer.config().population.size);
    println!(
        "Domain: x in [{}, {}], y in [{}, {}]",
        optimizer.config().bounds.x.min,
        optimizer.config().bounds.x.max,
        optimizer.config().bounds.y.min,
        optimizer.config().bounds.y.max
    );
    println!("Seed: {}", optimizer.seed());
    println!();

    let result = optimizer
        .run_with_callback(|progress| {
            if progress.generation > 0 && progress.generation % 10 == 0 {
                println!(
                    "  Generation {}: avg fitness={:.6}, best avg={:.6}, stagnation={}",
                    progress.generation,
                    progress.average_fitness,
                    progress.best_average_fitness,
                    progress.stagnation
                );
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        });

    print_summary(&result);

    if let Some(path) = output_path {
        let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("Error serializing result: {}", e);
            std::process::exit(1);
        });
        fs::write(&path, json).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        });
        println!("Fitness history written to {}", path.display());
    }
}

fn print_summary(result: &RunResult) {
    println!();
    println!("****************************************");
    println!("***** GENERATIONS:      {}", result.stats.generations);
    println!("***** Population Size:  {}", result.stats.population_size);
    println!("****************************************");
    println!();
    println!("Best X and Y: {}  {}", result.best.x, result.best.y);
    println!("Best fitness: {}", result.best.fitness);
    println!("Stop reason:  {:?}", result.stats.stop_reason);
    println!(
        "Time: {:.2}s ({} evaluations)",
        result.stats.elapsed_seconds, result.stats.total_evaluations
    );
}

/// Invoked name, falling back to the binary name when argv is empty.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("maxima-ga", String::as_str)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json] [result.json]", program);
    eprintln!();
    eprintln!("Search for the maximum of f(x, y) with a genetic algorithm.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Optimizer configuration (default: built-in settings)");
    eprintln!("  result.json  Write the full result, including fitness history");
    eprintln!();
    eprintln!("Print the default configuration with --example.");
}

fn print_example_config() {
    let config = OptimizerConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
