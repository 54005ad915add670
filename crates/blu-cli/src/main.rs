//! BluBlock CLI
//!
//! Drives the interception engine from a terminal: inspect and change
//! module state, screen URLs, and run real requests through the
//! interceptor.

mod bench;
mod store;
mod transport;

use std::fs;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use blu_core::store::NAMESPACE;
use blu_core::{Category, Engine, Interceptor, Preset, Verdict};

use crate::store::FileStore;
use crate::transport::ReqwestTransport;

#[derive(Parser)]
#[command(name = "blu-cli")]
#[command(about = "BluBlock request interception engine and tools")]
struct Cli {
    /// Directory holding persisted state
    #[arg(long, global = true, default_value = ".blublock")]
    state_dir: String,

    /// State namespace, stored as a subdirectory of the state directory
    #[arg(long, global = true, default_value = NAMESPACE)]
    namespace: String,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show power, preset, modules and stats
    Status,

    /// Apply a preset (base, normal, strict, titanium)
    Mode {
        preset: String,
    },

    /// Turn one module on or off
    Toggle {
        category: String,
        state: Switch,
    },

    /// Turn blocking on or off
    Power {
        state: Switch,
    },

    /// Show the activity log, newest first
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Classify URLs against the current state without recording anything
    Check {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Run a real HTTP request through the interceptor
    Fetch {
        url: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
    },

    /// Screen a file of URLs (one per line) and record blocks
    Replay {
        #[arg(short, long)]
        input: String,
    },

    /// Measure classification latency
    Bench {
        #[arg(short, long, default_value_t = 10_000)]
        iterations: usize,
    },

    /// List rule triggers per category and the presets
    Rules,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = FileStore::new(&cli.state_dir);
    tracing::debug!(state_dir = %store.root().display(), namespace = %cli.namespace, "loading state");
    let mut engine = Engine::builder(store).namespace(&cli.namespace).build();

    let result = match cli.command {
        Commands::Status => cmd_status(&engine),
        Commands::Mode { preset } => cmd_mode(&mut engine, &preset),
        Commands::Toggle { category, state } => cmd_toggle(&mut engine, &category, state),
        Commands::Power { state } => cmd_power(&mut engine, state),
        Commands::Log { limit } => cmd_log(&engine, limit),
        Commands::Check { urls } => cmd_check(&engine, &urls),
        Commands::Fetch { url, method } => cmd_fetch(engine, &url, &method),
        Commands::Replay { input } => cmd_replay(&mut engine, &input),
        Commands::Bench { iterations } => cmd_bench(&engine, iterations),
        Commands::Rules => cmd_rules(&engine),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn cmd_status(engine: &Engine) -> Result<(), String> {
    let stats = engine.stats();
    let mode = engine.mode();

    println!("BluBlock: {}", if engine.is_enabled() { "PROTECTED" } else { "DISABLED" });
    println!("  Mode:     {} ({})", mode, mode.description());
    println!("  Modules:");
    for category in Category::ALL {
        println!("    {:<10} {}", category.module_key(), on_off(engine.modules().is_enabled(category)));
    }
    println!("  Blocked:  {}", stats.blocked);
    println!("  Saved:    {:.2} MB (est)", stats.saved_megabytes());
    println!("  Threats:  {}", stats.threats);
    println!("  Log:      {} entries", engine.activity().len());

    Ok(())
}

fn cmd_mode(engine: &mut Engine, preset: &str) -> Result<(), String> {
    let preset = engine.apply_preset(preset).map_err(|e| e.to_string())?;
    println!("Mode set: {}", preset.label());
    let enabled: Vec<_> = engine.modules().enabled().map(Category::module_key).collect();
    println!("  Enabled: {}", enabled.join(", "));
    Ok(())
}

fn cmd_toggle(engine: &mut Engine, category: &str, state: Switch) -> Result<(), String> {
    let category: Category = category.parse().map_err(|e: blu_core::Error| e.to_string())?;
    engine.toggle(category, state.is_on());
    println!("{} {}", category.module_key(), on_off(state.is_on()));
    Ok(())
}

fn cmd_power(engine: &mut Engine, state: Switch) -> Result<(), String> {
    engine.set_enabled(state.is_on());
    println!("Blocking {}", on_off(state.is_on()));
    Ok(())
}

fn cmd_log(engine: &Engine, limit: usize) -> Result<(), String> {
    let log = engine.activity();
    if log.is_empty() {
        println!("No blocked requests recorded.");
        return Ok(());
    }

    println!("{:<10} {:<10} URL", "TIME", "TYPE");
    for event in log.iter().take(limit) {
        println!(
            "{:<10} {:<10} {}",
            event.time().with_timezone(&Local).format("%H:%M:%S"),
            event.category(),
            event.url()
        );
    }
    if log.len() > limit {
        println!("... {} more", log.len() - limit);
    }
    Ok(())
}

fn cmd_check(engine: &Engine, urls: &[String]) -> Result<(), String> {
    for url in urls {
        match engine.classifier().explain(Some(url), engine.prefs()) {
            Some(m) => println!("BLOCK  {:<10} ({:?})  {}", m.category, m.trigger, url),
            None => println!("ALLOW  {:<10}  {}", "-", url),
        }
    }
    Ok(())
}

fn cmd_fetch(engine: Engine, url: &str, method: &str) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;

    let interceptor = Interceptor::new(engine.into_handle(), ReqwestTransport::new(reqwest::Client::new()));
    let mut request = blu_core::RequestDescriptor::get(url);
    request.method = method.to_string();

    let response = runtime
        .block_on(interceptor.fetch(request))
        .map_err(|e| format!("Request failed: {}", e))?;

    if response.synthetic {
        let category = interceptor
            .engine()
            .read(|e| e.activity().latest().map(|event| event.category()));
        println!(
            "Blocked ({}): synthetic {} with empty body",
            category.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
            response.status
        );
    } else {
        println!("Allowed: {} ({} bytes)", response.status, response.body.len());
        for (name, value) in response.headers.iter().take(10) {
            println!("  {}: {}", name, value);
        }
    }
    Ok(())
}

fn cmd_replay(engine: &mut Engine, input: &str) -> Result<(), String> {
    let content = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let mut total = 0usize;
    let mut per_category = [0usize; Category::ALL.len()];

    for line in content.lines() {
        let url = line.trim();
        if url.is_empty() || url.starts_with('#') {
            continue;
        }
        total += 1;
        if let Verdict::Block(category) = engine.intercept(Some(url)) {
            per_category[category as usize] += 1;
        }
    }

    let blocked: usize = per_category.iter().sum();
    println!("Replayed {} requests from '{}'", total, input);
    println!("  Allowed:  {}", total - blocked);
    println!("  Blocked:  {}", blocked);
    for category in Category::ALL {
        let count = per_category[category as usize];
        if count > 0 {
            println!("    {:<10} {}", category, count);
        }
    }
    println!("  Totals:   {}", engine.stats());
    Ok(())
}

fn cmd_bench(engine: &Engine, iterations: usize) -> Result<(), String> {
    println!("============================================================");
    println!("BluBlock Benchmark (mode: {})", engine.mode());
    println!("============================================================");
    let result = bench::run(engine.classifier(), engine.prefs(), iterations.max(1));
    println!("{}", bench::format_result(&result));
    Ok(())
}

fn cmd_rules(engine: &Engine) -> Result<(), String> {
    let modules = engine.modules();
    let table = engine.classifier().table();
    for category in Category::ALL {
        let state = on_off(modules.is_enabled(category));
        println!("{:<10} {:<4} {}", category, state, table.triggers(category).join(", "));
    }
    println!();
    for preset in Preset::ALL {
        println!("{:<10} {}", preset.id(), preset.description());
    }
    Ok(())
}
