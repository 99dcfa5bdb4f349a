mod config;
mod dataset;
mod error;
mod export;
mod form;
mod generator;
mod llm;
mod messages;
mod model;
mod prompt;
mod response;
mod selector;

use anyhow::Result;
use clap::Parser;
use config::{Config, DEFAULT_CONFIG_PATH};
use dataset::HttpDataset;
use error::GenError;
use generator::Generator;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use model::Batch;
use prompt::FieldRequest;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "random5e",
    version,
    about = "Random 5e character concepts from the 5etools dataset, optionally fleshed out by an LLM"
)]
struct Cli {
    /// Number of characters to generate (1-5); omit to use the interactive form
    #[arg(short, long)]
    count: Option<String>,

    /// Theme description passed to the AI
    #[arg(long)]
    theme: Option<String>,

    /// Generate names
    #[arg(long)]
    name: bool,

    /// Generate backstories
    #[arg(long)]
    backstory: bool,

    /// Generate personalities
    #[arg(long)]
    personality: bool,

    /// Generate playstyles
    #[arg(long)]
    playstyle: bool,

    /// Generate every AI section
    #[arg(long, conflicts_with_all = ["name", "backstory", "personality", "playstyle"])]
    all: bool,

    /// Save the batch to a timestamped JSON file
    #[arg(long)]
    save: bool,

    /// Ask for everything interactively
    #[arg(short, long)]
    interactive: bool,

    /// Path to the YAML config
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the effective config to --config and exit
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn fields(&self) -> FieldRequest {
        if self.all {
            FieldRequest::all()
        } else {
            FieldRequest::new(self.name, self.backstory, self.personality, self.playstyle)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            return Err(e);
        }
    };

    if cli.write_config {
        config.save(&cli.config)?;
        println!("Configuration written to {}", cli.config.display());
        return Ok(());
    }
    config.ensure_directories()?;

    // A missing key only disables the AI sections.
    let llm = match llm::create_llm(&config.llm) {
        Ok(llm) => Some(llm),
        Err(e) => {
            report_critical(&e);
            None
        }
    };

    let dataset = HttpDataset::new(&config.dataset)?;
    let mut generator = Generator::new(Box::new(dataset), llm, StdRng::from_os_rng())
        .with_progress(progress_bar()?);
    info!("AI client available: {}", generator.has_llm());

    let output = Path::new(&config.output_folder);
    match (&cli.count, cli.interactive) {
        (Some(count), false) => {
            if !run_scripted(&mut generator, &cli, count, output).await {
                std::process::exit(1);
            }
        }
        _ => run_form(&mut generator, output).await?,
    }

    Ok(())
}

/// Runs one batch from the command line. Failures are reported here, once.
async fn run_scripted(generator: &mut Generator<StdRng>, cli: &Cli, count: &str, output: &Path) -> bool {
    match generator
        .generate(count, cli.theme.as_deref(), cli.fields())
        .await
    {
        Ok(batch) => {
            print_batch(&batch);
            if cli.save {
                save(&batch, output);
            }
            true
        }
        Err(e) => {
            report(&e);
            false
        }
    }
}

async fn run_form(generator: &mut Generator<StdRng>, output: &Path) -> Result<()> {
    loop {
        let input = form::ask_batch()?;
        match generator
            .generate(&input.count, input.theme.as_deref(), input.fields)
            .await
        {
            Ok(batch) => {
                print_batch(&batch);
                if form::ask_save()? {
                    save(&batch, output);
                }
            }
            Err(e) => report(&e),
        }

        if !form::ask_again()? {
            return Ok(());
        }
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} characters")?
        .progress_chars("#>-"));
    Ok(pb)
}

fn print_batch(batch: &Batch) {
    for character in &batch.characters {
        println!("{}\n", character);
    }
}

fn save(batch: &Batch, output: &Path) {
    match export::save_batch(batch, output) {
        Ok(path) => println!("Characters saved to {}", path.display()),
        Err(e) => report(&e),
    }
}

fn report(e: &GenError) {
    error!("{:?}", e);
    eprintln!("{}: {}", e.title(), e);
}

fn report_critical(e: &GenError) {
    let rule = "*".repeat(50);
    eprintln!(
        "\n{}\nCRITICAL ERROR: AI CLIENT UNAVAILABLE.\nFull error text below.\n{}\n{}\n",
        rule, e, rule
    );
}
