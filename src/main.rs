use clap::{Args, Parser, Subcommand};
use hci_score::config::{AppConfig, OutputFormat};
use hci_score::error::AppError;
use hci_score::score::derive::{
    cohort_size_option, low_field_resolution_option, p_value_option, PValue, StudyDesign,
};
use hci_score::score::{CatalogError, ScoreError, ScoreOutcome, ScoringEngine};
use hci_score::telemetry;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "hci-score",
    about = "Validate and score HLA disease association curations from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a questionnaire and print its evidence score
    Score(ScoreArgs),
    /// Print the rule catalog as JSON
    Catalog(CatalogArgs),
    /// Print every questionnaire field with its legal options
    Schema,
    /// Suggest the catalog option that matches raw study facts
    Suggest {
        #[command(subcommand)]
        command: SuggestCommand,
    },
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Questionnaire JSON file (reads stdin when omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Override the configured output format (text or json)
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Only print the step with this id (e.g. 3B)
    #[arg(long)]
    step: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SuggestCommand {
    /// Step 3A bucket for a p-value given as significand x 10^exponent
    PValue(PValueArgs),
    /// Step 4 bucket for a cohort size
    Cohort(CohortArgs),
    /// Step 6B weighting for a step 1B allele resolution
    Resolution(ResolutionArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct DesignArgs {
    /// The association comes from a genome-wide association study
    #[arg(long)]
    gwas: bool,
    /// The association comes from a candidate-gene or other non-GWAS study
    #[arg(long)]
    non_gwas: bool,
}

impl DesignArgs {
    fn design(&self) -> StudyDesign {
        if self.gwas {
            StudyDesign::Gwas
        } else {
            StudyDesign::NonGwas
        }
    }
}

#[derive(Args, Debug)]
struct PValueArgs {
    #[command(flatten)]
    design: DesignArgs,
    #[arg(long)]
    significand: f64,
    #[arg(long, allow_negative_numbers = true)]
    exponent: i32,
}

#[derive(Args, Debug)]
struct CohortArgs {
    #[command(flatten)]
    design: DesignArgs,
    /// Number of study participants
    #[arg(long)]
    participants: u32,
}

#[derive(Args, Debug)]
struct ResolutionArgs {
    /// A step 1B option, e.g. "2-field"
    #[arg(long)]
    allele_resolution: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("application error: {err}");
        let code = if err.is_user_input() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let engine = ScoringEngine::standard()?;
    info!(?config.environment, "scoring engine ready");

    match cli.command {
        Command::Score(args) => {
            let format = args.format.unwrap_or(config.output.format);
            run_score(&engine, args.input, format, &mut std::io::stdout().lock())
        }
        Command::Catalog(args) => run_catalog(&engine, args.step.as_deref()),
        Command::Schema => {
            let schema = engine.schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Suggest { command } => {
            println!("{}", suggest(&engine, command)?);
            Ok(())
        }
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(raw).map_err(|err| err.to_string())
}

fn run_score(
    engine: &ScoringEngine,
    input: Option<PathBuf>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let raw: Value = serde_json::from_str(&raw)?;

    match engine.score(&raw) {
        Ok(outcome) => {
            match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&outcome)?)?,
                OutputFormat::Text => write!(out, "{}", render_outcome(&outcome))?,
            }
            Ok(())
        }
        Err(ScoreError::Validation(err)) if format == OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&err)?)?;
            Err(ScoreError::Validation(err).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_catalog(engine: &ScoringEngine, step: Option<&str>) -> Result<(), AppError> {
    let catalog = engine.catalog();
    let rendered = match step {
        Some(step_id) => {
            let step = catalog
                .step(step_id)
                .ok_or_else(|| CatalogError::UnknownStep(step_id.to_string()))?;
            serde_json::to_string_pretty(step)?
        }
        None => serde_json::to_string_pretty(catalog)?,
    };
    println!("{rendered}");
    Ok(())
}

fn suggest(engine: &ScoringEngine, command: SuggestCommand) -> Result<&'static str, AppError> {
    let option = match command {
        SuggestCommand::PValue(args) => {
            let p_value = PValue::new(args.significand, args.exponent)?;
            p_value_option(args.design.design(), p_value)
        }
        SuggestCommand::Cohort(args) => cohort_size_option(args.design.design(), args.participants),
        SuggestCommand::Resolution(args) => {
            low_field_resolution_option(engine.catalog(), &args.allele_resolution)?
        }
    };
    Ok(option)
}

fn render_outcome(outcome: &ScoreOutcome) -> String {
    let breakdown = &outcome.breakdown;
    let mut output = format!("HLA evidence score: {}\n\n", breakdown.score);

    output.push_str("Step totals\n");
    output.push_str(&format!("- Step 1 (characterization): {}\n", breakdown.step_1));
    output.push_str(&format!("- Step 2 (typing method): {}\n", breakdown.step_2));
    output.push_str(&format!("- Step 3 (statistics): {}\n", breakdown.step_3));
    output.push_str(&format!("- Step 4 (cohort size): {}\n", breakdown.step_4));
    output.push_str(&format!("- Step 5 (phenotypes): {}\n", breakdown.step_5));
    output.push_str(&format!(
        "- Subtotal {} x weighting {} = {}\n",
        breakdown.additive_total, breakdown.weighting_factor, breakdown.score
    ));

    output.push_str("\nAnswers\n");
    for contribution in &breakdown.contributions {
        output.push_str(&format!(
            "- {} {}: {} ({} pts)\n",
            contribution.step_id,
            contribution.display_name,
            contribution.selections.join(" + "),
            contribution.points
        ));
    }
    output
}
