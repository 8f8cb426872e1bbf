use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use heredity_core::genetics::Population;
use heredity_core::inference::{ExactInference, HypothesisSpace, InferenceResult};
use heredity_core::model::ConditionalModel;
use heredity_core::types::GeneCount;

#[derive(Parser)]
#[command(name = "heredity")]
#[command(version)]
#[command(about = "Exact gene and trait posteriors for a family pedigree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute gene-count and trait posteriors for every individual
    Infer {
        /// Path to population CSV (columns: name, mother, father, trait)
        data: String,

        /// JSON file overriding the conditional model
        #[arg(long)]
        model: Option<String>,

        /// Mutation probability, applied after --model
        #[arg(long)]
        mutation: Option<f64>,

        /// Split the hypothesis space across all cores
        #[arg(long)]
        parallel: bool,

        /// Output format: "text" (default) or "json"
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Load and validate a population without running inference
    Check {
        /// Path to population CSV (columns: name, mother, father, trait)
        data: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Infer {
            data,
            model,
            mutation,
            parallel,
            format,
        } => cmd_infer(&data, model.as_deref(), mutation, parallel, &format),
        Commands::Check { data } => cmd_check(&data),
    }
}

fn load_population(data_path: &str) -> Result<Population> {
    let population = Population::from_csv(data_path)
        .with_context(|| format!("Failed to load population from '{}'", data_path))?;
    log::info!(
        "Loaded {} individuals from '{}'",
        population.len(),
        data_path
    );
    Ok(population)
}

fn cmd_infer(
    data_path: &str,
    model_path: Option<&str>,
    mutation: Option<f64>,
    parallel: bool,
    output_format: &str,
) -> Result<()> {
    let population = load_population(data_path)?;

    let mut model = match model_path {
        Some(path) => ConditionalModel::from_json_file(path)
            .with_context(|| format!("Failed to load model from '{}'", path))?,
        None => ConditionalModel::default(),
    };
    if let Some(mu) = mutation {
        model = model.with_mutation(mu);
    }

    let result = ExactInference::new(model)
        .parallel(parallel)
        .run(&population)
        .context("Inference failed")?;

    match output_format.to_lowercase().as_str() {
        "json" => print_json(&result)?,
        "text" => print!("{}", result.summary()),
        other => anyhow::bail!("Unknown format '{}'. Use 'text' (default) or 'json'.", other),
    }

    Ok(())
}

fn print_json(result: &InferenceResult) -> Result<()> {
    let people: serde_json::Map<String, serde_json::Value> = result
        .iter()
        .map(|(name, post)| {
            let genes = post.gene_table();
            let gene: serde_json::Map<String, serde_json::Value> = GeneCount::ALL
                .iter()
                .map(|&g| (g.to_string(), serde_json::json!(genes[g.index()])))
                .collect();
            let [absent, expressed] = post.trait_table();
            (
                name.to_string(),
                serde_json::json!({
                    "gene": gene,
                    "trait": {
                        "true": expressed,
                        "false": absent,
                    },
                }),
            )
        })
        .collect();

    let output = serde_json::json!({
        "hypotheses": result.n_hypotheses(),
        "individuals": people,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_check(data_path: &str) -> Result<()> {
    let population = load_population(data_path)?;
    let space = HypothesisSpace::new(&population).context("Population cannot be enumerated")?;

    let observed = population
        .iter()
        .filter(|ind| ind.observed_trait().is_some())
        .count();

    println!("Individuals: {}", population.len());
    println!("Founders:    {}", population.founders().count());
    println!("Observed:    {}", observed);
    println!("Hypotheses:  {}", space.hypothesis_count());

    Ok(())
}
