use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use sylva_forest::{DecisionTreeConfig, Model, RandomForestConfig, Tree};
use sylva_io::{ExperimentName, PredictionReport, RecordReader, ResultWriter};

#[derive(Parser)]
#[command(name = "sylva")]
#[command(about = "Information-gain decision trees and random forests over schemaless records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Per-tree growth parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Attribute to predict
    #[arg(long)]
    category_key: String,

    /// Attribute never used for splitting (repeatable)
    #[arg(long = "ignore", value_name = "KEY")]
    ignored_keys: Vec<String>,

    /// A node with this many records or fewer becomes a leaf
    #[arg(long, default_value_t = 0)]
    min_items: usize,

    /// A node whose label entropy is at most this becomes a leaf
    #[arg(long, default_value_t = 0.01)]
    entropy_threshold: f64,

    /// Maximum number of split levels
    #[arg(long, default_value_t = 90)]
    max_depth: usize,
}

impl TreeArgs {
    fn to_config(&self) -> DecisionTreeConfig {
        DecisionTreeConfig::new(self.category_key.clone())
            .with_ignored_keys(self.ignored_keys.iter().cloned())
            .with_min_items_count(self.min_items)
            .with_entropy_threshold(self.entropy_threshold)
            .with_max_depth(self.max_depth)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fit a decision tree, or a random forest with --forest-size, and save it
    Train {
        /// Path to the training data (.json array of objects or .csv)
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        tree: TreeArgs,

        /// Train a random forest of this many round-robin buckets
        #[arg(long)]
        forest_size: Option<usize>,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Predict the category of every record with a saved model
    Predict {
        /// Path to the saved model JSON
        #[arg(long)]
        model: PathBuf,

        /// Path to the records to classify (.json or .csv)
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    kind: &'static str,
    category_key: String,
    n_records: usize,
    n_trees: usize,
    n_nodes: usize,
    max_depth: usize,
    training_accuracy: Option<f64>,
    model_path: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    category_key: String,
    n_records: usize,
    n_labelled: usize,
    accuracy: Option<f64>,
    model_n_trees: usize,
    predictions_path: PathBuf,
}

fn trees(model: &Model) -> &[Tree] {
    match model {
        Model::Tree { tree, .. } => std::slice::from_ref(tree),
        Model::Forest(forest) => forest.trees(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            tree,
            forest_size,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read training records
            let records = RecordReader::new(&data)
                .read()
                .with_context(|| format!("failed to read training data {}", data.display()))?;

            // 2. Fit
            let tree_config = tree.to_config();
            let (kind, model) = match forest_size {
                Some(n_trees) => {
                    let forest = RandomForestConfig::new(tree_config)
                        .with_n_trees(n_trees)
                        .fit(&records)
                        .context("random forest training failed")?;
                    ("forest", Model::from(forest))
                }
                None => {
                    let fitted = tree_config
                        .fit(&records)
                        .context("decision tree training failed")?;
                    ("tree", Model::from_tree(fitted, tree.category_key.clone()))
                }
            };
            for (i, fitted) in trees(&model).iter().enumerate() {
                debug!(tree = i, "fitted tree\n{fitted}");
            }

            // 3. Score the training set
            let votes = model.predict_batch(&records);
            let report = PredictionReport::new(model.category_key(), &records, &votes);

            // 4. Save the model
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let model_path = writer.write_model(&model)?;

            // 5. Print summary
            let output = TrainOutput {
                experiment,
                kind,
                category_key: model.category_key().to_string(),
                n_records: records.len(),
                n_trees: model.n_trees(),
                n_nodes: trees(&model).iter().map(Tree::n_nodes).sum(),
                max_depth: trees(&model).iter().map(Tree::depth).max().unwrap_or(0),
                training_accuracy: report.accuracy(),
                model_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            data,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Load model
            let loaded = Model::load(&model).context("failed to load model")?;
            info!(
                n_trees = loaded.n_trees(),
                category_key = loaded.category_key(),
                "model loaded"
            );

            // 2. Read records
            let records = RecordReader::new(&data)
                .read()
                .with_context(|| format!("failed to read records {}", data.display()))?;

            // 3. Predict
            let votes = loaded.predict_batch(&records);
            let report = PredictionReport::new(loaded.category_key(), &records, &votes);

            // 4. Write predictions JSON
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let predictions_path = writer.write_predictions(&report)?;

            // 5. Print summary
            let output = PredictOutput {
                experiment,
                category_key: report.category_key().to_string(),
                n_records: report.n_records(),
                n_labelled: report.n_labelled(),
                accuracy: report.accuracy(),
                model_n_trees: loaded.n_trees(),
                predictions_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
