use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::UserIndex;
use recommender::{RecommendationList, UserRecommendations};
use slim::{SlimTrainer, TrainConfig, WeightMatrix};
use sprs::CsMat;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// cSLIM - Sparse Linear Method recommender with side information
#[derive(Parser)]
#[command(name = "cslim")]
#[command(about = "Train cSLIM item-item weights and evaluate top-N recommendations", long_about = None)]
struct Cli {
    #[command(flatten)]
    training: TrainingArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Training options; explicit flags override values from `--config`
#[derive(Args)]
struct TrainingArgs {
    /// JSON file with a training config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// L1 (sparsity) penalty [default: 0.001]
    #[arg(long, global = true)]
    l1_reg: Option<f64>,

    /// L2 (shrinkage) penalty [default: 0.0001]
    #[arg(long, global = true)]
    l2_reg: Option<f64>,

    /// Maximum coordinate-descent sweeps per item [default: 10000]
    #[arg(long, global = true)]
    max_iter: Option<usize>,

    /// Duality-gap tolerance relative to ‖y‖² [default: 1e-4]
    #[arg(long, global = true)]
    tol: Option<f64>,

    /// Seed for a shuffled coordinate order
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Per-item fit deadline in milliseconds
    #[arg(long, global = true)]
    fit_deadline_ms: Option<u64>,

    /// Train items one after another instead of in parallel
    #[arg(long, global = true)]
    sequential: bool,
}

/// Input files shared by every command
#[derive(Args)]
struct DataArgs {
    /// Training interactions (row, col, value) TSV
    #[arg(long)]
    train: PathBuf,

    /// Side information (row, col, value) TSV, same shape as the training data
    #[arg(long)]
    side_information: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Train, recommend for every user and report precision on a test file
    Evaluate {
        #[command(flatten)]
        data: DataArgs,

        /// Held-out test interactions (row, col, value) TSV
        #[arg(long)]
        test: PathBuf,

        /// Length of each recommendation list
        #[arg(long, default_value = "10")]
        top_n: usize,
    },

    /// Train and show statistics about the learned weights
    Train {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Train and show recommendations for one user
    Recommend {
        #[command(flatten)]
        data: DataArgs,

        /// Zero-based user (row) index
        #[arg(long)]
        user: UserIndex,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli.training)?;

    match cli.command {
        Commands::Evaluate { data, test, top_n } => handle_evaluate(&config, &data, &test, top_n)?,
        Commands::Train { data } => handle_train(&config, &data)?,
        Commands::Recommend {
            data,
            user,
            top_n,
            json,
        } => handle_recommend(&config, &data, user, top_n, json)?,
    }

    Ok(())
}

/// Merge the optional config file with explicit flags
fn build_config(args: &TrainingArgs) -> Result<TrainConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<TrainConfig>(&raw)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => TrainConfig::default(),
    };

    if let Some(l1_reg) = args.l1_reg {
        config.l1_reg = l1_reg;
    }
    if let Some(l2_reg) = args.l2_reg {
        config.l2_reg = l2_reg;
    }
    if let Some(max_iter) = args.max_iter {
        config = config.with_max_iter(max_iter);
    }
    if let Some(tol) = args.tol {
        config = config.with_tol(tol);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ms) = args.fit_deadline_ms {
        config = config.with_fit_deadline(Duration::from_millis(ms));
    }
    if args.sequential {
        config = config.with_parallel(false);
    }
    Ok(config)
}

/// Load both matrices and train, reporting progress
fn load_and_train(config: &TrainConfig, data: &DataArgs) -> Result<(CsMat<f64>, WeightMatrix)> {
    println!("Loading {} and {}...", data.train.display(), data.side_information.display());
    let start = Instant::now();
    let (a, b) = data_loader::load_with_side_information(&data.train, &data.side_information)
        .context("Failed to load training data")?;
    println!(
        "{} Loaded {} users x {} items in {:?}",
        "✓".green(),
        a.rows(),
        a.cols(),
        start.elapsed()
    );

    let start = Instant::now();
    let weights = SlimTrainer::new(config.clone())
        .train(&a, &b)
        .context("Training failed")?;
    println!(
        "{} Trained {} item weight vectors in {:?} (l1_reg {}, l2_reg {})",
        "✓".green(),
        weights.n_items(),
        start.elapsed(),
        config.l1_reg,
        config.l2_reg
    );
    Ok((a, weights))
}

/// Handle the 'evaluate' command
fn handle_evaluate(config: &TrainConfig, data: &DataArgs, test: &Path, top_n: usize) -> Result<()> {
    let (a, weights) = load_and_train(config, data)?;
    let recommendations = recommender::recommend(&a, &weights, top_n)?;

    let test_matrix = data_loader::load(test, None, None)
        .with_context(|| format!("Failed to load test data from {}", test.display()))?;
    let report = recommender::evaluate(&recommendations, &test_matrix);

    println!("{}", "Evaluation:".bold().blue());
    println!("{}Precision@{}: {:.4}", "• ".green(), top_n, report.precision);
    println!("{}Users evaluated: {}", "• ".cyan(), report.users_evaluated);
    println!("{}Hits: {}", "• ".cyan(), report.hits);
    Ok(())
}

/// Handle the 'train' command
fn handle_train(config: &TrainConfig, data: &DataArgs) -> Result<()> {
    let (_a, weights) = load_and_train(config, data)?;

    println!("{}", "Weight matrix:".bold().blue());
    println!("{}Items: {}", "• ".green(), weights.n_items());
    println!("{}Non-zero weights: {}", "• ".green(), weights.nnz());
    println!("{}Density: {:.4}", "• ".cyan(), weights.density());
    println!("{}Largest weight: {:.4}", "• ".cyan(), weights.max_weight());

    // Items with the most neighbours
    let mut neighbours: Vec<(usize, usize)> = weights
        .iter()
        .enumerate()
        .map(|(item, w)| (item, w.iter().filter(|&&v| v > 0.0).count()))
        .collect();
    neighbours.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("Most connected items:");
    for (item, count) in neighbours.iter().take(5) {
        println!("  - item {}: {} neighbours", item, count);
    }
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    config: &TrainConfig,
    data: &DataArgs,
    user: UserIndex,
    top_n: usize,
    json: bool,
) -> Result<()> {
    let (a, weights) = load_and_train(config, data)?;
    if user >= a.rows() {
        return Err(anyhow!("User {} not found ({} users loaded)", user, a.rows()));
    }

    let recommendations = recommender::recommend(&a, &weights, top_n)?;
    let user_recs = recommendations
        .get(user)
        .ok_or_else(|| anyhow!("No recommendations produced for user {}", user))?;

    if json {
        println!("{}", serde_json::to_string_pretty(user_recs)?);
    } else {
        print_recommendations(user_recs, &recommendations);
    }
    Ok(())
}

/// Helper function to format and print one user's recommendations
fn print_recommendations(user_recs: &UserRecommendations, all: &RecommendationList) {
    println!(
        "{}",
        format!("Top {} recommendations for user {}:", all.top_n(), user_recs.user)
            .bold()
            .blue()
    );
    if user_recs.items.is_empty() {
        println!("  (no item scored above zero)");
        return;
    }
    for (rank, scored) in user_recs.items.iter().enumerate() {
        println!(
            "{}. item {} - Score: {:.4}",
            (rank + 1).to_string().green(),
            scored.item,
            scored.score
        );
    }
}
