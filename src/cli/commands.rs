// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `build` and `gloss`
// and all their configurable flags.
//
// `train` and `build` share the input flags through DataArgs,
// flattened into both.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::build_use_case::BuildConfig;
use crate::application::train_use_case::{TrainConfig, DEFAULT_METRICS};
use crate::data::loader::{DEFAULT_GLOSS_COLUMN, DEFAULT_SUFFIX, DEFAULT_TEXT_COLUMN};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the corpus and run k-fold cross-validated tagger training
    Train(TrainArgs),

    /// Build the corpus only and export it for inspection
    Build(BuildArgs),

    /// Map a single gloss string to UD features
    Gloss(GlossArgs),
}

/// Where the annotated tables come from and how to read them.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// ISO 639 code of the transcribed language, e.g. "gsw"
    #[arg(long)]
    pub lang: String,

    /// Directory searched recursively for annotated .docx files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Only files whose name ends with this are read
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Header of the transcription column
    #[arg(long, default_value = DEFAULT_TEXT_COLUMN)]
    pub text_column: String,

    /// Header of the gloss column
    #[arg(long, default_value = DEFAULT_GLOSS_COLUMN)]
    pub gloss_column: String,

    /// Read at most this many data rows per file
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Glossary JSON (value → code); built-in table if omitted
    #[arg(long)]
    pub glossary: Option<String>,

    /// Feature JSON (value → feature name); built-in table if omitted
    #[arg(long)]
    pub features: Option<String>,

    /// Write cleaned_inspection.jsonl and examples.jsonl here
    #[arg(long)]
    pub inspect_dir: Option<String>,
}

impl From<DataArgs> for BuildConfig {
    fn from(a: DataArgs) -> Self {
        BuildConfig {
            lang:          a.lang,
            data_dir:      a.data_dir,
            suffix:        a.suffix,
            text_column:   a.text_column,
            gloss_column:  a.gloss_column,
            max_rows:      a.max_rows,
            glossary_path: a.glossary,
            features_path: a.features,
            inspect_dir:   a.inspect_dir,
            corpus_out:    None,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Model directory from an earlier run to warm-start from
    #[arg(long)]
    pub base_model: Option<String>,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    pub n_folds: usize,

    /// Shuffle documents before partitioning into folds
    #[arg(long)]
    pub shuffle: bool,

    /// Seed for the shuffle and the data loader; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// GPU index; negative runs on the CPU
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub gpu: i32,

    /// Where results-<lang>.json (and training_log.csv) go
    #[arg(long, default_value = "results")]
    pub output_dir: String,

    /// The final model is saved to <models-dir>/<lang>_custom_glossing
    #[arg(long, default_value = "models")]
    pub models_dir: String,

    /// Number of full passes through each fold's training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Tokens per training batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Append per-epoch losses and accuracy to training_log.csv
    #[arg(long)]
    pub metrics_csv: bool,

    /// Metrics averaged into the results file
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_METRICS.map(String::from).to_vec())]
    pub metrics: Vec<String>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data:        a.data.into(),
            base_model:  a.base_model,
            n_folds:     a.n_folds,
            shuffle:     a.shuffle,
            seed:        a.seed,
            gpu:         a.gpu,
            output_dir:  a.output_dir,
            models_dir:  a.models_dir,
            epochs:      a.epochs,
            batch_size:  a.batch_size,
            lr:          a.lr,
            metrics_csv: a.metrics_csv,
            metrics:     a.metrics,
        }
    }
}

/// All arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Write the corpus as JSON lines to this file
    #[arg(long)]
    pub out: Option<String>,
}

impl From<BuildArgs> for BuildConfig {
    fn from(a: BuildArgs) -> Self {
        BuildConfig { corpus_out: a.out, ..a.data.into() }
    }
}

/// All arguments for the `gloss` command.
#[derive(Args, Debug)]
pub struct GlossArgs {
    /// The gloss line, e.g. "rabbit.M.SG.NOM run.PRS"
    pub gloss: String,

    /// Map the gloss as given, without cleaning it first
    #[arg(long)]
    pub raw: bool,

    #[arg(long)]
    pub glossary: Option<String>,

    #[arg(long)]
    pub features: Option<String>,
}
