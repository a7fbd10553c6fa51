use std::path::PathBuf;

use anyhow::{Context, Result};
use biogen::exam::{ChatModelConfig, ExamEvaluator, ExamKind, ExamReport, OpenAiCompatibleClient};
use biogen::metabolomics::PeakTableParams;
use biogen::proteomics::DEFAULT_ENZYME;
use biogen::{ArtifactNamespace, ToolConfig, ToolRegistry, Toolbox};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "biogen", about = "Omics data simulation tools and a bioinformatics exam harness")]
struct Cli {
    /// Directory generated artifacts are written to.
    #[arg(long, global = true, env = "BIOGEN_WORKSPACE_DIR", default_value = "./workspace")]
    workspace_dir: PathBuf,
    /// Directory holding reference inputs.
    #[arg(long, global = true, env = "BIOGEN_SEED_DIR", default_value = "./bio_seeds")]
    seed_dir: PathBuf,
    /// Run external programs inside this conda environment.
    #[arg(long, global = true, env = "BIOGEN_CONDA_ENV")]
    conda_env: Option<String>,
    /// Directory whose programs take precedence over `PATH`.
    #[arg(long, global = true, env = "BIOGEN_TOOL_DIR")]
    tool_dir: Option<PathBuf>,
    /// Write artifacts below `<workspace>/<run-id>` instead of the workspace root.
    #[arg(long, global = true, conflicts_with = "content_addressed")]
    run_id: Option<String>,
    /// Write each invocation's artifacts to a directory named by its parameters.
    #[arg(long, global = true)]
    content_addressed: bool,
    /// Log debug output (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a file from the seed repository.
    Seed {
        /// Path, tried as given and then below the seed directory.
        filepath: PathBuf,
    },
    /// Simulate paired-end reads with wgsim.
    Reads {
        /// Reference FASTA.
        reference: PathBuf,
        /// Number of read pairs.
        #[arg(long, default_value_t = 1000)]
        num_reads: u64,
        /// Per-base mutation rate.
        #[arg(long, default_value_t = 0.001)]
        mutation_rate: f64,
    },
    /// Align paired reads with bwa mem and produce a sorted, indexed BAM.
    Align {
        /// Reference FASTA.
        reference: PathBuf,
        /// First-mate FASTQ.
        r1: PathBuf,
        /// Second-mate FASTQ.
        r2: PathBuf,
    },
    /// Call variants with bcftools.
    Call {
        /// Sorted, indexed BAM.
        bam: PathBuf,
        /// Reference FASTA.
        reference: PathBuf,
    },
    /// Simulate diploid variants with a seeded coalescent.
    Coalescent {
        /// Number of diploid individuals.
        #[arg(long, default_value_t = 10)]
        sample_size: usize,
        /// Sequence length in bases.
        #[arg(long, default_value_t = 10_000)]
        length: u64,
    },
    /// Digest proteins and write theoretical MS/MS spectra as mzML.
    Spectra {
        /// Protein FASTA.
        protein_fasta: PathBuf,
        /// Protease name.
        #[arg(long, default_value = DEFAULT_ENZYME)]
        enzyme: String,
    },
    /// Simulate a metabolomics peak table as CSV.
    Peaks {
        /// Number of compound features.
        #[arg(long, default_value_t = 100)]
        num_compounds: usize,
        /// Number of sample columns.
        #[arg(long, default_value_t = 20)]
        num_samples: usize,
        /// Noise peaks as a fraction of the compound count.
        #[arg(long, default_value_t = 0.1)]
        noise_level: f64,
        /// Seed for a reproducible table.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Inspect or invoke registered tools by name.
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },
    /// Evaluate a chat model on exam question files.
    Exam {
        #[command(subcommand)]
        kind: ExamCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ToolsCommand {
    /// Print every tool with its argument schema as JSON.
    List,
    /// Invoke a tool with JSON arguments.
    Invoke {
        /// Tool name.
        name: String,
        /// JSON object of arguments.
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[derive(Subcommand, Debug)]
enum ExamCommand {
    /// Fill-in-the-blank questions (`question`, `correct_answer`).
    FillBlank(ExamArgs),
    /// Multiple-choice questions (`question`, `options`, `answer`).
    MultipleChoice(ExamArgs),
}

#[derive(Args, Debug)]
struct ExamArgs {
    /// Question files (JSON arrays).
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "BIOGEN_BASE_URL", default_value = "https://api.openai.com/v1")]
    base_url: String,
    /// Bearer token for the endpoint.
    #[arg(long, env = "BIOGEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Model identifier.
    #[arg(long, env = "BIOGEN_MODEL")]
    model: String,
    /// Sampling temperature.
    #[arg(long, default_value_t = 0.1)]
    temperature: f64,
    /// Write wrongly answered items to this JSON file.
    #[arg(long)]
    wrong_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let toolbox = Toolbox::new(tool_config(&cli));

    match cli.command {
        Commands::Seed { filepath } => print_path(toolbox.seed_file_path(filepath)?),
        Commands::Reads {
            reference,
            num_reads,
            mutation_rate,
        } => {
            let pair = toolbox
                .simulate_dna_reads_paired(&reference, num_reads, mutation_rate)
                .context("read simulation failed")?;
            print_path(pair.r1);
            print_path(pair.r2);
        }
        Commands::Align { reference, r1, r2 } => {
            let bam = toolbox.align_reads_bwa(&reference, &r1, &r2).context("alignment failed")?;
            print_path(bam);
        }
        Commands::Call { bam, reference } => {
            let vcf = toolbox
                .call_variants_bcftools(&bam, &reference)
                .context("variant calling failed")?;
            print_path(vcf);
        }
        Commands::Coalescent { sample_size, length } => {
            let vcf = toolbox
                .simulate_variants_coalescent(sample_size, length)
                .context("coalescent simulation failed")?;
            print_path(vcf);
        }
        Commands::Spectra { protein_fasta, enzyme } => {
            let mzml = toolbox
                .simulate_ms_spectra(&protein_fasta, &enzyme)
                .context("spectrum simulation failed")?;
            print_path(mzml);
        }
        Commands::Peaks {
            num_compounds,
            num_samples,
            noise_level,
            seed,
        } => {
            let csv = toolbox
                .simulate_metabolomics_peak_list_with(&PeakTableParams {
                    num_compounds,
                    num_samples,
                    noise_level,
                    seed,
                })
                .context("peak list simulation failed")?;
            print_path(csv);
        }
        Commands::Tools { command } => run_tools(&toolbox, command)?,
        Commands::Exam { kind } => {
            let (kind, args) = match kind {
                ExamCommand::FillBlank(args) => (ExamKind::FillInBlank, args),
                ExamCommand::MultipleChoice(args) => (ExamKind::MultipleChoice, args),
            };
            run_exam(kind, args)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn tool_config(cli: &Cli) -> ToolConfig {
    let namespace = match (&cli.run_id, cli.content_addressed) {
        (Some(run_id), _) => ArtifactNamespace::Run(run_id.clone()),
        (None, true) => ArtifactNamespace::ContentAddressed,
        (None, false) => ArtifactNamespace::Shared,
    };
    let mut config = ToolConfig::new(&cli.workspace_dir, &cli.seed_dir).with_namespace(namespace);
    if let Some(env) = &cli.conda_env {
        config = config.with_conda_env(env);
    }
    if let Some(dir) = &cli.tool_dir {
        config = config.with_tool_dir(dir);
    }
    config
}

fn print_path(path: PathBuf) {
    println!("{}", path.display());
}

fn run_tools(toolbox: &Toolbox, command: ToolsCommand) -> Result<()> {
    let registry = ToolRegistry::with_builtin_tools();
    match command {
        ToolsCommand::List => {
            println!("{}", serde_json::to_string_pretty(&registry.list())?);
        }
        ToolsCommand::Invoke { name, args } => {
            let args: serde_json::Value =
                serde_json::from_str(&args).with_context(|| format!("arguments for {name} are not valid JSON"))?;
            let result = registry
                .invoke(toolbox, &name, &args)
                .with_context(|| format!("tool {name} failed"))?;
            println!("{result}");
        }
    }
    Ok(())
}

fn run_exam(kind: ExamKind, args: ExamArgs) -> Result<()> {
    let mut config = ChatModelConfig::new(&args.base_url, &args.model).with_temperature(args.temperature);
    if let Some(api_key) = &args.api_key {
        config = config.with_api_key(api_key);
    }
    let client = OpenAiCompatibleClient::new(config).context("failed to build HTTP client")?;
    let evaluator = ExamEvaluator::new(client, kind);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report: ExamReport = runtime
        .block_on(evaluator.evaluate_files(&args.files))
        .context("exam evaluation failed")?;

    println!("{}", serde_json::to_string_pretty(&report.files)?);
    if let Some(path) = &args.wrong_out {
        report
            .write_wrong_answers(path)
            .with_context(|| format!("failed to write wrong answers to {}", path.display()))?;
        tracing::info!(path = %path.display(), count = report.wrong.len(), "wrong answers written");
    }
    Ok(())
}
