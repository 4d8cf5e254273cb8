use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use emotion_resonance::adaptation::{JsonFileStore, MemoryStore, ModelStore, PersonalAdaptationStore};
use emotion_resonance::analysis::{Color, EmotionAnalyzer, MagnitudeScale};
use emotion_resonance::capture::{read_wav, FrameBuilder, SyntheticSource, DEFAULT_FFT_SIZE};
use emotion_resonance::config::AppConfig;
use emotion_resonance::engine::{AnalyzerHandle, StubTimeSource};
use emotion_resonance::error::{log_capture_error, log_taxonomy_error};
use emotion_resonance::taxonomy::EmotionTaxonomy;

#[path = "emotion_diag/report.rs"]
mod report;
use report::{ModelReport, SessionAggregator, StatesPayload};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("emotion-diag error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(name = "emotion-diag", about = "Offline harness for the emotion resonance pipeline")]
struct Cli {
    /// Log filter directive (e.g. `info`, `emotion_resonance=debug`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// JSON config file; missing or invalid files fall back to defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => AppConfig::load_from_file(path),
            None => AppConfig::default(),
        };
        match self.command {
            Command::Analyze(args) => analyze_command(args, config),
            Command::Taxonomy(args) => taxonomy_command(args),
            Command::Model(args) => model_command(args, config),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a WAV file or synthetic source through the pipeline and summarize.
    Analyze(AnalyzeArgs),
    /// Validate a taxonomy file (or the built-in one) and print it as JSON.
    Taxonomy(TaxonomyArgs),
    /// Summarize a stored personal model.
    Model(ModelArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Analysis window in samples.
    #[arg(long, default_value_t = DEFAULT_FFT_SIZE)]
    fft_size: usize,
    /// Samples between consecutive frames (defaults to the window size).
    #[arg(long)]
    hop: Option<usize>,
    /// Magnitude scale of the generated frames.
    #[arg(long, value_enum, default_value_t = ScaleArg::Decibels)]
    scale: ScaleArg,
    /// Taxonomy JSON file; the built-in taxonomy is used when omitted.
    #[arg(long)]
    taxonomy: Option<PathBuf>,
    #[command(flatten)]
    store: StoreArgs,
    /// After the run, record a correction of the last state to this category.
    #[arg(long)]
    correct_last: Option<String>,
    /// Output format for the session summary.
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,
    /// Write every produced state to this JSON file.
    #[arg(long)]
    states_out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Path to a WAV file to analyze.
    #[arg(long)]
    wav: Option<PathBuf>,
    /// Deterministic synthetic source to generate.
    #[arg(long, value_enum)]
    synthetic: Option<SyntheticArg>,
    /// Fundamental / tone frequency for synthetic sources.
    #[arg(long, default_value_t = 220.0)]
    frequency: f32,
    /// Beat rate for the bursts source.
    #[arg(long, default_value_t = 120.0)]
    bpm: f32,
    /// Length of the synthetic source (milliseconds).
    #[arg(long, default_value_t = 2_000)]
    duration_ms: u32,
    /// Sample rate for synthetic sources.
    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,
    /// Seed for the noise source.
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

impl SourceArgs {
    fn validate(&self) -> Result<()> {
        let selected = self.wav.is_some() as u8 + self.synthetic.is_some() as u8;
        if selected != 1 {
            bail!("Provide exactly one source via --wav or --synthetic");
        }
        if let Some(path) = &self.wav {
            if !path.exists() {
                bail!("wav file {} does not exist", path.display());
            }
        }
        if self.sample_rate == 0 {
            bail!("Sample rate must be greater than zero");
        }
        Ok(())
    }

    fn resolved_id(&self) -> String {
        if let Some(path) = &self.wav {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                return stem.to_string();
            }
        }
        match self.synthetic {
            Some(kind) => format!("synthetic-{kind:?}").to_lowercase(),
            None => "unknown".into(),
        }
    }

    /// Mono PCM plus its sample rate
    fn load(&self) -> Result<(Vec<f32>, u32)> {
        if let Some(path) = &self.wav {
            let clip = read_wav(path).map_err(|err| {
                log_capture_error(&err, "emotion-diag analyze");
                anyhow!(err)
            })?;
            return Ok((clip.samples, clip.sample_rate));
        }

        let Some(kind) = self.synthetic else {
            bail!("No source provided");
        };
        let source = match kind {
            SyntheticArg::Sine => SyntheticSource::Sine {
                frequency_hz: self.frequency,
                amplitude: 0.8,
            },
            SyntheticArg::Harmonic => SyntheticSource::HarmonicStack {
                f0_hz: self.frequency,
                partials: 6,
                amplitude: 0.8,
            },
            SyntheticArg::Noise => SyntheticSource::WhiteNoise {
                amplitude: 0.5,
                seed: self.seed,
            },
            SyntheticArg::Bursts => SyntheticSource::Bursts {
                frequency_hz: self.frequency,
                bpm: self.bpm,
                amplitude: 0.8,
            },
            SyntheticArg::Silence => SyntheticSource::Silence,
        };
        let len = (self.sample_rate as u64 * self.duration_ms as u64 / 1_000) as usize;
        Ok((source.render(self.sample_rate, len), self.sample_rate))
    }
}

#[derive(Args, Debug, Clone)]
struct StoreArgs {
    /// Directory holding per-user model files; models stay in memory when omitted.
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// User whose personal model is loaded and updated.
    #[arg(long, default_value = "default")]
    user: String,
}

#[derive(Args, Debug, Clone)]
struct TaxonomyArgs {
    /// Taxonomy JSON file to validate.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Directory holding per-user model files.
    #[arg(long)]
    store_dir: PathBuf,
    #[arg(long, default_value = "default")]
    user: String,
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,
    /// Set a personal palette as CATEGORY=#RRGGBB[,#RRGGBB...] and save it.
    #[arg(long = "set-colors", value_name = "CATEGORY=COLORS")]
    set_colors: Option<String>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SyntheticArg {
    Sine,
    Harmonic,
    Noise,
    Bursts,
    Silence,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ScaleArg {
    Decibels,
    Linear,
}

impl From<ScaleArg> for MagnitudeScale {
    fn from(value: ScaleArg) -> Self {
        match value {
            ScaleArg::Decibels => MagnitudeScale::Decibels,
            ScaleArg::Linear => MagnitudeScale::Linear,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ReportFormat {
    Json,
    Table,
}

fn load_taxonomy(path: Option<&PathBuf>, context: &str) -> Result<EmotionTaxonomy> {
    match path {
        Some(path) => EmotionTaxonomy::load_from_file(path).map_err(|err| {
            log_taxonomy_error(&err, context);
            anyhow!(err).context(format!("loading taxonomy {}", path.display()))
        }),
        None => Ok(EmotionTaxonomy::builtin()),
    }
}

fn open_backend(dir: Option<&PathBuf>) -> Box<dyn ModelStore> {
    match dir {
        Some(dir) => Box::new(JsonFileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn analyze_command(args: AnalyzeArgs, mut config: AppConfig) -> Result<()> {
    args.source.validate()?;
    if args.fft_size < 2 {
        bail!("FFT size must be at least 2");
    }

    let (pcm, sample_rate) = args.source.load()?;
    let hop = args.hop.unwrap_or(args.fft_size).max(1);
    // One analysis tick per hop
    config.rhythm.frame_rate_hz = sample_rate as f32 / hop as f32;
    let builder = FrameBuilder::new(args.fft_size, args.scale.into(), &config.extraction);
    let frames = builder.frames(&pcm, sample_rate, hop);

    let taxonomy = load_taxonomy(args.taxonomy.as_ref(), "emotion-diag analyze")?;
    let store = PersonalAdaptationStore::restore(
        config.adaptation.clone(),
        open_backend(args.store.store_dir.as_ref()),
        &args.store.user,
    );
    // Frame timestamps advance by the hop so recency matches the audio
    let hop_ms = (hop as u64 * 1_000 / sample_rate.max(1) as u64).max(1);
    let clock = Arc::new(StubTimeSource::new(now_ms(), hop_ms));
    let analyzer = EmotionAnalyzer::new(taxonomy, &config, store)
        .map_err(|err| {
            log_taxonomy_error(&err, "emotion-diag analyze");
            anyhow!(err)
        })?
        .with_time_source(clock);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let correct_last = args.correct_last.clone();
    let states = runtime.block_on(async move {
        let handle = AnalyzerHandle::spawn(analyzer);
        let mut states = Vec::with_capacity(frames.len());
        for frame in frames {
            states.push(handle.analyze(frame).await?);
        }
        if let (Some(category), Some(last)) = (&correct_last, states.last()) {
            handle
                .record_correction(last.clone(), category, "emotion-diag")
                .await?;
        }
        handle.shutdown().await?;
        Ok::<_, anyhow::Error>(states)
    })?;

    let source_id = args.source.resolved_id();
    let mut aggregator = SessionAggregator::default();
    for state in &states {
        aggregator.record(state);
    }

    if let Some(path) = &args.states_out {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("creating states output directory")?;
        }
        let payload = StatesPayload {
            source: source_id.clone(),
            sample_rate,
            state_count: states.len(),
            states,
        };
        let json = serde_json::to_string_pretty(&payload).context("serializing states")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing states to {}", path.display()))?;
    }

    let report = aggregator.into_report(source_id, sample_rate);
    match args.format {
        ReportFormat::Json => report.print_json()?,
        ReportFormat::Table => report.print_table(),
    }
    Ok(())
}

fn taxonomy_command(args: TaxonomyArgs) -> Result<()> {
    let taxonomy = load_taxonomy(args.file.as_ref(), "emotion-diag taxonomy")?;
    let json = taxonomy
        .to_json_pretty()
        .map_err(|err| anyhow!(err))
        .context("serializing taxonomy")?;
    println!("{json}");
    Ok(())
}

fn model_command(args: ModelArgs, config: AppConfig) -> Result<()> {
    let mut store = PersonalAdaptationStore::restore(
        config.adaptation,
        Box::new(JsonFileStore::new(&args.store_dir)),
        &args.user,
    );

    if let Some(entry) = &args.set_colors {
        let (category, colors) = parse_color_entry(entry)?;
        store.set_color_preference(&category, colors);
        store
            .flush()
            .map_err(|err| anyhow!(err))
            .context("saving personal model")?;
    }

    let report = ModelReport::from_store(&store);
    match args.format {
        ReportFormat::Json => report.print_json()?,
        ReportFormat::Table => report.print_table(),
    }
    Ok(())
}

fn parse_color_entry(entry: &str) -> Result<(String, Vec<Color>)> {
    let (category, list) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("colors must use CATEGORY=#RRGGBB,... format: {entry}"))?;
    if category.is_empty() {
        bail!("category cannot be empty");
    }
    let colors = list
        .split(',')
        .filter(|hex| !hex.trim().is_empty())
        .map(|hex| {
            Color::from_hex(hex.trim()).ok_or_else(|| anyhow!("invalid color {hex}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((category.to_string(), colors))
}
