#![warn(clippy::pedantic)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use gifmatch_app::{Settings, SettingsRepository};
use gifmatch_domain::{
    AnalysisError, AssetRepository, ExerciseID, ExerciseRecord, ExerciseRepository, GifItem,
    MatchPolicy, Pause, ReadError, ReviewQueue, Service, UpdateError, VisionAnalysis,
    VisionRepository, exercises_for_muscle_group, find_best_match,
};
use gifmatch_storage::{DirectoryAssets, JsonCatalog, SettingsFile, VisionReports};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "gifmatch", version)]
#[command(about = "Match exercise GIFs to the exercises of a catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file
    #[arg(long, env = "GIFMATCH_SETTINGS", default_value = "gifmatch.json", global = true)]
    settings: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the catalog exercise that best matches a text
    Match {
        text: String,
        /// Prefer exercises of this muscle group
        #[arg(short, long)]
        muscle_group: Option<String>,
    },

    /// Match GIFs by their file names and, optionally, by vision reports
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory with one JSON vision report per GIF
        #[arg(long)]
        vision: Option<PathBuf>,
    },

    /// Analyze GIFs and store the approved ones as exercise GIFs
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory with one JSON vision report per GIF
        #[arg(long)]
        vision: Option<PathBuf>,
        /// Also store GIFs whose match was not approved automatically
        #[arg(long)]
        approve_all: bool,
    },

    /// List the exercises of the catalog
    Exercises {
        #[arg(short, long)]
        muscle_group: Option<String>,
    },

    /// Show the most recent log entries
    Log {
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Show the effective settings
    Settings {
        /// Write the effective settings to the settings file
        #[arg(long)]
        write: bool,
    },
}

struct Repository {
    catalog: JsonCatalog,
    assets: DirectoryAssets,
    vision: Option<VisionReports>,
}

impl Repository {
    fn new(settings: &Settings, vision: Option<PathBuf>) -> Self {
        Self {
            catalog: JsonCatalog::new(&settings.catalog),
            assets: DirectoryAssets::new(&settings.asset_dir, &settings.asset_base_url),
            vision: vision.map(VisionReports::new),
        }
    }
}

impl ExerciseRepository for Repository {
    async fn read_exercises(&self) -> Result<Vec<ExerciseRecord>, ReadError> {
        self.catalog.read_exercises().await
    }

    async fn update_gif_url(&self, id: ExerciseID, gif_url: String) -> Result<(), UpdateError> {
        self.catalog.update_gif_url(id, gif_url).await
    }
}

impl AssetRepository for Repository {
    async fn store_asset(&self, name: &str, content: &[u8]) -> Result<String, UpdateError> {
        self.assets.store_asset(name, content).await
    }
}

impl VisionRepository for Repository {
    async fn analyze_gif(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> Result<VisionAnalysis, AnalysisError> {
        match &self.vision {
            Some(vision) => vision.analyze_gif(file_name, content).await,
            None => Err(AnalysisError::Failed("no vision reports".to_string())),
        }
    }
}

impl Pause for Repository {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings_file = SettingsFile::new(&cli.settings);
    let settings = settings_file
        .read_settings()
        .with_context(|| format!("failed to read {}", cli.settings.display()))?;
    let policy = settings.match_policy()?;

    let log_repository: Option<Arc<Mutex<dyn gifmatch_app::log::Repository>>> = settings
        .log_file
        .as_ref()
        .map(|path| Arc::new(Mutex::new(gifmatch_storage::log::Log::new(path))) as _);
    gifmatch_app::log::init(log_repository, settings.log_level)
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))?;

    match cli.command {
        Commands::Match { text, muscle_group } => {
            let service = Service::new(Repository::new(&settings, None));
            let exercises = service.get_exercises().await?;
            let candidate = find_best_match(&text, muscle_group.as_deref(), &exercises, &policy);

            if candidate.is_match() {
                println!(
                    "{} ({}%, {} confidence)",
                    candidate.matched_name, candidate.similarity, candidate.confidence
                );
            } else {
                println!("no match");
            }
        }

        Commands::Analyze { files, vision } => {
            let service = Service::new(Repository::new(&settings, vision.clone()));
            let exercises = service.get_exercises().await?;
            let mut queue = read_queue(&files)?;

            analyze(&service, &mut queue, &exercises, &settings, &policy, vision.is_some()).await;
            print_queue(&queue);
        }

        Commands::Upload {
            files,
            vision,
            approve_all,
        } => {
            let service = Service::new(Repository::new(&settings, vision.clone()));
            let exercises = service.get_exercises().await?;
            let mut queue = read_queue(&files)?;

            analyze(&service, &mut queue, &exercises, &settings, &policy, vision.is_some()).await;

            if approve_all {
                for index in 0..queue.len() {
                    if let Some(item) = queue.get_mut(index) {
                        if let Err(err) = item.approve(true) {
                            warn!("not approving {}: {err}", item.original_name());
                        }
                    }
                }
            }

            let summary = service.upload_approved(&mut queue).await?;
            print_queue(&queue);
            println!("{} uploaded, {} failed", summary.uploaded, summary.failed);
        }

        Commands::Exercises { muscle_group } => {
            let service = Service::new(Repository::new(&settings, None));
            let exercises = service.get_exercises().await?;
            let selected = match &muscle_group {
                Some(muscle_group) => exercises_for_muscle_group(&exercises, muscle_group),
                None => exercises.iter().collect(),
            };

            for exercise in selected {
                println!(
                    "{}  {:<40} {:<20} {}",
                    exercise.id,
                    exercise.name,
                    exercise.muscle_group,
                    exercise.gif_url.as_deref().unwrap_or("-")
                );
            }
        }

        Commands::Log { count } => {
            if settings.log_file.is_none() {
                bail!("no log file configured");
            }
            for entry in gifmatch_app::log::entries()?.iter().take(count).rev() {
                println!("{} {:<5} {}", entry.time, entry.level, entry.message);
            }
        }

        Commands::Settings { write } => {
            if write {
                settings_file.write_settings(&settings)?;
                info!("settings written to {}", cli.settings.display());
            }
            println!("{settings:#?}");
        }
    }

    Ok(())
}

fn read_queue(files: &[PathBuf]) -> anyhow::Result<ReviewQueue> {
    let mut queue = ReviewQueue::new();
    let mut contents = Vec::with_capacity(files.len());

    for path in files {
        let content = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        contents.push((file_name(path), content));
    }

    let result = queue.add_files(contents);
    if result.rejected > 0 {
        warn!("{} files ignored, only GIFs are accepted", result.rejected);
    }
    if queue.is_empty() {
        bail!("no GIFs given");
    }

    Ok(queue)
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

async fn analyze(
    service: &Service<Repository>,
    queue: &mut ReviewQueue,
    exercises: &[ExerciseRecord],
    settings: &Settings,
    policy: &MatchPolicy,
    with_vision: bool,
) {
    let stats = queue.analyze_by_file_name(exercises, policy);
    info!(
        "{} GIFs matched by file name, {} approved automatically",
        stats.total, stats.approved
    );

    if with_vision {
        let pacing = settings.pacing();
        service
            .analyze_with_vision(queue, exercises, policy, &pacing)
            .await;
    }
}

fn print_queue(queue: &ReviewQueue) {
    for item in queue.items() {
        print_item(item);
    }

    let stats = queue.stats();
    println!(
        "{} GIFs: {} analyzed, {} approved, {} uploaded, {} errors | confidence: {} high, {} medium, {} low",
        stats.total,
        stats.analyzed,
        stats.approved,
        stats.uploaded,
        stats.errors,
        stats.high,
        stats.medium,
        stats.low
    );
}

fn print_item(item: &GifItem) {
    let selection = item
        .selection()
        .map_or("-", |selection| selection.exercise_name.as_str());
    let confidence = item
        .confidence()
        .map_or_else(|| "-".to_string(), |confidence| confidence.to_string());

    println!(
        "{:<40} {:<10} {:<7} {selection}",
        item.original_name(),
        item.status(),
        confidence
    );

    if let Some(comparison) = item.comparison() {
        println!(
            "    file name is {} for {} ({}%)",
            comparison.status, comparison.suggested_name, comparison.similarity
        );
    }
    if let Some(final_name) = item.final_name() {
        println!("    stored as {final_name}");
    }
    if let Some(error) = item.error() {
        println!("    error: {error}");
    }
}
