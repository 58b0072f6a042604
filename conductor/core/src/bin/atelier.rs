//! Atelier headless CLI
//!
//! Runs concept synthesis without a terminal UI.
//!
//! # Usage
//!
//! ```bash
//! # Synthesize a concept from three references, saving images
//! GEMINI_API_KEY=... atelier mix texture.jpg silhouette.jpg color.jpg --out-dir looks/
//!
//! # Machine-readable publication log
//! atelier mix a.png b.png c.png --json > run.jsonl
//!
//! # Directed generation from a prompt and up to three references
//! atelier direct --prompt "liquid chrome armor" ref1.png ref2.png --out armor.png
//!
//! # With verbose logging
//! RUST_LOG=debug atelier mix a.png b.png c.png
//! ```
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY` / `API_KEY`: API key
//! - `ATELIER_BASE_URL`, `ATELIER_CONCEPT_MODEL`, `ATELIER_IMAGE_MODEL`,
//!   `ATELIER_SEARCH_MODEL`, `ATELIER_MAX_LEADS`: see `atelier_core::config`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)
//!
//! Logs go to stderr so stdout stays clean for `--json`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};

use atelier_core::backend::GenerativeBackend;
use atelier_core::{
    load_config, load_config_from_path, ConceptRecord, Conductor, ConductorMessage,
    ConfigOverrides, DirectedRequest, GeminiBackend, GenerationGateway, ImageData, MediaFile,
    MediaStager, ReferenceSlot, RunRequest, RunState, StudioConfig,
};

#[derive(Parser, Debug)]
#[command(name = "atelier", version, about = "Concept synthesis from three reference images")]
struct Cli {
    /// Config file (defaults to ~/.config/atelier/atelier.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key (overrides GEMINI_API_KEY)
    #[arg(long, global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Concept synthesis model
    #[arg(long, global = true)]
    concept_model: Option<String>,

    /// Image model
    #[arg(long, global = true)]
    image_model: Option<String>,

    /// Maximum shopping leads
    #[arg(long, global = true)]
    max_leads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize a concept from texture, silhouette and color references
    Mix {
        /// Texture reference image
        texture: PathBuf,
        /// Silhouette reference image
        silhouette: PathBuf,
        /// Color reference image
        color: PathBuf,
        /// Print each publication as a JSON line
        #[arg(long)]
        json: bool,
        /// Directory to write the illustration and mood board into
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Generate one image from a directive and reference images
    Direct {
        /// Creative directive
        #[arg(long, short)]
        prompt: String,
        /// Reference images (the first is required)
        #[arg(required = true, num_args = 1..=3)]
        references: Vec<PathBuf>,
        /// Output file (defaults to directed.<ext>)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            concept_model: self.concept_model.clone(),
            image_model: self.image_model.clone(),
            max_leads: self.max_leads,
        }
    }

    fn studio_config(&self) -> anyhow::Result<StudioConfig> {
        let mut config = match self.config {
            Some(ref path) => load_config_from_path(Some(path))?,
            None => load_config()?,
        };
        self.overrides().apply(&mut config);
        config.validate()?;
        info!(source = %config.source, "Configuration loaded");
        Ok(config)
    }
}

type StudioConductor = Conductor<GenerationGateway<GeminiBackend>>;

async fn build_conductor(
    config: &StudioConfig,
    tx: mpsc::Sender<ConductorMessage>,
) -> anyhow::Result<StudioConductor> {
    let backend = GeminiBackend::new(&config.backend)?;

    // Check backend health
    if config.backend.api_key.is_none() {
        warn!("No API key configured; set GEMINI_API_KEY or pass --api-key");
    } else if backend.health_check().await {
        info!(backend = backend.name(), "Backend reachable");
    } else {
        warn!(
            backend = backend.name(),
            base_url = %config.backend.base_url,
            "Backend not available - generation calls will likely fail"
        );
    }

    let gateway = GenerationGateway::new(backend, config.gateway.clone());
    Ok(Conductor::new(gateway, config.conductor.clone(), tx))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("atelier=info".parse()?)
                .add_directive("atelier_core=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.studio_config()?;

    match cli.command {
        Command::Mix {
            ref texture,
            ref silhouette,
            ref color,
            json,
            ref out_dir,
        } => {
            let paths = [texture.as_path(), silhouette.as_path(), color.as_path()];
            mix(&config, paths, json, out_dir.as_deref()).await
        }
        Command::Direct {
            ref prompt,
            ref references,
            ref out,
        } => direct(&config, prompt, references, out.as_deref()).await,
    }
}

// ============================================
// mix
// ============================================

async fn mix(
    config: &StudioConfig,
    paths: [&Path; 3],
    json: bool,
    out_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let stager = MediaStager::new(config.max_payload_bytes);
    let mut request = RunRequest::default();
    for (slot, path) in ReferenceSlot::ALL.into_iter().zip(paths) {
        let file = MediaFile::load(path)
            .await
            .with_context(|| format!("reading {slot} reference {}", path.display()))?;
        let staged = stager.stage(&file);
        if let Some(payload) = staged.payload {
            request = request.with_reference(slot, payload);
        }
    }

    let (tx, mut rx) = mpsc::channel(64);
    let mut conductor = build_conductor(config, tx).await?;
    conductor.start_run(request).await?;

    loop {
        while let Ok(msg) = rx.try_recv() {
            print_message(&msg, json)?;
        }
        if conductor.state().is_terminal() || !conductor.process_next().await {
            break;
        }
    }
    while let Ok(msg) = rx.try_recv() {
        print_message(&msg, json)?;
    }

    match conductor.state() {
        RunState::Settled => {
            if let (Some(dir), Some(record)) = (out_dir, conductor.record()) {
                save_images(dir, &record).await?;
            }
            Ok(())
        }
        RunState::Failed => {
            let error = conductor.snapshot().error.unwrap_or_default();
            anyhow::bail!("synthesis failed: {error}")
        }
        other => anyhow::bail!("run stopped early: {}", other.description()),
    }
}

fn print_message(msg: &ConductorMessage, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(msg)?);
        return Ok(());
    }

    match msg {
        ConductorMessage::State { run_id, state } => {
            let pending: Vec<_> = state.pending().iter().map(|k| k.label()).collect();
            if pending.is_empty() {
                println!("[{run_id}] {}", state.description());
            } else {
                println!("[{run_id}] {} ({})", state.description(), pending.join(", "));
            }
        }
        ConductorMessage::ThemeChanged { theme } => {
            println!(
                "theme: {} ({} / {})",
                theme.name, theme.primary_color, theme.secondary_color
            );
        }
        ConductorMessage::ConceptPublished { run_id, record, .. } => {
            print_record(*run_id, record);
        }
        ConductorMessage::RunFailed { run_id, error } => {
            println!("[{run_id}] failed: {error}");
        }
    }
    Ok(())
}

fn print_record(run_id: atelier_core::RunId, record: &ConceptRecord) {
    println!("[{run_id}] {}", record.name().to_uppercase());
    println!("  {}", record.rationale());
    println!("  tags: {}", record.design_tags().join(" · "));
    let details = record.details();
    println!("  fabrication:  {}", details.fabrication);
    println!("  structure:    {}", details.structure);
    println!("  color theory: {}", details.color_theory);
    println!("  archetype:    {}", details.archetype);

    match record.illustration() {
        Some(image) => println!("  illustration: {} ({} bytes)", image.mime_type, image.len()),
        None => println!("  illustration: pending"),
    }
    match record.shopping_leads() {
        Some([]) => println!("  leads: none found"),
        Some(leads) => {
            println!("  leads:");
            for lead in leads {
                let host = lead.host().unwrap_or_else(|| lead.url.clone());
                println!("    - {} ({host})", lead.title);
            }
        }
        None => println!("  leads: pending"),
    }
    match record.mood_board() {
        Some(tiles) => {
            let facets: Vec<_> = tiles.iter().map(|t| t.facet.label()).collect();
            println!("  mood board: {}", facets.join(", "));
        }
        None => println!("  mood board: pending"),
    }
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "concept".to_string()
    } else {
        slug.to_string()
    }
}

async fn write_image(path: PathBuf, image: &ImageData) -> anyhow::Result<()> {
    tokio::fs::write(&path, image.bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = image.len(), "Image saved");
    Ok(())
}

async fn save_images(dir: &Path, record: &ConceptRecord) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let base = slug(record.name());

    if let Some(image) = record.illustration() {
        let path = dir.join(format!("{base}-illustration.{}", image.extension()));
        write_image(path, image).await?;
    }
    for (index, tile) in record.mood_board().unwrap_or_default().iter().enumerate() {
        let facet = tile.facet.label().to_lowercase();
        let path = dir.join(format!(
            "{base}-mood-{}-{facet}.{}",
            index + 1,
            tile.image.extension()
        ));
        write_image(path, &tile.image).await?;
    }
    Ok(())
}

// ============================================
// direct
// ============================================

async fn direct(
    config: &StudioConfig,
    prompt: &str,
    references: &[PathBuf],
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let stager = MediaStager::new(config.max_payload_bytes);
    let mut request = DirectedRequest {
        directive: prompt.to_string(),
        ..DirectedRequest::default()
    };
    for (index, path) in references.iter().enumerate() {
        let file = MediaFile::load(path)
            .await
            .with_context(|| format!("reading reference {}", path.display()))?;
        if let Some(payload) = stager.stage(&file).payload {
            request = request.with_reference(index, payload);
        }
    }

    // Directed generation never touches run state, so the message log stays empty
    let (tx, _rx) = mpsc::channel(1);
    let conductor = build_conductor(config, tx).await?;

    let image = conductor
        .direct(request)
        .await?
        .context("the model produced no image for this directive")?;

    let path = out.map_or_else(
        || PathBuf::from(format!("directed.{}", image.extension())),
        Path::to_path_buf,
    );
    write_image(path.clone(), &image).await?;
    println!("{}", path.display());
    Ok(())
}
