//! Relay command-line driver.
//!
//! Runs the effect runtime against a recording platform so notification
//! handling and presentation guards can be exercised from a shell.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_effects::{AppStore, CoordinatorConfig, EffectRuntime, PresentationGuard, RecordingPlatform, RouteOutcome};
use relay_primitives::{AppState, SurfaceId, SurfaceStack};
use tokio::runtime::Handle;
use tracing::info;

/// How long `notify` waits for detached effects after boot.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Relay command line arguments.
#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Drive notification effects against a simulated app shell")]
struct Args {
	/// Coordinator configuration file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Feed notification responses to a booting app and report what happened
	Notify {
		/// Notification ids, handled in order
		#[arg(required = true, value_name = "ID")]
		ids: Vec<String>,

		/// Delay before the app reaches its tab bar
		#[arg(long, value_name = "N", default_value_t = 50)]
		boot_after_ms: u64,
	},
	/// Evaluate the sensitive-cover guard over an active surface stack
	Guard {
		/// Active surfaces, bottom first
		#[arg(required = true, value_name = "SURFACE")]
		surfaces: Vec<SurfaceId>,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config = match &args.config {
		Some(path) => load_config(path)?,
		None => CoordinatorConfig::default(),
	};

	match args.command {
		Command::Notify { ids, boot_after_ms } => notify(config, &ids, Duration::from_millis(boot_after_ms)).await,
		Command::Guard { surfaces } => {
			guard(&surfaces);
			Ok(())
		}
	}
}

fn load_config(path: &Path) -> anyhow::Result<CoordinatorConfig> {
	let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	let config = CoordinatorConfig::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?;
	info!(path = %path.display(), ?config, "config.loaded");
	Ok(config)
}

async fn notify(config: CoordinatorConfig, ids: &[String], boot_after: Duration) -> anyhow::Result<()> {
	let platform = Arc::new(RecordingPlatform::new());
	let runtime = EffectRuntime::new(AppStore::new(AppState::default()), platform.clone(), config, Handle::current());

	for id in ids {
		match runtime.handle_notification_response(id) {
			RouteOutcome::NoMatch => println!("{id}: no route"),
			RouteOutcome::Dispatched { accepted, rejected } => {
				let kinds: Vec<&str> = accepted.iter().map(|effect| effect.kind()).collect();
				println!("{id}: dispatched [{}], rejected {rejected}", kinds.join(", "));
			}
		}
	}

	tokio::time::sleep(boot_after).await;
	runtime.store().update(|state| {
		state.replace_surfaces([SurfaceId::TabBar]);
	});
	info!(after_ms = boot_after.as_millis(), "app.booted");

	if tokio::time::timeout(SETTLE_TIMEOUT, runtime.settle()).await.is_err() {
		tracing::warn!(in_flight = runtime.coordinator().in_flight(), "effects still pending, ending session");
	}
	runtime.shutdown().await;

	let state = runtime.store().snapshot();
	let surfaces: Vec<&str> = state.active_surfaces.iter().map(|s| s.as_str()).collect();
	println!("tab: {}", state.selected_tab);
	println!("surfaces: [{}]", surfaces.join(", "));
	for request in platform.requests() {
		println!("platform: {}", request.name());
	}
	Ok(())
}

fn guard(surfaces: &[SurfaceId]) {
	let target = SurfaceId::SensitiveCover;
	let allowed = PresentationGuard::SENSITIVE_COVER.allows(target, SurfaceStack::new(surfaces));
	println!("{target}: {}", if allowed { "present" } else { "suppress" });
}
