use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cortex_tree::client::{DeepLink, NeuronClient, QueryUrl};
use cortex_tree::graph::{extract, GraphSink};
use cortex_tree::models::{Graph, NeuronQuery, RenderDirection};
use cortex_tree::settings::Settings;
use cortex_tree::state::{confirm_delete, ContextMenuCommand, InteractionState};
use cortex_tree::subscriptions::SubscriptionCoordinator;
use cortex_tree::sync::{
    run_watch, NeuronCommands, NeuronSource, NotificationSink, SyncEngine, WatchOptions,
};
use cortex_tree::tree_render;

#[derive(Parser)]
#[command(name = "cortex-tree")]
#[command(about = "Live neuron tree synchronization and graph derivation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch an avatar, appending new neurons as they arrive
    Watch {
        /// Avatar URL, or a deep link carrying ?avatarUrl=...&direction=...
        url: String,

        /// Render direction: TopToBottom or BottomToTop
        #[arg(short, long)]
        direction: Option<String>,

        /// Poll interval in milliseconds (overrides CORTEX_TREE_UPDATE_CHECK_INTERVAL)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Fetch the tree once and print it
    Show {
        url: String,

        /// Render direction: TopToBottom or BottomToTop
        #[arg(short, long)]
        direction: Option<String>,
    },
    /// Fetch the tree once and print the derived graph as JSON
    Graph { url: String },
    /// Create a link between two neurons
    Link {
        url: String,
        source_id: String,
        target_id: String,
    },
    /// Delete a rendered neuron or terminal by root id
    Delete { url: String, id: String },
    /// Subscribe the signed-in e-mail address to avatar notifications
    Subscribe { url: String },
}

/// Initialize tracing on stderr so stdout stays clean for rendered output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "cortex_tree=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Toast surface printing to the terminal.
struct Toast;

impl NotificationSink for Toast {
    fn report_success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn report_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn alert(&self) {
        // terminal bell, once per quiet period
        eprint!("\x07");
    }
}

/// Rendering surface printing the graph as a JSON line.
struct JsonGraphSink;

impl GraphSink for JsonGraphSink {
    fn display_graph(&mut self, graph: &Graph) {
        match serde_json::to_string(graph) {
            Ok(json) => println!("{}", json),
            Err(err) => tracing::error!(%err, "failed to serialize graph"),
        }
    }
}

struct SessionTarget {
    avatar_url: String,
    deep_link: DeepLink,
}

/// Accept either a bare avatar URL or a deep link wrapping one.
fn resolve_target(url: &str) -> anyhow::Result<SessionTarget> {
    let deep_link = DeepLink::parse(url);
    if let Some(avatar_url) = deep_link.avatar_url.clone() {
        return Ok(SessionTarget {
            avatar_url,
            deep_link,
        });
    }
    let query_url = QueryUrl::try_parse(url)
        .ok_or_else(|| anyhow::anyhow!("not a valid http(s) avatar URL: {}", url))?;
    Ok(SessionTarget {
        avatar_url: query_url.avatar_url().to_string(),
        deep_link,
    })
}

fn resolve_direction(
    flag: Option<&str>,
    deep_link: &DeepLink,
) -> anyhow::Result<RenderDirection> {
    match flag {
        Some(value) => RenderDirection::from_str(value)
            .ok_or_else(|| anyhow::anyhow!("unknown direction: {}", value)),
        None => Ok(deep_link.direction.unwrap_or_default()),
    }
}

/// Resolve the deep link's region/postsynaptic filters at session start.
async fn report_deep_link_filters(client: &NeuronClient, target: &SessionTarget) {
    if let Some(ref region_id) = target.deep_link.region_id {
        match client
            .get_neuron_by_id(&target.avatar_url, region_id, &NeuronQuery::default())
            .await
        {
            Ok(items) => match items.first() {
                Some(region) => tracing::info!(region = %region.tag, "region filter active"),
                None => tracing::warn!(region_id = %region_id, "region neuron not found"),
            },
            Err(err) => tracing::warn!(%err, "failed to resolve region neuron"),
        }
    }
    if !target.deep_link.postsynaptic.is_empty() {
        let query = NeuronQuery {
            ids: target.deep_link.postsynaptic.clone(),
            ..NeuronQuery::default()
        };
        match client.get_neurons(&target.avatar_url, &query).await {
            Ok(items) => tracing::info!(count = items.len(), "postsynaptic filter active"),
            Err(err) => tracing::warn!(%err, "failed to resolve postsynaptic neurons"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::from_env();
    let client = NeuronClient::from_env();
    let toast = Toast;

    match cli.command {
        Commands::Watch {
            url,
            direction,
            interval,
        } => {
            let target = resolve_target(&url)?;
            let direction = resolve_direction(direction.as_deref(), &target.deep_link)?;
            report_deep_link_filters(&client, &target).await;

            let options = WatchOptions {
                avatar_url: target.avatar_url.clone(),
                direction,
                interval: interval
                    .map(Duration::from_millis)
                    .unwrap_or_else(|| settings.update_check_interval()),
            };
            tracing::info!(
                avatar = %options.avatar_url,
                interval_ms = options.interval.as_millis() as u64,
                "watching avatar"
            );

            let mut engine = SyncEngine::new(direction);
            let mut sink = JsonGraphSink;
            run_watch(
                &mut engine,
                &client,
                &toast,
                &mut sink,
                |forest| print!("{}", tree_render::render_forest(forest)),
                &options,
                async {
                    let _ = tokio::signal::ctrl_c().await;
                },
            )
            .await?;
        }
        Commands::Show { url, direction } => {
            let target = resolve_target(&url)?;
            let direction = resolve_direction(direction.as_deref(), &target.deep_link)?;
            report_deep_link_filters(&client, &target).await;

            let mut engine = SyncEngine::new(direction);
            engine
                .reload(&client, &target.avatar_url, direction)
                .await?;
            print!("{}", tree_render::render_forest(engine.forest()));
        }
        Commands::Graph { url } => {
            let target = resolve_target(&url)?;
            let mut engine = SyncEngine::new(RenderDirection::TopToBottom);
            engine
                .reload(&client, &target.avatar_url, RenderDirection::TopToBottom)
                .await?;
            let graph = extract(engine.forest());
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
        Commands::Link {
            url,
            source_id,
            target_id,
        } => {
            let target = resolve_target(&url)?;
            match client
                .create_link(&target.avatar_url, &source_id, &target_id)
                .await
            {
                Ok(()) => toast.report_success("Linking successful."),
                Err(err) => toast.report_error(&err.to_string()),
            }
        }
        Commands::Delete { url, id } => {
            let target = resolve_target(&url)?;
            let mut engine = SyncEngine::new(RenderDirection::TopToBottom);
            engine
                .reload(&client, &target.avatar_url, RenderDirection::TopToBottom)
                .await?;

            let slot = engine
                .forest()
                .roots()
                .iter()
                .copied()
                .find(|&slot| engine.forest().node(slot).neuron.id == id)
                .ok_or_else(|| anyhow::anyhow!("neuron '{}' is not in the rendered tree", id))?;

            let mut state = InteractionState::new();
            state.select(slot);
            state.set_command(ContextMenuCommand::Delete, engine.forest())?;
            confirm_delete(&mut state, engine.forest(), &client, &toast, &target.avatar_url)
                .await?;
        }
        Commands::Subscribe { url } => {
            let target = resolve_target(&url)?;
            let coordinator = SubscriptionCoordinator::new(&client);
            match coordinator.server_public_key(&target.avatar_url).await {
                Ok(key) => tracing::debug!(key = %key, "server push public key"),
                Err(err) => tracing::warn!(%err, "failed to fetch server push configuration"),
            }
            match coordinator
                .subscribe_email(&target.avatar_url, &settings)
                .await
            {
                Ok(email) => toast.report_success(&format!(
                    "E-mail subscription using '{}' successful.",
                    email
                )),
                Err(err) => toast.report_error(&err.to_string()),
            }
        }
    }

    Ok(())
}
