use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use legendary_bot::application::commands::register_builtin_commands;
use legendary_bot::application::errors::BotError;
use legendary_bot::application::messaging::MessageDispatcher;
use legendary_bot::application::services::ItemCache;
use legendary_bot::domain::entities::CommandTable;
use legendary_bot::domain::traits::{Bot, Diagnostics, GameApi};
use legendary_bot::infrastructure::adapters::console::ConsoleAdapter;
use legendary_bot::infrastructure::battlenet::BattleNetClient;
use legendary_bot::infrastructure::config::Config;
use legendary_bot::infrastructure::database::Database;
use legendary_bot::infrastructure::diagnostics::LogDiagnostics;
use legendary_bot::infrastructure::plugins::{BuiltinSource, ManifestSource, PluginRegistry, PluginSource};
use legendary_bot::infrastructure::wowprogress::WowProgressClient;
use legendary_bot::plugins::{PluginManager, Services};

#[derive(Parser)]
#[command(name = "legendary-bot")]
#[command(about = "A plugin-driven World of Warcraft guild bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config) {
                tracing::error!("Bot stopped with an error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("legendary-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if !Path::new(config_path).exists() {
        return Config::load_env();
    }
    let mut config = Config::load(config_path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Config::default()
    });
    config.apply_env();
    config
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = Arc::new(load_config(config_path));
    config.validate()?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;
    rt.block_on(run(config))
}

async fn run(config: Arc<Config>) -> Result<(), BotError> {
    tracing::info!("Starting legendary-bot: {}", config.bot.name);

    let database = Arc::new(Database::new(&config.database.path)?);
    tracing::info!("Database initialized at {}", config.database.path.display());

    if config.battlenet.api_key.is_none() {
        tracing::warn!("BATTLENET_KEY not set, Battle.net lookups will be rejected");
    }
    let api: Arc<dyn GameApi> = Arc::new(BattleNetClient::from_config(&config.battlenet));

    let console = Arc::new(ConsoleAdapter::new(&config.bot.name, config.console.clone()));
    let bot: Arc<dyn Bot> = console.clone();
    let info = bot.bot_info();
    tracing::info!("Bot started: {} ({})", info.name, info.id);
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(LogDiagnostics);
    let commands = Arc::new(CommandTable::new());

    let services = Services {
        commands: commands.clone(),
        bot: bot.clone(),
        settings: database.clone(),
        api: api.clone(),
        ranks: Arc::new(WowProgressClient::new(config.wowprogress.base_url.clone())),
        watermarks: database.clone(),
        items: Arc::new(ItemCache::for_api(api)),
        diagnostics: diagnostics.clone(),
        config: config.clone(),
    };

    let registry = Arc::new(PluginRegistry::with_builtins());
    let source: Arc<dyn PluginSource> = if config.plugins.use_manifests {
        Arc::new(ManifestSource::new(config.plugins.directory.clone(), registry))
    } else {
        Arc::new(BuiltinSource::new(registry, config.plugins.enabled.clone()))
    };
    let manager = Arc::new(PluginManager::new(source, services));

    register_builtin_commands(
        &commands,
        Arc::downgrade(&manager),
        config.bot.owner_id.clone(),
        database.clone(),
    )
    .map_err(|e| BotError::Internal(e.to_string()))?;

    let load = manager.load_all().await;
    for failure in &load.failures {
        tracing::warn!("Plugin not loaded: {}", failure);
    }
    let start = manager.start_all().await;
    for (id, e) in &start.failures {
        tracing::warn!(plugin = %id, "Plugin not started: {}", e);
    }
    tracing::info!(
        "Plugin system initialized with {} plugins, {} commands",
        start.started.len(),
        commands.len()
    );

    let dispatcher = MessageDispatcher::new(&config.bot.prefix, commands.clone(), bot, diagnostics);
    let mut lines = ConsoleAdapter::stdin_lines();

    tracing::info!("Reading commands from stdin, prefix '{}'", config.bot.prefix);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        let outcome = dispatcher.dispatch(console.incoming(line)).await;
                        tracing::debug!(?outcome, "Dispatched console input");
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    }

    for (id, e) in manager.stop_all().await {
        tracing::warn!(plugin = %id, "Plugin failed to stop: {}", e);
    }
    tracing::info!("Bye");
    Ok(())
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render config: {}", e),
    }
}
