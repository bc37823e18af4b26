//! Swarm arbitrage engine entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chainswarm::agent::Agent;
use chainswarm::api::{create_router, AppState};
use chainswarm::chain::registry::load_registry;
use chainswarm::config::Config;
use chainswarm::metrics;
use chainswarm::oracle::{
    ExecutorClient, InMemoryLedger, LedgerClient, MockTradeExecutor, OracleClient, TradeExecutor,
    TradeLedger,
};
use chainswarm::scanner::{find_opportunities, OpportunityStage};
use chainswarm::swarm::SwarmCoordinator;
use chainswarm::utils::shutdown_signal;

/// Swarm-coordinated cross-chain arbitrage engine.
#[derive(Parser, Debug)]
#[command(name = "chainswarm")]
#[command(about = "Cross-chain arbitrage scanner with a swarm of adaptive trading agents")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Run in dry-run mode (mock executor, no real trades).
    #[arg(long)]
    dry_run: Option<bool>,

    /// HTTP server port for health/status.
    #[arg(short, long, default_value = "8080")]
    port: u16,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the swarm loop (default).
    Run {
        /// Run in dry-run mode (mock executor, no real trades).
        #[arg(long)]
        dry_run: Option<bool>,

        /// HTTP server port for health/status.
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run a single scan cycle and print discovered opportunities.
    Scan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("chainswarm=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Scan) => cmd_scan().await,
        Some(Command::Run { dry_run, port }) => cmd_run(dry_run, port).await,
        None => cmd_run(args.dry_run, args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CHAINSWARM - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Oracle URL: {}", config.oracle_url);
    println!("  Executor URL: {}", config.executor_url);
    println!(
        "  Registry Feed: {}",
        config.registry_feed_url.as_deref().unwrap_or("(built-in)")
    );
    println!("  Agents: {}", config.agent_count);
    println!("  Board Capacity: {}", config.shared_board_capacity);
    println!("  Scan Interval: {}ms", config.scan_interval_ms);
    println!("  Max Position Size: {}", config.max_position_size);
    println!("  Min Profit Threshold: {}", config.min_profit_threshold);
    println!("  Max Gas Price: {}", config.max_gas_price);
    println!("  Confidence Threshold: {}", config.confidence_threshold);
    println!("  Dry Run: {}", config.dry_run);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run a single scan cycle and print discovered opportunities.
async fn cmd_scan() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("CHAINSWARM - ONE-SHOT SCAN");
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let oracle = OracleClient::new(&config);
    let registry = load_registry(oracle.http(), config.registry_feed_url.as_deref()).await;

    println!("\nScanning {} chains...\n", registry.len());

    let opportunities = find_opportunities(
        &registry,
        &oracle,
        &oracle,
        &config.initial_risk_params(),
        config.call_timeout_ms,
    )
    .await?;

    if opportunities.is_empty() {
        println!("No opportunities found.");
    } else {
        println!("Found {} opportunities:", opportunities.len());
        println!("----------------------------------------------------------------------");
        for opp in &opportunities {
            println!(
                "  {} -> {} {} | diff {}% | profit {} | gas {} | confidence {}",
                opp.source_chain,
                opp.target_chain,
                opp.token,
                opp.profit_percentage().round_dp(4),
                opp.estimated_profit.round_dp(4),
                opp.gas_cost,
                opp.confidence.round_dp(4),
            );
        }
    }

    println!("======================================================================");
    Ok(())
}

/// Run the swarm loop.
async fn cmd_run(dry_run_override: Option<bool>, port: u16) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(dry_run) = dry_run_override {
        config.dry_run = dry_run;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("Agents: {}", config.agent_count);
    info!("Scan interval: {}ms", config.scan_interval_ms);

    // Install the Prometheus exporter and register metric descriptions
    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Prometheus exporter listening on {}", metrics_addr);
    }
    metrics::init_metrics();

    // Create app state
    let app_state = AppState::new();

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());

    // Spawn HTTP server
    let _server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    // Build collaborators
    let oracle = Arc::new(OracleClient::new(&config));
    let registry = Arc::new(
        load_registry(oracle.http(), config.registry_feed_url.as_deref()).await,
    );
    info!("Chain registry loaded: {} chains", registry.len());

    let executor: Arc<dyn TradeExecutor> = if config.dry_run {
        Arc::new(MockTradeExecutor::succeeding(rust_decimal::Decimal::ZERO))
    } else {
        Arc::new(ExecutorClient::new(&config))
    };

    let ledger: Arc<dyn TradeLedger> = if config.dry_run {
        Arc::new(InMemoryLedger::new())
    } else {
        Arc::new(LedgerClient::new(&config))
    };

    // Build the swarm
    let mut coordinator = SwarmCoordinator::new(
        config.shared_board_capacity,
        oracle.clone(),
        executor,
        ledger,
        config.call_timeout_ms,
    );

    for i in 0..config.agent_count {
        coordinator.register_agent(Arc::new(Agent::new(
            format!("agent-{}", i),
            registry.clone(),
            config.initial_risk_params(),
        )));
    }

    let coordinator = Arc::new(coordinator);
    app_state.set_ready(true);

    info!("========================================");
    info!("CHAINSWARM STARTED");
    info!("========================================");
    info!("Chains: {}", registry.len());
    info!("Agents: {}", config.agent_count);
    info!(
        "Mode: {}",
        if config.dry_run { "SIMULATION" } else { "LIVE TRADING" }
    );
    info!("========================================");

    // Main swarm loop
    let mut cycle = 0u64;

    loop {
        cycle += 1;

        // Scan with the swarm's current appetite (agents adapt together,
        // so the first agent's thresholds are representative).
        let scan_risk = coordinator.agents()[0].risk_params();

        match find_opportunities(
            &registry,
            oracle.as_ref(),
            oracle.as_ref(),
            &scan_risk,
            config.call_timeout_ms,
        )
        .await
        {
            Ok(opportunities) => {
                for opportunity in opportunities {
                    coordinator.share_opportunity(opportunity).await;
                }
            }
            Err(e) => {
                warn!("Scan cycle {} failed: {}", cycle, e);
            }
        }

        // Assign the current best opportunity, if any.
        if let Some(best) = coordinator.take_best_opportunity().await {
            match coordinator.coordinate_trade(&best).await {
                Ok(Some(assignment)) => match assignment.stage {
                    OpportunityStage::ExecutedSuccess => {
                        info!(
                            "[Cycle #{}] Trade succeeded: agent={} profit={:?}",
                            cycle, assignment.agent_id, assignment.profit
                        );
                    }
                    OpportunityStage::ExecutedFailed => {
                        warn!(
                            "[Cycle #{}] Trade failed: agent={}",
                            cycle, assignment.agent_id
                        );
                    }
                    OpportunityStage::Stale => {
                        info!(
                            "[Cycle #{}] Opportunity stale at execution: agent={}",
                            cycle, assignment.agent_id
                        );
                    }
                    _ => {}
                },
                Ok(None) => {
                    info!("[Cycle #{}] Opportunity dropped: no viable agent", cycle);
                }
                Err(e) => {
                    warn!("[Cycle #{}] Coordination error: {}", cycle, e);
                }
            }
        }

        // Adaptive risk control on a fixed cadence.
        if cycle % config.risk_update_cycles == 0 {
            let adjustment = coordinator.update_risk_params().await;
            info!("[Cycle #{}] Risk control: {}", cycle, adjustment);
        }

        // Publish stats for the ops surface.
        let stats = coordinator.stats().await;
        *app_state.stats.write().await = stats;

        tokio::time::sleep(Duration::from_millis(config.scan_interval_ms)).await;
    }
}
