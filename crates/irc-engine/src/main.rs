//! `irc-console`: drive the war-room engines from a terminal

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use irc_catalog::{AlertCatalog, IncidentAlert, StrategyDetails};
use irc_engine::{
    EngineConfig, ExecutionEvent, IncidentDetailController, ImpactMetrics, Notice,
    SimulationResult, WarRoomPhase,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    let pick = Arg::new("pick")
        .long("pick")
        .value_delimiter(',')
        .value_parser(value_parser!(usize))
        .action(ArgAction::Append)
        .help("1-based recommendation numbers to select (default: war-room candidates)");
    let alert = Arg::new("alert")
        .required(true)
        .value_name("ALERT_ID")
        .help("Incident id, e.g. INC-2024-001");

    Command::new("irc-console")
        .version(irc_engine::VERSION)
        .about("Incident war-room console")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("TOML")
                .help("Engine configuration file"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .value_name("JSON|YAML")
                .help("Alert catalog file (default: builtin)"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .global(true)
                .value_parser(value_parser!(f64))
                .help("Run simulated delays this many times faster"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("alerts").about("Dashboard summary and alert list"))
        .subcommand(
            Command::new("show")
                .about("Alert overview and recommendations")
                .arg(alert.clone()),
        )
        .subcommand(
            Command::new("strategy")
                .about("Strategy deep dive")
                .arg(Arg::new("text").required(true).value_name("TEXT")),
        )
        .subcommand(
            Command::new("simulate")
                .about("Simulate selected strategies")
                .arg(alert.clone())
                .arg(pick.clone()),
        )
        .subcommand(
            Command::new("drill")
                .about("Full war-room drill: assemble, simulate, execute")
                .arg(alert)
                .arg(pick),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> Result<EngineConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => EngineConfig::default(),
    };
    if let Some(&speed) = matches.get_one::<f64>("speed") {
        if !speed.is_finite() || speed <= 0.0 {
            bail!("--speed must be positive, got {speed}");
        }
        config = config.with_time_scale(1.0 / speed);
    }
    config.validate()?;
    Ok(config)
}

fn load_catalog(matches: &ArgMatches) -> Result<Arc<AlertCatalog>> {
    let catalog = match matches.get_one::<String>("catalog") {
        Some(path) => AlertCatalog::load(path).with_context(|| format!("loading catalog {path}"))?,
        None => AlertCatalog::builtin().context("builtin catalog")?,
    };
    Ok(Arc::new(catalog))
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let catalog = load_catalog(matches)?;

    match matches.subcommand() {
        Some(("alerts", _)) => {
            print_alerts(&catalog);
            Ok(())
        }
        Some(("show", args)) => {
            let id = required(args, "alert")?;
            print_alert(&catalog, catalog.get(id)?);
            Ok(())
        }
        Some(("strategy", args)) => {
            let text = required(args, "text")?;
            match catalog.strategies().id_for(text) {
                Some(id) => println!("[{id}]"),
                None => println!("[no table entry; default details]"),
            }
            print_strategy(&catalog.strategy_details(text));
            Ok(())
        }
        Some(("simulate", args)) => {
            let ctrl = controller(&catalog, config, args)?;
            select_strategies(&ctrl, args)?;
            let result = ctrl.simulate().await;
            drain_notices(&ctrl);
            if let Some(result) = result? {
                print_simulation(&result);
            }
            Ok(())
        }
        Some(("drill", args)) => drill(controller(&catalog, config, args)?, args).await,
        _ => bail!("unknown command"),
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}>"))
}

fn controller(
    catalog: &Arc<AlertCatalog>,
    config: EngineConfig,
    args: &ArgMatches,
) -> Result<IncidentDetailController> {
    let id = required(args, "alert")?;
    Ok(IncidentDetailController::new(Arc::clone(catalog), config, id)?)
}

fn select_strategies(ctrl: &IncidentDetailController, args: &ArgMatches) -> Result<()> {
    let alert = ctrl.alert();
    let recommendations = alert.recommendations();
    let picked: Vec<String> = match args.get_many::<usize>("pick") {
        Some(picks) => picks
            .map(|&n| {
                n.checked_sub(1)
                    .and_then(|idx| recommendations.get(idx))
                    .cloned()
                    .with_context(|| {
                        format!("--pick {n} out of range 1..={}", recommendations.len())
                    })
            })
            .collect::<Result<_>>()?,
        None => ctrl.war_room_candidates(),
    };
    for text in &picked {
        if !ctrl.selected_strategies().contains(text) {
            ctrl.toggle_strategy(text)?;
        }
    }
    Ok(())
}

async fn drill(ctrl: IncidentDetailController, args: &ArgMatches) -> Result<()> {
    println!("War room: {}", ctrl.alert().title);
    ctrl.initiate_war_room()?;
    ctrl.assemble_bridge()?;
    ctrl.war_room().wait_for_phase(WarRoomPhase::Active).await;
    let bridge = ctrl.war_room().snapshot();
    println!("Bridge assembled: {} participants joined", bridge.joined_count());

    select_strategies(&ctrl, args)?;
    let simulated = ctrl.simulate().await;
    drain_notices(&ctrl);
    if let Some(result) = simulated? {
        print_simulation(&result);
    }

    let bridge = ctrl.war_room().snapshot();
    ctrl.end_war_room()?;
    drain_notices(&ctrl);

    let mut events = ctrl.execution().subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::TaskStarted { description, .. } => println!("  -> {description}"),
                ExecutionEvent::Finished { .. } => break,
                _ => {}
            }
        }
    });
    let executed = ctrl.execute_strategies().await;
    if let Err(err) = printer.await {
        tracing::warn!(%err, "progress printer task failed");
    }
    drain_notices(&ctrl);
    if let Some(metrics) = executed? {
        print_metrics(&metrics);
    }

    println!("\nWar room log ({}s live):", bridge.assembly_time);
    for entry in &bridge.log {
        println!("  {} {}", entry.time_label(), entry.message);
    }
    Ok(())
}

fn drain_notices(ctrl: &IncidentDetailController) {
    for notice in ctrl.take_notices() {
        print_notice(&notice);
    }
}

fn print_notice(notice: &Notice) {
    println!("{notice}");
}

fn print_alerts(catalog: &AlertCatalog) {
    let summary = catalog.summary();
    println!(
        "{} alerts, {} critical, {} active\n",
        summary.total, summary.critical, summary.active
    );
    for alert in catalog {
        println!(
            "{:<14} {:<9} {:<14} {}  ({})",
            alert.id,
            alert.severity.label(),
            alert.phase.label(),
            alert.title,
            alert.impact_headline()
        );
    }
}

fn print_alert(catalog: &AlertCatalog, alert: &IncidentAlert) {
    println!("{}  [{}]", alert.title, alert.severity.label());
    println!("  id:       {}", alert.id);
    println!("  detected: {}", alert.timestamp.to_rfc3339());
    println!("  source:   {}", alert.source);
    println!("  region:   {}", alert.region);
    println!("  phase:    {}", alert.phase.label());
    println!("  impact:   {}", alert.business_impact);
    println!("  sla:      {}", alert.sla_risk);
    println!("  systems:  {}", alert.affected_systems.join(", "));
    if let Some(regions) = &alert.details.regional_data {
        println!("\nRegions:");
        for region in regions {
            println!(
                "  {:<28} load {:>3}%  {:>14}/h  latency {:.1}x{}",
                region.region,
                region.current_traffic_load,
                region.revenue_per_hour,
                region.latency_factor(),
                if region.is_currently_peak { "  PEAK" } else { "" }
            );
        }
    }
    println!("\nRecommendations:");
    for (idx, text) in alert.recommendations().iter().enumerate() {
        let details = catalog.strategy_details(text);
        println!("  {}. [{:>5.1}%] {}", idx + 1, details.confidence, text);
    }
}

fn print_strategy(details: &StrategyDetails) {
    println!("{} ({:.1}% confidence)\n", details.title, details.confidence);
    println!("{}\n", details.how_it_works);
    for (idx, step) in details.resolution_path.iter().enumerate() {
        println!("  {}. {step}", idx + 1);
    }
    println!("\nImpact:     {}", details.estimated_impact);
    println!("Mitigation: {}", details.risk_mitigation);
}

fn print_simulation(result: &SimulationResult) {
    println!("\nSimulation {}", result.run_id);
    println!("  success probability: {:.2}%", result.success_probability);
    println!("  estimated time:      {}", result.estimated_time);
    println!("  recovery rate:       {}", result.recovery_rate);
    println!("  risk:                {}", result.risk_level);
    for outcome in &result.strategies {
        println!("  - {} ({:.1}%): {}", outcome.title, outcome.confidence, outcome.estimated_impact);
    }
}

fn print_metrics(metrics: &ImpactMetrics) {
    println!("\nImpact");
    println!("  service restoration:     {}%", metrics.service_restoration);
    println!("  transactions recovered:  {}", metrics.transactions_recovered);
    println!("  revenue protected:       {}", metrics.revenue_protected);
    println!("  SLA compliance:          {}%", metrics.sla_compliance);
    println!("  MTTR:                    {}", metrics.mttr);
    println!("  affected users resolved: {}%", metrics.affected_users_resolved);
    let comparison = metrics.comparison();
    println!(
        "\n  automated: {} resolution, {} decision, {} touchpoints",
        comparison.automated.resolution_time,
        comparison.automated.decision_time,
        comparison.automated.human_touchpoints
    );
    println!(
        "  manual:    {} resolution, {} decision, {} touchpoints",
        comparison.manual.resolution_time,
        comparison.manual.decision_time,
        comparison.manual.human_touchpoints
    );
    println!("  {}", comparison.headline);
}
