use helixprobe::{AppConfig, CapacityProbe, ConfigManager, WorkerKind};
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let target_depth = args.get(1).and_then(|s| s.parse().ok());
    let kind: WorkerKind = args
        .get(2)
        .map(|s| s.parse())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(WorkerKind::Task);

    let config: AppConfig = match args.get(3) {
        Some(path) => {
            let manager = ConfigManager::new();
            manager.load_from_file(path)?;
            manager.get()
        }
        None => AppConfig::default(),
    };

    let target_depth = target_depth.unwrap_or(config.workload.target_depth);

    println!("Configuration:");
    println!("  Target depth: {}", target_depth);
    println!("  Worker kind: {}", kind);
    println!("  Worker budget: {}", match kind {
        WorkerKind::Thread => config.probe.thread_budget,
        WorkerKind::Task => config.probe.task_budget,
    });
    println!("  Carrier threads: {}", config.probe.carrier_threads);
    println!();

    let probe = CapacityProbe::new(config)?;
    let report = probe.run(target_depth, kind)?;

    println!("{}", report);
    println!("{}", report.to_json()?);

    Ok(())
}
