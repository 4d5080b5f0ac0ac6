use helixprobe::config::{ProbeConfig, WarmupConfig};
use helixprobe::engines::probe::warmup;

fn test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .unwrap()
}

#[test]
fn repeated_warmups_complete_without_panicking() {
    let runtime = test_runtime();
    let probe = ProbeConfig {
        stack_bytes: 4 * 1024 * 1024,
        ..ProbeConfig::default()
    };
    let warmup_cfg = WarmupConfig { levels: 3 };

    for _ in 0..3 {
        warmup::run(runtime.handle(), &probe, &warmup_cfg, Some(11));
    }
}

#[test]
fn warmup_contains_stack_exhaustion_in_individual_trials() {
    let runtime = test_runtime();
    // A stack below the red zone makes every heavyweight trial fail with
    // StackExhausted; warmup must log and proceed, not propagate.
    let probe = ProbeConfig {
        stack_bytes: 128 * 1024,
        ..ProbeConfig::default()
    };
    let warmup_cfg = WarmupConfig { levels: 2 };

    warmup::run(runtime.handle(), &probe, &warmup_cfg, None);
}
