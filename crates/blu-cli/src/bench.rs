use std::cmp::Ordering;
use std::time::Instant;

use blu_core::{Classifier, Preferences};

const REALISTIC_MIX: &[&str] = &[
    "https://discord.com/api/v9/science",
    "https://discord.com/api/v9/channels/1021/messages?limit=50",
    "https://discord.com/api/v9/users/@me/billing/payment-sources",
    "https://discord.com/api/v9/sticker-packs?locale=en-US",
    "https://discord.com/api/v9/channels/1021/typing",
    "https://discord.com/api/v9/users/@me/affinities/guilds",
    "https://sentry.io/api/146/envelope/",
    "https://discord.com/api/v9/store/published-listings/skus",
    "https://media.discordapp.net/external/abc/https/example.com/og.png",
    "https://cdn.discordapp.com/avatars/1/2.webp?size=80",
];

pub struct BenchResult {
    pub iterations: usize,
    pub blocked: usize,
    pub avg_us: f64,
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub ops_per_sec: u64,
}

pub fn run(classifier: &Classifier, prefs: &Preferences, iterations: usize) -> BenchResult {
    // warmup
    for url in REALISTIC_MIX {
        let _ = classifier.classify(Some(url), prefs);
    }

    let mut latencies = Vec::with_capacity(iterations * REALISTIC_MIX.len());
    let mut blocked = 0usize;

    for _ in 0..iterations {
        for url in REALISTIC_MIX {
            let start = Instant::now();
            let result = classifier.classify(Some(url), prefs);
            latencies.push(start.elapsed().as_secs_f64() * 1_000_000.0);
            if result.is_some() {
                blocked += 1;
            }
        }
    }

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let total_us: f64 = latencies.iter().sum();
    let ops = latencies.len();

    BenchResult {
        iterations: ops,
        blocked,
        avg_us: if ops == 0 { 0.0 } else { total_us / ops as f64 },
        p50_us: percentile(&latencies, 0.50),
        p95_us: percentile(&latencies, 0.95),
        p99_us: percentile(&latencies, 0.99),
        ops_per_sec: if total_us > 0.0 { (ops as f64 / (total_us / 1_000_000.0)) as u64 } else { 0 },
    }
}

pub fn format_result(result: &BenchResult) -> String {
    format!(
        "classify:\n  Operations:  {}\n  Blocked:     {}\n  Avg latency: {:.3}μs\n  P50 latency: {:.3}μs\n  P95 latency: {:.3}μs\n  P99 latency: {:.3}μs\n  Throughput:  {} ops/sec",
        result.iterations,
        result.blocked,
        result.avg_us,
        result.p50_us,
        result.p95_us,
        result.p99_us,
        result.ops_per_sec,
    )
}

fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let idx = ((values.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(values.len() - 1);
    values[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(percentile(&values, 0.50), 50.0);
        assert_eq!(percentile(&values, 0.99), 99.0);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_run_counts_operations() {
        let result = run(&Classifier::default(), &Preferences::default(), 3);
        assert_eq!(result.iterations, 3 * REALISTIC_MIX.len());
        assert!(result.blocked > 0);
    }
}
