//! Run statistics and summary output.

use dispatcher::MetricsSnapshot;
use ingestion::ProcessingReport;

/// Statistics from one processing run
#[derive(Debug, Default)]
pub struct RunStats {
    /// File-level outcome
    pub report: ProcessingReport,

    /// Dispatcher counters
    pub dispatch: MetricsSnapshot,
}

impl RunStats {
    /// Share of discovered files that were processed, as percentage
    pub fn success_rate(&self) -> f64 {
        if self.report.discovered > 0 {
            (self.report.succeeded as f64 / self.report.discovered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let report = &self.report;
        let dispatch = &self.dispatch;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Run Statistics                         ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Files");
        println!("   ├─ Duration: {:.2}s", report.elapsed.as_secs_f64());
        println!("   ├─ Discovered: {}", report.discovered);
        println!("   ├─ Processed: {} ({:.1}%)", report.succeeded, self.success_rate());
        println!("   ├─ Failed: {}", report.failed);
        println!("   ├─ Invalid: {}", report.invalid);
        println!("   ├─ Unreadable: {}", report.skipped);
        println!("   └─ Per-file time (ms): {}", report.durations.summary());

        println!("\n📈 Dispatch");
        println!(
            "   ├─ Preload: {} keys in {} batches ({} failed), {} cached",
            report.preload.requested,
            report.preload.chunks,
            report.preload.failed_chunks,
            report.preload.cached
        );
        println!("   ├─ Cache hits: {}", dispatch.cache_hits);
        println!("   ├─ Cache misses: {}", dispatch.cache_misses);
        match dispatch.cache_hit_ratio() {
            Some(ratio) => println!("   ├─ Hit ratio: {:.1}%", ratio * 100.0),
            None => println!("   ├─ Hit ratio: N/A"),
        }
        println!("   ├─ Tasks acknowledged: {}", dispatch.dispatched);
        println!("   └─ Tasks failed: {}", dispatch.failed);

        if !report.failures.is_empty() {
            println!("\n⚠️  Failed Files");
            for failure in &report.failures {
                println!("   ├─ {}: {}", failure.path.display(), failure.reason);
            }
        }

        println!();
    }
}
