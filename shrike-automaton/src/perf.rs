// Quick release mode performance comparison
//
// Run with: cargo test --release -p shrike-automaton scan_perf -- --ignored

#[cfg(test)]
mod perf_tests {
    use crate::{AutomatonBuilder, Scanner};
    use std::time::Instant;

    #[test]
    #[ignore] // Run with: cargo test --release scan_perf -- --ignored
    fn scan_perf() {
        let automaton = AutomatonBuilder::new()
            .add_patterns((0..100).map(|i| format!("signature_{}", i)))
            .build();
        let scanner = Scanner::new(&automaton);

        let payload: Vec<u8> = b"GET /login?user=admin&signature_42=1 HTTP/1.1\r\n"
            .iter()
            .copied()
            .cycle()
            .take(4096)
            .collect();

        // Warmup
        for _ in 0..1000 {
            let _ = scanner.has_match(&payload);
        }

        // Benchmark
        let iterations = 100_000;
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = scanner.has_match(&payload);
        }
        let duration = start.elapsed();
        let ns_per_op = duration.as_nanos() / iterations;

        println!("\n=== Release Mode Scanner Performance ===");
        println!("Iterations: {}", iterations);
        println!("Payload: {} bytes", payload.len());
        println!("Total time: {:?}", duration);
        println!("Per scan: {} ns", ns_per_op);
        println!(
            "Throughput: {:.2} MB/sec",
            (iterations as f64 * payload.len() as f64 / duration.as_secs_f64()) / 1_000_000.0
        );

        // Assertion for minimum performance
        assert!(
            ns_per_op < 2_000_000,
            "scanner should stay fast in release mode, got {} ns/op",
            ns_per_op
        );
    }
}
