//! Benchmarks for the stream rewriter.
//!
//! Measures bytes-per-second through the driver loop for commit-heavy and
//! blob-heavy exports, and how the blob chunk size affects copying.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fast_rewriter::stream::{BugPatterns, LineEnding, Rewriter, RewriterOptions};
use std::io;

/// Generates a synthetic fast-export stream.
///
/// # Arguments
///
/// * `num_commits` - Number of commits to generate
/// * `blob_size` - Size of the inline blob attached to each commit
/// * `bug_rate` - Fraction of commits carrying `property bugs` metadata
fn generate_stream(num_commits: usize, blob_size: usize, bug_rate: f64) -> Vec<u8> {
    let mut stream = Vec::with_capacity(num_commits * (blob_size + 256));
    let blob = vec![b'x'; blob_size];
    let with_bugs = (num_commits as f64 * bug_rate) as usize;

    for i in 0..num_commits {
        let message = format!("Commit {} fixes bug {}\n", i, i * 3);
        stream.extend_from_slice(
            format!(
                "commit refs/heads/master\nmark :{}\ncommitter Dev <dev@example.org> {} +0000\ndata {}\n{}\n",
                i + 1,
                1_300_000_000 + i,
                message.len(),
                message
            )
            .as_bytes(),
        );

        if i < with_bugs {
            let bugs = format!(
                "https://bugzilla.mozilla.org/show_bug.cgi?id={} fixed\nhttps://bugzilla.mozilla.org/show_bug.cgi?id={} fixed",
                i * 3,
                i * 3 + 1
            );
            stream.extend_from_slice(format!("property bugs {} {}\n", bugs.len(), bugs).as_bytes());
        }
        if i > 0 {
            stream.extend_from_slice(format!("from :{}\n", i).as_bytes());
        }

        stream.extend_from_slice(format!("M 100644 inline src/file{}.txt\n", i % 50).as_bytes());
        stream.extend_from_slice(format!("data {}\n", blob.len()).as_bytes());
        stream.extend_from_slice(&blob);
        stream.extend_from_slice(b"\n");
    }

    stream
}

fn rewrite(input: &[u8], chunk_size: usize) {
    let options = RewriterOptions {
        chunk_size,
        line_ending: LineEnding::Lf,
        strict_data: false,
    };
    Rewriter::new(options, BugPatterns::default())
        .run(input, io::sink(), io::sink())
        .unwrap();
}

/// Benchmark the full rewrite over differently shaped exports.
fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");

    // Scenarios: (name, num_commits, blob_size, bug_rate)
    let scenarios = [
        // Mostly metadata, tiny files
        ("commits_small_blobs", 2_000, 64, 0.5),
        ("commits_no_bugs", 2_000, 64, 0.0),
        ("commits_all_bugs", 2_000, 64, 1.0),
        // Mostly blob copying
        ("large_blobs", 100, 256 * 1024, 0.5),
    ];

    for (name, num_commits, blob_size, bug_rate) in scenarios {
        let input = generate_stream(num_commits, blob_size, bug_rate);
        group.throughput(Throughput::Bytes(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("default_chunk", name), &input, |b, input| {
            b.iter(|| rewrite(input, fast_rewriter::stream::DEFAULT_CHUNK_SIZE));
        });
    }

    group.finish();
}

/// Benchmark how the blob chunk size affects copying throughput.
fn bench_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_size");
    group.sample_size(20);

    let input = generate_stream(50, 1024 * 1024, 0.0);
    group.throughput(Throughput::Bytes(input.len() as u64));

    for chunk_size in [64, 1024, 8 * 1024, 64 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &input,
            |b, input| {
                b.iter(|| rewrite(input, chunk_size));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite, bench_chunk_size);
criterion_main!(benches);
