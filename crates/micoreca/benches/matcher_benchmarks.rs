//! Match engine benchmarks.
//!
//! Measures cascade throughput for batches that stop at each level.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use micoreca::record::Tool;
use micoreca::{Collection, CurationStatus, KeywordConfig, KeywordRuleSet, MatchEngine, Record, RecordKind};

fn create_engine() -> MatchEngine {
    let config = KeywordConfig::new()
        .with_topics(["Metagenomics", "Microbial ecology", "Microbiology"])
        .with_operations(["Taxonomic classification", "Sequence assembly"])
        .with_keywords(["microbio.*", "metage.*", "MAGS", "amplicon", "16S", "shotgun"])
        .with_acronyms(["OTU", "ASV", "MAG", "ITS"]);
    MatchEngine::new(KeywordRuleSet::compile(&config).unwrap())
}

/// Generate tool records; one in four matches at each level, the rest miss.
fn generate_tools(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let tool = Tool::new(format!("tool_{:06}", i))
                .with_biocontainers_description("Aligns reads against a reference genome");
            let tool = match i % 4 {
                0 => tool.with_topics(["Genomics", "Metagenomics"]),
                1 => tool.with_keywords(["alignment", "Amplicon sequencing"]),
                2 => tool.with_galaxy_description("Builds an OTU table from clustered reads."),
                _ => tool.with_biotools_description("Sorts and indexes BAM files quickly"),
            };
            Record::from(tool)
        })
        .collect()
}

fn bench_find_match(c: &mut Criterion) {
    let engine = create_engine();
    let records = generate_tools(4);
    let mut group = c.benchmark_group("find_match");

    for (label, record) in ["vocabulary", "keywords", "free_text", "no_match"].iter().zip(&records) {
        group.bench_with_input(BenchmarkId::new("level", label), record, |b, record| {
            b.iter(|| black_box(engine.find_match(record)))
        });
    }

    group.finish();
}

fn bench_filter_batch(c: &mut Criterion) {
    let engine = create_engine();
    let status = CurationStatus::new();
    let mut group = c.benchmark_group("filter_batch");

    for count in [100, 1_000, 10_000].iter() {
        let records = generate_tools(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("records", count), &records, |b, records| {
            b.iter_with_setup(
                || Collection::from_records(RecordKind::Tool, records.clone()),
                |collection| black_box(collection.filter(&engine, &status)),
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find_match, bench_filter_batch);
criterion_main!(benches);
