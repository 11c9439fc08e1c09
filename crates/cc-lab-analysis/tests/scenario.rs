//! End-to-end aggregation scenario: a 2×2 matrix where only one pair
//! produced a metrics artifact.

use cc_lab_analysis::aggregate::AggregateDataset;
use cc_lab_analysis::summary::{comparison_records, rtt_summaries};
use cc_lab_abstract::{Catalog, ExperimentLayout, LayoutOverride, Profile};
use std::fs;
use std::path::PathBuf;

fn catalog() -> Catalog {
    Catalog {
        profiles: vec![
            Profile {
                id: "P1".to_string(),
                name: "Profile One".to_string(),
                latency_ms: 5,
                downlink_trace: PathBuf::from("p1.down"),
                uplink_trace: PathBuf::from("p1.up"),
            },
            Profile {
                id: "P2".to_string(),
                name: "Profile Two".to_string(),
                latency_ms: 200,
                downlink_trace: PathBuf::from("p2.down"),
                uplink_trace: PathBuf::from("p2.up"),
            },
        ],
        schemes: vec!["A".to_string(), "B".to_string()],
    }
}

#[test]
fn single_surviving_pair_dominates_the_dataset_and_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let mut layout = ExperimentLayout::default();
    LayoutOverride::rooted(dir.path()).apply_to(&mut layout);

    let path = layout.run_metrics_path("P1", "A");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "timestamp,throughput,rtt,loss_rate,queuing_delay\n\
         0,4,150,0.01,10\n\
         1,5,160,0.01,11\n\
         2,6,170,0.01,12\n",
    )
    .unwrap();

    let catalog = catalog();
    let dataset = AggregateDataset::collect(&catalog, &layout);

    assert_eq!(dataset.len(), 3);
    for row in dataset.rows() {
        assert_eq!(row.profile_id, "P1");
        assert_eq!(row.scheme, "A");
        assert_eq!(row.latency_ms, 5);
        assert!(catalog.contains(&row.profile_id, &row.scheme));
    }
    let indices: Vec<usize> = dataset.rows().iter().map(|r| r.sequence_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    let comparisons = comparison_records(&catalog, &dataset);
    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0].profile_id, "P1");
    assert_eq!(comparisons[0].scheme, "A");
    assert!((comparisons[0].mean_throughput_mbps - 5.0).abs() < 1e-9);

    let summaries = rtt_summaries(&catalog, &dataset);
    assert_eq!(summaries.len(), 1);
    assert!((summaries[0].mean_ms - 160.0).abs() < 1e-9);
}
