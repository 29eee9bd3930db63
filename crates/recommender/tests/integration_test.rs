//! End-to-end tests: load triples, train, recommend, evaluate.

use recommender::{evaluate, precision_from_file, recommend};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Two taste clusters: items {0, 1, 2} and items {3, 4, 5}.
/// Every user has seen two items of one cluster; the third is held out.
fn create_test_files() -> (NamedTempFile, NamedTempFile, NamedTempFile) {
    let mut train = String::new();
    let mut test = String::new();
    let clusters = [[0usize, 1, 2], [3, 4, 5]];
    let mut user = 0;
    for cluster in &clusters {
        for held_out in 0..3 {
            for _ in 0..2 {
                for (pos, &item) in cluster.iter().enumerate() {
                    if pos == held_out {
                        test.push_str(&format!("{}\t{}\t1\n", user, item));
                    } else {
                        train.push_str(&format!("{}\t{}\t1\n", user, item));
                    }
                }
                user += 1;
            }
        }
    }
    // Side information echoes cluster membership for a few users
    let side = "0\t2\t1\n6\t5\t1\n7\t3\t1\n";
    (write_file(&train), write_file(side), write_file(&test))
}

#[test]
fn test_full_pipeline_recovers_held_out_items() {
    let (train, side, test) = create_test_files();

    let (a, b) = data_loader::load_with_side_information(train.path(), side.path()).unwrap();
    assert_eq!(a.shape(), (12, 6));

    let w = slim::train(&a, &b, 0.001, 0.0001).unwrap();
    let recommendations = recommend(&a, &w, 1).unwrap();
    assert_eq!(recommendations.len(), 12);

    // Cross-cluster weights are never learned, so each user's single
    // recommendation is the held-out item of their own cluster.
    let p = precision_from_file(&recommendations, test.path()).unwrap();
    assert!((p - 1.0).abs() < 1e-12, "precision was {}", p);
}

#[test]
fn test_recommendations_never_repeat_training_items() {
    let (train, side, _test) = create_test_files();
    let (a, b) = data_loader::load_with_side_information(train.path(), side.path()).unwrap();
    let w = slim::train(&a, &b, 0.001, 0.0001).unwrap();
    let recommendations = recommend(&a, &w, 6).unwrap();

    for recs in recommendations.users() {
        for item in recs.item_ids() {
            assert!(a.get(recs.user, item).is_none());
        }
        assert!(recs.items.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }
}

#[test]
fn test_evaluate_reports_counts() {
    let (train, side, test) = create_test_files();
    let (a, b) = data_loader::load_with_side_information(train.path(), side.path()).unwrap();
    let w = slim::train(&a, &b, 0.001, 0.0001).unwrap();
    let recommendations = recommend(&a, &w, 2).unwrap();

    let test = data_loader::load(test.path(), None, None).unwrap();
    let report = evaluate(&recommendations, &test);
    assert_eq!(report.users_evaluated, 12);
    assert_eq!(report.hits, 12);
    assert!((report.precision - 0.5).abs() < 1e-12);
}

#[test]
fn test_missing_test_file() {
    let (train, side, _test) = create_test_files();
    let (a, b) = data_loader::load_with_side_information(train.path(), side.path()).unwrap();
    let w = slim::train(&a, &b, 0.001, 0.0001).unwrap();
    let recommendations = recommend(&a, &w, 1).unwrap();
    assert!(precision_from_file(&recommendations, std::path::Path::new("missing.tsv")).is_err());
}
