use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TRAIN_CSV: &str = "label,p0,p1,p2,p3
0,255,0,255,0
1,0,255,0,255
0,250,10,240,5
1,5,245,15,250
";

const TEST_CSV: &str = "label,p0,p1,p2,p3
0,0,255,128,64
1,10,240,20,230
";

fn write_run_files(dir: &TempDir, test_labeled: bool, test_csv: &str) -> String {
    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    fs::write(&train_path, TRAIN_CSV).expect("failed to write train csv");
    fs::write(&test_path, test_csv).expect("failed to write test csv");

    let config = serde_json::json!({
        "train_path": train_path.to_str().unwrap(),
        "test_path": test_path.to_str().unwrap(),
        "test_labeled": test_labeled,
        "num_classes": 2,
        "hidden_layers": [3],
        "learning_rate": 0.5,
        "epochs": 5,
        "batch_size": 2,
        "seed": 7,
        "predictions_path": dir.path().join("results.csv").to_str().unwrap(),
        "preview_path": dir.path().join("first.pgm").to_str().unwrap(),
        "image_width": 2,
        "image_height": 2
    });
    let config_path = dir.path().join("run.json");
    fs::write(&config_path, config.to_string()).expect("failed to write config");
    config_path.to_str().unwrap().to_string()
}

fn assert_predictions_file(path: &Path, rows: usize) {
    let contents = fs::read_to_string(path).expect("predictions not written");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("ImageId,Label"));
    for expected_id in 1..=rows {
        let line = lines.next().expect("missing prediction row");
        let (id, label) = line.split_once(',').expect("malformed prediction row");
        assert_eq!(id, expected_id.to_string());
        assert!(label == "0" || label == "1", "label {}", label);
    }
    assert_eq!(lines.next(), None);
}

#[allow(dead_code)]
mod mnist_csv_bin {
    include!("../mnist_csv.rs");

    #[cfg(test)]
    mod coverage_tests {
        use super::*;
        use dense_mlp::NetworkError;
        use std::fs;
        use tempfile::tempdir;

        #[test]
        fn test_run_labeled_test_set() {
            let dir = tempdir().expect("failed to create temp dir");
            let config_path = crate::write_run_files(&dir, true, crate::TEST_CSV);

            run(&config_path).expect("pipeline failed");

            crate::assert_predictions_file(&dir.path().join("results.csv"), 2);

            // Preview is the first test image with the 0..255 scale restored.
            let preview = fs::read_to_string(dir.path().join("first.pgm")).unwrap();
            assert_eq!(preview, "P2\n2 2\n255\n0 255\n128 64\n");
        }

        #[test]
        fn test_run_unlabeled_test_set() {
            let dir = tempdir().expect("failed to create temp dir");
            let test_csv = "p0,p1,p2,p3\n255,0,255,0\n0,255,0,255\n3,3,3,3\n";
            let config_path = crate::write_run_files(&dir, false, test_csv);

            run(&config_path).expect("pipeline failed");

            crate::assert_predictions_file(&dir.path().join("results.csv"), 3);
            let preview = fs::read_to_string(dir.path().join("first.pgm")).unwrap();
            assert!(preview.starts_with("P2\n2 2\n255\n255 0\n"), "{}", preview);
        }

        #[test]
        fn test_build_network_topology() {
            let dir = tempdir().expect("failed to create temp dir");
            let config_path = crate::write_run_files(&dir, true, crate::TEST_CSV);
            let config = load_config(&config_path).unwrap();

            let network = build_network(&config, 4).unwrap();
            assert_eq!(network.layer_count(), 2);
            assert_eq!(network.input_size(), 4);
            assert_eq!(network.output_size(), 2);
            assert_eq!(network.learning_rate(), 0.5);
        }

        #[test]
        fn test_run_reports_missing_training_file() {
            let dir = tempdir().expect("failed to create temp dir");
            let config_path = crate::write_run_files(&dir, true, crate::TEST_CSV);
            fs::remove_file(dir.path().join("train.csv")).unwrap();

            assert!(matches!(
                run(&config_path),
                Err(NetworkError::FileError { .. })
            ));
            assert!(!dir.path().join("results.csv").exists());
        }
    }
}
