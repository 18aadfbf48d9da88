use std::fs;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use mnist_mlp::config::NetworkConfig;
use mnist_mlp::csv_data::MnistCsv;
use mnist_mlp::network::Network;
use mnist_mlp::Error;

const SMALL: &str = "1,0,255,51\n0,102,0,255\n2,255,255,0\n";

fn load_str(data: &str, samples: usize) -> mnist_mlp::Result<MnistCsv> {
    let mut reader = MnistCsv::reader(data.as_bytes());
    MnistCsv::from_reader(&mut reader, samples, 3, 3)
}

#[test]
fn test_reads_samples_as_columns() {
    let data = load_str(SMALL, 3).unwrap();

    assert_eq!(data.inputs.dims(), (3, 3));
    assert_eq!(data.targets.dims(), (3, 3));

    // column 0 is the first record
    assert_eq!(data.inputs.at(0, 0), 0.0);
    assert_eq!(data.inputs.at(1, 0), 1.0);
    assert_eq!(data.inputs.at(2, 0), (51.0f64 / 255.0) as f32);
    assert_eq!(data.inputs.at(0, 1), (102.0f64 / 255.0) as f32);
    assert_eq!(data.inputs.at(2, 2), 0.0);

    let targets = data.targets.values();
    assert_eq!(targets, &[
        0.0, 1.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 0.0, 1.0,
    ]);
}

#[test]
fn test_each_target_column_is_one_hot() {
    let data = load_str(SMALL, 3).unwrap();
    for c in 0..3 {
        let column: Vec<f32> = (0..3).map(|r| data.targets.at(r, c)).collect();
        assert_eq!(column.iter().sum::<f32>(), 1.0);
        assert_eq!(column.iter().filter(|&&x| x == 1.0).count(), 1);
    }
}

#[test]
fn test_tolerates_spaces_and_blank_lines() {
    let data = load_str(" 1, 0 ,255,51\n\n0,102,0,255\r\n", 2).unwrap();
    assert_eq!(data.targets.at(1, 0), 1.0);
    assert_eq!(data.inputs.at(1, 0), 1.0);
    assert_eq!(data.targets.at(0, 1), 1.0);
}

#[test]
fn test_consecutive_datasets_share_one_stream() {
    let mut reader = MnistCsv::reader(SMALL.as_bytes());
    let train = MnistCsv::from_reader(&mut reader, 2, 3, 3).unwrap();
    let test = MnistCsv::from_reader(&mut reader, 1, 3, 3).unwrap();

    assert_eq!(train.inputs.dims(), (3, 2));
    assert_eq!(test.inputs.dims(), (3, 1));
    assert_eq!(test.targets.at(2, 0), 1.0);
    assert_eq!(test.inputs.at(0, 0), 1.0);
}

#[test]
fn test_ignores_records_past_sample_count() {
    let data = load_str(SMALL, 1).unwrap();
    assert_eq!(data.inputs.dims(), (3, 1));
    assert_eq!(data.targets.at(1, 0), 1.0);
}

#[test]
fn test_missing_records() {
    let err = load_str(SMALL, 5).unwrap_err();
    assert!(matches!(err, Error::MissingRecords { expected: 5, found: 3 }));
}

#[test]
fn test_wrong_field_count() {
    let err = load_str("1,0,255,51\n0,102,0\n", 2).unwrap_err();
    assert!(matches!(err, Error::FieldCount { record: 2, expected: 4, found: 3 }));
}

#[test]
fn test_non_numeric_token() {
    let err = load_str("1,0,abc,51\n", 1).unwrap_err();
    match err {
        Error::Parse { record, field, token } => {
            assert_eq!(record, 1);
            assert_eq!(field, 2);
            assert_eq!(token, "abc");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_label_out_of_range() {
    let err = load_str("3,0,0,0\n", 1).unwrap_err();
    assert!(matches!(err, Error::LabelOutOfRange { record: 1, label: 3, classes: 3 }));

    let err = load_str("-1,0,0,0\n", 1).unwrap_err();
    assert!(matches!(err, Error::LabelOutOfRange { label: -1, .. }));
}

#[test]
fn test_error_messages() {
    let err = load_str("1,0,255\n", 1).unwrap_err();
    assert_eq!(err.to_string(), "record 1: expected 4 fields, found 3");
}

#[test]
fn test_loads_plain_and_gzip_files() {
    let dir = std::env::temp_dir().join(format!("mnist-mlp-csv-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();

    let plain = dir.join("small.csv");
    fs::write(&plain, SMALL).unwrap();

    let gz = dir.join("small.csv.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(SMALL.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let from_plain = MnistCsv::load(plain.to_str().unwrap(), 3, 3, 3).unwrap();
    let from_gz = MnistCsv::load(gz.to_str().unwrap(), 3, 3, 3).unwrap();
    assert_eq!(from_plain.inputs, from_gz.inputs);
    assert_eq!(from_plain.targets, from_gz.targets);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let err = MnistCsv::load("/definitely/not/here.csv", 1, 3, 3).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_batch_fits_network() {
    let data = load_str(SMALL, 3).unwrap();
    let mut network = Network::new(&NetworkConfig::new(0.1, 3, vec![3, 4, 3])).unwrap();
    network.set_batch(data.inputs.clone(), data.targets.clone());

    assert_eq!(network.input(), &data.inputs);
    assert_eq!(network.target(), &data.targets);
}
