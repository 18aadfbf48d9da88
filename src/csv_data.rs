use std::fs::File;
use std::io::{self, Read};
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use tracing::info;

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Header-less CSV reader over a file, gzip file or stdin.
pub type CsvReader = csv::Reader<Box<dyn Read>>;

/// An MNIST-style dataset laid out for a [`Network`](crate::Network):
/// one column per sample.
///
/// Each record is `label,pixel_0,...,pixel_{features-1}`. The label becomes a
/// one-hot column of `targets` and pixels are scaled from `[0, 255]` to
/// `[0, 1]` into the matching column of `inputs`.
#[derive(Debug, Clone)]
pub struct MnistCsv {
    /// `features x samples`
    pub inputs: Matrix,
    /// `classes x samples`
    pub targets: Matrix,
}

impl MnistCsv {

    /// Opens `path` for reading; `-` is stdin and a `.gz` suffix is
    /// decompressed on the fly.
    pub fn open(path: &str) -> Result<CsvReader> {
        let reader: Box<dyn Read> = if path == "-" {
            Box::new(io::stdin())
        } else {
            let file = File::open(path)?;
            if path.ends_with(".gz") {
                Box::new(GzDecoder::new(file))
            } else {
                Box::new(file)
            }
        };

        Ok(Self::reader(reader))
    }

    pub fn reader<R: Read>(input: R) -> csv::Reader<R> {
        ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input)
    }

    pub fn load(path: &str, samples: usize, features: usize, classes: usize) -> Result<Self> {
        let mut reader = Self::open(path)?;
        Self::from_reader(&mut reader, samples, features, classes)
    }

    /// Consumes exactly `samples` records, leaving the rest of the stream in
    /// `reader` so another dataset can follow it.
    pub fn from_reader<R: Read>(
        reader: &mut csv::Reader<R>,
        samples: usize,
        features: usize,
        classes: usize,
    ) -> Result<Self> {
        let start = Instant::now();

        let mut inputs = Matrix::zeros(features, samples);
        let mut targets = Matrix::zeros(classes, samples);
        let mut record = StringRecord::new();

        for sample in 0..samples {
            if !reader.read_record(&mut record)? {
                return Err(Error::MissingRecords { expected: samples, found: sample });
            }

            let number = sample + 1;
            if record.len() != features + 1 {
                return Err(Error::FieldCount {
                    record: number,
                    expected: features + 1,
                    found: record.len(),
                });
            }

            let label = parse_field(&record, 0, number)?;
            if label < 0 || label as usize >= classes {
                return Err(Error::LabelOutOfRange { record: number, label, classes });
            }
            targets.set(label as usize, sample, 1.0);

            for feature in 0..features {
                let pixel = parse_field(&record, feature + 1, number)?;
                inputs.set(feature, sample, (pixel as f64 / 255.0) as f32);
            }
        }

        info!(samples, features, elapsed = ?start.elapsed(), "read csv records");
        Ok(MnistCsv { inputs, targets })
    }
}

fn parse_field(record: &StringRecord, field: usize, number: usize) -> Result<i64> {
    let token = &record[field];
    token.parse::<i64>().map_err(|_| Error::Parse {
        record: number,
        field,
        token: token.to_owned(),
    })
}
