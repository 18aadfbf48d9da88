pub mod config;
pub mod csv_data;
pub mod error;
pub mod matrix;
pub mod network;
pub mod training;

pub use config::{NetworkConfig, TrainingConfig};
pub use csv_data::MnistCsv;
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use network::{Network, Parameters};
