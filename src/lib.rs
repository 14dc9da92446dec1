//! A from-scratch dense classifier for the Iris flower dataset.
//!
//! `iris-mlp` takes four flower measurements (sepal length/width, petal
//! length/width) and predicts one of three species. The crate covers the whole
//! classification path:
//!
//! - [`record`]: validate raw dataset rows and encode them into feature vectors
//!   and one-hot labels.
//! - [`builder`]: construct the `4 -> relu -> relu -> 3 (softmax)` network.
//! - [`train`]: mini-batch Adam on categorical cross-entropy for a fixed number
//!   of epochs.
//! - [`predict`]: class probabilities and arg-max species.
//! - [`pipeline`]: the state machine that drives one request end to end.
//!
//! # Panics vs `Result`
//!
//! - Low-level hot path (panics on misuse): [`Mlp::forward`], [`Mlp::backward`],
//!   [`Mlp::forward_batch`]. Shape mismatches are programmer error.
//! - Everything a caller feeds data into ([`encode_raw`], [`train()`],
//!   [`predict()`], [`Pipeline::run`]) validates and returns [`Result`].
//!
//! # Data layout and shapes
//!
//! - Scalars are `f32`.
//! - [`Dataset`] stores samples contiguously in row-major layout.
//! - Layer weights are row-major with shape `(out_dim, in_dim)`.
//! - Class indices are fixed: setosa = 0, virginica = 1, versicolor = 2.
//!
//! # Quick start
//!
//! ```rust
//! use iris_mlp::{LabeledRecord, ModelConfig, Pipeline, PipelineRequest, RawRecord, Species};
//!
//! # fn main() -> iris_mlp::Result<()> {
//! let rows = [
//!     ([5.1, 3.5, 1.4, 0.2], Species::Setosa),
//!     ([6.3, 3.3, 6.0, 2.5], Species::Virginica),
//!     ([7.0, 3.2, 4.7, 1.4], Species::Versicolor),
//! ];
//! let records: Vec<RawRecord> = rows
//!     .iter()
//!     .map(|&(x, species)| {
//!         RawRecord::from(&LabeledRecord {
//!             sepal_length: x[0],
//!             sepal_width: x[1],
//!             petal_length: x[2],
//!             petal_width: x[3],
//!             species,
//!         })
//!     })
//!     .collect();
//!
//! let config = ModelConfig::new(8, 10, 20, 0.06)?;
//! let request = PipelineRequest::new(records.clone(), records, config, vec![5.1, 3.5, 1.4, 0.2]);
//! let outcome = Pipeline::new().run(&request)?;
//! assert_eq!(outcome.history.len(), 20);
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod loss;
pub(crate) mod matmul;
pub mod metrics;
pub mod mlp;
pub mod model;
pub mod optim;
pub mod pipeline;
pub mod predict;
pub mod record;
pub mod serde_model;
pub mod species;
pub mod train;

pub use activation::Activation;
pub use builder::{MlpBuilder, build_classifier};
pub use config::{ModelConfig, TrainingOptions};
pub use data::{Dataset, IrisData, read_records};
pub use error::{Error, Result};
pub use layer::{Init, Layer};
pub use metrics::{TrainingMetrics, argmax};
pub use mlp::{BatchScratch, Gradients, Mlp, Scratch};
pub use model::TrainedModel;
pub use optim::{Adam, AdamState};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineRequest, PipelineState};
pub use predict::{PredictionResult, predict, predict_one};
pub use record::{
    EncodedSet, FeatureVector, LabelVector, LabeledRecord, NUM_FEATURES, RawRecord, encode,
    encode_raw, validate_records,
};
pub use species::{NUM_CLASSES, Species};
pub use train::{EpochReport, FitReport, Trainer, train};
