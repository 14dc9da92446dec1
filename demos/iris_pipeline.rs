use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use iris_mlp::{
    IrisData, LabeledRecord, ModelConfig, Pipeline, PipelineRequest, RawRecord, TrainingOptions,
};

fn main() -> iris_mlp::Result<()> {
    env_logger::init();

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/iris-sample.json");
    let data = IrisData::from_json_file(path)?;

    // Widen the small sample with jittered copies of every training row.
    let mut rng = StdRng::seed_from_u64(0);
    let base = iris_mlp::validate_records(&data.training_data)?;
    let mut training: Vec<RawRecord> = data.training_data.clone();
    for _ in 0..4 {
        for r in &base {
            let mut j = || rng.gen_range(-0.1_f32..0.1);
            let jittered = LabeledRecord {
                sepal_length: r.sepal_length + j(),
                sepal_width: r.sepal_width + j(),
                petal_length: r.petal_length + j(),
                petal_width: (r.petal_width + j()).max(0.1),
                species: r.species,
            };
            training.push(RawRecord::from(&jittered));
        }
    }

    let config = ModelConfig::default();
    let request = PipelineRequest::new(
        training,
        data.testing_data,
        config,
        vec![5.1, 3.5, 1.4, 0.2],
    )
    .with_options(TrainingOptions {
        seed: 7,
        batch_size: 16,
        shuffle: true,
    });

    let outcome = Pipeline::new().run(&request)?;
    let m = outcome.metrics;
    println!(
        "epochs={} loss={:.4} accuracy={:.3} elapsed={}ms",
        m.epochs, m.final_loss, m.final_accuracy, m.elapsed_time_ms
    );

    for (i, p) in outcome.test_predictions.iter().enumerate() {
        match p {
            Ok(p) => println!("test[{i}] -> {} {:?}", p.predicted_species, p.probabilities),
            Err(e) => println!("test[{i}] -> error: {e}"),
        }
    }
    println!(
        "custom -> {} {:?}",
        outcome.custom_prediction.predicted_species, outcome.custom_prediction.probabilities
    );

    Ok(())
}
