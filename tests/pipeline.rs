use iris_mlp::{
    Error, IrisData, ModelConfig, Pipeline, PipelineRequest, PipelineState, Species,
    TrainingOptions, predict, predict_one,
};

fn sample() -> IrisData {
    IrisData::from_json_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/iris-sample.json"))
        .unwrap()
}

fn request(config: ModelConfig) -> PipelineRequest {
    let data = sample();
    PipelineRequest::new(
        data.training_data,
        data.testing_data,
        config,
        vec![5.1, 3.5, 1.4, 0.2],
    )
    .with_options(TrainingOptions {
        seed: 1,
        batch_size: 5,
        shuffle: true,
    })
}

#[test]
fn sample_dataset_trains_and_classifies_every_test_row() {
    let req = request(ModelConfig::new(8, 10, 150, 0.06).unwrap());
    let mut pipeline = Pipeline::new();
    let outcome = pipeline.run(&req).unwrap();

    assert_eq!(pipeline.state(), PipelineState::Complete);
    assert_eq!(outcome.history.len(), 150);
    assert_eq!(outcome.test_predictions.len(), req.testing.len());
    assert!(outcome.metrics.final_loss < outcome.history[0].loss);

    for p in &outcome.test_predictions {
        let p = p.as_ref().unwrap();
        let sum: f32 = p.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
    }
}

#[test]
fn identical_requests_give_identical_outcomes() {
    let req = request(ModelConfig::new(6, 6, 20, 0.06).unwrap());
    let a = Pipeline::new().run(&req).unwrap();
    let b = Pipeline::new().run(&req).unwrap();

    assert_eq!(a.metrics.final_loss, b.metrics.final_loss);
    assert_eq!(a.metrics.final_accuracy, b.metrics.final_accuracy);
    assert_eq!(a.custom_prediction, b.custom_prediction);
}

#[test]
fn predictions_are_identical_across_threads() {
    let req = request(ModelConfig::new(8, 10, 30, 0.06).unwrap());
    let outcome = Pipeline::new().run(&req).unwrap();
    let model = &outcome.model;

    let inputs = [
        [5.1_f32, 3.5, 1.4, 0.2],
        [6.3, 3.3, 6.0, 2.5],
        [7.0, 3.2, 4.7, 1.4],
    ];
    let expected: Vec<_> = inputs
        .iter()
        .map(|x| predict_one(model, x).unwrap())
        .collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| predict(model, &inputs)))
            .collect();
        for h in handles {
            let got: Vec<_> = h.join().unwrap().into_iter().map(Result::unwrap).collect();
            assert_eq!(got, expected);
        }
    });
}

#[test]
fn unknown_species_in_testing_data_fails_the_request() {
    let mut req = request(ModelConfig::new(4, 4, 2, 0.06).unwrap());
    req.testing[2].species = Some(serde_json::json!("daisy"));

    let mut pipeline = Pipeline::new();
    match pipeline.run(&req) {
        Err(Error::InvalidRecord { index, reason }) => {
            assert_eq!(index, 2);
            assert!(reason.contains("daisy"));
        }
        other => panic!("expected InvalidRecord, got {other:?}"),
    }
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[test]
fn species_order_is_setosa_virginica_versicolor() {
    let names: Vec<_> = Species::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(names, ["setosa", "virginica", "versicolor"]);
}
