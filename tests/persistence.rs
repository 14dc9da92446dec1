use std::path::PathBuf;

use iris_mlp::{
    Error, IrisData, ModelConfig, Pipeline, PipelineRequest, TrainedModel, predict,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("iris-mlp-{}-{name}", std::process::id()))
}

fn trained() -> TrainedModel {
    let data =
        IrisData::from_json_file(concat!(env!("CARGO_MANIFEST_DIR"), "/data/iris-sample.json"))
            .unwrap();
    let request = PipelineRequest::new(
        data.training_data,
        vec![],
        ModelConfig::new(8, 10, 10, 0.06).unwrap(),
        vec![5.1, 3.5, 1.4, 0.2],
    );
    Pipeline::new().run(&request).unwrap().model
}

#[test]
fn saved_model_reloads_to_identical_predictions() {
    let model = trained();
    let path = temp_path("roundtrip.json");
    model.save_json(&path).unwrap();
    let loaded = TrainedModel::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.hidden_units(), Some((8, 10)));

    let inputs = [[5.1_f32, 3.5, 1.4, 0.2], [6.3, 3.3, 6.0, 2.5], [5.9, 2.8, 4.3, 1.3]];
    let a: Vec<_> = predict(&model, &inputs).into_iter().map(Result::unwrap).collect();
    let b: Vec<_> = predict(&loaded, &inputs).into_iter().map(Result::unwrap).collect();
    assert_eq!(a, b);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = TrainedModel::load_json(temp_path("does-not-exist.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn non_finite_parameters_are_rejected() {
    let json = trained().to_json_string_pretty().unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["layers"][0]["weights"][0] = serde_json::json!(1e39);

    let err = TrainedModel::from_json_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, Error::InvalidData(_) | Error::Serialization(_)));
}
