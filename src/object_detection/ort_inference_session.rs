use crate::error::DetectorError;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// The raw output tensor of a single inference call, copied out of the session.
#[derive(Debug)]
pub struct RawOutput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// An onnxruntime inference session.
///
/// Detection models in this crate are wrappers around an ONNX inference session that
/// handles running the model on hardware. Running a session needs exclusive access, so
/// calls are serialized through a mutex; the model weights are never mutated.
pub struct OrtInferenceSession {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self, DetectorError> {
        let load_error = |source| DetectorError::Load {
            path: model_path.to_path_buf(),
            source,
        };
        let session = Session::builder()
            .map_err(load_error)?
            .commit_from_file(model_path)
            .map_err(load_error)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .unwrap_or_else(|| "output0".to_string());
        info!(
            "Loaded ONNX model from {:?} (input '{}', output '{}')",
            model_path, input_name, output_name
        );
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    pub fn run(&self, input_array: Array4<f32>) -> Result<RawOutput, DetectorError> {
        let input = Tensor::from_array(input_array)?;
        let mut session = self.session.lock().map_err(|_| DetectorError::Poisoned)?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;
        let (shape, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        Ok(RawOutput {
            shape: shape.iter().map(|&dim| dim.max(0) as usize).collect(),
            data: data.to_vec(),
        })
    }
}
