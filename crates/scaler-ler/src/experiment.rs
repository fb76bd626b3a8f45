//! The shared setup of every estimator.

use tracing::{debug, instrument};

use scaler_compile::NoiseModel;
use scaler_ir::Circuit;
use scaler_sim::{
    Decoder, DetectorErrorModel, FrameSimulator, LookupDecoder, SampleRecord,
    DEFAULT_DECODER_PATTERNS,
};

use crate::error::LerResult;

/// A noisy circuit with its error model and decoder.
pub struct Experiment {
    circuit: Circuit,
    simulator: FrameSimulator,
    dem: DetectorErrorModel,
    decoder: Box<dyn Decoder>,
}

impl std::fmt::Debug for Experiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Experiment")
            .field("circuit", &self.circuit.name())
            .field("sites", &self.dem.num_sites())
            .field("detectors", &self.dem.num_detectors())
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

/// Attach `noise` to `circuit` and derive its detector error model.
pub fn error_model(circuit: &Circuit, noise: &NoiseModel) -> LerResult<DetectorErrorModel> {
    build_error_model(circuit, noise).map(|(_, _, dem)| dem)
}

fn build_error_model(
    circuit: &Circuit,
    noise: &NoiseModel,
) -> LerResult<(Circuit, FrameSimulator, DetectorErrorModel)> {
    let noisy = noise.rewrite(circuit)?;
    let simulator = FrameSimulator::new(&noisy)?;
    let dem = DetectorErrorModel::from_backend(&simulator)?;
    Ok((noisy, simulator, dem))
}

impl Experiment {
    /// Attach `noise` to `circuit`, build the error model and a lookup
    /// decoder of `decoder_weight` (sized from the pattern count when
    /// absent).
    #[instrument(skip_all, fields(circuit = circuit.name()))]
    pub fn prepare(
        circuit: &Circuit,
        noise: &NoiseModel,
        decoder_weight: Option<usize>,
    ) -> LerResult<Self> {
        let (noisy, simulator, dem) = build_error_model(circuit, noise)?;
        let decoder = match decoder_weight {
            Some(w) => LookupDecoder::build(&dem, w),
            None => LookupDecoder::auto(&dem, DEFAULT_DECODER_PATTERNS),
        };
        debug!(
            sites = dem.num_sites(),
            active = dem.active_sites().len(),
            detectors = dem.num_detectors(),
            decoder_weight = decoder.max_weight(),
            "Prepared experiment"
        );
        Ok(Self {
            circuit: noisy,
            simulator,
            dem,
            decoder: Box::new(decoder),
        })
    }

    /// Replace the decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// The noisy circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The frame simulator over the noisy circuit.
    pub fn simulator(&self) -> &FrameSimulator {
        &self.simulator
    }

    /// The detector error model.
    pub fn dem(&self) -> &DetectorErrorModel {
        &self.dem
    }

    /// The decoder.
    pub fn decoder(&self) -> &dyn Decoder {
        self.decoder.as_ref()
    }

    /// Whether decoding `record` leaves a wrong logical value.
    #[inline]
    pub fn is_logical_error(&self, record: &SampleRecord) -> bool {
        self.decoder.decode(&record.detectors) != record.observables
    }
}
