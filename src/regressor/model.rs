//! Burn module for the nutrient regressor

use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// ReLU hidden layers followed by a single linear output unit
#[derive(Module, Debug)]
pub struct Regressor<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
}

impl<B: Backend> Regressor<B> {
    pub fn new(
        input_width: usize,
        hidden_layers: &[usize],
        initializer: Initializer,
        device: &B::Device,
    ) -> Self {
        let layer = |inputs: usize, units: usize| {
            LinearConfig::new(inputs, units)
                .with_initializer(initializer.clone())
                .init(device)
        };
        let mut hidden = Vec::with_capacity(hidden_layers.len());
        let mut fan_in = input_width;
        for &units in hidden_layers {
            hidden.push(layer(fan_in, units));
            fan_in = units;
        }
        Self {
            hidden,
            output: layer(fan_in, 1),
        }
    }

    /// `[batch, input_width]` to `[batch, 1]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(input, |x, layer| relu(layer.forward(x)));
        self.output.forward(x)
    }

    /// `(inputs, units)` of every layer, output last
    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        self.hidden
            .iter()
            .chain(std::iter::once(&self.output))
            .map(|layer| {
                let [inputs, units] = layer.weight.val().dims();
                (inputs, units)
            })
            .collect()
    }
}

/// He-uniform: bound `sqrt(6 / fan_in)`
pub fn he_uniform() -> Initializer {
    Initializer::KaimingUniform {
        gain: std::f64::consts::SQRT_2,
        fan_out_only: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::{NdArray, NdArrayDevice};

    #[test]
    fn test_layer_shapes() {
        let device = NdArrayDevice::default();
        let model = Regressor::<NdArray>::new(5, &[64, 32], Initializer::Zeros, &device);
        assert_eq!(model.layer_shapes(), vec![(5, 64), (64, 32), (32, 1)]);
    }

    #[test]
    fn test_forward_keeps_batch_dimension() {
        let device = NdArrayDevice::default();
        let model = Regressor::<NdArray>::new(3, &[4], Initializer::Zeros, &device);
        let output = model.forward(Tensor::zeros([7, 3], &device));
        assert_eq!(output.dims(), [7, 1]);
    }
}
