use std::str::FromStr;

use ndarray::Array2;

use crate::error::ElmError;

/// Activation functions available to the hidden layer
#[derive(Debug, Clone, Copy, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
    Sine,
    HardLimit,
    TriangularBasis,
    RadialBasis,
    /// User supplied elementwise function
    Custom(fn(f64) -> f64),
}

impl Activation {
    /// Applies the activation function to a given input
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Sine => x.sin(),
            Activation::HardLimit => if x >= 0.0 { 1.0 } else { 0.0 },
            Activation::TriangularBasis => (1.0 - x.abs()).max(0.0),
            Activation::RadialBasis => (-x * x).exp(),
            Activation::Custom(f) => f(x),
        }
    }

    /// Applies the activation elementwise, consuming the pre-activation matrix
    pub fn apply_array(&self, mut preactivation: Array2<f64>) -> Array2<f64> {
        preactivation.mapv_inplace(|x| self.apply(x));
        preactivation
    }
}

impl FromStr for Activation {
    type Err = ElmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sig" | "sigmoid" => Ok(Activation::Sigmoid),
            "sin" | "sine" => Ok(Activation::Sine),
            "hardlim" | "hard-limit" | "hard_limit" => Ok(Activation::HardLimit),
            "tribas" | "triangular-basis" | "triangular_basis" => Ok(Activation::TriangularBasis),
            "radbas" | "radial-basis" | "radial_basis" => Ok(Activation::RadialBasis),
            other => Err(ElmError::invalid(
                "activation",
                format!("unknown activation function `{}`", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_activation_functions() {
        // Sigmoid tests
        assert!((Activation::Sigmoid.apply(0.0) - 0.5).abs() < EPSILON);

        // Sine tests
        assert!((Activation::Sine.apply(std::f64::consts::FRAC_PI_2) - 1.0).abs() < EPSILON);

        // Hard limit is 1 from zero upwards
        assert_eq!(Activation::HardLimit.apply(-0.1), 0.0);
        assert_eq!(Activation::HardLimit.apply(0.0), 1.0);

        // Triangular basis
        assert_eq!(Activation::TriangularBasis.apply(0.0), 1.0);
        assert!((Activation::TriangularBasis.apply(-0.25) - 0.75).abs() < EPSILON);
        assert_eq!(Activation::TriangularBasis.apply(2.0), 0.0);

        // Radial basis
        assert_eq!(Activation::RadialBasis.apply(0.0), 1.0);
        assert!((Activation::RadialBasis.apply(1.0) - (-1.0f64).exp()).abs() < EPSILON);

        // Custom
        assert_eq!(Activation::Custom(|x| 2.0 * x).apply(3.0), 6.0);
    }

    #[test]
    fn test_apply_array_is_elementwise() {
        let out = Activation::HardLimit.apply_array(array![[-1.0, 0.5], [0.0, -2.0]]);
        assert_eq!(out, array![[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_parse_symbolic_names() {
        assert!(matches!("sig".parse::<Activation>(), Ok(Activation::Sigmoid)));
        assert!(matches!("Sine".parse::<Activation>(), Ok(Activation::Sine)));
        assert!(matches!("hardlim".parse::<Activation>(), Ok(Activation::HardLimit)));
        assert!(matches!("triangular-basis".parse::<Activation>(), Ok(Activation::TriangularBasis)));
        assert!(matches!("radbas".parse::<Activation>(), Ok(Activation::RadialBasis)));

        let err = "relu".parse::<Activation>().unwrap_err();
        assert!(matches!(err, ElmError::InvalidArgument { name: "activation", .. }));
    }
}
