use rand::Rng;

/// Ordered binary values, one per transmitted position.
pub type BitSequence = Vec<bool>;

/// One basis choice per transmitted position.
pub type BasisSequence = Vec<MeasurementBasis>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeasurementBasis {
    /// Rectilinear basis (|0> and |1>)
    Rectilinear,
    /// Diagonal basis (|+> and |->)
    Diagonal,
}

impl MeasurementBasis {
    /// Draws a basis uniformly from the caller's random stream.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen() {
            MeasurementBasis::Diagonal
        } else {
            MeasurementBasis::Rectilinear
        }
    }

    pub fn as_bit(self) -> bool {
        matches!(self, MeasurementBasis::Diagonal)
    }
}

impl From<bool> for MeasurementBasis {
    fn from(bit: bool) -> Self {
        if bit {
            MeasurementBasis::Diagonal
        } else {
            MeasurementBasis::Rectilinear
        }
    }
}

pub fn random_bit<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen()
}
