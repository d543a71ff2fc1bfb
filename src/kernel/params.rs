//! Kernel family and bandwidth parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwwlError};


#[cfg_attr(doc, katexit::katexit)]
/// Maps a distance d to a similarity, given a bandwidth $\sigma$.
///  - Exponential : $k(d) = \exp(-\frac{d}{2 \sigma^2})$
///  - PowerExponential : $k(d) = \exp(-(\frac{d}{\sigma})^\alpha)$ with $0 < \alpha \le 1$
///
/// Both keep positive semi-definiteness for conditionally negative definite distances,
/// which is the case of sliced Wasserstein distances with exponent in \[1, 2\].
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum KernelFamily {
    #[default]
    Exponential,
    PowerExponential { alpha: f64 },
}


impl KernelFamily {

    pub fn evaluate(&self, distance: f64, sigma: f64) -> f64 {
        match self {
            KernelFamily::Exponential => (-distance / (2. * sigma * sigma)).exp(),
            KernelFamily::PowerExponential { alpha } => {
                if distance <= 0. { 1. } else { (-(distance / sigma).powf(*alpha)).exp() }
            },
        }
    }

    /// bandwidth giving similarity exp(-1) at distance d_ref
    pub fn sigma_for_reference(&self, reference: f64) -> f64 {
        match self {
            KernelFamily::Exponential => (reference / 2.).sqrt(),
            KernelFamily::PowerExponential { .. } => reference,
        }
    }

    pub fn tag(&self) -> String {
        match self {
            KernelFamily::Exponential => "exp".to_string(),
            KernelFamily::PowerExponential { alpha } => format!("powexp{}", alpha),
        }
    }

} // end of impl KernelFamily


/// How the bandwidth is obtained
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Bandwidth {
    /// given value, > 0
    Fixed(f64),
    /// estimated from the median of off diagonal distances
    #[default]
    Median,
    /// estimated from a quantile in \[0, 1\] of off diagonal distances
    Quantile(f64),
}

impl Bandwidth {
    pub fn tag(&self) -> String {
        match self {
            Bandwidth::Fixed(sigma) => format!("s{}", sigma),
            Bandwidth::Median => "smed".to_string(),
            Bandwidth::Quantile(q) => format!("sq{}", q),
        }
    }
}


/// Parameters of the distance to gram matrix conversion.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    pub family: KernelFamily,
    pub bandwidth: Bandwidth,
    /// eigenvalues above -psd_tolerance are accepted
    pub psd_tolerance: f64,
    /// do we compute the min eigenvalue of each gram matrix
    pub check_psd: bool,
} // end of KernelParams


impl KernelParams {

    pub fn new(family: KernelFamily, bandwidth: Bandwidth, psd_tolerance: f64, check_psd: bool) -> Self {
        KernelParams { family, bandwidth, psd_tolerance, check_psd }
    }

    pub fn get_family(&self) -> KernelFamily { self.family }

    pub fn get_bandwidth(&self) -> Bandwidth { self.bandwidth }

    pub fn get_psd_tolerance(&self) -> f64 { self.psd_tolerance }

    pub fn get_check_psd(&self) -> bool { self.check_psd }

    pub fn check(&self) -> Result<()> {
        if let KernelFamily::PowerExponential { alpha } = self.family {
            if !(alpha > 0. && alpha <= 1.) {
                return Err(SwwlError::InvalidParameter(format!("power exponential alpha must be in (0,1], got {}", alpha)));
            }
        }
        match self.bandwidth {
            Bandwidth::Fixed(sigma) if !(sigma.is_finite() && sigma > 0.) => {
                return Err(SwwlError::InvalidParameter(format!("bandwidth must be > 0, got {}", sigma)));
            },
            Bandwidth::Quantile(q) if !(0. ..=1.).contains(&q) => {
                return Err(SwwlError::InvalidParameter(format!("bandwidth quantile must be in [0,1], got {}", q)));
            },
            _ => {},
        }
        if !(self.psd_tolerance >= 0.) {
            return Err(SwwlError::InvalidParameter(format!("psd tolerance must be >= 0, got {}", self.psd_tolerance)));
        }
        Ok(())
    } // end of check

} // end of impl KernelParams


impl Default for KernelParams {
    fn default() -> Self {
        KernelParams::new(KernelFamily::Exponential, Bandwidth::Median, 1.0e-6, true)
    }
}


// end of mod tests
