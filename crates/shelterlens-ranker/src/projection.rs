//! State Plane → WGS84 conversion.
//!
//! The remote shelter layer publishes positions in Maryland State Plane
//! (EPSG:2248): Lambert Conformal Conic with two standard parallels on the
//! GRS80 ellipsoid, coordinates in US survey feet. NAD83 and WGS84 are
//! treated as identical, which is well inside the precision a distance in
//! hundredths of a mile needs.
//!
//! Formulas: Snyder, *Map Projections: A Working Manual*, §15.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use shelterlens_common::Position;

use crate::normalise::ConversionError;

/// One US survey foot in metres.
pub const US_SURVEY_FOOT: f64 = 1200.0 / 3937.0;

/// GRS80 semi-major axis, metres.
const GRS80_A: f64 = 6_378_137.0;
/// GRS80 inverse flattening.
const GRS80_INV_F: f64 = 298.257_222_101;

const MAX_ITERATIONS: usize = 20;
const TOLERANCE: f64 = 1e-12;

/// Defining parameters of a Lambert Conformal Conic (2SP) zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertParams {
    /// First standard parallel, degrees.
    pub standard_parallel_1: f64,
    /// Second standard parallel, degrees.
    pub standard_parallel_2: f64,
    /// Latitude of false origin, degrees.
    pub latitude_of_origin: f64,
    /// Central meridian, degrees.
    pub central_meridian: f64,
    /// Metres.
    pub false_easting: f64,
    /// Metres.
    pub false_northing: f64,
    /// Length of one grid unit in metres.
    pub unit: f64,
}

impl LambertParams {
    /// NAD83 / Maryland (ftUS), EPSG:2248.
    pub const MARYLAND_FTUS: LambertParams = LambertParams {
        standard_parallel_1: 39.45,             // 39°27'
        standard_parallel_2: 38.3,              // 38°18'
        latitude_of_origin: 37.0 + 40.0 / 60.0, // 37°40'
        central_meridian: -77.0,
        false_easting: 400_000.0,
        false_northing: 0.0,
        unit: US_SURVEY_FOOT,
    };
}

/// Precomputed projection constants for one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatePlane {
    e: f64,
    n: f64,
    /// a · F
    af: f64,
    rho0: f64,
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    unit: f64,
}

fn m_factor(e: f64, phi: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e * e * s * s).sqrt()
}

fn t_factor(e: f64, phi: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

impl StatePlane {
    pub fn lambert_2sp(params: &LambertParams) -> Self {
        let f = 1.0 / GRS80_INV_F;
        let e = (2.0 * f - f * f).sqrt();

        let phi1 = params.standard_parallel_1.to_radians();
        let phi2 = params.standard_parallel_2.to_radians();
        let phi0 = params.latitude_of_origin.to_radians();

        let (m1, m2) = (m_factor(e, phi1), m_factor(e, phi2));
        let (t1, t2, t0) = (t_factor(e, phi1), t_factor(e, phi2), t_factor(e, phi0));

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let af = GRS80_A * m1 / (n * t1.powf(n));
        let rho0 = af * t0.powf(n);

        Self {
            e,
            n,
            af,
            rho0,
            lon0: params.central_meridian.to_radians(),
            false_easting: params.false_easting,
            false_northing: params.false_northing,
            unit: params.unit,
        }
    }

    pub fn maryland() -> Self {
        Self::lambert_2sp(&LambertParams::MARYLAND_FTUS)
    }

    /// Inverse projection: grid (x, y) in zone units → WGS84.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<Position, ConversionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ConversionError::NonFinite);
        }

        let xm = x * self.unit - self.false_easting;
        let ym = self.rho0 - (y * self.unit - self.false_northing);
        let sign = self.n.signum();

        let rho = sign * xm.hypot(ym);
        let t = (rho / self.af).powf(1.0 / self.n);
        let theta = (sign * xm).atan2(sign * ym);
        let lon = theta / self.n + self.lon0;

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let es = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
            let delta = (next - phi).abs();
            phi = next;
            if delta < TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged || !phi.is_finite() || !lon.is_finite() {
            return Err(ConversionError::ProjectionDiverged { x, y });
        }

        let position = Position::new(phi.to_degrees(), lon.to_degrees());
        if !position.is_valid() {
            return Err(ConversionError::OutOfRange {
                latitude: position.latitude,
                longitude: position.longitude,
            });
        }
        Ok(position)
    }

    /// Forward projection: WGS84 → grid (x, y) in zone units.
    pub fn from_geographic(&self, position: Position) -> (f64, f64) {
        let rho = self.af * t_factor(self.e, position.latitude.to_radians()).powf(self.n);
        let theta = self.n * (position.longitude.to_radians() - self.lon0);
        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();
        (x / self.unit, y / self.unit)
    }
}

impl Default for StatePlane {
    fn default() -> Self {
        Self::maryland()
    }
}
