//! Robot base on a seesaw charge station.
//!
//! The base is a first-order velocity plant driven by the mean drive
//! voltage. The platform pivots about `pivot_x`; its target angle follows the
//! base's side of the pivot and the actual angle slews toward it at a limited
//! rate. The chassis pitches with the platform while on it and is level
//! otherwise.

/// Approach direction; decides which end of the platform rests down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Base starts before the platform and drives toward +x.
    FromNear,
    /// Base starts past the platform and drives toward −x.
    FromFar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeStationParams {
    /// Velocity gain: terminal speed per volt is `1 / kv` [m/s/V].
    pub kv: f64,
    /// Acceleration constant [V/(m/s²)].
    pub ka: f64,
    /// Pivot position [m].
    pub pivot_x: f64,
    /// Platform half length [m].
    pub half_length: f64,
    /// Resting tilt [deg].
    pub max_tilt_deg: f64,
    /// Distance from the pivot over which the platform swings fully [m].
    pub tip_band: f64,
    /// Platform slew limit [deg/s].
    pub tilt_rate_deg_s: f64,
}

impl Default for ChargeStationParams {
    fn default() -> Self {
        Self {
            kv: 2.5,
            ka: 0.3,
            pivot_x: 2.0,
            half_length: 1.5,
            max_tilt_deg: 15.0,
            tip_band: 0.1,
            tilt_rate_deg_s: 40.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargeStation {
    params: ChargeStationParams,
    x: f64,
    v: f64,
    tilt_deg: f64,
}

impl ChargeStation {
    /// Base half a metre off the platform edge on the `approach` side.
    pub fn new(params: ChargeStationParams, approach: Approach) -> Self {
        let (x, tilt_deg) = match approach {
            Approach::FromNear => (
                params.pivot_x - params.half_length - 0.5,
                params.max_tilt_deg,
            ),
            Approach::FromFar => (
                params.pivot_x + params.half_length + 0.5,
                -params.max_tilt_deg,
            ),
        };
        Self {
            params,
            x,
            v: 0.0,
            tilt_deg,
        }
    }

    /// Base position [m].
    pub fn position(&self) -> f64 {
        self.x
    }

    /// Base speed [m/s].
    pub fn velocity(&self) -> f64 {
        self.v
    }

    /// Platform angle [deg], positive when the near end is down.
    pub fn tilt(&self) -> f64 {
        self.tilt_deg
    }

    pub fn on_platform(&self) -> bool {
        (self.x - self.params.pivot_x).abs() <= self.params.half_length
    }

    /// Chassis pitch [deg], positive nose-up when driving toward +x.
    pub fn pitch(&self) -> f64 {
        if self.on_platform() { self.tilt_deg } else { 0.0 }
    }

    /// Apply the mean drive voltage for `dt` seconds.
    pub fn step(&mut self, volts: f64, dt: f64) {
        let p = self.params;
        let accel = (volts - p.kv * self.v) / p.ka;
        self.v += accel * dt;
        self.x += self.v * dt;

        let side = ((self.x - p.pivot_x) / p.tip_band).clamp(-1.0, 1.0);
        let target = -p.max_tilt_deg * side;
        let max_change = p.tilt_rate_deg_s * dt;
        self.tilt_deg += (target - self.tilt_deg).clamp(-max_change, max_change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_off_platform() {
        let station = ChargeStation::new(ChargeStationParams::default(), Approach::FromNear);
        assert!(!station.on_platform());
        assert_eq!(station.pitch(), 0.0);
        assert_eq!(station.tilt(), 15.0);
    }

    #[test]
    fn climbing_pitches_nose_up() {
        let mut station = ChargeStation::new(ChargeStationParams::default(), Approach::FromNear);
        for _ in 0..50 {
            station.step(3.0, 0.02);
        }
        assert!(station.on_platform());
        assert_eq!(station.pitch(), 15.0);
    }

    #[test]
    fn reversing_from_far_pitches_negative() {
        let mut station = ChargeStation::new(ChargeStationParams::default(), Approach::FromFar);
        for _ in 0..50 {
            station.step(-3.0, 0.02);
        }
        assert!(station.on_platform());
        assert_eq!(station.pitch(), -15.0);
    }

    #[test]
    fn platform_tilt_is_rate_limited() {
        let mut station = ChargeStation::new(ChargeStationParams::default(), Approach::FromNear);
        station.x = 2.5;
        station.step(0.0, 0.02);
        assert!((station.tilt() - (15.0 - 0.8)).abs() < 1e-9);
    }
}
