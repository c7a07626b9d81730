// hp-core/src/units.rs

use uom::si::f64::{
    Power as UomPower, Ratio as UomRatio, ThermodynamicTemperature as UomThermodynamicTemperature,
    Time as UomTime, Volume as UomVolume,
};

// Public canonical unit types (f64) for the API boundary. The engine math
// itself runs on plain f64 in documented imperial units: gallons, degrees
// Fahrenheit, and kBTU/hr.
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn degf(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

#[inline]
pub fn as_degf(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    t.get::<degree_fahrenheit>()
}

#[inline]
pub fn gal(v: f64) -> Volume {
    use uom::si::volume::gallon;
    Volume::new::<gallon>(v)
}

#[inline]
pub fn as_gal(v: Volume) -> f64 {
    use uom::si::volume::gallon;
    v.get::<gallon>()
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn as_watts(p: Power) -> f64 {
    use uom::si::power::watt;
    p.get::<watt>()
}

/// kBTU/hr, the customary capacity unit for water-heating plants.
#[inline]
pub fn kbtu_hr(v: f64) -> Power {
    watts(v * 1000.0 / constants::W_TO_BTU_HR)
}

#[inline]
pub fn as_kbtu_hr(p: Power) -> f64 {
    as_watts(p) * constants::W_TO_BTU_HR / 1000.0
}

#[inline]
pub fn hours(v: f64) -> Time {
    use uom::si::time::hour;
    Time::new::<hour>(v)
}

#[inline]
pub fn as_hours(t: Time) -> f64 {
    use uom::si::time::hour;
    t.get::<hour>()
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

pub mod constants {
    /// Volumetric heat capacity of water, BTU/(gal·°F).
    pub const RHO_CP_BTU_PER_GAL_F: f64 = 8.353535;

    pub const W_TO_BTU_HR: f64 = 3.412142;
    pub const W_TO_TONS: f64 = 0.000284345;
    pub const TONS_TO_KBTU_HR: f64 = 12.0;

    /// Shortest allowed compressor cycle for the primary plant, hours.
    pub const PRIMARY_MIN_RUNTIME_HR: f64 = 10.0 / 60.0;
    /// Shortest allowed cycle for temperature-maintenance equipment, hours.
    pub const TM_MIN_RUNTIME_HR: f64 = 20.0 / 60.0;

    /// Liquid water bounds at atmospheric pressure, °F.
    pub const WATER_FREEZE_F: f64 = 32.0;
    pub const WATER_BOIL_F: f64 = 212.0;

    pub const HOURS_PER_DAY: usize = 24;
    pub const MINUTES_PER_HOUR: usize = 60;
}

/// True when a temperature lies in the liquid-water range at atmospheric
/// pressure.
#[inline]
pub fn is_liquid_water_f(temp_f: f64) -> bool {
    (constants::WATER_FREEZE_F..=constants::WATER_BOIL_F).contains(&temp_f)
}

/// Converts a volume of water at `hot_f` into the equivalent volume at
/// `out_f` when tempered with water at `cold_f`: both carry the same energy
/// above the cold temperature.
#[inline]
pub fn mix_volume(vol: f64, hot_f: f64, cold_f: f64, out_f: f64) -> f64 {
    vol * (out_f - cold_f) / (hot_f - cold_f)
}

/// Expands an hourly series to minute resolution by repeating each entry 60
/// times. Callers divide by 60 where a per-minute rate is needed.
pub fn hourly_to_minutely(hourly: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(hourly.len() * constants::MINUTES_PER_HOUR);
    for v in hourly {
        out.extend(std::iter::repeat_n(*v, constants::MINUTES_PER_HOUR));
    }
    out
}
