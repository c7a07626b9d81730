//! Plant sizing: analytic recommendation, simulation verification, and the
//! ASHRAE tabulated alternative.

use crate::error::{SizerError, SizerResult};
use crate::inputs::{PlantSpec, Schematic};
use hp_curves::{AshraeSizer, DemandStandard};
use hp_loads::LoadProfile;
use hp_sim::{RunStatus, SimOptions, SimulationTrace, Simulator};
use hp_tanks::{
    Component, CurvePoint, ParallelLoopTank, PrimaryTank, SizingResult, SwingSpec, SwingTank,
    TankError, TempMaintenance,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Multiplicative step of the verification ladder.
const GROWTH_STEP: f64 = 1.1;
/// The ladder gives up past this factor over the analytic size.
const MAX_GROWTH: f64 = 2.0;
/// Fraction of the primary volume protected as the safety floor.
const FLOOR_FRACT: f64 = 0.1;

/// A sized plant: the primary recommendation, the temperature-maintenance
/// component where the schematic has one, and the verifying design-day run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantDesign {
    pub primary: SizingResult,
    pub temp_maintenance: Option<SizingResult>,
    /// Factor the verification ladder grew the analytic size by (1.0 when
    /// the analytic size passed directly).
    pub growth_factor: f64,
    pub trace: SimulationTrace,
}

struct BuiltPlant {
    primary: PrimaryTank,
    parallel: Option<ParallelLoopTank>,
    temp_maintenance: Option<SizingResult>,
}

/// Sizes a plant from a validated [`PlantSpec`].
pub struct Sizer {
    spec: PlantSpec,
}

impl Sizer {
    pub fn new(spec: PlantSpec) -> SizerResult<Self> {
        spec.validate()?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &PlantSpec {
        &self.spec
    }

    /// Design-day profile at the plant's supply temperature.
    pub fn design_profile(&self) -> SizerResult<LoadProfile> {
        let profile = LoadProfile::build(
            self.spec.occupancy.n_people,
            self.spec.gpdpp,
            &self.spec.load_shape,
        )?;
        Ok(profile.at_supply_temperature(self.spec.supply_f, self.spec.incoming_f))
    }

    /// Sizes the plant: analytic recommendation first, then a design-day
    /// verification that grows the candidate by a bounded multiplicative
    /// ladder until the run completes with no depletion.
    pub fn size(&self) -> SizerResult<PlantDesign> {
        let mut built = self.build_plant()?;
        built.primary.size_vol_cap().map_err(infeasible)?;

        let profile = self.design_profile()?;
        let mut growth = 1.0;
        loop {
            let mut candidate = built.primary.clone();
            candidate.scale_size(growth).map_err(infeasible)?;
            let trace = self.verify(&candidate, built.parallel.as_ref(), &profile)?;
            let clean = trace.status.is_completed() && trace.depletion_events.is_empty();
            debug!(
                growth,
                clean,
                depleted_gal = trace.total_depleted_gal(),
                "verification rung"
            );
            if clean {
                let mut primary = candidate.sizing_result()?;
                if growth > 1.0 {
                    primary.notes.push(format!(
                        "grown {growth:.2}x past the analytic size to clear the design day"
                    ));
                }
                return Ok(PlantDesign {
                    primary,
                    temp_maintenance: built.temp_maintenance,
                    growth_factor: growth,
                    trace,
                });
            }

            growth *= GROWTH_STEP;
            if growth > MAX_GROWTH {
                let (what, failing_step) = match &trace.status {
                    RunStatus::Failed { step, what, .. } => (what.clone(), Some(*step)),
                    _ => (
                        format!("{:.0} gal of demand went unmet", trace.total_depleted_gal()),
                        trace.depletion_events.first().map(|e| e.minute),
                    ),
                };
                return Err(SizerError::Infeasible {
                    what,
                    best_volume_gal: candidate.volume_gal()?,
                    best_capacity_kbtu_hr: candidate.capacity_kbtu_hr()?,
                    failing_step,
                });
            }
        }
    }

    /// The ASHRAE tabulated alternative for the primary plant. No
    /// simulation verification; the tables already carry their margins.
    pub fn size_ashrae(&self) -> SizerResult<SizingResult> {
        let sizer = AshraeSizer::new(
            self.spec.occupancy.n_people,
            DemandStandard::Gpdpp(self.spec.gpdpp),
            self.spec.supply_f,
            self.spec.incoming_f,
            self.spec.storage_f,
            self.spec.percent_useable,
            self.spec.comp_runtime_hr,
        )?;
        let (volume_gal, capacity_kbtu_hr) = sizer.size_vol_cap()?;
        let (volumes, tons) = sizer.primary_curve();
        let curve = volumes
            .into_iter()
            .zip(tons)
            .map(|(v, t)| CurvePoint {
                volume_gal: v,
                capacity_kbtu_hr: t * 12.0,
                heat_hours: None,
            })
            .collect();
        Ok(SizingResult {
            component: Component::Primary,
            volume_gal,
            capacity_kbtu_hr,
            curve,
            recommended_index: None,
            feasible: true,
            notes: Vec::new(),
        })
    }

    /// Volume/capacity trade-off curve for the primary, points evaluated in
    /// parallel over the descending heat-hours ladder.
    pub fn sizing_curve(&self) -> SizerResult<Vec<CurvePoint>> {
        let built = self.build_plant()?;
        let tank = &built.primary;

        let shape_max = tank.load_shape().iter().fold(0.0_f64, |m, v| m.max(*v));
        let min_heat_hours = 1.001 / shape_max;
        let mut hours = Vec::new();
        let mut h = 24.0;
        while h > tank.max_day_run_hr() + 1e-9 {
            hours.push(h);
            h -= 0.25;
        }
        h = tank.max_day_run_hr();
        while h > 0.0 {
            hours.push(h);
            h -= 0.25;
            if h <= min_heat_hours {
                break;
            }
        }

        let evaluated: Vec<(CurvePoint, bool)> = hours
            .par_iter()
            .map(|&hh| -> SizerResult<(CurvePoint, bool)> {
                let sizing = tank.size_tank_volume(hh)?;
                let capacity = tank.heat_hours_to_capacity(hh, sizing.eff_swing_fract)?;
                Ok((
                    CurvePoint {
                        volume_gal: sizing.volume_gal,
                        capacity_kbtu_hr: capacity,
                        heat_hours: Some(hh),
                    },
                    sizing.deficit_free,
                ))
            })
            .collect::<SizerResult<Vec<_>>>()?;

        let mut points = Vec::with_capacity(evaluated.len());
        for (point, deficit_free) in evaluated {
            points.push(point);
            if deficit_free {
                break;
            }
        }
        Ok(points)
    }

    fn build_plant(&self) -> SizerResult<BuiltPlant> {
        let profile = self.design_profile()?;
        let mut primary = PrimaryTank::new(
            &profile,
            self.spec.incoming_f,
            self.spec.supply_f,
            self.spec.storage_f,
            self.spec.percent_useable,
            self.spec.comp_runtime_hr,
            self.spec.aqua_fract,
            self.spec.defrost_factor,
        )?;
        if let Some(curve) = &self.spec.equipment {
            primary = primary.with_equipment(curve.clone(), self.spec.design_ambient_f)?;
        }

        let mut parallel = None;
        let temp_maintenance = match self.spec.schematic {
            Schematic::Primary => None,
            Schematic::SwingTank => {
                let mut swing = SwingTank::new(
                    self.spec.occupancy.n_units,
                    self.spec.loss_w_per_apt,
                    self.spec.safety_factor_tm,
                    self.spec.swing_table,
                )?;
                swing.size_vol_cap()?;
                primary = primary.with_swing(SwingSpec::from_tank(&swing)?)?;
                Some(swing.sizing_result()?)
            }
            Schematic::ParallelLoop => {
                let mut tank = ParallelLoopTank::new(
                    self.spec.occupancy.n_units,
                    self.spec.loss_w_per_apt,
                    self.spec.safety_factor_tm,
                    self.spec.loop_setpoint_f,
                    self.spec.loop_on_temp_f,
                    self.spec.loop_off_time_hr,
                    self.spec.tm_runtime_hr,
                )?;
                TempMaintenance::size_vol_cap(&mut tank)?;
                let result = tank.sizing_result()?;
                parallel = Some(tank);
                Some(result)
            }
        };

        if let Some(plan) = &self.spec.load_shift {
            primary.set_load_shift(plan.clone())?;
        }

        Ok(BuiltPlant {
            primary,
            parallel,
            temp_maintenance,
        })
    }

    fn verify(
        &self,
        candidate: &PrimaryTank,
        parallel: Option<&ParallelLoopTank>,
        profile: &LoadProfile,
    ) -> SizerResult<SimulationTrace> {
        let opts = SimOptions {
            floor_fract: FLOOR_FRACT,
            ..SimOptions::default()
        };
        let mut sim = Simulator::new(candidate, opts)?;
        if let Some(tank) = parallel {
            sim = sim.with_parallel(tank)?;
        }
        Ok(sim.simulate(profile)?)
    }
}

/// Surfaces tank-level infeasibility as the sizer's own variant, carrying
/// the best-attempted candidate.
fn infeasible(err: TankError) -> SizerError {
    match err {
        TankError::Infeasible {
            what,
            volume_gal,
            capacity_kbtu_hr,
        } => SizerError::Infeasible {
            what: what.to_string(),
            best_volume_gal: volume_gal,
            best_capacity_kbtu_hr: capacity_kbtu_hr,
            failing_step: None,
        },
        other => SizerError::Tank(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_loads::Occupancy;

    fn spec(n_people: f64) -> PlantSpec {
        PlantSpec::new(
            Occupancy::from_people(n_people, 36).unwrap(),
            25.0,
            Schematic::Primary,
        )
    }

    #[test]
    fn analytic_size_passes_verification_unscaled() {
        let sizer = Sizer::new(spec(100.0)).unwrap();
        let design = sizer.size().unwrap();
        assert_eq!(design.growth_factor, 1.0);
        assert!(design.trace.status.is_completed());
        assert!(design.trace.depletion_events.is_empty());
        assert!(design.primary.volume_gal > 0.0);
        assert!(design.primary.capacity_kbtu_hr > 0.0);
        assert!(design.temp_maintenance.is_none());
    }

    #[test]
    fn sizing_curve_matches_sequential_recommendation() {
        let sizer = Sizer::new(spec(100.0)).unwrap();
        let curve = sizer.sizing_curve().unwrap();
        assert!(curve.len() > 10);
        // Strictly more capacity at shorter windows.
        assert!(
            curve
                .windows(2)
                .all(|w| w[0].capacity_kbtu_hr < w[1].capacity_kbtu_hr)
        );
        // The plant's own window appears on the curve.
        assert!(
            curve
                .iter()
                .any(|p| (p.heat_hours.unwrap() - 16.0).abs() < 1e-9)
        );
    }

    #[test]
    fn ashrae_path_returns_the_tabulated_pair() {
        let sizer = Sizer::new(spec(100.0)).unwrap();
        let result = sizer.size_ashrae().unwrap();
        assert!(result.volume_gal > 0.0);
        assert!(result.capacity_kbtu_hr > 0.0);
        assert_eq!(result.curve.len(), 7);
    }

    #[test]
    fn equipment_table_shapes_the_recommendation() {
        let curve = hp_curves::EquipmentCurve::new(
            vec![17.0, 35.0, 67.0, 95.0],
            vec![40.0, 60.0, 80.0],
            vec![
                vec![120.0, 110.0, 100.0],
                vec![160.0, 148.0, 136.0],
                vec![220.0, 200.0, 180.0],
                vec![250.0, 236.0, 220.0],
            ],
        )
        .unwrap()
        .with_defrost_derate(0.9)
        .unwrap();

        let mut with_table = spec(100.0);
        with_table.equipment = Some(curve.clone());
        with_table.design_ambient_f = 67.0;
        let design = Sizer::new(with_table).unwrap().size().unwrap();
        let plain = Sizer::new(spec(100.0)).unwrap().size().unwrap();

        // The table's derate asks for more nameplate capacity than the
        // derate-free plant.
        assert!(design.primary.capacity_kbtu_hr > plain.primary.capacity_kbtu_hr);
        assert!(design.primary.notes.iter().any(|n| n.contains("design ambient")));

        // Design conditions outside the table are refused.
        let mut arctic = spec(100.0);
        arctic.equipment = Some(curve);
        arctic.design_ambient_f = -10.0;
        assert!(Sizer::new(arctic).unwrap().size().is_err());
    }

    #[test]
    fn invalid_spec_is_rejected_at_construction() {
        let mut bad = spec(100.0);
        bad.aqua_fract = 0.1;
        assert!(Sizer::new(bad).is_err());
    }
}
