//! End-to-end sizing scenarios: demand sweeps, infeasible plants, load
//! shifting, and the two temperature-maintenance schematics.

use hp_curves::EquipmentCurve;
use hp_loads::Occupancy;
use hp_sizer::{PlantDesign, PlantSpec, Schematic, Sizer, SizerError};
use hp_tanks::{Component, LoadShiftPlan};

fn base_spec(n_people: f64, schematic: Schematic) -> PlantSpec {
    PlantSpec::new(
        Occupancy::from_people(n_people, 36).unwrap(),
        25.0,
        schematic,
    )
}

fn size(spec: PlantSpec) -> PlantDesign {
    Sizer::new(spec).unwrap().size().unwrap()
}

/// A performance table with plenty of headroom for every plant in these
/// scenarios.
fn ample_equipment() -> EquipmentCurve {
    EquipmentCurve::new(
        vec![17.0, 35.0, 67.0, 95.0],
        vec![40.0, 60.0, 80.0],
        vec![
            vec![400.0, 380.0, 360.0],
            vec![500.0, 475.0, 450.0],
            vec![650.0, 620.0, 590.0],
            vec![720.0, 690.0, 660.0],
        ],
    )
    .unwrap()
}

#[test]
fn flat_demand_sweep_is_monotone_and_never_depletes() {
    // Constant draw all day; the cycling floor sets the volume.
    let mut designs = Vec::new();
    for gpdpp in [20.0, 30.0, 40.0, 45.0] {
        let mut spec = base_spec(100.0, Schematic::Primary);
        spec.gpdpp = gpdpp;
        spec.load_shape = [1.0 / 24.0; 24];
        spec.equipment = Some(ample_equipment());
        let design = size(spec);
        assert!(design.trace.depletion_events.is_empty());
        designs.push(design);
    }
    for pair in designs.windows(2) {
        assert!(pair[0].primary.volume_gal < pair[1].primary.volume_gal);
        assert!(pair[0].primary.capacity_kbtu_hr < pair[1].primary.capacity_kbtu_hr);
    }
}

#[test]
fn capacity_grows_with_occupancy() {
    let mut last_capacity = 0.0;
    for n_people in [50.0, 100.0, 200.0, 400.0] {
        let design = size(base_spec(n_people, Schematic::Primary));
        assert!(design.primary.capacity_kbtu_hr > last_capacity);
        last_capacity = design.primary.capacity_kbtu_hr;
    }
}

#[test]
fn impossible_plant_surfaces_as_infeasible() {
    // An entire day of demand packed into one hour, at campus scale. The
    // storage this would need is past any real plant.
    let mut spec = base_spec(5000.0, Schematic::Primary);
    let mut shape = [0.0; 24];
    shape[8] = 1.0;
    spec.load_shape = shape;

    let err = Sizer::new(spec).unwrap().size().unwrap_err();
    match err {
        SizerError::Infeasible {
            best_volume_gal, ..
        } => assert!(best_volume_gal > 0.0),
        other => panic!("expected Infeasible, got {other}"),
    }
}

#[test]
fn capped_equipment_surfaces_as_infeasible() {
    // A table topping out far below the roughly 91 kBTU/hr this building
    // needs.
    let mut spec = base_spec(100.0, Schematic::Primary);
    spec.equipment = Some(
        EquipmentCurve::new(
            vec![17.0, 35.0, 67.0, 95.0],
            vec![40.0, 60.0, 80.0],
            vec![
                vec![8.0, 7.0, 6.0],
                vec![12.0, 11.0, 10.0],
                vec![18.0, 16.0, 14.0],
                vec![20.0, 18.0, 16.0],
            ],
        )
        .unwrap(),
    );

    let err = Sizer::new(spec).unwrap().size().unwrap_err();
    match err {
        SizerError::Infeasible {
            best_capacity_kbtu_hr,
            ..
        } => assert!(best_capacity_kbtu_hr > 0.0),
        other => panic!("expected Infeasible, got {other}"),
    }
}

#[test]
fn evening_shed_design_holds_the_floor() {
    let mut spec = base_spec(100.0, Schematic::Primary);
    let mut allowed = [true; 24];
    for hour in 16..22 {
        allowed[hour] = false;
    }
    spec.load_shift = Some(LoadShiftPlan::new(allowed, 1.0).unwrap());

    let design = size(spec);
    assert!(design.trace.status.is_completed());
    assert!(design.trace.depletion_events.is_empty());

    let rows = &design.trace.rows;
    let at_start = rows[16 * 60].primary_volume_gal;
    let at_end = rows[22 * 60 - 1].primary_volume_gal;
    assert!(at_end < at_start);

    let floor_gal = design.primary.volume_gal * 0.1;
    let min_in_shed = rows[16 * 60..22 * 60]
        .iter()
        .map(|r| r.primary_volume_gal)
        .fold(f64::INFINITY, f64::min);
    assert!(min_in_shed >= floor_gal - 1e-9);
}

#[test]
fn swing_schematic_sizes_both_components() {
    let design = size(base_spec(100.0, Schematic::SwingTank));
    let tm = design.temp_maintenance.as_ref().unwrap();
    assert_eq!(tm.component, Component::Swing);
    // 36 apartments land in the California 168 gal bracket.
    assert_eq!(tm.volume_gal, 168.0);
    assert!(tm.capacity_kbtu_hr > 0.0);

    assert!(design.trace.status.is_completed());
    for row in &design.trace.rows {
        let temp = row.secondary_temp_f.unwrap();
        assert!(temp >= 120.0 - 1e-9);
    }
}

#[test]
fn parallel_loop_schematic_holds_its_band() {
    let design = size(base_spec(100.0, Schematic::ParallelLoop));
    let tm = design.temp_maintenance.as_ref().unwrap();
    assert_eq!(tm.component, Component::ParallelLoop);
    assert!(tm.volume_gal > 0.0);
    assert!(!tm.curve.is_empty());

    assert!(design.trace.status.is_completed());
    for row in &design.trace.rows {
        let temp = row.secondary_temp_f.unwrap();
        assert!((120.0 - 1e-9..=130.0 + 1e-9).contains(&temp));
    }
}

#[test]
fn design_serializes_and_round_trips() {
    let design = size(base_spec(50.0, Schematic::Primary));
    let json = serde_json::to_string(&design).unwrap();
    let back: PlantDesign = serde_json::from_str(&json).unwrap();
    assert_eq!(back, design);
}
