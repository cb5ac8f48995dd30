// crates/fvbc_boundary/tests/scenarios.rs
//!
//! 端到端场景：构造 → 更新 → 读取 → 时间推进 → 持久化

mod common;

use common::{sample_scalar, strip_mesh, strip_spec};
use fvbc_boundary::prelude::*;
use fvbc_boundary::{
    AnalyticVelocityBoundary, CorrectedGradientBoundary, PatchFieldState, TaylorGreenVortex,
};
use fvbc_mesh::{MeshGeometry, PatchBuilder, PatchFace, PatchHandle, SimTime};
use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI};

/// 正交平面边界，面中心由调用方给出，单元中心在面下方 `dist` 处
fn flat_patch(name: &str, centres: &[DVec3], dist: f64) -> (MeshGeometry, PatchHandle) {
    let faces: Vec<PatchFace> = centres
        .iter()
        .enumerate()
        .map(|(i, c)| PatchFace {
            centre: *c,
            area: DVec3::Z * 0.01,
            owner: i,
            owner_centre: *c - DVec3::Z * dist,
        })
        .collect();
    let mut mesh = MeshGeometry::new();
    let h = mesh.add_patch(name, &faces).unwrap();
    (mesh, h)
}

#[test]
fn zero_gradient_direct_mode_copies_owner_values() {
    let centres: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.1, 0.0, 1.0)).collect();
    let (mesh, h) = flat_patch("outlet", &centres, 0.1);
    let time = SimTime::new(0.0);
    let registry = BoundaryRegistry::scalar();

    for second_order in [false, true] {
        let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME)
            .with_gradient(0.0)
            .with_corrections(true, second_order)
            .with_extrapolate_value(false);
        let mut bc = registry.build(&BuildContext::new(&mesh, h), &config).unwrap();

        // 有无单元梯度结果都相同
        let plain = CellField::new("T", vec![1.0, 2.0, 3.0, 4.0]);
        bc.update_coeffs(&EvalContext::new(&mesh, &time, &plain)).unwrap();
        assert_eq!(bc.value(), &[1.0, 2.0, 3.0, 4.0]);

        let with_grad = CellField::new("T", vec![1.0, 2.0, 3.0, 4.0])
            .with_gradients(vec![DVec3::new(3.0, -1.0, 2.0); 4])
            .unwrap();
        bc.update_coeffs(&EvalContext::new(&mesh, &time, &with_grad)).unwrap();
        assert_eq!(bc.value(), &[1.0, 2.0, 3.0, 4.0]);
    }
}

#[test]
fn taylor_green_at_start_matches_closed_form() {
    let centres = [
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(FRAC_PI_2, 0.0, 1.0),
        DVec3::new(0.3, 0.7, 1.0),
        DVec3::new(PI, FRAC_PI_2, 1.0),
    ];
    let (mesh, h) = flat_patch("top", &centres, 0.05);
    let config = BoundaryConfig::new(AnalyticVelocityBoundary::TYPE_NAME).with_taylor_green(
        TaylorGreenConfig {
            reference_velocity: 1.0,
            ..Default::default()
        },
    );
    let mut bc = BoundaryRegistry::vector()
        .build(&BuildContext::new(&mesh, h), &config)
        .unwrap();

    let field = CellField::uniform("U", 4, DVec3::ZERO);
    let time = SimTime::new(0.0);
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();

    // 默认特征长度 2π，k = 1
    for (c, u) in centres.iter().zip(bc.value()) {
        let expected = DVec3::new(-c.x.cos() * c.y.sin(), c.x.sin() * c.y.cos(), 0.0);
        assert!((*u - expected).length() < 1e-14, "{c:?}: {u:?} vs {expected:?}");
    }
    assert!(bc.value()[0].length() < 1e-15);
}

#[test]
fn analytic_value_decays_with_time() {
    let (mesh, h) = strip_mesh("top", 4, 0.1, 0.0);
    let config = BoundaryConfig::new(AnalyticVelocityBoundary::TYPE_NAME);
    let mut bc = AnalyticVelocityBoundary::new(&BuildContext::new(&mesh, h), &config).unwrap();
    let field = CellField::uniform("U", 4, DVec3::ZERO);

    let mut time = SimTime::new(0.0);
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();
    let start = bc.value().to_vec();

    time.advance(10.0);
    let ctx = EvalContext::new(&mesh, &time, &field);
    assert!(bc.needs_update(&ctx));
    bc.update_coeffs(&ctx).unwrap();

    // ν = 0.01, k = 1: F = exp(−0.2)
    let decay = (-0.2_f64).exp();
    for (a, b) in start.iter().zip(bc.value()) {
        assert!((*a * decay - *b).length() < 1e-12);
    }
}

#[test]
fn update_is_idempotent_until_inputs_change() {
    let (mut mesh, h) = strip_mesh("outlet", 4, 0.2, 0.5);
    let geom = mesh.patch(h).unwrap();
    let mut field = sample_scalar(geom, |x| x.x + 2.0 * x.z, |_| DVec3::new(1.0, 0.0, 2.0));
    let mut time = SimTime::new(0.0);

    let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME)
        .with_gradient(1.0)
        .with_corrections(true, true)
        .with_extrapolate_value(false);
    let mut bc = CorrectedGradientBoundary::new(&BuildContext::new(&mesh, h), &config).unwrap();

    {
        let ctx = EvalContext::new(&mesh, &time, &field);
        assert!(bc.needs_update(&ctx));
        bc.update_coeffs(&ctx).unwrap();
        let first = bc.value().to_vec();
        assert!(!bc.needs_update(&ctx));
        bc.update_coeffs(&ctx).unwrap();
        assert_eq!(bc.value(), first.as_slice());
    }

    // 内部场变化
    field.values_mut()[0] += 1.0;
    assert!(bc.needs_update(&EvalContext::new(&mesh, &time, &field)));
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();

    // 时间推进
    time.advance(0.1);
    assert!(bc.needs_update(&EvalContext::new(&mesh, &time, &field)));
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();

    // 拓扑重建
    let faces = common::raw_faces(mesh.patch(h).unwrap());
    mesh.replace_patch(h, &faces).unwrap();
    assert!(bc.needs_update(&EvalContext::new(&mesh, &time, &field)));
}

#[test]
fn evaluate_records_comms_and_always_recomputes() {
    let (mesh, h) = strip_mesh("outlet", 3, 0.2, 0.0);
    let geom = mesh.patch(h).unwrap();
    let field = sample_scalar(geom, |x| x.z, |_| DVec3::Z);
    let time = SimTime::new(0.0);
    let ctx = EvalContext::new(&mesh, &time, &field);

    let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME).with_gradient(1.0);
    let mut bc = BoundaryRegistry::scalar()
        .build(&BuildContext::new(&mesh, h), &config)
        .unwrap();
    assert_eq!(bc.last_comms(), None);

    bc.update_coeffs(&ctx).unwrap();
    bc.evaluate(&ctx, CommsMode::NonBlocking).unwrap();
    assert_eq!(bc.last_comms(), Some(CommsMode::NonBlocking));
    assert!(!bc.needs_update(&ctx));

    bc.evaluate(&ctx, CommsMode::default()).unwrap();
    assert_eq!(bc.last_comms(), Some(CommsMode::Blocking));
}

#[test]
fn corrected_gradient_split_is_neumann() {
    let (mesh, h) = strip_mesh("outlet", 3, 0.2, 0.4);
    let geom = mesh.patch(h).unwrap();
    let field = sample_scalar(geom, |x| x.x, |_| DVec3::X);
    let time = SimTime::new(0.0);
    let ctx = EvalContext::new(&mesh, &time, &field);

    let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME).with_gradient(-2.0);
    let mut bc = BoundaryRegistry::scalar()
        .build(&BuildContext::new(&mesh, h), &config)
        .unwrap();
    bc.update_coeffs(&ctx).unwrap();

    assert_eq!(bc.sn_grad(&ctx).unwrap(), vec![-2.0; 3]);
    assert_eq!(bc.gradient_internal_coeffs(&ctx).unwrap(), vec![0.0; 3]);
    assert_eq!(bc.orthogonal_boundary_coeffs(&ctx).unwrap(), vec![-2.0; 3]);
    assert_eq!(bc.gradient_boundary_coeffs(&ctx).unwrap(), vec![0.0; 3]);
}

#[test]
fn persisted_state_survives_json() {
    let (mesh, h) = strip_mesh("outlet", 4, 0.2, 0.3);
    let geom = mesh.patch(h).unwrap();
    let field = sample_scalar(geom, |x| x.x * x.z, |x| DVec3::new(x.z, 0.0, x.x));
    let time = SimTime::new(0.0);
    let ctx = EvalContext::new(&mesh, &time, &field);
    let registry = BoundaryRegistry::scalar();

    let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME)
        .with_gradient(0.5)
        .with_corrections(true, true);
    let mut bc = registry.build(&BuildContext::new(&mesh, h), &config).unwrap();
    bc.update_coeffs(&ctx).unwrap();

    let json = serde_json::to_string(&bc.write_state()).unwrap();
    assert!(json.contains("\"nonOrthogonalCorrections\":true"));
    assert!(json.contains("\"secondOrder\":true"));
    assert!(!json.contains("snGrad"));

    let state: PatchFieldState<f64> = serde_json::from_str(&json).unwrap();
    let mut restored = registry.restore(&BuildContext::new(&mesh, h), &state).unwrap();
    assert_eq!(restored.value(), bc.value());

    // 恢复后首次更新重新计算，结果与原实例一致
    assert!(restored.needs_update(&ctx));
    restored.update_coeffs(&ctx).unwrap();
    assert_eq!(restored.value(), bc.value());
}

#[test]
fn analytic_state_restores_profile() {
    let (mesh, h) = strip_mesh("top", 2, 0.1, 0.0);
    let registry = BoundaryRegistry::vector();
    let config = BoundaryConfig::new(AnalyticVelocityBoundary::TYPE_NAME).with_taylor_green(
        TaylorGreenConfig {
            reference_velocity: 2.5,
            kinematic_viscosity: 0.1,
            ..Default::default()
        },
    );
    let bc = registry.build(&BuildContext::new(&mesh, h), &config).unwrap();

    let json = serde_json::to_string_pretty(&bc.write_state()).unwrap();
    let state: PatchFieldState<DVec3> = serde_json::from_str(&json).unwrap();
    assert_eq!(state.taylor_green.map(|tg| tg.reference_velocity), Some(2.5));

    let restored = registry.restore(&BuildContext::new(&mesh, h), &state).unwrap();
    assert_eq!(restored.write_state(), bc.write_state());
}

#[test]
fn fresh_field_at_same_generation_is_picked_up() {
    let centres: Vec<DVec3> = (0..4).map(|i| DVec3::new(i as f64 * 0.1, 0.0, 1.0)).collect();
    let (mesh, h) = flat_patch("outlet", &centres, 0.1);
    let time = SimTime::new(0.0);
    let config = BoundaryConfig::new(CorrectedGradientBoundary::<f64>::TYPE_NAME)
        .with_gradient(0.0)
        .with_extrapolate_value(false);
    let mut bc = CorrectedGradientBoundary::new(&BuildContext::new(&mesh, h), &config).unwrap();

    let first = CellField::new("T", vec![1.0, 2.0, 3.0, 4.0]);
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &first)).unwrap();
    assert_eq!(bc.value(), &[1.0, 2.0, 3.0, 4.0]);

    let second = CellField::new("T", vec![10.0, 20.0, 30.0, 40.0]);
    assert_eq!(first.generation(), second.generation());
    let ctx = EvalContext::new(&mesh, &time, &second);
    assert!(bc.needs_update(&ctx));
    bc.update_coeffs(&ctx).unwrap();
    assert_eq!(bc.value(), &[10.0, 20.0, 30.0, 40.0]);

    // 克隆得到新实例，同样触发更新
    let copy = first.clone();
    assert!(bc.needs_update(&EvalContext::new(&mesh, &time, &copy)));
}

#[test]
fn fresh_time_at_same_index_is_picked_up() {
    let (mesh, h) = strip_mesh("top", 4, 0.1, 0.0);
    let config = BoundaryConfig::new(AnalyticVelocityBoundary::TYPE_NAME);
    let mut bc = AnalyticVelocityBoundary::new(&BuildContext::new(&mesh, h), &config).unwrap();
    let field = CellField::uniform("U", 4, DVec3::ZERO);

    let start = SimTime::new(0.0);
    bc.update_coeffs(&EvalContext::new(&mesh, &start, &field)).unwrap();
    let initial = bc.value().to_vec();

    let later = SimTime::new(50.0);
    assert_eq!(start.index(), later.index());
    bc.update_coeffs(&EvalContext::new(&mesh, &later, &field)).unwrap();

    // ν = 0.01, k = 1: F = exp(−1)
    let decay = (-1.0_f64).exp();
    for (a, b) in initial.iter().zip(bc.value()) {
        assert!(a.length() > 0.0);
        assert!((*a * decay - *b).length() < 1e-12);
    }
}

#[test]
fn other_mesh_with_same_handle_is_picked_up() {
    let (mesh, h) = strip_mesh("top", 4, 0.1, 0.0);
    let config = BoundaryConfig::new(AnalyticVelocityBoundary::TYPE_NAME);
    let mut bc = AnalyticVelocityBoundary::new(&BuildContext::new(&mesh, h), &config).unwrap();
    let field = CellField::uniform("U", 4, DVec3::ZERO);
    let time = SimTime::new(0.0);
    bc.update_coeffs(&EvalContext::new(&mesh, &time, &field)).unwrap();

    let mut spec = strip_spec("top", 4, 0.1, 0.0);
    spec.origin = DVec3::new(1.0, 0.5, 1.0);
    let mut moved = MeshGeometry::new();
    let moved_h = moved.add_patch("top", &PatchBuilder::plane(&spec).unwrap()).unwrap();
    assert_eq!(moved_h, h);
    assert_eq!(
        moved.patch(h).unwrap().topology_version(),
        mesh.patch(h).unwrap().topology_version()
    );

    let ctx = EvalContext::new(&moved, &time, &field);
    assert!(bc.needs_update(&ctx));
    bc.update_coeffs(&ctx).unwrap();

    let tg = TaylorGreenVortex::new("top", TaylorGreenConfig::default()).unwrap();
    let geom = moved.patch(h).unwrap();
    for (x, u) in geom.face_centres().iter().zip(bc.value()) {
        assert_eq!(*u, tg.velocity(0.0, *x));
    }
}
