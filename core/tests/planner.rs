use pigroute_core::{
    config::{FacilityConfig, FarmRecord, LoadLevel, SimConfig},
    event::SimEvent,
    farm::Farm,
    fleet::FleetSelector,
    planner::{DailyPlan, DailyPlanner},
    rng::SubsystemRng,
    types::round2,
    MemorySink, SimSession,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(id: &str, pigs: u32, mean: f64) -> FarmRecord {
    FarmRecord {
        farm_id:        id.into(),
        name:           format!("Granja {id}"),
        lat:            41.90,
        lon:            2.75,
        total_pigs:     pigs,
        mean_weight_kg: mean,
        std_weight_kg:  Some(0.0),
    }
}

fn planner_for(config: &SimConfig) -> DailyPlanner {
    DailyPlanner::new(
        config.facility.clone(),
        FleetSelector::new(&config.trucks),
        config.tuning.clone(),
    )
}

fn farms_of(config: &SimConfig) -> Vec<Farm> {
    config.farms.iter().map(|r| Farm::from_record(r, 0.05)).collect()
}

fn seven_small_farms() -> SimConfig {
    let farms = (1..=7).map(|i| record(&format!("F{i:03}"), 40, 110.0)).collect();
    SimConfig { farms, ..SimConfig::default_test() }
}

#[test]
fn routes_account_for_every_processed_animal() {
    init_logging();
    let config = seven_small_farms();
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(11, 0);

    let plan = planner.plan(&mut farms, 1, &mut rng);

    assert_eq!(plan.routes.len(), 3);
    let stops: Vec<usize> = plan.routes.iter().map(|r| r.stops.len()).collect();
    assert_eq!(stops, vec![3, 3, 1]);
    assert_eq!(plan.summary.pigs_processed, plan.pigs_planned());
    assert_eq!(plan.summary.pigs_processed, 280);
    assert_eq!(plan.summary.trucks_used, 3);
    assert!(farms.iter().all(|f| f.inventory() == 0));
}

#[test]
fn summary_figures_are_rounded_route_totals() {
    init_logging();
    let config = seven_small_farms();
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(11, 0);

    let plan = planner.plan(&mut farms, 1, &mut rng);
    let revenue: f64 = plan.routes.iter().map(|r| r.revenue).sum();
    let variable: f64 = plan.routes.iter().map(|r| r.variable_cost).sum();
    let fixed: f64 = plan.routes.iter().map(|r| r.truck.weekly_fixed_cost / 5.0).sum();

    assert_eq!(plan.summary.net_revenue, round2(revenue));
    assert_eq!(plan.summary.variable_transport_cost, round2(variable));
    assert_eq!(plan.summary.fixed_cost, round2(fixed));
    assert_eq!(plan.summary.net_profit, round2(revenue - variable - fixed));
}

#[test]
fn last_route_may_overshoot_capacity() {
    init_logging();
    let config = SimConfig {
        farms: (1..=4).map(|i| record(&format!("F{i:03}"), 60, 110.0)).collect(),
        facility: FacilityConfig { daily_capacity_max: 100, ..FacilityConfig::default() },
        ..SimConfig::default_test()
    };
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(2, 0);

    let plan = planner.plan(&mut farms, 1, &mut rng);

    assert_eq!(plan.routes.len(), 1);
    assert_eq!(plan.summary.pigs_processed, 180);
    assert_eq!(farms[3].inventory(), 60, "no route starts once capacity is reached");

    let metrics = planner.facility_metrics(&plan);
    assert_eq!(metrics.capacity_utilization, 1.8);
}

#[test]
fn empty_farms_never_enter_the_pool() {
    init_logging();
    let config = SimConfig {
        farms: vec![record("F001", 0, 120.0), record("F002", 30, 100.0)],
        ..SimConfig::default_test()
    };
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(2, 0);

    let plan = planner.plan(&mut farms, 1, &mut rng);
    assert_eq!(plan.routes.len(), 1);
    assert_eq!(plan.routes[0].stops[0].farm_id, "F002");
    assert_eq!(farms[0].last_visit_day, pigroute_core::farm::NEVER_VISITED);
}

#[test]
fn visited_farms_cool_down_for_a_week() {
    init_logging();
    let config = SimConfig {
        farms: vec![record("F001", 500, 110.0)],
        ..SimConfig::default_test()
    };
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(2, 0);

    let plan = planner.plan(&mut farms, 1, &mut rng);
    assert_eq!(plan.summary.pigs_processed, 181, "floor(20000 / 110)");
    assert_eq!(farms[0].last_visit_day, 1);

    assert!(planner.eligible_pool(&farms, 7).is_empty());
    assert_eq!(planner.eligible_pool(&farms, 8).len(), 1);

    let idle = planner.plan(&mut farms, 4, &mut rng);
    assert!(idle.routes.is_empty());
    assert_eq!(idle.summary.pigs_processed, 0);
    assert_eq!(idle.summary.net_profit, 0.0);
}

#[test]
fn day_metrics_describe_the_plan() {
    init_logging();
    let config = seven_small_farms();
    let planner = planner_for(&config);
    let mut farms = farms_of(&config);
    let mut rng = SubsystemRng::new(11, 0);
    let plan = planner.plan(&mut farms, 1, &mut rng);

    let facility = planner.facility_metrics(&plan);
    assert_eq!(facility.pigs_delivered, 280);
    assert_eq!(facility.live_weight_total, 30_800.0);
    assert_eq!(facility.carcass_weight_total, 23_100.0);
    assert_eq!(facility.avg_live_weight, 110.0);
    assert_eq!(facility.avg_carcass_weight, 82.5);
    assert_eq!(facility.capacity_utilization, round2(280.0 / 1800.0));

    let trucks = planner.truck_metrics(&plan);
    assert_eq!(trucks.len(), 3);
    assert_eq!(trucks[0].truck_id, DailyPlan::truck_label(1, &plan.routes[0]));
    assert_eq!(trucks[0].truck_id, "T1-TR-S2");
    assert_eq!(trucks[2].truck_id, "T3-TR-S1");
    assert_eq!(trucks[0].farms_visited, 3);
    assert_eq!(trucks[2].num_pigs, 40);
}

#[test]
fn single_farm_day_without_truck_catalog() {
    init_logging();
    let config = SimConfig {
        farms: vec![FarmRecord {
            farm_id:        "F001".into(),
            name:           "Mas Únic".into(),
            lat:            42.05,
            lon:            2.85,
            total_pigs:     1000,
            mean_weight_kg: 100.0,
            std_weight_kg:  Some(5.0),
        }],
        trucks: Vec::new(),
        ..SimConfig::default_test()
    };
    let mut session = SimSession::create(config, 2024).unwrap();
    let sink = MemorySink::new();

    let report = session.step(&sink).unwrap();

    assert_eq!(report.summary.trucks_used, 1);
    assert!(report.summary.pigs_processed <= 200);
    assert!(report.summary.pigs_processed > 0);
    assert_eq!(session.farms()[0].inventory(), 1000 - report.summary.pigs_processed);

    let events = sink.events();
    let arrivals: Vec<&SimEvent> = events
        .iter()
        .filter(|e| matches!(e, SimEvent::TruckArrived { .. }))
        .collect();
    assert_eq!(arrivals.len(), 1);
    match arrivals[0] {
        SimEvent::TruckArrived { truck_id, pigs_delivered, .. } => {
            assert_eq!(truck_id, "T1-Generic");
            assert_eq!(*pigs_delivered, report.summary.pigs_processed);
        }
        _ => unreachable!(),
    }
}

#[test]
fn facility_load_follows_target_within_operating_range() {
    let mut facility = FacilityConfig {
        daily_capacity_min: 600,
        daily_capacity_max: 1800,
        ..FacilityConfig::default()
    };
    assert_eq!(facility.operating_load(), None, "no target, no indicator");

    facility.target_daily = Some(1200);
    let load = facility.operating_load().unwrap();
    assert_eq!(load.percent, 50.0);
    assert_eq!(load.level, LoadLevel::Low);

    facility.target_daily = Some(1400);
    assert_eq!(facility.operating_load().unwrap().level, LoadLevel::Moderate);

    facility.target_daily = Some(1680);
    let load = facility.operating_load().unwrap();
    assert_eq!(load.percent, 90.0);
    assert_eq!(load.level, LoadLevel::High);

    facility.daily_capacity_min = 1800;
    assert_eq!(facility.operating_load(), None, "empty operating range");
}

#[test]
fn day_start_reports_facility_load() {
    init_logging();
    let mut config = SimConfig::default_test();
    config.facility.daily_capacity_min = 600;
    config.facility.target_daily = Some(1400);
    let mut session = SimSession::create(config, 4).unwrap();
    let sink = MemorySink::new();
    session.step(&sink).unwrap();

    match &sink.events()[0] {
        SimEvent::InitFarms { facility_load: Some(load), .. } => {
            assert_eq!(load.percent, round2(100.0 * 800.0 / 1200.0));
            assert_eq!(load.level, LoadLevel::Moderate);
        }
        other => panic!("expected a day-start snapshot with load, got {other:?}"),
    }

    let line = serde_json::to_string(&sink.events()[0]).unwrap();
    assert!(line.contains(r#""level":"moderate""#));
}
