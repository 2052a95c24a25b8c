use pigroute_core::{
    config::FacilityConfig,
    pricing::{PenaltySchedule, PricingEngine, NEAR_MISS_RATE, OUT_OF_RANGE_RATE},
};

fn engine() -> PricingEngine {
    PricingEngine::new(1.56, PenaltySchedule::default())
}

#[test]
fn band_edges_are_half_open() {
    let s = PenaltySchedule::default();

    assert_eq!(s.rate_for(99.99), OUT_OF_RANGE_RATE);
    assert_eq!(s.rate_for(100.0), NEAR_MISS_RATE);
    assert_eq!(s.rate_for(104.99), NEAR_MISS_RATE);
    assert_eq!(s.rate_for(105.0), 0.0);
    assert_eq!(s.rate_for(110.0), 0.0);
    assert_eq!(s.rate_for(115.0), 0.0);
    assert_eq!(s.rate_for(115.01), NEAR_MISS_RATE);
    assert_eq!(s.rate_for(120.0), NEAR_MISS_RATE);
    assert_eq!(s.rate_for(120.01), OUT_OF_RANGE_RATE);
}

#[test]
fn revenue_is_net_of_penalties() {
    let p = engine().price(&[110.0, 102.0, 125.0]);

    let gross = (110.0 + 102.0 + 125.0) * 1.56;
    let penalty = 102.0 * 1.56 * 0.15 + 125.0 * 1.56 * 0.20;
    assert!((p.penalty_total - penalty).abs() < 1e-9);
    assert!((p.revenue - (gross - penalty)).abs() < 1e-9);
    assert!((p.penalty_ratio - penalty / (gross - penalty)).abs() < 1e-12);
}

#[test]
fn in_band_load_has_no_penalty() {
    let p = engine().price(&[105.0, 110.0, 115.0]);
    assert_eq!(p.penalty_total, 0.0);
    assert_eq!(p.penalty_ratio, 0.0);
    assert!((p.revenue - 330.0 * 1.56).abs() < 1e-9);
}

#[test]
fn empty_or_weightless_loads_have_zero_ratio() {
    let empty = engine().price(&[]);
    assert_eq!(empty.revenue, 0.0);
    assert_eq!(empty.penalty_ratio, 0.0);

    let zeros = engine().price(&[0.0, 0.0]);
    assert_eq!(zeros.revenue, 0.0);
    assert_eq!(zeros.penalty_ratio, 0.0);
}

#[test]
fn facility_config_maps_onto_schedule() {
    let facility = FacilityConfig {
        penalty_15_range: [90.0, 95.0, 125.0, 130.0],
        penalty_20_below: 90.0,
        penalty_20_above: 130.0,
        ..FacilityConfig::default()
    };
    let s = facility.penalty_schedule();

    assert_eq!(s.target_band(), (95.0, 125.0));
    assert_eq!(s.rate_for(92.0), NEAR_MISS_RATE);
    assert_eq!(s.rate_for(120.0), 0.0);
    assert_eq!(s.rate_for(131.0), OUT_OF_RANGE_RATE);
}
