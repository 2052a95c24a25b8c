use pigroute_core::{
    config::{SimConfig, TruckRecord},
    fleet::{FleetSelector, TruckProfile},
};

fn truck(id: &str, class: &str, tons: f64) -> TruckRecord {
    TruckRecord {
        transport_id:      id.into(),
        class:             class.into(),
        capacity_tons:     tons,
        cost_per_km:       1.0,
        weekly_fixed_cost: 1000.0,
    }
}

#[test]
fn picks_smallest_truck_that_fits() {
    let fleet = FleetSelector::new(&SimConfig::default_test().trucks);

    assert_eq!(fleet.select(8_000.0).id, "TR-S1");
    assert_eq!(fleet.select(10_000.0).id, "TR-S1", "exact fit counts");
    assert_eq!(fleet.select(10_000.5).id, "TR-S2");
    assert_eq!(fleet.select(25_000.0).id, "TR-L1");
}

#[test]
fn overload_falls_back_to_largest() {
    let fleet = FleetSelector::new(&SimConfig::default_test().trucks);
    let chosen = fleet.select(45_000.0);
    assert_eq!(chosen.id, "TR-L1");
    assert_eq!(chosen.capacity_kg, 30_000.0);
}

#[test]
fn ties_go_to_catalog_order() {
    let fleet = FleetSelector::new(&[
        truck("A", "normal", 20.0),
        truck("B", "normal", 20.0),
        truck("C", "large", 10.0),
        truck("D", "large", 10.0),
    ]);

    assert_eq!(fleet.select(15_000.0).id, "A");
    assert_eq!(fleet.select(5_000.0).id, "C");
    assert_eq!(fleet.select(99_000.0).id, "A");
}

#[test]
fn empty_catalog_yields_generic_truck() {
    let fleet = FleetSelector::new(&[]);
    let chosen = fleet.select(12_000.0);
    assert_eq!(chosen, TruckProfile::generic());
    assert_eq!(chosen.id, "Generic");
    assert_eq!(chosen.capacity_kg, 20_000.0);
    assert_eq!(chosen.cost_per_km, 1.25);
    assert_eq!(chosen.weekly_fixed_cost, 2000.0);
}

#[test]
fn wave_size_counts_standard_trucks() {
    let fleet = FleetSelector::new(&SimConfig::default_test().trucks);
    assert_eq!(fleet.standard_count(), 2);
    assert_eq!(fleet.wave_size(3), 2);

    let specialised = FleetSelector::new(&[truck("R1", "refrigerated", 25.0)]);
    assert_eq!(specialised.wave_size(3), 3);

    assert_eq!(FleetSelector::new(&[]).wave_size(3), 3);
}
