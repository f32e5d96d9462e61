use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use u_cpm::history::{ChainConfig, VersionChain, VersionState};
use u_cpm::models::{Activity, ActivityId, ActivityNetwork, NetworkId, NetworkRecord};
use u_cpm::scheduler::sequencer::is_topologically_ordered;
use u_cpm::scheduler::ScheduleKpi;
use u_cpm::CpmError;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// Longest source→sink path by exhaustive enumeration.
fn brute_force_longest(net: &ActivityNetwork) -> f64 {
    fn longest_ending_at(net: &ActivityNetwork, id: ActivityId) -> f64 {
        let act = net.activity(id).expect("activity exists");
        let best_pred = act
            .dependencies()
            .iter()
            .map(|&d| longest_ending_at(net, d))
            .fold(0.0, f64::max);
        best_pred + act.expected_duration()
    }
    net.ids()
        .into_iter()
        .map(|id| longest_ending_at(net, id))
        .fold(0.0, f64::max)
}

fn random_network(rng: &mut StdRng, size: u64) -> ActivityNetwork {
    let mut net = ActivityNetwork::new(NetworkId(1), "Random");
    for id in 1..=size {
        let opt = rng.random_range(1.0..5.0);
        let norm = opt + rng.random_range(0.0..3.0);
        let pess = norm + rng.random_range(0.0..6.0);
        let deps: Vec<ActivityId> = (1..id).filter(|_| rng.random_bool(0.3)).collect();
        let act = Activity::with_dependencies(id, format!("T{id}"), "", opt, norm, pess, deps)
            .expect("valid activity");
        net.insert(act).expect("insert succeeds");
    }
    net
}

#[test]
fn test_diamond_scenario() {
    let mut net = ActivityNetwork::new(NetworkId(9), "Scenario");
    net.insert(Activity::new(1, "A", "", 4.0, 4.0, 4.0).unwrap()).unwrap();
    net.insert(Activity::with_dependencies(2, "B", "", 2.0, 2.0, 2.0, [1]).unwrap())
        .unwrap();
    net.insert(Activity::with_dependencies(3, "C", "", 6.0, 6.0, 6.0, [1]).unwrap())
        .unwrap();
    net.insert(Activity::with_dependencies(4, "D", "", 1.0, 1.0, 1.0, [2, 3]).unwrap())
        .unwrap();

    let ids = net.ids();
    assert_eq!(ids[0], 1);
    assert_eq!(ids[3], 4);
    assert_eq!(net.critical_path(), vec![1, 3, 4]);
    assert_eq!(net.critical_path_length(), 11.0);
    assert!(net.total_slack(2).unwrap() > 0.0);
    assert_eq!(net.total_slack(1).unwrap(), 0.0);
    assert_eq!(net.total_slack(3).unwrap(), 0.0);
    assert_eq!(net.total_slack(4).unwrap(), 0.0);

    let kpi = ScheduleKpi::calculate(&net);
    assert_eq!(kpi.critical_count, 3);
}

#[test]
fn test_random_networks_hold_cpm_properties() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let size = rng.random_range(1..12);
        let mut net = random_network(&mut rng, size);

        // Random rewiring; cycles must be rejected without damage.
        for _ in 0..10 {
            let target = rng.random_range(1..=size);
            let deps: Vec<ActivityId> = (1..=size)
                .filter(|&d| d != target && rng.random_bool(0.2))
                .collect();
            let before = net.clone();
            match net.set_dependencies(target, deps) {
                Ok(()) => {}
                Err(CpmError::CyclicDependency { .. }) => assert_eq!(net, before),
                Err(other) => panic!("unexpected error: {other}"),
            }
            assert!(is_topologically_ordered(net.activities()));
        }

        let schedule = net.schedule();
        assert!(close(schedule.critical_path_length(), brute_force_longest(&net)));

        let path_sum: f64 = schedule
            .critical_path()
            .iter()
            .map(|&id| net.activity(id).unwrap().expected_duration())
            .sum();
        assert!(close(path_sum, schedule.critical_path_length()));

        for &id in schedule.critical_path() {
            assert!(close(net.total_slack(id).unwrap(), 0.0));
        }
        for t in schedule.timings() {
            assert!(close(t.total_slack, t.latest_finish - t.earliest_finish));
            assert!(close(t.total_slack, t.latest_start - t.earliest_start));
            assert!(t.total_slack > -1e-6);
            assert!(t.free_slack > -1e-6);
        }
    }
}

#[test]
fn test_first_network_evicted_at_default_cap() {
    let mut chain = VersionChain::with_config(ChainConfig::default());
    let first = chain.create("P");
    for i in 0..150 {
        chain.create(format!("P{i}"));
    }

    assert_eq!(chain.len(), 150);
    assert!(chain.retrieve(first).is_none());
    assert!(chain.retrieve_timestamp(first).is_none());
    assert_eq!(chain.state(first), VersionState::Absent);
}

#[test]
fn test_chain_bound_keeps_newest() {
    let cap = 10;
    let mut chain = VersionChain::with_config(ChainConfig::default().with_max_chain_length(cap));
    let ids: Vec<NetworkId> = (0..25).map(|i| chain.create(format!("N{i}"))).collect();

    assert_eq!(chain.len(), cap);
    let oldest = chain.entries().next().unwrap().network().id();
    assert_eq!(oldest, ids[25 - cap]);
    assert!(ids[..25 - cap].iter().all(|&id| chain.retrieve(id).is_none()));
}

#[test]
fn test_edit_undo_redo_through_chain() {
    let mut chain = VersionChain::new();
    let id = chain.create("Plane");

    let mut net = chain.retrieve(id).unwrap();
    net.insert(Activity::new(1, "Wings", "Wings are working", 5.0, 10.0, 15.0).unwrap())
        .unwrap();
    chain.modify(net.clone()).unwrap();
    let before = chain.retrieve(id).unwrap();

    net.insert(Activity::with_dependencies(2, "Body", "", 2.0, 4.0, 6.0, [1]).unwrap())
        .unwrap();
    net.set_deadline(20.0).unwrap();
    chain.modify(net.clone()).unwrap();

    chain.undo(id).unwrap();
    assert_eq!(chain.retrieve(id).unwrap(), before);
    assert_eq!(chain.state(id), VersionState::Active);

    chain.redo(id).unwrap();
    let restored = chain.retrieve(id).unwrap();
    assert_eq!(restored, net);
    assert_eq!(restored.critical_path(), vec![1, 2]);
    assert_eq!(restored.latest_finish(2).unwrap(), 20.0);
}

#[test]
fn test_record_round_trip_through_json() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut net = random_network(&mut rng, 8);
    net.set_deadline(net.critical_path_length() + 5.0).unwrap();

    let json = serde_json::to_string(&net.to_record()).unwrap();
    let record: NetworkRecord = serde_json::from_str(&json).unwrap();
    let restored = ActivityNetwork::from_record(&record).unwrap();

    assert_eq!(restored, net);
    assert_eq!(restored.schedule(), net.schedule());
}

#[test]
fn test_public_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ActivityNetwork>();
    assert_send_sync::<VersionChain>();
    assert_send_sync::<CpmError>();
}
