//! Integration tests for the controller with a recording fabric
//!
//! These tests drive the dispatcher the way the fabric would and then check
//! which rules and packet-outs the fabric was asked for.

use sdn_controller::{
    ControlPlaneDispatcher, ControllerEvent, DispatcherConfig, GateConfig, PacketIn, RouteOutcome,
    Verdict,
};
use sdn_fabric::{FlowMatch, FlowRule, RecordingFabric};
use sdn_types::{MacAddress, PortNo, SwitchId};
use std::sync::Arc;

fn h1() -> MacAddress {
    "02:00:00:00:00:01".parse().unwrap()
}

fn h2() -> MacAddress {
    "02:00:00:00:00:02".parse().unwrap()
}

fn s(id: u64) -> SwitchId {
    SwitchId::new(id)
}

fn p(n: u32) -> PortNo {
    PortNo::new(n)
}

fn controller(config: DispatcherConfig) -> (ControlPlaneDispatcher, Arc<RecordingFabric>) {
    let fabric = Arc::new(RecordingFabric::new());
    let dispatcher = ControlPlaneDispatcher::new(config, fabric.clone());
    (dispatcher, fabric)
}

/// S1, S2, S3 in a line; S1 -1-> S2 -2-> S3.
fn three_switch_fabric(dispatcher: &ControlPlaneDispatcher) {
    for id in 1..=3 {
        dispatcher.dispatch(ControllerEvent::SwitchJoin { switch: s(id) });
    }
    dispatcher.dispatch(ControllerEvent::LinkDiscovered {
        src: s(1),
        dst: s(2),
        port: p(1),
    });
    dispatcher.dispatch(ControllerEvent::LinkDiscovered {
        src: s(2),
        dst: s(3),
        port: p(2),
    });
}

/// Quorum of one vote regardless of how many switches are up.
fn single_vote_quorum() -> DispatcherConfig {
    DispatcherConfig {
        gate: GateConfig {
            required_votes_percentage: 0,
            tally_ttl: None,
        },
        ..DispatcherConfig::default()
    }
}

mod path_installation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_end_to_end_three_switches() {
        let (controller, fabric) = controller(single_vote_quorum());
        three_switch_fabric(&controller);

        // h2 announces itself behind S3 port 7, h1 behind S1 port 5
        controller.on_packet_arrival(&PacketIn::new(h2(), h1(), s(3), p(7)).with_transaction_id(1));
        fabric.clear();

        let outcome = controller.on_packet_arrival(
            &PacketIn::new(h1(), h2(), s(1), p(5))
                .with_transaction_id(2)
                .with_vote(1),
        );

        assert_eq!(outcome.verdict, Some(Verdict::Allow));
        assert_eq!(outcome.route, RouteOutcome::Installed { rules: 2, skipped: 0 });

        let flow = FlowMatch::new(h1(), h2());
        assert_eq!(
            fabric.installed_rules(),
            vec![
                FlowRule::new(s(1), flow, p(1)),
                FlowRule::new(s(2), flow, p(2)),
            ]
        );
        assert_eq!(fabric.forwarded().len(), 1);
        assert_eq!(fabric.forwarded()[0].0, s(1));
    }

    #[test]
    fn test_rules_installed_even_when_dropped() {
        let (controller, fabric) = controller(single_vote_quorum());
        three_switch_fabric(&controller);
        controller.hosts().learn(h2(), s(3), p(7));
        fabric.clear();

        let outcome = controller.on_packet_arrival(
            &PacketIn::new(h1(), h2(), s(1), p(5))
                .with_transaction_id(3)
                .with_vote(2),
        );

        assert_eq!(outcome.verdict, Some(Verdict::Drop));
        assert_eq!(fabric.installed_rules().len(), 2);
        assert!(fabric.forwarded().is_empty());
    }

    #[test]
    fn test_switch_leave_breaks_path() {
        let (controller, fabric) = controller(single_vote_quorum());
        three_switch_fabric(&controller);
        controller.hosts().learn(h2(), s(3), p(7));
        controller.dispatch(ControllerEvent::SwitchLeave { switch: s(2) });
        fabric.clear();

        let outcome = controller.on_packet_arrival(
            &PacketIn::new(h1(), h2(), s(1), p(5))
                .with_transaction_id(4)
                .with_vote(1),
        );

        assert_eq!(outcome.route, RouteOutcome::NoPath);
        assert!(fabric.installed_rules().is_empty());
        // Admission is independent of routing
        assert_eq!(fabric.forwarded().len(), 1);
    }
}

mod consensus {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_majority_of_switches_decides() {
        // 51% of 4 switches is 2 votes
        let (controller, fabric) = controller(DispatcherConfig::default());
        for id in 1..=4 {
            controller.on_switch_join(s(id));
        }
        fabric.clear();
        let packet = PacketIn::new(h1(), h2(), s(1), p(5)).with_transaction_id(10);

        let first = controller.on_packet_arrival(&packet.clone().with_vote(1));
        assert_eq!(first.verdict, None);
        assert!(fabric.forwarded().is_empty());

        let second = controller.on_packet_arrival(&packet.clone().with_vote(2));
        assert_eq!(second.verdict, Some(Verdict::Drop));
        assert!(fabric.forwarded().is_empty());

        // Fresh cycle for the same identity
        assert_eq!(controller.on_packet_arrival(&packet.clone().with_vote(1)).verdict, None);
        assert_eq!(
            controller.on_packet_arrival(&packet.with_vote(1)).verdict,
            Some(Verdict::Allow)
        );
        assert_eq!(fabric.forwarded().len(), 1);
    }

    #[test]
    fn test_payload_identity_without_transaction_id() {
        let (controller, _) = controller(DispatcherConfig {
            gate: GateConfig {
                required_votes_percentage: 100,
                tally_ttl: None,
            },
            ..DispatcherConfig::default()
        });
        controller.on_switch_join(s(1));
        controller.on_switch_join(s(2));

        let frame = vec![0xde, 0xad, 0xbe, 0xef];
        let from_s1 = PacketIn::new(h1(), h2(), s(1), p(5)).with_payload(frame.clone()).with_vote(1);
        let from_s2 = PacketIn::new(h1(), h2(), s(2), p(3)).with_payload(frame).with_vote(1);

        assert_eq!(controller.on_packet_arrival(&from_s1).verdict, None);
        assert_eq!(controller.on_packet_arrival(&from_s2).verdict, Some(Verdict::Allow));
    }

    #[test]
    fn test_concurrent_packet_arrivals() {
        let (controller, fabric) = controller(DispatcherConfig {
            gate: GateConfig {
                required_votes_percentage: 100,
                tally_ttl: None,
            },
            ..DispatcherConfig::default()
        });
        let controller = Arc::new(controller);
        for id in 1..=4 {
            controller.on_switch_join(s(id));
        }

        let handles: Vec<_> = (1..=4u64)
            .map(|switch| {
                let controller = Arc::clone(&controller);
                std::thread::spawn(move || {
                    for xid in 0..50u64 {
                        controller.on_packet_arrival(
                            &PacketIn::new(h1(), h2(), s(switch), p(1))
                                .with_transaction_id(xid)
                                .with_vote(1),
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Each of the 50 identities got exactly four votes and one verdict
        assert_eq!(fabric.forwarded().len(), 50);
        assert_eq!(controller.stats().snapshot().verdicts_allow, 50);
        assert_eq!(controller.gate().map(|g| g.pending()), Some(0));
    }
}

mod eviction {
    use super::*;
    use pretty_assertions::assert_eq;
    use sdn_controller::{HostLocation, PacketIdentity, Vote};
    use std::time::{Duration, Instant};

    #[test]
    fn test_stale_state_evicted_against_explicit_clock() {
        let (controller, _) = controller(DispatcherConfig {
            gate: GateConfig {
                required_votes_percentage: 100,
                tally_ttl: Some(Duration::from_secs(30)),
            },
            host_idle_timeout: Some(Duration::from_secs(60)),
            ..DispatcherConfig::default()
        });
        controller.on_switch_join(s(1));
        controller.on_switch_join(s(2));

        let start = Instant::now();
        let gate = controller.gate().unwrap();
        assert_eq!(gate.submit_vote_at(PacketIdentity::new(1), Vote::Allow, start), None);
        assert_eq!(
            gate.submit_vote_at(PacketIdentity::new(2), Vote::Allow, start + Duration::from_secs(50)),
            None
        );
        controller.hosts().learn_at(h1(), HostLocation::new(s(1), p(5)), start);
        controller
            .hosts()
            .learn_at(h2(), HostLocation::new(s(2), p(7)), start + Duration::from_secs(50));

        let report = controller.evict_expired_at(start + Duration::from_secs(70));
        assert_eq!((report.tallies, report.hosts), (1, 1));
        assert_eq!(gate.pending_votes(&PacketIdentity::new(2)), 1);
        assert_eq!(controller.hosts().locate(&h2()), Some(HostLocation::new(s(2), p(7))));
    }
}

mod replay {
    use super::*;
    use pretty_assertions::assert_eq;
    use sdn_controller::source::feed_json_lines;
    use sdn_controller::{ControllerDaemon, ControllerDaemonConfig, StopReason};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    const RECORDING: &str = r#"# three switches in a line
{"event":"switch_join","switch":1}
{"event":"switch_join","switch":2}
{"event":"switch_join","switch":3}
{"event":"link_discovered","src":1,"dst":2,"port":1}
{"event":"link_discovered","src":2,"dst":3,"port":2}
{"event":"packet_in","transaction_id":1,"src":"02:00:00:00:00:02","dst":"02:00:00:00:00:01","switch":3,"in_port":7,"vote":1}
{"event":"packet_in","transaction_id":1,"src":"02:00:00:00:00:02","dst":"02:00:00:00:00:01","switch":3,"in_port":7,"vote":1}
{"event":"packet_in","transaction_id":2,"src":"02:00:00:00:00:01","dst":"02:00:00:00:00:02","switch":1,"in_port":5,"vote":1}
{"event":"flow_removed","switch":1,"reason":"idle_timeout","priority":1}
"#;

    #[tokio::test]
    async fn test_replay_through_daemon() {
        let fabric = Arc::new(RecordingFabric::new());
        let dispatcher = Arc::new(ControlPlaneDispatcher::new(
            DispatcherConfig {
                gate: GateConfig {
                    required_votes_percentage: 51,
                    tally_ttl: None,
                },
                ..DispatcherConfig::default()
            },
            fabric.clone(),
        ));
        let (tx, rx) = mpsc::channel(4);
        let daemon = ControllerDaemon::new(
            ControllerDaemonConfig::default(),
            Arc::clone(&dispatcher),
            rx,
            CancellationToken::new(),
        );

        let daemon = tokio::spawn(daemon.run());
        let source = feed_json_lines(RECORDING.as_bytes(), tx).await.unwrap();
        let report = daemon.await.unwrap();

        assert_eq!(source.events, 9);
        assert_eq!(report.reason, StopReason::SourceClosed);
        assert_eq!(report.events_handled, 9);

        assert_eq!(fabric.gateway_installs(), vec![s(1), s(2), s(3)]);
        // Quorum 1 of 3: transaction 1 is decided twice, transaction 2 once
        assert_eq!(report.stats.verdicts_allow, 3);
        assert_eq!(report.stats.flows_removed, 1);
        assert_eq!(
            fabric.rules_on(s(2)),
            vec![FlowRule::new(s(2), FlowMatch::new(h1(), h2()), p(2))]
        );
    }
}
