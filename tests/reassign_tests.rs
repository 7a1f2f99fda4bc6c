//! Manual reassignment tests
//!
//! Single and bulk moves on routes produced by the solver or built by hand.

mod fixtures;

use territory_planner::config::{Frequency, PlanConfig, PlannerOptions};
use territory_planner::error::Error;
use territory_planner::model::{Route, RouteStatus, Stop, StopId, TargetBand};
use territory_planner::reassign::{
    BulkReassignRequest, ReassignRequest, RouteTarget, reassign_bulk, reassign_stop,
};
use territory_planner::sequence::sequence;
use territory_planner::solver::solve;
use territory_planner::validate::audit_routes;

use fixtures::{MIRAFLORES, stops_from};

// ============================================================================
// Helpers
// ============================================================================

fn route(id: u32, stops: Vec<Stop>) -> Route {
    Route::new(id, sequence(stops))
}

fn two_routes() -> Vec<Route> {
    let stops = stops_from(MIRAFLORES, 1, "ANA");
    vec![route(1, stops[0..5].to_vec()), route(2, stops[5..6].to_vec())]
}

fn band() -> TargetBand {
    TargetBand::for_routes(6, 2, 0.2)
}

fn orders(route: &Route) -> Vec<u32> {
    route.stops.iter().filter_map(|s| s.order).collect()
}

// ============================================================================
// Single Stop
// ============================================================================

#[test]
fn test_move_from_five_to_one() {
    let request = ReassignRequest {
        group: "ANA".into(),
        stop_id: StopId::Number(3),
        from_route: 1,
        to_route: RouteTarget::Existing(2),
        band: band(),
        routes: two_routes(),
    };

    let outcome = reassign_stop(request, &PlannerOptions::default()).unwrap();
    assert_eq!(outcome.group, "ANA");

    let (source, dest) = (&outcome.routes[0], &outcome.routes[1]);
    assert_eq!(source.total_stops, 4);
    assert_eq!(dest.total_stops, 2);
    assert_eq!(orders(source), vec![1, 2, 3, 4]);
    assert_eq!(orders(dest), vec![1, 2]);
    assert!(dest.contains(&StopId::Number(3)));
    assert!(!source.contains(&StopId::Number(3)));
    assert!(source.manually_edited && dest.manually_edited);
}

#[test]
fn test_string_id_matches_numeric_stop() {
    let request = ReassignRequest {
        group: "ANA".into(),
        stop_id: StopId::from("4"),
        from_route: 1,
        to_route: RouteTarget::Existing(2),
        band: band(),
        routes: two_routes(),
    };

    let outcome = reassign_stop(request, &PlannerOptions::default()).unwrap();
    assert!(outcome.routes[1].contains(&StopId::Number(4)));
}

#[test]
fn test_unknown_route_or_stop_is_not_found() {
    let missing_route = ReassignRequest {
        group: "ANA".into(),
        stop_id: StopId::Number(3),
        from_route: 1,
        to_route: RouteTarget::Existing(9),
        band: band(),
        routes: two_routes(),
    };
    assert!(matches!(
        reassign_stop(missing_route, &PlannerOptions::default()),
        Err(Error::NotFound(_))
    ));

    let missing_stop = ReassignRequest {
        group: "ANA".into(),
        stop_id: StopId::Number(6),
        from_route: 1,
        to_route: RouteTarget::Existing(2),
        band: band(),
        routes: two_routes(),
    };
    assert!(matches!(
        reassign_stop(missing_stop, &PlannerOptions::default()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_request_deserializes_from_wire_format() {
    let routes = serde_json::to_value(two_routes()).unwrap();
    let band = serde_json::to_value(band()).unwrap();
    let body = serde_json::json!({
        "group": "ANA",
        "stop_id": "2",
        "from_route": 1,
        "to_route": -1,
        "band": band,
        "routes": routes,
    });

    let request: ReassignRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.to_route, RouteTarget::CreateNew);

    let outcome = reassign_stop(request, &PlannerOptions::default()).unwrap();
    assert_eq!(outcome.routes.len(), 3);
    assert_eq!(outcome.routes[2].id, 3);
    assert_eq!(outcome.routes[2].total_stops, 1);
}

// ============================================================================
// Bulk
// ============================================================================

#[test]
fn test_bulk_into_new_route() {
    let request = BulkReassignRequest {
        group: "ANA".into(),
        stop_ids: vec![StopId::Number(1), StopId::Number(2), StopId::Number(6)],
        to_route: RouteTarget::CreateNew,
        band: band(),
        routes: two_routes(),
    };

    let outcome = reassign_bulk(request, &PlannerOptions::default()).unwrap();
    let sizes: Vec<usize> = outcome.routes.iter().map(|r| r.total_stops).collect();
    assert_eq!(sizes, vec![3, 0, 3]);

    let created = &outcome.routes[2];
    assert_eq!(created.id, 3);
    assert_eq!(orders(created), vec![1, 2, 3]);
    assert_ne!(created.status, RouteStatus::New);

    // the emptied source is refreshed too
    assert_eq!(outcome.routes[1].status, RouteStatus::Underutilized);
    assert!(outcome.routes[1].manually_edited);
}

#[test]
fn test_bulk_skips_stops_already_in_destination() {
    let request = BulkReassignRequest {
        group: "ANA".into(),
        stop_ids: vec![StopId::Number(1), StopId::Number(6)],
        to_route: RouteTarget::Existing(2),
        band: band(),
        routes: two_routes(),
    };

    let outcome = reassign_bulk(request, &PlannerOptions::default()).unwrap();
    assert_eq!(outcome.routes[0].total_stops, 4);
    assert_eq!(outcome.routes[1].total_stops, 2);
}

#[test]
fn test_bulk_with_no_matches_is_not_found() {
    let request = BulkReassignRequest {
        group: "ANA".into(),
        stop_ids: vec![StopId::from("nope")],
        to_route: RouteTarget::Existing(2),
        band: band(),
        routes: two_routes(),
    };
    assert!(matches!(
        reassign_bulk(request, &PlannerOptions::default()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_bulk_unknown_destination_is_not_found() {
    let request = BulkReassignRequest {
        group: "ANA".into(),
        stop_ids: vec![StopId::Number(1)],
        to_route: RouteTarget::Existing(5),
        band: band(),
        routes: two_routes(),
    };
    assert!(matches!(
        reassign_bulk(request, &PlannerOptions::default()),
        Err(Error::NotFound(_))
    ));
}

// ============================================================================
// On Solver Output
// ============================================================================

#[test]
fn test_reassign_on_solved_plan_conserves_stops() {
    let stops = stops_from(MIRAFLORES, 1, "ANA");
    let config = PlanConfig::assigned(Frequency::Weekly, false, 0.2);
    let plan = solve(&stops, &config, &PlannerOptions::default()).unwrap();
    let group = plan.groups[0].clone();

    let from = &group.routes[0];
    let to = group.routes.iter().find(|r| r.id != from.id).unwrap();
    let request = ReassignRequest {
        group: group.group.clone(),
        stop_id: from.stops[0].id.clone(),
        from_route: from.id,
        to_route: RouteTarget::Existing(to.id),
        band: group.band,
        routes: group.routes.clone(),
    };

    let outcome = reassign_stop(request, &PlannerOptions::default()).unwrap();
    let expected: Vec<StopId> = stops.iter().map(|s| s.id.clone()).collect();
    assert!(audit_routes(&expected, &outcome.routes).is_clean());
    assert_eq!(
        outcome.routes.iter().filter(|r| r.manually_edited).count(),
        2
    );
}
