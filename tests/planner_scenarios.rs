use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use itinerary::{
    Change, EditError, EditOutcome, Field, Friend, MappingError, Planner, PlannerConfig, Route, Selection,
    TimeOfDay, Waypoint,
};

const DATE: &str = "2025-05-01";

fn waypoint(id: &str, arrive: &str, depart: &str, duration: i32, rest: i32) -> Waypoint {
    Waypoint {
        arrive: TimeOfDay::parse(arrive),
        depart: TimeOfDay::parse(depart),
        duration,
        rest,
        ..Waypoint::new(id, format!("point {id}"))
    }
}

fn sample_planner() -> Planner {
    let mut primary = Route::new("main");
    primary.days.insert(
        DATE.into(),
        vec![
            waypoint("1", "", "08:00", 60, 0),
            waypoint("2", "09:00", "09:30", 45, 30),
            waypoint("3", "10:15", "", 0, 0),
        ],
    );

    let mut reference = Route::new("ref");
    reference.days.insert(
        "2023-08-12".into(),
        vec![waypoint("a", "", "06:30", 80, 0), waypoint("b", "07:50", "", 0, 0)],
    );

    Planner::new(vec![primary, reference], &PlannerConfig::default().with_seed(1)).unwrap()
}

fn day(planner: &Planner) -> &[Waypoint] {
    planner.routes()[0].day(DATE).unwrap()
}

fn times(day: &[Waypoint]) -> Vec<(String, String, i32, i32)> {
    day.iter()
        .map(|w| {
            (
                w.field_text(Field::Arrive),
                w.field_text(Field::Depart),
                w.duration,
                w.rest,
            )
        })
        .collect()
}

fn row(arrive: &str, depart: &str, duration: i32, rest: i32) -> (String, String, i32, i32) {
    (arrive.to_string(), depart.to_string(), duration, rest)
}

#[test]
fn duration_edit_moves_the_next_arrival() {
    let mut planner = sample_planner();

    let outcome = planner
        .edit_waypoint_field("main", DATE, "2", Field::Duration, "60")
        .unwrap();

    assert_eq!(outcome, EditOutcome::Applied);
    assert_eq!(
        times(day(&planner)),
        [
            row("", "08:00", 60, 0),
            row("09:00", "09:30", 60, 30),
            row("10:30", "", 0, 0),
        ]
    );
}

#[test]
fn depart_edit_shifts_the_rest_of_the_day() {
    let mut planner = sample_planner();

    planner
        .edit_waypoint_field("main", DATE, "1", Field::Depart, "08:30")
        .unwrap();

    assert_eq!(
        times(day(&planner)),
        [
            row("", "08:30", 60, 0),
            row("09:30", "10:00", 45, 30),
            row("10:45", "", 0, 0),
        ]
    );
}

#[test]
fn assign_without_selection_is_a_no_op() {
    let mut planner = sample_planner();
    let friend = Friend::new(planner.routes()[1].days["2023-08-12"][0].clone(), "2023-08-12");

    let result = planner.assign_friend("ref", Some(friend));

    assert_eq!(result, Err(MappingError::EmptySelection));
    assert!(planner.mapping().entries().is_empty());
    assert_eq!(planner.mapping().selection(), Selection::Idle);
}

#[test]
fn rejected_edits_leave_the_day_alone() {
    let mut planner = sample_planner();
    let before = day(&planner).to_vec();

    for (field, value) in [
        (Field::Arrive, "9:00"),
        (Field::Depart, "25:00"),
        (Field::Duration, "-5"),
        (Field::Rest, "abc"),
    ] {
        assert!(planner.edit_waypoint_field("main", DATE, "2", field, value).is_err());
    }

    assert_eq!(day(&planner), before.as_slice());
}

#[test]
fn unknown_waypoint_is_dropped() {
    let mut planner = sample_planner();
    let outcome = planner
        .edit_waypoint_field("main", DATE, "nope", Field::Rest, "10")
        .unwrap();
    assert_eq!(outcome, EditOutcome::Dropped);

    assert_eq!(
        planner.edit_waypoint_field("main", "1999-01-01", "1", Field::Rest, "10"),
        Err(EditError::DayNotFound {
            route: "main".into(),
            date: "1999-01-01".into()
        })
    );
}

#[test]
fn references_are_edited_with_the_same_rules() {
    let mut planner = sample_planner();
    planner
        .edit_waypoint_field("ref", "2023-08-12", "a", Field::Depart, "07:00")
        .unwrap();

    let reference = planner.routes()[1].day("2023-08-12").unwrap();
    assert_eq!(reference[1].arrive, TimeOfDay::parse("08:20"));
}

#[test]
fn earlier_snapshots_do_not_see_later_edits() {
    let mut planner = sample_planner();
    let before = planner.snapshot();

    planner
        .edit_waypoint_field("main", DATE, "3", Field::Name, "Hut")
        .unwrap();

    assert_eq!(before[0].days[DATE][2].name, "point 3");
    assert_eq!(planner.routes()[0].days[DATE][2].name, "Hut");
}

#[test]
fn route_admin_flows_into_the_table() {
    let mut planner = sample_planner();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&changes);
    planner.subscribe(move |change, _| log.borrow_mut().push(change));

    let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
    planner.set_date_range("main", start, end).unwrap();
    assert_eq!(planner.comparison_table().days().len(), 2);

    let added = planner.add_route(start, start).unwrap();
    assert_eq!(planner.routes().len(), 3);
    assert_eq!(planner.comparison_table().days()[0].rows[0].per_route.len(), 3);

    planner.remove_route(&added).unwrap();
    assert_eq!(
        planner.remove_route("main"),
        Err(EditError::PrimaryRouteRemoval)
    );

    assert_eq!(*changes.borrow(), [Change::Routes; 3]);
}

#[test]
fn mapping_round_trip_through_selection() {
    let mut planner = sample_planner();
    let second = day(&planner)[1].clone();
    let b = planner.routes()[1].days["2023-08-12"][1].clone();

    let color = planner.create_entry(&second);
    assert_eq!(planner.toggle_selection(&second).unwrap(), Some(color.clone()));
    assert_eq!(planner.mapping().selection(), Selection::Selecting(&second.id));

    planner
        .assign_friend("ref", Some(Friend::new(b, "2023-08-12")))
        .unwrap();
    assert_eq!(planner.toggle_selection(&second).unwrap(), None);
    assert_eq!(planner.mapping().selection(), Selection::Idle);

    // friends survive deselection
    let cell = planner.comparison_table().days()[0].rows[1].per_route[1]
        .as_ref()
        .unwrap();
    assert_eq!(cell.waypoint.id, "b");
    assert_eq!(planner.mapping().entry("2").unwrap().color, color);
}
