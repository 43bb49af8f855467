//! Shared test data.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::{
    GeoPoint, Location, LocationId, Order, OrderId, Project, Route, RouteId, Schedule,
    ScheduleId, ScheduleType, Stop, StopId, UnassignedOrders,
};

/// Route `log` output through the test harness; `RUST_LOG` selects the level
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date")
}

pub fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
    day().and_time(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"))
}

/// Fixed creation instant `minutes` after a base time
pub fn created(minutes: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_717_390_800, 0).expect("valid timestamp") + Duration::minutes(minutes)
}

/// A Current schedule with an empty "Route 1", a "Route 2" of
/// depot + two order stops, and three unassigned orders
pub struct Scenario {
    pub project: Project,
    pub day: NaiveDate,
    pub schedule: ScheduleId,
    pub r1: RouteId,
    pub r2: RouteId,
    /// Depot stop first, then the order stops
    pub r2_stops: Vec<StopId>,
    pub r2_orders: Vec<OrderId>,
    pub unassigned: Vec<OrderId>,
    pub depot: LocationId,
}

pub fn scenario() -> Scenario {
    let mut project = Project::new("Fixture");
    let depot = project.add_location(Location::new("Depot", Some(GeoPoint::new(0.0, 0.0))));

    let r2_orders: Vec<OrderId> = (1..=2)
        .map(|n| {
            let order = Order::new(format!("Assigned {n}"), Some(day()))
                .with_point(GeoPoint::new(f64::from(n), 1.0));
            project.add_order(order)
        })
        .collect();
    let unassigned: Vec<OrderId> = (1..=3)
        .map(|n| {
            let order = Order::new(format!("Loose {n}"), Some(day()))
                .with_point(GeoPoint::new(f64::from(n), 2.0));
            project.add_order(order)
        })
        .collect();

    let r1 = Route::new("Route 1", "#E6194B", created(0));
    let mut r2 = Route::new("Route 2", "#3CB44B", created(1));
    r2.stops.push(Stop::for_location(depot).with_arrival(at(8, 0)));
    for (i, order) in r2_orders.iter().enumerate() {
        let minute = u32::try_from(i * 30).expect("small index");
        r2.stops
            .push(Stop::for_order(*order, Duration::minutes(10)).with_arrival(at(9, minute)));
    }

    let (r1_id, r2_id) = (r1.id, r2.id);
    let r2_stops = r2.stop_ids();
    let mut schedule = Schedule::new("Current", day(), ScheduleType::Current, created(0));
    schedule.routes = vec![r1, r2];
    schedule.unassigned = Some(UnassignedOrders::new(unassigned.iter().copied()));
    let schedule_id = project.add_schedule(schedule);
    project.drain_events();

    Scenario {
        project,
        day: day(),
        schedule: schedule_id,
        r1: r1_id,
        r2: r2_id,
        r2_stops,
        r2_orders,
        unassigned,
        depot,
    }
}
