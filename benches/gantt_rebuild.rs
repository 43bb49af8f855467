use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use route_desk::gantt::GanttProjection;
use route_desk::models::{
    generate_route_color, Order, Project, Route, Schedule, ScheduleId, ScheduleType, Stop,
};
use route_desk::versions::sort_versions;

const ROUTES: usize = 60;
const STOPS_PER_ROUTE: usize = 40;

fn build_project() -> (Project, ScheduleId) {
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();
    let start = day.and_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default());
    let created = DateTime::<Utc>::from_timestamp(1_717_390_800, 0).unwrap_or_default();

    let mut project = Project::new("Benchmark");
    let mut schedule = Schedule::new("Current", day, ScheduleType::Current, created);
    for r in 0..ROUTES {
        let mut route = Route::new(format!("Route {}", r + 1), generate_route_color(r), created);
        for s in 0..STOPS_PER_ROUTE {
            let order = project.add_order(Order::new(format!("Order {r}-{s}"), Some(day)));
            let offset = Duration::minutes(i64::try_from(s * 12).unwrap_or(0));
            route
                .stops
                .push(Stop::for_order(order, Duration::minutes(8)).with_arrival(start + offset));
        }
        schedule.routes.push(route);
    }
    let id = project.add_schedule(schedule);

    // A realistic number of versions for the version list
    for n in 0..20 {
        let kind = if n == 0 { ScheduleType::BuildRoutesSnapshot } else { ScheduleType::Edited };
        let version = Schedule::new(format!("Edited {n}"), day, kind, created + Duration::minutes(n));
        project.add_schedule(version);
    }
    project.drain_events();
    (project, id)
}

fn benchmark_gantt(c: &mut Criterion) {
    let (project, schedule) = build_project();
    let mut gantt = GanttProjection::new();
    gantt.bind(&project, Some(schedule));

    c.bench_function("gantt_rebuild", |b| {
        b.iter(|| {
            gantt.rebuild(black_box(&project));
            black_box(gantt.items().len())
        });
    });

    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();
    c.bench_function("sort_versions", |b| {
        b.iter(|| {
            let mut versions: Vec<&Schedule> = project.schedules_on(black_box(day)).collect();
            sort_versions(&mut versions);
            black_box(versions.len())
        });
    });
}

criterion_group!(benches, benchmark_gantt);
criterion_main!(benches);
