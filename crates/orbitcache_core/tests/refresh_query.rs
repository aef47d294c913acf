use chrono::{DateTime, TimeZone, Utc};
use orbitcache_core::db::open_db_in_memory;
use orbitcache_core::{
    CatalogFetcher, ElementService, FetchError, PropagationEngine, ServiceError, Sgp4Propagator,
    SqliteElementRepository,
};
use std::cell::RefCell;

const CATALOG: &str = "VANGUARD 1
1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753
2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667
BROKEN
2 00011  32.8697 110.6735 1465736 351.1436   5.9539 11.86222930123456
1 00011U 59001A   08264.51782528  .00000000  00000-0  00000-0 0  9990
ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

/// Fetcher that replays a canned response and records requested groups.
struct CannedFetcher {
    response: Result<String, u16>,
    requested: RefCell<Vec<String>>,
}

impl CannedFetcher {
    fn ok(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            requested: RefCell::new(Vec::new()),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            response: Err(status),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl CatalogFetcher for CannedFetcher {
    fn fetch_catalog(&self, group: &str) -> Result<String, FetchError> {
        self.requested.borrow_mut().push(group.to_string());
        self.response.clone().map_err(|status| FetchError::Status {
            url: format!("https://catalog.test/gp.php?GROUP={group}"),
            status,
        })
    }
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).single().unwrap()
}

fn vanguard_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 6, 27, 18, 50, 19).single().unwrap()
}

#[test]
fn refresh_then_query_propagates_cached_set() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    let fetcher = CannedFetcher::ok(CATALOG);

    let summary = service.refresh(&fetcher, "stations", at(1)).unwrap();
    assert_eq!(summary.upserted, 2);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.fetched_at, at(1));
    assert_eq!(*fetcher.requested.borrow(), vec!["stations".to_string()]);
    assert_eq!(service.cached_count().unwrap(), 2);

    let engine = PropagationEngine::new(Sgp4Propagator::new());
    let report = service.query(&engine, 0, vanguard_epoch()).unwrap();
    assert_eq!(report.results.len() + report.failure_count(), 2);
    assert_eq!(report.results[0].catalog_id, 5);
    assert_eq!(report.results[0].target_time, "2000-06-27T18:50:19Z");
}

#[test]
fn query_limit_takes_lowest_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    service.refresh_from_text(CATALOG, at(1)).unwrap();

    let engine = PropagationEngine::new(Sgp4Propagator::new());
    let report = service.query(&engine, 1, vanguard_epoch()).unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.results[0].catalog_id, 5);
}

#[test]
fn failed_fetch_leaves_store_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    service.refresh_from_text(CATALOG, at(1)).unwrap();

    let err = service
        .refresh(&CannedFetcher::status(503), "active", at(2))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Fetch(FetchError::Status { status: 503, .. })
    ));
    assert_eq!(service.cached_count().unwrap(), 2);
}

#[test]
fn empty_store_query_is_an_error() {
    let mut conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    let engine = PropagationEngine::new(Sgp4Propagator::new());

    let err = service.query(&engine, 0, at(1)).unwrap_err();
    assert!(matches!(err, ServiceError::EmptyStore));
}

#[test]
fn refresh_with_only_garbage_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());

    let summary = service
        .refresh_from_text("NOT\nA\nCATALOG\nLEFTOVER", at(1))
        .unwrap();
    assert_eq!(summary.upserted, 0);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.trailing_lines, 1);
    assert_eq!(service.cached_count().unwrap(), 0);
}

#[test]
fn query_ahead_resolves_offset_from_now() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    service.refresh_from_text(CATALOG, at(1)).unwrap();
    let engine = PropagationEngine::new(Sgp4Propagator::new());

    let report = service
        .query_ahead(&engine, 1, vanguard_epoch(), 90)
        .unwrap();
    assert_eq!(report.target_time, "2000-06-27T20:20:19Z");

    let err = service
        .query_ahead(&engine, 1, vanguard_epoch(), i64::MAX)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Time(_)));
}

#[test]
fn cached_vanguard_at_element_epoch_matches_published_vector() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = ElementService::new(SqliteElementRepository::try_new(&mut conn).unwrap());
    service.refresh_from_text(CATALOG, at(1)).unwrap();
    let engine = PropagationEngine::new(Sgp4Propagator::new());

    let lines: Vec<&str> = CATALOG.lines().collect();
    let exact_epoch = sgp4::Elements::from_tle(None, lines[1].as_bytes(), lines[2].as_bytes())
        .unwrap()
        .datetime
        .and_utc();

    let report = service.query_ahead(&engine, 1, exact_epoch, 0).unwrap();
    assert_eq!(report.failure_count(), 0);
    let result = &report.results[0];
    assert_eq!(result.catalog_id, 5);

    let position = [7022.465_292_66, -1400.082_967_55, 0.039_951_55];
    let velocity = [1.893_841_015, 6.405_893_759, 4.534_807_250];
    for axis in 0..3 {
        assert!((result.position_km[axis] - position[axis]).abs() <= 1e-6);
        assert!((result.velocity_km_s[axis] - velocity[axis]).abs() <= 1e-9);
    }
}
