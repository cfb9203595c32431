use bson::{Bson, bson, doc};
use oplogcheck::checks;
use oplogcheck::{
    CheckConfig, DriverKind, OplogChecker, QueryDescriptor, QueryOptions, ReasonCode, Verdict,
    check_why_no_oplog,
};

const OPLOG_URL: &str = "mongodb://ssdsd";

fn with_oplog() -> CheckConfig {
    CheckConfig::default().with_oplog_url(OPLOG_URL).with_release("METEOR@1.2.1")
}

fn query(selector: bson::Document, options: QueryOptions) -> QueryDescriptor {
    QueryDescriptor::new(selector).with_options(options)
}

fn limit_only() -> QueryOptions {
    QueryOptions { limit: Some(20), ..Default::default() }
}

#[test]
fn no_env_wins_over_everything() {
    let q = query(doc! { "aa": { "$gt": 20 } }, limit_only());
    let v = check_why_no_oplog(&CheckConfig::default(), &q, None);
    assert_eq!(v.code(), Some(ReasonCode::NoEnv));
}

#[test]
fn no_env_even_with_a_tailing_driver() {
    let q = QueryDescriptor::new(doc! {});
    let v = check_why_no_oplog(&CheckConfig::default(), &q, Some(&DriverKind::OplogTailing));
    assert_eq!(v.code(), Some(ReasonCode::NoEnv));
}

#[test]
fn limit_without_sort() {
    let q = query(doc! { "aa": { "$gt": 20 } }, limit_only());
    assert_eq!(check_why_no_oplog(&with_oplog(), &q, None).code(), Some(ReasonCode::LimitNoSort));
}

#[test]
fn supporting_driver_short_circuits() {
    let q = query(
        doc! { "aa": { "$gt": 20 } },
        QueryOptions { limit: Some(20), sort: Some(bson!({ "aa": 1 })), ..Default::default() },
    );
    let v = check_why_no_oplog(&with_oplog(), &q, Some(&DriverKind::OplogTailing));
    assert_eq!(v.code(), Some(ReasonCode::OplogSupported));
    assert!(v.supports_oplog());
}

#[test]
fn supporting_driver_beats_later_disqualifications() {
    let q = query(doc! { "$where": "true" }, QueryOptions { skip: Some(3), disable_oplog: true, ..limit_only() });
    let v = check_why_no_oplog(&CheckConfig::default().with_oplog_url(OPLOG_URL), &q, Some(&DriverKind::OplogTailing));
    assert_eq!(v.code(), Some(ReasonCode::OplogSupported));
}

#[test]
fn polling_driver_does_not_short_circuit() {
    let q = query(doc! { "aa": 1 }, limit_only());
    let v = check_why_no_oplog(&with_oplog(), &q, Some(&DriverKind::Polling));
    assert_eq!(v.code(), Some(ReasonCode::LimitNoSort));
}

#[test]
fn invalid_matcher_selector() {
    let q = query(doc! { "aa": { "$in": Bson::Null } }, limit_only());
    let cfg = CheckConfig::default().with_oplog_url(OPLOG_URL).with_release("0.7.1");
    let v = check_why_no_oplog(&cfg, &q, None);
    assert_eq!(v.code(), Some(ReasonCode::MinimongoMatcherError));
    assert!(v.diagnosis().is_some_and(|d| d.reason.contains("$in")));
}

#[test]
fn missing_matcher_falls_through_to_later_rules() {
    let q = query(doc! { "aa": { "$in": Bson::Null } }, limit_only());
    let v = check_why_no_oplog(&with_oplog().with_matcher(None), &q, None);
    assert_eq!(v.code(), Some(ReasonCode::LimitNoSort));
    let q = QueryDescriptor::new(doc! { "aa": { "$in": Bson::Null } });
    assert_eq!(check_why_no_oplog(&with_oplog().with_matcher(None), &q, None), Verdict::Eligible);
}

#[test]
fn disable_flag_precedes_matcher() {
    let q = query(doc! { "aa": { "$in": Bson::Null } }, QueryOptions { disable_oplog: true, ..Default::default() });
    assert_eq!(check_why_no_oplog(&with_oplog(), &q, None).code(), Some(ReasonCode::DisableOplog));
}

#[test]
fn precedence_follows_rule_order() {
    let checker = OplogChecker::new(CheckConfig::default().with_oplog_url(OPLOG_URL));
    let mut q = query(
        doc! { "$where": "true", "loc": { "$near": [50, 50] } },
        QueryOptions {
            fields: Some(doc! { "$elemMatch": { "aa": 10 } }),
            skip: Some(10),
            limit: Some(5),
            ..Default::default()
        },
    );
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::NotSupportedFields));
    q.options.fields = None;
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::SkipNotSupported));
    q.options.skip = None;
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::WhereNotSupported));
    q.selector.remove("$where");
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::GeoNotSupported));
    q.selector.remove("loc");
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::LimitNoSort));
    q.options.sort = Some(bson!({ "$natural": 1 }));
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::MinimongoSorterError));
    q.options.sort = Some(bson!({ "aa": 1 }));
    assert_eq!(checker.check(&q, None).code(), Some(ReasonCode::GitCheckout));
}

#[test]
fn released_build_with_clean_query_is_eligible() {
    let q = query(
        doc! { "aa": { "$gt": 20 } },
        QueryOptions { limit: Some(20), sort: Some(bson!({ "aa": 1 })), fields: Some(doc! { "aa": 1 }), ..Default::default() },
    );
    assert_eq!(check_why_no_oplog(&with_oplog(), &q, None), Verdict::Eligible);
}

#[test]
fn checkout_build_is_flagged_last() {
    let cfg = CheckConfig::default().with_oplog_url(OPLOG_URL);
    let v = check_why_no_oplog(&cfg, &QueryDescriptor::new(doc! { "aa": 10 }), None);
    assert_eq!(v.code(), Some(ReasonCode::GitCheckout));
}

#[test]
fn individual_rules_match_the_chain() {
    let q = QueryDescriptor::new(doc! { "loc": { "$near": [50, 50] } });
    assert_eq!(checks::geo(&q).code(), Some(ReasonCode::GeoNotSupported));
    assert!(checks::where_clause(&q).is_eligible());
    assert!(checks::env(&with_oplog()).is_eligible());
    assert!(checks::git_checkout(&with_oplog()).is_eligible());
}

#[test]
fn every_diagnosis_has_reason_and_solution() {
    let checker = OplogChecker::new(CheckConfig::default());
    let v = checker.check(&QueryDescriptor::default(), None);
    let d = v.diagnosis().unwrap();
    assert!(!d.reason.is_empty());
    assert!(d.solution.contains("MONGO_OPLOG_URL"));
}

#[test]
fn checker_is_shareable_across_threads() {
    let checker = std::sync::Arc::new(OplogChecker::new(with_oplog()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let c = checker.clone();
            std::thread::spawn(move || {
                let q = query(doc! { "n": i }, QueryOptions { skip: Some(i64::from(i)), ..Default::default() });
                c.check(&q, None).code()
            })
        })
        .collect();
    let codes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(codes[0], None);
    assert!(codes[1..].iter().all(|c| *c == Some(ReasonCode::SkipNotSupported)));
}
