use bson::{Bson, Document, doc};
use oplogcheck::{CheckConfig, DriverKind, OplogChecker, QueryDescriptor, QueryOptions, ReasonCode};
use proptest::prelude::*;

fn any_selector() -> impl Strategy<Value = Document> {
    prop_oneof![
        Just(doc! {}),
        any::<i32>().prop_map(|n| doc! { "aa": n }),
        any::<i32>().prop_map(|n| doc! { "aa": { "$gt": n } }),
        Just(doc! { "aa": { "$in": Bson::Null } }),
        Just(doc! { "$where": "this.aa > 1" }),
        Just(doc! { "loc": { "$near": [50, 50] } }),
        Just(doc! { "$or": [ { "aa": 1 }, { "bb": { "$exists": true } } ] }),
    ]
}

fn any_options() -> impl Strategy<Value = QueryOptions> {
    (
        proptest::option::of(0i64..50),
        proptest::option::of(0i64..50),
        proptest::option::of(prop_oneof![Just(doc! { "aa": 1 }), Just(doc! { "$natural": 1 })]),
        proptest::option::of(prop_oneof![Just(doc! { "aa": 0 }), Just(doc! { "$elemMatch": { "aa": 1 } })]),
        any::<bool>(),
    )
        .prop_map(|(skip, limit, sort, fields, disable_oplog)| QueryOptions {
            skip,
            limit,
            sort: sort.map(Bson::Document),
            fields,
            disable_oplog,
        })
}

fn any_query() -> impl Strategy<Value = QueryDescriptor> {
    (any_selector(), any_options()).prop_map(|(s, o)| QueryDescriptor::new(s).with_options(o))
}

fn any_config() -> impl Strategy<Value = CheckConfig> {
    (any::<bool>(), proptest::option::of(Just("METEOR@1.2".to_string()))).prop_map(|(matcher, release)| {
        let mut cfg = CheckConfig::default().with_oplog_url("mongodb://ssdsd");
        cfg.release = release;
        if !matcher {
            cfg.matcher = None;
        }
        cfg
    })
}

proptest! {
    #[test]
    fn prop_no_env_takes_precedence(q in any_query(), tailing in any::<bool>()) {
        let checker = OplogChecker::new(CheckConfig::default());
        let driver = if tailing { DriverKind::OplogTailing } else { DriverKind::Polling };
        prop_assert_eq!(checker.check(&q, Some(&driver)).code(), Some(ReasonCode::NoEnv));
    }

    #[test]
    fn prop_tailing_driver_is_authoritative(q in any_query(), cfg in any_config()) {
        let checker = OplogChecker::new(cfg);
        prop_assert_eq!(checker.check(&q, Some(&DriverKind::OplogTailing)).code(), Some(ReasonCode::OplogSupported));
    }

    #[test]
    fn prop_check_is_idempotent(q in any_query(), cfg in any_config()) {
        let checker = OplogChecker::new(cfg);
        prop_assert_eq!(checker.check(&q, None), checker.check(&q, None));
    }

    #[test]
    fn prop_never_reports_supported_without_driver(q in any_query(), cfg in any_config()) {
        let checker = OplogChecker::new(cfg);
        prop_assert_ne!(checker.check(&q, None).code(), Some(ReasonCode::OplogSupported));
    }

    #[test]
    fn prop_limit_with_sort_never_limit_no_sort(limit in 1i64..1000) {
        let checker = OplogChecker::new(CheckConfig::default().with_oplog_url("mongodb://ssdsd"));
        let opts = QueryOptions { limit: Some(limit), sort: Some(Bson::Document(doc! { "aa": 1 })), ..Default::default() };
        let q = QueryDescriptor::new(doc! {}).with_options(opts);
        prop_assert_ne!(checker.check(&q, None).code(), Some(ReasonCode::LimitNoSort));
    }
}
