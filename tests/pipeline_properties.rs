//! Property tests for the load → filter → aggregate → test pipeline

use abtest_dashboard::aggregate::{daily_trend, overall_metrics, summarize_groups};
use abtest_dashboard::data::parse_csv;
use abtest_dashboard::significance::two_proportion_ztest;
use abtest_dashboard::{
    DashboardConfig, DashboardView, Dataset, Group, GroupFilter, SessionRecord,
    SignificanceOutcome, SignificanceTester,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use std::io::Cursor;

fn arb_record() -> impl Strategy<Value = SessionRecord> {
    (0u32..1_000_000, 1u32..=28, 0u32..24, any::<bool>(), any::<bool>()).prop_map(
        |(user, day, hour, is_treatment, converted)| SessionRecord {
            user_id: user.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2017, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            group: if is_treatment {
                Group::Treatment
            } else {
                Group::Control
            },
            converted,
        },
    )
}

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(arb_record(), 0..300).prop_map(Dataset::new)
}

fn arb_filter() -> impl Strategy<Value = GroupFilter> {
    prop_oneof![
        Just(GroupFilter::All),
        Just(GroupFilter::Control),
        Just(GroupFilter::Treatment),
    ]
}

proptest! {
    #[test]
    fn rates_stay_in_unit_interval(ds in arb_dataset()) {
        for s in summarize_groups(&ds) {
            prop_assert!((0.0..=1.0).contains(&s.rate));
            prop_assert!(s.conversions <= s.count);
        }
        for p in daily_trend(&ds) {
            prop_assert!((0.0..=1.0).contains(&p.rate));
        }
        if let Some(rate) = overall_metrics(&ds).conversion_rate {
            prop_assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[test]
    fn group_counts_bounded_by_rows(ds in arb_dataset(), filter in arb_filter()) {
        let view = filter.apply(&ds);
        let summaries = summarize_groups(&view);
        let total: u64 = summaries.iter().map(|s| s.count).sum();

        prop_assert_eq!(total, view.len() as u64);
        prop_assert!(view.len() <= ds.len());
        for s in &summaries {
            prop_assert!(s.count <= ds.len() as u64);
            prop_assert!(filter.matches(s.group));
        }
    }

    #[test]
    fn aggregation_is_deterministic(ds in arb_dataset()) {
        prop_assert_eq!(summarize_groups(&ds), summarize_groups(&ds.clone()));
        prop_assert_eq!(daily_trend(&ds), daily_trend(&ds));
    }

    #[test]
    fn tester_never_runs_on_missing_arm(ds in arb_dataset(), filter in arb_filter()) {
        let view = DashboardView::build(&ds, filter, &DashboardConfig::default()).unwrap();
        let filtered = filter.apply(&ds);
        let both_present = filtered.contains_group(Group::Control)
            && filtered.contains_group(Group::Treatment);

        match &view.significance {
            SignificanceOutcome::Tested(result) => {
                prop_assert!(both_present);
                prop_assert!((0.0..=1.0).contains(&result.p_value));
                prop_assert!(result.z_statistic.is_finite());
            }
            SignificanceOutcome::Skipped { missing } => {
                prop_assert!(!both_present);
                prop_assert!(!missing.is_empty());
            }
        }
    }

    #[test]
    fn ztest_symmetric_under_swap(
        n1 in 1u64..5_000,
        n2 in 1u64..5_000,
        f1 in 0.0f64..=1.0,
        f2 in 0.0f64..=1.0,
    ) {
        let x1 = ((n1 as f64) * f1).floor() as u64;
        let x2 = ((n2 as f64) * f2).floor() as u64;
        let (z_a, p_a) = two_proportion_ztest(x1, n1, x2, n2).unwrap();
        let (z_b, p_b) = two_proportion_ztest(x2, n2, x1, n1).unwrap();

        prop_assert!((z_a + z_b).abs() < 1e-9);
        prop_assert!((p_a - p_b).abs() < 1e-9);
        prop_assert!((0.0..=1.0).contains(&p_a));
    }
}

#[test]
fn csv_to_verdict_end_to_end() {
    let mut csv = String::from("user_id,timestamp,group,converted\n");
    for i in 0..1000 {
        csv.push_str(&format!("c{},2017-01-03 10:00:00,control,{}\n", i, u8::from(i < 100)));
        csv.push_str(&format!("t{},2017-01-03 11:00:00,treatment,{}\n", i, u8::from(i < 150)));
    }
    let ds = parse_csv(Cursor::new(csv)).unwrap();

    let summaries = summarize_groups(&ds);
    let outcome = SignificanceTester::default().evaluate(&summaries).unwrap();
    let result = outcome.result().expect("both arms present");
    assert!(result.verdict.is_significant());
    assert!(result.p_value < 0.05);
}
