//! Property-based tests for the shop floor arithmetic and status rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shopfloor_api::models::{
    actions::{is_parts_block, primary_enabled},
    format_block_note,
    shortages::{self, ItemType, RequirementLine},
    next_action, EventType, TaskStatus, PARTS_BLOCK_REASON,
};

// Quantities with up to two decimal places.
fn qty_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn event_strategy() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Start),
        Just(EventType::Pause),
        Just(EventType::Resume),
        Just(EventType::Complete),
        Just(EventType::Block),
        Just(EventType::Unblock),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn shortage_is_never_negative(required in qty_strategy(), on_hand in qty_strategy(), allocated in qty_strategy()) {
        let available = shortages::available(on_hand, allocated);
        let short = shortages::shortage(required, available);
        prop_assert!(short >= Decimal::ZERO);
        prop_assert_eq!(short > Decimal::ZERO, shortages::is_short(required, on_hand, allocated));
    }

    #[test]
    fn shortage_plus_available_covers_requirement(required in qty_strategy(), available in qty_strategy()) {
        let short = shortages::shortage(required, available);
        prop_assert!(available + short >= required);
        if short > Decimal::ZERO {
            prop_assert_eq!(available + short, required);
        }
    }

    #[test]
    fn reserve_never_exceeds_need_or_stock(required in qty_strategy(), available in qty_strategy()) {
        let reserve = shortages::reserve_qty(available, required);
        prop_assert!(reserve >= Decimal::ZERO);
        prop_assert!(reserve <= required);
        prop_assert!(reserve <= available);
    }

    #[test]
    fn top_shortages_are_ranked_and_capped(
        lines in prop::collection::vec((qty_strategy(), qty_strategy()), 0..12)
    ) {
        let lines: Vec<RequirementLine> = lines
            .into_iter()
            .enumerate()
            .map(|(i, (required, available))| {
                RequirementLine::new(i as i64, Some(format!("SKU-{i}")), None, ItemType::Sku, required, available)
            })
            .collect();
        let top = shortages::top_shortages(&lines);
        let short_count = lines.iter().filter(|l| l.shortage_qty > Decimal::ZERO).count();

        prop_assert_eq!(top.len(), short_count.min(shortages::TOP_SHORTAGE_LIMIT));
        prop_assert!(top.iter().all(|l| l.shortage_qty > Decimal::ZERO));
        prop_assert!(top.windows(2).all(|w| w[0].shortage_qty >= w[1].shortage_qty));
        prop_assert_eq!(shortages::suggested_block_note(&top).is_some(), !top.is_empty());
    }

    #[test]
    fn every_event_lands_on_a_known_status(event in event_strategy()) {
        let status = event.next_status();
        prop_assert_eq!(status.as_str().parse::<TaskStatus>().ok(), Some(status));
        prop_assert!(!(event.opens_session() && event.closes_session()));
    }

    #[test]
    fn shortage_only_leaves_unblock_enabled(status in prop_oneof![
        Just("NOT_STARTED"), Just("IN_PROGRESS"), Just("PAUSED"), Just("BLOCKED"), Just("DONE")
    ]) {
        let action = next_action(Some(status));
        prop_assert!(primary_enabled(&action, false));
        prop_assert_eq!(
            primary_enabled(&action, true),
            action.primary_event == Some(EventType::Unblock)
        );
    }

    #[test]
    fn parts_block_notes_are_recognised(note in "[a-zA-Z0-9 ,.-]{0,40}") {
        let stored = format_block_note(PARTS_BLOCK_REASON, Some(&note));
        prop_assert!(is_parts_block(Some(&stored)));
        let other = format_block_note("Awaiting QC", Some(&note));
        prop_assert!(!is_parts_block(Some(&other)));
    }
}
