//! Property-Based Tests for Limit Resolution
//!
//! These check the resolution rules against arbitrary limits and arbitrary
//! sequences of override operations.
//!
//! # Running the Tests
//!
//! ```bash
//! cargo test --lib limits::proptests
//! ```

use proptest::prelude::*;

use crate::limits::{
    AppLimits, Ceiling, Limit, LimitError, OverrideState, Plan, PlanTable, User,
};

fn arb_ceiling() -> impl Strategy<Value = Ceiling> {
    prop_oneof![
        Just(Ceiling::Unbounded),
        any::<u32>().prop_map(Ceiling::Limited),
    ]
}

fn arb_limit() -> impl Strategy<Value = Limit> {
    (any::<u32>(), any::<u32>(), arb_ceiling(), arb_ceiling())
        .prop_map(|(c, t, b, m)| Limit::new(c, t, b, m))
}

fn arb_plan() -> impl Strategy<Value = Plan> {
    prop_oneof![
        Just(Plan::Free),
        Just(Plan::Developer),
        Just(Plan::Organization),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Set(Limit),
    Clear,
    OptOut,
    ChangePlan(Limit),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_limit().prop_map(Op::Set),
        Just(Op::Clear),
        Just(Op::OptOut),
        arb_limit().prop_map(Op::ChangePlan),
    ]
}

proptest! {
    /// A private app resolves to whatever plan its owner is on, now
    #[test]
    fn prop_private_app_tracks_owner_plan(initial in arb_limit(), changes in prop::collection::vec(arb_limit(), 0..5)) {
        let user = User::new(initial);
        let app = user.upload_private_app();
        prop_assert_eq!(app.limit(), initial);

        for plan in changes {
            user.set_plan(plan);
            prop_assert_eq!(app.limit(), plan);
        }
    }

    /// A fresh public app ignores its owner's plan
    #[test]
    fn prop_public_app_starts_at_default(plan in arb_plan()) {
        let plans = PlanTable::builtin();
        let user = User::subscribe(plan, plans.clone());
        let app = user.upload_public_app();

        prop_assert_eq!(app.limit(), plans.public_app_default());
        prop_assert_eq!(app.state(), OverrideState::Default);
    }

    /// set_limit wins regardless of prior state
    #[test]
    fn prop_set_limit_then_read(plan in arb_limit(), history in prop::collection::vec(arb_op(), 0..8), limit in arb_limit()) {
        let user = User::new(plan);
        let mut app = user.upload_public_app();
        apply(&user, &mut app, &history);

        app.set_limit(limit).unwrap();
        prop_assert_eq!(app.limit(), limit);
    }

    /// Opting out lands on the owner's current plan from any state, repeatedly
    #[test]
    fn prop_opt_out_yields_owner_plan(plan in arb_limit(), history in prop::collection::vec(arb_op(), 0..8), repeats in 1usize..4) {
        let user = User::new(plan);
        let mut app = user.upload_public_app();
        apply(&user, &mut app, &history);

        for _ in 0..repeats {
            user.request_opt_out(&mut app).unwrap();
            prop_assert_eq!(app.limit(), user.plan());
            prop_assert_eq!(app.state(), OverrideState::Custom);
        }
    }

    /// Effective limit of a public app is always the custom limit or the default
    #[test]
    fn prop_public_limit_is_custom_or_default(plan in arb_limit(), history in prop::collection::vec(arb_op(), 0..12)) {
        let user = User::new(plan);
        let mut app = user.upload_public_app();
        apply(&user, &mut app, &history);

        match app.custom_limit() {
            Some(custom) => prop_assert_eq!(app.limit(), custom),
            None => prop_assert_eq!(app.limit(), app.default_limit()),
        }
    }

    /// Every customization of a private app fails and leaves the limit alone
    #[test]
    fn prop_private_app_never_customized(plan in arb_limit(), history in prop::collection::vec(arb_op(), 0..8)) {
        let user = User::new(plan);
        let mut app = user.upload_private_app();

        for op in &history {
            let result = match op {
                Op::Set(limit) => app.set_limit(*limit),
                Op::Clear => app.clear_limit(),
                Op::OptOut => user.request_opt_out(&mut app),
                Op::ChangePlan(limit) => {
                    user.set_plan(*limit);
                    Ok(())
                }
            };
            if !matches!(op, Op::ChangePlan(_)) {
                let is_rejected = matches!(result, Err(LimitError::CustomLimitOnPrivateApp { .. }));
                prop_assert!(is_rejected);
            }
            prop_assert_eq!(app.limit(), user.plan());
        }
    }
}

fn apply(user: &User, app: &mut impl AppLimits, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Set(limit) => app.set_limit(*limit).unwrap(),
            Op::Clear => app.clear_limit().unwrap(),
            Op::OptOut => user.request_opt_out(app).unwrap(),
            Op::ChangePlan(limit) => {
                user.set_plan(*limit);
            }
        }
    }
}
