mod common;

use common::{call, runtime};
use proptest::prelude::*;
use smallbasic::{Value, builtins};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stack_is_lifo(values in prop::collection::vec(-1000i64..1000, 1..20)) {
        let (rt, _) = runtime();
        for v in &values {
            builtins::call(&rt, "Stack.PushValue", &["s".into(), Value::from(*v)]).unwrap();
        }
        for v in values.iter().rev() {
            let popped = call(&rt, "Stack.PopValue", &["s"]).unwrap();
            prop_assert_eq!(popped, Value::from(*v));
        }
        prop_assert_eq!(call(&rt, "Stack.GetCount", &["s"]).unwrap().to_text(), "0");
    }

    #[test]
    fn queue_is_fifo(values in prop::collection::vec("[a-z]{1,8}", 1..20)) {
        let (rt, _) = runtime();
        for v in &values {
            builtins::call(&rt, "Queue.EnqueueValue", &["q".into(), v.as_str().into()]).unwrap();
        }
        for v in &values {
            let taken = call(&rt, "Queue.DequeueValue", &["q"]).unwrap();
            prop_assert_eq!(taken.to_text(), v.clone());
        }
    }

    #[test]
    fn degrees_round_trip(x in -1.0e6f64..1.0e6) {
        let (rt, _) = runtime();
        let degrees = builtins::call(&rt, "Math.GetDegrees", &[x.into()]).unwrap();
        let back = builtins::call(&rt, "Math.GetRadians", &[degrees]).unwrap();
        let back = back.to_number().unwrap();
        prop_assert!((back - x).abs() <= 1e-9 * x.abs().max(1.0));
    }

    #[test]
    fn index_of_matches_char_position(prefix in "[a-c]{0,10}", needle in "[x-z]{1,3}") {
        let (rt, _) = runtime();
        let text = format!("{prefix}{needle}");
        let index = builtins::call(&rt, "Text.GetIndexOf", &[text.as_str().into(), needle.as_str().into()])
            .unwrap()
            .to_number()
            .unwrap();
        prop_assert_eq!(index as usize, prefix.chars().count() + 1);
    }
}
