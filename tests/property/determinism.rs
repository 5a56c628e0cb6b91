//! Property-based tests for determinism and instantiation counts

use proptest::prelude::*;
use varigen::params::{MAX_TYPE_COUNT, MAX_VISITOR_ARITY};
use varigen::{generate, GenerateOptions, GenerationParameters, Skeleton};

const SKELETON: &str = "\
%% define params single sep=\", \"
class T${k - 1}
%% end
template< %%{params} > class variant;
%% expand ctors single
variant( T${k - 1} const & );
%% end
%% expand visit paired
R visit( F${for j in 1..=a}, V${j}${end} );
%% end
";

fn params_strategy() -> impl Strategy<Value = (i64, i64)> {
    (1..=MAX_TYPE_COUNT as i64, 0..=MAX_VISITOR_ARITY as i64)
}

/// Generation is a pure function of skeleton and parameters
#[test]
fn test_generation_is_byte_identical_property() {
    let skeleton = Skeleton::parse(SKELETON).unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&params_strategy(), |(n, m)| {
            let params = GenerationParameters::new(n, m).unwrap();
            let first = generate(&skeleton, params, GenerateOptions::default()).unwrap();
            let second = generate(&skeleton, params, GenerateOptions::default()).unwrap();

            prop_assert_eq!(&first.text, &second.text);
            prop_assert_eq!(&first.digest, &second.digest);
            Ok(())
        })
        .unwrap();
}

/// Single-axis markers expand N times, paired-axis markers M + 1 times
#[test]
fn test_instantiation_counts_property() {
    let skeleton = Skeleton::parse(SKELETON).unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&params_strategy(), |(n, m)| {
            let params = GenerationParameters::new(n, m).unwrap();
            let artifact = generate(&skeleton, params, GenerateOptions::default()).unwrap();

            for marker in &artifact.markers {
                let expected = match marker.name.as_str() {
                    "visit" => m as usize + 1,
                    _ => n as usize,
                };
                prop_assert_eq!(marker.instantiations, expected);
            }
            prop_assert_eq!(artifact.text.matches("variant( T").count(), n as usize);
            prop_assert_eq!(artifact.text.matches("R visit(").count(), m as usize + 1);
            prop_assert!(artifact.text.ends_with('\n'));
            Ok(())
        })
        .unwrap();
}

/// Out-of-domain parameters are always rejected
#[test]
fn test_out_of_domain_parameters_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(i64::MIN..1i64, any::<i64>()), |(n, m)| {
            prop_assert!(GenerationParameters::new(n, m).is_err());
            Ok(())
        })
        .unwrap();

    runner
        .run(&(1..=MAX_TYPE_COUNT as i64, i64::MIN..0i64), |(n, m)| {
            prop_assert!(GenerationParameters::new(n, m).is_err());
            Ok(())
        })
        .unwrap();
}

/// Cross-product ordinals count up from zero in emission order
#[test]
fn test_selection_order_property() {
    let skeleton = Skeleton::parse(
        "%% expand table paired\n${for sel sep \"\\n\"}${ord}=${for j in 1..=a sep \".\"}${s[j]}${end}${end}\n%% end\n",
    )
    .unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(1i64..=4, 0i64..=3), |(n, m)| {
            let params = GenerationParameters::new(n, m).unwrap();
            let artifact = generate(&skeleton, params, GenerateOptions::default()).unwrap();

            let lines: Vec<&str> = artifact
                .text
                .lines()
                .filter(|l| !l.is_empty())
                .collect();
            let total: usize = (0..=m as u32).map(|a| (n as usize).pow(a)).sum();
            prop_assert_eq!(lines.len(), total);

            let mut expected_ord = 0usize;
            let mut previous: Option<Vec<usize>> = None;
            for line in lines {
                let (ord, sel) = line.split_once('=').unwrap();
                let ord: usize = ord.parse().unwrap();
                let sel: Vec<usize> = if sel.is_empty() {
                    Vec::new()
                } else {
                    sel.split('.').map(|s| s.parse().unwrap()).collect()
                };
                if previous.as_ref().map(Vec::len) != Some(sel.len()) {
                    expected_ord = 0;
                } else {
                    prop_assert!(previous.as_ref().unwrap() < &sel);
                }
                prop_assert_eq!(ord, expected_ord);
                prop_assert!(sel.iter().all(|&s| (1..=n as usize).contains(&s)));
                expected_ord += 1;
                previous = Some(sel);
            }
            Ok(())
        })
        .unwrap();
}
