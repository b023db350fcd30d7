//! Reduction of code point sets into minimal interval lists.

use lexer_runtime::CodePoint;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Collapses a set of code points into the sorted list of disjoint closed
/// intervals covering exactly that set. No two returned intervals overlap or
/// touch.
///
/// ```
/// use lexer_compiler::interval::reduce;
///
/// assert_eq!(vec![1..=3, 7..=7], reduce([3, 7, 1, 2, 2]));
/// assert!(reduce([]).is_empty());
/// ```
pub fn reduce<I>(values: I) -> Vec<RangeInclusive<CodePoint>>
where
    I: IntoIterator<Item = CodePoint>,
{
    let sorted: BTreeSet<CodePoint> = values.into_iter().collect();

    sorted
        .into_iter()
        .fold(Vec::new(), |mut intervals, value| {
            match intervals.last_mut() {
                Some(last) if last.end().checked_add(1) == Some(value) => {
                    *last = *last.start()..=value;
                }
                _ => intervals.push(value..=value),
            }
            intervals
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn should_merge_consecutive_values() {
        let input_output = vec![
            (vec![], vec![]),
            (vec![5], vec![5..=5]),
            (vec![1, 2, 3], vec![1..=3]),
            (vec![3, 1, 2, 9, 8, 5], vec![1..=3, 5..=5, 8..=9]),
            (vec![u32::MAX, 0, u32::MAX - 1], vec![0..=0, u32::MAX - 1..=u32::MAX]),
        ];

        for (input, expected) in input_output {
            assert_eq!((input.clone(), expected), (input.clone(), reduce(input)));
        }
    }

    #[test]
    fn should_produce_minimal_covering_intervals() {
        fn prop(values: Vec<u16>) -> bool {
            let values: BTreeSet<CodePoint> = values.into_iter().map(CodePoint::from).collect();
            let intervals = reduce(values.iter().copied());

            let ordered_and_apart = intervals
                .windows(2)
                .all(|pair| pair[0].end() + 1 < *pair[1].start());
            let covered: BTreeSet<CodePoint> = intervals.into_iter().flatten().collect();

            ordered_and_apart && covered == values
        }

        quickcheck(prop as fn(Vec<u16>) -> bool);
    }
}
