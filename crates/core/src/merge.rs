use crate::types::{ResolvedSegment, TIME_EPSILON, TimeInterval};

/// Fold runs of unresolved segments into the clip that plays before them.
///
/// A run directly following a resolved, touching segment extends that segment's end.
/// A run with nothing to absorb it (leading gap) becomes one absent segment spanning
/// the whole run. Total coverage is unchanged and the output is never longer.
pub fn merge_gaps(segments: &[ResolvedSegment]) -> Vec<ResolvedSegment> {
    let mut merged: Vec<ResolvedSegment> = Vec::with_capacity(segments.len());
    let mut i = 0;

    while i < segments.len() {
        let current = &segments[i];
        if current.url.is_some() {
            merged.push(current.clone());
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < segments.len() && segments[j].url.is_none() {
            j += 1;
        }
        let run_end = segments[j - 1].interval.end;

        match merged.last_mut() {
            Some(prev) if prev.url.is_some() && prev.interval.touches(&current.interval) => {
                prev.interval.end = run_end;
            }
            _ => merged.push(ResolvedSegment::new(
                TimeInterval::new(current.interval.start, run_end),
                None,
            )),
        }

        i = j;
    }

    merged
}

/// True when the segments tile `[0, total)` with no gap or overlap.
pub fn covers(segments: &[ResolvedSegment], total: f64) -> bool {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return total.abs() < TIME_EPSILON;
    };

    first.interval.start.abs() < TIME_EPSILON
        && (last.interval.end - total).abs() < TIME_EPSILON
        && segments
            .windows(2)
            .all(|pair| pair[0].interval.touches(&pair[1].interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, url: Option<&str>) -> ResolvedSegment {
        ResolvedSegment::new(TimeInterval::new(start, end), url.map(str::to_string))
    }

    #[test]
    fn absorbs_inner_gap_into_previous_clip() {
        let input = vec![
            seg(0.0, 3.0, Some("A")),
            seg(3.0, 6.0, None),
            seg(6.0, 9.0, None),
            seg(9.0, 12.0, Some("B")),
        ];

        let merged = merge_gaps(&input);

        assert_eq!(merged, vec![seg(0.0, 9.0, Some("A")), seg(9.0, 12.0, Some("B"))]);
        assert!(covers(&merged, 12.0));
    }

    #[test]
    fn leading_gap_stays_absent() {
        let input = vec![seg(0.0, 3.0, None), seg(3.0, 6.0, Some("A"))];

        let merged = merge_gaps(&input);

        assert_eq!(merged, input);
    }

    #[test]
    fn leading_run_collapses_into_one_absent_segment() {
        let input = vec![
            seg(0.0, 2.0, None),
            seg(2.0, 4.0, None),
            seg(4.0, 7.0, Some("A")),
        ];

        let merged = merge_gaps(&input);

        assert_eq!(merged, vec![seg(0.0, 4.0, None), seg(4.0, 7.0, Some("A"))]);
        assert!(covers(&merged, 7.0));
    }

    #[test]
    fn trailing_gap_extends_last_clip() {
        let input = vec![
            seg(0.0, 5.0, Some("A")),
            seg(5.0, 8.0, Some("B")),
            seg(8.0, 10.5, None),
        ];

        let merged = merge_gaps(&input);

        assert_eq!(merged, vec![seg(0.0, 5.0, Some("A")), seg(5.0, 10.5, Some("B"))]);
    }

    #[test]
    fn discontinuous_previous_clip_does_not_absorb() {
        let input = vec![seg(0.0, 3.0, Some("A")), seg(3.5, 6.0, None)];

        let merged = merge_gaps(&input);

        assert_eq!(merged, vec![seg(0.0, 3.0, Some("A")), seg(3.5, 6.0, None)]);
    }

    #[test]
    fn all_absent_becomes_single_span() {
        let input = vec![seg(0.0, 1.0, None), seg(1.0, 2.0, None), seg(2.0, 3.0, None)];

        assert_eq!(merge_gaps(&input), vec![seg(0.0, 3.0, None)]);
    }

    #[test]
    fn resolved_only_input_is_unchanged() {
        let input = vec![seg(0.0, 1.0, Some("A")), seg(1.0, 2.0, Some("A"))];
        assert_eq!(merge_gaps(&input), input);
        assert!(merge_gaps(&[]).is_empty());
    }

    #[test]
    fn coverage_detects_holes_and_short_timelines() {
        let holed = vec![seg(0.0, 3.0, Some("A")), seg(4.0, 6.0, Some("B"))];
        assert!(!covers(&holed, 6.0));

        let short = vec![seg(0.0, 3.0, Some("A"))];
        assert!(!covers(&short, 6.0));

        let late_start = vec![seg(1.0, 3.0, Some("A"))];
        assert!(!covers(&late_start, 3.0));
    }

    #[test]
    fn merged_output_keeps_coverage_for_mixed_patterns() {
        let patterns: [&[bool]; 5] = [
            &[true, false, true, false, false],
            &[false, false, true, true, false],
            &[false, true, false, true, false],
            &[true, true, true, true, true],
            &[false, false, false, false, false],
        ];

        for pattern in patterns {
            let input: Vec<_> = pattern
                .iter()
                .enumerate()
                .map(|(k, &present)| {
                    let start = k as f64 * 2.5;
                    seg(start, start + 2.5, present.then_some("clip"))
                })
                .collect();
            let total = pattern.len() as f64 * 2.5;

            let merged = merge_gaps(&input);

            assert!(covers(&merged, total), "pattern {pattern:?}");
            assert!(merged.len() <= input.len());
            assert!(
                merged.windows(2).all(|p| p[0].url.is_some() || p[1].url.is_some()),
                "adjacent absent segments in {pattern:?}"
            );
        }
    }
}
