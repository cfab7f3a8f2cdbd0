use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::model::Task;
use crate::util::date::local_day;

/// Ceiling above which intensity tiers scale by ratio instead of raw count.
const RATIO_TIER_MIN_CEILING: u32 = 4;

// ---------------------------------------------------------------------------
// Completion map and streaks
// ---------------------------------------------------------------------------

/// Per-day completion counts, keyed by the local calendar day each task was
/// completed on. Tasks without a usable completion instant are skipped.
pub fn completion_map(tasks: &[Task]) -> BTreeMap<NaiveDate, u32> {
    let mut map = BTreeMap::new();
    for task in tasks {
        if !task.completed {
            continue;
        }
        let Some(ms) = task.completed_at else { continue };
        let Some(day) = local_day(ms) else { continue };
        *map.entry(day).or_insert(0) += 1;
    }
    map
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streaks {
    /// Longest run of consecutive populated days anywhere in history
    pub longest: u32,
    /// Run ending today; zero whenever today itself has no completions
    pub current: u32,
}

/// Longest and current consecutive-day streaks over a completion map.
pub fn streaks(map: &BTreeMap<NaiveDate, u32>, today: NaiveDate) -> Streaks {
    let days: Vec<NaiveDate> = map.keys().copied().collect();

    let mut longest = u32::from(!days.is_empty());
    let mut run = 1;
    for pair in days.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    // the current streak only exists once today has a completion
    let mut current = 0;
    let mut cursor = today;
    while map.contains_key(&cursor) {
        current += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }

    Streaks { longest, current }
}

// ---------------------------------------------------------------------------
// Window stats and intensity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Completions inside `[window_start, today]`
    pub visible_total: u32,
    /// Completions over all recorded history
    pub all_time_total: u32,
    /// Max single-day count in the window, floored at 1 for scaling
    pub intensity_ceiling: u32,
}

/// Totals and the intensity ceiling for the visible heatmap window.
pub fn window_stats(
    map: &BTreeMap<NaiveDate, u32>,
    window_start: NaiveDate,
    today: NaiveDate,
) -> WindowStats {
    let all_time_total = map.values().sum();
    let mut visible_total = 0;
    let mut ceiling = 0;
    for (_, &count) in map.range(window_start..=today) {
        visible_total += count;
        ceiling = ceiling.max(count);
    }
    WindowStats {
        visible_total,
        all_time_total,
        intensity_ceiling: ceiling.max(1),
    }
}

/// Intensity tier 0..=4 for one day's count against the window ceiling.
///
/// Busy windows (ceiling above the cutoff) scale by quarter of the ceiling;
/// quiet windows use the raw count so single completions still show depth.
pub fn intensity_level(count: u32, ceiling: u32) -> u8 {
    if count == 0 {
        return 0;
    }
    let ceiling = ceiling.max(1);
    if ceiling > RATIO_TIER_MIN_CEILING {
        let ratio = f64::from(count) / f64::from(ceiling);
        if ratio > 0.75 {
            4
        } else if ratio > 0.5 {
            3
        } else if ratio > 0.25 {
            2
        } else {
            1
        }
    } else {
        count.min(4) as u8
    }
}

// ---------------------------------------------------------------------------
// Calendar grid
// ---------------------------------------------------------------------------

/// One heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    /// Set for days after today; they render empty
    pub in_future: bool,
}

/// `weeks_to_show` columns of 7 days, oldest week first, ending with the
/// week that begins at `window_start_sunday`. Pure calendar math: the same
/// inputs always produce the same grid.
pub fn calendar_grid(
    window_start_sunday: NaiveDate,
    weeks_to_show: usize,
    today: NaiveDate,
) -> Vec<Vec<GridDay>> {
    let mut weeks = Vec::with_capacity(weeks_to_show);
    for week_idx in (0..weeks_to_show).rev() {
        let sunday = window_start_sunday - Duration::weeks(week_idx as i64);
        let mut week = Vec::with_capacity(7);
        for offset in 0..7 {
            let date = sunday + Duration::days(offset);
            week.push(GridDay {
                date,
                in_future: date > today,
            });
        }
        weeks.push(week);
    }
    weeks
}

/// First calendar day covered by a grid of the given span.
pub fn grid_window_start(window_start_sunday: NaiveDate, weeks_to_show: usize) -> NaiveDate {
    window_start_sunday - Duration::weeks(weeks_to_show.saturating_sub(1) as i64)
}
