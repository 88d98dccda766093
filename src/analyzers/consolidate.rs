//! Collapsing multi-phase rally rows into one canonical row per rally.

use std::collections::BTreeMap;

use crate::model::RallyRecord;

/// Overwrites each listed field of `$target` with `$source`'s value when present.
macro_rules! overwrite_present {
    ($target:ident, $source:ident; $($field:ident),+ $(,)?) => {
        $(
            if $source.$field.is_some() {
                $target.$field = $source.$field;
            }
        )+
    };
}

/// Merges rows sharing (match, set, rally number) into one row each.
///
/// Rows of a rally are folded by ascending phase: a later phase overwrites
/// only the fields it has a value for, while `point_won_by` and `reason`
/// keep the first value found. The result is sorted by match, set and rally.
pub fn consolidate(rows: &[RallyRecord]) -> Vec<RallyRecord> {
    let mut groups: BTreeMap<(i64, u8, u32), Vec<&RallyRecord>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.match_id, row.set_no, row.rally_no))
            .or_default()
            .push(row);
    }

    groups
        .into_values()
        .filter_map(|mut phases| {
            phases.sort_by_key(|r| r.phase);
            let (first, rest) = phases.split_first()?;
            let mut merged = (*first).clone();
            for later in rest {
                merge_phase(&mut merged, later);
            }
            Some(merged)
        })
        .collect()
}

fn merge_phase(merged: &mut RallyRecord, later: &RallyRecord) {
    merged.phase = later.phase;
    merged.point_won_by = merged.point_won_by.or(later.point_won_by);
    merged.reason = merged.reason.or(later.reason);

    overwrite_present!(merged, later;
        serve_side, serve_rot, recv_side, recv_rot,
        s_player_id, s_no, s_code,
        r_player_id, r_no, r_code,
        setter_player_id, pass_destination, pass_code,
        a_player_id, a_no, a_code, a_pass_quality, kill_type,
        b1_player_id, b1_no, b2_player_id, b2_no, b3_player_id, b3_no, b_code,
        d_player_id, d_no, d_code,
        fault_player_id,
    );
}
