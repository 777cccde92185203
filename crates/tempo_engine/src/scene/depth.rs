//! Sibling render ordering
//!
//! Depth-bearing siblings are ordered by descending depth. Siblings without a
//! depth keep their slots, so only the depth-bearing subsequence is permuted.

/// Reorder the depth-bearing entries of `items` by descending depth.
///
/// Entries for which `depth` returns `None` stay where they are. The sort is
/// stable: entries with equal depth keep their relative order.
pub fn sort_by_depth<T: Copy>(items: &mut [T], depth: impl Fn(&T) -> Option<i32>) {
    let mut slots = Vec::new();
    let mut ranked = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if let Some(value) = depth(item) {
            slots.push(index);
            ranked.push((value, *item));
        }
    }

    if ranked.len() < 2 {
        return;
    }

    // `sort_by` is stable
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    for (slot, (_, item)) in slots.into_iter().zip(ranked) {
        items[slot] = item;
    }
}
