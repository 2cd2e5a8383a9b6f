use num_bigint::BigUint;

/// Returns the sorted middle, or the floored average of the two middle items
/// if the list has an even number of elements. `None` for an empty list.
pub fn median(list: &mut [BigUint]) -> Option<BigUint> {
    if list.is_empty() {
        return None;
    }
    list.sort_unstable();
    let len = list.len();
    let middle_index = len / 2;
    if len % 2 == 0 {
        // [2.0, 2.1, 2.2, 2.3] -> (2.1 + 2.2) / 2
        let median1 = list.get(middle_index - 1)?;
        let median2 = list.get(middle_index)?;
        Some((median1 + median2) / 2u64)
    } else {
        list.get(middle_index).cloned()
    }
}
