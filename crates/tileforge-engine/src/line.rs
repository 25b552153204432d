//! Line resolution: the slide-and-merge step on a single row or column.

use crate::BOARD_SIZE;

/// Slides a line toward index 0 and merges equal neighbours.
///
/// The caller extracts the line in the order tiles travel (so for a
/// "right" move the row is passed back-to-front) and writes the result
/// back in the same order. Returns the new line and the points scored,
/// which is the sum of every merged tile's new value.
///
/// Three steps:
///
/// 1. **Compact** — drop the zeros, keep the order of the rest.
/// 2. **Pad** — fill the tail with zeros (the array starts zeroed, so this
///    falls out of step 1).
/// 3. **Merge** — one pass over adjacent pairs. A merged pair becomes a
///    single doubled tile, everything after it shifts left by one, and
///    the scan continues at the next index. A tile produced by a merge is
///    never compared with its old neighbour again, so each tile merges at
///    most once per move.
///
/// ```
/// use tileforge_engine::resolve_line;
///
/// assert_eq!(resolve_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
/// assert_eq!(resolve_line([2, 0, 2, 4]), ([4, 4, 0, 0], 4));
/// ```
pub fn resolve_line(line: [u32; BOARD_SIZE]) -> ([u32; BOARD_SIZE], u32) {
    let mut numbers = [0u32; BOARD_SIZE];
    let mut len = 0;
    for value in line.into_iter().filter(|&v| v != 0) {
        numbers[len] = value;
        len += 1;
    }

    let mut score = 0;
    for i in 0..BOARD_SIZE - 1 {
        if numbers[i] != 0 && numbers[i] == numbers[i + 1] {
            numbers[i] *= 2;
            score += numbers[i];
            numbers.copy_within(i + 2.., i + 1);
            numbers[BOARD_SIZE - 1] = 0;
        }
    }

    (numbers, score)
}
