/// Points awarded by distance between predicted and actual position.
/// Index is the absolute difference; anything past the end scores zero.
pub const POINTS_BY_DIFFERENCE: [u32; 6] = [10, 7, 5, 3, 2, 1];

/// Points for an exact pick.
pub const PERFECT_POINTS: u32 = POINTS_BY_DIFFERENCE[0];

/// Map a position difference to points. `None` means the driver was not
/// classified and is a total miss.
pub fn points_for(position_difference: Option<u8>) -> u32 {
    position_difference
        .and_then(|diff| POINTS_BY_DIFFERENCE.get(diff as usize).copied())
        .unwrap_or(0)
}
