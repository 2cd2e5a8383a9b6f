use common_structs::TonBool;

pub fn from_human(human: bool) -> TonBool {
    if human {
        TonBool::TRUE
    } else {
        TonBool::FALSE
    }
}

/// Anything but the chain's `true` reads as `false`.
pub fn to_human(native: TonBool) -> bool {
    native == TonBool::TRUE
}
