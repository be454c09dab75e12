//! Activation order policies for staple pins.

use surgery_config::ActivationOrder;

/// Build the order in which pins are revealed.
///
/// The result is always a permutation of `0..total_pins`.
///
/// Center-out starts at `total_pins / 2` and then alternates left and right
/// at increasing offsets: entry `n` sits `ceil(n / 2)` away from the center,
/// on the left for odd `n` and on the right for even `n`. Candidates that
/// fall outside the row are skipped.
pub fn activation_order(total_pins: usize, policy: ActivationOrder) -> Vec<usize> {
    match policy {
        ActivationOrder::Sequential => (0..total_pins).collect(),
        ActivationOrder::CenterOut => center_out(total_pins),
    }
}

fn center_out(total_pins: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(total_pins);
    if total_pins == 0 {
        return order;
    }

    let center = total_pins / 2;
    order.push(center);

    // Every offset up to the row length covers both sides completely.
    let mut n = 1usize;
    while order.len() < total_pins && n <= 2 * total_pins {
        let offset = n.div_ceil(2);
        let candidate = if n % 2 == 1 {
            center.checked_sub(offset)
        } else {
            Some(center + offset).filter(|&index| index < total_pins)
        };
        if let Some(index) = candidate {
            order.push(index);
        }
        n += 1;
    }

    order
}
