//! Adaptive-projection packing of a direction and kinetic energy into three floats.
//!
//! The component with the largest magnitude is dropped. When `x` or `y` is
//! dropped, `z` is stored as `1/z` in the dropped slot, so a stored magnitude
//! above 1 identifies which component is missing. The sign of the missing
//! component travels in the sign of the stored kinetic energy.
//!
//! Version 2 MCPL files store the direction with an octahedral projection
//! in two floats instead, followed by the plain kinetic energy; only the
//! unpacking side is provided for those.

/// Packs `direction` and `ekin` into `[a, b, signed_ekin]`.
pub fn pack(direction: [f64; 3], ekin: f64) -> [f64; 3] {
    let [x, y, z] = direction;
    let (absx, absy, absz) = (x.abs(), y.abs(), z.abs());
    let ekin = ekin.abs();
    if absx > absy && absx > absz {
        [1.0 / z, y, ekin.copysign(x)]
    } else if absy > absz {
        [x, 1.0 / z, ekin.copysign(y)]
    } else {
        [x, y, ekin.copysign(z)]
    }
}

/// Reverses [`pack`], returning `(direction, ekin)`.
pub fn unpack(packed: [f64; 3]) -> ([f64; 3], f64) {
    let [a, b, c] = packed;
    let ekin = c.abs();
    let sign = if c.is_sign_negative() { -1.0 } else { 1.0 };
    let direction = if a.abs() > 1.0 {
        let (y, z) = (b, 1.0 / a);
        [sign * missing_component(y, z), y, z]
    } else if b.abs() > 1.0 {
        let (x, z) = (a, 1.0 / b);
        [x, sign * missing_component(x, z), z]
    } else {
        [a, b, sign * missing_component(a, b)]
    };
    (direction, ekin)
}

fn missing_component(u: f64, v: f64) -> f64 {
    (1.0 - u * u - v * v).max(0.0).sqrt()
}

/// Unpacks an octahedrally projected direction from a version 2 MCPL file.
pub fn unpack_octahedral(packed: [f64; 2]) -> [f64; 3] {
    let [mut x, mut y] = packed;
    let z = 1.0 - x.abs() - y.abs();
    if z < 0.0 {
        // Lower hemisphere is folded over the diagonals
        (x, y) = (
            (1.0 - y.abs()) * non_negative_sign(x),
            (1.0 - x.abs()) * non_negative_sign(y),
        );
    }
    let norm = (x * x + y * y + z * z).sqrt();
    [x / norm, y / norm, z / norm]
}

fn non_negative_sign(v: f64) -> f64 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}
