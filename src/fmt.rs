/// Format a quantity or price cell as a plain decimal. Integral values keep
/// a single trailing zero (`100.0`), everything else prints its shortest
/// representation.
pub fn decimal(val: f64) -> String {
    if val.fract() == 0.0 {
        format!("{val:.1}")
    } else {
        format!("{val}")
    }
}
