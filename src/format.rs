const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One significant digit with an SI suffix: `20000` -> `"20k"`, `1500000` -> `"2M"`.
/// Halves round away from zero.
pub fn si_prefix(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    let mut exponent = abs.log10().floor() as i32;
    let mut digit = (abs / 10f64.powi(exponent) + 0.5).floor() as u32;
    if digit >= 10 {
        digit = 1;
        exponent += 1;
    }

    let prefix_exponent = (exponent.div_euclid(3)).clamp(-8, 8) * 3;
    let shift = exponent - prefix_exponent; // digits before the decimal point, minus one
    let prefix = SI_PREFIXES[(8 + prefix_exponent / 3) as usize];

    let mantissa = if shift >= 0 {
        format!("{}{}", digit, "0".repeat(shift as usize))
    } else {
        format!("0.{}{}", "0".repeat((-shift - 1) as usize), digit)
    };

    format!("{}{}{}", sign, mantissa, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(5000), "5,000");
        assert_eq!(group_thousands(132_480), "132,480");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn si_prefix_one_significant_digit() {
        assert_eq!(si_prefix(0.0), "0");
        assert_eq!(si_prefix(7.0), "7");
        assert_eq!(si_prefix(20_000.0), "20k");
        assert_eq!(si_prefix(100_000.0), "100k");
        assert_eq!(si_prefix(15_000.0), "20k");
        assert_eq!(si_prefix(25_000.0), "30k");
        assert_eq!(si_prefix(1_000_000.0), "1M");
        assert_eq!(si_prefix(960.0), "1k");
        assert_eq!(si_prefix(0.5), "500m");
    }
}
