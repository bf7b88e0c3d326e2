/// Rounds a weight to an integer and inserts thousands separators,
/// e.g. `1234567.4` becomes `"1,234,567"`.
pub fn human_weight(w: f64) -> String {
    let n = w.round();
    let neg = n < 0.0;
    let digits = format!("{:.0}", n.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if neg {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::human_weight;

    #[test]
    fn grouping() {
        assert_eq!(human_weight(0.0), "0");
        assert_eq!(human_weight(999.0), "999");
        assert_eq!(human_weight(1000.0), "1,000");
        assert_eq!(human_weight(1234567.4), "1,234,567");
        assert_eq!(human_weight(2.5), "3");
        assert_eq!(human_weight(-1500.0), "-1,500");
    }
}
