// ============================================================================
// Formatage des nombres pour l'affichage
// ============================================================================
// Fonctions pures : valeur brute -> chaîne affichée dans les cartes et axes
//
// Règles :
// - Prix >= 1 : exactement 2 décimales, séparateur de milliers ","
// - Prix dans [0, 1) : 4 à 8 décimales (précision sous le centime)
// - Grands nombres : suffixes T / B / M / K avec 2 décimales
// ============================================================================

/// Décimales minimum pour un prix < 1
const MIN_SUB_UNIT_DIGITS: usize = 4;

/// Décimales maximum pour un prix < 1
const MAX_SUB_UNIT_DIGITS: usize = 8;

/// Seuils des suffixes, du plus grand au plus petit
const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Formate un prix
///
/// Une valeur non finie (NaN, infini) est traitée comme 0.
/// Les valeurs négatives sont formatées sur leur valeur absolue avec un "-".
///
/// # Exemples
/// - 67012.456 → "67,012.46"
/// - 0.00012345 → "0.00012345"
/// - 0.5 → "0.5000"
pub fn format_price(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    let formatted = if magnitude >= 1.0 {
        format!("{:.2}", magnitude)
    } else {
        trim_fraction(format!("{:.*}", MAX_SUB_UNIT_DIGITS, magnitude), MIN_SUB_UNIT_DIGITS)
    };

    format!("{}{}", sign, group_thousands(&formatted))
}

/// Formate un prix optionnel (absent = 0)
pub fn format_optional_price(value: Option<f64>) -> String {
    format_price(value.unwrap_or(0.0))
}

/// Formate un grand nombre avec suffixe (market cap, volume)
///
/// Les seuils sont inclusifs : exactement 1e9 donne "1.00B", pas "1000.00M".
/// En dessous de 1e3, retombe sur `format_price`.
pub fn format_large_number(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    for (threshold, suffix) in SUFFIXES {
        if magnitude >= threshold {
            return format!("{}{:.2}{}", sign, magnitude / threshold, suffix);
        }
    }

    format_price(value)
}

/// Formate un grand nombre optionnel (absent = 0)
pub fn format_optional_large_number(value: Option<f64>) -> String {
    format_large_number(value.unwrap_or(0.0))
}

/// Supprime les zéros de fin de la partie décimale sans descendre sous `min_digits`
fn trim_fraction(mut formatted: String, min_digits: usize) -> String {
    if let Some(dot) = formatted.find('.') {
        let keep = dot + 1 + min_digits;
        while formatted.len() > keep && formatted.ends_with('0') {
            formatted.pop();
        }
    }
    formatted
}

/// Insère un "," tous les 3 chiffres dans la partie entière
///
/// CONCEPT RUST : Iterators sur chars
/// - On parcourt la partie entière et on pose un séparateur quand le nombre
///   de chiffres restants est multiple de 3
fn group_thousands(formatted: &str) -> String {
    let (int_part, frac_part) = match formatted.find('.') {
        Some(dot) => formatted.split_at(dot),
        None => (formatted, ""),
    };

    let digits = int_part.len();
    let mut grouped = String::with_capacity(formatted.len() + digits / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push_str(frac_part);
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction_digits(s: &str) -> usize {
        s.split('.').nth(1).map(|f| f.len()).unwrap_or(0)
    }

    #[test]
    fn test_price_above_one_has_two_digits() {
        assert_eq!(format_price(1.0), "1.00");
        assert_eq!(format_price(67012.456), "67,012.46");
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        for p in [1.0, 3.14159, 999.999, 12_345.6, 9.87e9] {
            assert_eq!(fraction_digits(&format_price(p)), 2, "price {}", p);
        }
    }

    #[test]
    fn test_price_below_one_has_four_to_eight_digits() {
        assert_eq!(format_price(0.5), "0.5000");
        assert_eq!(format_price(0.00012345), "0.00012345");
        assert_eq!(format_price(0.123456789), "0.12345679");
        for p in [0.0, 0.1, 0.25, 0.000001, 0.99999, 0.123456789] {
            let digits = fraction_digits(&format_price(p));
            assert!((4..=8).contains(&digits), "price {} -> {} digits", p, digits);
        }
    }

    #[test]
    fn test_absent_price_is_zero() {
        assert_eq!(format_optional_price(None), "0.0000");
        assert_eq!(format_price(f64::NAN), "0.0000");
    }

    #[test]
    fn test_negative_price() {
        assert_eq!(format_price(-1234.5), "-1,234.50");
    }

    #[test]
    fn test_large_number_suffixes() {
        assert_eq!(format_large_number(1.3e12), "1.30T");
        assert_eq!(format_large_number(45_600_000_000.0), "45.60B");
        assert_eq!(format_large_number(7_890_000.0), "7.89M");
        assert_eq!(format_large_number(1_500.0), "1.50K");
        assert_eq!(format_large_number(999.0), "999.00");
        assert_eq!(format_optional_large_number(None), "0.0000");
    }

    #[test]
    fn test_large_number_boundaries_use_larger_suffix() {
        assert_eq!(format_large_number(1e12), "1.00T");
        assert_eq!(format_large_number(1e9), "1.00B");
        assert_eq!(format_large_number(1e6), "1.00M");
        assert_eq!(format_large_number(1e3), "1.00K");
        for n in [1e12, 5e12, 2.5e15] {
            assert!(format_large_number(n).ends_with('T'));
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("1000.00"), "1,000.00");
        assert_eq!(group_thousands("123456789"), "123,456,789");
    }
}
