//! Generación de referencias internas (KYC, autorizaciones, transacciones)

use rand::distributions::Alphanumeric;
use rand::Rng;

/// `PREFIX-XXXXXXXXXX` con caracteres alfanuméricos en mayúsculas
pub fn generate_reference(prefix: &str, len: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();

    format!("{}-{}", prefix, suffix.to_uppercase())
}

/// Código numérico de autorización
pub fn generate_numeric_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        let reference = generate_reference("KYC", 10);
        assert!(reference.starts_with("KYC-"));
        assert_eq!(reference.len(), 14);
        assert!(reference[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_numeric_code() {
        let code = generate_numeric_code(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
