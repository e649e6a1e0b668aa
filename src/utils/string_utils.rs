/// Utilitários para manipulação segura de strings UTF-8

/// Trunca uma string de forma segura, garantindo que o índice não corte no meio de um caractere UTF-8
///
/// Usado para registrar prefixos de codes e tokens sem expor o valor completo nos logs.
///
/// # Exemplo
/// ```
/// use hubspot_integration_middleware::utils::string_utils::truncate_safe;
///
/// let text = "Olá, mundo! 🌍";
/// assert_eq!(truncate_safe(text, 10), "Olá, mund");
/// ```
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Trunca e adiciona um sufixo (como "...") quando houve corte
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    let truncated = truncate_safe(s, max_bytes);
    if truncated.len() < s.len() {
        format!("{}{}", truncated, suffix)
    } else {
        truncated.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_safe_ascii() {
        let text = "Hello, World!";
        assert_eq!(truncate_safe(text, 5), "Hello");
        assert_eq!(truncate_safe(text, 100), text);
    }

    #[test]
    fn test_truncate_safe_utf8() {
        let text = "Olá, mundo!";
        // "Olá" = 4 bytes (O=1, l=1, á=2)
        assert_eq!(truncate_safe(text, 3), "Ol");
        assert_eq!(truncate_safe(text, 4), "Olá");
    }

    #[test]
    fn test_truncate_with_suffix() {
        assert_eq!(truncate_with_suffix("CJSP-access-token-123", 6, "..."), "CJSP-a...");
        assert_eq!(truncate_with_suffix("short", 10, "..."), "short");
    }
}
