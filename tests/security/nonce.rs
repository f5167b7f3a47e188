use actix_site_guard::{create_csp_nonce, NonceGenerator};
use std::collections::HashSet;

fn is_nonce_shaped(nonce: &str) -> bool {
    nonce.len() == 32
        && nonce
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_format() {
        let nonce = create_csp_nonce().unwrap();

        assert!(is_nonce_shaped(&nonce), "unexpected nonce: {nonce}");
        assert!(!nonce.contains('='));
    }

    #[test]
    fn test_nonces_are_unique() {
        let generator = NonceGenerator::new();
        let nonces: HashSet<String> = (0..1000).map(|_| generator.generate().unwrap()).collect();

        assert_eq!(nonces.len(), 1000);
        assert_eq!(generator.generated(), 1000);
        assert!(nonces.iter().all(|n| is_nonce_shaped(n)));
    }

    #[test]
    fn test_concurrent_generation() {
        let generator = std::sync::Arc::new(NonceGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| generator.generate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let all: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(all.len(), 400);
        assert_eq!(generator.generated(), 400);
    }
}
