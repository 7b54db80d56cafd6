use sha2::{Digest, Sha256};

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://www.gravatar.com";
pub(crate) const DISPLAY_SIZE: u32 = 200;
pub(crate) const PROBE_SIZE: u32 = 80;

/// Hex SHA-256 of the trimmed, lower-cased address.
pub fn hash_address(address: &str) -> String {
    let normalized = address.trim().to_lowercase();
    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Addresses images on a Gravatar-compatible host.
///
/// URLs always carry `d=404` so a missing image is a plain not-found
/// instead of the service's placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserImageService {
    base_url: String,
    display_size: u32,
    probe_size: u32,
}

impl Default for UserImageService {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_BASE_URL, DISPLAY_SIZE, PROBE_SIZE)
    }
}

impl UserImageService {
    pub fn new(base_url: &str, display_size: u32, probe_size: u32) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            display_size: display_size.max(1),
            probe_size: probe_size.max(1),
        }
    }

    pub fn url(&self, address: &str, size: u32) -> String {
        format!(
            "{}/avatar/{}?s={}&d=404",
            self.base_url,
            hash_address(address),
            size
        )
    }

    pub fn display_url(&self, address: &str) -> String {
        self.url(address, self.display_size)
    }

    pub fn probe_url(&self, address: &str) -> String {
        self.url(address, self.probe_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_normalizes_case_and_whitespace() {
        assert_eq!(hash_address("  A@Acme.COM "), hash_address("a@acme.com"));
        assert_eq!(
            hash_address("   "),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_address("a@acme.com").len(), 64);
    }

    #[test]
    fn urls_carry_size_and_not_found_default() {
        let service = UserImageService::new("https://img.example/", 120, 40);
        let hash = hash_address("a@acme.com");
        assert_eq!(
            service.display_url("a@acme.com"),
            format!("https://img.example/avatar/{}?s=120&d=404", hash)
        );
        assert_eq!(
            service.probe_url("A@ACME.com"),
            format!("https://img.example/avatar/{}?s=40&d=404", hash)
        );
    }

    #[test]
    fn default_points_at_gravatar() {
        let url = UserImageService::default().display_url("a@acme.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=200&d=404"));
    }
}
