use std::sync::Arc;

use tracing::debug;

use mythmail_core::Mailbox;

use crate::image::UserImageService;
use crate::initials::compute_initials;
use crate::lookup::{BrandLogoLookup, HttpBrandLogoLookup, HttpImageProbe, ImageProbe};
use crate::{AvatarConfig, AvatarResult};

/// Resolves avatars in priority order: brand logo, user image, initials.
///
/// Holds no cache; each call asks the collaborators again.
#[derive(Clone)]
pub struct AvatarResolver {
    brand: Option<Arc<dyn BrandLogoLookup>>,
    probe: Arc<dyn ImageProbe>,
    images: UserImageService,
}

struct Target {
    address: String,
    domain: String,
    initials: String,
}

impl AvatarResolver {
    pub fn new(
        brand: Option<Arc<dyn BrandLogoLookup>>,
        probe: Arc<dyn ImageProbe>,
        images: UserImageService,
    ) -> Self {
        Self {
            brand,
            probe,
            images,
        }
    }

    pub fn from_config(config: &AvatarConfig, api_base: &str, client: reqwest::Client) -> Self {
        let brand: Option<Arc<dyn BrandLogoLookup>> = if config.brand_lookup {
            Some(Arc::new(HttpBrandLogoLookup::new(client.clone(), api_base)))
        } else {
            None
        };
        Self::new(
            brand,
            Arc::new(HttpImageProbe::new(client)),
            UserImageService::new(&config.image_base_url, config.display_size, config.probe_size),
        )
    }

    /// First-paint avatar: assumes the user image exists and never touches
    /// the network. The initials cover a failed image load.
    pub fn resolve_sync(&self, email: &str, name: Option<&str>) -> AvatarResult {
        let target = Target::new(email, name);
        AvatarResult::gravatar_image(self.images.display_url(&target.address), target.initials)
    }

    /// Full resolution. Lookup failures count as "not found", so this always
    /// produces a result.
    pub async fn resolve(&self, email: &str, name: Option<&str>) -> AvatarResult {
        let target = Target::new(email, name);

        if let Some(logo) = self.brand_logo(&target.domain).await {
            return AvatarResult::brand_logo(logo, target.initials);
        }

        let probe_url = self.images.probe_url(&target.address);
        match self.probe.exists(&probe_url).await {
            Ok(true) => {
                return AvatarResult::gravatar_image(
                    self.images.display_url(&target.address),
                    target.initials,
                );
            }
            Ok(false) => {}
            Err(err) => debug!(address = %target.address, "user image probe failed: {err:#}"),
        }

        AvatarResult::initials_only(target.initials)
    }

    async fn brand_logo(&self, domain: &str) -> Option<String> {
        let brand = self.brand.as_ref()?;
        if domain.is_empty() {
            return None;
        }
        match brand.logo_for_domain(domain).await {
            Ok(logo) => logo,
            Err(err) => {
                debug!(domain, "brand logo lookup failed: {err:#}");
                None
            }
        }
    }
}

impl Target {
    fn new(email: &str, name: Option<&str>) -> Self {
        let mailbox = Mailbox::parse(email);
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or(mailbox.name.as_deref());
        Self {
            initials: compute_initials(&mailbox.address, name),
            domain: mailbox.domain(),
            address: mailbox.address,
        }
    }
}
