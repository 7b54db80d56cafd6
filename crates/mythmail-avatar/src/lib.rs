//! Sender avatars: brand logos, user images and initials.

mod image;
mod initials;
mod lookup;
mod resolver;
mod slot;

use serde::{Deserialize, Serialize};

pub use image::{DEFAULT_IMAGE_BASE_URL, UserImageService, hash_address};
pub use initials::compute_initials;
pub use lookup::{BrandLogoLookup, HttpBrandLogoLookup, HttpImageProbe, ImageProbe};
pub use resolver::AvatarResolver;
pub use slot::{AvatarPresentation, AvatarSlot, AvatarTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarKind {
    BrandLogo,
    GravatarImage,
    Initials,
}

/// One resolved avatar. `initials` is always filled so a failed image load
/// can fall back without another lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResult {
    kind: AvatarKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    initials: String,
    verified: bool,
}

impl AvatarResult {
    pub fn brand_logo(image_url: String, initials: String) -> Self {
        Self {
            kind: AvatarKind::BrandLogo,
            image_url: Some(image_url),
            initials,
            verified: true,
        }
    }

    pub fn gravatar_image(image_url: String, initials: String) -> Self {
        Self {
            kind: AvatarKind::GravatarImage,
            image_url: Some(image_url),
            initials,
            verified: false,
        }
    }

    pub fn initials_only(initials: String) -> Self {
        Self {
            kind: AvatarKind::Initials,
            image_url: None,
            initials,
            verified: false,
        }
    }

    pub fn kind(&self) -> AvatarKind {
        self.kind
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    pub fn verified(&self) -> bool {
        self.verified
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    pub brand_lookup: bool,
    pub image_base_url: String,
    pub display_size: u32,
    pub probe_size: u32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            brand_lookup: true,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            display_size: image::DISPLAY_SIZE,
            probe_size: image::PROBE_SIZE,
        }
    }
}
