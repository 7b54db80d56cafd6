use serde::Serialize;
use tracing::debug;

use crate::resolver::AvatarResolver;
use crate::{AvatarKind, AvatarResult};

/// Identifies the request a late result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AvatarPresentation {
    Image {
        url: String,
        alt: String,
        verified: bool,
    },
    Initials {
        text: String,
        verified: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotTarget {
    email: String,
    name: Option<String>,
}

/// The avatar currently on screen.
///
/// `show` paints the synchronous guess and hands out a ticket; the caller
/// runs [`AvatarResolver::resolve`] and passes the outcome to `apply`,
/// which ignores it if another sender has been shown in the meantime.
#[derive(Debug, Default)]
pub struct AvatarSlot {
    generation: u64,
    target: Option<SlotTarget>,
    current: Option<AvatarResult>,
    image_failed: bool,
}

impl AvatarSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, resolver: &AvatarResolver, email: &str, name: Option<&str>) -> AvatarTicket {
        self.generation += 1;
        self.target = Some(SlotTarget {
            email: email.to_string(),
            name: name.map(str::to_string),
        });
        self.current = Some(resolver.resolve_sync(email, name));
        self.image_failed = false;
        AvatarTicket {
            generation: self.generation,
        }
    }

    /// Installs a resolved avatar. Returns false when the ticket is stale.
    pub fn apply(&mut self, ticket: AvatarTicket, result: AvatarResult) -> bool {
        if ticket.generation != self.generation || self.target.is_none() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale avatar"
            );
            return false;
        }
        let same_image = self
            .current
            .as_ref()
            .is_some_and(|c| c.image_url() == result.image_url());
        if !same_image {
            self.image_failed = false;
        }
        self.current = Some(result);
        true
    }

    /// Called by the renderer when the image could not be loaded.
    pub fn image_failed(&mut self) {
        self.image_failed = true;
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.target = None;
        self.current = None;
        self.image_failed = false;
    }

    pub fn current(&self) -> Option<&AvatarResult> {
        self.current.as_ref()
    }

    pub fn presentation(&self) -> Option<AvatarPresentation> {
        let avatar = self.current.as_ref()?;
        let url = avatar
            .image_url()
            .filter(|_| !self.image_failed && avatar.kind() != AvatarKind::Initials);
        Some(match url {
            Some(url) => AvatarPresentation::Image {
                url: url.to_string(),
                alt: self.alt_text(),
                verified: avatar.verified(),
            },
            None => AvatarPresentation::Initials {
                text: avatar.initials().to_string(),
                verified: avatar.verified(),
            },
        })
    }

    fn alt_text(&self) -> String {
        match &self.target {
            Some(SlotTarget {
                name: Some(name), ..
            }) if !name.trim().is_empty() => name.clone(),
            Some(target) => target.email.clone(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;

    use super::*;
    use crate::UserImageService;
    use crate::lookup::ImageProbe;

    struct NoImages;

    #[async_trait]
    impl ImageProbe for NoImages {
        async fn exists(&self, _url: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn resolver() -> AvatarResolver {
        AvatarResolver::new(None, Arc::new(NoImages), UserImageService::default())
    }

    #[test]
    fn show_paints_sync_result_first() {
        let mut slot = AvatarSlot::new();
        slot.show(&resolver(), "john@x.com", Some("John Smith"));
        match slot.presentation() {
            Some(AvatarPresentation::Image { alt, verified, .. }) => {
                assert_eq!(alt, "John Smith");
                assert!(!verified);
            }
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(slot.current().map(|a| a.initials()), Some("JS"));
    }

    #[tokio::test]
    async fn async_result_replaces_sync_guess() {
        let resolver = resolver();
        let mut slot = AvatarSlot::new();
        let ticket = slot.show(&resolver, "a@acme.com", None);
        let resolved = resolver.resolve("a@acme.com", None).await;
        assert!(slot.apply(ticket, resolved));
        assert_eq!(
            slot.presentation(),
            Some(AvatarPresentation::Initials {
                text: "A@".to_string(),
                verified: false
            })
        );
    }

    #[test]
    fn stale_results_are_discarded() {
        let resolver = resolver();
        let mut slot = AvatarSlot::new();
        let old = slot.show(&resolver, "old@x.com", None);
        slot.show(&resolver, "new@y.com", None);

        let late = AvatarResult::brand_logo("https://x.com/logo.svg".into(), "OL".into());
        assert!(!slot.apply(old, late));
        assert_eq!(slot.current().map(|a| a.initials()), Some("NE"));

        slot.clear();
        assert!(slot.presentation().is_none());
    }

    #[test]
    fn failed_image_falls_back_to_initials_with_badge() {
        let resolver = resolver();
        let mut slot = AvatarSlot::new();
        let ticket = slot.show(&resolver, "a@acme.com", None);
        let logo = AvatarResult::brand_logo("https://acme.com/logo.svg".into(), "A@".into());
        assert!(slot.apply(ticket, logo.clone()));
        slot.image_failed();
        assert_eq!(
            slot.presentation(),
            Some(AvatarPresentation::Initials {
                text: "A@".to_string(),
                verified: true
            })
        );

        // Same URL again: still broken.
        assert!(slot.apply(ticket, logo));
        assert!(matches!(
            slot.presentation(),
            Some(AvatarPresentation::Initials { .. })
        ));
    }

    #[test]
    fn failed_sync_image_recovers_when_logo_arrives() {
        let resolver = resolver();
        let mut slot = AvatarSlot::new();
        let ticket = slot.show(&resolver, "a@acme.com", None);
        slot.image_failed();
        assert!(matches!(
            slot.presentation(),
            Some(AvatarPresentation::Initials { verified: false, .. })
        ));

        let logo = AvatarResult::brand_logo("https://acme.com/logo.svg".into(), "A@".into());
        assert!(slot.apply(ticket, logo));
        assert!(matches!(
            slot.presentation(),
            Some(AvatarPresentation::Image { verified: true, .. })
        ));
    }
}
