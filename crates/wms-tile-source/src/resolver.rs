//! Profile negotiation and GetMap template synthesis.
//!
//! Resolution reads the capabilities document (required), settles the
//! format and reference system, builds the GetMap template, then picks a
//! profile by trying each [`ProfileStrategy`] in order. A TileService
//! document, when the server publishes one with matching patterns,
//! replaces both the template and the profile.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use wms_common::{Profile, ProfileRegistry, ProfileType, SpatialReference, WmsError, WmsResult};
use wms_protocol::{
    capabilities_url, mime_type, query_separator, tile_service_url, Capabilities, GetMapRequest,
    RequestTemplate,
};

use crate::config::{HttpConfig, SourceConfig, DEFAULT_FORMAT, DEFAULT_SRS};
use crate::readers::{CapabilitiesReader, HttpDocumentReader, TileServiceReader};

/// Outcome of a successful resolution, fixed for the lifetime of a source.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub profile: Arc<Profile>,
    /// GetMap (or TileService pattern) template, ending with `&.<format>`.
    pub template: RequestTemplate,
    /// Image extension.
    pub format: String,
    pub srs: String,
    /// True when the template and profile came from a TileService document.
    pub tile_service: bool,
}

/// Ways of obtaining a profile from the capabilities, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStrategy {
    /// Reuse the caller's map profile when it shares the target reference.
    MapProfile,
    /// Build a profile from the layer's advertised extent.
    LayerExtent,
    /// Reuse a non-local caller profile for a geographic target.
    GeographicFallback,
}

impl ProfileStrategy {
    pub const ORDER: [ProfileStrategy; 3] = [
        ProfileStrategy::MapProfile,
        ProfileStrategy::LayerExtent,
        ProfileStrategy::GeographicFallback,
    ];

    /// Profile this strategy yields for the context, if it applies.
    pub fn select(&self, ctx: &ProfileContext<'_>) -> Option<Arc<Profile>> {
        match self {
            ProfileStrategy::MapProfile => ctx
                .map_profile
                .filter(|map| ctx.srs.is_equivalent_to(map.srs()))
                .cloned(),
            ProfileStrategy::LayerExtent => {
                let extent = ctx.capabilities.layer_by_name(ctx.layers)?.extent?;
                let global = ctx.registry.global_geodetic();
                if ctx.srs.is_geographic() && extent.bitwise_eq(global.extent()) {
                    return Some(global.clone());
                }
                match Profile::create(ctx.srs.init_string(), extent) {
                    Ok(profile) => Some(Arc::new(profile)),
                    Err(e) => {
                        warn!(layers = %ctx.layers, error = %e, "Layer extent does not form a profile");
                        None
                    }
                }
            }
            ProfileStrategy::GeographicFallback => ctx
                .map_profile
                .filter(|map| {
                    ctx.srs.is_geographic() && map.profile_type() != ProfileType::Local
                })
                .cloned(),
        }
    }
}

/// Inputs the profile strategies look at.
#[derive(Debug, Clone, Copy)]
pub struct ProfileContext<'a> {
    pub srs: &'a SpatialReference,
    pub layers: &'a str,
    pub capabilities: &'a Capabilities,
    pub map_profile: Option<&'a Arc<Profile>>,
    pub registry: &'a ProfileRegistry,
}

impl ProfileContext<'_> {
    /// First strategy that yields a profile, with the profile.
    pub fn select(&self) -> Option<(ProfileStrategy, Arc<Profile>)> {
        ProfileStrategy::ORDER
            .iter()
            .find_map(|strategy| strategy.select(self).map(|profile| (*strategy, profile)))
    }
}

/// Negotiates the profile and request template of a WMS source.
pub struct ProfileResolver {
    capabilities: Arc<dyn CapabilitiesReader>,
    tile_service: Arc<dyn TileServiceReader>,
    registry: ProfileRegistry,
}

impl ProfileResolver {
    pub fn new(
        capabilities: Arc<dyn CapabilitiesReader>,
        tile_service: Arc<dyn TileServiceReader>,
        registry: ProfileRegistry,
    ) -> Self {
        Self {
            capabilities,
            tile_service,
            registry,
        }
    }

    /// Resolver reading both documents over HTTP.
    pub fn http(config: &HttpConfig, registry: ProfileRegistry) -> WmsResult<Self> {
        let reader = Arc::new(HttpDocumentReader::new(config)?);
        Ok(Self::new(reader.clone(), reader, registry))
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Resolve the profile, template, format and reference system for a source.
    ///
    /// Fails when the capabilities cannot be read or no profile can be derived.
    /// A missing or unusable TileService document is not an error.
    #[instrument(skip(self, config, map_profile), fields(url = %config.url, layers = %config.layers))]
    pub async fn resolve(
        &self,
        config: &SourceConfig,
        map_profile: Option<&Arc<Profile>>,
    ) -> WmsResult<Resolution> {
        let caps_url = config
            .capabilities_url
            .clone()
            .unwrap_or_else(|| capabilities_url(&config.url));

        info!(url = %caps_url, "Reading WMS capabilities");
        let capabilities = self.capabilities.read_capabilities(&caps_url).await?;

        let format = config
            .format
            .clone()
            .or_else(|| capabilities.suggest_extension())
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        let srs_init = config.srs.clone().unwrap_or_else(|| DEFAULT_SRS.to_string());
        let srs = SpatialReference::create(&srs_init)
            .ok_or_else(|| WmsError::InvalidCrs(srs_init.clone()))?;

        let mime = mime_type(&format, config.wms_format.as_deref());
        let mut template = GetMapRequest {
            layers: &config.layers,
            format: &mime,
            styles: &config.style,
            srs: &srs_init,
            width: config.tile_size,
            height: config.tile_size,
        }
        .template(&config.url);

        let ctx = ProfileContext {
            srs: &srs,
            layers: &config.layers,
            capabilities: &capabilities,
            map_profile,
            registry: &self.registry,
        };
        let mut profile = match ctx.select() {
            Some((strategy, profile)) => {
                debug!(strategy = ?strategy, "Profile selected from capabilities");
                Some(profile)
            }
            None => {
                debug!("No profile from capabilities");
                None
            }
        };

        let mut tile_service = false;
        if let Some(probe) = self.probe_tile_service(config, &format, &srs_init).await {
            template = probe.template;
            profile = probe.profile.or(profile);
            tile_service = true;
        }

        let template = template.with_suffix(&format!("&.{}", format));
        let profile = profile.ok_or_else(|| WmsError::NoProfile {
            layers: config.layers.clone(),
            srs: srs_init.clone(),
        })?;

        info!(
            format = %format,
            srs = %srs_init,
            tile_service,
            template = %template,
            "Resolved WMS source"
        );

        Ok(Resolution {
            profile,
            template,
            format,
            srs: srs_init,
            tile_service,
        })
    }

    /// Look for TileService patterns matching the source's access parameters.
    async fn probe_tile_service(
        &self,
        config: &SourceConfig,
        format: &str,
        srs: &str,
    ) -> Option<TileServiceProbe> {
        let url = config
            .tile_service_url
            .clone()
            .unwrap_or_else(|| tile_service_url(&config.url));

        let service = match self.tile_service.read_tile_service(&url).await {
            Ok(service) => service,
            Err(e) => {
                debug!(url = %url, error = %e, "No TileService available");
                return None;
            }
        };

        let patterns = service.matching_patterns(
            &config.layers,
            format,
            &config.style,
            srs,
            config.tile_size,
            config.tile_size,
        );
        let Some(first) = patterns.first() else {
            debug!(url = %url, "TileService has no matching patterns");
            return None;
        };

        info!(url = %url, patterns = patterns.len(), "Using TileService patterns");

        let prefix = format!("{}{}", config.url, query_separator(&config.url));
        let template = first.prototype().clone().with_prefix(&prefix);

        let profile = service.create_profile(&patterns).map(Arc::new);
        if profile.is_none() {
            warn!(url = %url, "TileService profile unusable, keeping capabilities profile");
        }

        Some(TileServiceProbe { template, profile })
    }
}

struct TileServiceProbe {
    template: RequestTemplate,
    profile: Option<Arc<Profile>>,
}
