//! Tests for capabilities and TileService document handling against
//! realistic server responses.

use test_utils::{assert_approx_eq, fixtures};
use wms_common::{BoundingBox, ProfileType};
use wms_protocol::{Capabilities, CapabilitiesError, TileService, TileServiceError};

// ============================================================================
// Capabilities
// ============================================================================

#[test]
fn test_basic_layer_has_global_extent() {
    let caps = Capabilities::parse(fixtures::capabilities::BASIC_GLOBAL).unwrap();
    let layer = caps.layer_by_name("basic").unwrap();
    assert_eq!(layer.extent, Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)));
    assert_eq!(layer.title.as_deref(), Some("Basic"));
}

#[test]
fn test_basic_capabilities_offer_no_image_format() {
    let caps = Capabilities::parse(fixtures::capabilities::BASIC_GLOBAL).unwrap();
    assert_eq!(caps.formats.len(), 1);
    assert_eq!(caps.suggest_extension(), None);
}

#[test]
fn test_regional_layers() {
    let caps = Capabilities::parse(fixtures::capabilities::REGIONAL).unwrap();
    assert_eq!(caps.suggest_extension().as_deref(), Some("jpeg"));

    let conus = caps.layer_by_name("conus_elevation").unwrap();
    let (min_x, min_y, max_x, max_y) = fixtures::bbox::CONUS;
    assert_eq!(conus.extent, Some(BoundingBox::new(min_x, min_y, max_x, max_y)));

    let europe = caps.layer_by_name("europe").unwrap();
    let (min_x, min_y, max_x, max_y) = fixtures::bbox::EUROPE;
    assert_eq!(europe.extent, Some(BoundingBox::new(min_x, min_y, max_x, max_y)));

    assert_eq!(caps.layers[0].srs, vec!["EPSG:4326", "EPSG:3857"]);
}

#[test]
fn test_wms_130_geographic_bbox() {
    let caps = Capabilities::parse(fixtures::capabilities::WMS_130).unwrap();
    assert_eq!(caps.version.as_deref(), Some("1.3.0"));

    let srtm = caps.layer_by_name("srtm").unwrap();
    let extent = srtm.extent.unwrap();
    assert_approx_eq!(extent.min_x, -180.0, 1e-9);
    assert_approx_eq!(extent.min_y, -56.0, 1e-9);
    assert_approx_eq!(extent.max_x, 180.0, 1e-9);
    assert_approx_eq!(extent.max_y, 60.0, 1e-9);

    assert_eq!(caps.suggest_extension().as_deref(), Some("png"));
}

#[test]
fn test_unknown_layer() {
    let caps = Capabilities::parse(fixtures::capabilities::BASIC_GLOBAL).unwrap();
    assert!(caps.layer_by_name("missing").is_none());
}

#[test]
fn test_exception_report_is_not_capabilities() {
    let err = Capabilities::parse(fixtures::capabilities::EXCEPTION_REPORT).unwrap_err();
    assert!(matches!(err, CapabilitiesError::NotCapabilities(_)));
}

#[test]
fn test_malformed_capabilities() {
    let err = Capabilities::parse("<WMT_MS_Capabilities><Layer></Capability>").unwrap_err();
    assert!(matches!(err, CapabilitiesError::Xml { .. }));
}

// ============================================================================
// TileService
// ============================================================================

#[test]
fn test_parse_global_mosaic_service() {
    let service = TileService::parse(fixtures::tileservice::GLOBAL_MOSAIC).unwrap();
    assert_eq!(service.name.as_deref(), Some("WMS"));
    assert_eq!(service.data_extent, Some(BoundingBox::new(-180.0, -90.0, 180.0, 90.0)));
    assert_eq!(service.groups.len(), 1);

    let group = &service.groups[0];
    assert_eq!(group.title.as_deref(), Some("Global Mosaic"));
    assert_eq!(group.patterns.len(), 3);
}

#[test]
fn test_matching_patterns_filters_format() {
    let service = TileService::parse(fixtures::tileservice::GLOBAL_MOSAIC).unwrap();

    let jpeg = service.matching_patterns("global_mosaic", "jpeg", "visual", "EPSG:4326", 512, 512);
    assert_eq!(jpeg.len(), 2);

    let png = service.matching_patterns("global_mosaic", "png", "visual", "EPSG:4326", 512, 512);
    assert_eq!(png.len(), 1);

    let other = service.matching_patterns("global_mosaic", "jpeg", "visual", "EPSG:4326", 256, 256);
    assert!(other.is_empty());
}

#[test]
fn test_profile_from_coarsest_pattern() {
    let service = TileService::parse(fixtures::tileservice::GLOBAL_MOSAIC).unwrap();
    let patterns =
        service.matching_patterns("global_mosaic", "jpeg", "visual", "EPSG:4326", 512, 512);

    let profile = service.create_profile(&patterns).unwrap();
    assert_eq!(profile.profile_type(), ProfileType::Geodetic);
    assert_eq!(profile.level_zero_tiles(), (2, 1));
    assert_eq!(*profile.extent(), BoundingBox::new(-180.0, -166.0, 332.0, 90.0));

    let tile = profile.tile_extent(0, 0, 0);
    assert_eq!(tile, BoundingBox::new(-180.0, -166.0, 76.0, 90.0));
}

#[test]
fn test_pattern_order_does_not_change_profile() {
    let service = TileService::parse(fixtures::tileservice::GLOBAL_MOSAIC).unwrap();
    let mut patterns =
        service.matching_patterns("global_mosaic", "jpeg", "visual", "EPSG:4326", 512, 512);
    patterns.reverse();

    let profile = service.create_profile(&patterns).unwrap();
    assert_eq!(profile.level_zero_tiles(), (2, 1));
}

#[test]
fn test_no_patterns_no_profile() {
    let service = TileService::parse(fixtures::tileservice::OTHER_LAYER).unwrap();
    let patterns =
        service.matching_patterns("global_mosaic", "jpeg", "visual", "EPSG:4326", 512, 512);
    assert!(patterns.is_empty());
    assert!(service.create_profile(&patterns).is_none());
}

#[test]
fn test_pattern_prototype_renders_tile() {
    let service = TileService::parse(fixtures::tileservice::GLOBAL_MOSAIC).unwrap();
    let patterns =
        service.matching_patterns("global_mosaic", "png", "visual", "EPSG:4326", 512, 512);
    let request = patterns[0]
        .prototype()
        .render(&BoundingBox::new(-180.0, -166.0, 76.0, 90.0));
    assert!(request.starts_with("request=GetMap&layers=global_mosaic"));
    assert!(request.ends_with("&bbox=-180.000000,-166.000000,76.000000,90.000000"));
}

#[test]
fn test_capabilities_document_is_not_tileservice() {
    let err = TileService::parse(fixtures::capabilities::BASIC_GLOBAL).unwrap_err();
    assert!(matches!(err, TileServiceError::NotTileService(root) if root == "WMT_MS_Capabilities"));
}
