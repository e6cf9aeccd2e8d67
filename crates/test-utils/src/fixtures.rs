//! Common test fixtures for tile-source tests.
//!
//! This module provides service documents and request parameters that
//! represent the usual shapes of WMS and TileService servers.

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);

    /// Europe bounding box
    pub const EUROPE: (f64, f64, f64, f64) = (-15.0, 35.0, 45.0, 72.0);
}

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// WMS 1.1.1 style (lon/lat order)
    pub const CRS_84: &str = "CRS:84";

    /// UTM zone 33N, a purely local projection
    pub const UTM_33N: &str = "EPSG:32633";
}

/// Base URLs used across resolver tests.
pub mod urls {
    /// Plain service prefix without a query string.
    pub const PLAIN: &str = "http://x/wms";

    /// Prefix that already carries a query string (MapServer style).
    pub const WITH_QUERY: &str = "http://x/cgi-bin/mapserv?map=world.map";
}

/// WMS GetCapabilities documents.
pub mod capabilities {
    /// WMS 1.1.1, layer `basic` with a global extent and no image formats.
    pub const BASIC_GLOBAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMT_MS_Capabilities version="1.1.1">
  <Service>
    <Name>OGC:WMS</Name>
    <Title>Basic Test Server</Title>
  </Service>
  <Capability>
    <Request>
      <GetMap>
        <Format>application/vnd.google-earth.kml+xml</Format>
      </GetMap>
    </Request>
    <Layer>
      <Title>Root</Title>
      <SRS>EPSG:4326</SRS>
      <Layer>
        <Name>basic</Name>
        <Title>Basic</Title>
        <LatLonBoundingBox minx="-180" miny="-90" maxx="180" maxy="90"/>
      </Layer>
    </Layer>
  </Capability>
</WMT_MS_Capabilities>"#;

    /// WMS 1.1.1, regional layers, GetMap offering jpeg before png.
    pub const REGIONAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMT_MS_Capabilities version="1.1.1">
  <Service><Name>OGC:WMS</Name><Title>Regional Server</Title></Service>
  <Capability>
    <Request>
      <GetMap>
        <Format>image/jpeg</Format>
        <Format>image/png</Format>
      </GetMap>
    </Request>
    <Layer>
      <Title>Regional</Title>
      <SRS>EPSG:4326 EPSG:3857</SRS>
      <LatLonBoundingBox minx="-130" miny="20" maxx="-60" maxy="55"/>
      <Layer>
        <Name>conus_elevation</Name>
        <Title>CONUS elevation</Title>
      </Layer>
      <Layer>
        <Name>europe</Name>
        <LatLonBoundingBox minx="-15" miny="35" maxx="45" maxy="72"/>
      </Layer>
    </Layer>
  </Capability>
</WMT_MS_Capabilities>"#;

    /// WMS 1.3.0 with an EX_GeographicBoundingBox.
    pub const WMS_130: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
  <Service><Name>WMS</Name><Title>Modern Server</Title></Service>
  <Capability>
    <Request>
      <GetMap>
        <Format>image/png; mode=8bit</Format>
        <Format>image/tiff</Format>
      </GetMap>
    </Request>
    <Layer>
      <Title>Root</Title>
      <CRS>EPSG:4326</CRS>
      <Layer>
        <Name>srtm</Name>
        <Title>SRTM</Title>
        <EX_GeographicBoundingBox>
          <westBoundLongitude>-180</westBoundLongitude>
          <eastBoundLongitude>180</eastBoundLongitude>
          <southBoundLatitude>-56</southBoundLatitude>
          <northBoundLatitude>60</northBoundLatitude>
        </EX_GeographicBoundingBox>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    /// What many servers return instead of capabilities on error.
    pub const EXCEPTION_REPORT: &str = r#"<?xml version="1.0"?>
<ServiceExceptionReport version="1.1.1">
  <ServiceException code="InvalidParameterValue">Unknown service</ServiceException>
</ServiceExceptionReport>"#;
}

/// JPL TileService documents.
pub mod tileservice {
    /// Two resolution levels of `global_mosaic` (jpeg, visual, 512px) and one png pattern.
    pub const GLOBAL_MOSAIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Tile_Service version="0.1.0">
  <Service>
    <Name>WMS</Name>
    <Title>JPL Global Imagery Service</Title>
  </Service>
  <TiledPatterns>
    <OnlineResource xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="http://onearth.jpl.nasa.gov/wms.cgi?"/>
    <LatLonBoundingBox minx="-180" miny="-90" maxx="180" maxy="90"/>
    <TiledGroup>
      <Name>Global Mosaic, pan sharpened visual</Name>
      <Title>Global Mosaic</Title>
      <LatLonBoundingBox minx="-180" miny="-90" maxx="180" maxy="90"/>
      <TilePattern>
request=GetMap&amp;layers=global_mosaic&amp;srs=EPSG:4326&amp;format=image/jpeg&amp;styles=visual&amp;width=512&amp;height=512&amp;bbox=-180,-38,-52,90
request=GetMap&amp;layers=global_mosaic&amp;srs=EPSG:4326&amp;format=image/jpeg&amp;styles=visual&amp;width=512&amp;height=512&amp;bbox=-180,-166,76,90
      </TilePattern>
      <TilePattern><![CDATA[request=GetMap&layers=global_mosaic&srs=EPSG:4326&format=image/png&styles=visual&width=512&height=512&bbox=-180,-166,76,90]]></TilePattern>
    </TiledGroup>
  </TiledPatterns>
</WMS_Tile_Service>"#;

    /// A TileService whose only pattern is for another layer.
    pub const OTHER_LAYER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Tile_Service version="0.1.0">
  <TiledPatterns>
    <TiledGroup>
      <Name>Daily planet</Name>
      <TilePattern>request=GetMap&amp;layers=daily_planet&amp;srs=EPSG:4326&amp;format=image/jpeg&amp;styles=&amp;width=512&amp;height=512&amp;bbox=-180,-166,76,90</TilePattern>
    </TiledGroup>
  </TiledPatterns>
</WMS_Tile_Service>"#;
}
